//! # Planner
//! The plan pipeline: a two-message prompt asking for a short numbered plan, a completion provider, and a
//! pass-through parser.
//!
//! Build a [Planner] once, from a [PlannerConfig] or from any [CompletionProvider], and share it by reference.

use anyhow::Result;
use futures::stream::BoxStream;

use crate::chain::Chain;
use crate::config::PlannerConfig;
use crate::conversation::{Conversation, Role};
use crate::prompt::{ChatPromptTemplate, Vars};
use crate::utils::llm::CompletionProvider;
use crate::utils::postprocess::StrOutputParser;

pub const SYSTEM_INSTRUCTION: &str = "You are a concise planner. Produce clear, numbered steps.";
pub const HUMAN_TEMPLATE: &str = "Create a short plan for: {{task}}";
pub const TASK_PLACEHOLDER: &str = "task";
/// Used by the command line when no task is given.
pub const DEFAULT_TASK: &str = "demo task";

/// The plan prompt.
pub fn plan_prompt() -> ChatPromptTemplate {
    ChatPromptTemplate::from_messages([
        (Role::System, SYSTEM_INSTRUCTION),
        (Role::Human, HUMAN_TEMPLATE),
    ])
}

fn task_vars(task: &str) -> Vars {
    Vars::from([(TASK_PLACEHOLDER.to_string(), task.to_string())])
}

pub struct Planner {
    chain: Chain<StrOutputParser>,
}

impl Planner {
    pub fn new(provider: Box<dyn CompletionProvider>) -> Self {
        Self {
            chain: Chain::new(plan_prompt(), provider, StrOutputParser),
        }
    }

    /// Build the provider chosen by `config` and the planner around it.
    pub fn from_config(config: &PlannerConfig) -> Result<Self> {
        let provider = config.build_provider()?;
        Ok(Self::new(provider).with_max_concurrency(config.max_concurrency))
    }

    pub fn with_max_concurrency(mut self, max_concurrency: usize) -> Self {
        self.chain = self.chain.with_max_concurrency(max_concurrency);
        self
    }

    /// Name of the provider answering the requests.
    pub fn provider_name(&self) -> &str {
        self.chain.provider().name()
    }

    /// The conversation sent to the provider for `task`.
    pub fn format(&self, task: &str) -> Conversation {
        let conversation = self.chain.prompt().format(&task_vars(task));
        // the only placeholder is always provided
        conversation.unwrap_or_else(|err| unreachable!("plan prompt failed to format: {err}"))
    }

    /// Plan a single task. Provider errors are returned unchanged.
    pub async fn plan(&self, task: &str) -> Result<String> {
        self.chain.invoke(&task_vars(task)).await
    }

    /// Plan every task. The result has one plan per task, in the same order.
    pub async fn plan_batch<S: AsRef<str>>(&self, tasks: &[S]) -> Result<Vec<String>> {
        let inputs: Vec<Vars> = tasks.iter().map(|task| task_vars(task.as_ref())).collect();
        self.chain.batch(&inputs).await
    }

    /// Stream the plan for `task`. Each call starts a new stream; the chunks concatenate to [Planner::plan]'s output.
    pub fn plan_stream(&self, task: &str) -> BoxStream<'_, Result<String>> {
        self.chain.stream(&task_vars(task))
    }
}

#[cfg(test)]
mod test_planner {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use futures::{StreamExt, TryStreamExt};

    use super::{Planner, HUMAN_TEMPLATE, SYSTEM_INSTRUCTION};
    use crate::chain::test_chain::{Echo, Flaky};
    use crate::conversation::Message;
    use crate::utils::llm::fallback::FallbackPlanner;

    fn fallback_planner() -> Planner {
        Planner::new(Box::new(FallbackPlanner::default()))
    }

    const STEPS: [&str; 5] = ["1)", "2)", "3)", "4)", "5)"];

    fn assert_numbered(plan: &str) {
        let mut from = 0;
        for step in STEPS {
            let idx = plan[from..].find(step).unwrap_or_else(|| panic!("{step} missing after byte {from} in {plan:?}"));
            from += idx + step.len();
        }
    }

    #[test]
    fn test_format() {
        let conversation = fallback_planner().format("collect PDFs");
        assert_eq!(&[
            Message::system(SYSTEM_INSTRUCTION),
            Message::human("Create a short plan for: collect PDFs"),
        ], conversation.messages());
        assert!(HUMAN_TEMPLATE.contains("{{task}}"));
    }

    #[tokio::test]
    async fn test_plan_contains_task_and_steps() {
        let planner = fallback_planner();
        for task in ["extract invoices from email", "x", "  padded  ", "multi\nline", "{{task}}"] {
            let plan = planner.plan(task).await.unwrap();
            assert!(plan.contains(&format!("Plan for: {task}")), "{plan:?}");
            assert_numbered(&plan);
        }
    }

    #[tokio::test]
    async fn test_plan_invoice_scenario() {
        let plan = fallback_planner().plan("extract invoices from email").await.unwrap();
        assert!(plan.starts_with("Plan for: extract invoices from email"));
        let lines: Vec<&str> = plan.lines().collect();
        assert_eq!(vec![
            "Plan for: extract invoices from email",
            "1) Understand requirements",
            "2) Identify tools/resources",
            "3) Execute main steps",
            "4) Verify results",
            "5) Report outcome",
        ], lines);
    }

    #[tokio::test]
    async fn test_plan_blank_task() {
        let planner = fallback_planner();
        for task in ["", "   ", "\t\n"] {
            let plan = planner.plan(task).await.unwrap();
            assert!(plan.starts_with("Plan for: the task\n"), "{plan:?}");
            assert_numbered(&plan);
        }
    }

    #[tokio::test]
    async fn test_plan_is_idempotent() {
        let planner = fallback_planner();
        let first = planner.plan("parse tables").await.unwrap();
        let second = planner.plan("parse tables").await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_plan_batch_scenario() {
        let outs = fallback_planner().plan_batch(&["collect PDFs", "parse tables"]).await.unwrap();
        assert_eq!(2, outs.len());
        assert!(outs[0].contains("collect PDFs"));
        assert!(!outs[0].contains("parse tables"));
        assert!(outs[1].contains("parse tables"));
        assert!(!outs[1].contains("collect PDFs"));
    }

    #[tokio::test]
    async fn test_plan_batch_matches_plan() {
        let planner = fallback_planner().with_max_concurrency(3);
        let tasks: Vec<String> = (0..7).map(|i| format!("task number {i}")).collect();
        let outs = planner.plan_batch(&tasks).await.unwrap();
        assert_eq!(tasks.len(), outs.len());
        for (task, out) in tasks.iter().zip(&outs) {
            assert_eq!(&planner.plan(task).await.unwrap(), out);
        }
        let empty: [&str; 0] = [];
        assert!(planner.plan_batch(&empty).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_plan_stream_fallback_yields_once() {
        let planner = fallback_planner();
        let chunks: Vec<String> = planner.plan_stream("collect PDFs").try_collect().await.unwrap();
        assert_eq!(1, chunks.len());
        assert_eq!(planner.plan("collect PDFs").await.unwrap(), chunks.concat());
        // restartable
        let again: Vec<String> = planner.plan_stream("collect PDFs").try_collect().await.unwrap();
        assert_eq!(chunks, again);
    }

    #[tokio::test]
    async fn test_plan_stream_multi_chunk() {
        let planner = Planner::new(Box::new(Echo));
        let chunks: Vec<String> = planner.plan_stream("write the report").try_collect().await.unwrap();
        assert!(chunks.len() > 1);
        assert_eq!(planner.plan("write the report").await.unwrap(), chunks.concat());
    }

    #[tokio::test]
    async fn test_provider_errors_propagate() {
        let planner = Planner::new(Box::new(Flaky { calls: Arc::new(AtomicUsize::new(0)) }));
        assert!(planner.plan("boom").await.is_err());
        assert!(planner.plan_batch(&["ok", "boom"]).await.is_err());
        let items: Vec<_> = planner.plan_stream("boom").collect().await;
        assert_eq!(1, items.len());
        assert!(items[0].is_err());
    }

    #[tokio::test]
    async fn test_batch_runs_every_task_once() {
        let calls = Arc::new(AtomicUsize::new(0));
        let planner = Planner::new(Box::new(Flaky { calls: calls.clone() })).with_max_concurrency(1);
        planner.plan_batch(&["a", "b", "c"]).await.unwrap();
        assert_eq!(3, calls.load(Ordering::SeqCst));
        assert_eq!("flaky", planner.provider_name());
    }
}
