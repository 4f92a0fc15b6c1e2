//! Deterministic, network-free stand-in for a language model.

use anyhow::Result;
use async_trait::async_trait;

use crate::conversation::Conversation;
use crate::planner::HUMAN_TEMPLATE;
use crate::utils::llm::CompletionProvider;
use crate::utils::prompt_processing::text_before_first_placeholder;

/// Replaces the task when the request carries none.
pub const EMPTY_TASK: &str = "the task";

/// Answers every conversation with the same five-step plan for the requested task.
///
/// The task is read from the last human message. When built for a request template (see
/// [FallbackPlanner::for_template]), the template text in front of the placeholder is removed first,
/// so the plan names the task rather than the whole request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FallbackPlanner {
    request_prefix: Option<String>,
}

impl Default for FallbackPlanner {
    /// Built for the planner's request template.
    fn default() -> Self {
        Self::for_template(HUMAN_TEMPLATE)
    }
}

impl FallbackPlanner {
    /// Uses the whole human message as the task.
    pub fn verbatim() -> Self {
        Self { request_prefix: None }
    }

    /// Strips the text that `template` puts in front of its first placeholder.
    pub fn for_template(template: &str) -> Self {
        let request_prefix = text_before_first_placeholder(template)
            .filter(|prefix| !prefix.is_empty())
            .map(str::to_string);
        Self { request_prefix }
    }

    /// The task this conversation asks about.
    pub fn task<'a>(&self, conversation: &'a Conversation) -> &'a str {
        let request = conversation.last_human().unwrap_or_default();
        let task = match &self.request_prefix {
            Some(prefix) => request.strip_prefix(prefix.as_str()).unwrap_or(request),
            None => request,
        };
        if task.trim().is_empty() {
            EMPTY_TASK
        } else {
            task
        }
    }

    /// Synchronous answer. Never fails.
    pub fn respond(&self, conversation: &Conversation) -> String {
        let task = self.task(conversation);
        format!(
            "Plan for: {task}\n\
             1) Understand requirements\n\
             2) Identify tools/resources\n\
             3) Execute main steps\n\
             4) Verify results\n\
             5) Report outcome"
        )
    }
}

#[async_trait]
impl CompletionProvider for FallbackPlanner {
    fn name(&self) -> &str {
        "fallback"
    }

    async fn complete(&self, conversation: &Conversation) -> Result<String> {
        Ok(self.respond(conversation))
    }
}
