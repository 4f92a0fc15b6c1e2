//! # rpa-simkit
//!
//! Turn a task into a short numbered plan by chaining a prompt template, a completion provider and an output parser.
//!
//! ## Usage
//!
//! ```
//! use rpa_simkit::config::PlannerConfig;
//! use rpa_simkit::planner::Planner;
//!
//! # async fn demo() -> anyhow::Result<()> {
//! let planner = Planner::from_config(&PlannerConfig::fallback())?;
//! let plan = planner.plan("extract invoices from email").await?;
//! assert!(plan.starts_with("Plan for: extract invoices from email"));
//!
//! let plans = planner.plan_batch(&["collect PDFs", "parse tables"]).await?;
//! assert_eq!(2, plans.len());
//! # Ok(())
//! # }
//! ```
//!
//! ## Concepts and Design
//!
//! The pipeline has three stages and each of them is plain data or a small trait, so every step that turns a task
//! into a plan can be followed by reading the code top to bottom:
//!
//! ```text
//! task -> ChatPromptTemplate -> Conversation -> CompletionProvider -> String -> ParseOutput -> plan
//! ```
//!
//! ### Prompt Template and Placeholder
//!
//! A template such as
//!
//! ```text
//! Create a short plan for: {{task}}
//! ```
//!
//! has one placeholder named `"task"`. The format of a named placeholder is simply `{{whatever name you like}}`;
//! the name can be any string without line breaks. A [`ChatPromptTemplate`](crate::prompt::ChatPromptTemplate) is a
//! list of role-tagged templates and formats into a [`Conversation`](crate::conversation::Conversation).
//!
//! ### Completion Provider
//!
//! Anything implementing [`CompletionProvider`](crate::utils::llm::CompletionProvider). Two ship with the crate:
//!
//! * [`OpenAIChat`](crate::utils::llm::openai::OpenAIChat), a live model (cargo feature `openai`, on by default),
//! * [`FallbackPlanner`](crate::utils::llm::fallback::FallbackPlanner), a deterministic planner that never touches
//!   the network and never fails.
//!
//! Which one is used is decided once, explicitly, by a [`PlannerConfig`](crate::config::PlannerConfig).
//!
//! ### Output Parser
//!
//! The last stage, [`ParseOutput`](crate::utils::postprocess::ParseOutput). Plans are plain text, so the planner
//! uses the pass-through [`StrOutputParser`](crate::utils::postprocess::StrOutputParser).
//!
//! ### Chain and Planner
//!
//! [`Chain`](crate::chain::Chain) composes the three stages and runs them once, over a batch, or as a stream.
//! [`Planner`](crate::planner::Planner) is the chain for plans. Build it once at start-up and pass it around.
//!
//! ## Logging
//!
//! The crate logs through the `log` facade; install any logger (the command line uses `env_logger`).


pub mod prompt;
pub mod conversation;
pub mod chain;
pub mod planner;
pub mod config;
pub mod utils;
