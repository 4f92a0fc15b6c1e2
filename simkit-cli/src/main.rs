//! `simkit`: print a plan for the task given on the command line.
//!
//! All arguments are joined with spaces into the task; with no arguments the task is `demo task`.
//! Set `OPENAI_API_KEY` to plan with a live model, otherwise the deterministic fallback answers.

use std::process::ExitCode;

use anyhow::Result;
use log::debug;
use rpa_simkit::config::PlannerConfig;
use rpa_simkit::planner::{Planner, DEFAULT_TASK};

fn task_from_args(args: impl IntoIterator<Item=String>) -> String {
    let task = args.into_iter().collect::<Vec<_>>().join(" ");
    if task.is_empty() {
        DEFAULT_TASK.to_string()
    } else {
        task
    }
}

async fn run(task: &str) -> Result<String> {
    let config = PlannerConfig::from_env();
    let planner = Planner::from_config(&config)?;
    debug!("planning {:?} with {}", task, planner.provider_name());
    planner.plan(task).await
}

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::init();
    let task = task_from_args(std::env::args().skip(1));
    match run(&task).await {
        Ok(plan) => {
            println!("{}", plan);
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("Error: {:#}", err);
            ExitCode::FAILURE
        }
    }
}
