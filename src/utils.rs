pub mod llm;
pub mod postprocess;
pub(crate) mod prompt_processing;
