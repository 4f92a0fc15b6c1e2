//! Post-processing of model replies.

use anyhow::Result;

pub mod json;

/// Turns a raw reply into the value a pipeline returns.
pub trait ParseOutput {
    type Output;
    fn parse(&self, text: String) -> Result<Self::Output>;
}

/// Passes the reply through unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct StrOutputParser;

impl ParseOutput for StrOutputParser {
    type Output = String;

    #[inline]
    fn parse(&self, text: String) -> Result<String> {
        Ok(text)
    }
}
