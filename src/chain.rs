//! # Chain
//! A chain glues the three stages of an LLM call together:
//!
//! ```text
//! Vars -> ChatPromptTemplate -> Conversation -> CompletionProvider -> String -> ParseOutput -> Output
//! ```
//!
//! It can be invoked once, over a batch of inputs, or as a stream of reply chunks. A chain is built once and
//! reused; it holds no state that changes between calls.

use anyhow::Result;
use futures::future;
use futures::stream::{self, BoxStream, StreamExt, TryStreamExt};
use log::debug;

use crate::prompt::{ChatPromptTemplate, Vars};
use crate::utils::llm::CompletionProvider;
use crate::utils::postprocess::{ParseOutput, StrOutputParser};

/// How many inputs of a batch are in flight at once unless configured otherwise.
pub const DEFAULT_MAX_CONCURRENCY: usize = 4;

pub struct Chain<O = StrOutputParser> {
    prompt: ChatPromptTemplate,
    provider: Box<dyn CompletionProvider>,
    parser: O,
    max_concurrency: usize,
}

impl<O: ParseOutput> Chain<O> {
    pub fn new(prompt: ChatPromptTemplate, provider: Box<dyn CompletionProvider>, parser: O) -> Self {
        Self {
            prompt,
            provider,
            parser,
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
        }
    }

    /// Limit the number of batch inputs processed concurrently. Zero is treated as one.
    pub fn with_max_concurrency(mut self, max_concurrency: usize) -> Self {
        self.max_concurrency = max_concurrency.max(1);
        self
    }

    #[inline]
    pub fn prompt(&self) -> &ChatPromptTemplate {
        &self.prompt
    }

    #[inline]
    pub fn provider(&self) -> &dyn CompletionProvider {
        self.provider.as_ref()
    }

    #[inline]
    pub fn max_concurrency(&self) -> usize {
        self.max_concurrency
    }

    /// Run the chain once. Errors from formatting, the provider and the parser are returned as they are.
    pub async fn invoke(&self, vars: &Vars) -> Result<O::Output> {
        let conversation = self.prompt.format(vars)?;
        debug!("invoking {} with {} messages", self.provider.name(), conversation.len());
        let reply = self.provider.complete(&conversation).await?;
        self.parser.parse(reply)
    }

    /// Run the chain for every input. Outputs are in input order; the first error aborts the batch.
    pub async fn batch(&self, inputs: &[Vars]) -> Result<Vec<O::Output>> {
        debug!("batching {} inputs through {} (max concurrency {})", inputs.len(), self.provider.name(), self.max_concurrency);
        stream::iter(inputs.iter().map(|vars| self.invoke(vars)))
            .buffered(self.max_concurrency)
            .try_collect()
            .await
    }
}

impl<O: ParseOutput<Output=String> + Sync> Chain<O> {
    /// Stream the reply. Each chunk goes through the parser on its own.
    pub fn stream(&self, vars: &Vars) -> BoxStream<'_, Result<String>> {
        match self.prompt.format(vars) {
            Ok(conversation) => {
                debug!("streaming from {}", self.provider.name());
                self.provider
                    .stream(conversation)
                    .and_then(move |chunk| future::ready(self.parser.parse(chunk)))
                    .boxed()
            }
            Err(err) => stream::once(future::ready(Err(err))).boxed(),
        }
    }
}
