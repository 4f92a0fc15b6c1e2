//! Completion providers: anything that turns a [Conversation] into text.

use anyhow::Result;
use async_trait::async_trait;
use futures::stream::{self, BoxStream, StreamExt};

use crate::conversation::Conversation;

pub mod fallback;
#[cfg(feature = "openai")]
pub mod openai;

/// A component that completes a conversation with a text reply.
///
/// Implementors only have to provide [complete](CompletionProvider::complete). Providers that can
/// produce a reply incrementally should also override [stream](CompletionProvider::stream).
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &str;

    async fn complete(&self, conversation: &Conversation) -> Result<String>;

    /// Stream the reply in one or more chunks whose concatenation is the full reply.
    ///
    /// The default yields exactly once with the result of [complete](CompletionProvider::complete).
    fn stream<'a>(&'a self, conversation: Conversation) -> BoxStream<'a, Result<String>> {
        stream::once(async move { self.complete(&conversation).await }).boxed()
    }
}

pub mod errors {
    use std::error::Error;
    use std::fmt;
    use std::fmt::Formatter;

    /// Error when the configured provider was not compiled into this build.
    #[derive(Debug, Clone)]
    pub struct ProviderUnavailable {
        pub provider: String,
        pub feature: String,
    }

    impl fmt::Display for ProviderUnavailable {
        fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
            write!(f, "ProviderUnavailable: provider {} requires the `{}` feature", self.provider, self.feature)
        }
    }

    impl Error for ProviderUnavailable {}

    /// Error when a model answered without any text.
    #[derive(Debug, Clone)]
    pub struct EmptyCompletion {
        pub model: String,
    }

    impl fmt::Display for EmptyCompletion {
        fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
            write!(f, "EmptyCompletion: model {} returned no content", self.model)
        }
    }

    impl Error for EmptyCompletion {}
}
