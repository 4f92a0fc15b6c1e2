//! Chat completion through the OpenAI API.

use anyhow::Result;
use async_openai::config::OpenAIConfig;
use async_openai::error::OpenAIError;
use async_openai::types::{ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequest, CreateChatCompletionRequestArgs};
use async_openai::Client;
use async_trait::async_trait;
use futures::stream::{self, BoxStream, StreamExt, TryStreamExt};
use log::debug;
use url::Url;

use crate::config::DEFAULT_MODEL;
use crate::conversation::{Conversation, Role};
use crate::utils::llm::errors::EmptyCompletion;
use crate::utils::llm::CompletionProvider;

/// A live chat model.
#[derive(Clone, Debug)]
pub struct OpenAIChat {
    pub client: Client<OpenAIConfig>,
    pub model: String,
    pub temperature: f32,
}

impl OpenAIChat {
    /// Uses [DEFAULT_MODEL] at temperature 0.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_config(OpenAIConfig::new().with_api_key(api_key))
    }

    /// Like [OpenAIChat::new] but against another OpenAI-compatible endpoint.
    pub fn with_api_base(api_key: impl Into<String>, api_base: &Url) -> Self {
        let api_base = api_base.as_str().trim_end_matches('/');
        Self::with_config(OpenAIConfig::new().with_api_key(api_key).with_api_base(api_base))
    }

    fn with_config(config: OpenAIConfig) -> Self {
        Self {
            client: Client::with_config(config),
            model: DEFAULT_MODEL.to_string(),
            temperature: 0.0,
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    fn request(&self, conversation: &Conversation) -> Result<CreateChatCompletionRequest> {
        let messages = to_request_messages(conversation)?;
        let request = CreateChatCompletionRequestArgs::default()
            .model(self.model.as_str())
            .messages(messages)
            .temperature(self.temperature)
            .build()?;
        Ok(request)
    }
}

/// Convert a [Conversation] to OpenAI request messages. Human messages become user messages.
pub fn to_request_messages(conversation: &Conversation) -> Result<Vec<ChatCompletionRequestMessage>, OpenAIError> {
    conversation
        .messages()
        .iter()
        .map(|message| -> Result<ChatCompletionRequestMessage, OpenAIError> {
            let message = match message.role {
                Role::System => ChatCompletionRequestSystemMessageArgs::default()
                    .content(message.content.as_str())
                    .build()?
                    .into(),
                Role::Human => ChatCompletionRequestUserMessageArgs::default()
                    .content(message.content.as_str())
                    .build()?
                    .into(),
            };
            Ok(message)
        })
        .collect()
}

#[async_trait]
impl CompletionProvider for OpenAIChat {
    fn name(&self) -> &str {
        "openai"
    }

    async fn complete(&self, conversation: &Conversation) -> Result<String> {
        let request = self.request(conversation)?;
        debug!("requesting chat completion from model {}", self.model);
        let response = self.client.chat().create(request).await?;
        response.choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| EmptyCompletion { model: self.model.clone() }.into())
    }

    fn stream<'a>(&'a self, conversation: Conversation) -> BoxStream<'a, Result<String>> {
        let deltas = async move {
            let request = self.request(&conversation)?;
            debug!("streaming chat completion from model {}", self.model);
            let response_stream = self.client.chat().create_stream(request).await?;
            let deltas = response_stream
                .map_err(anyhow::Error::from)
                .try_filter_map(|response| async move {
                    let delta = response.choices
                        .into_iter()
                        .next()
                        .and_then(|choice| choice.delta.content)
                        .filter(|content| !content.is_empty());
                    Ok(delta)
                });
            Ok::<_, anyhow::Error>(deltas)
        };
        stream::once(deltas).try_flatten().boxed()
    }
}

#[cfg(test)]
mod test_openai {
    use async_openai::types::ChatCompletionRequestMessage;
    use url::Url;

    use super::{to_request_messages, OpenAIChat, DEFAULT_MODEL};
    use crate::conversation::{Conversation, Message};

    #[test]
    fn test_request_messages_keep_order_and_roles() {
        let conversation = Conversation::new(vec![Message::system("be brief"), Message::human("plan x")]);
        let messages = to_request_messages(&conversation).unwrap();
        assert_eq!(2, messages.len());
        assert!(matches!(messages[0], ChatCompletionRequestMessage::System(_)));
        assert!(matches!(messages[1], ChatCompletionRequestMessage::User(_)));
    }

    #[test]
    fn test_request_uses_model_settings() {
        let chat = OpenAIChat::new("sk-test").with_model("gpt-test").with_temperature(0.5);
        let request = chat.request(&Conversation::new(vec![Message::human("x")])).unwrap();
        assert_eq!("gpt-test", request.model);
        assert_eq!(Some(0.5), request.temperature);
        assert_eq!(DEFAULT_MODEL, OpenAIChat::new("sk-test").model);
    }

    #[test]
    fn test_api_base_accepted() {
        let base = Url::parse("http://localhost:8080/v1/").unwrap();
        let chat = OpenAIChat::with_api_base("sk-test", &base);
        assert_eq!(0.0, chat.temperature);
    }
}
