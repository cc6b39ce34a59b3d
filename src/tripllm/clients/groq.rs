use crate::client_wrapper::{ClientError, ClientWrapper, Message, TokenUsage};
use crate::clients::openai_compatible::OpenAICompatibleClient;
use async_trait::async_trait;
use std::sync::Mutex;

/// Groq's OpenAI compatible API root.
pub const GROQ_BASE_URL: &str = "https://api.groq.com/openai/v1";

pub struct GroqClient {
    client: OpenAICompatibleClient,
}

// Models served by Groq that the planner has been run against
#[allow(non_camel_case_types)]
pub enum Model {
    Llama3_8b8192,  // $0.20 per 1k tokens in the planner's price table
    Llama3_70b8192,
    Llama31_8bInstant,
    Gemma2_9bIt,
}

pub fn model_to_string(model: Model) -> String {
    match model {
        Model::Llama3_8b8192 => "llama3-8b-8192".to_string(),
        Model::Llama3_70b8192 => "llama3-70b-8192".to_string(),
        Model::Llama31_8bInstant => "llama-3.1-8b-instant".to_string(),
        Model::Gemma2_9bIt => "gemma2-9b-it".to_string(),
    }
}

impl GroqClient {
    pub fn new_with_model_enum(secret_key: &str, model: Model) -> Self {
        Self::new_with_model_str(secret_key, &model_to_string(model))
    }

    pub fn new_with_model_str(secret_key: &str, model_name: &str) -> Self {
        Self::new_with_base_url(secret_key, model_name, GROQ_BASE_URL)
    }

    /// Point the client at another OpenAI compatible root, e.g. a proxy or a local mock.
    pub fn new_with_base_url(secret_key: &str, model_name: &str, base_url: &str) -> Self {
        GroqClient {
            client: OpenAICompatibleClient::new(secret_key, model_name, base_url),
        }
    }

    pub fn base_url(&self) -> &str {
        self.client.base_url()
    }
}

#[async_trait]
impl ClientWrapper for GroqClient {
    async fn send_message(&self, messages: &[Message]) -> Result<Message, ClientError> {
        self.client.send_message(messages).await
    }

    fn model_name(&self) -> &str {
        self.client.model_name()
    }

    fn usage_slot(&self) -> Option<&Mutex<Option<TokenUsage>>> {
        self.client.usage_slot()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_groq_endpoint() {
        let client = GroqClient::new_with_model_enum("gsk-test", Model::Llama3_8b8192);
        assert_eq!(client.base_url(), GROQ_BASE_URL);
        assert_eq!(client.model_name(), "llama3-8b-8192");
        assert!(client.get_last_usage().is_none());
    }
}
