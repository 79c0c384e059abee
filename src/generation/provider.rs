use async_trait::async_trait;
use genai::Client;
use genai::chat::{ChatMessage, ChatOptions, ChatRequest};
use tracing::debug;

use super::{GenerationRequest, GeneratorError, TextGenerator};

/// Multi-provider chat client; the model name selects the backend (Ollama, OpenAI, ...).
#[derive(Clone)]
pub struct GenaiGenerator {
    client: Client,
    model: String,
}

impl std::fmt::Debug for GenaiGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GenaiGenerator")
            .field("model", &self.model)
            .finish()
    }
}

impl GenaiGenerator {
    pub fn new(model: impl Into<String>) -> Self {
        Self::with_client(Client::default(), model)
    }

    pub fn with_client(client: Client, model: impl Into<String>) -> Self {
        Self {
            client,
            model: model.into(),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl TextGenerator for GenaiGenerator {
    fn name(&self) -> &str {
        &self.model
    }

    async fn generate(&self, request: &GenerationRequest) -> Result<String, GeneratorError> {
        let chat_req = ChatRequest::new(vec![
            ChatMessage::system(request.system.clone()),
            ChatMessage::user(request.user.clone()),
        ]);

        let options = ChatOptions::default()
            .with_temperature(request.options.temperature)
            .with_top_p(request.options.top_p)
            .with_max_tokens(request.options.max_tokens);

        let resp = self
            .client
            .exec_chat(&self.model, chat_req, Some(&options))
            .await
            .map_err(|e| GeneratorError::Provider {
                message: e.to_string(),
            })?;

        let text = resp.first_text().unwrap_or_default().trim().to_string();
        debug!(model = %self.model, chars = text.len(), "Model call finished");

        if text.is_empty() {
            return Err(GeneratorError::EmptyResponse);
        }
        Ok(text)
    }
}
