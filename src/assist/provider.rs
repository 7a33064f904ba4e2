//! Text-generation backends for the assistant.

use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::config::AssistBackend;

#[async_trait]
pub trait LLMProvider: Send + Sync {
    async fn generate(&self, model: &str, prompt: String, system: Option<String>) -> Result<String>;
}

/// Pick the backend named in the configuration, `None` when assist is off.
pub fn build_provider(backend: &AssistBackend) -> Option<Arc<dyn LLMProvider>> {
    match backend {
        AssistBackend::Disabled => None,
        AssistBackend::Ollama => Some(Arc::new(OllamaProvider::default())),
        AssistBackend::OpenAICompatible { base_url, api_key } => Some(Arc::new(
            OpenAICompatibleProvider::new(base_url.clone(), api_key.clone()),
        )),
    }
}

/// Local Ollama daemon
pub struct OllamaProvider {
    client: ollama_rs::Ollama,
}

impl OllamaProvider {
    pub fn new(client: ollama_rs::Ollama) -> Self {
        Self { client }
    }
}

impl Default for OllamaProvider {
    fn default() -> Self {
        Self::new(ollama_rs::Ollama::default())
    }
}

#[async_trait]
impl LLMProvider for OllamaProvider {
    async fn generate(&self, model: &str, prompt: String, system: Option<String>) -> Result<String> {
        use ollama_rs::generation::chat::{request::ChatMessageRequest, ChatMessage};

        let messages: Vec<ChatMessage> = system
            .map(ChatMessage::system)
            .into_iter()
            .chain(std::iter::once(ChatMessage::user(prompt)))
            .collect();

        let res = self
            .client
            .send_chat_messages(ChatMessageRequest::new(model.to_string(), messages))
            .await
            .context("Ollama chat request failed")?;

        Ok(res.message.content)
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatTurn>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Serialize, Deserialize)]
struct ChatTurn {
    role: String,
    content: String,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatTurn,
}

/// Any `/chat/completions` endpoint (OpenAI, vLLM, llama.cpp server, ...)
pub struct OpenAICompatibleProvider {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl OpenAICompatibleProvider {
    pub fn new(base_url: String, api_key: Option<String>) -> Self {
        Self {
            client: Client::new(),
            base_url,
            api_key,
        }
    }
}

#[async_trait]
impl LLMProvider for OpenAICompatibleProvider {
    async fn generate(&self, model: &str, prompt: String, system: Option<String>) -> Result<String> {
        let messages = system
            .map(|content| ChatTurn { role: "system".into(), content })
            .into_iter()
            .chain(std::iter::once(ChatTurn { role: "user".into(), content: prompt }))
            .collect();

        // Observations are two sentences at most
        let body = ChatRequest {
            model,
            messages,
            temperature: 0.3,
            max_tokens: 200,
        };

        let mut request = self
            .client
            .post(format!("{}/chat/completions", self.base_url.trim_end_matches('/')))
            .json(&body);

        if let Some(ref key) = self.api_key {
            request = request.bearer_auth(key);
        }

        let res: ChatResponse = request
            .send()
            .await
            .context("Completion request failed")?
            .error_for_status()
            .context("Completion endpoint returned an error status")?
            .json()
            .await
            .context("Failed to decode completion response")?;

        res.choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .context("Completion response had no choices")
    }
}
