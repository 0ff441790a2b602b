use crate::store::HistoryStore;
use crate::HistoryError;
use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, info};

pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";
const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

const PROMPT_HISTORY_ITEMS: usize = 10;

const SUMMARIZE_PROMPT: &str = "Summarize these copied items in a few sentences.";

#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, HistoryError>;
}

pub struct GenAiClient {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl GenAiClient {
    pub fn new(api_key: String, model: String) -> Result<Self, HistoryError> {
        if api_key.trim().is_empty() {
            return Err(HistoryError::ConfigError("API key not set".to_string()));
        }
        Ok(GenAiClient {
            client: Client::new(),
            api_key,
            model,
            base_url: DEFAULT_BASE_URL.to_owned(),
        })
    }

    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_owned();
        self
    }
}

#[async_trait]
impl TextGenerator for GenAiClient {
    async fn generate(&self, prompt: &str) -> Result<String, HistoryError> {
        let url = format!("{}/models/{}:generateContent", self.base_url, self.model);

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&serde_json::json!({
                "contents": [{
                    "parts": [{ "text": prompt }]
                }]
            }))
            .send()
            .await
            .map_err(|e| HistoryError::AIError(format!("Failed to send request: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(HistoryError::AIError(format!(
                "Request failed with status {}",
                status
            )));
        }

        let response_json: serde_json::Value = response
            .json()
            .await
            .map_err(|e| HistoryError::AIError(format!("Failed to parse response: {}", e)))?;

        let content = response_json["candidates"][0]["content"]["parts"][0]["text"]
            .as_str()
            .unwrap_or("No response")
            .to_string();

        Ok(content)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AiExchange {
    pub input: String,
    pub output: String,
}

pub struct HistoryAi<G: TextGenerator> {
    generator: G,
    loading: bool,
    last_response: Option<AiExchange>,
    last_error: Option<String>,
}

impl<G: TextGenerator> HistoryAi<G> {
    pub fn new(generator: G) -> Self {
        HistoryAi {
            generator,
            loading: false,
            last_response: None,
            last_error: None,
        }
    }

    pub fn loading(&self) -> bool {
        self.loading
    }

    pub fn last_response(&self) -> Option<&AiExchange> {
        self.last_response.as_ref()
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub async fn analyze(
        &mut self,
        store: &HistoryStore,
        prompt: &str,
    ) -> Result<AiExchange, HistoryError> {
        self.loading = true;
        self.last_error = None;

        let full_prompt = compose_prompt(store, prompt);
        debug!("Sending prompt of {} chars", full_prompt.len());

        let result = self.generator.generate(&full_prompt).await;
        self.loading = false;

        match result {
            Ok(output) => {
                info!("Received AI response of {} chars", output.len());
                let exchange = AiExchange {
                    input: full_prompt,
                    output,
                };
                self.last_response = Some(exchange.clone());
                Ok(exchange)
            }
            Err(e) => {
                self.last_error = Some(e.to_string());
                Err(e)
            }
        }
    }

    pub async fn summarize(&mut self, store: &HistoryStore) -> Result<AiExchange, HistoryError> {
        self.analyze(store, SUMMARIZE_PROMPT).await
    }

    pub async fn find_related(
        &mut self,
        store: &HistoryStore,
        query: &str,
    ) -> Result<AiExchange, HistoryError> {
        let prompt = format!("Find and explain items related to: {}", query);
        self.analyze(store, &prompt).await
    }
}

fn compose_prompt(store: &HistoryStore, prompt: &str) -> String {
    let history_text = store
        .history()
        .iter()
        .take(PROMPT_HISTORY_ITEMS)
        .enumerate()
        .map(|(i, item)| format!("{}. {}", i + 1, item.text))
        .collect::<Vec<_>>()
        .join("\n\n");

    format!(
        "Here is my recent clipboard history:\n\n{}\n\n{}",
        history_text, prompt
    )
}
