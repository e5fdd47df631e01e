//! Hosted chat-completions client for the financial assistant.
//!
//! Configuration comes from the environment; when the key is absent (or the
//! placeholder `later`), the client reports itself unconfigured and the
//! chatbot answers with its rule-based fallback instead.

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

/// One prior turn of the conversation, replayed to the model.
#[derive(Debug, Clone, Serialize)]
pub struct ChatTurn {
    pub role: String,
    pub content: String,
}

/// Connection settings for the hosted model deployment.
#[derive(Debug, Clone)]
pub struct ModelConfig {
    pub api_key: String,
    pub endpoint: String,
    pub api_version: String,
    pub deployment: String,
    pub temperature: f64,
}

impl ModelConfig {
    /// Read the model configuration from the environment. Returns `None`
    /// when `MODEL_API_KEY` is unset or still the `later` placeholder.
    pub fn from_env() -> Option<Self> {
        let api_key = std::env::var("MODEL_API_KEY").ok()?;
        if api_key.is_empty() || api_key == "later" {
            return None;
        }
        let endpoint = std::env::var("MODEL_URL").ok()?;

        Some(Self {
            api_key,
            endpoint,
            api_version: std::env::var("MODEL_API_VERSION")
                .unwrap_or_else(|_| "2024-12-01-preview".to_string()),
            deployment: std::env::var("MODEL_NAME").unwrap_or_else(|_| "gpt41".to_string()),
            temperature: std::env::var("MODEL_TEMPERATURE")
                .ok()
                .and_then(|value| value.parse().ok())
                .unwrap_or(0.1),
        })
    }
}

/// Client for the deployment's chat-completions endpoint.
pub struct ModelClient {
    http: reqwest::Client,
    config: Option<ModelConfig>,
}

impl ModelClient {
    pub fn from_env() -> Self {
        Self {
            http: reqwest::Client::new(),
            config: ModelConfig::from_env(),
        }
    }

    /// A client that always reports unconfigured; used in tests to pin the
    /// chatbot to its fallback path.
    pub fn unconfigured() -> Self {
        Self {
            http: reqwest::Client::new(),
            config: None,
        }
    }

    pub fn is_configured(&self) -> bool {
        self.config.is_some()
    }

    /// Send the system prompt plus conversation turns and return the
    /// assistant's text.
    pub async fn chat_complete(&self, system: &str, turns: &[ChatTurn]) -> Result<String> {
        let config = match &self.config {
            Some(config) => config,
            None => bail!("model client is not configured"),
        };

        #[derive(Serialize)]
        struct Msg<'a> {
            role: &'a str,
            content: &'a str,
        }

        #[derive(Serialize)]
        struct Req<'a> {
            messages: Vec<Msg<'a>>,
            temperature: f64,
            max_tokens: u32,
        }

        #[derive(Deserialize)]
        struct Resp {
            choices: Vec<Choice>,
        }

        #[derive(Deserialize)]
        struct Choice {
            message: RespMsg,
        }

        #[derive(Deserialize)]
        struct RespMsg {
            content: Option<String>,
        }

        let mut messages = vec![Msg {
            role: "system",
            content: system,
        }];
        messages.extend(turns.iter().map(|turn| Msg {
            role: turn.role.as_str(),
            content: turn.content.as_str(),
        }));

        let url = format!(
            "{}/openai/deployments/{}/chat/completions?api-version={}",
            config.endpoint.trim_end_matches('/'),
            config.deployment,
            config.api_version
        );

        let response = self
            .http
            .post(&url)
            .header("api-key", &config.api_key)
            .json(&Req {
                messages,
                temperature: config.temperature,
                max_tokens: 1000,
            })
            .send()
            .await
            .context("send chat completion request")?
            .error_for_status()
            .context("chat completion request rejected")?;

        let body: Resp = response
            .json()
            .await
            .context("decode chat completion response")?;

        match body.choices.into_iter().next().and_then(|c| c.message.content) {
            Some(content) => Ok(content),
            None => bail!("chat completion response contained no content"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unconfigured_client_reports_unconfigured() {
        assert!(!ModelClient::unconfigured().is_configured());
    }

    #[tokio::test]
    async fn unconfigured_client_refuses_to_call() {
        let client = ModelClient::unconfigured();
        let result = client.chat_complete("system", &[]).await;
        assert!(result.is_err());
    }
}
