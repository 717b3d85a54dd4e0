//! Adapter for any OpenAI-compatible chat-completions endpoint.
//!
//! One implementation covers OpenAI, Ollama, and the various hosted
//! proxies that speak the same wire format, selected by base URL.
//! The API key is wrapped in [`secrecy::SecretString`] and is never logged.

use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use roundtable_core::model::ModelAdapter;
use roundtable_types::config::ModelConfig;
use roundtable_types::model::{ModelError, ModelRequest};

/// HTTP model adapter for OpenAI-compatible APIs.
///
/// Intentionally does NOT derive Debug so the API key inside cannot be
/// printed by accident.
pub struct OpenAiCompatAdapter {
    client: reqwest::Client,
    api_key: SecretString,
    base_url: String,
    default_model: String,
}

impl OpenAiCompatAdapter {
    pub fn new(
        api_key: SecretString,
        base_url: impl Into<String>,
        default_model: impl Into<String>,
        timeout: Duration,
    ) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .expect("failed to create reqwest client");

        Self {
            client,
            api_key,
            base_url: base_url.into(),
            default_model: default_model.into(),
        }
    }

    /// Build an adapter from the model section of the global config.
    /// The API key is read from the configured environment variable and
    /// may be absent (local endpoints often need none).
    pub fn from_config(config: &ModelConfig) -> Self {
        let api_key = SecretString::from(std::env::var(&config.api_key_env).unwrap_or_default());
        Self::new(
            api_key,
            config.base_url.clone(),
            config.default_model.clone(),
            Duration::from_secs(config.timeout_secs),
        )
    }

    /// Override the base URL (useful for testing or proxies).
    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url;
        self
    }

    async fn call_once(&self, body: &ChatCompletionsRequest<'_>) -> Result<String, ModelError> {
        let url = format!("{}/chat/completions", self.base_url.trim_end_matches('/'));

        let mut request = self.client.post(&url).json(body);
        let key = self.api_key.expose_secret();
        if !key.is_empty() {
            request = request.bearer_auth(key);
        }

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                ModelError::Timeout
            } else {
                ModelError::Transport(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(ModelError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: ChatCompletionsResponse = response
            .json()
            .await
            .map_err(|e| ModelError::Deserialization(e.to_string()))?;

        let text = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .unwrap_or_default();
        if text.trim().is_empty() {
            return Err(ModelError::EmptyResponse);
        }
        Ok(text)
    }
}

impl ModelAdapter for OpenAiCompatAdapter {
    fn name(&self) -> &str {
        "openai-compat"
    }

    async fn call(&self, request: &ModelRequest) -> Result<String, ModelError> {
        let model = if request.model.is_empty() {
            self.default_model.as_str()
        } else {
            request.model.as_str()
        };
        let body = ChatCompletionsRequest {
            model,
            messages: request
                .turns
                .iter()
                .map(|t| WireMessage {
                    role: t.role.to_string(),
                    content: &t.content,
                })
                .collect(),
        };

        // Retry once on transport-level failures; API rejections are
        // returned as-is.
        match self.call_once(&body).await {
            Ok(text) => Ok(text),
            Err(ModelError::Transport(first)) => {
                tracing::warn!(error = %first, "model call failed, retrying once");
                self.call_once(&body).await
            }
            Err(other) => Err(other),
        }
    }
}

#[derive(Serialize)]
struct ChatCompletionsRequest<'a> {
    model: &'a str,
    messages: Vec<WireMessage<'a>>,
}

#[derive(Serialize)]
struct WireMessage<'a> {
    role: String,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatCompletionsResponse {
    choices: Vec<WireChoice>,
}

#[derive(Deserialize)]
struct WireChoice {
    message: WireResponseMessage,
}

#[derive(Deserialize)]
struct WireResponseMessage {
    content: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use roundtable_types::model::ChatTurn;

    fn adapter() -> OpenAiCompatAdapter {
        OpenAiCompatAdapter::new(
            SecretString::from("test-key-not-real"),
            "http://127.0.0.1:1",
            "test-model",
            Duration::from_millis(200),
        )
    }

    #[test]
    fn test_name() {
        assert_eq!(ModelAdapter::name(&adapter()), "openai-compat");
    }

    #[test]
    fn test_request_serialization_shape() {
        let body = ChatCompletionsRequest {
            model: "m",
            messages: vec![WireMessage {
                role: "user".to_string(),
                content: "hi",
            }],
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["model"], "m");
        assert_eq!(json["messages"][0]["role"], "user");
        assert_eq!(json["messages"][0]["content"], "hi");
    }

    #[test]
    fn test_response_parses_missing_content() {
        let parsed: ChatCompletionsResponse =
            serde_json::from_str(r#"{"choices":[{"message":{"role":"assistant"}}]}"#).unwrap();
        assert!(parsed.choices[0].message.content.is_none());
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_transport_error() {
        let request = ModelRequest {
            model: String::new(),
            turns: vec![ChatTurn::user("hi")],
        };
        let err = adapter().call(&request).await.unwrap_err();
        assert!(matches!(err, ModelError::Transport(_) | ModelError::Timeout));
    }
}
