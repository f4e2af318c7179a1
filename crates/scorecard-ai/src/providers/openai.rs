use super::retry::{send_with_retry, RetryPolicy};
use super::{
    http_client, looks_like_html, LlmProvider, ProviderError, ProviderKind, QUESTION_MAX_TOKENS,
    REPORT_MAX_TOKENS, TEMPERATURE,
};
use crate::config::{PollinationsSettings, ProviderSettings};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};

/// How a provider proves it is reachable before being used.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AvailabilityProbe {
    /// `GET` the model listing with the bearer key.
    ListModels { url: String },
    /// Tiny chat completion for keyless endpoints.
    Ping,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f64,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: Option<ChatChoiceMessage>,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    #[serde(default)]
    content: Value,
}

/// Any endpoint speaking the OpenAI chat-completions dialect (OpenAI, Groq, Pollinations).
pub struct OpenAiCompatibleProvider {
    kind: ProviderKind,
    http: reqwest::Client,
    api_key: Option<String>,
    model: String,
    chat_url: String,
    probe: AvailabilityProbe,
    retry: RetryPolicy,
    timeout: Duration,
}

impl OpenAiCompatibleProvider {
    pub fn new(
        kind: ProviderKind,
        api_key: Option<String>,
        model: impl Into<String>,
        chat_url: impl Into<String>,
        probe: AvailabilityProbe,
        timeout: Duration,
    ) -> Result<Self, ProviderError> {
        Ok(Self {
            kind,
            http: http_client(kind, timeout)?,
            api_key,
            model: model.into(),
            chat_url: chat_url.into(),
            probe,
            retry: RetryPolicy::NONE,
            timeout,
        })
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn openai(settings: &ProviderSettings, timeout: Duration) -> Result<Self, ProviderError> {
        Self::keyed(ProviderKind::OpenAi, settings, timeout)
    }

    pub fn groq(settings: &ProviderSettings, timeout: Duration) -> Result<Self, ProviderError> {
        Self::keyed(ProviderKind::Groq, settings, timeout)
    }

    /// Keyless public endpoint; the only provider that retries.
    pub fn pollinations(
        settings: &PollinationsSettings,
        timeout: Duration,
    ) -> Result<Self, ProviderError> {
        Ok(Self::new(
            ProviderKind::Pollinations,
            None,
            settings.model.clone(),
            settings.url.clone(),
            AvailabilityProbe::Ping,
            timeout,
        )?
        .with_retry(RetryPolicy::default()))
    }

    fn keyed(
        kind: ProviderKind,
        settings: &ProviderSettings,
        timeout: Duration,
    ) -> Result<Self, ProviderError> {
        let base = settings.base_url.trim_end_matches('/');
        Self::new(
            kind,
            settings.api_key.clone(),
            settings.model.clone(),
            format!("{base}/chat/completions"),
            AvailabilityProbe::ListModels {
                url: format!("{base}/models"),
            },
            timeout,
        )
    }

    fn authorized(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.api_key {
            Some(key) => builder.bearer_auth(key),
            None => builder,
        }
    }

    async fn chat(
        &self,
        system: &str,
        user: &str,
        max_tokens: u32,
        json_mode: bool,
    ) -> Result<Value, ProviderError> {
        let body = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: user,
                },
            ],
            temperature: TEMPERATURE,
            max_tokens,
            response_format: json_mode.then_some(ResponseFormat {
                kind: "json_object",
            }),
        };

        let response = send_with_retry(self.retry, self.kind, self.timeout, || {
            self.authorized(self.http.post(&self.chat_url)).json(&body)
        })
        .await?;

        let raw = response
            .text()
            .await
            .map_err(|err| ProviderError::transport(self.kind, self.timeout, err))?;
        if looks_like_html(&raw) {
            return Err(ProviderError::HtmlPayload {
                provider: self.kind,
            });
        }

        let parsed: ChatResponse =
            serde_json::from_str(&raw).map_err(|err| ProviderError::MalformedResponse {
                provider: self.kind,
                detail: err.to_string(),
            })?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message)
            .map(|message| message.content)
            .filter(|content| !content.is_null())
            .ok_or_else(|| ProviderError::MalformedResponse {
                provider: self.kind,
                detail: "response has no message content".to_string(),
            })
    }
}

#[async_trait]
impl LlmProvider for OpenAiCompatibleProvider {
    fn kind(&self) -> ProviderKind {
        self.kind
    }

    async fn is_available(&self) -> bool {
        let outcome = match &self.probe {
            AvailabilityProbe::ListModels { url } => {
                if self.api_key.is_none() {
                    return false;
                }
                self.authorized(self.http.get(url)).send().await
            }
            AvailabilityProbe::Ping => {
                let body = ChatRequest {
                    model: &self.model,
                    messages: vec![ChatMessage {
                        role: "user",
                        content: "ping",
                    }],
                    temperature: TEMPERATURE,
                    max_tokens: 5,
                    response_format: None,
                };
                self.http.post(&self.chat_url).json(&body).send().await
            }
        };

        match outcome {
            Ok(response) if response.status().is_success() => true,
            Ok(response) => {
                warn!(provider = %self.kind, status = response.status().as_u16(), "availability check failed");
                false
            }
            Err(err) => {
                warn!(provider = %self.kind, error = %err, "availability check failed");
                false
            }
        }
    }

    async fn generate_report(&self, system: &str, user: &str) -> Result<String, ProviderError> {
        debug!(provider = %self.kind, "requesting report completion");
        match self.chat(system, user, REPORT_MAX_TOKENS, false).await? {
            Value::String(text) if looks_like_html(&text) => Err(ProviderError::HtmlPayload {
                provider: self.kind,
            }),
            Value::String(text) => Ok(text),
            other => Ok(other.to_string()),
        }
    }

    async fn generate_next_question(
        &self,
        system: &str,
        user: &str,
    ) -> Result<Value, ProviderError> {
        debug!(provider = %self.kind, "requesting question completion");
        match self.chat(system, user, QUESTION_MAX_TOKENS, true).await? {
            Value::String(text) => {
                if looks_like_html(&text) {
                    return Err(ProviderError::HtmlPayload {
                        provider: self.kind,
                    });
                }
                serde_json::from_str(text.trim()).map_err(|err| {
                    ProviderError::MalformedResponse {
                        provider: self.kind,
                        detail: format!("question content is not JSON: {err}"),
                    }
                })
            }
            other => Ok(other),
        }
    }
}
