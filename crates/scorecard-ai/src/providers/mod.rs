//! Hosted language-model backends and the fallback manager that fronts them.

mod gemini;
mod manager;
mod openai;
mod retry;

pub use gemini::GeminiProvider;
pub use manager::{ProviderManager, ReportDraft};
pub use openai::{AvailabilityProbe, OpenAiCompatibleProvider};
pub use retry::RetryPolicy;

use crate::config::ProvidersConfig;
use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

pub(crate) const TEMPERATURE: f64 = 0.7;
pub(crate) const REPORT_MAX_TOKENS: u32 = 4000;
pub(crate) const QUESTION_MAX_TOKENS: u32 = 1500;
pub(crate) const GEMINI_QUESTION_MAX_TOKENS: u32 = 2048;
const ERROR_BODY_LIMIT: usize = 500;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ProviderKind {
    OpenAi,
    Gemini,
    Groq,
    Pollinations,
}

impl ProviderKind {
    pub const fn label(self) -> &'static str {
        match self {
            ProviderKind::OpenAi => "OpenAI",
            ProviderKind::Gemini => "Google Gemini",
            ProviderKind::Groq => "Groq",
            ProviderKind::Pollinations => "Pollinations",
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A chat-completion style backend able to write reports and propose questions.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    fn kind(&self) -> ProviderKind;

    fn name(&self) -> &'static str {
        self.kind().label()
    }

    /// Cheap reachability probe; never errors, an unreachable backend is simply unavailable.
    async fn is_available(&self) -> bool;

    /// Free-form markdown completion.
    async fn generate_report(&self, system: &str, user: &str) -> Result<String, ProviderError>;

    /// JSON-mode completion; the caller validates the shape.
    async fn generate_next_question(&self, system: &str, user: &str)
        -> Result<Value, ProviderError>;
}

/// One failed attempt recorded while walking the fallback chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderFailure {
    pub provider: ProviderKind,
    pub reason: String,
}

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("{provider} is not available")]
    Unavailable { provider: ProviderKind },
    #[error("no {purpose} provider is configured")]
    NotConfigured { purpose: &'static str },
    #[error("{provider} API error: {status} {body}")]
    Http {
        provider: ProviderKind,
        status: u16,
        body: String,
    },
    #[error("{provider} request failed: {source}")]
    Transport {
        provider: ProviderKind,
        #[source]
        source: reqwest::Error,
    },
    #[error("{provider} did not answer within {}s", .timeout.as_secs())]
    Timeout {
        provider: ProviderKind,
        timeout: Duration,
    },
    #[error("invalid response format: received HTML instead of JSON from {provider}")]
    HtmlPayload { provider: ProviderKind },
    #[error("unexpected response structure from {provider}: {detail}")]
    MalformedResponse {
        provider: ProviderKind,
        detail: String,
    },
    #[error("invalid question from provider: {0}")]
    Validation(#[from] ValidationError),
    #[error("all AI providers failed to generate a report: {}", summarize(.failures))]
    Exhausted { failures: Vec<ProviderFailure> },
}

impl ProviderError {
    pub(crate) fn transport(provider: ProviderKind, timeout: Duration, source: reqwest::Error) -> Self {
        if source.is_timeout() {
            ProviderError::Timeout { provider, timeout }
        } else {
            ProviderError::Transport { provider, source }
        }
    }

    pub(crate) fn http(provider: ProviderKind, status: u16, body: &str) -> Self {
        ProviderError::Http {
            provider,
            status,
            body: body.chars().take(ERROR_BODY_LIMIT).collect(),
        }
    }
}

fn summarize(failures: &[ProviderFailure]) -> String {
    if failures.is_empty() {
        return "no providers configured".to_string();
    }
    failures
        .iter()
        .map(|failure| format!("{}: {}", failure.provider, failure.reason))
        .collect::<Vec<_>>()
        .join("; ")
}

/// Shape problems in a generated question.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("response is not a JSON object")]
    NotAnObject,
    #[error("questionText is missing or not a string")]
    MissingQuestionText,
    #[error("answerType is missing or not a string")]
    MissingAnswerType,
    #[error("answerType '{0}' is not one of text, radio, checkbox, scale")]
    UnknownAnswerType(String),
    #[error("options must be a list of strings")]
    InvalidOptions,
}

/// Rejects HTML error pages served with a 200.
pub(crate) fn looks_like_html(content: &str) -> bool {
    let trimmed = content.trim_start();
    trimmed.starts_with("<!DOCTYPE") || trimmed.starts_with("<html")
}

/// Builds the provider chain from configuration: OpenAI for questions, then
/// OpenAI and Gemini (plus optional Groq and Pollinations) for reports.
pub fn manager_from_config(config: &ProvidersConfig) -> Result<ProviderManager, ProviderError> {
    let timeout = config.request_timeout;

    let question: Option<Arc<dyn LlmProvider>> = match &config.openai.api_key {
        Some(_) => Some(Arc::new(OpenAiCompatibleProvider::openai(&config.openai, timeout)?)),
        None => None,
    };

    let mut report_chain: Vec<Arc<dyn LlmProvider>> = Vec::new();
    if let Some(openai) = &question {
        report_chain.push(Arc::clone(openai));
    }
    if config.google.is_configured() {
        report_chain.push(Arc::new(GeminiProvider::new(&config.google, timeout)?));
    }
    if config.groq.is_configured() {
        report_chain.push(Arc::new(OpenAiCompatibleProvider::groq(&config.groq, timeout)?));
    }
    if config.pollinations.enabled {
        report_chain.push(Arc::new(OpenAiCompatibleProvider::pollinations(
            &config.pollinations,
            timeout,
        )?));
    }

    Ok(ProviderManager::new(question, report_chain))
}

pub(crate) fn http_client(
    provider: ProviderKind,
    timeout: Duration,
) -> Result<reqwest::Client, ProviderError> {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|source| ProviderError::Transport { provider, source })
}
