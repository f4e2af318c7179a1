use super::{
    http_client, looks_like_html, LlmProvider, ProviderError, ProviderKind,
    GEMINI_QUESTION_MAX_TOKENS, REPORT_MAX_TOKENS, TEMPERATURE,
};
use crate::config::ProviderSettings;
use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};

static JSON_OBJECT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{[\s\S]*\}").expect("valid json object pattern"));

#[derive(Serialize)]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct GeminiContent {
    role: &'static str,
    parts: Vec<GeminiPart>,
}

#[derive(Serialize)]
struct GeminiPart {
    text: String,
}

#[derive(Serialize)]
struct GenerationConfig {
    temperature: f64,
    #[serde(rename = "maxOutputTokens")]
    max_output_tokens: u32,
}

#[derive(Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
}

#[derive(Deserialize)]
struct GeminiCandidate {
    content: Option<GeminiCandidateContent>,
}

#[derive(Deserialize)]
struct GeminiCandidateContent {
    #[serde(default)]
    parts: Vec<GeminiCandidatePart>,
}

#[derive(Deserialize)]
struct GeminiCandidatePart {
    #[serde(default)]
    text: Option<String>,
}

/// Google Generative Language API. Has no system role, so both prompts travel in one user turn.
pub struct GeminiProvider {
    http: reqwest::Client,
    api_key: Option<String>,
    model: String,
    base_url: String,
    timeout: Duration,
}

impl GeminiProvider {
    pub fn new(settings: &ProviderSettings, timeout: Duration) -> Result<Self, ProviderError> {
        Ok(Self {
            http: http_client(ProviderKind::Gemini, timeout)?,
            api_key: settings.api_key.clone(),
            model: settings.model.trim().to_string(),
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            timeout,
        })
    }

    fn api_key(&self) -> Result<&str, ProviderError> {
        self.api_key
            .as_deref()
            .ok_or(ProviderError::NotConfigured {
                purpose: "Google Gemini",
            })
    }

    async fn generate(
        &self,
        system: &str,
        user: &str,
        max_output_tokens: u32,
    ) -> Result<String, ProviderError> {
        let key = self.api_key()?;
        let url = format!("{}/{}:generateContent", self.base_url, self.model);
        let body = GeminiRequest {
            contents: vec![GeminiContent {
                role: "user",
                parts: vec![GeminiPart {
                    text: format!("{system}\n\n{user}"),
                }],
            }],
            generation_config: GenerationConfig {
                temperature: TEMPERATURE,
                max_output_tokens,
            },
        };

        let response = self
            .http
            .post(&url)
            .query(&[("key", key)])
            .json(&body)
            .send()
            .await
            .map_err(|err| ProviderError::transport(ProviderKind::Gemini, self.timeout, err))?;

        let status = response.status();
        let raw = response
            .text()
            .await
            .map_err(|err| ProviderError::transport(ProviderKind::Gemini, self.timeout, err))?;
        if !status.is_success() {
            return Err(ProviderError::http(ProviderKind::Gemini, status.as_u16(), &raw));
        }
        if looks_like_html(&raw) {
            return Err(ProviderError::HtmlPayload {
                provider: ProviderKind::Gemini,
            });
        }

        let parsed: GeminiResponse =
            serde_json::from_str(&raw).map_err(|err| ProviderError::MalformedResponse {
                provider: ProviderKind::Gemini,
                detail: err.to_string(),
            })?;

        parsed
            .candidates
            .into_iter()
            .next()
            .and_then(|candidate| candidate.content)
            .and_then(|content| content.parts.into_iter().find_map(|part| part.text))
            .ok_or_else(|| ProviderError::MalformedResponse {
                provider: ProviderKind::Gemini,
                detail: "response has no candidate text".to_string(),
            })
    }
}

/// Gemini ignores JSON mode, so replies may arrive fenced or wrapped in prose.
pub(crate) fn extract_json(text: &str) -> Option<Value> {
    let trimmed = text.trim();
    let unfenced = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .map(|rest| rest.trim_end().trim_end_matches("```").trim())
        .unwrap_or(trimmed);

    if let Ok(value) = serde_json::from_str::<Value>(unfenced) {
        return Some(value);
    }

    JSON_OBJECT
        .find(trimmed)
        .and_then(|found| serde_json::from_str(found.as_str()).ok())
}

#[async_trait]
impl LlmProvider for GeminiProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Gemini
    }

    async fn is_available(&self) -> bool {
        let Some(key) = self.api_key.as_deref() else {
            return false;
        };
        let url = format!("{}/{}", self.base_url, self.model);
        match self.http.get(&url).query(&[("key", key)]).send().await {
            Ok(response) if response.status().is_success() => true,
            Ok(response) => {
                warn!(status = response.status().as_u16(), "gemini availability check failed");
                false
            }
            Err(err) => {
                warn!(error = %err, "gemini availability check failed");
                false
            }
        }
    }

    async fn generate_report(&self, system: &str, user: &str) -> Result<String, ProviderError> {
        debug!("requesting gemini report completion");
        self.generate(system, user, REPORT_MAX_TOKENS).await
    }

    async fn generate_next_question(
        &self,
        system: &str,
        user: &str,
    ) -> Result<Value, ProviderError> {
        let text = self
            .generate(system, user, GEMINI_QUESTION_MAX_TOKENS)
            .await?;
        extract_json(&text).ok_or_else(|| ProviderError::MalformedResponse {
            provider: ProviderKind::Gemini,
            detail: "no JSON object in question reply".to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httptest::{matchers::*, responders::*, Expectation, Server};
    use serde_json::json;

    fn provider_for(server: &Server) -> GeminiProvider {
        let settings = ProviderSettings {
            api_key: Some("g-key".to_string()),
            model: "gemini-2.0-flash".to_string(),
            base_url: server.url_str("/v1beta/models"),
        };
        GeminiProvider::new(&settings, Duration::from_secs(5)).expect("client builds")
    }

    #[test]
    fn extracts_fenced_and_embedded_json() {
        let fenced = "```json\n{\"questionText\":\"Q\",\"answerType\":\"radio\"}\n```";
        assert_eq!(
            extract_json(fenced),
            Some(json!({ "questionText": "Q", "answerType": "radio" }))
        );

        let embedded = "Here you go: {\"questionText\":\"Q2\"} hope it helps";
        assert_eq!(extract_json(embedded), Some(json!({ "questionText": "Q2" })));

        assert_eq!(extract_json("no json here"), None);
    }

    #[tokio::test]
    async fn report_joins_prompts_into_one_user_turn() {
        let server = Server::run();
        server.expect(
            Expectation::matching(all_of![
                request::method_path("POST", "/v1beta/models/gemini-2.0-flash:generateContent"),
                request::query(url_decoded(contains(("key", "g-key")))),
                request::body(json_decoded(eq(json!({
                    "contents": [{ "role": "user", "parts": [{ "text": "sys\n\nusr" }] }],
                    "generationConfig": { "temperature": 0.7, "maxOutputTokens": 4000 }
                })))),
            ])
            .respond_with(json_encoded(json!({
                "candidates": [{ "content": { "parts": [{ "text": "## Overall Tier: Enabler" }] } }]
            }))),
        );

        let report = provider_for(&server)
            .generate_report("sys", "usr")
            .await
            .expect("report generated");
        assert_eq!(report, "## Overall Tier: Enabler");
    }

    #[tokio::test]
    async fn error_status_maps_to_http_error() {
        let server = Server::run();
        server.expect(
            Expectation::matching(request::method("POST"))
                .respond_with(status_code(403).body("forbidden")),
        );

        let err = provider_for(&server)
            .generate_report("sys", "usr")
            .await
            .expect_err("forbidden surfaces");
        match err {
            ProviderError::Http { status, body, .. } => {
                assert_eq!(status, 403);
                assert_eq!(body, "forbidden");
            }
            other => panic!("expected http error, got {other:?}"),
        }
    }
}
