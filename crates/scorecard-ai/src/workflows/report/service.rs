use std::sync::Arc;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use thiserror::Error;
use tracing::{info, warn};

use super::prompt::{company_name, ReportAudience, ReportPrompt};
use super::sanitizer::ReportSanitizer;
use crate::providers::{ProviderError, ProviderManager};
use crate::workflows::assessment::{AnsweredQuestion, KeyFindings, ScoreOutcome, ScoringEngine};

pub const RESULTS_GENERATED: &str = "resultsGenerated";
const UNKNOWN_TIER: &str = "N/A";

static TIER_HEADING: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"## Overall Tier:\s*(.+)").expect("valid tier heading pattern"));

static FINAL_SCORE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)Final Score:\s*(\d+)(?:/(\d+))?").expect("valid final score pattern")
});

/// What the caller knows when asking for a report.
#[derive(Debug, Clone, Copy)]
pub struct ReportRequest<'a> {
    pub history: &'a [AnsweredQuestion],
    pub industry: &'a str,
    pub user_name: Option<&'a str>,
}

/// Sanitized report plus the metadata the client renders alongside it.
#[derive(Debug, Clone, Serialize)]
pub struct ReportOutcome {
    #[serde(rename = "reportMarkdown")]
    pub report_markdown: String,
    #[serde(rename = "userAITier")]
    pub user_ai_tier: String,
    #[serde(rename = "finalScore")]
    pub final_score: u32,
    #[serde(rename = "companyName")]
    pub company_name: Option<String>,
    #[serde(rename = "systemPromptUsed")]
    pub system_prompt_used: String,
    pub status: &'static str,
    #[serde(rename = "providerUsed")]
    pub provider_used: String,
    #[serde(rename = "keyFindings")]
    pub key_findings: KeyFindings,
    #[serde(skip)]
    pub score: ScoreOutcome,
}

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("failed to build report prompt: {0}")]
    Prompt(#[from] serde_json::Error),
    #[error("Failed to generate report: {0}")]
    Generation(#[from] ProviderError),
}

/// Scores the history, asks the provider chain for a report, and cleans the result.
pub struct ReportService {
    providers: Arc<ProviderManager>,
    engine: ScoringEngine,
    sanitizer: ReportSanitizer,
}

impl ReportService {
    pub fn new(providers: Arc<ProviderManager>, engine: ScoringEngine) -> Self {
        Self {
            providers,
            engine,
            sanitizer: ReportSanitizer::new(),
        }
    }

    pub async fn generate(&self, request: ReportRequest<'_>) -> Result<ReportOutcome, ReportError> {
        let score = self.engine.score(request.history);
        let company = company_name(request.history);

        let prompt = ReportPrompt::build(
            ReportAudience {
                tier: score.tier,
                industry: request.industry,
                user_name: request.user_name,
                company_name: company.as_deref(),
            },
            request.history,
        )?;

        let draft = self
            .providers
            .generate_report(&prompt.system, &prompt.user)
            .await?;

        let mut markdown = self.sanitizer.sanitize(&draft.markdown, false);
        let user_ai_tier = extract_tier(&markdown);
        let final_score = extract_final_score(&markdown).unwrap_or(score.total_score);

        if self.sanitizer.has_residual_ads(&markdown) {
            warn!(
                provider = draft.provider.label(),
                "ad content still present after cleaning, applying aggressive pass"
            );
            markdown = self.sanitizer.sanitize(&markdown, true);
        }

        info!(
            provider = draft.provider.label(),
            computed_tier = score.tier.label(),
            reported_tier = %user_ai_tier,
            final_score,
            "report generated"
        );

        Ok(ReportOutcome {
            report_markdown: markdown,
            user_ai_tier,
            final_score,
            company_name: company,
            system_prompt_used: prompt.system,
            status: RESULTS_GENERATED,
            provider_used: draft.provider.label().to_string(),
            key_findings: KeyFindings::from_history(request.history),
            score,
        })
    }
}

/// Tier as written by the model in the `## Overall Tier:` heading.
pub fn extract_tier(markdown: &str) -> String {
    TIER_HEADING
        .captures(markdown)
        .and_then(|captures| captures.get(1))
        .map(|tier| tier.as_str().trim().to_string())
        .unwrap_or_else(|| UNKNOWN_TIER.to_string())
}

pub fn extract_final_score(markdown: &str) -> Option<u32> {
    FINAL_SCORE
        .captures(markdown)
        .and_then(|captures| captures.get(1))
        .and_then(|score| score.as_str().parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::ProviderKind;
    use crate::workflows::assessment::tests::common::{report_manager, StubProvider};
    use crate::workflows::assessment::{sample_history, Answer, AnswerType, Tier};

    const REPORT: &str = "## Overall Tier: Enabler\nFinal Score: 72/100\n\n## Key Findings\n**Strengths:**\n- Regular tool use\n\n**Weaknesses:**\n- No governance\n\n## Your Personalized AI Learning Path\n- Course one";

    fn service(chain: Vec<Arc<StubProvider>>) -> ReportService {
        ReportService::new(report_manager(chain), ScoringEngine::default())
    }

    fn request(history: &[AnsweredQuestion]) -> ReportRequest<'_> {
        ReportRequest {
            history,
            industry: "Retail",
            user_name: None,
        }
    }

    #[test]
    fn tier_and_score_are_read_from_markdown() {
        assert_eq!(extract_tier(REPORT), "Enabler");
        assert_eq!(extract_final_score(REPORT), Some(72));
        assert_eq!(extract_final_score("final score: 40"), Some(40));
        assert_eq!(extract_tier("# Report"), "N/A");
        assert_eq!(extract_final_score("# Report"), None);
    }

    #[tokio::test]
    async fn falls_back_to_next_provider_and_reports_its_name() {
        let openai = Arc::new(StubProvider::new(ProviderKind::OpenAi));
        let gemini = Arc::new(StubProvider::new(ProviderKind::Gemini).with_report(REPORT));
        let history = sample_history(Tier::Enabler);

        let outcome = service(vec![Arc::clone(&openai), Arc::clone(&gemini)])
            .generate(request(&history))
            .await
            .expect("report generated");

        assert_eq!(openai.report_calls(), 1);
        assert_eq!(gemini.report_calls(), 1);
        assert_eq!(outcome.provider_used, "Google Gemini");
        assert_eq!(outcome.user_ai_tier, "Enabler");
        assert_eq!(outcome.final_score, 72);
        assert_eq!(outcome.status, RESULTS_GENERATED);
        assert_eq!(outcome.score.total_score, 65);
        assert!(outcome
            .system_prompt_used
            .contains("**Enabler Marketing Manager**"));
    }

    #[tokio::test]
    async fn computed_score_is_used_when_model_omits_it() {
        let stub = Arc::new(
            StubProvider::new(ProviderKind::OpenAi).with_report("## Overall Tier: Dabbler\n\nBody"),
        );
        let history = sample_history(Tier::Dabbler);

        let outcome = service(vec![stub])
            .generate(request(&history))
            .await
            .expect("report generated");

        assert_eq!(outcome.final_score, 20);
        assert_eq!(outcome.user_ai_tier, "Dabbler");
    }

    #[tokio::test]
    async fn residual_links_trigger_a_second_pass() {
        let markdown = format!("{REPORT}\nhttps://ads.example.com/click");
        let stub = Arc::new(StubProvider::new(ProviderKind::OpenAi).with_report(markdown));
        let history = sample_history(Tier::Leader);

        let outcome = service(vec![stub])
            .generate(request(&history))
            .await
            .expect("report generated");

        assert!(!outcome.report_markdown.contains("http"));
        assert!(outcome.report_markdown.ends_with("- Course one"));
    }

    #[tokio::test]
    async fn company_name_flows_into_prompt_and_outcome() {
        let stub = Arc::new(StubProvider::new(ProviderKind::OpenAi).with_report(REPORT));
        let mut history = sample_history(Tier::Enabler);
        history.insert(
            0,
            AnsweredQuestion::new(
                "What is your company name?",
                Answer::Text("Acme Retail".into()),
                AnswerType::Text,
            ),
        );

        let outcome = service(vec![Arc::clone(&stub)])
            .generate(ReportRequest {
                user_name: Some("Jordan"),
                ..request(&history)
            })
            .await
            .expect("report generated");

        assert_eq!(outcome.company_name.as_deref(), Some("Acme Retail"));
        let prompt = stub.last_system_prompt().expect("prompt recorded");
        assert!(prompt.contains("personalized report for Jordan at Acme Retail"));
    }

    #[tokio::test]
    async fn exhausted_chain_names_every_failure() {
        let openai = Arc::new(StubProvider::new(ProviderKind::OpenAi).unavailable());
        let gemini = Arc::new(StubProvider::new(ProviderKind::Gemini));
        let history = sample_history(Tier::Dabbler);

        let err = service(vec![openai, gemini])
            .generate(request(&history))
            .await
            .expect_err("every provider fails");

        match &err {
            ReportError::Generation(ProviderError::Exhausted { failures }) => {
                assert_eq!(failures.len(), 2);
                assert_eq!(failures[0].provider, ProviderKind::OpenAi);
                assert_eq!(failures[0].reason, "not available");
            }
            other => panic!("expected exhausted chain, got {other:?}"),
        }
        assert!(err.to_string().starts_with("Failed to generate report:"));
    }
}
