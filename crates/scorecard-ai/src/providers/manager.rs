use super::{LlmProvider, ProviderError, ProviderFailure, ProviderKind, ValidationError};
use crate::workflows::assessment::domain::{
    AnswerType, GeneratedQuestion, OverallStatus, PhaseStatus,
};
use serde_json::Value;
use std::sync::Arc;
use tracing::{info, warn};

/// Markdown produced by the first provider in the chain that succeeded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportDraft {
    pub markdown: String,
    pub provider: ProviderKind,
}

/// Fronts the configured providers. Built once per process and shared behind an `Arc`.
///
/// Questions go to a single designated provider with no fallback. Reports walk the
/// chain in priority order and fail only once every provider has failed.
pub struct ProviderManager {
    question: Option<Arc<dyn LlmProvider>>,
    report_chain: Vec<Arc<dyn LlmProvider>>,
}

impl ProviderManager {
    pub fn new(
        question: Option<Arc<dyn LlmProvider>>,
        report_chain: Vec<Arc<dyn LlmProvider>>,
    ) -> Self {
        Self {
            question,
            report_chain,
        }
    }

    pub fn question_provider(&self) -> Option<ProviderKind> {
        self.question.as_ref().map(|provider| provider.kind())
    }

    pub fn report_chain(&self) -> Vec<ProviderKind> {
        self.report_chain
            .iter()
            .map(|provider| provider.kind())
            .collect()
    }

    pub async fn generate_next_question(
        &self,
        system: &str,
        user: &str,
    ) -> Result<GeneratedQuestion, ProviderError> {
        let provider = self.question.as_ref().ok_or(ProviderError::NotConfigured {
            purpose: "question",
        })?;

        if !provider.is_available().await {
            warn!(provider = provider.name(), "question provider unavailable");
            return Err(ProviderError::Unavailable {
                provider: provider.kind(),
            });
        }

        let raw = provider.generate_next_question(system, user).await?;
        let question = validate_question(raw)?;
        info!(
            provider = provider.name(),
            answer_type = question.answer_type.label(),
            "generated next question"
        );
        Ok(question)
    }

    pub async fn generate_report(
        &self,
        system: &str,
        user: &str,
    ) -> Result<ReportDraft, ProviderError> {
        let mut failures = Vec::new();

        for provider in &self.report_chain {
            if !provider.is_available().await {
                warn!(provider = provider.name(), "report provider unavailable, trying next");
                failures.push(ProviderFailure {
                    provider: provider.kind(),
                    reason: "not available".to_string(),
                });
                continue;
            }

            match provider.generate_report(system, user).await {
                Ok(markdown) => {
                    info!(
                        provider = provider.name(),
                        chars = markdown.len(),
                        "report generated"
                    );
                    return Ok(ReportDraft {
                        markdown,
                        provider: provider.kind(),
                    });
                }
                Err(err) => {
                    warn!(provider = provider.name(), error = %err, "report provider failed, trying next");
                    failures.push(ProviderFailure {
                        provider: provider.kind(),
                        reason: err.to_string(),
                    });
                }
            }
        }

        Err(ProviderError::Exhausted { failures })
    }
}

/// Checks the generated JSON and normalizes it. Scale questions always get options 1-5.
pub(crate) fn validate_question(raw: Value) -> Result<GeneratedQuestion, ValidationError> {
    let Value::Object(mut fields) = raw else {
        return Err(ValidationError::NotAnObject);
    };

    let question_text = match fields.remove("questionText") {
        Some(Value::String(text)) if !text.trim().is_empty() => text,
        _ => return Err(ValidationError::MissingQuestionText),
    };

    let answer_type = match fields.remove("answerType") {
        Some(Value::String(kind)) if !kind.trim().is_empty() => {
            AnswerType::parse(kind.trim()).ok_or(ValidationError::UnknownAnswerType(kind))?
        }
        _ => return Err(ValidationError::MissingAnswerType),
    };

    let options = if answer_type == AnswerType::Scale {
        Some((1..=5).map(|value: u8| value.to_string()).collect())
    } else {
        match fields.remove("options") {
            None | Some(Value::Null) => None,
            Some(Value::Array(items)) => Some(
                items
                    .into_iter()
                    .map(|item| match item {
                        Value::String(text) => Ok(text),
                        _ => Err(ValidationError::InvalidOptions),
                    })
                    .collect::<Result<Vec<_>, _>>()?,
            ),
            Some(_) => return Err(ValidationError::InvalidOptions),
        }
    };

    let phase_status = match fields.get("phase_status").and_then(Value::as_str) {
        Some("complete") => PhaseStatus::Complete,
        _ => PhaseStatus::Asking,
    };
    let overall_status = match fields.get("overall_status").and_then(Value::as_str) {
        Some("completed") => OverallStatus::Completed,
        _ => OverallStatus::Asking,
    };
    let reasoning_text = fields
        .get("reasoning_text")
        .and_then(Value::as_str)
        .map(str::to_string);

    Ok(GeneratedQuestion {
        question_text,
        answer_type,
        options,
        phase_status,
        overall_status,
        reasoning_text,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn scale_questions_get_fixed_options() {
        let question = validate_question(json!({
            "questionText": "How mature is your data pipeline?",
            "answerType": "scale",
            "options": ["low", "high"]
        }))
        .expect("valid question");
        assert_eq!(
            question.options,
            Some(vec!["1", "2", "3", "4", "5"].into_iter().map(String::from).collect())
        );
        assert_eq!(question.phase_status, PhaseStatus::Asking);
        assert_eq!(question.overall_status, OverallStatus::Asking);
    }

    #[test]
    fn rejects_missing_or_unknown_fields() {
        assert_eq!(
            validate_question(json!({ "answerType": "text" })),
            Err(ValidationError::MissingQuestionText)
        );
        assert_eq!(
            validate_question(json!({ "questionText": "Q", "answerType": 3 })),
            Err(ValidationError::MissingAnswerType)
        );
        assert_eq!(
            validate_question(json!({ "questionText": "Q", "answerType": "single-choice" })),
            Err(ValidationError::UnknownAnswerType("single-choice".to_string()))
        );
        assert_eq!(
            validate_question(json!(["Q"])),
            Err(ValidationError::NotAnObject)
        );
        assert_eq!(
            validate_question(json!({ "questionText": "Q", "answerType": "radio", "options": [1, 2] })),
            Err(ValidationError::InvalidOptions)
        );
    }
}
