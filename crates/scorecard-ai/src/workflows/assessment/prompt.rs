use super::domain::{AnsweredQuestion, AssessmentPhase};

/// Industry label that switches question generation to a business-operations framing.
pub const REAL_ESTATE_INDUSTRY: &str = "Property/Real Estate";

const QUESTION_TYPES: &str = r#"EXTREMELY IMPORTANT: You MUST use a BALANCED MIX of question types, including ALL of the following types:
For the current phase, select the most appropriate question type from:
- "radio" for single-choice questions with 4-5 options (use for questions about frequency, level of adoption, primary approaches)
- "checkbox" for multiple-choice questions with 4-6 options (use for questions about tools used, areas implemented, challenges faced)
- "scale" for 1-5 rating questions (use for questions about effectiveness, satisfaction, maturity levels) - DO NOT provide options for scale questions, they will be auto-generated as 1-5
- "text" for open-ended responses that require detailed explanations, qualitative feedback, or complex answers

CRITICAL: Approximately 20-25% of all questions should be "text" type questions to allow users to provide detailed, qualitative answers.
Some questions are naturally better suited for text responses, such as describing strategies, explaining challenges, or sharing specific experiences."#;

const OUTPUT_CONTRACT: &str = r#"IMPORTANT: For answerType field, ONLY use one of these exact values: "text", "radio", "checkbox", or "scale". Do not use variations like "single-choice" or "multiple-choice".
For scale questions, set options to null - the scale will be automatically generated as 1-5.
Return JSON: {
  "questionText": string,
  "answerType": "text" | "radio" | "checkbox" | "scale",
  "options": string[] | null,
  "phase_status": "asking" | "complete",
  "overall_status": "asking" | "completed",
  "reasoning_text": string
}"#;

const REAL_ESTATE_FRAMING: &str = r#"VERY IMPORTANT: Questions MUST be B2B (business-to-business) focused, addressing the user's BUSINESS OPERATIONS and AI use within their real estate company/agency.
DO NOT create consumer-focused questions that reference "your real estate portfolio" or imply the user is a property owner/investor.
Instead, frame questions about how the real estate BUSINESS is implementing AI across areas like:
- Property management operations
- Agent productivity and training
- Marketing and lead generation for the agency
- Business analytics and market research
- Back-office automation and efficiency
- Client relationship management
For example, use phrases like "your real estate agency", "your brokerage", "your property management firm", etc."#;

const NO_REPEATS: &str = "DO NOT repeat any previous questions. Each question must be unique.";

/// System and user prompt pair sent to the question provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionPrompt {
    pub system: String,
    pub user: String,
}

impl QuestionPrompt {
    pub fn build(
        phase: AssessmentPhase,
        industry: &str,
        history: &[AnsweredQuestion],
    ) -> Result<Self, serde_json::Error> {
        let heading = format!(
            "Generate a new question for phase \"{}\" in the {} industry.",
            phase.label(),
            industry
        );

        let system = if industry == REAL_ESTATE_INDUSTRY {
            [
                heading.as_str(),
                REAL_ESTATE_FRAMING,
                "",
                QUESTION_TYPES,
                "",
                NO_REPEATS,
                OUTPUT_CONTRACT,
            ]
            .join("\n")
        } else {
            [heading.as_str(), NO_REPEATS, QUESTION_TYPES, "", OUTPUT_CONTRACT].join("\n")
        };

        let user = format!(
            "Based on history: {}, generate next question.",
            serde_json::to_string(history)?
        );

        Ok(Self { system, user })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::assessment::domain::{Answer, AnswerType};

    #[test]
    fn standard_prompt_names_phase_and_industry() {
        let prompt = QuestionPrompt::build(AssessmentPhase::DataReadiness, "Healthcare", &[])
            .expect("prompt builds");
        assert!(prompt
            .system
            .starts_with("Generate a new question for phase \"Data Readiness\" in the Healthcare industry."));
        assert!(prompt.system.contains("\"reasoning_text\": string"));
        assert!(!prompt.system.contains("B2B"));
        assert_eq!(prompt.user, "Based on history: [], generate next question.");
    }

    #[test]
    fn real_estate_prompt_is_business_focused() {
        let history = vec![AnsweredQuestion::new(
            "Company name?",
            Answer::Text("Acme Realty".to_string()),
            AnswerType::Text,
        )];
        let prompt =
            QuestionPrompt::build(AssessmentPhase::StrategyAndGoals, REAL_ESTATE_INDUSTRY, &history)
                .expect("prompt builds");
        assert!(prompt.system.contains("B2B (business-to-business)"));
        assert!(prompt.system.contains("your brokerage"));
        assert!(prompt.user.contains("\"answer\":\"Acme Realty\""));
    }
}
