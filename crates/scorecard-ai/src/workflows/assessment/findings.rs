use super::domain::{Answer, AnswerType, AnsweredQuestion, AssessmentPhase};
use serde::{Deserialize, Serialize};
use serde_json::Value;

const NEUTRAL_AVERAGE: f64 = 3.0;
const DEFAULT_STRENGTH: &str = "Commitment to AI adoption and improvement";
const DEFAULT_WEAKNESS: &str = "Opportunity for enhanced AI strategy and implementation";

/// Deterministic strengths and weaknesses derived from scale answers, independent of any model.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyFindings {
    pub strengths: Vec<String>,
    pub weaknesses: Vec<String>,
}

impl KeyFindings {
    pub fn from_history(history: &[AnsweredQuestion]) -> Self {
        let mut findings = KeyFindings::default();
        if history.is_empty() {
            return findings;
        }

        for phase in AssessmentPhase::ordered() {
            let answers: Vec<&AnsweredQuestion> =
                history.iter().filter(|entry| entry.belongs_to(phase)).collect();
            if answers.is_empty() {
                continue;
            }

            let (strength, weakness) = phase_statements(phase);
            let average = average_scale(&answers);
            if average >= 4.0 {
                findings.strengths.push(strength.to_string());
            } else if average <= 2.0 {
                findings.weaknesses.push(weakness.to_string());
            }
        }

        if findings.strengths.is_empty() {
            findings.strengths.push(DEFAULT_STRENGTH.to_string());
        }
        if findings.weaknesses.is_empty() {
            findings.weaknesses.push(DEFAULT_WEAKNESS.to_string());
        }
        findings
    }

    pub fn to_markdown(&self) -> String {
        let bullets = |items: &[String]| {
            items
                .iter()
                .map(|item| format!("- {item}"))
                .collect::<Vec<_>>()
                .join("\n")
        };
        format!(
            "## Key Findings\n\n**Strengths:**\n{}\n\n**Weaknesses:**\n{}\n",
            bullets(&self.strengths),
            bullets(&self.weaknesses)
        )
    }
}

fn phase_statements(phase: AssessmentPhase) -> (&'static str, &'static str) {
    match phase {
        AssessmentPhase::StrategyAndGoals => (
            "Strong AI strategy alignment with business goals",
            "Need for better alignment of AI initiatives with business strategy",
        ),
        AssessmentPhase::DataReadiness => (
            "High-quality data infrastructure supporting AI initiatives",
            "Data quality and integration challenges need addressing",
        ),
        AssessmentPhase::TechnologyAndTools => (
            "Strong adoption of AI-powered technology tools",
            "Limited implementation of AI technologies across operations",
        ),
        AssessmentPhase::TeamSkillsAndProcess => (
            "Well-developed AI expertise and training programs",
            "Need for enhanced AI training and skill development",
        ),
        AssessmentPhase::GovernanceAndMeasurement => (
            "Strong AI governance and performance measurement",
            "Improved AI governance and metrics needed",
        ),
    }
}

fn average_scale(answers: &[&AnsweredQuestion]) -> f64 {
    let ratings: Vec<f64> = answers
        .iter()
        .filter(|entry| entry.answer_type == Some(AnswerType::Scale))
        .filter_map(|entry| numeric(&entry.answer))
        .collect();

    if ratings.is_empty() {
        return NEUTRAL_AVERAGE;
    }
    ratings.iter().sum::<f64>() / ratings.len() as f64
}

fn numeric(answer: &Answer) -> Option<f64> {
    match answer {
        Answer::Text(text) => text.trim().parse::<f64>().ok(),
        Answer::Other(Value::Number(number)) => number.as_f64(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rating(phase: AssessmentPhase, value: &str) -> AnsweredQuestion {
        AnsweredQuestion::new("Rate it", Answer::Text(value.to_string()), AnswerType::Scale)
            .in_phase(phase)
    }

    #[test]
    fn high_and_low_phases_become_findings() {
        let history = vec![
            rating(AssessmentPhase::StrategyAndGoals, "5"),
            rating(AssessmentPhase::StrategyAndGoals, "4"),
            rating(AssessmentPhase::DataReadiness, "1"),
            rating(AssessmentPhase::TechnologyAndTools, "3"),
        ];

        let findings = KeyFindings::from_history(&history);
        assert_eq!(
            findings.strengths,
            vec!["Strong AI strategy alignment with business goals".to_string()]
        );
        assert_eq!(
            findings.weaknesses,
            vec!["Data quality and integration challenges need addressing".to_string()]
        );
    }

    #[test]
    fn falls_back_to_default_statements() {
        let history = vec![AnsweredQuestion::new(
            "Describe your stack",
            Answer::Text("We use spreadsheets".to_string()),
            AnswerType::Text,
        )
        .in_phase(AssessmentPhase::TechnologyAndTools)];

        let findings = KeyFindings::from_history(&history);
        assert_eq!(findings.strengths, vec![DEFAULT_STRENGTH.to_string()]);
        assert_eq!(findings.weaknesses, vec![DEFAULT_WEAKNESS.to_string()]);
        assert!(findings.to_markdown().contains("**Weaknesses:**\n- Opportunity"));
    }

    #[test]
    fn empty_history_has_no_findings() {
        assert_eq!(KeyFindings::from_history(&[]), KeyFindings::default());
    }
}
