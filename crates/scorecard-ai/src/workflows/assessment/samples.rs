//! Reference answer sets, one per tier, for demos and calibration checks.

use super::domain::{Answer, AnswerType, AnsweredQuestion, AssessmentPhase};
use super::scoring::Tier;

const STRATEGY_QUESTION: &str = "How would you describe your organization's current AI strategy?";
const FREQUENCY_QUESTION: &str = "How frequently does your team use AI tools?";
const TOOLS_QUESTION: &str = "Which AI tools does your team currently use?";
const DATA_QUESTION: &str = "Describe your data collection process";

pub fn sample_history(tier: Tier) -> Vec<AnsweredQuestion> {
    let (strategy, frequency, tools, data): (&str, &str, &[&str], &str) = match tier {
        Tier::Dabbler => (
            "We have a basic understanding but no formal strategy",
            "1",
            &["Basic content generation"],
            "We collect some data but it's not organized.",
        ),
        Tier::Enabler => (
            "We have some strategic elements but are still developing",
            "3",
            &["Content generation", "Email optimization", "Basic analytics"],
            "We have established processes for collecting and organizing our marketing data with regular reviews.",
        ),
        Tier::Leader => (
            "We have an advanced, comprehensive AI strategy integrated with business goals",
            "5",
            &[
                "Advanced content generation",
                "Predictive analytics",
                "Automated personalization",
                "AI-driven campaign orchestration",
                "Customer journey optimization",
            ],
            "We have a sophisticated, enterprise-wide data strategy with integrated AI-driven analytics and predictive modeling capabilities that inform all marketing decisions.",
        ),
    };

    vec![
        AnsweredQuestion::new(
            STRATEGY_QUESTION,
            Answer::Text(strategy.to_string()),
            AnswerType::Radio,
        )
        .in_phase(AssessmentPhase::StrategyAndGoals),
        AnsweredQuestion::new(
            FREQUENCY_QUESTION,
            Answer::Text(frequency.to_string()),
            AnswerType::Scale,
        )
        .in_phase(AssessmentPhase::StrategyAndGoals),
        AnsweredQuestion::new(
            TOOLS_QUESTION,
            Answer::Choices(tools.iter().map(|tool| tool.to_string()).collect()),
            AnswerType::Checkbox,
        )
        .in_phase(AssessmentPhase::TechnologyAndTools),
        AnsweredQuestion::new(
            DATA_QUESTION,
            Answer::Text(data.to_string()),
            AnswerType::Text,
        )
        .in_phase(AssessmentPhase::DataReadiness),
    ]
}
