use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// The five fixed stages of the questionnaire, in the order they are asked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AssessmentPhase {
    #[serde(rename = "Strategy & Goals")]
    StrategyAndGoals,
    #[serde(rename = "Data Readiness")]
    DataReadiness,
    #[serde(rename = "Technology & Tools")]
    TechnologyAndTools,
    #[serde(rename = "Team Skills & Process")]
    TeamSkillsAndProcess,
    #[serde(rename = "Governance & Measurement")]
    GovernanceAndMeasurement,
}

impl AssessmentPhase {
    pub const COUNT: usize = 5;

    pub const fn ordered() -> [Self; Self::COUNT] {
        [
            Self::StrategyAndGoals,
            Self::DataReadiness,
            Self::TechnologyAndTools,
            Self::TeamSkillsAndProcess,
            Self::GovernanceAndMeasurement,
        ]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::StrategyAndGoals => "Strategy & Goals",
            Self::DataReadiness => "Data Readiness",
            Self::TechnologyAndTools => "Technology & Tools",
            Self::TeamSkillsAndProcess => "Team Skills & Process",
            Self::GovernanceAndMeasurement => "Governance & Measurement",
        }
    }

    pub const fn index(self) -> usize {
        match self {
            Self::StrategyAndGoals => 0,
            Self::DataReadiness => 1,
            Self::TechnologyAndTools => 2,
            Self::TeamSkillsAndProcess => 3,
            Self::GovernanceAndMeasurement => 4,
        }
    }

    pub fn first() -> Self {
        Self::StrategyAndGoals
    }

    pub fn next(self) -> Option<Self> {
        Self::ordered().get(self.index() + 1).copied()
    }

    pub fn is_last(self) -> bool {
        self.next().is_none()
    }

    /// Exact label match; anything else is treated as an unknown phase.
    pub fn from_label(label: &str) -> Option<Self> {
        Self::ordered()
            .into_iter()
            .find(|phase| phase.label() == label)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnswerType {
    Text,
    Radio,
    Checkbox,
    Scale,
}

impl AnswerType {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Radio => "radio",
            Self::Checkbox => "checkbox",
            Self::Scale => "scale",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "text" => Some(Self::Text),
            "radio" => Some(Self::Radio),
            "checkbox" => Some(Self::Checkbox),
            "scale" => Some(Self::Scale),
            _ => None,
        }
    }
}

/// Raw answer as submitted by the client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Answer {
    Text(String),
    Choices(Vec<String>),
    Other(Value),
}

impl Default for Answer {
    fn default() -> Self {
        Self::Other(Value::Null)
    }
}

impl Answer {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn is_blank(&self) -> bool {
        match self {
            Self::Text(text) => text.trim().is_empty(),
            Self::Choices(choices) => choices.is_empty(),
            Self::Other(value) => value.is_null(),
        }
    }

    /// Flattened form used for keyword scans: choices joined by spaces, other values as JSON.
    pub fn flattened(&self) -> String {
        match self {
            Self::Text(text) => text.clone(),
            Self::Choices(choices) => choices.join(" "),
            Self::Other(value) => value.to_string(),
        }
    }

    /// Human-facing rendering used in prompts and reports.
    pub fn display(&self) -> String {
        match self {
            Self::Text(text) => text.trim().to_string(),
            Self::Choices(choices) => choices.join(", "),
            Self::Other(Value::String(text)) => text.trim().to_string(),
            Self::Other(Value::Null) => String::new(),
            Self::Other(value) => value.to_string(),
        }
    }
}

/// One entry of the assessment history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnsweredQuestion {
    #[serde(alias = "questionText", default)]
    pub question: String,
    #[serde(default)]
    pub answer: Answer,
    #[serde(rename = "phaseName", default, skip_serializing_if = "Option::is_none")]
    pub phase_name: Option<String>,
    #[serde(
        rename = "answerType",
        default,
        deserialize_with = "deserialize_answer_type",
        skip_serializing_if = "Option::is_none"
    )]
    pub answer_type: Option<AnswerType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,
    #[serde(rename = "reasoningText", default, skip_serializing_if = "Option::is_none")]
    pub reasoning_text: Option<String>,
    #[serde(rename = "answerSource", default, skip_serializing_if = "Option::is_none")]
    pub answer_source: Option<String>,
}

impl AnsweredQuestion {
    pub fn new(question: impl Into<String>, answer: Answer, answer_type: AnswerType) -> Self {
        Self {
            question: question.into(),
            answer,
            phase_name: None,
            answer_type: Some(answer_type),
            options: None,
            reasoning_text: None,
            answer_source: None,
        }
    }

    pub fn in_phase(mut self, phase: AssessmentPhase) -> Self {
        self.phase_name = Some(phase.label().to_string());
        self
    }

    pub fn belongs_to(&self, phase: AssessmentPhase) -> bool {
        self.phase_name.as_deref() == Some(phase.label())
    }
}

fn deserialize_answer_type<'de, D>(deserializer: D) -> Result<Option<AnswerType>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Value>::deserialize(deserializer)?;
    Ok(raw
        .as_ref()
        .and_then(Value::as_str)
        .and_then(AnswerType::parse))
}

/// Accepts any JSON value for the history; anything other than an array is an empty history.
pub fn deserialize_history<'de, D>(deserializer: D) -> Result<Vec<AnsweredQuestion>, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Array(items) => items
            .into_iter()
            .map(|item| serde_json::from_value(item).map_err(serde::de::Error::custom))
            .collect(),
        _ => Ok(Vec::new()),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PhaseStatus {
    #[default]
    Asking,
    Complete,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OverallStatus {
    #[default]
    Asking,
    Completed,
}

/// Validated question returned by the question provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedQuestion {
    #[serde(rename = "questionText")]
    pub question_text: String,
    #[serde(rename = "answerType")]
    pub answer_type: AnswerType,
    pub options: Option<Vec<String>>,
    #[serde(default)]
    pub phase_status: PhaseStatus,
    #[serde(default)]
    pub overall_status: OverallStatus,
    #[serde(default)]
    pub reasoning_text: Option<String>,
}
