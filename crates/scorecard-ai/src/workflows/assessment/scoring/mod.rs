mod keywords;
mod policy;
mod rules;

pub use policy::{DensityCorrection, Tier, TierThresholds};

use super::domain::{AnswerType, AnsweredQuestion};
use crate::config::DEFAULT_MAX_QUESTIONS;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Upper bound of the reported score.
pub const MAX_TOTAL_SCORE: u32 = 100;

/// Stateless scorer turning an assessment history into a score and tier.
#[derive(Debug, Clone)]
pub struct ScoringEngine {
    max_questions: usize,
    thresholds: TierThresholds,
}

impl Default for ScoringEngine {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_QUESTIONS)
    }
}

impl ScoringEngine {
    pub fn new(max_questions: usize) -> Self {
        Self {
            max_questions,
            thresholds: TierThresholds::STANDARD,
        }
    }

    pub fn max_questions(&self) -> usize {
        self.max_questions
    }

    pub fn thresholds(&self) -> TierThresholds {
        self.thresholds
    }

    /// Points (0-5) for a single answered question. Never fails.
    pub fn score_answer(&self, entry: &AnsweredQuestion) -> u8 {
        rules::score_entry(entry).0
    }

    pub fn score(&self, history: &[AnsweredQuestion]) -> ScoreOutcome {
        let (components, raw_total) = rules::score_history(history);
        let answered = history.len();

        let (total, normalized, correction) = if answered > 0 && answered < self.max_questions {
            let scaled = policy::normalize(raw_total, answered, self.max_questions);
            (scaled, true, None)
        } else {
            let (total, correction) = policy::apply_density_correction(raw_total, history);
            (total, false, correction)
        };

        let total_score = total.min(MAX_TOTAL_SCORE);
        let tier = self.thresholds.tier_for(total_score);

        debug!(
            answered,
            raw_total,
            total_score,
            normalized,
            corrected = correction.is_some(),
            tier = tier.label(),
            "scored assessment history"
        );

        ScoreOutcome {
            raw_total,
            total_score,
            tier,
            normalized,
            correction,
            components,
        }
    }

    pub fn classify(&self, history: &[AnsweredQuestion]) -> ScoreResult {
        self.score(history).result()
    }
}

/// Points awarded to one history entry, with the reasoning kept for audits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreComponent {
    pub question_index: usize,
    pub answer_type: Option<AnswerType>,
    pub points: u8,
    pub notes: String,
}

/// Full scoring trail for a history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreOutcome {
    pub raw_total: u32,
    pub total_score: u32,
    pub tier: Tier,
    pub normalized: bool,
    pub correction: Option<DensityCorrection>,
    pub components: Vec<ScoreComponent>,
}

impl ScoreOutcome {
    pub fn result(&self) -> ScoreResult {
        ScoreResult {
            total_score: self.total_score,
            tier: self.tier,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreResult {
    pub total_score: u32,
    pub tier: Tier,
}

/// Scores one answer with the standard heuristics.
pub fn score_answer(entry: &AnsweredQuestion) -> u8 {
    rules::score_entry(entry).0
}

/// Classifies a history against the standard twenty-question assessment.
pub fn classify(history: &[AnsweredQuestion]) -> ScoreResult {
    ScoringEngine::default().classify(history)
}

pub fn tier_for(score: u32) -> Tier {
    TierThresholds::STANDARD.tier_for(score)
}
