use super::super::domain::AnsweredQuestion;
use super::keywords::DABBLER_DENSITY;
use serde::{Deserialize, Serialize};

/// Maturity tier assigned from the final score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Tier {
    Dabbler,
    Enabler,
    Leader,
}

impl Tier {
    pub const fn label(self) -> &'static str {
        match self {
            Tier::Dabbler => "Dabbler",
            Tier::Enabler => "Enabler",
            Tier::Leader => "Leader",
        }
    }

    pub const fn ordered() -> [Tier; 3] {
        [Tier::Dabbler, Tier::Enabler, Tier::Leader]
    }
}

/// Inclusive upper bounds of the two lower tiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierThresholds {
    pub dabbler_max: u32,
    pub enabler_max: u32,
}

impl TierThresholds {
    pub const STANDARD: TierThresholds = TierThresholds {
        dabbler_max: 50,
        enabler_max: 75,
    };

    pub fn tier_for(&self, score: u32) -> Tier {
        if score <= self.dabbler_max {
            Tier::Dabbler
        } else if score <= self.enabler_max {
            Tier::Enabler
        } else {
            Tier::Leader
        }
    }
}

impl Default for TierThresholds {
    fn default() -> Self {
        Self::STANDARD
    }
}

/// Share of answers that must read as beginner-level before a borderline score is pulled down.
pub(crate) const DENSITY_RATIO_PERCENT: usize = 60;
/// Totals in `(CORRECTION_FLOOR, CORRECTION_CEILING]` are eligible for the correction.
pub(crate) const CORRECTION_FLOOR: u32 = 50;
pub(crate) const CORRECTION_CEILING: u32 = 60;

/// Records that the beginner-vocabulary correction lowered the total.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DensityCorrection {
    pub flagged_answers: usize,
    pub answer_count: usize,
    pub original_total: u32,
}

/// Scales a partial assessment as if it had the full question count.
pub(crate) fn normalize(raw_total: u32, answered: usize, max_questions: usize) -> u32 {
    if answered == 0 {
        return raw_total;
    }
    let scaled = f64::from(raw_total) * max_questions as f64 / answered as f64;
    scaled.round() as u32
}

pub(crate) fn apply_density_correction(
    total: u32,
    history: &[AnsweredQuestion],
) -> (u32, Option<DensityCorrection>) {
    if history.is_empty() || total <= CORRECTION_FLOOR || total > CORRECTION_CEILING {
        return (total, None);
    }

    let flagged = history
        .iter()
        .filter(|entry| DABBLER_DENSITY.is_match(&entry.answer.flattened()))
        .count();

    if flagged * 100 >= history.len() * DENSITY_RATIO_PERCENT {
        let correction = DensityCorrection {
            flagged_answers: flagged,
            answer_count: history.len(),
            original_total: total,
        };
        (CORRECTION_FLOOR, Some(correction))
    } else {
        (total, None)
    }
}
