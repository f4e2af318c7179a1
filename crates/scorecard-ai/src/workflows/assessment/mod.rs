//! Adaptive questionnaire: answer scoring, tier classification, and phase flow control.

pub mod domain;
pub mod findings;
pub mod flow;
pub mod prompt;
pub mod samples;
pub mod scoring;

#[cfg(test)]
pub(crate) mod tests;

pub use domain::{
    deserialize_history, Answer, AnswerType, AnsweredQuestion, AssessmentPhase,
    GeneratedQuestion, OverallStatus, PhaseStatus,
};
pub use findings::KeyFindings;
pub use flow::{
    AssessmentFlowController, CompletionReason, FlowError, NextAction, PhasePlan, PhaseStep,
    QuestionTurn, COMPLETION_MESSAGE,
};
pub use prompt::QuestionPrompt;
pub use samples::sample_history;
pub use scoring::{
    classify, score_answer, tier_for, DensityCorrection, ScoreComponent, ScoreOutcome,
    ScoreResult, ScoringEngine, Tier, TierThresholds,
};
