//! AI Efficiency Scorecard: adaptive questionnaire, maturity scoring, and LLM-written reports.

pub mod config;
pub mod delivery;
pub mod error;
pub mod providers;
pub mod telemetry;
pub mod workflows;
