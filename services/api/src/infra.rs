use clap::ValueEnum;
use metrics_exporter_prometheus::PrometheusHandle;
use scorecard_ai::error::AppError;
use scorecard_ai::workflows::assessment::{deserialize_history, AnsweredQuestion, Tier};
use serde_json::Value;
use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum TierArg {
    Dabbler,
    Enabler,
    Leader,
}

impl From<TierArg> for Tier {
    fn from(value: TierArg) -> Self {
        match value {
            TierArg::Dabbler => Tier::Dabbler,
            TierArg::Enabler => Tier::Enabler,
            TierArg::Leader => Tier::Leader,
        }
    }
}

/// Accepts a bare history array or a request body carrying a `history` field.
pub(crate) fn parse_history(raw: &str) -> Result<Vec<AnsweredQuestion>, AppError> {
    let value: Value =
        serde_json::from_str(raw).map_err(|err| AppError::InvalidJson(err.to_string()))?;
    let history = match value {
        Value::Object(mut body) => body.remove("history").unwrap_or(Value::Null),
        other => other,
    };
    deserialize_history(history).map_err(|err| AppError::InvalidJson(err.to_string()))
}

pub(crate) fn load_history(path: &Path) -> Result<Vec<AnsweredQuestion>, AppError> {
    let raw = std::fs::read_to_string(path)?;
    parse_history(&raw)
}
