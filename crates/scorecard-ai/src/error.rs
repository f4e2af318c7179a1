use crate::config::ConfigError;
use crate::delivery::{LeadError, PdfError};
use crate::providers::ProviderError;
use crate::telemetry::TelemetryError;
use crate::workflows::assessment::FlowError;
use crate::workflows::report::ReportError;
use crate::workflows::service::ScorecardError;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use std::fmt;

#[derive(Debug)]
pub enum AppError {
    Config(ConfigError),
    Telemetry(TelemetryError),
    Io(std::io::Error),
    Server(axum::Error),
    InvalidContentType,
    InvalidJson(String),
    Question(FlowError),
    Report(ReportError),
    Provider(ProviderError),
    Pdf(PdfError),
    Lead(LeadError),
}

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            AppError::InvalidContentType
            | AppError::InvalidJson(_)
            | AppError::Lead(LeadError::MissingFields) => StatusCode::BAD_REQUEST,
            AppError::Config(_)
            | AppError::Telemetry(_)
            | AppError::Io(_)
            | AppError::Server(_)
            | AppError::Question(_)
            | AppError::Report(_)
            | AppError::Provider(_)
            | AppError::Pdf(_)
            | AppError::Lead(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn body(&self) -> serde_json::Value {
        match self {
            AppError::InvalidContentType => json!({
                "error": "Invalid content type",
                "message": "Request must be application/json",
            }),
            AppError::InvalidJson(_) => json!({
                "error": "Invalid JSON",
                "message": "Request body is not valid JSON",
            }),
            AppError::Question(err) => {
                let detail = match err {
                    FlowError::Generation(inner) => inner.to_string(),
                    FlowError::Prompt(inner) => inner.to_string(),
                };
                json!({
                    "error": "Failed to generate question",
                    "message": format!(
                        "An error occurred while generating the next question: {detail}. Please try restarting the assessment."
                    ),
                })
            }
            AppError::Report(err) => json!({
                "error": "Failed to generate report",
                "message": err.to_string(),
            }),
            AppError::Lead(err @ LeadError::MissingFields) => json!({
                "message": err.to_string(),
            }),
            other => json!({
                "error": "Failed to process AI request",
                "message": other.to_string(),
            }),
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(err) => write!(f, "configuration error: {}", err),
            AppError::Telemetry(err) => write!(f, "telemetry error: {}", err),
            AppError::Io(err) => write!(f, "io error: {}", err),
            AppError::Server(err) => write!(f, "server error: {}", err),
            AppError::InvalidContentType => write!(f, "request must be application/json"),
            AppError::InvalidJson(detail) => write!(f, "request body is not valid JSON: {}", detail),
            AppError::Question(err) => write!(f, "question error: {}", err),
            AppError::Report(err) => write!(f, "{}", err),
            AppError::Provider(err) => write!(f, "provider error: {}", err),
            AppError::Pdf(err) => write!(f, "pdf error: {}", err),
            AppError::Lead(err) => write!(f, "lead error: {}", err),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Config(err) => Some(err),
            AppError::Telemetry(err) => Some(err),
            AppError::Io(err) => Some(err),
            AppError::Server(err) => Some(err),
            AppError::Question(err) => Some(err),
            AppError::Report(err) => Some(err),
            AppError::Provider(err) => Some(err),
            AppError::Pdf(err) => Some(err),
            AppError::Lead(err) => Some(err),
            AppError::InvalidContentType | AppError::InvalidJson(_) => None,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }
        (status, Json(self.body())).into_response()
    }
}

impl From<ConfigError> for AppError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<TelemetryError> for AppError {
    fn from(value: TelemetryError) -> Self {
        Self::Telemetry(value)
    }
}

impl From<std::io::Error> for AppError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<axum::Error> for AppError {
    fn from(value: axum::Error) -> Self {
        Self::Server(value)
    }
}

impl From<FlowError> for AppError {
    fn from(value: FlowError) -> Self {
        Self::Question(value)
    }
}

impl From<ReportError> for AppError {
    fn from(value: ReportError) -> Self {
        Self::Report(value)
    }
}

impl From<ProviderError> for AppError {
    fn from(value: ProviderError) -> Self {
        Self::Provider(value)
    }
}

impl From<PdfError> for AppError {
    fn from(value: PdfError) -> Self {
        Self::Pdf(value)
    }
}

impl From<LeadError> for AppError {
    fn from(value: LeadError) -> Self {
        Self::Lead(value)
    }
}

impl From<ScorecardError> for AppError {
    fn from(value: ScorecardError) -> Self {
        match value {
            ScorecardError::Question(err) => Self::Question(err),
            ScorecardError::Report(err) => Self::Report(err),
            ScorecardError::Provider(err) => Self::Provider(err),
            ScorecardError::Pdf(err) => Self::Pdf(err),
            ScorecardError::Lead(err) => Self::Lead(err),
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(value: JsonRejection) -> Self {
        match value {
            JsonRejection::MissingJsonContentType(_) => Self::InvalidContentType,
            other => Self::InvalidJson(other.body_text()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_shape_errors_are_bad_requests() {
        assert_eq!(AppError::InvalidContentType.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            AppError::InvalidJson("eof".into()).body()["error"],
            "Invalid JSON"
        );
        assert_eq!(
            AppError::Lead(LeadError::MissingFields).status(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn question_failures_ask_for_a_restart() {
        let err = AppError::from(FlowError::Generation(ProviderError::NotConfigured {
            purpose: "question",
        }));
        let body = err.body();
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "Failed to generate question");
        assert_eq!(
            body["message"],
            "An error occurred while generating the next question: no question provider is configured. Please try restarting the assessment."
        );
    }
}
