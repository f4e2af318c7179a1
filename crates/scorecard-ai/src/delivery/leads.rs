use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::{info, warn};

use crate::config::DeliveryConfig;

const WEBHOOK_TIMEOUT: Duration = Duration::from_secs(10);
const LEAD_SOURCE: &str = "AI Scorecard";
const LEAD_CAPTURE: &str = "leadCapture";

/// Contact details captured by the results page.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct LeadSubmission {
    #[serde(rename = "leadName", default)]
    pub name: String,
    #[serde(rename = "leadCompany", default)]
    pub company: String,
    #[serde(rename = "leadEmail", default)]
    pub email: String,
    #[serde(rename = "leadPhone", default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub industry: Option<String>,
    #[serde(default)]
    pub consent: Option<bool>,
    #[serde(rename = "aiTier", default)]
    pub ai_tier: Option<String>,
    #[serde(rename = "type", default)]
    pub lead_type: Option<String>,
    #[serde(rename = "reportMarkdown", default)]
    pub report_markdown: Option<String>,
    #[serde(rename = "questionAnswerHistory", default)]
    pub question_answer_history: Option<Value>,
}

impl LeadSubmission {
    pub fn validate(&self) -> Result<(), LeadError> {
        let blank = |value: &str| value.trim().is_empty();
        if blank(&self.name) || blank(&self.company) || blank(&self.email) || self.consent.is_none()
        {
            return Err(LeadError::MissingFields);
        }
        Ok(())
    }

    fn started(&self) -> bool {
        self.lead_type.as_deref() == Some(LEAD_CAPTURE)
    }
}

/// Record persisted to disk and forwarded to the webhook.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LeadNotification {
    pub timestamp: String,
    pub subject: String,
    #[serde(rename = "leadName")]
    pub lead_name: String,
    #[serde(rename = "leadCompany")]
    pub lead_company: String,
    #[serde(rename = "leadEmail")]
    pub lead_email: String,
    #[serde(rename = "leadPhone")]
    pub lead_phone: Option<String>,
    pub industry: Option<String>,
    pub consent: bool,
    #[serde(rename = "aiTier")]
    pub ai_tier: Option<String>,
    #[serde(rename = "type")]
    pub lead_type: Option<String>,
    #[serde(rename = "reportMarkdown", skip_serializing_if = "Option::is_none")]
    pub report_markdown: Option<String>,
    #[serde(rename = "questionAnswerHistory", skip_serializing_if = "Option::is_none")]
    pub question_answer_history: Option<Value>,
    #[serde(rename = "formData")]
    pub form_data: Value,
}

impl LeadNotification {
    pub fn from_submission(submission: LeadSubmission, now: DateTime<Utc>) -> Self {
        let timestamp = now.to_rfc3339_opts(SecondsFormat::Millis, true);
        let subject = if submission.started() {
            format!(
                "New AI Scorecard Assessment Started by {} from {}",
                submission.name, submission.company
            )
        } else {
            format!(
                "AI Scorecard Assessment Completed by {} from {}",
                submission.name, submission.company
            )
        };
        let consent = submission.consent.unwrap_or(false);
        let form_data = serde_json::json!({
            "name": submission.name,
            "company": submission.company,
            "email": submission.email,
            "phone": submission.phone.as_deref().unwrap_or("Not provided"),
            "industry": submission.industry.as_deref().unwrap_or("Not specified"),
            "aiTier": submission.ai_tier.as_deref().unwrap_or("Not available"),
            "assessmentType": submission.lead_type,
            "source": LEAD_SOURCE,
            "timestamp": timestamp,
            "consentGiven": if consent { "Yes" } else { "No" },
            "message": if submission.started() {
                "Started AI Scorecard Assessment"
            } else {
                "Completed AI Scorecard Assessment"
            },
        });

        Self {
            timestamp,
            subject,
            lead_name: submission.name,
            lead_company: submission.company,
            lead_email: submission.email,
            lead_phone: submission.phone,
            industry: submission.industry,
            consent,
            ai_tier: submission.ai_tier,
            lead_type: submission.lead_type,
            report_markdown: submission.report_markdown,
            question_answer_history: submission.question_answer_history,
            form_data,
        }
    }
}

#[derive(Debug, Error)]
pub enum LeadError {
    #[error("Missing required fields. Name, company, email, and consent are required.")]
    MissingFields,
    #[error("failed to write lead log: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to encode lead: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("lead webhook request failed: {0}")]
    Webhook(#[from] reqwest::Error),
    #[error("lead webhook returned {0}")]
    WebhookStatus(u16),
}

/// Outcome reported to the client; delivery failures are summarized, never raised.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LeadDelivery {
    pub success: bool,
    pub message: String,
    pub method: &'static str,
    #[serde(rename = "fileLogged")]
    pub file_logged: bool,
    #[serde(rename = "webhookSent")]
    pub webhook_sent: bool,
    #[serde(rename = "logFile", skip_serializing_if = "Option::is_none")]
    pub log_file: Option<PathBuf>,
}

/// Persists every lead to a log file, then forwards it to an optional webhook.
#[derive(Debug, Clone)]
pub struct LeadNotifier {
    http: reqwest::Client,
    log_dir: PathBuf,
    webhook_url: Option<String>,
}

impl LeadNotifier {
    pub fn new(log_dir: impl Into<PathBuf>, webhook_url: Option<String>) -> Result<Self, LeadError> {
        let http = reqwest::Client::builder().timeout(WEBHOOK_TIMEOUT).build()?;
        Ok(Self {
            http,
            log_dir: log_dir.into(),
            webhook_url,
        })
    }

    pub fn from_config(config: &DeliveryConfig) -> Result<Self, LeadError> {
        Self::new(config.lead_log_dir.clone(), config.lead_webhook_url.clone())
    }

    pub fn log_dir(&self) -> &Path {
        &self.log_dir
    }

    pub async fn notify(&self, notification: &LeadNotification) -> LeadDelivery {
        let log_file = match self.write_log(notification).await {
            Ok(path) => {
                info!(path = %path.display(), "lead logged to file");
                Some(path)
            }
            Err(err) => {
                warn!(error = %err, "failed to log lead to file");
                None
            }
        };

        let webhook_sent = match &self.webhook_url {
            Some(url) => match self.post_webhook(url, notification).await {
                Ok(()) => {
                    info!("lead forwarded to webhook");
                    true
                }
                Err(err) => {
                    warn!(error = %err, "lead webhook delivery failed");
                    false
                }
            },
            None => false,
        };

        let file_logged = log_file.is_some();
        let (message, method) = if webhook_sent {
            ("Lead notification sent successfully via webhook", "webhook")
        } else if file_logged {
            ("Lead captured successfully and saved to log file", "file-log-only")
        } else {
            (
                "Lead processing encountered errors, but data was captured",
                "error-fallback",
            )
        };

        LeadDelivery {
            success: true,
            message: message.to_string(),
            method,
            file_logged,
            webhook_sent,
            log_file,
        }
    }

    async fn write_log(&self, notification: &LeadNotification) -> Result<PathBuf, LeadError> {
        tokio::fs::create_dir_all(&self.log_dir).await?;
        let stamp = notification.timestamp.replace([':', '.'], "-");
        let path = self.log_dir.join(format!("lead-notification-{stamp}.json"));
        let body = serde_json::to_vec_pretty(notification)?;
        tokio::fs::write(&path, body).await?;
        Ok(path)
    }

    async fn post_webhook(&self, url: &str, notification: &LeadNotification) -> Result<(), LeadError> {
        let response = self.http.post(url).json(notification).send().await?;
        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(LeadError::WebhookStatus(status.as_u16()))
        }
    }
}
