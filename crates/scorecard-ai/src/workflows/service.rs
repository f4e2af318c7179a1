use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use super::assessment::{
    deserialize_history, AnswerType, AnsweredQuestion, AssessmentFlowController, FlowError,
    NextAction, OverallStatus, PhaseStatus, QuestionTurn, ScoringEngine, COMPLETION_MESSAGE,
};
use super::report::{ReportError, ReportOutcome, ReportRequest, ReportService};
use crate::config::AppConfig;
use crate::delivery::{
    attachment_filename, render_report_document, LeadDelivery, LeadError, LeadNotification,
    LeadNotifier, LeadSubmission, PdfError, PdfRenderer, ReportDocument,
};
use crate::providers::{manager_from_config, ProviderError, ProviderManager};

pub const GENERATE_REPORT: &str = "generateReport";

/// Body of `POST /scorecard-ai`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScorecardRequest {
    #[serde(default)]
    pub action: Option<String>,
    #[serde(rename = "currentPhaseName", default)]
    pub current_phase_name: Option<String>,
    #[serde(default)]
    pub industry: String,
    #[serde(rename = "userName", default)]
    pub user_name: Option<String>,
    #[serde(default, deserialize_with = "deserialize_history")]
    pub history: Vec<AnsweredQuestion>,
}

impl ScorecardRequest {
    pub fn wants_report(&self) -> bool {
        self.action.as_deref() == Some(GENERATE_REPORT)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuestionPayload {
    #[serde(rename = "questionText")]
    pub question_text: String,
    #[serde(rename = "answerType")]
    pub answer_type: AnswerType,
    pub options: Option<Vec<String>>,
    pub phase: &'static str,
    pub completed: bool,
    #[serde(rename = "questionNumber")]
    pub question_number: usize,
    #[serde(rename = "totalQuestions")]
    pub total_questions: usize,
    pub phase_status: PhaseStatus,
    pub overall_status: OverallStatus,
    pub reasoning_text: Option<String>,
}

impl From<QuestionTurn> for QuestionPayload {
    fn from(turn: QuestionTurn) -> Self {
        Self {
            question_text: turn.question.question_text,
            answer_type: turn.question.answer_type,
            options: turn.question.options,
            phase: turn.phase.label(),
            completed: false,
            question_number: turn.question_number,
            total_questions: turn.total_questions,
            phase_status: turn.question.phase_status,
            overall_status: turn.question.overall_status,
            reasoning_text: turn.question.reasoning_text,
        }
    }
}

/// Sent once no further question will be asked.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompletionPayload {
    #[serde(rename = "questionText")]
    pub question_text: Option<String>,
    #[serde(rename = "answerType")]
    pub answer_type: Option<AnswerType>,
    pub options: Option<Vec<String>>,
    pub completed: bool,
    pub phase: &'static str,
    #[serde(rename = "currentPhaseName")]
    pub current_phase_name: &'static str,
    pub phase_status: PhaseStatus,
    pub overall_status: OverallStatus,
    pub message: &'static str,
}

#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum ScorecardResponse {
    Question(QuestionPayload),
    Completed(CompletionPayload),
    Report(Box<ReportOutcome>),
}

/// Rendered PDF plus the attachment name it should be served under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PdfDownload {
    pub filename: String,
    pub bytes: Vec<u8>,
    pub fallback: bool,
}

#[derive(Debug, Error)]
pub enum ScorecardError {
    #[error(transparent)]
    Question(#[from] FlowError),
    #[error(transparent)]
    Report(#[from] ReportError),
    #[error(transparent)]
    Provider(#[from] ProviderError),
    #[error(transparent)]
    Pdf(#[from] PdfError),
    #[error(transparent)]
    Lead(#[from] LeadError),
}

/// Composes question flow, report generation, PDF rendering, and lead capture.
pub struct ScorecardService {
    providers: Arc<ProviderManager>,
    flow: AssessmentFlowController,
    reports: ReportService,
    pdf: PdfRenderer,
    leads: LeadNotifier,
}

impl ScorecardService {
    pub fn new(
        providers: Arc<ProviderManager>,
        max_questions: usize,
        pdf: PdfRenderer,
        leads: LeadNotifier,
    ) -> Self {
        let flow = AssessmentFlowController::new(Arc::clone(&providers), max_questions);
        let reports = ReportService::new(Arc::clone(&providers), ScoringEngine::new(max_questions));
        Self {
            providers,
            flow,
            reports,
            pdf,
            leads,
        }
    }

    pub fn from_config(config: &AppConfig) -> Result<Self, ScorecardError> {
        let providers = Arc::new(manager_from_config(&config.providers)?);
        info!(
            question = ?providers.question_provider(),
            report_chain = ?providers.report_chain(),
            "ai providers configured"
        );
        Ok(Self::new(
            providers,
            config.assessment.max_questions,
            PdfRenderer::from_config(&config.delivery)?,
            LeadNotifier::from_config(&config.delivery)?,
        ))
    }

    pub fn providers(&self) -> &Arc<ProviderManager> {
        &self.providers
    }

    pub async fn handle(
        &self,
        request: ScorecardRequest,
    ) -> Result<ScorecardResponse, ScorecardError> {
        if request.wants_report() {
            let outcome = self
                .reports
                .generate(ReportRequest {
                    history: &request.history,
                    industry: &request.industry,
                    user_name: request.user_name.as_deref().filter(|name| !name.is_empty()),
                })
                .await?;
            return Ok(ScorecardResponse::Report(Box::new(outcome)));
        }

        let action = self
            .flow
            .next(
                request.current_phase_name.as_deref(),
                &request.history,
                &request.industry,
            )
            .await?;

        Ok(match action {
            NextAction::Question(turn) => ScorecardResponse::Question(turn.into()),
            NextAction::Complete { phase, reason } => {
                info!(phase = phase.label(), ?reason, "assessment complete");
                ScorecardResponse::Completed(CompletionPayload {
                    question_text: None,
                    answer_type: None,
                    options: None,
                    completed: true,
                    phase: phase.label(),
                    current_phase_name: phase.label(),
                    phase_status: PhaseStatus::Complete,
                    overall_status: OverallStatus::Completed,
                    message: COMPLETION_MESSAGE,
                })
            }
        })
    }

    /// Always yields a document; renderer failures are replaced by the fallback page.
    pub async fn render_pdf(&self, document: &ReportDocument) -> PdfDownload {
        let html = render_report_document(document);
        let rendered = self.pdf.render_or_fallback(&html).await;
        PdfDownload {
            filename: attachment_filename(document.company_name.as_deref()),
            bytes: rendered.bytes,
            fallback: rendered.fallback,
        }
    }

    pub async fn submit_lead(&self, submission: LeadSubmission) -> Result<LeadDelivery, LeadError> {
        submission.validate()?;
        let notification = LeadNotification::from_submission(submission, Utc::now());
        Ok(self.leads.notify(&notification).await)
    }
}
