use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use tracing::warn;

use super::service::{ScorecardRequest, ScorecardService};
use crate::delivery::{LeadSubmission, ReportDocument};
use crate::error::AppError;

/// Router exposing the assessment, PDF download, and lead capture endpoints.
pub fn scorecard_router(service: Arc<ScorecardService>) -> Router {
    Router::new()
        .route("/scorecard-ai", post(scorecard_handler))
        .route("/api/v1/reports/pdf", post(pdf_handler))
        .route("/api/v1/leads", post(lead_handler))
        .with_state(service)
}

pub(crate) async fn scorecard_handler(
    State(service): State<Arc<ScorecardService>>,
    payload: Result<Json<ScorecardRequest>, JsonRejection>,
) -> Response {
    let Json(request) = match payload {
        Ok(body) => body,
        Err(rejection) => return AppError::from(rejection).into_response(),
    };

    match service.handle(request).await {
        Ok(body) => (StatusCode::OK, Json(body)).into_response(),
        Err(err) => AppError::from(err).into_response(),
    }
}

pub(crate) async fn pdf_handler(
    State(service): State<Arc<ScorecardService>>,
    payload: Result<Json<ReportDocument>, JsonRejection>,
) -> Response {
    let Json(document) = match payload {
        Ok(body) => body,
        Err(rejection) => return AppError::from(rejection).into_response(),
    };

    let download = service.render_pdf(&document).await;
    let disposition = HeaderValue::from_str(&format!(
        "attachment; filename=\"{}\"",
        download.filename
    ))
    .unwrap_or_else(|_| {
        warn!(filename = %download.filename, "unusable attachment name, using default");
        HeaderValue::from_static("attachment; filename=\"ai-scorecard-report.pdf\"")
    });

    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, HeaderValue::from_static("application/pdf")),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        download.bytes,
    )
        .into_response()
}

pub(crate) async fn lead_handler(
    State(service): State<Arc<ScorecardService>>,
    payload: Result<Json<LeadSubmission>, JsonRejection>,
) -> Response {
    let Json(submission) = match payload {
        Ok(body) => body,
        Err(rejection) => return AppError::from(rejection).into_response(),
    };

    match service.submit_lead(submission).await {
        Ok(delivery) => (StatusCode::OK, Json(delivery)).into_response(),
        Err(err) => AppError::from(err).into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::delivery::{LeadNotifier, PdfRenderer};
    use crate::providers::{LlmProvider, ProviderKind, ProviderManager};
    use crate::workflows::assessment::tests::common::{question_reply, StubProvider};
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use serde_json::{json, Value};
    use std::time::Duration;
    use tower::ServiceExt;

    struct Harness {
        router: Router,
        log_dir: tempfile::TempDir,
    }

    fn harness(stub: StubProvider) -> Harness {
        let log_dir = tempfile::tempdir().expect("temp dir");
        let provider = Arc::new(stub) as Arc<dyn LlmProvider>;
        let manager = Arc::new(ProviderManager::new(
            Some(Arc::clone(&provider)),
            vec![provider],
        ));
        let service = ScorecardService::new(
            manager,
            20,
            PdfRenderer::new("http://127.0.0.1:9/generate-pdf", Duration::from_millis(200))
                .expect("pdf client"),
            LeadNotifier::new(log_dir.path(), None).expect("lead notifier"),
        );
        Harness {
            router: scorecard_router(Arc::new(service)),
            log_dir,
        }
    }

    fn json_post(uri: &str, body: Value) -> Request<Body> {
        Request::post(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .expect("request builds")
    }

    async fn json_body(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body readable");
        serde_json::from_slice(&bytes).expect("json body")
    }

    #[tokio::test]
    async fn scorecard_route_returns_next_question() {
        let harness = harness(
            StubProvider::new(ProviderKind::OpenAi)
                .with_questions(vec![question_reply("How mature is your AI strategy?", "scale")]),
        );

        let response = harness
            .router
            .oneshot(json_post(
                "/scorecard-ai",
                json!({ "industry": "Retail", "history": [] }),
            ))
            .await
            .expect("router responds");

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["questionText"], "How mature is your AI strategy?");
        assert_eq!(body["options"], json!(["1", "2", "3", "4", "5"]));
    }

    #[tokio::test]
    async fn missing_content_type_is_rejected() {
        let harness = harness(StubProvider::new(ProviderKind::OpenAi));

        let response = harness
            .router
            .oneshot(
                Request::post("/scorecard-ai")
                    .body(Body::from("{}"))
                    .expect("request builds"),
            )
            .await
            .expect("router responds");

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = json_body(response).await;
        assert_eq!(body["error"], "Invalid content type");
        assert_eq!(body["message"], "Request must be application/json");
    }

    #[tokio::test]
    async fn malformed_json_is_rejected() {
        let harness = harness(StubProvider::new(ProviderKind::OpenAi));

        let response = harness
            .router
            .oneshot(
                Request::post("/scorecard-ai")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from("{\"history\": ["))
                    .expect("request builds"),
            )
            .await
            .expect("router responds");

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(response).await["error"], "Invalid JSON");
    }

    #[tokio::test]
    async fn unavailable_question_provider_is_a_server_error() {
        let harness = harness(StubProvider::new(ProviderKind::OpenAi).unavailable());

        let response = harness
            .router
            .oneshot(json_post("/scorecard-ai", json!({ "industry": "Retail" })))
            .await
            .expect("router responds");

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = json_body(response).await;
        assert_eq!(body["error"], "Failed to generate question");
        assert!(body["message"]
            .as_str()
            .is_some_and(|message| message.contains("OpenAI is not available")));
    }

    #[tokio::test]
    async fn failed_report_chain_is_a_server_error() {
        let harness = harness(StubProvider::new(ProviderKind::OpenAi));

        let response = harness
            .router
            .oneshot(json_post(
                "/scorecard-ai",
                json!({ "action": "generateReport", "industry": "Retail", "history": [] }),
            ))
            .await
            .expect("router responds");

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json_body(response).await["error"], "Failed to generate report");
    }

    #[tokio::test]
    async fn pdf_route_serves_attachment() {
        let harness = harness(StubProvider::new(ProviderKind::OpenAi));

        let response = harness
            .router
            .oneshot(json_post(
                "/api/v1/reports/pdf",
                json!({
                    "reportMarkdown": "## Overall Tier: Leader",
                    "userAITier": "Leader",
                    "finalScore": 88,
                    "companyName": "Acme Retail"
                }),
            ))
            .await
            .expect("router responds");

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            HeaderValue::from_static("application/pdf")
        );
        assert_eq!(
            response.headers()[header::CONTENT_DISPOSITION],
            HeaderValue::from_static("attachment; filename=\"ai-scorecard-acme-retail.pdf\"")
        );
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body readable");
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[tokio::test]
    async fn lead_route_logs_and_reports_success() {
        let harness = harness(StubProvider::new(ProviderKind::OpenAi));
        let log_dir = harness.log_dir.path().to_path_buf();

        let response = harness
            .router
            .oneshot(json_post(
                "/api/v1/leads",
                json!({
                    "leadName": "Riley Chen",
                    "leadCompany": "Acme Retail",
                    "leadEmail": "riley@example.com",
                    "consent": true,
                    "type": "leadCapture"
                }),
            ))
            .await
            .expect("router responds");

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["success"], true);
        assert_eq!(body["method"], "file-log-only");
        assert_eq!(body["fileLogged"], true);
        let logged = std::fs::read_dir(&log_dir).expect("log dir").count();
        assert_eq!(logged, 1);
    }

    #[tokio::test]
    async fn lead_route_requires_contact_fields() {
        let harness = harness(StubProvider::new(ProviderKind::OpenAi));

        let response = harness
            .router
            .oneshot(json_post("/api/v1/leads", json!({ "leadName": "Riley Chen" })))
            .await
            .expect("router responds");

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            json_body(response).await["message"],
            "Missing required fields. Name, company, email, and consent are required."
        );
    }
}
