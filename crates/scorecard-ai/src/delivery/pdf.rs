use std::time::Duration;

use serde::Serialize;
use thiserror::Error;
use tracing::{info, warn};

use crate::config::DeliveryConfig;

pub const DEFAULT_PDF_FILENAME: &str = "ai-scorecard-report.pdf";
const ERROR_BODY_LIMIT: usize = 300;

/// Single-page document served when the rendering service cannot be reached.
pub const FALLBACK_PDF: &str = "%PDF-1.4
1 0 obj
<< /Type /Catalog /Pages 2 0 R >>
endobj
2 0 obj
<< /Type /Pages /Kids [3 0 R] /Count 1 >>
endobj
3 0 obj
<< /Type /Page /Parent 2 0 R /Resources << /Font << /F1 << /Type /Font /Subtype /Type1 /BaseFont /Helvetica >> >> >> /MediaBox [0 0 612 792] /Contents 4 0 R >>
endobj
4 0 obj
<< /Length 200 >>
stream
BT
/F1 16 Tf
50 700 Td
(PDF Generation Service Unavailable) Tj
0 -30 Td
/F1 12 Tf
(The WeasyPrint service is not accessible.) Tj
0 -20 Td
(Please contact support for assistance.) Tj
0 -40 Td
(HTML content has been generated but could not be converted to PDF.) Tj
ET
endstream
endobj
xref
0 5
0000000000 65535 f
0000000009 00000 n
0000000058 00000 n
0000000115 00000 n
0000000308 00000 n
trailer
<< /Size 5 /Root 1 0 R >>
startxref
560
%%EOF";

#[derive(Debug, Error)]
pub enum PdfError {
    #[error("failed to build PDF client: {0}")]
    Client(#[source] reqwest::Error),
    #[error("PDF service request failed: {0}")]
    Transport(#[source] reqwest::Error),
    #[error("PDF service returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("PDF service returned {content_type:?} instead of a PDF")]
    ContentType { content_type: Option<String> },
    #[error("PDF service returned an empty document")]
    Empty,
    #[error("PDF service did not answer within {}s", .0.as_secs())]
    Timeout(Duration),
}

#[derive(Serialize)]
struct RenderRequest<'a> {
    html: &'a str,
}

/// Bytes handed back to the client, flagged when they are the fallback page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedPdf {
    pub bytes: Vec<u8>,
    pub fallback: bool,
}

/// Client for the HTML-to-PDF rendering service.
#[derive(Debug, Clone)]
pub struct PdfRenderer {
    http: reqwest::Client,
    service_url: String,
    timeout: Duration,
}

impl PdfRenderer {
    pub fn new(service_url: impl Into<String>, timeout: Duration) -> Result<Self, PdfError> {
        let http = reqwest::Client::builder()
            .build()
            .map_err(PdfError::Client)?;
        Ok(Self {
            http,
            service_url: service_url.into(),
            timeout,
        })
    }

    pub fn from_config(config: &DeliveryConfig) -> Result<Self, PdfError> {
        Self::new(config.pdf_service_url.clone(), config.pdf_timeout)
    }

    pub async fn render(&self, html: &str) -> Result<Vec<u8>, PdfError> {
        tokio::time::timeout(self.timeout, self.request(html))
            .await
            .map_err(|_| PdfError::Timeout(self.timeout))?
    }

    /// Never fails: any rendering error yields [`FALLBACK_PDF`].
    pub async fn render_or_fallback(&self, html: &str) -> RenderedPdf {
        match self.render(html).await {
            Ok(bytes) => {
                info!(bytes = bytes.len(), "pdf rendered");
                RenderedPdf {
                    bytes,
                    fallback: false,
                }
            }
            Err(err) => {
                warn!(error = %err, url = %self.service_url, "pdf rendering failed, serving fallback document");
                RenderedPdf {
                    bytes: FALLBACK_PDF.as_bytes().to_vec(),
                    fallback: true,
                }
            }
        }
    }

    async fn request(&self, html: &str) -> Result<Vec<u8>, PdfError> {
        let response = self
            .http
            .post(&self.service_url)
            .header(reqwest::header::ACCEPT, "application/pdf")
            .json(&RenderRequest { html })
            .send()
            .await
            .map_err(PdfError::Transport)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(PdfError::Status {
                status: status.as_u16(),
                body: body.chars().take(ERROR_BODY_LIMIT).collect(),
            });
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);
        if !content_type
            .as_deref()
            .is_some_and(|value| value.contains("application/pdf"))
        {
            return Err(PdfError::ContentType { content_type });
        }

        let bytes = response.bytes().await.map_err(PdfError::Transport)?;
        if bytes.is_empty() {
            return Err(PdfError::Empty);
        }
        Ok(bytes.to_vec())
    }
}

/// `ai-scorecard-<company-slug>.pdf`, or the generic name when no usable company is known.
/// The slug keeps ASCII only so it is always a valid header value.
pub fn attachment_filename(company: Option<&str>) -> String {
    let slug = company
        .filter(|name| *name != "N/A")
        .map(|name| {
            name.chars()
                .filter(|ch| ch.is_ascii_alphanumeric() || *ch == '_' || *ch == '-' || ch.is_whitespace())
                .collect::<String>()
        })
        .map(|cleaned| {
            cleaned
                .split_whitespace()
                .collect::<Vec<_>>()
                .join("-")
                .to_lowercase()
        })
        .filter(|slug| !slug.is_empty());

    match slug {
        Some(slug) => format!("ai-scorecard-{slug}.pdf"),
        None => DEFAULT_PDF_FILENAME.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httptest::{matchers::*, responders::*, Expectation, Server};
    use serde_json::json;

    fn renderer(server: &Server, timeout: Duration) -> PdfRenderer {
        PdfRenderer::new(server.url_str("/generate-pdf"), timeout).expect("client builds")
    }

    #[tokio::test]
    async fn posts_html_and_returns_pdf_bytes() {
        let server = Server::run();
        server.expect(
            Expectation::matching(all_of![
                request::method_path("POST", "/generate-pdf"),
                request::body(json_decoded(eq(json!({ "html": "<p>report</p>" })))),
            ])
            .respond_with(
                status_code(200)
                    .insert_header("Content-Type", "application/pdf")
                    .body("%PDF-1.7 rendered"),
            ),
        );

        let bytes = renderer(&server, Duration::from_secs(5))
            .render("<p>report</p>")
            .await
            .expect("pdf rendered");
        assert_eq!(bytes, b"%PDF-1.7 rendered");
    }

    #[tokio::test]
    async fn service_error_serves_fallback_document() {
        let server = Server::run();
        server.expect(
            Expectation::matching(request::method_path("POST", "/generate-pdf"))
                .respond_with(status_code(502).body("bad gateway")),
        );

        let rendered = renderer(&server, Duration::from_secs(5))
            .render_or_fallback("<p>report</p>")
            .await;
        assert!(rendered.fallback);
        assert!(rendered.bytes.starts_with(b"%PDF-1.4"));
        let text = String::from_utf8(rendered.bytes).expect("fallback is ascii");
        assert!(text.contains("(PDF Generation Service Unavailable) Tj"));
        assert!(text.ends_with("%%EOF"));
    }

    #[tokio::test]
    async fn non_pdf_content_is_rejected() {
        let server = Server::run();
        server.expect(
            Expectation::matching(request::method_path("POST", "/generate-pdf")).respond_with(
                status_code(200)
                    .insert_header("Content-Type", "text/html")
                    .body("<html></html>"),
            ),
        );

        let err = renderer(&server, Duration::from_secs(5))
            .render("<p>report</p>")
            .await
            .expect_err("html is not a pdf");
        match err {
            PdfError::ContentType { content_type } => {
                assert_eq!(content_type.as_deref(), Some("text/html"))
            }
            other => panic!("expected content type error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn slow_service_times_out() {
        let server = Server::run();
        server.expect(
            Expectation::matching(request::method_path("POST", "/generate-pdf")).respond_with(
                delay_and_then(
                    Duration::from_secs(2),
                    status_code(200)
                        .insert_header("Content-Type", "application/pdf")
                        .body("%PDF-1.7 late"),
                ),
            ),
        );

        let err = renderer(&server, Duration::from_millis(100))
            .render("<p>report</p>")
            .await
            .expect_err("deadline exceeded");
        assert!(matches!(err, PdfError::Timeout(_)));
    }

    #[test]
    fn filenames_are_slugged_from_company() {
        assert_eq!(attachment_filename(Some("Acme Retail Co.")), "ai-scorecard-acme-retail-co.pdf");
        assert_eq!(attachment_filename(Some("  Müller & Söhne ")), "ai-scorecard-mller-shne.pdf");
        assert_eq!(attachment_filename(Some("N/A")), DEFAULT_PDF_FILENAME);
        assert_eq!(attachment_filename(Some("!!!")), DEFAULT_PDF_FILENAME);
        assert_eq!(attachment_filename(None), DEFAULT_PDF_FILENAME);
    }
}
