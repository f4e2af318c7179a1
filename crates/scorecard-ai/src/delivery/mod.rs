//! Getting a finished report out of the service: printable HTML, PDF rendering, lead capture.

pub mod html;
pub mod leads;
pub mod pdf;

pub use html::{escape_html, markdown_to_html, render_report_document, ReportDocument};
pub use leads::{LeadDelivery, LeadError, LeadNotification, LeadNotifier, LeadSubmission};
pub use pdf::{
    attachment_filename, PdfError, PdfRenderer, RenderedPdf, DEFAULT_PDF_FILENAME, FALLBACK_PDF,
};
