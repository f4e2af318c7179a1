//! Final report generation: tier-specific prompts, provider fallback, and cleanup.

pub mod prompt;
pub mod sanitizer;
pub mod service;

pub use prompt::{company_name, PersonaBundle, ReportAudience, ReportPrompt};
pub use sanitizer::{ReportSanitizer, SanitizationWarning};
pub use service::{
    extract_final_score, extract_tier, ReportError, ReportOutcome, ReportRequest, ReportService,
    RESULTS_GENERATED,
};
