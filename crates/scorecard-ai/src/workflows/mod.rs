pub mod assessment;
pub mod report;
pub mod router;
pub mod service;

pub use router::scorecard_router;
pub use service::{
    PdfDownload, ScorecardError, ScorecardRequest, ScorecardResponse, ScorecardService,
    GENERATE_REPORT,
};
