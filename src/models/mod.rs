//! Request/response pair exchanged with the analysis service.

pub mod request;
pub mod response;

pub use request::AnalysisRequest;
pub use response::{AnalysisReport, AnalysisResponse};
