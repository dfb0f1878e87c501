pub mod client;
pub mod request;
pub mod result;
pub mod schema;

pub use client::{Analysis, analyze, run_request};
pub use request::AnalysisRequest;
pub use result::{AnalysisResult, ScoreBand, TechSolution};
