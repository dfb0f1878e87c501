use std::future::Future;

use serde_json::Value;

use crate::errors::AnalysisError;

/// Raw provider answer before any JSON interpretation.
#[derive(Debug, Clone, Default)]
pub struct ProviderReply {
    pub text: Option<String>,
    pub elapsed_ms: u128,
    pub model: Option<String>,
    pub usage: Option<String>,
}

/// One outbound generation call. Implementations must not retry.
pub trait AnalysisProvider {
    fn generate(
        &self,
        payload: &Value,
    ) -> impl Future<Output = Result<ProviderReply, AnalysisError>> + Send;
}
