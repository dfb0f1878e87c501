use crate::analysis::request::AnalysisRequest;
use crate::analysis::result::{AnalysisResult, parse_analysis};
use crate::errors::AnalysisError;
use crate::provider::{AnalysisProvider, ProviderReply};

/// A parsed result plus what the provider reported about the call.
#[derive(Debug, Clone)]
pub struct Analysis {
    pub result: AnalysisResult,
    pub elapsed_ms: u128,
    pub model: Option<String>,
    pub usage: Option<String>,
}

/// Validate the input, issue exactly one provider call and parse the reply.
pub async fn analyze<P: AnalysisProvider>(
    provider: &P,
    idea_text: &str,
    category_id: &str,
) -> Result<AnalysisResult, AnalysisError> {
    let request = AnalysisRequest::new(idea_text, category_id)?;
    Ok(run_request(provider, &request).await?.result)
}

pub async fn run_request<P: AnalysisProvider>(
    provider: &P,
    request: &AnalysisRequest,
) -> Result<Analysis, AnalysisError> {
    let payload = request.to_payload();
    let ProviderReply {
        text,
        elapsed_ms,
        model,
        usage,
    } = provider.generate(&payload).await?;

    let text = text
        .filter(|t| !t.trim().is_empty())
        .ok_or(AnalysisError::EmptyResponse)?;
    let result = parse_analysis(&text)?;

    tracing::debug!(
        elapsed_ms,
        score = result.feasibility_score,
        category = %request.category_id,
        "analysis parsed"
    );

    Ok(Analysis {
        result,
        elapsed_ms,
        model,
        usage,
    })
}
