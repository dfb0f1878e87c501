use std::time::{Duration, Instant};

use reqwest::{Client, StatusCode};
use serde_json::{Value, json};

use crate::config::env_api_key;
use crate::errors::{AnalysisError, CliError, redact_secret, with_debug_hint};
use crate::parse::response::{
    extract_candidate_text, extract_error_message, extract_model_version, extract_usage_line,
};
use crate::provider::{AnalysisProvider, ProviderReply};

pub const DEFAULT_API_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_MODEL: &str = "gemini-3-flash-preview";

#[derive(Debug, Clone)]
pub struct GeminiClient {
    client: Client,
    base_url: String,
    model: String,
    stored_key: Option<String>,
    debug: bool,
}

#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub elapsed_ms: u128,
    pub json: Value,
}

impl GeminiClient {
    /// `timeout_ms` of `None` leaves requests unbounded.
    pub fn new(
        base_url: String,
        model: String,
        stored_key: Option<String>,
        timeout_ms: Option<u64>,
        debug: bool,
    ) -> Result<Self, CliError> {
        let mut builder = Client::builder();
        if let Some(ms) = timeout_ms {
            builder = builder.timeout(Duration::from_millis(ms.max(1)));
        }
        let client = builder.build()?;
        Ok(Self {
            client,
            base_url,
            model,
            stored_key,
            debug,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            self.model.trim()
        )
    }

    /// Single POST to `generateContent`. The key is resolved here, per call, so
    /// a key exported after startup is picked up.
    pub async fn generate_content(&self, body: &Value) -> Result<ApiResponse, CliError> {
        let api_key = env_api_key().or_else(|| self.stored_key.clone());
        if api_key.is_none() {
            tracing::warn!("no API key configured; sending request without credentials");
        }

        let url = self.endpoint();
        tracing::debug!(url = %url, "sending generateContent request");

        let started = Instant::now();
        let mut request = self.client.post(url).json(body);
        if let Some(ref key) = api_key {
            request = request.header("x-goog-api-key", key);
        }

        let resp = request.send().await.map_err(|err| {
            let message = if err.is_timeout() {
                "Request timed out.".to_string()
            } else {
                format!("Network request failed: {err}")
            };
            CliError::Network(with_debug_hint(&message, self.debug))
        })?;

        let status = resp.status();
        let text = resp.text().await.map_err(|err| {
            let message = format!("Failed to read response body: {err}");
            CliError::Network(with_debug_hint(&message, self.debug))
        })?;
        let parsed = if text.trim().is_empty() {
            json!({})
        } else {
            serde_json::from_str::<Value>(&text).unwrap_or_else(|_| json!({ "raw": text }))
        };
        let elapsed_ms = started.elapsed().as_millis();
        tracing::debug!(status = status.as_u16(), elapsed_ms, "generateContent finished");

        if status.is_success() {
            return Ok(ApiResponse {
                elapsed_ms,
                json: parsed,
            });
        }

        Err(self.http_error(status, parsed, api_key.as_deref()))
    }

    fn http_error(&self, status: StatusCode, payload: Value, api_key: Option<&str>) -> CliError {
        let message = extract_error_message(&payload)
            .unwrap_or_else(|| format!("Request failed with status {}", status.as_u16()));

        let mut details = if self.debug {
            format!("{message} payload={payload}")
        } else {
            with_debug_hint(&message, false)
        };
        if let Some(key) = api_key.filter(|k| !k.is_empty()) {
            details = details.replace(key, &redact_secret(key));
        }

        match status.as_u16() {
            400 => CliError::Usage(details),
            401 | 403 => CliError::Auth(details),
            429 => CliError::RateLimited(details),
            500..=599 => CliError::Server(details),
            _ => CliError::Generic(details),
        }
    }
}

impl AnalysisProvider for GeminiClient {
    async fn generate(&self, payload: &Value) -> Result<ProviderReply, AnalysisError> {
        let res = self.generate_content(payload).await?;
        Ok(ProviderReply {
            text: extract_candidate_text(&res.json),
            elapsed_ms: res.elapsed_ms,
            model: extract_model_version(&res.json).or_else(|| Some(self.model.clone())),
            usage: Some(extract_usage_line(&res.json)),
        })
    }
}
