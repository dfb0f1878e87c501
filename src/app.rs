use std::path::PathBuf;

use crate::api::GeminiClient;
use crate::config::{
    CliConfig, active_profile_name, resolve_api_url, resolve_model, stored_api_key,
};
use crate::errors::CliError;
use crate::output::OutputMode;

#[derive(Debug, Clone)]
pub struct Runtime {
    pub output: OutputMode,
    pub config: CliConfig,
    pub config_path: PathBuf,
    pub profile_override: Option<String>,
    pub api_url_override: Option<String>,
    pub model_override: Option<String>,
    pub timeout_ms: Option<u64>,
}

impl Runtime {
    pub fn active_profile(&self) -> String {
        active_profile_name(&self.config, self.profile_override.as_deref())
    }

    pub fn resolved_api_url(&self) -> Result<String, CliError> {
        resolve_api_url(
            &self.config,
            &self.active_profile(),
            self.api_url_override.as_deref(),
        )
    }

    pub fn resolved_model(&self) -> String {
        resolve_model(
            &self.config,
            &self.active_profile(),
            self.model_override.as_deref(),
        )
    }

    pub fn gemini_client(&self) -> Result<GeminiClient, CliError> {
        GeminiClient::new(
            self.resolved_api_url()?,
            self.resolved_model(),
            stored_api_key(&self.config, &self.active_profile()),
            self.timeout_ms,
            self.output.debug,
        )
    }
}
