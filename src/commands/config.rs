use std::path::PathBuf;

use clap::{Subcommand, ValueEnum};
use serde_json::{Value, json};

use crate::app::Runtime;
use crate::config::{
    API_KEY_ENV_VARS, env_api_key, ensure_profile, profile_mut, profile_ref, save_config,
    validate_url,
};
use crate::errors::{CliError, redact_secret};

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Initialize config file and profile
    Init {
        #[arg(long = "api-url")]
        api_url: Option<String>,
        #[arg(long)]
        model: Option<String>,
        #[arg(long = "api-key")]
        api_key: Option<String>,
    },
    /// Read a config key from the active profile
    Get {
        key: ConfigKey,
        #[arg(long)]
        show_key: bool,
    },
    /// Set a config key on the active profile
    Set { key: ConfigKey, value: String },
    /// List all profiles
    Profiles,
    /// Switch active profile
    Use { profile: String },
    /// Print the config file location
    Path,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum ConfigKey {
    #[value(name = "apiUrl")]
    ApiUrl,
    #[value(name = "model")]
    Model,
    #[value(name = "apiKey")]
    ApiKey,
}

pub async fn handle(runtime: &mut Runtime, command: ConfigCommand) -> Result<(), CliError> {
    match command {
        ConfigCommand::Init {
            api_url,
            model,
            api_key,
        } => init(runtime, api_url, model, api_key).await,
        ConfigCommand::Get { key, show_key } => get(runtime, key, show_key).await,
        ConfigCommand::Set { key, value } => set(runtime, key, value).await,
        ConfigCommand::Profiles => profiles(runtime).await,
        ConfigCommand::Use { profile } => use_profile(runtime, profile).await,
        ConfigCommand::Path => path(runtime).await,
    }
}

async fn init(
    runtime: &mut Runtime,
    api_url: Option<String>,
    model: Option<String>,
    api_key: Option<String>,
) -> Result<(), CliError> {
    let profile_name = runtime.active_profile();
    ensure_profile(&mut runtime.config, &profile_name);
    if let Some(profile) = profile_mut(&mut runtime.config, &profile_name) {
        if let Some(url) = api_url {
            validate_url(&url)?;
            profile.api_url = url;
        }
        if let Some(value) = model.filter(|m| !m.trim().is_empty()) {
            profile.model = value.trim().to_string();
        }
        if let Some(value) = api_key.filter(|k| !k.trim().is_empty()) {
            profile.api_key = Some(value.trim().to_string());
        }
    }

    runtime.config.profile = profile_name;
    let path = persist(runtime)?;
    let message = format!("Config initialized: {}", path.display());
    finish(runtime, json!({ "ok": true, "path": path }), &message)
}

async fn get(runtime: &mut Runtime, key: ConfigKey, show_key: bool) -> Result<(), CliError> {
    let profile_name = runtime.active_profile();
    let profile = profile_ref(&runtime.config, &profile_name).ok_or_else(|| {
        CliError::Usage(format!(
            "Profile '{profile_name}' not found. Run `bizlens config init` first."
        ))
    })?;

    let (name, value) = match key {
        ConfigKey::ApiUrl => ("apiUrl", Some(profile.api_url.clone())),
        ConfigKey::Model => ("model", Some(profile.model.clone())),
        ConfigKey::ApiKey => {
            // The environment wins at call time, so report what would be used.
            let resolved = env_api_key().or_else(|| profile.api_key.clone());
            let display = resolved.map(|k| if show_key { k } else { redact_secret(&k) });
            ("apiKey", display)
        }
    };

    if runtime.output.json {
        runtime
            .output
            .print_json(&json!({ "key": name, "value": value }))?;
    } else if let Some(v) = value {
        runtime.output.print_human(&v);
    } else {
        runtime.output.print_human(&format!(
            "(not set; export {} or run `bizlens config set apiKey ...`)",
            API_KEY_ENV_VARS[0]
        ));
    }

    Ok(())
}

async fn set(runtime: &mut Runtime, key: ConfigKey, value: String) -> Result<(), CliError> {
    let profile_name = runtime.active_profile();
    ensure_profile(&mut runtime.config, &profile_name);
    let profile = profile_mut(&mut runtime.config, &profile_name).ok_or_else(|| {
        CliError::Generic(format!(
            "Failed to resolve profile '{profile_name}' while setting config."
        ))
    })?;

    let value = value.trim().to_string();
    match key {
        ConfigKey::ApiUrl => {
            validate_url(&value)?;
            profile.api_url = value;
        }
        ConfigKey::Model => {
            if value.is_empty() {
                return Err(CliError::Usage("Model name cannot be empty.".to_string()));
            }
            profile.model = value;
        }
        ConfigKey::ApiKey => {
            profile.api_key = if value.is_empty() { None } else { Some(value) };
        }
    }

    persist(runtime)?;
    finish(runtime, json!({ "ok": true }), "Config updated.")
}

async fn profiles(runtime: &mut Runtime) -> Result<(), CliError> {
    let active = runtime.active_profile();
    let mut names: Vec<String> = runtime.config.profiles.keys().cloned().collect();
    names.sort();

    if runtime.output.json {
        let payload = names
            .iter()
            .map(|name| {
                let profile = runtime.config.profiles.get(name);
                json!({
                    "name": name,
                    "active": name == &active,
                    "apiUrl": profile.map(|p| p.api_url.clone()).unwrap_or_default(),
                    "model": profile.map(|p| p.model.clone()).unwrap_or_default(),
                    "hasApiKey": profile
                        .and_then(|p| p.api_key.as_ref())
                        .map(|k| !k.is_empty())
                        .unwrap_or(false)
                })
            })
            .collect::<Vec<_>>();
        runtime.output.print_json(&json!({ "profiles": payload }))?;
        return Ok(());
    }

    for name in names {
        let marker = if name == active { "*" } else { " " };
        let model = runtime
            .config
            .profiles
            .get(&name)
            .map(|p| p.model.as_str())
            .unwrap_or("-");
        runtime.output.print_human(&format!("{marker} {name}  ({model})"));
    }
    Ok(())
}

async fn use_profile(runtime: &mut Runtime, profile_name: String) -> Result<(), CliError> {
    ensure_profile(&mut runtime.config, &profile_name);
    runtime.config.profile = profile_name.clone();
    persist(runtime)?;
    let message = format!("Active profile: {profile_name}");
    finish(runtime, json!({ "ok": true, "profile": profile_name }), &message)
}

async fn path(runtime: &mut Runtime) -> Result<(), CliError> {
    let message = runtime.config_path.display().to_string();
    finish(runtime, json!({ "path": runtime.config_path }), &message)
}

fn persist(runtime: &mut Runtime) -> Result<PathBuf, CliError> {
    let path = save_config(&runtime.config)?;
    runtime.config_path = path.clone();
    Ok(path)
}

/// Emit `payload` under `--json`, otherwise the human line.
fn finish(runtime: &Runtime, payload: Value, message: &str) -> Result<(), CliError> {
    if runtime.output.json {
        return runtime.output.print_json(&payload);
    }
    runtime.output.print_human(message);
    Ok(())
}
