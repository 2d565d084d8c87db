use std::{collections::HashMap, fs, path::PathBuf};

use anyhow::{Context, Result};

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8000";
pub const SETTINGS_FILE_NAME: &str = "teller.toml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientSettings {
    pub api_base_url: String,
    pub session_file: PathBuf,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.into(),
            session_file: default_session_file(),
        }
    }
}

pub fn default_session_file() -> PathBuf {
    dirs::data_local_dir()
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."))
        .join("teller")
        .join("session.json")
}

/// Defaults, then `teller.toml` in the working directory, then environment.
pub fn load_settings() -> Result<ClientSettings> {
    let file = match fs::read_to_string(SETTINGS_FILE_NAME) {
        Ok(raw) => Some(raw),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => None,
        Err(err) => {
            return Err(err).with_context(|| format!("failed to read {SETTINGS_FILE_NAME}"))
        }
    };
    resolve_settings(file.as_deref(), |name| std::env::var(name).ok())
}

pub fn resolve_settings(
    file: Option<&str>,
    env: impl Fn(&str) -> Option<String>,
) -> Result<ClientSettings> {
    let mut settings = ClientSettings::default();

    if let Some(raw) = file {
        let file_cfg = toml::from_str::<HashMap<String, String>>(raw)
            .with_context(|| format!("invalid {SETTINGS_FILE_NAME}"))?;
        if let Some(v) = file_cfg.get("api_base_url") {
            settings.api_base_url = v.clone();
        }
        if let Some(v) = file_cfg.get("session_file") {
            settings.session_file = PathBuf::from(v);
        }
    }

    let env = |name: &str| env(name).filter(|value| !value.trim().is_empty());

    if let Some(v) = env("BANK_API_URL") {
        settings.api_base_url = v;
    }
    if let Some(v) = env("APP__API_BASE_URL") {
        settings.api_base_url = v;
    }
    if let Some(v) = env("TELLER_SESSION_FILE") {
        settings.session_file = PathBuf::from(v);
    }

    settings.api_base_url = normalize_base_url(&settings.api_base_url);
    Ok(settings)
}

pub fn normalize_base_url(raw: &str) -> String {
    let trimmed = raw.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        return DEFAULT_API_BASE_URL.to_string();
    }
    trimmed.to_string()
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
