use crate::core::constants::{is_recommended_model, DEFAULT_BACKEND_URL, DEFAULT_MODEL, RECOMMENDED_MODELS};
use crate::core::session::SessionSettings;
use crate::core::version::VersionToken;
use crate::utils::url::validate_base_url;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Startup defaults read from `config.toml`. Nothing here is ever written
/// back; changes made during a session stay in that session.
#[derive(Debug, Serialize, Deserialize, Default, Clone, PartialEq, Eq)]
pub struct Config {
    /// Backend base URL (e.g., "http://localhost:8000")
    pub backend_url: Option<String>,
    /// Model used when `-m` is not given
    pub default_model: Option<String>,
    /// Strategy used when `-s` is not given: plain, pipeline, rag or rag-2
    pub default_version: Option<VersionToken>,
    /// Models offered alongside the built-in recommendations
    #[serde(default)]
    pub extra_models: Vec<String>,
}

/// Values given on the command line; they beat the environment and the file.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SettingsOverrides {
    pub backend_url: Option<String>,
    pub model: Option<String>,
    pub version: Option<VersionToken>,
}

impl Config {
    pub fn model_choices(&self) -> Vec<&str> {
        let mut models: Vec<&str> = RECOMMENDED_MODELS.to_vec();
        for extra in &self.extra_models {
            if !models.contains(&extra.as_str()) {
                models.push(extra);
            }
        }
        models
    }

    pub fn is_known_model(&self, model: &str) -> bool {
        is_recommended_model(model) || self.extra_models.iter().any(|m| m == model)
    }

    /// Flag > environment > config file > built-in default.
    pub fn resolve_settings(
        &self,
        overrides: SettingsOverrides,
        env_backend_url: Option<String>,
    ) -> Result<SessionSettings, String> {
        let backend_url = overrides
            .backend_url
            .or(env_backend_url.filter(|url| !url.trim().is_empty()))
            .or_else(|| self.backend_url.clone())
            .unwrap_or_else(|| DEFAULT_BACKEND_URL.to_string());
        let backend_url = validate_base_url(&backend_url)?;

        let model = overrides
            .model
            .or_else(|| self.default_model.clone())
            .unwrap_or_else(|| DEFAULT_MODEL.to_string());
        if model.trim().is_empty() {
            return Err("Model name must not be empty".to_string());
        }

        let version = overrides
            .version
            .or(self.default_version)
            .unwrap_or_default();

        Ok(SessionSettings {
            backend_url,
            model,
            version,
        })
    }
}

/// Get a user-friendly display string for a path
/// Converts absolute paths to use ~ notation on Unix-like systems when possible
pub fn path_display<P: AsRef<Path>>(path: P) -> String {
    let path = path.as_ref();

    #[cfg(unix)]
    {
        if let Some(home) = std::env::var_os("HOME") {
            let home_path = PathBuf::from(home);
            if let Ok(relative) = path.strip_prefix(&home_path) {
                return format!("~/{}", relative.display());
            }
        }
    }

    path.display().to_string()
}
