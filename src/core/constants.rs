//! Defaults shared by the CLI, config resolution and the session.

pub const DEFAULT_BACKEND_URL: &str = "http://localhost:8000";

pub const DEFAULT_MODEL: &str = "llama3.2:3b";

/// Models the backend is known to serve well. Others are accepted but flagged.
pub const RECOMMENDED_MODELS: &[&str] = &[
    "llama3.2:3b",
    "llama3.1:8b",
    "qwen2.5-coder:7b",
    "deepseek-r1:7b",
    "gemma3:4b",
    "mistral:7b",
];

/// Overrides the configured backend URL.
pub const BACKEND_URL_ENV: &str = "LOCAL_REASON_BACKEND_URL";

pub fn is_recommended_model(model: &str) -> bool {
    RECOMMENDED_MODELS.contains(&model)
}
