//! Backend URL construction.
//!
//! The backend base URL is typed in by the user, so it may or may not carry a
//! trailing slash. Everything that builds a request URL goes through here.

/// Strip trailing slashes from a base URL.
///
/// ```
/// use local_reason::utils::url::normalize_base_url;
///
/// assert_eq!(normalize_base_url("http://localhost:8000/"), "http://localhost:8000");
/// ```
pub fn normalize_base_url(base_url: &str) -> String {
    base_url.trim().trim_end_matches('/').to_string()
}

/// Join a base URL and an endpoint path with exactly one slash.
///
/// ```
/// use local_reason::utils::url::construct_api_url;
///
/// assert_eq!(
///     construct_api_url("http://localhost:8000/", "/api/chat-rag"),
///     "http://localhost:8000/api/chat-rag"
/// );
/// ```
pub fn construct_api_url(base_url: &str, endpoint: &str) -> String {
    let normalized_base = normalize_base_url(base_url);
    let endpoint = endpoint.trim_start_matches('/');
    format!("{normalized_base}/{endpoint}")
}

/// Collection URL. The trailing slash matters: the backend routes
/// `/db/libraries/` and `/db/libraries` differently.
pub fn libraries_url(base_url: &str) -> String {
    construct_api_url(base_url, "db/libraries/")
}

pub fn library_url(base_url: &str, id: i64) -> String {
    construct_api_url(base_url, &format!("db/libraries/{id}"))
}

/// Rejects base URLs reqwest could never send to, before they reach a session.
pub fn validate_base_url(base_url: &str) -> Result<String, String> {
    let normalized = normalize_base_url(base_url);
    let has_scheme = normalized.starts_with("http://") || normalized.starts_with("https://");
    let has_host = normalized
        .split_once("://")
        .map(|(_, rest)| !rest.is_empty())
        .unwrap_or(false);
    if has_scheme && has_host {
        Ok(normalized)
    } else {
        Err(format!(
            "Backend URL must look like http://host:port, got '{base_url}'"
        ))
    }
}
