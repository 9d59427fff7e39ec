//! Library resources: named snippets of inline text or a URL that ground a
//! prompt.
//!
//! The backend stores the source mode as a boolean `isContent`; on the Rust
//! side it is the [`SourceMode`] enum and only the field it names is ever read
//! as the resource's payload.

use crate::core::error::ClientError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "bool", into = "bool")]
pub enum SourceMode {
    #[default]
    Content,
    Url,
}

impl SourceMode {
    pub fn as_str(self) -> &'static str {
        match self {
            SourceMode::Content => "content",
            SourceMode::Url => "url",
        }
    }
}

impl From<bool> for SourceMode {
    fn from(is_content: bool) -> Self {
        if is_content {
            SourceMode::Content
        } else {
            SourceMode::Url
        }
    }
}

impl From<SourceMode> for bool {
    fn from(mode: SourceMode) -> Self {
        mode == SourceMode::Content
    }
}

impl fmt::Display for SourceMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SourceMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "content" | "text" => Ok(SourceMode::Content),
            "url" | "link" => Ok(SourceMode::Url),
            other => Err(format!("Unknown source mode: {other}")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LibraryResource {
    pub id: i64,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "isContent", default)]
    pub source_mode: SourceMode,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}

impl LibraryResource {
    pub fn from_draft(id: i64, draft: &LibraryDraft) -> Self {
        Self {
            id,
            name: draft.name.clone(),
            description: draft.description.clone(),
            source_mode: draft.source_mode,
            content: draft.content.clone(),
            url: draft.url.clone(),
        }
    }

    /// The payload named by `source_mode`; the other field is ignored even
    /// when it holds data.
    pub fn active_payload(&self) -> Option<&str> {
        match self.source_mode {
            SourceMode::Content => self.content.as_deref(),
            SourceMode::Url => self.url.as_deref(),
        }
    }

    pub fn apply_patch(&mut self, patch: &LibraryPatch) {
        if let Some(name) = &patch.name {
            self.name = name.clone();
        }
        if let Some(description) = &patch.description {
            self.description = Some(description.clone());
        }
        if let Some(mode) = patch.source_mode {
            self.source_mode = mode;
        }
        if let Some(content) = &patch.content {
            self.content = Some(content.clone());
        }
        if let Some(url) = &patch.url {
            self.url = Some(url.clone());
        }
    }

    /// Field-wise comparison with a draft, ignoring the server-assigned id.
    pub fn matches_draft(&self, draft: &LibraryDraft) -> bool {
        self.name == draft.name
            && self.description == draft.description
            && self.source_mode == draft.source_mode
            && self.active_payload() == draft.active_payload()
    }
}

/// Everything needed to create a library; the backend assigns the id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LibraryDraft {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "isContent")]
    pub source_mode: SourceMode,
    pub content: Option<String>,
    pub url: Option<String>,
}

impl LibraryDraft {
    pub fn content(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            source_mode: SourceMode::Content,
            content: Some(content.into()),
            ..Default::default()
        }
    }

    pub fn url(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            source_mode: SourceMode::Url,
            url: Some(url.into()),
            ..Default::default()
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn active_payload(&self) -> Option<&str> {
        match self.source_mode {
            SourceMode::Content => self.content.as_deref(),
            SourceMode::Url => self.url.as_deref(),
        }
    }

    pub fn validate(&self) -> Result<(), ClientError> {
        if self.name.trim().is_empty() {
            return Err(ClientError::InvalidResource("name must not be empty".into()));
        }
        match self.active_payload() {
            Some(payload) if !payload.trim().is_empty() => Ok(()),
            _ => Err(ClientError::InvalidResource(format!(
                "{} must not be empty",
                self.source_mode
            ))),
        }
    }
}

/// Partial update; absent fields are left out of the request body.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LibraryPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "isContent", skip_serializing_if = "Option::is_none")]
    pub source_mode: Option<SourceMode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl LibraryPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.description.is_none()
            && self.source_mode.is_none()
            && self.content.is_none()
            && self.url.is_none()
    }

    pub fn validate(&self) -> Result<(), ClientError> {
        if self.is_empty() {
            return Err(ClientError::InvalidResource("nothing to update".into()));
        }
        if matches!(&self.name, Some(name) if name.trim().is_empty()) {
            return Err(ClientError::InvalidResource("name must not be empty".into()));
        }
        Ok(())
    }
}
