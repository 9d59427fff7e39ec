//! Strategy versions and the endpoint each one is served from.

use crate::core::error::ClientError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Backend processing strategy for a submission.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(try_from = "String", into = "String")]
pub enum VersionToken {
    /// Prompt goes straight to the model, no grounding.
    Plain,
    /// Two LLM calls: extract from the full library text, then answer.
    Pipeline,
    /// Vector retrieval over the selected libraries, then answer.
    #[default]
    Rag,
    /// Retrieval, an LLM condensation pass, then answer.
    Rag2,
}

impl VersionToken {
    pub const ALL: [VersionToken; 4] = [
        VersionToken::Plain,
        VersionToken::Pipeline,
        VersionToken::Rag,
        VersionToken::Rag2,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            VersionToken::Plain => "plain",
            VersionToken::Pipeline => "pipeline",
            VersionToken::Rag => "rag",
            VersionToken::Rag2 => "rag-2",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            VersionToken::Plain => "Plain",
            VersionToken::Pipeline => "Pipeline",
            VersionToken::Rag => "RAG",
            VersionToken::Rag2 => "RAG-2",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            VersionToken::Plain => "Send the prompt as-is, no library context",
            VersionToken::Pipeline => "Extract relevant passages with a first LLM pass, then answer",
            VersionToken::Rag => "Retrieve matching chunks from selected libraries, then answer",
            VersionToken::Rag2 => "Retrieve chunks, condense them with an LLM pass, then answer",
        }
    }

    /// Whether the endpoint reads `selected_libraries`.
    pub fn supports_grounding(self) -> bool {
        !matches!(self, VersionToken::Plain)
    }
}

impl fmt::Display for VersionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VersionToken {
    type Err = ClientError;

    /// Accepts names (`plain`, `pipeline`, `rag`, `rag-2`) and the numeric
    /// toggle values `0`..`3`. Nothing else resolves.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "plain" | "0" => Ok(VersionToken::Plain),
            "pipeline" | "1" => Ok(VersionToken::Pipeline),
            "rag" | "2" => Ok(VersionToken::Rag),
            "rag-2" | "rag2" | "rag_2" | "3" => Ok(VersionToken::Rag2),
            _ => Err(ClientError::InvalidVersion(s.to_string())),
        }
    }
}

impl TryFrom<String> for VersionToken {
    type Error = ClientError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<VersionToken> for String {
    fn from(token: VersionToken) -> Self {
        token.as_str().to_string()
    }
}

/// Fixed token → endpoint table.
pub struct VersionRouter;

impl VersionRouter {
    pub fn resolve(token: VersionToken) -> &'static str {
        match token {
            VersionToken::Plain => "api/chat",
            VersionToken::Pipeline => "api/chat-pipeline",
            VersionToken::Rag => "api/chat-rag",
            VersionToken::Rag2 => "api/chat-rag-2",
        }
    }

    /// Parses then resolves; an unknown token is `InvalidVersion`, never a
    /// fallback endpoint.
    pub fn resolve_str(token: &str) -> Result<&'static str, ClientError> {
        token.parse::<VersionToken>().map(Self::resolve)
    }

    pub fn routes() -> impl Iterator<Item = (VersionToken, &'static str)> {
        VersionToken::ALL
            .into_iter()
            .map(|token| (token, Self::resolve(token)))
    }
}
