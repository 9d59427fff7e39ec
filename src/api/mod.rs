use serde::{Deserialize, Serialize};

pub mod transport;

/// Body posted to a chat strategy endpoint.
///
/// `selected_libraries` is omitted entirely for strategies that do not ground
/// against libraries; grounding strategies always send it, possibly empty.
#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct ChatPayload<'a> {
    pub prompt: &'a str,
    pub model: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selected_libraries: Option<&'a [i64]>,
}

/// Reply from any chat strategy endpoint.
///
/// The two-stage strategies also return the intermediate `analysis` text they
/// fed into the final prompt.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct ChatReply {
    pub response: String,
    #[serde(default)]
    pub analysis: Option<String>,
}
