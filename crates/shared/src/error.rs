use serde::{Deserialize, Serialize};

/// Error body the API may attach to a non-success response.
///
/// Only `message` is consumed; any other fields are ignored.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApiErrorBody {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ApiErrorBody {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
        }
    }

    /// Parses a raw response body, returning the trimmed message when present.
    pub fn message_from_bytes(body: &[u8]) -> Option<String> {
        let parsed: Self = serde_json::from_slice(body).ok()?;
        parsed
            .message
            .map(|message| message.trim().to_string())
            .filter(|message| !message.is_empty())
    }
}
