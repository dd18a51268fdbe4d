//! Service account key payload.

use serde::Deserialize;
use std::fmt;

/// Raw service account key text.
///
/// `Debug` never prints the secret.
#[derive(Clone, PartialEq, Eq)]
pub struct CredentialPayload {
    raw: String,
}

#[derive(Deserialize)]
struct KeyFields {
    #[serde(default)]
    project_id: Option<String>,
}

impl CredentialPayload {
    pub fn new(raw: impl Into<String>) -> Self {
        Self { raw: raw.into() }
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.raw.as_bytes()
    }

    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    /// The `project_id` embedded in the key, if the key is JSON and carries one.
    pub fn project_id(&self) -> Option<String> {
        let fields: KeyFields = serde_json::from_str(&self.raw).ok()?;
        fields
            .project_id
            .map(|id| id.trim().to_string())
            .filter(|id| !id.is_empty())
    }
}

impl fmt::Debug for CredentialPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialPayload")
            .field("raw", &"<redacted>")
            .field("len", &self.raw.len())
            .finish()
    }
}
