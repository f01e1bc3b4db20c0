use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

use crate::protocol::UpdateEmployeeRequest;

/// Opaque identifier assigned by the remote API.
///
/// The API may key employees by GUID or by integer, so both JSON strings and
/// JSON numbers are accepted and kept as text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct EmployeeId(pub String);

impl EmployeeId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EmployeeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.0)
    }
}

impl From<&str> for EmployeeId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl<'de> Deserialize<'de> for EmployeeId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawId {
            Text(String),
            Signed(i64),
            Unsigned(u64),
        }

        Ok(match RawId::deserialize(deserializer)? {
            RawId::Text(value) => Self(value),
            RawId::Signed(value) => Self(value.to_string()),
            RawId::Unsigned(value) => Self(value.to_string()),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Employee {
    pub id: EmployeeId,
    pub full_name: String,
    pub document: String,
    pub email: String,
    /// Canonically `yyyy-MM-dd`; the API may send a full timestamp.
    pub hire_date: String,
    pub is_active: bool,
}

impl Employee {
    /// Returns a copy with every editable field taken from `patch`. The id is kept.
    pub fn patched(&self, patch: &UpdateEmployeeRequest) -> Self {
        Self {
            id: self.id.clone(),
            full_name: patch.full_name.clone(),
            document: patch.document.clone(),
            email: patch.email.clone(),
            hire_date: patch.hire_date.clone(),
            is_active: patch.is_active,
        }
    }
}

/// Truncates a date or timestamp to its `yyyy-MM-dd` prefix.
pub fn normalize_hire_date(raw: &str) -> String {
    raw.chars().take(10).collect()
}
