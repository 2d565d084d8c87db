use serde::{Deserialize, Serialize};

/// Error payload returned by the banking API on any non-2xx response.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ErrorBody {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<ErrorDetail>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ErrorDetail {
    Message(String),
    /// Request validation failures are reported as a list of issues.
    Issues(Vec<ValidationIssue>),
    Other(serde_json::Value),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationIssue {
    pub msg: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub loc: Vec<serde_json::Value>,
}

impl ErrorBody {
    pub fn new(detail: impl Into<String>) -> Self {
        Self {
            detail: Some(ErrorDetail::Message(detail.into())),
        }
    }

    /// Human-readable message carried by `detail`, if there is a usable one.
    pub fn message(&self) -> Option<String> {
        match self.detail.as_ref()? {
            ErrorDetail::Message(message) if !message.trim().is_empty() => Some(message.clone()),
            ErrorDetail::Message(_) => None,
            ErrorDetail::Issues(issues) => {
                let joined = issues
                    .iter()
                    .map(|issue| issue.msg.trim())
                    .filter(|msg| !msg.is_empty())
                    .collect::<Vec<_>>()
                    .join("; ");
                (!joined.is_empty()).then_some(joined)
            }
            ErrorDetail::Other(_) => None,
        }
    }
}
