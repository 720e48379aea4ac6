use serde::{Deserialize, Serialize};

/// Error body returned by every failing broker request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OsbError {
    /// Short, stable description of what went wrong.
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl OsbError {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            description: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}
