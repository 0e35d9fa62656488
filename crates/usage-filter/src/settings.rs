//! Filter configuration ("valves" in host-framework terms).

use schemars::{schema_for, JsonSchema};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// User-configurable settings, set once at filter construction.
///
/// `#[serde(default)]` lets the host hand over a partial JSON object and get
/// the documented defaults for everything it left out.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
#[serde(default)]
pub struct Settings {
    /// Base URL of the accounting service.
    pub api_endpoint: String,
    /// Path of the user-info notification endpoint.
    pub post_user_info_path: String,
    /// Path of the usage-result notification endpoint.
    pub post_result_path: String,
    /// Ask the accounting service for exact token counts instead of the
    /// built-in estimate.
    pub use_accurate_tokenizer: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_endpoint: String::new(),
            post_user_info_path: "/post_user_info".to_string(),
            post_result_path: "/post_result".to_string(),
            use_accurate_tokenizer: false,
        }
    }
}

impl Settings {
    pub fn with_endpoint(api_endpoint: impl Into<String>) -> Self {
        Self {
            api_endpoint: api_endpoint.into(),
            ..Self::default()
        }
    }

    pub(crate) fn user_info_url(&self) -> String {
        format!("{}{}", self.api_endpoint, self.post_user_info_path)
    }

    pub(crate) fn result_url(&self) -> String {
        format!("{}{}", self.api_endpoint, self.post_result_path)
    }

    pub(crate) fn tokenize_url(&self) -> String {
        format!("{}/calculate_tokens", self.api_endpoint)
    }
}

/// JSON schema of the settings, for the host's settings UI.
pub fn schema() -> Value {
    let schema = schema_for!(Settings);
    serde_json::to_value(schema).unwrap_or(Value::Null)
}
