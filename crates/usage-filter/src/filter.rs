//! The usage-accounting filter itself.

use serde_json::Value;

use crate::client::MonitorClient;
use crate::error::FilterError;
use crate::registry::PipelineFilter;
use crate::settings::{self, Settings};
use crate::types::Payload;

/// Reports token usage and user identity to the accounting service and
/// splices the returned usage annotation into the assistant reply.
///
/// The filter holds no per-request state: the inlet's token count travels on
/// the payload (`input_tokens`) to the matching outlet, so one instance can
/// serve overlapping requests.
pub struct UsageFilter {
    client: MonitorClient,
}

impl UsageFilter {
    pub fn new(settings: Settings) -> Self {
        Self {
            client: MonitorClient::new(settings),
        }
    }

    pub fn settings(&self) -> &Settings {
        self.client.settings()
    }
}

impl PipelineFilter for UsageFilter {
    fn name(&self) -> &str {
        "usage_monitor"
    }

    fn settings_schema(&self) -> Value {
        settings::schema()
    }

    /// Count the request's input tokens, stash them on the payload, and
    /// notify the accounting service of the user's identity. A failed
    /// notification aborts the request as seen by the host.
    fn inlet(&self, mut payload: Payload, user: &Value) -> Result<Payload, FilterError> {
        payload.input_tokens = Some(
            self.client
                .count_chat_tokens(&payload.messages, &payload.model),
        );
        self.client.post_user_info(user)?;
        Ok(payload)
    }

    /// Count the reply's output tokens, report usage, and append the
    /// service's `stats_text` to the assistant message.
    ///
    /// A reply without any assistant message is reported with an output
    /// count of zero and left unannotated.
    fn outlet(&self, mut payload: Payload, user: &Value) -> Result<Payload, FilterError> {
        let assistant = payload.last_assistant_index();
        let output_tokens = match assistant {
            Some(index) => self
                .client
                .count_text_tokens(&payload.messages[index].content, &payload.model),
            None => 0,
        };
        let input_tokens = payload.input_tokens.take().unwrap_or(0);

        let stats_text =
            self.client
                .post_result(user, &payload.model, input_tokens, output_tokens)?;

        if let (Some(index), Some(text)) = (assistant, stats_text) {
            if !text.is_empty() {
                payload.messages[index].content.append_text(&text);
            }
        }
        Ok(payload)
    }
}
