//! Blocking HTTP client for the accounting service.

use serde_json::Value;
use tracing::{debug, warn};

use crate::error::FilterError;
use crate::settings::Settings;
use crate::tokens;
use crate::types::{
    Message, MessageContent, ResultRequest, ResultResponse, TokenizeInput, TokenizeRequest,
    TokenizeResponse, UserInfoRequest,
};

/// Client for the three accounting endpoints: user-info notify, result
/// notify, and the optional remote tokenizer.
///
/// All calls block the current thread until completion or failure; no
/// timeout is configured, matching the host's synchronous hook model.
pub struct MonitorClient {
    settings: Settings,
}

impl MonitorClient {
    pub fn new(settings: Settings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    // ===== Token counting strategy =====

    /// Count input tokens for a conversation.
    ///
    /// With `use_accurate_tokenizer` set, asks the accounting service and
    /// falls back to the local estimate on any failure. The fallback calls
    /// the heuristic directly, so a persistently failing tokenizer cannot
    /// recurse back into the remote path.
    pub fn count_chat_tokens(&self, messages: &[Message], model: &str) -> u64 {
        if !self.settings.use_accurate_tokenizer {
            return tokens::estimate_chat_tokens(messages);
        }
        match self.remote_tokenize(TokenizeInput::Chat(messages), "chat", model) {
            Ok(count) => count,
            Err(err) => {
                warn!("remote tokenizer failed, using local estimate: {err}");
                tokens::estimate_chat_tokens(messages)
            }
        }
    }

    /// Count output tokens for a single content block. Same strategy and
    /// fallback as [`count_chat_tokens`](Self::count_chat_tokens).
    pub fn count_text_tokens(&self, content: &MessageContent, model: &str) -> u64 {
        if !self.settings.use_accurate_tokenizer {
            return tokens::estimate_text_tokens(content);
        }
        match self.remote_tokenize(TokenizeInput::Text(content), "text", model) {
            Ok(count) => count,
            Err(err) => {
                warn!("remote tokenizer failed, using local estimate: {err}");
                tokens::estimate_text_tokens(content)
            }
        }
    }

    fn remote_tokenize(
        &self,
        input: TokenizeInput<'_>,
        kind: &str,
        model: &str,
    ) -> Result<u64, FilterError> {
        let url = self.settings.tokenize_url();
        let response = ureq::post(&url)
            .send_json(TokenizeRequest {
                messages: input,
                kind,
                model,
            })
            .map_err(|err| FilterError::from_ureq(&url, err))?;
        let body: TokenizeResponse = response
            .into_json()
            .map_err(|err| FilterError::decode(&url, err))?;
        Ok(body.tokens)
    }

    // ===== Lifecycle notifications =====

    /// Report user identity at the start of a request. A non-success status
    /// is an error for the caller to propagate.
    pub fn post_user_info(&self, user: &Value) -> Result<(), FilterError> {
        let url = self.settings.user_info_url();
        debug!("posting user info to {url}");
        ureq::post(&url)
            .send_json(UserInfoRequest { user })
            .map_err(|err| FilterError::from_ureq(&url, err))?;
        Ok(())
    }

    /// Report usage after the backend replied. Returns the human-readable
    /// usage annotation if the service produced one.
    pub fn post_result(
        &self,
        user: &Value,
        model: &str,
        input_tokens: u64,
        output_tokens: u64,
    ) -> Result<Option<String>, FilterError> {
        let url = self.settings.result_url();
        debug!("posting usage result to {url} (in={input_tokens}, out={output_tokens})");
        let response = ureq::post(&url)
            .send_json(ResultRequest {
                user,
                model,
                input_tokens,
                output_tokens,
            })
            .map_err(|err| FilterError::from_ureq(&url, err))?;
        let body: ResultResponse = response
            .into_json()
            .map_err(|err| FilterError::decode(&url, err))?;
        Ok(body.stats_text)
    }
}
