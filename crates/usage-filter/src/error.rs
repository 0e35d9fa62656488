use thiserror::Error;

/// Errors that surface to the host when a hook fails.
///
/// Remote-tokenizer failures never appear here: they are handled inside the
/// counting strategy by falling back to the heuristic estimate.
#[derive(Debug, Error)]
pub enum FilterError {
    /// The accounting service answered with a non-success status.
    #[error("accounting service returned status {code} for {url}")]
    Status { url: String, code: u16 },

    /// The request never got a proper HTTP answer.
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: Box<ureq::Transport>,
    },

    /// The reply body was not the expected JSON.
    #[error("unexpected response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: std::io::Error,
    },
}

impl FilterError {
    pub(crate) fn from_ureq(url: &str, err: ureq::Error) -> Self {
        match err {
            ureq::Error::Status(code, _) => Self::Status {
                url: url.to_string(),
                code,
            },
            ureq::Error::Transport(transport) => Self::Transport {
                url: url.to_string(),
                source: Box::new(transport),
            },
        }
    }

    pub(crate) fn decode(url: &str, source: std::io::Error) -> Self {
        Self::Decode {
            url: url.to_string(),
            source,
        }
    }
}
