//! Usage-accounting filter for chat-serving frameworks.
//!
//! Plugs into a host's request lifecycle at two fixed points: `inlet` runs
//! before the chat backend sees the request, `outlet` after it replied. The
//! filter estimates (or remotely queries) token counts, reports identity and
//! usage to an external accounting service over HTTP, and appends the
//! service's usage annotation to the visible assistant reply.
//!
//! The library is fully synchronous; every hook is one blocking call chain,
//! matching hosts that invoke filters inline.

pub mod client;
pub mod error;
pub mod filter;
pub mod registry;
pub mod settings;
pub mod tokens;
pub mod types;

// Re-export commonly used types
pub use client::MonitorClient;
pub use error::FilterError;
pub use filter::UsageFilter;
pub use registry::{FilterRegistry, PipelineFilter};
pub use settings::Settings;
pub use types::{Message, MessageContent, Payload};
