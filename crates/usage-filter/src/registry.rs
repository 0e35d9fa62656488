//! Typed filter registration.
//!
//! Instead of the by-convention attribute discovery some hosts use, filters
//! implement [`PipelineFilter`] and are registered explicitly; the host runs
//! the chain at the two fixed lifecycle points.

use serde_json::Value;

use crate::error::FilterError;
use crate::types::Payload;

/// Capability contract for a request/response filter.
///
/// Both hooks default to pass-through, so a filter that only observes one
/// side of the lifecycle implements only that side.
pub trait PipelineFilter: Send + Sync {
    /// Stable name the host can show in its settings UI.
    fn name(&self) -> &str;

    /// JSON schema of the filter's settings, for the host's settings UI.
    fn settings_schema(&self) -> Value {
        Value::Null
    }

    /// Invoked before the chat backend processes the request.
    fn inlet(&self, payload: Payload, user: &Value) -> Result<Payload, FilterError> {
        let _ = user;
        Ok(payload)
    }

    /// Invoked after the chat backend produced its reply.
    fn outlet(&self, payload: Payload, user: &Value) -> Result<Payload, FilterError> {
        let _ = user;
        Ok(payload)
    }
}

/// Ordered collection of registered filters.
#[derive(Default)]
pub struct FilterRegistry {
    filters: Vec<Box<dyn PipelineFilter>>,
}

impl FilterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a filter. Filters run in registration order.
    pub fn register(&mut self, filter: Box<dyn PipelineFilter>) {
        self.filters.push(filter);
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    pub fn len(&self) -> usize {
        self.filters.len()
    }

    pub fn names(&self) -> Vec<&str> {
        self.filters.iter().map(|f| f.name()).collect()
    }

    /// Thread the payload through every filter's inlet, stopping at the
    /// first error.
    pub fn run_inlet(&self, mut payload: Payload, user: &Value) -> Result<Payload, FilterError> {
        for filter in &self.filters {
            payload = filter.inlet(payload, user)?;
        }
        Ok(payload)
    }

    /// Thread the payload through every filter's outlet, stopping at the
    /// first error.
    pub fn run_outlet(&self, mut payload: Payload, user: &Value) -> Result<Payload, FilterError> {
        for filter in &self.filters {
            payload = filter.outlet(payload, user)?;
        }
        Ok(payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Message, MessageContent};
    use serde_json::json;

    struct TagFilter {
        tag: &'static str,
    }

    impl PipelineFilter for TagFilter {
        fn name(&self) -> &str {
            self.tag
        }

        fn inlet(&self, mut payload: Payload, _user: &Value) -> Result<Payload, FilterError> {
            payload.messages.push(Message::user(self.tag));
            Ok(payload)
        }
    }

    struct FailingFilter;

    impl PipelineFilter for FailingFilter {
        fn name(&self) -> &str {
            "failing"
        }

        fn inlet(&self, _payload: Payload, _user: &Value) -> Result<Payload, FilterError> {
            Err(FilterError::Status {
                url: "http://monitor/post_user_info".to_string(),
                code: 500,
            })
        }
    }

    #[test]
    fn test_filters_run_in_registration_order() {
        let mut registry = FilterRegistry::new();
        registry.register(Box::new(TagFilter { tag: "first" }));
        registry.register(Box::new(TagFilter { tag: "second" }));

        let payload = registry
            .run_inlet(Payload::new("gpt-4o", vec![]), &json!({}))
            .unwrap();

        assert_eq!(registry.names(), vec!["first", "second"]);
        let texts: Vec<_> = payload
            .messages
            .iter()
            .map(|m| m.content.clone())
            .collect();
        assert_eq!(
            texts,
            vec![
                MessageContent::Text("first".to_string()),
                MessageContent::Text("second".to_string()),
            ]
        );
    }

    #[test]
    fn test_error_stops_the_chain() {
        let mut registry = FilterRegistry::new();
        registry.register(Box::new(FailingFilter));
        registry.register(Box::new(TagFilter { tag: "unreached" }));

        let result = registry.run_inlet(Payload::new("gpt-4o", vec![]), &json!({}));
        assert!(matches!(result, Err(FilterError::Status { code: 500, .. })));
    }

    #[test]
    fn test_default_hooks_pass_through() {
        struct Observer;
        impl PipelineFilter for Observer {
            fn name(&self) -> &str {
                "observer"
            }
        }

        let mut registry = FilterRegistry::new();
        registry.register(Box::new(Observer));

        let payload = Payload::new("gpt-4o", vec![Message::user("hi")]);
        let out = registry.run_outlet(payload.clone(), &json!({})).unwrap();
        assert_eq!(out, payload);
    }
}
