use serde_json::Value;

/// Fire-and-forget event sink. Implementations swallow their own failures.
pub trait Analytics: Send + Sync {
    fn log_event(&self, name: &str, properties: Value);
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NoopAnalytics;

impl Analytics for NoopAnalytics {
    fn log_event(&self, _name: &str, _properties: Value) {}
}
