use chrono::Utc;
use serde_json::Value;

use super::bus::EventBus;
use super::types::{AnalyticsEvent, DocumentEvent};
use crate::ports::Analytics;

/// Analytics sink that forwards to the event bus and logs the call.
#[derive(Debug, Clone)]
pub struct BusAnalytics {
    bus: EventBus,
}

impl BusAnalytics {
    pub fn new(bus: EventBus) -> Self {
        Self { bus }
    }
}

impl Analytics for BusAnalytics {
    fn log_event(&self, name: &str, properties: Value) {
        tracing::debug!(event = name, "analytics");
        self.bus.emit(DocumentEvent::Analytics(AnalyticsEvent {
            name: name.to_string(),
            properties,
            timestamp: Utc::now(),
        }));
    }
}
