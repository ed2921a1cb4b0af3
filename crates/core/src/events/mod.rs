pub mod analytics;
pub mod bus;
pub mod types;

pub use analytics::BusAnalytics;
pub use bus::EventBus;
pub use types::DocumentEvent;
