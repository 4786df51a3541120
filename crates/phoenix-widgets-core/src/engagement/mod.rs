//! Per-widget engagement tracking.
//!
//! Records are created lazily on the first event for a widget id and live
//! until the widget is removed.

mod record;
mod tracker;

pub use record::{EngagementEvent, EngagementRecord};
pub use tracker::{EngagementSummary, EngagementTracker, DEFAULT_TICK_QUANTUM_MS};
