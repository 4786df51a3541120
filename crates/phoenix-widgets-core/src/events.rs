use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::lifecycle::LifecycleAction;

/// Every driver run and layout correction produces an Event.
/// Front ends poll for them to log or animate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    /// Tick driver credited visible time to these widgets.
    EngagementTicked {
        widgets: usize,
        at: DateTime<Utc>,
    },
    /// Decay driver recomputed scores; `decayed` went down.
    DecayApplied {
        decayed: usize,
        at: DateTime<Utc>,
    },
    /// Stale widgets taken down by the cleanup driver.
    WidgetsRemoved {
        widget_ids: Vec<String>,
        at: DateTime<Utc>,
    },
    /// A widget was pulled back inside the screen.
    BoundaryCorrected {
        widget_id: String,
        x: f64,
        y: f64,
        at: DateTime<Utc>,
    },
    /// Recommended lifecycle action for a widget changed.
    LifecycleChanged {
        widget_id: String,
        action: LifecycleAction,
        at: DateTime<Utc>,
    },
}
