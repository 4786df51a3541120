use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::clock::hours_between;

/// Relevance assigned to a record before its first recomputation.
pub const INITIAL_RELEVANCE: f64 = 0.5;

/// Kinds of activity observed on a widget.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EngagementEvent {
    /// Widget was observed visible.
    View,
    /// Click / drag on the widget.
    Interaction,
    /// Pointer entered the widget.
    Hover,
    /// One tick quantum of visible time elapsed.
    Tick,
    /// Anything else. Leaves the counters alone.
    Unknown(String),
}

impl EngagementEvent {
    pub fn as_str(&self) -> &str {
        match self {
            EngagementEvent::View => "view",
            EngagementEvent::Interaction => "interaction",
            EngagementEvent::Hover => "hover",
            EngagementEvent::Tick => "tick",
            EngagementEvent::Unknown(s) => s,
        }
    }
}

impl FromStr for EngagementEvent {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "view" => EngagementEvent::View,
            "interaction" => EngagementEvent::Interaction,
            "hover" => EngagementEvent::Hover,
            "tick" => EngagementEvent::Tick,
            other => EngagementEvent::Unknown(other.to_string()),
        })
    }
}

impl From<&str> for EngagementEvent {
    fn from(s: &str) -> Self {
        match s.parse() {
            Ok(event) => event,
            Err(never) => match never {},
        }
    }
}

impl fmt::Display for EngagementEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Engagement counters for one widget instance.
///
/// `relevance_score` is derived from the other fields and only written by the
/// tracker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngagementRecord {
    pub widget_id: String,
    pub view_count: u64,
    /// Accumulated visible time in milliseconds.
    pub view_time_ms: u64,
    pub last_viewed_at: DateTime<Utc>,
    pub interaction_count: u64,
    pub hover_count: u64,
    pub created_at: DateTime<Utc>,
    pub(crate) relevance_score: f64,
}

impl EngagementRecord {
    /// Fresh record, as created on the first tracked event.
    pub fn new(widget_id: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            widget_id: widget_id.into(),
            view_count: 0,
            view_time_ms: 0,
            last_viewed_at: now,
            interaction_count: 0,
            hover_count: 0,
            created_at: now,
            relevance_score: INITIAL_RELEVANCE,
        }
    }

    pub fn relevance_score(&self) -> f64 {
        self.relevance_score
    }

    pub fn age_hours(&self, now: DateTime<Utc>) -> f64 {
        hours_between(self.created_at, now)
    }

    pub fn hours_since_view(&self, now: DateTime<Utc>) -> f64 {
        hours_between(self.last_viewed_at, now)
    }

    /// Apply the counter changes for `event`.
    pub(crate) fn apply(&mut self, event: &EngagementEvent, now: DateTime<Utc>, tick_quantum_ms: u64) {
        match event {
            EngagementEvent::View => {
                self.view_count += 1;
                self.last_viewed_at = now;
            }
            EngagementEvent::Interaction => self.interaction_count += 1,
            EngagementEvent::Hover => self.hover_count += 1,
            EngagementEvent::Tick => self.view_time_ms += tick_quantum_ms,
            EngagementEvent::Unknown(_) => {}
        }
    }
}
