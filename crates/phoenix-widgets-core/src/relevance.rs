//! Relevance scoring.
//!
//! A widget's relevance blends three signals into a single 0.0-1.0 score:
//!
//! - **recency**: `exp(-hours_since_last_view / recency_decay_hours)`
//! - **engagement**: `min(1, interactions / interaction_saturation)`
//! - **age**: `exp(-hours_old / age_decay_hours)`, newer widgets score higher
//!
//! The time-of-day multiplier in [`contextual_multiplier`] is advisory and is
//! never folded into the stored score.

use chrono::DateTime;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::clock::hours_between;
use crate::engagement::EngagementRecord;
use crate::error::ValidationError;

/// Weights and decay constants for [`RelevanceModel`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelevanceWeights {
    #[serde(default = "default_recency_weight")]
    pub recency_weight: f64,
    #[serde(default = "default_engagement_weight")]
    pub engagement_weight: f64,
    #[serde(default = "default_age_weight")]
    pub age_weight: f64,
    /// Decay constant (hours) for time since last view.
    #[serde(default = "default_recency_decay_hours")]
    pub recency_decay_hours: f64,
    /// Decay constant (hours) for widget age.
    #[serde(default = "default_age_decay_hours")]
    pub age_decay_hours: f64,
    /// Interactions at which the engagement signal saturates.
    #[serde(default = "default_interaction_saturation")]
    pub interaction_saturation: u64,
}

fn default_recency_weight() -> f64 {
    0.4
}
fn default_engagement_weight() -> f64 {
    0.4
}
fn default_age_weight() -> f64 {
    0.2
}
fn default_recency_decay_hours() -> f64 {
    4.0
}
fn default_age_decay_hours() -> f64 {
    8.0
}
fn default_interaction_saturation() -> u64 {
    10
}

impl Default for RelevanceWeights {
    fn default() -> Self {
        Self {
            recency_weight: default_recency_weight(),
            engagement_weight: default_engagement_weight(),
            age_weight: default_age_weight(),
            recency_decay_hours: default_recency_decay_hours(),
            age_decay_hours: default_age_decay_hours(),
            interaction_saturation: default_interaction_saturation(),
        }
    }
}

impl RelevanceWeights {
    pub fn validate(&self) -> Result<(), ValidationError> {
        for (field, w) in [
            ("relevance.recency_weight", self.recency_weight),
            ("relevance.engagement_weight", self.engagement_weight),
            ("relevance.age_weight", self.age_weight),
        ] {
            if !(0.0..=1.0).contains(&w) {
                return Err(ValidationError::InvalidValue {
                    field: field.into(),
                    message: format!("weight {w} outside 0.0-1.0"),
                });
            }
        }
        for (field, h) in [
            ("relevance.recency_decay_hours", self.recency_decay_hours),
            ("relevance.age_decay_hours", self.age_decay_hours),
        ] {
            if h <= 0.0 || !h.is_finite() {
                return Err(ValidationError::InvalidValue {
                    field: field.into(),
                    message: format!("decay constant must be positive, got {h}"),
                });
            }
        }
        if self.interaction_saturation == 0 {
            return Err(ValidationError::InvalidValue {
                field: "relevance.interaction_saturation".into(),
                message: "must be at least 1".into(),
            });
        }
        Ok(())
    }
}

/// Per-signal breakdown of a relevance score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RelevanceBreakdown {
    pub recency: f64,
    pub engagement: f64,
    pub age: f64,
    pub score: f64,
}

#[derive(Debug, Clone, Default)]
pub struct RelevanceModel {
    weights: RelevanceWeights,
}

impl RelevanceModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_weights(weights: RelevanceWeights) -> Self {
        Self { weights }
    }

    pub fn weights(&self) -> &RelevanceWeights {
        &self.weights
    }

    /// Score a record at `now`.
    pub fn calculate(&self, record: &EngagementRecord, now: DateTime<Utc>) -> f64 {
        self.breakdown(record, now).score
    }

    pub fn breakdown(&self, record: &EngagementRecord, now: DateTime<Utc>) -> RelevanceBreakdown {
        self.score_components(
            hours_between(record.last_viewed_at, now),
            hours_between(record.created_at, now),
            record.interaction_count,
        )
    }

    /// Score from raw inputs. Negative hours are treated as zero.
    pub fn score_components(
        &self,
        hours_since_view: f64,
        hours_old: f64,
        interaction_count: u64,
    ) -> RelevanceBreakdown {
        let w = &self.weights;
        let recency = (-hours_since_view.max(0.0) / w.recency_decay_hours).exp();
        let engagement =
            (interaction_count as f64 / w.interaction_saturation as f64).min(1.0);
        let age = (-hours_old.max(0.0) / w.age_decay_hours).exp();

        let raw = w.recency_weight * recency + w.engagement_weight * engagement + w.age_weight * age;
        let score = if raw.is_finite() { raw.clamp(0.0, 1.0) } else { 0.0 };

        RelevanceBreakdown {
            recency,
            engagement,
            age,
            score,
        }
    }
}

/// Coarse part of day used by the contextual rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeOfDay {
    Morning,
    Afternoon,
    Evening,
}

impl TimeOfDay {
    pub fn from_hour(hour: u32) -> Self {
        if hour < 12 {
            TimeOfDay::Morning
        } else if hour < 18 {
            TimeOfDay::Afternoon
        } else {
            TimeOfDay::Evening
        }
    }
}

/// Widget types with a time-of-day rule.
pub const KNOWN_WIDGET_TYPES: [&str; 5] = [
    "health-recovery",
    "workout-plan",
    "finance-spending",
    "sleep-quality",
    "calendar-today",
];

/// Relevance multiplier for a widget type at a given hour (0-23).
///
/// Unknown widget types get 1.0.
pub fn contextual_multiplier(widget_type: &str, hour: u32) -> f64 {
    let time_of_day = TimeOfDay::from_hour(hour);
    match widget_type {
        "health-recovery" => {
            if time_of_day == TimeOfDay::Morning {
                1.5
            } else {
                0.5
            }
        }
        "workout-plan" => {
            if (6..12).contains(&hour) {
                1.8
            } else {
                0.3
            }
        }
        "finance-spending" => {
            if time_of_day == TimeOfDay::Evening {
                1.5
            } else {
                0.6
            }
        }
        "sleep-quality" => {
            if hour >= 21 || hour < 6 {
                1.9
            } else {
                0.2
            }
        }
        "calendar-today" => {
            if time_of_day == TimeOfDay::Morning {
                1.7
            } else {
                0.8
            }
        }
        _ => 1.0,
    }
}
