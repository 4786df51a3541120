//! Lifecycle policy: relevance score and age to a recommended action.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LifecycleAction {
    Remove,
    Fade,
    Maintain,
    Promote,
    Demote,
}

impl LifecycleAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            LifecycleAction::Remove => "remove",
            LifecycleAction::Fade => "fade",
            LifecycleAction::Maintain => "maintain",
            LifecycleAction::Promote => "promote",
            LifecycleAction::Demote => "demote",
        }
    }
}

impl std::fmt::Display for LifecycleAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Score bands for [`LifecyclePolicy`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LifecycleThresholds {
    /// Below this a widget is removed (and swept by cleanup).
    #[serde(default = "default_remove_below")]
    pub remove_below: f64,
    #[serde(default = "default_fade_below")]
    pub fade_below: f64,
    /// Fading only applies to widgets older than this.
    #[serde(default = "default_fade_min_age_hours")]
    pub fade_min_age_hours: f64,
    #[serde(default = "default_promote_above")]
    pub promote_above: f64,
    #[serde(default = "default_maintain_above")]
    pub maintain_above: f64,
}

fn default_remove_below() -> f64 {
    0.1
}
fn default_fade_below() -> f64 {
    0.3
}
fn default_fade_min_age_hours() -> f64 {
    4.0
}
fn default_promote_above() -> f64 {
    0.8
}
fn default_maintain_above() -> f64 {
    0.5
}

impl Default for LifecycleThresholds {
    fn default() -> Self {
        Self {
            remove_below: default_remove_below(),
            fade_below: default_fade_below(),
            fade_min_age_hours: default_fade_min_age_hours(),
            promote_above: default_promote_above(),
            maintain_above: default_maintain_above(),
        }
    }
}

impl LifecycleThresholds {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.remove_below > self.fade_below {
            return Err(ValidationError::InvalidRange {
                field: "lifecycle.remove_below..fade_below".into(),
                min: self.remove_below,
                max: self.fade_below,
            });
        }
        if self.maintain_above > self.promote_above {
            return Err(ValidationError::InvalidRange {
                field: "lifecycle.maintain_above..promote_above".into(),
                min: self.maintain_above,
                max: self.promote_above,
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default)]
pub struct LifecyclePolicy {
    thresholds: LifecycleThresholds,
}

impl LifecyclePolicy {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_thresholds(thresholds: LifecycleThresholds) -> Self {
        Self { thresholds }
    }

    pub fn thresholds(&self) -> &LifecycleThresholds {
        &self.thresholds
    }

    /// Bands are checked in order and the first match wins, so a very low
    /// score resolves to `Remove` even when it also qualifies for `Fade`.
    pub fn action_for(&self, score: f64, age_hours: f64) -> LifecycleAction {
        let t = &self.thresholds;
        if score < t.remove_below {
            LifecycleAction::Remove
        } else if score < t.fade_below && age_hours > t.fade_min_age_hours {
            LifecycleAction::Fade
        } else if score > t.promote_above {
            LifecycleAction::Promote
        } else if score > t.maintain_above {
            LifecycleAction::Maintain
        } else {
            LifecycleAction::Demote
        }
    }

    pub fn is_stale(&self, score: f64) -> bool {
        score < self.thresholds.remove_below
    }
}
