use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::record::{EngagementEvent, EngagementRecord};
use crate::relevance::RelevanceModel;

/// Visible time credited per `tick` event.
pub const DEFAULT_TICK_QUANTUM_MS: u64 = 100;

/// Score above which a widget counts as highly relevant in the summary.
const HIGH_RELEVANCE: f64 = 0.7;
/// Score below which a widget counts as low relevance in the summary.
const LOW_RELEVANCE: f64 = 0.3;

/// Aggregate engagement statistics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngagementSummary {
    pub total_widgets: usize,
    pub avg_relevance: f64,
    pub high_relevance: usize,
    pub low_relevance: usize,
    pub total_interactions: u64,
}

/// Owns every engagement record, keyed by widget id in first-seen order.
#[derive(Debug, Clone)]
pub struct EngagementTracker {
    records: IndexMap<String, EngagementRecord>,
    model: RelevanceModel,
    tick_quantum_ms: u64,
}

impl Default for EngagementTracker {
    fn default() -> Self {
        Self::new(RelevanceModel::default())
    }
}

impl EngagementTracker {
    pub fn new(model: RelevanceModel) -> Self {
        Self {
            records: IndexMap::new(),
            model,
            tick_quantum_ms: DEFAULT_TICK_QUANTUM_MS,
        }
    }

    pub fn with_tick_quantum(mut self, tick_quantum_ms: u64) -> Self {
        self.tick_quantum_ms = tick_quantum_ms;
        self
    }

    pub fn model(&self) -> &RelevanceModel {
        &self.model
    }

    pub fn tick_quantum_ms(&self) -> u64 {
        self.tick_quantum_ms
    }

    /// Record `event` for `widget_id` and return the refreshed record.
    ///
    /// Creates the record on first sight. Unknown events leave the counters
    /// untouched but still refresh the score.
    pub fn track(
        &mut self,
        widget_id: &str,
        event: &EngagementEvent,
        now: DateTime<Utc>,
    ) -> &EngagementRecord {
        let record = self
            .records
            .entry(widget_id.to_string())
            .or_insert_with(|| EngagementRecord::new(widget_id, now));

        record.apply(event, now, self.tick_quantum_ms);
        record.relevance_score = self.model.calculate(record, now);
        record
    }

    pub fn record(&self, widget_id: &str) -> Option<&EngagementRecord> {
        self.records.get(widget_id)
    }

    pub fn records(&self) -> impl Iterator<Item = &EngagementRecord> {
        self.records.values()
    }

    pub fn contains(&self, widget_id: &str) -> bool {
        self.records.contains_key(widget_id)
    }

    /// Drop a record, e.g. when the widget was closed by the user.
    pub fn forget(&mut self, widget_id: &str) -> Option<EngagementRecord> {
        self.records.shift_remove(widget_id)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Recompute every score at `now`. Returns how many went down.
    pub fn apply_time_decay(&mut self, now: DateTime<Utc>) -> usize {
        let mut decayed = 0;
        for record in self.records.values_mut() {
            let old = record.relevance_score;
            record.relevance_score = self.model.calculate(record, now);
            if record.relevance_score < old {
                decayed += 1;
            }
        }
        decayed
    }

    /// Ids whose stored score is strictly below `threshold`.
    pub fn ids_below(&self, threshold: f64) -> Vec<String> {
        self.records
            .values()
            .filter(|r| r.relevance_score < threshold)
            .map(|r| r.widget_id.clone())
            .collect()
    }

    pub fn summary(&self) -> EngagementSummary {
        let total_widgets = self.records.len();
        let avg_relevance = if total_widgets == 0 {
            0.0
        } else {
            self.records.values().map(|r| r.relevance_score).sum::<f64>() / total_widgets as f64
        };

        EngagementSummary {
            total_widgets,
            avg_relevance,
            high_relevance: self
                .records
                .values()
                .filter(|r| r.relevance_score > HIGH_RELEVANCE)
                .count(),
            low_relevance: self
                .records
                .values()
                .filter(|r| r.relevance_score < LOW_RELEVANCE)
                .count(),
            total_interactions: self.records.values().map(|r| r.interaction_count).sum(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 8, 0, 0).unwrap()
    }

    #[test]
    fn first_event_creates_record() {
        let mut tracker = EngagementTracker::default();
        let record = tracker.track("w1", &EngagementEvent::View, t0());

        assert_eq!(record.view_count, 1);
        assert_eq!(record.created_at, t0());
        let score = record.relevance_score();
        assert!(score.is_finite());
        assert!((0.0..=1.0).contains(&score));
        assert_eq!(tracker.len(), 1);
    }

    #[test]
    fn created_at_is_fixed_across_events() {
        let mut tracker = EngagementTracker::default();
        tracker.track("w1", &EngagementEvent::Hover, t0());
        let record = tracker.track("w1", &EngagementEvent::View, t0() + Duration::hours(2));

        assert_eq!(record.created_at, t0());
        assert_eq!(record.hover_count, 1);
        assert_eq!(record.view_count, 1);
    }

    #[test]
    fn unknown_event_returns_current_record() {
        let mut tracker = EngagementTracker::default();
        tracker.track("w1", &EngagementEvent::Interaction, t0());
        let record = tracker.track("w1", &EngagementEvent::from("pinch"), t0());

        assert_eq!(record.interaction_count, 1);
        assert_eq!(record.view_count, 0);
    }

    #[test]
    fn tick_uses_configured_quantum() {
        let mut tracker = EngagementTracker::default().with_tick_quantum(250);
        tracker.track("w1", &EngagementEvent::Tick, t0());
        let record = tracker.track("w1", &EngagementEvent::Tick, t0());
        assert_eq!(record.view_time_ms, 500);
    }

    #[test]
    fn decay_counts_only_decreasing_scores() {
        let mut tracker = EngagementTracker::default();
        tracker.track("a", &EngagementEvent::View, t0());
        tracker.track("b", &EngagementEvent::View, t0());

        assert_eq!(tracker.apply_time_decay(t0()), 0);
        assert_eq!(tracker.apply_time_decay(t0() + Duration::hours(1)), 2);
    }

    #[test]
    fn summary_of_empty_tracker() {
        let tracker = EngagementTracker::default();
        let summary = tracker.summary();
        assert_eq!(summary.total_widgets, 0);
        assert_eq!(summary.avg_relevance, 0.0);
    }

    #[test]
    fn summary_buckets() {
        let mut tracker = EngagementTracker::default();
        for _ in 0..10 {
            tracker.track("busy", &EngagementEvent::Interaction, t0());
        }
        tracker.track("idle", &EngagementEvent::View, t0());
        tracker.apply_time_decay(t0() + Duration::hours(6));

        let summary = tracker.summary();
        assert_eq!(summary.total_widgets, 2);
        assert_eq!(summary.total_interactions, 10);
        assert_eq!(summary.low_relevance, 1);
        assert_eq!(summary.high_relevance, 0);
    }

    #[test]
    fn forget_removes_record() {
        let mut tracker = EngagementTracker::default();
        tracker.track("w1", &EngagementEvent::View, t0());
        assert!(tracker.forget("w1").is_some());
        assert!(tracker.record("w1").is_none());
        assert!(tracker.forget("w1").is_none());
    }
}
