//! The widget self-awareness engine.
//!
//! [`WidgetAwareness`] owns the engagement records and bundles the relevance
//! model, placement solver, lifecycle policy and driver schedule behind one
//! explicitly owned value. There is no global instance: whoever owns the
//! dashboard creates one, calls [`WidgetAwareness::start`], and polls
//! [`WidgetAwareness::run_due`] from its own loop.
//!
//! ## Usage
//!
//! ```ignore
//! let mut engine = WidgetAwareness::new(SystemClock);
//! engine.start();
//! // In the render loop:
//! engine.track_engagement("calendar-today", EngagementEvent::View);
//! let events = engine.run_due(&mut host);
//! ```

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::clock::{Clock, SystemClock};
use crate::drivers::{DriverIntervals, DriverKind, DriverSchedule};
use crate::engagement::{
    EngagementEvent, EngagementRecord, EngagementSummary, EngagementTracker, DEFAULT_TICK_QUANTUM_MS,
};
use crate::error::{PlacementError, Result, ValidationError};
use crate::events::Event;
use crate::geometry::{Point, Positionable, Rect, Size, Viewport};
use crate::host::WidgetHost;
use crate::lifecycle::{LifecycleAction, LifecyclePolicy, LifecycleThresholds};
use crate::placement::{BoundaryResult, Collision, Constraints, PlacementSolver, DEFAULT_GRID_STEP};
use crate::relevance::{contextual_multiplier, RelevanceModel, RelevanceWeights};

/// Everything tunable about the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineSettings {
    pub constraints: Constraints,
    pub relevance: RelevanceWeights,
    pub lifecycle: LifecycleThresholds,
    pub drivers: DriverIntervals,
    pub grid_step: f64,
    pub tick_quantum_ms: u64,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            constraints: Constraints::default(),
            relevance: RelevanceWeights::default(),
            lifecycle: LifecycleThresholds::default(),
            drivers: DriverIntervals::default(),
            grid_step: DEFAULT_GRID_STEP,
            tick_quantum_ms: DEFAULT_TICK_QUANTUM_MS,
        }
    }
}

impl EngineSettings {
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.constraints.validate()?;
        self.relevance.validate()?;
        self.lifecycle.validate()?;
        self.drivers.validate()?;
        if self.grid_step <= 0.0 || !self.grid_step.is_finite() {
            return Err(ValidationError::InvalidValue {
                field: "placement.grid_step".into(),
                message: format!("must be a positive number, got {}", self.grid_step),
            });
        }
        Ok(())
    }
}

pub struct WidgetAwareness<C: Clock = SystemClock> {
    clock: C,
    tracker: EngagementTracker,
    solver: PlacementSolver,
    policy: LifecyclePolicy,
    schedule: DriverSchedule,
    /// Last action reported per widget, for change events.
    last_actions: HashMap<String, LifecycleAction>,
}

impl WidgetAwareness<SystemClock> {
    /// Engine on the wall clock with default settings.
    pub fn with_system_clock() -> Self {
        Self::new(SystemClock)
    }
}

impl<C: Clock> WidgetAwareness<C> {
    pub fn new(clock: C) -> Self {
        Self::build(clock, EngineSettings::default())
    }

    /// Engine with custom settings.
    ///
    /// # Errors
    /// Returns a validation error for inconsistent settings.
    pub fn with_settings(clock: C, settings: EngineSettings) -> Result<Self> {
        settings.validate()?;
        Ok(Self::build(clock, settings))
    }

    fn build(clock: C, settings: EngineSettings) -> Self {
        let model = RelevanceModel::with_weights(settings.relevance);
        Self {
            clock,
            tracker: EngagementTracker::new(model).with_tick_quantum(settings.tick_quantum_ms),
            solver: PlacementSolver::new(settings.constraints).with_grid_step(settings.grid_step),
            policy: LifecyclePolicy::with_thresholds(settings.lifecycle),
            schedule: DriverSchedule::new(settings.drivers),
            last_actions: HashMap::new(),
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn tracker(&self) -> &EngagementTracker {
        &self.tracker
    }

    pub fn solver(&self) -> &PlacementSolver {
        &self.solver
    }

    pub fn policy(&self) -> &LifecyclePolicy {
        &self.policy
    }

    pub fn driver_intervals(&self) -> &DriverIntervals {
        self.schedule.intervals()
    }

    pub fn record(&self, widget_id: &str) -> Option<&EngagementRecord> {
        self.tracker.record(widget_id)
    }

    pub fn summary(&self) -> EngagementSummary {
        self.tracker.summary()
    }

    /// Recommended action for a tracked widget, `None` if untracked.
    pub fn lifecycle_action(&self, widget_id: &str) -> Option<LifecycleAction> {
        let record = self.tracker.record(widget_id)?;
        let age = record.age_hours(self.clock.now());
        Some(self.policy.action_for(record.relevance_score(), age))
    }

    /// Time-of-day multiplier for a widget type at the clock's current hour.
    pub fn contextual_relevance(&self, widget_type: &str) -> f64 {
        contextual_multiplier(widget_type, self.clock.hour_of_day())
    }

    /// Stored score scaled by the contextual multiplier, capped at 1.0.
    pub fn contextual_score(&self, widget_id: &str, widget_type: &str) -> Option<f64> {
        let record = self.tracker.record(widget_id)?;
        Some((record.relevance_score() * self.contextual_relevance(widget_type)).clamp(0.0, 1.0))
    }

    // ── Engagement ───────────────────────────────────────────────────

    /// Record an event and return the refreshed record.
    pub fn track_engagement(
        &mut self,
        widget_id: &str,
        event: impl Into<EngagementEvent>,
    ) -> &EngagementRecord {
        let now = self.clock.now();
        self.tracker.track(widget_id, &event.into(), now)
    }

    /// Recompute every score. Returns how many decreased.
    pub fn apply_time_decay(&mut self) -> usize {
        self.tracker.apply_time_decay(self.clock.now())
    }

    /// Stop tracking a widget that was removed by someone else.
    pub fn forget(&mut self, widget_id: &str) -> Option<EngagementRecord> {
        self.last_actions.remove(widget_id);
        self.tracker.forget(widget_id)
    }

    // ── Placement ────────────────────────────────────────────────────

    pub fn enforce_screen_boundaries<P: Positionable + ?Sized>(
        &self,
        element: &mut P,
        viewport: &Viewport,
    ) -> BoundaryResult {
        self.solver.enforce_screen_boundaries(element, viewport)
    }

    /// Enforce boundaries on every active widget of `host`.
    pub fn enforce_host_boundaries<H: WidgetHost + ?Sized>(
        &self,
        host: &mut H,
        viewport: &Viewport,
    ) -> Vec<Event> {
        let at = self.clock.now();
        let mut events = Vec::new();
        for id in host.active_widget_ids() {
            let Some(widget) = host.widget_mut(&id) else {
                continue;
            };
            let result = self.solver.enforce_screen_boundaries(widget, viewport);
            if result.constrained {
                events.push(Event::BoundaryCorrected {
                    widget_id: id,
                    x: result.x,
                    y: result.y,
                    at,
                });
            }
        }
        events
    }

    pub fn detect_collisions(&self, widgets: &[(String, Rect)]) -> Vec<Collision> {
        self.solver.detect_collisions(widgets)
    }

    pub fn detect_host_collisions<H: WidgetHost + ?Sized>(&self, host: &H) -> Vec<Collision> {
        self.solver.detect_collisions(&host.active_rects())
    }

    pub fn find_optimal_position(
        &self,
        existing: &[Rect],
        size: Size,
        viewport: &Viewport,
    ) -> Option<Point> {
        self.solver.find_optimal_position(existing, size, viewport)
    }

    /// Pick a rect for a new widget on `host`.
    ///
    /// The requested size is clamped to the constraints first.
    ///
    /// # Errors
    /// `AtCapacity` when `max_widgets` are already active, `NoSpace` when no
    /// free cell fits.
    pub fn place_widget<H: WidgetHost + ?Sized>(
        &self,
        host: &H,
        requested: Size,
        viewport: &Viewport,
    ) -> Result<Rect, PlacementError> {
        let constraints = self.solver.constraints();
        if host.active_count() >= constraints.max_widgets {
            return Err(PlacementError::AtCapacity {
                max_widgets: constraints.max_widgets,
            });
        }

        let size = constraints.clamp_size(requested);
        let existing: Vec<Rect> = host.active_rects().into_iter().map(|(_, r)| r).collect();
        match self
            .solver
            .find_spaced_position(&existing, size, viewport, constraints.spacing)
        {
            Some(pos) => Ok(Rect::at(pos, size)),
            None => {
                warn!(
                    width = size.width,
                    height = size.height,
                    active = existing.len(),
                    "no free position for widget"
                );
                Err(PlacementError::NoSpace {
                    width: size.width,
                    height: size.height,
                })
            }
        }
    }

    // ── Lifecycle ────────────────────────────────────────────────────

    /// Remove every widget scored below the remove threshold from `host`
    /// and drop its record. Returns how many were removed.
    pub fn cleanup_stale_widgets<H: WidgetHost + ?Sized>(&mut self, host: &mut H) -> usize {
        self.sweep_stale(host).len()
    }

    fn sweep_stale<H: WidgetHost + ?Sized>(&mut self, host: &mut H) -> Vec<String> {
        let threshold = self.policy.thresholds().remove_below;
        let stale = self.tracker.ids_below(threshold);

        for id in &stale {
            if let Some(record) = self.tracker.record(id) {
                info!(
                    widget_id = %id,
                    relevance = %format!("{:.2}", record.relevance_score()),
                    "removing stale widget"
                );
            }
            host.remove_widget(id);
            self.forget(id);
        }
        stale
    }

    /// Lifecycle changes since the last call, one event per widget whose
    /// recommendation moved.
    pub fn lifecycle_changes(&mut self) -> Vec<Event> {
        let now = self.clock.now();
        let mut events = Vec::new();
        for record in self.tracker.records() {
            let action = self
                .policy
                .action_for(record.relevance_score(), record.age_hours(now));
            let previous = self.last_actions.insert(record.widget_id.clone(), action);
            if previous != Some(action) {
                debug!(widget_id = %record.widget_id, %action, "lifecycle action changed");
                events.push(Event::LifecycleChanged {
                    widget_id: record.widget_id.clone(),
                    action,
                    at: now,
                });
            }
        }
        events
    }

    // ── Drivers ──────────────────────────────────────────────────────

    /// Arm the periodic drivers from the current time.
    pub fn start(&mut self) {
        self.schedule.start(self.clock.now());
    }

    pub fn stop(&mut self) {
        self.schedule.stop();
    }

    pub fn is_running(&self) -> bool {
        self.schedule.is_running()
    }

    /// Run every driver whose deadline has passed. No-op while stopped.
    pub fn run_due<H: WidgetHost + ?Sized>(&mut self, host: &mut H) -> Vec<Event> {
        let due = self.schedule.due(self.clock.now());
        let mut events = Vec::new();
        for kind in due {
            events.extend(self.run_driver(kind, host));
        }
        events
    }

    /// Run one driver immediately, regardless of the schedule.
    pub fn run_driver<H: WidgetHost + ?Sized>(
        &mut self,
        kind: DriverKind,
        host: &mut H,
    ) -> Vec<Event> {
        let at = self.clock.now();
        match kind {
            DriverKind::Tick => {
                let widgets = self.tick_visible(host);
                if widgets == 0 {
                    Vec::new()
                } else {
                    vec![Event::EngagementTicked { widgets, at }]
                }
            }
            DriverKind::Decay => {
                let decayed = self.apply_time_decay();
                let mut events = Vec::new();
                if decayed > 0 {
                    info!(decayed, "applied time decay to widgets");
                    events.push(Event::DecayApplied { decayed, at });
                }
                events.extend(self.lifecycle_changes());
                events
            }
            DriverKind::Cleanup => {
                let widget_ids = self.sweep_stale(host);
                if widget_ids.is_empty() {
                    Vec::new()
                } else {
                    info!(removed = widget_ids.len(), "cleaned up stale widgets");
                    vec![Event::WidgetsRemoved { widget_ids, at }]
                }
            }
        }
    }

    /// Credit one tick to every visible widget. Returns how many.
    fn tick_visible<H: WidgetHost + ?Sized>(&mut self, host: &H) -> usize {
        let now = self.clock.now();
        let mut count = 0;
        for id in host.active_widget_ids() {
            if host.is_visible(&id) {
                self.tracker.track(&id, &EngagementEvent::Tick, now);
                count += 1;
            }
        }
        count
    }
}
