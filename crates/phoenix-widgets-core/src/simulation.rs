//! Deterministic dashboard simulation.
//!
//! Runs the engine against an in-memory host on a manual clock, with
//! seeded random user activity. The same seed and settings always produce
//! the same report, which makes it usable for tuning weights and thresholds
//! offline.

use chrono::{DateTime, Duration, TimeZone, Utc};
use rand::prelude::*;
use rand_pcg::Mcg128Xsl64;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::clock::{Clock, ManualClock};
use crate::engagement::{EngagementEvent, EngagementSummary};
use crate::error::Result;
use crate::events::Event;
use crate::geometry::{Size, Viewport};
use crate::host::{InMemoryWidgetHost, WidgetHost};
use crate::lifecycle::LifecycleAction;
use crate::relevance::KNOWN_WIDGET_TYPES;
use crate::service::{EngineSettings, WidgetAwareness};

const MINUTE_MS: u64 = 60_000;

/// Simulation parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationConfig {
    pub seed: u64,
    /// Simulated wall time in minutes.
    pub minutes: u64,
    /// Widgets to try to open at the start.
    pub widgets: usize,
    pub start: DateTime<Utc>,
    pub viewport: Viewport,
    /// Per-minute chance that a widget is looked at.
    pub view_probability: f64,
    /// Per-minute chance of a click/drag, scaled by the contextual multiplier.
    pub interaction_probability: f64,
    /// Per-minute chance of a hover.
    pub hover_probability: f64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            minutes: 60,
            widgets: 5,
            start: Utc
                .with_ymd_and_hms(2024, 1, 1, 8, 0, 0)
                .single()
                .unwrap_or_else(Utc::now),
            viewport: Viewport::default(),
            view_probability: 0.5,
            interaction_probability: 0.15,
            hover_probability: 0.3,
        }
    }
}

/// Final lifecycle state of one widget.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WidgetOutcome {
    pub widget_id: String,
    pub widget_type: String,
    pub relevance_score: f64,
    pub action: LifecycleAction,
}

/// What happened during a simulation run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationReport {
    pub seed: u64,
    pub minutes: u64,
    pub placed: usize,
    pub placement_failures: usize,
    /// Tick events are only counted, not listed.
    pub tick_events: usize,
    pub events: Vec<Event>,
    pub removed: Vec<String>,
    pub outcomes: Vec<WidgetOutcome>,
    pub summary: EngagementSummary,
}

pub struct Simulator {
    config: SimulationConfig,
    rng: Mcg128Xsl64,
}

impl Simulator {
    pub fn new(config: SimulationConfig) -> Self {
        let rng = Mcg128Xsl64::seed_from_u64(config.seed);
        Self { config, rng }
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Run the simulation with the given engine settings.
    ///
    /// # Errors
    /// Returns a validation error for inconsistent settings.
    pub fn run(&mut self, settings: EngineSettings) -> Result<SimulationReport> {
        let clock = ManualClock::new(self.config.start);
        let tick_ms = settings.drivers.tick_ms.max(1);
        let mut engine = WidgetAwareness::with_settings(clock.clone(), settings)?;
        let mut host = InMemoryWidgetHost::new();

        let mut placement_failures = 0;
        for i in 0..self.config.widgets {
            let widget_type = KNOWN_WIDGET_TYPES[i % KNOWN_WIDGET_TYPES.len()];
            let requested = Size::new(
                self.rng.gen_range(250.0..=650.0),
                self.rng.gen_range(100.0..=520.0),
            );
            match engine.place_widget(&host, requested, &self.config.viewport) {
                Ok(rect) => {
                    let id = format!("{widget_type}-{i}");
                    host.add_widget(id.clone(), widget_type, rect);
                    engine.track_engagement(&id, EngagementEvent::View);
                }
                Err(e) => {
                    debug!(error = %e, widget_type, "simulated widget not placed");
                    placement_failures += 1;
                }
            }
        }
        let placed = host.len();

        engine.start();
        let mut events = Vec::new();
        let mut tick_events = 0;
        let total_ms = self.config.minutes * MINUTE_MS;
        let mut elapsed_ms = 0;

        while elapsed_ms < total_ms {
            elapsed_ms += tick_ms;
            clock.advance(Duration::milliseconds(tick_ms as i64));

            if elapsed_ms % MINUTE_MS < tick_ms {
                self.simulate_user_minute(&mut engine, &host);
            }

            for event in engine.run_due(&mut host) {
                match event {
                    Event::EngagementTicked { .. } => tick_events += 1,
                    other => events.push(other),
                }
            }
        }
        engine.stop();

        let now = clock.now();
        let outcomes = host
            .widgets()
            .filter_map(|w| {
                let record = engine.record(&w.id)?;
                Some(WidgetOutcome {
                    widget_id: w.id.clone(),
                    widget_type: w.widget_type.clone(),
                    relevance_score: record.relevance_score(),
                    action: engine
                        .policy()
                        .action_for(record.relevance_score(), record.age_hours(now)),
                })
            })
            .collect();

        Ok(SimulationReport {
            seed: self.config.seed,
            minutes: self.config.minutes,
            placed,
            placement_failures,
            tick_events,
            events,
            removed: host.removed().to_vec(),
            outcomes,
            summary: engine.summary(),
        })
    }

    fn simulate_user_minute(
        &mut self,
        engine: &mut WidgetAwareness<ManualClock>,
        host: &InMemoryWidgetHost,
    ) {
        for id in host.active_widget_ids() {
            let Some(widget) = host.get(&id) else {
                continue;
            };
            let boost = engine.contextual_relevance(&widget.widget_type);

            if self.rng.gen_bool(self.config.view_probability.clamp(0.0, 1.0)) {
                engine.track_engagement(&id, EngagementEvent::View);
            }
            let p_interact = (self.config.interaction_probability * boost).clamp(0.0, 1.0);
            if self.rng.gen_bool(p_interact) {
                engine.track_engagement(&id, EngagementEvent::Interaction);
            }
            if self.rng.gen_bool(self.config.hover_probability.clamp(0.0, 1.0)) {
                engine.track_engagement(&id, EngagementEvent::Hover);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quick(seed: u64) -> SimulationConfig {
        SimulationConfig {
            seed,
            minutes: 10,
            ..Default::default()
        }
    }

    #[test]
    fn same_seed_same_report() {
        let a = Simulator::new(quick(7)).run(EngineSettings::default()).unwrap();
        let b = Simulator::new(quick(7)).run(EngineSettings::default()).unwrap();
        assert_eq!(a.summary, b.summary);
        assert_eq!(a.events, b.events);
        assert_eq!(a.outcomes, b.outcomes);
    }

    #[test]
    fn ticks_accumulate_visible_time() {
        let report = Simulator::new(quick(1)).run(EngineSettings::default()).unwrap();
        assert!(report.placed > 0);
        // 10 minutes at 100ms per tick.
        assert_eq!(report.tick_events, 6000);
    }

    #[test]
    fn ignored_widgets_get_swept() {
        let config = SimulationConfig {
            minutes: 24 * 60,
            widgets: 3,
            view_probability: 0.0,
            interaction_probability: 0.0,
            hover_probability: 0.0,
            ..Default::default()
        };
        let settings = EngineSettings {
            drivers: crate::drivers::DriverIntervals {
                tick_ms: 60_000,
                decay_ms: 60_000,
                cleanup_ms: 300_000,
            },
            ..Default::default()
        };
        let report = Simulator::new(config).run(settings).unwrap();
        assert_eq!(report.removed.len(), report.placed);
        assert!(report
            .events
            .iter()
            .any(|e| matches!(e, Event::WidgetsRemoved { .. })));
        assert_eq!(report.summary.total_widgets, 0);
    }

    #[test]
    fn capacity_limits_placement() {
        let config = SimulationConfig {
            minutes: 1,
            widgets: 12,
            ..Default::default()
        };
        let report = Simulator::new(config).run(EngineSettings::default()).unwrap();
        assert!(report.placed <= 8);
        assert_eq!(report.placed + report.placement_failures, 12);
    }
}
