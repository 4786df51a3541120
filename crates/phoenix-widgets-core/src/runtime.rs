//! Real-time driver loop on tokio.
//!
//! The engine and the host are shared behind `Arc<Mutex<_>>`. Each interval
//! locks both, runs one driver synchronously and unlocks before the next
//! await, so driver runs never interleave on the engagement records.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::error;

use crate::clock::Clock;
use crate::drivers::DriverKind;
use crate::events::Event;
use crate::host::WidgetHost;
use crate::service::WidgetAwareness;

/// Handle to a running driver loop.
pub struct DriverHandle {
    stop_tx: watch::Sender<bool>,
    events: mpsc::UnboundedReceiver<Event>,
    task: JoinHandle<()>,
}

impl DriverHandle {
    /// Events produced so far.
    pub fn drain_events(&mut self) -> Vec<Event> {
        let mut out = Vec::new();
        while let Ok(event) = self.events.try_recv() {
            out.push(event);
        }
        out
    }

    /// Stop the loop, wait for it to exit and return the remaining events.
    pub async fn stop(mut self) -> Vec<Event> {
        let _ = self.stop_tx.send(true);
        if let Err(e) = (&mut self.task).await {
            error!(error = %e, "driver loop panicked");
        }
        self.drain_events()
    }
}

/// Spawn the tick, decay and cleanup drivers on their configured periods.
///
/// Must be called from within a tokio runtime.
pub fn spawn_drivers<C, H>(
    engine: Arc<Mutex<WidgetAwareness<C>>>,
    host: Arc<Mutex<H>>,
) -> DriverHandle
where
    C: Clock + 'static,
    H: WidgetHost + Send + 'static,
{
    let (stop_tx, mut stop_rx) = watch::channel(false);
    let (event_tx, events) = mpsc::unbounded_channel();

    let periods = {
        let mut guard = engine.lock().unwrap_or_else(|e| e.into_inner());
        guard.start();
        let intervals = guard.driver_intervals();
        [DriverKind::Tick, DriverKind::Decay, DriverKind::Cleanup].map(|k| intervals.period(k))
    };

    let task = tokio::spawn(async move {
        let make = |period: chrono::Duration| {
            let period = period.to_std().unwrap_or(Duration::from_millis(1));
            let mut iv = interval_at(Instant::now() + period, period);
            iv.set_missed_tick_behavior(MissedTickBehavior::Skip);
            iv
        };
        let mut tick = make(periods[0]);
        let mut decay = make(periods[1]);
        let mut cleanup = make(periods[2]);

        loop {
            let kind = tokio::select! {
                changed = stop_rx.changed() => {
                    if changed.is_err() || *stop_rx.borrow() {
                        break;
                    }
                    continue;
                }
                _ = tick.tick() => DriverKind::Tick,
                _ = decay.tick() => DriverKind::Decay,
                _ = cleanup.tick() => DriverKind::Cleanup,
            };

            let events = {
                let (Ok(mut engine), Ok(mut host)) = (engine.lock(), host.lock()) else {
                    error!(driver = ?kind, "widget state mutex poisoned, stopping drivers");
                    break;
                };
                engine.run_driver(kind, &mut *host)
            };

            for event in events {
                if event_tx.send(event).is_err() {
                    break;
                }
            }
        }

        if let Ok(mut engine) = engine.lock() {
            engine.stop();
        }
    });

    DriverHandle {
        stop_tx,
        events,
        task,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::SystemClock;
    use crate::drivers::DriverIntervals;
    use crate::geometry::Rect;
    use crate::host::InMemoryWidgetHost;
    use crate::service::EngineSettings;

    #[tokio::test]
    async fn ticks_visible_widgets_until_stopped() {
        let settings = EngineSettings {
            drivers: DriverIntervals {
                tick_ms: 10,
                decay_ms: 60_000,
                cleanup_ms: 300_000,
            },
            ..Default::default()
        };
        let engine = Arc::new(Mutex::new(
            WidgetAwareness::with_settings(SystemClock, settings).unwrap(),
        ));
        let mut host = InMemoryWidgetHost::new();
        host.add_widget("a", "calendar-today", Rect::new(10.0, 10.0, 300.0, 120.0));
        let host = Arc::new(Mutex::new(host));

        let handle = spawn_drivers(engine.clone(), host.clone());
        tokio::time::sleep(Duration::from_millis(80)).await;
        let events = handle.stop().await;

        assert!(events
            .iter()
            .any(|e| matches!(e, Event::EngagementTicked { .. })));
        let engine = engine.lock().unwrap();
        assert!(!engine.is_running());
        assert!(engine.record("a").unwrap().view_time_ms >= 100);
    }
}
