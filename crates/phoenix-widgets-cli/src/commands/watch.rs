use std::sync::{Arc, Mutex};
use std::time::Duration;

use clap::Args;
use phoenix_widgets_core::{
    spawn_drivers, Config, EngagementEvent, Event, InMemoryWidgetHost, Size, SystemClock,
    WidgetAwareness, KNOWN_WIDGET_TYPES,
};
use tracing::warn;

#[derive(Args)]
pub struct WatchArgs {
    /// How long to run
    #[arg(long, default_value_t = 5)]
    pub seconds: u64,
    /// Widgets to open before starting
    #[arg(long, default_value_t = 3)]
    pub widgets: usize,
}

pub fn run(args: WatchArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load_or_default();
    let viewport = config.placement.viewport;
    let mut engine = WidgetAwareness::with_settings(SystemClock, config.engine_settings())?;
    let mut host = InMemoryWidgetHost::new();

    for i in 0..args.widgets {
        let widget_type = KNOWN_WIDGET_TYPES[i % KNOWN_WIDGET_TYPES.len()];
        let size = {
            let c = engine.solver().constraints();
            Size::new(c.min_width, c.min_height)
        };
        let rect = match engine.place_widget(&host, size, &viewport) {
            Ok(rect) => rect,
            Err(e) => {
                warn!(error = %e, opened = host.len(), "stopped opening widgets");
                break;
            }
        };
        let id = host.add_generated(widget_type, rect);
        engine.track_engagement(&id, EngagementEvent::View);
    }

    let opened = host.len();
    let engine = Arc::new(Mutex::new(engine));
    let host = Arc::new(Mutex::new(host));

    let rt = tokio::runtime::Runtime::new()?;
    let events = rt.block_on(async {
        let handle = spawn_drivers(engine.clone(), host.clone());
        tokio::time::sleep(Duration::from_secs(args.seconds)).await;
        handle.stop().await
    });

    let ticks = events
        .iter()
        .filter(|e| matches!(e, Event::EngagementTicked { .. }))
        .count();
    println!(
        "Ran drivers for {}s on {opened} widget(s): {ticks} tick(s)",
        args.seconds
    );
    for event in events.iter().filter(|e| !matches!(e, Event::EngagementTicked { .. })) {
        println!("{}", serde_json::to_string(event)?);
    }

    let engine = engine.lock().map_err(|_| "engine state poisoned")?;
    let s = engine.summary();
    println!(
        "Tracked: {}  avg relevance: {:.3}  high: {}  low: {}",
        s.total_widgets, s.avg_relevance, s.high_relevance, s.low_relevance
    );
    Ok(())
}
