use std::path::PathBuf;

use clap::Args;
use phoenix_widgets_core::{
    Collision, Config, Event, HostedWidget, InMemoryWidgetHost, Rect, Size, SystemClock, Viewport,
    WidgetAwareness,
};
use serde::{Deserialize, Serialize};

#[derive(Args)]
pub struct PlaceArgs {
    /// Layout JSON file with an optional viewport and the current widgets
    #[arg(long)]
    pub layout: PathBuf,
    /// Width of the widget to place
    #[arg(long)]
    pub width: Option<f64>,
    /// Height of the widget to place
    #[arg(long)]
    pub height: Option<f64>,
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Deserialize)]
struct Layout {
    viewport: Option<Viewport>,
    #[serde(default)]
    widgets: Vec<HostedWidget>,
}

#[derive(Serialize)]
struct PlaceReport {
    viewport: Viewport,
    collisions: Vec<Collision>,
    corrections: Vec<Event>,
    placement: Option<Rect>,
    error: Option<String>,
}

pub fn run(args: PlaceArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load_or_default();
    let content = std::fs::read_to_string(&args.layout)?;
    let layout: Layout = serde_json::from_str(&content)?;
    let viewport = layout.viewport.unwrap_or(config.placement.viewport);

    let engine = WidgetAwareness::with_settings(SystemClock, config.engine_settings())?;
    let mut host = InMemoryWidgetHost::new();
    for w in layout.widgets {
        let visible = w.visible;
        host.add_widget(w.id, w.widget_type, w.rect).visible = visible;
    }

    let collisions = engine.detect_host_collisions(&host);
    let corrections = engine.enforce_host_boundaries(&mut host, &viewport);

    let constraints = engine.solver().constraints();
    let requested = Size::new(
        args.width.unwrap_or(constraints.min_width),
        args.height.unwrap_or(constraints.min_height),
    );
    let (placement, error) = match engine.place_widget(&host, requested, &viewport) {
        Ok(rect) => (Some(rect), None),
        Err(e) => (None, Some(e.to_string())),
    };

    let report = PlaceReport {
        viewport,
        collisions,
        corrections,
        placement,
        error,
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("Viewport: {}x{}", report.viewport.width, report.viewport.height);
    if report.collisions.is_empty() {
        println!("No collisions");
    } else {
        for c in &report.collisions {
            println!("Collision: {} <-> {}", c.widget1, c.widget2);
        }
    }
    for event in &report.corrections {
        if let Event::BoundaryCorrected { widget_id, x, y, .. } = event {
            println!("Moved {widget_id} inside screen -> ({x}, {y})");
        }
    }
    match (&report.placement, &report.error) {
        (Some(r), _) => println!(
            "Next widget: ({}, {}) {}x{}",
            r.x, r.y, r.width, r.height
        ),
        (None, Some(e)) => println!("Next widget: {e}"),
        (None, None) => {}
    }
    Ok(())
}
