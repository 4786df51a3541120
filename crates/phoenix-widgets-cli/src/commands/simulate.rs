use clap::Args;
use phoenix_widgets_core::{Config, Event, SimulationConfig, Simulator};

#[derive(Args)]
pub struct SimulateArgs {
    /// Simulated minutes
    #[arg(long, default_value_t = 60)]
    pub minutes: u64,
    /// Widgets to open at the start
    #[arg(long, default_value_t = 5)]
    pub widgets: usize,
    /// Random seed
    #[arg(long, default_value_t = 42)]
    pub seed: u64,
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

pub fn run(args: SimulateArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load_or_default();
    let sim_config = SimulationConfig {
        seed: args.seed,
        minutes: args.minutes,
        widgets: args.widgets,
        viewport: config.placement.viewport,
        ..Default::default()
    };

    let report = Simulator::new(sim_config).run(config.engine_settings())?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!(
        "Simulated {} min (seed {}): {} placed, {} rejected, {} ticks",
        report.minutes, report.seed, report.placed, report.placement_failures, report.tick_events
    );
    for event in &report.events {
        match event {
            Event::DecayApplied { decayed, at } => {
                println!("{}  decay: {decayed} widget(s) lost relevance", at.format("%H:%M"));
            }
            Event::WidgetsRemoved { widget_ids, at } => {
                println!("{}  removed: {}", at.format("%H:%M"), widget_ids.join(", "));
            }
            Event::LifecycleChanged { widget_id, action, at } => {
                println!("{}  {widget_id} -> {action}", at.format("%H:%M"));
            }
            Event::EngagementTicked { .. } | Event::BoundaryCorrected { .. } => {}
        }
    }

    println!();
    for o in &report.outcomes {
        println!(
            "{:<22} {:<17} {:.3}  {}",
            o.widget_id, o.widget_type, o.relevance_score, o.action
        );
    }
    let s = &report.summary;
    println!(
        "\nTracked: {}  avg relevance: {:.3}  high: {}  low: {}  interactions: {}",
        s.total_widgets, s.avg_relevance, s.high_relevance, s.low_relevance, s.total_interactions
    );
    Ok(())
}
