use clap::Args;
use phoenix_widgets_core::{contextual_multiplier, Clock, SystemClock, TimeOfDay};

#[derive(Args)]
pub struct ContextArgs {
    /// Widget type (e.g. "sleep-quality", "workout-plan")
    pub widget_type: String,
    /// Hour of day 0-23, defaults to the current local hour
    #[arg(long, value_parser = clap::value_parser!(u32).range(0..24))]
    pub hour: Option<u32>,
}

pub fn run(args: ContextArgs) -> Result<(), Box<dyn std::error::Error>> {
    let hour = args.hour.unwrap_or_else(|| SystemClock.hour_of_day());
    let multiplier = contextual_multiplier(&args.widget_type, hour);
    println!(
        "{} at {hour:02}:00 ({:?}): x{multiplier:.1}",
        args.widget_type,
        TimeOfDay::from_hour(hour)
    );
    Ok(())
}
