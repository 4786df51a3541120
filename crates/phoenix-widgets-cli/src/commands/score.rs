use clap::Args;
use phoenix_widgets_core::{Config, LifecycleAction, LifecyclePolicy, RelevanceBreakdown, RelevanceModel};
use serde::Serialize;

#[derive(Args)]
pub struct ScoreArgs {
    /// Interactions recorded so far
    #[arg(long, default_value_t = 0)]
    pub interactions: u64,
    /// Hours since the widget was last viewed
    #[arg(long, default_value_t = 0.0)]
    pub hours_since_view: f64,
    /// Hours since the widget was created
    #[arg(long, default_value_t = 0.0)]
    pub age_hours: f64,
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Serialize)]
struct ScoreOutput {
    #[serde(flatten)]
    breakdown: RelevanceBreakdown,
    action: LifecycleAction,
}

pub fn run(args: ScoreArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load_or_default();
    let model = RelevanceModel::with_weights(config.relevance);
    let policy = LifecyclePolicy::with_thresholds(config.lifecycle);

    let breakdown = model.score_components(args.hours_since_view, args.age_hours, args.interactions);
    let action = policy.action_for(breakdown.score, args.age_hours);

    if args.json {
        let out = ScoreOutput { breakdown, action };
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        println!("Relevance:  {:.3}", breakdown.score);
        println!("  recency:    {:.3}", breakdown.recency);
        println!("  engagement: {:.3}", breakdown.engagement);
        println!("  age:        {:.3}", breakdown.age);
        println!("Action:     {action}");
    }
    Ok(())
}
