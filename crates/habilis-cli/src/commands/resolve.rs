use std::path::Path;

use clap::Args;
use habilis_core::ProfileLabel;

use super::load_config;

#[derive(Args)]
pub struct ResolveArgs {
    /// Profile label of each answer, in question order
    #[arg(required = true)]
    answers: Vec<String>,

    /// Output as JSON
    #[arg(long)]
    json: bool,
}

pub fn run(config: Option<&Path>, args: ResolveArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config(config)?;
    let resolver = config.resolver()?;

    let answers: Vec<ProfileLabel> = args.answers.into_iter().map(ProfileLabel::from).collect();
    let resolution = resolver.resolution(&answers)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&resolution)?);
        return Ok(());
    }

    println!("Profile: {}", resolution.profile);
    println!("Product: {}", resolution.product);
    println!();
    println!("Tally ({} answers):", resolution.tally.total());
    for (label, count) in resolution.tally.iter() {
        println!("  {label}: {count}");
    }
    Ok(())
}
