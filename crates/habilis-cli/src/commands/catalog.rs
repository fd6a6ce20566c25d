//! Read-only listings of the quiz content.

use std::path::Path;

use super::load_config;

pub fn questions(config: Option<&Path>, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let bank = load_config(config)?.question_bank();

    if json {
        println!("{}", serde_json::to_string_pretty(&bank)?);
        return Ok(());
    }

    for (i, question) in bank.iter().enumerate() {
        println!("{}. {}", i + 1, question.prompt("your child"));
        for option in &question.options {
            println!("   {}) {}  [{}]", option.letter, option.text, option.profile);
        }
        println!();
    }
    Ok(())
}

pub fn profiles(config: Option<&Path>, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config(config)?;

    if json {
        let value = serde_json::json!({
            "tie_break": config.tie_break,
            "profiles": config.profiles,
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    println!("Profiles:");
    println!();
    for profile in &config.profiles {
        println!("  {} - {}", profile.label, profile.display_name);
        println!("    Kit: {} (product {})", profile.kit_name, profile.product);
        println!("    {:.2} EUR/month", profile.monthly_price);
        println!();
    }

    let order: Vec<&str> = config.tie_break.labels().iter().map(|l| l.as_str()).collect();
    println!("Tie-break order: {}", order.join(" > "));
    Ok(())
}
