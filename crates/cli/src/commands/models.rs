//! `parley models`: Show the model tiers.

use parley_core::model::ModelInfo;

use super::load_config;

/// Print the tier table with the current selection marked.
pub fn print_model_info(info: &ModelInfo) {
    println!();
    println!("  Current: {} ({})", info.current.model_name, info.current.tier);
    println!();
    println!("  Available models:");
    for (tier, description) in &info.descriptions {
        let marker = if *tier == info.current.tier { "*" } else { " " };
        println!("   {marker} {:<9} {description}", tier.as_str());
    }
    println!();
    println!("  {}", info.cost_note);
    println!();
}

pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config()?;
    let catalog = config.models.catalog();
    print_model_info(&catalog.info(&catalog.select(config.default_tier)));
    Ok(())
}
