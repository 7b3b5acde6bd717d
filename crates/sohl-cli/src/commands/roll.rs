use std::path::Path;

use colored::Colorize;
use sohl_mechanics::dice::formula;

pub fn run(
    config_path: Option<&Path>,
    spec: &str,
    seed: Option<u64>,
    json: bool,
) -> Result<(), String> {
    let mut config = super::load_config(config_path)?;
    if let Some(seed) = seed {
        config = config.with_seed(seed);
    }

    let mut roll = formula::parse(spec).map_err(|e| e.to_string())?;
    let total = roll.evaluate(&mut config.rng());
    tracing::info!(formula = %roll.formula(), total, seeded = config.seed.is_some(), "rolled");

    if json {
        println!("{}", super::to_json(&roll)?);
        return Ok(());
    }

    println!("  {} {roll}", "Roll".bold());
    println!(
        "  range {}..={}, total {}",
        roll.min_total(),
        roll.max_total(),
        total.to_string().bold()
    );
    Ok(())
}
