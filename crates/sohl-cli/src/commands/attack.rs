use std::path::Path;

use colored::Colorize;
use sohl_mechanics::{AttackRequest, ImpactAspect, ImpactModifier, SohlSystem, resolve_attack};

/// Inputs for an attack and its impact.
pub struct AttackArgs {
    pub base: i32,
    pub modifiers: Vec<String>,
    pub impact: String,
    pub aspect: String,
    pub impact_modifiers: Vec<String>,
    pub deliver_on: Vec<String>,
    pub system: Option<String>,
    pub seed: Option<u64>,
}

pub fn run(config_path: Option<&Path>, args: &AttackArgs, json: bool) -> Result<(), String> {
    let mut config = super::load_config(config_path)?;
    if let Some(seed) = args.seed {
        config = config.with_seed(seed);
    }
    let mut system = super::resolve_system(&config, args.system.as_deref())?;
    if !args.deliver_on.is_empty() {
        system = system.with_delivering(super::parse_degrees(&args.deliver_on)?);
    }

    let aspect = ImpactAspect::from_str_tag(&args.aspect)
        .ok_or_else(|| "impact aspect must not be empty".to_string())?;
    let impact_modifier = ImpactModifier {
        aspect,
        stack: super::build_stack(&args.impact_modifiers, &[])?,
    };
    let request = AttackRequest::new(args.base, args.impact.as_str())
        .with_modifiers(super::build_stack(&args.modifiers, &[])?)
        .with_impact_modifier(impact_modifier);

    let resolution =
        resolve_attack(&system, &request, &mut config.rng()).map_err(|e| e.to_string())?;
    tracing::info!(
        system = system.id(),
        attack = %resolution.attack.id(),
        impact = %resolution.impact.id(),
        delivers = resolution.impact.delivers_impact(),
        "attack resolved"
    );

    if json {
        let value = serde_json::json!({
            "system": system.id(),
            "attack": resolution.attack.snapshot(),
            "impact": resolution.impact.snapshot(),
        });
        println!("{}", super::to_json(&value)?);
        return Ok(());
    }

    let degree = resolution.degree().map_err(|e| e.to_string())?;
    println!("  {} [{}]", "Attack".bold(), system.title().dimmed());
    println!(
        "  target {}, roll {}",
        resolution.attack.target_value().to_string().bold(),
        resolution.attack.roll()
    );
    println!("  {}", super::degree_label(degree));

    let impact = &resolution.impact;
    if impact.delivers_impact() {
        let value = resolution.effective_impact().map_err(|e| e.to_string())?;
        println!(
            "  {} {} {} ({}, {} {:+})",
            "Impact".bold(),
            value.to_string().red().bold(),
            impact.aspect(),
            impact.roll(),
            "modifiers".dimmed(),
            impact.impact_modifier().effective()
        );
    } else {
        println!(
            "  {} none ({}, {})",
            "Impact".bold(),
            impact.roll(),
            "negated".dimmed()
        );
    }
    Ok(())
}
