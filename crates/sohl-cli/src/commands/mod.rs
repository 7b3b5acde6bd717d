pub mod attack;
pub mod plan;
pub mod roll;

use std::path::Path;

use colored::{ColoredString, Colorize};
use sohl_mechanics::{MechanicsConfig, Modifier, ModifierStack, OutcomeDegree, SystemDescriptor};

/// Load the config file, or the defaults when none was given.
fn load_config(path: Option<&Path>) -> Result<MechanicsConfig, String> {
    match path {
        Some(p) => {
            tracing::info!(path = %p.display(), "loading mechanics config");
            MechanicsConfig::from_path(p).map_err(|e| e.to_string())
        }
        None => Ok(MechanicsConfig::default()),
    }
}

/// Resolve the rule variant: command line first, then config, then core.
fn resolve_system(
    config: &MechanicsConfig,
    system: Option<&str>,
) -> Result<SystemDescriptor, String> {
    let mut config = config.clone();
    if let Some(id) = system {
        config.system = Some(id.to_string());
    }
    config.system().map_err(|e| e.to_string())
}

/// Parse `NAME:VALUE` (e.g. `Cover:+2`, `Wound:-1`).
fn parse_modifier(spec: &str) -> Result<Modifier, String> {
    let (name, value) = spec
        .rsplit_once(':')
        .ok_or_else(|| format!("modifier '{spec}' must be NAME:VALUE"))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("modifier '{spec}' has no name"));
    }
    let value: i32 = value
        .trim()
        .parse()
        .map_err(|_| format!("modifier '{spec}' has a non-numeric value"))?;
    Ok(Modifier::new(name, value))
}

/// Build a stack from `NAME:VALUE` specs, then disable the named entries.
fn build_stack(specs: &[String], disabled: &[String]) -> Result<ModifierStack, String> {
    let mut stack = specs
        .iter()
        .map(|s| parse_modifier(s))
        .collect::<Result<ModifierStack, String>>()?;
    for name in disabled {
        if !stack.set_enabled(name, false) {
            return Err(format!("no modifier named '{name}'"));
        }
    }
    Ok(stack)
}

fn degree_label(degree: OutcomeDegree) -> ColoredString {
    let label = degree.to_string();
    let label = if degree.is_success() {
        label.green()
    } else if degree.is_critical() {
        label.red()
    } else {
        label.yellow()
    };
    if degree.is_critical() { label.bold() } else { label }
}

/// Parse degree names or abbreviations (e.g. `ms`, `critical_success`).
fn parse_degrees(specs: &[String]) -> Result<Vec<OutcomeDegree>, String> {
    specs
        .iter()
        .map(|s| {
            OutcomeDegree::from_str_tag(s).ok_or_else(|| {
                let known: Vec<&str> = OutcomeDegree::ALL.iter().map(|d| d.abbrev()).collect();
                format!("unknown degree '{s}' (expected one of {})", known.join(", "))
            })
        })
        .collect()
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<String, String> {
    serde_json::to_string_pretty(value).map_err(|e| format!("failed to encode JSON: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_signed_modifiers() {
        let m = parse_modifier("Cover:+2").unwrap();
        assert_eq!((m.name.as_str(), m.value), ("Cover", 2));
        let m = parse_modifier("Old Wound:-1").unwrap();
        assert_eq!((m.name.as_str(), m.value), ("Old Wound", -1));
    }

    #[test]
    fn rejects_bad_modifiers() {
        assert!(parse_modifier("Cover").is_err());
        assert!(parse_modifier(":3").is_err());
        assert!(parse_modifier("Cover:lots").is_err());
    }

    #[test]
    fn parses_degrees() {
        let degrees = parse_degrees(&["cs".into(), "Marginal_Success".into()]).unwrap();
        assert_eq!(
            degrees,
            vec![OutcomeDegree::CriticalSuccess, OutcomeDegree::MarginalSuccess]
        );
        let err = parse_degrees(&["hit".into()]).unwrap_err();
        assert_eq!(err, "unknown degree 'hit' (expected one of CF, MF, MS, CS)");
    }

    #[test]
    fn disables_named_entries() {
        let stack = build_stack(&["Aim:2".into(), "Wound:-1".into()], &["Wound".into()]).unwrap();
        assert_eq!(stack.effective(), 2);
        assert!(build_stack(&["Aim:2".into()], &["Fog".into()]).is_err());
    }
}
