use std::path::Path;

use colored::Colorize;
use comfy_table::{ContentArrangement, Table};
use sohl_mechanics::{AiPlanProposal, AiPlannedAction, PlanStatus};

/// Parse `KIND:DESCRIPTION` into an action.
fn parse_action(spec: &str) -> Result<AiPlannedAction, String> {
    let (kind, description) = spec
        .split_once(':')
        .ok_or_else(|| format!("action '{spec}' must be KIND:DESCRIPTION"))?;
    let kind = kind.trim();
    if kind.is_empty() {
        return Err(format!("action '{spec}' has no kind"));
    }
    Ok(AiPlannedAction::new(kind, description.trim()))
}

fn parse_actions(specs: &[String]) -> Result<Vec<AiPlannedAction>, String> {
    specs.iter().map(|s| parse_action(s)).collect()
}

fn load(file: &Path) -> Result<AiPlanProposal, String> {
    AiPlanProposal::load(file).map_err(|e| e.to_string())
}

fn save(plan: &AiPlanProposal, file: &Path) -> Result<(), String> {
    plan.save(file).map_err(|e| e.to_string())?;
    tracing::info!(
        plan = %plan.plan_id(),
        status = %plan.status(),
        file = %file.display(),
        "proposal written"
    );
    Ok(())
}

fn status_label(status: PlanStatus) -> colored::ColoredString {
    let label = status.to_string();
    match status {
        PlanStatus::Pending => label.yellow(),
        PlanStatus::Approved => label.green().bold(),
        PlanStatus::Rejected => label.red(),
        PlanStatus::Revised => label.cyan(),
    }
}

pub fn new(
    file: &Path,
    summary: &str,
    actions: &[String],
    assumptions: &[String],
) -> Result<(), String> {
    if file.exists() {
        return Err(format!("{} already exists", file.display()));
    }
    let mut plan = AiPlanProposal::new(summary, parse_actions(actions)?);
    for a in assumptions {
        plan = plan.with_assumption(a.as_str());
    }
    save(&plan, file)?;
    println!(
        "  {} plan {} ({} actions)",
        "Created".green().bold(),
        plan.plan_id(),
        plan.actions().len()
    );
    Ok(())
}

pub fn show(file: &Path, json: bool) -> Result<(), String> {
    let plan = load(file)?;
    if json {
        println!("{}", super::to_json(&plan)?);
        return Ok(());
    }

    println!("  {} [{}]", plan.summary().bold(), status_label(plan.status()));
    println!("  {}", plan.plan_id().to_string().dimmed());
    if let Some(prev) = plan.supersedes() {
        println!("  supersedes {prev}");
    }
    println!(
        "  created {}",
        plan.created_at().format("%Y-%m-%d %H:%M:%S UTC")
    );
    if let Some(at) = plan.decided_at() {
        println!("  decided {}", at.format("%Y-%m-%d %H:%M:%S UTC"));
    }
    if let Some(note) = plan.reviewer_note() {
        println!("  note: {note}");
    }

    if plan.actions().is_empty() {
        println!("  No actions.");
    } else {
        let mut table = Table::new();
        table.set_content_arrangement(ContentArrangement::Dynamic);
        table.set_header(vec!["#", "Kind", "Description"]);
        for (i, action) in plan.actions().iter().enumerate() {
            table.add_row(vec![
                (i + 1).to_string(),
                action.kind.clone(),
                action.description.clone(),
            ]);
        }
        println!("{table}");
    }

    if !plan.assumptions().is_empty() {
        println!("  {}", "Assumptions".bold().underline());
        for a in plan.assumptions() {
            println!("  - {a}");
        }
    }
    Ok(())
}

pub fn approve(file: &Path, note: Option<String>) -> Result<(), String> {
    let mut plan = load(file)?;
    plan.approve(note).map_err(|e| e.to_string())?;
    save(&plan, file)?;
    println!("  plan {} {}", plan.plan_id(), status_label(plan.status()));
    Ok(())
}

pub fn reject(file: &Path, reason: Option<String>) -> Result<(), String> {
    let mut plan = load(file)?;
    plan.reject(reason).map_err(|e| e.to_string())?;
    save(&plan, file)?;
    println!("  plan {} {}", plan.plan_id(), status_label(plan.status()));
    Ok(())
}

pub fn revise(
    file: &Path,
    note: Option<String>,
    output: Option<&Path>,
    summary: Option<String>,
    actions: &[String],
) -> Result<(), String> {
    if output.is_none() && (summary.is_some() || !actions.is_empty()) {
        return Err("--summary and --action describe the follow-up and need --output".to_string());
    }
    let mut plan = load(file)?;
    // validate follow-up inputs before touching the original
    let follow_up_actions = if actions.is_empty() {
        plan.actions().to_vec()
    } else {
        parse_actions(actions)?
    };
    if let Some(out) = output {
        if out.exists() {
            return Err(format!("{} already exists", out.display()));
        }
    }

    plan.request_revision(note).map_err(|e| e.to_string())?;
    save(&plan, file)?;
    println!("  plan {} {}", plan.plan_id(), status_label(plan.status()));

    if let Some(out) = output {
        let summary = summary.unwrap_or_else(|| plan.summary().to_string());
        let next = plan
            .revise(summary, follow_up_actions)
            .map_err(|e| e.to_string())?;
        save(&next, out)?;
        println!(
            "  {} plan {} -> {}",
            "Created".green().bold(),
            next.plan_id(),
            out.display()
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_actions() {
        let a = parse_action("move_token: Bandits to the ridge").unwrap();
        assert_eq!(a.kind, "move_token");
        assert_eq!(a.description, "Bandits to the ridge");
        assert!(parse_action("no separator").is_err());
        assert!(parse_action(":orphan").is_err());
    }
}
