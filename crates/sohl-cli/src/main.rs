//! CLI frontend for the SoHL resolution engine.

mod commands;

use std::path::PathBuf;
use std::process;

use clap::{ArgAction, Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[derive(Parser)]
#[command(
    name = "sohl",
    about = "Song of Heroic Lands: dice, success tests and plan approval",
    version,
    propagate_version = true
)]
struct Cli {
    /// Mechanics config file (JSON)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Raise log verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Roll a dice formula (e.g. 3d6+2)
    Roll {
        /// Dice formula
        formula: String,

        /// RNG seed for a reproducible roll
        #[arg(short, long)]
        seed: Option<u64>,

        /// Print the roll as JSON
        #[arg(long)]
        json: bool,
    },

    /// Roll a d100 success test against a base value
    Test {
        /// Base capability value
        #[arg(short, long, allow_hyphen_values = true)]
        base: i32,

        /// Modifier as NAME:VALUE (repeatable)
        #[arg(short, long = "modifier", value_name = "NAME:VALUE", allow_hyphen_values = true)]
        modifiers: Vec<String>,

        /// Disable a modifier by name (repeatable)
        #[arg(long = "disabled", value_name = "NAME")]
        disabled: Vec<String>,

        /// Title shown with the result
        #[arg(short, long)]
        title: Option<String>,

        /// Rule variant (sohl, legendary, misty_isle)
        #[arg(long)]
        system: Option<String>,

        /// RNG seed for a reproducible roll
        #[arg(short, long)]
        seed: Option<u64>,

        /// Print the result snapshot as JSON
        #[arg(long)]
        json: bool,
    },

    /// Roll an attack and the impact it delivers
    Attack {
        /// Attack skill value
        #[arg(short, long, allow_hyphen_values = true)]
        base: i32,

        /// Attack modifier as NAME:VALUE (repeatable)
        #[arg(short, long = "modifier", value_name = "NAME:VALUE", allow_hyphen_values = true)]
        modifiers: Vec<String>,

        /// Impact dice formula (e.g. 2d6+1)
        #[arg(long)]
        impact: String,

        /// Impact aspect (blunt, edged, piercing, fire)
        #[arg(short, long, default_value = "blunt")]
        aspect: String,

        /// Impact modifier as NAME:VALUE (repeatable)
        #[arg(short = 'i', long = "impact-modifier", value_name = "NAME:VALUE", allow_hyphen_values = true)]
        impact_modifiers: Vec<String>,

        /// Attack degrees that deliver impact (e.g. ms,cs)
        #[arg(long, value_delimiter = ',', value_name = "DEGREE")]
        deliver_on: Vec<String>,

        /// Rule variant (sohl, legendary, misty_isle)
        #[arg(long)]
        system: Option<String>,

        /// RNG seed for reproducible rolls
        #[arg(short, long)]
        seed: Option<u64>,

        /// Print both snapshots as JSON
        #[arg(long)]
        json: bool,
    },

    /// Manage an AI plan proposal stored as JSON
    Plan {
        #[command(subcommand)]
        action: PlanCommand,
    },
}

#[derive(Subcommand)]
enum PlanCommand {
    /// Write a new pending proposal
    New {
        /// Proposal file to create
        file: PathBuf,

        /// Summary of the plan
        #[arg(short, long)]
        summary: String,

        /// Action as KIND:DESCRIPTION (repeatable, in order)
        #[arg(short, long = "action", value_name = "KIND:DESCRIPTION")]
        actions: Vec<String>,

        /// Assumption made while planning (repeatable)
        #[arg(long = "assume", value_name = "TEXT")]
        assumptions: Vec<String>,
    },

    /// Show a proposal and its status
    Show {
        /// Proposal file
        file: PathBuf,

        /// Print the proposal as JSON
        #[arg(long)]
        json: bool,
    },

    /// Approve a pending proposal
    Approve {
        /// Proposal file
        file: PathBuf,

        /// Reviewer note
        #[arg(short, long)]
        note: Option<String>,
    },

    /// Reject a pending proposal
    Reject {
        /// Proposal file
        file: PathBuf,

        /// Reason for rejecting
        #[arg(short, long)]
        reason: Option<String>,
    },

    /// Send a pending proposal back for revision
    Revise {
        /// Proposal file
        file: PathBuf,

        /// What should change
        #[arg(short, long)]
        note: Option<String>,

        /// Write the follow-up proposal to this file
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Summary for the follow-up proposal (default: unchanged)
        #[arg(short, long)]
        summary: Option<String>,

        /// Action for the follow-up as KIND:DESCRIPTION (default: unchanged)
        #[arg(short, long = "action", value_name = "KIND:DESCRIPTION")]
        actions: Vec<String>,
    },
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default.into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    let config = cli.config.as_deref();

    let result = match cli.command {
        Commands::Roll {
            formula,
            seed,
            json,
        } => commands::roll::run(config, &formula, seed, json),
        Commands::Test {
            base,
            modifiers,
            disabled,
            title,
            system,
            seed,
            json,
        } => commands::test::run(
            config,
            &commands::test::TestArgs {
                base,
                modifiers,
                disabled,
                title,
                system,
                seed,
            },
            json,
        ),
        Commands::Attack {
            base,
            modifiers,
            impact,
            aspect,
            impact_modifiers,
            deliver_on,
            system,
            seed,
            json,
        } => commands::attack::run(
            config,
            &commands::attack::AttackArgs {
                base,
                modifiers,
                impact,
                aspect,
                impact_modifiers,
                deliver_on,
                system,
                seed,
            },
            json,
        ),
        Commands::Plan { action } => match action {
            PlanCommand::New {
                file,
                summary,
                actions,
                assumptions,
            } => commands::plan::new(&file, &summary, &actions, &assumptions),
            PlanCommand::Show { file, json } => commands::plan::show(&file, json),
            PlanCommand::Approve { file, note } => commands::plan::approve(&file, note),
            PlanCommand::Reject { file, reason } => commands::plan::reject(&file, reason),
            PlanCommand::Revise {
                file,
                note,
                output,
                summary,
                actions,
            } => commands::plan::revise(&file, note, output.as_deref(), summary, &actions),
        },
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        process::exit(1);
    }
}
