//! CLI interface for the intervention council

use anyhow::{Context, Result};
use chrono::Local;
use clap::{ArgGroup, Parser, Subcommand};
use std::path::PathBuf;

use crate::catalog::{composite_plan, load_catalog};
use crate::config::Config;
use crate::experts::{CuriosityExpert, HabitExpert};
use crate::types::RawContext;

#[derive(Parser)]
#[command(name = "council")]
#[command(about = "Recommend an intervention strategy and learn from how it went", long_about = None)]
#[command(version)]
struct Cli {
    /// Use this config file instead of the default location
    #[arg(long, global = true, env = "COUNCIL_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Pick a strategy for the current context
    Select {
        /// Energy level: low, medium or high
        #[arg(short, long)]
        energy: Option<String>,
        /// Stress level: low, medium or high
        #[arg(short, long)]
        stress: Option<String>,
        /// Catalog file or directory of research modules
        #[arg(short, long)]
        catalog: PathBuf,
        /// Seed the curiosity expert for a reproducible pick
        #[arg(long)]
        seed: Option<u64>,
        /// Print every expert's ballot
        #[arg(long)]
        explain: bool,
    },
    /// Report how a strategy went
    #[command(group(ArgGroup::new("outcome").required(true).args(["success", "failure"])))]
    Feedback {
        /// Strategy name as returned by `select`
        strategy: String,
        #[arg(long)]
        success: bool,
        #[arg(long)]
        failure: bool,
    },
    /// Build a trigger / action / retention plan from a catalog
    Plan {
        /// Catalog file or directory of research modules
        #[arg(short, long)]
        catalog: PathBuf,
        /// Print the plan as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show learned habit streaks and curiosity beliefs
    State,
    /// Show or reset configuration
    Config {
        /// Show current configuration
        #[arg(long)]
        show: bool,
        /// Reset configuration to defaults
        #[arg(long)]
        reset: bool,
    },
}

/// Run the CLI
pub fn run() -> Result<()> {
    let cli = Cli::parse();
    let mut config = load_config(cli.config.as_ref())?;

    match cli.command {
        Commands::Select {
            energy,
            stress,
            catalog,
            seed,
            explain,
        } => {
            if seed.is_some() {
                config.curiosity.seed = seed;
            }
            let strategies = load_catalog(&catalog)?;
            let coordinator = config.coordinator()?;
            let raw = RawContext { energy, stress };

            let decision = coordinator.deliberate(&raw, &Local::now(), &strategies)?;

            if explain {
                println!("Context: {} {:?}", decision.context.time_bin(), decision.context.as_slice());
                for ballot in &decision.ballots {
                    println!("[{}] (weight {})", ballot.expert, ballot.weight);
                    for (name, score) in ballot.top(3) {
                        println!("  - {}: {:.2}", name, score);
                    }
                }
                println!();
            }

            let chosen = decision.strategy;
            println!("{} (score {:.2})", chosen.name, decision.score);
            if !chosen.logic.is_empty() {
                println!("  {}", chosen.logic);
            }
            if let Some(title) = chosen.source.as_ref().and_then(|s| s.title.as_ref()) {
                println!("  Source: {}", title);
            }
        }
        Commands::Feedback {
            strategy,
            success,
            failure: _,
        } => {
            let coordinator = config.coordinator()?;
            let report = coordinator.feedback(&strategy, success);
            for kind in &report.updated {
                println!("{} updated", kind);
            }
            for (kind, err) in &report.failed {
                eprintln!("{} failed: {}", kind, err);
            }
            if !report.is_clean() {
                anyhow::bail!("{} expert(s) could not save the outcome", report.failed.len());
            }
        }
        Commands::Plan { catalog, json } => {
            let strategies = load_catalog(&catalog)?;
            let plan = composite_plan(&strategies);
            if json {
                let out = serde_json::to_string_pretty(&plan).context("Failed to serialize plan")?;
                println!("{}", out);
            } else {
                println!("{}", plan.name);
                println!("  {}", plan.rationale);
                for step in &plan.steps {
                    println!("\n[{}] {}", step.phase, step.strategy);
                    if !step.logic.is_empty() {
                        println!("  {}", step.logic);
                    }
                    if let Some(source) = &step.source {
                        println!("  Source: {}", source);
                    }
                }
            }
        }
        Commands::State => {
            let state_dir = config.state_dir()?;
            println!("State directory: {}", state_dir.display());

            let habit = HabitExpert::new(Some(&state_dir));
            println!("\nHabit streaks:");
            for (name, streak) in habit.streaks() {
                println!("  {:<40} {}", name, streak);
            }

            let curiosity = CuriosityExpert::from_entropy(Some(&state_dir));
            println!("\nCuriosity beliefs:");
            for (name, params) in curiosity.all_params() {
                println!(
                    "  {:<40} Beta({}, {})  mean {:.2}",
                    name,
                    params.alpha,
                    params.beta,
                    params.mean()
                );
            }
        }
        Commands::Config { show, reset } => {
            if reset {
                config = Config::default();
                save_config(&config, cli.config.as_ref())?;
                println!("Configuration reset to defaults.");
            }
            if show || !reset {
                let toml = toml::to_string_pretty(&config).context("Failed to serialize config")?;
                println!("{}", toml);
            }
        }
    }

    Ok(())
}

fn load_config(path: Option<&PathBuf>) -> Result<Config> {
    match path {
        Some(path) if path.exists() => Config::load_from(path),
        Some(path) => {
            let config = Config::default();
            config.save_to(path)?;
            tracing::info!("Wrote default config to {}", path.display());
            Ok(config)
        }
        None => Config::load(),
    }
}

fn save_config(config: &Config, path: Option<&PathBuf>) -> Result<()> {
    match path {
        Some(path) => config.save_to(path),
        None => config.save(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_feedback_requires_outcome() {
        assert!(Cli::try_parse_from(["council", "feedback", "Visual Timer"]).is_err());
        assert!(Cli::try_parse_from(["council", "feedback", "Visual Timer", "--success"]).is_ok());
        assert!(
            Cli::try_parse_from(["council", "feedback", "X", "--success", "--failure"]).is_err()
        );
    }

    #[test]
    fn test_plan_requires_catalog() {
        assert!(Cli::try_parse_from(["council", "plan"]).is_err());
        let cli = Cli::try_parse_from(["council", "plan", "--catalog", "modules", "--json"]).unwrap();
        assert!(matches!(cli.command, Commands::Plan { json: true, .. }));
    }

    #[test]
    fn test_load_config_writes_default_for_new_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("council.toml");
        let config = load_config(Some(&path)).unwrap();
        assert!(path.exists());
        assert_eq!(config.weights.stress, 1.5);
        assert!(crate::config::default_config_toml().contains("[weights]"));
    }
}
