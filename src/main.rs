//! AlterEgo Probe - black-box checks for the AlterEgo estimation API
//!
//! A CLI tool that drives the public HTTP surface of an AlterEgo deployment
//! (geocoding, DVF comparables, market listings, estimation, leads and
//! phone verification) and reports what passed.
//!
//! ## Features
//!
//! - Five standard suites plus two DVF diagnostics
//! - Admin login shared across authenticated probes
//! - Table, JSON, CSV and one-line summary output
//! - Stored runs for later comparison
//!
//! ## Usage
//!
//! ```bash
//! # Run the default suites against the preview deployment
//! alterego-probe run
//!
//! # Run the OTP suite against a local server
//! alterego-probe run --suite otp --env local
//!
//! # Run everything and keep the results
//! alterego-probe run --all --save --format json
//!
//! # List available suites
//! alterego-probe list --detailed
//!
//! # Show the latest stored run
//! alterego-probe results latest
//! ```

use anyhow::Result;
use clap::Parser;
use tracing::{debug, info};

mod cli;
mod config;
mod executor;
mod http;
mod models;
mod output;
mod results;
mod suites;
mod utils;

use cli::Args;
use config::{ConfigFile, EnvConfig, Settings};
use executor::SuiteRunner;
use models::Suite;
use output::{OutputFormat, ResultFormatter};
use results::{ResultsStorage, StoredRun};
use utils::{init_logger, LogLevel};

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let env = EnvConfig::load();

    init_logger(LogLevel::from_verbose(
        args.verbose || env.verbose.unwrap_or(false),
    ));

    if env.has_any() {
        debug!("Using ALTEREGO_PROBE_* environment overrides");
    }

    let config_path = args.config.clone().or_else(|| env.config_file.clone());

    match args.command {
        cli::Command::Run(run_args) => {
            let file = load_config(config_path.as_deref())?;
            let passed = run_probes(run_args, &file, &env).await?;
            if !passed {
                std::process::exit(1);
            }
        }
        cli::Command::List(list_args) => {
            list_suites(list_args);
        }
        cli::Command::Config(config_args) => {
            manage_config(config_args, config_path.as_deref(), &env)?;
        }
        cli::Command::Results(results_args) => {
            show_results(results_args)?;
        }
    }

    Ok(())
}

fn load_config(path: Option<&str>) -> Result<ConfigFile> {
    match path {
        Some(path) => {
            debug!("Loading configuration from {}", path);
            ConfigFile::load(path)
        }
        None => ConfigFile::load_default(),
    }
}

fn parse_format(format: &str) -> Result<OutputFormat> {
    OutputFormat::from_str(format).ok_or_else(|| {
        anyhow::anyhow!(
            "Unknown output format: {format}. Use table, json, json-pretty, csv or summary."
        )
    })
}

/// Returns whether the run met the required pass rate
async fn run_probes(args: cli::RunArgs, file: &ConfigFile, env: &EnvConfig) -> Result<bool> {
    let suites = if args.all { Suite::all() } else { args.suites };

    let overrides = config::CliOverrides {
        base_url: args.base_url,
        environment: args.env,
        timeout_secs: args.timeout,
        format: args.format,
        min_pass_rate: args.min_pass_rate,
        bypass_phone: args.bypass_phone,
        suites,
    };
    let settings = Settings::resolve(file, env, overrides)?;
    let format = parse_format(&settings.format)?;

    let runner = SuiteRunner::new(&settings)?;
    let summary = runner.run().await;

    let formatter = ResultFormatter::new(format);
    println!("{}", formatter.format_summary(&summary)?);

    if let Some(path) = &args.output {
        output::write_results_to_file(path, &summary, format)?;
        info!("Results written to {}", path);
    }

    let passed = summary.meets(settings.min_pass_rate);

    if args.save {
        save_run(&ResultsStorage::default_dir(), summary, &settings)?;
    }

    if !passed {
        info!(
            "Pass rate below the required {:.1}%",
            settings.min_pass_rate
        );
    }

    Ok(passed)
}

/// Store a finished run; reports go to the log so stdout keeps only the results
fn save_run(
    storage: &ResultsStorage,
    summary: models::RunSummary,
    settings: &Settings,
) -> Result<StoredRun> {
    let run = StoredRun::new(summary, settings.suites.clone(), settings.environment.clone());
    storage.save(&run)?;
    info!("Saved run {} to {}", run.id, storage.base_dir().display());
    Ok(run)
}

fn list_suites(args: cli::ListArgs) {
    let defaults = Suite::defaults();

    println!("\nAlterEgo API Probe Suites\n");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    for suite in Suite::all() {
        let marker = if defaults.contains(&suite) {
            "default"
        } else if suite.is_diagnostic() {
            "diagnostic"
        } else {
            ""
        };

        println!("  {:30} {:12} [{}]", suite.name(), suite.slug(), marker);
        if args.detailed {
            println!("      {}", suite.description());
        }
    }

    println!("\n━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("Select suites with --suite <slug|number>, or --all for every suite.\n");
}

fn results_storage(dir: Option<String>) -> ResultsStorage {
    match dir {
        Some(dir) => ResultsStorage::new(dir),
        None => ResultsStorage::default_dir(),
    }
}

fn print_run(run: &StoredRun, format: &str) -> Result<()> {
    let format = parse_format(format)?;
    println!("Run {} ({})", run.id, run.environment.as_deref().unwrap_or("custom target"));
    println!(
        "{}",
        ResultFormatter::new(format).format_summary(&run.summary)?
    );
    Ok(())
}

fn show_results(args: cli::ResultsArgs) -> Result<()> {
    let storage = results_storage(args.dir);
    debug!("Reading stored runs from {}", storage.base_dir().display());

    match args.action {
        cli::ResultsAction::List => {
            let runs = storage.list()?;

            if runs.is_empty() {
                println!("\n📭 No stored results found.");
                println!("   Run probes with: alterego-probe run --save");
                return Ok(());
            }

            println!("\n┌──────────────────────────────────────────────────────────────────────────┐");
            println!("│ Stored Probe Runs                                                        │");
            println!("├──────────────────────────────────────────────────────────────────────────┤");
            for run in &runs {
                println!(
                    "│ {:20} │ {} │ {:3} probes │ {:5.1}% │ {}",
                    run.id,
                    run.started_at.format("%Y-%m-%d %H:%M"),
                    run.total,
                    run.pass_rate,
                    run.target
                );
            }
            println!("└──────────────────────────────────────────────────────────────────────────┘");
            println!("\nUse 'alterego-probe results show <id>' to view a run.\n");
        }

        cli::ResultsAction::Show { id, format } => {
            let run = match id {
                Some(id) => storage.load(&id)?,
                None => match storage.latest()? {
                    Some(run) => run,
                    None => {
                        println!("No stored results found.");
                        return Ok(());
                    }
                },
            };
            print_run(&run, &format)?;
        }

        cli::ResultsAction::Latest { format } => match storage.latest()? {
            Some(run) => print_run(&run, &format)?,
            None => println!("No stored results found."),
        },
    }

    Ok(())
}

fn manage_config(args: cli::ConfigArgs, config_path: Option<&str>, env: &EnvConfig) -> Result<()> {
    use std::path::Path;

    match args.action {
        cli::ConfigAction::Init { path, force } => {
            if Path::new(&path).exists() && !force {
                anyhow::bail!("Configuration file already exists: {path}. Use --force to overwrite.");
            }

            ConfigFile::example().save(&path)?;
            println!("✓ Configuration file created: {path}");
            println!("\nEdit the file to customize your settings.");
        }

        cli::ConfigAction::Show => {
            let file = load_config(config_path)?;
            let settings = Settings::resolve(&file, env, config::CliOverrides::default())?;

            println!("Effective Configuration:");
            println!("  Base URL:          {}", settings.base_url);
            println!(
                "  Environment:       {}",
                settings.environment.as_deref().unwrap_or("-")
            );
            println!("  Timeout:           {}s", settings.timeout_secs);
            println!("  Estimate timeout:  {}s", settings.estimate_timeout_secs);
            println!("  Min pass rate:     {:.1}%", settings.min_pass_rate);
            println!("  Format:            {}", settings.format);
            println!(
                "  Suites:            {}",
                settings
                    .suites
                    .iter()
                    .map(|s| s.slug())
                    .collect::<Vec<_>>()
                    .join(", ")
            );
            println!("  Admin username:    {}", settings.admin.username);
            println!("  Admin password:    ********");
            println!("  Bypass phone:      {}", settings.bypass_phone);

            println!("\nEnvironments:");
            for environment in &file.environments {
                println!(
                    "  {:10} {:50} {}",
                    environment.name, environment.base_url, environment.description
                );
            }
        }

        cli::ConfigAction::Validate { path } => {
            let path = path
                .or_else(|| config_path.map(str::to_string))
                .or_else(|| ConfigFile::find().map(|p| p.to_string_lossy().to_string()))
                .unwrap_or_else(|| "./alterego-probe.yaml".to_string());

            match ConfigFile::load(&path) {
                Ok(_) => {
                    println!("✓ Configuration file is valid: {path}");
                }
                Err(e) => {
                    println!("✗ Configuration file is invalid: {path}");
                    println!("  Error: {e:#}");
                    return Err(e);
                }
            }
        }

        cli::ConfigAction::Schema => {
            println!("{}", ConfigFile::schema()?);
        }

        cli::ConfigAction::Env => {
            config::print_env_help();
            println!();
            env.print_summary();
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn settings(base_url: Option<&str>) -> Settings {
        let cli = config::CliOverrides {
            base_url: base_url.map(str::to_string),
            suites: vec![Suite::Core],
            ..Default::default()
        };
        Settings::resolve(&ConfigFile::default(), &EnvConfig::default(), cli).unwrap()
    }

    #[test]
    fn test_save_run_labels_custom_target() {
        let dir = tempfile::tempdir().unwrap();
        let storage = ResultsStorage::new(dir.path());
        let settings = settings(Some("http://localhost:3000/api"));
        let summary = models::RunSummary::new(&settings.base_url, Utc::now(), Vec::new());

        let run = save_run(&storage, summary, &settings).unwrap();
        let loaded = storage.load(&run.id).unwrap();
        assert_eq!(loaded.environment, None);
        assert_eq!(loaded.suites, vec![Suite::Core]);
    }

    #[test]
    fn test_save_run_keeps_named_environment() {
        let dir = tempfile::tempdir().unwrap();
        let storage = ResultsStorage::new(dir.path());
        let settings = settings(None);
        let summary = models::RunSummary::new(&settings.base_url, Utc::now(), Vec::new());

        let run = save_run(&storage, summary, &settings).unwrap();
        assert_eq!(
            storage.load(&run.id).unwrap().environment.as_deref(),
            Some("preview")
        );
    }
}
