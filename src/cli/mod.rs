//! CLI argument parsing
//!
//! Defines command-line interface using clap.

use clap::{Parser, Subcommand};

use crate::models::Suite;

/// Black-box integration probes for the AlterEgo estimation API
#[derive(Parser, Debug)]
#[command(name = "alterego-probe")]
#[command(version)]
#[command(about = "Probe the AlterEgo real-estate estimation API over HTTP")]
#[command(long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Configuration file (defaults to ./alterego-probe.yaml when present)
    #[arg(short, long, global = true)]
    pub config: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run probe suites against a deployment
    Run(RunArgs),

    /// List available suites
    List(ListArgs),

    /// Manage configuration
    Config(ConfigArgs),

    /// View stored results
    Results(ResultsArgs),
}

/// Arguments for run command
#[derive(Parser, Debug)]
pub struct RunArgs {
    /// Suite to run (name or number, repeatable)
    #[arg(short, long = "suite", value_parser = parse_suite)]
    pub suites: Vec<Suite>,

    /// Run every suite, including diagnostics
    #[arg(short, long, conflicts_with = "suites")]
    pub all: bool,

    /// API base URL including the /api prefix
    #[arg(short, long)]
    pub base_url: Option<String>,

    /// Named environment from the config file (preview, local)
    #[arg(short, long)]
    pub env: Option<String>,

    /// Request timeout in seconds
    #[arg(short, long)]
    pub timeout: Option<u64>,

    /// Output format (table, json, json-pretty, csv, summary)
    #[arg(short, long)]
    pub format: Option<String>,

    /// Pass rate (percent) required for a zero exit code
    #[arg(long)]
    pub min_pass_rate: Option<f64>,

    /// Store the run under the results directory
    #[arg(long)]
    pub save: bool,

    /// Also write the formatted results to this file
    #[arg(short, long)]
    pub output: Option<String>,

    /// Phone number the verification service treats as a test number
    #[arg(long)]
    pub bypass_phone: Option<String>,
}

fn parse_suite(s: &str) -> Result<Suite, String> {
    Suite::from_str(s).ok_or_else(|| {
        let known: Vec<_> = Suite::all().iter().map(|s| s.slug()).collect();
        format!("unknown suite '{}' (expected one of: {})", s, known.join(", "))
    })
}

/// Arguments for list command
#[derive(Parser, Debug)]
pub struct ListArgs {
    /// Show suite descriptions
    #[arg(short, long)]
    pub detailed: bool,
}

/// Arguments for config command
#[derive(Parser, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Write an example configuration file
    Init {
        /// Destination path
        #[arg(default_value = "alterego-probe.yaml")]
        path: String,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Show the effective configuration
    Show,

    /// Validate a configuration file
    Validate {
        /// File to validate (defaults to the discovered config)
        path: Option<String>,
    },

    /// Print the JSON schema of the configuration file
    Schema,

    /// Describe the ALTEREGO_PROBE_* environment variables
    Env,
}

/// Arguments for results command
#[derive(Parser, Debug)]
pub struct ResultsArgs {
    #[command(subcommand)]
    pub action: ResultsAction,

    /// Results directory (defaults to the user data directory)
    #[arg(long, global = true)]
    pub dir: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum ResultsAction {
    /// List stored runs
    List,

    /// Show a stored run (the latest when no ID is given)
    Show {
        /// Run ID
        id: Option<String>,

        /// Output format
        #[arg(short, long, default_value = "table")]
        format: String,
    },

    /// Show the latest stored run
    Latest {
        /// Output format
        #[arg(short, long, default_value = "table")]
        format: String,
    },
}
