//! Configuration module
//!
//! Settings are layered: built-in defaults, then the config file, then
//! `ALTEREGO_PROBE_*` environment variables, then command-line flags.

mod env;
mod file;

pub use env::{print_env_help, EnvConfig};
pub use file::ConfigFile;

use anyhow::{Context, Result};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::models::fixtures::{
    DEFAULT_ADMIN_PASSWORD, DEFAULT_ADMIN_USERNAME, DEFAULT_BYPASS_PHONE,
};
use crate::models::Suite;

/// Application configuration
#[derive(Clone, Debug, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct AppConfig {
    /// Environment used when no base URL is given
    pub default_environment: String,

    /// Request timeout in seconds
    pub timeout_secs: u64,

    /// Timeout for estimation requests, which aggregate DVF and market data
    pub estimate_timeout_secs: u64,

    /// Minimum pass rate (percent) for a successful exit code
    pub min_pass_rate: f64,

    /// Output format (table, json, json-pretty, csv, summary)
    pub format: String,

    /// Suites run when none are selected on the command line
    pub suites: Vec<Suite>,

    /// Admin account used by authenticated probes
    pub admin: AdminCredentials,

    /// Number the verification service never texts
    pub bypass_phone: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            default_environment: "preview".to_string(),
            timeout_secs: 10,
            estimate_timeout_secs: 30,
            min_pass_rate: 100.0,
            format: "table".to_string(),
            suites: Suite::defaults(),
            admin: AdminCredentials::default(),
            bypass_phone: DEFAULT_BYPASS_PHONE.to_string(),
        }
    }
}

/// Admin login credentials
#[derive(Clone, Debug, Serialize, Deserialize, JsonSchema)]
pub struct AdminCredentials {
    pub username: String,
    pub password: String,
}

impl Default for AdminCredentials {
    fn default() -> Self {
        Self {
            username: DEFAULT_ADMIN_USERNAME.to_string(),
            password: DEFAULT_ADMIN_PASSWORD.to_string(),
        }
    }
}

/// Values given on the command line
#[derive(Clone, Debug, Default)]
pub struct CliOverrides {
    pub base_url: Option<String>,
    pub environment: Option<String>,
    pub timeout_secs: Option<u64>,
    pub format: Option<String>,
    pub min_pass_rate: Option<f64>,
    pub bypass_phone: Option<String>,
    pub suites: Vec<Suite>,
}

/// Fully resolved settings for one run
#[derive(Clone, Debug)]
pub struct Settings {
    pub base_url: String,
    pub environment: Option<String>,
    pub timeout_secs: u64,
    pub estimate_timeout_secs: u64,
    pub min_pass_rate: f64,
    pub format: String,
    pub suites: Vec<Suite>,
    pub admin: AdminCredentials,
    pub bypass_phone: String,
}

impl Settings {
    /// Merge the configuration layers
    pub fn resolve(file: &ConfigFile, env: &EnvConfig, cli: CliOverrides) -> Result<Self> {
        let app = &file.app;

        // An explicit base URL is a custom target, not a named environment
        let (base_url, environment) = match cli.base_url.clone().or_else(|| env.base_url.clone()) {
            Some(url) => (url, None),
            None => {
                let name = cli
                    .environment
                    .clone()
                    .or_else(|| env.environment.clone())
                    .unwrap_or_else(|| app.default_environment.clone());
                let url = file
                    .environment(&name)
                    .map(|e| e.base_url.clone())
                    .with_context(|| {
                        format!(
                            "Unknown environment '{}'. Known: {}",
                            name,
                            file.environment_names().join(", ")
                        )
                    })?;
                (url, Some(name))
            }
        };

        let admin = AdminCredentials {
            username: env
                .admin_username
                .clone()
                .unwrap_or_else(|| app.admin.username.clone()),
            password: env
                .admin_password
                .clone()
                .unwrap_or_else(|| app.admin.password.clone()),
        };

        let suites = if cli.suites.is_empty() {
            app.suites.clone()
        } else {
            cli.suites
        };

        Ok(Self {
            base_url,
            environment,
            timeout_secs: cli
                .timeout_secs
                .or(env.timeout)
                .unwrap_or(app.timeout_secs),
            estimate_timeout_secs: app.estimate_timeout_secs,
            min_pass_rate: cli
                .min_pass_rate
                .or(env.min_pass_rate)
                .unwrap_or(app.min_pass_rate),
            format: cli
                .format
                .or_else(|| env.format.clone())
                .unwrap_or_else(|| app.format.clone()),
            suites,
            admin,
            bypass_phone: cli
                .bypass_phone
                .or_else(|| env.bypass_phone.clone())
                .unwrap_or_else(|| app.bypass_phone.clone()),
        })
    }
}
