//! Environment variable configuration
//!
//! Provides environment variable overrides for configuration.

use std::env;

/// Environment variable prefix
const ENV_PREFIX: &str = "ALTEREGO_PROBE";

/// Environment configuration from environment variables
#[derive(Clone, Debug, Default)]
pub struct EnvConfig {
    /// API base URL from ALTEREGO_PROBE_BASE_URL
    pub base_url: Option<String>,
    /// Environment name from ALTEREGO_PROBE_ENV
    pub environment: Option<String>,
    /// Timeout from ALTEREGO_PROBE_TIMEOUT
    pub timeout: Option<u64>,
    /// Config file from ALTEREGO_PROBE_CONFIG
    pub config_file: Option<String>,
    /// Output format from ALTEREGO_PROBE_FORMAT
    pub format: Option<String>,
    /// Pass threshold from ALTEREGO_PROBE_MIN_PASS_RATE
    pub min_pass_rate: Option<f64>,
    /// Admin user from ALTEREGO_PROBE_ADMIN_USERNAME
    pub admin_username: Option<String>,
    /// Admin password from ALTEREGO_PROBE_ADMIN_PASSWORD
    pub admin_password: Option<String>,
    /// Bypass number from ALTEREGO_PROBE_BYPASS_PHONE
    pub bypass_phone: Option<String>,
    /// Verbose from ALTEREGO_PROBE_VERBOSE
    pub verbose: Option<bool>,
}

impl EnvConfig {
    /// Load configuration from environment variables
    pub fn load() -> Self {
        Self {
            base_url: get_env("BASE_URL"),
            environment: get_env("ENV"),
            timeout: get_env_parse("TIMEOUT"),
            config_file: get_env("CONFIG"),
            format: get_env("FORMAT"),
            min_pass_rate: get_env_parse("MIN_PASS_RATE"),
            admin_username: get_env("ADMIN_USERNAME"),
            admin_password: get_env("ADMIN_PASSWORD"),
            bypass_phone: get_env("BYPASS_PHONE"),
            verbose: get_env_bool("VERBOSE"),
        }
    }

    /// Check if any environment variables are set
    pub fn has_any(&self) -> bool {
        self.base_url.is_some()
            || self.environment.is_some()
            || self.timeout.is_some()
            || self.config_file.is_some()
            || self.format.is_some()
            || self.min_pass_rate.is_some()
            || self.admin_username.is_some()
            || self.admin_password.is_some()
            || self.bypass_phone.is_some()
            || self.verbose.is_some()
    }

    /// Print current environment configuration
    pub fn print_summary(&self) {
        let password = self.admin_password.as_ref().map(|_| "********");
        println!("Environment Configuration:");
        println!("  {ENV_PREFIX}_BASE_URL:       {:?}", self.base_url);
        println!("  {ENV_PREFIX}_ENV:            {:?}", self.environment);
        println!("  {ENV_PREFIX}_TIMEOUT:        {:?}", self.timeout);
        println!("  {ENV_PREFIX}_CONFIG:         {:?}", self.config_file);
        println!("  {ENV_PREFIX}_FORMAT:         {:?}", self.format);
        println!("  {ENV_PREFIX}_MIN_PASS_RATE:  {:?}", self.min_pass_rate);
        println!("  {ENV_PREFIX}_ADMIN_USERNAME: {:?}", self.admin_username);
        println!("  {ENV_PREFIX}_ADMIN_PASSWORD: {password:?}");
        println!("  {ENV_PREFIX}_BYPASS_PHONE:   {:?}", self.bypass_phone);
        println!("  {ENV_PREFIX}_VERBOSE:        {:?}", self.verbose);
    }
}

/// Get environment variable with prefix
fn get_env(name: &str) -> Option<String> {
    env::var(format!("{ENV_PREFIX}_{name}"))
        .ok()
        .filter(|v| !v.trim().is_empty())
}

/// Get environment variable and parse to type
fn get_env_parse<T: std::str::FromStr>(name: &str) -> Option<T> {
    get_env(name).and_then(|v| v.trim().parse().ok())
}

/// Get environment variable as boolean
fn get_env_bool(name: &str) -> Option<bool> {
    get_env(name).map(|v| {
        matches!(
            v.to_lowercase().as_str(),
            "1" | "true" | "yes" | "on" | "enabled"
        )
    })
}

/// Print all ALTEREGO_PROBE environment variables
pub fn print_env_help() {
    println!("Environment Variables:");
    println!();
    println!("  {ENV_PREFIX}_BASE_URL        API base URL (overrides the environment)");
    println!("  {ENV_PREFIX}_ENV             Named environment (preview, local)");
    println!("  {ENV_PREFIX}_TIMEOUT         Request timeout in seconds");
    println!("  {ENV_PREFIX}_CONFIG          Path to configuration file");
    println!("  {ENV_PREFIX}_FORMAT          Output format (table, json, csv, summary)");
    println!("  {ENV_PREFIX}_MIN_PASS_RATE   Pass rate (percent) required for exit code 0");
    println!("  {ENV_PREFIX}_ADMIN_USERNAME  Admin account for authenticated probes");
    println!("  {ENV_PREFIX}_ADMIN_PASSWORD  Admin password");
    println!("  {ENV_PREFIX}_BYPASS_PHONE    Phone number that skips SMS delivery");
    println!("  {ENV_PREFIX}_VERBOSE         Enable debug output (true/false)");
    println!();
    println!("Example:");
    println!("  export {ENV_PREFIX}_ENV=local");
    println!("  alterego-probe run --suite otp");
}
