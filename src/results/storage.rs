//! Results storage and retrieval
//!
//! Persists probe runs as JSON files under the user's data directory.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::models::{RunSummary, Suite};

/// Stored probe run
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StoredRun {
    /// Unique run ID
    pub id: String,

    /// Named environment, when the target came from one
    pub environment: Option<String>,

    /// Suites selected for the run
    pub suites: Vec<Suite>,

    /// Results and tallies
    pub summary: RunSummary,

    /// Machine the run was made from
    pub host: HostInfo,
}

/// Host information
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct HostInfo {
    /// Operating system
    pub os: String,

    /// Architecture
    pub arch: String,

    /// Tool version
    pub tool_version: String,
}

impl Default for HostInfo {
    fn default() -> Self {
        Self {
            os: std::env::consts::OS.to_string(),
            arch: std::env::consts::ARCH.to_string(),
            tool_version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

impl StoredRun {
    pub fn new(summary: RunSummary, suites: Vec<Suite>, environment: Option<String>) -> Self {
        Self {
            id: generate_run_id(&summary.started_at),
            environment,
            suites,
            summary,
            host: HostInfo::default(),
        }
    }

    pub fn info(&self) -> RunInfo {
        RunInfo {
            id: self.id.clone(),
            target: self.summary.target.clone(),
            started_at: self.summary.started_at,
            total: self.summary.total,
            pass_rate: self.summary.pass_rate(),
        }
    }
}

/// Generate unique run ID
fn generate_run_id(started_at: &DateTime<Utc>) -> String {
    let timestamp = started_at.format("%Y%m%d_%H%M%S");
    let random: u32 = rand::random::<u32>() % 10000;
    format!("{timestamp}_{random:04}")
}

/// Results storage manager
pub struct ResultsStorage {
    /// Base directory for results
    base_dir: PathBuf,
}

impl ResultsStorage {
    /// Create a new results storage
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    /// Create with default directory
    pub fn default_dir() -> Self {
        let base_dir = dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("alterego-probe")
            .join("results");
        Self::new(base_dir)
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Get path for a specific run
    fn run_path(&self, run_id: &str) -> PathBuf {
        self.base_dir.join(format!("{run_id}.json"))
    }

    /// Save a run
    pub fn save(&self, run: &StoredRun) -> Result<PathBuf> {
        fs::create_dir_all(&self.base_dir).with_context(|| {
            format!("Failed to create results directory {}", self.base_dir.display())
        })?;

        let path = self.run_path(&run.id);
        let file = File::create(&path).context("Failed to create results file")?;
        let writer = BufWriter::new(file);

        serde_json::to_writer_pretty(writer, run).context("Failed to write results")?;

        info!("Saved probe results to {}", path.display());
        Ok(path)
    }

    /// Load a run by ID
    pub fn load(&self, run_id: &str) -> Result<StoredRun> {
        let path = self.run_path(run_id);
        if !path.exists() {
            anyhow::bail!("No stored run with ID {}", run_id);
        }
        let run = load_from_path(&path)?;
        debug!("Loaded probe results from {}", path.display());
        Ok(run)
    }

    /// Load all runs, newest first
    pub fn load_all(&self) -> Result<Vec<StoredRun>> {
        if !self.base_dir.exists() {
            return Ok(Vec::new());
        }

        let mut runs = Vec::new();
        for entry in fs::read_dir(&self.base_dir)? {
            let path = entry?.path();

            if path.extension().map(|e| e == "json").unwrap_or(false) {
                match load_from_path(&path) {
                    Ok(run) => runs.push(run),
                    Err(e) => {
                        debug!("Failed to load {}: {}", path.display(), e);
                    }
                }
            }
        }

        runs.sort_by(|a, b| b.summary.started_at.cmp(&a.summary.started_at));
        Ok(runs)
    }

    /// List stored runs, newest first
    pub fn list(&self) -> Result<Vec<RunInfo>> {
        Ok(self.load_all()?.iter().map(StoredRun::info).collect())
    }

    /// Most recent run
    pub fn latest(&self) -> Result<Option<StoredRun>> {
        Ok(self.load_all()?.into_iter().next())
    }
}

fn load_from_path(path: &Path) -> Result<StoredRun> {
    let file = File::open(path)
        .with_context(|| format!("Failed to open results file {}", path.display()))?;
    let reader = BufReader::new(file);
    serde_json::from_reader(reader).context("Failed to parse results")
}

/// Brief run information
#[derive(Clone, Debug)]
pub struct RunInfo {
    pub id: String,
    pub target: String,
    pub started_at: DateTime<Utc>,
    pub total: usize,
    pub pass_rate: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TestResult;
    use chrono::Duration;
    use tempfile::tempdir;

    fn run_at(started_at: DateTime<Utc>, passed: bool) -> StoredRun {
        let result = if passed {
            TestResult::pass(Suite::Core, "Health Check", "ok")
        } else {
            TestResult::fail(Suite::Core, "Health Check", "HTTP 502")
        };
        let summary = RunSummary::new("http://localhost:3000/api", started_at, vec![result]);
        StoredRun::new(summary, vec![Suite::Core], Some("local".to_string()))
    }

    #[test]
    fn test_generate_run_id() {
        let now = Utc::now();
        let id = generate_run_id(&now);
        assert!(id.starts_with(&now.format("%Y%m%d_%H%M%S").to_string()));
        assert_eq!(id.len(), "20250101_120000_0000".len());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempdir().unwrap();
        let storage = ResultsStorage::new(dir.path().join("results"));
        let run = run_at(Utc::now(), true);

        let path = storage.save(&run).unwrap();
        assert!(path.exists());

        let loaded = storage.load(&run.id).unwrap();
        assert_eq!(loaded.summary.total, 1);
        assert_eq!(loaded.environment.as_deref(), Some("local"));
        assert_eq!(loaded.suites, vec![Suite::Core]);
        assert_eq!(loaded.host.tool_version, env!("CARGO_PKG_VERSION"));
    }

    #[test]
    fn test_list_and_latest_order() {
        let dir = tempdir().unwrap();
        let storage = ResultsStorage::new(dir.path());
        let older = run_at(Utc::now() - Duration::hours(2), false);
        let newer = run_at(Utc::now(), true);
        storage.save(&older).unwrap();
        storage.save(&newer).unwrap();
        fs::write(dir.path().join("garbage.json"), "not json").unwrap();

        let runs = storage.list().unwrap();
        assert_eq!(runs.len(), 2);
        assert_eq!(runs[0].id, newer.id);
        assert_eq!(runs[1].pass_rate, 0.0);

        assert_eq!(storage.latest().unwrap().unwrap().id, newer.id);
    }

    #[test]
    fn test_empty_storage() {
        let dir = tempdir().unwrap();
        let storage = ResultsStorage::new(dir.path().join("missing"));
        assert!(storage.list().unwrap().is_empty());
        assert!(storage.latest().unwrap().is_none());
        assert!(storage.load("nope").is_err());
    }
}
