//! Configuration management
//!
//! Every path and endpoint the engine touches lives in `EngineConfig`,
//! built once at startup and passed to each component.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Name of the optional override file inside the root directory
pub const CONFIG_FILE_NAME: &str = "daily-engine.toml";

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Installation directory all relative paths resolve against
    #[serde(skip)]
    pub root: PathBuf,
    /// External endpoints
    #[serde(default)]
    pub sources: SourcesConfig,
    /// Artifact locations, relative to `root`
    #[serde(default)]
    pub paths: PathsConfig,
}

/// External data endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourcesConfig {
    /// Weather endpoint; the response must carry a `current_weather` object
    #[serde(default = "default_weather_url")]
    pub weather_url: String,
    /// Price endpoint; asset id -> currency code -> price
    #[serde(default = "default_crypto_url")]
    pub crypto_url: String,
    /// User-Agent header sent with both requests
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_weather_url() -> String {
    "https://api.open-meteo.com/v1/forecast?latitude=37.7749&longitude=-122.4194&current_weather=true"
        .to_string()
}

fn default_crypto_url() -> String {
    "https://api.coingecko.com/api/v3/simple/price?ids=bitcoin,ethereum&vs_currencies=usd"
        .to_string()
}

fn default_user_agent() -> String {
    format!("{}/{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"))
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            weather_url: default_weather_url(),
            crypto_url: default_crypto_url(),
            user_agent: default_user_agent(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    #[serde(default = "default_progress_log")]
    pub progress_log: PathBuf,
    #[serde(default = "default_readme")]
    pub readme: PathBuf,
    #[serde(default = "default_streak_file")]
    pub streak_file: PathBuf,
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    /// Relative to `data_dir`
    #[serde(default = "default_daily_data_file")]
    pub daily_data_file: PathBuf,
    #[serde(default = "default_experiments_dir")]
    pub experiments_dir: PathBuf,
    /// Relative to `experiments_dir`
    #[serde(default = "default_metrics_file")]
    pub metrics_file: PathBuf,
}

fn default_progress_log() -> PathBuf {
    PathBuf::from("progress-log.md")
}

fn default_readme() -> PathBuf {
    PathBuf::from("README.md")
}

fn default_streak_file() -> PathBuf {
    PathBuf::from("streak.json")
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("data")
}

fn default_daily_data_file() -> PathBuf {
    PathBuf::from("daily-data.json")
}

fn default_experiments_dir() -> PathBuf {
    PathBuf::from("experiments")
}

fn default_metrics_file() -> PathBuf {
    PathBuf::from("metrics.json")
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            progress_log: default_progress_log(),
            readme: default_readme(),
            streak_file: default_streak_file(),
            data_dir: default_data_dir(),
            daily_data_file: default_daily_data_file(),
            experiments_dir: default_experiments_dir(),
            metrics_file: default_metrics_file(),
        }
    }
}

impl EngineConfig {
    /// Defaults rooted at `root`
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            sources: SourcesConfig::default(),
            paths: PathsConfig::default(),
        }
    }

    /// Load configuration for `root`.
    ///
    /// Reads `explicit` if given, otherwise `<root>/daily-engine.toml` when it
    /// exists. A missing default file yields the built-in defaults; a file that
    /// exists but does not parse is an error.
    pub fn load(root: impl Into<PathBuf>, explicit: Option<&Path>) -> Result<Self> {
        let root = root.into();
        let config_path = match explicit {
            Some(path) => path.to_path_buf(),
            None => root.join(CONFIG_FILE_NAME),
        };

        if explicit.is_none() && !config_path.exists() {
            return Ok(Self::with_root(root));
        }

        let contents = std::fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read config file {}", config_path.display()))?;
        let mut config: EngineConfig = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file {}", config_path.display()))?;
        config.root = root;
        Ok(config)
    }

    /// Create the data and experiment directories if absent
    pub fn ensure_dirs(&self) -> Result<()> {
        for dir in [self.data_dir(), self.experiments_dir()] {
            std::fs::create_dir_all(&dir)
                .with_context(|| format!("Failed to create directory {}", dir.display()))?;
        }
        Ok(())
    }

    pub fn progress_log_path(&self) -> PathBuf {
        self.root.join(&self.paths.progress_log)
    }

    pub fn readme_path(&self) -> PathBuf {
        self.root.join(&self.paths.readme)
    }

    pub fn streak_path(&self) -> PathBuf {
        self.root.join(&self.paths.streak_file)
    }

    pub fn data_dir(&self) -> PathBuf {
        self.root.join(&self.paths.data_dir)
    }

    pub fn daily_data_path(&self) -> PathBuf {
        self.data_dir().join(&self.paths.daily_data_file)
    }

    pub fn experiments_dir(&self) -> PathBuf {
        self.root.join(&self.paths.experiments_dir)
    }

    pub fn metrics_path(&self) -> PathBuf {
        self.experiments_dir().join(&self.paths.metrics_file)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_paths_resolve_against_root() {
        let config = EngineConfig::with_root("/srv/engine");
        assert_eq!(config.progress_log_path(), PathBuf::from("/srv/engine/progress-log.md"));
        assert_eq!(config.readme_path(), PathBuf::from("/srv/engine/README.md"));
        assert_eq!(config.streak_path(), PathBuf::from("/srv/engine/streak.json"));
        assert_eq!(config.daily_data_path(), PathBuf::from("/srv/engine/data/daily-data.json"));
        assert_eq!(config.metrics_path(), PathBuf::from("/srv/engine/experiments/metrics.json"));
    }

    #[test]
    fn test_load_without_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = EngineConfig::load(dir.path(), None).unwrap();
        assert_eq!(config.root, dir.path());
        assert!(config.sources.weather_url.contains("current_weather=true"));
        assert!(config.sources.crypto_url.contains("ids=bitcoin,ethereum"));
    }

    #[test]
    fn test_load_partial_override() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(CONFIG_FILE_NAME),
            "[sources]\ncrypto_url = \"http://127.0.0.1:9/prices\"\n\n[paths]\nreadme = \"docs/README.md\"\n",
        )
        .unwrap();

        let config = EngineConfig::load(dir.path(), None).unwrap();
        assert_eq!(config.sources.crypto_url, "http://127.0.0.1:9/prices");
        assert_eq!(config.sources.weather_url, default_weather_url());
        assert_eq!(config.readme_path(), dir.path().join("docs/README.md"));
        assert_eq!(config.paths.streak_file, PathBuf::from("streak.json"));
    }

    #[test]
    fn test_load_rejects_malformed_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE_NAME), "[sources\nbroken").unwrap();
        assert!(EngineConfig::load(dir.path(), None).is_err());
    }

    #[test]
    fn test_load_missing_explicit_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.toml");
        assert!(EngineConfig::load(dir.path(), Some(&missing)).is_err());
    }

    #[test]
    fn test_ensure_dirs_creates_both_directories() {
        let dir = tempfile::tempdir().unwrap();
        let config = EngineConfig::with_root(dir.path());
        config.ensure_dirs().unwrap();
        assert!(dir.path().join("data").is_dir());
        assert!(dir.path().join("experiments").is_dir());

        // Idempotent
        config.ensure_dirs().unwrap();
    }
}
