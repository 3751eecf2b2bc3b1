//! Configuration loading and store factory.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use wordloop_core::builder::{BuilderConfig, MAX_CHOICE_OPTIONS};
use wordloop_core::model::{DEFAULT_QUIZ_SIZE, MAX_QUIZ_SIZE};
use wordloop_core::traits::Store;
use wordloop_core::ServiceConfig;

use crate::memory::MemoryStore;
use crate::sqlite::SqliteStore;

/// Environment variable that overrides the SQLite database path.
pub const DB_ENV_VAR: &str = "WORDLOOP_DB";

/// Which backend to persist to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum StoreConfig {
    Sqlite {
        #[serde(default = "default_db_path")]
        path: PathBuf,
    },
    /// Nothing survives the process.
    Memory,
}

impl Default for StoreConfig {
    fn default() -> Self {
        StoreConfig::Sqlite {
            path: default_db_path(),
        }
    }
}

fn default_db_path() -> PathBuf {
    PathBuf::from("./wordloop.db")
}

/// Top-level wordloop configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WordloopConfig {
    #[serde(default)]
    pub store: StoreConfig,
    /// Items per quiz when no count is given.
    #[serde(default = "default_count")]
    pub default_count: usize,
    /// Options per choice item, correct answer included.
    #[serde(default = "default_choice_options")]
    pub choice_options: usize,
    #[serde(default = "default_max_choice_attempts")]
    pub max_choice_attempts: usize,
    /// Fixed seed for option sampling. Unset means OS entropy.
    #[serde(default)]
    pub seed: Option<u64>,
}

fn default_count() -> usize {
    DEFAULT_QUIZ_SIZE
}
fn default_choice_options() -> usize {
    BuilderConfig::default().choice_options
}
fn default_max_choice_attempts() -> usize {
    BuilderConfig::default().max_choice_attempts
}

impl Default for WordloopConfig {
    fn default() -> Self {
        Self {
            store: StoreConfig::default(),
            default_count: default_count(),
            choice_options: default_choice_options(),
            max_choice_attempts: default_max_choice_attempts(),
            seed: None,
        }
    }
}

impl WordloopConfig {
    /// Settings for [`QuizService`](wordloop_core::QuizService).
    pub fn service_config(&self) -> ServiceConfig {
        ServiceConfig {
            default_count: self.default_count,
            builder: BuilderConfig {
                choice_options: self.choice_options,
                max_choice_attempts: self.max_choice_attempts,
            },
            seed: self.seed,
        }
    }

    fn validate(&self) -> Result<()> {
        anyhow::ensure!(
            (1..=MAX_QUIZ_SIZE).contains(&self.default_count),
            "default_count must be between 1 and {MAX_QUIZ_SIZE}"
        );
        anyhow::ensure!(
            (2..=MAX_CHOICE_OPTIONS).contains(&self.choice_options),
            "choice_options must be between 2 and {MAX_CHOICE_OPTIONS}"
        );
        anyhow::ensure!(
            self.max_choice_attempts >= 1,
            "max_choice_attempts must be at least 1"
        );
        Ok(())
    }
}

/// Resolve environment variable references like `${VAR_NAME}` in a string.
fn resolve_env_vars(s: &str) -> String {
    let mut result = s.to_string();
    while let Some(start) = result.find("${") {
        let Some(end) = result[start..].find('}') else {
            break;
        };
        let value = std::env::var(&result[start + 2..start + end]).unwrap_or_default();
        result.replace_range(start..start + end + 1, &value);
    }
    result
}

fn resolve_store_config(config: &StoreConfig) -> StoreConfig {
    match config {
        StoreConfig::Sqlite { path } => StoreConfig::Sqlite {
            path: PathBuf::from(resolve_env_vars(&path.to_string_lossy())),
        },
        StoreConfig::Memory => StoreConfig::Memory,
    }
}

/// Load configuration from well-known paths.
///
/// Search order:
/// 1. `wordloop.toml` in the current directory
/// 2. `~/.config/wordloop/config.toml`
///
/// `WORDLOOP_DB` switches the store to SQLite at that path.
pub fn load_config() -> Result<WordloopConfig> {
    load_config_from(None)
}

/// Load config from an explicit path, or search the default locations.
pub fn load_config_from(path: Option<&Path>) -> Result<WordloopConfig> {
    let config_path = match path {
        Some(p) if p.exists() => Some(p.to_path_buf()),
        Some(p) => anyhow::bail!("config file not found: {}", p.display()),
        None => {
            let local = PathBuf::from("wordloop.toml");
            if local.exists() {
                Some(local)
            } else {
                dirs_path()
                    .map(|home| home.join("config.toml"))
                    .filter(|global| global.exists())
            }
        }
    };

    let mut config = match config_path {
        Some(path) => {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            parse_config(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?
        }
        None => WordloopConfig::default(),
    };

    if let Ok(db) = std::env::var(DB_ENV_VAR) {
        if !db.is_empty() {
            config.store = StoreConfig::Sqlite {
                path: PathBuf::from(db),
            };
        }
    }

    config.store = resolve_store_config(&config.store);
    config.validate()?;
    Ok(config)
}

/// Parse a config document without touching the environment.
pub fn parse_config(content: &str) -> Result<WordloopConfig> {
    Ok(toml::from_str::<WordloopConfig>(content)?)
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("wordloop"))
}

/// Open the configured store.
pub fn create_store(config: &StoreConfig) -> Result<Arc<dyn Store>> {
    match config {
        StoreConfig::Sqlite { path } => {
            tracing::debug!(path = %path.display(), "opening sqlite store");
            Ok(Arc::new(SqliteStore::open(path)?))
        }
        StoreConfig::Memory => Ok(Arc::new(MemoryStore::new())),
    }
}
