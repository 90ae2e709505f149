//! Configuration loader with tier-based merging.
//!
//! Tiers, lowest to highest priority:
//! 1. Built-in defaults
//! 2. Project `kanban/config.yaml`
//! 3. User `~/.kanban/config.yaml`
//! 4. Environment variables
//!
//! YAML tiers are merged field by field, so a tier only needs to name the
//! settings it changes. An explicit config file replaces tiers 2 and 3.

use super::types::BoardConfig;
use crate::types::InsertEdge;
use anyhow::{Context, Result};
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::{debug, warn};

/// Environment variable naming an explicit config file.
pub const ENV_CONFIG_PATH: &str = "KANBAN_CONFIG_PATH";

const CONFIG_FILE: &str = "config.yaml";

/// Configuration tier priority (lowest to highest).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ConfigTier {
    Defaults = 0,
    Project = 1,
    User = 2,
    /// A file named with `--config` or `KANBAN_CONFIG_PATH`; replaces the
    /// project and user tiers.
    Explicit = 3,
    Environment = 4,
}

impl std::fmt::Display for ConfigTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigTier::Defaults => write!(f, "defaults"),
            ConfigTier::Project => write!(f, "project"),
            ConfigTier::User => write!(f, "user"),
            ConfigTier::Explicit => write!(f, "explicit"),
            ConfigTier::Environment => write!(f, "environment"),
        }
    }
}

/// Where each tier is read from.
#[derive(Debug, Clone, Default)]
pub struct ConfigPaths {
    /// Explicit config file; when set, project and user tiers are skipped.
    pub explicit_file: Option<PathBuf>,
    pub project_dir: Option<PathBuf>,
    pub user_dir: Option<PathBuf>,
}

impl ConfigPaths {
    /// Discover paths from the environment: `KANBAN_CONFIG_PATH`,
    /// `KANBAN_PROJECT_DIR` (default `./kanban`) and `KANBAN_USER_DIR`
    /// (default `~/.kanban`).
    pub fn discover() -> Self {
        let explicit_file = std::env::var(ENV_CONFIG_PATH).ok().map(PathBuf::from);

        let project_dir = std::env::var("KANBAN_PROJECT_DIR")
            .ok()
            .map(PathBuf::from)
            .or_else(|| Some(PathBuf::from("kanban")));

        let user_dir = std::env::var("KANBAN_USER_DIR")
            .ok()
            .map(PathBuf::from)
            .or_else(|| dirs::home_dir().map(|h| h.join(".kanban")));

        Self {
            explicit_file,
            project_dir,
            user_dir,
        }
    }

    pub fn with_dirs(project_dir: Option<PathBuf>, user_dir: Option<PathBuf>) -> Self {
        Self {
            explicit_file: None,
            project_dir,
            user_dir,
        }
    }

    pub fn with_explicit_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.explicit_file = Some(path.into());
        self
    }
}

/// Deep merge `overlay` onto `base`.
///
/// Objects merge key by key; any other value in the overlay replaces the base
/// value, except `null`, which leaves the base untouched.
pub fn deep_merge(base: Value, overlay: Value) -> Value {
    match (base, overlay) {
        (Value::Object(mut base_map), Value::Object(overlay_map)) => {
            for (key, value) in overlay_map {
                let merged = match base_map.remove(&key) {
                    Some(existing) => deep_merge(existing, value),
                    None => value,
                };
                base_map.insert(key, merged);
            }
            Value::Object(base_map)
        }
        (base, Value::Null) => base,
        (_, overlay) => overlay,
    }
}

fn read_yaml(path: &Path) -> Result<Value> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file {}", path.display()))?;
    serde_yaml::from_str::<Value>(&content)
        .with_context(|| format!("Failed to parse config file {}", path.display()))
}

/// Parse the `key` variable into `target`, recording it in `applied`.
/// Unparseable values leave `target` untouched.
fn number_override<T, F>(env: &F, key: &'static str, target: &mut T, applied: &mut Vec<&'static str>)
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    let Some(raw) = env(key) else { return };
    match raw.trim().parse() {
        Ok(value) => {
            *target = value;
            applied.push(key);
        }
        Err(_) => warn!(key, value = %raw, "Ignoring non-numeric override"),
    }
}

/// Loaded configuration plus where it came from.
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    pub paths: ConfigPaths,
    config: BoardConfig,
    /// Files that contributed, with their tier.
    sources: Vec<(ConfigTier, PathBuf)>,
    /// Environment variables that were applied.
    env_overrides: Vec<&'static str>,
}

impl ConfigLoader {
    /// Load using discovered paths and the process environment.
    pub fn load() -> Result<Self> {
        Self::load_with_paths(ConfigPaths::discover())
    }

    pub fn load_with_paths(paths: ConfigPaths) -> Result<Self> {
        Self::load_with_env(paths, |key| std::env::var(key).ok())
    }

    /// Load with an explicit environment lookup.
    pub fn load_with_env<F>(paths: ConfigPaths, env: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut merged = serde_json::to_value(BoardConfig::default())?;
        let mut sources = Vec::new();

        if let Some(ref explicit) = paths.explicit_file {
            // A named file must exist and parse.
            merged = deep_merge(merged, read_yaml(explicit)?);
            sources.push((ConfigTier::Explicit, explicit.clone()));
        } else {
            let tiers = [
                (ConfigTier::Project, paths.project_dir.as_ref()),
                (ConfigTier::User, paths.user_dir.as_ref()),
            ];
            for (tier, dir) in tiers {
                let Some(file) = dir.map(|d| d.join(CONFIG_FILE)) else {
                    continue;
                };
                if !file.exists() {
                    continue;
                }
                match read_yaml(&file) {
                    Ok(value) => {
                        debug!(tier = %tier, path = %file.display(), "Loaded config tier");
                        merged = deep_merge(merged, value);
                        sources.push((tier, file));
                    }
                    Err(e) => warn!(tier = %tier, "Skipping config: {:#}", e),
                }
            }
        }

        let mut config: BoardConfig =
            serde_json::from_value(merged).context("Invalid board configuration")?;
        let env_overrides = Self::apply_env_overrides(&mut config, env);
        config.validate()?;

        Ok(Self {
            paths,
            config,
            sources,
            env_overrides,
        })
    }

    /// Apply `KANBAN_*` overrides. Unparseable values are ignored with a
    /// warning. Returns the names of the variables applied.
    fn apply_env_overrides<F>(config: &mut BoardConfig, env: F) -> Vec<&'static str>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut applied = Vec::new();

        number_override(&env, "KANBAN_TASK_BATCH_SIZE", &mut config.tasks.batch_size, &mut applied);
        number_override(&env, "KANBAN_COLUMN_BATCH_SIZE", &mut config.columns.batch_size, &mut applied);
        number_override(&env, "KANBAN_TASK_DELAY_MS", &mut config.tasks.delay_ms, &mut applied);
        number_override(&env, "KANBAN_COLUMN_DELAY_MS", &mut config.columns.delay_ms, &mut applied);

        let mut edge = |key: &'static str, target: &mut InsertEdge| {
            if let Some(raw) = env(key) {
                match InsertEdge::from_str(raw.trim()) {
                    Some(value) => {
                        *target = value;
                        applied.push(key);
                    }
                    None => warn!(key, value = %raw, "Ignoring unknown insert edge"),
                }
            }
        };
        edge("KANBAN_COLUMN_EDGE", &mut config.insertion.column_edge);
        edge("KANBAN_TASK_EDGE", &mut config.insertion.task_edge);

        applied
    }

    pub fn config(&self) -> &BoardConfig {
        &self.config
    }

    pub fn into_config(self) -> BoardConfig {
        self.config
    }

    pub fn sources(&self) -> &[(ConfigTier, PathBuf)] {
        &self.sources
    }

    pub fn env_overrides(&self) -> &[&'static str] {
        &self.env_overrides
    }
}
