//! Board configuration.
//!
//! Configuration is assembled from four tiers with field-by-field YAML
//! merging (see [`loader`]):
//! 1. **Defaults** - built in
//! 2. **Project** - `$CWD/kanban/config.yaml`
//! 3. **User** - `~/.kanban/config.yaml`
//! 4. **Environment** - `KANBAN_*` variables
//!
//! ## Environment Variables
//! - `KANBAN_CONFIG_PATH` - Explicit config file (replaces project and user tiers)
//! - `KANBAN_PROJECT_DIR` - Project config dir (default: `./kanban`)
//! - `KANBAN_USER_DIR` - User config dir (default: `~/.kanban`)
//! - `KANBAN_TASK_BATCH_SIZE`, `KANBAN_TASK_DELAY_MS`
//! - `KANBAN_COLUMN_BATCH_SIZE`, `KANBAN_COLUMN_DELAY_MS`
//! - `KANBAN_COLUMN_EDGE`, `KANBAN_TASK_EDGE` - `start` or `end`

mod loader;
mod types;

pub use loader::{ConfigLoader, ConfigPaths, ConfigTier, ENV_CONFIG_PATH, deep_merge};
pub use types::*;
