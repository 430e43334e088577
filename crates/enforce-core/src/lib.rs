//! Enforce Core Library
//!
//! Configuration engine for runtime type enforcement: a global kill-switch,
//! per-group overrides with a fixed precedence, and the variance mode used
//! by type checks.

pub mod error;
pub mod settings;

// Re-export commonly used types
pub use error::{ConfigError, ConfigResult};
pub use settings::{
    ConfigUpdate, GlobalState, GroupsUpdate, Settings, SettingsHandle, VarianceMode,
    config, config_update, global, reset_config,
};
