//! Type-enforcement settings
//!
//! This module holds the process-wide settings that decide, per call site
//! or per group, whether type checking is active and under which variance
//! mode.
//!
//! # Flow
//!
//! 1. A caller passes a partial option tree to [`config`] (or builds a
//!    [`ConfigUpdate`])
//! 2. The parser fills in every unset option ([`parse_config`])
//! 3. The applier folds the update into the [`GlobalState`] ([`apply_config`])
//! 4. [`Settings`] views read the new state on their next access
//!
//! # Options
//!
//! ```json,ignore
//! {
//!   "enabled": true,
//!   "mode": "covariant",
//!   "groups": {
//!     "set": {"io": false},
//!     "disable_previous": false,
//!     "enable_previous": false,
//!     "clear_previous": false,
//!     "default": true
//!   }
//! }
//! ```
//!
//! `null` anywhere means "leave unchanged".
//!
//! # Example Usage
//!
//! ```rust,ignore
//! use enforce_core::settings::{Settings, config};
//! use serde_json::json;
//!
//! config(&json!({"mode": "bivariant", "groups": {"set": {"io": false}}}), false)?;
//!
//! let io = Settings::for_group("io");
//! assert!(!io.enabled());
//! assert!(io.covariant() && io.contravariant());
//! ```
//!
//! # Threading
//!
//! The state is not synchronized. Each thread sees its own global state
//! through [`global`]; hosts that share settings across threads must
//! serialize updates themselves.

pub mod applier;
pub mod handle;
pub mod merge;
pub mod mode;
pub mod parser;
pub mod state;
pub mod update;
pub mod view;

pub use applier::apply_config;
pub use handle::{SettingsHandle, config, config_update, global, reset_config};
pub use merge::merge;
pub use mode::VarianceMode;
pub use parser::{default_options, parse_config};
pub use state::{GlobalState, GroupMap, StateValue};
pub use update::{ConfigUpdate, GroupsUpdate};
pub use view::Settings;
