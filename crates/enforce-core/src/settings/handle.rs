//! Shared handle to the global settings state
//!
//! The state is single threaded. A [`SettingsHandle`] is neither `Send` nor
//! `Sync`, so a host that wants to share settings across threads has to
//! serialize access itself; no lock is taken here.
//!
//! Each thread has its own default state reached through [`global`], which
//! is what [`Settings::new`](super::Settings::new) and the free [`config`]
//! function use. Tests and embedders can create independent handles and
//! inject them instead.
//!
//! A mutable borrow of the state is never held while caller code runs.
//! Updates attempted while [`SettingsHandle::with_state`] is running, or
//! racing a [`SettingsHandle::with_state_mut`] draft, fail with
//! [`ConfigError::StateBusy`].

use serde_json::Value;
use std::cell::{Cell, RefCell};
use std::rc::Rc;

use super::applier::apply_config;
use super::parser::parse_config;
use super::state::GlobalState;
use super::update::ConfigUpdate;
use crate::error::{ConfigError, ConfigResult};

/// Cloneable handle to one global state
///
/// Clones share the same state; every update is made in place and is
/// visible through all of them.
#[derive(Debug, Clone, Default)]
pub struct SettingsHandle {
    state: Rc<RefCell<GlobalState>>,
    /// Bumped on every committed update
    generation: Rc<Cell<u64>>,
}

impl SettingsHandle {
    /// Create a handle to a fresh state holding the defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a handle around an existing state
    pub fn from_state(state: GlobalState) -> Self {
        Self {
            state: Rc::new(RefCell::new(state)),
            generation: Rc::default(),
        }
    }

    /// Update the settings from a partial option tree
    ///
    /// With `reset` set the options are ignored and the defaults restored.
    pub fn config(&self, options: &Value, reset: bool) -> ConfigResult<()> {
        if reset {
            return self.mutate("config", |state| apply_config(state, None, true));
        }
        let parsed = parse_config(options)?;
        self.mutate("config", |state| apply_config(state, Some(&parsed), false))
    }

    /// Update the settings from a typed update
    pub fn config_update(&self, update: &ConfigUpdate) -> ConfigResult<()> {
        self.config(&update.to_options(), false)
    }

    /// Restore the defaults
    pub fn reset(&self) -> ConfigResult<()> {
        self.mutate("reset", |state| {
            state.reset();
            Ok(())
        })
    }

    /// Run `f` with shared access to the current state
    ///
    /// Views may be read inside `f`; updates through any clone of this
    /// handle fail with [`ConfigError::StateBusy`] until `f` returns.
    pub fn with_state<R>(&self, f: impl FnOnce(&GlobalState) -> R) -> ConfigResult<R> {
        let state = self
            .state
            .try_borrow()
            .map_err(|_| ConfigError::state_busy("with_state"))?;
        Ok(f(&state))
    }

    /// Edit a draft of the state and commit it when `f` returns
    ///
    /// Views read inside `f` still see the committed state. If the state
    /// is updated through another path while `f` runs, the draft is
    /// discarded and [`ConfigError::StateBusy`] is returned.
    pub fn with_state_mut<R>(&self, f: impl FnOnce(&mut GlobalState) -> R) -> ConfigResult<R> {
        let mut draft = self.with_state(GlobalState::clone)?;
        let generation = self.generation.get();
        let result = f(&mut draft);
        if self.generation.get() != generation {
            return Err(ConfigError::state_busy("with_state_mut"));
        }
        self.mutate("with_state_mut", |state| {
            *state = draft;
            Ok(())
        })?;
        Ok(result)
    }

    /// Copy of the current state
    pub fn snapshot(&self) -> GlobalState {
        self.read(GlobalState::clone)
    }

    /// Whether both handles point at the same state
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.state, &other.state)
    }

    /// Read the state for a settings view
    pub(super) fn read<R>(&self, f: impl FnOnce(&GlobalState) -> R) -> R {
        // Mutable borrows only live inside `mutate`, which runs no caller code.
        f(&self.state.borrow())
    }

    fn mutate(
        &self,
        operation: &'static str,
        f: impl FnOnce(&mut GlobalState) -> ConfigResult<()>,
    ) -> ConfigResult<()> {
        let mut state = self
            .state
            .try_borrow_mut()
            .map_err(|_| ConfigError::state_busy(operation))?;
        let result = f(&mut state);
        self.generation.set(self.generation.get().wrapping_add(1));
        result
    }
}

thread_local! {
    static GLOBAL_SETTINGS: SettingsHandle = SettingsHandle::new();
}

/// Handle to the calling thread's global settings
///
/// Every thread starts from the defaults; updates made on one thread are
/// not seen by another.
pub fn global() -> SettingsHandle {
    GLOBAL_SETTINGS.with(SettingsHandle::clone)
}

/// Update the calling thread's global settings from a partial option tree
///
/// Other threads keep their own settings and do not see this update.
pub fn config(options: &Value, reset: bool) -> ConfigResult<()> {
    global().config(options, reset)
}

/// Update the calling thread's global settings from a typed update
///
/// Other threads keep their own settings and do not see this update.
pub fn config_update(update: &ConfigUpdate) -> ConfigResult<()> {
    global().config_update(update)
}

/// Restore the calling thread's global settings to their defaults
///
/// Settings on other threads are left as they are.
pub fn reset_config() -> ConfigResult<()> {
    global().reset()
}
