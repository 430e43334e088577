//! Global settings state
//!
//! The state behaves like an ordered mapping from string keys to tagged
//! values. Four keys always exist (`enabled`, `default`, `mode`, `groups`)
//! and are stored as typed fields; any other key is an extra entry that
//! external code may stash and that a reset removes again.

use serde_json::{Map, Value};
use std::collections::BTreeMap;
use tracing::debug;

use super::mode::VarianceMode;
use crate::error::{ConfigError, ConfigResult};

/// Key of the global kill-switch
pub const ENABLED_KEY: &str = "enabled";
/// Key of the default group status
pub const DEFAULT_KEY: &str = "default";
/// Key of the variance mode
pub const MODE_KEY: &str = "mode";
/// Key of the per-group overrides
pub const GROUPS_KEY: &str = "groups";

/// Keys that are always present in the state
pub const CORE_KEYS: [&str; 4] = [ENABLED_KEY, DEFAULT_KEY, MODE_KEY, GROUPS_KEY];

/// Per-group overrides, keyed by group name
pub type GroupMap = BTreeMap<String, bool>;

/// A value held by the global state
#[derive(Debug, Clone, PartialEq)]
pub enum StateValue {
    Bool(bool),
    Mode(VarianceMode),
    Groups(GroupMap),
    /// Arbitrary data stashed by external code
    Other(Value),
}

impl StateValue {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_mode(&self) -> Option<VarianceMode> {
        match self {
            Self::Mode(mode) => Some(*mode),
            _ => None,
        }
    }

    pub fn as_groups(&self) -> Option<&GroupMap> {
        match self {
            Self::Groups(groups) => Some(groups),
            _ => None,
        }
    }

    /// Convert to a JSON value
    pub fn to_json(&self) -> Value {
        match self {
            Self::Bool(b) => Value::Bool(*b),
            Self::Mode(mode) => Value::String(mode.name().to_string()),
            Self::Groups(groups) => Value::Object(
                groups
                    .iter()
                    .map(|(name, status)| (name.clone(), Value::Bool(*status)))
                    .collect(),
            ),
            Self::Other(value) => value.clone(),
        }
    }
}

impl From<bool> for StateValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<VarianceMode> for StateValue {
    fn from(value: VarianceMode) -> Self {
        Self::Mode(value)
    }
}

impl From<GroupMap> for StateValue {
    fn from(value: GroupMap) -> Self {
        Self::Groups(value)
    }
}

impl From<Value> for StateValue {
    fn from(value: Value) -> Self {
        Self::Other(value)
    }
}

/// Process-wide settings consulted by every [`Settings`](super::Settings) view
///
/// Only the applier mutates the core keys during normal operation. The
/// state is updated in place and never replaced, so holders of a handle
/// see each update on their next read.
#[derive(Debug, Clone, PartialEq)]
pub struct GlobalState {
    enabled: bool,
    default_status: bool,
    mode: VarianceMode,
    groups: GroupMap,
    extra: Vec<(String, StateValue)>,
}

impl Default for GlobalState {
    fn default() -> Self {
        Self {
            enabled: true,
            default_status: true,
            mode: VarianceMode::Invariant,
            groups: GroupMap::new(),
            extra: Vec::new(),
        }
    }
}

impl GlobalState {
    /// Create a state holding the defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Global kill-switch
    pub fn enabled(&self) -> bool {
        self.enabled
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// Status of any group without an explicit override
    pub fn default_status(&self) -> bool {
        self.default_status
    }

    pub fn set_default_status(&mut self, status: bool) {
        self.default_status = status;
    }

    pub fn mode(&self) -> VarianceMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: VarianceMode) {
        self.mode = mode;
    }

    pub fn groups(&self) -> &GroupMap {
        &self.groups
    }

    pub fn groups_mut(&mut self) -> &mut GroupMap {
        &mut self.groups
    }

    /// Effective status of a group: its override, else the default status
    pub fn group_status(&self, group: &str) -> bool {
        self.groups
            .get(group)
            .copied()
            .unwrap_or(self.default_status)
    }

    /// Restore the defaults in place, dropping any extra keys
    pub fn reset(&mut self) {
        if !self.extra.is_empty() {
            let removed: Vec<&str> = self.extra.iter().map(|(key, _)| key.as_str()).collect();
            debug!("Removing extra state keys on reset: {:?}", removed);
        }
        self.extra.clear();
        self.enabled = true;
        self.default_status = true;
        self.mode = VarianceMode::Invariant;
        self.groups.clear();
    }

    /// Look up a key
    pub fn get(&self, key: &str) -> Option<StateValue> {
        match key {
            ENABLED_KEY => Some(StateValue::Bool(self.enabled)),
            DEFAULT_KEY => Some(StateValue::Bool(self.default_status)),
            MODE_KEY => Some(StateValue::Mode(self.mode)),
            GROUPS_KEY => Some(StateValue::Groups(self.groups.clone())),
            _ => self
                .extra
                .iter()
                .find(|(k, _)| k == key)
                .map(|(_, value)| value.clone()),
        }
    }

    /// Store a value, returning the previous one
    ///
    /// Core keys only accept a value of their own kind. Extra keys keep
    /// any tagged value as given and keep their insertion position when
    /// replaced.
    pub fn insert(
        &mut self,
        key: impl Into<String>,
        value: impl Into<StateValue>,
    ) -> ConfigResult<Option<StateValue>> {
        let key = key.into();
        let value = value.into();
        let previous = self.get(&key);

        if CORE_KEYS.contains(&key.as_str()) {
            match (key.as_str(), value) {
                (ENABLED_KEY, StateValue::Bool(b)) => self.enabled = b,
                (DEFAULT_KEY, StateValue::Bool(b)) => self.default_status = b,
                (MODE_KEY, StateValue::Mode(mode)) => self.mode = mode,
                (GROUPS_KEY, StateValue::Groups(groups)) => self.groups = groups,
                (core, _) => return Err(ConfigError::protected_key(core)),
            }
            return Ok(previous);
        }

        match self.extra.iter_mut().find(|(k, _)| *k == key) {
            Some((_, slot)) => *slot = value,
            None => self.extra.push((key, value)),
        }

        Ok(previous)
    }

    /// Remove an extra key; core keys cannot be removed
    pub fn remove(&mut self, key: &str) -> ConfigResult<Option<StateValue>> {
        if CORE_KEYS.contains(&key) {
            return Err(ConfigError::protected_key(key));
        }
        let position = self.extra.iter().position(|(k, _)| k == key);
        Ok(position.map(|index| self.extra.remove(index).1))
    }

    pub fn contains_key(&self, key: &str) -> bool {
        CORE_KEYS.contains(&key) || self.extra.iter().any(|(k, _)| k == key)
    }

    /// Keys in order: the core keys first, then extras by insertion
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        CORE_KEYS
            .into_iter()
            .chain(self.extra.iter().map(|(key, _)| key.as_str()))
    }

    /// Entries in key order
    pub fn iter(&self) -> impl Iterator<Item = (&str, StateValue)> + '_ {
        self.keys()
            .filter_map(move |key| self.get(key).map(|value| (key, value)))
    }

    pub fn len(&self) -> usize {
        CORE_KEYS.len() + self.extra.len()
    }

    /// Never true, the core keys are always present
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Snapshot of the whole state as a JSON object
    pub fn to_json(&self) -> Value {
        let map: Map<String, Value> = self
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_json()))
            .collect();
        Value::Object(map)
    }
}
