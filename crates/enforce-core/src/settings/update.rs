//! Typed config updates
//!
//! [`ConfigUpdate`] is the strongly typed way to build the option tree that
//! [`config`](super::config) consumes. Every field is optional and `None`
//! means "leave unchanged", so an absent option and an explicit one stay
//! distinguishable.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

use super::mode::VarianceMode;

/// A partial update of the global settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigUpdate {
    /// Global kill-switch
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,

    /// Variance mode
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<VarianceMode>,

    /// Group overrides
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub groups: Option<GroupsUpdate>,
}

/// A partial update of the group overrides
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GroupsUpdate {
    /// Explicit per-group overrides; a `None` status is skipped
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub set: BTreeMap<String, Option<bool>>,

    /// Force every existing override to `false`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disable_previous: Option<bool>,

    /// Force every existing override to `true`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enable_previous: Option<bool>,

    /// Remove every existing override
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clear_previous: Option<bool>,

    /// Status of groups without an override
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<bool>,
}

impl ConfigUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = Some(enabled);
        self
    }

    pub fn mode(mut self, mode: VarianceMode) -> Self {
        self.mode = Some(mode);
        self
    }

    /// Override the status of a single group
    pub fn set_group(mut self, group: impl Into<String>, status: bool) -> Self {
        self.groups_mut().set.insert(group.into(), Some(status));
        self
    }

    pub fn disable_previous(mut self) -> Self {
        self.groups_mut().disable_previous = Some(true);
        self
    }

    pub fn enable_previous(mut self) -> Self {
        self.groups_mut().enable_previous = Some(true);
        self
    }

    pub fn clear_previous(mut self) -> Self {
        self.groups_mut().clear_previous = Some(true);
        self
    }

    /// Status of groups that have no override
    pub fn default_status(mut self, status: bool) -> Self {
        self.groups_mut().default = Some(status);
        self
    }

    fn groups_mut(&mut self) -> &mut GroupsUpdate {
        self.groups.get_or_insert_with(GroupsUpdate::default)
    }

    /// Whether applying this update would change nothing
    pub fn is_empty(&self) -> bool {
        self.enabled.is_none()
            && self.mode.is_none()
            && self.groups.as_ref().is_none_or(GroupsUpdate::is_empty)
    }

    /// Convert into the raw option tree
    pub fn to_options(&self) -> Value {
        let mut options = Map::new();
        if let Some(enabled) = self.enabled {
            options.insert("enabled".to_string(), Value::Bool(enabled));
        }
        if let Some(mode) = self.mode {
            options.insert("mode".to_string(), Value::String(mode.name().to_string()));
        }
        if let Some(groups) = &self.groups {
            options.insert("groups".to_string(), groups.to_options());
        }
        Value::Object(options)
    }
}

impl GroupsUpdate {
    pub fn is_empty(&self) -> bool {
        self.set.values().all(Option::is_none)
            && self.disable_previous.is_none()
            && self.enable_previous.is_none()
            && self.clear_previous.is_none()
            && self.default.is_none()
    }

    /// Convert into the raw `groups` option tree
    pub fn to_options(&self) -> Value {
        let mut options = Map::new();
        if !self.set.is_empty() {
            let set: Map<String, Value> = self
                .set
                .iter()
                .map(|(name, status)| (name.clone(), status.map_or(Value::Null, Value::Bool)))
                .collect();
            options.insert("set".to_string(), Value::Object(set));
        }
        let flags = [
            ("disable_previous", self.disable_previous),
            ("enable_previous", self.enable_previous),
            ("clear_previous", self.clear_previous),
            ("default", self.default),
        ];
        for (key, value) in flags {
            if let Some(value) = value {
                options.insert(key.to_string(), Value::Bool(value));
            }
        }
        Value::Object(options)
    }
}

impl From<ConfigUpdate> for Value {
    fn from(update: ConfigUpdate) -> Self {
        update.to_options()
    }
}
