//! Applying config updates to the global state
//!
//! # Group precedence
//!
//! A `groups` update is resolved in a fixed order, whatever order its keys
//! arrive in:
//!
//! 1. `default` replaces the default group status
//! 2. `disable_previous` forces every existing group override to `false`
//! 3. `enable_previous` forces every existing group override to `true`
//! 4. `clear_previous` removes every group override
//! 5. `set` writes the explicit overrides on top
//!
//! Steps 2-4 run in that order when several flags are given together, so
//! a clear always leaves the map empty before step 5 runs. Explicit `set`
//! entries therefore win over every bulk flag for the groups they name.
//!
//! # Atomicity
//!
//! A `groups` update is validated completely before any of it is
//! committed. Across top-level keys there is no such guarantee: options
//! earlier in the update stay applied when a later one fails.

use serde_json::{Map, Value};
use tracing::{debug, warn};

use super::mode::VarianceMode;
use super::state::{DEFAULT_KEY, GlobalState, GroupMap};
use crate::error::{ConfigError, ConfigResult};

/// Bulk operations on previously configured groups
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct PreviousFlags {
    disable: bool,
    enable: bool,
    clear: bool,
}

impl PreviousFlags {
    fn any(self) -> bool {
        self.disable || self.enable || self.clear
    }
}

/// A validated `groups` update, ready to commit
#[derive(Debug, Default)]
struct GroupsPlan {
    previous: PreviousFlags,
    default_status: Option<bool>,
    set: GroupMap,
}

/// Apply a shaped update to `state`, or reset it
///
/// `reset` takes precedence: when it is set, `options` are ignored.
pub fn apply_config(
    state: &mut GlobalState,
    options: Option<&Value>,
    reset: bool,
) -> ConfigResult<()> {
    if reset {
        debug!("Resetting global settings");
        state.reset();
        return Ok(());
    }

    let Some(options) = options else {
        return Ok(());
    };
    let options = options
        .as_object()
        .ok_or_else(|| ConfigError::invalid_value("options", "a mapping"))?;

    for (key, value) in options {
        let result = match key.as_str() {
            "enabled" => apply_enabled(state, value),
            "mode" => apply_mode(state, value),
            "groups" => apply_groups(state, value),
            other => Err(ConfigError::unknown_option(other)),
        };
        if let Err(e) = result {
            warn!("Rejected settings update at '{}': {}", key, e);
            return Err(e);
        }
    }

    Ok(())
}

fn apply_enabled(state: &mut GlobalState, value: &Value) -> ConfigResult<()> {
    if let Some(enabled) = optional_bool("enabled", value)? {
        debug!("Setting enabled = {}", enabled);
        state.set_enabled(enabled);
    }
    Ok(())
}

fn apply_mode(state: &mut GlobalState, value: &Value) -> ConfigResult<()> {
    let name = match value {
        Value::Null => return Ok(()),
        Value::String(name) => name,
        _ => return Err(ConfigError::invalid_value("mode", "a mode name")),
    };
    let mode = VarianceMode::from_name(name)?;
    debug!("Setting mode = {}", mode);
    state.set_mode(mode);
    Ok(())
}

fn apply_groups(state: &mut GlobalState, value: &Value) -> ConfigResult<()> {
    let groups = match value {
        Value::Null => return Ok(()),
        Value::Object(groups) => groups,
        _ => return Err(ConfigError::invalid_value("groups", "a mapping")),
    };

    let plan = plan_groups(groups)?;
    commit_groups(state, plan);
    Ok(())
}

fn plan_groups(groups: &Map<String, Value>) -> ConfigResult<GroupsPlan> {
    let mut plan = GroupsPlan::default();

    for (key, value) in groups {
        match key.as_str() {
            "disable_previous" => plan.previous.disable = flag(key, value)?,
            "enable_previous" => plan.previous.enable = flag(key, value)?,
            "clear_previous" => plan.previous.clear = flag(key, value)?,
            "default" => plan.default_status = optional_bool(key, value)?,
            "set" => plan.set = explicit_groups(value)?,
            other => return Err(ConfigError::unknown_group_option(other)),
        }
    }

    Ok(plan)
}

fn explicit_groups(value: &Value) -> ConfigResult<GroupMap> {
    let entries = match value {
        Value::Null => return Ok(GroupMap::new()),
        Value::Object(entries) => entries,
        _ => return Err(ConfigError::invalid_value("groups.set", "a mapping")),
    };

    let mut set = GroupMap::new();
    for (name, status) in entries {
        if name == DEFAULT_KEY {
            return Err(ConfigError::ReservedGroup);
        }
        if let Some(status) = optional_bool(name, status)? {
            set.insert(name.clone(), status);
        }
    }
    Ok(set)
}

fn commit_groups(state: &mut GlobalState, plan: GroupsPlan) {
    if let Some(status) = plan.default_status {
        debug!("Setting default group status = {}", status);
        state.set_default_status(status);
    }

    if plan.previous.any() {
        debug!("Applying bulk group flags: {:?}", plan.previous);
        let groups = state.groups_mut();
        if plan.previous.disable {
            groups.values_mut().for_each(|status| *status = false);
        }
        if plan.previous.enable {
            groups.values_mut().for_each(|status| *status = true);
        }
        if plan.previous.clear {
            groups.clear();
        }
    }

    if !plan.set.is_empty() {
        debug!("Setting group overrides: {:?}", plan.set);
        state.groups_mut().extend(plan.set);
    }
}

fn optional_bool(key: &str, value: &Value) -> ConfigResult<Option<bool>> {
    match value {
        Value::Null => Ok(None),
        Value::Bool(b) => Ok(Some(*b)),
        _ => Err(ConfigError::invalid_value(key, "a boolean")),
    }
}

/// Bulk flags only take effect when true; `null` counts as false
fn flag(key: &str, value: &Value) -> ConfigResult<bool> {
    Ok(optional_bool(key, value)?.unwrap_or(false))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::parser::parse_config;
    use serde_json::json;

    fn apply(state: &mut GlobalState, options: Value) -> ConfigResult<()> {
        let parsed = parse_config(&options)?;
        apply_config(state, Some(&parsed), false)
    }

    fn with_groups(entries: &[(&str, bool)]) -> GlobalState {
        let mut state = GlobalState::new();
        for (name, status) in entries {
            state.groups_mut().insert(name.to_string(), *status);
        }
        state
    }

    #[test]
    fn test_enabled_and_null_means_unchanged() {
        let mut state = GlobalState::new();
        apply(&mut state, json!({"enabled": false})).unwrap();
        assert!(!state.enabled());

        apply(&mut state, json!({"enabled": null})).unwrap();
        assert!(!state.enabled());
    }

    #[test]
    fn test_mode_by_name() {
        let mut state = GlobalState::new();
        apply(&mut state, json!({"mode": "contravariant"})).unwrap();
        assert_eq!(state.mode(), VarianceMode::Contravariant);
    }

    #[test]
    fn test_invalid_mode_leaves_mode_unchanged() {
        let mut state = GlobalState::new();
        apply(&mut state, json!({"mode": "covariant"})).unwrap();

        let err = apply(&mut state, json!({"mode": "sideways"})).unwrap_err();
        assert_eq!(err, ConfigError::invalid_mode("sideways"));
        assert_eq!(state.mode(), VarianceMode::Covariant);
    }

    #[test]
    fn test_default_group_status() {
        let mut state = GlobalState::new();
        apply(&mut state, json!({"groups": {"default": false}})).unwrap();
        assert!(!state.default_status());
        assert!(!state.group_status("anything"));
    }

    #[test]
    fn test_explicit_set_wins_over_disable() {
        let mut state = with_groups(&[("old", true)]);
        apply(
            &mut state,
            json!({"groups": {"set": {"g": true}, "disable_previous": true}}),
        )
        .unwrap();
        assert_eq!(state.groups().get("g"), Some(&true));
        assert_eq!(state.groups().get("old"), Some(&false));
    }

    #[test]
    fn test_enable_previous() {
        let mut state = with_groups(&[("a", false), ("b", false)]);
        apply(&mut state, json!({"groups": {"enable_previous": true}})).unwrap();
        assert!(state.groups().values().all(|status| *status));
    }

    #[test]
    fn test_enable_runs_after_disable() {
        let mut state = with_groups(&[("a", true), ("b", false)]);
        apply(
            &mut state,
            json!({"groups": {"enable_previous": true, "disable_previous": true}}),
        )
        .unwrap();
        assert_eq!(state.groups().get("a"), Some(&true));
        assert_eq!(state.groups().get("b"), Some(&true));
    }

    // Clear is evaluated after disable and enable, so it always empties the map.
    #[test]
    fn test_clear_runs_last_among_flags() {
        let mut state = with_groups(&[("a", true), ("b", false)]);
        apply(
            &mut state,
            json!({"groups": {"clear_previous": true, "enable_previous": true, "disable_previous": true}}),
        )
        .unwrap();
        assert!(state.groups().is_empty());
    }

    #[test]
    fn test_set_applies_after_clear() {
        let mut state = with_groups(&[("a", true)]);
        apply(
            &mut state,
            json!({"groups": {"clear_previous": true, "set": {"b": false}}}),
        )
        .unwrap();
        assert_eq!(state.groups().len(), 1);
        assert_eq!(state.groups().get("b"), Some(&false));
    }

    #[test]
    fn test_null_set_entries_are_skipped() {
        let mut state = with_groups(&[("a", true)]);
        apply(&mut state, json!({"groups": {"set": {"a": null, "b": true}}})).unwrap();
        assert_eq!(state.groups().get("a"), Some(&true));
        assert_eq!(state.groups().get("b"), Some(&true));
    }

    #[test]
    fn test_reserved_group_commits_nothing() {
        let mut state = with_groups(&[("a", true)]);
        let err = apply(
            &mut state,
            json!({"groups": {"default": false, "disable_previous": true, "set": {"default": true}}}),
        )
        .unwrap_err();
        assert_eq!(err, ConfigError::ReservedGroup);
        assert!(state.default_status());
        assert_eq!(state.groups().get("a"), Some(&true));
    }

    #[test]
    fn test_unknown_group_option() {
        let mut state = GlobalState::new();
        let err = apply(&mut state, json!({"groups": {"sett": {}}})).unwrap_err();
        assert_eq!(err, ConfigError::unknown_group_option("sett"));
    }

    #[test]
    fn test_unknown_top_level_option() {
        let mut state = GlobalState::new();
        let err = apply(&mut state, json!({"bogus": 1})).unwrap_err();
        assert_eq!(err, ConfigError::unknown_option("bogus"));
    }

    #[test]
    fn test_options_before_failure_stay_applied() {
        let mut state = GlobalState::new();
        let options = json!({"enabled": false, "bogus": 1});
        let err = apply_config(&mut state, Some(&options), false).unwrap_err();
        assert_eq!(err, ConfigError::unknown_option("bogus"));
        assert!(!state.enabled());
    }

    #[test]
    fn test_wrong_value_types() {
        let mut state = GlobalState::new();
        assert_eq!(
            apply(&mut state, json!({"enabled": 1})),
            Err(ConfigError::invalid_value("enabled", "a boolean"))
        );
        assert_eq!(
            apply(&mut state, json!({"groups": "all"})),
            Err(ConfigError::invalid_value("groups", "a mapping"))
        );
        assert_eq!(
            apply(&mut state, json!({"mode": 2})),
            Err(ConfigError::invalid_value("mode", "a mode name"))
        );
    }

    #[test]
    fn test_reset_ignores_options() {
        let mut state = with_groups(&[("a", false)]);
        state.set_enabled(false);
        let options = json!({"bogus": 1});
        apply_config(&mut state, Some(&options), true).unwrap();
        assert_eq!(state, GlobalState::new());
    }

    #[test]
    fn test_no_options_is_a_no_op() {
        let mut state = with_groups(&[("a", false)]);
        apply_config(&mut state, None, false).unwrap();
        assert_eq!(state, with_groups(&[("a", false)]));
    }
}
