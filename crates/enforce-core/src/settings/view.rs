//! Per call site settings view
//!
//! A [`Settings`] view answers "is type checking on here, and in which
//! mode?" for one group. Every read goes back to the global state, so a
//! view always reflects the latest `config` call. Nothing is cached.

use tracing::trace;

use super::handle::{SettingsHandle, global};
use super::mode::VarianceMode;
use super::state::{DEFAULT_KEY, GlobalState};

/// Group-scoped read access to the global settings
#[derive(Debug, Clone)]
pub struct Settings {
    group: String,
    enabled: Option<bool>,
    handle: SettingsHandle,
}

impl Settings {
    /// Create a view on this thread's global settings
    ///
    /// `group` defaults to `"default"`. A given `enabled` becomes a local
    /// override that wins over any group status.
    pub fn new(enabled: Option<bool>, group: Option<&str>) -> Self {
        Self::with_handle(global(), enabled, group)
    }

    /// Create a view on the settings behind `handle`
    pub fn with_handle(handle: SettingsHandle, enabled: Option<bool>, group: Option<&str>) -> Self {
        Self {
            group: group.unwrap_or(DEFAULT_KEY).to_string(),
            enabled,
            handle,
        }
    }

    /// View on `group` in the global settings, without a local override
    pub fn for_group(group: &str) -> Self {
        Self::new(None, Some(group))
    }

    pub fn group(&self) -> &str {
        &self.group
    }

    /// Whether type checking is enabled for this view
    ///
    /// The global kill-switch is checked first. After it, a local override
    /// wins; without one the group's override applies, falling back to the
    /// default group status.
    pub fn enabled(&self) -> bool {
        let enabled = self.handle.read(|state| {
            if !state.enabled() {
                return false;
            }
            match self.enabled {
                Some(local) => local,
                None => state.group_status(&self.group),
            }
        });
        trace!(group = %self.group, enabled, "Resolved settings view");
        enabled
    }

    /// Set the local override; the global state is not touched
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = Some(enabled);
    }

    /// The local override, if any
    pub fn local_override(&self) -> Option<bool> {
        self.enabled
    }

    /// Drop the local override
    pub fn clear_local_override(&mut self) {
        self.enabled = None;
    }

    /// Currently selected type checking mode
    pub fn mode(&self) -> VarianceMode {
        self.handle.read(GlobalState::mode)
    }

    /// Whether covariant checking is on
    pub fn covariant(&self) -> bool {
        self.mode().is_covariant()
    }

    /// Whether contravariant checking is on
    pub fn contravariant(&self) -> bool {
        self.mode().is_contravariant()
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self::new(None, None)
    }
}

impl From<&Settings> for bool {
    fn from(settings: &Settings) -> Self {
        settings.enabled()
    }
}

impl From<Settings> for bool {
    fn from(settings: Settings) -> Self {
        settings.enabled()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn view(handle: &SettingsHandle, enabled: Option<bool>, group: Option<&str>) -> Settings {
        Settings::with_handle(handle.clone(), enabled, group)
    }

    #[test]
    fn test_defaults() {
        let handle = SettingsHandle::new();
        let settings = view(&handle, None, None);
        assert_eq!(settings.group(), "default");
        assert!(settings.enabled());
        assert_eq!(settings.mode(), VarianceMode::Invariant);
        assert!(!settings.covariant());
        assert!(!settings.contravariant());
    }

    #[test]
    fn test_kill_switch_beats_local_override() {
        let handle = SettingsHandle::new();
        let settings = view(&handle, Some(true), Some("g"));
        handle.config(&json!({"enabled": false}), false).unwrap();
        assert!(!settings.enabled());
        assert!(!bool::from(&settings));
    }

    #[test]
    fn test_group_override_then_default_status() {
        let handle = SettingsHandle::new();
        handle
            .config(&json!({"groups": {"set": {"g": false}}}), false)
            .unwrap();
        assert!(!view(&handle, None, Some("g")).enabled());
        assert!(view(&handle, None, Some("h")).enabled());

        handle
            .config(&json!({"groups": {"default": false}}), false)
            .unwrap();
        assert!(!view(&handle, None, Some("h")).enabled());
        assert!(!view(&handle, None, None).enabled());
    }

    #[test]
    fn test_local_override_wins_over_group() {
        let handle = SettingsHandle::new();
        let settings = view(&handle, Some(false), Some("g"));
        handle
            .config(&json!({"groups": {"set": {"g": true}}}), false)
            .unwrap();
        assert!(!settings.enabled());
        assert!(view(&handle, None, Some("g")).enabled());
    }

    #[test]
    fn test_set_enabled_is_local() {
        let handle = SettingsHandle::new();
        let mut settings = view(&handle, None, Some("g"));
        settings.set_enabled(false);
        assert_eq!(settings.local_override(), Some(false));
        assert!(!settings.enabled());
        assert!(view(&handle, None, Some("g")).enabled());
        assert_eq!(handle.snapshot(), GlobalState::new());

        settings.clear_local_override();
        assert!(settings.enabled());
    }

    #[test]
    fn test_views_follow_mode_changes() {
        let handle = SettingsHandle::new();
        let settings = view(&handle, None, None);

        handle.config(&json!({"mode": "covariant"}), false).unwrap();
        assert!(settings.covariant());
        assert!(!settings.contravariant());

        handle.config(&json!({"mode": "contravariant"}), false).unwrap();
        assert!(!settings.covariant());
        assert!(settings.contravariant());

        handle.config(&json!({"mode": "bivariant"}), false).unwrap();
        assert!(settings.covariant());
        assert!(settings.contravariant());
    }
}
