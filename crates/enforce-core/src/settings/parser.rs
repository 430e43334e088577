//! Config update parsing
//!
//! Shapes a partial option tree into one where every recognized key is
//! present, so that the applier only has to check for `null`.

use serde_json::{Value, json};

use super::merge::merge;
use crate::error::{ConfigError, ConfigResult};

/// The canonical shape of a config update, every option unset
pub fn default_options() -> Value {
    json!({
        "enabled": null,
        "groups": {
            "set": {},
            "disable_previous": false,
            "enable_previous": false,
            "clear_previous": false,
            "default": null
        },
        "mode": null
    })
}

/// Expand a partial update into the full option shape
///
/// `null` options are treated as an empty update. Unknown keys are not
/// rejected here; they are carried into the result and rejected when
/// the update is applied.
pub fn parse_config(options: &Value) -> ConfigResult<Value> {
    match options {
        Value::Null => Ok(default_options()),
        Value::Object(_) => Ok(merge(&default_options(), options)),
        _ => Err(ConfigError::invalid_value("options", "a mapping")),
    }
}
