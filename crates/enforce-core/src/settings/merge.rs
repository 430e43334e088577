//! Deep merge of option trees
//!
//! `merge(defaults, update)` walks the defaults and overlays the update:
//!
//! - a key missing from the update keeps its default
//! - two mappings under the same key are merged recursively
//! - anything else is taken from the update verbatim, `null` included
//!
//! `null` is not special here. Whoever consumes the merged tree decides
//! that `null` means "leave unchanged". Keys that only exist in the update
//! are carried through unchanged so that the consumer can reject them;
//! the option schema is closed and they must not disappear silently.

use serde_json::{Map, Value};

/// Merge `update` over `defaults`, returning a new tree
pub fn merge(defaults: &Value, update: &Value) -> Value {
    match (defaults, update) {
        (Value::Object(defaults), Value::Object(update)) => {
            Value::Object(merge_maps(defaults, update))
        }
        _ => update.clone(),
    }
}

/// Merge two mappings key by key
pub fn merge_maps(defaults: &Map<String, Value>, update: &Map<String, Value>) -> Map<String, Value> {
    let mut merged = Map::with_capacity(defaults.len());

    for (key, default_value) in defaults {
        let value = match update.get(key) {
            None => default_value.clone(),
            Some(update_value) => merge(default_value, update_value),
        };
        merged.insert(key.clone(), value);
    }

    for (key, value) in update {
        if !defaults.contains_key(key) {
            merged.insert(key.clone(), value.clone());
        }
    }

    merged
}
