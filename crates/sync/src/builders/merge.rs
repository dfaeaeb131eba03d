//! Workspace/user scope merging.
//!
//! Workspace-level values are the defaults and user-level values override
//! them. Named collections are deduplicated by name, and when both scopes
//! declare the same name the workspace entry's fields win field by field.

use serde::{de::DeserializeOwned, Serialize};
use serde_json::{Map, Value};
use tracing::warn;

/// Recursively merges `user` over `workspace`.
///
/// ```
/// use serde_json::json;
/// use taptik_sync::builders::merge::merge_settings;
///
/// let merged = merge_settings(
///     json!({"a": 1, "b": 1}).as_object().unwrap().clone(),
///     json!({"a": 2, "c": 1}).as_object().unwrap().clone(),
/// );
/// assert_eq!(serde_json::Value::Object(merged), json!({"a": 2, "b": 1, "c": 1}));
/// ```
pub fn merge_settings(workspace: Map<String, Value>, user: Map<String, Value>) -> Map<String, Value> {
    let mut merged = workspace;
    for (key, user_value) in user {
        let combined = match (merged.remove(&key), user_value) {
            (Some(Value::Object(base)), Value::Object(over)) => {
                Value::Object(merge_settings(base, over))
            }
            (_, over) => over,
        };
        merged.insert(key, combined);
    }
    merged
}

/// Merges two optional settings maps from the two scopes.
pub fn merge_optional_settings(
    workspace: Option<Map<String, Value>>,
    user: Option<Map<String, Value>>,
) -> Option<Map<String, Value>> {
    match (workspace, user) {
        (Some(w), Some(u)) => Some(merge_settings(w, u)),
        (w, u) => w.or(u),
    }
}

/// Fills the fields `primary` leaves unset from `fallback`.
///
/// Null and empty arrays/objects in `primary` count as unset. Nested objects
/// are merged the same way.
pub fn fill_missing(primary: Map<String, Value>, fallback: Map<String, Value>) -> Map<String, Value> {
    let mut merged = primary;
    for (key, fallback_value) in fallback {
        let combined = match merged.remove(&key) {
            None | Some(Value::Null) => fallback_value,
            Some(Value::Array(items)) if items.is_empty() => fallback_value,
            Some(Value::Object(base)) => match fallback_value {
                Value::Object(fb) => Value::Object(fill_missing(base, fb)),
                _ => Value::Object(base),
            },
            Some(value) => value,
        };
        merged.insert(key, combined);
    }
    merged
}

/// Deduplicates named records across the two scopes.
///
/// Order is workspace entries first (in their declared order), then
/// user-only entries. For a name present in both, the workspace record wins
/// per field and the user record supplies whatever the workspace left unset.
pub fn merge_named<T, K>(workspace: Vec<T>, user: Vec<T>, key: K) -> Vec<T>
where
    T: Serialize + DeserializeOwned + Clone,
    K: Fn(&T) -> String,
{
    let mut merged: Vec<T> = Vec::with_capacity(workspace.len() + user.len());
    for item in workspace {
        if let Some(pos) = merged.iter().position(|m| key(m) == key(&item)) {
            merged[pos] = item;
        } else {
            merged.push(item);
        }
    }
    for item in user {
        match merged.iter().position(|m| key(m) == key(&item)) {
            Some(pos) => merged[pos] = overlay(&merged[pos], &item),
            None => merged.push(item),
        }
    }
    merged
}

fn overlay<T>(primary: &T, fallback: &T) -> T
where
    T: Serialize + DeserializeOwned + Clone,
{
    let as_map = |v: &T| match serde_json::to_value(v) {
        Ok(Value::Object(map)) => Some(map),
        _ => None,
    };
    let (Some(p), Some(f)) = (as_map(primary), as_map(fallback)) else {
        return primary.clone();
    };
    match serde_json::from_value(Value::Object(fill_missing(p, f))) {
        Ok(merged) => merged,
        Err(err) => {
            warn!(error = %err, "Could not merge scoped records; keeping workspace entry");
            primary.clone()
        }
    }
}

/// Merges optional collections from the two scopes.
pub fn merge_optional_named<T, K>(workspace: Option<Vec<T>>, user: Option<Vec<T>>, key: K) -> Option<Vec<T>>
where
    T: Serialize + DeserializeOwned + Clone,
    K: Fn(&T) -> String,
{
    match (workspace, user) {
        (Some(w), Some(u)) => Some(merge_named(w, u, key)),
        (w, u) => w.or(u),
    }
}

/// Reads the workspace and user variants of one source concurrently.
///
/// The merge order is fixed by the caller, not by which read finishes first.
pub fn read_scopes<T, W, U>(workspace: W, user: U) -> (T, T)
where
    T: Send,
    W: FnOnce() -> T + Send,
    U: FnOnce() -> T + Send,
{
    rayon::join(workspace, user)
}
