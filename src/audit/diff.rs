//! One-line change summaries for audit entries
//!
//! Values are compared through their JSON form, one level deep, so a summary
//! reads `unitCost: 0.02 -> 0.03` rather than dumping nested budgets.

use std::collections::BTreeSet;

use serde::Serialize;
use serde_json::Value;

/// Longest string shown before truncation
const MAX_STRING_CHARS: usize = 50;

/// Summarize the fields that differ between two serializable values
///
/// Returns `None` when nothing changed or either side fails to serialize.
pub fn summarize_changes<T: Serialize>(before: &T, after: &T) -> Option<String> {
    let before = serde_json::to_value(before).ok()?;
    let after = serde_json::to_value(after).ok()?;
    diff_values(&before, &after)
}

fn diff_values(before: &Value, after: &Value) -> Option<String> {
    let (Value::Object(old), Value::Object(new)) = (before, after) else {
        return (before != after).then(|| format!("{} -> {}", brief(before), brief(after)));
    };

    let keys: BTreeSet<&String> = old.keys().chain(new.keys()).collect();
    let changes: Vec<String> = keys
        .into_iter()
        .filter_map(|key| match (old.get(key), new.get(key)) {
            (Some(a), Some(b)) if a == b => None,
            (Some(a), Some(b)) => Some(format!("{}: {} -> {}", key, brief(a), brief(b))),
            (Some(a), None) => Some(format!("{}: {} -> (removed)", key, brief(a))),
            (None, Some(b)) => Some(format!("{}: (added) -> {}", key, brief(b))),
            (None, None) => None,
        })
        .collect();

    (!changes.is_empty()).then(|| changes.join(", "))
}

/// Short rendering of a JSON value
fn brief(value: &Value) -> String {
    match value {
        Value::String(s) if s.chars().count() > MAX_STRING_CHARS => {
            let head: String = s.chars().take(MAX_STRING_CHARS - 3).collect();
            format!("\"{}...\"", head)
        }
        Value::Array(items) => format!("[{} items]", items.len()),
        Value::Object(fields) => format!("{{{} fields}}", fields.len()),
        other => other.to_string(),
    }
}
