//! Shape loose key/value layers to match the [`AppConfig`](crate::options::AppConfig)
//! schema.
//!
//! Dotted-key overrides (`("updates.checkFrequency", 30)`) are expanded into
//! nested objects, and every layer's keys are canonicalised against the
//! schema's field names so that `checkFrequency`, `checkfrequency` and
//! `CHECK_FREQUENCY` all land on the same field before merging.

use confique::meta::{FieldKind, Meta};
use serde_json::{Map, Value};

/// Convert dotted-key overrides into a nested JSON object.
///
/// `("updates.automatic", Value::Bool(true))` becomes `{"updates": {"automatic": true}}`
///
/// If multiple entries target the same key, the last one wins. A scalar in
/// the way of a deeper key is replaced by an object.
pub fn overrides_to_map(entries: &[(String, Value)]) -> Map<String, Value> {
    let mut map = Map::new();
    for (dotted_key, value) in entries {
        set_nested(&mut map, dotted_key, value.clone());
    }
    map
}

fn set_nested(map: &mut Map<String, Value>, dotted_key: &str, value: Value) {
    let mut segments = dotted_key.split('.');
    let Some(leaf) = segments.next_back() else {
        return;
    };
    let mut current = map;

    for segment in segments {
        let entry = current
            .entry(segment)
            .or_insert_with(|| Value::Object(Map::new()));
        if !entry.is_object() {
            *entry = Value::Object(Map::new());
        }
        let Value::Object(next) = entry else {
            return;
        };
        current = next;
    }

    current.insert(leaf.to_string(), value);
}

/// Rename keys to the schema's field names, recursively.
///
/// Matching ignores ASCII case and underscores. Keys with no matching field
/// are kept as they are; the typed view ignores them.
pub fn canonicalize_keys(map: Map<String, Value>, meta: &Meta) -> Map<String, Value> {
    let mut out = Map::new();
    for (key, value) in map {
        let normalized = normalize(&key);
        let field = meta.fields.iter().find(|f| normalize(f.name) == normalized);

        match field {
            Some(field) => {
                let value = match (&field.kind, value) {
                    (FieldKind::Nested { meta: nested, .. }, Value::Object(inner)) => {
                        Value::Object(canonicalize_keys(inner, nested))
                    }
                    (_, value) => value,
                };
                out.insert(field.name.to_string(), value);
            }
            None => {
                out.insert(key, value);
            }
        }
    }
    out
}

fn normalize(name: &str) -> String {
    name.chars()
        .filter(|c| *c != '_')
        .map(|c| c.to_ascii_lowercase())
        .collect()
}
