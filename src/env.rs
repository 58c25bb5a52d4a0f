use serde_json::{Map, Number, Value};

/// Collect `{PREFIX}__*` environment variables into a nested JSON object.
///
/// `TSTOY__UPDATES__AUTOMATIC=true` becomes `{"updates": {"automatic": true}}`.
/// Only `__` nests; a single `_` stays part of the segment. Segments are
/// lowercased, and [`canonicalize_keys`](crate::overrides::canonicalize_keys)
/// maps them onto the schema's spelling afterwards.
///
/// Values become the first of bool, integer, float or string that parses.
/// `vars` is any iterator so tests need not touch the process environment.
pub fn env_to_map(
    prefix: &str,
    vars: impl IntoIterator<Item = (String, String)>,
) -> Map<String, Value> {
    let needle = format!("{prefix}__");
    let mut map = Map::new();

    for (key, value) in vars {
        let Some(rest) = key.strip_prefix(&needle) else {
            continue;
        };
        if rest.is_empty() {
            continue;
        }

        let segments: Vec<&str> = rest.split("__").collect();
        insert_nested(&mut map, &segments, parse_env_value(&value));
    }

    map
}

fn insert_nested(map: &mut Map<String, Value>, segments: &[&str], value: Value) {
    let Some((first, rest)) = segments.split_first() else {
        return;
    };
    let key = first.to_lowercase();

    if rest.is_empty() {
        map.insert(key, value);
        return;
    }

    let sub = map
        .entry(key)
        .or_insert_with(|| Value::Object(Map::new()));
    if !sub.is_object() {
        *sub = Value::Object(Map::new());
    }
    if let Value::Object(sub_map) = sub {
        insert_nested(sub_map, rest, value);
    }
}

fn parse_env_value(s: &str) -> Value {
    if s.eq_ignore_ascii_case("true") {
        return Value::Bool(true);
    }
    if s.eq_ignore_ascii_case("false") {
        return Value::Bool(false);
    }
    if let Ok(i) = s.parse::<i64>() {
        return Value::from(i);
    }
    // Require a dot so "NaN" and "inf" stay strings.
    if s.contains('.')
        && let Ok(f) = s.parse::<f64>()
        && let Some(n) = Number::from_f64(f)
    {
        return Value::Number(n);
    }
    Value::String(s.to_string())
}
