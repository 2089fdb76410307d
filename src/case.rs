//! Case conversion for the API: request keys camelCase -> snake_case (storage), response keys snake_case -> camelCase (client).

use serde_json::{Map, Value};

/// Convert a single identifier from snake_case to camelCase.
/// e.g. "creation_date" -> "creationDate"
pub fn to_camel_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut capitalize_next = false;
    for c in s.chars() {
        if c == '_' {
            capitalize_next = true;
        } else if capitalize_next {
            out.extend(c.to_uppercase());
            capitalize_next = false;
        } else {
            out.push(c);
        }
    }
    out
}

/// Convert a single identifier from camelCase to snake_case.
/// e.g. "lastUpdateDate" -> "last_update_date"
pub fn to_snake_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 4);
    for (i, c) in s.chars().enumerate() {
        if c.is_uppercase() {
            if i > 0 {
                out.push('_');
            }
            out.extend(c.to_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}

fn rename_keys(obj: &mut Map<String, Value>, convert: fn(&str) -> String) {
    let keys: Vec<String> = obj.keys().cloned().collect();
    for k in keys {
        let renamed = convert(&k);
        if renamed != k {
            if let Some(v) = obj.remove(&k) {
                obj.insert(renamed, v);
            }
        }
    }
}

fn rename_keys_recursive(value: &mut Value, convert: fn(&str) -> String) {
    match value {
        Value::Object(map) => {
            rename_keys(map, convert);
            for (_, v) in map.iter_mut() {
                rename_keys_recursive(v, convert);
            }
        }
        Value::Array(arr) => {
            for v in arr.iter_mut() {
                rename_keys_recursive(v, convert);
            }
        }
        _ => {}
    }
}

/// Recursively apply camelCase to all object keys (responses).
pub fn value_keys_to_camel_case_recursive(value: &mut Value) {
    rename_keys_recursive(value, to_camel_case);
}

/// Recursively apply snake_case to all object keys (request bodies).
pub fn value_keys_to_snake_case_recursive(value: &mut Value) {
    rename_keys_recursive(value, to_snake_case);
}
