//! Default-producing field lookups over raw provider JSON
//!
//! Every accessor takes any JSON value and never fails: a missing key, a
//! non-object parent or a value of the wrong type all yield the documented
//! default for that accessor.

use crate::types::JsonValue;

static NULL: JsonValue = JsonValue::Null;

/// Nested value, or `null` when absent or when `value` isn't an object
pub fn field<'a>(value: &'a JsonValue, key: &str) -> &'a JsonValue {
    value.get(key).unwrap_or(&NULL)
}

/// Text field, empty string when absent or not a string
pub fn text(value: &JsonValue, key: &str) -> String {
    opt_text(value, key).unwrap_or_default()
}

/// Text field, `default` when absent, `null` or not a string
pub fn text_or(value: &JsonValue, key: &str, default: &str) -> String {
    opt_text(value, key).unwrap_or_else(|| default.to_string())
}

/// Nullable text field
pub fn opt_text(value: &JsonValue, key: &str) -> Option<String> {
    field(value, key).as_str().map(str::to_string)
}

/// Nullable integer field. Integral floats are accepted; anything else is null.
pub fn int(value: &JsonValue, key: &str) -> Option<i64> {
    let v = field(value, key);
    if let Some(i) = v.as_i64() {
        return Some(i);
    }
    v.as_f64()
        .filter(|f| f.fract() == 0.0 && f.is_finite())
        .map(|f| f as i64)
}

/// Integer field that defaults to 0
pub fn int_or_zero(value: &JsonValue, key: &str) -> i64 {
    int(value, key).unwrap_or(0)
}

/// Array field, empty when absent or not an array
pub fn list<'a>(value: &'a JsonValue, key: &str) -> &'a [JsonValue] {
    field(value, key).as_array().map_or(&[][..], Vec::as_slice)
}
