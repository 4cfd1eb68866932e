//! Lenient field decoders for storefront JSON.
//!
//! The storefront is not consistent about scalar types: ids come as strings or
//! numbers, flags as `1` or `true`, codes as numbers or numeric strings. These
//! helpers normalise such fields into one Rust type and map anything
//! unrecognisable to `None` instead of failing the whole document.
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// `"123"`, `123` → `Some("123")`; empty string and `null` → `None`.
pub fn opt_string<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
    Ok(match Option::<Value>::deserialize(d)? {
        Some(Value::String(s)) if !s.trim().is_empty() => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

/// `1`, `"1"` → `Some(1)`; anything else → `None`.
pub fn opt_i32<'de, D: Deserializer<'de>>(d: D) -> Result<Option<i32>, D::Error> {
    Ok(match Option::<Value>::deserialize(d)? {
        Some(Value::Number(n)) => n.as_i64().and_then(|n| i32::try_from(n).ok()),
        Some(Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    })
}

/// Like [`opt_i32`] but for amounts in cents.
pub fn opt_i64<'de, D: Deserializer<'de>>(d: D) -> Result<Option<i64>, D::Error> {
    Ok(match Option::<Value>::deserialize(d)? {
        Some(Value::Number(n)) => n.as_i64(),
        Some(Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    })
}

/// `true`, `1`, `"1"`, `"true"` → `true`; everything else → `false`.
pub fn flag<'de, D: Deserializer<'de>>(d: D) -> Result<bool, D::Error> {
    Ok(match Option::<Value>::deserialize(d)? {
        Some(Value::Bool(b)) => b,
        Some(Value::Number(n)) => n.as_i64() == Some(1),
        Some(Value::String(s)) => s == "1" || s.eq_ignore_ascii_case("true"),
        _ => false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Deserialize)]
    struct Probe {
        #[serde(default, deserialize_with = "opt_string")]
        id: Option<String>,
        #[serde(default, deserialize_with = "opt_i32")]
        code: Option<i32>,
        #[serde(default, deserialize_with = "flag")]
        ok: bool,
    }

    fn probe(json: &str) -> Probe {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn ids_accept_strings_and_numbers() {
        assert_eq!(probe(r#"{"id": "123"}"#).id.as_deref(), Some("123"));
        assert_eq!(probe(r#"{"id": 123}"#).id.as_deref(), Some("123"));
        assert_eq!(probe(r#"{"id": ""}"#).id, None);
        assert_eq!(probe(r#"{"id": null}"#).id, None);
        assert_eq!(probe("{}").id, None);
    }

    #[test]
    fn codes_accept_numeric_strings() {
        assert_eq!(probe(r#"{"code": 22}"#).code, Some(22));
        assert_eq!(probe(r#"{"code": "2"}"#).code, Some(2));
        assert_eq!(probe(r#"{"code": "x"}"#).code, None);
    }

    #[test]
    fn flags_accept_bools_and_ones() {
        assert!(probe(r#"{"ok": true}"#).ok);
        assert!(probe(r#"{"ok": 1}"#).ok);
        assert!(!probe(r#"{"ok": 0}"#).ok);
        assert!(!probe("{}").ok);
    }
}
