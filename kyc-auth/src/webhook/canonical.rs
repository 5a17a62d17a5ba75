//! Canonical signing string for key/value webhook signatures.
//!
//! The provider signs `k1=v1&k2=v2...` over the body keys in ascending order.
//! Nested values are embedded as JSON text produced by the provider's reference
//! signer, and scalars use that signer's string coercion. Both are reproduced
//! here byte for byte, otherwise digests of payloads carrying URLs, non-ASCII
//! names or empty objects would not match.

use serde_json::{Map, Number, Value};

/// Key excluded from the signed content.
const SIGNATURE_KEY: &str = "signature";

/// Build the string that gets hashed, without the trailing secret.
///
/// Keys are sorted byte-lexicographically, so the result does not depend on the
/// order in which the transport delivered them.
pub fn signing_string(payload: &Map<String, Value>) -> String {
    let mut keys: Vec<&String> = payload
        .keys()
        .filter(|key| key.as_str() != SIGNATURE_KEY)
        .collect();
    keys.sort();

    keys.iter()
        .map(|key| format!("{}={}", key, value_text(&payload[key.as_str()])))
        .collect::<Vec<_>>()
        .join("&")
}

/// Encode a value as JSON text the way the provider's signer does.
///
/// Differences from `serde_json::to_string`: `/` is escaped, non-ASCII
/// characters become `\uXXXX` escapes, empty objects encode as `[]`, and an
/// object whose keys are exactly `"0".."n-1"` encodes as an array.
pub fn to_signing_json(value: &Value) -> String {
    let mut out = String::new();
    write_json(value, &mut out);
    out
}

fn write_json(value: &Value, out: &mut String) {
    match value {
        Value::Null => out.push_str("null"),
        Value::Bool(flag) => out.push_str(if *flag { "true" } else { "false" }),
        Value::Number(number) => out.push_str(&json_number_text(number)),
        Value::String(text) => write_string(text, out),
        Value::Array(items) => write_array(items.iter(), out),
        Value::Object(map) if map.is_empty() || is_list(map) => write_array(map.values(), out),
        Value::Object(map) => {
            out.push('{');
            for (index, (key, item)) in map.iter().enumerate() {
                if index > 0 {
                    out.push(',');
                }
                write_string(key, out);
                out.push(':');
                write_json(item, out);
            }
            out.push('}');
        }
    }
}

fn write_array<'a>(items: impl Iterator<Item = &'a Value>, out: &mut String) {
    out.push('[');
    for (index, item) in items.enumerate() {
        if index > 0 {
            out.push(',');
        }
        write_json(item, out);
    }
    out.push(']');
}

fn write_string(text: &str, out: &mut String) {
    out.push('"');
    for ch in text.chars() {
        match ch {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '/' => out.push_str("\\/"),
            '\u{8}' => out.push_str("\\b"),
            '\u{c}' => out.push_str("\\f"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if (c as u32) < 0x20 => out.push_str(&format!("\\u{:04x}", c as u32)),
            c if c.is_ascii() => out.push(c),
            c => {
                let mut units = [0u16; 2];
                for unit in c.encode_utf16(&mut units) {
                    out.push_str(&format!("\\u{:04x}", unit));
                }
            }
        }
    }
    out.push('"');
}

/// Sequential keys `"0".."n-1"` in order.
fn is_list(map: &Map<String, Value>) -> bool {
    map.keys()
        .enumerate()
        .all(|(index, key)| *key == index.to_string())
}

/// Text form of a top-level value: structures as signer JSON, `true` as `1`,
/// `false` and `null` as the empty string.
fn value_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Bool(true) => "1".to_string(),
        Value::Bool(false) => String::new(),
        Value::Number(number) => number_text(number),
        Value::String(text) => text.clone(),
        Value::Array(_) | Value::Object(_) => to_signing_json(value),
    }
}

fn number_text(number: &Number) -> String {
    if let Some(int) = number.as_i64() {
        int.to_string()
    } else if let Some(uint) = number.as_u64() {
        uint.to_string()
    } else {
        number.as_f64().map(float_text).unwrap_or_default()
    }
}

/// Numbers inside JSON text. Integers print as-is; floats use the shortest
/// round-trip digits, with no `.0` on integral values and `1.0e+25` style
/// once the decimal point sits more than 17 places left or 3 places right.
fn json_number_text(number: &Number) -> String {
    match number.as_f64() {
        Some(value) if number.is_f64() => json_float_text(value),
        _ => number.to_string(),
    }
}

fn json_float_text(value: f64) -> String {
    let scientific = format!("{:e}", value);
    let Some((mantissa, exponent)) = scientific.split_once('e') else {
        return value.to_string();
    };
    let Ok(exponent) = exponent.parse::<i32>() else {
        return value.to_string();
    };

    if value != 0.0 && !(-4..=16).contains(&exponent) {
        let mut mantissa = mantissa.to_string();
        if !mantissa.contains('.') {
            mantissa.push_str(".0");
        }
        let sign = if exponent < 0 { '-' } else { '+' };
        format!("{}e{}{}", mantissa, sign, exponent.abs())
    } else {
        format!("{}", value)
    }
}

/// Floats render with 14 significant digits, switching to `1.0E+25` style
/// outside the `1e-4 ..= 1e14` range.
fn float_text(value: f64) -> String {
    if value.is_nan() {
        return "NAN".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "INF" } else { "-INF" }.to_string();
    }
    if value == 0.0 {
        return if value.is_sign_negative() { "-0" } else { "0" }.to_string();
    }

    let scientific = format!("{:.13e}", value);
    let Some((mantissa, exponent)) = scientific.split_once('e') else {
        return value.to_string();
    };
    let Ok(exponent) = exponent.parse::<i32>() else {
        return value.to_string();
    };

    if !(-4..14).contains(&exponent) {
        let mut mantissa = trim_fraction(mantissa);
        if !mantissa.contains('.') {
            mantissa.push_str(".0");
        }
        let sign = if exponent < 0 { '-' } else { '+' };
        format!("{}E{}{}", mantissa, sign, exponent.abs())
    } else {
        let decimals = (13 - exponent).max(0) as usize;
        trim_fraction(&format!("{:.*}", decimals, value))
    }
}

fn trim_fraction(text: &str) -> String {
    if text.contains('.') {
        text.trim_end_matches('0').trim_end_matches('.').to_string()
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn payload(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("test payload must be an object"),
        }
    }

    #[test]
    fn test_keys_are_sorted() {
        let map = payload(json!({"b": 2, "a": 1}));
        assert_eq!(signing_string(&map), "a=1&b=2");
    }

    #[test]
    fn test_signature_key_is_excluded() {
        let map = payload(json!({"reference": "SP_1", "signature": "abc", "event": "x"}));
        assert_eq!(signing_string(&map), "event=x&reference=SP_1");
    }

    #[test]
    fn test_empty_payload_yields_empty_string() {
        assert_eq!(signing_string(&Map::new()), "");
    }

    #[test]
    fn test_scalar_coercion() {
        let map = payload(json!({
            "a": true,
            "b": false,
            "c": null,
            "d": 1.5,
            "e": 2.0,
            "f": -7
        }));
        assert_eq!(signing_string(&map), "a=1&b=&c=&d=1.5&e=2&f=-7");
    }

    #[test]
    fn test_nested_values_use_signer_json() {
        let map = payload(json!({
            "result": {"event": "verification.completed", "url": "https://x.test/a"},
            "list": ["passport", "id_card"]
        }));
        let expected = concat!(
            r#"list=["passport","id_card"]&"#,
            r#"result={"event":"verification.completed","url":"https:\/\/x.test\/a"}"#,
        );
        assert_eq!(signing_string(&map), expected);
    }

    #[test]
    fn test_nested_object_keeps_insertion_order() {
        let map = payload(json!({"data": {"z": 1, "a": 2}}));
        assert_eq!(signing_string(&map), r#"data={"z":1,"a":2}"#);
    }

    #[test]
    fn test_signer_json_escapes() {
        assert_eq!(to_signing_json(&json!(["é"])), r#"["\u00e9"]"#);
        assert_eq!(to_signing_json(&json!(["😀"])), r#"["\ud83d\ude00"]"#);
        assert_eq!(to_signing_json(&json!(["a\"b\\c\n"])), r#"["a\"b\\c\n"]"#);
    }

    #[test]
    fn test_empty_object_encodes_as_array() {
        assert_eq!(to_signing_json(&json!({"face": {}})), r#"{"face":[]}"#);
    }

    #[test]
    fn test_sequential_keys_encode_as_array() {
        assert_eq!(to_signing_json(&json!({"0": "a", "1": "b"})), r#"["a","b"]"#);
        assert_eq!(to_signing_json(&json!({"1": "a", "0": "b"})), r#"{"1":"a","0":"b"}"#);
    }

    #[test]
    fn test_nested_floats_use_json_form() {
        assert_eq!(
            to_signing_json(&json!([1e25, 0.1, 2.0, 0.00001, 0.0001, 1e16, 1e17, -1.5e-7])),
            "[1.0e+25,0.1,2,1.0e-5,0.0001,10000000000000000,1.0e+17,-1.5e-7]"
        );
        assert_eq!(
            to_signing_json(&json!({"score": 0.95, "count": 3})),
            r#"{"score":0.95,"count":3}"#
        );
    }

    #[test]
    fn test_float_text() {
        assert_eq!(float_text(0.1), "0.1");
        assert_eq!(float_text(0.1 + 0.2), "0.3");
        assert_eq!(float_text(1e25), "1.0E+25");
        assert_eq!(float_text(0.00001), "1.0E-5");
        assert_eq!(float_text(0.0001), "0.0001");
        assert_eq!(float_text(-3.25), "-3.25");
    }
}
