//! Query String Codec
//!
//! Parses URL query strings into nested mappings, with support for
//! bracketed array indices like `key[0]`, and serializes nested mappings
//! back to query strings. Both directions share the same encoding rules
//! so the pair round-trips.

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, percent_decode_str, utf8_percent_encode};
use serde_json::{Map, Value};

use crate::constants::MAX_PARSED_ARRAY_INDEX;

/// Escape set matching JavaScript's `encodeURIComponent`: everything
/// except `A-Z a-z 0-9 - _ . ! ~ * ' ( )`.
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Percent-encode a query-string component
pub fn encode(s: &str) -> String {
    utf8_percent_encode(s, COMPONENT).to_string()
}

/// Decode a percent-encoded component, treating `+` as space.
///
/// A component that does not decode to valid UTF-8 is returned unchanged
/// rather than surfaced as an error.
pub fn decode(s: &str) -> String {
    let spaced = s.replace('+', " ");
    match percent_decode_str(&spaced).decode_utf8() {
        Ok(decoded) => decoded.into_owned(),
        Err(_) => s.to_string(),
    }
}

/// Parse a query string into an ordered mapping.
///
/// Strips one leading `?` or `#`. Keys matching `name[n]` accumulate into
/// an array entry under `name` at position `n` (gaps padded with empty
/// strings); every other key becomes a scalar entry, last writer wins. A
/// pair without `=` decodes to an empty-string value.
pub fn parse(qstr: &str) -> Map<String, Value> {
    let qstr = qstr.strip_prefix(['?', '#']).unwrap_or(qstr);
    let mut obj = Map::new();

    if qstr.is_empty() {
        return obj;
    }

    for pair in qstr.split('&') {
        let (raw_key, raw_value) = match pair.split_once('=') {
            Some((k, v)) => (k, v),
            None => (pair, ""),
        };
        let key = decode(raw_key);
        let value = decode(raw_value);

        if let Some((name, index)) = bracket_index(&key) {
            let entry = obj
                .entry(name.to_string())
                .or_insert_with(|| Value::Array(Vec::new()));
            if let Value::Array(items) = entry {
                if items.len() <= index {
                    items.resize(index + 1, Value::String(String::new()));
                }
                items[index] = Value::String(value);
            }
            continue;
        }

        obj.insert(key, Value::String(value));
    }

    obj
}

/// Split a `name[n]` key into its name and decimal index.
///
/// `name` must be word characters only and `n` a plain decimal within the
/// parser's index cap; anything else is treated as a scalar key.
fn bracket_index(key: &str) -> Option<(&str, usize)> {
    let (name, rest) = key.split_once('[')?;
    let digits = rest.strip_suffix(']')?;

    if name.is_empty() || !name.chars().all(|c| c.is_alphanumeric() || c == '_') {
        return None;
    }
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }

    digits
        .parse()
        .ok()
        .filter(|index| *index <= MAX_PARSED_ARRAY_INDEX)
        .map(|index| (name, index))
}

/// Serialize a nested mapping to a query string.
///
/// Structured values (objects and arrays) recurse with a `prefix[key]`
/// key; scalars are percent-encoded. Booleans render as `true`/`false`,
/// numbers in display form, null as the empty string. Pairs join on `&`.
pub fn stringify(obj: &Map<String, Value>) -> String {
    let mut pairs = Vec::new();
    for (key, value) in obj {
        push_pairs(&mut pairs, key, value);
    }
    pairs.join("&")
}

fn push_pairs(pairs: &mut Vec<String>, key: &str, value: &Value) {
    match value {
        Value::Object(nested) => {
            for (k, v) in nested {
                push_pairs(pairs, &format!("{key}[{k}]"), v);
            }
        }
        Value::Array(items) => {
            for (i, v) in items.iter().enumerate() {
                push_pairs(pairs, &format!("{key}[{i}]"), v);
            }
        }
        Value::Null => pairs.push(format!("{}=", encode(key))),
        Value::Bool(b) => pairs.push(format!("{}={}", encode(key), b)),
        Value::Number(n) => pairs.push(format!("{}={}", encode(key), n)),
        Value::String(s) => pairs.push(format!("{}={}", encode(key), encode(s))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn as_map(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            other => panic!("expected object, got {other:?}"),
        }
    }

    #[test]
    fn parse_plain_pairs() {
        let obj = parse("?a=1&b=two");
        assert_eq!(obj.get("a"), Some(&json!("1")));
        assert_eq!(obj.get("b"), Some(&json!("two")));
    }

    #[test]
    fn parse_strips_leading_hash() {
        let obj = parse("#a=1");
        assert_eq!(obj.get("a"), Some(&json!("1")));
    }

    #[test]
    fn parse_missing_value_is_empty_string() {
        let obj = parse("flag&x=");
        assert_eq!(obj.get("flag"), Some(&json!("")));
        assert_eq!(obj.get("x"), Some(&json!("")));
    }

    #[test]
    fn parse_last_writer_wins() {
        let obj = parse("a=1&a=2");
        assert_eq!(obj.get("a"), Some(&json!("2")));
    }

    #[test]
    fn parse_bracketed_indices_accumulate() {
        let obj = parse("tag[0]=x&tag[2]=z");
        assert_eq!(obj.get("tag"), Some(&json!(["x", "", "z"])));
    }

    #[test]
    fn parse_non_numeric_bracket_is_scalar() {
        let obj = parse("search%5Bvalue%5D=abc");
        assert_eq!(obj.get("search[value]"), Some(&json!("abc")));
    }

    #[test]
    fn parse_oversized_index_is_scalar() {
        let obj = parse("a[999999]=x");
        assert_eq!(obj.get("a[999999]"), Some(&json!("x")));
    }

    #[test]
    fn parse_decodes_plus_and_percent() {
        let obj = parse("q=hello+world%21");
        assert_eq!(obj.get("q"), Some(&json!("hello world!")));
    }

    #[test]
    fn decode_invalid_utf8_returns_original() {
        assert_eq!(decode("%FF%FE"), "%FF%FE");
    }

    #[test]
    fn encode_matches_component_rules() {
        assert_eq!(encode("a b&c=d"), "a%20b%26c%3Dd");
        assert_eq!(encode("safe-_.!~*'()"), "safe-_.!~*'()");
    }

    #[test]
    fn stringify_scalars_and_nesting() {
        let obj = as_map(json!({
            "draw": 1,
            "search": { "value": "a b", "regex": false },
            "order": [{ "column": 2, "dir": "desc" }],
        }));
        assert_eq!(
            stringify(&obj),
            "draw=1&search%5Bvalue%5D=a%20b&search%5Bregex%5D=false&order%5B0%5D%5Bcolumn%5D=2&order%5B0%5D%5Bdir%5D=desc"
        );
    }

    #[test]
    fn stringify_null_is_empty() {
        let obj = as_map(json!({ "a": null }));
        assert_eq!(stringify(&obj), "a=");
    }

    #[test]
    fn round_trip_strings_and_arrays() {
        let obj = as_map(json!({
            "plain": "hello world",
            "punct": "x=y&z?",
            "tags": ["one", "two three", "four"],
        }));
        assert_eq!(parse(&stringify(&obj)), obj);
    }

    #[test]
    fn round_trip_empty_values() {
        let obj = as_map(json!({ "a": "", "b": "x" }));
        assert_eq!(parse(&stringify(&obj)), obj);
    }
}
