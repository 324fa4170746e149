//! `application/x-www-form-urlencoded` decoding.
use http::StatusCode;
use std::{
    collections::{BTreeMap, btree_map::Entry},
    fmt,
};

use crate::response::{IntoResponse, Response};

/// Decode a form body, rejecting malformed input.
///
/// Pairs are returned in the order they appear. Invalid UTF-8 is replaced with
/// `U+FFFD`, whether raw or percent encoded.
pub fn parse(body: &[u8]) -> Result<Vec<(String, String)>, FormError> {
    let query = String::from_utf8_lossy(body);
    for pair in query.split('&') {
        if pair.contains(';') {
            return Err(FormError::Semicolon);
        }
        validate_escapes(pair)?;
    }
    Ok(serde_urlencoded::from_str(&query)?)
}

/// Decode a form body or query string, malformed input yields no pairs.
pub(crate) fn parse_lossy(input: &[u8]) -> Vec<(String, String)> {
    serde_urlencoded::from_bytes(input).unwrap_or_default()
}

/// First value of `key` in a form body or query string.
pub(crate) fn first(input: &[u8], key: &str) -> Option<String> {
    parse_lossy(input)
        .into_iter()
        .find_map(|(k, v)| (k == key).then_some(v))
}

/// Merge repeated keys, joining their values with `,`.
///
/// The join is lossy when a value itself contains a comma.
pub fn join_values(pairs: Vec<(String, String)>) -> BTreeMap<String, String> {
    let mut data = BTreeMap::new();
    for (key, val) in pairs {
        match data.entry(key) {
            Entry::Occupied(mut e) => {
                let joined: &mut String = e.get_mut();
                joined.push(',');
                joined.push_str(&val);
            }
            Entry::Vacant(e) => {
                e.insert(val);
            }
        }
    }
    data
}

fn validate_escapes(pair: &str) -> Result<(), FormError> {
    let bytes = pair.as_bytes();
    let mut i = 0;
    while let Some(offset) = bytes[i..].iter().position(|&b| b == b'%') {
        let at = i + offset;
        match bytes.get(at + 1..at + 3) {
            Some([hi, lo]) if hi.is_ascii_hexdigit() && lo.is_ascii_hexdigit() => i = at + 3,
            _ => return Err(FormError::Escape(pair[at..].chars().take(3).collect())),
        }
    }
    Ok(())
}

// ===== Error =====

/// Error returned when a form body cannot be decoded.
#[derive(Debug)]
pub enum FormError {
    /// `;` used as a pair separator.
    Semicolon,
    /// Invalid percent escape.
    Escape(String),
    Serde(serde_urlencoded::de::Error),
}

impl From<serde_urlencoded::de::Error> for FormError {
    fn from(v: serde_urlencoded::de::Error) -> Self {
        Self::Serde(v)
    }
}

impl std::error::Error for FormError {}

impl fmt::Display for FormError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Semicolon => f.write_str("invalid semicolon separator in form body"),
            Self::Escape(esc) => write!(f, "invalid URL escape {esc:?}"),
            Self::Serde(error) => error.fmt(f),
        }
    }
}

impl IntoResponse for FormError {
    fn into_response(self) -> Response {
        (StatusCode::BAD_REQUEST, self.to_string()).into_response()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn decode(body: &str) -> Result<BTreeMap<String, String>, FormError> {
        parse(body.as_bytes()).map(join_values)
    }

    #[test]
    fn join_repeated_keys() {
        let data = decode("a=1&a=2&b=3").unwrap();
        assert_eq!(data.len(), 2);
        assert_eq!(data["a"], "1,2");
        assert_eq!(data["b"], "3");
    }

    #[test]
    fn join_is_lossy() {
        let data = decode("tag=x%2Cy&tag=z").unwrap();
        assert_eq!(data["tag"], "x,y,z");
    }

    #[test]
    fn percent_and_plus_decoding() {
        let data = decode("name=hello+world&mail=a%40b.c&flag").unwrap();
        assert_eq!(data["name"], "hello world");
        assert_eq!(data["mail"], "a@b.c");
        assert_eq!(data["flag"], "");
    }

    #[test]
    fn empty_body() {
        assert!(decode("").unwrap().is_empty());
    }

    #[test]
    fn malformed_body() {
        assert!(matches!(decode("a=1;b=2"), Err(FormError::Semicolon)));
        assert!(matches!(decode("a=%zz"), Err(FormError::Escape(e)) if e == "%zz"));
        assert!(matches!(decode("a=%4"), Err(FormError::Escape(_))));
    }

    #[test]
    fn invalid_utf8_is_replaced() {
        let raw = parse(b"a=\xff").unwrap();
        let escaped = parse(b"a=%ff").unwrap();
        assert_eq!(raw, vec![("a".to_owned(), "\u{fffd}".to_owned())]);
        assert_eq!(raw, escaped);
    }

    #[test]
    fn lossy_lookup() {
        assert_eq!(first(b"a=1&b=2&a=3", "a").as_deref(), Some("1"));
        assert_eq!(first(b"a=1", "b"), None);
    }
}
