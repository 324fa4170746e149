//! `multipart/form-data` text fields.
//!
//! Only values are decoded, parts carrying a `filename` are skipped.
use nom::{
    IResult,
    branch::alt,
    bytes::complete::{is_not, take_until},
    character::complete::{char, multispace0},
    multi::many0,
    sequence::{delimited, pair, preceded, separated_pair},
};
use std::str;

use crate::common::debug;

const MULTIPART_FORM_DATA: &str = "multipart/form-data";

/// Text fields of a buffered `multipart/form-data` body, in order of appearance.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MultipartForm {
    values: Vec<(String, String)>,
}

impl MultipartForm {
    /// Decode `body` delimited by `boundary`.
    ///
    /// Decoding stops at the first malformed part, fields before it are kept.
    pub fn parse(body: &[u8], boundary: &str) -> Self {
        let delimiter = format!("--{boundary}");
        let delimiter = delimiter.as_bytes();
        let mut values = Vec::new();

        let Some(start) = find(body, delimiter) else {
            return Self { values };
        };
        let mut rest = &body[start + delimiter.len()..];

        while !rest.starts_with(b"--") {
            let Some(end) = find(rest, delimiter) else {
                debug!("multipart body without closing delimiter");
                break;
            };
            let part = &rest[..end];
            rest = &rest[end + delimiter.len()..];

            let part = part.strip_prefix(b"\r\n").unwrap_or(part);
            let part = part.strip_suffix(b"\r\n").unwrap_or(part);
            if let Some(field) = field(part) {
                values.push(field);
            }
        }

        Self { values }
    }

    /// First value of `key`.
    pub fn peek<'a>(&'a self, key: &'a str) -> Option<&'a str> {
        self.values(key).next()
    }

    /// All values of `key`.
    pub fn values<'a>(&'a self, key: &'a str) -> impl Iterator<Item = &'a str> {
        self.values
            .iter()
            .filter_map(move |(k, v)| (k == key).then_some(v.as_str()))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Boundary of a `multipart/form-data` content type.
pub(crate) fn boundary(content_type: &str) -> Option<&str> {
    let (_, (essence, params)) = header_value(content_type.trim()).ok()?;
    if !essence.trim().eq_ignore_ascii_case(MULTIPART_FORM_DATA) {
        return None;
    }
    params
        .into_iter()
        .find_map(|(k, v)| (k.eq_ignore_ascii_case("boundary") && !v.is_empty()).then_some(v))
}

fn field(part: &[u8]) -> Option<(String, String)> {
    let at = find(part, b"\r\n\r\n")?;
    let head = str::from_utf8(&part[..at]).ok()?;
    let body = &part[at + 4..];

    let mut name = None;
    for line in head.split("\r\n") {
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        if !key.trim().eq_ignore_ascii_case("content-disposition") {
            continue;
        }
        let (_, (kind, params)) = header_value(value.trim()).ok()?;
        if !kind.trim().eq_ignore_ascii_case("form-data") {
            return None;
        }
        if params.iter().any(|(k, _)| k.eq_ignore_ascii_case("filename")) {
            return None;
        }
        name = params
            .into_iter()
            .find_map(|(k, v)| k.eq_ignore_ascii_case("name").then_some(v));
    }

    Some((name?.to_owned(), String::from_utf8_lossy(body).into_owned()))
}

/// `value; key=param; key="quoted param"`
fn header_value(input: &str) -> IResult<&str, (&str, Vec<(&str, &str)>)> {
    pair(is_not(";"), many0(preceded(multispace0, param)))(input)
}

fn param(input: &str) -> IResult<&str, (&str, &str)> {
    preceded(
        pair(char(';'), multispace0),
        separated_pair(
            is_not("=; \t"),
            char('='),
            alt((delimited(char('"'), take_until("\""), char('"')), is_not("; \t"))),
        ),
    )(input)
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|e| e == needle)
}
