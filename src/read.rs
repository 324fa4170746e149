//! Field resolution over request sources.
//!
//! Every accessor probes its sources in order and stops at the first non-empty value. An
//! empty value is treated as absent. Typed accessors parse the value found, a value that
//! fails to parse is also treated as absent, the next source is not consulted.
//!
//! | Accessor | Sources |
//! |---|---|
//! | `get_*` | [`Query`][Source::Query] |
//! | `post_*` | [`Form`][Source::Form] |
//! | `fetch_*` | [`Form`][Source::Form], [`Query`][Source::Query] |
//! | `param_*` | [`Param`][Source::Param] |
//! | `header_*` | [`Header`][Source::Header] |
//! | `cookie_*` | [`Cookie`][Source::Cookie] |
use std::{borrow::Cow, collections::BTreeMap};

use crate::{
    form::{self, FormError},
    source::{RequestSource, Source},
};

/// Cookie holding the access token.
pub const COOKIE_TOKEN_KEY: &str = "access_token";

/// Header holding the access token when the cookie is absent.
pub const HEADER_TOKEN_KEY: &str = "x-token";

macro_rules! accessors {
    ($str:ident $int:ident $float:ident [$($src:ident),*] $doc:literal) => {
        #[doc = concat!("Read string ", $doc, ".")]
        ///
        /// Returns `default`, or an empty string, when absent.
        fn $str(&self, key: &str, default: Option<&str>) -> String {
            match self.read(key, &[$(Source::$src),*]) {
                Some(value) => value.into_owned(),
                None => default.unwrap_or_default().to_owned(),
            }
        }

        #[doc = concat!("Read integer ", $doc, ".")]
        ///
        /// Returns `default`, or `0`, when absent or not an integer.
        fn $int(&self, key: &str, default: Option<i64>) -> i64 {
            self.read_int(key, &[$(Source::$src),*]).unwrap_or(default.unwrap_or(0))
        }

        #[doc = concat!("Read float ", $doc, ".")]
        ///
        /// Returns `default`, or `0.0`, when absent or not a number.
        fn $float(&self, key: &str, default: Option<f64>) -> f64 {
            self.read_float(key, &[$(Source::$src),*]).unwrap_or(default.unwrap_or(0.0))
        }
    };
}

/// Extension trait for reading request fields.
///
/// Implemented for every [`RequestSource`].
pub trait ReadExt: RequestSource {
    /// Probe `sources` in order, returning the first non-empty value of `key`.
    ///
    /// Sources may repeat, an empty list always returns `None`.
    fn read(&self, key: &str, sources: &[Source]) -> Option<Cow<'_, str>> {
        sources.iter().find_map(|src| src.lookup(self, key))
    }

    /// [`read`][ReadExt::read] and parse as base 10 integer.
    fn read_int(&self, key: &str, sources: &[Source]) -> Option<i64> {
        self.read(key, sources)?.parse().ok()
    }

    /// [`read`][ReadExt::read] and parse as 64-bit float.
    ///
    /// Out of range literals such as `1e400` are rejected, `inf` and `nan` spelled out are
    /// accepted.
    fn read_float(&self, key: &str, sources: &[Source]) -> Option<f64> {
        let value = self.read(key, sources)?;
        let float = value.parse::<f64>().ok()?;
        (float.is_finite() || is_non_finite_literal(&value)).then_some(float)
    }

    /// Check whether the value of `key` contains `expect`.
    ///
    /// Returns `None` when `key` is absent.
    fn contains(&self, key: &str, expect: &str, sources: &[Source]) -> Option<bool> {
        self.read(key, sources).map(|value| value.contains(expect))
    }

    accessors!(get_str get_int get_float [Query] "from query string");
    accessors!(post_str post_int post_float [Form] "from form body");
    accessors!(fetch_str fetch_int fetch_float [Form, Query] "from form body, then query string");
    accessors!(param_str param_int param_float [Param] "from route parameter");
    accessors!(header_str header_int header_float [Header] "from request header");
    accessors!(cookie_str cookie_int cookie_float [Cookie] "from cookie");

    /// Access token from [`COOKIE_TOKEN_KEY`] cookie, then [`HEADER_TOKEN_KEY`] header.
    fn token(&self) -> Option<String> {
        Source::Cookie
            .lookup(self, COOKIE_TOKEN_KEY)
            .or_else(|| Source::Header.lookup(self, HEADER_TOKEN_KEY))
            .map(Cow::into_owned)
    }

    /// Decode the whole body as form, joining repeated keys with `,`.
    ///
    /// Unlike other accessors, malformed body is returned as error.
    fn post_all(&self) -> Result<BTreeMap<String, String>, FormError> {
        form::parse(self.body()).map(form::join_values)
    }
}

impl<R: RequestSource + ?Sized> ReadExt for R {}

fn is_non_finite_literal(value: &str) -> bool {
    let value = value.trim_start_matches(['+', '-']);
    ["inf", "infinity", "nan"]
        .iter()
        .any(|e| value.eq_ignore_ascii_case(e))
}
