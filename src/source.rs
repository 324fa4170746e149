//! Where a named field can be read from.
use std::borrow::Cow;

/// Origin of a request field.
///
/// A list of sources is probed in order by [`ReadExt::read`][crate::ReadExt::read].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Source {
    /// `Cookie` request header.
    Cookie,
    /// Request header.
    Header,
    /// Route parameter, captured by a `:name` segment.
    Param,
    /// URL query string.
    Query,
    /// `application/x-www-form-urlencoded` or `multipart/form-data` request body.
    Form,
}

impl Source {
    /// Lookup `key` in this source.
    ///
    /// Returns `None` for both absent and empty values.
    pub fn lookup<'a, R>(self, req: &'a R, key: &str) -> Option<Cow<'a, str>>
    where
        R: RequestSource + ?Sized,
    {
        let value = match self {
            Source::Cookie => req.peek_cookie(key).map(Cow::Borrowed),
            Source::Header => req.peek_header(key).map(String::from_utf8_lossy),
            Source::Param => req.param(key).map(Cow::Borrowed),
            Source::Query => req.peek_query(key),
            Source::Form => req.form_value(key),
        };
        value.filter(|e| !e.is_empty())
    }
}

/// Read only view of an inbound request.
///
/// Lookups never fail, a missing or unreadable value is `None`.
pub trait RequestSource {
    /// Raw value of the first header named `key`.
    fn peek_header(&self, key: &str) -> Option<&[u8]>;

    /// Decoded value of the first query argument named `key`.
    fn peek_query(&self, key: &str) -> Option<Cow<'_, str>>;

    /// Value of the cookie named `key`.
    fn peek_cookie(&self, key: &str) -> Option<&str>;

    /// Value of the route parameter named `key`.
    fn param(&self, key: &str) -> Option<&str>;

    /// Decoded value of the first form body field named `key`.
    fn form_value(&self, key: &str) -> Option<Cow<'_, str>>;

    /// Buffered request body.
    fn body(&self) -> &[u8];
}
