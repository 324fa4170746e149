//! Per request context.
use bytes::Bytes;
use http::{
    HeaderMap, HeaderValue, Method, Request, Uri,
    header::{CONTENT_TYPE, COOKIE},
    request,
};
use std::borrow::Cow;

use crate::{
    form,
    multipart::{self, MultipartForm},
    response::{IntoResponse, Response},
    source::RequestSource,
};

const WWW_FORM_URLENCODED: &str = "application/x-www-form-urlencoded";

/// A buffered request and the response being built for it.
///
/// Handlers receive `&mut Ctx`, read request fields with [`ReadExt`][crate::ReadExt] and
/// write the response with the shaping helpers, see [`Ctx::json`] and [`Ctx::reply`].
#[derive(Debug)]
pub struct Ctx {
    parts: request::Parts,
    body: Bytes,
    params: Params,
    pub(crate) response: Response,
}

impl Ctx {
    /// Create context without route parameters.
    pub fn new(req: Request<Bytes>) -> Self {
        Self::with_params(req, Params::default())
    }

    /// Create context with route parameters captured by the router.
    pub fn with_params(req: Request<Bytes>, params: Params) -> Self {
        let (parts, body) = req.into_parts();
        Self {
            parts,
            body,
            params,
            response: Response::default(),
        }
    }

    /// Request method.
    pub fn method(&self) -> &Method {
        &self.parts.method
    }

    /// Request URI.
    pub fn uri(&self) -> &Uri {
        &self.parts.uri
    }

    /// Request headers.
    pub fn headers(&self) -> &HeaderMap {
        &self.parts.headers
    }

    /// Request head.
    pub fn parts(&self) -> &request::Parts {
        &self.parts
    }

    /// Matched route parameters.
    pub fn params(&self) -> &Params {
        &self.params
    }

    /// Response written so far.
    pub fn response(&self) -> &Response {
        &self.response
    }

    pub fn response_mut(&mut self) -> &mut Response {
        &mut self.response
    }

    /// Text fields of a `multipart/form-data` body.
    ///
    /// Returns `None` when the request is not multipart or has no boundary.
    pub fn multipart(&self) -> Option<MultipartForm> {
        let boundary = multipart::boundary(self.content_type()?)?;
        Some(MultipartForm::parse(&self.body, boundary))
    }

    fn content_type(&self) -> Option<&str> {
        self.parts.headers.get(CONTENT_TYPE)?.to_str().ok()
    }

    fn is_urlencoded(&self) -> bool {
        self.content_type()
            .and_then(|e| e.split(';').next())
            .is_some_and(|e| e.trim().eq_ignore_ascii_case(WWW_FORM_URLENCODED))
    }
}

impl RequestSource for Ctx {
    fn peek_header(&self, key: &str) -> Option<&[u8]> {
        self.parts.headers.get(key).map(HeaderValue::as_bytes)
    }

    fn peek_query(&self, key: &str) -> Option<Cow<'_, str>> {
        let query = self.parts.uri.query()?;
        form::first(query.as_bytes(), key).map(Cow::Owned)
    }

    fn peek_cookie(&self, key: &str) -> Option<&str> {
        cookie(&self.parts.headers, key)
    }

    fn param(&self, key: &str) -> Option<&str> {
        self.params.get(key)
    }

    fn form_value(&self, key: &str) -> Option<Cow<'_, str>> {
        if self.is_urlencoded() {
            return form::first(&self.body, key).map(Cow::Owned);
        }
        let form = self.multipart()?;
        form.peek(key).map(|e| Cow::Owned(e.to_owned()))
    }

    fn body(&self) -> &[u8] {
        &self.body
    }
}

impl IntoResponse for Ctx {
    fn into_response(self) -> Response {
        self.response
    }
}

fn cookie<'a>(headers: &'a HeaderMap, key: &str) -> Option<&'a str> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|e| e.to_str().ok())
        .flat_map(|e| e.split(';'))
        .find_map(|pair| {
            let (name, value) = pair.trim().split_once('=')?;
            (name.trim() == key).then(|| value.trim().trim_matches('"'))
        })
}

// ===== Params =====

/// Route parameters, in path order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Params {
    inner: Vec<(String, String)>,
}

impl Params {
    /// Value of the parameter declared as `:key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.inner
            .iter()
            .find_map(|(k, v)| (k == key).then_some(v.as_str()))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.inner.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub(crate) fn push(&mut self, key: &str, value: &str) {
        self.inner.push((key.to_owned(), value.to_owned()));
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Params {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self {
            inner: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}
