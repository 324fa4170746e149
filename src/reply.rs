//! Response shaping.
//!
//! JSON responses are wrapped in an envelope of `{code, data|message, total?}` where `code`
//! is a service code, see [`service_code`].
use bytes::Bytes;
use http::{HeaderValue, StatusCode, header::CONTENT_TYPE};
use serde::Serialize;
use serde_json::{Map, Value};
use std::fmt;

use crate::{
    common::log,
    ctx::Ctx,
    response::{IntoResponse, Response},
};

const APPLICATION_JSON: HeaderValue = HeaderValue::from_static("application/json");

/// Service code reported in the envelope for a response status.
///
/// `200 OK` is reported as `0`, any other status as its number.
pub fn service_code(status: StatusCode) -> u16 {
    match status {
        StatusCode::OK => 0,
        status => status.as_u16(),
    }
}

/// Payload of [`Ctx::reply`].
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    /// The map is the whole response body.
    Body(Map<String, Value>),
    /// The value is wrapped under `data`.
    Data(Value),
}

impl Reply {
    /// Wrap any serializable value under `data`.
    pub fn data<T: Serialize>(data: &T) -> Result<Self, JsonError> {
        Ok(Self::Data(serde_json::to_value(data)?))
    }

    fn into_envelope(self, total: Option<i64>) -> Map<String, Value> {
        let mut body = match self {
            Reply::Body(body) => body,
            Reply::Data(data) => {
                let mut body = Map::new();
                body.insert("code".into(), service_code(StatusCode::OK).into());
                body.insert("data".into(), data);
                body
            }
        };
        if let Some(total) = total {
            body.insert("total".into(), total.into());
        }
        body
    }
}

impl From<Value> for Reply {
    fn from(value: Value) -> Self {
        Self::Data(value)
    }
}

impl From<Map<String, Value>> for Reply {
    fn from(value: Map<String, Value>) -> Self {
        Self::Body(value)
    }
}

fn envelope(code: u16, message: String) -> Value {
    let mut body = Map::new();
    body.insert("code".into(), code.into());
    body.insert("message".into(), message.into());
    Value::Object(body)
}

impl Ctx {
    /// Set response status.
    pub fn set_status(&mut self, status: StatusCode) -> &mut Self {
        *self.response.status_mut() = status;
        self
    }

    /// Set response `Content-Type` from a file extension, e.g. `json` or `.html`.
    ///
    /// Unknown extensions map to `application/octet-stream`.
    pub fn set_type(&mut self, extension: &str, charset: Option<&str>) -> &mut Self {
        let mime = mime_guess::from_ext(extension.trim_start_matches('.')).first_or_octet_stream();
        let value = match charset {
            Some(charset) => HeaderValue::try_from(format!("{mime}; charset={charset}")),
            None => HeaderValue::try_from(mime.essence_str()),
        };
        match value {
            Ok(value) => {
                self.response.headers_mut().insert(CONTENT_TYPE, value);
            }
            Err(_err) => log!("invalid content type for {extension:?}: {_err}"),
        }
        self
    }

    /// Replace response body.
    pub fn send(&mut self, body: impl Into<Bytes>) {
        *self.response.body_mut() = body.into();
    }

    /// Replace response body with a string.
    pub fn send_string(&mut self, body: impl Into<String>) {
        let body: String = body.into();
        self.send(body);
    }

    /// Replace response body with formatted string.
    ///
    /// ```
    /// # let mut ctx = ctxkit::Ctx::new(http::Request::new(bytes::Bytes::new()));
    /// ctx.send_fmt(format_args!("{} items", 3));
    /// ```
    pub fn send_fmt(&mut self, args: fmt::Arguments<'_>) {
        self.send_string(fmt::format(args));
    }

    /// Formatted string body with `application/json` content type.
    pub fn jsonify(&mut self, args: fmt::Arguments<'_>) {
        self.set_type("json", None);
        self.send_fmt(args);
    }

    /// Serialize `value` as response body.
    pub fn json<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), JsonError> {
        let body = serde_json::to_vec(value)?;
        self.response.headers_mut().insert(CONTENT_TYPE, APPLICATION_JSON);
        self.send(body);
        Ok(())
    }

    /// Error envelope `{code, message}` with `200 OK` status.
    pub fn errorf(&mut self, code: u16, args: fmt::Arguments<'_>) -> Result<(), JsonError> {
        self.set_status(StatusCode::OK);
        self.json(&envelope(code, fmt::format(args)))
    }

    /// Set status, and write `data` as JSON body if any.
    pub fn abort(&mut self, status: StatusCode, data: Option<Value>) -> Result<(), JsonError> {
        self.set_status(status);
        match data {
            Some(data) => self.json(&data),
            None => Ok(()),
        }
    }

    /// `403 Forbidden` with `{code, message}` envelope.
    pub fn deny(&mut self, message: impl Into<String>) -> Result<(), JsonError> {
        let status = StatusCode::FORBIDDEN;
        self.abort(status, Some(envelope(service_code(status), message.into())))
    }

    /// Write a JSON reply.
    ///
    /// [`Reply::Data`] is wrapped in `{code, data}`, [`Reply::Body`] is written as is.
    /// `total` is added to the body when given.
    pub fn reply(&mut self, reply: impl Into<Reply>, total: Option<i64>) -> Result<(), JsonError> {
        let body = reply.into().into_envelope(total);
        self.json(&body)
    }
}

// ===== Error =====

/// Error when a response body cannot be serialized.
#[derive(Debug)]
pub struct JsonError(serde_json::Error);

impl From<serde_json::Error> for JsonError {
    fn from(v: serde_json::Error) -> Self {
        Self(v)
    }
}

impl std::error::Error for JsonError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.0)
    }
}

impl fmt::Display for JsonError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "failed to serialize json response: {}", self.0)
    }
}

impl IntoResponse for JsonError {
    fn into_response(self) -> Response {
        log!("{}", self);
        StatusCode::INTERNAL_SERVER_ERROR.into_response()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use serde_json::json;

    fn ctx() -> Ctx {
        Ctx::new(http::Request::new(Bytes::new()))
    }

    fn body(ctx: &Ctx) -> Value {
        serde_json::from_slice(ctx.response().body()).unwrap()
    }

    #[test]
    fn reply_wraps_data() {
        let mut ctx = ctx();
        ctx.reply(json!({ "param": "john" }), None).unwrap();
        assert_eq!(ctx.response().status(), StatusCode::OK);
        assert_eq!(ctx.response().headers()[CONTENT_TYPE], "application/json");
        assert_eq!(body(&ctx), json!({ "code": 0, "data": { "param": "john" } }));
    }

    #[test]
    fn reply_body_with_total() {
        let mut ctx = ctx();
        let mut map = Map::new();
        map.insert("code".into(), json!(200));
        map.insert("items".into(), json!([1, 2]));
        ctx.reply(Reply::Body(map), Some(42)).unwrap();
        assert_eq!(body(&ctx), json!({ "code": 200, "items": [1, 2], "total": 42 }));

        let mut ctx = self::ctx();
        ctx.reply(Reply::data(&vec!["a"]).unwrap(), Some(1)).unwrap();
        assert_eq!(body(&ctx), json!({ "code": 0, "data": ["a"], "total": 1 }));
    }

    #[test]
    fn json_body_is_exact() {
        let mut ctx = ctx();
        ctx.json(&json!({ "code": 200, "data": { "page": 3, "size": 7 } })).unwrap();
        assert_eq!(
            ctx.response().body().as_ref(),
            br#"{"code":200,"data":{"page":3,"size":7}}"#
        );
    }

    #[test]
    fn deny_and_errorf() {
        let mut ctx = ctx();
        ctx.deny("no access").unwrap();
        assert_eq!(ctx.response().status(), StatusCode::FORBIDDEN);
        assert_eq!(body(&ctx), json!({ "code": 403, "message": "no access" }));

        let mut ctx = self::ctx();
        ctx.set_status(StatusCode::BAD_REQUEST);
        ctx.errorf(1001, format_args!("bad field {}", "name")).unwrap();
        assert_eq!(ctx.response().status(), StatusCode::OK);
        assert_eq!(body(&ctx), json!({ "code": 1001, "message": "bad field name" }));
    }

    #[test]
    fn abort_without_data() {
        let mut ctx = ctx();
        ctx.abort(StatusCode::UNAUTHORIZED, None).unwrap();
        assert_eq!(ctx.response().status(), StatusCode::UNAUTHORIZED);
        assert!(ctx.response().body().is_empty());
        assert!(ctx.response().headers().get(CONTENT_TYPE).is_none());
    }

    #[test]
    fn content_type_from_extension() {
        let mut ctx = ctx();
        ctx.set_type("html", Some("utf-8"));
        assert_eq!(ctx.response().headers()[CONTENT_TYPE], "text/html; charset=utf-8");
        ctx.set_type(".json", None);
        assert_eq!(ctx.response().headers()[CONTENT_TYPE], "application/json");
        ctx.set_type("nope-ext", None);
        assert_eq!(ctx.response().headers()[CONTENT_TYPE], "application/octet-stream");
    }

    #[test]
    fn formatted_bodies() {
        let mut ctx = ctx();
        ctx.send_fmt(format_args!("{}-{}", 1, 2));
        assert_eq!(ctx.response().body().as_ref(), b"1-2");

        ctx.jsonify(format_args!("{{\"n\":{}}}", 5));
        assert_eq!(ctx.response().headers()[CONTENT_TYPE], "application/json");
        assert_eq!(body(&ctx), json!({ "n": 5 }));
    }

    #[test]
    fn service_codes() {
        assert_eq!(service_code(StatusCode::OK), 0);
        assert_eq!(service_code(StatusCode::FORBIDDEN), 403);
        assert_eq!(service_code(StatusCode::CREATED), 201);
    }
}
