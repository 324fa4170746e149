use bytes::Bytes;
use ctxkit::{App, Ctx, ReadExt, Reply, Source};
use http::{Method, Request, StatusCode, header::{CONTENT_TYPE, COOKIE}};
use serde_json::{Value, json};

fn create_test_app() -> App {
    let mut app = App::new();
    let mut route = app.group("/test");
    route.get("/:param", |ctx: &mut Ctx| {
        let param = ctx.param_str("param", None);
        ctx.json(&json!({ "code": 200, "data": { "param": param } }))?;
        Ok(())
    });
    route.get("/page/:page/:size", |ctx: &mut Ctx| {
        let page = ctx.param_int("page", Some(1));
        let size = ctx.param_int("size", Some(20));
        ctx.json(&json!({ "code": 200, "data": { "page": page, "size": size } }))?;
        Ok(())
    });
    route.get("/fetch/:page/:size", |ctx: &mut Ctx| {
        let page = ctx.fetch_int("page", Some(1));
        let size = ctx.fetch_int("size", Some(20));
        ctx.json(&json!({ "code": 200, "data": { "page": page, "size": size } }))?;
        Ok(())
    });
    route.post("/user", |ctx: &mut Ctx| {
        let Some(token) = ctx.token() else {
            ctx.deny("missing token")?;
            return Ok(());
        };
        let name = ctx.fetch_str("name", Some("anonymous"));
        let age = ctx.read_int("age", &[Source::Form, Source::Query, Source::Header]);
        ctx.reply(json!({ "token": token, "name": name, "age": age }), None)?;
        Ok(())
    });
    route.post("/all", |ctx: &mut Ctx| {
        let data = ctx.post_all()?;
        let total = data.len() as i64;
        ctx.reply(Reply::data(&data)?, Some(total))?;
        Ok(())
    });
    app
}

fn request(method: Method, uri: &str) -> http::request::Builder {
    Request::builder().method(method).uri(uri)
}

fn send(app: &App, req: http::request::Builder, body: &'static str) -> (StatusCode, String) {
    let res = app.handle(req.body(Bytes::from_static(body.as_bytes())).unwrap());
    let status = res.status();
    (status, String::from_utf8(res.into_body().to_vec()).unwrap())
}

fn json_body(body: &str) -> Value {
    serde_json::from_str(body).unwrap()
}

#[test]
fn request01_param_str() {
    let app = create_test_app();
    let (status, body) = send(&app, request(Method::GET, "/test/john"), "");
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, r#"{"code":200,"data":{"param":"john"}}"#);
}

#[test]
fn request02_param_int() {
    let app = create_test_app();
    let (status, body) = send(&app, request(Method::GET, "/test/page/3/7"), "");
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, r#"{"code":200,"data":{"page":3,"size":7}}"#);
}

#[test]
fn request03_fetch_int_defaults() {
    let app = create_test_app();
    let (status, body) = send(&app, request(Method::GET, "/test/fetch/3/7"), "");
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, r#"{"code":200,"data":{"page":1,"size":20}}"#);

    let (_, body) = send(&app, request(Method::GET, "/test/fetch/3/7?page=2&size=x"), "");
    assert_eq!(body, r#"{"code":200,"data":{"page":2,"size":20}}"#);
}

#[test]
fn request04_form_over_query() {
    let app = create_test_app();
    let req = request(Method::POST, "/test/user?name=query&age=30")
        .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
        .header(COOKIE, "access_token=tok1")
        .header("x-token", "tok2");
    let (status, body) = send(&app, req, "name=form");
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        json_body(&body),
        json!({ "code": 0, "data": { "token": "tok1", "name": "form", "age": 30 } })
    );

    let req = request(Method::POST, "/test/user")
        .header("x-token", "tok2")
        .header("age", "41");
    let (_, body) = send(&app, req, "");
    assert_eq!(
        json_body(&body),
        json!({ "code": 0, "data": { "token": "tok2", "name": "anonymous", "age": 41 } })
    );
}

#[test]
fn request05_deny_without_token() {
    let app = create_test_app();
    let (status, body) = send(&app, request(Method::POST, "/test/user"), "");
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(json_body(&body), json!({ "code": 403, "message": "missing token" }));
}

#[test]
fn request06_post_all() {
    let app = create_test_app();
    let (status, body) = send(&app, request(Method::POST, "/test/all"), "a=1&a=2&b=3");
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        json_body(&body),
        json!({ "code": 0, "data": { "a": "1,2", "b": "3" }, "total": 2 })
    );

    let (status, _) = send(&app, request(Method::POST, "/test/all"), "a=%zz");
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
