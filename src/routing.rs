//! Request routing.
//!
//! Routing decides which handler should handle current request.
//!
//! ```
//! use ctxkit::{App, Ctx, ReadExt};
//!
//! fn user(ctx: &mut Ctx) -> ctxkit::Result<()> {
//!     let name = ctx.param_str("name", None);
//!     ctx.reply(serde_json::json!({ "name": name }), None)?;
//!     Ok(())
//! }
//!
//! let mut app = App::new();
//! app.group("/users").get("/:name", user);
//! ```
//!
//! Part of the path can be prefixed with `:` to denote its a parameter, the value is
//! available with [`Source::Param`][crate::Source::Param] accessors.
use bytes::Bytes;
use http::{Method, Request, StatusCode};
use std::fmt;

use crate::{
    common::debug,
    config::Config,
    ctx::Ctx,
    response::{IntoResponse, Response, Result},
};

mod matcher;

use matcher::Path;

/// Request handler.
pub type Handler = Box<dyn Fn(&mut Ctx) -> Result<()> + Send + Sync + 'static>;

struct Route {
    method: Method,
    path: Path,
    handler: Handler,
}

/// Routes and configuration.
pub struct App {
    routes: Vec<Route>,
    config: Config,
}

impl App {
    /// Create new `App` with default [`Config`].
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    pub fn with_config(config: Config) -> Self {
        Self { routes: Vec::new(), config }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Register new route.
    pub fn route<F>(&mut self, method: Method, path: &str, handler: F) -> &mut Self
    where
        F: Fn(&mut Ctx) -> Result<()> + Send + Sync + 'static,
    {
        self.routes.push(Route {
            method,
            path: Path::new(path.to_owned()),
            handler: Box::new(handler),
        });
        self
    }

    /// Register routes under `prefix`.
    pub fn group(&mut self, prefix: &str) -> Group<'_> {
        Group { app: self, prefix: prefix.trim_end_matches('/').to_owned() }
    }

    /// Dispatch request to the first matching route.
    ///
    /// Responds with `404 Not Found` when no path matches, and `405 Method Not Allowed` when
    /// a path matches with another method.
    pub fn handle(&self, req: Request<Bytes>) -> Response {
        let mut allowed = false;

        for route in &self.routes {
            let Some(params) = route.path.matches(req.uri().path()) else {
                continue;
            };
            if *req.method() != route.method {
                allowed = true;
                continue;
            }

            debug!("{} {} matched {}", req.method(), req.uri().path(), route.path.value());

            let mut ctx = Ctx::with_params(req, params);
            return match (route.handler)(&mut ctx) {
                Ok(()) => ctx.into_response(),
                Err(err) => {
                    debug!("handler returns error: {err}");
                    err.into_response()
                }
            };
        }

        debug!("{} {} unmatched", req.method(), req.uri().path());

        match allowed {
            true => StatusCode::METHOD_NOT_ALLOWED.into_response(),
            false => StatusCode::NOT_FOUND.into_response(),
        }
    }
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for App {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("App")
            .field("routes", &self.routes.iter().map(|e| (&e.method, e.path.value())).collect::<Vec<_>>())
            .field("config", &self.config)
            .finish()
    }
}

/// Routes builder sharing a path prefix.
pub struct Group<'a> {
    app: &'a mut App,
    prefix: String,
}

impl Group<'_> {
    /// Register new route, `path` is appended to the group prefix.
    pub fn route<F>(&mut self, method: Method, path: &str, handler: F) -> &mut Self
    where
        F: Fn(&mut Ctx) -> Result<()> + Send + Sync + 'static,
    {
        let path = format!("{}{path}", self.prefix);
        self.app.route(method, &path, handler);
        self
    }

    /// Nest another group.
    pub fn group(&mut self, prefix: &str) -> Group<'_> {
        let prefix = format!("{}{}", self.prefix, prefix.trim_end_matches('/'));
        Group { app: &mut *self.app, prefix }
    }
}

impl fmt::Debug for Group<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Group").field("prefix", &self.prefix).finish()
    }
}

macro_rules! fn_router {
    ($name:ident $method:ident $doc:literal) => {
        impl App {
            #[doc = $doc]
            pub fn $name<F>(&mut self, path: &str, handler: F) -> &mut Self
            where
                F: Fn(&mut Ctx) -> Result<()> + Send + Sync + 'static,
            {
                self.route(Method::$method, path, handler)
            }
        }

        impl Group<'_> {
            #[doc = $doc]
            pub fn $name<F>(&mut self, path: &str, handler: F) -> &mut Self
            where
                F: Fn(&mut Ctx) -> Result<()> + Send + Sync + 'static,
            {
                self.route(Method::$method, path, handler)
            }
        }
    };
}

fn_router!(get GET "Register GET route.");
fn_router!(post POST "Register POST route.");
fn_router!(put PUT "Register PUT route.");
fn_router!(patch PATCH "Register PATCH route.");
fn_router!(delete DELETE "Register DELETE route.");

#[cfg(test)]
mod test {
    use super::*;
    use crate::form::FormError;

    fn ok(ctx: &mut Ctx) -> Result<()> {
        ctx.send_string("ok");
        Ok(())
    }

    fn request(method: Method, uri: &str) -> Request<Bytes> {
        Request::builder().method(method).uri(uri).body(Bytes::new()).unwrap()
    }

    #[test]
    fn group_prefix() {
        let mut app = App::new();
        app.group("/api/").group("/v1").get("/ping", ok);

        let res = app.handle(request(Method::GET, "/api/v1/ping"));
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(res.body().as_ref(), b"ok");
    }

    #[test]
    fn unmatched_routes() {
        let mut app = App::new();
        app.get("/ping", ok);

        assert_eq!(app.handle(request(Method::POST, "/ping")).status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(app.handle(request(Method::GET, "/pong")).status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn first_method_match_wins() {
        let mut app = App::new();
        app.get("/item/:id", ok).post("/item/:id", |ctx: &mut Ctx| {
            ctx.set_status(StatusCode::CREATED);
            Ok(())
        });

        assert_eq!(app.handle(request(Method::POST, "/item/1")).status(), StatusCode::CREATED);
        assert_eq!(app.handle(request(Method::GET, "/item/1")).status(), StatusCode::OK);
    }

    #[test]
    fn handler_error_response() {
        let mut app = App::new();
        app.post("/form", |_: &mut Ctx| Err(FormError::Semicolon.into()));

        let res = app.handle(request(Method::POST, "/form"));
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }
}
