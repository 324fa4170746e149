//! Request context helpers.
//!
//! [`Ctx`] wraps one buffered HTTP request together with the response being built for it.
//! Fields are read through [`ReadExt`], which probes cookies, headers, route parameters,
//! query string or form body in a fixed order and falls back to a caller default:
//!
//! ```
//! use ctxkit::{App, Ctx, ReadExt};
//!
//! fn page(ctx: &mut Ctx) -> ctxkit::Result<()> {
//!     let page = ctx.fetch_int("page", Some(1));
//!     let size = ctx.fetch_int("size", Some(20));
//!     ctx.reply(serde_json::json!({ "page": page, "size": size }), None)?;
//!     Ok(())
//! }
//!
//! let mut app = App::new();
//! app.get("/page", page);
//! ```
#![warn(missing_debug_implementations)]

mod common;

pub mod source;
pub mod read;
pub mod form;
pub mod multipart;
pub mod ctx;
pub mod reply;
pub mod response;
pub mod routing;
pub mod config;

#[cfg(feature = "tokio")]
mod rt;

pub use source::{RequestSource, Source};
pub use read::{COOKIE_TOKEN_KEY, HEADER_TOKEN_KEY, ReadExt};
pub use form::FormError;
pub use multipart::MultipartForm;
pub use ctx::{Ctx, Params};
pub use reply::{JsonError, Reply, service_code};
pub use response::{Error, IntoResponse, Response, Result};
pub use routing::{App, Group};
pub use config::Config;

#[cfg(feature = "tokio")]
pub use rt::listen;
