//! Entrypoint of the server
use http::{Request, StatusCode};
use http_body_util::{BodyExt, Full, LengthLimitError, Limited};
use hyper::{body::Incoming, server::conn::http1, service::service_fn};
use hyper_util::rt::TokioIo;
use std::{convert::Infallible, fmt, io, sync::Arc};
use tokio::net::{TcpListener, ToSocketAddrs};

use crate::{
    common::log,
    response::{IntoResponse, Response},
    routing::App,
};

impl App {
    /// Entrypoint to run the server
    pub fn listen(
        self,
        addr: impl ToSocketAddrs + fmt::Display + Clone,
    ) -> impl Future<Output = io::Result<()>> {
        listen(addr, self)
    }

    /// Buffer request body up to [`Config::body_limit`][crate::Config::body_limit], then
    /// [`handle`][App::handle] it.
    pub async fn serve(&self, req: Request<Incoming>) -> Response {
        let (parts, body) = req.into_parts();
        let body = match Limited::new(body, self.config().body_limit).collect().await {
            Ok(ok) => ok.to_bytes(),
            Err(err) if err.is::<LengthLimitError>() => {
                return StatusCode::PAYLOAD_TOO_LARGE.into_response();
            }
            Err(_err) => {
                log!("failed to read request body: {_err}");
                return StatusCode::BAD_REQUEST.into_response();
            }
        };
        self.handle(Request::from_parts(parts, body))
    }
}

/// Start server using hyper and tokio.
pub async fn listen(addr: impl ToSocketAddrs + fmt::Display + Clone, app: App) -> io::Result<()> {
    let tcp = match TcpListener::bind(addr.clone()).await {
        Ok(ok) => ok,
        Err(err) => {
            return Err(io::Error::new(
                err.kind(),
                format!("failed to bind \"{addr}\" :{err}"),
            ));
        }
    };

    let app = Arc::new(app);

    loop {
        let app = app.clone();
        match tcp.accept().await {
            Ok((stream, _)) => {
                tokio::spawn(async move {
                    let service = service_fn(move |req: Request<Incoming>| {
                        let app = app.clone();
                        async move { Ok::<_, Infallible>(app.serve(req).await.map(Full::new)) }
                    });
                    if let Err(_err) = http1::Builder::new()
                        .serve_connection(TokioIo::new(stream), service)
                        .await
                    {
                        log!("{_err}");
                    }
                });
            }
            Err(_err) => {
                log!("failed to connect peer: {_err}");
            }
        }
    }
}
