use bytes::Bytes;
use http::{HeaderValue, StatusCode, header::CONTENT_TYPE};
use std::convert::Infallible;

use super::{IntoResponse, Response};

use macros::res;

// ===== Foreign Implementation =====

res!(Infallible, self => match self { });
res!(StatusCode, self => {
    let mut res = Response::default();
    *res.status_mut() = self;
    res
});

impl<R: IntoResponse> IntoResponse for (StatusCode, R) {
    fn into_response(self) -> Response {
        let mut res = self.1.into_response();
        *res.status_mut() = self.0;
        res
    }
}

impl<T, E> IntoResponse for Result<T, E>
where
    T: IntoResponse,
    E: IntoResponse,
{
    fn into_response(self) -> Response {
        match self {
            Ok(ok) => ok.into_response(),
            Err(err) => err.into_response(),
        }
    }
}

// ===== Body Implementations =====

const TEXT_PLAIN: HeaderValue = HeaderValue::from_static("text/plain; charset=utf-8");

fn text(body: Bytes) -> Response {
    let mut res = Response::new(body);
    res.headers_mut().insert(CONTENT_TYPE, TEXT_PLAIN);
    res
}

res!((), self => Response::default());
res!(Bytes, self => Response::new(self));
res!(Vec<u8>, self => Response::new(self.into()));
res!(Response, self => self);
res!(&'static str, self => text(Bytes::from_static(self.as_bytes())));
res!(String, self => text(Bytes::from(self)));

// ===== Macros =====

mod macros {
    macro_rules! res {
        ($target:ty, $self:ident => $body:expr) => {
            impl IntoResponse for $target {
                fn into_response($self) -> Response {
                    $body
                }
            }
        };
    }

    pub(crate) use res;
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn status_tuple() {
        let res = (StatusCode::FORBIDDEN, "nope").into_response();
        assert_eq!(res.status(), StatusCode::FORBIDDEN);
        assert_eq!(res.headers()[CONTENT_TYPE], "text/plain; charset=utf-8");
        assert_eq!(res.body().as_ref(), b"nope");
    }

    #[test]
    fn result_picks_variant() {
        let ok: Result<&'static str, StatusCode> = Ok("ok");
        assert_eq!(ok.into_response().status(), StatusCode::OK);

        let err: Result<&'static str, StatusCode> = Err(StatusCode::NOT_FOUND);
        let res = err.into_response();
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
        assert!(res.body().is_empty());
    }
}
