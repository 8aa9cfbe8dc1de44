use std::convert::Infallible;

use bytes::Bytes;
use http_body_util::{BodyExt, Full, combinators::UnsyncBoxBody};
use hyper::{
    Response, StatusCode,
    header::{self, HeaderValue},
};

/// The body of every response the share server sends. Blob contents are
/// streamed, so reading them may fail part way.
pub type ResponseBody = UnsyncBoxBody<Bytes, std::io::Error>;

const UNAUTHORIZED_BODY: &str = "<html><body><h1>Unauthorized</h1>";

/// A body holding `bytes` in full.
pub fn full<B>(bytes: B) -> ResponseBody
where
    B: Into<Bytes>,
{
    Full::new(bytes.into())
        .map_err(|never: Infallible| match never {})
        .boxed_unsync()
}

/// The `WWW-Authenticate` challenge sent with every denial.
pub fn challenge(realm: &str) -> Option<HeaderValue> {
    HeaderValue::from_str(&format!("Basic realm=\"{realm}\"")).ok()
}

/// The one response every denial gets, whatever its cause.
pub fn unauthorized(challenge: &HeaderValue) -> Response<ResponseBody> {
    let mut response = text(StatusCode::UNAUTHORIZED, UNAUTHORIZED_BODY);
    response.headers_mut().insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("text/html; charset=utf-8"),
    );
    response
        .headers_mut()
        .insert(header::WWW_AUTHENTICATE, challenge.clone());
    response
}

/// A `400` carrying a short explanation.
pub fn bad_request(message: &str) -> Response<ResponseBody> {
    text(StatusCode::BAD_REQUEST, message)
}

/// A `404` carrying a short explanation.
pub fn not_found(message: &str) -> Response<ResponseBody> {
    text(StatusCode::NOT_FOUND, message)
}

/// A `500` carrying a short explanation.
pub fn server_error(message: &str) -> Response<ResponseBody> {
    text(StatusCode::INTERNAL_SERVER_ERROR, message)
}

fn text(status: StatusCode, message: &str) -> Response<ResponseBody> {
    let mut response = Response::new(full(format!("{message}\n")));
    *response.status_mut() = status;
    response.headers_mut().insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("text/plain; charset=utf-8"),
    );
    response
}
