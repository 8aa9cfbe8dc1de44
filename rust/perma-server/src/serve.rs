use futures_util::TryStreamExt;
use http_body_util::{BodyExt, StreamBody};
use hyper::{
    Response,
    body::Frame,
    header::{self, HeaderValue},
};
use perma_storage::{BlobFetcher, Reference};
use tokio_util::io::ReaderStream;

use crate::{ResponseBody, not_found};

/// Blobs never change, so caches may keep them for as long as they like.
pub const IMMUTABLE: &str = "public, max-age=31536000, immutable";

/// Stream the blob named by `reference` exactly as it is stored.
///
/// The caller is expected to have proven access already; a blob that cannot
/// be fetched at this point is simply not there.
pub async fn serve_raw<Fetcher>(fetcher: &Fetcher, reference: &Reference) -> Response<ResponseBody>
where
    Fetcher: BlobFetcher,
{
    let blob = match fetcher.fetch(reference).await {
        Ok(blob) => blob,
        Err(error) => {
            tracing::warn!(%reference, %error, "Authorized blob could not be fetched");
            return not_found("Blob not found");
        }
    };
    let size = blob.size();

    let body = StreamBody::new(ReaderStream::new(blob).map_ok(Frame::data)).boxed_unsync();
    let mut response = Response::new(body);
    let headers = response.headers_mut();

    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/octet-stream"),
    );
    headers.insert(header::CONTENT_LENGTH, HeaderValue::from(size));
    headers.insert(header::CACHE_CONTROL, HeaderValue::from_static(IMMUTABLE));
    if let Ok(etag) = HeaderValue::from_str(&format!("\"{reference}\"")) {
        headers.insert(header::ETAG, etag);
    }

    response
}
