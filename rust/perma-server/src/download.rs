use std::io;

use bytes::Bytes;
use futures_util::Stream;
use http_body_util::{BodyExt, StreamBody};
use hyper::{
    Response,
    body::Frame,
    header::{self, HeaderValue},
};
use perma_schema::{Blob, File, FilePart};
use perma_storage::{BlobFetcher, Reference};
use tokio_util::io::ReaderStream;

use crate::{IMMUTABLE, ResponseBody, server_error};

/// Stream the contents of the file described by the schema blob `reference`,
/// reassembled from its parts in order.
///
/// Headers are sent before any part is read. A part that is missing, or
/// whose stored size differs from the size the file declares for it, ends
/// the body early with an error so that the client sees a truncated
/// download rather than silently wrong contents.
pub async fn serve_assembled<Fetcher>(fetcher: Fetcher, reference: &Reference) -> Response<ResponseBody>
where
    Fetcher: BlobFetcher + 'static,
{
    let file = match load_file(&fetcher, reference).await {
        Some(file) => file,
        None => return server_error("Can't serve file"),
    };

    tracing::debug!(%reference, size = file.size(), parts = file.parts().len(), "Assembling file");

    let size = file.size();
    let disposition = file.name().and_then(|name| {
        HeaderValue::from_str(&format!(
            "attachment; filename=\"{}\"",
            name.replace(['"', '\\'], "_")
        ))
        .ok()
    });

    let body = StreamBody::new(stream_parts(fetcher, file.parts().to_vec())).boxed_unsync();
    let mut response = Response::new(body);
    let headers = response.headers_mut();

    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/octet-stream"),
    );
    headers.insert(header::CONTENT_LENGTH, HeaderValue::from(size));
    headers.insert(header::CACHE_CONTROL, HeaderValue::from_static(IMMUTABLE));
    if let Some(disposition) = disposition {
        headers.insert(header::CONTENT_DISPOSITION, disposition);
    }

    response
}

async fn load_file<Fetcher>(fetcher: &Fetcher, reference: &Reference) -> Option<File>
where
    Fetcher: BlobFetcher,
{
    let blob = match fetcher.fetch(reference).await {
        Ok(blob) => blob,
        Err(error) => {
            tracing::warn!(%reference, %error, "Can't fetch file to assemble");
            return None;
        }
    };

    let file = match Blob::from_reader(reference, blob).await {
        Ok(blob) => blob.as_file(),
        Err(error) => {
            tracing::warn!(%reference, %error, "Can't decode file to assemble");
            return None;
        }
    };

    if file.is_none() {
        tracing::warn!(%reference, "Blob to assemble is not a well formed file");
    }

    file
}

fn stream_parts<Fetcher>(
    fetcher: Fetcher,
    parts: Vec<FilePart>,
) -> impl Stream<Item = Result<Frame<Bytes>, io::Error>>
where
    Fetcher: BlobFetcher + 'static,
{
    async_stream::try_stream! {
        for part in parts {
            let blob = fetcher
                .fetch(&part.blob_ref)
                .await
                .map_err(|error| io::Error::new(io::ErrorKind::NotFound, error))?;

            if blob.size() != part.size {
                tracing::warn!(
                    reference = %part.blob_ref,
                    declared = part.size,
                    stored = blob.size(),
                    "File part size mismatch"
                );
                Err::<(), _>(io::Error::new(
                    io::ErrorKind::InvalidData,
                    format!("Part {} is {} bytes, expected {}", part.blob_ref, blob.size(), part.size),
                ))?;
            }

            for await chunk in ReaderStream::new(blob) {
                yield Frame::data(chunk?);
            }
        }
    }
}
