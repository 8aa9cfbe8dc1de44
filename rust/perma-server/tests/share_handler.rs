use std::time::Duration;

use anyhow::Result;
use bytes::Bytes;
use http_body_util::{BodyExt, Empty};
use hyper::{Method, Request, Response, StatusCode, header};
use perma_schema::{FileBuilder, ShareBuilder};
use perma_server::{ResponseBody, ShareHandler};
use perma_share::{DEFAULT_DENIAL_FLOOR, DenialFloor};
use perma_storage::{BlobReceiver, MeasuredFetcher, MemoryBlobStore, Reference};
use testresult::TestResult;
use tokio::time::Instant;

struct Fixture {
    store: MemoryBlobStore,
    handler: ShareHandler<MeasuredFetcher<MemoryBlobStore>>,
}

impl Fixture {
    fn new() -> Result<Self> {
        let store = MemoryBlobStore::default();
        let handler = ShareHandler::new(
            MeasuredFetcher::new(store.clone()),
            "/share/",
            "perma",
            DenialFloor::default(),
        )?;

        Ok(Self { store, handler })
    }

    async fn put<B>(&self, bytes: B) -> Result<Reference>
    where
        B: Into<Bytes>,
    {
        Ok(self.store.receive(bytes.into()).await?)
    }

    async fn share(&self, target: &Reference, transitive: bool) -> Result<Reference> {
        self.put(ShareBuilder::new(target.clone()).transitive(transitive).build()?)
            .await
    }

    async fn request(&self, method: Method, uri: &str) -> Result<(Response<ResponseBody>, Duration)> {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .body(Empty::<Bytes>::new())?;

        let begin = Instant::now();
        let response = self.handler.handle(request).await;

        Ok((response, begin.elapsed()))
    }

    async fn get(&self, uri: &str) -> Result<(Response<ResponseBody>, Duration)> {
        self.request(Method::GET, uri).await
    }

    fn fetches(&self) -> usize {
        self.handler.gate().fetcher().fetches()
    }
}

async fn body_text(response: Response<ResponseBody>) -> Result<String> {
    let bytes = response.into_body().collect().await?.to_bytes();
    Ok(String::from_utf8(bytes.to_vec())?)
}

#[tokio::test(start_paused = true)]
async fn it_serves_a_blob_through_a_direct_share() -> TestResult {
    let fixture = Fixture::new()?;
    let photo = fixture.put("a private photo").await?;
    let share = fixture.share(&photo, false).await?;

    let (response, elapsed) = fixture
        .get(&format!("/share/{photo}?via={share}"))
        .await?;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(elapsed, Duration::ZERO);
    assert_eq!(
        response.headers()[header::CONTENT_TYPE],
        "application/octet-stream"
    );
    assert_eq!(body_text(response).await?, "a private photo");

    Ok(())
}

#[tokio::test(start_paused = true)]
async fn it_serves_the_share_itself() -> TestResult {
    let fixture = Fixture::new()?;
    let photo = fixture.put("a private photo").await?;
    let share = fixture.share(&photo, false).await?;

    let (response, _) = fixture.get(&format!("/share/{share}")).await?;

    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await?.contains("\"haveref\""));

    Ok(())
}

#[tokio::test(start_paused = true)]
async fn it_serves_through_interior_hops_of_a_transitive_share() -> TestResult {
    let fixture = Fixture::new()?;
    let photo = fixture.put("a private photo").await?;
    let album = fixture.put(format!("album\n{photo}\n")).await?;
    let share = fixture.share(&album, true).await?;

    let (response, elapsed) = fixture
        .get(&format!("/share/{photo}/holiday.jpg?via={share},{album}"))
        .await?;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(elapsed, Duration::ZERO);
    assert_eq!(body_text(response).await?, "a private photo");

    Ok(())
}

#[tokio::test(start_paused = true)]
async fn it_denies_every_failure_alike_after_the_floor() -> TestResult {
    let fixture = Fixture::new()?;
    let photo = fixture.put("a private photo").await?;
    let other = fixture.put("someone else's photo").await?;
    let album = fixture.put(format!("album\n{photo}\n")).await?;
    let direct = fixture.share(&album, false).await?;
    let transitive = fixture.share(&album, true).await?;
    let missing = Reference::of(b"never stored");

    let mut bodies = Vec::new();
    for uri in [
        format!("/share/{photo}"),
        format!("/share/{photo}?via={missing}"),
        format!("/share/{other}?via={transitive}"),
        format!("/share/{photo}?via={direct},{album}"),
        format!("/share/{other}?via={transitive},{album}"),
        format!("/share/{album}?via={direct}&assemble=1"),
    ] {
        let (response, elapsed) = fixture.get(&uri).await?;

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "for {uri}");
        assert!(elapsed >= DEFAULT_DENIAL_FLOOR, "for {uri}");
        assert_eq!(
            response.headers()[header::WWW_AUTHENTICATE],
            "Basic realm=\"perma\""
        );
        bodies.push(body_text(response).await?);
    }

    assert!(bodies.iter().all(|body| body == &bodies[0]));

    Ok(())
}

#[tokio::test(start_paused = true)]
async fn it_answers_malformed_requests_at_once() -> TestResult {
    let fixture = Fixture::new()?;
    let photo = fixture.put("a private photo").await?;
    let share = fixture.share(&photo, false).await?;

    for (method, uri, message) in [
        (
            Method::GET,
            format!("/share/{photo}?via={share},not-a-reference"),
            "Malformed reference in via param\n".to_string(),
        ),
        (
            Method::GET,
            "/share/garbage/file.txt".to_string(),
            "Malformed share path suffix: garbage/file.txt\n".to_string(),
        ),
        (
            Method::POST,
            format!("/share/{photo}?via={share}"),
            "Invalid method\n".to_string(),
        ),
    ] {
        let (response, elapsed) = fixture.request(method, &uri).await?;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "for {uri}");
        assert_eq!(elapsed, Duration::ZERO, "for {uri}");
        assert_eq!(body_text(response).await?, message);
    }

    assert_eq!(fixture.fetches(), 0);

    Ok(())
}

#[tokio::test(start_paused = true)]
async fn it_ignores_requests_outside_its_prefix() -> TestResult {
    let fixture = Fixture::new()?;

    let (response, elapsed) = fixture.get("/elsewhere/file").await?;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(elapsed, Duration::ZERO);

    Ok(())
}

#[tokio::test(start_paused = true)]
async fn it_assembles_files_through_a_transitive_share() -> TestResult {
    let fixture = Fixture::new()?;
    let first = fixture.put("once upon ").await?;
    let second = fixture.put("a time").await?;
    let file = fixture
        .put(
            FileBuilder::new()
                .name("story.txt")
                .part(first, 10)
                .part(second, 6)
                .build()?,
        )
        .await?;
    let transitive = fixture.share(&file, true).await?;
    let direct = fixture.share(&file, false).await?;

    let (response, elapsed) = fixture
        .get(&format!("/share/{file}?via={transitive}&assemble=true"))
        .await?;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(elapsed, Duration::ZERO);
    assert_eq!(response.headers()[header::CONTENT_LENGTH], "16");
    assert_eq!(body_text(response).await?, "once upon a time");

    let (response, elapsed) = fixture
        .get(&format!("/share/{file}?via={direct}&assemble=1"))
        .await?;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(elapsed >= DEFAULT_DENIAL_FLOOR);

    let (response, _) = fixture
        .get(&format!("/share/{file}?via={direct}&assemble=0"))
        .await?;

    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await?.contains("\"story.txt\""));

    Ok(())
}

#[tokio::test(start_paused = true)]
async fn it_stops_fetching_at_the_first_failing_hop() -> TestResult {
    let fixture = Fixture::new()?;
    let photo = fixture.put("a private photo").await?;
    let album = fixture.put("an album that lists nothing").await?;
    let directory = fixture.put(format!("directory\n{album}\n")).await?;
    let share = fixture.share(&directory, true).await?;

    let (response, _) = fixture
        .get(&format!("/share/{photo}?via={share},{directory},{album}"))
        .await?;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(
        fixture.handler.gate().fetcher().history(),
        vec![share, directory, album]
    );

    Ok(())
}
