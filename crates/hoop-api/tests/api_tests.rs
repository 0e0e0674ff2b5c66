//! API integration tests.

use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use axum::body::{to_bytes, Body};
use axum::extract::ConnectInfo;
use axum::http::{header, Request, StatusCode};
use axum::response::Response;
use axum::Router;
use tempfile::TempDir;
use tower::ServiceExt;

use hoop_api::{create_router, ApiConfig, AppState};
use hoop_media::{FrameDirectory, FrameExtractor, MediaError, MediaResult};

const BOUNDARY: &str = "hoopvisiontestboundary";
const FAKE_JPEG: &[u8] = b"\xff\xd8\xff\xe0fake-jpeg";

/// Writes `frames` placeholder images, in reverse order to exercise sorting.
struct FakeExtractor {
    frames: usize,
}

#[async_trait]
impl FrameExtractor for FakeExtractor {
    async fn extract(&self, input: &Path, dir: &FrameDirectory) -> MediaResult<usize> {
        if !input.exists() {
            return Err(MediaError::FileNotFound(input.to_path_buf()));
        }
        if self.frames == 0 {
            return Err(MediaError::NoFramesExtracted(input.to_path_buf()));
        }
        for i in (1..=self.frames).rev() {
            tokio::fs::write(dir.path().join(format!("frame_{:04}.jpg", i)), FAKE_JPEG).await?;
        }
        Ok(self.frames)
    }
}

struct TestApp {
    router: Router,
    data: TempDir,
}

impl TestApp {
    async fn new(frames: usize) -> Self {
        Self::with_config(frames, |_| {}).await
    }

    async fn with_config(frames: usize, configure: impl FnOnce(&mut ApiConfig)) -> Self {
        let data = TempDir::new().unwrap();
        let mut config = ApiConfig {
            data_dir: data.path().to_path_buf(),
            metrics_enabled: false,
            ..ApiConfig::default()
        };
        configure(&mut config);
        let state = AppState::with_extractor(config, Arc::new(FakeExtractor { frames }));
        state.prepare_dirs().await.unwrap();

        Self {
            router: create_router(state, None),
            data,
        }
    }

    async fn get(&self, uri: &str) -> Response {
        self.router
            .clone()
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap()
    }

    async fn post_multipart(&self, parts: &[String]) -> Response {
        self.send(analyze_request(parts)).await
    }

    async fn send(&self, request: Request<Body>) -> Response {
        self.router.clone().oneshot(request).await.unwrap()
    }

    fn entries(&self, sub: &str) -> Vec<String> {
        std::fs::read_dir(self.data.path().join(sub))
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect()
    }
}

fn multipart_body(parts: &[String]) -> String {
    format!("{}--{}--\r\n", parts.concat(), BOUNDARY)
}

fn analyze_request(parts: &[String]) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/analyze")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(multipart_body(parts)))
        .unwrap()
}

fn file_part(name: &str, filename: &str, content_type: &str, data: &str) -> String {
    format!(
        "--{}\r\nContent-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: {}\r\n\r\n{}\r\n",
        BOUNDARY, name, filename, content_type, data
    )
}

fn video_part() -> String {
    file_part("video", "game.mp4", "video/mp4", "pretend this is h264")
}

async fn body_text(response: Response) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

fn stat(html: &str, label: &str) -> u32 {
    let marker = format!("<b>{}:</b> ", label);
    let start = html.find(&marker).unwrap() + marker.len();
    html[start..]
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect::<String>()
        .parse()
        .unwrap()
}

fn image_sources(html: &str) -> Vec<String> {
    html.split("<img src=\"")
        .skip(1)
        .map(|s| s.split('"').next().unwrap().to_string())
        .collect()
}

#[tokio::test]
async fn test_index_serves_upload_form() {
    let app = TestApp::new(3).await;

    let response = app.get("/").await;
    assert_eq!(response.status(), StatusCode::OK);

    let html = body_text(response).await;
    assert!(html.contains(r#"action="/analyze""#));
    assert!(html.contains(r#"name="video""#));
}

#[tokio::test]
async fn test_health_endpoint() {
    let app = TestApp::new(3).await;

    let response = app.get("/health").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains("healthy"));
}

#[tokio::test]
async fn test_analyze_renders_results() {
    let app = TestApp::new(15).await;

    let response = app.post_multipart(&[video_part()]).await;
    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;

    assert!(stat(&html, "Points") < 80);
    assert!(stat(&html, "Rebounds") < 30);
    assert!(stat(&html, "Assists") < 20);
    assert!(stat(&html, "Turnovers") < 15);
    assert!(stat(&html, "3-Pointers Made") < 20);

    let highlights: Vec<&str> = html
        .split("<div class=\"stat-box\" id=\"highlights\">")
        .nth(1)
        .unwrap()
        .split("</div>")
        .next()
        .unwrap()
        .lines()
        .filter(|l| !l.is_empty())
        .collect();
    assert_eq!(
        highlights,
        [
            "<p>Dunk at 00:23</p>",
            "<p>Deep 3-pointer at 01:15</p>",
            "<p>Chase-down block at 02:07</p>"
        ]
    );

    let sources = image_sources(&html);
    assert_eq!(sources.len(), 10);
    assert!(sources[0].ends_with("/frame_0001.jpg"));
    assert!(sources[9].ends_with("/frame_0010.jpg"));

    // One frame directory with every frame; the upload is gone
    let dirs = app.entries("frames");
    assert_eq!(dirs.len(), 1);
    assert_eq!(app.entries(&format!("frames/{}", dirs[0])).len(), 15);
    assert!(app.entries("uploads").is_empty());
}

#[tokio::test]
async fn test_frames_are_served() {
    let app = TestApp::new(2).await;

    let html = body_text(app.post_multipart(&[video_part()]).await).await;
    let sources = image_sources(&html);
    assert_eq!(sources.len(), 2);

    let response = app.get(&sources[0]).await;
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&bytes[..], FAKE_JPEG);
}

#[tokio::test]
async fn test_concurrent_requests_get_distinct_directories() {
    let app = TestApp::new(3).await;

    let (parts_a, parts_b) = ([video_part()], [video_part()]);
    let (a, b) = tokio::join!(app.post_multipart(&parts_a), app.post_multipart(&parts_b));
    assert_eq!(a.status(), StatusCode::OK);
    assert_eq!(b.status(), StatusCode::OK);

    let dir_of = |html: &str| {
        let sources = image_sources(html);
        let dirs: std::collections::HashSet<String> = sources
            .iter()
            .map(|s| s.split('/').nth(1).unwrap().to_string())
            .collect();
        assert_eq!(dirs.len(), 1, "frames from several directories: {:?}", sources);
        dirs.into_iter().next().unwrap()
    };

    let dir_a = dir_of(&body_text(a).await);
    let dir_b = dir_of(&body_text(b).await);
    assert_ne!(dir_a, dir_b);
    assert_eq!(app.entries("frames").len(), 2);
}

#[tokio::test]
async fn test_missing_video_field_is_rejected() {
    let app = TestApp::new(3).await;

    let response = app
        .post_multipart(&[file_part("clip", "game.mp4", "video/mp4", "data")])
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(body_text(response).await.contains("video"));

    // The server keeps serving
    assert_eq!(app.get("/").await.status(), StatusCode::OK);
    assert!(app.entries("frames").is_empty());
}

#[tokio::test]
async fn test_non_multipart_body_is_rejected() {
    let app = TestApp::new(3).await;

    let response = app
        .send(
            Request::builder()
                .method("POST")
                .uri("/analyze")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from("{}"))
                .unwrap(),
        )
        .await;
    assert!(response.status().is_client_error());
}

#[tokio::test]
async fn test_non_video_upload_is_rejected() {
    let app = TestApp::new(3).await;

    let response = app
        .post_multipart(&[file_part("video", "notes.txt", "text/plain", "hello")])
        .await;
    assert_eq!(response.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
}

#[tokio::test]
async fn test_no_frames_is_unprocessable() {
    let app = TestApp::new(0).await;

    let response = app.post_multipart(&[video_part()]).await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    // Neither the upload nor the empty frame directory is left behind
    assert!(app.entries("frames").is_empty());
    assert!(app.entries("uploads").is_empty());
}

fn is_html(response: &Response) -> bool {
    response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with("text/html"))
}

fn large_video_part() -> String {
    file_part("video", "long.mp4", "video/mp4", &"x".repeat(10 * 1024))
}

#[tokio::test]
async fn test_oversized_streamed_upload_is_rejected() {
    let app = TestApp::with_config(3, |c| c.max_upload_bytes = 1024).await;

    let response = app.post_multipart(&[large_video_part()]).await;
    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    assert!(is_html(&response));

    assert!(app.entries("uploads").is_empty());
    assert!(app.entries("frames").is_empty());
}

#[tokio::test]
async fn test_oversized_declared_upload_is_rejected() {
    let app = TestApp::with_config(3, |c| c.max_upload_bytes = 1024).await;

    let parts = [large_video_part()];
    let mut request = analyze_request(&parts);
    let length = multipart_body(&parts).len();
    request
        .headers_mut()
        .insert(header::CONTENT_LENGTH, length.into());

    let response = app.send(request).await;
    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    assert!(is_html(&response));
    assert!(body_text(response).await.contains("413"));
    assert!(app.entries("uploads").is_empty());
}

#[tokio::test]
async fn test_small_upload_under_limit_is_accepted() {
    let app = TestApp::with_config(3, |c| c.max_upload_bytes = 4096).await;

    let parts = [video_part()];
    let mut request = analyze_request(&parts);
    let length = multipart_body(&parts).len();
    request
        .headers_mut()
        .insert(header::CONTENT_LENGTH, length.into());

    assert_eq!(app.send(request).await.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_rate_limited_client_gets_429() {
    let app = TestApp::with_config(3, |c| c.analyze_rate_limit_rps = 1).await;
    let peer = SocketAddr::from(([192, 0, 2, 10], 51000));

    let from_peer = |forwarded_for: &str| {
        let mut request = analyze_request(&[video_part()]);
        request.extensions_mut().insert(ConnectInfo(peer));
        request
            .headers_mut()
            .insert("x-forwarded-for", forwarded_for.parse().unwrap());
        request
    };

    let first = app.send(from_peer("203.0.113.1")).await;
    assert_eq!(first.status(), StatusCode::OK);

    // A forged forwarding header does not buy a fresh budget
    let second = app.send(from_peer("203.0.113.2")).await;
    assert_eq!(second.status(), StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(second.headers()["retry-after"], "1");
    assert!(is_html(&second));

    // Only one request got as far as extraction
    assert_eq!(app.entries("frames").len(), 1);
}

#[tokio::test]
async fn test_trusted_proxy_headers_key_the_rate_limit() {
    let app = TestApp::with_config(3, |c| {
        c.analyze_rate_limit_rps = 1;
        c.trust_proxy_headers = true;
    })
    .await;

    for client in ["203.0.113.1", "203.0.113.2"] {
        let mut request = analyze_request(&[video_part()]);
        request
            .headers_mut()
            .insert("x-forwarded-for", client.parse().unwrap());
        assert_eq!(app.send(request).await.status(), StatusCode::OK);
    }
}

#[tokio::test]
async fn test_files_outside_frames_root_are_not_served() {
    let app = TestApp::new(3).await;
    std::fs::write(app.data.path().join("app.js"), "secret").unwrap();
    std::fs::write(app.data.path().join("uploads").join("leftover"), "secret").unwrap();

    for uri in ["/app.js", "/Cargo.toml", "/uploads/leftover", "/../app.js"] {
        let response = app.get(uri).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND, "{} was served", uri);
    }
}

#[tokio::test]
async fn test_security_and_request_id_headers() {
    let app = TestApp::new(3).await;

    let response = app
        .send(
            Request::builder()
                .uri("/")
                .header("x-request-id", "req-123")
                .body(Body::empty())
                .unwrap(),
        )
        .await;

    let headers = response.headers();
    assert_eq!(headers["x-request-id"], "req-123");
    assert_eq!(headers["x-content-type-options"], "nosniff");
    assert_eq!(headers["x-frame-options"], "DENY");
}

#[tokio::test]
#[ignore = "requires ffmpeg"]
async fn test_analyze_with_ffmpeg() {
    let data = TempDir::new().unwrap();
    let config = ApiConfig {
        data_dir: data.path().to_path_buf(),
        metrics_enabled: false,
        ..ApiConfig::default()
    };
    let state = AppState::new(config);
    state.prepare_dirs().await.unwrap();
    let router = create_router(state, None);

    let clip = data.path().join("clip.mp4");
    let make_clip = hoop_media::FfmpegCommand::new("testsrc=duration=4:size=160x120:rate=10", &clip)
        .input_arg("-f")
        .input_arg("lavfi");
    hoop_media::FfmpegRunner::new().run(&make_clip).await.unwrap();

    let mut body = format!(
        "--{}\r\nContent-Disposition: form-data; name=\"video\"; filename=\"clip.mp4\"\r\nContent-Type: video/mp4\r\n\r\n",
        BOUNDARY
    )
    .into_bytes();
    body.extend(std::fs::read(&clip).unwrap());
    body.extend(format!("\r\n--{}--\r\n", BOUNDARY).into_bytes());

    let response = router
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/analyze")
                .header(
                    header::CONTENT_TYPE,
                    format!("multipart/form-data; boundary={}", BOUNDARY),
                )
                .body(Body::from(body))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let sources = image_sources(&body_text(response).await);
    assert!((1..=10).contains(&sources.len()));
}
