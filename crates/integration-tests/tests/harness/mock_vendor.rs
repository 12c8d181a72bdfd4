//! Mock image vendor for integration tests
//!
//! Serves both the `OpenAI` Images API and the Hugging Face inference API
//! from one listener, returning a small generated PNG for every call

use std::io::Cursor;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::{Json, Router, routing};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use tokio_util::sync::CancellationToken;

/// Width and height of every image the mock returns
pub const MOCK_IMAGE_SIZE: (u32, u32) = (4, 3);

/// A request the mock received
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub path: String,
    pub authorization: Option<String>,
    pub organization: Option<String>,
    pub body: serde_json::Value,
}

/// Mock vendor that fails selected calls and records the rest
pub struct MockVendor {
    addr: SocketAddr,
    shutdown: CancellationToken,
    state: Arc<MockVendorState>,
}

struct MockVendorState {
    call_count: AtomicU32,
    /// 1-based call numbers answered with `error`
    failing_calls: Vec<u32>,
    error: (StatusCode, serde_json::Value),
    calls: Mutex<Vec<RecordedCall>>,
}

impl MockVendor {
    /// Start a mock that answers every call with an image
    pub async fn start() -> anyhow::Result<Self> {
        Self::start_inner(Vec::new(), (StatusCode::INTERNAL_SERVER_ERROR, serde_json::Value::Null)).await
    }

    /// Start a mock that answers the listed calls with `status` and `body`
    pub async fn start_failing(
        failing_calls: &[u32],
        status: StatusCode,
        body: serde_json::Value,
    ) -> anyhow::Result<Self> {
        Self::start_inner(failing_calls.to_vec(), (status, body)).await
    }

    async fn start_inner(failing_calls: Vec<u32>, error: (StatusCode, serde_json::Value)) -> anyhow::Result<Self> {
        let state = Arc::new(MockVendorState {
            call_count: AtomicU32::new(0),
            failing_calls,
            error,
            calls: Mutex::new(Vec::new()),
        });

        let app = Router::new()
            .route("/v1/images/generations", routing::post(handle_openai))
            .route("/models/{*model}", routing::post(handle_huggingface))
            .with_state(Arc::clone(&state));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let shutdown = CancellationToken::new();
        let shutdown_clone = shutdown.clone();

        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async move {
                    shutdown_clone.cancelled().await;
                })
                .await
                .ok();
        });

        Ok(Self { addr, shutdown, state })
    }

    /// Base URL for the `OpenAI` backend, including `/v1`
    pub fn openai_url(&self) -> String {
        format!("http://{}/v1", self.addr)
    }

    /// Base URL for the Hugging Face backend
    pub fn huggingface_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Number of calls received on any route
    pub fn call_count(&self) -> u32 {
        self.state.call_count.load(Ordering::Relaxed)
    }

    /// Every call received, in order
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.state.calls.lock().unwrap().clone()
    }
}

impl Drop for MockVendor {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

/// Encoded bytes of the image every successful call returns
pub fn mock_image(format: ImageFormat) -> Vec<u8> {
    let (width, height) = MOCK_IMAGE_SIZE;
    let image = DynamicImage::ImageRgb8(RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x * 60) as u8, (y * 80) as u8, 200])
    }));

    let mut bytes = Vec::new();
    image.write_to(&mut Cursor::new(&mut bytes), format).unwrap();
    bytes
}

impl MockVendorState {
    /// Record a call and return the configured error if it should fail
    fn record(&self, path: String, headers: &HeaderMap, body: serde_json::Value) -> Option<Response> {
        let header_value = |name: &str| headers.get(name).and_then(|v| v.to_str().ok()).map(str::to_owned);

        self.calls.lock().unwrap().push(RecordedCall {
            path,
            authorization: header_value(header::AUTHORIZATION.as_str()),
            organization: header_value("openai-organization"),
            body,
        });

        let call = self.call_count.fetch_add(1, Ordering::Relaxed) + 1;
        self.failing_calls.contains(&call).then(|| {
            let (status, body) = &self.error;
            (*status, Json(body.clone())).into_response()
        })
    }
}

async fn handle_openai(
    State(state): State<Arc<MockVendorState>>,
    headers: HeaderMap,
    Json(body): Json<serde_json::Value>,
) -> Response {
    if let Some(error) = state.record("/v1/images/generations".to_owned(), &headers, body) {
        return error;
    }

    Json(serde_json::json!({
        "created": 1_700_000_000,
        "data": [{ "b64_json": BASE64.encode(mock_image(ImageFormat::Png)) }]
    }))
    .into_response()
}

async fn handle_huggingface(
    State(state): State<Arc<MockVendorState>>,
    Path(model): Path<String>,
    headers: HeaderMap,
    Json(body): Json<serde_json::Value>,
) -> Response {
    if let Some(error) = state.record(format!("/models/{model}"), &headers, body) {
        return error;
    }

    ([(header::CONTENT_TYPE, "image/jpeg")], mock_image(ImageFormat::Jpeg)).into_response()
}
