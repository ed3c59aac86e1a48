//! Shared helpers for integration tests: a scripted transport and a
//! recording notifier.

#![allow(dead_code)]

use async_trait::async_trait;
use edgequake_ocr::pipeline::request::GenerateContentRequest;
use edgequake_ocr::{
    GenerateContentTransport, Notification, NotificationKind, Notifier, OcrError,
    RecognitionConfig, RecognitionProgressCallback, TransportResponse,
};
use serde_json::json;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::Instant;

/// Replays a fixed list of responses and records when each call happened.
pub struct ScriptedTransport {
    responses: Mutex<VecDeque<Result<TransportResponse, OcrError>>>,
    calls: Mutex<Vec<(Instant, GenerateContentRequest)>>,
}

impl ScriptedTransport {
    pub fn new(responses: Vec<Result<TransportResponse, OcrError>>) -> Arc<Self> {
        Arc::new(Self {
            responses: Mutex::new(responses.into()),
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn statuses(statuses: &[(u16, String)]) -> Arc<Self> {
        Self::new(
            statuses
                .iter()
                .map(|(s, b)| Ok(TransportResponse::new(*s, b.clone())))
                .collect(),
        )
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn requests(&self) -> Vec<GenerateContentRequest> {
        self.calls.lock().unwrap().iter().map(|(_, r)| r.clone()).collect()
    }

    /// Gaps between consecutive calls.
    pub fn gaps(&self) -> Vec<Duration> {
        let calls = self.calls.lock().unwrap();
        calls.windows(2).map(|w| w[1].0 - w[0].0).collect()
    }
}

#[async_trait]
impl GenerateContentTransport for ScriptedTransport {
    async fn send(&self, request: &GenerateContentRequest) -> Result<TransportResponse, OcrError> {
        self.calls
            .lock()
            .unwrap()
            .push((Instant::now(), request.clone()));
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(OcrError::Internal("script exhausted".into())))
    }
}

#[derive(Default)]
pub struct RecordingNotifier {
    pub shown: Mutex<Vec<Notification>>,
}

impl RecordingNotifier {
    pub fn messages(&self) -> Vec<Notification> {
        self.shown.lock().unwrap().clone()
    }

    pub fn last(&self) -> Option<Notification> {
        self.shown.lock().unwrap().last().cloned()
    }
}

impl Notifier for RecordingNotifier {
    fn show(&self, message: &str, kind: NotificationKind) {
        self.shown.lock().unwrap().push(Notification {
            message: message.to_string(),
            kind,
        });
    }
}

#[derive(Default)]
pub struct RecordingProgress {
    pub values: Mutex<Vec<u8>>,
    pub retries: Mutex<Vec<(u32, Duration)>>,
    pub finished: Mutex<Option<bool>>,
}

impl RecognitionProgressCallback for RecordingProgress {
    fn on_progress(&self, percent: u8) {
        self.values.lock().unwrap().push(percent);
    }

    fn on_retry(&self, attempt: u32, delay: Duration) {
        self.retries.lock().unwrap().push((attempt, delay));
    }

    fn on_finish(&self, success: bool) {
        *self.finished.lock().unwrap() = Some(success);
    }
}

pub fn ok_body(text: &str) -> String {
    json!({
        "candidates": [{ "content": { "role": "model", "parts": [{ "text": text }] } }]
    })
    .to_string()
}

pub fn rate_limited() -> (u16, String) {
    (
        429,
        json!({ "error": { "code": 429, "message": "Resource exhausted", "status": "RESOURCE_EXHAUSTED" } })
            .to_string(),
    )
}

pub fn config_with(
    transport: Arc<ScriptedTransport>,
    notifier: Arc<RecordingNotifier>,
) -> RecognitionConfig {
    RecognitionConfig::builder()
        .transport(transport)
        .notifier(notifier)
        .build()
        .expect("valid config")
}

/// Route library logs to the test harness; `RUST_LOG=debug` to see them.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_test_writer()
        .try_init();
}
