//! `HttpTransport` against a loopback HTTP stub.
//!
//! The stub accepts one connection per scripted response, records the raw
//! request, and answers with `Connection: close` so reqwest opens a fresh
//! connection for every attempt.

mod common;

use common::{init_tracing, ok_body, RecordingNotifier};
use edgequake_ocr::{OcrError, PendingFile, RecognitionConfig, Recognizer};
use serde_json::Value;
use std::sync::{Arc, Mutex};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

struct RawRequest {
    head: String,
    body: String,
}

async fn serve(script: Vec<(u16, String)>) -> (String, Arc<Mutex<Vec<RawRequest>>>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let seen = Arc::new(Mutex::new(Vec::new()));
    let log = seen.clone();

    tokio::spawn(async move {
        for (status, body) in script {
            let (mut sock, _) = listener.accept().await.unwrap();
            let req = read_request(&mut sock).await;
            log.lock().unwrap().push(req);

            let reason = match status {
                200 => "OK",
                429 => "Too Many Requests",
                _ => "Error",
            };
            let reply = format!(
                "HTTP/1.1 {status} {reason}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            sock.write_all(reply.as_bytes()).await.unwrap();
            sock.shutdown().await.ok();
        }
    });

    (format!("http://{addr}/v1beta"), seen)
}

async fn read_request(sock: &mut tokio::net::TcpStream) -> RawRequest {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];
    loop {
        let n = sock.read(&mut chunk).await.unwrap();
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
        if let Some(end) = find_header_end(&buf) {
            let head = String::from_utf8_lossy(&buf[..end]).to_string();
            let len = content_length(&head);
            while buf.len() < end + 4 + len {
                let n = sock.read(&mut chunk).await.unwrap();
                if n == 0 {
                    break;
                }
                buf.extend_from_slice(&chunk[..n]);
            }
            let body = String::from_utf8_lossy(&buf[end + 4..]).to_string();
            return RawRequest { head, body };
        }
    }
    RawRequest {
        head: String::from_utf8_lossy(&buf).to_string(),
        body: String::new(),
    }
}

fn find_header_end(buf: &[u8]) -> Option<usize> {
    buf.windows(4).position(|w| w == b"\r\n\r\n")
}

fn content_length(head: &str) -> usize {
    head.lines()
        .find_map(|l| {
            let (name, value) = l.split_once(':')?;
            name.eq_ignore_ascii_case("content-length")
                .then(|| value.trim().parse().ok())
                .flatten()
        })
        .unwrap_or(0)
}

fn recognizer(base_url: &str) -> Recognizer {
    init_tracing();
    let config = RecognitionConfig::builder()
        .base_url(base_url)
        .model("gemini-test")
        .api_key("test-key")
        .retry_backoff_ms(10)
        .api_timeout_secs(10)
        .notifier(Arc::new(RecordingNotifier::default()))
        .build()
        .unwrap();
    Recognizer::new(config).unwrap()
}

fn file() -> PendingFile {
    PendingFile::from_bytes("page.pdf", "application/pdf", b"%PDF-1.4".to_vec(), 1024).unwrap()
}

#[tokio::test]
async fn posts_to_generate_content_with_key() {
    let (base, seen) = serve(vec![(200, ok_body("Extracted"))]).await;
    let result = recognizer(&base).recognize(&file()).await.unwrap();
    assert_eq!(result.text, "Extracted");

    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 1);
    let request_line = seen[0].head.lines().next().unwrap();
    assert_eq!(
        request_line,
        "POST /v1beta/models/gemini-test:generateContent?key=test-key HTTP/1.1"
    );
    assert!(seen[0]
        .head
        .to_ascii_lowercase()
        .contains("content-type: application/json"));

    let body: Value = serde_json::from_str(&seen[0].body).unwrap();
    let parts = &body["contents"][0]["parts"];
    assert!(parts[0]["text"].as_str().unwrap().contains("OCR"));
    assert_eq!(parts[1]["inlineData"]["mimeType"], "application/pdf");
    assert_eq!(parts[1]["inlineData"]["data"], "JVBERi0xLjQ=");
}

#[tokio::test]
async fn retries_429_over_the_wire() {
    let throttled = r#"{"error":{"code":429,"message":"quota"}}"#.to_string();
    let (base, seen) = serve(vec![
        (429, throttled.clone()),
        (429, throttled),
        (200, ok_body("Third")),
    ])
    .await;

    let result = recognizer(&base).recognize(&file()).await.unwrap();
    assert_eq!(result.text, "Third");
    assert_eq!(result.stats.attempts, 3);

    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 3);
    assert_eq!(seen[0].body, seen[2].body);
}

#[tokio::test]
async fn non_json_success_body_is_malformed() {
    let (base, _) = serve(vec![(200, "<html>proxy</html>".to_string())]).await;
    let err = recognizer(&base).recognize(&file()).await.unwrap_err();
    assert!(matches!(err, OcrError::MalformedResponse { .. }), "got {err:?}");
}

#[tokio::test]
async fn refused_connection_is_network_error_without_key() {
    // Bind then drop to get a port nothing listens on.
    let port = {
        let l = TcpListener::bind("127.0.0.1:0").await.unwrap();
        l.local_addr().unwrap().port()
    };
    let err = recognizer(&format!("http://127.0.0.1:{port}/v1beta"))
        .recognize(&file())
        .await
        .unwrap_err();
    assert!(matches!(err, OcrError::Network { .. }), "got {err:?}");
    assert!(!err.to_string().contains("test-key"));
}
