//! Model interaction: send the request, retry on throttling, parse the answer.
//!
//! This module is intentionally thin. The request body is built in
//! [`crate::pipeline::request`], the wait times come from
//! [`crate::pipeline::backoff`], and the transport is injected.
//!
//! ## Retry Strategy
//!
//! Only HTTP 429 is retried. Every attempt reissues the identical request,
//! which is safe because text extraction has no side effects on the remote
//! side. Any other non-2xx status, a transport error, or an unparseable 2xx
//! body ends the run at once.

use crate::error::OcrError;
use crate::pipeline::backoff::RetryPolicy;
use crate::pipeline::request::{extract_text, failure_detail, GenerateContentRequest};
use crate::pipeline::transport::GenerateContentTransport;
use crate::progress::RecognitionProgressCallback;
use tokio::time::sleep;
use tracing::{debug, warn};

/// Text returned by a successful exchange plus the attempt it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitOutcome {
    /// Untrimmed text from `candidates[0].content.parts[0].text`.
    pub text: String,
    /// 1-indexed attempt that succeeded.
    pub attempts: u32,
}

/// Send `request` until it succeeds, fails terminally, or attempts run out.
pub async fn submit_with_retry(
    transport: &dyn GenerateContentTransport,
    request: &GenerateContentRequest,
    policy: &RetryPolicy,
    progress: Option<&dyn RecognitionProgressCallback>,
) -> Result<SubmitOutcome, OcrError> {
    let max_attempts = policy.max_attempts.max(1);

    for attempt in 0..max_attempts {
        if let Some(cb) = progress {
            cb.on_attempt(attempt + 1, max_attempts);
        }

        match submit_once(transport, request).await {
            Ok(text) => {
                debug!("Attempt {}/{} succeeded", attempt + 1, max_attempts);
                return Ok(SubmitOutcome {
                    text,
                    attempts: attempt + 1,
                });
            }
            Err(e) if e.is_retryable() => match policy.delay_after(attempt) {
                Some(delay) => {
                    warn!(
                        "Rate limited: retry {}/{} after {}ms",
                        attempt + 2,
                        max_attempts,
                        delay.as_millis()
                    );
                    if let Some(cb) = progress {
                        cb.on_retry(attempt + 1, delay);
                    }
                    sleep(delay).await;
                }
                // Last attempt, or the next wait is too large to represent.
                None => {
                    warn!("Rate limited on attempt {}/{}; giving up", attempt + 1, max_attempts);
                    return Err(OcrError::RetryExhausted {
                        attempts: attempt + 1,
                    });
                }
            },
            Err(e) => {
                warn!("Attempt {} failed — {}", attempt + 1, e);
                return Err(e);
            }
        }
    }

    Err(OcrError::RetryExhausted {
        attempts: max_attempts,
    })
}

/// One exchange, with the status mapped onto the error taxonomy.
async fn submit_once(
    transport: &dyn GenerateContentTransport,
    request: &GenerateContentRequest,
) -> Result<String, OcrError> {
    let response = transport.send(request).await?;

    if response.status == 429 {
        return Err(OcrError::RateLimited);
    }
    if !response.is_success() {
        return Err(OcrError::RequestFailure {
            status: response.status,
            detail: failure_detail(&response.body),
        });
    }
    extract_text(&response.body)
}
