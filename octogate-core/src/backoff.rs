//! Rate-limit exhaustion handling for upstream responses.
//!
//! GitHub signals quota exhaustion with a 403 whose body carries the
//! rate-limit envelope. Rather than relay the failure immediately, the
//! proxy stalls the in-flight request task until the upstream window
//! resets, trading latency for a chance that the caller's next request
//! succeeds. The buffered body is handed back untouched so the client
//! still receives the original 403 bytes after the stall.
//!
//! A 403 with budget remaining (secondary abuse limits, plain permission
//! errors carrying an envelope) passes through without sleeping.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use hyper::StatusCode;
use tracing::warn;

use crate::error::OctogateError;
use crate::types::{RateBudget, RateLimitEnvelope};

/// Decodes the rate-limit envelope out of a buffered 403 body.
///
/// Fails with [`OctogateError::EnvelopeDecode`] when the body does not
/// match the expected `{"resources":{"core":{..}}}` shape.
pub fn decode_rate_envelope(body: &[u8]) -> Result<RateBudget, OctogateError> {
    let envelope: RateLimitEnvelope = serde_json::from_slice(body)?;
    Ok(envelope.resources.core)
}

/// Time left until the budget's reset instant, zero if already past.
pub fn time_until_reset(budget: &RateBudget, now: SystemTime) -> Duration {
    let reset_at = UNIX_EPOCH + Duration::from_secs(budget.reset.max(0) as u64);
    reset_at.duration_since(now).unwrap_or(Duration::ZERO)
}

/// Inspects a buffered upstream response for rate-limit exhaustion and
/// stalls the current task until the reset instant when the budget is
/// spent.
///
/// Anything other than a 403 passes through untouched. A 403 whose body
/// is not the rate-limit envelope is an error; the dispatcher aborts the
/// relay. The stall, once entered, runs to completion: it deliberately
/// does not observe request cancellation.
pub async fn apply_rate_limit_backoff(
    status: StatusCode,
    body: &[u8],
) -> Result<(), OctogateError> {
    if status != StatusCode::FORBIDDEN {
        return Ok(());
    }

    let budget = decode_rate_envelope(body)?;
    let wait = time_until_reset(&budget, SystemTime::now());

    warn!(
        limit = budget.limit,
        remaining = budget.remaining,
        reset = budget.reset,
        wait_secs = wait.as_secs_f64(),
        "upstream reported rate limit"
    );

    if budget.remaining == 0 && !wait.is_zero() {
        tokio::time::sleep(wait).await;
    }

    Ok(())
}
