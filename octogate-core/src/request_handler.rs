//! Per-request dispatch and forwarding.
//!
//! This module contains the core request handling logic for the proxy:
//! local rate-limit admission, authorization resolution, forwarding to
//! the fixed upstream, and the rate-limit backoff interception of the
//! upstream response.
//!
//! # Architecture
//!
//! The request handling flow:
//! 1. Acquire an admission slot from the shared token bucket
//! 2. Resolve the outbound `Authorization` header (mint or pass-through)
//! 3. Rewrite the target onto the upstream host and forward
//! 4. Intercept the buffered response for rate-limit exhaustion
//! 5. Relay the upstream status, headers, and body to the client
//!
//! # Connection Pooling
//!
//! The module accepts a shared [`reqwest::Client`] for HTTP connection
//! pooling, which should be configured by the caller with appropriate
//! timeouts and a disabled redirect policy.

use std::convert::Infallible;
use std::sync::Arc;

use bytes::Bytes;
use futures::TryStreamExt;
use http_body_util::{BodyStream, Full};
use hyper::body::Body;
use hyper::{Request, Response, StatusCode};
use tracing::{debug, error};

use crate::app_auth;
use crate::error::OctogateError;
use crate::headers;
use crate::rate_limiter::RateLimiter;
use crate::types::{AppIdentity, UpstreamConfig};

/// Handles an incoming HTTP request through the proxy pipeline.
///
/// This is the main entry point for request processing. It performs:
/// - Token-bucket admission (429 without upstream contact on denial)
/// - Authorization resolution: a freshly minted installation token when
///   an App identity is configured, otherwise the caller's own header
/// - Request forwarding to the upstream host, streaming the body
/// - Rate-limit backoff on a 403 exhaustion response before relaying it
///
/// # Returns
///
/// Always returns `Ok` with either the relayed upstream response or an
/// error response carrying the failure's status and sanitized message.
pub async fn handle_request<B>(
    req: Request<B>,
    limiter: RateLimiter,
    identity: Arc<AppIdentity>,
    upstream: Arc<UpstreamConfig>,
    http_client: reqwest::Client,
) -> Result<Response<Full<Bytes>>, Infallible>
where
    B: Body<Data = Bytes> + Send + Unpin + 'static,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>> + Send,
{
    match dispatch(req, &limiter, &identity, &upstream, &http_client).await {
        Ok(response) => Ok(response),
        Err(err) => {
            if err.is_server_error() {
                error!(error = %err, "request failed");
            } else {
                debug!(error = %err, "request denied");
            }
            Ok(error_response(&err))
        }
    }
}

async fn dispatch<B>(
    req: Request<B>,
    limiter: &RateLimiter,
    identity: &AppIdentity,
    upstream: &UpstreamConfig,
    http_client: &reqwest::Client,
) -> Result<Response<Full<Bytes>>, OctogateError>
where
    B: Body<Data = Bytes> + Send + Unpin + 'static,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>> + Send,
{
    limiter.acquire().await?;

    let authorization = resolve_authorization(identity, upstream, http_client).await?;

    let response = forward_request(req, authorization, upstream, http_client).await?;

    let status = response.status();
    let response_headers = response.headers().clone();
    let body = response.bytes().await?;

    crate::backoff::apply_rate_limit_backoff(status, &body).await?;

    let mut relay = Response::new(Full::new(body));
    *relay.status_mut() = status;
    for (name, value) in response_headers.iter() {
        if !headers::is_hop_by_hop(name.as_str()) {
            relay.headers_mut().append(name.clone(), value.clone());
        }
    }

    Ok(relay)
}

/// Resolves the `Authorization` value the forwarded request should carry.
///
/// With a configured App identity, a JWT is minted and exchanged for an
/// installation token on every call; the result replaces whatever the
/// caller sent. Without one, `None` is returned and the inbound header
/// (if any) travels through untouched.
async fn resolve_authorization(
    identity: &AppIdentity,
    upstream: &UpstreamConfig,
    http_client: &reqwest::Client,
) -> Result<Option<String>, OctogateError> {
    if !identity.is_configured() {
        return Ok(None);
    }

    let app_jwt = app_auth::generate_app_jwt(identity)?;
    let token = app_auth::fetch_installation_token(
        http_client,
        upstream,
        &app_jwt,
        identity.installation_id,
    )
    .await?;

    Ok(Some(format!("token {token}")))
}

/// Rewrites the request onto the upstream host and sends it.
///
/// Method, path, query, and headers are preserved except for `Host`,
/// `Content-Length`, the hop-by-hop set, and (when a token was minted)
/// the inbound `Authorization`. The request body is streamed, not
/// buffered.
async fn forward_request<B>(
    req: Request<B>,
    authorization: Option<String>,
    upstream: &UpstreamConfig,
    http_client: &reqwest::Client,
) -> Result<reqwest::Response, OctogateError>
where
    B: Body<Data = Bytes> + Send + Unpin + 'static,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>> + Send,
{
    let (parts, body) = req.into_parts();

    let destination = upstream.forward_url(
        parts
            .uri
            .path_and_query()
            .map_or("/", |path_query| path_query.as_str()),
    );
    debug!(method = %parts.method, url = %destination, "forwarding request");

    let mut req_builder = http_client.request(parts.method, &destination);

    for (name, value) in parts.headers.iter() {
        let header_name = name.as_str();
        if header_name == headers::HOST
            || header_name == headers::CONTENT_LENGTH
            || headers::is_hop_by_hop(header_name)
            || (authorization.is_some() && header_name == headers::AUTHORIZATION)
        {
            continue;
        }
        req_builder = req_builder.header(name, value);
    }

    if let Some(value) = authorization {
        req_builder = req_builder.header(headers::AUTHORIZATION, value);
    }

    // An exact zero size hint means no body at all (GET and friends);
    // sending one anyway would force chunked encoding on every request.
    if body.size_hint().exact() != Some(0) {
        let body_stream = BodyStream::new(body)
            .try_filter_map(|frame| std::future::ready(Ok(frame.into_data().ok())));
        req_builder = req_builder.body(reqwest::Body::wrap_stream(body_stream));
    }

    Ok(req_builder.send().await?)
}

/// Maps a pipeline error to its client-visible response.
pub fn error_response(err: &OctogateError) -> Response<Full<Bytes>> {
    create_error_response(err.status_code(), err.user_message())
}

/// Creates a standardized plain-text error response.
///
/// # Example
///
/// ```
/// use octogate_core::request_handler::create_error_response;
/// use hyper::StatusCode;
///
/// let response = create_error_response(StatusCode::TOO_MANY_REQUESTS, "Rate limit exceeded");
/// assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
/// ```
pub fn create_error_response(status: StatusCode, message: &str) -> Response<Full<Bytes>> {
    Response::builder()
        .status(status)
        .header("content-type", "text/plain")
        .body(Full::new(Bytes::from(message.to_string())))
        .unwrap_or_else(|_| Response::new(Full::new(Bytes::from("Internal Server Error"))))
}
