use axum::{
    body::Body,
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::Response,
};
use ed25519_dalek::Signature;

use crate::state::AppState;

pub const SIGNATURE_HEADER: &str = "x-signature-ed25519";
pub const TIMESTAMP_HEADER: &str = "x-signature-timestamp";

/// Interaction payloads are small; anything larger is rejected unread.
const MAX_BODY_BYTES: usize = 64 * 1024;

/// Axum middleware that verifies the chat platform's request signature.
///
/// Every request must carry `X-Signature-Ed25519` (hex) and
/// `X-Signature-Timestamp`. The signature covers the timestamp followed by
/// the raw body and is checked against the application's public key.
/// Anything else is answered with 401 before the handler runs.
///
/// ```rust,no_run
/// use axum::{Router, middleware, routing::post};
/// use geezer_slots::{AppState, InteractionSignature};
///
/// # fn app(state: AppState) -> Router {
/// Router::new()
///     .route("/interactions", post(|| async { "ok" }))
///     .layer(middleware::from_fn_with_state(state.clone(), InteractionSignature::verify))
///     .with_state(state)
/// # }
/// ```
pub struct InteractionSignature;

impl InteractionSignature {
    pub async fn verify(
        State(state): State<AppState>,
        request: Request,
        next: Next,
    ) -> Result<Response, StatusCode> {
        let signature = header(&request, SIGNATURE_HEADER)?;
        let signature = hex::decode(signature)
            .map_err(|e| e.to_string())
            .and_then(|bytes| Signature::from_slice(&bytes).map_err(|e| e.to_string()))
            .map_err(|e| {
                tracing::warn!(path = %request.uri(), error = %e, "malformed signature header");
                StatusCode::UNAUTHORIZED
            })?;
        let timestamp = header(&request, TIMESTAMP_HEADER)?.to_owned();

        let (parts, body) = request.into_parts();
        let body = axum::body::to_bytes(body, MAX_BODY_BYTES)
            .await
            .map_err(|e| {
                tracing::warn!(path = %parts.uri, error = %e, "unreadable interaction body");
                StatusCode::BAD_REQUEST
            })?;

        let mut message = Vec::with_capacity(timestamp.len() + body.len());
        message.extend_from_slice(timestamp.as_bytes());
        message.extend_from_slice(&body);

        state
            .public_key
            .verify_strict(&message, &signature)
            .map_err(|e| {
                tracing::warn!(path = %parts.uri, error = %e, "signature verification failed");
                StatusCode::UNAUTHORIZED
            })?;

        tracing::debug!(path = %parts.uri, "interaction signature verified");
        Ok(next.run(Request::from_parts(parts, Body::from(body))).await)
    }
}

fn header<'a>(request: &'a Request, name: &str) -> Result<&'a str, StatusCode> {
    request
        .headers()
        .get(name)
        // arch-lint: allow(no-silent-result-drop) reason="a non-ASCII header cannot carry a valid signature; treating as absent triggers 401"
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| {
            tracing::warn!(path = %request.uri(), header = name, "missing signature header");
            StatusCode::UNAUTHORIZED
        })
}
