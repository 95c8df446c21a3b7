//! HTTP request handlers

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use webhook_models::models::{DispatchResponse, HealthResponse, VersionResponse};

use crate::dispatch::DeliveryHeaders;
use crate::errors::DispatchError;
use crate::server::state::ServerState;
use crate::webhook::signature::SIGNATURE_PREFIX;

/// Signature header names, in order of preference
pub const SIGNATURE_HEADERS: [&str; 2] = ["x-hub-signature-256", "x-hub-signature"];

/// Event-kind header names, in order of preference
pub const EVENT_HEADERS: [&str; 2] = ["x-event-key", "x-github-event"];

fn first_header(headers: &HeaderMap, names: &[&str]) -> Option<String> {
    names
        .iter()
        .find_map(|name| headers.get(*name))
        .and_then(|value| value.to_str().ok())
        .map(str::to_string)
}

/// Signature header to verify
///
/// GitHub sends a legacy `sha1=` digest in `X-Hub-Signature` next to the
/// SHA-256 one, so the first `sha256=` value wins over header order.
fn signature_header(headers: &HeaderMap) -> Option<String> {
    let values: Vec<&str> = SIGNATURE_HEADERS
        .iter()
        .filter_map(|name| headers.get(*name))
        .filter_map(|value| value.to_str().ok())
        .collect();

    values
        .iter()
        .find(|value| value.trim().starts_with(SIGNATURE_PREFIX))
        .or_else(|| values.first())
        .map(|value| value.to_string())
}

/// Webhook handler
///
/// Takes the body as raw bytes so the signature is checked against exactly
/// what was sent.
pub async fn webhook_handler(
    State(state): State<Arc<ServerState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<impl IntoResponse, DispatchError> {
    let delivery = DeliveryHeaders {
        signature: signature_header(&headers),
        event_key: first_header(&headers, &EVENT_HEADERS),
    };

    let result = state.dispatcher.dispatch(delivery, body).await?;

    Ok((
        StatusCode::OK,
        Json(DispatchResponse {
            status: result.status.as_str().to_string(),
            message: "Deployment complete".to_string(),
            detail: Some(result.detail.clone()),
            steps: result.step_names(),
        }),
    ))
}

/// Health check handler
pub async fn health_handler(State(state): State<Arc<ServerState>>) -> impl IntoResponse {
    Json(HealthResponse {
        status: "healthy".to_string(),
        service: "stagehook".to_string(),
        version: state.version.version.clone(),
    })
}

/// Version handler
pub async fn version_handler(State(state): State<Arc<ServerState>>) -> impl IntoResponse {
    Json(VersionResponse {
        version: state.version.version.clone(),
        git_hash: state.version.git_hash.clone(),
        build_time: state.version.build_time.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(pairs: &[(&'static str, &'static str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.insert(*name, HeaderValue::from_static(value));
        }
        map
    }

    #[test]
    fn test_sha256_header_wins_over_legacy_sha1() {
        let map = headers(&[
            ("x-hub-signature", "sha1=0123456789abcdef"),
            ("x-hub-signature-256", "sha256=abcdef"),
        ]);
        assert_eq!(signature_header(&map).as_deref(), Some("sha256=abcdef"));
    }

    #[test]
    fn test_bitbucket_style_header() {
        let map = headers(&[("x-hub-signature", "sha256=abcdef")]);
        assert_eq!(signature_header(&map).as_deref(), Some("sha256=abcdef"));
    }

    #[test]
    fn test_unprefixed_value_is_still_passed_through() {
        let map = headers(&[("x-hub-signature", "sha1=0123")]);
        assert_eq!(signature_header(&map).as_deref(), Some("sha1=0123"));
        assert_eq!(signature_header(&HeaderMap::new()), None);
    }
}
