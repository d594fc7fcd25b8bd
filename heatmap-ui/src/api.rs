//! REST client for the heatmap endpoints.
//!
//! Success is determined solely by HTTP status: any non-2xx response is
//! [`ApiError::Rejected`] and no structured error payload is expected. Every
//! request races a defensive deadline so a hung fetch cannot wedge the widget.

use futures::future::{self, Either};
use gloo_net::http::Request;
use gloo_timers::future::TimeoutFuture;
use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};
use shared_types::{AddMarkerRequest, HeatPoint, MarkerPoint, RemoveMarkerRequest};
use std::future::Future;
use std::sync::OnceLock;
use thiserror::Error;

/// Deadline applied to every request. The backend has no documented timeout
/// of its own.
pub const REQUEST_TIMEOUT_MS: u32 = 15_000;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// The request never completed (DNS, connection reset, fetch rejection).
    #[error("request failed: {0}")]
    Network(String),
    /// The server answered with a non-2xx status.
    #[error("server rejected the request with status {0}")]
    Rejected(u16),
    /// The response body was not the expected JSON shape.
    #[error("failed to decode response: {0}")]
    Decode(String),
    /// The deadline elapsed before the request resolved.
    #[error("request timed out")]
    TimedOut,
}

/// Get the API base URL based on current environment
/// - In development (localhost): use http://localhost:8080
/// - In production: use same origin (API serves static files)
fn get_api_base() -> String {
    let hostname = web_sys::window()
        .and_then(|w| w.location().hostname().ok())
        .unwrap_or_default();

    if hostname == "localhost" || hostname == "127.0.0.1" {
        "http://localhost:8080".to_string()
    } else {
        "".to_string()
    }
}

/// Lazy-static equivalent for WASM - computed at first use
static API_BASE_CACHE: OnceLock<String> = OnceLock::new();

/// Get the cached API base URL
pub fn api_base() -> &'static str {
    API_BASE_CACHE.get_or_init(get_api_base).as_str()
}

/// Percent-encode a query value. User ids are free text, so everything
/// outside `[A-Za-z0-9]` is escaped.
fn encode_query_value(value: &str) -> String {
    utf8_percent_encode(value, NON_ALPHANUMERIC).to_string()
}

// The two list endpoints disagree on query casing (`userid` vs `userId`);
// that is the backend's contract, not a typo.
pub fn list_heat_points_url(base: &str, user_id: &str) -> String {
    format!(
        "{base}/heatmap/listheatpoints?userid={}",
        encode_query_value(user_id)
    )
}

pub fn list_markers_url(base: &str, user_id: &str) -> String {
    format!(
        "{base}/heatmap/listmarkers?userId={}",
        encode_query_value(user_id)
    )
}

pub fn add_marker_url(base: &str) -> String {
    format!("{base}/heatmap/addmarker")
}

pub fn remove_marker_url(base: &str) -> String {
    format!("{base}/heatmap/removemarker")
}

async fn with_deadline<F, T>(fut: F) -> Result<T, ApiError>
where
    F: Future<Output = Result<T, ApiError>>,
{
    let deadline = TimeoutFuture::new(REQUEST_TIMEOUT_MS);
    futures::pin_mut!(fut);
    futures::pin_mut!(deadline);
    match future::select(fut, deadline).await {
        Either::Left((result, _)) => result,
        Either::Right(_) => Err(ApiError::TimedOut),
    }
}

/// Fetch all heat points scoped to `user_id`.
pub async fn fetch_heat_points(user_id: &str) -> Result<Vec<HeatPoint>, ApiError> {
    let url = list_heat_points_url(api_base(), user_id);

    with_deadline(async move {
        let response = Request::get(&url)
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;

        if !response.ok() {
            return Err(ApiError::Rejected(response.status()));
        }

        response
            .json::<Vec<HeatPoint>>()
            .await
            .map_err(|e| ApiError::Decode(e.to_string()))
    })
    .await
}

/// Fetch all markers scoped to `user_id`.
pub async fn fetch_markers(user_id: &str) -> Result<Vec<MarkerPoint>, ApiError> {
    let url = list_markers_url(api_base(), user_id);

    with_deadline(async move {
        let response = Request::get(&url)
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;

        if !response.ok() {
            return Err(ApiError::Rejected(response.status()));
        }

        response
            .json::<Vec<MarkerPoint>>()
            .await
            .map_err(|e| ApiError::Decode(e.to_string()))
    })
    .await
}

/// Create a marker. The server assigns the id; callers re-derive the
/// canonical collection with [`fetch_markers`] afterwards.
pub async fn add_marker(request: &AddMarkerRequest) -> Result<(), ApiError> {
    let url = add_marker_url(api_base());
    let request = Request::post(&url)
        .json(request)
        .map_err(|e| ApiError::Network(format!("failed to encode request: {e}")))?;

    with_deadline(async move {
        let response = request
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;

        if !response.ok() {
            return Err(ApiError::Rejected(response.status()));
        }

        Ok(())
    })
    .await
}

/// Delete a marker by its server-assigned id.
pub async fn remove_marker(id: &str) -> Result<(), ApiError> {
    let url = remove_marker_url(api_base());
    let body = RemoveMarkerRequest { id: id.to_string() };
    let request = Request::post(&url)
        .json(&body)
        .map_err(|e| ApiError::Network(format!("failed to encode request: {e}")))?;

    with_deadline(async move {
        let response = request
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;

        if !response.ok() {
            return Err(ApiError::Rejected(response.status()));
        }

        Ok(())
    })
    .await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn heat_point_url_uses_lowercase_userid() {
        let url = list_heat_points_url("http://localhost:8080", "alice");
        assert_eq!(
            url,
            "http://localhost:8080/heatmap/listheatpoints?userid=alice"
        );
    }

    #[test]
    fn marker_url_uses_camel_case_user_id() {
        let url = list_markers_url("", "alice");
        assert_eq!(url, "/heatmap/listmarkers?userId=alice");
    }

    #[test]
    fn free_text_user_ids_are_percent_encoded() {
        let url = list_markers_url("", "alice smith&co");
        assert_eq!(url, "/heatmap/listmarkers?userId=alice%20smith%26co");
    }

    #[test]
    fn empty_user_id_is_legal() {
        let url = list_heat_points_url("", "");
        assert_eq!(url, "/heatmap/listheatpoints?userid=");
    }

    #[test]
    fn rejected_error_carries_the_status() {
        let err = ApiError::Rejected(503);
        assert_eq!(
            err.to_string(),
            "server rejected the request with status 503"
        );
    }
}
