//! Identity gate: a guest names themselves once per device.

pub mod gate;
mod page;

use axum::{response::{IntoResponse, Redirect, Response}, routing::get, Router};

use crate::AppState;

pub use gate::{current_profile, register};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/welcome", get(page::welcome_page).post(page::welcome))
}

/// Sends a guest without a profile to the name form, coming back to
/// `return_url` afterwards.
pub fn redirect_to_welcome(return_url: &str) -> Response {
    Redirect::to(&format!("/welcome?return_url={}", encode_component(return_url))).into_response()
}

fn encode_component(value: &str) -> String {
    value
        .bytes()
        .map(|b| match b {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'/' | b'-' | b'_' | b'.' | b'~' => (b as char).to_string(),
            _ => format!("%{b:02X}"),
        })
        .collect()
}

/// Only same-site absolute paths are followed after onboarding.
pub(crate) fn safe_return_url(return_url: Option<&str>) -> &str {
    match return_url {
        Some(url) if url.starts_with('/') && !url.starts_with("//") && !url.contains('\\') => url,
        _ => "/",
    }
}
