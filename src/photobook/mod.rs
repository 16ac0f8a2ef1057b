//! The shared album.

pub mod feed;
mod page;
pub(crate) mod upload;

use axum::{routing::get, Router};

use crate::AppState;

pub use feed::Photobook;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(page::photobook).post(upload::upload))
        .route("/{id}", get(page::photo))
}
