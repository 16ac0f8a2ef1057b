//! The message wall: text, photo and drawing posts.

pub mod feed;
pub(crate) mod page;
mod post;

use axum::{routing::{get, post}, Router};

use crate::AppState;

pub use feed::Wall;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(page::wall))
        .route("/text", post(post::text))
        .route("/image", post(post::image))
        .route("/drawing", post(post::drawing))
}
