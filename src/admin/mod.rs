//! Moderation: an aggregate view over everything guests shared, with the
//! ability to take posts and photos down.

pub mod authority;
mod delete;
mod login;
mod logout;
mod page;
pub mod panel;

use axum::{routing::{get, post}, Router};

use crate::AppState;

pub use panel::{ModerationPanel, Stats};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(page::admin))
        .route("/login", post(login::login))
        .route("/logout", post(logout::logout))
        .route("/posts/{id}/delete", post(delete::delete_post))
        .route("/photos/{id}/delete", post(delete::delete_photo))
}
