pub mod admin;
pub mod blobs;
pub mod canvas;
pub mod config;
pub mod db;
pub mod device;
pub mod error;
pub mod feedback;
pub mod index;
pub mod logging;
pub mod onboarding;
pub mod photobook;
pub mod res;
pub mod session;
pub mod store;
pub mod transcode;
pub mod wall;

use axum::{extract::{DefaultBodyLimit, FromRef}, http::StatusCode, response::{IntoResponse, Response}, routing::get, Router};
use tower_http::{services::ServeDir, trace::TraceLayer};
use tower_sessions::{cookie::SameSite, Expiry, MemoryStore, SessionManagerLayer};

pub use error::{ConfettiError, ConfettiResult};

use admin::authority::Authority;
use blobs::Blobs;
use config::Config;
use store::Store;

#[derive(Clone, FromRef)]
pub struct AppState {
    pub store: Store,
    pub blobs: Blobs,
    pub authority: Authority,
}

/// Builds the full application router: guest pages, moderation, the
/// storage mount and the session layer that stands in for device state.
pub fn app(state: AppState, config: &Config) -> Router {
    let session_layer = SessionManagerLayer::new(MemoryStore::default())
        .with_secure(false)
        .with_same_site(SameSite::Lax)
        .with_expiry(Expiry::OnInactivity(time::Duration::days(config.session_days)));

    Router::new()
        .route("/", get(index::index))
        .merge(onboarding::router())
        .nest("/photobook", photobook::router())
        .nest("/wall", wall::router())
        .nest("/admin", admin::router())
        .nest_service("/storage", ServeDir::new(state.blobs.root()))

        .with_state(state)
        .layer(DefaultBodyLimit::max(config.upload_limit_bytes))
        .layer(session_layer)
        .layer(TraceLayer::new_for_http())
}

pub type AppResult<T> = Result<T, AppError>;
#[derive(Debug)]
pub struct AppError(pub anyhow::Error);

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        tracing::error!(error = %self.0, "request failed");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("{}\n\n{}", self.0, self.0.backtrace()),
        )
            .into_response()
    }
}

impl From<String> for AppError {
    fn from(err: String) -> Self {
        Self(anyhow::Error::msg(err))
    }
}

impl From<&str> for AppError {
    fn from(err: &str) -> Self {
        Self(anyhow::Error::msg(err.to_owned()))
    }
}

macro_rules! apperr_impl {
    ($E:ty) => {
        impl From<$E> for AppError {
            fn from(err: $E) -> Self {
                Self(anyhow::Error::from(err))
            }
        }
    };
}

apperr_impl!(ConfettiError);
apperr_impl!(serde_json::Error);
apperr_impl!(sqlx::Error);
apperr_impl!(tower_sessions::session::Error);
apperr_impl!(axum::Error);
apperr_impl!(axum::extract::multipart::MultipartError);
