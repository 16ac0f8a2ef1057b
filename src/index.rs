use axum::{debug_handler, response::{IntoResponse, Response}};
use tower_sessions::Session;

use crate::{feedback::Banners, include_res, onboarding, res, AppResult};

#[debug_handler]
pub async fn index(
    session: Session
) -> AppResult<Response> {
    let Some(profile) = onboarding::current_profile(&session).await? else {
        return Ok(onboarding::redirect_to_welcome("/"));
    };

    let body = include_res!(str, "/pages/index.html")
        .replace("{name}", &res::escape(&profile.name));
    Ok(res::page("Our wedding", &body, &Banners::take(&session).await?).into_response())
}
