use axum::{debug_handler, extract::{Query, State}, response::{IntoResponse, Redirect, Response}, Form};
use serde::Deserialize;
use tower_sessions::Session;

use crate::{feedback::{self, Banners}, include_res, res, store::Store, AppResult, AppState};

use super::{gate, safe_return_url};

#[derive(Deserialize)]
pub(crate) struct WelcomeQuery {
    pub(crate) return_url: Option<String>,
}

#[derive(Deserialize)]
pub(crate) struct WelcomeForm {
    name: String,
    return_url: Option<String>,
}

#[debug_handler]
pub(crate) async fn welcome_page(
    Query(WelcomeQuery { return_url }): Query<WelcomeQuery>,
    session: Session,
) -> AppResult<Response> {
    let return_url = safe_return_url(return_url.as_deref());
    if gate::current_profile(&session).await?.is_some() {
        return Ok(Redirect::to(return_url).into_response());
    }

    let body = include_res!(str, "/pages/welcome.html")
        .replace("{return_url}", &res::escape(return_url));
    Ok(res::page("Welcome", &body, &Banners::take(&session).await?).into_response())
}

#[debug_handler(state = AppState)]
pub(crate) async fn welcome(
    State(store): State<Store>,
    session: Session,
    Form(WelcomeForm { name, return_url }): Form<WelcomeForm>,
) -> AppResult<Response> {
    let return_url = safe_return_url(return_url.as_deref());

    if let Err(e) = gate::register(&store, &session, &name).await {
        tracing::error!(error = %e, "could not register guest");
        let message = if e.is_user_error() {
            "Please tell us your name."
        } else {
            "Something went wrong. Please try again."
        };
        feedback::alert(&session, message).await?;
        return Ok(super::redirect_to_welcome(return_url));
    }

    Ok(Redirect::to(return_url).into_response())
}
