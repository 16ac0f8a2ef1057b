use axum::{debug_handler, extract::State, response::Redirect, Form};
use serde::Deserialize;
use tower_sessions::Session;

use crate::{feedback, AppResult, AppState, ConfettiError};

use super::{authority::Authority, panel};

#[derive(Deserialize)]
pub(crate) struct LoginForm {
    password: String,
}

#[debug_handler(state = AppState)]
pub(crate) async fn login(
    State(authority): State<Authority>,
    session: Session,
    Form(LoginForm { password }): Form<LoginForm>,
) -> AppResult<Redirect> {
    match panel::login(&authority, &session, &password).await {
        Ok(()) => {}
        Err(ConfettiError::Unauthorized) => feedback::alert(&session, "Invalid password").await?,
        Err(e) => return Err(e.into()),
    }
    Ok(Redirect::to("/admin"))
}
