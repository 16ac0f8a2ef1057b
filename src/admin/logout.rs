use axum::{debug_handler, response::Redirect};
use tower_sessions::Session;

use crate::AppResult;

use super::panel;

#[debug_handler]
pub(crate) async fn logout(
    session: Session
) -> AppResult<Redirect> {
    panel::logout(&session).await?;
    Ok(Redirect::to("/admin"))
}
