use axum::{debug_handler, extract::{rejection::JsonRejection, Multipart, State}, response::{IntoResponse, Redirect, Response}, Form, Json};
use serde::Deserialize;
use tower_sessions::Session;

use crate::{blobs::Blobs, canvas::CanvasEvent, feedback, onboarding, photobook::upload::photo_field, store::Store, AppResult, AppState, ConfettiError, ConfettiResult};

use super::Wall;

#[derive(Deserialize)]
pub(crate) struct TextForm {
    message: String,
}

#[debug_handler(state = AppState)]
pub(crate) async fn text(
    State(store): State<Store>,
    session: Session,
    Form(TextForm { message }): Form<TextForm>,
) -> AppResult<Response> {
    let Some(profile) = onboarding::current_profile(&session).await? else {
        return Ok(onboarding::redirect_to_welcome("/wall"));
    };

    let outcome = Wall::default().post_text(&store, &profile, &message).await;
    finish(&session, outcome.map(drop), "Failed to create post. Please try again.").await
}

#[debug_handler(state = AppState)]
pub(crate) async fn image(
    State(store): State<Store>,
    State(blobs): State<Blobs>,
    session: Session,
    mut multipart: Multipart,
) -> AppResult<Response> {
    let Some(profile) = onboarding::current_profile(&session).await? else {
        return Ok(onboarding::redirect_to_welcome("/wall"));
    };

    let Some(bytes) = photo_field(&mut multipart).await? else {
        feedback::alert(&session, "Please choose a photo first.").await?;
        return Ok(Redirect::to("/wall").into_response());
    };

    let outcome = Wall::default().post_image(&store, &blobs, &profile, bytes).await;
    finish(&session, outcome.map(drop), "Failed to upload image. Please try again.").await
}

#[debug_handler(state = AppState)]
pub(crate) async fn drawing(
    State(store): State<Store>,
    State(blobs): State<Blobs>,
    session: Session,
    events: Result<Json<Vec<CanvasEvent>>, JsonRejection>,
) -> AppResult<Response> {
    let Some(profile) = onboarding::current_profile(&session).await? else {
        return Ok(onboarding::redirect_to_welcome("/wall"));
    };

    let outcome = match events {
        Ok(Json(events)) => Wall::default().post_drawing(&store, &blobs, &profile, events).await,
        Err(rejection) => Err(ConfettiError::validation(rejection.body_text())),
    };
    finish(&session, outcome.map(drop), "Failed to save drawing. Please try again.").await
}

/// Acknowledges a successful post or raises the alert, then goes back to
/// the wall.
async fn finish(session: &Session, outcome: ConfettiResult<()>, failure: &str) -> AppResult<Response> {
    match outcome {
        Ok(()) => feedback::acknowledge(session).await?,
        Err(e) => {
            tracing::error!(error = %e, "wall post failed");
            feedback::alert(session, failure).await?;
        }
    }
    Ok(Redirect::to("/wall").into_response())
}
