use axum::{debug_handler, extract::{Multipart, State}, response::{IntoResponse, Redirect, Response}};
use tower_sessions::Session;

use crate::{blobs::Blobs, feedback, onboarding, store::Store, AppResult, AppState};

use super::Photobook;

pub(crate) const PHOTO_FIELD: &str = "photo";

/// Pulls the bytes of the `photo` field out of a multipart form.
pub(crate) async fn photo_field(multipart: &mut Multipart) -> AppResult<Option<Vec<u8>>> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() == Some(PHOTO_FIELD) {
            let bytes = field.bytes().await?;
            return Ok((!bytes.is_empty()).then(|| bytes.to_vec()));
        }
    }
    Ok(None)
}

#[debug_handler(state = AppState)]
pub(crate) async fn upload(
    State(store): State<Store>,
    State(blobs): State<Blobs>,
    session: Session,
    mut multipart: Multipart,
) -> AppResult<Response> {
    let Some(profile) = onboarding::current_profile(&session).await? else {
        return Ok(onboarding::redirect_to_welcome("/photobook"));
    };

    let Some(bytes) = photo_field(&mut multipart).await? else {
        feedback::alert(&session, "Please choose a photo first.").await?;
        return Ok(Redirect::to("/photobook").into_response());
    };

    let mut book = Photobook::default();
    match book.upload(&store, &blobs, &profile, bytes).await {
        Ok(_) => feedback::acknowledge(&session).await?,
        Err(e) => {
            tracing::error!(error = %e, "photo upload failed");
            feedback::alert(&session, "Failed to upload photo. Please try again.").await?;
        }
    }

    Ok(Redirect::to("/photobook").into_response())
}
