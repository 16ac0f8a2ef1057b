use axum::{debug_handler, extract::{Path, State}, response::{IntoResponse, Response}};
use tower_sessions::Session;
use uuid::Uuid;

use crate::{db::PhotobookImage, feedback::Banners, include_res, onboarding, res, store::Store, AppResult, AppState};

use super::Photobook;

#[debug_handler(state = AppState)]
pub(crate) async fn photobook(
    State(store): State<Store>,
    session: Session,
) -> AppResult<Response> {
    if onboarding::current_profile(&session).await?.is_none() {
        return Ok(onboarding::redirect_to_welcome("/photobook"));
    }

    let book = Photobook::load(&store).await;
    let photos: String = book.photos.iter().map(photo_item).collect();
    let empty = if book.photos.is_empty() {
        include_res!(str, "/pages/photobook/empty.html")
    } else {
        ""
    };

    let body = include_res!(str, "/pages/photobook/page.html")
        .replace("{empty}", empty)
        .replace("{photos}", &photos);
    Ok(res::page("Photobook", &body, &Banners::take(&session).await?).into_response())
}

#[debug_handler(state = AppState)]
pub(crate) async fn photo(
    Path(id): Path<Uuid>,
    State(store): State<Store>,
    session: Session,
) -> AppResult<Response> {
    if onboarding::current_profile(&session).await?.is_none() {
        return Ok(onboarding::redirect_to_welcome("/photobook"));
    }

    let image = match store.photo(id).await {
        Ok(Some(image)) => image,
        Ok(None) => return res::sorry("photo"),
        Err(e) => {
            tracing::warn!(error = %e, %id, "could not fetch photo");
            return res::sorry("photo");
        }
    };

    let body = include_res!(str, "/pages/photobook/photo.html")
        .replace("{created_at}", &res::display_time(image.created_at))
        .replace("{image_url}", &res::escape(&image.image_url))
        .replace("{uploader_name}", &res::escape(&image.uploader_name));
    Ok(res::page("Photo", &body, &Banners::take(&session).await?).into_response())
}

fn photo_item(image: &PhotobookImage) -> String {
    include_res!(str, "/pages/photobook/photo_item.html")
        .replace("{id}", &image.id.to_string())
        .replace("{thumbnail_url}", &res::escape(&image.thumbnail_url))
        .replace("{uploader_name}", &res::escape(&image.uploader_name))
}
