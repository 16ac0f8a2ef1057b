use axum::{debug_handler, extract::{Path, State}, response::{IntoResponse, Redirect, Response}, Form};
use serde::Deserialize;
use tower_sessions::Session;
use uuid::Uuid;

use crate::{feedback::{self, Banners}, include_res, res, store::Store, AppResult, AppState, ConfettiError};

use super::{page::Tab, panel};

#[derive(Deserialize)]
pub(crate) struct DeleteForm {
    confirm: Option<String>,
}

impl DeleteForm {
    fn confirmed(&self) -> bool {
        self.confirm.as_deref() == Some("yes")
    }
}

#[debug_handler(state = AppState)]
pub(crate) async fn delete_post(
    Path(id): Path<Uuid>,
    State(store): State<Store>,
    session: Session,
    Form(form): Form<DeleteForm>,
) -> AppResult<Response> {
    if !panel::is_authenticated(&session).await? {
        return Ok(Redirect::to("/admin").into_response());
    }
    if !form.confirmed() {
        return confirm_page("post", &format!("/admin/posts/{id}/delete"), Tab::Wall);
    }

    let outcome = panel::remove_post(&store, id).await;
    finish(&session, outcome, "Failed to delete post", Tab::Wall).await
}

#[debug_handler(state = AppState)]
pub(crate) async fn delete_photo(
    Path(id): Path<Uuid>,
    State(store): State<Store>,
    session: Session,
    Form(form): Form<DeleteForm>,
) -> AppResult<Response> {
    if !panel::is_authenticated(&session).await? {
        return Ok(Redirect::to("/admin").into_response());
    }
    if !form.confirmed() {
        return confirm_page("photo", &format!("/admin/photos/{id}/delete"), Tab::Photobook);
    }

    let outcome = panel::remove_photo(&store, id).await;
    finish(&session, outcome, "Failed to delete photo", Tab::Photobook).await
}

fn confirm_page(what: &str, action: &str, tab: Tab) -> AppResult<Response> {
    let body = include_res!(str, "/pages/admin/confirm.html")
        .replace("{what}", what)
        .replace("{action}", action)
        .replace("{tab}", tab.as_str());
    Ok(res::page("Confirm", &body, &Banners::default()).into_response())
}

async fn finish(session: &Session, outcome: Result<(), ConfettiError>, failure: &str, tab: Tab) -> AppResult<Response> {
    if let Err(e) = outcome {
        tracing::error!(error = %e, "delete failed");
        feedback::alert(session, failure).await?;
    }
    Ok(Redirect::to(&format!("/admin?tab={}", tab.as_str())).into_response())
}
