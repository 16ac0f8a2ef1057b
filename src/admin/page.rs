use axum::{debug_handler, extract::{Query, State}, response::{IntoResponse, Response}};
use serde::Deserialize;
use tower_sessions::Session;

use crate::{feedback::Banners, include_res, res, store::Store, wall::page::post_content, AppResult, AppState};

use super::panel::{self, ModerationPanel};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub(crate) enum Tab {
    #[default]
    Wall,
    Photobook,
    Guests,
}

impl Tab {
    pub(crate) fn as_str(&self) -> &'static str {
        match self {
            Tab::Wall => "wall",
            Tab::Photobook => "photobook",
            Tab::Guests => "guests",
        }
    }
}

#[derive(Deserialize)]
pub(crate) struct AdminQuery {
    tab: Option<Tab>,
}

#[debug_handler(state = AppState)]
pub(crate) async fn admin(
    Query(AdminQuery { tab }): Query<AdminQuery>,
    State(store): State<Store>,
    session: Session,
) -> AppResult<Response> {
    let banners = Banners::take(&session).await?;
    if !panel::is_authenticated(&session).await? {
        return Ok(res::page("Admin", include_res!(str, "/pages/admin/login.html"), &banners).into_response());
    }

    let panel = ModerationPanel::load(&store).await;
    let body = render_panel(&panel, tab.unwrap_or_default());
    Ok(res::page("Admin", &body, &banners).into_response())
}

fn render_panel(panel: &ModerationPanel, tab: Tab) -> String {
    let rows: String = match tab {
        Tab::Wall => panel
            .posts
            .iter()
            .map(|post| {
                include_res!(str, "/pages/admin/post_row.html")
                    .replace("{id}", &post.id.to_string())
                    .replace("{kind}", post.kind.as_str())
                    .replace("{created_at}", &res::display_time(post.created_at))
                    .replace("{creator_name}", &res::escape(&post.creator_name))
                    .replace("{content}", &post_content(post))
            })
            .collect(),
        Tab::Photobook => panel
            .photos
            .iter()
            .map(|photo| {
                include_res!(str, "/pages/admin/photo_row.html")
                    .replace("{id}", &photo.id.to_string())
                    .replace("{created_at}", &res::display_time(photo.created_at))
                    .replace("{thumbnail_url}", &res::escape(&photo.thumbnail_url))
                    .replace("{uploader_name}", &res::escape(&photo.uploader_name))
            })
            .collect(),
        Tab::Guests => panel
            .guests
            .iter()
            .map(|guest| {
                include_res!(str, "/pages/admin/guest_row.html")
                    .replace("{id}", &guest.id.to_string())
                    .replace("{created_at}", &res::display_time(guest.created_at))
                    .replace("{name}", &res::escape(&guest.name))
            })
            .collect(),
    };

    let stats = &panel.stats;
    include_res!(str, "/pages/admin/panel.html")
        .replace("{total_posts}", &stats.total_posts.to_string())
        .replace("{total_photos}", &stats.total_photos.to_string())
        .replace("{total_users}", &stats.total_users.to_string())
        .replace("{text_posts}", &stats.text_posts.to_string())
        .replace("{image_posts}", &stats.image_posts.to_string())
        .replace("{drawing_posts}", &stats.drawing_posts.to_string())
        .replace("{rows}", &rows)
}
