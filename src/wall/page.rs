use axum::{debug_handler, extract::State, response::{IntoResponse, Response}};
use pulldown_cmark::{CowStr, Event, Parser, Tag};
use tower_sessions::Session;

use crate::{canvas::PALETTE, db::{PostKind, WallPost}, feedback::Banners, include_res, onboarding, res, store::Store, AppResult, AppState};

use super::Wall;

#[debug_handler(state = AppState)]
pub(crate) async fn wall(
    State(store): State<Store>,
    session: Session,
) -> AppResult<Response> {
    if onboarding::current_profile(&session).await?.is_none() {
        return Ok(onboarding::redirect_to_welcome("/wall"));
    }

    let wall = Wall::load(&store).await;
    let posts: String = wall.posts.iter().map(post_item).collect();
    let empty = if wall.posts.is_empty() {
        include_res!(str, "/pages/wall/empty.html")
    } else {
        ""
    };
    let palette: String = PALETTE
        .iter()
        .map(|color| include_res!(str, "/pages/wall/swatch.html").replace("{color}", color))
        .collect();

    let body = include_res!(str, "/pages/wall/page.html")
        .replace("{palette}", &palette)
        .replace("{empty}", empty)
        .replace("{posts}", &posts);
    Ok(res::page("Message wall", &body, &Banners::take(&session).await?).into_response())
}

pub(crate) fn post_content(post: &WallPost) -> String {
    match post.kind {
        PostKind::Text => render_text(&post.content),
        PostKind::Image => format!(
            r#"<img src="{}" alt="Photo by {}" loading="lazy">"#,
            res::escape(&post.content),
            res::escape(&post.creator_name)
        ),
        PostKind::Drawing => format!(
            r#"<img src="{}" alt="Drawing by {}" loading="lazy" width="300" height="300">"#,
            res::escape(&post.content),
            res::escape(&post.creator_name)
        ),
    }
}

fn post_item(post: &WallPost) -> String {
    include_res!(str, "/pages/wall/post_item.html")
        .replace("{kind_class}", &post.kind.as_str().to_lowercase())
        .replace("{created_at}", &res::display_time(post.created_at))
        .replace("{creator_name}", &res::escape(&post.creator_name))
        .replace("{content}", &post_content(post))
}

/// Markdown for guest messages. Raw HTML is shown as text, never rendered,
/// and links or images may only point at web, mail or relative targets.
fn render_text(text: &str) -> String {
    let parser = Parser::new(text).map(|event| match event {
        Event::Html(html) | Event::InlineHtml(html) => Event::Text(html),
        Event::Start(Tag::Link { link_type, dest_url, title, id }) => Event::Start(Tag::Link {
            link_type,
            dest_url: safe_destination(dest_url),
            title,
            id,
        }),
        Event::Start(Tag::Image { link_type, dest_url, title, id }) => Event::Start(Tag::Image {
            link_type,
            dest_url: safe_destination(dest_url),
            title,
            id,
        }),
        _ => event,
    });

    let mut html_output = String::new();
    pulldown_cmark::html::push_html(&mut html_output, parser);
    res::escape_braces(&html_output)
}

const SAFE_SCHEMES: [&str; 3] = ["http", "https", "mailto"];

fn safe_destination(dest_url: CowStr<'_>) -> CowStr<'_> {
    // browsers ignore whitespace and control characters inside a scheme
    let cleaned: String = dest_url
        .chars()
        .filter(|c| !c.is_ascii_whitespace() && !c.is_control())
        .collect();
    let scheme = match cleaned.find(|c| matches!(c, ':' | '/' | '?' | '#')) {
        Some(at) if cleaned[at..].starts_with(':') => Some(cleaned[..at].to_ascii_lowercase()),
        _ => None,
    };

    match scheme {
        Some(scheme) if !SAFE_SCHEMES.contains(&scheme.as_str()) => CowStr::Borrowed("#"),
        _ => dest_url,
    }
}
