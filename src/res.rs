use axum::{http::StatusCode, response::{Html, IntoResponse, Response}};
use pulldown_cmark_escape::escape_html;
use time::{macros::format_description, OffsetDateTime};

use crate::{feedback::Banners, AppResult};

#[macro_export]
macro_rules! include_res {
    (bytes, $p:expr) => {
        include_bytes!(concat!(env!("CARGO_MANIFEST_DIR"), "/res", $p))
    };
    (str, $p:expr) => {
        include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/res", $p))
    };
}

/// Wraps a page body in the shared layout along with any pending banners.
pub fn page(title: &str, body: &str, banners: &Banners) -> Html<String> {
    let ack = if banners.acknowledged {
        include_res!(str, "/pages/ack.html")
    } else {
        ""
    };

    Html(
        include_res!(str, "/pages/layout.html")
            .replace("{title}", &escape(title))
            .replace("{ack}", ack)
            .replace("{alert}", &alert_script(banners.alert.as_deref()))
            .replace("{body}", body),
    )
}

pub fn sorry(what: &str) -> AppResult<Response> {
    let body = include_res!(str, "/pages/sorry.html").replace("{what}", &escape(what));
    Ok((StatusCode::NOT_FOUND, page("Not found", &body, &Banners::default())).into_response())
}

/// HTML-escapes text. Braces are escaped too so guest text can never be
/// mistaken for a template slot.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    // a String sink never fails
    let _ = escape_html(&mut out, text);
    escape_braces(&out)
}

pub fn escape_braces(html: &str) -> String {
    html.replace('{', "&#123;").replace('}', "&#125;")
}

pub fn display_time(at: OffsetDateTime) -> String {
    at.format(format_description!("[day]/[month]/[year] [hour]:[minute]"))
        .unwrap_or_default()
}

fn alert_script(message: Option<&str>) -> String {
    let Some(message) = message else {
        return String::new();
    };
    let literal = serde_json::to_string(message)
        .unwrap_or_default()
        .replace('<', "\\u003c");
    format!(r#"<script>window.addEventListener("load", () => alert({literal}));</script>"#)
}
