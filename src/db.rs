use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::{ConfettiError, ConfettiResult};

// created_at columns hold unix milliseconds; listings order on (created_at, id).
const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS profiles (
    id TEXT PRIMARY KEY NOT NULL,
    name TEXT NOT NULL,
    created_at INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS photobook_images (
    id TEXT PRIMARY KEY NOT NULL,
    image_url TEXT NOT NULL,
    thumbnail_url TEXT NOT NULL,
    uploader_id TEXT NOT NULL,
    uploader_name TEXT NOT NULL,
    created_at INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS guestbook_posts (
    id TEXT PRIMARY KEY NOT NULL,
    creator_id TEXT NOT NULL,
    creator_name TEXT NOT NULL,
    type TEXT NOT NULL CHECK (type IN ('TEXT', 'IMAGE', 'DRAWING')),
    content TEXT NOT NULL,
    position_x INTEGER NOT NULL DEFAULT 0,
    position_y INTEGER NOT NULL DEFAULT 0,
    created_at INTEGER NOT NULL
);

CREATE INDEX IF NOT EXISTS photobook_images_created ON photobook_images (created_at DESC, id DESC);
CREATE INDEX IF NOT EXISTS guestbook_posts_created ON guestbook_posts (created_at DESC, id DESC);
CREATE INDEX IF NOT EXISTS profiles_created ON profiles (created_at DESC, id DESC);
"#;

pub async fn init(db_pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::raw_sql(SCHEMA).execute(db_pool).await?;
    Ok(())
}

/// The identity a device carries around. Content written by the guest
/// copies `name` as it is at that moment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub id: Uuid,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Guest {
    pub id: Uuid,
    pub name: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl From<&Guest> for Profile {
    fn from(guest: &Guest) -> Self {
        Profile {
            id: guest.id,
            name: guest.name.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhotobookImage {
    pub id: Uuid,
    pub image_url: String,
    pub thumbnail_url: String,
    pub uploader_id: Uuid,
    pub uploader_name: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PostKind {
    Text,
    Image,
    Drawing,
}

impl PostKind {
    pub fn as_str(&self) -> &'static str {
        use PostKind::*;
        match self {
            Text => "TEXT",
            Image => "IMAGE",
            Drawing => "DRAWING",
        }
    }
}

impl fmt::Display for PostKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PostKind {
    type Err = ConfettiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "TEXT" => Ok(PostKind::Text),
            "IMAGE" => Ok(PostKind::Image),
            "DRAWING" => Ok(PostKind::Drawing),
            other => Err(ConfettiError::validation(format!("unknown post type {other}"))),
        }
    }
}

/// A wall entry. `content` is the text body for [`PostKind::Text`] and the
/// public blob URL otherwise.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WallPost {
    pub id: Uuid,
    pub creator_id: Uuid,
    pub creator_name: String,
    #[serde(rename = "type")]
    pub kind: PostKind,
    pub content: String,
    pub position_x: i64,
    pub position_y: i64,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl WallPost {
    pub fn new(author: &Profile, kind: PostKind, content: String) -> Self {
        WallPost {
            id: Uuid::now_v7(),
            creator_id: author.id,
            creator_name: author.name.clone(),
            kind,
            content,
            position_x: 0,
            position_y: 0,
            created_at: now(),
        }
    }
}

/// Current time truncated to the millisecond precision the tables keep.
pub fn now() -> OffsetDateTime {
    let now = OffsetDateTime::now_utc();
    now - time::Duration::nanoseconds((now.nanosecond() % 1_000_000) as i64)
}

pub fn to_millis(at: OffsetDateTime) -> i64 {
    (at.unix_timestamp_nanos() / 1_000_000) as i64
}

pub fn from_millis(millis: i64) -> ConfettiResult<OffsetDateTime> {
    OffsetDateTime::from_unix_timestamp_nanos(millis as i128 * 1_000_000)
        .map_err(|e| ConfettiError::Other(e.into()))
}

pub fn parse_id(id: &str) -> ConfettiResult<Uuid> {
    Uuid::parse_str(id).map_err(|e| ConfettiError::Other(e.into()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn post_kinds_use_uppercase_names() {
        for kind in [PostKind::Text, PostKind::Image, PostKind::Drawing] {
            assert_eq!(kind.as_str().parse::<PostKind>().unwrap(), kind);
        }
        assert!("text".parse::<PostKind>().is_err());
        assert_eq!(serde_json::to_string(&PostKind::Drawing).unwrap(), "\"DRAWING\"");
    }

    #[test]
    fn millis_survive_the_round_trip() {
        let at = now();
        assert_eq!(from_millis(to_millis(at)).unwrap(), at);
    }

    #[test]
    fn new_posts_snapshot_the_author_and_sit_at_origin() {
        let author = Profile { id: Uuid::now_v7(), name: "Alice".into() };
        let post = WallPost::new(&author, PostKind::Text, "Congrats!".into());
        assert_eq!(post.creator_id, author.id);
        assert_eq!(post.creator_name, "Alice");
        assert_eq!((post.position_x, post.position_y), (0, 0));

        let json = serde_json::to_value(&post).unwrap();
        assert_eq!(json["type"], "TEXT");
    }
}
