//! The shared record store: guests, photobook images and wall posts.

use std::str::FromStr;

use sqlx::{sqlite::{SqliteConnectOptions, SqlitePoolOptions}, SqlitePool};
use uuid::Uuid;

use crate::{db::{self, Guest, PhotobookImage, PostKind, WallPost}, ConfettiError, ConfettiResult};

type PhotoRow = (String, String, String, String, String, i64);
type PostRow = (String, String, String, String, String, i64, i64, i64);

#[derive(Clone)]
pub struct Store {
    db_pool: SqlitePool,
}

impl Store {
    pub async fn connect(database_url: &str) -> ConfettiResult<Store> {
        let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
        let db_pool = SqlitePoolOptions::new()
            .max_connections(16)
            .connect_with(options)
            .await?;
        Store::from_pool(db_pool).await
    }

    /// A private database that lives as long as the store. One connection,
    /// since every sqlite memory connection is its own database.
    pub async fn in_memory() -> ConfettiResult<Store> {
        let db_pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await?;
        Store::from_pool(db_pool).await
    }

    pub async fn from_pool(db_pool: SqlitePool) -> ConfettiResult<Store> {
        db::init(&db_pool).await?;
        Ok(Store { db_pool })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.db_pool
    }

    pub async fn upsert_profile(&self, guest: &Guest) -> ConfettiResult<()> {
        sqlx::query("INSERT INTO profiles (id,name,created_at) VALUES (?,?,?) ON CONFLICT(id) DO UPDATE SET name=excluded.name")
            .bind(guest.id.to_string())
            .bind(&guest.name)
            .bind(db::to_millis(guest.created_at))
            .execute(&self.db_pool)
            .await?;
        Ok(())
    }

    pub async fn profiles(&self) -> ConfettiResult<Vec<Guest>> {
        let rows: Vec<(String, String, i64)> =
            sqlx::query_as("SELECT id,name,created_at FROM profiles ORDER BY created_at DESC, id DESC")
                .fetch_all(&self.db_pool)
                .await?;

        rows.into_iter()
            .map(|(id, name, created_at)| {
                Ok(Guest {
                    id: db::parse_id(&id)?,
                    name,
                    created_at: db::from_millis(created_at)?,
                })
            })
            .collect()
    }

    pub async fn insert_photo(&self, image: &PhotobookImage) -> ConfettiResult<()> {
        sqlx::query("INSERT INTO photobook_images (id,image_url,thumbnail_url,uploader_id,uploader_name,created_at) VALUES (?,?,?,?,?,?)")
            .bind(image.id.to_string())
            .bind(&image.image_url)
            .bind(&image.thumbnail_url)
            .bind(image.uploader_id.to_string())
            .bind(&image.uploader_name)
            .bind(db::to_millis(image.created_at))
            .execute(&self.db_pool)
            .await?;
        Ok(())
    }

    pub async fn photos(&self) -> ConfettiResult<Vec<PhotobookImage>> {
        let rows: Vec<PhotoRow> = sqlx::query_as(
            "SELECT id,image_url,thumbnail_url,uploader_id,uploader_name,created_at FROM photobook_images ORDER BY created_at DESC, id DESC",
        )
        .fetch_all(&self.db_pool)
        .await?;

        rows.into_iter().map(photo_from_row).collect()
    }

    pub async fn photo(&self, id: Uuid) -> ConfettiResult<Option<PhotobookImage>> {
        let row: Option<PhotoRow> = sqlx::query_as(
            "SELECT id,image_url,thumbnail_url,uploader_id,uploader_name,created_at FROM photobook_images WHERE id=?",
        )
        .bind(id.to_string())
        .fetch_optional(&self.db_pool)
        .await?;

        row.map(photo_from_row).transpose()
    }

    pub async fn delete_photo(&self, id: Uuid) -> ConfettiResult<()> {
        let result = sqlx::query("DELETE FROM photobook_images WHERE id=?")
            .bind(id.to_string())
            .execute(&self.db_pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(ConfettiError::not_found(format!("photo {id}")));
        }
        Ok(())
    }

    pub async fn insert_post(&self, post: &WallPost) -> ConfettiResult<()> {
        sqlx::query("INSERT INTO guestbook_posts (id,creator_id,creator_name,type,content,position_x,position_y,created_at) VALUES (?,?,?,?,?,?,?,?)")
            .bind(post.id.to_string())
            .bind(post.creator_id.to_string())
            .bind(&post.creator_name)
            .bind(post.kind.as_str())
            .bind(&post.content)
            .bind(post.position_x)
            .bind(post.position_y)
            .bind(db::to_millis(post.created_at))
            .execute(&self.db_pool)
            .await?;
        Ok(())
    }

    pub async fn posts(&self) -> ConfettiResult<Vec<WallPost>> {
        let rows: Vec<PostRow> = sqlx::query_as(
            "SELECT id,creator_id,creator_name,type,content,position_x,position_y,created_at FROM guestbook_posts ORDER BY created_at DESC, id DESC",
        )
        .fetch_all(&self.db_pool)
        .await?;

        rows.into_iter()
            .map(|(id, creator_id, creator_name, kind, content, position_x, position_y, created_at)| {
                Ok(WallPost {
                    id: db::parse_id(&id)?,
                    creator_id: db::parse_id(&creator_id)?,
                    creator_name,
                    kind: PostKind::from_str(&kind)?,
                    content,
                    position_x,
                    position_y,
                    created_at: db::from_millis(created_at)?,
                })
            })
            .collect()
    }

    pub async fn delete_post(&self, id: Uuid) -> ConfettiResult<()> {
        let result = sqlx::query("DELETE FROM guestbook_posts WHERE id=?")
            .bind(id.to_string())
            .execute(&self.db_pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(ConfettiError::not_found(format!("post {id}")));
        }
        Ok(())
    }
}

fn photo_from_row((id, image_url, thumbnail_url, uploader_id, uploader_name, created_at): PhotoRow) -> ConfettiResult<PhotobookImage> {
    Ok(PhotobookImage {
        id: db::parse_id(&id)?,
        image_url,
        thumbnail_url,
        uploader_id: db::parse_id(&uploader_id)?,
        uploader_name,
        created_at: db::from_millis(created_at)?,
    })
}
