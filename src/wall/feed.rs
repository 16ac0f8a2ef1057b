use std::sync::Arc;

use anyhow::Context;

use crate::{
    blobs::{self, Blobs, GUESTBOOK_PREFIX},
    canvas::{CanvasEvent, DrawingSurface},
    db::{PostKind, Profile, WallPost},
    store::Store,
    transcode::{self, DEFAULT_BUDGET},
    ConfettiError, ConfettiResult,
};

pub const MAX_MESSAGE_CHARS: usize = 4000;

#[derive(Debug, Default, Clone)]
pub struct Wall {
    pub posts: Vec<WallPost>,
}

impl Wall {
    /// Fetches every post, newest first. A failed read is logged and shows
    /// as an empty wall.
    pub async fn load(store: &Store) -> Wall {
        match store.posts().await {
            Ok(posts) => Wall { posts },
            Err(e) => {
                tracing::warn!(error = %e, "could not fetch wall");
                Wall::default()
            }
        }
    }

    #[tracing::instrument(skip(self, store, text), fields(author = %author.name))]
    pub async fn post_text(&mut self, store: &Store, author: &Profile, text: &str) -> ConfettiResult<WallPost> {
        let text = text.trim();
        if text.is_empty() {
            return Err(ConfettiError::validation("message must not be empty"));
        }
        if text.chars().count() > MAX_MESSAGE_CHARS {
            return Err(ConfettiError::validation(format!("message is longer than {MAX_MESSAGE_CHARS} characters")));
        }

        self.publish(store, WallPost::new(author, PostKind::Text, text.to_owned())).await
    }

    #[tracing::instrument(skip(self, store, blobs, bytes), fields(author = %author.name, input = bytes.len()))]
    pub async fn post_image(
        &mut self,
        store: &Store,
        blobs: &Blobs,
        author: &Profile,
        bytes: Vec<u8>,
    ) -> ConfettiResult<WallPost> {
        let compressed = transcode::recompress_blocking(Arc::from(bytes), DEFAULT_BUDGET).await?;
        let url = store_blob(blobs, "jpg", &compressed.bytes).await?;
        self.publish(store, WallPost::new(author, PostKind::Image, url)).await
    }

    /// Replays the recorded strokes onto a fresh surface and posts the
    /// resulting picture.
    #[tracing::instrument(skip(self, store, blobs, events), fields(author = %author.name, events = events.len()))]
    pub async fn post_drawing(
        &mut self,
        store: &Store,
        blobs: &Blobs,
        author: &Profile,
        events: Vec<CanvasEvent>,
    ) -> ConfettiResult<WallPost> {
        let png = tokio::task::spawn_blocking(move || {
            let mut surface = DrawingSurface::new();
            surface.replay(&events)?;
            surface.export_png()
        })
        .await
        .context("drawing task")??;

        let url = store_blob(blobs, "png", &png).await?;
        self.publish(store, WallPost::new(author, PostKind::Drawing, url)).await
    }

    async fn publish(&mut self, store: &Store, post: WallPost) -> ConfettiResult<WallPost> {
        store.insert_post(&post).await?;
        tracing::info!(id = %post.id, kind = %post.kind, "wall post added");
        self.posts.insert(0, post.clone());
        Ok(post)
    }
}

async fn store_blob(blobs: &Blobs, ext: &str, bytes: &[u8]) -> ConfettiResult<String> {
    let path = format!("{GUESTBOOK_PREFIX}/{}", blobs::blob_name(ext));
    blobs.upload(&path, bytes).await?;
    Ok(blobs.public_url(&path))
}

#[cfg(test)]
mod tests {
    use std::{env, io::Cursor, path::PathBuf};

    use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};
    use uuid::Uuid;

    use super::*;
    use crate::canvas::CANVAS_SIZE;

    fn scratch() -> PathBuf {
        env::temp_dir().join(format!("confetti_wall_{}", Uuid::now_v7().simple()))
    }

    fn guest(name: &str) -> Profile {
        Profile { id: Uuid::now_v7(), name: name.into() }
    }

    fn stored_path(url: &str) -> &str {
        url.trim_start_matches("http://party.local/storage/")
    }

    #[tokio::test]
    async fn text_post_becomes_the_newest_item() {
        let store = Store::in_memory().await.unwrap();
        let mut wall = Wall::load(&store).await;
        let alice = guest("Alice");

        wall.post_text(&store, &alice, "Auguri!").await.unwrap();
        let post = wall.post_text(&store, &alice, "Congrats!").await.unwrap();

        let stored = store.posts().await.unwrap();
        assert_eq!(stored.len(), 2);
        let congrats: Vec<_> = stored.iter().filter(|p| p.content == "Congrats!").collect();
        assert_eq!(congrats.len(), 1);
        assert_eq!(congrats[0].kind, PostKind::Text);

        assert_eq!(wall.posts[0], post);
        assert_eq!(Wall::load(&store).await.posts[0].content, "Congrats!");
    }

    #[tokio::test]
    async fn blank_text_is_rejected_without_writing() {
        let store = Store::in_memory().await.unwrap();
        let mut wall = Wall::default();
        assert!(matches!(
            wall.post_text(&store, &guest("Bob"), " \n\t ").await,
            Err(ConfettiError::Validation(_))
        ));
        assert!(store.posts().await.unwrap().is_empty());
        assert!(wall.posts.is_empty());
    }

    #[tokio::test]
    async fn names_are_snapshots() {
        let store = Store::in_memory().await.unwrap();
        let mut wall = Wall::default();
        let mut carol = guest("Carol");
        wall.post_text(&store, &carol, "hi").await.unwrap();

        carol.name = "Carol R.".into();
        wall.post_text(&store, &carol, "hi again").await.unwrap();

        let names: Vec<_> = store.posts().await.unwrap().into_iter().map(|p| p.creator_name).collect();
        assert_eq!(names, ["Carol R.", "Carol"]);
    }

    #[tokio::test]
    async fn image_post_references_a_stored_jpeg() {
        let root = scratch();
        let store = Store::in_memory().await.unwrap();
        let blobs = Blobs::new(&root, "http://party.local");

        let mut png = Vec::new();
        DynamicImage::ImageRgba8(RgbaImage::from_pixel(64, 48, Rgba([10, 200, 30, 255])))
            .write_to(&mut Cursor::new(&mut png), ImageFormat::Png)
            .unwrap();

        let mut wall = Wall::default();
        let post = wall.post_image(&store, &blobs, &guest("Dan"), png).await.unwrap();
        assert_eq!(post.kind, PostKind::Image);
        assert!(post.content.starts_with("http://party.local/storage/guestbook/"));
        assert!(post.content.ends_with(".jpg"));

        let stored = image::open(root.join(stored_path(&post.content))).unwrap();
        assert_eq!((stored.width(), stored.height()), (64, 48));
        let _ = std::fs::remove_dir_all(&root);
    }

    #[tokio::test]
    async fn drawing_post_replays_strokes_into_a_png() {
        let root = scratch();
        let store = Store::in_memory().await.unwrap();
        let blobs = Blobs::new(&root, "http://party.local");
        let events = vec![
            CanvasEvent::Width { value: 1 },
            CanvasEvent::Down { x: 7.0, y: 8.0 },
            CanvasEvent::Up,
        ];

        let mut wall = Wall::default();
        let post = wall.post_drawing(&store, &blobs, &guest("Eve"), events).await.unwrap();
        assert_eq!(post.kind, PostKind::Drawing);
        assert!(post.content.ends_with(".png"));

        let drawing = image::open(root.join(stored_path(&post.content))).unwrap().to_rgba8();
        assert_eq!(drawing.dimensions(), (CANVAS_SIZE, CANVAS_SIZE));
        assert_eq!(drawing.get_pixel(7, 8).0, [0, 0, 0, 255]);
        assert_eq!(drawing.get_pixel(8, 8).0, [255, 255, 255, 255]);
        let _ = std::fs::remove_dir_all(&root);
    }

    #[tokio::test]
    async fn bad_drawing_is_rejected_before_upload() {
        let root = scratch();
        let store = Store::in_memory().await.unwrap();
        let blobs = Blobs::new(&root, "http://party.local");
        let events = vec![CanvasEvent::Color { value: "blue".into() }];

        let mut wall = Wall::default();
        assert!(wall.post_drawing(&store, &blobs, &guest("Eve"), events).await.is_err());
        assert!(!root.exists());
        assert!(store.posts().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn failed_insert_keeps_the_wall_unchanged() {
        let store = Store::in_memory().await.unwrap();
        let mut wall = Wall::load(&store).await;
        store.pool().close().await;
        assert!(wall.post_text(&store, &guest("Fay"), "Congrats!").await.is_err());
        assert!(wall.posts.is_empty());
    }
}
