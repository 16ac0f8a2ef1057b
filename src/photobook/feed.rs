use std::sync::Arc;

use uuid::Uuid;

use crate::{
    blobs::{self, Blobs, PHOTOBOOK_PREFIX, THUMBNAIL_PREFIX},
    db::{self, PhotobookImage, Profile},
    store::Store,
    transcode::{self, DEFAULT_BUDGET, THUMBNAIL_EDGE},
    ConfettiResult,
};

/// Photobook as a guest sees it: every photo, newest first.
#[derive(Debug, Default, Clone)]
pub struct Photobook {
    pub photos: Vec<PhotobookImage>,
}

impl Photobook {
    /// Fetches the album. A failed read is logged and shows as empty.
    pub async fn load(store: &Store) -> Photobook {
        match store.photos().await {
            Ok(photos) => Photobook { photos },
            Err(e) => {
                tracing::warn!(error = %e, "could not fetch photobook");
                Photobook::default()
            }
        }
    }

    /// Recompresses and thumbnails `bytes`, stores both blobs and records the
    /// photo. Any failure stops the remaining steps; blobs already written
    /// stay behind unreferenced.
    #[tracing::instrument(skip(self, store, blobs, bytes), fields(uploader = %uploader.name, input = bytes.len()))]
    pub async fn upload(
        &mut self,
        store: &Store,
        blobs: &Blobs,
        uploader: &Profile,
        bytes: Vec<u8>,
    ) -> ConfettiResult<PhotobookImage> {
        let source: Arc<[u8]> = bytes.into();
        let (full, thumbnail) = tokio::try_join!(
            transcode::recompress_blocking(source.clone(), DEFAULT_BUDGET),
            transcode::thumbnail_blocking(source, THUMBNAIL_EDGE),
        )?;

        let name = blobs::blob_name("jpg");
        let image_path = format!("{PHOTOBOOK_PREFIX}/{name}");
        blobs.upload(&image_path, &full.bytes).await?;

        let thumbnail_path = format!("{THUMBNAIL_PREFIX}/thumb_{name}");
        blobs.upload(&thumbnail_path, &thumbnail.bytes).await?;

        let image = PhotobookImage {
            id: Uuid::now_v7(),
            image_url: blobs.public_url(&image_path),
            thumbnail_url: blobs.public_url(&thumbnail_path),
            uploader_id: uploader.id,
            uploader_name: uploader.name.clone(),
            created_at: db::now(),
        };
        store.insert_photo(&image).await?;

        tracing::info!(id = %image.id, quality = full.quality, size = full.bytes.len(), "photo added");
        self.photos.insert(0, image.clone());
        Ok(image)
    }
}
