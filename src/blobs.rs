//! Object storage: one shared directory with logical prefixes, served
//! read-only under `/storage`.

use std::{
    path::{Component, Path, PathBuf},
    sync::Arc,
};

use rand::Rng;
use tokio::{fs, io::AsyncWriteExt};

use crate::{db, ConfettiError, ConfettiResult};

pub const GUESTBOOK_PREFIX: &str = "guestbook";
pub const PHOTOBOOK_PREFIX: &str = "photobook";
pub const THUMBNAIL_PREFIX: &str = "photobook/thumbnails";

const BASE36: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

#[derive(Clone)]
pub struct Blobs {
    root: Arc<PathBuf>,
    public_base_url: Arc<str>,
}

impl Blobs {
    pub fn new(root: impl Into<PathBuf>, public_base_url: &str) -> Blobs {
        Blobs {
            root: Arc::new(root.into()),
            public_base_url: Arc::from(public_base_url.trim_end_matches('/')),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Writes a new blob. Existing blobs are never overwritten.
    #[tracing::instrument(skip(self, bytes), fields(size = bytes.len()))]
    pub async fn upload(&self, path: &str, bytes: &[u8]) -> ConfettiResult<()> {
        let target = self.resolve(path)?;
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).await?;
        }

        let mut file = fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&target)
            .await?;
        file.write_all(bytes).await?;
        file.flush().await?;

        tracing::debug!(path, "blob stored");
        Ok(())
    }

    pub fn public_url(&self, path: &str) -> String {
        format!("{}/storage/{}", self.public_base_url, path.trim_start_matches('/'))
    }

    fn resolve(&self, path: &str) -> ConfettiResult<PathBuf> {
        let relative = Path::new(path);
        let plain = !path.is_empty()
            && relative
                .components()
                .all(|component| matches!(component, Component::Normal(_)));
        if !plain {
            return Err(ConfettiError::validation(format!("bad blob path {path:?}")));
        }
        Ok(self.root.join(relative))
    }
}

/// `<unix millis>-<11 base36 chars>.<ext>`, unique enough for a party.
pub fn blob_name(ext: &str) -> String {
    let mut rng = rand::rng();
    let suffix: String = (0..11)
        .map(|_| BASE36[rng.random_range(0..BASE36.len())] as char)
        .collect();
    format!("{}-{suffix}.{ext}", db::to_millis(db::now()))
}
