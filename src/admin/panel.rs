use uuid::Uuid;

use crate::{
    db::{Guest, PhotobookImage, PostKind, WallPost},
    device::DeviceStore,
    session::ADMIN_AUTHENTICATED,
    store::Store,
    ConfettiError, ConfettiResult,
};

use super::authority::Authority;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Stats {
    pub total_posts: usize,
    pub total_photos: usize,
    pub total_users: usize,
    pub text_posts: usize,
    pub image_posts: usize,
    pub drawing_posts: usize,
}

impl Stats {
    pub fn tally(posts: &[WallPost], photos: &[PhotobookImage], guests: &[Guest]) -> Stats {
        let mut stats = Stats {
            total_posts: posts.len(),
            total_photos: photos.len(),
            total_users: guests.len(),
            ..Stats::default()
        };
        for post in posts {
            *stats.kind_mut(post.kind) += 1;
        }
        stats
    }

    pub fn of_kind(&self, kind: PostKind) -> usize {
        use PostKind::*;
        match kind {
            Text => self.text_posts,
            Image => self.image_posts,
            Drawing => self.drawing_posts,
        }
    }

    fn kind_mut(&mut self, kind: PostKind) -> &mut usize {
        use PostKind::*;
        match kind {
            Text => &mut self.text_posts,
            Image => &mut self.image_posts,
            Drawing => &mut self.drawing_posts,
        }
    }
}

/// Everything an administrator sees: all three collections in full, plus
/// counts kept in step with them as content is removed.
#[derive(Debug, Default, Clone)]
pub struct ModerationPanel {
    pub posts: Vec<WallPost>,
    pub photos: Vec<PhotobookImage>,
    pub guests: Vec<Guest>,
    pub stats: Stats,
}

pub async fn is_authenticated(device: &impl DeviceStore) -> ConfettiResult<bool> {
    Ok(device.load::<bool>(ADMIN_AUTHENTICATED).await?.unwrap_or(false))
}

/// Checks `credential` and remembers a success on the device, so the
/// administrator isn't asked again until they log out.
pub async fn login(authority: &Authority, device: &impl DeviceStore, credential: &str) -> ConfettiResult<()> {
    if !authority.verify(credential) {
        tracing::warn!("rejected moderation credential");
        return Err(ConfettiError::Unauthorized);
    }
    device.save(ADMIN_AUTHENTICATED, &true).await?;
    tracing::info!("moderator logged in");
    Ok(())
}

pub async fn logout(device: &impl DeviceStore) -> ConfettiResult<()> {
    device.forget(ADMIN_AUTHENTICATED).await
}

#[tracing::instrument(skip(store))]
pub async fn remove_post(store: &Store, id: Uuid) -> ConfettiResult<()> {
    store.delete_post(id).await?;
    tracing::info!("wall post deleted");
    Ok(())
}

#[tracing::instrument(skip(store))]
pub async fn remove_photo(store: &Store, id: Uuid) -> ConfettiResult<()> {
    store.delete_photo(id).await?;
    tracing::info!("photo deleted");
    Ok(())
}

impl ModerationPanel {
    pub async fn load(store: &Store) -> ModerationPanel {
        let posts = store.posts().await.unwrap_or_else(|e| {
            tracing::warn!(error = %e, "could not fetch wall posts");
            Vec::new()
        });
        let photos = store.photos().await.unwrap_or_else(|e| {
            tracing::warn!(error = %e, "could not fetch photos");
            Vec::new()
        });
        let guests = store.profiles().await.unwrap_or_else(|e| {
            tracing::warn!(error = %e, "could not fetch guests");
            Vec::new()
        });

        let stats = Stats::tally(&posts, &photos, &guests);
        ModerationPanel { posts, photos, guests, stats }
    }

    /// Removes the post remotely, then from this panel without refetching.
    pub async fn delete_post(&mut self, store: &Store, id: Uuid) -> ConfettiResult<()> {
        remove_post(store, id).await?;
        if let Some(index) = self.posts.iter().position(|post| post.id == id) {
            let post = self.posts.remove(index);
            self.stats.total_posts = self.stats.total_posts.saturating_sub(1);
            let of_kind = self.stats.kind_mut(post.kind);
            *of_kind = of_kind.saturating_sub(1);
        }
        Ok(())
    }

    pub async fn delete_photo(&mut self, store: &Store, id: Uuid) -> ConfettiResult<()> {
        remove_photo(store, id).await?;
        if let Some(index) = self.photos.iter().position(|photo| photo.id == id) {
            self.photos.remove(index);
            self.stats.total_photos = self.stats.total_photos.saturating_sub(1);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        admin::authority::TokenAuthority,
        db::{self, Profile},
        device::MemoryDevice,
        onboarding,
    };

    fn photo(uploader: &Profile) -> PhotobookImage {
        PhotobookImage {
            id: Uuid::now_v7(),
            image_url: "http://h/storage/photobook/p.jpg".into(),
            thumbnail_url: "http://h/storage/photobook/thumbnails/thumb_p.jpg".into(),
            uploader_id: uploader.id,
            uploader_name: uploader.name.clone(),
            created_at: db::now(),
        }
    }

    async fn seeded() -> (Store, ModerationPanel, Vec<WallPost>) {
        let store = Store::in_memory().await.unwrap();
        let alice = onboarding::register(&store, &MemoryDevice::new(), "Alice").await.unwrap();
        let bob = onboarding::register(&store, &MemoryDevice::new(), "Bob").await.unwrap();

        let posts = vec![
            WallPost::new(&alice, PostKind::Text, "Congrats!".into()),
            WallPost::new(&bob, PostKind::Text, "Auguri!".into()),
            WallPost::new(&bob, PostKind::Image, "http://h/storage/guestbook/a.jpg".into()),
            WallPost::new(&alice, PostKind::Drawing, "http://h/storage/guestbook/b.png".into()),
        ];
        for post in &posts {
            store.insert_post(post).await.unwrap();
        }
        store.insert_photo(&photo(&alice)).await.unwrap();
        store.insert_photo(&photo(&bob)).await.unwrap();

        let panel = ModerationPanel::load(&store).await;
        (store, panel, posts)
    }

    #[tokio::test]
    async fn load_counts_everything() {
        let (_, panel, _) = seeded().await;
        assert_eq!(
            panel.stats,
            Stats {
                total_posts: 4,
                total_photos: 2,
                total_users: 2,
                text_posts: 2,
                image_posts: 1,
                drawing_posts: 1,
            }
        );
        assert_eq!(panel.guests[0].name, "Bob");
    }

    #[tokio::test]
    async fn deleting_a_post_updates_store_list_and_counts() {
        let (store, mut panel, posts) = seeded().await;
        let before = panel.stats;
        let target = &posts[0];

        panel.delete_post(&store, target.id).await.unwrap();

        assert!(store.posts().await.unwrap().iter().all(|p| p.id != target.id));
        assert!(panel.posts.iter().all(|p| p.id != target.id));
        assert_eq!(panel.stats.total_posts, before.total_posts - 1);
        assert_eq!(panel.stats.text_posts, before.text_posts - 1);
        assert_eq!(panel.stats.image_posts, before.image_posts);
        assert_eq!(panel.stats.drawing_posts, before.drawing_posts);
        assert_eq!(panel.stats.total_photos, before.total_photos);
        assert_eq!(panel.stats.total_users, before.total_users);
        assert_eq!(panel.stats, Stats::tally(&panel.posts, &panel.photos, &panel.guests));
    }

    #[tokio::test]
    async fn deleting_a_photo_leaves_posts_alone() {
        let (store, mut panel, _) = seeded().await;
        let before = panel.stats;
        let id = panel.photos[0].id;

        panel.delete_photo(&store, id).await.unwrap();
        assert_eq!(store.photos().await.unwrap().len(), 1);
        assert_eq!(panel.stats.total_photos, before.total_photos - 1);
        assert_eq!(panel.stats.total_posts, before.total_posts);
    }

    #[tokio::test]
    async fn failed_delete_changes_nothing() {
        let (store, mut panel, _) = seeded().await;
        let before = panel.stats;

        assert!(matches!(panel.delete_post(&store, Uuid::now_v7()).await, Err(ConfettiError::NotFound(_))));
        assert_eq!(panel.stats, before);

        store.pool().close().await;
        let id = panel.posts[0].id;
        assert!(panel.delete_post(&store, id).await.is_err());
        assert_eq!(panel.posts.len(), 4);
    }

    #[tokio::test]
    async fn unreadable_store_loads_an_empty_panel() {
        let store = Store::in_memory().await.unwrap();
        store.pool().close().await;
        let panel = ModerationPanel::load(&store).await;
        assert!(panel.posts.is_empty() && panel.photos.is_empty() && panel.guests.is_empty());
        assert_eq!(panel.stats, Stats::default());
    }

    #[tokio::test]
    async fn login_is_remembered_until_logout() {
        let authority = Authority::new(TokenAuthority::new("wedding2024").unwrap());
        let device = MemoryDevice::new();

        assert!(matches!(login(&authority, &device, "guess").await, Err(ConfettiError::Unauthorized)));
        assert!(!is_authenticated(&device).await.unwrap());

        login(&authority, &device, "wedding2024").await.unwrap();
        assert!(is_authenticated(&device).await.unwrap());

        logout(&device).await.unwrap();
        assert!(!is_authenticated(&device).await.unwrap());
    }
}
