use uuid::Uuid;

use crate::{db::{self, Guest, Profile}, device::DeviceStore, session::GUEST_PROFILE, store::Store, ConfettiError, ConfettiResult};

/// The profile this device registered earlier, if any. Never touches the
/// store: a persisted profile is trusted as is.
pub async fn current_profile(device: &impl DeviceStore) -> ConfettiResult<Option<Profile>> {
    device.load::<Profile>(GUEST_PROFILE).await
}

/// Creates a guest record for `name` and remembers it on the device. If the
/// store write fails nothing is remembered, so the guest simply tries again.
#[tracing::instrument(skip(store, device))]
pub async fn register(store: &Store, device: &impl DeviceStore, name: &str) -> ConfettiResult<Profile> {
    let name = name.trim();
    if name.is_empty() {
        return Err(ConfettiError::validation("name must not be empty"));
    }

    let guest = Guest {
        id: Uuid::now_v7(),
        name: name.to_owned(),
        created_at: db::now(),
    };
    store.upsert_profile(&guest).await?;

    let profile = Profile::from(&guest);
    device.save(GUEST_PROFILE, &profile).await?;

    tracing::info!(id = %profile.id, name = %profile.name, "guest registered");
    Ok(profile)
}
