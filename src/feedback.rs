//! What a guest sees after acting: a "thank you" that fades after a few
//! seconds, or a one-shot alert when something went wrong.

use time::{Duration, OffsetDateTime};

use crate::{device::DeviceStore, session::{ACK_UNTIL, ALERT}, db, ConfettiResult};

pub const ACK_DURATION: Duration = Duration::seconds(3);

pub async fn acknowledge(device: &impl DeviceStore) -> ConfettiResult<()> {
    acknowledge_at(device, db::now()).await
}

pub async fn acknowledge_at(device: &impl DeviceStore, now: OffsetDateTime) -> ConfettiResult<()> {
    device.save(ACK_UNTIL, &db::to_millis(now + ACK_DURATION)).await
}

/// Whether the acknowledgement should still be on screen. An expired one
/// is dropped from the device.
pub async fn acknowledgement_live(device: &impl DeviceStore) -> ConfettiResult<bool> {
    acknowledgement_live_at(device, db::now()).await
}

pub async fn acknowledgement_live_at(device: &impl DeviceStore, now: OffsetDateTime) -> ConfettiResult<bool> {
    let Some(until) = device.load::<i64>(ACK_UNTIL).await? else {
        return Ok(false);
    };
    if db::to_millis(now) < until {
        return Ok(true);
    }
    device.forget(ACK_UNTIL).await?;
    Ok(false)
}

pub async fn alert(device: &impl DeviceStore, message: impl Into<String>) -> ConfettiResult<()> {
    let message: String = message.into();
    device.save(ALERT, &message).await
}

/// Returns the pending alert once; later calls see nothing until the next
/// [`alert`].
pub async fn take_alert(device: &impl DeviceStore) -> ConfettiResult<Option<String>> {
    let message = device.load::<String>(ALERT).await?;
    if message.is_some() {
        device.forget(ALERT).await?;
    }
    Ok(message)
}

/// Alert plus acknowledgement state for a page about to render.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Banners {
    pub alert: Option<String>,
    pub acknowledged: bool,
}

impl Banners {
    pub async fn take(device: &impl DeviceStore) -> ConfettiResult<Banners> {
        Ok(Banners {
            alert: take_alert(device).await?,
            acknowledged: acknowledgement_live(device).await?,
        })
    }
}
