//! Per-device state: the guest's identity, the moderation flag and the
//! short-lived feedback shown after a submission.
//!
//! In the running service the device is the guest's browser and the state
//! rides in its session; tests use [`MemoryDevice`].

use std::{collections::HashMap, future::Future, sync::Mutex};

use serde::{de::DeserializeOwned, Serialize};
use tower_sessions::Session;

use crate::{ConfettiError, ConfettiResult};

pub trait DeviceStore: Send + Sync {
    fn load<T>(&self, key: &'static str) -> impl Future<Output = ConfettiResult<Option<T>>> + Send
    where
        T: DeserializeOwned + Send;

    fn save<T>(&self, key: &'static str, value: &T) -> impl Future<Output = ConfettiResult<()>> + Send
    where
        T: Serialize + Sync;

    fn forget(&self, key: &'static str) -> impl Future<Output = ConfettiResult<()>> + Send;
}

impl DeviceStore for Session {
    async fn load<T>(&self, key: &'static str) -> ConfettiResult<Option<T>>
    where
        T: DeserializeOwned + Send,
    {
        Ok(self.get::<T>(key).await?)
    }

    async fn save<T>(&self, key: &'static str, value: &T) -> ConfettiResult<()>
    where
        T: Serialize + Sync,
    {
        Ok(self.insert(key, value).await?)
    }

    async fn forget(&self, key: &'static str) -> ConfettiResult<()> {
        self.remove_value(key).await?;
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct MemoryDevice {
    values: Mutex<HashMap<&'static str, serde_json::Value>>,
}

impl MemoryDevice {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.values.lock().map(|values| values.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn with_values<R>(&self, f: impl FnOnce(&mut HashMap<&'static str, serde_json::Value>) -> R) -> ConfettiResult<R> {
        let mut values = self
            .values
            .lock()
            .map_err(|_| ConfettiError::Other(anyhow::anyhow!("device state poisoned")))?;
        Ok(f(&mut values))
    }
}

impl DeviceStore for MemoryDevice {
    async fn load<T>(&self, key: &'static str) -> ConfettiResult<Option<T>>
    where
        T: DeserializeOwned + Send,
    {
        let Some(value) = self.with_values(|values| values.get(key).cloned())? else {
            return Ok(None);
        };
        serde_json::from_value(value)
            .map(Some)
            .map_err(|e| ConfettiError::Other(e.into()))
    }

    async fn save<T>(&self, key: &'static str, value: &T) -> ConfettiResult<()>
    where
        T: Serialize + Sync,
    {
        let value = serde_json::to_value(value).map_err(|e| ConfettiError::Other(e.into()))?;
        self.with_values(|values| {
            values.insert(key, value);
        })
    }

    async fn forget(&self, key: &'static str) -> ConfettiResult<()> {
        self.with_values(|values| {
            values.remove(key);
        })
    }
}
