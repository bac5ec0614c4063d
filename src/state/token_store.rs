//! Durable slot for the session token.
//!
//! SYSTEM CONTEXT
//! ==============
//! The token is the only piece of session state that outlives a page load.
//! Browser builds keep it in `localStorage`; native builds and tests use an
//! in-memory slot. Storage access is best-effort: failures are logged, never
//! propagated, and an empty stored string reads as "no token".

#[cfg(test)]
#[path = "token_store_test.rs"]
mod token_store_test;

use std::sync::{Arc, Mutex, PoisonError};

pub trait TokenStore: Send + Sync {
    /// Read the persisted token, if any.
    fn load(&self) -> Option<String>;

    /// Persist `token`, replacing any previous value.
    fn save(&self, token: &str);

    /// Remove the persisted token.
    fn clear(&self);
}

/// Token slot backed by browser `localStorage`.
#[derive(Clone, Debug)]
pub struct LocalStorageTokenStore {
    key: String,
}

impl LocalStorageTokenStore {
    #[must_use]
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }
}

#[cfg(feature = "hydrate")]
fn local_storage() -> Option<web_sys::Storage> {
    web_sys::window().and_then(|w| w.local_storage().ok().flatten())
}

impl TokenStore for LocalStorageTokenStore {
    fn load(&self) -> Option<String> {
        #[cfg(feature = "hydrate")]
        {
            let raw = local_storage()?.get_item(&self.key).ok().flatten()?;
            non_empty(raw)
        }
        #[cfg(not(feature = "hydrate"))]
        {
            None
        }
    }

    fn save(&self, token: &str) {
        #[cfg(feature = "hydrate")]
        {
            let Some(storage) = local_storage() else {
                log::warn!("localStorage unavailable; token for '{}' not persisted", self.key);
                return;
            };
            if storage.set_item(&self.key, token).is_err() {
                log::warn!("failed to persist token under '{}'", self.key);
            }
        }
        #[cfg(not(feature = "hydrate"))]
        {
            let _ = token;
        }
    }

    fn clear(&self) {
        #[cfg(feature = "hydrate")]
        {
            if let Some(storage) = local_storage() {
                if storage.remove_item(&self.key).is_err() {
                    log::warn!("failed to remove token under '{}'", self.key);
                }
            }
        }
    }
}

/// In-process token slot; clones share the same slot.
#[derive(Clone, Debug, Default)]
pub struct MemoryTokenStore {
    slot: Arc<Mutex<Option<String>>>,
}

impl MemoryTokenStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_token(token: &str) -> Self {
        let store = Self::default();
        store.save(token);
        store
    }
}

impl TokenStore for MemoryTokenStore {
    fn load(&self) -> Option<String> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner).clone().and_then(non_empty)
    }

    fn save(&self, token: &str) {
        *self.slot.lock().unwrap_or_else(PoisonError::into_inner) = Some(token.to_owned());
    }

    fn clear(&self) {
        *self.slot.lock().unwrap_or_else(PoisonError::into_inner) = None;
    }
}

fn non_empty(raw: String) -> Option<String> {
    if raw.is_empty() { None } else { Some(raw) }
}
