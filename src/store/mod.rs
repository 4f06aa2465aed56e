//! Local persistence for saved assessments.
//!
//! Records are kept in a plain key-value store, one JSON document per
//! `assessment_<id>` key. Every write replaces the whole value.

mod file;
#[cfg(test)]
mod memory;

pub use file::FileStore;
#[cfg(test)]
pub use memory::MemoryStore;

use crate::error::{StoreError, StoreResult};
use crate::models::{storage_key, Assessment, KEY_PREFIX};
use tracing::{debug, info, warn};

/// Minimal string key-value store.
pub trait KeyValueStore {
    /// Read the value stored under `key`.
    fn get(&self, key: &str) -> StoreResult<Option<String>>;

    /// Store `value` under `key`, replacing any previous value.
    fn set(&mut self, key: &str, value: &str) -> StoreResult<()>;

    /// Remove `key`. Returns whether anything was removed.
    fn remove(&mut self, key: &str) -> StoreResult<bool>;

    /// All keys currently present, sorted.
    fn keys(&self) -> StoreResult<Vec<String>>;
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for &mut T {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: &str) -> StoreResult<()> {
        (**self).set(key, value)
    }

    fn remove(&mut self, key: &str) -> StoreResult<bool> {
        (**self).remove(key)
    }

    fn keys(&self) -> StoreResult<Vec<String>> {
        (**self).keys()
    }
}

/// Saved assessments on top of a [`KeyValueStore`].
pub struct AssessmentRepository<S> {
    store: S,
}

impl<S: KeyValueStore> AssessmentRepository<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Persist a finalized assessment.
    pub fn save(&mut self, assessment: &Assessment) -> StoreResult<()> {
        if !assessment.is_saved() {
            return Err(StoreError::MissingId);
        }

        let json = serde_json::to_string_pretty(assessment)?;
        self.store.set(&assessment.storage_key(), &json)?;

        info!("Saved assessment {} ({})", assessment.id, assessment.name);
        Ok(())
    }

    /// Load one saved assessment.
    pub fn load(&self, id: &str) -> StoreResult<Assessment> {
        let raw = self
            .store
            .get(&storage_key(id))?
            .ok_or_else(|| StoreError::NotFound { id: id.to_string() })?;

        Ok(serde_json::from_str(&raw)?)
    }

    /// Load every saved assessment.
    ///
    /// Entries that cannot be read or parsed are logged and skipped.
    pub fn load_all(&self) -> StoreResult<Vec<Assessment>> {
        let mut assessments = Vec::new();

        for key in self.store.keys()? {
            if !key.starts_with(KEY_PREFIX) {
                continue;
            }

            let raw = match self.store.get(&key) {
                Ok(Some(raw)) => raw,
                Ok(None) => continue,
                Err(e) => {
                    warn!("Failed to read assessment data under {}: {}", key, e);
                    continue;
                }
            };

            match serde_json::from_str::<Assessment>(&raw) {
                Ok(assessment) => assessments.push(assessment),
                Err(e) => warn!("Failed to parse assessment data under {}: {}", key, e),
            }
        }

        debug!("Loaded {} assessments", assessments.len());
        Ok(assessments)
    }

    /// Remove a saved assessment. Returns whether it existed.
    pub fn delete(&mut self, id: &str) -> StoreResult<bool> {
        let removed = self.store.remove(&storage_key(id))?;
        if removed {
            info!("Deleted assessment {}", id);
        }
        Ok(removed)
    }
}
