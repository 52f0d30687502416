// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Journaling in-memory [`ConfigStore`] for prefs tests.

use lampwalk_app_core::config::{ConfigError, ConfigStore};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

/// Which store operation should fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailOn {
    /// Everything succeeds.
    #[default]
    Nothing,
    /// `load_raw` fails with [`ConfigError::Other`].
    Load,
    /// `save_raw` fails with [`ConfigError::Other`].
    Save,
}

/// One attempted store operation, failed ones included.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreOp {
    /// `load_raw(key)`.
    Load(String),
    /// `save_raw(key, ..)`.
    Save(String),
}

/// Shared-state fake: clones see the same blobs and journal, so a test can
/// keep a handle while a `ConfigService` owns the other.
#[derive(Debug, Clone, Default)]
pub struct InMemoryConfigStore {
    state: Arc<Mutex<State>>,
}

#[derive(Debug, Default)]
struct State {
    blobs: BTreeMap<String, Vec<u8>>,
    journal: Vec<StoreOp>,
    fail_on: FailOn,
}

impl InMemoryConfigStore {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store seeded with one blob.
    pub fn seeded(key: &str, blob: &[u8]) -> Self {
        let store = Self::new();
        store.state().blobs.insert(key.to_owned(), blob.to_vec());
        store
    }

    /// Makes the chosen operation fail from now on.
    pub fn fail_on(&self, op: FailOn) {
        self.state().fail_on = op;
    }

    /// Every attempted operation in call order.
    pub fn journal(&self) -> Vec<StoreOp> {
        self.state().journal.clone()
    }

    /// Number of attempted saves.
    pub fn saves(&self) -> usize {
        self.state()
            .journal
            .iter()
            .filter(|op| matches!(op, StoreOp::Save(_)))
            .count()
    }

    /// Blob currently stored under `key`.
    pub fn blob(&self, key: &str) -> Option<Vec<u8>> {
        self.state().blobs.get(key).cloned()
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl ConfigStore for InMemoryConfigStore {
    fn load_raw(&self, key: &str) -> Result<Vec<u8>, ConfigError> {
        let mut state = self.state();
        state.journal.push(StoreOp::Load(key.to_owned()));
        if state.fail_on == FailOn::Load {
            return Err(ConfigError::Other(format!("injected load failure for `{key}`")));
        }
        state.blobs.get(key).cloned().ok_or(ConfigError::NotFound)
    }

    fn save_raw(&self, key: &str, data: &[u8]) -> Result<(), ConfigError> {
        let mut state = self.state();
        state.journal.push(StoreOp::Save(key.to_owned()));
        if state.fail_on == FailOn::Save {
            return Err(ConfigError::Other(format!("injected save failure for `{key}`")));
        }
        state.blobs.insert(key.to_owned(), data.to_vec());
        Ok(())
    }

    fn location(&self, key: &str) -> String {
        format!("memory://{key}")
    }
}
