// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Config port: typed JSON values over a raw key/blob store.

use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;

/// Raw blob storage keyed by logical name (`simulate_service`, ...).
pub trait ConfigStore {
    /// Blob under `key`, or [`ConfigError::NotFound`].
    fn load_raw(&self, key: &str) -> Result<Vec<u8>, ConfigError>;

    /// Replaces the blob under `key`.
    fn save_raw(&self, key: &str, data: &[u8]) -> Result<(), ConfigError>;

    /// Where `key` lives, for log lines. Defaults to the key itself.
    fn location(&self, key: &str) -> String {
        key.to_owned()
    }
}

/// Config failures.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Nothing stored under the key.
    #[error("not found")]
    NotFound,
    /// The key cannot name an entry in this store.
    #[error("invalid config key `{0}`")]
    InvalidKey(String),
    /// Storage I/O failed.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    /// A stored blob is not valid JSON for the requested type.
    #[error("cannot decode `{key}`: {source}")]
    Decode {
        /// Key whose blob failed to decode.
        key: String,
        /// Underlying JSON error.
        source: serde_json::Error,
    },
    /// A value could not be encoded.
    #[error("cannot encode `{key}`: {source}")]
    Encode {
        /// Key being written.
        key: String,
        /// Underlying JSON error.
        source: serde_json::Error,
    },
    /// Store-specific failure.
    #[error("other: {0}")]
    Other(String),
}

/// Result of [`ConfigService::load_or_init`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Loaded<T> {
    /// The stored or freshly defaulted value.
    pub value: T,
    /// Defaults were written because nothing was stored.
    pub created: bool,
    /// Store location of the key.
    pub location: String,
}

/// Typed JSON access to a [`ConfigStore`].
pub struct ConfigService<S> {
    store: S,
}

impl<S> ConfigService<S> {
    /// Wraps `store`.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Returns the inner store.
    pub fn into_inner(self) -> S {
        self.store
    }
}

impl<S: ConfigStore> ConfigService<S> {
    /// Value under `key`; missing and empty blobs read as `None`.
    pub fn load<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, ConfigError> {
        let bytes = match self.store.load_raw(key) {
            Ok(bytes) => bytes,
            Err(ConfigError::NotFound) => return Ok(None),
            Err(e) => return Err(e),
        };
        if bytes.is_empty() {
            return Ok(None);
        }
        serde_json::from_slice(&bytes)
            .map(Some)
            .map_err(|source| ConfigError::Decode {
                key: key.to_owned(),
                source,
            })
    }

    /// Writes `value` under `key` as pretty JSON.
    pub fn save<T: Serialize>(&self, key: &str, value: &T) -> Result<(), ConfigError> {
        let data = serde_json::to_vec_pretty(value).map_err(|source| ConfigError::Encode {
            key: key.to_owned(),
            source,
        })?;
        self.store.save_raw(key, &data)
    }

    /// Value under `key`, persisting `T::default()` first when nothing is
    /// stored. A blob that fails to decode is reported and left untouched.
    pub fn load_or_init<T>(&self, key: &str) -> Result<Loaded<T>, ConfigError>
    where
        T: DeserializeOwned + Serialize + Default,
    {
        let location = self.store.location(key);
        if let Some(value) = self.load(key)? {
            return Ok(Loaded {
                value,
                created: false,
                location,
            });
        }
        let value = T::default();
        self.save(key, &value)?;
        Ok(Loaded {
            value,
            created: true,
            location,
        })
    }
}
