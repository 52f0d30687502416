// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Shared application services for lampwalk tools (config port, prefs).
//! Keeps the HTTP service and CLI thin; storage adapters plug in via
//! [`config::ConfigStore`].

pub mod config;
pub mod prefs;

pub use config::{ConfigError, ConfigService, ConfigStore, Loaded};
pub use prefs::{ServicePrefs, SERVICE_PREFS_KEY};
