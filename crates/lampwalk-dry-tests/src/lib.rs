// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Shared test doubles and fixtures for lampwalk crates.
#![forbid(unsafe_code)]
//!
//! # Modules
//!
//! - [`config`] - Journaling in-memory config store with failure injection
//! - [`arrangement`] - Fluent arrangement builder
//! - [`scenarios`] - Canned arrangements with known verdicts

pub mod arrangement;
pub mod config;
pub mod scenarios;

pub use arrangement::ArrangementBuilder;
pub use config::InMemoryConfigStore;
pub use scenarios::{always_lit_single_walker, nearly_dark_single_walker, sequential_pair};
