// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Persisted preferences for the simulate service.

use lampwalk_core::EvaluationConfig;
use serde::{Deserialize, Serialize};

/// Config key under which [`ServicePrefs`] are stored.
pub const SERVICE_PREFS_KEY: &str = "simulate_service";

/// Service-wide defaults. Requests may override the evaluation knobs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServicePrefs {
    /// Socket address the HTTP listener binds.
    pub listen: String,
    /// Wall-clock budget per evaluation, in milliseconds.
    pub eval_timeout_ms: u64,
    /// Largest accepted request body, in bytes.
    pub max_body_bytes: usize,
    /// Default rule, step policy, tolerance and sample cap.
    pub evaluation: EvaluationConfig,
}

impl Default for ServicePrefs {
    fn default() -> Self {
        Self {
            listen: "127.0.0.1:8790".into(),
            eval_timeout_ms: 5_000,
            max_body_bytes: 1024 * 1024,
            evaluation: EvaluationConfig::default(),
        }
    }
}
