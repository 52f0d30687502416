// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Canned arrangements with known outcomes.

use lampwalk_core::{Arrangement, SimError};

use crate::arrangement::ArrangementBuilder;

/// Five nodes, one always-lit lamp on node 2, one walker at speed 1.
/// Every rule passes.
pub fn always_lit_single_walker() -> Result<Arrangement, SimError> {
    ArrangementBuilder::new(5)
        .lamp_at(2, 10.0, 0.0)
        .walker(1.0, 0.0)
        .build()
}

/// Five nodes, a lamp on node 2 that is bright for one millisecond every
/// ~100 s, one walker at speed 1. The walker passes node 2 in the dark.
pub fn nearly_dark_single_walker() -> Result<Arrangement, SimError> {
    ArrangementBuilder::new(5)
        .lamp_at(2, 0.001, 100.0)
        .walker(1.0, 0.0)
        .build()
}

/// Two walkers on an always-lit path; the second departs when the first
/// finishes.
pub fn sequential_pair(length: usize, first: f64, second: f64) -> Result<Arrangement, SimError> {
    ArrangementBuilder::new(length)
        .lamp_everywhere(1.0, 0.0)
        .walker(first, 0.0)
        .walker_after_previous(second)
        .build()
}
