// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Fluent builder for [`Arrangement`] values in tests.

use lampwalk_core::{Arrangement, Individual, Lamp, LampPlacement, PathSpec, SimError};

/// Collects path, lamps and walkers, then validates once in [`Self::build`].
///
/// # Example
///
/// ```
/// use lampwalk_dry_tests::ArrangementBuilder;
///
/// let arrangement = ArrangementBuilder::new(5)
///     .lamp_at(2, 1.0, 1.0)
///     .walker(1.0, 0.0)
///     .build()
///     .unwrap();
/// assert_eq!(arrangement.lamps().len(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct ArrangementBuilder {
    length: usize,
    lamps: Vec<Lamp>,
    nodes: Vec<usize>,
    walkers: Vec<Individual>,
}

impl ArrangementBuilder {
    /// Path of `length` nodes, no lamps, nobody walking.
    pub fn new(length: usize) -> Self {
        Self {
            length,
            lamps: Vec::new(),
            nodes: Vec::new(),
            walkers: Vec::new(),
        }
    }

    /// Adds a lamp on `node`.
    pub fn lamp_at(mut self, node: usize, bright: f64, dark: f64) -> Self {
        self.lamps.push(Lamp { bright, dark });
        self.nodes.push(node);
        self
    }

    /// Puts the same lamp on every node.
    pub fn lamp_everywhere(mut self, bright: f64, dark: f64) -> Self {
        for node in 0..self.length {
            self = self.lamp_at(node, bright, dark);
        }
        self
    }

    /// Adds an individual with an explicit start delay.
    pub fn walker(mut self, speed: f64, start_delay: f64) -> Self {
        self.walkers.push(Individual::new(speed, start_delay));
        self
    }

    /// Adds an individual that departs when the previous one finishes.
    pub fn walker_after_previous(self, speed: f64) -> Self {
        let delay = self.walkers.last().map_or(0.0, |prev| {
            prev.start_delay + self.length as f64 / prev.speed
        });
        self.walker(speed, delay)
    }

    /// Validates and builds.
    pub fn build(self) -> Result<Arrangement, SimError> {
        Arrangement::new(
            PathSpec::new(self.length)?,
            self.lamps,
            LampPlacement::new(self.nodes)?,
            self.walkers,
        )
    }
}
