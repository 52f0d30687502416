// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Path geometry.

use crate::error::{ArrangementFault, SimError};

/// Node limit applied by [`PathSpec::new`].
pub const DEFAULT_MAX_PATH_LENGTH: usize = 10_000;

/// A linear path of `length` evenly spaced nodes.
///
/// The continuous coordinate runs from `0.0` (node 0) to `length as f64`
/// (node `length - 1`), so nodes are `length / (length - 1)` path-units
/// apart and an individual moving at `speed` path-units per second needs
/// `length / speed` seconds to cross.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PathSpec {
    length: usize,
}

impl PathSpec {
    /// Creates a path with `length` nodes, between 2 and
    /// [`DEFAULT_MAX_PATH_LENGTH`].
    pub fn new(length: usize) -> Result<Self, SimError> {
        Self::bounded(length, DEFAULT_MAX_PATH_LENGTH)
    }

    /// Creates a path with between 2 and `max_length` nodes.
    pub fn bounded(length: usize, max_length: usize) -> Result<Self, SimError> {
        if length < 2 {
            return Err(ArrangementFault::PathTooShort { length }.into());
        }
        if length > max_length {
            return Err(ArrangementFault::PathTooLong {
                length,
                max: max_length,
            }
            .into());
        }
        Ok(Self { length })
    }

    /// Number of nodes.
    pub const fn length(&self) -> usize {
        self.length
    }

    /// Coordinate of the path end (the last node).
    pub fn end(&self) -> f64 {
        self.length as f64
    }

    /// Distance between adjacent nodes in path-units.
    pub fn node_spacing(&self) -> f64 {
        self.length as f64 / (self.length - 1) as f64
    }

    /// Coordinate of node `node`.
    pub fn node_coordinate(&self, node: usize) -> f64 {
        node as f64 * self.node_spacing()
    }

    /// Nearest node to `position`, ties toward the lower index, clamped to the path.
    pub fn nearest_node(&self, position: f64) -> usize {
        let scaled = (position / self.node_spacing()).max(0.0);
        let floor = scaled.floor();
        let node = if scaled - floor > 0.5 {
            floor as usize + 1
        } else {
            floor as usize
        };
        node.min(self.length - 1)
    }
}
