// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Analytic node-arrival timeline.
//!
//! An individual reaches node `n` at `start_delay + n * node_spacing / speed`.
//! Evaluating lamps at exactly those instants needs no time stepping and is
//! immune to step-size sensitivity.

use crate::arrangement::Arrangement;
use crate::error::SimError;
use crate::lamp::is_lit_within;
use crate::traversal::Individual;

/// One node arrival.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NodeCrossing {
    /// Node index.
    pub node: usize,
    /// Arrival instant in seconds.
    pub time: f64,
    /// Lamp hosted on the node, if any.
    pub lamp_index: Option<usize>,
    /// Whether that lamp was bright on arrival; `None` for unlamped nodes.
    pub lamp_bright: Option<bool>,
}

/// Arrivals of `walker` at each node in path order, computed one node at a
/// time.
pub fn crossings<'a>(
    arrangement: &'a Arrangement,
    walker: &'a Individual,
    epsilon: f64,
) -> impl Iterator<Item = Result<NodeCrossing, SimError>> + 'a {
    let path = arrangement.path();
    (0..path.length()).map(move |node| -> Result<NodeCrossing, SimError> {
        let time = walker.start_delay + path.node_coordinate(node) / walker.speed;
        let lamp_index = arrangement.placement().lamp_at(node);
        let lamp_bright = match lamp_index {
            Some(i) => Some(
                is_lit_within(&arrangement.lamps()[i], time, epsilon)
                    .map_err(|e| e.with_lamp_index(i))?,
            ),
            None => None,
        };
        Ok(NodeCrossing {
            node,
            time,
            lamp_index,
            lamp_bright,
        })
    })
}

/// True when no lamp-hosting node was dark on arrival.
pub fn all_crossings_lit(timeline: &[NodeCrossing]) -> bool {
    timeline.iter().all(|c| c.lamp_bright != Some(false))
}
