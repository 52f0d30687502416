// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Immutable simulation input.
//!
//! Every check runs in [`Arrangement::new`]; once a value exists it is known
//! to be simulatable and is never mutated. Build a fresh arrangement per
//! evaluation request.

use std::collections::BTreeMap;

use crate::error::{ArrangementFault, SimError};
use crate::lamp::Lamp;
use crate::path::PathSpec;
use crate::traversal::Individual;

/// Lamp index → node index mapping, with a reverse lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LampPlacement {
    nodes: Vec<usize>,
    by_node: BTreeMap<usize, usize>,
}

impl LampPlacement {
    /// Builds a placement where lamp `i` sits on `nodes[i]`.
    ///
    /// A node may host at most one lamp; a repeat is an error rather than a
    /// silent override.
    pub fn new(nodes: Vec<usize>) -> Result<Self, SimError> {
        let mut by_node = BTreeMap::new();
        for (lamp, &node) in nodes.iter().enumerate() {
            if let Some(&first) = by_node.get(&node) {
                return Err(ArrangementFault::DuplicateNode {
                    node,
                    first,
                    second: lamp,
                }
                .into());
            }
            by_node.insert(node, lamp);
        }
        Ok(Self { nodes, by_node })
    }

    /// Lamp `i` on node `i`, for `count` lamps.
    pub fn identity(count: usize) -> Self {
        Self {
            nodes: (0..count).collect(),
            by_node: (0..count).map(|i| (i, i)).collect(),
        }
    }

    /// Node hosting each lamp, in lamp order.
    pub fn nodes(&self) -> &[usize] {
        &self.nodes
    }

    /// Lamp hosted on `node`, if any.
    pub fn lamp_at(&self, node: usize) -> Option<usize> {
        self.by_node.get(&node).copied()
    }

    /// Number of placed lamps.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// True when no lamps are placed.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// Validated path, lamps, placement and ordered individuals.
#[derive(Debug, Clone, PartialEq)]
pub struct Arrangement {
    path: PathSpec,
    lamps: Vec<Lamp>,
    placement: LampPlacement,
    individuals: Vec<Individual>,
}

impl Arrangement {
    /// Validates and assembles an arrangement.
    ///
    /// Checks, in order: lamp/placement lengths agree, every placed node lies
    /// on the path, every lamp has a usable cycle, every individual has a
    /// positive finite speed and a finite non-negative start delay.
    pub fn new(
        path: PathSpec,
        lamps: Vec<Lamp>,
        placement: LampPlacement,
        individuals: Vec<Individual>,
    ) -> Result<Self, SimError> {
        if lamps.len() != placement.len() {
            return Err(ArrangementFault::AssignmentLengthMismatch {
                lamps: lamps.len(),
                assignments: placement.len(),
            }
            .into());
        }
        for (lamp, &node) in placement.nodes().iter().enumerate() {
            if node >= path.length() {
                return Err(ArrangementFault::NodeOutOfRange {
                    lamp,
                    node,
                    length: path.length(),
                }
                .into());
            }
        }
        for (index, lamp) in lamps.iter().enumerate() {
            lamp.validate().map_err(|e| e.with_lamp_index(index))?;
        }
        for (index, walker) in individuals.iter().enumerate() {
            if !(walker.speed.is_finite() && walker.speed > 0.0) {
                return Err(ArrangementFault::NonPositiveSpeed {
                    individual: index,
                    speed: walker.speed,
                }
                .into());
            }
            if !(walker.start_delay.is_finite() && walker.start_delay >= 0.0) {
                return Err(ArrangementFault::InvalidStartDelay {
                    individual: index,
                    start_delay: walker.start_delay,
                }
                .into());
            }
        }
        Ok(Self {
            path,
            lamps,
            placement,
            individuals,
        })
    }

    /// Path geometry.
    pub const fn path(&self) -> &PathSpec {
        &self.path
    }

    /// Lamp definitions in lamp-index order.
    pub fn lamps(&self) -> &[Lamp] {
        &self.lamps
    }

    /// Where each lamp sits.
    pub const fn placement(&self) -> &LampPlacement {
        &self.placement
    }

    /// Individuals in traversal order.
    pub fn individuals(&self) -> &[Individual] {
        &self.individuals
    }

    /// True when there is nobody to evaluate.
    pub fn is_empty(&self) -> bool {
        self.individuals.is_empty()
    }

    /// Shortest lamp period, if any lamps exist.
    pub fn min_lamp_period(&self) -> Option<f64> {
        self.lamps.iter().map(Lamp::period).reduce(f64::min)
    }

    /// Fastest individual speed, if anyone is walking.
    pub fn max_speed(&self) -> Option<f64> {
        self.individuals.iter().map(|w| w.speed).reduce(f64::max)
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn lamp() -> Lamp {
        Lamp {
            bright: 1.0,
            dark: 1.0,
        }
    }

    #[test]
    fn duplicate_node_is_rejected_with_both_lamps_named() {
        let err = LampPlacement::new(vec![1, 3, 1]).unwrap_err();
        assert_eq!(
            err,
            SimError::InvalidArrangement(ArrangementFault::DuplicateNode {
                node: 1,
                first: 0,
                second: 2,
            })
        );
    }

    #[test]
    fn out_of_range_node_fails_fast() {
        let path = PathSpec::new(3).unwrap();
        let placement = LampPlacement::new(vec![0, 3]).unwrap();
        let err = Arrangement::new(path, vec![lamp(), lamp()], placement, vec![]).unwrap_err();
        assert!(matches!(
            err,
            SimError::InvalidArrangement(ArrangementFault::NodeOutOfRange { lamp: 1, node: 3, .. })
        ));
    }

    #[test]
    fn mismatched_lengths_fail() {
        let path = PathSpec::new(3).unwrap();
        let err = Arrangement::new(path, vec![lamp()], LampPlacement::identity(2), vec![])
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArrangement);
    }

    #[test]
    fn bad_lamp_reports_its_index() {
        let path = PathSpec::new(3).unwrap();
        let lamps = vec![lamp(), Lamp { bright: 0.0, dark: 0.0 }];
        let err = Arrangement::new(path, lamps, LampPlacement::identity(2), vec![]).unwrap_err();
        assert!(matches!(err, SimError::InvalidLamp { index: Some(1), .. }));
    }

    #[test]
    fn stalled_individual_is_rejected() {
        let path = PathSpec::new(3).unwrap();
        let err = Arrangement::new(
            path,
            vec![],
            LampPlacement::identity(0),
            vec![Individual::new(1.0, 0.0), Individual::new(0.0, 1.0)],
        )
        .unwrap_err();
        assert!(matches!(
            err,
            SimError::InvalidArrangement(ArrangementFault::NonPositiveSpeed { individual: 1, .. })
        ));
    }

    #[test]
    fn derived_bounds() {
        let path = PathSpec::new(4).unwrap();
        let arrangement = Arrangement::new(
            path,
            vec![lamp(), Lamp { bright: 0.5, dark: 0.25 }],
            LampPlacement::new(vec![3, 1]).unwrap(),
            vec![Individual::new(2.0, 0.0), Individual::new(1.0, 2.0)],
        )
        .unwrap();
        assert_eq!(arrangement.placement().lamp_at(1), Some(1));
        assert_eq!(arrangement.placement().lamp_at(2), None);
        assert_eq!(arrangement.min_lamp_period(), Some(0.75));
        assert_eq!(arrangement.max_speed(), Some(2.0));
    }
}
