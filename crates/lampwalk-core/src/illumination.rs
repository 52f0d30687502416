// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Couples a path position to the lamp on its nearest node.

use crate::error::SimError;
use crate::lamp::{is_lit_within, Lamp};
use crate::path::PathSpec;
use crate::arrangement::LampPlacement;

/// What an individual standing at a position sees at one instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Exposure {
    /// The nearest node hosts no lamp.
    Unlamped,
    /// The nearest node's lamp is bright.
    Lit,
    /// The nearest node's lamp is dark.
    Dark,
}

/// Classifies `position` at `elapsed`, treating the bright window as closing
/// `epsilon` seconds early.
pub fn exposure_at(
    position: f64,
    path: &PathSpec,
    placement: &LampPlacement,
    lamps: &[Lamp],
    elapsed: f64,
    epsilon: f64,
) -> Result<Exposure, SimError> {
    let node = path.nearest_node(position);
    let Some(lamp_index) = placement.lamp_at(node) else {
        return Ok(Exposure::Unlamped);
    };
    let Some(lamp) = lamps.get(lamp_index) else {
        // Arrangement construction keeps placement and lamps aligned.
        return Ok(Exposure::Unlamped);
    };
    let lit = is_lit_within(lamp, elapsed, epsilon).map_err(|e| e.with_lamp_index(lamp_index))?;
    Ok(if lit { Exposure::Lit } else { Exposure::Dark })
}

/// True iff the lamp on the node nearest `position` is lit at `elapsed`.
/// A node without a lamp is simply unilluminated.
pub fn is_illuminated(
    position: f64,
    path: &PathSpec,
    placement: &LampPlacement,
    lamps: &[Lamp],
    elapsed: f64,
) -> Result<bool, SimError> {
    Ok(exposure_at(position, path, placement, lamps, elapsed, 0.0)? == Exposure::Lit)
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;

    fn fixture() -> (PathSpec, LampPlacement, Vec<Lamp>) {
        let path = PathSpec::new(5).unwrap();
        let placement = LampPlacement::new(vec![2]).unwrap();
        let lamps = vec![Lamp {
            bright: 1.0,
            dark: 1.0,
        }];
        (path, placement, lamps)
    }

    #[test]
    fn unlamped_node_is_not_an_error() {
        let (path, placement, lamps) = fixture();
        let got = exposure_at(0.0, &path, &placement, &lamps, 0.5, 0.0).unwrap();
        assert_eq!(got, Exposure::Unlamped);
        assert!(!is_illuminated(0.0, &path, &placement, &lamps, 0.5).unwrap());
    }

    #[test]
    fn lamp_node_follows_the_duty_cycle() {
        let (path, placement, lamps) = fixture();
        let at_lamp = path.node_coordinate(2);
        assert!(is_illuminated(at_lamp, &path, &placement, &lamps, 0.5).unwrap());
        assert_eq!(
            exposure_at(at_lamp, &path, &placement, &lamps, 1.5, 0.0).unwrap(),
            Exposure::Dark
        );
    }

    #[test]
    fn rounding_tie_resolves_to_lower_node() {
        let (path, placement, lamps) = fixture();
        // Exactly halfway between node 1 and node 2.
        let halfway = 1.5 * path.node_spacing();
        assert_eq!(
            exposure_at(halfway, &path, &placement, &lamps, 0.5, 0.0).unwrap(),
            Exposure::Unlamped
        );
    }
}
