// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Success rules that decide whether an individual's walk counts as lit.
//!
//! Rules live above the duty-cycle and traversal math so they can be swapped
//! without touching either.

use crate::illumination::Exposure;

/// Which illumination requirement an evaluation enforces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum IlluminationRule {
    /// While traversing, any lamp-hosting node the individual stands on must
    /// be lit. Unlamped nodes are neutral. Equivalent to [`Self::Continuous`]
    /// when every node hosts a lamp.
    #[default]
    LampedNodes,
    /// While traversing, the individual must stand on a lit lamp at every sample.
    Continuous,
    /// Checked analytically at the instant the individual reaches each node
    /// centre; no time stepping.
    NodeCrossings,
}

impl IlluminationRule {
    /// Whether a traversing sample with `exposure` satisfies a stepped rule.
    ///
    /// [`Self::NodeCrossings`] is evaluated at exact arrival instants instead
    /// and uses the same lamp-node criterion here.
    pub const fn admits(self, exposure: Exposure) -> bool {
        match self {
            Self::Continuous => matches!(exposure, Exposure::Lit),
            Self::LampedNodes | Self::NodeCrossings => !matches!(exposure, Exposure::Dark),
        }
    }

    /// True for rules that need the time-stepping engine.
    pub const fn is_stepped(self) -> bool {
        !matches!(self, Self::NodeCrossings)
    }

    /// Stable identifier used in reports and on the wire.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::LampedNodes => "lamped_nodes",
            Self::Continuous => "continuous",
            Self::NodeCrossings => "node_crossings",
        }
    }
}

impl std::fmt::Display for IlluminationRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for IlluminationRule {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "lamped_nodes" | "lamped-nodes" => Ok(Self::LampedNodes),
            "continuous" => Ok(Self::Continuous),
            "node_crossings" | "node-crossings" => Ok(Self::NodeCrossings),
            other => Err(format!(
                "unknown rule `{other}` (expected lamped_nodes, continuous or node_crossings)"
            )),
        }
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn continuous_rejects_unlamped_samples() {
        assert!(!IlluminationRule::Continuous.admits(Exposure::Unlamped));
        assert!(IlluminationRule::LampedNodes.admits(Exposure::Unlamped));
        assert!(!IlluminationRule::LampedNodes.admits(Exposure::Dark));
    }

    #[test]
    fn names_parse_back() {
        for rule in [
            IlluminationRule::LampedNodes,
            IlluminationRule::Continuous,
            IlluminationRule::NodeCrossings,
        ] {
            assert_eq!(rule.as_str().parse::<IlluminationRule>(), Ok(rule));
        }
        assert!("sometimes".parse::<IlluminationRule>().is_err());
    }
}
