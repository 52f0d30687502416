// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>

use crate::request::SimulateRequest;

/// Sample arrangement served at `GET /example` and used to prefill the UI.
pub const EXAMPLE_ARRANGEMENT_JSON: &str = r#"{
  "path_length": 5,
  "lamps": [
    { "bright": 1.0, "dark": 1.0 },
    { "bright": 0.8, "dark": 1.2 },
    { "bright": 1.5, "dark": 0.5 },
    { "bright": 1.0, "dark": 1.0 },
    { "bright": 0.7, "dark": 1.3 }
  ],
  "lamp_assignment": [0, 1, 2, 3, 4],
  "individuals": [
    { "speed": 1.0, "start_delay": 0.0 },
    { "speed": 0.8, "start_delay": 0.3 }
  ]
}
"#;

/// [`EXAMPLE_ARRANGEMENT_JSON`] decoded.
pub fn example_request() -> Result<SimulateRequest, serde_json::Error> {
    serde_json::from_str(EXAMPLE_ARRANGEMENT_JSON)
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn example_is_a_valid_arrangement() {
        let arrangement = example_request().unwrap().into_arrangement().unwrap();
        assert_eq!(arrangement.lamps().len(), 5);
        assert_eq!(arrangement.individuals().len(), 2);
    }
}
