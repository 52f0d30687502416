// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Terminal tables for verdicts and traces.

use comfy_table::{presets::UTF8_FULL, Table};
use lampwalk_proto::{SimulateResponse, TraceFrame};

pub fn verdict_table(resp: &SimulateResponse) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL).set_header(vec![
        "#",
        "speed",
        "start_delay",
        "finish_time",
        "dark crossings",
        "result",
    ]);
    for ind in &resp.individuals {
        let dark = ind
            .timeline
            .iter()
            .filter(|c| c.lamp_bright == Some(false))
            .count();
        table.add_row(vec![
            ind.individual_id.to_string(),
            format!("{:.3}", ind.speed),
            format!("{:.3}", ind.start_delay),
            format!("{:.3}", ind.finish_time),
            dark.to_string(),
            pass_fail(ind.success).to_owned(),
        ]);
    }
    table
}

pub fn summary(resp: &SimulateResponse) -> String {
    let verdict = if resp.empty_arrangement {
        "PASS (no individuals)"
    } else {
        pass_fail(resp.success)
    };
    format!(
        "overall: {verdict}  rule={} step={}s digest={}",
        resp.rule, resp.step_seconds, resp.digest
    )
}

/// Every `every`-th frame plus the final one.
pub fn thin(frames: &[TraceFrame], every: usize) -> Vec<TraceFrame> {
    let every = every.max(1);
    let last = frames.len().saturating_sub(1);
    frames
        .iter()
        .enumerate()
        .filter(|(i, _)| i % every == 0 || *i == last)
        .map(|(_, f)| f.clone())
        .collect()
}

pub fn trace_table(frames: &[TraceFrame]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_header(vec!["tick", "t", "positions", "lamps"]);
    for frame in frames {
        let positions = frame
            .positions
            .iter()
            .map(|p| format!("{p:.2}"))
            .collect::<Vec<_>>()
            .join(" ");
        let lamps: String = frame
            .lamps_lit
            .iter()
            .map(|lit| if *lit { '*' } else { '.' })
            .collect();
        table.add_row(vec![
            frame.tick.to_string(),
            format!("{:.3}", frame.t),
            positions,
            lamps,
        ]);
    }
    table
}

const fn pass_fail(success: bool) -> &'static str {
    if success {
        "PASS"
    } else {
        "FAIL"
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;

    fn frame(tick: u64) -> TraceFrame {
        TraceFrame {
            tick,
            t: tick as f64 * 0.5,
            positions: vec![0.0],
            stages: vec![],
            lamps_lit: vec![true, false],
        }
    }

    #[test]
    fn thinning_keeps_the_final_frame() {
        let frames: Vec<_> = (0..7).map(frame).collect();
        let ticks: Vec<u64> = thin(&frames, 3).iter().map(|f| f.tick).collect();
        assert_eq!(ticks, vec![0, 3, 6]);
        let ticks: Vec<u64> = thin(&frames, 4).iter().map(|f| f.tick).collect();
        assert_eq!(ticks, vec![0, 4, 6]);
    }

    #[test]
    fn lamp_column_marks_lit_lamps() {
        let rendered = trace_table(&[frame(0)]).to_string();
        assert!(rendered.contains("*."));
    }
}
