// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>

/// Single-page client: edits an arrangement, posts it with `include_trace`,
/// prints the verdicts and replays the trace on a canvas.
///
/// Positions map to canvas x as `position / path_length * width`, so node
/// `k` lands `k * width / (path_length - 1)` from the left margin. A
/// truncated trace is labelled as such.
pub const INDEX_HTML: &str = r##"<!doctype html>
<html>
<head>
<meta charset="utf-8">
<title>Lampwalk</title>
<style>
  body { font-family: sans-serif; margin: 2em; }
  canvas { border: 1px solid #ccc; display: block; margin: 1em 0; }
  pre { background: #f6f6f6; padding: 1em; max-height: 24em; overflow: auto; }
</style>
</head>
<body>
<h2>Lampwalk simulator</h2>
<textarea id="payload" rows="18" cols="72"></textarea>
<br><button id="run">Run simulation</button>
<canvas id="path" width="840" height="120"></canvas>
<pre id="out"></pre>
<script>
const payload = document.getElementById("payload");
const out = document.getElementById("out");
const canvas = document.getElementById("path");
const ctx = canvas.getContext("2d");
const margin = 20;
const width = canvas.width - 2 * margin;

fetch("/example").then(r => r.text()).then(t => { payload.value = t; });

function draw(req, resp, frame) {
  const n = req.path_length;
  const assignment = resp.lamp_assignment;
  ctx.clearRect(0, 0, canvas.width, canvas.height);
  ctx.strokeStyle = "#888";
  ctx.beginPath();
  ctx.moveTo(margin, 60);
  ctx.lineTo(margin + width, 60);
  ctx.stroke();
  for (let node = 0; node < n; node++) {
    const x = margin + (node / (n - 1)) * width;
    const lamp = assignment.indexOf(node);
    ctx.fillStyle = lamp < 0 ? "#ddd" : (frame.lamps_lit[lamp] ? "#f5c400" : "#333");
    ctx.beginPath();
    ctx.arc(x, 60, 8, 0, 2 * Math.PI);
    ctx.fill();
  }
  frame.positions.forEach((pos, i) => {
    const x = margin + (pos / n) * width;
    ctx.fillStyle = resp.individuals[i].success ? "#2a9d3a" : "#c0392b";
    ctx.fillRect(x - 4, 80 + 8 * i, 8, 8);
  });
}

document.getElementById("run").onclick = async () => {
  let req;
  try {
    req = JSON.parse(payload.value);
  } catch (e) {
    out.innerText = "invalid JSON: " + e;
    return;
  }
  req.include_trace = true;
  const r = await fetch("/simulate", {
    method: "POST",
    headers: { "content-type": "application/json" },
    body: JSON.stringify(req),
  });
  const resp = await r.json();
  const shown = Object.assign({}, resp);
  delete shown.trace;
  out.innerText = JSON.stringify(shown, null, 2);
  if (!r.ok || !resp.trace) return;
  if (resp.trace.truncated) out.innerText += "\n(trace truncated at the safety ceiling)";
  const frames = resp.trace.frames;
  const stride = Math.max(1, Math.floor(frames.length / 600));
  let i = 0;
  const tick = () => {
    draw(req, resp, frames[Math.min(i, frames.length - 1)]);
    i += stride;
    if (i < frames.length + stride) requestAnimationFrame(tick);
  };
  tick();
};
</script>
</body>
</html>
"##;
