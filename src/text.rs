//! Plain-text frames, for `show` and `script` and anything that is not a tty.

use std::fmt::Write as _;
use std::io::Write;
use std::time::{Duration, Instant};

use crate::controls::Marker;
use crate::error::{Error, Result};
use crate::highlight::EdgeRole;
use crate::model::ScalarModel;
use crate::steps::STEPS;
use crate::walkthrough::{Command, Snapshot, Walkthrough};

pub const HEADING: &str = "Chain Rule Walkthrough";
pub const SUBHEADING: &str = "Tracing one weight through forward pass → loss → backprop → update";

fn marker_glyph(marker: Marker) -> char {
    match marker {
        Marker::Pending => '·',
        Marker::Visited => '●',
        Marker::Current => '◉',
        Marker::Backward => '◀',
        Marker::Update => '★',
    }
}

fn role_name(role: EdgeRole) -> &'static str {
    match role {
        EdgeRole::Forward => "forward",
        EdgeRole::Backward => "backward",
        EdgeRole::Neutral => "neutral",
        EdgeRole::Dim => "dim",
    }
}

/// One frame as plain text. Deterministic for a given snapshot.
pub fn render(snapshot: &Snapshot) -> String {
    let mut out = String::new();
    let state = snapshot.state;

    let _ = writeln!(out, "{HEADING}");
    let _ = writeln!(
        out,
        "[{}/{}] {}{}",
        state.current_index + 1,
        STEPS.len(),
        snapshot.step.title,
        if state.is_playing { "  (playing)" } else { "" }
    );
    let _ = writeln!(out);

    for node in &snapshot.nodes {
        let _ = writeln!(
            out,
            "  {} {:<4} {}",
            if node.active { '*' } else { ' ' },
            node.label,
            node.value
        );
    }
    for (i, (edge, role)) in snapshot.graph.edges().enumerate() {
        let _ = write!(
            out,
            "  {} → {}  {}",
            edge.from.label(),
            edge.to.label(),
            role_name(role)
        );
        if let Some(label) = snapshot.graph.edge_label(i) {
            let _ = write!(out, "  [{label}]");
        }
        let _ = writeln!(out);
    }
    if let Some(banner) = snapshot.banner {
        let _ = writeln!(out, "  {banner}");
    }
    let _ = writeln!(out);

    let n = &snapshot.narration;
    let _ = writeln!(out, "{}", n.lead);
    if let Some(formula) = &n.formula {
        let _ = writeln!(out, "    {formula}");
    }
    if let Some(computation) = &n.computation {
        let _ = writeln!(out, "    {computation}");
    }
    for figure in &n.figures {
        let _ = writeln!(out, "    {:<12} {}", figure.label, figure.value);
    }
    let _ = writeln!(out, "{}", n.note);
    let _ = writeln!(out);

    let c = &snapshot.controls;
    let button = |text: &str, enabled: bool| {
        if enabled {
            format!("[{text}]")
        } else {
            format!("({text})")
        }
    };
    let _ = writeln!(
        out,
        "{} {} {} {}",
        button("↺ Reset", true),
        button("← Back", c.back_enabled),
        button(c.play.text(), true),
        button("Next →", c.next_enabled)
    );
    let strip: String = snapshot.progress.iter().map(|m| marker_glyph(*m)).collect();
    let _ = writeln!(out, "{strip}");
    let _ = writeln!(out, "{}", snapshot.summary);
    out
}

/// One entry of a `script` run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptStep {
    Command(Command),
    /// Let one autoplay delay elapse.
    Tick,
}

pub fn parse_script(script: &str) -> Result<Vec<ScriptStep>> {
    script
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| match s {
            "tick" | "wait" => Ok(ScriptStep::Tick),
            other => other.parse::<Command>().map(ScriptStep::Command),
        })
        .collect()
}

/// Runs `steps` against a fresh walkthrough on a virtual clock, writing the
/// initial frame and one frame after every step.
pub fn run_script<W: Write>(
    model: ScalarModel,
    delay: Duration,
    steps: &[ScriptStep],
    out: &mut W,
) -> Result<()> {
    let mut walkthrough = Walkthrough::new(model, delay);
    let mut now = Instant::now();
    let rule = "─".repeat(60);

    out.write_all(render(walkthrough.snapshot()).as_bytes())?;
    for step in steps {
        match step {
            ScriptStep::Command(command) => {
                walkthrough.apply(*command, now);
                writeln!(out, "{rule}\n> {command:?}")?;
            }
            ScriptStep::Tick => {
                now += delay;
                let changed = walkthrough.poll(now);
                writeln!(
                    out,
                    "{rule}\n> tick{}",
                    if changed { "" } else { " (idle)" }
                )?;
            }
        }
        out.write_all(render(walkthrough.snapshot()).as_bytes())?;
    }
    out.flush().map_err(Error::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sequencer::AUTOPLAY_DELAY;

    fn snapshot_at(index: usize) -> Snapshot {
        let mut w = Walkthrough::new(ScalarModel::reference(), AUTOPLAY_DELAY);
        w.apply(Command::JumpTo(index), Instant::now());
        w.snapshot().clone()
    }

    #[test]
    fn first_frame() {
        let frame = render(&snapshot_at(0));
        assert!(frame.starts_with("Chain Rule Walkthrough\n[1/9] The Setup\n"));
        assert!(frame.contains("(← Back)"));
        assert!(frame.contains("[▶ Play]"));
        assert!(frame.contains("[Next →]"));
        assert!(frame.contains("◉········"));
        assert!(frame.ends_with("Full chain: (-0.210) × (0.214) × (0.800) = -0.0359 → w = 0.5180\n"));
    }

    #[test]
    fn backward_frame_marks_edges() {
        let frame = render(&snapshot_at(4));
        assert!(frame.contains("aⱼ → L  backward  [MSE]"));
        assert!(frame.contains("zⱼ → aⱼ  dim\n"));
        assert!(frame.contains("← Backward ←"));
        assert!(frame.contains("●●●●◀····"));
    }

    #[test]
    fn last_frame_offers_replay() {
        let frame = render(&snapshot_at(8));
        assert!(frame.contains("[↻ Replay]"));
        assert!(frame.contains("(Next →)"));
        assert!(frame.contains("New weight   0.5180"));
    }

    #[test]
    fn parses_scripts() {
        let steps = parse_script("next, play,tick,,jump:3").unwrap();
        assert_eq!(
            steps,
            [
                ScriptStep::Command(Command::Forward),
                ScriptStep::Command(Command::TogglePlay),
                ScriptStep::Tick,
                ScriptStep::Command(Command::JumpTo(3)),
            ]
        );
        assert!(matches!(
            parse_script("next,fly"),
            Err(Error::UnknownCommand(c)) if c == "fly"
        ));
    }

    #[test]
    fn script_autoplays_to_the_end() {
        let mut steps = vec![ScriptStep::Command(Command::TogglePlay)];
        steps.extend(std::iter::repeat(ScriptStep::Tick).take(10));
        let mut out = Vec::new();
        run_script(ScalarModel::reference(), AUTOPLAY_DELAY, &steps, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert!(text.contains("[9/9] Step 8: Update the Weight  (playing)"));
        assert!(text.contains("> tick (idle)"));
        let last = text.rsplit("> tick").next().unwrap();
        assert!(last.contains("[9/9] Step 8: Update the Weight\n"));
        assert!(last.contains("[↻ Replay]"));
    }
}
