// laralog - core/stack_trace.rs
//
// Converts the raw lines of a `Stack trace:` block into structured frames.
// Core layer: pure string processing, no I/O.

use crate::core::model::StackTraceFrame;
use regex::Regex;
use std::sync::OnceLock;

/// `#<index> <file>(<line>): <method>`. The index only anchors the match.
fn frame_pattern() -> &'static Regex {
    static FRAME: OnceLock<Regex> = OnceLock::new();
    FRAME.get_or_init(|| {
        Regex::new(r"^#[0-9]+\s+(.+?)\(([0-9]+)\):\s+(.+)$").expect("frame_pattern: invalid regex")
    })
}

/// Parse one raw trace line into a frame.
///
/// Returns `None` for lines that are not frames (e.g. `#12 {main}`) and for
/// line numbers that do not fit in a `u32`.
pub fn parse_frame(raw: &str) -> Option<StackTraceFrame> {
    let caps = frame_pattern().captures(raw)?;
    let line = caps[2].parse::<u32>().ok()?;
    Some(StackTraceFrame {
        file: caps[1].trim().to_string(),
        line,
        method: caps[3].trim().to_string(),
    })
}

/// Parse a collected trace block. Non-frame lines are dropped silently and
/// the output keeps input order.
pub fn parse_stack_trace<S: AsRef<str>>(lines: &[S]) -> Vec<StackTraceFrame> {
    lines
        .iter()
        .filter_map(|line| parse_frame(line.as_ref()))
        .collect()
}
