//! Logging helpers for seed-provided content strings.
//! Item and character names come from operator-edited JSON, so anything that
//! ends up in a log line gets escaped to keep the log single-line.

/// Escape a string for single-line logging: newlines, carriage returns, and
/// tabs become their two-character escapes, other control characters become
/// `\xNN`, and very long strings are truncated with an ellipsis.
pub fn escape_log(s: &str) -> String {
    const MAX_PREVIEW: usize = 200;
    let mut out = String::with_capacity(s.len().min(MAX_PREVIEW) + 8);
    for (count, ch) in s.chars().enumerate() {
        if count >= MAX_PREVIEW {
            out.push('…');
            break;
        }
        match ch {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c.is_control() => {
                use std::fmt::Write;
                let _ = write!(&mut out, "\\x{:02X}", c as u32);
            }
            c => out.push(c),
        }
    }
    out
}
