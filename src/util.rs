// src/util.rs — Shared utility functions

/// Marker appended to text that was cut short for display.
pub const ELLIPSIS: &str = "...";

/// Keep the first `max_chars` characters of `s`, appending [`ELLIPSIS`]
/// only when something was cut.
pub fn ellipsize(s: &str, max_chars: usize) -> String {
    match s.char_indices().nth(max_chars) {
        Some((end, _)) => format!("{}{ELLIPSIS}", &s[..end]),
        None => s.to_string(),
    }
}

/// Current wall-clock time in milliseconds since the Unix epoch.
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
