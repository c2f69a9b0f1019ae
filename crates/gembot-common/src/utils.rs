//! Text helpers for Discord output.

use std::time::Duration;

/// Splits a message into chunks of at most `max_length` characters.
///
/// Messages that already fit are returned as a single chunk. An empty
/// message yields one empty chunk so callers always have something to send.
pub fn split_long_message(message: &str, max_length: usize) -> Vec<String> {
    let max_length = max_length.max(1);
    if message.chars().count() <= max_length {
        return vec![message.to_string()];
    }

    let chars: Vec<char> = message.chars().collect();
    chars
        .chunks(max_length)
        .map(|chunk| chunk.iter().collect())
        .collect()
}

/// Truncates a string to a maximum number of characters with an ellipsis.
pub fn truncate_string(input: &str, max_length: usize) -> String {
    if input.chars().count() <= max_length {
        input.to_string()
    } else {
        let kept: String = input.chars().take(max_length.saturating_sub(3)).collect();
        format!("{kept}...")
    }
}

/// Formats a remaining cooldown as `"1m 5s"` or `"4s"`.
pub fn format_cooldown(remaining: Duration) -> String {
    let total = remaining.as_secs();
    let minutes = total / 60;
    let seconds = total % 60;

    if minutes > 0 {
        format!("{minutes}m {seconds}s")
    } else {
        format!("{seconds}s")
    }
}
