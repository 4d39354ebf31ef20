//! Utility helpers — path resolution and string manipulation.

use std::path::PathBuf;

/// Get the Parlo data directory (e.g. `~/.parlo/`).
pub fn get_data_path() -> PathBuf {
    let home = home_dir().unwrap_or_else(|| PathBuf::from("."));
    home.join(".parlo")
}

/// Number of characters (Unicode scalar values) in `s`.
///
/// All message length limits are expressed in characters, not bytes.
pub fn char_len(s: &str) -> usize {
    s.chars().count()
}

/// Truncate a string to `max_len` characters, adding "..." if truncated.
/// Unicode-safe.
pub fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", truncated)
    }
}

/// Helper to get home directory.
fn home_dir() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(PathBuf::from)
        .or_else(|| std::env::var("USERPROFILE").ok().map(PathBuf::from))
}
