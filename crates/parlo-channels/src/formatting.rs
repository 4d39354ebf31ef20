//! Markdown → WhatsApp text converter.
//!
//! WhatsApp renders a small markup dialect of its own (`*bold*`, `~strike~`)
//! and nothing else, so generator output (standard Markdown) is rewritten
//! before it leaves the relay.
//!
//! Rewrites, applied in this order:
//! - Bold (`**X**`, `***X***`) → `*X*`
//! - Bullets (`-` at line start, any indentation) → `- `
//! - Links `[label](url)` → `label: url`
//! - Headings (`# ...`) → dropped, the line is left empty
//! - Strikethrough (`~~X~~`) → `~X~`
//!
//! Each rewrite is a standalone pure function so it can be tested on its own.

use std::sync::LazyLock;

use regex::Regex;

/// Compile a pattern that is a literal in this module.
fn pattern(re: &str) -> Regex {
    Regex::new(re).expect("formatting patterns are valid regexes")
}

static BOLD: LazyLock<Regex> = LazyLock::new(|| pattern(r"\*{2,}(.+?)\*{2,}"));
static BULLET: LazyLock<Regex> = LazyLock::new(|| pattern(r"(?m)^[ \t]*-[ \t]"));
static LINK: LazyLock<Regex> = LazyLock::new(|| pattern(r"\[([^\]]+)\]\(([^)]+)\)"));
static HEADING: LazyLock<Regex> = LazyLock::new(|| pattern(r"(?m)^#+[ \t]+[^\r\n]+"));
static STRIKE: LazyLock<Regex> = LazyLock::new(|| pattern(r"~{2,}(.+?)~{2,}"));

/// `**X**` → `*X*`. Longer marker runs (bold-italic) collapse the same way.
pub fn convert_bold(text: &str) -> String {
    BOLD.replace_all(text, "*${1}*").into_owned()
}

/// Indented or tab-separated `-` bullets → canonical `- `.
pub fn normalize_bullets(text: &str) -> String {
    BULLET.replace_all(text, "- ").into_owned()
}

/// `[label](url)` → `label: url`. The channel has no hyperlink rendering.
pub fn flatten_links(text: &str) -> String {
    LINK.replace_all(text, "${1}: ${2}").into_owned()
}

/// Heading lines are unsupported on the channel and are dropped entirely.
pub fn drop_headings(text: &str) -> String {
    HEADING.replace_all(text, "").into_owned()
}

/// `~~X~~` → `~X~`, absorbing longer tilde runs.
pub fn convert_strikethrough(text: &str) -> String {
    STRIKE.replace_all(text, "~${1}~").into_owned()
}

/// Convert generator Markdown to WhatsApp text.
///
/// Total over all input; an empty string comes back empty.
pub fn markdown_to_whatsapp(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }

    let text = convert_bold(text);
    let text = normalize_bullets(&text);
    let text = flatten_links(&text);
    let text = drop_headings(&text);
    convert_strikethrough(&text)
}

/// Formatter for channels that render text as-is.
pub fn passthrough(text: &str) -> String {
    text.to_string()
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
