//! Reply segmentation.
//!
//! Splits formatted reply text into parts that each fit a channel's message
//! length limit. Numbered list items (`1. `, `2. `, `3. `) are kept whole
//! where possible; anything else is cut at the last sentence end, then the
//! last whitespace, then hard at the limit.
//!
//! Lengths are counted in characters, never bytes, so a cut never lands
//! inside a multi-byte character.

use std::sync::LazyLock;
use std::time::Duration;

use regex::Regex;

use parlo_core::utils::char_len;

/// Start of a numbered list item. Only 1–3 are recognized; a `4. ` line
/// stays inside the item before it.
static ITEM_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^[1-3]\. ").expect("item marker pattern is valid"));

/// How a reply was divided.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SegmentStrategy {
    /// The text fit in one message.
    Whole,
    /// The text was divided along numbered list items.
    ListItems,
    /// The text was divided by sentence/word boundaries only.
    Fallback,
}

/// Ordered parts of a reply plus the strategy that produced them.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SegmentPlan {
    pub parts: Vec<String>,
    pub strategy: SegmentStrategy,
}

impl SegmentPlan {
    /// Delay to insert between sends of this plan.
    ///
    /// Only list-item plans are paced; fallback parts go out back to back.
    pub fn pacing(&self, delay: Duration) -> Option<Duration> {
        match self.strategy {
            SegmentStrategy::ListItems if !delay.is_zero() => Some(delay),
            _ => None,
        }
    }

    pub fn len(&self) -> usize {
        self.parts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }
}

/// Split `text` into parts of at most `max_len` characters.
pub fn segment(text: &str, max_len: usize) -> Vec<String> {
    plan(text, max_len).parts
}

/// Split `text` and report which strategy was used.
///
/// A text that already fits is returned untouched as the only part. A
/// non-empty text always yields at least one part: a whitespace-only text
/// over the limit is cut to its first `max_len` characters.
pub fn plan(text: &str, max_len: usize) -> SegmentPlan {
    let max_len = max_len.max(1);

    if char_len(text) <= max_len {
        return SegmentPlan {
            parts: vec![text.to_string()],
            strategy: SegmentStrategy::Whole,
        };
    }

    let units = extract_items(text);
    if units.len() > 1 {
        let parts = units
            .into_iter()
            .flat_map(|unit| {
                if char_len(&unit) > max_len {
                    split_at_boundaries(&unit, max_len)
                } else {
                    vec![unit]
                }
            })
            .collect();
        return SegmentPlan {
            parts,
            strategy: SegmentStrategy::ListItems,
        };
    }

    let mut parts = split_at_boundaries(text, max_len);
    if parts.is_empty() {
        parts.push(text.chars().take(max_len).collect());
    }

    SegmentPlan {
        parts,
        strategy: SegmentStrategy::Fallback,
    }
}

/// Break `text` into numbered-item units.
///
/// Each item runs from its marker to the next marker (or the end of the
/// text). Non-blank text before the first marker is a unit of its own.
/// Units are trimmed; blank units are skipped.
pub fn extract_items(text: &str) -> Vec<String> {
    let starts: Vec<usize> = ITEM_MARKER.find_iter(text).map(|m| m.start()).collect();

    let mut units = Vec::with_capacity(starts.len() + 1);
    let mut push = |slice: &str| {
        let trimmed = slice.trim();
        if !trimmed.is_empty() {
            units.push(trimmed.to_string());
        }
    };

    let first = starts.first().copied().unwrap_or(text.len());
    push(&text[..first]);

    for (i, &start) in starts.iter().enumerate() {
        let end = starts.get(i + 1).copied().unwrap_or(text.len());
        push(&text[start..end]);
    }

    units
}

/// Fallback splitter: walk the text taking up to `max_len` characters at a
/// time, cutting just after the last `.` in the window, else at the last
/// whitespace, else exactly at the limit.
///
/// Every part is trimmed, non-empty, and at most `max_len` characters.
pub fn split_at_boundaries(text: &str, max_len: usize) -> Vec<String> {
    let max_len = max_len.max(1);
    let chars: Vec<char> = text.chars().collect();
    let total = chars.len();

    let mut parts = Vec::new();
    let mut start = skip_whitespace(&chars, 0);

    while start < total {
        let window = (total - start).min(max_len);
        let mut end = start + window;

        if end < total {
            let slice = &chars[start..end];
            if let Some(dot) = slice.iter().rposition(|&c| c == '.').filter(|&i| i > 0) {
                end = start + dot + 1;
            } else if let Some(space) = slice.iter().rposition(|c| c.is_whitespace()).filter(|&i| i > 0) {
                end = start + space;
            }
        }

        let part: String = chars[start..end].iter().collect();
        let part = part.trim();
        if !part.is_empty() {
            parts.push(part.to_string());
        }

        start = skip_whitespace(&chars, end);
    }

    parts
}

fn skip_whitespace(chars: &[char], mut idx: usize) -> usize {
    while idx < chars.len() && chars[idx].is_whitespace() {
        idx += 1;
    }
    idx
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
