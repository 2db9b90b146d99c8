//! Fuzzy text location over the materialized page window
//!
//! Extraction gives no whitespace guarantees between runs, so the locator
//! matches queries through a noise-tolerant pattern: alphanumeric query
//! characters must appear in order, with anything non-alphanumeric
//! allowed in between.

use std::ops::Range;

use log::debug;
use regex::{Regex, RegexBuilder};

use super::types::{PageWindow, Query};
use crate::text_layer::{RunId, TextArena, byte_for_char};

/// Queries longer than this anchor with their first and last this-many
/// characters instead of one oversized pattern.
const ANCHOR_CHARS: usize = 1000;

/// One run's slice of the concatenated window text.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct IndexEntry {
    pub run: RunId,
    /// Half-open byte range within the concatenated text
    pub start: usize,
    pub end: usize,
}

impl IndexEntry {
    #[must_use]
    pub fn contains(&self, offset: usize) -> bool {
        offset >= self.start && offset < self.end
    }
}

/// Ephemeral concatenation of every materialized page's text in the
/// window, in reading order. Rebuilt per locate pass. Offsets are
/// contiguous and monotonically increasing; a run appears at most once.
/// Pages the arena does not hold contribute nothing.
#[derive(Clone, Debug, Default)]
pub struct ConcatenatedIndex {
    text: String,
    entries: Vec<IndexEntry>,
}

impl ConcatenatedIndex {
    #[must_use]
    pub fn build(arena: &TextArena, window: PageWindow) -> Self {
        let mut text = String::new();
        let mut entries = Vec::new();

        for page in window.pages() {
            let Some(page_text) = arena.get(page) else {
                continue;
            };

            for (i, run) in page_text.runs.iter().enumerate() {
                let start = text.len();
                text.push_str(&page_text.text[run.start..run.end]);
                entries.push(IndexEntry {
                    run: RunId::new(page, i),
                    start,
                    end: text.len(),
                });
            }
        }

        Self { text, entries }
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    #[must_use]
    pub fn entries(&self) -> &[IndexEntry] {
        &self.entries
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entry for a specific run. Entries are ordered by run id, courtesy
    /// of the window walk.
    #[must_use]
    pub fn entry_for(&self, run: RunId) -> Option<&IndexEntry> {
        self.entries
            .binary_search_by(|e| e.run.cmp(&run))
            .ok()
            .map(|i| &self.entries[i])
    }

    /// Global byte offset of the `char_index`-th character of a run.
    /// `char_index` may equal the run's character count (end-exclusive).
    #[must_use]
    pub fn global_offset(&self, run: RunId, char_index: usize) -> Option<usize> {
        let entry = self.entry_for(run)?;
        let run_text = &self.text[entry.start..entry.end];
        Some(entry.start + byte_for_char(run_text, char_index)?)
    }
}

/// Find the query in the index, returning a half-open byte range into the
/// concatenated text. `None` means not-found; the caller decides whether
/// that clears highlights (empty query) or leaves a retry pending.
#[must_use]
pub fn locate(index: &ConcatenatedIndex, query: &Query) -> Option<Range<usize>> {
    if query.text.is_empty() || index.text.is_empty() {
        return None;
    }

    if query.exact {
        let at = index.text.find(&query.text)?;
        return Some(at..at + query.text.len());
    }

    fuzzy_locate(&index.text, &query.text)
}

fn fuzzy_locate(corpus: &str, query: &str) -> Option<Range<usize>> {
    let chars: Vec<char> = query.chars().collect();

    if chars.len() > ANCHOR_CHARS {
        let head = noise_tolerant_pattern(&chars[..ANCHOR_CHARS])?;
        let tail = noise_tolerant_pattern(&chars[chars.len() - ANCHOR_CHARS..])?;

        let start = head.find(corpus)?.start();
        let end = tail.find(corpus)?.end();
        if end <= start {
            // Repetitive corpus made the tail anchor land before the head
            debug!("anchored locate produced inverted range ({start}..{end}), dropping");
            return None;
        }

        debug!("anchored locate matched {start}..{end}");
        return Some(start..end);
    }

    let pattern = noise_tolerant_pattern(&chars)?;
    let found = pattern.find(corpus)?;
    debug!(
        "fuzzy locate matched {}..{} for {} query chars",
        found.start(),
        found.end(),
        chars.len()
    );
    Some(found.range())
}

/// Strip everything outside `[A-Za-z0-9]`, then join the survivors with a
/// wildcard absorbing any non-alphanumeric noise. `None` when nothing
/// survives the strip.
fn noise_tolerant_pattern(chars: &[char]) -> Option<Regex> {
    let kept: Vec<char> = chars
        .iter()
        .copied()
        .filter(char::is_ascii_alphanumeric)
        .collect();

    if kept.is_empty() {
        return None;
    }

    let mut pattern = String::with_capacity(kept.len() * 14);
    for (i, c) in kept.iter().enumerate() {
        if i > 0 {
            pattern.push_str("[^A-Za-z0-9]*");
        }
        pattern.push(*c);
    }

    RegexBuilder::new(&pattern)
        .case_insensitive(true)
        .build()
        .ok()
}
