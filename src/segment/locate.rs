// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Anchorlink and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Locating captured text inside an element's source text.
//!
//! Rendered text can differ from source text (collapsed whitespace, NBSP, Unicode
//! normalisation), so an exact search is followed by progressively looser probes.

use memchr::memmem;

use crate::config::SegmenterConfig;

/// Which probe found the span.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MatchStrategy {
    /// The recorded offsets still cover the recorded text.
    Recorded,
    Exact,
    Trimmed,
    Prefix { chars: usize },
    Suffix { chars: usize },
    Window { offset: usize },
}

impl MatchStrategy {
    pub fn is_fallback(self) -> bool {
        !matches!(self, Self::Recorded | Self::Exact)
    }
}

/// A validated `[start, end)` char span plus the element text it covers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpanMatch {
    pub start: usize,
    pub end: usize,
    pub text: String,
    pub strategy: MatchStrategy,
}

impl SpanMatch {
    pub(crate) fn recorded(start: usize, end: usize, text: String) -> Self {
        Self {
            start,
            end,
            text,
            strategy: MatchStrategy::Recorded,
        }
    }
}

pub fn char_len(s: &str) -> usize {
    s.chars().count()
}

fn byte_offset(s: &str, char_offset: usize) -> Option<usize> {
    s.char_indices()
        .map(|(index, _)| index)
        .chain(std::iter::once(s.len()))
        .nth(char_offset)
}

/// `s[start..end]` in chars; `None` when out of range or reversed.
pub fn slice_chars(s: &str, start: usize, end: usize) -> Option<&str> {
    if start > end {
        return None;
    }
    let from = byte_offset(s, start)?;
    let to = byte_offset(s, end)?;
    s.get(from..to)
}

fn char_index_of_byte(s: &str, byte: usize) -> usize {
    s[..byte].chars().count()
}

fn find_first(haystack: &str, needle: &str) -> Option<usize> {
    if needle.is_empty() {
        return None;
    }
    let byte = memmem::find(haystack.as_bytes(), needle.as_bytes())?;
    Some(char_index_of_byte(haystack, byte))
}

fn find_last(haystack: &str, needle: &str) -> Option<usize> {
    if needle.is_empty() {
        return None;
    }
    let byte = memmem::rfind(haystack.as_bytes(), needle.as_bytes())?;
    Some(char_index_of_byte(haystack, byte))
}

fn find_nearest(haystack: &str, needle: &str, hint: usize) -> Option<usize> {
    if needle.is_empty() {
        return None;
    }
    memmem::find_iter(haystack.as_bytes(), needle.as_bytes())
        .map(|byte| char_index_of_byte(haystack, byte))
        .min_by_key(|start| start.abs_diff(hint))
}

fn prefix(s: &str, chars: usize) -> &str {
    match byte_offset(s, chars) {
        Some(end) => &s[..end],
        None => s,
    }
}

fn suffix(s: &str, chars: usize) -> &str {
    let len = char_len(s);
    if chars >= len {
        return s;
    }
    match byte_offset(s, len - chars) {
        Some(start) => &s[start..],
        None => s,
    }
}

/// The offset-location chain used for segmentation and re-anchoring.
#[derive(Debug, Clone, Default)]
pub struct SpanLocator {
    config: SegmenterConfig,
}

impl SpanLocator {
    pub fn new(config: SegmenterConfig) -> Self {
        Self { config }
    }

    /// Locates `needle` in `element_text`.
    ///
    /// `hint` is the expected char start; an exact search picks the occurrence closest to it,
    /// otherwise the first one.
    pub fn locate(&self, element_text: &str, needle: &str, hint: Option<usize>) -> Option<SpanMatch> {
        let element_len = char_len(element_text);
        let needle_len = char_len(needle);
        if element_len == 0 || needle_len == 0 {
            return None;
        }

        let exact = match hint {
            Some(hint) => find_nearest(element_text, needle, hint),
            None => find_first(element_text, needle),
        };
        if let Some(start) = exact {
            return finish(element_text, start, start + needle_len, MatchStrategy::Exact);
        }

        let trimmed = needle.trim();
        let trimmed_len = char_len(trimmed);
        if trimmed_len == 0 {
            return None;
        }
        if trimmed_len != needle_len {
            if let Some(start) = find_first(element_text, trimmed) {
                return finish(element_text, start, start + trimmed_len, MatchStrategy::Trimmed);
            }
        }

        for chars in [self.config.long_prefix_chars, self.config.short_prefix_chars] {
            if chars == 0 || chars >= trimmed_len {
                continue;
            }
            if let Some(start) = find_first(element_text, prefix(trimmed, chars)) {
                let end = (start + trimmed_len).min(element_len);
                return finish(element_text, start, end, MatchStrategy::Prefix { chars });
            }
        }

        let chars = self.config.suffix_chars;
        if chars > 0 && chars < trimmed_len {
            if let Some(hit) = find_last(element_text, suffix(trimmed, chars)) {
                let end = hit + chars;
                let start = end.saturating_sub(trimmed_len);
                return finish(element_text, start, end, MatchStrategy::Suffix { chars });
            }
        }

        let window = self.config.window_chars;
        if window == 0 || window >= trimmed_len {
            return None;
        }
        for offset in 0..=(trimmed_len - window) {
            let Some(probe) = slice_chars(trimmed, offset, offset + window) else {
                break;
            };
            if let Some(hit) = find_first(element_text, probe) {
                let start = hit.saturating_sub(offset);
                let end = (start + trimmed_len).min(element_len);
                return finish(element_text, start, end, MatchStrategy::Window { offset });
            }
        }
        None
    }
}

fn finish(element_text: &str, start: usize, end: usize, strategy: MatchStrategy) -> Option<SpanMatch> {
    if start >= end {
        return None;
    }
    let text = slice_chars(element_text, start, end)?;
    Some(SpanMatch {
        start,
        end,
        text: text.to_owned(),
        strategy,
    })
}

/// [`SpanLocator::locate`] with default probe sizes and no position hint.
pub fn locate_span(element_text: &str, needle: &str) -> Option<SpanMatch> {
    SpanLocator::default().locate(element_text, needle, None)
}
