// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Anchorlink and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::ids::{DocumentId, ElementId};
use super::source_uri::SourceUri;
use crate::segment::{slice_chars, SpanLocator, SpanMatch};

/// One anchor plus the text captured when it was created.
///
/// `start`/`end` are half-open char offsets into the element's plain text. The URI is kept as
/// persisted (either spelling) so annotations round-trip unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub struct Segment {
    #[serde(rename = "sourceURI")]
    pub source_uri: String,
    pub text: String,
    pub start: usize,
    pub end: usize,
}

impl Segment {
    pub fn new(
        source_uri: impl Into<String>,
        text: impl Into<String>,
        start: usize,
        end: usize,
    ) -> Self {
        Self {
            source_uri: source_uri.into(),
            text: text.into(),
            start,
            end,
        }
    }

    pub fn for_element(element_id: ElementId, text: impl Into<String>, start: usize, end: usize) -> Self {
        Self::new(SourceUri::new(element_id).to_string(), text, start, end)
    }

    pub fn uri(&self) -> Option<SourceUri> {
        SourceUri::parse(&self.source_uri).ok()
    }

    pub fn element_id(&self) -> Option<ElementId> {
        self.uri().map(|uri| uri.element_id())
    }

    /// Finds this segment again in `current_text`.
    ///
    /// Recorded offsets win while they still cover the recorded text; otherwise the drift
    /// fallback chain searches for it.
    pub fn relocate(&self, current_text: &str) -> Option<SpanMatch> {
        if let Some(slice) = slice_chars(current_text, self.start, self.end) {
            if slice == self.text {
                return Some(SpanMatch::recorded(self.start, self.end, slice.to_owned()));
            }
        }
        SpanLocator::default().locate(current_text, &self.text, Some(self.start))
    }
}

/// A transient grouping of segments captured from one selection gesture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    segments: Vec<Segment>,
    document_id: Option<DocumentId>,
    full_text: String,
}

impl Selection {
    pub fn new(
        segments: Vec<Segment>,
        document_id: Option<DocumentId>,
        full_text: impl Into<String>,
    ) -> Self {
        Self {
            segments,
            document_id,
            full_text: full_text.into(),
        }
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Primary document, resolved from the first surviving element.
    pub fn document_id(&self) -> Option<DocumentId> {
        self.document_id
    }

    pub fn full_text(&self) -> &str {
        &self.full_text
    }

    pub fn first_element_id(&self) -> Option<ElementId> {
        self.segments.first().and_then(Segment::element_id)
    }
}

/// Where a link option jumps to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetInfo {
    #[serde(rename = "sourceURI")]
    pub source_uri: String,
    pub start: usize,
    pub end: usize,
}

impl From<&Segment> for TargetInfo {
    fn from(segment: &Segment) -> Self {
        Self {
            source_uri: segment.source_uri.clone(),
            start: segment.start,
            end: segment.end,
        }
    }
}

/// A span the navigation highlighter should flash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HighlightTarget {
    #[serde(rename = "sourceURI")]
    pub source_uri: String,
    pub start: usize,
    pub end: usize,
    pub text: String,
}

impl HighlightTarget {
    pub fn new(source_uri: impl Into<String>, start: usize, end: usize, text: impl Into<String>) -> Self {
        Self {
            source_uri: source_uri.into(),
            start,
            end,
            text: text.into(),
        }
    }

    /// `start < end <= text_len`, in chars.
    pub fn has_valid_range(&self, text_len: usize) -> bool {
        self.start < self.end && self.end <= text_len
    }
}

impl From<&Segment> for HighlightTarget {
    fn from(segment: &Segment) -> Self {
        Self {
            source_uri: segment.source_uri.clone(),
            start: segment.start,
            end: segment.end,
            text: segment.text.clone(),
        }
    }
}

impl From<Segment> for HighlightTarget {
    fn from(segment: Segment) -> Self {
        Self {
            source_uri: segment.source_uri,
            start: segment.start,
            end: segment.end,
            text: segment.text,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Segment;
    use crate::model::ElementId;
    use crate::segment::MatchStrategy;

    #[test]
    fn element_id_accepts_both_uri_spellings() {
        let a = Segment::new("DocumentElements/5", "x", 0, 1);
        let b = Segment::new("/DocumentElements/5", "x", 0, 1);
        assert_eq!(a.element_id(), Some(ElementId::new(5)));
        assert_eq!(b.element_id(), Some(ElementId::new(5)));
        assert_eq!(Segment::new("nope", "x", 0, 1).element_id(), None);
    }

    #[test]
    fn relocate_keeps_recorded_offsets_when_text_is_unchanged() {
        let segment = Segment::for_element(ElementId::new(1), "brown", 10, 15);
        let found = segment.relocate("the quick brown fox").expect("relocate");
        assert_eq!((found.start, found.end), (10, 15));
        assert_eq!(found.strategy, MatchStrategy::Recorded);
    }

    #[test]
    fn relocate_tolerates_whitespace_drift_before_the_span() {
        let segment = Segment::for_element(ElementId::new(1), "brown", 10, 15);
        let found = segment.relocate("the  quick   brown fox").expect("relocate");
        assert_eq!(found.text, "brown");
        assert_eq!((found.start, found.end), (13, 18));
    }
}
