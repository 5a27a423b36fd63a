// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Anchorlink and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Selection segmentation: one raw selection range in, one segment per touched element out.
//!
//! Candidate elements are discovered by three redundant strategies (intersected text nodes,
//! range endpoints, full scan) because range intersection queries are not reliable on every
//! surface. Per-element failures drop that element only.

use std::cmp::Ordering;
use std::collections::BTreeSet;

use smallvec::SmallVec;

use crate::config::SegmenterConfig;
use crate::model::{ElementId, Segment, Selection};
use crate::surface::{BoundaryPoint, SelectionRange, TextSurface};

mod locate;

pub use locate::{char_len, locate_span, slice_chars, MatchStrategy, SpanLocator, SpanMatch};

type Candidates = SmallVec<[ElementId; 4]>;

/// Converts a selection range on a [`TextSurface`] into a [`Selection`].
#[derive(Debug)]
pub struct SelectionSegmenter<'a, S: TextSurface + ?Sized> {
    surface: &'a S,
    locator: SpanLocator,
}

impl<'a, S: TextSurface + ?Sized> SelectionSegmenter<'a, S> {
    pub fn new(surface: &'a S) -> Self {
        Self {
            surface,
            locator: SpanLocator::default(),
        }
    }

    pub fn with_config(surface: &'a S, config: SegmenterConfig) -> Self {
        Self {
            surface,
            locator: SpanLocator::new(config),
        }
    }

    pub fn surface(&self) -> &'a S {
        self.surface
    }

    /// Segments `range`; `known_elements` restricts candidates to mounted/visible elements.
    ///
    /// Returns `None` for blank selections and when no element yields a valid span.
    pub fn segment(
        &self,
        range: &SelectionRange,
        known_elements: Option<&BTreeSet<ElementId>>,
    ) -> Option<Selection> {
        let full_text = self.surface.range_text(range);
        if full_text.trim().is_empty() {
            tracing::trace!("ignoring blank selection");
            return None;
        }

        let candidates = self.candidates(range, known_elements);
        if candidates.is_empty() {
            tracing::debug!(text_len = full_text.len(), "selection touches no document element");
            return None;
        }

        let segments = candidates
            .iter()
            .filter_map(|element_id| self.segment_element(*element_id, range))
            .collect::<Vec<_>>();

        let Some(first) = segments.first().and_then(Segment::element_id) else {
            tracing::debug!(
                candidates = candidates.len(),
                "no candidate element produced a valid segment"
            );
            return None;
        };
        let document_id = self.surface.panel_document(first);

        Some(Selection::new(segments, document_id, full_text))
    }

    fn candidates(
        &self,
        range: &SelectionRange,
        known_elements: Option<&BTreeSet<ElementId>>,
    ) -> Candidates {
        let mut candidates = Candidates::new();
        let push = |element_id: ElementId, candidates: &mut Candidates| {
            let allowed = known_elements.map_or(true, |known| known.contains(&element_id));
            if allowed && !candidates.contains(&element_id) {
                candidates.push(element_id);
            }
        };

        for node in self.surface.intersected_text_nodes(range) {
            if let Some(element_id) = self.surface.owning_element(node) {
                push(element_id, &mut candidates);
            }
        }

        for point in [range.start, range.end] {
            if let Some(element_id) = self.surface.owning_element(point.node) {
                push(element_id, &mut candidates);
            }
        }

        if candidates.is_empty() {
            tracing::trace!("falling back to a full element scan");
            for element_id in self.surface.mounted_elements() {
                if self.intersects(element_id, range) {
                    push(element_id, &mut candidates);
                }
            }
        }

        candidates
    }

    fn intersects(&self, element_id: ElementId, range: &SelectionRange) -> bool {
        let Some(extent) = self.surface.element_extent(element_id) else {
            return false;
        };
        self.before(&extent.start, &range.end) && self.before(&range.start, &extent.end)
    }

    fn before(&self, a: &BoundaryPoint, b: &BoundaryPoint) -> bool {
        self.surface.compare_points(a, b) == Some(Ordering::Less)
    }

    fn later(&self, a: BoundaryPoint, b: BoundaryPoint) -> Option<BoundaryPoint> {
        Some(match self.surface.compare_points(&a, &b)? {
            Ordering::Less => b,
            _ => a,
        })
    }

    fn earlier(&self, a: BoundaryPoint, b: BoundaryPoint) -> Option<BoundaryPoint> {
        Some(match self.surface.compare_points(&a, &b)? {
            Ordering::Greater => b,
            _ => a,
        })
    }

    fn segment_element(&self, element_id: ElementId, range: &SelectionRange) -> Option<Segment> {
        let Some(extent) = self.surface.element_extent(element_id) else {
            tracing::debug!(%element_id, "skipping element without a rendered extent");
            return None;
        };

        let start = self.later(range.start, extent.start)?;
        let end = self.earlier(range.end, extent.end)?;
        if !self.before(&start, &end) {
            return None;
        }

        let intersection = self.surface.text_between(&start, &end);
        if intersection.trim().is_empty() {
            tracing::trace!(%element_id, "skipping blank intersection");
            return None;
        }
        let hint = char_len(&self.surface.text_between(&extent.start, &start));

        let Some(element_text) = self.surface.element_source_text(element_id) else {
            tracing::debug!(%element_id, "skipping element without source text");
            return None;
        };

        let Some(found) = self.locator.locate(&element_text, &intersection, Some(hint)) else {
            tracing::debug!(
                %element_id,
                intersection_len = intersection.len(),
                "could not locate selected text in element"
            );
            return None;
        };

        let element_len = char_len(&element_text);
        if found.start >= found.end || found.end > element_len {
            tracing::debug!(
                %element_id,
                start = found.start,
                end = found.end,
                element_len,
                "discarding invalid span"
            );
            return None;
        }
        if found.strategy.is_fallback() {
            tracing::debug!(%element_id, strategy = ?found.strategy, "located span via fallback");
        }

        Some(Segment::for_element(element_id, found.text, found.start, found.end))
    }
}

#[cfg(test)]
mod tests;
