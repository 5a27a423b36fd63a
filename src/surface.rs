// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Anchorlink and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Text-surface capability consumed by selection segmentation.
//!
//! A surface is whatever renders element text: it owns the transient coordinate space
//! (text nodes + char offsets) that a user selection is expressed in. The segmenter only talks
//! to this trait, so it runs against a headless tree as well as a live one.

use std::cmp::Ordering;

use crate::dom::NodeId;
use crate::model::{DocumentId, ElementId};

/// A position inside a rendered text node, counted in chars.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BoundaryPoint {
    pub node: NodeId,
    pub offset: usize,
}

impl BoundaryPoint {
    pub fn new(node: NodeId, offset: usize) -> Self {
        Self { node, offset }
    }
}

/// A selection range between two boundary points (`start` before `end` in document order).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SelectionRange {
    pub start: BoundaryPoint,
    pub end: BoundaryPoint,
}

impl SelectionRange {
    pub fn new(start: BoundaryPoint, end: BoundaryPoint) -> Self {
        Self { start, end }
    }

    pub fn is_collapsed(&self) -> bool {
        self.start == self.end
    }
}

pub trait TextSurface {
    /// The range's text as the renderer reports it (may differ from element source text).
    fn range_text(&self, range: &SelectionRange) -> String;

    /// Text nodes the range intersects, in document order. Allowed to under-report.
    fn intersected_text_nodes(&self, range: &SelectionRange) -> Vec<NodeId>;

    /// Nearest ancestor of `node` (or `node` itself) carrying an element identity.
    fn owning_element(&self, node: NodeId) -> Option<ElementId>;

    /// Every element currently mounted, in document order.
    fn mounted_elements(&self) -> Vec<ElementId>;

    /// Full rendered extent of an element; `None` when it is not mounted or has no text.
    fn element_extent(&self, element_id: ElementId) -> Option<SelectionRange>;

    /// Document-order comparison; `None` when either point is not in the tree.
    fn compare_points(&self, a: &BoundaryPoint, b: &BoundaryPoint) -> Option<Ordering>;

    /// Rendered text between two points in the same element.
    fn text_between(&self, start: &BoundaryPoint, end: &BoundaryPoint) -> String;

    /// Plain source text of the element, the coordinate space segments are recorded in.
    fn element_source_text(&self, element_id: ElementId) -> Option<String>;

    /// Document of the panel the element is mounted in.
    fn panel_document(&self, element_id: ElementId) -> Option<DocumentId>;
}
