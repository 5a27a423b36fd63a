// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Anchorlink and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Rendered element tree capability and its headless implementation.
//!
//! Naming conventions shared by every tree:
//! - document panels carry [`PANEL_CLASS`] and [`DOCUMENT_ID_ATTR`];
//! - document elements carry `id="DocumentElements/<id>"`, [`ELEMENT_ID_ATTR`] and
//!   [`SOURCE_URI_ATTR`];
//! - highlight sub-spans inside an element carry the configured segment class plus
//!   [`SEGMENT_START_ATTR`]/[`SEGMENT_END_ATTR`].

use std::fmt;

mod virtual_dom;

pub use virtual_dom::{ClassEvent, VirtualDom};

pub const PANEL_CLASS: &str = "document-panel";
pub const DOCUMENT_ID_ATTR: &str = "data-document-id";
pub const ELEMENT_ID_ATTR: &str = "data-element-id";
pub const SOURCE_URI_ATTR: &str = "data-source-uri";
pub const SEGMENT_START_ATTR: &str = "data-start";
pub const SEGMENT_END_ATTR: &str = "data-end";

/// Handle to a node of a rendered tree. Only meaningful for the tree that issued it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    pub const fn new(index: usize) -> Self {
        Self(index)
    }

    pub const fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Read access plus the two mutations the highlighter performs (class toggles, scrolling).
///
/// Methods take `&self`: trees are shared with timer tasks and use interior mutability.
pub trait RenderTree {
    fn element_by_id(&self, id: &str) -> Option<NodeId>;

    /// Supports `#id` (CSS-escaped), bare tag names and `[attr="value"]` selectors.
    fn query_selector(&self, selector: &str) -> Option<NodeId>;

    fn element_by_data(&self, name: &str, value: &str) -> Option<NodeId>;

    /// Mounted document panels, in document order.
    fn panels(&self) -> Vec<NodeId>;

    /// Element descendants of `root` (excluding `root`), in document order.
    fn descendants(&self, root: NodeId) -> Vec<NodeId>;

    /// Every element node, in document order.
    fn all_elements(&self) -> Vec<NodeId>;

    fn attribute(&self, node: NodeId, name: &str) -> Option<String>;

    /// Nearest panel ancestor of `node` (or `node` itself).
    fn closest_panel(&self, node: NodeId) -> Option<NodeId>;

    fn text_content(&self, node: NodeId) -> String;

    fn has_class(&self, node: NodeId, class: &str) -> bool;

    fn add_class(&self, node: NodeId, class: &str);

    fn remove_class(&self, node: NodeId, class: &str);

    fn is_fully_visible(&self, node: NodeId) -> bool;

    fn scroll_into_view(&self, node: NodeId);
}
