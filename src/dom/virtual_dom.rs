// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Anchorlink and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::borrow::Cow;
use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Mutex, MutexGuard};

use smol_str::SmolStr;
use tokio::time::Instant;

use super::{
    NodeId, RenderTree, DOCUMENT_ID_ATTR, ELEMENT_ID_ATTR, PANEL_CLASS, SEGMENT_END_ATTR,
    SEGMENT_START_ATTR, SOURCE_URI_ATTR,
};
use crate::model::{
    DocumentId, DocumentInfo, ElementId, ElementTextIndex, SourceUri, Workspace,
};
use crate::segment::{char_len, slice_chars};
use crate::surface::{BoundaryPoint, SelectionRange, TextSurface};

/// One class toggle applied to the tree, with the (tokio) time it happened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassEvent {
    pub node: NodeId,
    pub class: SmolStr,
    pub added: bool,
    pub at: Instant,
}

#[derive(Debug, Clone, Default)]
struct ElementData {
    tag: SmolStr,
    attributes: BTreeMap<SmolStr, String>,
    classes: BTreeSet<SmolStr>,
}

#[derive(Debug, Clone)]
enum NodeKind {
    Element(ElementData),
    Text(String),
}

#[derive(Debug, Clone)]
struct VNode {
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    kind: NodeKind,
}

#[derive(Debug)]
struct DomState {
    nodes: Vec<VNode>,
    source_texts: BTreeMap<ElementId, String>,
    documents: BTreeMap<DocumentId, DocumentInfo>,
    visible: BTreeSet<NodeId>,
    scrolls: Vec<NodeId>,
    class_events: Vec<ClassEvent>,
    intersection_queries_broken: bool,
    block_separator: String,
}

const ROOT: NodeId = NodeId::new(0);

impl DomState {
    fn new() -> Self {
        let root = VNode {
            parent: None,
            children: Vec::new(),
            kind: NodeKind::Element(ElementData {
                tag: SmolStr::new_static("body"),
                ..ElementData::default()
            }),
        };
        Self {
            nodes: vec![root],
            source_texts: BTreeMap::new(),
            documents: BTreeMap::new(),
            visible: BTreeSet::new(),
            scrolls: Vec::new(),
            class_events: Vec::new(),
            intersection_queries_broken: false,
            block_separator: String::new(),
        }
    }

    fn node(&self, node: NodeId) -> Option<&VNode> {
        self.nodes.get(node.index())
    }

    fn element(&self, node: NodeId) -> Option<&ElementData> {
        match &self.node(node)?.kind {
            NodeKind::Element(data) => Some(data),
            NodeKind::Text(_) => None,
        }
    }

    fn element_mut(&mut self, node: NodeId) -> Option<&mut ElementData> {
        match &mut self.nodes.get_mut(node.index())?.kind {
            NodeKind::Element(data) => Some(data),
            NodeKind::Text(_) => None,
        }
    }

    fn text(&self, node: NodeId) -> Option<&str> {
        match &self.node(node)?.kind {
            NodeKind::Text(text) => Some(text),
            NodeKind::Element(_) => None,
        }
    }

    fn attr(&self, node: NodeId, name: &str) -> Option<&str> {
        self.element(node)?.attributes.get(name).map(String::as_str)
    }

    fn push(&mut self, parent: NodeId, kind: NodeKind) -> NodeId {
        let id = NodeId::new(self.nodes.len());
        self.nodes.push(VNode {
            parent: Some(parent),
            children: Vec::new(),
            kind,
        });
        if let Some(parent) = self.nodes.get_mut(parent.index()) {
            parent.children.push(id);
        }
        id
    }

    /// Attached nodes in pre-order, starting at `from`.
    fn preorder(&self, from: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![from];
        while let Some(node) = stack.pop() {
            let Some(vnode) = self.node(node) else {
                continue;
            };
            out.push(node);
            stack.extend(vnode.children.iter().rev().copied());
        }
        out
    }

    fn is_attached(&self, node: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(id) = current {
            if id == ROOT {
                return true;
            }
            current = self.node(id).and_then(|n| n.parent);
        }
        false
    }

    fn text_nodes(&self, from: NodeId) -> Vec<NodeId> {
        self.preorder(from)
            .into_iter()
            .filter(|node| self.text(*node).is_some())
            .collect()
    }

    fn element_nodes(&self, from: NodeId) -> Vec<NodeId> {
        self.preorder(from)
            .into_iter()
            .filter(|node| self.element(*node).is_some())
            .collect()
    }

    fn identity(&self, node: NodeId) -> Option<ElementId> {
        if let Some(raw) = self.attr(node, ELEMENT_ID_ATTR) {
            if let Ok(element_id) = raw.parse::<ElementId>() {
                return Some(element_id);
            }
        }
        let raw_id = self.attr(node, "id")?;
        SourceUri::parse(raw_id).ok().map(|uri| uri.element_id())
    }

    fn climb<T>(&self, node: NodeId, mut f: impl FnMut(NodeId) -> Option<T>) -> Option<T> {
        let mut current = Some(node);
        while let Some(id) = current {
            if let Some(found) = f(id) {
                return Some(found);
            }
            current = self.node(id).and_then(|n| n.parent);
        }
        None
    }

    fn owning_element(&self, node: NodeId) -> Option<ElementId> {
        self.climb(node, |id| self.identity(id))
    }

    fn element_node_of(&self, element_id: ElementId) -> Option<NodeId> {
        self.element_nodes(ROOT)
            .into_iter()
            .find(|node| self.identity(*node) == Some(element_id))
    }

    fn closest_panel(&self, node: NodeId) -> Option<NodeId> {
        self.climb(node, |id| {
            self.element(id)
                .filter(|data| data.classes.contains(PANEL_CLASS))
                .map(|_| id)
        })
    }

    fn text_content(&self, node: NodeId) -> String {
        self.text_nodes(node)
            .into_iter()
            .filter_map(|text| self.text(text))
            .collect()
    }

    fn position(&self, order: &[NodeId], node: NodeId) -> Option<usize> {
        order.iter().position(|candidate| *candidate == node)
    }

    fn text_between(&self, start: &BoundaryPoint, end: &BoundaryPoint) -> String {
        let order = self.text_nodes(ROOT);
        let (Some(from), Some(to)) = (self.position(&order, start.node), self.position(&order, end.node))
        else {
            return String::new();
        };
        if from > to {
            return String::new();
        }

        let mut out = String::new();
        let mut previous_owner: Option<ElementId> = None;
        for (index, node) in order[from..=to].iter().enumerate() {
            let text = self.text(*node).unwrap_or_default();
            let len = char_len(text);
            let slice_start = if index == 0 { start.offset.min(len) } else { 0 };
            let slice_end = if from + index == to { end.offset.min(len) } else { len };
            let owner = self.owning_element(*node);
            if index > 0 && owner.is_some() && previous_owner.is_some() && owner != previous_owner {
                out.push_str(&self.block_separator);
            }
            if owner.is_some() {
                previous_owner = owner;
            }
            if slice_start < slice_end {
                out.push_str(slice_chars(text, slice_start, slice_end).unwrap_or_default());
            }
        }
        out
    }
}

/// Headless rendered tree: an arena of element and text nodes behind a mutex.
///
/// Implements [`RenderTree`], [`TextSurface`] and [`ElementTextIndex`], so one instance can
/// stand in for a browser viewer end to end. Element source text is tracked separately from the
/// rendered text nodes to model renderer normalisation drift.
#[derive(Debug)]
pub struct VirtualDom {
    state: Mutex<DomState>,
}

impl Default for VirtualDom {
    fn default() -> Self {
        Self::new()
    }
}

impl VirtualDom {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(DomState::new()),
        }
    }

    /// Text inserted between elements when a range's text spans several of them.
    pub fn with_block_separator(self, separator: impl Into<String>) -> Self {
        self.state().block_separator = separator.into();
        self
    }

    fn state(&self) -> MutexGuard<'_, DomState> {
        self.state.lock().expect("virtual dom lock poisoned")
    }

    pub fn root(&self) -> NodeId {
        ROOT
    }

    pub fn register_document(&self, info: DocumentInfo) {
        self.state().documents.insert(info.document_id, info);
    }

    /// Registers every workspace document and mounts one panel per entry of `documents`.
    ///
    /// Segments of the workspace's linking annotations are rendered as highlight sub-spans
    /// carrying `segment_class`. Returns the panels in mount order.
    pub fn mount_workspace(
        &self,
        workspace: &Workspace,
        documents: impl IntoIterator<Item = DocumentId>,
        segment_class: &str,
    ) -> Vec<NodeId> {
        for document_id in workspace.documents().keys() {
            if let Some(info) = workspace.document_info(*document_id) {
                self.register_document(info);
            }
        }

        let mut spans: BTreeMap<ElementId, BTreeSet<(usize, usize)>> = BTreeMap::new();
        for annotation in workspace.linking_annotations() {
            for segment in annotation.segments() {
                if let Some(element_id) = segment.element_id() {
                    spans.entry(element_id).or_default().insert((segment.start, segment.end));
                }
            }
        }

        let mut panels = Vec::new();
        for document_id in documents {
            if workspace.document(document_id).is_none() {
                tracing::debug!(document_id = document_id.get(), "unknown document not mounted");
                continue;
            }
            let panel = self.mount_panel(document_id);
            for element in workspace.document_elements(document_id) {
                let node = self.mount_element(panel, element.id(), element.content());
                if let Some(ranges) = spans.get(&element.id()) {
                    let ranges = ranges.iter().copied().collect::<Vec<_>>();
                    self.render_highlights(node, &ranges, segment_class);
                }
            }
            panels.push(panel);
        }
        panels
    }

    pub fn append_element(&self, parent: NodeId, tag: &str) -> NodeId {
        self.state().push(
            parent,
            NodeKind::Element(ElementData {
                tag: SmolStr::new(tag),
                ..ElementData::default()
            }),
        )
    }

    pub fn append_text(&self, parent: NodeId, text: impl Into<String>) -> NodeId {
        self.state().push(parent, NodeKind::Text(text.into()))
    }

    pub fn set_attribute(&self, node: NodeId, name: &str, value: impl Into<String>) {
        if let Some(data) = self.state().element_mut(node) {
            data.attributes.insert(SmolStr::new(name), value.into());
        }
    }

    pub fn mount_panel(&self, document_id: DocumentId) -> NodeId {
        let panel = self.append_element(ROOT, "section");
        let mut state = self.state();
        if let Some(data) = state.element_mut(panel) {
            data.classes.insert(SmolStr::new_static(PANEL_CLASS));
            data.attributes
                .insert(SmolStr::new_static(DOCUMENT_ID_ATTR), document_id.to_string());
        }
        panel
    }

    /// Mounts a standard element whose rendered text equals its source text.
    pub fn mount_element(&self, parent: NodeId, element_id: ElementId, text: &str) -> NodeId {
        self.mount_element_rendered(parent, element_id, text, &[text])
    }

    /// Mounts an element whose rendered text nodes (`pieces`) may differ from `source_text`.
    pub fn mount_element_rendered(
        &self,
        parent: NodeId,
        element_id: ElementId,
        source_text: &str,
        pieces: &[&str],
    ) -> NodeId {
        let node = self.append_element(parent, "p");
        let uri = SourceUri::new(element_id).to_string();
        self.set_attribute(node, "id", uri.clone());
        self.set_attribute(node, ELEMENT_ID_ATTR, element_id.to_string());
        self.set_attribute(node, SOURCE_URI_ATTR, uri);
        for piece in pieces {
            self.append_text(node, *piece);
        }
        self.state().source_texts.insert(element_id, source_text.to_owned());
        node
    }

    /// Detaches `node` (and its subtree) from the tree.
    pub fn unmount(&self, node: NodeId) {
        let mut state = self.state();
        let Some(parent) = state.node(node).and_then(|n| n.parent) else {
            return;
        };
        if let Some(parent) = state.nodes.get_mut(parent.index()) {
            parent.children.retain(|child| *child != node);
        }
        if let Some(vnode) = state.nodes.get_mut(node.index()) {
            vnode.parent = None;
        }
    }

    /// Replaces an element's children with its text split around highlight sub-spans.
    ///
    /// `spans` are char ranges over the element's current rendered text; overlapping or out of
    /// range spans are skipped.
    pub fn render_highlights(&self, element: NodeId, spans: &[(usize, usize)], class: &str) {
        let text = self.state().text_content(element);
        let len = char_len(&text);
        let mut spans = spans.to_vec();
        spans.sort_unstable();

        {
            let mut state = self.state();
            if let Some(vnode) = state.nodes.get_mut(element.index()) {
                vnode.children.clear();
            }
        }

        let mut cursor = 0;
        for (start, end) in spans {
            if start < cursor || start >= end || end > len {
                continue;
            }
            if cursor < start {
                self.append_text(element, slice_chars(&text, cursor, start).unwrap_or_default());
            }
            let span = self.append_element(element, "span");
            {
                let mut state = self.state();
                if let Some(data) = state.element_mut(span) {
                    data.classes.insert(SmolStr::new(class));
                    data.attributes
                        .insert(SmolStr::new_static(SEGMENT_START_ATTR), start.to_string());
                    data.attributes
                        .insert(SmolStr::new_static(SEGMENT_END_ATTR), end.to_string());
                }
            }
            self.append_text(span, slice_chars(&text, start, end).unwrap_or_default());
            cursor = end;
        }
        if cursor < len {
            self.append_text(element, slice_chars(&text, cursor, len).unwrap_or_default());
        }
    }

    pub fn element_node(&self, element_id: ElementId) -> Option<NodeId> {
        self.state().element_node_of(element_id)
    }

    /// Boundary point for a char offset into an element's rendered text.
    pub fn point_in(&self, element_id: ElementId, offset: usize) -> Option<BoundaryPoint> {
        let state = self.state();
        let element = state.element_node_of(element_id)?;
        let mut remaining = offset;
        let text_nodes = state.text_nodes(element);
        for (index, node) in text_nodes.iter().enumerate() {
            let len = char_len(state.text(*node).unwrap_or_default());
            let is_last = index + 1 == text_nodes.len();
            if remaining < len || (remaining == len && is_last) {
                return Some(BoundaryPoint::new(*node, remaining));
            }
            remaining -= len;
        }
        None
    }

    /// Range from `(start_element, start_offset)` to `(end_element, end_offset)`.
    pub fn range(
        &self,
        start_element: ElementId,
        start_offset: usize,
        end_element: ElementId,
        end_offset: usize,
    ) -> Option<SelectionRange> {
        Some(SelectionRange::new(
            self.point_in(start_element, start_offset)?,
            self.point_in(end_element, end_offset)?,
        ))
    }

    pub fn set_fully_visible(&self, node: NodeId, visible: bool) {
        let mut state = self.state();
        if visible {
            state.visible.insert(node);
        } else {
            state.visible.remove(&node);
        }
    }

    pub fn scroll_log(&self) -> Vec<NodeId> {
        self.state().scrolls.clone()
    }

    pub fn class_events(&self) -> Vec<ClassEvent> {
        self.state().class_events.clone()
    }

    /// Makes [`TextSurface::intersected_text_nodes`] report nothing, like engines whose range
    /// intersection queries fail on virtualised content.
    pub fn set_intersection_queries_broken(&self, broken: bool) {
        self.state().intersection_queries_broken = broken;
    }
}

impl RenderTree for VirtualDom {
    fn element_by_id(&self, id: &str) -> Option<NodeId> {
        let state = self.state();
        state
            .element_nodes(ROOT)
            .into_iter()
            .find(|node| state.attr(*node, "id") == Some(id))
    }

    fn query_selector(&self, selector: &str) -> Option<NodeId> {
        if let Some(escaped) = selector.strip_prefix('#') {
            return self.element_by_id(&unescape_css(escaped));
        }
        if selector.chars().all(|c| c.is_ascii_alphanumeric()) {
            let state = self.state();
            return state
                .element_nodes(ROOT)
                .into_iter()
                .find(|node| state.element(*node).is_some_and(|d| d.tag.as_str() == selector));
        }
        let inner = selector.strip_prefix('[')?.strip_suffix(']')?;
        let (name, value) = inner.split_once('=')?;
        let value = value.trim_matches('"');
        self.element_by_data(name, value)
    }

    fn element_by_data(&self, name: &str, value: &str) -> Option<NodeId> {
        let state = self.state();
        state
            .element_nodes(ROOT)
            .into_iter()
            .find(|node| state.attr(*node, name) == Some(value))
    }

    fn panels(&self) -> Vec<NodeId> {
        let state = self.state();
        state
            .element_nodes(ROOT)
            .into_iter()
            .filter(|node| state.element(*node).is_some_and(|d| d.classes.contains(PANEL_CLASS)))
            .collect()
    }

    fn descendants(&self, root: NodeId) -> Vec<NodeId> {
        let state = self.state();
        state.element_nodes(root).into_iter().filter(|node| *node != root).collect()
    }

    fn all_elements(&self) -> Vec<NodeId> {
        self.state().element_nodes(ROOT)
    }

    fn attribute(&self, node: NodeId, name: &str) -> Option<String> {
        self.state().attr(node, name).map(str::to_owned)
    }

    fn closest_panel(&self, node: NodeId) -> Option<NodeId> {
        let state = self.state();
        if !state.is_attached(node) {
            return None;
        }
        state.closest_panel(node)
    }

    fn text_content(&self, node: NodeId) -> String {
        self.state().text_content(node)
    }

    fn has_class(&self, node: NodeId, class: &str) -> bool {
        self.state().element(node).is_some_and(|data| data.classes.contains(class))
    }

    fn add_class(&self, node: NodeId, class: &str) {
        let mut state = self.state();
        let Some(data) = state.element_mut(node) else {
            return;
        };
        data.classes.insert(SmolStr::new(class));
        state.class_events.push(ClassEvent {
            node,
            class: SmolStr::new(class),
            added: true,
            at: Instant::now(),
        });
    }

    fn remove_class(&self, node: NodeId, class: &str) {
        let mut state = self.state();
        let Some(data) = state.element_mut(node) else {
            return;
        };
        data.classes.remove(class);
        state.class_events.push(ClassEvent {
            node,
            class: SmolStr::new(class),
            added: false,
            at: Instant::now(),
        });
    }

    fn is_fully_visible(&self, node: NodeId) -> bool {
        self.state().visible.contains(&node)
    }

    fn scroll_into_view(&self, node: NodeId) {
        let mut state = self.state();
        state.scrolls.push(node);
        state.visible.insert(node);
    }
}

impl TextSurface for VirtualDom {
    fn range_text(&self, range: &SelectionRange) -> String {
        self.state().text_between(&range.start, &range.end)
    }

    fn intersected_text_nodes(&self, range: &SelectionRange) -> Vec<NodeId> {
        let state = self.state();
        if state.intersection_queries_broken {
            return Vec::new();
        }
        let order = state.text_nodes(ROOT);
        let (Some(from), Some(to)) =
            (state.position(&order, range.start.node), state.position(&order, range.end.node))
        else {
            return Vec::new();
        };
        if from > to {
            return Vec::new();
        }
        order[from..=to]
            .iter()
            .copied()
            .filter(|node| {
                let len = char_len(state.text(*node).unwrap_or_default());
                let starts_at_tail = *node == range.start.node && range.start.offset >= len && from != to;
                let ends_at_head = *node == range.end.node && range.end.offset == 0 && from != to;
                !starts_at_tail && !ends_at_head
            })
            .collect()
    }

    fn owning_element(&self, node: NodeId) -> Option<ElementId> {
        let state = self.state();
        if !state.is_attached(node) {
            return None;
        }
        state.owning_element(node)
    }

    fn mounted_elements(&self) -> Vec<ElementId> {
        let state = self.state();
        let mut seen = BTreeSet::new();
        state
            .element_nodes(ROOT)
            .into_iter()
            .filter_map(|node| state.identity(node))
            .filter(|element_id| seen.insert(*element_id))
            .collect()
    }

    fn element_extent(&self, element_id: ElementId) -> Option<SelectionRange> {
        let state = self.state();
        let element = state.element_node_of(element_id)?;
        let text_nodes = state.text_nodes(element);
        let first = *text_nodes.first()?;
        let last = *text_nodes.last()?;
        let last_len = char_len(state.text(last).unwrap_or_default());
        Some(SelectionRange::new(
            BoundaryPoint::new(first, 0),
            BoundaryPoint::new(last, last_len),
        ))
    }

    fn compare_points(&self, a: &BoundaryPoint, b: &BoundaryPoint) -> Option<Ordering> {
        if a.node == b.node {
            return Some(a.offset.cmp(&b.offset));
        }
        let state = self.state();
        let order = state.text_nodes(ROOT);
        let left = state.position(&order, a.node)?;
        let right = state.position(&order, b.node)?;
        Some(left.cmp(&right))
    }

    fn text_between(&self, start: &BoundaryPoint, end: &BoundaryPoint) -> String {
        self.state().text_between(start, end)
    }

    fn element_source_text(&self, element_id: ElementId) -> Option<String> {
        let state = self.state();
        let node = state.element_node_of(element_id)?;
        Some(
            state
                .source_texts
                .get(&element_id)
                .cloned()
                .unwrap_or_else(|| state.text_content(node)),
        )
    }

    fn panel_document(&self, element_id: ElementId) -> Option<DocumentId> {
        let state = self.state();
        let node = state.element_node_of(element_id)?;
        let panel = state.closest_panel(node)?;
        state.attr(panel, DOCUMENT_ID_ATTR)?.parse().ok()
    }
}

impl ElementTextIndex for VirtualDom {
    fn element_text(&self, element_id: ElementId) -> Option<Cow<'_, str>> {
        self.element_source_text(element_id).map(Cow::Owned)
    }

    fn element_document(&self, element_id: ElementId) -> Option<DocumentId> {
        self.panel_document(element_id)
    }

    fn document_info(&self, document_id: DocumentId) -> Option<DocumentInfo> {
        self.state().documents.get(&document_id).cloned()
    }
}

/// Reverses CSS identifier escaping (`\/`, `\31 `).
fn unescape_css(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        let mut hex = String::new();
        while hex.len() < 6 {
            match chars.peek() {
                Some(h) if h.is_ascii_hexdigit() => {
                    hex.push(*h);
                    chars.next();
                }
                _ => break,
            }
        }
        if hex.is_empty() {
            if let Some(next) = chars.next() {
                out.push(next);
            }
            continue;
        }
        if let Some(decoded) = u32::from_str_radix(&hex, 16).ok().and_then(char::from_u32) {
            out.push(decoded);
        }
        if chars.peek() == Some(&' ') {
            chars.next();
        }
    }
    out
}
