// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Anchorlink and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use regex::Regex;

use crate::dom::{NodeId, RenderTree, ELEMENT_ID_ATTR, SOURCE_URI_ATTR};
use crate::model::source_uri::{alternate_spellings, normalize};
use crate::model::SourceUri;

/// Which lookup found the element, in cascade order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum LocateStrategy {
    Id,
    Selector,
    DataAttribute,
    PanelScan,
    FullScan,
}

/// Maps a persisted source URI back to a rendered element.
#[derive(Debug)]
pub struct HighlightLocator<'t, T: RenderTree + ?Sized> {
    tree: &'t T,
}

impl<'t, T: RenderTree + ?Sized> HighlightLocator<'t, T> {
    pub fn new(tree: &'t T) -> Self {
        Self { tree }
    }

    pub fn locate(&self, source_uri: &str) -> Option<NodeId> {
        self.locate_with_strategy(source_uri).map(|(node, _)| node)
    }

    pub fn locate_with_strategy(&self, source_uri: &str) -> Option<(NodeId, LocateStrategy)> {
        let normalized = normalize(source_uri.trim());
        if normalized.is_empty() {
            return None;
        }

        if let Some(node) = self.tree.element_by_id(normalized) {
            return Some((node, LocateStrategy::Id));
        }
        if let Some(node) = self.tree.query_selector(&format!("#{}", css_escape(normalized))) {
            return Some((node, LocateStrategy::Selector));
        }

        let element_id = SourceUri::parse(normalized).ok().map(|uri| uri.element_id());
        if let Some(node) = element_id
            .and_then(|id| self.tree.element_by_data(ELEMENT_ID_ATTR, &id.to_string()))
            .or_else(|| {
                alternate_spellings(normalized)
                    .iter()
                    .find_map(|uri| self.tree.element_by_data(SOURCE_URI_ATTR, uri))
            })
        {
            return Some((node, LocateStrategy::DataAttribute));
        }

        if let Some(node) = element_id.and_then(|id| self.scan_panels(&id.to_string())) {
            return Some((node, LocateStrategy::PanelScan));
        }

        let found = self.tree.all_elements().into_iter().find(|node| {
            self.tree
                .attribute(*node, "id")
                .is_some_and(|id| id.contains(normalized))
                && self.tree.closest_panel(*node).is_some()
        });
        if found.is_none() {
            tracing::trace!(source_uri, "highlight locator cascade found nothing");
        }
        found.map(|node| (node, LocateStrategy::FullScan))
    }

    fn scan_panels(&self, numeric_id: &str) -> Option<NodeId> {
        let pattern = Regex::new(&format!(r"(?:^|\D){}(?:\D|$)", regex::escape(numeric_id))).ok()?;
        self.tree.panels().into_iter().find_map(|panel| {
            self.tree.descendants(panel).into_iter().find(|node| {
                self.tree
                    .attribute(*node, "id")
                    .is_some_and(|id| pattern.is_match(&id))
                    && self.tree.closest_panel(*node).is_some()
            })
        })
    }
}

/// CSS identifier escaping, matching `CSS.escape`.
pub fn css_escape(ident: &str) -> String {
    let mut out = String::with_capacity(ident.len() + 4);
    let first = ident.chars().next();
    let single = ident.chars().nth(1).is_none();
    for (index, c) in ident.chars().enumerate() {
        let leading_digit = c.is_ascii_digit() && (index == 0 || (index == 1 && first == Some('-')));
        match c {
            '\0' => out.push('\u{fffd}'),
            '\u{1}'..='\u{1f}' | '\u{7f}' => out.push_str(&format!("\\{:x} ", c as u32)),
            _ if leading_digit => out.push_str(&format!("\\{:x} ", c as u32)),
            '-' if index == 0 && single => out.push_str("\\-"),
            c if !c.is_ascii() || c.is_ascii_alphanumeric() || c == '-' || c == '_' => out.push(c),
            c => {
                out.push('\\');
                out.push(c);
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::{css_escape, HighlightLocator, LocateStrategy};
    use crate::dom::{RenderTree, VirtualDom, ELEMENT_ID_ATTR};
    use crate::model::{DocumentId, ElementId};

    #[rstest]
    #[case("DocumentElements/7", "DocumentElements\\/7")]
    #[case("1abc", "\\31 abc")]
    #[case("-2x", "-\\32 x")]
    #[case("-", "\\-")]
    #[case("a b.c", "a\\ b\\.c")]
    #[case("naïve", "naïve")]
    fn escapes_like_css(#[case] raw: &str, #[case] escaped: &str) {
        assert_eq!(css_escape(raw), escaped);
    }

    #[test]
    fn direct_id_wins_for_either_spelling() {
        let dom = VirtualDom::new();
        let panel = dom.mount_panel(DocumentId::new(1));
        let node = dom.mount_element(panel, ElementId::new(42), "text");
        let locator = HighlightLocator::new(&dom);

        assert_eq!(
            locator.locate_with_strategy("DocumentElements/42"),
            Some((node, LocateStrategy::Id))
        );
        assert_eq!(locator.locate("/DocumentElements/42"), Some(node));
        assert_eq!(locator.locate("DocumentElements/43"), None);
    }

    #[test]
    fn data_attributes_are_the_third_step() {
        let dom = VirtualDom::new();
        let panel = dom.mount_panel(DocumentId::new(1));
        let by_element = dom.append_element(panel, "p");
        dom.set_attribute(by_element, ELEMENT_ID_ATTR, "42");
        let by_uri = dom.append_element(panel, "p");
        dom.set_attribute(by_uri, "data-source-uri", "/DocumentElements/43");
        let locator = HighlightLocator::new(&dom);

        assert_eq!(
            locator.locate_with_strategy("DocumentElements/42"),
            Some((by_element, LocateStrategy::DataAttribute))
        );
        assert_eq!(
            locator.locate_with_strategy("DocumentElements/43"),
            Some((by_uri, LocateStrategy::DataAttribute))
        );
    }

    #[test]
    fn panel_scan_respects_digit_boundaries() {
        let dom = VirtualDom::new();
        let panel = dom.mount_panel(DocumentId::new(1));
        let longer = dom.append_element(panel, "div");
        dom.set_attribute(longer, "id", "para-420");
        let exact = dom.append_element(panel, "div");
        dom.set_attribute(exact, "id", "para-42-body");
        let locator = HighlightLocator::new(&dom);

        assert_eq!(
            locator.locate_with_strategy("DocumentElements/42"),
            Some((exact, LocateStrategy::PanelScan))
        );
    }

    #[test]
    fn full_scan_accepts_partial_id_matches_inside_panels() {
        let dom = VirtualDom::new();
        let panel = dom.mount_panel(DocumentId::new(1));
        let wrapper = dom.append_element(panel, "div");
        dom.set_attribute(wrapper, "id", "DocumentElements/420");
        let locator = HighlightLocator::new(&dom);

        assert_eq!(
            locator.locate_with_strategy("DocumentElements/42"),
            Some((wrapper, LocateStrategy::FullScan))
        );
    }

    #[test]
    fn orphaned_partial_matches_are_rejected() {
        let dom = VirtualDom::new();
        let stray = dom.append_element(dom.root(), "div");
        dom.set_attribute(stray, "id", "para-42-DocumentElements/42x");
        assert!(dom.closest_panel(stray).is_none());

        assert_eq!(HighlightLocator::new(&dom).locate("DocumentElements/42"), None);
    }
}
