// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Anchorlink and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::collections::BTreeSet;

use proptest::prelude::*;
use rstest::{fixture, rstest};

use super::{char_len, slice_chars, SelectionSegmenter};
use crate::dom::VirtualDom;
use crate::model::{DocumentId, ElementId, Segment};
use crate::surface::{BoundaryPoint, SelectionRange};

fn e(id: u64) -> ElementId {
    ElementId::new(id)
}

/// Document 1 with two adjacent elements: "the quick brown " and "lazy fox jumps".
#[fixture]
fn two_elements() -> VirtualDom {
    let dom = VirtualDom::new();
    let panel = dom.mount_panel(DocumentId::new(1));
    dom.mount_element(panel, e(1), "the quick brown ");
    dom.mount_element(panel, e(2), "lazy fox jumps");
    dom
}

fn spans(segments: &[Segment]) -> Vec<(ElementId, usize, usize, &str)> {
    segments
        .iter()
        .map(|segment| {
            (
                segment.element_id().expect("element uri"),
                segment.start,
                segment.end,
                segment.text.as_str(),
            )
        })
        .collect()
}

#[rstest]
fn selection_inside_one_element(two_elements: VirtualDom) {
    let range = two_elements.range(e(2), 5, e(2), 8).expect("range");
    let selection = SelectionSegmenter::new(&two_elements)
        .segment(&range, None)
        .expect("selection");

    assert_eq!(spans(selection.segments()), vec![(e(2), 5, 8, "fox")]);
    assert_eq!(selection.segments()[0].source_uri, "DocumentElements/2");
    assert_eq!(selection.document_id(), Some(DocumentId::new(1)));
    assert_eq!(selection.full_text(), "fox");
}

#[rstest]
fn selection_across_elements_yields_one_segment_each(two_elements: VirtualDom) {
    let range = two_elements.range(e(1), 0, e(2), 8).expect("range");
    let selection = SelectionSegmenter::new(&two_elements)
        .segment(&range, None)
        .expect("selection");

    assert_eq!(
        spans(selection.segments()),
        vec![(e(1), 0, 16, "the quick brown "), (e(2), 0, 8, "lazy fox")]
    );
    assert_eq!(selection.full_text(), "the quick brown lazy fox");
}

#[rstest]
fn range_starting_at_element_tail_skips_that_element(two_elements: VirtualDom) {
    let range = two_elements.range(e(1), 16, e(2), 4).expect("range");
    let selection = SelectionSegmenter::new(&two_elements)
        .segment(&range, None)
        .expect("selection");

    assert_eq!(spans(selection.segments()), vec![(e(2), 0, 4, "lazy")]);
}

#[rstest]
#[case(1, 3, 6)]
#[case(2, 5, 6)]
fn blank_selections_yield_nothing(#[case] element: u64, #[case] start: usize, #[case] end: usize) {
    let dom = VirtualDom::new();
    let panel = dom.mount_panel(DocumentId::new(1));
    dom.mount_element(panel, e(1), "one   two");
    dom.mount_element(panel, e(2), "three four");

    let range = dom.range(e(element), start, e(element), end).expect("range");
    assert!(SelectionSegmenter::new(&dom).segment(&range, None).is_none());
}

#[rstest]
fn endpoints_recover_candidates_when_intersection_queries_fail(two_elements: VirtualDom) {
    two_elements.set_intersection_queries_broken(true);
    let range = two_elements.range(e(1), 4, e(2), 4).expect("range");
    let selection = SelectionSegmenter::new(&two_elements)
        .segment(&range, None)
        .expect("selection");

    assert_eq!(
        spans(selection.segments()),
        vec![(e(1), 4, 16, "quick brown "), (e(2), 0, 4, "lazy")]
    );
}

#[test]
fn full_scan_finds_elements_between_non_element_endpoints() {
    let dom = VirtualDom::new();
    let panel = dom.mount_panel(DocumentId::new(3));
    let heading = dom.append_element(panel, "h1");
    let heading_text = dom.append_text(heading, "Title");
    dom.mount_element(panel, e(5), "inner body");
    dom.mount_element(panel, e(6), "second body");
    let footer = dom.append_element(panel, "footer");
    let footer_text = dom.append_text(footer, "page 1");
    dom.set_intersection_queries_broken(true);

    let range = SelectionRange::new(
        BoundaryPoint::new(heading_text, 2),
        BoundaryPoint::new(footer_text, 4),
    );
    let selection = SelectionSegmenter::new(&dom)
        .segment(&range, None)
        .expect("selection");

    assert_eq!(
        spans(selection.segments()),
        vec![(e(5), 0, 10, "inner body"), (e(6), 0, 11, "second body")]
    );
    assert_eq!(selection.document_id(), Some(DocumentId::new(3)));
}

#[rstest]
fn known_elements_filter_candidates(two_elements: VirtualDom) {
    let range = two_elements.range(e(1), 10, e(2), 4).expect("range");
    let known = BTreeSet::from([e(2)]);
    let selection = SelectionSegmenter::new(&two_elements)
        .segment(&range, Some(&known))
        .expect("selection");

    assert_eq!(spans(selection.segments()), vec![(e(2), 0, 4, "lazy")]);

    let nothing_known = BTreeSet::new();
    assert!(SelectionSegmenter::new(&two_elements)
        .segment(&range, Some(&nothing_known))
        .is_none());
}

#[test]
fn rendered_whitespace_drift_maps_back_to_source_offsets() {
    let dom = VirtualDom::new();
    let panel = dom.mount_panel(DocumentId::new(1));
    dom.mount_element_rendered(panel, e(8), "hello\u{a0}world again", &["hello world again"]);

    let range = dom.range(e(8), 0, e(8), 17).expect("range");
    let selection = SelectionSegmenter::new(&dom)
        .segment(&range, None)
        .expect("selection");

    let segment = &selection.segments()[0];
    assert_eq!((segment.start, segment.end), (0, 17));
    assert_eq!(segment.text, "hello\u{a0}world again");
    assert_eq!(selection.full_text(), "hello world again");
}

#[test]
fn elements_split_across_text_nodes_use_element_offsets() {
    let dom = VirtualDom::new();
    let panel = dom.mount_panel(DocumentId::new(1));
    let node = dom.mount_element(panel, e(4), "alpha beta gamma");
    dom.render_highlights(node, &[(6, 10)], "linked-text");

    let range = dom.range(e(4), 8, e(4), 13).expect("range");
    let selection = SelectionSegmenter::new(&dom)
        .segment(&range, None)
        .expect("selection");

    assert_eq!(spans(selection.segments()), vec![(e(4), 8, 13, "ta ga")]);
}

#[test]
fn full_text_keeps_renderer_block_separators() {
    let dom = VirtualDom::new().with_block_separator("\n");
    let panel = dom.mount_panel(DocumentId::new(2));
    dom.mount_element(panel, e(1), "first");
    dom.mount_element(panel, e(2), "second");
    dom.mount_element(panel, e(3), "third");

    let range = dom.range(e(1), 2, e(3), 3).expect("range");
    let selection = SelectionSegmenter::new(&dom)
        .segment(&range, None)
        .expect("selection");

    assert_eq!(selection.full_text(), "rst\nsecond\nthi");
    assert_eq!(
        spans(selection.segments()),
        vec![(e(1), 2, 5, "rst"), (e(2), 0, 6, "second"), (e(3), 0, 3, "thi")]
    );
}

fn arb_texts() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec("[a-zA-Zäöüßéï☕ ]{1,24}", 1..6)
}

/// Element texts plus a range from `(first, start)` to `(last, end)`, `first <= last`.
fn arb_selection() -> impl Strategy<Value = (Vec<String>, usize, usize, usize, usize)> {
    arb_texts()
        .prop_flat_map(|texts| {
            let count = texts.len();
            (Just(texts), 0..count, 0..count)
        })
        .prop_flat_map(|(texts, a, b)| {
            let (first, last) = (a.min(b), a.max(b));
            let first_len = char_len(&texts[first]);
            let last_len = char_len(&texts[last]);
            (Just(texts), Just(first), Just(last), 0..=first_len, 0..=last_len)
        })
}

/// Text before the span, the span, text after it, whitespace to insert, and where.
fn arb_drift() -> impl Strategy<Value = (String, String, String, String, usize, usize)> {
    (
        "[a-zäöü ]{0,20}",
        "[a-zäöü☕]{1,10}( [a-zäöü]{1,6}){0,2}",
        "[a-zäöü ]{0,20}",
        "[ \t\n]{1,4}",
    )
        .prop_flat_map(|(before, span, after, gap)| {
            let (before_len, after_len) = (char_len(&before), char_len(&after));
            (
                Just(before),
                Just(span),
                Just(after),
                Just(gap),
                0..=before_len,
                0..=after_len,
            )
        })
}

fn insert_at(text: &str, at: usize, gap: &str) -> String {
    let byte = text.char_indices().nth(at).map_or(text.len(), |(index, _)| index);
    format!("{}{gap}{}", &text[..byte], &text[byte..])
}

proptest! {
    #[test]
    fn emitted_segments_always_slice_their_element_text(
        (texts, first, last, start, end) in arb_selection()
    ) {
        prop_assume!(first != last || start < end);
        let dom = VirtualDom::new();
        let panel = dom.mount_panel(DocumentId::new(1));
        for (index, text) in texts.iter().enumerate() {
            dom.mount_element(panel, e(index as u64 + 1), text);
        }

        let range = dom
            .range(e(first as u64 + 1), start, e(last as u64 + 1), end)
            .expect("range");
        let Some(selection) = SelectionSegmenter::new(&dom).segment(&range, None) else {
            return Ok(());
        };
        for segment in selection.segments() {
            let element = segment.element_id().expect("element uri");
            let source = &texts[element.get() as usize - 1];
            prop_assert!(segment.start < segment.end, "{:?}", segment);
            prop_assert!(segment.end <= char_len(source), "{:?}", segment);
            prop_assert_eq!(
                slice_chars(source, segment.start, segment.end),
                Some(segment.text.as_str())
            );
        }
    }

    #[test]
    fn whitespace_drift_outside_the_span_is_tolerated(
        (before, span, after, gap, at_before, at_after) in arb_drift()
    ) {
        let start = char_len(&before);
        let segment = Segment::for_element(e(1), span.clone(), start, start + char_len(&span));

        let recorded = format!("{before}{span}{after}");
        let unchanged = segment.relocate(&recorded).expect("recorded text");
        prop_assert_eq!((unchanged.start, unchanged.end), (segment.start, segment.end));

        let drifted = format!(
            "{}{span}{}",
            insert_at(&before, at_before, &gap),
            insert_at(&after, at_after, &gap)
        );
        let found = segment.relocate(&drifted);
        prop_assert!(found.is_some(), "lost {:?} in {:?}", span, drifted);
        let found = found.expect("checked above");
        prop_assert_eq!(&found.text, &span);
        prop_assert_eq!(slice_chars(&drifted, found.start, found.end), Some(span.as_str()));
    }
}
