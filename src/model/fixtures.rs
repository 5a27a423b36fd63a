// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Anchorlink and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use super::annotation::{Body, LinkingAnnotation, Motivation, TargetGroup};
use super::document::{Collection, Document, DocumentElement};
use super::ids::{AnnotationId, CollectionId, DocumentId, ElementId, UserId};
use super::segment::Segment;
use super::workspace::Workspace;

/// Shorthand segment spec: `(element_id, text, start, end)`.
pub(crate) type SegSpec<'a> = (u64, &'a str, usize, usize);

/// Two collections, three documents (two of them titled "Reply") and a handful of elements.
///
/// - doc 1 "Founding letter": 10 "alpha beta gamma", 11 "gamma rays burst"
/// - doc 2 "Reply": 20 "delta wave forms", 21 "epsilon notes"
/// - doc 3 "Reply" (other collection): 30 "zeta function"
pub fn demo_workspace() -> Workspace {
    let mut workspace = Workspace::new();
    workspace.insert_collection(Collection::new(CollectionId::new(1), "Archive"));
    workspace.insert_collection(Collection::new(CollectionId::new(2), "Press"));

    for (doc, title, collection) in [(1, "Founding letter", 1), (2, "Reply", 1), (3, "Reply", 2)] {
        workspace.insert_document(Document::new(
            DocumentId::new(doc),
            title,
            CollectionId::new(collection),
        ));
    }

    for (element, doc, text) in [
        (10, 1, "alpha beta gamma"),
        (11, 1, "gamma rays burst"),
        (20, 2, "delta wave forms"),
        (21, 2, "epsilon notes"),
        (30, 3, "zeta function"),
    ] {
        workspace.insert_element(DocumentElement::new(
            ElementId::new(element),
            DocumentId::new(doc),
            text,
        ));
    }

    workspace.insert_annotation(annotation_in(
        1,
        1,
        &[&[(10, "alpha", 0, 5)], &[(20, "delta wave", 0, 10)]],
    ));
    workspace.insert_annotation(annotation_in(
        2,
        1,
        &[&[(11, "rays", 6, 10)], &[(30, "zeta", 0, 4)]],
    ));
    workspace
}

#[cfg(test)]
pub(crate) fn two_document_workspace() -> Workspace {
    let mut workspace = demo_workspace();
    workspace.annotations_mut().clear();
    workspace
}

pub(crate) fn segment(spec: SegSpec<'_>) -> Segment {
    let (element, text, start, end) = spec;
    Segment::for_element(ElementId::new(element), text, start, end)
}

pub(crate) fn annotation_in(id: u64, document: u64, groups: &[&[SegSpec<'_>]]) -> LinkingAnnotation {
    let target = groups
        .iter()
        .map(|group| TargetGroup::new(group.iter().copied().map(segment).collect()))
        .collect::<Vec<_>>();
    let document_element_id = groups
        .first()
        .and_then(|group| group.first())
        .map(|(element, ..)| ElementId::new(*element))
        .unwrap_or(ElementId::new(0));

    LinkingAnnotation {
        id: AnnotationId::new(id),
        creator_id: UserId::new(1),
        document_id: DocumentId::new(document),
        document_element_id,
        motivation: Motivation::Linking,
        body: Body::new(format!("link {id}")),
        target,
    }
}

#[cfg(test)]
pub(crate) fn annotation(id: u64, groups: &[&[SegSpec<'_>]]) -> LinkingAnnotation {
    annotation_in(id, 1, groups)
}
