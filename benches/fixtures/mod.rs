// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Anchorlink and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

#![allow(dead_code)]

// Shared deterministic benchmark fixtures (no RNG).

use anchorlink::dom::VirtualDom;
use anchorlink::model::{
    AnnotationId, Body, Collection, CollectionId, Document, DocumentElement, DocumentId,
    ElementId, LinkingAnnotation, Motivation, Segment, TargetGroup, UserId, Workspace,
};

const WORDS: &[&str] = &[
    "anchor", "margin", "folio", "gloss", "recto", "verso", "quire", "rubric", "incipit",
    "colophon", "scribe", "vellum",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Case {
    Small,
    Medium,
    Large,
}

impl Case {
    pub fn id(self) -> &'static str {
        match self {
            Self::Small => "small",
            Self::Medium => "medium",
            Self::Large => "large",
        }
    }

    /// Elements per document.
    pub fn elements(self) -> usize {
        match self {
            Self::Small => 8,
            Self::Medium => 64,
            Self::Large => 512,
        }
    }

    pub fn documents(self) -> u64 {
        match self {
            Self::Small => 2,
            Self::Medium => 8,
            Self::Large => 32,
        }
    }
}

pub const CASES: [Case; 3] = [Case::Small, Case::Medium, Case::Large];

/// Deterministic paragraph text; every paragraph is distinct.
pub fn paragraph(index: usize) -> String {
    let len = 12 + index % 9;
    let mut out = String::new();
    for word in 0..len {
        if word > 0 {
            out.push(' ');
        }
        out.push_str(WORDS[(index * 7 + word * 3) % WORDS.len()]);
    }
    out.push_str(&format!(" §{index}."));
    out
}

pub fn element_id(document: u64, index: usize) -> ElementId {
    ElementId::new(document * 10_000 + index as u64)
}

/// One panel (document 1) with `case.elements()` paragraphs.
pub fn surface(case: Case) -> VirtualDom {
    let dom = VirtualDom::new().with_block_separator("\n");
    let panel = dom.mount_panel(DocumentId::new(1));
    for index in 0..case.elements() {
        dom.mount_element(panel, element_id(1, index), &paragraph(index));
    }
    dom
}

/// `case.documents()` documents; every element of document 1 links to one element of each
/// other document.
pub fn workspace(case: Case) -> Workspace {
    let mut workspace = Workspace::new();
    workspace.insert_collection(Collection::new(CollectionId::new(1), "Bench"));
    for document in 1..=case.documents() {
        workspace.insert_document(Document::new(
            DocumentId::new(document),
            format!("Document {document}"),
            CollectionId::new(1),
        ));
        for index in 0..case.elements() {
            workspace.insert_element(DocumentElement::new(
                element_id(document, index),
                DocumentId::new(document),
                paragraph(index),
            ));
        }
    }

    let mut next = 1;
    for index in 0..case.elements() {
        for document in 2..=case.documents() {
            let source = element_id(1, index);
            let target = element_id(document, (index * 5) % case.elements());
            workspace.insert_annotation(LinkingAnnotation {
                id: AnnotationId::new(next),
                creator_id: UserId::new(1),
                document_id: DocumentId::new(1),
                document_element_id: source,
                motivation: Motivation::Linking,
                body: Body::default(),
                target: vec![
                    TargetGroup::new(vec![Segment::for_element(source, "anchor", 0, 6)]),
                    TargetGroup::new(vec![Segment::for_element(target, "gloss", 0, 5)]),
                ],
            });
            next += 1;
        }
    }
    workspace
}
