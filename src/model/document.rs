// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Anchorlink and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::borrow::Cow;

use serde::{Deserialize, Serialize};

use super::ids::{CollectionId, DocumentId, ElementId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Collection {
    id: CollectionId,
    title: String,
}

impl Collection {
    pub fn new(id: CollectionId, title: impl Into<String>) -> Self {
        Self { id, title: title.into() }
    }

    pub fn id(&self) -> CollectionId {
        self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }
}

/// A document: a title plus the display order of its elements.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    id: DocumentId,
    title: String,
    collection_id: CollectionId,
    #[serde(default)]
    elements: Vec<ElementId>,
}

impl Document {
    pub fn new(id: DocumentId, title: impl Into<String>, collection_id: CollectionId) -> Self {
        Self {
            id,
            title: title.into(),
            collection_id,
            elements: Vec::new(),
        }
    }

    pub fn id(&self) -> DocumentId {
        self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn collection_id(&self) -> CollectionId {
        self.collection_id
    }

    pub fn elements(&self) -> &[ElementId] {
        &self.elements
    }

    pub fn elements_mut(&mut self) -> &mut Vec<ElementId> {
        &mut self.elements
    }
}

/// The atomic text-bearing unit of a document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentElement {
    id: ElementId,
    document_id: DocumentId,
    content: String,
}

impl DocumentElement {
    pub fn new(id: ElementId, document_id: DocumentId, content: impl Into<String>) -> Self {
        Self {
            id,
            document_id,
            content: content.into(),
        }
    }

    pub fn id(&self) -> ElementId {
        self.id
    }

    pub fn document_id(&self) -> DocumentId {
        self.document_id
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn set_content(&mut self, content: impl Into<String>) {
        self.content = content.into();
    }
}

/// Document metadata as seen by link resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentInfo {
    pub document_id: DocumentId,
    pub title: String,
    pub collection_id: Option<CollectionId>,
}

/// Read-only access to element text and the element/document/collection hierarchy.
///
/// Implementations may be partial (a viewer only knows what it has loaded); every lookup is
/// allowed to miss.
pub trait ElementTextIndex {
    fn element_text(&self, element_id: ElementId) -> Option<Cow<'_, str>>;

    fn element_document(&self, element_id: ElementId) -> Option<DocumentId>;

    fn document_info(&self, document_id: DocumentId) -> Option<DocumentInfo>;
}

impl<I: ElementTextIndex + ?Sized> ElementTextIndex for &I {
    fn element_text(&self, element_id: ElementId) -> Option<Cow<'_, str>> {
        (**self).element_text(element_id)
    }

    fn element_document(&self, element_id: ElementId) -> Option<DocumentId> {
        (**self).element_document(element_id)
    }

    fn document_info(&self, document_id: DocumentId) -> Option<DocumentInfo> {
        (**self).document_info(document_id)
    }
}
