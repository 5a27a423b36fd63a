// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Anchorlink and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::borrow::Cow;
use std::collections::{BTreeMap, BTreeSet};

use super::annotation::LinkingAnnotation;
use super::document::{Collection, Document, DocumentElement, DocumentInfo, ElementTextIndex};
use super::ids::{AnnotationId, CollectionId, DocumentId, ElementId};

/// The loaded corpus a viewer runs against: collections, documents, their elements and the
/// linking annotations over them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Workspace {
    collections: BTreeMap<CollectionId, Collection>,
    documents: BTreeMap<DocumentId, Document>,
    elements: BTreeMap<ElementId, DocumentElement>,
    annotations: BTreeMap<AnnotationId, LinkingAnnotation>,
    open_documents: BTreeSet<DocumentId>,
}

impl Workspace {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn collections(&self) -> &BTreeMap<CollectionId, Collection> {
        &self.collections
    }

    pub fn insert_collection(&mut self, collection: Collection) {
        self.collections.insert(collection.id(), collection);
    }

    pub fn documents(&self) -> &BTreeMap<DocumentId, Document> {
        &self.documents
    }

    pub fn document(&self, document_id: DocumentId) -> Option<&Document> {
        self.documents.get(&document_id)
    }

    pub fn insert_document(&mut self, document: Document) {
        self.documents.insert(document.id(), document);
    }

    pub fn elements(&self) -> &BTreeMap<ElementId, DocumentElement> {
        &self.elements
    }

    pub fn element(&self, element_id: ElementId) -> Option<&DocumentElement> {
        self.elements.get(&element_id)
    }

    pub fn element_mut(&mut self, element_id: ElementId) -> Option<&mut DocumentElement> {
        self.elements.get_mut(&element_id)
    }

    /// Inserts an element and appends it to its document's display order (if the document is
    /// known and does not list it yet).
    pub fn insert_element(&mut self, element: DocumentElement) {
        if let Some(document) = self.documents.get_mut(&element.document_id()) {
            if !document.elements().contains(&element.id()) {
                document.elements_mut().push(element.id());
            }
        }
        self.elements.insert(element.id(), element);
    }

    pub fn document_elements(&self, document_id: DocumentId) -> Vec<&DocumentElement> {
        let Some(document) = self.documents.get(&document_id) else {
            return Vec::new();
        };
        document
            .elements()
            .iter()
            .filter_map(|element_id| self.elements.get(element_id))
            .collect()
    }

    pub fn annotations(&self) -> &BTreeMap<AnnotationId, LinkingAnnotation> {
        &self.annotations
    }

    pub fn annotations_mut(&mut self) -> &mut BTreeMap<AnnotationId, LinkingAnnotation> {
        &mut self.annotations
    }

    pub fn insert_annotation(&mut self, annotation: LinkingAnnotation) {
        self.annotations.insert(annotation.id, annotation);
    }

    pub fn linking_annotations(&self) -> Vec<&LinkingAnnotation> {
        self.annotations.values().filter(|a| a.is_linking()).collect()
    }

    pub fn open_documents(&self) -> &BTreeSet<DocumentId> {
        &self.open_documents
    }

    pub fn set_open_documents(&mut self, open_documents: BTreeSet<DocumentId>) {
        self.open_documents = open_documents;
    }

    pub fn is_open(&self, document_id: DocumentId) -> bool {
        self.open_documents.contains(&document_id)
    }
}

impl ElementTextIndex for Workspace {
    fn element_text(&self, element_id: ElementId) -> Option<Cow<'_, str>> {
        self.elements.get(&element_id).map(|element| Cow::Borrowed(element.content()))
    }

    fn element_document(&self, element_id: ElementId) -> Option<DocumentId> {
        self.elements.get(&element_id).map(DocumentElement::document_id)
    }

    fn document_info(&self, document_id: DocumentId) -> Option<DocumentInfo> {
        self.documents.get(&document_id).map(|document| DocumentInfo {
            document_id,
            title: document.title().to_owned(),
            collection_id: Some(document.collection_id()),
        })
    }
}
