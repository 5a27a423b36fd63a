// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Anchorlink and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Cross-document link resolution.
//!
//! Given one anchor and the persisted linking annotations, computes the other documents it is
//! linked to, one bucket per document id and one option per annotation within a bucket.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::model::source_uri::normalize;
use crate::model::{
    AnnotationId, CollectionId, DocumentId, ElementTextIndex, HighlightTarget, LinkingAnnotation,
    Segment, SourceUri, TargetInfo,
};

/// All links from one source anchor into one other document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkGroupResult {
    pub document_id: DocumentId,
    pub document_title: String,
    pub collection_id: Option<CollectionId>,
    pub is_currently_open: bool,
    pub options: Vec<LinkedTextOption>,
}

/// One annotation's contribution to a [`LinkGroupResult`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkedTextOption {
    pub linked_text: String,
    pub linking_annotation_id: AnnotationId,
    pub target_info: TargetInfo,
    /// Every segment of the annotation, source included.
    pub all_targets: Vec<HighlightTarget>,
}

pub fn placeholder_title(document_id: DocumentId) -> String {
    format!("Document {document_id}")
}

#[derive(Debug)]
struct Bucket {
    result: LinkGroupResult,
    titled: bool,
    seen: BTreeSet<AnnotationId>,
}

impl Bucket {
    fn new(document_id: DocumentId, is_currently_open: bool) -> Self {
        Self {
            result: LinkGroupResult {
                document_id,
                document_title: placeholder_title(document_id),
                collection_id: None,
                is_currently_open,
                options: Vec::new(),
            },
            titled: false,
            seen: BTreeSet::new(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct LinkGraphResolver<I> {
    index: I,
    open_documents: BTreeSet<DocumentId>,
    source_document: Option<DocumentId>,
}

impl<I: ElementTextIndex> LinkGraphResolver<I> {
    pub fn new(index: I) -> Self {
        Self {
            index,
            open_documents: BTreeSet::new(),
            source_document: None,
        }
    }

    /// Documents currently rendered in the viewer.
    pub fn with_open_documents(mut self, open_documents: BTreeSet<DocumentId>) -> Self {
        self.open_documents = open_documents;
        self
    }

    /// Pins the source anchor's document instead of asking the index for it.
    pub fn with_source_document(mut self, document_id: DocumentId) -> Self {
        self.source_document = Some(document_id);
        self
    }

    pub fn index(&self) -> &I {
        &self.index
    }

    pub fn resolve<'a>(
        &self,
        source: &Segment,
        annotations: impl IntoIterator<Item = &'a LinkingAnnotation>,
    ) -> BTreeMap<DocumentId, LinkGroupResult> {
        self.resolve_uri(&source.source_uri, annotations)
    }

    /// Same as [`Self::resolve`], keyed by the raw source URI only.
    pub fn resolve_uri<'a>(
        &self,
        source_uri: &str,
        annotations: impl IntoIterator<Item = &'a LinkingAnnotation>,
    ) -> BTreeMap<DocumentId, LinkGroupResult> {
        let annotations = annotations
            .into_iter()
            .filter(|annotation| annotation.is_linking())
            .collect::<Vec<_>>();

        let mut matching = annotations
            .iter()
            .copied()
            .filter(|annotation| annotation.segments().any(|s| s.source_uri == source_uri))
            .collect::<Vec<_>>();
        if matching.is_empty() {
            let normalized = normalize(source_uri);
            matching = annotations
                .iter()
                .copied()
                .filter(|annotation| {
                    annotation.segments().any(|s| normalize(&s.source_uri) == normalized)
                })
                .collect();
            if !matching.is_empty() {
                tracing::debug!(
                    source_uri,
                    matches = matching.len(),
                    "matched annotations via alternate uri spelling"
                );
            }
        }

        let source_document = self.source_document.or_else(|| {
            SourceUri::parse(source_uri)
                .ok()
                .and_then(|uri| self.index.element_document(uri.element_id()))
        });

        let mut buckets: BTreeMap<DocumentId, Bucket> = BTreeMap::new();
        for annotation in matching {
            self.collect_targets(annotation, source_uri, source_document, &mut buckets);
        }

        buckets
            .into_iter()
            .map(|(document_id, bucket)| (document_id, bucket.result))
            .collect()
    }

    fn collect_targets(
        &self,
        annotation: &LinkingAnnotation,
        source_uri: &str,
        source_document: Option<DocumentId>,
        buckets: &mut BTreeMap<DocumentId, Bucket>,
    ) {
        let normalized_source = normalize(source_uri);
        let source_document =
            source_document.or_else(|| recorded_source_document(annotation, normalized_source));
        let targets = annotation
            .segments()
            .filter(|segment| normalize(&segment.source_uri) != normalized_source);

        for segment in targets {
            let resolved = segment
                .element_id()
                .and_then(|element_id| self.index.element_document(element_id));
            let document_id = match resolved {
                Some(document_id) => document_id,
                None if Some(annotation.document_id) != source_document => {
                    tracing::debug!(
                        annotation = %annotation.id,
                        source_uri = segment.source_uri.as_str(),
                        "falling back to the annotation's document"
                    );
                    annotation.document_id
                }
                None => {
                    tracing::debug!(
                        annotation = %annotation.id,
                        source_uri = segment.source_uri.as_str(),
                        "dropping unresolvable target"
                    );
                    continue;
                }
            };
            if Some(document_id) == source_document {
                continue;
            }

            let is_open = self.open_documents.contains(&document_id);
            let bucket = buckets
                .entry(document_id)
                .or_insert_with(|| Bucket::new(document_id, is_open));
            if !bucket.titled {
                if let Some(info) = self.index.document_info(document_id) {
                    bucket.result.document_title = info.title;
                    bucket.result.collection_id = info.collection_id;
                    bucket.titled = true;
                }
            }
            if !bucket.seen.insert(annotation.id) {
                continue;
            }
            bucket.result.options.push(LinkedTextOption {
                linked_text: segment.text.clone(),
                linking_annotation_id: annotation.id,
                target_info: TargetInfo::from(segment),
                all_targets: annotation.segments().map(HighlightTarget::from).collect(),
            });
        }
    }
}

/// The annotation's recorded document when the source sits in its first target group, which
/// is the group captured in that document.
fn recorded_source_document(annotation: &LinkingAnnotation, normalized_source: &str) -> Option<DocumentId> {
    annotation
        .target
        .first()?
        .segments()
        .iter()
        .any(|segment| normalize(&segment.source_uri) == normalized_source)
        .then_some(annotation.document_id)
}
