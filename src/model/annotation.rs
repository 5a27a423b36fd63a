// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Anchorlink and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::collections::BTreeSet;
use std::fmt;

use schemars::JsonSchema;
use serde::{Deserialize, Deserializer, Serialize};

use super::document::ElementTextIndex;
use super::ids::{AnnotationId, DocumentId, ElementId, UserId};
use super::segment::Segment;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Motivation {
    Linking,
    /// Any other annotation kind sharing the same store; never resolved as a link.
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Body {
    #[serde(default)]
    pub value: String,
}

impl Body {
    pub fn new(value: impl Into<String>) -> Self {
        Self { value: value.into() }
    }
}

/// One side of a link; may span several elements.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct TargetGroup {
    segments: Vec<Segment>,
}

impl TargetGroup {
    pub fn new(segments: Vec<Segment>) -> Self {
        Self { segments }
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }
}

impl From<Vec<Segment>> for TargetGroup {
    fn from(segments: Vec<Segment>) -> Self {
        Self::new(segments)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum TargetRepr {
    Grouped(Vec<TargetGroup>),
    Flat(Vec<Segment>),
}

fn deserialize_target<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<TargetGroup>, D::Error> {
    Ok(match TargetRepr::deserialize(deserializer)? {
        TargetRepr::Grouped(groups) => groups,
        TargetRepr::Flat(segments) if segments.is_empty() => Vec::new(),
        TargetRepr::Flat(segments) => vec![TargetGroup::new(segments)],
    })
}

/// Persisted record joining one or more target groups into a link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct LinkingAnnotation {
    pub id: AnnotationId,
    pub creator_id: UserId,
    pub document_id: DocumentId,
    pub document_element_id: ElementId,
    pub motivation: Motivation,
    #[serde(default)]
    pub body: Body,
    /// Grouped (`[[..],[..]]`) on write; the flat single-group form is accepted on read.
    #[serde(deserialize_with = "deserialize_target")]
    #[schemars(with = "Vec<TargetGroup>")]
    pub target: Vec<TargetGroup>,
}

impl LinkingAnnotation {
    pub fn is_linking(&self) -> bool {
        self.motivation == Motivation::Linking
    }

    pub fn segments(&self) -> impl Iterator<Item = &Segment> {
        self.target.iter().flat_map(|group| group.segments().iter())
    }

    pub fn is_partial(&self) -> bool {
        self.target.len() == 1
    }

    pub fn validate(&self) -> Result<(), AnnotationError> {
        validate_target(&self.target)
    }

    /// True when at least one group's primary document differs from another's.
    pub fn is_cross_document(&self, index: &impl ElementTextIndex) -> bool {
        let documents = self
            .target
            .iter()
            .filter_map(|group| {
                group
                    .segments()
                    .first()
                    .and_then(Segment::element_id)
                    .and_then(|element_id| index.element_document(element_id))
            })
            .collect::<BTreeSet<_>>();
        documents.len() > 1
    }
}

/// Save payload emitted by the link composer; ids are assigned by the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewLinkingAnnotation {
    pub document_id: DocumentId,
    pub document_element_id: ElementId,
    pub motivation: Motivation,
    pub body: Body,
    pub target: Vec<TargetGroup>,
}

impl NewLinkingAnnotation {
    pub fn validate(&self) -> Result<(), AnnotationError> {
        validate_target(&self.target)
    }

    pub fn into_annotation(self, id: AnnotationId, creator_id: UserId) -> LinkingAnnotation {
        LinkingAnnotation {
            id,
            creator_id,
            document_id: self.document_id,
            document_element_id: self.document_element_id,
            motivation: self.motivation,
            body: self.body,
            target: self.target,
        }
    }
}

fn validate_target(target: &[TargetGroup]) -> Result<(), AnnotationError> {
    if target.is_empty() {
        return Err(AnnotationError::NoTargets);
    }
    if let Some(index) = target.iter().position(TargetGroup::is_empty) {
        return Err(AnnotationError::EmptyGroup { index });
    }
    for segment in target.iter().flat_map(|group| group.segments()) {
        if segment.start >= segment.end {
            return Err(AnnotationError::DegenerateSegment {
                source_uri: segment.source_uri.clone(),
                start: segment.start,
                end: segment.end,
            });
        }
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnnotationError {
    NoTargets,
    EmptyGroup { index: usize },
    DegenerateSegment { source_uri: String, start: usize, end: usize },
}

impl fmt::Display for AnnotationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoTargets => f.write_str("linking annotation has no target groups"),
            Self::EmptyGroup { index } => write!(f, "target group {index} has no segments"),
            Self::DegenerateSegment { source_uri, start, end } => {
                write!(f, "segment {source_uri} has an empty range {start}..{end}")
            }
        }
    }
}

impl std::error::Error for AnnotationError {}
