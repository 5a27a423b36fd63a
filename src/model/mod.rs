// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Anchorlink and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Core data model.
//!
//! Documents are made of addressable elements; segments anchor text inside elements and linking
//! annotations join groups of segments.

pub mod annotation;
pub mod document;
pub(crate) mod fixtures;
pub mod ids;
pub mod segment;
pub mod source_uri;
pub mod workspace;

pub use annotation::{
    AnnotationError, Body, LinkingAnnotation, Motivation, NewLinkingAnnotation, TargetGroup,
};
pub use document::{Collection, Document, DocumentElement, DocumentInfo, ElementTextIndex};
pub use fixtures::demo_workspace;
pub use ids::{AnnotationId, CollectionId, DocumentId, ElementId, Id, IdError, UserId};
pub use segment::{HighlightTarget, Segment, Selection, TargetInfo};
pub use source_uri::{ParseSourceUriError, SourceUri, ELEMENT_URI_PREFIX};
pub use workspace::Workspace;
