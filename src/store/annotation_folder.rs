// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Anchorlink and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::config::{AnchorConfig, ConfigError};
use crate::model::{
    AnnotationError, AnnotationId, Collection, Document, DocumentElement, LinkingAnnotation,
    NewLinkingAnnotation, UserId, Workspace,
};

mod helpers;

use helpers::{read_optional, to_pretty_json, write_atomic};

const ANNOTATIONS_FILENAME: &str = "anchorlink.annotations.json";
const WORKSPACE_FILENAME: &str = "anchorlink.workspace.json";
const CONFIG_FILENAME: &str = "anchorlink.config.json";

#[derive(Debug)]
pub enum StoreError {
    Io {
        path: PathBuf,
        source: io::Error,
    },
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
    Config {
        path: PathBuf,
        source: Box<ConfigError>,
    },
    InvalidAnnotation {
        id: Option<AnnotationId>,
        source: AnnotationError,
    },
    DuplicateAnnotationId {
        id: AnnotationId,
    },
    SymlinkRefused {
        path: PathBuf,
    },
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, source } => write!(f, "io error at {path:?}: {source}"),
            Self::Json { path, source } => write!(f, "json error at {path:?}: {source}"),
            Self::Config { path, source } => write!(f, "invalid config at {path:?}: {source}"),
            Self::InvalidAnnotation { id: Some(id), source } => {
                write!(f, "invalid linking annotation {id}: {source}")
            }
            Self::InvalidAnnotation { id: None, source } => {
                write!(f, "invalid linking annotation: {source}")
            }
            Self::DuplicateAnnotationId { id } => {
                write!(f, "annotation id {id} appears more than once")
            }
            Self::SymlinkRefused { path } => {
                write!(f, "refusing to write through symlink at {path:?}")
            }
        }
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Json { source, .. } => Some(source),
            Self::Config { source, .. } => Some(source.as_ref()),
            Self::InvalidAnnotation { source, .. } => Some(source),
            Self::DuplicateAnnotationId { .. } => None,
            Self::SymlinkRefused { .. } => None,
        }
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum WriteDurability {
    /// Temp file plus atomic rename, no fsync.
    #[default]
    BestEffort,

    /// Also syncs the written file and its directory where the platform allows it.
    Durable,
}

/// On-disk shape of the document corpus; annotations live in their own file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct WorkspaceSnapshot {
    collections: Vec<Collection>,
    documents: Vec<Document>,
    elements: Vec<DocumentElement>,
}

impl WorkspaceSnapshot {
    fn of(workspace: &Workspace) -> Self {
        Self {
            collections: workspace.collections().values().cloned().collect(),
            documents: workspace.documents().values().cloned().collect(),
            elements: workspace.elements().values().cloned().collect(),
        }
    }

    fn into_workspace(self) -> Workspace {
        let mut workspace = Workspace::new();
        for collection in self.collections {
            workspace.insert_collection(collection);
        }
        for document in self.documents {
            workspace.insert_document(document);
        }
        for element in self.elements {
            workspace.insert_element(element);
        }
        workspace
    }
}

/// A folder holding a workspace snapshot, its linking annotations and an optional config.
///
/// Missing files read as empty (or default) state. Every write replaces the whole file.
#[derive(Debug, Clone)]
pub struct AnnotationFolder {
    root: PathBuf,
    durability: WriteDurability,
}

impl AnnotationFolder {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            durability: WriteDurability::default(),
        }
    }

    pub fn with_durability(mut self, durability: WriteDurability) -> Self {
        self.durability = durability;
        self
    }

    pub fn durability(&self) -> WriteDurability {
        self.durability
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn annotations_path(&self) -> PathBuf {
        self.root.join(ANNOTATIONS_FILENAME)
    }

    pub fn workspace_path(&self) -> PathBuf {
        self.root.join(WORKSPACE_FILENAME)
    }

    pub fn config_path(&self) -> PathBuf {
        self.root.join(CONFIG_FILENAME)
    }

    /// Annotations sorted by id. Both the grouped and the flat `target` form are accepted.
    pub fn load_annotations(&self) -> Result<Vec<LinkingAnnotation>, StoreError> {
        let path = self.annotations_path();
        let Some(raw) = read_optional(&path)? else {
            return Ok(Vec::new());
        };
        let mut annotations: Vec<LinkingAnnotation> =
            serde_json::from_str(&raw).map_err(|source| StoreError::Json { path, source })?;
        annotations.sort_by_key(|annotation| annotation.id);
        check_annotations(&annotations)?;
        Ok(annotations)
    }

    pub fn save_annotations(&self, annotations: &[LinkingAnnotation]) -> Result<(), StoreError> {
        let mut sorted = annotations.to_vec();
        sorted.sort_by_key(|annotation| annotation.id);
        check_annotations(&sorted)?;
        let path = self.annotations_path();
        let json = to_pretty_json(&path, &sorted)?;
        write_atomic(&self.root, &path, json.as_bytes(), self.durability)
    }

    /// Validates and persists a composed link under the next free id (`max + 1`).
    pub fn append(
        &self,
        creator_id: UserId,
        annotation: NewLinkingAnnotation,
    ) -> Result<LinkingAnnotation, StoreError> {
        annotation
            .validate()
            .map_err(|source| StoreError::InvalidAnnotation { id: None, source })?;

        let mut annotations = self.load_annotations()?;
        let next = annotations
            .iter()
            .map(|existing| existing.id.get())
            .max()
            .unwrap_or(0)
            + 1;
        let saved = annotation.into_annotation(AnnotationId::new(next), creator_id);
        annotations.push(saved.clone());
        self.save_annotations(&annotations)?;
        tracing::debug!(
            annotation_id = next,
            groups = saved.target.len(),
            "linking annotation appended"
        );
        Ok(saved)
    }

    /// Removes one annotation; `false` when no annotation had that id.
    pub fn delete(&self, id: AnnotationId) -> Result<bool, StoreError> {
        let mut annotations = self.load_annotations()?;
        let before = annotations.len();
        annotations.retain(|annotation| annotation.id != id);
        if annotations.len() == before {
            return Ok(false);
        }
        self.save_annotations(&annotations)?;
        tracing::debug!(annotation_id = id.get(), "linking annotation deleted");
        Ok(true)
    }

    /// The snapshot plus every stored annotation.
    pub fn load_workspace(&self) -> Result<Workspace, StoreError> {
        let path = self.workspace_path();
        let snapshot = match read_optional(&path)? {
            Some(raw) => serde_json::from_str::<WorkspaceSnapshot>(&raw)
                .map_err(|source| StoreError::Json { path, source })?,
            None => WorkspaceSnapshot::default(),
        };
        let mut workspace = snapshot.into_workspace();
        for annotation in self.load_annotations()? {
            workspace.insert_annotation(annotation);
        }
        Ok(workspace)
    }

    /// Writes the snapshot and replaces the annotation file with the workspace's annotations.
    pub fn save_workspace(&self, workspace: &Workspace) -> Result<(), StoreError> {
        let path = self.workspace_path();
        let json = to_pretty_json(&path, &WorkspaceSnapshot::of(workspace))?;
        write_atomic(&self.root, &path, json.as_bytes(), self.durability)?;
        let annotations = workspace.annotations().values().cloned().collect::<Vec<_>>();
        self.save_annotations(&annotations)
    }

    pub fn load_config(&self) -> Result<AnchorConfig, StoreError> {
        let path = self.config_path();
        match read_optional(&path)? {
            Some(raw) => AnchorConfig::from_json_str(&raw).map_err(|source| StoreError::Config {
                path,
                source: Box::new(source),
            }),
            None => Ok(AnchorConfig::default()),
        }
    }
}

/// JSON schema of the annotation file (an array of linking annotations).
pub fn annotation_schema() -> serde_json::Value {
    schemars::schema_for!(Vec<LinkingAnnotation>).to_value()
}

fn check_annotations(sorted: &[LinkingAnnotation]) -> Result<(), StoreError> {
    for pair in sorted.windows(2) {
        if pair[0].id == pair[1].id {
            return Err(StoreError::DuplicateAnnotationId { id: pair[0].id });
        }
    }
    for annotation in sorted {
        annotation
            .validate()
            .map_err(|source| StoreError::InvalidAnnotation {
                id: Some(annotation.id),
                source,
            })?;
    }
    Ok(())
}
