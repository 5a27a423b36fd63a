// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Anchorlink and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Two-step link composition: pick a first span, pick a second span, confirm.

use std::collections::BTreeSet;
use std::fmt;
use std::time::{Duration, Instant};

use crate::config::LinkingConfig;
use crate::model::{
    AnnotationError, Body, DocumentId, ElementId, Motivation, NewLinkingAnnotation, Selection,
    TargetGroup,
};
use crate::segment::SelectionSegmenter;
use crate::surface::{SelectionRange, TextSurface};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComposerStep {
    First,
    Second,
    Confirm,
}

impl fmt::Display for ComposerStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::First => "first",
            Self::Second => "second",
            Self::Confirm => "confirm",
        })
    }
}

/// Why a selection event did not advance the composer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ignored {
    Blank,
    Duplicate,
    Unresolvable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureOutcome {
    /// The selection was stored; the composer is now at this step.
    Captured(ComposerStep),
    Ignored(Ignored),
}

/// Suppresses the same selection text reported twice in quick succession.
#[derive(Debug, Clone)]
pub struct DuplicateGuard {
    window: Duration,
    last: Option<(String, Instant)>,
}

impl DuplicateGuard {
    pub fn new(window: Duration) -> Self {
        Self { window, last: None }
    }

    /// Returns `false` when `text` repeats the previous admitted text inside the window.
    pub fn admit(&mut self, text: &str, now: Instant) -> bool {
        let window = self.window;
        let expired = self
            .last
            .as_ref()
            .is_some_and(|(_, at)| now.saturating_duration_since(*at) >= window);
        if expired {
            self.last = None;
        }
        if self.last.as_ref().is_some_and(|(previous, _)| previous == text) {
            return false;
        }
        self.last = Some((text.to_owned(), now));
        true
    }

    pub fn clear(&mut self) {
        self.last = None;
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkError {
    SameDocument { document_id: DocumentId },
    InvalidState { step: ComposerStep, action: &'static str },
    MissingDocument,
    Annotation(AnnotationError),
}

impl fmt::Display for LinkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SameDocument { document_id } => {
                write!(f, "both selections are in document {document_id}")
            }
            Self::InvalidState { step, action } => write!(f, "cannot {action} in step {step}"),
            Self::MissingDocument => f.write_str("first selection has no document"),
            Self::Annotation(err) => write!(f, "invalid link: {err}"),
        }
    }
}

impl std::error::Error for LinkError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Annotation(err) => Some(err),
            _ => None,
        }
    }
}

impl From<AnnotationError> for LinkError {
    fn from(err: AnnotationError) -> Self {
        Self::Annotation(err)
    }
}

/// Link-creation state machine (`First → Second → Confirm`).
#[derive(Debug, Clone)]
pub struct LinkComposer {
    config: LinkingConfig,
    first: Option<Selection>,
    second: Option<Selection>,
    guard: DuplicateGuard,
}

impl Default for LinkComposer {
    fn default() -> Self {
        Self::new(LinkingConfig::default())
    }
}

impl LinkComposer {
    pub fn new(config: LinkingConfig) -> Self {
        let guard = DuplicateGuard::new(config.duplicate_window());
        Self {
            config,
            first: None,
            second: None,
            guard,
        }
    }

    pub fn step(&self) -> ComposerStep {
        match (&self.first, &self.second) {
            (None, _) => ComposerStep::First,
            (Some(_), None) => ComposerStep::Second,
            (Some(_), Some(_)) => ComposerStep::Confirm,
        }
    }

    pub fn first(&self) -> Option<&Selection> {
        self.first.as_ref()
    }

    pub fn second(&self) -> Option<&Selection> {
        self.second.as_ref()
    }

    pub fn reset(&mut self) {
        if self.step() == ComposerStep::First {
            return;
        }
        tracing::debug!(step = %self.step(), "link composition reset");
        self.first = None;
        self.second = None;
        self.guard.clear();
    }

    /// Stores `selection` for the current step.
    pub fn capture(&mut self, selection: Selection, now: Instant) -> Result<CaptureOutcome, LinkError> {
        if self.step() == ComposerStep::Confirm {
            return Err(LinkError::InvalidState {
                step: ComposerStep::Confirm,
                action: "capture",
            });
        }
        if !self.guard.admit(selection.full_text(), now) {
            return Ok(CaptureOutcome::Ignored(Ignored::Duplicate));
        }
        self.accept(selection)
    }

    /// Event-facing entry: guard on the raw range text, segment, then capture.
    pub fn capture_range<S: TextSurface + ?Sized>(
        &mut self,
        segmenter: &SelectionSegmenter<'_, S>,
        range: &SelectionRange,
        known_elements: Option<&BTreeSet<ElementId>>,
        now: Instant,
    ) -> Result<CaptureOutcome, LinkError> {
        if self.step() == ComposerStep::Confirm {
            return Err(LinkError::InvalidState {
                step: ComposerStep::Confirm,
                action: "capture",
            });
        }
        let raw = segmenter.surface().range_text(range);
        if raw.trim().is_empty() {
            return Ok(CaptureOutcome::Ignored(Ignored::Blank));
        }
        if !self.guard.admit(&raw, now) {
            tracing::trace!("ignoring duplicate selection event");
            return Ok(CaptureOutcome::Ignored(Ignored::Duplicate));
        }
        let Some(selection) = segmenter.segment(range, known_elements) else {
            return Ok(CaptureOutcome::Ignored(Ignored::Unresolvable));
        };
        self.accept(selection)
    }

    fn accept(&mut self, selection: Selection) -> Result<CaptureOutcome, LinkError> {
        match self.step() {
            ComposerStep::First => {
                tracing::debug!(segments = selection.segments().len(), "captured first selection");
                self.first = Some(selection);
            }
            ComposerStep::Second => {
                if !self.config.allow_same_document_linking {
                    let first = self.first.as_ref().and_then(Selection::document_id);
                    if let (Some(first), Some(second)) = (first, selection.document_id()) {
                        if first == second {
                            return Err(LinkError::SameDocument { document_id: first });
                        }
                    }
                }
                tracing::debug!(segments = selection.segments().len(), "captured second selection");
                self.second = Some(selection);
            }
            ComposerStep::Confirm => {
                return Err(LinkError::InvalidState {
                    step: ComposerStep::Confirm,
                    action: "capture",
                });
            }
        }
        Ok(CaptureOutcome::Captured(self.step()))
    }

    /// Builds the two-group link from `Confirm` and resets.
    pub fn save(&mut self, description: &str) -> Result<NewLinkingAnnotation, LinkError> {
        let step = self.step();
        let (Some(first), Some(second)) = (&self.first, &self.second) else {
            return Err(LinkError::InvalidState { step, action: "save" });
        };
        let payload = build(
            first,
            vec![
                TargetGroup::new(first.segments().to_vec()),
                TargetGroup::new(second.segments().to_vec()),
            ],
            description,
        )?;
        self.reset();
        Ok(payload)
    }

    /// Builds a single-group link from `Second` and resets.
    pub fn save_partial(&mut self) -> Result<NewLinkingAnnotation, LinkError> {
        let step = self.step();
        let (Some(first), ComposerStep::Second) = (&self.first, step) else {
            return Err(LinkError::InvalidState {
                step,
                action: "save a partial link",
            });
        };
        let payload = build(
            first,
            vec![TargetGroup::new(first.segments().to_vec())],
            &self.config.partial_body,
        )?;
        self.reset();
        Ok(payload)
    }
}

fn build(
    first: &Selection,
    target: Vec<TargetGroup>,
    description: &str,
) -> Result<NewLinkingAnnotation, LinkError> {
    let document_id = first.document_id().ok_or(LinkError::MissingDocument)?;
    let document_element_id = first.first_element_id().ok_or(LinkError::MissingDocument)?;
    let payload = NewLinkingAnnotation {
        document_id,
        document_element_id,
        motivation: Motivation::Linking,
        body: Body::new(description),
        target,
    };
    payload.validate()?;
    Ok(payload)
}
