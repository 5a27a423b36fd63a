// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Anchorlink and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Jump-to-link highlighting: locate targets, scroll, then flash them one after another.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::{JoinHandle, JoinSet};

use super::locator::HighlightLocator;
use crate::config::HighlightConfig;
use crate::dom::{NodeId, RenderTree, DOCUMENT_ID_ATTR, SEGMENT_END_ATTR, SEGMENT_START_ATTR};
use crate::model::{DocumentId, HighlightTarget};
use crate::retry::retry_sync;
use crate::segment::char_len;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HighlightOptions {
    /// Anchor the user is jumping from; flashed immediately.
    pub source: Option<HighlightTarget>,
    /// Document whose panel receives the fallback flash.
    pub document_hint: Option<DocumentId>,
}

/// One applied flash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Flash {
    pub source_uri: String,
    pub element: NodeId,
    /// Nodes that carried the flash class; `[element]` for whole-element flashes.
    pub nodes: Vec<NodeId>,
    pub delay: Duration,
    pub whole_element: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fallback {
    Element(NodeId),
    HintedPanel(NodeId),
    FirstPanel(NodeId),
}

impl Fallback {
    pub fn node(self) -> NodeId {
        match self {
            Self::Element(node) | Self::HintedPanel(node) | Self::FirstPanel(node) => node,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HighlightOutcome {
    Flashed(Vec<Flash>),
    Fallback(Fallback),
    NothingRendered,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HighlightReport {
    pub source: Option<Flash>,
    pub scrolled: Option<NodeId>,
    pub outcome: HighlightOutcome,
}

#[derive(Debug, Clone)]
struct ValidTarget {
    target: HighlightTarget,
    element: NodeId,
    panel: Option<NodeId>,
}

/// Flashes link targets on a shared [`RenderTree`].
#[derive(Debug)]
pub struct NavigationHighlighter<T> {
    tree: Arc<T>,
    config: HighlightConfig,
}

impl<T> Clone for NavigationHighlighter<T> {
    fn clone(&self) -> Self {
        Self {
            tree: Arc::clone(&self.tree),
            config: self.config.clone(),
        }
    }
}

impl<T: RenderTree + Send + Sync + 'static> NavigationHighlighter<T> {
    pub fn new(tree: Arc<T>) -> Self {
        Self::with_config(tree, HighlightConfig::default())
    }

    pub fn with_config(tree: Arc<T>, config: HighlightConfig) -> Self {
        Self { tree, config }
    }

    pub fn tree(&self) -> &Arc<T> {
        &self.tree
    }

    /// Fire-and-forget: spawns [`Self::run`] on the current runtime.
    pub fn highlight(
        &self,
        targets: Vec<HighlightTarget>,
        options: HighlightOptions,
    ) -> JoinHandle<HighlightReport> {
        let this = self.clone();
        tokio::spawn(async move { this.run(targets, options).await })
    }

    pub async fn run(&self, targets: Vec<HighlightTarget>, options: HighlightOptions) -> HighlightReport {
        let mut cleanup = JoinSet::new();
        let source = options
            .source
            .as_ref()
            .and_then(|source| self.flash_source(source, &mut cleanup));

        let mut located = None;
        let valid = retry_sync(self.config.target_retry(), |attempt| {
            let (valid, any_located) = self.collect_valid(&targets);
            located = located.or(any_located);
            if valid.is_empty() {
                tracing::trace!(attempt, targets = targets.len(), "no highlight target ready yet");
                None
            } else {
                Some(valid)
            }
        })
        .await;

        let valid = match valid {
            Ok(valid) => valid,
            Err(exhausted) => {
                tracing::debug!(
                    attempts = exhausted.attempts,
                    targets = targets.len(),
                    "no valid highlight target, using fallback"
                );
                let outcome = self.fallback(located, options.document_hint).await;
                drain(&mut cleanup).await;
                return HighlightReport {
                    source,
                    scrolled: None,
                    outcome,
                };
            }
        };

        let scrolled = valid
            .first()
            .map(|primary| primary.element)
            .filter(|primary| !self.tree.is_fully_visible(*primary));
        if let Some(primary) = scrolled {
            self.tree.scroll_into_view(primary);
        }

        let mut groups: Vec<(Option<NodeId>, Vec<ValidTarget>)> = Vec::new();
        for target in valid {
            match groups.iter_mut().find(|(panel, _)| *panel == target.panel) {
                Some((_, members)) => members.push(target),
                None => groups.push((target.panel, vec![target])),
            }
        }

        let stagger = self.config.stagger();
        let mut flashes = JoinSet::new();
        let mut counter = 0u32;
        for (_, members) in groups {
            for target in members {
                let delay = stagger.saturating_mul(counter);
                counter += 1;
                let this = self.clone();
                flashes.spawn(async move {
                    tokio::time::sleep(delay).await;
                    this.flash_target(target, delay).await
                });
            }
        }

        let mut applied = drain(&mut flashes).await;
        drain(&mut cleanup).await;
        applied.sort_by_key(|flash| flash.delay);
        HighlightReport {
            source,
            scrolled,
            outcome: HighlightOutcome::Flashed(applied),
        }
    }

    fn collect_valid(&self, targets: &[HighlightTarget]) -> (Vec<ValidTarget>, Option<NodeId>) {
        let locator = HighlightLocator::new(&*self.tree);
        let mut any_located = None;
        let mut valid = Vec::new();
        for target in targets {
            let Some(element) = locator.locate(&target.source_uri) else {
                continue;
            };
            any_located = any_located.or(Some(element));
            let len = char_len(&self.tree.text_content(element));
            if !target.has_valid_range(len) {
                tracing::trace!(
                    source_uri = target.source_uri.as_str(),
                    start = target.start,
                    end = target.end,
                    len,
                    "highlight target range does not fit current text"
                );
                continue;
            }
            valid.push(ValidTarget {
                target: target.clone(),
                element,
                panel: self.tree.closest_panel(element),
            });
        }
        (valid, any_located)
    }

    /// Highlight sub-spans of `element` overlapping `[start, end)`.
    ///
    /// Spans without offsets are taken as-is when no bounded span overlaps. Spans bounded
    /// elsewhere belong to other links and never count.
    fn sub_spans(&self, element: NodeId, start: usize, end: usize) -> Option<Vec<NodeId>> {
        let mut overlapping = Vec::new();
        let mut unbounded = Vec::new();
        for node in self.tree.descendants(element) {
            if !self.tree.has_class(node, &self.config.segment_class) {
                continue;
            }
            let bound = |name: &str| {
                self.tree
                    .attribute(node, name)
                    .and_then(|raw| raw.parse::<usize>().ok())
            };
            match (bound(SEGMENT_START_ATTR), bound(SEGMENT_END_ATTR)) {
                (Some(span_start), Some(span_end)) if span_start < end && start < span_end => {
                    overlapping.push(node);
                }
                (Some(_), Some(_)) => {}
                _ => unbounded.push(node),
            }
        }
        match (overlapping.is_empty(), unbounded.is_empty()) {
            (false, _) => Some(overlapping),
            (true, false) => Some(unbounded),
            (true, true) => None,
        }
    }

    fn flash_source(&self, source: &HighlightTarget, cleanup: &mut JoinSet<()>) -> Option<Flash> {
        let element = HighlightLocator::new(&*self.tree).locate(&source.source_uri)?;
        let (nodes, whole_element) = match self.sub_spans(element, source.start, source.end) {
            Some(nodes) => (nodes, false),
            None => (vec![element], true),
        };
        let flash = Flash {
            source_uri: source.source_uri.clone(),
            element,
            nodes,
            delay: Duration::ZERO,
            whole_element,
        };
        self.add_flash(&flash.nodes);
        let this = self.clone();
        let nodes = flash.nodes.clone();
        cleanup.spawn(async move {
            tokio::time::sleep(this.config.flash_duration()).await;
            this.remove_flash(&nodes);
        });
        Some(flash)
    }

    async fn flash_target(&self, valid: ValidTarget, delay: Duration) -> Flash {
        let ValidTarget { target, element, .. } = valid;
        let waited = retry_sync(self.config.markup_retry(), |_| {
            self.sub_spans(element, target.start, target.end)
        })
        .await;
        let (nodes, whole_element) = match waited {
            Ok(nodes) => (nodes, false),
            Err(_) => {
                tracing::debug!(
                    source_uri = target.source_uri.as_str(),
                    "highlight markup never appeared, flashing whole element"
                );
                (vec![element], true)
            }
        };

        self.add_flash(&nodes);
        tokio::time::sleep(self.config.flash_duration()).await;
        self.remove_flash(&nodes);

        Flash {
            source_uri: target.source_uri,
            element,
            nodes,
            delay,
            whole_element,
        }
    }

    async fn fallback(&self, located: Option<NodeId>, document_hint: Option<DocumentId>) -> HighlightOutcome {
        let panels = self.tree.panels();
        let hinted = document_hint.and_then(|document_id| {
            let wanted = document_id.to_string();
            panels
                .iter()
                .copied()
                .find(|panel| self.tree.attribute(*panel, DOCUMENT_ID_ATTR).as_deref() == Some(wanted.as_str()))
        });

        let fallback = match (located, hinted, panels.first()) {
            (Some(element), _, _) => Fallback::Element(element),
            (None, Some(panel), _) => Fallback::HintedPanel(panel),
            (None, None, Some(panel)) => Fallback::FirstPanel(*panel),
            (None, None, None) => {
                tracing::warn!("nothing rendered to highlight");
                return HighlightOutcome::NothingRendered;
            }
        };

        let nodes = [fallback.node()];
        self.add_flash(&nodes);
        tokio::time::sleep(self.config.flash_duration()).await;
        self.remove_flash(&nodes);
        HighlightOutcome::Fallback(fallback)
    }

    fn add_flash(&self, nodes: &[NodeId]) {
        for node in nodes {
            self.tree.add_class(*node, &self.config.flash_class);
        }
    }

    fn remove_flash(&self, nodes: &[NodeId]) {
        for node in nodes {
            self.tree.remove_class(*node, &self.config.flash_class);
        }
    }
}

async fn drain<R: 'static>(tasks: &mut JoinSet<R>) -> Vec<R> {
    let mut out = Vec::new();
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok(flash) => out.push(flash),
            Err(err) => tracing::warn!(error = %err, "flash task failed"),
        }
    }
    out
}
