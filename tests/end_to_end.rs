// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Anchorlink and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Instant, SystemTime, UNIX_EPOCH};

use anchorlink::dom::{RenderTree, VirtualDom};
use anchorlink::highlight::{HighlightOptions, HighlightOutcome, NavigationHighlighter};
use anchorlink::linking::{CaptureOutcome, ComposerStep, LinkComposer};
use anchorlink::model::{
    demo_workspace, CollectionId, DocumentId, DocumentInfo, ElementId, HighlightTarget, Segment,
    UserId,
};
use anchorlink::resolve::LinkGraphResolver;
use anchorlink::segment::SelectionSegmenter;
use anchorlink::store::AnnotationFolder;

static TEMP_DIR_COUNTER: AtomicUsize = AtomicUsize::new(0);

struct TempDir {
    path: PathBuf,
}

impl TempDir {
    fn new(prefix: &str) -> Self {
        let nanos = SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_nanos();
        let counter = TEMP_DIR_COUNTER.fetch_add(1, Ordering::Relaxed);
        let path = std::env::temp_dir().join(format!(
            "anchorlink-e2e-{prefix}-{}-{nanos}-{counter}",
            std::process::id()
        ));
        std::fs::create_dir_all(&path).unwrap();
        Self { path }
    }

    fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for TempDir {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.path);
    }
}

fn register(dom: &VirtualDom, id: u64, title: &str) {
    dom.register_document(DocumentInfo {
        document_id: DocumentId::new(id),
        title: title.to_owned(),
        collection_id: Some(CollectionId::new(1)),
    });
}

#[tokio::test(flavor = "current_thread", start_paused = true)]
async fn selection_to_saved_link_to_highlighted_destination() {
    let tmp = TempDir::new("compose");
    let dom = Arc::new(VirtualDom::new());
    register(&dom, 1, "Fable");
    register(&dom, 2, "Commentary");
    let fable = dom.mount_panel(DocumentId::new(1));
    dom.mount_element(fable, ElementId::new(1), "the quick brown ");
    dom.mount_element(fable, ElementId::new(2), "lazy fox jumps");
    let commentary = dom.mount_panel(DocumentId::new(2));
    let note = dom.mount_element(commentary, ElementId::new(3), "a reply paragraph");

    let segmenter = SelectionSegmenter::new(&*dom);
    let mut composer = LinkComposer::default();
    let t0 = Instant::now();

    let across = dom.range(ElementId::new(1), 0, ElementId::new(2), 8).unwrap();
    let outcome = composer.capture_range(&segmenter, &across, None, t0).unwrap();
    assert_eq!(outcome, CaptureOutcome::Captured(ComposerStep::Second));
    let first = composer.first().unwrap();
    assert_eq!(
        first.segments(),
        &[
            Segment::for_element(ElementId::new(1), "the quick brown ", 0, 16),
            Segment::for_element(ElementId::new(2), "lazy fox", 0, 8),
        ]
    );

    let reply = dom.range(ElementId::new(3), 2, ElementId::new(3), 7).unwrap();
    composer
        .capture_range(&segmenter, &reply, None, t0 + std::time::Duration::from_millis(800))
        .unwrap();
    assert_eq!(composer.step(), ComposerStep::Confirm);
    let payload = composer.save("see the commentary").unwrap();
    assert_eq!(composer.step(), ComposerStep::First);

    let folder = AnnotationFolder::new(tmp.path());
    let saved = folder.append(UserId::new(9), payload).unwrap();
    let annotations = folder.load_annotations().unwrap();
    assert_eq!(annotations, vec![saved.clone()]);
    assert_eq!(saved.document_id, DocumentId::new(1));
    assert_eq!(saved.document_element_id, ElementId::new(1));

    let resolver = LinkGraphResolver::new(&*dom)
        .with_open_documents(BTreeSet::from([DocumentId::new(2)]));
    let groups = resolver.resolve(&saved.target[0].segments()[0], &annotations);
    assert_eq!(groups.len(), 1);
    let group = &groups[&DocumentId::new(2)];
    assert_eq!(group.document_title, "Commentary");
    assert!(group.is_currently_open);
    assert_eq!(group.options.len(), 1);
    assert_eq!(group.options[0].linked_text, "reply");
    assert_eq!(group.options[0].all_targets.len(), 3);

    dom.render_highlights(note, &[(2, 7)], "linked-text");
    let destination = group.options[0]
        .all_targets
        .iter()
        .filter(|target| target.source_uri == "DocumentElements/3")
        .cloned()
        .collect::<Vec<_>>();
    let report = NavigationHighlighter::new(Arc::clone(&dom))
        .run(
            destination,
            HighlightOptions {
                source: Some(HighlightTarget::from(&saved.target[0].segments()[0])),
                document_hint: Some(group.document_id),
            },
        )
        .await;

    let HighlightOutcome::Flashed(flashes) = report.outcome else {
        panic!("expected the destination to flash");
    };
    assert_eq!(flashes.len(), 1);
    assert!(!flashes[0].whole_element);
    assert_eq!(dom.text_content(flashes[0].nodes[0]), "reply");
    assert!(report.source.is_some_and(|flash| flash.whole_element));
    assert_eq!(report.scrolled, Some(note));
}

#[tokio::test(flavor = "current_thread", start_paused = true)]
async fn stored_workspace_resolves_and_highlights_across_documents() {
    let tmp = TempDir::new("workspace");
    let folder = AnnotationFolder::new(tmp.path());
    folder.save_workspace(&demo_workspace()).unwrap();

    let workspace = folder.load_workspace().unwrap();
    let groups = LinkGraphResolver::new(&workspace)
        .resolve_uri("/DocumentElements/10", workspace.annotations().values());
    assert_eq!(groups.keys().copied().collect::<Vec<_>>(), vec![DocumentId::new(2)]);
    let option = &groups[&DocumentId::new(2)].options[0];
    assert_eq!(option.linked_text, "delta wave");

    let dom = Arc::new(VirtualDom::new());
    dom.mount_workspace(&workspace, [DocumentId::new(2)], "linked-text");
    let targets = option
        .all_targets
        .iter()
        .filter(|target| target.source_uri.ends_with("/20"))
        .cloned()
        .collect::<Vec<_>>();
    let report = NavigationHighlighter::new(Arc::clone(&dom))
        .run(targets, HighlightOptions::default())
        .await;

    let HighlightOutcome::Flashed(flashes) = report.outcome else {
        panic!("expected a flash");
    };
    assert_eq!(dom.text_content(flashes[0].nodes[0]), "delta wave");
}
