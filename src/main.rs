// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Anchorlink and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Anchorlink CLI entrypoint.
//!
//! Reads an annotation folder (or the built-in demo workspace) and prints JSON: the stored
//! linking annotations, the link groups reachable from one anchor, or the annotation schema.
//! `--highlight` additionally replays navigation highlighting on a headless render tree.

use std::collections::BTreeSet;
use std::error::Error;
use std::sync::Arc;

use anchorlink::config::AnchorConfig;
use anchorlink::dom::VirtualDom;
use anchorlink::highlight::{HighlightOptions, HighlightOutcome, NavigationHighlighter};
use anchorlink::model::source_uri::normalize;
use anchorlink::model::{demo_workspace, DocumentId, Workspace};
use anchorlink::resolve::{LinkGraphResolver, LinkGroupResult};
use anchorlink::store::{annotation_schema, AnnotationFolder};

fn print_usage(program: &str) {
    eprintln!(
        "Usage:\n  {program} [<dir>] [--list] [--verbose]\n  {program} [<dir>] --resolve <sourceURI> [--open <documentId>]... [--highlight] [--verbose]\n  {program} --demo [--list | --resolve <sourceURI> [--open <documentId>]... [--highlight]]\n  {program} --schema\n\nIf dir is omitted, the current working directory is used.\n--demo uses a built-in demo workspace and cannot be combined with dir.\n--open marks documents as currently open (defaults to none).\n--highlight replays navigation highlighting for every resolved link group.\nWithout --resolve or --schema, the stored linking annotations are listed."
    );
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
struct CliOptions {
    demo: bool,
    dir: Option<String>,
    resolve: Option<String>,
    open: Vec<DocumentId>,
    list: bool,
    schema: bool,
    highlight: bool,
    verbose: bool,
}

fn parse_options(mut args: impl Iterator<Item = String>) -> Result<CliOptions, ()> {
    let mut options = CliOptions::default();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--demo" => {
                if options.demo {
                    return Err(());
                }
                options.demo = true;
            }
            "--resolve" => {
                if options.resolve.is_some() {
                    return Err(());
                }
                let uri = args.next().ok_or(())?;
                options.resolve = Some(uri);
            }
            "--open" => {
                let raw = args.next().ok_or(())?;
                let document_id: DocumentId = raw.parse().map_err(|_| ())?;
                if options.open.contains(&document_id) {
                    return Err(());
                }
                options.open.push(document_id);
            }
            "--list" => {
                if options.list {
                    return Err(());
                }
                options.list = true;
            }
            "--schema" => {
                if options.schema {
                    return Err(());
                }
                options.schema = true;
            }
            "--highlight" => {
                if options.highlight {
                    return Err(());
                }
                options.highlight = true;
            }
            "--verbose" | "-v" => options.verbose = true,
            _ if arg.starts_with('-') => return Err(()),
            _ => {
                if options.dir.is_some() {
                    return Err(());
                }
                options.dir = Some(arg);
            }
        }
    }

    if options.demo && options.dir.is_some() {
        return Err(());
    }
    if options.list && options.resolve.is_some() {
        return Err(());
    }
    if options.schema && (options.list || options.resolve.is_some() || options.demo) {
        return Err(());
    }
    if options.resolve.is_none() && (options.highlight || !options.open.is_empty()) {
        return Err(());
    }

    Ok(options)
}

fn init_tracing(verbose: bool) {
    let level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };
    let _ = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .try_init();
}

fn load(options: &CliOptions) -> Result<(Workspace, AnchorConfig), Box<dyn Error>> {
    if options.demo {
        return Ok((demo_workspace(), AnchorConfig::default()));
    }
    let dir = options.dir.clone().unwrap_or_else(|| ".".to_owned());
    let folder = AnnotationFolder::new(dir);
    Ok((folder.load_workspace()?, folder.load_config()?))
}

/// One JSON line per resolved group, summarising what the highlighter did.
async fn replay_highlights(
    workspace: &Workspace,
    config: &AnchorConfig,
    source_uri: &str,
    groups: &[LinkGroupResult],
) -> Vec<serde_json::Value> {
    let segment_class = config.highlight.segment_class.clone();
    let mut summaries = Vec::new();
    for group in groups {
        let Some(option) = group.options.first() else {
            continue;
        };
        let tree = Arc::new(VirtualDom::new());
        tree.mount_workspace(workspace, [group.document_id], &segment_class);

        let source = normalize(source_uri);
        let targets = option
            .all_targets
            .iter()
            .filter(|target| normalize(&target.source_uri) != source)
            .cloned()
            .collect::<Vec<_>>();
        let highlighter = NavigationHighlighter::with_config(tree, config.highlight.clone());
        let report = highlighter
            .run(
                targets,
                HighlightOptions {
                    source: None,
                    document_hint: Some(group.document_id),
                },
            )
            .await;

        let (outcome, flashes) = match &report.outcome {
            HighlightOutcome::Flashed(flashes) => ("flashed", flashes.len()),
            HighlightOutcome::Fallback(_) => ("fallback", 1),
            HighlightOutcome::NothingRendered => ("nothing-rendered", 0),
        };
        summaries.push(serde_json::json!({
            "documentId": group.document_id,
            "linkingAnnotationId": option.linking_annotation_id,
            "outcome": outcome,
            "flashes": flashes,
            "scrolled": report.scrolled.is_some(),
        }));
    }
    summaries
}

fn main() {
    let result = (|| -> Result<(), Box<dyn Error>> {
        let mut args = std::env::args();
        let program = args.next().unwrap_or_else(|| "anchorlink".to_owned());

        let options = match parse_options(args) {
            Ok(options) => options,
            Err(()) => {
                print_usage(&program);
                std::process::exit(2);
            }
        };
        init_tracing(options.verbose);

        if options.schema {
            println!("{}", serde_json::to_string_pretty(&annotation_schema())?);
            return Ok(());
        }

        let (workspace, config) = load(&options)?;

        let Some(source_uri) = options.resolve.as_deref() else {
            let annotations = workspace.linking_annotations();
            println!("{}", serde_json::to_string_pretty(&annotations)?);
            return Ok(());
        };

        let open = if options.open.is_empty() {
            workspace.open_documents().clone()
        } else {
            options.open.iter().copied().collect::<BTreeSet<_>>()
        };
        let resolver = LinkGraphResolver::new(&workspace).with_open_documents(open);
        let groups = resolver
            .resolve_uri(source_uri, workspace.annotations().values())
            .into_values()
            .collect::<Vec<_>>();
        tracing::debug!(source_uri, groups = groups.len(), "resolved link groups");
        println!("{}", serde_json::to_string_pretty(&groups)?);

        if options.highlight {
            let runtime = tokio::runtime::Builder::new_current_thread().enable_time().build()?;
            let summaries =
                runtime.block_on(replay_highlights(&workspace, &config, source_uri, &groups));
            for summary in summaries {
                println!("{summary}");
            }
        }

        Ok(())
    })();

    if let Err(err) = result {
        eprintln!("anchorlink: {err}");
        std::process::exit(1);
    }
}
