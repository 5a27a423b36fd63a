// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Anchorlink and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use anchorlink::model::SourceUri;
use anchorlink::resolve::LinkGraphResolver;

mod fixtures;
mod profiler;

// Benchmark identity (keep stable):
// - Group names in this file: `resolve.exact_uri`, `resolve.alternate_spelling`
// - Case IDs are `small`, `medium`, `large`.
fn benches_resolve(c: &mut Criterion) {
    for (group_name, leading_slash) in [("resolve.exact_uri", false), ("resolve.alternate_spelling", true)] {
        let mut group = c.benchmark_group(group_name);

        for case in fixtures::CASES {
            let workspace = fixtures::workspace(case);
            let uri = SourceUri::new(fixtures::element_id(1, case.elements() / 2)).to_string();
            let uri = if leading_slash { format!("/{uri}") } else { uri };
            let resolver = LinkGraphResolver::new(&workspace);
            group.throughput(Throughput::Elements(workspace.annotations().len() as u64));
            group.bench_function(case.id(), |b| {
                b.iter(|| {
                    let groups = resolver.resolve_uri(black_box(&uri), workspace.annotations().values());
                    black_box(groups.len())
                })
            });
        }

        group.finish();
    }
}

criterion_group! {
    name = benches;
    config = profiler::criterion();
    targets = benches_resolve
}
criterion_main!(benches);
