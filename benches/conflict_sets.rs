//! Benchmarks for conflict-set construction and greedy repair.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rand::{Rng, SeedableRng};

use onto_repair::class::Ontology;
use onto_repair::conflict::{build_conflict_sets, BuilderConfig, ConflictSetBuilder};
use onto_repair::hierarchy::Taxonomy;
use onto_repair::mapping::MappingSet;
use onto_repair::repair::{repair, RepairPolicy};

/// Two random forests of `n` classes each, a sprinkling of disjointness
/// clauses, and `m` random mappings between them.
fn synthetic(n: usize, m: usize, seed: u64) -> (Taxonomy, MappingSet) {
    let mut rng = rand::rngs::StdRng::seed_from_u64(seed);
    let mut b = Taxonomy::builder();
    let mut sides = Vec::new();
    for (prefix, ontology) in [("s", Ontology::Source), ("t", Ontology::Target)] {
        let ids: Vec<_> = (0..n)
            .map(|i| b.add_class(format!("{prefix}#C{i}"), ontology))
            .collect();
        for i in 1..n {
            let parent = ids[rng.gen_range(0..i)];
            b.add_subclass(ids[i], parent).unwrap();
        }
        for _ in 0..n / 10 {
            let (x, y) = (ids[rng.gen_range(0..n)], ids[rng.gen_range(0..n)]);
            if x != y {
                b.add_disjoint(x, y).unwrap();
            }
        }
        sides.push(ids);
    }
    let taxonomy = b.build();

    let mut mappings = MappingSet::new();
    for _ in 0..m {
        let s = sides[0][rng.gen_range(0..n)];
        let t = sides[1][rng.gen_range(0..n)];
        mappings.insert(s, t, rng.gen_range(0.3..1.0));
    }
    (taxonomy, mappings)
}

fn bench_build(c: &mut Criterion) {
    let (taxonomy, mappings) = synthetic(200, 60, 0);

    c.bench_function("build_200x60", |bench| {
        bench.iter(|| black_box(build_conflict_sets(&mappings, &taxonomy).unwrap()))
    });
}

fn bench_build_parallel(c: &mut Criterion) {
    let (taxonomy, mappings) = synthetic(200, 60, 0);
    let builder = ConflictSetBuilder::new(BuilderConfig {
        parallel: true,
        ..Default::default()
    });

    c.bench_function("build_parallel_200x60", |bench| {
        bench.iter(|| black_box(builder.build(&mappings, &taxonomy).unwrap()))
    });
}

fn bench_greedy(c: &mut Criterion) {
    let (taxonomy, mappings) = synthetic(200, 60, 0);
    let conflicts = build_conflict_sets(&mappings, &taxonomy).unwrap();

    c.bench_function("greedy_200x60", |bench| {
        bench.iter(|| {
            let mut ms = mappings.clone();
            black_box(repair(&mut ms, &conflicts, RepairPolicy::Automatic).unwrap())
        })
    });
}

criterion_group!(benches, bench_build, bench_build_parallel, bench_greedy);
criterion_main!(benches);
