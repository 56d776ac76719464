//! End-to-end tests for conflict-set construction and repair.
//!
//! The scenarios below are small enough to check by hand. Every conflict set
//! they produce is also checked against a brute-force reachability search:
//! with only its mappings present, some class must reach two disjoint classes,
//! and dropping any single mapping must make that impossible.

use std::collections::{BTreeSet, VecDeque};

use rand::{Rng, SeedableRng};

use onto_repair::class::{ClassId, Ontology};
use onto_repair::conflict::{
    build_conflict_sets, BuilderConfig, ConflictSet, ConflictSetBuilder, Path,
};
use onto_repair::hierarchy::{HierarchyIndex, Taxonomy};
use onto_repair::mapping::{MappingSet, MappingStatus};
use onto_repair::pipeline::{FilterMode, RepairStage};
use onto_repair::repair::{repair, CoherenceRepairer, ReferenceOracle, RepairPolicy};

fn set(v: &[usize]) -> ConflictSet {
    Path::from_indices(v.iter().copied())
}

/// Whether the mappings in `active` alone make some class reach two classes
/// declared disjoint. Reach follows is-a upwards and mappings both ways.
fn violates(h: &Taxonomy, ms: &MappingSet, active: &BTreeSet<usize>) -> bool {
    for start in h.classes().iter().map(|m| m.id) {
        let mut reached = BTreeSet::from([start]);
        let mut queue = VecDeque::from([start]);
        while let Some(c) = queue.pop_front() {
            let mut next: Vec<ClassId> = h.super_classes(c, true).to_vec();
            for &i in active {
                if let Some(other) = ms.get(i).and_then(|m| m.other_end(c)) {
                    next.push(other);
                }
            }
            for n in next {
                if reached.insert(n) {
                    queue.push_back(n);
                }
            }
        }
        for &d in &reached {
            if h.disjoint_classes(d).iter().any(|p| reached.contains(p)) {
                return true;
            }
        }
    }
    false
}

fn assert_sound_and_minimal(h: &Taxonomy, ms: &MappingSet, conflicts: &[ConflictSet]) {
    assert!(!violates(h, ms, &BTreeSet::new()), "fixture is incoherent on its own");
    for c in conflicts {
        let members: BTreeSet<usize> = c.iter().collect();
        assert!(violates(h, ms, &members), "{c} is not a conflict");
        for &drop in &members {
            let mut smaller = members.clone();
            smaller.remove(&drop);
            assert!(!violates(h, ms, &smaller), "{c} is not minimal");
        }
    }
}

fn active(ms: &MappingSet) -> BTreeSet<usize> {
    ms.active_indices().collect()
}

fn assert_antichain(conflicts: &[ConflictSet]) {
    for (i, a) in conflicts.iter().enumerate() {
        for (j, b) in conflicts.iter().enumerate() {
            if i != j {
                assert!(!a.is_subset(b), "{a} ⊆ {b}");
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Scenarios
// ---------------------------------------------------------------------------

#[test]
fn simple_disjoint_pair() {
    let mut b = Taxonomy::builder();
    let a = b.add_class("s#A", Ontology::Source);
    let bb = b.add_class("s#B", Ontology::Source);
    let x = b.add_class("t#X", Ontology::Target);
    b.add_disjoint(a, bb).unwrap();
    let h = b.build();
    let mut ms = MappingSet::new();
    ms.insert(a, x, 0.9);
    ms.insert(bb, x, 0.6);

    let conflicts = build_conflict_sets(&ms, &h).unwrap();
    assert_eq!(conflicts, vec![set(&[0, 1])]);
    assert_sound_and_minimal(&h, &ms, &conflicts);

    let report = repair(&mut ms, &conflicts, RepairPolicy::Automatic).unwrap();
    assert_eq!(report.removed_count, 1);
    assert_eq!(report.removed_indices, vec![1]);
    assert_eq!(ms.get(1).unwrap().status, MappingStatus::Incorrect);
}

#[test]
fn no_disjointness_means_nothing_to_do() {
    let mut b = Taxonomy::builder();
    let a = b.add_class("s#A", Ontology::Source);
    let bb = b.add_class("s#B", Ontology::Source);
    let x = b.add_class("t#X", Ontology::Target);
    b.add_subclass(bb, a).unwrap();
    let h = b.build();
    let mut ms = MappingSet::new();
    ms.insert(a, x, 0.9);
    ms.insert(bb, x, 0.6);

    let conflicts = build_conflict_sets(&ms, &h).unwrap();
    assert!(conflicts.is_empty());
    let report = repair(&mut ms, &conflicts, RepairPolicy::Automatic).unwrap();
    assert_eq!(report.removed_count, 0);
    assert_eq!(ms.active_len(), 2);
}

#[test]
fn transitive_chain_through_is_a() {
    let mut b = Taxonomy::builder();
    let a = b.add_class("s#A", Ontology::Source);
    let bb = b.add_class("s#B", Ontology::Source);
    let x = b.add_class("t#X", Ontology::Target);
    let y = b.add_class("t#Y", Ontology::Target);
    b.add_disjoint(a, bb).unwrap();
    b.add_subclass(x, y).unwrap();
    let h = b.build();
    let mut ms = MappingSet::new();
    ms.insert(a, x, 0.9);
    ms.insert(bb, y, 0.5);

    let report = ConflictSetBuilder::default().build(&ms, &h).unwrap();
    assert_eq!(report.conflict_sets, vec![set(&[0, 1])]);
    assert_eq!(report.checklist_len, 2);
    assert_sound_and_minimal(&h, &ms, &report.conflict_sets);

    let repaired = repair(&mut ms, &report.conflict_sets, RepairPolicy::Automatic).unwrap();
    assert_eq!(repaired.removed_indices, vec![1]);
}

#[test]
fn hub_mapping_resolves_three_conflicts() {
    let mut b = Taxonomy::builder();
    let a = b.add_class("s#A", Ontology::Source);
    let bs: Vec<_> = (1..=3)
        .map(|i| b.add_class(format!("s#B{i}"), Ontology::Source))
        .collect();
    let x = b.add_class("t#X", Ontology::Target);
    for &bi in &bs {
        b.add_disjoint(a, bi).unwrap();
    }
    let h = b.build();
    let mut ms = MappingSet::new();
    ms.insert(a, x, 0.9);
    for &bi in &bs {
        ms.insert(bi, x, 0.5);
    }

    let conflicts = build_conflict_sets(&ms, &h).unwrap();
    assert_eq!(conflicts, vec![set(&[0, 1]), set(&[0, 2]), set(&[0, 3])]);
    assert_sound_and_minimal(&h, &ms, &conflicts);

    let report = repair(&mut ms, &conflicts, RepairPolicy::Automatic).unwrap();
    assert_eq!(report.removed_indices, vec![0]);
    assert_eq!(ms.active_len(), 3);
}

#[test]
fn cycle_back_to_an_ancestor() {
    let mut b = Taxonomy::builder();
    let a = b.add_class("s#A", Ontology::Source);
    let p = b.add_class("s#P", Ontology::Source);
    let q = b.add_class("s#Q", Ontology::Source);
    let x = b.add_class("t#X", Ontology::Target);
    b.add_subclass(a, p).unwrap();
    b.add_disjoint(p, q).unwrap();
    let h = b.build();
    let mut ms = MappingSet::new();
    ms.insert(a, x, 0.9);
    ms.insert(p, x, 0.8);
    ms.insert(q, x, 0.5);

    let conflicts = build_conflict_sets(&ms, &h).unwrap();
    assert_eq!(conflicts, vec![set(&[0, 2]), set(&[1, 2])]);
    assert_sound_and_minimal(&h, &ms, &conflicts);

    let report = repair(&mut ms, &conflicts, RepairPolicy::Automatic).unwrap();
    assert_eq!(report.removed_indices, vec![2]);
}

#[test]
fn multi_parent_class_joins_two_branches() {
    let mut b = Taxonomy::builder();
    let p1 = b.add_class("s#P1", Ontology::Source);
    let p2 = b.add_class("s#P2", Ontology::Source);
    let c = b.add_class("s#C", Ontology::Source);
    let td1 = b.add_class("t#TD1", Ontology::Target);
    let td2 = b.add_class("t#TD2", Ontology::Target);
    let t1 = b.add_class("t#T1", Ontology::Target);
    let t2 = b.add_class("t#T2", Ontology::Target);
    b.add_subclass(c, p1).unwrap();
    b.add_subclass(c, p2).unwrap();
    b.add_subclass(t1, td1).unwrap();
    b.add_subclass(t2, td2).unwrap();
    b.add_disjoint(td1, td2).unwrap();
    let h = b.build();
    let mut ms = MappingSet::new();
    ms.insert(p1, t1, 0.7);
    ms.insert(p2, t2, 0.4);

    let conflicts = build_conflict_sets(&ms, &h).unwrap();
    assert_eq!(conflicts, vec![set(&[0, 1])]);
    assert_sound_and_minimal(&h, &ms, &conflicts);
}

#[test]
fn disjoint_class_above_an_unchecked_mapped_class() {
    let mut b = Taxonomy::builder();
    let s0 = b.add_class("s#S0", Ontology::Source);
    let s5 = b.add_class("s#S5", Ontology::Source);
    let top = b.add_class("t#Top", Ontology::Target);
    let t3 = b.add_class("t#T3", Ontology::Target);
    let t6 = b.add_class("t#T6", Ontology::Target);
    let t7 = b.add_class("t#T7", Ontology::Target);
    let t9 = b.add_class("t#T9", Ontology::Target);
    b.add_subclass(s5, s0).unwrap();
    b.add_subclass(t3, top).unwrap();
    b.add_subclass(t6, t3).unwrap();
    b.add_subclass(t7, t6).unwrap();
    b.add_subclass(t9, top).unwrap();
    b.add_disjoint(t6, t9).unwrap();
    let h = b.build();
    let mut ms = MappingSet::new();
    ms.insert(s5, t3, 0.8);
    ms.insert(s0, t9, 0.9);
    ms.insert(s5, t7, 0.3);

    // T6 reaches T9 through S5 and S0 without ever passing T7.
    let mut conflicts = build_conflict_sets(&ms, &h).unwrap();
    conflicts.sort();
    assert_eq!(conflicts, vec![set(&[0, 1]), set(&[1, 2])]);
    assert_sound_and_minimal(&h, &ms, &conflicts);

    let report = repair(&mut ms, &conflicts, RepairPolicy::Automatic).unwrap();
    assert_eq!(report.removed_indices, vec![1]);
    assert!(!violates(&h, &ms, &active(&ms)));
}

#[test]
fn reference_oracle_keeps_confirmed_mapping() {
    let mut b = Taxonomy::builder();
    let a = b.add_class("s#A", Ontology::Source);
    let bb = b.add_class("s#B", Ontology::Source);
    let x = b.add_class("t#X", Ontology::Target);
    b.add_disjoint(a, bb).unwrap();
    let h = b.build();
    let mut ms = MappingSet::new();
    ms.insert(a, x, 0.9);
    ms.insert(bb, x, 0.6);

    let conflicts = build_conflict_sets(&ms, &h).unwrap();
    let mut oracle = ReferenceOracle::new([(bb, x)]);
    let report = repair(&mut ms, &conflicts, RepairPolicy::Interactive(&mut oracle)).unwrap();
    assert_eq!(report.confirmed, vec![1]);
    assert_eq!(report.removed_indices, vec![0]);
    assert_eq!(ms.get(1).unwrap().status, MappingStatus::Correct);
    assert_eq!(oracle.asked(), 2);
}

#[test]
fn flag_stage_preserves_every_mapping() {
    let mut b = Taxonomy::builder();
    let a = b.add_class("s#A", Ontology::Source);
    let bb = b.add_class("s#B", Ontology::Source);
    let x = b.add_class("t#X", Ontology::Target);
    b.add_disjoint(a, bb).unwrap();
    let h = b.build();
    let mut ms = MappingSet::new();
    ms.insert(a, x, 0.9);
    ms.insert(bb, x, 0.6);

    let mut stage =
        RepairStage::new(FilterMode::Flag).with(Box::new(CoherenceRepairer::default()));
    let report = stage.run(&mut ms, &h).unwrap();
    assert_eq!(report.total().removed_count, 1);
    assert_eq!(ms.len(), 2);
    assert_eq!(ms.get(1).unwrap().status, MappingStatus::Flagged);
}

// ---------------------------------------------------------------------------
// Properties over synthetic problems
// ---------------------------------------------------------------------------

fn synthetic(seed: u64) -> (Taxonomy, MappingSet) {
    let mut rng = rand::rngs::StdRng::seed_from_u64(seed);
    let n = 10;
    let mut b = Taxonomy::builder();
    let mut sides = Vec::new();
    for (prefix, ontology) in [("s", Ontology::Source), ("t", Ontology::Target)] {
        let ids: Vec<_> = (0..n)
            .map(|i| b.add_class(format!("{prefix}#C{i}"), ontology))
            .collect();
        for i in 1..n {
            b.add_subclass(ids[i], ids[rng.gen_range(0..i)]).unwrap();
            // Some classes join a second branch.
            if i > 1 && rng.gen_bool(0.3) {
                b.add_subclass(ids[i], ids[rng.gen_range(0..i)]).unwrap();
            }
        }
        for _ in 0..2 {
            let (x, y) = (ids[rng.gen_range(0..n)], ids[rng.gen_range(0..n)]);
            if x != y {
                b.add_disjoint(x, y).unwrap();
            }
        }
        sides.push(ids);
    }
    let h = b.build();
    let mut ms = MappingSet::new();
    for _ in 0..11 {
        ms.insert(
            sides[0][rng.gen_range(0..n)],
            sides[1][rng.gen_range(0..n)],
            rng.gen_range(0.1..1.0),
        );
    }
    (h, ms)
}

#[test]
fn conflict_sets_form_an_antichain() {
    for seed in 0..8 {
        let (h, ms) = synthetic(seed);
        let conflicts = build_conflict_sets(&ms, &h).unwrap();
        assert_antichain(&conflicts);
        for c in &conflicts {
            assert!(!c.is_empty());
            assert!(c.iter().all(|i| ms.is_active(i)));
        }
    }
}

#[test]
fn parallel_build_matches_serial() {
    let parallel = ConflictSetBuilder::new(BuilderConfig {
        parallel: true,
        ..Default::default()
    });
    for seed in 0..8 {
        let (h, ms) = synthetic(seed);
        let serial = ConflictSetBuilder::default().build(&ms, &h).unwrap();
        let par = parallel.build(&ms, &h).unwrap();
        assert_eq!(serial.conflict_sets, par.conflict_sets, "seed {seed}");
        assert_eq!(serial.paths_to_process, par.paths_to_process);
    }
}

#[test]
fn repair_leaves_no_conflict_intact() {
    for seed in 0..8 {
        let (h, mut ms) = synthetic(seed);
        let conflicts = build_conflict_sets(&ms, &h).unwrap();
        let report = repair(&mut ms, &conflicts, RepairPolicy::Automatic).unwrap();
        assert!(report.is_consistent());
        for c in &conflicts {
            assert!(c.iter().any(|i| !ms.is_active(i)), "seed {seed}: {c} intact");
        }
        assert!(report.removed_count <= conflicts.len());
    }
}

#[test]
fn repair_restores_coherence() {
    let mut checked = 0;
    for seed in 0..48 {
        let (h, mut ms) = synthetic(seed);
        if violates(&h, &ms, &BTreeSet::new()) {
            continue;
        }
        let conflicts = build_conflict_sets(&ms, &h).unwrap();
        repair(&mut ms, &conflicts, RepairPolicy::Automatic).unwrap();
        assert!(!violates(&h, &ms, &active(&ms)), "seed {seed}: still incoherent");
        checked += 1;
    }
    assert!(checked > 0);
}
