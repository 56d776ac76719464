//! File round-trip tests: problem files, repair configs and conflict dumps.

use onto_repair::class::Ontology;
use onto_repair::config::RepairConfig;
use onto_repair::conflict::build_conflict_sets;
use onto_repair::error::OntoError;
use onto_repair::export::write_conflict_sets;
use onto_repair::mapping::MappingStatus;
use onto_repair::pipeline::{FilterMode, RepairStage, Strategy};
use onto_repair::problem::{
    mapping_specs, write_json, ClassSpec, MappingSpec, ProblemError, RepairProblem,
};

fn disjoint_pair_problem() -> RepairProblem {
    let mut a = ClassSpec::new("http://s#A", Ontology::Source);
    a.disjoint.push("http://s#B".into());
    let mut b = ClassSpec::new("http://s#B", Ontology::Source);
    b.label = Some("Bee".into());
    let x = ClassSpec::new("http://t#X", Ontology::Target);
    RepairProblem {
        classes: vec![a, b, x],
        mappings: vec![
            MappingSpec {
                source: "http://s#A".into(),
                target: "http://t#X".into(),
                similarity: 0.9,
                status: MappingStatus::Unknown,
            },
            MappingSpec {
                source: "http://s#B".into(),
                target: "http://t#X".into(),
                similarity: 0.6,
                status: MappingStatus::Unknown,
            },
        ],
        reference: vec![("http://s#B".into(), "http://t#X".into())],
    }
}

#[test]
fn problem_survives_save_and_load() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("problem.json");

    let problem = disjoint_pair_problem();
    problem.save(&path).unwrap();
    let reloaded = RepairProblem::load(&path).unwrap();
    assert_eq!(reloaded, problem);

    let loaded = reloaded.resolve().unwrap();
    assert_eq!(loaded.taxonomy.len(), 3);
    assert_eq!(loaded.mappings.len(), 2);
    assert_eq!(loaded.reference.len(), 1);
}

#[test]
fn missing_problem_file_is_a_read_error() {
    let dir = tempfile::TempDir::new().unwrap();
    let err = RepairProblem::load(&dir.path().join("absent.json")).unwrap_err();
    assert!(matches!(err, ProblemError::Read { .. }));

    let wrapped: OntoError = err.into();
    assert!(wrapped.to_string().contains("absent.json"));
}

#[test]
fn malformed_problem_file_is_a_parse_error() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("bad.json");
    std::fs::write(&path, "{ \"classes\": 3 }").unwrap();
    assert!(matches!(
        RepairProblem::load(&path).unwrap_err(),
        ProblemError::Parse { .. }
    ));
}

#[test]
fn config_survives_save_and_load() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("nested").join("repair.toml");

    let config = RepairConfig {
        parallel: true,
        timeout_ms: Some(1_500),
        mode: FilterMode::Flag,
        strategies: vec![Strategy::Cardinality],
        dump_path: Some(dir.path().join("dump.txt")),
        ..Default::default()
    };
    config.save(&path).unwrap();
    assert_eq!(RepairConfig::load(&path).unwrap(), config);
}

#[test]
fn dump_names_every_participant() {
    let dir = tempfile::TempDir::new().unwrap();
    let loaded = disjoint_pair_problem().resolve().unwrap();
    let conflicts = build_conflict_sets(&loaded.mappings, &loaded.taxonomy).unwrap();

    let path = dir.path().join("dump.txt");
    let mut file = std::fs::File::create(&path).unwrap();
    write_conflict_sets(&mut file, &conflicts, &loaded.mappings, &loaded.taxonomy).unwrap();
    drop(file);

    let text = std::fs::read_to_string(&path).unwrap();
    assert_eq!(
        text,
        "Conflict set 1:\n  [0] A -> X (0.90)\n  [1] Bee -> X (0.60)\n\n"
    );
}

#[test]
fn repaired_mappings_reload_as_problem_mappings() {
    let dir = tempfile::TempDir::new().unwrap();
    let problem = disjoint_pair_problem();
    let mut loaded = problem.resolve().unwrap();

    RepairStage::from_config(&RepairConfig::default())
        .run(&mut loaded.mappings, &loaded.taxonomy)
        .unwrap();

    let path = dir.path().join("repaired.json");
    write_json(&path, &mapping_specs(&loaded.taxonomy, &loaded.mappings)).unwrap();

    let text = std::fs::read_to_string(&path).unwrap();
    let specs: Vec<MappingSpec> = serde_json::from_str(&text).unwrap();
    assert_eq!(specs.len(), 2);
    assert_eq!(specs[0].status, MappingStatus::Unknown);
    assert_eq!(specs[1].status, MappingStatus::Incorrect);
    assert_eq!(specs[1].source, "http://s#B");

    // Feeding the result back in finds nothing left to repair.
    let again = RepairProblem {
        mappings: specs,
        ..problem
    }
    .resolve()
    .unwrap();
    assert!(build_conflict_sets(&again.mappings, &again.taxonomy)
        .unwrap()
        .is_empty());
}
