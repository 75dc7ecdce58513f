use std::collections::HashSet;
use std::path::PathBuf;

use medimg_core::{
    ConfigOverrides, ConfigRegistry, DatasetLocator, DatasetTable, MedimgError,
    ModelExecutionMode,
};

fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests").join("fixtures")
}

fn hello_world() -> medimg_core::ExperimentConfig {
    ConfigRegistry::builtin()
        .create("HelloWorldClassification")
        .expect("builtin config should build")
}

#[test]
fn load_preprocess_and_split() {
    let mut cfg = hello_world();
    cfg.load_dataset_table(&DatasetLocator::new(fixtures_dir()))
        .expect("fixture dataset should load");
    assert_eq!(cfg.dataset_table().unwrap().len(), 24);

    cfg.pre_process_dataset_table().unwrap();
    let table = cfg.dataset_table().unwrap().clone();
    assert_eq!(table.len(), 24);

    // zero class first, then everything else as "1"
    let labels = table.column_values("label").unwrap();
    let zeros = labels.iter().take_while(|l| **l == "0").count();
    assert_eq!(zeros, 10);
    assert!(labels[zeros..].iter().all(|l| *l == "1"));

    let splits = cfg.dataset_splits(&table).unwrap();
    // 12 subjects: floor(8.4) = 8 train, floor(2.4) = 2 test, 2 val
    assert_eq!(splits.number_of_subjects(), (8, 2, 2));
    assert_eq!(splits.train.len(), 16);

    let mut seen = HashSet::new();
    for mode in ModelExecutionMode::ALL {
        for subject in splits.subject_ids(mode) {
            assert!(seen.insert(subject), "subject in two subsets");
        }
    }
    assert_eq!(seen.len(), 12);
}

#[test]
fn split_is_reproducible_across_config_instances() {
    let table = DatasetTable::from_csv_file(fixtures_dir().join("medmnist/dataset.csv")).unwrap();
    let a = hello_world().dataset_splits(&table).unwrap();
    let b = hello_world().dataset_splits(&table).unwrap();
    for mode in ModelExecutionMode::ALL {
        assert_eq!(a.subject_ids(mode), b.subject_ids(mode));
    }
}

#[test]
fn overrides_file_changes_split() {
    let overrides = ConfigOverrides::from_yaml_file(fixtures_dir().join("overrides.yaml")).unwrap();
    let cfg = hello_world().with_overrides(&overrides).unwrap();
    assert_eq!(cfg.base.num_epochs, 4);

    let table = DatasetTable::from_csv_file(fixtures_dir().join("medmnist/dataset.csv")).unwrap();
    let splits = cfg.dataset_splits(&table).unwrap();
    assert_eq!(splits.number_of_subjects(), (6, 3, 3));
}

#[test]
fn missing_label_column_fails_before_processing() {
    let mut cfg = hello_world();
    cfg.base.label_value_column = "diagnosis".to_string();
    cfg.load_dataset_table(&DatasetLocator::new(fixtures_dir())).unwrap();
    let before = cfg.dataset_table().unwrap().clone();

    match cfg.pre_process_dataset_table() {
        Err(MedimgError::MissingColumn { column }) => assert_eq!(column, "diagnosis"),
        other => panic!("expected MissingColumn, got {:?}", other),
    }
    assert_eq!(cfg.dataset_table().unwrap(), &before);
}

#[test]
fn config_listing_does_not_need_a_dataset() {
    let registry = ConfigRegistry::builtin();
    for entry in registry.entries() {
        let cfg = entry.build();
        assert!(cfg.dataset_table().is_none());
        assert!(!entry.description.is_empty());
    }
}

#[cfg(feature = "model")]
#[test]
fn model_runs_on_configured_image_size() {
    use ndarray::Array5;

    let cfg = hello_world();
    let model = cfg.create_model().unwrap();
    let [z, y, x] = cfg.base.expected_image_size_zyx;
    let out = model.forward(Array5::<f32>::zeros((2, 1, z, y, x)).view()).unwrap();
    assert_eq!(out.dim(), (2, 1));
}
