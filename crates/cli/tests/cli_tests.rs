use std::path::PathBuf;
use std::process::{Command, Output};

use tempfile::TempDir;

fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn medimg(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_medimg"))
        .args(args)
        .env_remove("MEDIMG_DATASET_ROOT")
        .output()
        .expect("failed to run medimg")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

#[test]
fn list_shows_hello_world() {
    let output = medimg(&["list"]);
    assert!(output.status.success());
    assert!(stdout(&output).contains("HelloWorldClassification"));
}

#[test]
fn show_prints_yaml_and_json() {
    let output = medimg(&["show", "HelloWorldClassification"]);
    assert!(output.status.success());
    let yaml = stdout(&output);
    assert!(yaml.contains("subject_column: subjectID"));
    assert!(yaml.contains("loss_type: mean_squared_error"));

    let output = medimg(&["show", "HelloWorldClassification", "--json"]);
    assert!(output.status.success());
    let json = stdout(&output);
    assert!(json.contains("\"label_value_column\": \"label\""));
}

#[test]
fn show_applies_overrides() {
    let overrides = fixture_path("more_epochs.yaml");
    let output = medimg(&[
        "show",
        "HelloWorldClassification",
        "--overrides",
        overrides.to_str().unwrap(),
    ]);
    assert!(output.status.success());
    assert!(stdout(&output).contains("num_epochs: 6"));
}

#[test]
fn validate_rejects_bad_proportions() {
    let overrides = fixture_path("bad_split.yaml");
    let output = medimg(&[
        "validate",
        "HelloWorldClassification",
        "--overrides",
        overrides.to_str().unwrap(),
    ]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("sum to 1.0"), "stderr was: {}", stderr);
}

#[test]
fn validate_accepts_exported_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("hello.yaml");
    let output = medimg(&["show", "HelloWorldClassification"]);
    assert!(output.status.success());
    let yaml = stdout(&output);
    std::fs::write(&path, &yaml).unwrap();

    let output = medimg(&["validate", "--file", path.to_str().unwrap()]);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    assert!(stdout(&output).contains("HelloWorldClassification is valid"));

    let zero_epochs = yaml.replace("num_epochs: 2", "num_epochs: 0");
    std::fs::write(&path, zero_epochs).unwrap();
    let output = medimg(&["validate", "--file", path.to_str().unwrap()]);
    assert!(!output.status.success());
}

#[test]
fn validate_needs_name_or_file() {
    assert!(!medimg(&["validate"]).status.success());
}

#[test]
fn unknown_config_fails() {
    let output = medimg(&["validate", "NoSuchConfig"]);
    assert!(!output.status.success());
}

#[test]
fn prepare_writes_three_splits() {
    let out_dir = TempDir::new().unwrap();
    let csv = fixture_path("dataset.csv");
    let output = medimg(&[
        "prepare",
        "HelloWorldClassification",
        "--csv",
        csv.to_str().unwrap(),
        "--out-dir",
        out_dir.path().to_str().unwrap(),
    ]);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    assert!(stdout(&output).contains("Split by 'subjectID'"));
    assert!(stdout(&output).contains("Train: 7 subjects, 7 rows"));

    let mut total = 0;
    for name in ["train.csv", "val.csv", "test.csv"] {
        let text = std::fs::read_to_string(out_dir.path().join(name)).unwrap();
        let mut lines = text.lines();
        assert_eq!(lines.next(), Some("subjectID,path,label"));
        for line in lines {
            let label = line.rsplit(',').next().unwrap();
            assert!(label == "0" || label == "1", "unexpected label in {}: {}", name, line);
            total += 1;
        }
    }
    assert_eq!(total, 10);
}

#[test]
fn prepare_without_dataset_source_fails() {
    let out_dir = TempDir::new().unwrap();
    let output = medimg(&[
        "prepare",
        "HelloWorldClassification",
        "--out-dir",
        out_dir.path().to_str().unwrap(),
    ]);
    assert!(!output.status.success());
}

#[test]
fn prepare_reports_dataset_root_from_env() {
    let root = TempDir::new().unwrap();
    let out_dir = TempDir::new().unwrap();
    let output = Command::new(env!("CARGO_BIN_EXE_medimg"))
        .args(["prepare", "HelloWorldClassification", "--out-dir"])
        .arg(out_dir.path())
        .env("MEDIMG_DATASET_ROOT", root.path())
        .output()
        .unwrap();
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    let root_name = root.path().file_name().unwrap().to_string_lossy().into_owned();
    assert!(stderr.contains(&root_name), "stderr was: {}", stderr);
}

#[test]
fn smoke_runs_forward_pass() {
    let output = medimg(&["smoke", "HelloWorldClassification", "--batch", "3"]);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    let text = stdout(&output);
    assert!(text.contains("Input shape: [3, 1, 1, 64, 64]"));
    assert!(text.contains("Output shape: [3, 1]"));
    // 3x3 kernel, 62x62 features, two biases
    assert!(text.contains("Parameters: 3855"), "{}", text);
}
