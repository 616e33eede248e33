use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn sample_path(siglum: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("synoptic-parser")
        .join("samples")
        .join("witnesses")
        .join(format!("{siglum}.txt"))
}

/// A project folder holding copies of the sample witnesses.
fn sample_project() -> TempDir {
    let dir = TempDir::new().unwrap();
    let manuscripts = dir.path().join("manuscripts");
    fs::create_dir(&manuscripts).unwrap();
    for siglum in ["A", "B", "C"] {
        let file_name = format!("{siglum}.txt");
        fs::copy(sample_path(siglum), manuscripts.join(file_name)).unwrap();
    }
    dir
}

fn read(path: &Path) -> String {
    fs::read_to_string(path).unwrap()
}

#[test]
fn score_prints_export_text() {
    let project = sample_project();
    let mut cmd = cargo_bin_cmd!("synoptic");
    cmd.arg("score").arg(project.path());

    let output_pred = predicate::str::starts_with("SYNOPTIC SCORE\n==============\n")
        .and(predicate::str::contains("§ 2 \n  A o 2"))
        .and(predicate::str::contains("    // BM 12345"));

    cmd.assert().success().stdout(output_pred);
}

#[test]
fn score_write_creates_score_file() {
    let project = sample_project();
    cargo_bin_cmd!("synoptic")
        .arg("score")
        .arg(project.path())
        .arg("--write")
        .assert()
        .success()
        .stdout(predicate::str::contains("Wrote"));
    assert!(read(&project.path().join("score.txt")).contains("§ 6 \n  C b 9"));
}

#[test]
fn score_json_format() {
    let project = sample_project();
    let output = cargo_bin_cmd!("synoptic")
        .arg("score")
        .arg(project.path())
        .arg("--format")
        .arg("score-json")
        .output()
        .unwrap();
    assert!(output.status.success());
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["score"]["lines"]["2"].as_array().unwrap().len(), 3);
}

#[test]
fn unknown_format_fails() {
    let project = sample_project();
    cargo_bin_cmd!("synoptic")
        .arg("score")
        .arg(project.path())
        .arg("--format")
        .arg("pdf")
        .assert()
        .failure()
        .stderr(predicate::str::starts_with("Error:"));
}

#[test]
fn colophons_lists_witness_c() {
    let project = sample_project();
    cargo_bin_cmd!("synoptic")
        .arg("colophons")
        .arg(project.path())
        .assert()
        .success()
        .stdout("C\n  r 1\tŠU mNabû-zēr-iddin\n  r 2\tDUB.SAR\n  b\tmu-šar-ri-ih\n");
}

#[test]
fn search_reports_matches() {
    let project = sample_project();
    cargo_bin_cmd!("synoptic")
        .arg("search")
        .arg(project.path())
        .arg("um-ma")
        .assert()
        .success()
        .stdout(
            predicate::str::contains("  [0] 12: §5 2'. «um-ma»")
                .and(predicate::str::contains("2 matches in 2 manuscripts")),
        );
}

#[test]
fn invalid_regex_is_an_error() {
    let project = sample_project();
    cargo_bin_cmd!("synoptic")
        .arg("search")
        .arg(project.path())
        .arg("(")
        .arg("--regex")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid regex"));
}

#[test]
fn replace_then_undo_restores_files() {
    let project = sample_project();
    let a = project.path().join("manuscripts/A.txt");
    let c = project.path().join("manuscripts/C.txt");
    let before = (read(&a), read(&c));

    cargo_bin_cmd!("synoptic")
        .arg("replace")
        .arg(project.path())
        .arg("ki-ma")
        .arg("GIM")
        .assert()
        .success()
        .stdout("Replaced 2 matches in 2 manuscripts\n");
    assert!(read(&a).contains("§3 3. GIM"));
    assert!(read(&c).contains("§3 2. GIM"));

    cargo_bin_cmd!("synoptic")
        .arg("undo")
        .arg(project.path())
        .assert()
        .success()
        .stdout(predicate::str::starts_with("Undid:"));
    assert_eq!((read(&a), read(&c)), before);

    cargo_bin_cmd!("synoptic")
        .arg("undo")
        .arg(project.path())
        .assert()
        .success()
        .stdout("Nothing to undo\n");
}

#[test]
fn replace_one_by_index() {
    let project = sample_project();
    let c = project.path().join("manuscripts/C.txt");
    cargo_bin_cmd!("synoptic")
        .arg("replace")
        .arg(project.path())
        .arg("ki-ma")
        .arg("GIM")
        .arg("--index")
        .arg("1")
        .assert()
        .success()
        .stdout("Replaced 1 match in 1 manuscript\n");
    assert!(read(&c).contains("§3 2. GIM"));
    assert!(read(&project.path().join("manuscripts/A.txt")).contains("§3 3. ki-ma"));

    cargo_bin_cmd!("synoptic")
        .arg("replace")
        .arg(project.path())
        .arg("ki-ma")
        .arg("GIM")
        .arg("--index")
        .arg("9")
        .assert()
        .success()
        .stdout("Nothing replaced\n");
}

#[test]
fn init_and_add() {
    let dir = TempDir::new().unwrap();
    fs::copy(sample_path("A"), dir.path().join("A.txt")).unwrap();

    cargo_bin_cmd!("synoptic")
        .arg("init")
        .arg(dir.path())
        .arg("--name")
        .arg("Ludlul")
        .assert()
        .success()
        .stdout("Initialised 'Ludlul' with 1 manuscript\n");
    assert!(dir.path().join("manuscripts/A.txt").is_file());

    cargo_bin_cmd!("synoptic")
        .arg("add")
        .arg(dir.path())
        .arg("D")
        .assert()
        .success()
        .stdout("Added D (ms-d)\n");
    assert_eq!(
        read(&dir.path().join("manuscripts/D.txt")),
        "D\n@obverse\n§1 1. "
    );

    cargo_bin_cmd!("synoptic")
        .arg("add")
        .arg(dir.path())
        .arg("d")
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
}

#[test]
fn add_rejects_sigla_outside_the_manuscripts_folder() {
    let root = TempDir::new().unwrap();
    let dir = root.path().join("project");
    cargo_bin_cmd!("synoptic")
        .arg("init")
        .arg(&dir)
        .arg("--name")
        .arg("P")
        .assert()
        .success();

    for siglum in ["../../escaped", "", ".."] {
        cargo_bin_cmd!("synoptic")
            .arg("add")
            .arg(&dir)
            .arg(siglum)
            .assert()
            .failure()
            .stderr(predicate::str::contains("Invalid siglum"));
    }
    assert!(!root.path().join("escaped.txt").exists());
    assert!(!dir.join("manuscripts/.txt").exists());
    assert_eq!(read(&dir.join("manuscripts/index.json")), "[]");
}

#[test]
fn list_formats() {
    cargo_bin_cmd!("synoptic")
        .arg("list-formats")
        .assert()
        .success()
        .stdout(predicate::str::contains("score-text").and(predicate::str::contains("colophons")));
}

#[test]
fn config_file_changes_rendering() {
    let project = sample_project();
    let config = project.path().join("synoptic.toml");
    fs::write(&config, "[render]\nheader = \"LUDLUL\"\n").unwrap();
    cargo_bin_cmd!("synoptic")
        .arg("--config")
        .arg(&config)
        .arg("score")
        .arg(project.path())
        .assert()
        .success()
        .stdout(predicate::str::starts_with("LUDLUL\n======\n"));
}
