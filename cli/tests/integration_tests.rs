use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

/// Helper to create a temp directory that is cleaned up on drop.
struct TempDir {
    path: PathBuf,
}

impl TempDir {
    fn new(name: &str) -> Self {
        let path = std::env::temp_dir().join(format!("managed_json_cli_test_{name}_{}", std::process::id()));
        let _ = fs::remove_dir_all(&path);
        fs::create_dir_all(&path).expect("failed to create temp dir");
        Self { path }
    }

    fn join(&self, name: &str) -> PathBuf {
        self.path.join(name)
    }
}

impl Drop for TempDir {
    fn drop(&mut self) {
        let _ = fs::remove_dir_all(&self.path);
    }
}

/// Runs the binary against `db` with the given arguments.
fn run(db: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_managed-json"))
        .arg("--db")
        .arg(db)
        .args(args)
        .output()
        .expect("failed to run managed-json")
}

fn stdout_json(output: &Output) -> serde_json::Value {
    assert!(
        output.status.success(),
        "command failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).expect("stdout should be JSON")
}

/// Registers `Dog` keyed by `id` and imports three dogs.
fn seed_dogs(dir: &TempDir) -> PathBuf {
    let db = dir.join("objects.db");
    let input = dir.join("dogs.json");
    fs::write(
        &input,
        serde_json::to_string(&serde_json::json!([
            {"id": 3, "name": "Rex", "toys": [{"name": "bone"}]},
            {"id": 1, "name": "Fido", "toys": []},
            {"id": "x7", "name": "Spot", "toys": []}
        ]))
        .unwrap(),
    )
    .unwrap();

    assert!(run(&db, &["register", "--type", "Dog", "--primary-key", "id"]).status.success());
    let import = run(&db, &["import", "--type", "Dog", "--input", input.to_str().unwrap()]);
    assert!(import.status.success());
    assert!(String::from_utf8_lossy(&import.stdout).contains("Imported 3"));
    db
}

#[test]
fn find_by_integer_key_prints_detached_copy() {
    let dir = TempDir::new("find_int");
    let db = seed_dogs(&dir);

    let found = stdout_json(&run(&db, &["find", "--type", "Dog", "--key", "3"]));
    assert_eq!(found["name"], "Rex");
    assert_eq!(found["toys"][0]["name"], "bone");
}

#[test]
fn find_by_text_key() {
    let dir = TempDir::new("find_text");
    let db = seed_dogs(&dir);

    let found = stdout_json(&run(&db, &["find", "--type", "Dog", "--key", "x7"]));
    assert_eq!(found["name"], "Spot");

    // Forced text lookup does not match the integer key 3.
    let missing = stdout_json(&run(&db, &["find", "--type", "Dog", "--key", "3", "--kind", "text"]));
    assert!(missing.is_null());
}

#[test]
fn find_missing_key_prints_null() {
    let dir = TempDir::new("find_missing");
    let db = seed_dogs(&dir);

    let missing = stdout_json(&run(&db, &["find", "--type", "Dog", "--key", "99"]));
    assert!(missing.is_null());
    let null_key = stdout_json(&run(&db, &["find", "--type", "Dog", "--kind", "null"]));
    assert!(null_key.is_null());
}

#[test]
fn export_preserves_insertion_order() {
    let dir = TempDir::new("export_order");
    let db = seed_dogs(&dir);

    let exported = stdout_json(&run(&db, &["export", "--type", "Dog"]));
    let names: Vec<&str> = exported
        .as_array()
        .unwrap()
        .iter()
        .map(|dog| dog["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, ["Rex", "Fido", "Spot"]);
}

#[test]
fn export_to_file() {
    let dir = TempDir::new("export_file");
    let db = seed_dogs(&dir);
    let out = dir.join("out/dogs.json");

    let output = run(&db, &["export", "--type", "Dog", "--output", out.to_str().unwrap()]);
    assert!(output.status.success());
    let written: serde_json::Value = serde_json::from_str(&fs::read_to_string(&out).unwrap()).unwrap();
    assert_eq!(written.as_array().unwrap().len(), 3);
}

#[test]
fn export_empty_type_prints_empty_array() {
    let dir = TempDir::new("export_empty");
    let db = dir.join("objects.db");
    assert!(run(&db, &["register", "--type", "Cat", "--primary-key", "name"]).status.success());

    let exported = stdout_json(&run(&db, &["export", "--type", "Cat"]));
    assert_eq!(exported, serde_json::json!([]));
}

#[test]
fn unregistered_type_fails() {
    let dir = TempDir::new("unregistered");
    let db = dir.join("objects.db");

    let output = run(&db, &["find", "--type", "Ghost", "--key", "1"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("not registered"));
}

#[test]
fn duplicate_import_reports_progress() {
    let dir = TempDir::new("duplicate");
    let db = seed_dogs(&dir);
    let input = dir.join("again.json");
    fs::write(&input, r#"[{"id": 10, "name": "New"}, {"id": 3, "name": "Clash"}]"#).unwrap();

    let output = run(&db, &["import", "--type", "Dog", "--input", input.to_str().unwrap()]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("after 1 object(s)"));
}

#[test]
fn types_lists_registrations_with_counts() {
    let dir = TempDir::new("types");
    let db = seed_dogs(&dir);

    let output = run(&db, &["types"]);
    assert!(output.status.success());
    assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "Dog\tid\t3");
}

#[test]
fn config_file_selects_database_and_prefix() {
    let dir = TempDir::new("config");
    let config = dir.join("session.yaml");
    fs::write(
        &config,
        format!("path: {}\nprefix: app_\n", dir.join("cfg.db").display()),
    )
    .unwrap();
    let bin = env!("CARGO_BIN_EXE_managed-json");

    let status = Command::new(bin)
        .args(["--config", config.to_str().unwrap()])
        .args(["register", "--type", "Tag", "--primary-key", "label"])
        .status()
        .unwrap();
    assert!(status.success());

    let output = Command::new(bin)
        .args(["types", "--config", config.to_str().unwrap()])
        .output()
        .unwrap();
    assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "Tag\tlabel\t0");
}

#[test]
fn missing_database_is_an_error() {
    let output = Command::new(env!("CARGO_BIN_EXE_managed-json"))
        .args(["types"])
        .output()
        .unwrap();
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("--db"));
}
