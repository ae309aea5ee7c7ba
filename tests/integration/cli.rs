use assert_cmd::Command;
use lazymod::test_utils::TestManifest;
use predicates::prelude::*;

fn lazymod(manifest: &TestManifest) -> Command {
    let mut cmd = Command::cargo_bin("lazymod").unwrap();
    cmd.current_dir(manifest.dir()).env_remove("LAZYMOD_MANIFEST").env_remove("RUST_LOG");
    cmd
}

#[test]
fn test_resolve_from_default_manifest() {
    let manifest = TestManifest::diamond().unwrap();
    lazymod(&manifest)
        .args(["resolve", "c"])
        .assert()
        .success()
        .stdout(predicate::str::contains("c = aabc"));
}

#[test]
fn test_resolve_several_names() {
    let manifest = TestManifest::diamond().unwrap();
    lazymod(&manifest)
        .args(["-q", "resolve", "b", "c", "a"])
        .assert()
        .success()
        .stdout(predicate::eq("b = ab\nc = aabc\na = a\n"));
}

#[test]
fn test_resolve_json() {
    let manifest = TestManifest::diamond().unwrap();
    let output = lazymod(&manifest).args(["-q", "resolve", "b", "c", "--format", "json"]).output().unwrap();
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json, serde_json::json!({ "b": "ab", "c": "aabc" }));
}

#[test]
fn test_resolve_unknown_module_suggests_name() {
    let manifest = TestManifest::new("[modules.database]\nvalue = \"pg\"\n").unwrap();
    lazymod(&manifest)
        .args(["resolve", "databse"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("No module 'databse' registered"))
        .stderr(predicate::str::contains("Did you mean 'database'?"));
}

#[test]
fn test_manifest_path_flag_and_env() {
    let manifest = TestManifest::diamond().unwrap();
    let elsewhere = tempfile::tempdir().unwrap();

    Command::cargo_bin("lazymod")
        .unwrap()
        .current_dir(elsewhere.path())
        .env_remove("LAZYMOD_MANIFEST")
        .arg("--manifest-path")
        .arg(manifest.path())
        .args(["resolve", "a"])
        .assert()
        .success()
        .stdout("a = a\n");

    Command::cargo_bin("lazymod")
        .unwrap()
        .current_dir(elsewhere.path())
        .env("LAZYMOD_MANIFEST", manifest.path())
        .args(["resolve", "b"])
        .assert()
        .success()
        .stdout("b = ab\n");
}

#[test]
fn test_missing_manifest() {
    let empty = tempfile::tempdir().unwrap();
    Command::cargo_bin("lazymod")
        .unwrap()
        .current_dir(empty.path())
        .env_remove("LAZYMOD_MANIFEST")
        .args(["list"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to read config file"));
}

#[test]
fn test_tree() {
    let manifest = TestManifest::diamond().unwrap();
    lazymod(&manifest)
        .args(["tree", "c"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("c\n├── a\n└── b\n    └── a (*)\n"));
}

#[test]
fn test_list_json() {
    let manifest = TestManifest::diamond().unwrap();
    let output = lazymod(&manifest).args(["list", "--format", "json"]).output().unwrap();
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(
        json,
        serde_json::json!([
            { "name": "a", "dependencies": [] },
            { "name": "b", "dependencies": ["a"] },
            { "name": "c", "dependencies": ["a", "b"] }
        ])
    );
}

#[test]
fn test_validate_ok_and_cycle() {
    let manifest = TestManifest::diamond().unwrap();
    lazymod(&manifest)
        .arg("validate")
        .assert()
        .success()
        .stdout(predicate::str::contains("Manifest is valid (3 modules)"));

    let cyclic =
        TestManifest::new("[modules.a]\ntemplate = \"{c}\"\n[modules.b]\ntemplate = \"{a}\"\n[modules.c]\ntemplate = \"{b}\"\n")
            .unwrap();
    lazymod(&cyclic)
        .args(["validate", "--format", "json"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("\"valid\": false"))
        .stderr(predicate::str::contains("Circular dependency detected: a -> c -> b -> a"));
}

#[test]
fn test_validate_text_failure_is_reported_once() {
    let manifest = TestManifest::new("[modules.willFail]\ntemplate = \"{notHere}\"\n").unwrap();
    lazymod(&manifest)
        .arg("validate")
        .assert()
        .failure()
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("Dependency not found").count(1));
}

#[test]
fn test_resolve_module_without_factory() {
    let manifest = TestManifest::new("[modules.foo]\n").unwrap();
    lazymod(&manifest)
        .args(["resolve", "foo"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Must give a function to register module 'foo'"));
}
