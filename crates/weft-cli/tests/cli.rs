//! Integration tests for the weft binary.

use std::fs;
use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn weft() -> Command {
    let mut cmd = Command::cargo_bin("weft").expect("weft binary is built");
    cmd.env("NO_COLOR", "1")
        .env_remove("RUST_LOG")
        .env_remove("WEFT_CONFIG")
        .env_remove("WEFT_PROFILE");
    cmd
}

fn write(root: &Path, path: &str, content: &str) -> anyhow::Result<()> {
    let full = root.join(path);
    fs::create_dir_all(full.parent().expect("file has a parent"))?;
    fs::write(full, content)?;
    Ok(())
}

/// A site using the classic preset, scaffolded through `weft init`.
fn site() -> anyhow::Result<TempDir> {
    let dir = TempDir::new()?;
    weft().args(["init", "--dir"]).arg(dir.path()).assert().success();

    write(dir.path(), "src/js/index.js", "import '../scss/main.scss';\n")?;
    write(dir.path(), "src/scss/main.scss", "body { color: red; }\n")?;
    Ok(dir)
}

#[test]
fn init_refuses_to_overwrite() -> anyhow::Result<()> {
    let dir = site()?;
    weft()
        .args(["init", "--dir"])
        .arg(dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));

    weft()
        .args(["init", "--force", "--dir"])
        .arg(dir.path())
        .assert()
        .success();
    Ok(())
}

#[test]
fn check_accepts_classic_site() -> anyhow::Result<()> {
    let dir = site()?;
    weft()
        .arg("check")
        .current_dir(dir.path())
        .assert()
        .success()
        .stderr(predicate::str::contains("Configuration is valid"));
    Ok(())
}

#[test]
fn check_reports_missing_entry() -> anyhow::Result<()> {
    let dir = site()?;
    fs::remove_file(dir.path().join("src/js/index.js"))?;

    weft()
        .args(["check", "--root"])
        .arg(dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("entry 'main' not found"));
    Ok(())
}

#[test]
fn check_without_config_suggests_init() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    weft()
        .arg("check")
        .current_dir(dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("weft init"));
    Ok(())
}

#[test]
fn plan_json_lists_artifacts() -> anyhow::Result<()> {
    let dir = site()?;
    let output = weft()
        .args(["plan", "--json", "--root"])
        .arg(dir.path())
        .output()?;
    assert!(output.status.success());

    let plan: serde_json::Value = serde_json::from_slice(&output.stdout)?;
    let paths: Vec<&str> = plan["artifacts"]
        .as_array()
        .expect("artifacts array")
        .iter()
        .filter_map(|a| a["path"].as_str())
        .collect();
    assert_eq!(paths, vec!["main.js", "main.css", "main.js.map"]);
    assert_eq!(plan["devServer"]["listen"], "http://localhost:3000");
    Ok(())
}

#[test]
fn plan_writes_manifest() -> anyhow::Result<()> {
    let dir = site()?;
    let out = dir.path().join("build/plan.json");

    weft()
        .args(["plan", "--out"])
        .arg(&out)
        .current_dir(dir.path())
        .assert()
        .success()
        .stderr(predicate::str::contains("main.css"));

    let plan: serde_json::Value = serde_json::from_str(&fs::read_to_string(out)?)?;
    assert_eq!(plan["chunks"].as_array().map(Vec::len), Some(1));
    Ok(())
}

#[test]
fn plan_fails_on_unresolved_import() -> anyhow::Result<()> {
    let dir = site()?;
    write(dir.path(), "src/js/index.js", "import './missing';\n")?;

    weft()
        .args(["plan", "--root"])
        .arg(dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot resolve './missing'"));
    Ok(())
}

#[test]
fn print_toml_round_trips() -> anyhow::Result<()> {
    let dir = site()?;
    let output = weft()
        .args(["print", "--format", "toml", "--config"])
        .arg(dir.path().join("weft.toml"))
        .output()?;
    assert!(output.status.success());

    let printed = String::from_utf8(output.stdout)?;
    let reparsed = weft_config::WeftConfig::from_toml_str(&printed)?;
    assert_eq!(reparsed, weft_config::presets::classic()?);
    Ok(())
}

#[test]
fn print_applies_profile() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    write(
        dir.path(),
        "weft.json",
        r#"{
            "entry": { "main": "./src/index.js" },
            "profiles": { "production": { "devtool": "source-map" } }
        }"#,
    )?;

    weft()
        .args(["print", "--profile", "production"])
        .current_dir(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""devtool": "source-map""#));

    weft()
        .args(["print", "--profile", "staging"])
        .current_dir(dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("profile 'staging' is not defined"));
    Ok(())
}
