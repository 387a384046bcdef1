use std::fs;
use std::path::Path;
use std::process::Command;

use assert_cmd::prelude::*;
use predicates::str::contains;

use bakery_core::{settings, BakerCommand, Settings};
use tempfile::TempDir;

const SOIL: &str = "https://ourworldindata.org/grapher/soil-lifespans";

fn bakery_cmd(home: &Path) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("bakery"));
    cmd.env("HOME", home)
        .env("USERPROFILE", home)
        .env("RUST_LOG", "warn");
    cmd
}

/// Site with one v3 soil-lifespans export and a catalog at `version`.
fn setup_site(home: &TempDir, version: u64, baker: Option<BakerCommand>) -> Settings {
    let site = home.path().join("site");
    let mut settings = Settings::new(&site, "https://ourworldindata.org");
    fs::create_dir_all(settings.exports_dir()).expect("mkdir exports");
    fs::write(
        settings.exports_dir().join("soil-lifespans_v3_850x600.svg"),
        "<svg/>",
    )
    .expect("write export");

    let catalog = home.path().join("catalog.yaml");
    fs::write(
        &catalog,
        format!("charts:\n  - {{slug: soil-lifespans, id: 42, version: {version}}}\n"),
    )
    .expect("write catalog");
    settings.catalog = Some(catalog);
    settings.baker = baker;
    settings::save_at(home.path(), &settings).expect("save settings");
    settings
}

fn sh_baker(script: &str) -> BakerCommand {
    BakerCommand {
        program: "sh".into(),
        args: vec!["-c".into(), script.into(), "bake".into()],
    }
}

#[test]
fn init_writes_settings_file() {
    let home = TempDir::new().unwrap();
    bakery_cmd(home.path())
        .args([
            "init",
            "--site-dir",
            "/srv/site",
            "--base-url",
            "https://ourworldindata.org",
            "--batch-size",
            "3",
            "--baker",
            "/usr/bin/bake-svgs",
            "--baker-arg",
            "--quiet",
        ])
        .assert()
        .success()
        .stdout(contains("Saved settings"));

    let loaded = settings::load_at(home.path()).expect("load");
    assert_eq!(loaded.batch_size, 3);
    assert_eq!(loaded.exports_dir(), Path::new("/srv/site/exports"));
    assert_eq!(loaded.baker.expect("baker").args, vec!["--quiet"]);
}

#[test]
fn status_without_settings_points_at_init() {
    let home = TempDir::new().unwrap();
    bakery_cmd(home.path())
        .args(["status", SOIL])
        .assert()
        .failure()
        .stderr(contains("bakery init"));
}

#[test]
fn status_json_reports_current_and_never_baked() {
    let home = TempDir::new().unwrap();
    setup_site(&home, 3, None);

    let output = bakery_cmd(home.path())
        .args([
            "status",
            "--json",
            SOIL,
            "https://ourworldindata.org/grapher/soil-lifespans?tab=map",
        ])
        .output()
        .expect("run status");
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).expect("json");
    assert_eq!(json["summary"]["stale"], 1);
    assert_eq!(json["references"][0]["freshness"]["status"], "current");
    assert_eq!(json["references"][1]["freshness"]["status"], "never_baked");
}

#[test]
fn index_json_lists_exports_and_skipped_files() {
    let home = TempDir::new().unwrap();
    let settings = setup_site(&home, 3, None);
    fs::write(settings.exports_dir().join("broken.svg"), "<svg/>").unwrap();

    let output = bakery_cmd(home.path())
        .args(["index", "--json"])
        .output()
        .expect("run index");
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).expect("json");
    assert_eq!(json["exports"][0]["key"], "soil-lifespans");
    assert_eq!(json["exports"][0]["version"], 3);
    assert_eq!(
        json["exports"][0]["location_uri"],
        "https://ourworldindata.org/exports/soil-lifespans_v3_850x600.svg"
    );
    assert_eq!(json["skipped"][0]["filename"], "broken.svg");
}

#[test]
fn dry_run_lists_stale_and_bakes_nothing() {
    let home = TempDir::new().unwrap();
    let settings = setup_site(&home, 4, None);

    bakery_cmd(home.path())
        .args(["bake", "--dry-run", SOIL])
        .assert()
        .success()
        .stdout(contains("[dry-run]"))
        .stdout(contains(SOIL));

    let files = fs::read_dir(settings.exports_dir()).unwrap().count();
    assert_eq!(files, 1, "dry run must not create exports");
}

#[cfg(unix)]
#[test]
fn bake_runs_baker_then_reports_current() {
    let home = TempDir::new().unwrap();
    let settings = setup_site(
        &home,
        4,
        Some(sh_baker(r#"touch "$2/soil-lifespans_v4_850x600.svg""#)),
    );

    bakery_cmd(home.path())
        .args(["bake", SOIL])
        .assert()
        .success()
        .stdout(contains("baked 1 reference(s)"))
        .stdout(contains(", started "));
    assert!(settings
        .exports_dir()
        .join("soil-lifespans_v4_850x600.svg")
        .exists());

    bakery_cmd(home.path())
        .args(["bake", SOIL])
        .assert()
        .success()
        .stdout(contains("nothing to bake"));
}

#[cfg(unix)]
#[test]
fn failing_batches_exit_non_zero() {
    let home = TempDir::new().unwrap();
    setup_site(&home, 4, Some(sh_baker("echo render failed >&2; exit 1")));

    let list = home.path().join("refs.txt");
    let refs: Vec<String> = (0..6)
        .map(|i| format!("https://ourworldindata.org/grapher/chart-{i}"))
        .collect();
    fs::write(&list, format!("# six new charts\n{}\n", refs.join("\n"))).unwrap();

    bakery_cmd(home.path())
        .args(["bake", "--file"])
        .arg(&list)
        .assert()
        .failure()
        .stdout(contains("2 failed"))
        .stderr(contains("2 bake batch(es) failed"));
}
