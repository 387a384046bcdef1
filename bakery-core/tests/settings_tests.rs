//! Settings load/save error messages and persistence.

use assert_fs::prelude::*;
use bakery_core::{
    settings::{self, settings_path_at, DEFAULT_BATCH_SIZE},
    BakerCommand, Settings, SettingsError,
};
use predicates::prelude::predicate;
use std::fs;

#[test]
fn load_missing_settings_returns_not_found() {
    let home = assert_fs::TempDir::new().expect("tempdir");
    let err = settings::load_at(home.path()).unwrap_err();
    assert!(matches!(err, SettingsError::NotFound { .. }), "got: {err}");
    assert!(err.to_string().contains("settings.yaml"));
    assert!(err.to_string().contains("bakery init"));
}

#[test]
fn load_corrupt_yaml_returns_parse_error_with_path() {
    let home = assert_fs::TempDir::new().expect("tempdir");
    let dir = home.path().join(".bakery");
    fs::create_dir_all(&dir).expect("mkdir");
    fs::write(dir.join("settings.yaml"), b": : corrupt : yaml : !!!\n  - broken: [unclosed")
        .expect("write");

    let err = settings::load_at(home.path()).unwrap_err();
    assert!(matches!(err, SettingsError::Parse { .. }), "got: {err}");
    assert!(err.to_string().contains("settings.yaml"));
}

#[test]
fn save_then_load_preserves_every_field() {
    let home = assert_fs::TempDir::new().expect("tempdir");
    let mut original = Settings::new("/srv/site", "https://example.org");
    original.optimize_svg_exports = true;
    original.batch_size = 3;
    original.catalog = Some("/srv/catalog.yaml".into());
    original.baker = Some(BakerCommand {
        program: "/usr/local/bin/bake-svgs".into(),
        args: vec!["--quiet".to_string()],
    });

    settings::save_at(home.path(), &original).expect("save");
    home.child(".bakery/settings.yaml")
        .assert(predicate::path::exists());

    let loaded = settings::load_at(home.path()).expect("load");
    assert_eq!(loaded, original);
}

#[test]
fn minimal_file_uses_defaults() {
    let home = assert_fs::TempDir::new().expect("tempdir");
    let path = settings_path_at(home.path());
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(
        &path,
        "baked_site_dir: /srv/site\nbaked_base_url: https://example.org\n",
    )
    .unwrap();

    let loaded = settings::load_at(home.path()).expect("load");
    assert_eq!(loaded.batch_size, DEFAULT_BATCH_SIZE);
    assert!(loaded.validate().is_ok());
}
