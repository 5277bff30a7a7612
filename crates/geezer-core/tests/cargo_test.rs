use geezer_core::CargoPackage;
use tempfile::TempDir;

/// Create a minimal Cargo project in a temp directory.
fn init_cargo_project(dir: &std::path::Path, name: &str) {
    std::fs::create_dir_all(dir.join("src")).unwrap();
    std::fs::write(
        dir.join("Cargo.toml"),
        format!(
            r#"[package]
name = "{name}"
version = "1.2.3"
edition = "2021"
"#
        ),
    )
    .unwrap();
    std::fs::write(dir.join("src/main.rs"), "fn main() {}\n").unwrap();
}

#[test]
fn discover_single_package() {
    let tmp = TempDir::new().unwrap();
    init_cargo_project(tmp.path(), "geezer-slots");

    let package = CargoPackage::discover(tmp.path()).unwrap();

    assert_eq!(package.name, "geezer-slots");
    assert_eq!(package.version, "1.2.3");
    assert_eq!(package.binaries.len(), 1);
    assert!(package.require_binary("geezer-slots").is_ok());
    assert!(package.target_directory.ends_with("target"));
}

#[test]
fn release_dir_is_under_target_directory() {
    let tmp = TempDir::new().unwrap();
    init_cargo_project(tmp.path(), "geezer-slots");

    let package = CargoPackage::discover(tmp.path()).unwrap();
    let dir = package.release_dir("x86_64-unknown-linux-gnu");

    assert!(dir.starts_with(&package.target_directory));
    assert!(dir.ends_with("x86_64-unknown-linux-gnu/release"));
}

#[test]
fn discover_virtual_workspace_by_binary() {
    let tmp = TempDir::new().unwrap();
    std::fs::write(
        tmp.path().join("Cargo.toml"),
        r#"[workspace]
resolver = "2"
members = ["crates/app", "crates/tool"]
"#,
    )
    .unwrap();
    init_cargo_project(&tmp.path().join("crates/app"), "geezer-slots");
    init_cargo_project(&tmp.path().join("crates/tool"), "geezer");

    let package = CargoPackage::discover_with_binary(tmp.path(), Some("geezer-slots")).unwrap();
    assert_eq!(package.name, "geezer-slots");

    let err = CargoPackage::discover(tmp.path()).unwrap_err().to_string();
    assert!(err.contains("no package found"), "got: {err}");
    assert!(err.contains("geezer"), "got: {err}");
}

#[test]
fn discover_no_cargo_toml() {
    let tmp = TempDir::new().unwrap();
    let result = CargoPackage::discover(tmp.path());
    assert!(result.is_err());
    let err = result.unwrap_err().to_string();
    assert!(err.contains("cargo metadata failed"), "got: {err}");
}
