//! Cargo package discovery via `cargo metadata`.
//!
//! Used to confirm the configured binary exists before rendering build files
//! and to locate the release output directory that artifact selection reads.

use cargo_metadata::{MetadataCommand, TargetKind};
use std::path::{Path, PathBuf};

/// A binary target in a Cargo package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CargoBinary {
    /// Binary name (used with `cargo build --bin <name>`)
    pub name: String,
    /// Absolute path to the source file
    pub src_path: PathBuf,
}

/// The package whose manifest lives in the project directory.
///
/// # Examples
///
/// ```no_run
/// use geezer_core::CargoPackage;
/// use std::path::Path;
///
/// let package = CargoPackage::discover(Path::new(".")).unwrap();
/// let out = package.release_dir("x86_64-unknown-linux-musl");
/// println!("{} ships from {}", package.name, out.display());
/// ```
#[derive(Debug, Clone)]
pub struct CargoPackage {
    /// Package name from `[package].name`
    pub name: String,
    /// Resolved version (handles `version.workspace = true`)
    pub version: String,
    /// Absolute path to the workspace root directory
    pub workspace_root: PathBuf,
    /// Absolute path to the shared target directory
    pub target_directory: PathBuf,
    /// All binary targets in this package
    pub binaries: Vec<CargoBinary>,
}

impl CargoPackage {
    /// Discover the Cargo package at the given directory.
    ///
    /// Runs `cargo metadata --no-deps` and selects the package whose manifest
    /// is in `project_dir`. For a virtual workspace root, the member that
    /// owns a binary named `prefer_binary` is selected instead.
    ///
    /// # Errors
    ///
    /// - [`Error::CargoMetadata`](crate::Error::CargoMetadata) if `cargo metadata` fails
    /// - [`Error::NoPackageInDir`](crate::Error::NoPackageInDir) if nothing matches
    pub fn discover(project_dir: &Path) -> crate::Result<Self> {
        Self::discover_with_binary(project_dir, None)
    }

    pub fn discover_with_binary(
        project_dir: &Path,
        prefer_binary: Option<&str>,
    ) -> crate::Result<Self> {
        let manifest_path = project_dir.join("Cargo.toml");
        tracing::debug!(path = %manifest_path.display(), "running cargo metadata");

        let metadata = MetadataCommand::new()
            .manifest_path(&manifest_path)
            .no_deps()
            .exec()
            .map_err(|e| crate::Error::CargoMetadata {
                manifest_path: manifest_path.clone(),
                detail: e.to_string(),
            })?;

        let canonical_dir =
            project_dir
                .canonicalize()
                .map_err(|e| crate::Error::ProjectDirResolve {
                    path: project_dir.to_path_buf(),
                    source: e,
                })?;

        let members: Vec<&cargo_metadata::Package> = metadata
            .packages
            .iter()
            .filter(|p| metadata.workspace_members.contains(&p.id))
            .collect();

        let in_dir = members.iter().copied().find(|p| {
            p.manifest_path
                .as_std_path()
                .parent()
                .and_then(|d| match d.canonicalize() {
                    Ok(c) => Some(c),
                    Err(e) => {
                        tracing::warn!(
                            path = %d.display(),
                            error = %e,
                            "failed to canonicalize manifest parent; skipping package"
                        );
                        None
                    }
                })
                .is_some_and(|d| d == canonical_dir)
        });

        let owning_binary = || {
            prefer_binary.and_then(|bin| {
                members.iter().copied().find(|p| {
                    p.targets
                        .iter()
                        .any(|t| t.kind.contains(&TargetKind::Bin) && t.name == bin)
                })
            })
        };

        let package = in_dir
            .or_else(owning_binary)
            .ok_or_else(|| crate::Error::NoPackageInDir {
                dir: canonical_dir.clone(),
                workspace_members: members.iter().map(|p| p.name.to_string()).collect(),
            })?;

        let binaries: Vec<CargoBinary> = package
            .targets
            .iter()
            .filter(|t| t.kind.contains(&TargetKind::Bin))
            .map(|t| CargoBinary {
                name: t.name.clone(),
                src_path: PathBuf::from(t.src_path.as_std_path()),
            })
            .collect();

        let found = Self {
            name: package.name.to_string(),
            version: package.version.to_string(),
            workspace_root: PathBuf::from(metadata.workspace_root.as_std_path()),
            target_directory: PathBuf::from(metadata.target_directory.as_std_path()),
            binaries,
        };

        tracing::debug!(
            name = %found.name,
            version = %found.version,
            binaries = found.binaries.len(),
            target_directory = %found.target_directory.display(),
            "cargo package discovered"
        );

        Ok(found)
    }

    /// Confirm `name` is one of this package's binaries.
    pub fn require_binary(&self, name: &str) -> crate::Result<&CargoBinary> {
        self.binaries
            .iter()
            .find(|b| b.name == name)
            .ok_or_else(|| crate::Error::BinaryNotFound {
                binary: name.to_owned(),
                available: self.binaries.iter().map(|b| b.name.clone()).collect(),
            })
    }

    /// `<target-dir>/<triple>/release`, where `cargo build --release --target` writes.
    pub fn release_dir(&self, target_triple: &str) -> PathBuf {
        self.target_directory.join(target_triple).join("release")
    }
}
