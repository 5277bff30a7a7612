use std::path::{Path, PathBuf};
use std::process::Command;

use crate::dockerfile::RenderedFile;

/// Directory the build context is assembled in.
pub const BUNDLE_DIR: &str = ".geezer-bundle";

/// Paths never copied into the build context, regardless of .gitignore content.
const GEEZER_EXCLUDES: &[&str] = &[BUNDLE_DIR, ".geezer", ".git"];

/// Assembles the Docker build context, the local equivalent of checkout.
///
/// The context holds what `git ls-files` reports (tracked files plus untracked
/// files that are not ignored) and the rendered Dockerfiles at its root.
pub fn create_bundle(project_dir: &Path, files: &[RenderedFile]) -> Result<PathBuf, BundleError> {
    let bundle_dir = project_dir.join(BUNDLE_DIR);

    if bundle_dir.exists() {
        std::fs::remove_dir_all(&bundle_dir).map_err(|source| BundleError::Reset {
            path: bundle_dir.clone(),
            source,
        })?;
    }
    mkdir_p(&bundle_dir)?;

    let copied = git_ls_files(project_dir)?
        .into_iter()
        .filter(|rel| !GEEZER_EXCLUDES.iter().any(|ex| rel.starts_with(ex)))
        .map(|rel| copy_into(project_dir, &bundle_dir, &rel))
        .collect::<Result<Vec<_>, _>>()?
        .len();

    for file in files {
        let path = bundle_dir.join(&file.name);
        std::fs::write(&path, &file.content)
            .map_err(|source| BundleError::WriteBuildFile { path, source })?;
    }

    tracing::debug!(
        bundle = %bundle_dir.display(),
        copied,
        build_files = files.len(),
        "build context assembled"
    );

    Ok(bundle_dir)
}

fn copy_into(project_dir: &Path, bundle_dir: &Path, rel: &Path) -> Result<(), BundleError> {
    let dst = bundle_dir.join(rel);
    if let Some(parent) = dst.parent() {
        mkdir_p(parent)?;
    }
    let src = project_dir.join(rel);
    std::fs::copy(&src, &dst).map_err(|source| BundleError::CopyFile { path: src, source })?;
    Ok(())
}

fn mkdir_p(path: &Path) -> Result<(), BundleError> {
    std::fs::create_dir_all(path).map_err(|source| BundleError::CreateDir {
        path: path.to_path_buf(),
        source,
    })
}

fn git_ls_files(project_dir: &Path) -> Result<Vec<PathBuf>, BundleError> {
    let stdout = git(project_dir, &["ls-files", "--cached", "--others", "--exclude-standard"])?;
    Ok(stdout.lines().filter(|l| !l.is_empty()).map(PathBuf::from).collect())
}

/// True when `git status --porcelain` reports anything.
pub fn is_dirty(project_dir: &Path) -> Result<bool, BundleError> {
    Ok(!git(project_dir, &["status", "--porcelain"])?.trim().is_empty())
}

/// Name of the checked-out branch (`HEAD` when detached).
pub fn current_branch(project_dir: &Path) -> Result<String, BundleError> {
    let stdout = git(project_dir, &["rev-parse", "--abbrev-ref", "HEAD"])?;
    Ok(stdout.trim().to_owned())
}

fn git(project_dir: &Path, args: &[&str]) -> Result<String, BundleError> {
    let command = format!("git {}", args.join(" "));
    let output = Command::new("git")
        .args(args)
        .current_dir(project_dir)
        .output()
        .map_err(|source| BundleError::GitSpawn {
            command: command.clone(),
            source,
        })?;

    if !output.status.success() {
        return Err(BundleError::Git {
            command,
            status: output.status,
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_owned(),
        });
    }

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

#[derive(Debug, thiserror::Error)]
pub enum BundleError {
    #[error("could not remove stale build context {}", path.display())]
    Reset { path: PathBuf, source: std::io::Error },

    #[error("could not create {}", path.display())]
    CreateDir { path: PathBuf, source: std::io::Error },

    #[error("could not copy {} into the build context", path.display())]
    CopyFile { path: PathBuf, source: std::io::Error },

    #[error("could not write {}", path.display())]
    WriteBuildFile { path: PathBuf, source: std::io::Error },

    #[error("could not run `{command}`; is git installed?")]
    GitSpawn { command: String, source: std::io::Error },

    #[error("`{command}` exited with {status}: {stderr}")]
    Git {
        command: String,
        status: std::process::ExitStatus,
        stderr: String,
    },
}
