use std::path::{Path, PathBuf};

use crate::dockerfile::RenderedFile;

/// Directory holding ejected build files.
pub const EJECT_DIR: &str = ".geezer";

/// Ejects rendered build files into the project directory.
///
/// After ejecting, `geezer release` uses the files in `.geezer/`
/// instead of generating them.
pub fn eject(project_dir: &Path, files: &[RenderedFile]) -> Result<Vec<PathBuf>, EjectError> {
    let eject_dir = project_dir.join(EJECT_DIR);
    std::fs::create_dir_all(&eject_dir).map_err(|e| EjectError::CreateDir {
        path: eject_dir.clone(),
        source: e,
    })?;

    if let Some(existing) = files
        .iter()
        .map(|f| eject_dir.join(&f.name))
        .find(|p| p.exists())
    {
        return Err(EjectError::AlreadyEjected(existing));
    }

    let mut written = Vec::with_capacity(files.len());
    for file in files {
        let path = eject_dir.join(&file.name);
        std::fs::write(&path, &file.content).map_err(|e| EjectError::Write {
            path: path.clone(),
            source: e,
        })?;
        written.push(path);
    }

    Ok(written)
}

/// Check if the project has ejected build files.
pub fn is_ejected(project_dir: &Path) -> bool {
    project_dir.join(EJECT_DIR).join("Dockerfile").exists()
}

/// Load the ejected files named `names`, in the given order.
pub fn load_ejected(project_dir: &Path, names: &[&str]) -> Result<Vec<RenderedFile>, EjectError> {
    names
        .iter()
        .map(|name| {
            let path = project_dir.join(EJECT_DIR).join(name);
            std::fs::read_to_string(&path)
                .map(|content| RenderedFile {
                    name: (*name).to_owned(),
                    content,
                })
                .map_err(|e| EjectError::Read { path, source: e })
        })
        .collect()
}

#[derive(Debug, thiserror::Error)]
pub enum EjectError {
    #[error("failed to create .geezer directory at {path}")]
    CreateDir {
        path: std::path::PathBuf,
        source: std::io::Error,
    },
    #[error("build files already ejected at {0}; edit directly or delete to re-eject")]
    AlreadyEjected(std::path::PathBuf),
    #[error("failed to write {path}")]
    Write {
        path: std::path::PathBuf,
        source: std::io::Error,
    },
    #[error("failed to read ejected build file at {path}")]
    Read {
        path: std::path::PathBuf,
        source: std::io::Error,
    },
}
