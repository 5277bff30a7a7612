use geezer_core::{CargoPackage, GeezerConfig};
use std::path::{Path, PathBuf};

pub fn artifacts(dir: Option<&Path>) -> anyhow::Result<()> {
    let dir = match dir {
        Some(dir) => dir.to_path_buf(),
        None => default_release_dir()?,
    };

    let selected = geezer_build::artifact::select_artifacts(&dir)?;
    if selected.is_empty() {
        println!("No shippable artifacts in {}", dir.display());
        return Ok(());
    }
    for path in selected {
        if let Some(name) = path.file_name() {
            println!("{}", name.to_string_lossy());
        }
    }
    Ok(())
}

/// The release directory cargo writes the configured binary to for the configured variant.
fn default_release_dir() -> anyhow::Result<PathBuf> {
    let project_dir = Path::new(".");
    let config = GeezerConfig::load(project_dir)?;
    let package = CargoPackage::discover_with_binary(project_dir, Some(&config.project.binary))?;
    package.require_binary(&config.project.binary)?;
    Ok(package.release_dir(config.build.variant.target_triple()))
}
