mod artifacts;
mod ci;
mod dockerfile;
mod doctor;
mod eject;
mod release;

use geezer_build::RenderedFile;
use geezer_build::eject as eject_mod;
use geezer_core::GeezerConfig;
use std::path::Path;

pub use artifacts::artifacts;
pub use ci::{ci_init, ci_plan};
pub use dockerfile::dockerfile;
pub use doctor::doctor;
pub use eject::eject;
pub use release::release;

/// Ejected Dockerfiles when present, freshly rendered ones otherwise.
pub(crate) fn build_files(project_dir: &Path, config: &GeezerConfig) -> anyhow::Result<Vec<RenderedFile>> {
    if eject_mod::is_ejected(project_dir) {
        println!("Using ejected build files from {}/", eject_mod::EJECT_DIR);
        let names = config.build.variant.dockerfile_names();
        return Ok(eject_mod::load_ejected(project_dir, names)?);
    }
    let generator = geezer_build::DockerfileGenerator::new(&config.build, &config.project.binary);
    Ok(generator.render())
}
