use geezer_build::DockerfileGenerator;
use geezer_core::{BuildVariant, GeezerConfig};
use std::path::PathBuf;

pub fn dockerfile(variant: Option<BuildVariant>) -> anyhow::Result<()> {
    let project_dir = PathBuf::from(".");
    let mut config = GeezerConfig::load(&project_dir)?;
    if let Some(variant) = variant {
        config.build.variant = variant;
    }

    let generator = DockerfileGenerator::new(&config.build, &config.project.binary);
    for file in generator.render() {
        println!("# ── {} ──", file.name);
        println!("{}", file.content);
    }
    Ok(())
}
