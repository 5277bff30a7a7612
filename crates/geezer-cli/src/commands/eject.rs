use geezer_build::DockerfileGenerator;
use geezer_core::GeezerConfig;
use std::path::PathBuf;

pub fn eject() -> anyhow::Result<()> {
    let project_dir = PathBuf::from(".");
    let config = GeezerConfig::load(&project_dir)?;

    let generator = DockerfileGenerator::new(&config.build, &config.project.binary);
    let written = geezer_build::eject::eject(&project_dir, &generator.render())?;

    for path in &written {
        println!("Ejected {}", path.display());
    }
    println!("You can now edit them directly. geezer release will use these files.");
    Ok(())
}
