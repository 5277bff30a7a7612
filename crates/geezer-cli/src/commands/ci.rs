use geezer_build::circleci::{CIRCLECI_CONFIG_PATH, render_circleci};
use geezer_core::{GeezerConfig, Pipeline, RegistryCoordinates};
use std::path::{Path, PathBuf};

/// Write `.circleci/config.yml` for the configured variant.
pub fn ci_init() -> anyhow::Result<()> {
    let project_dir = PathBuf::from(".");
    let config_path = project_dir.join(CIRCLECI_CONFIG_PATH);
    if config_path.exists() {
        anyhow::bail!(
            "CI config already exists at {CIRCLECI_CONFIG_PATH}; edit it directly, or delete it to re-run ci init"
        );
    }

    let config = GeezerConfig::load(&project_dir)?;
    let pipeline = Pipeline::from_config(&config.ci);
    let yaml = render_circleci(
        &pipeline,
        config.build.variant,
        &config.project.binary,
        &config.registry.host,
    );

    if let Some(parent) = config_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(&config_path, yaml)?;

    println!("Created {CIRCLECI_CONFIG_PATH}");
    println!();
    println!("Set these project variables in CircleCI before the first push to {}:", config.ci.trunk_branch);
    for var in [
        geezer_core::registry::REGISTRY_URL_VAR,
        geezer_core::registry::REGISTRY_NAMESPACE_VAR,
        geezer_core::registry::REGISTRY_USER_VAR,
        geezer_core::registry::REGISTRY_PASS_VAR,
    ] {
        println!("  {var}");
    }
    Ok(())
}

/// Print the workflow jobs and steps a push to `branch` would run.
pub fn ci_plan(branch: &str) -> anyhow::Result<()> {
    let config = GeezerConfig::load(Path::new("."))?;
    let pipeline = Pipeline::from_config(&config.ci);
    let triggered = pipeline.triggered_by(branch);

    if triggered.is_empty() {
        println!(
            "Branch '{branch}' triggers no jobs (workflow '{}' runs only on: {})",
            pipeline.workflow.name, config.ci.trunk_branch
        );
        return Ok(());
    }

    let publish_tag = RegistryCoordinates::placeholders().image_tag(&config.project.binary);
    let builds = config
        .build
        .variant
        .image_builds(&config.project.binary, &publish_tag);

    println!("Branch '{branch}' triggers workflow '{}':", pipeline.workflow.name);
    for wf_job in triggered {
        println!(
            "  {} (job {}, with_deploy: {})",
            wf_job.name, wf_job.job, wf_job.with_deploy
        );
        let steps = pipeline
            .job
            .steps(wf_job.with_deploy, &builds, &config.registry.host);
        for (i, step) in steps.iter().enumerate() {
            println!("    {}. {step}", i + 1);
        }
    }
    Ok(())
}
