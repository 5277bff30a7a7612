use geezer_build::bundle;
use geezer_core::{GeezerConfig, Pipeline, RegistryCoordinates, RegistryCredentials, Step};
use geezer_docker::{JobRunner, ReleaseContext};
use std::path::PathBuf;

/// Run the workflow's job locally for `branch`, as CI would.
///
/// Branches outside the workflow filter run nothing.
pub async fn release(
    branch: Option<&str>,
    allow_dirty: bool,
    skip_publish: bool,
) -> anyhow::Result<()> {
    let project_dir = PathBuf::from(".");
    let config = GeezerConfig::load(&project_dir)?;
    let binary = &config.project.binary;

    let branch = match branch {
        Some(b) => b.to_owned(),
        None => bundle::current_branch(&project_dir)?,
    };

    let pipeline = Pipeline::from_config(&config.ci);
    let triggered = pipeline.triggered_by(&branch);
    if triggered.is_empty() {
        println!(
            "Branch '{branch}' is not in the workflow filter (only: {}); nothing to run.",
            config.ci.trunk_branch
        );
        return Ok(());
    }

    if !allow_dirty && bundle::is_dirty(&project_dir)? {
        anyhow::bail!(
            "uncommitted changes detected.\n\
             Commit your changes, or use `geezer release --allow-dirty` to release anyway."
        );
    }

    // Resolve every job's steps and credentials before touching docker.
    let mut plans: Vec<(String, Vec<Step>, Option<RegistryCredentials>)> = Vec::new();
    for wf_job in triggered {
        let with_deploy = wf_job.with_deploy && !skip_publish;
        let (publish_tag, credentials) = if with_deploy {
            let coords = RegistryCoordinates::from_env()?;
            (coords.image_tag(binary), Some(RegistryCredentials::from_env()?))
        } else {
            (format!("{binary}:latest"), None)
        };
        let builds = config.build.variant.image_builds(binary, &publish_tag);
        let steps = pipeline
            .job
            .steps(with_deploy, &builds, &config.registry.host);
        plans.push((wf_job.name.clone(), steps, credentials));
    }

    let files = super::build_files(&project_dir, &config)?;
    println!("Bundling source...");
    let bundle_dir = bundle::create_bundle(&project_dir, &files)?;

    let runner = JobRunner::new();
    for (name, steps, credentials) in plans {
        println!("Running {name} ({} steps)...", steps.len());
        let ctx = ReleaseContext {
            context_dir: bundle_dir.clone(),
            credentials,
        };
        let outcome = runner.run(&steps, &ctx).await?;

        for step in &outcome.steps {
            println!("  done: {step}");
        }
        if let Some(engine) = &outcome.engine
            && !engine.matches_pinned
        {
            println!(
                "  note: docker engine {} differs from pinned {}",
                engine.server_version, engine.pinned_version
            );
        }
        match &outcome.pushed {
            Some(tag) => println!("Pushed: {tag}"),
            None => println!("Built without publishing"),
        }
    }

    Ok(())
}
