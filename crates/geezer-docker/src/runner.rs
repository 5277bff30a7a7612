//! Local execution of a job's step list.
//!
//! The CI service runs the same steps remotely; here the environment steps are
//! satisfied by the host and the bundle, and only the docker steps do work.

use crate::client::{BuildError, DockerClient, EngineReport, PreflightError, RegistryError};
use crate::executor::{DockerExecutor, RealExecutor};
use geezer_core::{RegistryCredentials, Step};
use std::path::PathBuf;

/// Inputs a job needs beyond its steps.
#[derive(Debug, Clone)]
pub struct ReleaseContext {
    /// Build context directory, usually the bundle
    pub context_dir: PathBuf,
    /// Required only when the steps contain a registry login
    pub credentials: Option<RegistryCredentials>,
}

/// What a job did. `steps` lists completed steps in order.
#[derive(Debug, Default)]
pub struct JobOutcome {
    pub steps: Vec<String>,
    pub pushed: Option<String>,
    pub engine: Option<EngineReport>,
}

pub struct JobRunner<E: DockerExecutor = RealExecutor> {
    client: DockerClient<E>,
}

impl JobRunner<RealExecutor> {
    pub fn new() -> Self {
        Self {
            client: DockerClient::new(),
        }
    }
}

impl Default for JobRunner<RealExecutor> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: DockerExecutor> JobRunner<E> {
    pub fn with_client(client: DockerClient<E>) -> Self {
        Self { client }
    }

    /// Run `steps` in order, stopping at the first failure.
    pub async fn run(&self, steps: &[Step], ctx: &ReleaseContext) -> Result<JobOutcome, JobError> {
        if !ctx.context_dir.is_dir() {
            return Err(JobError::Step {
                step: "checkout".to_owned(),
                source: StepError::MissingContext(ctx.context_dir.clone()),
            });
        }

        let mut outcome = JobOutcome::default();

        for step in steps {
            let name = step.to_string();
            tracing::info!(step = %name, "running step");

            self.run_step(step, ctx, &mut outcome)
                .await
                .map_err(|source| {
                    tracing::error!(step = %name, "step failed");
                    JobError::Step {
                        step: name.clone(),
                        source,
                    }
                })?;

            outcome.steps.push(name);
        }

        Ok(outcome)
    }

    async fn run_step(
        &self,
        step: &Step,
        ctx: &ReleaseContext,
        outcome: &mut JobOutcome,
    ) -> Result<(), StepError> {
        match step {
            Step::UpdatePackageIndex | Step::InstallPackages { .. } => {
                tracing::debug!("provided by the CI image; nothing to do locally");
            }
            Step::Checkout => {
                tracing::debug!(dir = %ctx.context_dir.display(), "using bundle as checkout");
            }
            Step::SetupRemoteDocker { version } => {
                outcome.engine = Some(self.client.check_engine(version).await?);
            }
            Step::BuildImage(build) => {
                self.client
                    .build_image(&ctx.context_dir, &build.dockerfile, &build.tag)
                    .await?;
            }
            Step::RegistryLogin { host } => {
                let credentials = ctx
                    .credentials
                    .as_ref()
                    .ok_or(StepError::MissingCredentials)?;
                self.client.login(host, credentials).await?;
            }
            Step::PushImage { tag } => {
                self.client.push(tag).await?;
                outcome.pushed = Some(tag.clone());
            }
        }
        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum JobError {
    #[error("step '{step}' failed")]
    Step { step: String, source: StepError },
}

#[derive(Debug, thiserror::Error)]
pub enum StepError {
    #[error(transparent)]
    Engine(#[from] PreflightError),

    #[error(transparent)]
    Build(#[from] BuildError),

    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error("registry credentials are not set (CONTAINER_REGISTRY_USER / CONTAINER_REGISTRY_PASS)")]
    MissingCredentials,

    #[error("build context not found: {}", .0.display())]
    MissingContext(PathBuf),
}
