//! The release pipeline: one parameterized job bound into one workflow.
//!
//! ```text
//! push ──▶ workflow (branch allow-list) ──▶ job `docker` (with_deploy)
//!            only: [master]                  1. update package index
//!                                            2. install git + ssh client
//!                                            3. checkout
//!                                            4. setup remote docker (pinned)
//!                                            5. docker build
//!                                            ── with_deploy only ──
//!                                            6. docker login (password on stdin)
//!                                            7. docker push
//! ```
//!
//! The same [`Step`] list drives both the rendered CI configuration and the
//! local runner, so the two cannot drift apart.

use std::fmt;

use crate::config::CiConfig;

/// One `docker build` invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageBuild {
    /// Dockerfile name relative to the build context
    pub dockerfile: String,
    pub tag: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    UpdatePackageIndex,
    InstallPackages { packages: Vec<String> },
    Checkout,
    SetupRemoteDocker { version: String },
    BuildImage(ImageBuild),
    RegistryLogin { host: String },
    PushImage { tag: String },
}

impl Step {
    /// Steps that only run when the job is parameterized with `with_deploy`.
    pub fn is_publish(&self) -> bool {
        matches!(self, Self::RegistryLogin { .. } | Self::PushImage { .. })
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UpdatePackageIndex => f.write_str("update package index"),
            Self::InstallPackages { packages } => write!(f, "install {}", packages.join(" ")),
            Self::Checkout => f.write_str("checkout"),
            Self::SetupRemoteDocker { version } => write!(f, "setup remote docker {version}"),
            Self::BuildImage(build) => write!(f, "build {} from {}", build.tag, build.dockerfile),
            Self::RegistryLogin { host } => write!(f, "login {host}"),
            Self::PushImage { tag } => write!(f, "push {tag}"),
        }
    }
}

/// The parameterized `docker` job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Job {
    pub name: String,
    pub executor_image: String,
    pub docker_version: String,
    pub packages: Vec<String>,
}

impl Job {
    /// Ordered steps for one execution of the job.
    ///
    /// Publish steps are appended after every build step and only when
    /// `with_deploy` is set; the pushed tag is the last build's tag.
    pub fn steps(&self, with_deploy: bool, builds: &[ImageBuild], login_host: &str) -> Vec<Step> {
        let mut steps = vec![
            Step::UpdatePackageIndex,
            Step::InstallPackages {
                packages: self.packages.clone(),
            },
            Step::Checkout,
            Step::SetupRemoteDocker {
                version: self.docker_version.clone(),
            },
        ];
        steps.extend(builds.iter().cloned().map(Step::BuildImage));

        if with_deploy && let Some(last) = builds.last() {
            steps.push(Step::RegistryLogin {
                host: login_host.to_owned(),
            });
            steps.push(Step::PushImage {
                tag: last.tag.clone(),
            });
        }

        steps
    }
}

/// Branch-name allow-list. An empty list allows every branch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BranchFilter {
    pub only: Vec<String>,
}

impl BranchFilter {
    pub fn only(branch: impl Into<String>) -> Self {
        Self {
            only: vec![branch.into()],
        }
    }

    pub fn allows(&self, branch: &str) -> bool {
        self.only.is_empty() || self.only.iter().any(|b| b == branch)
    }
}

/// A job instantiated inside a workflow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkflowJob {
    /// Instance name (e.g. `auto-build`)
    pub name: String,
    /// Name of the job definition it instantiates
    pub job: String,
    pub with_deploy: bool,
    pub filter: BranchFilter,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Workflow {
    pub name: String,
    pub jobs: Vec<WorkflowJob>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pipeline {
    pub job: Job,
    pub workflow: Workflow,
}

impl Pipeline {
    pub fn from_config(ci: &CiConfig) -> Self {
        let job = Job {
            name: ci.job_name.clone(),
            executor_image: ci.executor_image.clone(),
            docker_version: ci.docker_version.clone(),
            packages: ci.packages.clone(),
        };
        let workflow = Workflow {
            name: ci.workflow_name.clone(),
            jobs: vec![WorkflowJob {
                name: ci.instance_name.clone(),
                job: ci.job_name.clone(),
                with_deploy: true,
                filter: BranchFilter::only(ci.trunk_branch.clone()),
            }],
        };
        Self { job, workflow }
    }

    /// Workflow jobs that a push to `branch` runs.
    pub fn triggered_by(&self, branch: &str) -> Vec<&WorkflowJob> {
        let jobs: Vec<&WorkflowJob> = self
            .workflow
            .jobs
            .iter()
            .filter(|j| j.filter.allows(branch))
            .collect();
        tracing::debug!(branch, triggered = jobs.len(), "workflow filter evaluated");
        jobs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn builds() -> Vec<ImageBuild> {
        vec![
            ImageBuild {
                dockerfile: "Dockerfile.builder".to_owned(),
                tag: "geezer-slots-builder:latest".to_owned(),
            },
            ImageBuild {
                dockerfile: "Dockerfile".to_owned(),
                tag: "ghcr.io/me/geezer-slots:latest".to_owned(),
            },
        ]
    }

    fn pipeline() -> Pipeline {
        Pipeline::from_config(&CiConfig::default())
    }

    #[test]
    fn default_workflow_is_auto_build_on_master() {
        let p = pipeline();
        assert_eq!(p.job.name, "docker");
        assert_eq!(p.workflow.jobs.len(), 1);
        let instance = &p.workflow.jobs[0];
        assert_eq!(instance.name, "auto-build");
        assert_eq!(instance.job, "docker");
        assert!(instance.with_deploy);
        assert_eq!(instance.filter.only, vec!["master"]);
    }

    #[test]
    fn master_push_triggers_deploying_job() {
        let p = pipeline();
        let jobs = p.triggered_by("master");
        assert_eq!(jobs.len(), 1);
        assert!(jobs[0].with_deploy);
    }

    #[test]
    fn other_branches_trigger_nothing() {
        let p = pipeline();
        assert!(p.triggered_by("main").is_empty());
        assert!(p.triggered_by("feature/reels").is_empty());
        assert!(p.triggered_by("Master").is_empty());
        assert!(p.triggered_by("").is_empty());
    }

    #[test]
    fn empty_filter_allows_everything() {
        assert!(BranchFilter::default().allows("anything"));
    }

    #[test]
    fn steps_without_deploy_end_at_build() {
        let steps = pipeline().job.steps(false, &builds(), "ghcr.io");
        assert_eq!(steps.len(), 6);
        assert!(steps.iter().all(|s| !s.is_publish()));
        assert!(matches!(steps.last(), Some(Step::BuildImage(_))));
    }

    #[test]
    fn steps_with_deploy_publish_after_every_build() {
        let steps = pipeline().job.steps(true, &builds(), "ghcr.io");
        assert_eq!(
            steps[..4],
            [
                Step::UpdatePackageIndex,
                Step::InstallPackages {
                    packages: vec!["git".to_owned(), "openssh-client".to_owned()]
                },
                Step::Checkout,
                Step::SetupRemoteDocker {
                    version: "20.10.14".to_owned()
                },
            ]
        );

        let last_build = steps
            .iter()
            .rposition(|s| matches!(s, Step::BuildImage(_)))
            .unwrap();
        let first_publish = steps.iter().position(Step::is_publish).unwrap();
        assert!(last_build < first_publish);
        assert_eq!(
            steps[first_publish..],
            [
                Step::RegistryLogin {
                    host: "ghcr.io".to_owned()
                },
                Step::PushImage {
                    tag: "ghcr.io/me/geezer-slots:latest".to_owned()
                },
            ]
        );
    }

    #[test]
    fn nothing_to_push_without_builds() {
        let steps = pipeline().job.steps(true, &[], "ghcr.io");
        assert!(steps.iter().all(|s| !s.is_publish()));
    }

    #[test]
    fn step_display_is_readable() {
        assert_eq!(
            Step::PushImage {
                tag: "a/b:latest".to_owned()
            }
            .to_string(),
            "push a/b:latest"
        );
        assert_eq!(
            Step::InstallPackages {
                packages: vec!["git".to_owned(), "openssh-client".to_owned()]
            }
            .to_string(),
            "install git openssh-client"
        );
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn only_trunk_triggers(branch in "[a-zA-Z0-9/_.-]{0,30}") {
                let p = pipeline();
                let triggered = !p.triggered_by(&branch).is_empty();
                prop_assert_eq!(triggered, branch == "master");
            }

            #[test]
            fn publish_steps_never_precede_builds(with_deploy in any::<bool>(), n in 0usize..4) {
                let all = builds();
                let chosen: Vec<ImageBuild> = all.into_iter().cycle().take(n).collect();
                let steps = pipeline().job.steps(with_deploy, &chosen, "ghcr.io");
                let seen_publish = steps.iter().position(Step::is_publish);
                if let Some(first) = seen_publish {
                    prop_assert!(with_deploy);
                    prop_assert!(steps[first..].iter().all(Step::is_publish));
                }
            }
        }
    }
}
