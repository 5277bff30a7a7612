use crate::docker::DockerError;
use crate::executor::{DockerExecutor, RealExecutor};
use geezer_core::RegistryCredentials;
use secrecy::ExposeSecret;
use std::path::Path;

/// Docker operations client, parameterized over the executor for testability.
pub struct DockerClient<E: DockerExecutor = RealExecutor> {
    executor: E,
}

impl DockerClient<RealExecutor> {
    pub fn new() -> Self {
        Self {
            executor: RealExecutor,
        }
    }
}

impl Default for DockerClient<RealExecutor> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: DockerExecutor> DockerClient<E> {
    pub fn with_executor(executor: E) -> Self {
        Self { executor }
    }

    // ── Engine ──

    /// Version of the Docker engine the CLI is connected to.
    pub async fn engine_version(&self) -> Result<String, DockerError> {
        let out = self
            .executor
            .exec(&args(["version", "--format", "{{.Server.Version}}"]))
            .await?;
        Ok(out.trim().to_owned())
    }

    /// Confirm the CLI is installed and a daemon is reachable.
    ///
    /// A daemon running a different version than `pinned` is reported, not rejected.
    pub async fn check_engine(&self, pinned: &str) -> Result<EngineReport, PreflightError> {
        let client_version = self
            .executor
            .exec(&args(["version", "--format", "{{.Client.Version}}"]))
            .await
            .map_err(|e| match e {
                DockerError::NotFound { .. } => PreflightError::DockerNotInstalled,
                // `docker version` exits non-zero when only the daemon is missing
                other => PreflightError::DaemonUnreachable { source: other },
            })?;

        let server_version = self
            .engine_version()
            .await
            .map_err(|e| PreflightError::DaemonUnreachable { source: e })?;

        let report = EngineReport {
            client_version: client_version.trim().to_owned(),
            matches_pinned: server_version == pinned,
            server_version,
            pinned_version: pinned.to_owned(),
        };

        if !report.matches_pinned {
            tracing::warn!(
                server = %report.server_version,
                pinned = %report.pinned_version,
                "docker engine version differs from the pinned version"
            );
        }

        Ok(report)
    }

    // ── Doctor ──

    /// Run the docker checks without early return.
    ///
    /// Registry and config checks are filled in by the caller.
    pub async fn doctor(&self, pinned: &str) -> DoctorReport {
        let mut report = DoctorReport::default();

        match self
            .executor
            .exec(&args(["version", "--format", "{{.Client.Version}}"]))
            .await
        {
            Ok(v) => report.docker = CheckResult::ok(v.trim()),
            Err(e) => {
                report.docker = CheckResult::fail(&e.to_string());
                report.daemon = CheckResult::fail("skipped: docker CLI unavailable");
                return report;
            }
        }

        match self.engine_version().await {
            Ok(v) if v == pinned => report.daemon = CheckResult::ok(&v),
            Ok(v) => report.daemon = CheckResult::ok(&format!("{v} (pinned {pinned})")),
            Err(_) => report.daemon = CheckResult::fail("daemon not reachable"),
        }

        report
    }

    // ── Build ──

    pub async fn build_image(
        &self,
        context_dir: &Path,
        dockerfile: &str,
        tag: &str,
    ) -> Result<(), BuildError> {
        let context = context_dir
            .to_str()
            .ok_or_else(|| BuildError::InvalidPath(context_dir.to_path_buf()))?;
        let dockerfile_path = context_dir.join(dockerfile);
        let dockerfile_path = dockerfile_path
            .to_str()
            .ok_or_else(|| BuildError::InvalidPath(dockerfile_path.clone()))?;

        tracing::info!(tag, dockerfile, "building image");
        self.executor
            .exec_streaming(&args(["build", "-f", dockerfile_path, "-t", tag, context]))
            .await
            .map_err(|e| BuildError::Build {
                tag: tag.to_owned(),
                source: e,
            })
    }

    // ── Registry ──

    /// `docker login <host> -u <user> --password-stdin`, password written to stdin.
    pub async fn login(
        &self,
        host: &str,
        credentials: &RegistryCredentials,
    ) -> Result<(), RegistryError> {
        tracing::info!(host, user = %credentials.user, "logging in to registry");
        self.executor
            .exec_with_stdin(
                &args(["login", host, "-u", &credentials.user, "--password-stdin"]),
                credentials.password.expose_secret().as_bytes(),
            )
            .await
            .map_err(|e| RegistryError::Login {
                host: host.to_owned(),
                source: e,
            })?;
        Ok(())
    }

    /// Push `tag`, overwriting whatever the registry holds under it.
    pub async fn push(&self, tag: &str) -> Result<(), RegistryError> {
        tracing::info!(tag, "pushing image");
        self.executor
            .exec_streaming(&args(["push", tag]))
            .await
            .map_err(|e| RegistryError::Push {
                tag: tag.to_owned(),
                source: e,
            })
    }
}

// ── Helper ──

fn args<const N: usize>(a: [&str; N]) -> Vec<String> {
    a.iter().map(|s| (*s).to_owned()).collect()
}

// ── Report types ──

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineReport {
    pub client_version: String,
    pub server_version: String,
    pub pinned_version: String,
    pub matches_pinned: bool,
}

#[derive(Debug, Default)]
pub struct DoctorReport {
    pub docker: CheckResult,
    pub daemon: CheckResult,
    pub registry_coordinates: CheckResult,
    pub registry_credentials: CheckResult,
    pub config_file: CheckResult,
}

impl DoctorReport {
    pub fn all_passed(&self) -> bool {
        self.docker.passed
            && self.daemon.passed
            && self.registry_coordinates.passed
            && self.registry_credentials.passed
            && self.config_file.passed
    }
}

impl std::fmt::Display for DoctorReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let rows = [
            ("docker CLI", &self.docker),
            ("docker daemon", &self.daemon),
            ("registry coordinates", &self.registry_coordinates),
            ("registry credentials", &self.registry_credentials),
            ("geezer.toml", &self.config_file),
        ];
        for (label, check) in rows {
            writeln!(f, "  [{}] {label:<22} {}", check.icon(), check.detail)?;
        }
        Ok(())
    }
}

#[derive(Debug, Default, Clone)]
pub struct CheckResult {
    pub passed: bool,
    pub detail: String,
}

impl CheckResult {
    pub fn ok(detail: &str) -> Self {
        Self {
            passed: true,
            detail: detail.to_owned(),
        }
    }

    pub fn fail(detail: &str) -> Self {
        Self {
            passed: false,
            detail: detail.to_owned(),
        }
    }

    pub fn icon(&self) -> &'static str {
        if self.passed { "OK" } else { "NG" }
    }
}

// ── Error types ──

#[derive(Debug, thiserror::Error)]
pub enum PreflightError {
    #[error("docker CLI not installed; https://docs.docker.com/engine/install/")]
    DockerNotInstalled,

    #[error("docker daemon not reachable; is DOCKER_HOST set or the engine running?")]
    DaemonUnreachable { source: DockerError },
}

#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("build path is not valid UTF-8: {}", .0.display())]
    InvalidPath(std::path::PathBuf),

    #[error("docker build of {tag} failed")]
    Build { tag: String, source: DockerError },
}

#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("docker login to {host} failed")]
    Login { host: String, source: DockerError },

    #[error("docker push of {tag} failed")]
    Push { tag: String, source: DockerError },
}
