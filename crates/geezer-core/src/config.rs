use serde::{Deserialize, Serialize};

use crate::variant::BuildVariant;

/// geezer.toml configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GeezerConfig {
    #[serde(default)]
    pub project: ProjectConfig,
    #[serde(default)]
    pub build: BuildConfig,
    #[serde(default)]
    pub registry: RegistryConfig,
    #[serde(default)]
    pub ci: CiConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectConfig {
    /// Binary shipped in the image and used as the image name
    #[serde(default = "default_binary")]
    pub binary: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BuildConfig {
    /// Which release pipeline to render (`musl` or `gnu`)
    #[serde(default)]
    pub variant: BuildVariant,
    /// Additional system packages installed in the builder stage
    #[serde(default)]
    pub extra_packages: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// Host passed to `docker login`
    #[serde(default = "default_registry_host")]
    pub host: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CiConfig {
    /// The only branch allowed to trigger the workflow
    #[serde(default = "default_trunk_branch")]
    pub trunk_branch: String,
    /// Name of the parameterized job
    #[serde(default = "default_job_name")]
    pub job_name: String,
    /// Name of the workflow binding the job to the trunk branch
    #[serde(default = "default_workflow_name")]
    pub workflow_name: String,
    /// Name of the job instance inside the workflow
    #[serde(default = "default_instance_name")]
    pub instance_name: String,
    /// Image of the job's own container
    #[serde(default = "default_executor_image")]
    pub executor_image: String,
    /// Pinned engine version of the remote Docker daemon
    #[serde(default = "default_docker_version")]
    pub docker_version: String,
    /// Packages installed into the job container before checkout
    #[serde(default = "default_ci_packages")]
    pub packages: Vec<String>,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            binary: default_binary(),
        }
    }
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            host: default_registry_host(),
        }
    }
}

impl Default for CiConfig {
    fn default() -> Self {
        Self {
            trunk_branch: default_trunk_branch(),
            job_name: default_job_name(),
            workflow_name: default_workflow_name(),
            instance_name: default_instance_name(),
            executor_image: default_executor_image(),
            docker_version: default_docker_version(),
            packages: default_ci_packages(),
        }
    }
}

impl GeezerConfig {
    /// Load from geezer.toml at the given path, or return defaults if not found.
    pub fn load(project_dir: &std::path::Path) -> crate::Result<Self> {
        let config_path = Self::path_in(project_dir);
        if config_path.exists() {
            let content =
                std::fs::read_to_string(&config_path).map_err(|e| crate::Error::ConfigLoad {
                    path: config_path.clone(),
                    source: e,
                })?;
            let config: Self =
                toml::from_str(&content).map_err(|e| crate::Error::ConfigParse {
                    path: config_path.clone(),
                    source: e,
                })?;
            tracing::debug!(path = %config_path.display(), variant = %config.build.variant, "config loaded");
            Ok(config)
        } else {
            tracing::debug!(path = %config_path.display(), "no config file; using defaults");
            Ok(Self::default())
        }
    }

    pub fn path_in(project_dir: &std::path::Path) -> std::path::PathBuf {
        project_dir.join("geezer.toml")
    }
}

fn default_binary() -> String {
    "geezer-slots".to_owned()
}

fn default_registry_host() -> String {
    "ghcr.io".to_owned()
}

fn default_trunk_branch() -> String {
    "master".to_owned()
}

fn default_job_name() -> String {
    "docker".to_owned()
}

fn default_workflow_name() -> String {
    "build".to_owned()
}

fn default_instance_name() -> String {
    "auto-build".to_owned()
}

fn default_executor_image() -> String {
    "docker:20.10.14".to_owned()
}

fn default_docker_version() -> String {
    "20.10.14".to_owned()
}

fn default_ci_packages() -> Vec<String> {
    vec!["git".to_owned(), "openssh-client".to_owned()]
}
