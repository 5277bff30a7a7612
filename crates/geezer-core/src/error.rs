use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("could not read config file {path}")]
    ConfigLoad {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config at {path}")]
    ConfigParse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("missing environment variable: {0}")]
    MissingEnvVar(String),

    #[error("unknown build variant {0:?}; expected \"musl\" or \"gnu\"")]
    UnknownVariant(String),

    // ── Cargo package discovery ──
    #[error("cargo metadata failed for {manifest_path}: {detail}")]
    CargoMetadata {
        manifest_path: PathBuf,
        detail: String,
    },

    #[error("project directory {path} does not resolve")]
    ProjectDirResolve {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error(
        "no package found in {dir}; workspace members: {}",
        format_members(workspace_members)
    )]
    NoPackageInDir {
        dir: PathBuf,
        workspace_members: Vec<String>,
    },

    #[error("binary '{binary}' not found; available: {}", format_members(available))]
    BinaryNotFound {
        binary: String,
        available: Vec<String>,
    },
}

fn format_members(members: &[String]) -> String {
    match members {
        [] => "(none)".to_owned(),
        names => names.join(", "),
    }
}
