/// Failure running the `docker` binary itself.
#[derive(Debug, thiserror::Error)]
pub enum DockerError {
    #[error("docker CLI not found; install: https://docs.docker.com/engine/install/")]
    NotFound { source: std::io::Error },

    #[error("`docker {}` failed\n{stderr}", args.join(" "))]
    CommandFailed { args: Vec<String>, stderr: String },

    #[error("docker printed non-UTF-8 output")]
    InvalidUtf8 { source: std::string::FromUtf8Error },

    #[error("could not write to docker's stdin")]
    StdinWrite { source: std::io::Error },
}
