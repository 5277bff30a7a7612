use std::process::{Output, Stdio};

use tokio::io::AsyncWriteExt;
use tokio::process::Command;

use crate::docker::DockerError;

/// Abstraction over docker CLI execution for testability.
///
/// Production code uses [`RealExecutor`], tests use mockall-generated mocks.
#[allow(async_fn_in_trait)]
pub trait DockerExecutor: Send + Sync {
    /// Run a docker command and capture stdout.
    async fn exec(&self, args: &[String]) -> Result<String, DockerError>;

    /// Run a docker command with its output attached to the terminal.
    async fn exec_streaming(&self, args: &[String]) -> Result<(), DockerError>;

    /// Run a docker command with `stdin_data` piped to it. The data is never logged.
    async fn exec_with_stdin(&self, args: &[String], stdin_data: &[u8])
    -> Result<String, DockerError>;
}

/// Runs the `docker` binary found on `PATH`.
pub struct RealExecutor;

impl RealExecutor {
    fn command(args: &[String]) -> Command {
        let mut cmd = Command::new("docker");
        cmd.args(args).kill_on_drop(true);
        cmd
    }
}

impl DockerExecutor for RealExecutor {
    async fn exec(&self, args: &[String]) -> Result<String, DockerError> {
        tracing::debug!(?args, "docker");
        let output = Self::command(args)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(spawn_failed)?;
        captured(args, output)
    }

    async fn exec_streaming(&self, args: &[String]) -> Result<(), DockerError> {
        tracing::debug!(?args, "docker (streaming)");
        let status = Self::command(args)
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .await
            .map_err(spawn_failed)?;

        if status.success() {
            return Ok(());
        }
        Err(DockerError::CommandFailed {
            args: args.to_vec(),
            stderr: format!("exit code: {status}"),
        })
    }

    async fn exec_with_stdin(
        &self,
        args: &[String],
        stdin_data: &[u8],
    ) -> Result<String, DockerError> {
        tracing::debug!(?args, stdin_bytes = stdin_data.len(), "docker (stdin)");
        let mut child = Self::command(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(spawn_failed)?;

        if let Some(mut stdin) = child.stdin.take() {
            let write_err = |source| DockerError::StdinWrite { source };
            stdin.write_all(stdin_data).await.map_err(write_err)?;
            stdin.shutdown().await.map_err(write_err)?;
        }

        let output = child.wait_with_output().await.map_err(spawn_failed)?;
        captured(args, output)
    }
}

fn spawn_failed(source: std::io::Error) -> DockerError {
    DockerError::NotFound { source }
}

fn captured(args: &[String], output: Output) -> Result<String, DockerError> {
    if !output.status.success() {
        return Err(DockerError::CommandFailed {
            args: args.to_vec(),
            stderr: String::from_utf8_lossy(&output.stderr).trim_end().to_owned(),
        });
    }
    String::from_utf8(output.stdout).map_err(|source| DockerError::InvalidUtf8 { source })
}
