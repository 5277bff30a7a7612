use geezer_core::RegistryCredentials;
use geezer_docker::client::{BuildError, DockerClient, PreflightError, RegistryError};
use geezer_docker::docker::DockerError;
use geezer_docker::executor::DockerExecutor;
use mockall::mock;
use std::path::Path;

mock! {
    Executor {}

    impl DockerExecutor for Executor {
        async fn exec(&self, args: &[String]) -> Result<String, DockerError>;
        async fn exec_streaming(&self, args: &[String]) -> Result<(), DockerError>;
        async fn exec_with_stdin(
            &self,
            args: &[String],
            stdin_data: &[u8],
        ) -> Result<String, DockerError>;
    }
}

fn failed(args: &[String]) -> DockerError {
    DockerError::CommandFailed {
        args: args.to_vec(),
        stderr: "boom".to_owned(),
    }
}

fn credentials() -> RegistryCredentials {
    RegistryCredentials::from_lookup(|k| match k {
        "CONTAINER_REGISTRY_USER" => Some("deployer".to_owned()),
        "CONTAINER_REGISTRY_PASS" => Some("hunter2".to_owned()),
        _ => None,
    })
    .unwrap()
}

// ── Engine Tests ──

#[tokio::test]
async fn check_engine_reports_versions() {
    let mut mock = MockExecutor::new();
    mock.expect_exec()
        .withf(|args| args.iter().any(|a| a.contains(".Client.Version")))
        .returning(|_| Ok("20.10.14\n".to_owned()));
    mock.expect_exec()
        .withf(|args| args.iter().any(|a| a.contains(".Server.Version")))
        .returning(|_| Ok("20.10.14\n".to_owned()));

    let client = DockerClient::with_executor(mock);
    let report = client.check_engine("20.10.14").await.unwrap();

    assert_eq!(report.client_version, "20.10.14");
    assert_eq!(report.server_version, "20.10.14");
    assert!(report.matches_pinned);
}

#[tokio::test]
async fn check_engine_tolerates_version_mismatch() {
    let mut mock = MockExecutor::new();
    mock.expect_exec()
        .withf(|args| args.iter().any(|a| a.contains(".Client.Version")))
        .returning(|_| Ok("24.0.7".to_owned()));
    mock.expect_exec()
        .withf(|args| args.iter().any(|a| a.contains(".Server.Version")))
        .returning(|_| Ok("24.0.7".to_owned()));

    let client = DockerClient::with_executor(mock);
    let report = client.check_engine("20.10.14").await.unwrap();

    assert!(!report.matches_pinned);
    assert_eq!(report.pinned_version, "20.10.14");
}

#[tokio::test]
async fn check_engine_docker_not_installed() {
    let mut mock = MockExecutor::new();
    mock.expect_exec().returning(|_| {
        Err(DockerError::NotFound {
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "not found"),
        })
    });

    let client = DockerClient::with_executor(mock);
    let err = client.check_engine("20.10.14").await.unwrap_err();

    assert!(matches!(err, PreflightError::DockerNotInstalled));
}

#[tokio::test]
async fn check_engine_daemon_unreachable() {
    let mut mock = MockExecutor::new();
    mock.expect_exec()
        .withf(|args| args.iter().any(|a| a.contains(".Client.Version")))
        .returning(|_| Ok("20.10.14".to_owned()));
    mock.expect_exec()
        .withf(|args| args.iter().any(|a| a.contains(".Server.Version")))
        .returning(|args| Err(failed(args)));

    let client = DockerClient::with_executor(mock);
    let err = client.check_engine("20.10.14").await.unwrap_err();

    assert!(matches!(err, PreflightError::DaemonUnreachable { .. }));
}

// ── Build Tests ──

#[tokio::test]
async fn build_image_passes_dockerfile_and_tag() {
    let mut mock = MockExecutor::new();
    mock.expect_exec_streaming()
        .withf(|args| {
            args[0] == "build"
                && args.windows(2).any(|w| w[0] == "-f" && w[1] == "/ctx/Dockerfile")
                && args.windows(2).any(|w| w[0] == "-t" && w[1] == "ghcr.io/acme/geezer-slots")
                && args.last().map(String::as_str) == Some("/ctx")
        })
        .times(1)
        .returning(|_| Ok(()));

    let client = DockerClient::with_executor(mock);
    client
        .build_image(Path::new("/ctx"), "Dockerfile", "ghcr.io/acme/geezer-slots")
        .await
        .unwrap();
}

#[tokio::test]
async fn build_image_failure_names_tag() {
    let mut mock = MockExecutor::new();
    mock.expect_exec_streaming().returning(|args| Err(failed(args)));

    let client = DockerClient::with_executor(mock);
    let err = client
        .build_image(Path::new("/ctx"), "Dockerfile", "geezer-slots-builder:latest")
        .await
        .unwrap_err();

    match err {
        BuildError::Build { tag, .. } => assert_eq!(tag, "geezer-slots-builder:latest"),
        other => panic!("unexpected error: {other:?}"),
    }
}

// ── Registry Tests ──

#[tokio::test]
async fn login_sends_password_via_stdin_only() {
    let mut mock = MockExecutor::new();
    mock.expect_exec_with_stdin()
        .withf(|args, stdin| {
            args[0] == "login"
                && args[1] == "ghcr.io"
                && args.contains(&"--password-stdin".to_owned())
                && args.contains(&"deployer".to_owned())
                && !args.iter().any(|a| a.contains("hunter2"))
                && stdin == b"hunter2"
        })
        .times(1)
        .returning(|_, _| Ok("Login Succeeded\n".to_owned()));

    let client = DockerClient::with_executor(mock);
    client.login("ghcr.io", &credentials()).await.unwrap();
}

#[tokio::test]
async fn login_failure_names_host() {
    let mut mock = MockExecutor::new();
    mock.expect_exec_with_stdin()
        .returning(|args, _| Err(failed(args)));

    let client = DockerClient::with_executor(mock);
    let err = client.login("ghcr.io", &credentials()).await.unwrap_err();

    assert!(matches!(err, RegistryError::Login { ref host, .. } if host == "ghcr.io"));
}

#[tokio::test]
async fn push_uses_tag() {
    let mut mock = MockExecutor::new();
    mock.expect_exec_streaming()
        .withf(|args| args == ["push".to_owned(), "ghcr.io/acme/geezer-slots".to_owned()])
        .times(1)
        .returning(|_| Ok(()));

    let client = DockerClient::with_executor(mock);
    client.push("ghcr.io/acme/geezer-slots").await.unwrap();
}

// ── Doctor Tests ──

#[tokio::test]
async fn doctor_without_docker_skips_daemon() {
    let mut mock = MockExecutor::new();
    mock.expect_exec().times(1).returning(|_| {
        Err(DockerError::NotFound {
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "not found"),
        })
    });

    let client = DockerClient::with_executor(mock);
    let report = client.doctor("20.10.14").await;

    assert!(!report.docker.passed);
    assert!(!report.daemon.passed);
    assert!(report.daemon.detail.contains("skipped"));
    assert!(!report.all_passed());
}

#[tokio::test]
async fn doctor_notes_version_drift() {
    let mut mock = MockExecutor::new();
    mock.expect_exec()
        .withf(|args| args.iter().any(|a| a.contains(".Client.Version")))
        .returning(|_| Ok("24.0.7".to_owned()));
    mock.expect_exec()
        .withf(|args| args.iter().any(|a| a.contains(".Server.Version")))
        .returning(|_| Ok("24.0.7".to_owned()));

    let client = DockerClient::with_executor(mock);
    let report = client.doctor("20.10.14").await;

    assert!(report.docker.passed);
    assert!(report.daemon.passed);
    assert_eq!(report.daemon.detail, "24.0.7 (pinned 20.10.14)");
}
