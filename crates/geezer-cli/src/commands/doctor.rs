use geezer_core::{CiConfig, GeezerConfig, RegistryCoordinates, RegistryCredentials};
use geezer_docker::{CheckResult, DockerClient};
use std::path::Path;

pub async fn doctor() -> anyhow::Result<()> {
    let project_dir = Path::new(".");
    let (pinned, config_file) = match GeezerConfig::load(project_dir) {
        Ok(config) if GeezerConfig::path_in(project_dir).exists() => {
            (config.ci.docker_version, CheckResult::ok("Found"))
        }
        Ok(config) => (
            config.ci.docker_version,
            CheckResult::ok("Not found; using defaults"),
        ),
        Err(e) => (
            CiConfig::default().docker_version,
            CheckResult::fail(&e.to_string()),
        ),
    };

    let client = DockerClient::new();
    let mut report = client.doctor(&pinned).await;
    report.config_file = config_file;

    report.registry_coordinates = match RegistryCoordinates::from_env() {
        Ok(coords) => CheckResult::ok(&format!("{}/{}", coords.url, coords.namespace)),
        Err(e) => CheckResult::fail(&e.to_string()),
    };
    report.registry_credentials = match RegistryCredentials::from_env() {
        Ok(creds) => CheckResult::ok(&format!("user {}", creds.user)),
        Err(e) => CheckResult::fail(&e.to_string()),
    };

    println!();
    println!("{report}");

    if !report.all_passed() {
        anyhow::bail!("some checks failed; see above for details");
    }

    Ok(())
}
