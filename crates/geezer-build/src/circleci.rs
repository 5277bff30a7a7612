//! CircleCI 2.1 configuration for the release pipeline.
//!
//! Rendered from the same [`Pipeline`] and [`Step`] list the local runner
//! executes. Registry coordinates stay as shell variables, expanded from the
//! project's CI variable store at run time.

use geezer_core::registry::{REGISTRY_PASS_VAR, REGISTRY_USER_VAR};
use geezer_core::{BuildVariant, Pipeline, RegistryCoordinates, Step};

pub const CIRCLECI_CONFIG_PATH: &str = ".circleci/config.yml";

/// Render `.circleci/config.yml`.
pub fn render_circleci(
    pipeline: &Pipeline,
    variant: BuildVariant,
    binary: &str,
    login_host: &str,
) -> String {
    let publish_tag = RegistryCoordinates::placeholders().image_tag(binary);
    let builds = variant.image_builds(binary, &publish_tag);
    let steps = pipeline.job.steps(true, &builds, login_host);
    let (publish, always): (Vec<&Step>, Vec<&Step>) = steps.iter().partition(|s| s.is_publish());

    let mut out = String::new();
    out.push_str("# Generated by: geezer ci init\nversion: 2.1\n\njobs:\n");
    out.push_str(&format!(
        "  {job}:\n    parameters:\n      with_deploy:\n        type: boolean\n        default: false\n    docker:\n      - image: {image}\n    steps:\n",
        job = pipeline.job.name,
        image = pipeline.job.executor_image,
    ));

    for step in always {
        out.push_str(&render_step(step, 6));
    }

    if !publish.is_empty() {
        out.push_str(
            "      - when:\n          condition: << parameters.with_deploy >>\n          steps:\n",
        );
        for step in publish {
            out.push_str(&render_step(step, 12));
        }
    }

    out.push_str(&format!(
        "\nworkflows:\n  {workflow}:\n    jobs:\n",
        workflow = pipeline.workflow.name
    ));
    for instance in &pipeline.workflow.jobs {
        out.push_str(&format!(
            "      - {job}:\n          name: {name}\n          with_deploy: {with_deploy}\n",
            job = instance.job,
            name = instance.name,
            with_deploy = instance.with_deploy,
        ));
        if !instance.filter.only.is_empty() {
            out.push_str("          filters:\n            branches:\n              only:\n");
            for branch in &instance.filter.only {
                out.push_str(&format!("                - {branch}\n"));
            }
        }
    }

    out
}

fn render_step(step: &Step, indent: usize) -> String {
    let pad = " ".repeat(indent);
    match step {
        Step::UpdatePackageIndex => format!("{pad}- run: apk update\n"),
        Step::InstallPackages { packages } => {
            format!("{pad}- run: apk add {}\n", packages.join(" "))
        }
        Step::Checkout => format!("{pad}- checkout\n"),
        Step::SetupRemoteDocker { version } => {
            format!("{pad}- setup_remote_docker:\n{pad}    version: {version}\n")
        }
        Step::BuildImage(build) => format!(
            "{pad}- run: docker build -f {dockerfile} -t {tag} .\n",
            dockerfile = build.dockerfile,
            tag = build.tag,
        ),
        Step::RegistryLogin { host } => format!(
            "{pad}- run: echo \"${{{REGISTRY_PASS_VAR}}}\" | docker login {host} -u \"${{{REGISTRY_USER_VAR}}}\" --password-stdin\n"
        ),
        Step::PushImage { tag } => format!("{pad}- run: docker push {tag}\n"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geezer_core::CiConfig;

    fn render(variant: BuildVariant) -> String {
        let pipeline = Pipeline::from_config(&CiConfig::default());
        render_circleci(&pipeline, variant, "geezer-slots", "ghcr.io")
    }

    #[test]
    fn declares_boolean_parameter_defaulting_false() {
        let yaml = render(BuildVariant::Gnu);
        assert!(yaml.contains("with_deploy:\n        type: boolean\n        default: false"));
    }

    #[test]
    fn publish_steps_are_gated_and_last() {
        let yaml = render(BuildVariant::Gnu);
        let when = yaml.find("condition: << parameters.with_deploy >>").unwrap();
        let build = yaml.find("docker build").unwrap();
        let login = yaml.find("docker login").unwrap();
        let push = yaml.find("docker push").unwrap();
        assert!(build < when);
        assert!(when < login);
        assert!(login < push);
    }

    #[test]
    fn password_is_piped_on_stdin() {
        let yaml = render(BuildVariant::Gnu);
        assert!(yaml.contains(
            "echo \"${CONTAINER_REGISTRY_PASS}\" | docker login ghcr.io -u \"${CONTAINER_REGISTRY_USER}\" --password-stdin"
        ));
    }

    #[test]
    fn image_tag_uses_registry_variables() {
        let yaml = render(BuildVariant::Gnu);
        assert!(yaml.contains(
            "docker push ${CONTAINER_REGISTRY_URL}/${CONTAINER_REGISTRY}/geezer-slots:latest"
        ));
    }

    #[test]
    fn musl_builds_base_first() {
        let yaml = render(BuildVariant::Musl);
        let base = yaml
            .find("docker build -f Dockerfile.builder -t geezer-slots-builder:latest .")
            .unwrap();
        let runtime = yaml.find("docker build -f Dockerfile -t ").unwrap();
        assert!(base < runtime);
    }

    #[test]
    fn workflow_runs_auto_build_on_master_only() {
        let yaml = render(BuildVariant::Musl);
        let workflows = yaml.split("workflows:").nth(1).unwrap();
        assert!(workflows.contains("- docker:\n          name: auto-build\n          with_deploy: true"));
        assert!(workflows.contains("only:\n                - master\n"));
    }

    #[test]
    fn environment_steps_precede_checkout() {
        let yaml = render(BuildVariant::Musl);
        let update = yaml.find("- run: apk update").unwrap();
        let install = yaml.find("- run: apk add git openssh-client").unwrap();
        let checkout = yaml.find("- checkout").unwrap();
        let remote = yaml.find("- setup_remote_docker:\n          version: 20.10.14").unwrap();
        assert!(update < install && install < checkout && checkout < remote);
    }
}
