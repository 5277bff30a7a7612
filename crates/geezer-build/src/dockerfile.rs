use geezer_core::variant::builder_tag;
use geezer_core::{BuildConfig, BuildVariant};

use crate::artifact::find_expression;

/// Directory inside the builder stage that receives the selected artifacts.
const OUT_DIR: &str = "/out";

/// A generated build file and the name it is written under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedFile {
    pub name: String,
    pub content: String,
}

/// Renders the Dockerfile(s) for the configured [`BuildVariant`].
pub struct DockerfileGenerator<'a> {
    config: &'a BuildConfig,
    binary: &'a str,
}

impl<'a> DockerfileGenerator<'a> {
    pub fn new(config: &'a BuildConfig, binary: &'a str) -> Self {
        Self { config, binary }
    }

    /// All files for the variant, in build order.
    pub fn render(&self) -> Vec<RenderedFile> {
        let variant = self.config.variant;
        let files: Vec<RenderedFile> = match variant {
            BuildVariant::Musl => vec![
                RenderedFile {
                    name: "Dockerfile.builder".to_owned(),
                    content: self.render_musl_builder_base(),
                },
                RenderedFile {
                    name: "Dockerfile".to_owned(),
                    content: self.render_musl_runtime(),
                },
            ],
            BuildVariant::Gnu => vec![RenderedFile {
                name: "Dockerfile".to_owned(),
                content: self.render_gnu(),
            }],
        };
        tracing::debug!(variant = %variant, files = files.len(), "dockerfiles rendered");
        files
    }

    fn render_musl_builder_base(&self) -> String {
        let variant = BuildVariant::Musl;
        let target = variant.target_triple();
        let packages = self.packages(&["build-base", "curl", "findutils", "ca-certificates"]);

        format!(
            r#"# === Builder base: {target} toolchain ===
# Images built FROM this one run the ONBUILD steps: copy, build, select.
FROM {image}
RUN apk add --no-cache {packages}
{rustup}
WORKDIR /src
ONBUILD COPY . .
ONBUILD RUN cargo build --release --target {target}
ONBUILD RUN {select}
"#,
            image = variant.builder_image(),
            rustup = rustup(variant),
            select = find_expression(&format!("target/{target}/release"), OUT_DIR),
        )
    }

    fn render_musl_runtime(&self) -> String {
        let variant = BuildVariant::Musl;
        let base_tag = builder_tag(self.binary);

        format!(
            r#"# === Stage 1: Builder (runs the builder base ONBUILD steps) ===
FROM {base_tag} AS builder

# === Stage 2: Runtime ===
FROM {runtime}
RUN apk add --no-cache ca-certificates
{runtime_tail}"#,
            runtime = variant.runtime_image(),
            runtime_tail = self.runtime_tail(),
        )
    }

    fn render_gnu(&self) -> String {
        let variant = BuildVariant::Gnu;
        let target = variant.target_triple();
        let packages = self.packages(&["build-essential", "curl", "ca-certificates"]);

        format!(
            r#"# === Stage 1: Builder ===
FROM {image} AS builder
RUN apt-get update && apt-get install -y --no-install-recommends {packages} && rm -rf /var/lib/apt/lists/*
{rustup}
WORKDIR /src
COPY . .
RUN cargo build --release --target {target}
RUN {select}

# === Stage 2: Runtime ===
FROM {runtime}
RUN apt-get update && apt-get install -y --no-install-recommends ca-certificates && rm -rf /var/lib/apt/lists/*
{runtime_tail}"#,
            image = variant.builder_image(),
            rustup = rustup(variant),
            select = find_expression(&format!("target/{target}/release"), OUT_DIR),
            runtime = variant.runtime_image(),
            runtime_tail = self.runtime_tail(),
        )
    }

    fn runtime_tail(&self) -> String {
        format!(
            "COPY --from=builder {OUT_DIR}/ /app/\nENTRYPOINT [\"/app/{binary}\"]\n",
            binary = self.binary,
        )
    }

    fn packages(&self, base: &[&str]) -> String {
        base.iter()
            .map(|p| (*p).to_owned())
            .chain(self.config.extra_packages.iter().cloned())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

fn rustup(variant: BuildVariant) -> String {
    format!(
        r#"RUN curl --proto '=https' --tlsv1.2 -sSf https://sh.rustup.rs | sh -s -- -y --profile minimal --default-toolchain {toolchain}
ENV PATH="/root/.cargo/bin:${{PATH}}"
RUN rustup target add {target}"#,
        toolchain = variant.toolchain(),
        target = variant.target_triple(),
    )
}
