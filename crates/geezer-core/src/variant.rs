use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::pipeline::ImageBuild;

/// Rust toolchain pinned inside every builder stage.
pub const TOOLCHAIN_VERSION: &str = "1.88.0";

/// `<binary>-builder:latest`, the local tag of the musl builder base.
pub fn builder_tag(binary: &str) -> String {
    format!("{binary}-builder:latest")
}

/// The two release pipelines for the same binary.
///
/// Target triple, toolchain and base images are fixed per variant; only the
/// choice of variant is configurable.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BuildVariant {
    /// Statically linked, Alpine runtime, reusable builder base with `ONBUILD` triggers.
    #[default]
    Musl,
    /// Dynamically linked, Ubuntu runtime, inline build.
    Gnu,
}

impl BuildVariant {
    pub const fn target_triple(self) -> &'static str {
        match self {
            Self::Musl => "x86_64-unknown-linux-musl",
            Self::Gnu => "x86_64-unknown-linux-gnu",
        }
    }

    pub const fn toolchain(self) -> &'static str {
        TOOLCHAIN_VERSION
    }

    pub const fn builder_image(self) -> &'static str {
        match self {
            Self::Musl => "alpine:3.20",
            Self::Gnu => "ubuntu:22.04",
        }
    }

    pub const fn runtime_image(self) -> &'static str {
        match self {
            Self::Musl => "alpine:3.20",
            Self::Gnu => "ubuntu:22.04",
        }
    }

    /// Local tag of the builder base image, for variants that use one.
    pub fn builder_base_tag(self, binary: &str) -> Option<String> {
        match self {
            Self::Musl => Some(builder_tag(binary)),
            Self::Gnu => None,
        }
    }

    /// Dockerfiles this variant renders, in build order.
    pub fn dockerfile_names(self) -> &'static [&'static str] {
        match self {
            Self::Musl => &["Dockerfile.builder", "Dockerfile"],
            Self::Gnu => &["Dockerfile"],
        }
    }

    /// Image builds in order. The last entry produces `publish_tag`.
    pub fn image_builds(self, binary: &str, publish_tag: &str) -> Vec<ImageBuild> {
        let mut builds = Vec::new();
        if let Some(base) = self.builder_base_tag(binary) {
            builds.push(ImageBuild {
                dockerfile: "Dockerfile.builder".to_owned(),
                tag: base,
            });
        }
        builds.push(ImageBuild {
            dockerfile: "Dockerfile".to_owned(),
            tag: publish_tag.to_owned(),
        });
        builds
    }
}

impl fmt::Display for BuildVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Musl => f.write_str("musl"),
            Self::Gnu => f.write_str("gnu"),
        }
    }
}

impl FromStr for BuildVariant {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "musl" => Ok(Self::Musl),
            "gnu" => Ok(Self::Gnu),
            other => Err(crate::Error::UnknownVariant(other.to_owned())),
        }
    }
}
