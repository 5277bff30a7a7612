//! Build files, build context, and artifact selection for geezer-slots.
//!
//! # Release pipeline
//!
//! ```text
//! geezer release
//!   1. Branch filter ── only the trunk branch runs the job
//!   2. Dockerfiles   ── DockerfileGenerator::render() (or ejected copies)
//!   3. Checkout      ── git ls-files → .geezer-bundle/
//!   4. Build         ── docker build per ImageBuild, in order
//!   5. Publish       ── docker login --password-stdin, docker push
//! ```
//!
//! # Variants
//!
//! - **musl**: a builder base image carries the toolchain and `ONBUILD`
//!   triggers; the runtime Dockerfile starts `FROM` it, which runs the
//!   copy, build and artifact selection, then ships on Alpine.
//! - **gnu**: one Dockerfile builds inline and ships on Ubuntu.
//!
//! Both runtimes receive only the files [`artifact::select_artifacts`]
//! would pick, and start `/app/<binary>`.

pub mod artifact;
pub mod bundle;
pub mod circleci;
pub mod dockerfile;
pub mod eject;

pub use dockerfile::{DockerfileGenerator, RenderedFile};
