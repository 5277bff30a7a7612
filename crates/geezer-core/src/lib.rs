//! Core types and configuration for geezer-slots releases.
//!
//! This crate defines the `geezer.toml` schema ([`GeezerConfig`]), the
//! build variants ([`BuildVariant`]), registry coordinates read from the
//! environment ([`RegistryCoordinates`]), the CI pipeline model
//! ([`Pipeline`], [`Job`], [`Step`]), Cargo package discovery
//! ([`CargoPackage`]), and shared error types.

pub mod cargo;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod registry;
pub mod variant;

pub use cargo::{CargoBinary, CargoPackage};
pub use config::{BuildConfig, CiConfig, GeezerConfig, ProjectConfig, RegistryConfig};
pub use error::{Error, Result};
pub use pipeline::{BranchFilter, ImageBuild, Job, Pipeline, Step, Workflow, WorkflowJob};
pub use registry::{RegistryCoordinates, RegistryCredentials};
pub use variant::BuildVariant;
