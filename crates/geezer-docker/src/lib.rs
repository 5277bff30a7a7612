pub mod client;
pub mod docker;
pub mod executor;
pub mod runner;

pub use client::{
    BuildError, CheckResult, DockerClient, DoctorReport, EngineReport, PreflightError,
    RegistryError,
};
pub use executor::{DockerExecutor, RealExecutor};
pub use runner::{JobError, JobOutcome, JobRunner, ReleaseContext, StepError};
