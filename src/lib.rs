//! inspack - build-and-package pipeline for the embedded-inspector desktop app
//!
//! This library drives the two-stage pipeline that turns the application source
//! tree (including its vendored inspector UI payload) into a platform-specific
//! distributable: dependency provisioning followed by packaging and relocation
//! of the packager's output to the published location.
//!
//! # Core Concepts
//!
//! - **Provisioning**: ensuring the dependency tree exists under the working
//!   directory before a build, by running the package manager against a chosen
//!   registry mirror as a monitored child process
//! - **Packaging**: invoking the external packaging tool for a resolved
//!   platform target and validating that it actually produced output
//! - **Relocation**: replacing the published output directory with the
//!   packager's staging directory, remove-then-move, both steps checked
//!
//! # Example Usage
//!
//! ```ignore
//! use inspack::{BuildPipeline, InspackConfig, Mirror, PlatformTarget};
//! use std::path::Path;
//! use tokio::sync::watch;
//!
//! async fn build(root: &Path) -> Result<(), Box<dyn std::error::Error>> {
//!     let config = InspackConfig::default();
//!     let pipeline = BuildPipeline::new(root, config)?;
//!
//!     let (_cancel_tx, cancel_rx) = watch::channel(false);
//!     let summary = pipeline
//!         .run(PlatformTarget::Mac, Some(Mirror::Npm), cancel_rx)
//!         .await?;
//!
//!     println!("Artifact published to {}", summary.artifact_path.display());
//!     Ok(())
//! }
//! ```
//!
//! # Project Structure
//!
//! - [`provision`]: mirror selection and the monitored install subprocess
//! - [`pipeline`]: the build orchestrator, packager invocation and relocation
//! - [`config`]: environment-driven configuration and project path layout
//! - [`cli`]: command-line surface and run-summary formatting

// Public modules
pub mod cli;
pub mod config;
pub mod pipeline;
pub mod provision;
pub mod util;

// Re-export key types for convenient access
pub use config::{ConfigError, InspackConfig, ProjectPaths};
pub use pipeline::{
    package, resolve_platform, ArtifactLocation, BuildPipeline, BuildResult, PackageError,
    PipelineError, PlatformTarget, RunSummary,
};
pub use provision::{install, needs_provisioning, InstallRequest, Mirror, ProvisionError};
pub use util::{init_default, init_from_env, init_logging, LoggingConfig};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_exists() {
        assert!(!VERSION.is_empty());
    }

    #[test]
    fn test_name_is_inspack() {
        assert_eq!(NAME, "inspack");
    }
}
