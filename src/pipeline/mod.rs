//! Build orchestration
//!
//! This module provides the [`BuildPipeline`] that produces a finished,
//! packaged artifact at the project's published output location.
//!
//! # Architecture
//!
//! The pipeline is a thin, strictly sequential orchestration layer:
//! 1. Decide whether provisioning is needed (dependency tree absent or empty)
//! 2. Optionally run the dependency provisioner (monitored install subprocess)
//! 3. Invoke the external packager for the resolved platform target
//! 4. Validate that the packager actually produced its staging directory
//! 5. Relocate the staging directory to the published location
//!
//! The first failing stage aborts all subsequent stages; its error is returned
//! as a single [`PipelineError`] and nothing is retried. Relocation is the one
//! place where two filesystem operations must be sequenced: the removal of the
//! previous published directory is awaited to completion before the move
//! begins, and both failures are surfaced.

pub mod package;

pub use package::{package, resolve_platform, BuildResult, PackageError, PlatformTarget};

use std::io;
use std::path::{Path, PathBuf};
use std::time::Instant;

use serde::Serialize;
use thiserror::Error;
use tokio::sync::watch;
use tracing::{debug, info};

use crate::config::{InspackConfig, ProjectPaths};
use crate::provision::{self, InstallRequest, Mirror, ProvisionError};

/// Errors that can occur during a pipeline run
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The project root does not exist
    #[error("Project path not found: {}", .0.display())]
    ProjectNotFound(PathBuf),

    /// The application source directory is missing under the project root
    #[error("Application directory not found: {}", .0.display())]
    WorkingDirMissing(PathBuf),

    /// Dependency provisioning failed
    #[error(transparent)]
    Provision(#[from] ProvisionError),

    /// The external packager failed or produced nothing
    #[error(transparent)]
    Packaging(#[from] PackageError),

    /// Removing or moving the output directory failed
    #[error("Failed to {} {}: {}", .action, .path.display(), .source)]
    Relocation {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl PipelineError {
    /// Returns a user-facing error message with troubleshooting hints
    pub fn help_message(&self) -> String {
        match self {
            PipelineError::ProjectNotFound(path) => format!(
                "Error: Project path not found\nPath: {}\n\n\
                Help: The specified path does not exist. Please check:\n\
                - Is the path correct?\n\
                - Do you have permission to access it?",
                path.display()
            ),
            PipelineError::WorkingDirMissing(path) => format!(
                "Error: Application directory not found\nPath: {}\n\n\
                Help: The project root must contain the application source\n\
                directory (INSPACK_APP_DIR, default \"app\") with its\n\
                package.json and the vendored inspector UI tree.",
                path.display()
            ),
            PipelineError::Provision(ProvisionError::PromptUnavailable) => format!(
                "Error: {self}\n\n\
                Help: stdin is not a terminal. Re-run with --mirror npm (or\n\
                cnpm/taobao) to choose the registry non-interactively."
            ),
            PipelineError::Provision(ProvisionError::InstallFailed { .. }) => format!(
                "Error: {self}\n\n\
                Help: The package manager output above usually names the\n\
                failing dependency. A different --mirror sometimes helps with\n\
                registry outages."
            ),
            PipelineError::Packaging(PackageError::Launch { program, .. }) => format!(
                "Error: {self}\n\n\
                Help: {program:?} was not found or could not run. Install it\n\
                or point INSPACK_PACKAGER at the right executable."
            ),
            _ => format!("Error: {self}"),
        }
    }

    /// Process exit code for this failure; interrupts use the conventional 130.
    pub fn exit_code(&self) -> i32 {
        match self {
            PipelineError::Provision(ProvisionError::Interrupted) => 130,
            _ => 1,
        }
    }
}

/// Where a successful build's output sits and where it must end up. Exists
/// only after a successful packager run; consumed by [`BuildPipeline::finalize`].
#[derive(Debug, Clone)]
pub struct ArtifactLocation {
    pub source: PathBuf,
    pub destination: PathBuf,
}

/// Summary of one completed pipeline run
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    /// Platform the artifact was packaged for
    pub platform: PlatformTarget,
    /// Whether dependency provisioning ran as part of this build
    pub provisioned: bool,
    /// Published artifact directory
    pub artifact_path: PathBuf,
    /// Wall-clock duration of the run in milliseconds
    pub duration_ms: u64,
}

/// Drives one full build run against a project tree.
#[derive(Debug)]
pub struct BuildPipeline {
    config: InspackConfig,
    paths: ProjectPaths,
}

impl BuildPipeline {
    /// Creates a pipeline for the project at `root`.
    ///
    /// Fails early when the root or the application source directory is
    /// missing; every later stage assumes both exist.
    pub fn new(root: &Path, config: InspackConfig) -> Result<Self, PipelineError> {
        if !root.is_dir() {
            return Err(PipelineError::ProjectNotFound(root.to_path_buf()));
        }

        let paths = ProjectPaths::new(root, &config);
        if !paths.working_dir.is_dir() {
            return Err(PipelineError::WorkingDirMissing(paths.working_dir.clone()));
        }

        Ok(Self { config, paths })
    }

    pub fn paths(&self) -> &ProjectPaths {
        &self.paths
    }

    /// Ensures dependencies are present, then returns whether an install ran.
    ///
    /// `mirror` is the injected selection; `None` falls back to the
    /// interactive prompt. The cancellation token covers the install wait.
    pub async fn provision(
        &self,
        mirror: Option<Mirror>,
        cancel: watch::Receiver<bool>,
    ) -> Result<bool, PipelineError> {
        if !provision::needs_provisioning(&self.paths.dependency_dir) {
            debug!(
                dir = %self.paths.dependency_dir.display(),
                "Dependencies already present, skipping provisioning"
            );
            return Ok(false);
        }

        let mirror = match mirror {
            Some(mirror) => mirror,
            None => provision::select_mirror()?,
        };

        let request = InstallRequest::new(mirror, self.paths.working_dir.clone(), &self.config);
        provision::install(request, cancel).await?;
        Ok(true)
    }

    /// Runs the full pipeline: provision if needed, package, validate,
    /// relocate. Any stage's failure aborts the rest.
    pub async fn run(
        &self,
        target: PlatformTarget,
        mirror: Option<Mirror>,
        cancel: watch::Receiver<bool>,
    ) -> Result<RunSummary, PipelineError> {
        let start = Instant::now();
        info!(
            project = %self.paths.root.display(),
            platform = %target,
            "Starting build pipeline"
        );

        let provisioned = self.provision(mirror, cancel).await?;

        let result = package::package(target, &self.paths.working_dir, &self.config.packager_program)?;

        if !self.paths.staging_dir.is_dir() {
            return Err(PackageError::MissingArtifact {
                path: self.paths.staging_dir.clone(),
            }
            .into());
        }

        let artifact = ArtifactLocation {
            source: self.paths.staging_dir.clone(),
            destination: self.paths.publish_dir.clone(),
        };
        self.finalize(&result, artifact).await?;

        info!(
            artifact = %self.paths.publish_dir.display(),
            "Build pipeline complete"
        );
        Ok(RunSummary {
            platform: target,
            provisioned,
            artifact_path: self.paths.publish_dir.clone(),
            duration_ms: start.elapsed().as_millis() as u64,
        })
    }

    /// Relocates the packager's staging output to the published location.
    ///
    /// Only reachable after a successful packaging run — [`BuildResult`] is
    /// only constructed for exit status 0 and never retried. Any previous
    /// published directory is removed first; the move starts only once the
    /// removal has completed.
    pub async fn finalize(
        &self,
        result: &BuildResult,
        artifact: ArtifactLocation,
    ) -> Result<(), PipelineError> {
        debug_assert_eq!(result.exit_status, 0);

        if let Ok(meta) = tokio::fs::metadata(&artifact.destination).await {
            debug!(path = %artifact.destination.display(), "Removing previous output");
            let removal = if meta.is_dir() {
                tokio::fs::remove_dir_all(&artifact.destination).await
            } else {
                tokio::fs::remove_file(&artifact.destination).await
            };
            removal.map_err(|source| PipelineError::Relocation {
                action: "remove",
                path: artifact.destination.clone(),
                source,
            })?;
        }

        tokio::fs::rename(&artifact.source, &artifact.destination)
            .await
            .map_err(|source| PipelineError::Relocation {
                action: "move",
                path: artifact.source.clone(),
                source,
            })?;

        info!(
            from = %artifact.source.display(),
            to = %artifact.destination.display(),
            "Artifact relocated"
        );
        Ok(())
    }
}
