//! Dependency provisioning
//!
//! This module ensures installable dependencies are present in the working
//! directory before a build proceeds. The install runs as a single monitored
//! child process bound to the working directory, with the selected mirror's
//! registry URL passed as the package manager's target registry.
//!
//! # Cancellation
//!
//! `install` takes a [`watch::Receiver`] as a run-scoped cancellation token.
//! When the token flips, the interrupt is forwarded to the live child (SIGINT
//! on unix, so the package manager can clean up after itself), the child is
//! reaped, and the call returns [`ProvisionError::Interrupted`]. The child is
//! additionally `kill_on_drop`, so no code path leaves it orphaned.
//!
//! Exactly one child exists per provisioning run: `install` consumes its
//! request and owns the only handle for the duration of the call.

pub mod mirror;

pub use mirror::{select_mirror, Mirror};

use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use thiserror::Error;
use tokio::process::{Child, Command};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::config::InspackConfig;

/// How long a child gets to exit after a forwarded interrupt before it is
/// forcibly killed.
const INTERRUPT_GRACE: Duration = Duration::from_secs(5);

/// Errors that can occur during dependency provisioning
#[derive(Debug, Error)]
pub enum ProvisionError {
    /// Mirror selection needs a terminal and none is attached
    #[error(
        "Mirror selection requires an interactive terminal; pass --mirror <npm|cnpm|taobao> instead"
    )]
    PromptUnavailable,

    /// Reading the mirror selection failed
    #[error("Failed to read mirror selection: {source}")]
    PromptRead {
        #[source]
        source: io::Error,
    },

    /// The operator's reply did not name one of the offered mirrors
    #[error("Invalid mirror selection: {input:?}")]
    PromptInvalid { input: String },

    /// The install process could not be spawned
    #[error("Failed to start the install process: {source}")]
    InstallSpawn {
        #[source]
        source: io::Error,
    },

    /// The install process ran but exited unsuccessfully
    #[error("Dependency installation failed: install process exited with {status}")]
    InstallFailed { status: std::process::ExitStatus },

    /// The run was interrupted while the install was outstanding
    #[error("Dependency installation interrupted")]
    Interrupted,
}

/// One dependency-installation run: a chosen mirror bound to a working
/// directory. Created when provisioning starts and consumed by [`install`].
#[derive(Debug, Clone)]
pub struct InstallRequest {
    pub mirror: Mirror,
    pub working_dir: PathBuf,
    pub npm_program: String,
}

impl InstallRequest {
    pub fn new(mirror: Mirror, working_dir: PathBuf, config: &InspackConfig) -> Self {
        Self {
            mirror,
            working_dir,
            npm_program: config.npm_program.clone(),
        }
    }
}

/// Returns true when the dependency tree is absent or empty and a build must
/// therefore be preceded by provisioning. Repeated runs with an intact tree
/// skip provisioning entirely.
pub fn needs_provisioning(dependency_dir: &Path) -> bool {
    match std::fs::read_dir(dependency_dir) {
        Ok(mut entries) => entries.next().is_none(),
        Err(_) => true,
    }
}

/// Runs the package manager's install in `request.working_dir` against the
/// requested mirror and waits for it to finish.
///
/// Resolves successfully only when the child exits with status 0. A non-zero
/// exit yields [`ProvisionError::InstallFailed`]; a spawn-level failure yields
/// [`ProvisionError::InstallSpawn`] with the underlying cause preserved.
/// Flipping `cancel` while the child is outstanding terminates it and yields
/// [`ProvisionError::Interrupted`].
pub async fn install(
    request: InstallRequest,
    mut cancel: watch::Receiver<bool>,
) -> Result<(), ProvisionError> {
    info!(
        mirror = %request.mirror,
        registry = request.mirror.registry_url(),
        dir = %request.working_dir.display(),
        "Installing dependencies"
    );

    let mut child = Command::new(&request.npm_program)
        .arg("install")
        .arg("--registry")
        .arg(request.mirror.registry_url())
        .current_dir(&request.working_dir)
        .kill_on_drop(true)
        .spawn()
        .map_err(|source| ProvisionError::InstallSpawn { source })?;

    tokio::select! {
        status = child.wait() => {
            let status = status.map_err(|source| ProvisionError::InstallSpawn { source })?;
            if status.success() {
                info!("Dependency installation complete");
                Ok(())
            } else {
                Err(ProvisionError::InstallFailed { status })
            }
        }
        _ = cancelled(&mut cancel) => {
            warn!("Interrupt received, terminating install process");
            terminate(&mut child).await;
            Err(ProvisionError::Interrupted)
        }
    }
}

/// Resolves once the cancellation token flips to true. A dropped sender never
/// resolves: losing the signal source must not read as a cancellation.
async fn cancelled(cancel: &mut watch::Receiver<bool>) {
    loop {
        if *cancel.borrow() {
            return;
        }
        if cancel.changed().await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}

/// Forwards the interrupt to the child and reaps it.
async fn terminate(child: &mut Child) {
    #[cfg(unix)]
    {
        if let Some(pid) = child.id() {
            // SAFETY: plain kill(2) on a pid we own; no memory is touched.
            unsafe {
                libc::kill(pid as libc::pid_t, libc::SIGINT);
            }
            match tokio::time::timeout(INTERRUPT_GRACE, child.wait()).await {
                Ok(_) => return,
                Err(_) => debug!("Install process ignored the interrupt, killing it"),
            }
        }
    }

    if let Err(e) = child.kill().await {
        warn!(error = %e, "Failed to kill install process");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_needs_provisioning_when_missing() {
        let dir = TempDir::new().unwrap();
        assert!(needs_provisioning(&dir.path().join("node_modules")));
    }

    #[test]
    fn test_needs_provisioning_when_empty() {
        let dir = TempDir::new().unwrap();
        let deps = dir.path().join("node_modules");
        fs::create_dir(&deps).unwrap();
        assert!(needs_provisioning(&deps));
    }

    #[test]
    fn test_no_provisioning_when_populated() {
        let dir = TempDir::new().unwrap();
        let deps = dir.path().join("node_modules");
        fs::create_dir_all(deps.join("left-pad")).unwrap();
        assert!(!needs_provisioning(&deps));
    }

    #[test]
    fn test_install_request_carries_config_program() {
        let config = InspackConfig {
            app_dir: "app".to_string(),
            out_dir: "out".to_string(),
            staging_dir: "dist".to_string(),
            npm_program: "/opt/npm".to_string(),
            packager_program: "electron-packager".to_string(),
            log_level: "info".to_string(),
        };
        let request = InstallRequest::new(Mirror::Cnpm, PathBuf::from("/work/app"), &config);
        assert_eq!(request.npm_program, "/opt/npm");
        assert_eq!(request.mirror, Mirror::Cnpm);
    }

    #[tokio::test]
    async fn test_install_spawn_failure_preserves_cause() {
        let dir = TempDir::new().unwrap();
        let request = InstallRequest {
            mirror: Mirror::Npm,
            working_dir: dir.path().to_path_buf(),
            npm_program: dir
                .path()
                .join("definitely-not-a-program")
                .display()
                .to_string(),
        };
        let (_tx, rx) = watch::channel(false);

        let err = install(request, rx).await.unwrap_err();
        match err {
            ProvisionError::InstallSpawn { source } => {
                assert_eq!(source.kind(), io::ErrorKind::NotFound);
            }
            other => panic!("expected InstallSpawn, got {other:?}"),
        }
    }
}
