//! Platform targets and the external packager invocation
//!
//! Packaging is deliberately a blocking call: the external tool owns the
//! terminal for its full duration and cannot be cancelled once started. A
//! non-zero exit is fatal — no retry, and no partial output is trusted.

use std::fmt;
use std::io;
use std::path::Path;
use std::process::Command;
use std::time::Duration;

use indicatif::ProgressBar;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info};

/// The platform a packaging run targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PlatformTarget {
    Mac,
    Win,
}

impl PlatformTarget {
    /// The single platform argument handed to the packaging tool.
    pub fn packager_arg(&self) -> &'static str {
        match self {
            PlatformTarget::Mac => "--platform=darwin",
            PlatformTarget::Win => "--platform=win32",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            PlatformTarget::Mac => "mac",
            PlatformTarget::Win => "win",
        }
    }
}

impl fmt::Display for PlatformTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Resolves the platform target from the CLI flags.
///
/// Flags are applied sequentially, mac first, so a later `--win` overrides an
/// earlier `--mac`. Supplying both therefore yields `Win`; this is the
/// documented contract, not an accident. With neither flag the default is
/// `Win`.
pub fn resolve_platform(mac: bool, win: bool) -> PlatformTarget {
    let mut target = PlatformTarget::Win;
    if mac {
        target = PlatformTarget::Mac;
    }
    if win {
        target = PlatformTarget::Win;
    }
    target
}

/// Errors from the external packager invocation
#[derive(Debug, Error)]
pub enum PackageError {
    /// The packaging tool could not be started
    #[error("Failed to launch packager {program:?}: {source}")]
    Launch {
        program: String,
        #[source]
        source: io::Error,
    },

    /// The packaging tool ran but exited unsuccessfully
    #[error("Packager exited with {status}")]
    ExitStatus { status: std::process::ExitStatus },

    /// The packaging tool reported success but its output directory is missing
    #[error("Packager reported success but produced nothing at {}", .path.display())]
    MissingArtifact { path: std::path::PathBuf },
}

/// Outcome of one packager invocation. Terminal: a failed run is never
/// retried, so a value of this type always carries exit status 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuildResult {
    pub exit_status: i32,
}

/// Invokes the external packaging tool synchronously in `working_dir` with the
/// platform argument derived from `target`.
///
/// The caller blocks until the tool completes. A spawn failure or non-zero
/// exit status is fatal.
pub fn package(
    target: PlatformTarget,
    working_dir: &Path,
    packager_program: &str,
) -> Result<BuildResult, PackageError> {
    info!(
        platform = %target,
        program = packager_program,
        dir = %working_dir.display(),
        "Packaging application"
    );

    let spinner = packaging_spinner(target);

    let status = Command::new(packager_program)
        .arg(target.packager_arg())
        .current_dir(working_dir)
        .status();

    if let Some(spinner) = spinner {
        spinner.finish_and_clear();
    }

    let status = status.map_err(|source| PackageError::Launch {
        program: packager_program.to_string(),
        source,
    })?;

    if !status.success() {
        return Err(PackageError::ExitStatus { status });
    }

    debug!(platform = %target, "Packaging complete");
    Ok(BuildResult {
        exit_status: status.code().unwrap_or(0),
    })
}

fn packaging_spinner(target: PlatformTarget) -> Option<ProgressBar> {
    if !atty::is(atty::Stream::Stderr) {
        return None;
    }
    let spinner = ProgressBar::new_spinner();
    spinner.set_message(format!("Packaging for {target}..."));
    spinner.enable_steady_tick(Duration::from_millis(120));
    Some(spinner)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_platform_is_win() {
        assert_eq!(resolve_platform(false, false), PlatformTarget::Win);
    }

    #[test]
    fn test_mac_flag_selects_mac() {
        assert_eq!(resolve_platform(true, false), PlatformTarget::Mac);
    }

    #[test]
    fn test_win_flag_selects_win() {
        assert_eq!(resolve_platform(false, true), PlatformTarget::Win);
    }

    #[test]
    fn test_both_flags_win_wins() {
        assert_eq!(resolve_platform(true, true), PlatformTarget::Win);
    }

    #[test]
    fn test_packager_args() {
        assert_eq!(PlatformTarget::Mac.packager_arg(), "--platform=darwin");
        assert_eq!(PlatformTarget::Win.packager_arg(), "--platform=win32");
    }

    #[test]
    fn test_package_launch_failure() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("no-such-packager").display().to_string();
        let err = package(PlatformTarget::Win, dir.path(), &missing).unwrap_err();
        assert!(matches!(err, PackageError::Launch { .. }));
    }
}
