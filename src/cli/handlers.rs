//! Command handlers
//!
//! Each handler resolves configuration and arguments, drives the library, and
//! returns the process exit code. Failures are printed with their
//! troubleshooting hints; an interrupt during installation exits with 130.

use std::env;
use std::path::PathBuf;

use tokio::sync::watch;
use tracing::{debug, error};

use crate::cli::commands::{BuildArgs, ProvisionArgs};
use crate::cli::output::OutputFormatter;
use crate::config::InspackConfig;
use crate::pipeline::{resolve_platform, BuildPipeline, PipelineError};
use crate::provision::{self, InstallRequest};

/// Handles `inspack build`.
pub async fn handle_build(args: &BuildArgs) -> i32 {
    let config = InspackConfig::default();
    if let Err(e) = config.validate() {
        error!(error = %e, "Invalid configuration");
        eprintln!("{e}");
        return 1;
    }

    let root = resolve_project_path(args.project_path.clone());
    let pipeline = match BuildPipeline::new(&root, config) {
        Ok(pipeline) => pipeline,
        Err(e) => return fail(&e),
    };

    let target = resolve_platform(args.mac, args.win);
    let cancel = spawn_interrupt_listener();

    match pipeline.run(target, args.mirror, cancel).await {
        Ok(summary) => {
            let formatter = OutputFormatter::new(args.format.into());
            match formatter.format(&summary) {
                Ok(output) => println!("{output}"),
                Err(e) => {
                    error!(error = %e, "Failed to format run summary");
                    return 1;
                }
            }
            0
        }
        Err(e) => fail(&e),
    }
}

/// Handles `inspack provision`.
///
/// Unlike the build path this always installs, so an operator can refresh an
/// already-populated dependency tree.
pub async fn handle_provision(args: &ProvisionArgs) -> i32 {
    let config = InspackConfig::default();
    if let Err(e) = config.validate() {
        error!(error = %e, "Invalid configuration");
        eprintln!("{e}");
        return 1;
    }

    let root = resolve_project_path(args.project_path.clone());
    let pipeline = match BuildPipeline::new(&root, config.clone()) {
        Ok(pipeline) => pipeline,
        Err(e) => return fail(&e),
    };

    let mirror = match args.mirror {
        Some(mirror) => mirror,
        None => match provision::select_mirror() {
            Ok(mirror) => mirror,
            Err(e) => return fail(&PipelineError::from(e)),
        },
    };

    let request = InstallRequest::new(
        mirror,
        pipeline.paths().working_dir.clone(),
        &config,
    );
    let cancel = spawn_interrupt_listener();

    match provision::install(request, cancel).await {
        Ok(()) => 0,
        Err(e) => fail(&PipelineError::from(e)),
    }
}

fn fail(error: &PipelineError) -> i32 {
    error!(error = %error, "Pipeline run failed");
    eprintln!("{}", error.help_message());
    error.exit_code()
}

fn resolve_project_path(path: Option<PathBuf>) -> PathBuf {
    path.unwrap_or_else(|| env::current_dir().unwrap_or_else(|_| PathBuf::from(".")))
}

/// Registers a process-interrupt listener for the run's duration and returns
/// the cancellation token handed to the install step. On Ctrl-C the token
/// flips; the install forwards the interrupt to its child and the run
/// terminates with a non-zero status.
fn spawn_interrupt_listener() -> watch::Receiver<bool> {
    let (tx, rx) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            debug!("Interrupt received");
            let _ = tx.send(true);
            // Hold the sender so the flag stays observable for the rest of
            // the run.
            std::future::pending::<()>().await;
        }
    });
    rx
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_project_path_explicit() {
        let path = resolve_project_path(Some(PathBuf::from("/tmp/project")));
        assert_eq!(path, PathBuf::from("/tmp/project"));
    }

    #[tokio::test]
    async fn test_interrupt_listener_starts_uncancelled() {
        let rx = spawn_interrupt_listener();
        assert!(!*rx.borrow());
    }
}
