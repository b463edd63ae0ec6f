use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::provision::Mirror;

/// Build-and-package pipeline for the embedded-inspector desktop app
#[derive(Parser, Debug)]
#[command(
    name = "inspack",
    about = "Build-and-package pipeline for the embedded-inspector desktop app",
    version,
    author,
    long_about = "inspack provisions the application's dependency tree from a chosen \
                  registry mirror, invokes the external packaging tool for the requested \
                  platform, and publishes the resulting artifact directory."
)]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(long, global = true, value_name = "LEVEL", help = "Set logging level")]
    pub log_level: Option<String>,

    #[arg(short = 'v', long, global = true, help = "Increase verbosity")]
    pub verbose: bool,

    #[arg(
        short = 'q',
        long,
        global = true,
        conflicts_with = "verbose",
        help = "Quiet mode - suppress non-error output"
    )]
    pub quiet: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    #[command(
        about = "Build and package the application",
        long_about = "Runs the full pipeline: installs dependencies when the dependency \
                      tree is absent or empty, packages for the requested platform, and \
                      replaces the published output directory with the result.\n\n\
                      Examples:\n  \
                      inspack build\n  \
                      inspack build /path/to/project --mac\n  \
                      inspack build --win --mirror taobao\n  \
                      inspack build --format json"
    )]
    Build(BuildArgs),

    #[command(
        about = "Install application dependencies without building",
        long_about = "Runs the dependency install against the chosen registry mirror, \
                      regardless of the current dependency tree.\n\n\
                      Examples:\n  \
                      inspack provision\n  \
                      inspack provision /path/to/project --mirror cnpm"
    )]
    Provision(ProvisionArgs),
}

#[derive(Parser, Debug, Clone)]
pub struct BuildArgs {
    #[arg(
        value_name = "PATH",
        help = "Project root (defaults to current directory)"
    )]
    pub project_path: Option<PathBuf>,

    #[arg(long, help = "Package for macOS")]
    pub mac: bool,

    #[arg(
        long,
        help = "Package for Windows (the default; overrides --mac when both are given)"
    )]
    pub win: bool,

    #[arg(
        short = 'm',
        long,
        value_enum,
        help = "Registry mirror for dependency installation (skips the interactive prompt)"
    )]
    pub mirror: Option<Mirror>,

    #[arg(
        short = 'f',
        long,
        value_enum,
        default_value = "human",
        help = "Output format for the run summary"
    )]
    pub format: OutputFormatArg,
}

#[derive(Parser, Debug, Clone)]
pub struct ProvisionArgs {
    #[arg(
        value_name = "PATH",
        help = "Project root (defaults to current directory)"
    )]
    pub project_path: Option<PathBuf>,

    #[arg(
        short = 'm',
        long,
        value_enum,
        help = "Registry mirror for dependency installation (skips the interactive prompt)"
    )]
    pub mirror: Option<Mirror>,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormatArg {
    Json,
    Human,
}

impl From<OutputFormatArg> for super::output::OutputFormat {
    fn from(arg: OutputFormatArg) -> Self {
        match arg {
            OutputFormatArg::Json => super::output::OutputFormat::Json,
            OutputFormatArg::Human => super::output::OutputFormat::Human,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_args_verify() {
        // Verify that CLI structure is valid
        CliArgs::command().debug_assert();
    }

    #[test]
    fn test_default_build_args() {
        let args = CliArgs::parse_from(["inspack", "build"]);
        match args.command {
            Commands::Build(build_args) => {
                assert!(!build_args.mac);
                assert!(!build_args.win);
                assert!(build_args.mirror.is_none());
                assert!(build_args.project_path.is_none());
                assert_eq!(build_args.format, OutputFormatArg::Human);
            }
            _ => panic!("Expected Build command"),
        }
    }

    #[test]
    fn test_build_with_path_and_platform() {
        let args = CliArgs::parse_from(["inspack", "build", "/tmp/project", "--mac"]);
        match args.command {
            Commands::Build(build_args) => {
                assert_eq!(build_args.project_path, Some(PathBuf::from("/tmp/project")));
                assert!(build_args.mac);
                assert!(!build_args.win);
            }
            _ => panic!("Expected Build command"),
        }
    }

    #[test]
    fn test_build_accepts_both_platform_flags() {
        let args = CliArgs::parse_from(["inspack", "build", "--mac", "--win"]);
        match args.command {
            Commands::Build(build_args) => {
                assert!(build_args.mac);
                assert!(build_args.win);
            }
            _ => panic!("Expected Build command"),
        }
    }

    #[test]
    fn test_build_mirror_values() {
        for (value, expected) in [
            ("npm", Mirror::Npm),
            ("cnpm", Mirror::Cnpm),
            ("taobao", Mirror::Taobao),
        ] {
            let args = CliArgs::parse_from(["inspack", "build", "--mirror", value]);
            match args.command {
                Commands::Build(build_args) => assert_eq!(build_args.mirror, Some(expected)),
                _ => panic!("Expected Build command"),
            }
        }
    }

    #[test]
    fn test_provision_args() {
        let args = CliArgs::parse_from(["inspack", "provision", "--mirror", "cnpm"]);
        match args.command {
            Commands::Provision(provision_args) => {
                assert_eq!(provision_args.mirror, Some(Mirror::Cnpm));
            }
            _ => panic!("Expected Provision command"),
        }
    }

    #[test]
    fn test_global_flags_conflict() {
        let result = CliArgs::try_parse_from(["inspack", "build", "-v", "-q"]);
        assert!(result.is_err());
    }
}
