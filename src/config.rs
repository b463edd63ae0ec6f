//! Configuration management for inspack
//!
//! This module provides the configuration system that loads settings from
//! environment variables with sensible defaults, plus the fixed project path
//! layout derived from them. Configuration covers the directory names the
//! pipeline operates on and the external programs it invokes.
//!
//! # Environment Variables
//!
//! - `INSPACK_APP_DIR`: application source subdirectory - default: "app"
//! - `INSPACK_OUT_DIR`: published output subdirectory - default: "out"
//! - `INSPACK_STAGING_DIR`: packager output subdirectory inside the app dir - default: "dist"
//! - `INSPACK_NPM`: package manager program - default: "npm"
//! - `INSPACK_PACKAGER`: packaging tool program - default: "electron-packager"
//! - `INSPACK_LOG_LEVEL`: logging level - default: "info"
//!
//! # Example
//!
//! ```no_run
//! use inspack::{InspackConfig, ProjectPaths};
//! use std::path::Path;
//!
//! let config = InspackConfig::default();
//! config.validate().expect("Invalid configuration");
//!
//! let paths = ProjectPaths::new(Path::new("/path/to/project"), &config);
//! println!("dependencies live under {}", paths.dependency_dir.display());
//! ```

use std::env;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Default values for configuration
const DEFAULT_APP_DIR: &str = "app";
const DEFAULT_OUT_DIR: &str = "out";
const DEFAULT_STAGING_DIR: &str = "dist";
const DEFAULT_NPM_PROGRAM: &str = "npm";
const DEFAULT_PACKAGER_PROGRAM: &str = "electron-packager";
const DEFAULT_LOG_LEVEL: &str = "info";

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A configured value failed validation
    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },
}

/// Main configuration structure for inspack
///
/// Constructed via `Default::default()`, which reads `INSPACK_*` environment
/// variables and falls back to the documented defaults. Field values are plain
/// strings so tests can substitute stub programs and directory names directly.
#[derive(Debug, Clone)]
pub struct InspackConfig {
    /// Application source subdirectory name (holds package.json and the vendored UI)
    pub app_dir: String,

    /// Published output subdirectory name, replaced on every successful run
    pub out_dir: String,

    /// Packaging tool's own output subdirectory, inside the app dir
    pub staging_dir: String,

    /// Package manager program used for dependency installation
    pub npm_program: String,

    /// External packaging tool program
    pub packager_program: String,

    /// Logging level (trace, debug, info, warn, error)
    pub log_level: String,
}

impl Default for InspackConfig {
    fn default() -> Self {
        Self {
            app_dir: env::var("INSPACK_APP_DIR").unwrap_or_else(|_| DEFAULT_APP_DIR.to_string()),
            out_dir: env::var("INSPACK_OUT_DIR").unwrap_or_else(|_| DEFAULT_OUT_DIR.to_string()),
            staging_dir: env::var("INSPACK_STAGING_DIR")
                .unwrap_or_else(|_| DEFAULT_STAGING_DIR.to_string()),
            npm_program: env::var("INSPACK_NPM").unwrap_or_else(|_| DEFAULT_NPM_PROGRAM.to_string()),
            packager_program: env::var("INSPACK_PACKAGER")
                .unwrap_or_else(|_| DEFAULT_PACKAGER_PROGRAM.to_string()),
            log_level: env::var("INSPACK_LOG_LEVEL")
                .unwrap_or_else(|_| DEFAULT_LOG_LEVEL.to_string()),
        }
    }
}

impl InspackConfig {
    /// Validates the configuration
    ///
    /// Directory names must be plain path components: relocation replaces the
    /// published directory wholesale, so an absolute or traversing name here
    /// would point the remove step outside the project tree.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (field, value) in [
            ("INSPACK_APP_DIR", &self.app_dir),
            ("INSPACK_OUT_DIR", &self.out_dir),
            ("INSPACK_STAGING_DIR", &self.staging_dir),
        ] {
            validate_dir_name(field, value)?;
        }

        for (field, value) in [
            ("INSPACK_NPM", &self.npm_program),
            ("INSPACK_PACKAGER", &self.packager_program),
        ] {
            if value.trim().is_empty() {
                return Err(ConfigError::InvalidValue {
                    field,
                    reason: "program name cannot be empty".to_string(),
                });
            }
        }

        Ok(())
    }
}

fn validate_dir_name(field: &'static str, value: &str) -> Result<(), ConfigError> {
    if value.trim().is_empty() {
        return Err(ConfigError::InvalidValue {
            field,
            reason: "directory name cannot be empty".to_string(),
        });
    }

    let path = Path::new(value);
    if path.is_absolute() || path.components().count() != 1 || value == "." || value == ".." {
        return Err(ConfigError::InvalidValue {
            field,
            reason: format!("{value:?} must be a single relative path component"),
        });
    }

    Ok(())
}

/// Fixed filesystem layout of one project, derived from the root and the
/// configured directory names.
///
/// All pipeline stages address the tree through this struct, so the layout is
/// resolved exactly once per run.
#[derive(Debug, Clone)]
pub struct ProjectPaths {
    /// Project root
    pub root: PathBuf,

    /// Application source directory (`<root>/app`); the install and packaging
    /// subprocesses run here
    pub working_dir: PathBuf,

    /// Dependency tree (`<root>/app/node_modules`); its absence or emptiness
    /// triggers provisioning
    pub dependency_dir: PathBuf,

    /// The packaging tool's own output location (`<root>/app/dist`)
    pub staging_dir: PathBuf,

    /// Published destination (`<root>/out`), fully replaced on success
    pub publish_dir: PathBuf,
}

impl ProjectPaths {
    pub fn new(root: &Path, config: &InspackConfig) -> Self {
        let working_dir = root.join(&config.app_dir);
        Self {
            root: root.to_path_buf(),
            dependency_dir: working_dir.join("node_modules"),
            staging_dir: working_dir.join(&config.staging_dir),
            publish_dir: root.join(&config.out_dir),
            working_dir,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn clear_env() {
        for key in [
            "INSPACK_APP_DIR",
            "INSPACK_OUT_DIR",
            "INSPACK_STAGING_DIR",
            "INSPACK_NPM",
            "INSPACK_PACKAGER",
            "INSPACK_LOG_LEVEL",
        ] {
            env::remove_var(key);
        }
    }

    #[test]
    #[serial]
    fn test_default_config() {
        clear_env();
        let config = InspackConfig::default();
        assert_eq!(config.app_dir, "app");
        assert_eq!(config.out_dir, "out");
        assert_eq!(config.staging_dir, "dist");
        assert_eq!(config.npm_program, "npm");
        assert_eq!(config.packager_program, "electron-packager");
        assert_eq!(config.log_level, "info");
        assert!(config.validate().is_ok());
    }

    #[test]
    #[serial]
    fn test_env_overrides() {
        clear_env();
        env::set_var("INSPACK_APP_DIR", "frontend");
        env::set_var("INSPACK_PACKAGER", "/usr/local/bin/packager");
        let config = InspackConfig::default();
        assert_eq!(config.app_dir, "frontend");
        assert_eq!(config.packager_program, "/usr/local/bin/packager");
        clear_env();
    }

    #[test]
    fn test_validate_rejects_empty_dir() {
        let config = InspackConfig {
            app_dir: "".to_string(),
            ..test_config()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_absolute_dir() {
        let config = InspackConfig {
            out_dir: "/tmp/out".to_string(),
            ..test_config()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_traversal() {
        let config = InspackConfig {
            staging_dir: "../dist".to_string(),
            ..test_config()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_empty_program() {
        let config = InspackConfig {
            npm_program: "  ".to_string(),
            ..test_config()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_project_paths_layout() {
        let paths = ProjectPaths::new(Path::new("/work/project"), &test_config());
        assert_eq!(paths.working_dir, Path::new("/work/project/app"));
        assert_eq!(
            paths.dependency_dir,
            Path::new("/work/project/app/node_modules")
        );
        assert_eq!(paths.staging_dir, Path::new("/work/project/app/dist"));
        assert_eq!(paths.publish_dir, Path::new("/work/project/out"));
    }

    fn test_config() -> InspackConfig {
        InspackConfig {
            app_dir: "app".to_string(),
            out_dir: "out".to_string(),
            staging_dir: "dist".to_string(),
            npm_program: "npm".to_string(),
            packager_program: "electron-packager".to_string(),
            log_level: "info".to_string(),
        }
    }
}
