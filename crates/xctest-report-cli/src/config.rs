//! Configuration for the xctest-report command
//!
//! Command-line flags with environment fallbacks for the workspace, the
//! hostname written into reports, and logging verbosity.

use std::path::PathBuf;

use clap::Parser;

/// Hostname used when the flag is unset and the system name is unavailable
pub const DEFAULT_HOSTNAME: &str = "localhost";

/// Pipe xcodebuild test output through and write one JUnit report per suite
///
/// Build output is read from stdin and echoed unchanged to stdout.
/// Reports are written to <workspace>/test-reports/TEST-<suite>.xml.
///
/// Example:
///   xcodebuild test -scheme Foo 2>&1 | xctest-report --clean
#[derive(Parser, Debug, Clone, Default)]
#[command(name = "xctest-report")]
#[command(version, about, long_about = None)]
pub struct Config {
    /// Workspace directory that receives the test-reports directory
    ///
    /// Defaults to the current working directory.
    #[arg(short, long, env = "XCTEST_REPORT_WORKSPACE")]
    pub workspace: Option<PathBuf>,

    /// Delete existing reports before parsing
    #[arg(long, default_value = "false")]
    pub clean: bool,

    /// Hostname recorded on every test suite
    ///
    /// Defaults to the machine's hostname, then "localhost".
    #[arg(long, env = "XCTEST_REPORT_HOSTNAME")]
    pub hostname: Option<String>,

    /// Write a JSON summary of the run to this file
    #[arg(long, value_name = "FILE")]
    pub summary: Option<PathBuf>,

    /// Enable verbose logging (debug level)
    ///
    /// Logs are written to stderr; stdout carries the build output.
    #[arg(short, long, default_value = "false")]
    pub verbose: bool,

    /// Quiet mode - suppress info-level logs
    #[arg(short, long, default_value = "false")]
    pub quiet: bool,
}

impl Config {
    /// Get the workspace path, using current directory as default
    ///
    /// Returns `None` if no workspace is specified and the current
    /// directory cannot be determined.
    #[must_use]
    pub fn workspace_path(&self) -> Option<PathBuf> {
        self.workspace
            .clone()
            .or_else(|| std::env::current_dir().ok())
    }

    /// Hostname for the suite `hostname` attribute
    #[must_use]
    pub fn hostname(&self) -> String {
        resolve_hostname(self.hostname.as_deref(), system_hostname())
    }

    /// Validate the configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the workspace path is specified but doesn't exist
    /// or isn't a directory.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(ref workspace) = self.workspace {
            if !workspace.exists() {
                return Err(ConfigError::WorkspaceNotFound(workspace.clone()));
            }
            if !workspace.is_dir() {
                return Err(ConfigError::WorkspaceNotDirectory(workspace.clone()));
            }
        }
        if self.workspace_path().is_none() {
            return Err(ConfigError::NoWorkspace);
        }
        Ok(())
    }

    /// Get the log level based on verbose/quiet flags
    #[must_use]
    pub fn log_level(&self) -> tracing::Level {
        if self.verbose {
            tracing::Level::DEBUG
        } else if self.quiet {
            tracing::Level::WARN
        } else {
            tracing::Level::INFO
        }
    }
}

/// The machine's hostname as reported by the OS
#[cfg(unix)]
pub fn system_hostname() -> Option<String> {
    nix::unistd::gethostname()
        .ok()
        .map(|h| h.to_string_lossy().into_owned())
}

/// The machine's hostname as reported by the OS
#[cfg(not(unix))]
pub fn system_hostname() -> Option<String> {
    None
}

fn resolve_hostname(flag: Option<&str>, system: Option<String>) -> String {
    let flag = flag.map(str::trim).filter(|h| !h.is_empty());
    match flag {
        Some(name) => name.to_string(),
        None => system
            .map(|h| h.trim().to_string())
            .filter(|h| !h.is_empty())
            .unwrap_or_else(|| DEFAULT_HOSTNAME.to_string()),
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Workspace path not found
    #[error("Workspace path not found: {0}")]
    WorkspaceNotFound(PathBuf),

    /// Workspace path is not a directory
    #[error("Workspace path is not a directory: {0}")]
    WorkspaceNotDirectory(PathBuf),

    /// No workspace given and the current directory is unavailable
    #[error("No workspace given and the current directory cannot be determined")]
    NoWorkspace,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.workspace.is_none());
        assert!(config.hostname.is_none());
        assert!(config.summary.is_none());
        assert!(!config.clean);
        assert!(!config.verbose);
        assert!(!config.quiet);
    }

    #[test]
    fn test_workspace_path_default() {
        let config = Config::default();
        assert!(config.workspace_path().is_some());
    }

    #[test]
    fn test_workspace_path_custom() {
        let custom = PathBuf::from("/tmp");
        let config = Config {
            workspace: Some(custom.clone()),
            ..Default::default()
        };
        assert_eq!(config.workspace_path(), Some(custom));
    }

    #[test]
    fn test_hostname_resolution() {
        assert_eq!(resolve_hostname(Some("ci-mac"), Some("mac-mini".into())), "ci-mac");
        assert_eq!(resolve_hostname(None, Some("mac-mini\n".into())), "mac-mini");
        assert_eq!(resolve_hostname(Some(" "), Some("mac-mini".into())), "mac-mini");
        assert_eq!(resolve_hostname(None, None), DEFAULT_HOSTNAME);
        assert_eq!(resolve_hostname(None, Some(String::new())), DEFAULT_HOSTNAME);
    }

    #[cfg(unix)]
    #[test]
    fn test_hostname_defaults_to_machine_name() {
        let machine = nix::unistd::gethostname()
            .expect("gethostname")
            .to_string_lossy()
            .trim()
            .to_string();
        let config = Config::default();
        assert_eq!(config.hostname(), machine);
        if machine != DEFAULT_HOSTNAME && !machine.is_empty() {
            assert_ne!(config.hostname(), DEFAULT_HOSTNAME);
        }
    }

    #[test]
    fn test_hostname_flag_wins() {
        let config = Config {
            hostname: Some("builder-7".into()),
            ..Default::default()
        };
        assert_eq!(config.hostname(), "builder-7");
    }

    #[test]
    fn test_log_level_default() {
        let config = Config::default();
        assert_eq!(config.log_level(), tracing::Level::INFO);
    }

    #[test]
    fn test_log_level_verbose() {
        let config = Config {
            verbose: true,
            ..Default::default()
        };
        assert_eq!(config.log_level(), tracing::Level::DEBUG);
    }

    #[test]
    fn test_log_level_quiet() {
        let config = Config {
            quiet: true,
            ..Default::default()
        };
        assert_eq!(config.log_level(), tracing::Level::WARN);
    }

    #[test]
    fn test_validate_nonexistent_workspace() {
        let config = Config {
            workspace: Some(PathBuf::from("/nonexistent/path/12345")),
            ..Default::default()
        };
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::WorkspaceNotFound(_))));
    }

    #[test]
    fn test_validate_file_as_workspace() {
        let file = tempfile::NamedTempFile::new().expect("create temp file");
        let config = Config {
            workspace: Some(file.path().to_path_buf()),
            ..Default::default()
        };
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::WorkspaceNotDirectory(_))));
    }

    #[test]
    fn test_validate_valid_workspace() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let config = Config {
            workspace: Some(dir.path().to_path_buf()),
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn verify_cli() {
        use clap::CommandFactory;
        Config::command().debug_assert();
    }
}
