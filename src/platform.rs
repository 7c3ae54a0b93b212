//! Host-specific installation of the tools the pipeline delegates to.

use crate::types::errors::Error;
use crate::utils::exec::{CommandRunner, run_checked};
use tracing::{debug, info};

/// `MATRIX_OS` value that selects the macOS toolchain
pub const MACOS_MATRIX_OS: &str = "macOS-latest";

/// Host platform, as far as tool installation is concerned
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    MacOs,
    Linux,
}

impl Platform {
    /// Anything other than the macOS runner label falls back to Linux
    pub fn from_matrix_os(matrix_os: &str) -> Self {
        if matrix_os == MACOS_MATRIX_OS {
            Platform::MacOs
        } else {
            Platform::Linux
        }
    }

    pub fn package_manager(&self) -> &'static dyn PackageManager {
        match self {
            Platform::MacOs => &Homebrew,
            Platform::Linux => &Apt,
        }
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Platform::MacOs => write!(f, "macos"),
            Platform::Linux => write!(f, "linux"),
        }
    }
}

/// How a platform installs a system package
pub trait PackageManager {
    fn name(&self) -> &'static str;

    /// Program and arguments that install `package`
    fn install_command(&self, package: &str) -> (&'static str, Vec<String>);
}

pub struct Homebrew;

impl PackageManager for Homebrew {
    fn name(&self) -> &'static str {
        "homebrew"
    }

    fn install_command(&self, package: &str) -> (&'static str, Vec<String>) {
        ("brew", vec!["install".to_string(), package.to_string()])
    }
}

pub struct Apt;

impl PackageManager for Apt {
    fn name(&self) -> &'static str {
        "apt"
    }

    fn install_command(&self, package: &str) -> (&'static str, Vec<String>) {
        (
            "sudo",
            vec![
                "apt-get".to_string(),
                "-qq".to_string(),
                "install".to_string(),
                package.to_string(),
            ],
        )
    }
}

/// Make sure `tool` is callable, installing `package` if it is not.
///
/// Returns `true` when an install was performed.
pub fn ensure_tool(
    runner: &dyn CommandRunner,
    platform: Platform,
    tool: &str,
    package: &str,
) -> Result<bool, Error> {
    if let Ok(output) = runner.run(tool, &["--version"]) {
        if output.success {
            debug!(tool, "already installed");
            return Ok(false);
        }
    }

    let manager = platform.package_manager();
    let (program, args) = manager.install_command(package);
    info!(tool, package, manager = manager.name(), %platform, "installing");
    let args: Vec<&str> = args.iter().map(String::as_str).collect();
    run_checked(runner, program, &args)?;
    Ok(true)
}
