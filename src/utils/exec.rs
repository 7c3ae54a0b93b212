use crate::types::errors::Error;
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::debug;

/// Captured result of an external command
#[derive(Debug, Clone, Default)]
pub struct CommandOutput {
    pub status: String,
    pub success: bool,
    pub stdout: String,
    pub stderr: String,
}

/// Seam over process execution so each pipeline step can be driven without real tools
pub trait CommandRunner {
    /// Run with extra environment variables; values are never logged
    fn run_with_env(
        &self,
        program: &str,
        args: &[&str],
        env: &[(&str, &str)],
    ) -> Result<CommandOutput, Error>;

    fn run(&self, program: &str, args: &[&str]) -> Result<CommandOutput, Error> {
        self.run_with_env(program, args, &[])
    }
}

/// Runs commands on the host, from a fixed working directory
pub struct SystemRunner {
    dir: PathBuf,
}

impl SystemRunner {
    pub fn new(dir: &Path) -> Self {
        SystemRunner {
            dir: dir.to_path_buf(),
        }
    }
}

impl CommandRunner for SystemRunner {
    fn run_with_env(
        &self,
        program: &str,
        args: &[&str],
        env: &[(&str, &str)],
    ) -> Result<CommandOutput, Error> {
        let env_keys: Vec<&str> = env.iter().map(|(key, _)| *key).collect();
        debug!(program, ?args, ?env_keys, dir = %self.dir.display(), "running command");
        let output = Command::new(program)
            .args(args)
            .envs(env.iter().copied())
            .current_dir(&self.dir)
            .output()
            .map_err(|e| Error::CommandFailed(format!("Failed to execute '{}': {}", program, e)))?;

        Ok(CommandOutput {
            status: output.status.to_string(),
            success: output.status.success(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

/// Run a command and turn a non-zero exit into `Error::CommandFailed`
pub fn run_checked(
    runner: &dyn CommandRunner,
    program: &str,
    args: &[&str],
) -> Result<CommandOutput, Error> {
    let output = runner.run(program, args)?;
    if !output.success {
        return Err(Error::CommandFailed(format!(
            "'{} {}' exited with {}\nStderr: {}",
            program,
            args.join(" "),
            output.status,
            output.stderr.trim()
        )));
    }
    Ok(output)
}
