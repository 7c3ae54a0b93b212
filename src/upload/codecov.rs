use crate::context::CODECOV_TOKEN_VAR;
use crate::types::errors::Error;
use crate::upload::{ReportArtifacts, UploadClient};
use crate::utils::exec::CommandRunner;

/// Uploads the filtered tracefile through the `codecov` uploader binary
pub struct CodecovCli<'a> {
    runner: &'a dyn CommandRunner,
    program: String,
}

impl<'a> CodecovCli<'a> {
    pub fn new(runner: &'a dyn CommandRunner, program: &str) -> Self {
        CodecovCli {
            runner,
            program: program.to_string(),
        }
    }
}

impl UploadClient for CodecovCli<'_> {
    fn upload(&self, artifacts: &ReportArtifacts<'_>, token: &str) -> Result<(), Error> {
        let file = artifacts.filtered_tracefile.to_string_lossy().into_owned();
        // Token goes through the environment so it never shows up in argv or logs
        let output = self.runner.run_with_env(
            &self.program,
            &["-f", file.as_str()],
            &[(CODECOV_TOKEN_VAR, token)],
        )?;

        if !output.success {
            return Err(Error::Upload {
                backend: "codecov".to_string(),
                reason: format!(
                    "{} exited with {}: {}",
                    self.program,
                    output.status,
                    output.stderr.trim()
                ),
            });
        }
        Ok(())
    }
}
