//! Fan-out of the converted reports to hosted coverage services.
//!
//! Every backend is attempted, in order, whatever happened to the ones
//! before it; the caller gets one outcome per backend.

pub mod codecov;
pub mod coveralls;

use crate::report::CoverallsPayload;
use crate::types::errors::Error;
use std::path::Path;
use tracing::{error, info};

pub use codecov::CodecovCli;
pub use coveralls::{CoverallsHttp, DEFAULT_COVERALLS_ENDPOINT};

/// Everything a backend may build its payload from
pub struct ReportArtifacts<'a> {
    pub filtered_tracefile: &'a Path,
    pub coveralls: &'a CoverallsPayload,
}

/// Client for one coverage service
pub trait UploadClient {
    fn upload(&self, artifacts: &ReportArtifacts<'_>, token: &str) -> Result<(), Error>;
}

/// A configured upload target
pub struct Backend<'a> {
    pub name: &'static str,
    /// Environment variable the token was read from, for diagnostics
    pub token_var: &'static str,
    pub token: Option<String>,
    pub client: Box<dyn UploadClient + 'a>,
}

#[derive(Debug)]
pub struct UploadOutcome {
    pub backend: String,
    pub result: Result<(), Error>,
}

impl UploadOutcome {
    pub fn succeeded(&self) -> bool {
        self.result.is_ok()
    }
}

fn upload_one(backend: &Backend<'_>, artifacts: &ReportArtifacts<'_>) -> Result<(), Error> {
    let token = backend
        .token
        .as_deref()
        .ok_or(Error::MissingToken(backend.token_var))?;
    backend.client.upload(artifacts, token)
}

/// Attempt every backend and collect the results
pub fn upload_all(backends: &[Backend<'_>], artifacts: &ReportArtifacts<'_>) -> Vec<UploadOutcome> {
    backends
        .iter()
        .map(|backend| {
            info!(backend = backend.name, "uploading coverage");
            let result = upload_one(backend, artifacts).map_err(|e| match e {
                Error::Upload { .. } => e,
                other => Error::Upload {
                    backend: backend.name.to_string(),
                    reason: other.to_string(),
                },
            });

            match &result {
                Ok(()) => info!(backend = backend.name, "upload succeeded"),
                Err(e) => error!(backend = backend.name, error = %e, "upload failed"),
            }

            UploadOutcome {
                backend: backend.name.to_string(),
                result,
            }
        })
        .collect()
}
