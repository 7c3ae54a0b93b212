use crate::types::errors::Error;
use crate::upload::{ReportArtifacts, UploadClient};
use reqwest::blocking::{Client, multipart};
use std::time::Duration;
use tracing::debug;

pub const DEFAULT_COVERALLS_ENDPOINT: &str = "https://coveralls.io/api/v1/jobs";

/// Posts the job document to the Coveralls jobs API
pub struct CoverallsHttp {
    endpoint: String,
    client: Client,
}

impl CoverallsHttp {
    pub fn new(endpoint: &str) -> Result<Self, Error> {
        let client = Client::builder().timeout(Duration::from_secs(60)).build()?;
        Ok(CoverallsHttp {
            endpoint: endpoint.to_string(),
            client,
        })
    }
}

impl UploadClient for CoverallsHttp {
    fn upload(&self, artifacts: &ReportArtifacts<'_>, token: &str) -> Result<(), Error> {
        let payload = artifacts.coveralls.with_token(token);
        let json = serde_json::to_string(&payload)?;
        debug!(
            endpoint = %self.endpoint,
            files = payload.source_files.len(),
            "posting coveralls job"
        );

        let part = multipart::Part::text(json)
            .file_name("coverage.json")
            .mime_str("application/json")?;
        let form = multipart::Form::new().part("json_file", part);

        let response = self.client.post(&self.endpoint).multipart(form).send()?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(Error::Upload {
                backend: "coveralls".to_string(),
                reason: format!("{}: {}", status, body.trim()),
            });
        }
        Ok(())
    }
}
