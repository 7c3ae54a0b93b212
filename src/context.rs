use crate::platform::Platform;

pub const MATRIX_OS_VAR: &str = "MATRIX_OS";
pub const RUNTIME_VERSION_VAR: &str = "TRAVIS_PYTHON_VERSION";
pub const DOCKER_VAR: &str = "DOCKER";
pub const CODECOV_TOKEN_VAR: &str = "CODECOV_TOKEN";
pub const COVERALLS_TOKEN_VAR: &str = "COVERALLS_REPO_TOKEN";

/// Runtime version on which the diff-coverage pass runs
pub const DIFF_COVERAGE_RUNTIME: &str = "3.7";

/// Values read from the host environment once, at startup
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PipelineContext {
    pub matrix_os: String,
    pub runtime_version: String,
    pub docker: String,
    pub codecov_token: Option<String>,
    pub coveralls_token: Option<String>,
}

impl PipelineContext {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a context from any key lookup; unset and empty values are equivalent
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let token = |key: &str| lookup(key).filter(|value| !value.is_empty());
        PipelineContext {
            matrix_os: lookup(MATRIX_OS_VAR).unwrap_or_default(),
            runtime_version: lookup(RUNTIME_VERSION_VAR).unwrap_or_default(),
            docker: lookup(DOCKER_VAR).unwrap_or_default(),
            codecov_token: token(CODECOV_TOKEN_VAR),
            coveralls_token: token(COVERALLS_TOKEN_VAR),
        }
    }

    pub fn platform(&self) -> Platform {
        Platform::from_matrix_os(&self.matrix_os)
    }

    pub fn is_containerized(&self) -> bool {
        !self.docker.is_empty()
    }

    pub fn runs_diff_coverage(&self) -> bool {
        self.runtime_version == DIFF_COVERAGE_RUNTIME && !self.is_containerized()
    }
}
