#![allow(dead_code)]

use covrelay::types::errors::Error;
use covrelay::upload::{ReportArtifacts, UploadClient};
use covrelay::utils::exec::{CommandOutput, CommandRunner};
use std::cell::RefCell;
use std::path::{Path, PathBuf};
use std::rc::Rc;

/// Records every command and fails those whose command line starts with one of `failing`
#[derive(Default)]
pub struct FakeRunner {
    pub failing: Vec<String>,
    pub calls: RefCell<Vec<String>>,
    pub env_keys: RefCell<Vec<String>>,
}

impl FakeRunner {
    pub fn failing(prefixes: &[&str]) -> Self {
        FakeRunner {
            failing: prefixes.iter().map(|p| p.to_string()).collect(),
            ..Default::default()
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }

    pub fn ran(&self, prefix: &str) -> bool {
        self.calls.borrow().iter().any(|call| call.starts_with(prefix))
    }
}

impl CommandRunner for FakeRunner {
    fn run_with_env(
        &self,
        program: &str,
        args: &[&str],
        env: &[(&str, &str)],
    ) -> Result<CommandOutput, Error> {
        let line = format!("{} {}", program, args.join(" "));
        let success = !self.failing.iter().any(|prefix| line.starts_with(prefix));
        self.calls.borrow_mut().push(line);
        self.env_keys
            .borrow_mut()
            .extend(env.iter().map(|(key, _)| key.to_string()));

        Ok(CommandOutput {
            status: if success { "exit status: 0" } else { "exit status: 1" }.to_string(),
            success,
            stdout: String::new(),
            stderr: if success {
                String::new()
            } else {
                "simulated failure".to_string()
            },
        })
    }
}

/// Upload client that logs `name:token` and optionally fails like a network error
pub struct FakeClient {
    pub name: &'static str,
    pub fail: bool,
    pub log: Rc<RefCell<Vec<String>>>,
}

impl UploadClient for FakeClient {
    fn upload(&self, _artifacts: &ReportArtifacts<'_>, token: &str) -> Result<(), Error> {
        self.log.borrow_mut().push(format!("{}:{}", self.name, token));
        if self.fail {
            return Err(Error::CommandFailed("simulated network error".to_string()));
        }
        Ok(())
    }
}

pub fn fixture_path(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name)
}
