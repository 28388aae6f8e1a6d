//! External process execution.
//!
//! Every call to `adb` or `aapt` goes through [`ToolRunner`], so the
//! device and decoder logic can be driven by scripted output in tests.

use async_trait::async_trait;
use std::process::Stdio;
use tokio::process::Command;
use tracing::debug;

use crate::error::ScanError;

/// Captured result of one external command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToolOutput {
    /// Exit status, `None` when the process was killed by a signal.
    pub status: Option<i32>,
    pub stdout: String,
}

impl ToolOutput {
    pub fn new(status: i32, stdout: impl Into<String>) -> Self {
        Self {
            status: Some(status),
            stdout: stdout.into(),
        }
    }

    pub fn success(&self) -> bool {
        self.status == Some(0)
    }
}

/// Runs a program to completion and captures its standard output.
///
/// There is no timeout: a hung tool blocks the caller.
#[async_trait]
pub trait ToolRunner: Send + Sync {
    async fn run(&self, program: &str, args: &[String]) -> Result<ToolOutput, ScanError>;
}

/// Runs real processes on the host.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

#[async_trait]
impl ToolRunner for SystemRunner {
    async fn run(&self, program: &str, args: &[String]) -> Result<ToolOutput, ScanError> {
        debug!(program, ?args, "spawning");

        let output = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|source| ScanError::Spawn {
                program: program.to_string(),
                source,
            })?;

        let status = output.status.code();
        if !output.stderr.is_empty() {
            debug!(program, stderr = %String::from_utf8_lossy(&output.stderr).trim_end());
        }
        debug!(program, ?status, stdout_bytes = output.stdout.len(), "finished");

        Ok(ToolOutput {
            status,
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        })
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::sync::Mutex;

    type Responder = dyn Fn(&str, &[String]) -> Result<ToolOutput, ScanError> + Send + Sync;

    /// Scripted runner that records every invocation.
    pub struct FakeRunner {
        calls: Mutex<Vec<(String, Vec<String>)>>,
        respond: Box<Responder>,
    }

    impl FakeRunner {
        pub fn new(
            respond: impl Fn(&str, &[String]) -> Result<ToolOutput, ScanError> + Send + Sync + 'static,
        ) -> Self {
            Self {
                calls: Mutex::new(Vec::new()),
                respond: Box::new(respond),
            }
        }

        pub fn calls(&self) -> Vec<(String, Vec<String>)> {
            self.calls.lock().unwrap().clone()
        }

        /// Invocations whose arguments start with `prefix`.
        pub fn calls_starting_with(&self, prefix: &[&str]) -> Vec<Vec<String>> {
            self.calls()
                .into_iter()
                .map(|(_, args)| args)
                .filter(|args| {
                    args.len() >= prefix.len() && args.iter().zip(prefix).all(|(a, p)| a == p)
                })
                .collect()
        }
    }

    #[async_trait]
    impl ToolRunner for FakeRunner {
        async fn run(&self, program: &str, args: &[String]) -> Result<ToolOutput, ScanError> {
            self.calls
                .lock()
                .unwrap()
                .push((program.to_string(), args.to_vec()));
            (self.respond)(program, args)
        }
    }
}
