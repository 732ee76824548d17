//! External process launcher
//!
//! Starts a program with the parent's environment and standard streams,
//! then waits for it to exit.

use std::path::PathBuf;
use std::process::Stdio;
use thiserror::Error;
use tokio::process::Command;
use tracing::debug;

/// Errors while running a child process
#[derive(Debug, Error)]
pub enum ProcessError {
    #[error("Error starting process {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Error waiting for process: {0}")]
    Wait(#[source] std::io::Error),
}

/// What to run and where
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchSpec {
    pub program: String,
    pub args: Vec<String>,
    pub dir: PathBuf,
}

impl Default for LaunchSpec {
    /// `ls -l /` in the filesystem root
    fn default() -> Self {
        Self {
            program: "ls".to_string(),
            args: vec!["-l".to_string(), "/".to_string()],
            dir: PathBuf::from("/"),
        }
    }
}

/// Run the program to completion and return its exit code
///
/// A child terminated by a signal has no exit code and reports `-1`.
pub async fn launch(spec: &LaunchSpec) -> Result<i32, ProcessError> {
    let mut child = Command::new(&spec.program)
        .args(&spec.args)
        .current_dir(&spec.dir)
        .stdin(Stdio::inherit())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .spawn()
        .map_err(|source| ProcessError::Spawn {
            program: spec.program.clone(),
            source,
        })?;
    debug!(program = %spec.program, pid = ?child.id(), "Process started");

    let status = child.wait().await.map_err(ProcessError::Wait)?;
    Ok(status.code().unwrap_or(-1))
}

#[cfg(test)]
#[path = "process_test.rs"]
mod tests;
