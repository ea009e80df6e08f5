//! smartctl process execution
//!
//! Handles invocation of the external tool:
//! - Captures stdout whatever the exit status is
//! - Reports the exit code separately, callers decide what it means
//! - Optional timeout (off by default); the child is killed when it expires

use crate::error::SmartctlError;
use async_trait::async_trait;
use std::path::PathBuf;
use std::process::Stdio;
use std::time::{Duration, Instant};
use tokio::process::Command as AsyncCommand;
use tracing::debug;

/// Captured result of one smartctl run
#[derive(Debug, Clone, Default)]
pub struct SmartctlOutput {
    pub stdout: String,
    /// `None` when the process was terminated by a signal
    pub exit_code: Option<i32>,
}

/// Seam between the core and the smartctl binary
#[async_trait]
pub trait SmartctlRunner: Send + Sync {
    async fn run(&self, args: &[String]) -> Result<SmartctlOutput, SmartctlError>;
}

/// Runs the real smartctl binary
#[derive(Debug, Clone)]
pub struct SmartctlCommand {
    path: PathBuf,
    timeout: Option<Duration>,
}

impl SmartctlCommand {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self {
            path: path.into(),
            timeout: None,
        }
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    fn launch_error(&self, source: std::io::Error) -> SmartctlError {
        SmartctlError::Launch {
            program: self.path.display().to_string(),
            source,
        }
    }
}

#[async_trait]
impl SmartctlRunner for SmartctlCommand {
    async fn run(&self, args: &[String]) -> Result<SmartctlOutput, SmartctlError> {
        let start_time = Instant::now();
        debug!("Calling {} {}", self.path.display(), args.join(" "));

        let output = AsyncCommand::new(&self.path)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output();

        let output = match self.timeout {
            Some(limit) => tokio::time::timeout(limit, output)
                .await
                .map_err(|_| SmartctlError::TimedOut(limit))?,
            None => output.await,
        }
        .map_err(|e| self.launch_error(e))?;

        debug!(
            "smartctl exited with {:?} after {}ms",
            output.status.code(),
            start_time.elapsed().as_millis()
        );

        Ok(SmartctlOutput {
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            exit_code: output.status.code(),
        })
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn test_stdout_captured_on_failure_exit() {
        let runner = SmartctlCommand::new("sh");
        let output = runner
            .run(&args(&["-c", "printf '{\"x\":1}'; exit 4"]))
            .await
            .unwrap();

        assert_eq!(output.stdout, "{\"x\":1}");
        assert_eq!(output.exit_code, Some(4));
    }

    #[tokio::test]
    async fn test_missing_binary_is_launch_error() {
        let runner = SmartctlCommand::new("/nonexistent/smartctl");
        let err = runner.run(&args(&["--scan"])).await.unwrap_err();
        assert!(matches!(err, SmartctlError::Launch { .. }));
        assert!(err.to_string().contains("/nonexistent/smartctl"));
    }

    #[tokio::test]
    async fn test_timeout() {
        let runner = SmartctlCommand::new("sh").with_timeout(Some(Duration::from_millis(100)));
        let err = runner.run(&args(&["-c", "sleep 5"])).await.unwrap_err();
        assert!(matches!(err, SmartctlError::TimedOut(_)));
    }
}
