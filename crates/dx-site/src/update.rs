//! Pulling new document content.
//!
//! A refresh starts by asking a [`ContentUpdater`] to fetch the latest
//! content. [`CommandUpdater`] runs an external command (by default
//! `git pull` in the document root) with a bounded runtime.

use std::io::Read;
use std::path::PathBuf;
use std::process::{Command, ExitStatus, Stdio};
use std::thread;
use std::time::{Duration, Instant};

const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Error returned when pulling content fails.
///
/// Any variant aborts the refresh with the current state left untouched.
#[derive(Debug, thiserror::Error)]
pub enum UpdateError {
    /// The command could not be started.
    #[error("Failed to run {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
    /// Waiting on the command failed.
    #[error("Failed to wait for {program}: {source}")]
    Wait {
        program: String,
        #[source]
        source: std::io::Error,
    },
    /// The command exited unsuccessfully.
    #[error("{program} failed ({status}): {stderr}")]
    Failed {
        program: String,
        status: ExitStatus,
        stderr: String,
    },
    /// The command did not finish in time and was killed.
    #[error("{program} timed out after {}s", .timeout.as_secs())]
    Timeout { program: String, timeout: Duration },
}

/// Fetches new document content.
pub trait ContentUpdater: Send + Sync {
    /// Bring the document root up to date.
    fn pull(&self) -> Result<(), UpdateError>;
}

/// Updater that does nothing, for sites whose content changes in place.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopUpdater;

impl ContentUpdater for NoopUpdater {
    fn pull(&self) -> Result<(), UpdateError> {
        Ok(())
    }
}

/// Runs an external command to update content.
#[derive(Clone, Debug)]
pub struct CommandUpdater {
    program: String,
    args: Vec<String>,
    current_dir: Option<PathBuf>,
    timeout: Duration,
}

impl CommandUpdater {
    /// Default time a command may run before it is killed.
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

    #[must_use]
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            current_dir: None,
            timeout: Self::DEFAULT_TIMEOUT,
        }
    }

    /// `git pull` in `dir`.
    #[must_use]
    pub fn git_pull(dir: impl Into<PathBuf>) -> Self {
        Self::new("git").args(["pull"]).current_dir(dir)
    }

    #[must_use]
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    #[must_use]
    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.current_dir = Some(dir.into());
        self
    }

    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl ContentUpdater for CommandUpdater {
    fn pull(&self) -> Result<(), UpdateError> {
        let mut command = Command::new(&self.program);
        command
            .args(&self.args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped());
        if let Some(dir) = &self.current_dir {
            command.current_dir(dir);
        }

        let mut child = command.spawn().map_err(|source| UpdateError::Spawn {
            program: self.program.clone(),
            source,
        })?;

        // Drain stderr concurrently so a chatty command cannot block on a full pipe
        let stderr = child.stderr.take();
        let stderr_reader = thread::spawn(move || {
            let mut output = String::new();
            if let Some(mut stderr) = stderr {
                let _ = stderr.read_to_string(&mut output);
            }
            output
        });

        let deadline = Instant::now() + self.timeout;
        let status = loop {
            match child.try_wait() {
                Ok(Some(status)) => break status,
                Ok(None) if Instant::now() >= deadline => {
                    // Grandchildren may keep stderr open, so the reader is detached
                    let _ = child.kill();
                    let _ = child.wait();
                    return Err(UpdateError::Timeout {
                        program: self.program.clone(),
                        timeout: self.timeout,
                    });
                }
                Ok(None) => thread::sleep(POLL_INTERVAL),
                Err(source) => {
                    let _ = child.kill();
                    return Err(UpdateError::Wait {
                        program: self.program.clone(),
                        source,
                    });
                }
            }
        };

        let stderr = stderr_reader.join().unwrap_or_default();
        if status.success() {
            tracing::debug!(program = %self.program, "Content updated");
            Ok(())
        } else {
            Err(UpdateError::Failed {
                program: self.program.clone(),
                status,
                stderr: stderr.trim().to_owned(),
            })
        }
    }
}
