//! Single feature execution
//!
//! Runs the external BDD runner against one feature file and normalizes
//! every way that can end into an [`ExecutionResult`].

use async_trait::async_trait;
use std::io;
use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::Command;
use tokio::task::JoinHandle;
use tokio::time::{timeout_at, Instant};
use tracing::{debug, warn};

use super::Execute;
use crate::models::{ExecutionResult, WorkItem, FAILURE_SENTINEL};
use crate::utils::Timer;

/// Per-item wall-clock limit (5 minutes)
pub const DEFAULT_TIMEOUT_SECS: u64 = 300;

/// Runner for a single feature file
#[derive(Clone, Debug)]
pub struct FeatureRunner {
    command: String,
    timeout: Duration,
    working_dir: Option<PathBuf>,
}

impl FeatureRunner {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            working_dir: None,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    pub fn command(&self) -> &str {
        &self.command
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    fn build_command(&self, item: &WorkItem) -> Command {
        let mut command = Command::new(&self.command);
        command
            .args(item.command_args())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        if let Some(dir) = &self.working_dir {
            command.current_dir(dir);
        }

        command
    }

    /// Run one feature file
    pub async fn run(&self, item: &WorkItem) -> ExecutionResult {
        let id = item.id();
        debug!("Running: {}", item.command_line(&self.command));

        let timer = Timer::start(&id);
        let deadline = Instant::now() + self.timeout;

        let mut child = match self.build_command(item).spawn() {
            Ok(child) => child,
            Err(e) => {
                warn!("Failed to launch {} for {}: {}", self.command, id, e);
                return ExecutionResult::launch_error(id, format!("{}: {e}", self.command));
            }
        };

        // Both pipes drain on their own tasks so a chatty stream cannot
        // block the child on a full buffer of the other.
        let stdout_task = child.stdout.take().map(|pipe| tokio::spawn(read_pipe(pipe)));
        let stderr_task = child.stderr.take().map(|pipe| tokio::spawn(read_pipe(pipe)));
        let abort_handles: Vec<_> = stdout_task
            .iter()
            .chain(stderr_task.iter())
            .map(|handle| handle.abort_handle())
            .collect();

        let finished = timeout_at(deadline, async {
            let status = child.wait().await?;
            let stdout = collect_output(stdout_task).await?;
            let stderr = collect_output(stderr_task).await?;
            Ok::<_, io::Error>((status, stdout, stderr))
        })
        .await;

        match finished {
            Ok(Ok((status, stdout, stderr))) => {
                let exit_status = status.code().unwrap_or(FAILURE_SENTINEL);
                let elapsed = timer.stop();
                debug!("{} exited with {} in {}ms", id, exit_status, elapsed.as_millis());
                ExecutionResult::completed(id, exit_status, stdout, stderr, elapsed)
            }
            Ok(Err(e)) => {
                warn!("I/O failure while running {}: {}", id, e);
                abort_all(&abort_handles);
                if let Err(e) = child.start_kill() {
                    debug!("Failed to kill runner for {}: {}", id, e);
                }
                ExecutionResult::launch_error(id, e.to_string())
            }
            Err(_) => {
                warn!("{} timed out after {:?}", id, self.timeout);
                abort_all(&abort_handles);
                if let Err(e) = child.kill().await {
                    debug!("Failed to kill runner for {}: {}", id, e);
                }
                ExecutionResult::timed_out(id, self.timeout)
            }
        }
    }
}

#[async_trait]
impl Execute for FeatureRunner {
    async fn execute(&self, item: &WorkItem) -> ExecutionResult {
        self.run(item).await
    }
}

async fn read_pipe<R>(mut pipe: R) -> io::Result<String>
where
    R: AsyncRead + Unpin,
{
    let mut buffer = Vec::new();
    pipe.read_to_end(&mut buffer).await?;
    Ok(String::from_utf8_lossy(&buffer).into_owned())
}

async fn collect_output(task: Option<JoinHandle<io::Result<String>>>) -> io::Result<String> {
    match task {
        Some(handle) => handle.await.map_err(io::Error::other)?,
        None => Ok(String::new()),
    }
}

fn abort_all(handles: &[tokio::task::AbortHandle]) {
    for handle in handles {
        handle.abort();
    }
}
