//! External tool execution bounded by a timeout and a cancellation token.

use std::collections::VecDeque;
use std::fmt;
use std::io;
use std::path::PathBuf;
use std::process::{ExitStatus, Stdio};
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::{Child, Command};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use super::error::ConverterError;
use super::types::{ConversionStage, ToolOutput};

/// Only the tail of each stream is kept; tools put the fatal line last.
const MAX_CAPTURE_BYTES: usize = 64 * 1024;

const READ_CHUNK_BYTES: usize = 8 * 1024;

enum Waited {
    Exited(io::Result<ExitStatus>),
    TimedOut,
    Cancelled,
}

/// A single invocation of an external tool.
#[derive(Debug, Clone)]
pub struct ToolCommand {
    tool: &'static str,
    program: PathBuf,
    args: Vec<String>,
    timeout: Duration,
    capture_stdout: bool,
    stage: ConversionStage,
}

impl ToolCommand {
    /// `tool` is the human name used in errors, `program` the binary to run.
    pub fn new(tool: &'static str, program: impl Into<PathBuf>, stage: ConversionStage) -> Self {
        Self {
            tool,
            program: program.into(),
            args: Vec::new(),
            timeout: Duration::from_secs(30),
            capture_stdout: false,
            stage,
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Pipe stdout back to the caller instead of discarding it.
    pub fn capture_stdout(mut self) -> Self {
        self.capture_stdout = true;
        self
    }

    /// Runs the tool to completion.
    ///
    /// A non-zero exit is not an error here; the caller inspects the returned
    /// [`ToolOutput`]. On timeout or cancellation the child is killed and reaped
    /// before this returns.
    pub async fn run(&self, cancel: &CancellationToken) -> Result<ToolOutput, ConverterError> {
        if cancel.is_cancelled() {
            return Err(ConverterError::Cancelled { stage: self.stage });
        }

        let stdout = if self.capture_stdout {
            Stdio::piped()
        } else {
            Stdio::null()
        };

        debug!(tool = self.tool, command = %self, "Spawning external tool");

        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::null())
            .stdout(stdout)
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| self.spawn_error(e))?;

        let stdout_task = child.stdout.take().map(|out| tokio::spawn(read_tail(out)));
        let stderr_task = child.stderr.take().map(|err| tokio::spawn(read_tail(err)));

        let waited = tokio::select! {
            status = child.wait() => Waited::Exited(status),
            _ = tokio::time::sleep(self.timeout) => Waited::TimedOut,
            _ = cancel.cancelled() => Waited::Cancelled,
        };

        let status = match waited {
            Waited::Exited(status) => status.map_err(|e| {
                ConverterError::conversion_failed(
                    self.stage,
                    format!("failed to wait for {}", self.tool),
                    Some(e.to_string()),
                )
            })?,
            Waited::TimedOut => {
                self.terminate(&mut child).await;
                return Err(ConverterError::Timeout {
                    stage: self.stage,
                    timeout_secs: self.timeout.as_secs(),
                });
            }
            Waited::Cancelled => {
                self.terminate(&mut child).await;
                return Err(ConverterError::Cancelled { stage: self.stage });
            }
        };

        Ok(ToolOutput {
            exit_code: status.code(),
            stdout: collect(stdout_task).await,
            stderr: collect(stderr_task).await,
        })
    }

    async fn terminate(&self, child: &mut Child) {
        // kill() also waits, so the process is gone once this returns.
        if let Err(e) = child.kill().await {
            warn!(tool = self.tool, error = %e, "Failed to kill external tool");
        }
    }

    fn spawn_error(&self, err: io::Error) -> ConverterError {
        match err.kind() {
            io::ErrorKind::NotFound | io::ErrorKind::PermissionDenied => {
                ConverterError::ToolUnavailable {
                    tool: self.tool,
                    path: self.program.clone(),
                    reason: err.to_string(),
                }
            }
            _ => ConverterError::conversion_failed(
                self.stage,
                format!("failed to start {}", self.tool),
                Some(err.to_string()),
            ),
        }
    }
}

impl fmt::Display for ToolCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program.display())?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

/// Drains `reader`, keeping at most the last `limit` bytes.
async fn read_tail_capped<R: AsyncRead + Unpin>(mut reader: R, limit: usize) -> String {
    let mut tail: VecDeque<u8> = VecDeque::with_capacity(limit.min(READ_CHUNK_BYTES));
    let mut chunk = [0u8; READ_CHUNK_BYTES];

    loop {
        match reader.read(&mut chunk).await {
            Ok(0) => break,
            Ok(n) => {
                let data = &chunk[..n];
                let data = &data[data.len().saturating_sub(limit)..];
                let overflow = (tail.len() + data.len()).saturating_sub(limit);
                tail.drain(..overflow);
                tail.extend(data);
            }
            Err(e) => {
                debug!(error = %e, "Stopped reading tool output");
                break;
            }
        }
    }

    String::from_utf8_lossy(tail.make_contiguous()).into_owned()
}

async fn read_tail<R: AsyncRead + Unpin>(reader: R) -> String {
    read_tail_capped(reader, MAX_CAPTURE_BYTES).await
}

async fn collect(task: Option<JoinHandle<String>>) -> String {
    match task {
        Some(handle) => handle.await.unwrap_or_default(),
        None => String::new(),
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::time::Instant;

    fn sh(script: &str) -> ToolCommand {
        ToolCommand::new("sh", "sh", ConversionStage::Converting).args(["-c", script])
    }

    #[tokio::test]
    async fn test_captures_stdout_and_stderr_separately() {
        let output = sh("echo hello; echo oops >&2")
            .capture_stdout()
            .run(&CancellationToken::new())
            .await
            .unwrap();

        assert!(output.success());
        assert_eq!(output.stdout, "hello\n");
        assert_eq!(output.stderr, "oops\n");
    }

    #[tokio::test]
    async fn test_stdout_discarded_by_default() {
        let output = sh("echo hello").run(&CancellationToken::new()).await.unwrap();
        assert!(output.success());
        assert!(output.stdout.is_empty());
    }

    #[tokio::test]
    async fn test_non_zero_exit_is_returned() {
        let output = sh("echo 'bad input' >&2; exit 3")
            .run(&CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(output.exit_code, Some(3));
        assert_eq!(output.diagnostic(), Some("bad input".to_string()));
    }

    #[tokio::test]
    async fn test_missing_binary_is_tool_unavailable() {
        let err = ToolCommand::new("ffmpeg", "/nonexistent/ffmpeg", ConversionStage::Validating)
            .arg("-version")
            .run(&CancellationToken::new())
            .await
            .unwrap_err();

        assert!(matches!(err, ConverterError::ToolUnavailable { tool: "ffmpeg", .. }));
    }

    #[tokio::test]
    async fn test_timeout_kills_process() {
        let start = Instant::now();
        let err = sh("sleep 10")
            .timeout(Duration::from_millis(100))
            .run(&CancellationToken::new())
            .await
            .unwrap_err();

        assert!(matches!(err, ConverterError::Timeout { .. }));
        assert!(start.elapsed() < Duration::from_secs(5));
    }

    #[tokio::test]
    async fn test_cancellation_kills_process() {
        let cancel = CancellationToken::new();
        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(100)).await;
            trigger.cancel();
        });

        let start = Instant::now();
        let err = sh("sleep 10").run(&cancel).await.unwrap_err();

        assert!(matches!(
            err,
            ConverterError::Cancelled {
                stage: ConversionStage::Converting
            }
        ));
        assert!(start.elapsed() < Duration::from_secs(5));
    }

    #[tokio::test]
    async fn test_already_cancelled_does_not_spawn() {
        let cancel = CancellationToken::new();
        cancel.cancel();

        let err = ToolCommand::new("ffmpeg", "/nonexistent/ffmpeg", ConversionStage::Converting)
            .run(&cancel)
            .await
            .unwrap_err();

        // Cancellation wins over the missing binary because nothing was spawned.
        assert!(matches!(err, ConverterError::Cancelled { .. }));
    }

    #[tokio::test]
    async fn test_read_tail_keeps_last_bytes() {
        assert_eq!(read_tail_capped(&b"abcdefghij"[..], 4).await, "ghij");
        assert_eq!(read_tail_capped(&b"abc"[..], 4).await, "abc");
        assert_eq!(read_tail_capped(&b"abc"[..], 0).await, "");
    }

    #[tokio::test]
    async fn test_read_tail_across_chunks() {
        let data: Vec<u8> = (0..3 * READ_CHUNK_BYTES + 123)
            .map(|i| b'a' + (i % 26) as u8)
            .collect();
        let limit = READ_CHUNK_BYTES + 7;

        let tail = read_tail_capped(&data[..], limit).await;

        assert_eq!(tail.len(), limit);
        assert_eq!(tail.as_bytes(), &data[data.len() - limit..]);
    }

    #[tokio::test]
    async fn test_noisy_stderr_is_capped() {
        let output = sh("head -c 200000 /dev/zero | tr '\\0' x >&2; echo END >&2; exit 1")
            .run(&CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(output.stderr.len(), MAX_CAPTURE_BYTES);
        assert!(output.stderr.ends_with("xEND\n"));
    }

    #[test]
    fn test_display_includes_args() {
        let cmd = ToolCommand::new("ffmpeg", "ffmpeg", ConversionStage::Converting)
            .args(["-i", "in.mp4"]);
        assert_eq!(cmd.to_string(), "ffmpeg -i in.mp4");
    }
}
