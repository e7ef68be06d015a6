//! External tool invocation.
//!
//! Every Alpino-family tool is run the same way: spawn with the working
//! directory set to the Alpino home, feed the payload (if any) to stdin,
//! close it, and drain stdout/stderr to completion. The wait is bounded by
//! the configured timeout; a hung tool is killed rather than left to pin a
//! request task forever.

use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;

use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, error};

use crate::error::ServerError;

/// Raw output of one tool invocation. stdout stays in bytes so module
/// chains can pass documents through without re-encoding.
#[derive(Debug)]
pub struct ToolOutput {
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
}

impl ToolOutput {
    pub fn stderr_text(&self) -> String {
        String::from_utf8_lossy(&self.stderr).into_owned()
    }
}

#[derive(Debug, Clone)]
pub struct ToolRunner {
    home: PathBuf,
    timeout: Duration,
}

impl ToolRunner {
    pub fn new(home: PathBuf, timeout: Duration) -> Self {
        Self { home, timeout }
    }

    /// Run `argv` with `input` on stdin and collect its full output. An
    /// empty stdout is not an error at this layer; a process that cannot be
    /// started is (`Launch`), as is one that outlives the timeout.
    pub async fn run(
        &self,
        argv: &[String],
        input: Option<&[u8]>,
    ) -> Result<ToolOutput, ServerError> {
        let (program, args) = argv
            .split_first()
            .ok_or_else(|| ServerError::Configuration("empty command line".into()))?;
        let command = argv.join(" ");
        debug!(command = %command, "invoking external tool");

        let mut child = Command::new(program)
            .args(args)
            .current_dir(&self.home)
            .stdin(if input.is_some() {
                Stdio::piped()
            } else {
                Stdio::null()
            })
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| ServerError::Launch {
                command: command.clone(),
                source,
            })?;

        // Feed stdin while draining output; a sequential write could
        // deadlock against a tool that streams as it reads. Dropping the
        // stdin handle closes the pipe so the tool sees EOF.
        let stdin = child.stdin.take();
        let feed = async {
            if let (Some(mut stdin), Some(payload)) = (stdin, input) {
                match stdin.write_all(payload).await {
                    // A tool that exits without reading its input is not a
                    // write failure; its own exit status tells the story.
                    Err(e) if e.kind() == std::io::ErrorKind::BrokenPipe => {}
                    other => other?,
                }
            }
            Ok::<_, std::io::Error>(())
        };

        // On timeout the future holding the child is dropped and
        // kill_on_drop terminates the process.
        let (fed, output) =
            tokio::time::timeout(self.timeout, async { tokio::join!(feed, child.wait_with_output()) })
                .await
                .map_err(|_| ServerError::Timeout {
                    command: command.clone(),
                    seconds: self.timeout.as_secs(),
                })?;
        fed?;
        let output = output?;

        Ok(ToolOutput {
            stdout: output.stdout,
            stderr: output.stderr,
        })
    }

    /// Variant for callers that require non-empty stdout: an empty result
    /// persists the input for diagnosis and fails with `EmptyOutput`.
    pub async fn run_stdout(
        &self,
        argv: &[String],
        input: Option<&str>,
    ) -> Result<String, ServerError> {
        let out = self.run(argv, input.map(str::as_bytes)).await?;
        if out.stdout.is_empty() {
            return Err(self.empty_output(argv, input.map(str::as_bytes), out.stderr_text()));
        }
        Ok(String::from_utf8_lossy(&out.stdout).into_owned())
    }

    /// Build the `EmptyOutput` error, persisting the payload that produced
    /// nothing to a kept tempfile for offline inspection.
    pub(crate) fn empty_output(
        &self,
        argv: &[String],
        input: Option<&[u8]>,
        stderr: String,
    ) -> ServerError {
        let command = argv.join(" ");
        let diagnostic = input.and_then(|payload| persist_payload(payload).ok());
        error!(
            command = %command,
            diagnostic = ?diagnostic,
            "external tool produced no output"
        );
        ServerError::EmptyOutput {
            command,
            stderr,
            diagnostic,
        }
    }
}

fn persist_payload(payload: &[u8]) -> std::io::Result<PathBuf> {
    use std::io::Write;

    let mut file = tempfile::Builder::new()
        .prefix("alpinoserver-input-")
        .suffix(".txt")
        .disable_cleanup(true)
        .tempfile()?;
    file.write_all(payload)?;
    Ok(file.path().to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn runner() -> ToolRunner {
        ToolRunner::new(std::env::temp_dir(), Duration::from_secs(5))
    }

    #[tokio::test]
    async fn missing_executable_is_a_launch_error() {
        let err = runner()
            .run(&["does/not/exist".to_string()], None)
            .await
            .unwrap_err();
        assert!(matches!(err, ServerError::Launch { .. }));
    }

    #[tokio::test]
    async fn empty_command_line_is_a_configuration_error() {
        let err = runner().run(&[], None).await.unwrap_err();
        assert!(matches!(err, ServerError::Configuration(_)));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn payload_is_fed_to_stdin_and_output_drained() {
        let out = runner()
            .run(&["cat".to_string()], Some(b"dit is een test"))
            .await
            .unwrap();
        assert_eq!(out.stdout, b"dit is een test");
        assert!(out.stderr.is_empty());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn empty_stdout_is_not_an_error_for_run() {
        let out = runner()
            .run(&["true".to_string()], Some(b"ignored"))
            .await
            .unwrap();
        assert!(out.stdout.is_empty());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn run_stdout_rejects_empty_output() {
        let err = runner()
            .run_stdout(&["true".to_string()], Some("payload"))
            .await
            .unwrap_err();
        match err {
            ServerError::EmptyOutput { diagnostic, .. } => {
                let path = diagnostic.expect("diagnostic file should be written");
                assert_eq!(std::fs::read(&path).unwrap(), b"payload");
                let _ = std::fs::remove_file(path);
            }
            other => panic!("expected EmptyOutput, got {other:?}"),
        }
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn hung_tool_is_terminated() {
        let runner = ToolRunner::new(std::env::temp_dir(), Duration::from_millis(200));
        let err = runner
            .run(&["sleep".to_string(), "30".to_string()], None)
            .await
            .unwrap_err();
        assert!(matches!(err, ServerError::Timeout { .. }));
    }
}
