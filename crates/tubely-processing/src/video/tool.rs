//! Bounded invocation of external media tools.

use std::ffi::OsStr;
use std::process::{Output, Stdio};
use std::time::Duration;
use tokio::process::Command;

#[derive(Debug, thiserror::Error)]
pub(crate) enum ToolError {
    #[error("failed to execute {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{program} did not finish within {timeout:?}")]
    TimedOut { program: String, timeout: Duration },
}

/// Run `program` to completion, capturing stdout and stderr.
///
/// The child is killed if it outlives `timeout` or if the returned future is dropped.
pub(crate) async fn run_tool<I, S>(
    program: &str,
    args: I,
    timeout: Duration,
) -> Result<Output, ToolError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let mut command = Command::new(program);
    command
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    match tokio::time::timeout(timeout, command.output()).await {
        Ok(Ok(output)) => Ok(output),
        Ok(Err(source)) => Err(ToolError::Spawn {
            program: program.to_string(),
            source,
        }),
        Err(_) => {
            tracing::warn!(program = %program, timeout_secs = timeout.as_secs(), "External tool timed out and was killed");
            Err(ToolError::TimedOut {
                program: program.to_string(),
                timeout,
            })
        }
    }
}
