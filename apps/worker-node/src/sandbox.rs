// [apps/worker-node/src/sandbox.rs]
/*!
 * Local job executor. spec.md §1 carves the sandbox itself out of scope
 * ("only its input/output contract matters to the core"); this is the
 * reference contract a real worker binary needs to actually run a
 * `JOB_ASSIGN`'s `script` field and produce a `JOB_RESULT`. The process
 * plumbing (piped stdin/stdout/stderr, a `tokio::time::timeout` wrapping the
 * child) is the async analogue of the teacher's `StrategyExecutor` being run
 * inside `spawn_blocking` with a shared stop signal — here the boundary is a
 * real child process rather than an in-process compute loop.
 */

use std::process::Stdio;
use std::time::Duration;

use serde_json::Value;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use vanguard_protocol::{now_ms, JobResultError, JobResultMetrics, JobResultStatus};

use crate::errors::SandboxError;

pub struct SandboxOutcome {
    pub status: JobResultStatus,
    pub output: Option<Value>,
    pub logs: Vec<String>,
    pub error: Option<JobResultError>,
    pub metrics: JobResultMetrics,
}

/// Runs `script` through `shell -c`, feeding `input` as JSON on stdin.
/// Stdout is parsed as JSON if possible, falling back to a plain string;
/// stderr lines become the result's `logs`. A job carrying no `script` is
/// rejected outright since this worker has no other execution path.
pub async fn execute(shell: &str, script: Option<&str>, input: &Value, timeout_ms: u64) -> SandboxOutcome {
    let start_time = now_ms();

    let Some(script) = script else {
        return failure(start_time, JobResultStatus::Error, "NO_SCRIPT", SandboxError::NoScript.to_string());
    };

    match tokio::time::timeout(Duration::from_millis(timeout_ms), run_script(shell, script, input)).await {
        Ok(Ok((stdout, stderr))) => {
            let end_time = now_ms();
            let trimmed = stdout.trim();
            let output = if trimmed.is_empty() {
                None
            } else {
                Some(serde_json::from_str::<Value>(trimmed).unwrap_or_else(|_| Value::String(trimmed.to_string())))
            };
            let logs = stderr.lines().map(str::to_string).filter(|line| !line.is_empty()).collect();
            SandboxOutcome {
                status: JobResultStatus::Success,
                output,
                logs,
                error: None,
                metrics: JobResultMetrics { start_time, end_time, duration_ms: end_time - start_time },
            }
        }
        Ok(Err(fault)) => failure(start_time, JobResultStatus::Error, "SPAWN_FAULT", fault.to_string()),
        Err(_) => failure(start_time, JobResultStatus::Timeout, "TIMEOUT", SandboxError::Timeout(timeout_ms).to_string()),
    }
}

fn failure(start_time: i64, status: JobResultStatus, code: &str, message: String) -> SandboxOutcome {
    let end_time = now_ms();
    SandboxOutcome {
        status,
        output: None,
        logs: vec![],
        error: Some(JobResultError { code: code.to_string(), message, stack: None }),
        metrics: JobResultMetrics { start_time, end_time, duration_ms: end_time - start_time },
    }
}

async fn run_script(shell: &str, script: &str, input: &Value) -> Result<(String, String), SandboxError> {
    let mut child = Command::new(shell)
        .arg("-c")
        .arg(script)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|fault| SandboxError::Spawn(fault.to_string()))?;

    if let Some(mut stdin) = child.stdin.take() {
        let payload = serde_json::to_vec(input).unwrap_or_default();
        let _ = stdin.write_all(&payload).await;
    }

    let output = child.wait_with_output().await.map_err(|fault| SandboxError::Spawn(fault.to_string()))?;
    Ok((String::from_utf8_lossy(&output.stdout).into_owned(), String::from_utf8_lossy(&output.stderr).into_owned()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn executes_a_script_and_captures_stdout_as_output() {
        let outcome = execute("sh", Some("echo '{\"ok\":true}'"), &json!({}), 5_000).await;
        assert!(matches!(outcome.status, JobResultStatus::Success));
        assert_eq!(outcome.output, Some(json!({"ok": true})));
    }

    #[tokio::test]
    async fn missing_script_is_rejected() {
        let outcome = execute("sh", None, &json!({}), 5_000).await;
        assert!(matches!(outcome.status, JobResultStatus::Error));
        assert_eq!(outcome.error.unwrap().code, "NO_SCRIPT");
    }

    #[tokio::test]
    async fn a_slow_script_times_out() {
        let outcome = execute("sh", Some("sleep 2"), &json!({}), 50).await;
        assert!(matches!(outcome.status, JobResultStatus::Timeout));
    }
}
