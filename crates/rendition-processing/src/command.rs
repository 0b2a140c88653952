use crate::error::{ProcessingError, ProcessingResult};
use std::ffi::OsStr;
use std::process::Stdio;
use tokio::process::Command;

/// Run an external tool to completion, surfacing stderr on a non-zero exit.
pub(crate) async fn run_tool<I, S>(tool: &str, args: I) -> ProcessingResult<()>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let start = std::time::Instant::now();

    let output = Command::new(tool)
        .args(args)
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .output()
        .await
        .map_err(|source| ProcessingError::Spawn {
            tool: tool.to_string(),
            source,
        })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        return Err(ProcessingError::ToolFailed {
            tool: tool.to_string(),
            stderr,
        });
    }

    tracing::debug!(
        tool = %tool,
        duration_ms = start.elapsed().as_secs_f64() * 1000.0,
        "External tool finished"
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_tool_is_spawn_error() {
        let err = run_tool("rendition-no-such-tool", ["--version"])
            .await
            .unwrap_err();
        assert!(matches!(err, ProcessingError::Spawn { .. }));
    }
}
