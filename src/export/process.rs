use std::ffi::OsString;
use std::path::Path;
use std::sync::Arc;

use tokio::process::Command;

use crate::error::{Error, Result};

/// Everything a finished tool run produced
#[derive(Debug, Clone)]
pub struct ToolOutput {
    /// The command line as it was run, for the log
    pub command_line: String,
    pub success: bool,
    pub status: String,
    pub stdout: String,
    pub stderr: String,
}

impl ToolOutput {
    /// Command line, stdout and stderr joined for the log panel
    pub fn transcript(&self) -> String {
        let mut transcript = format!("$ {}", self.command_line);
        for stream in [&self.stdout, &self.stderr] {
            let stream = stream.trim_end();
            if !stream.is_empty() {
                transcript.push('\n');
                transcript.push_str(stream);
            }
        }
        transcript
    }
}

/// Run `program` with `args` in `working_dir` and capture its output.
///
/// Only a missing executable or a failed spawn is an error here; judging
/// the exit status is up to the caller.
pub async fn run(program: &str, args: &[OsString], working_dir: &Path) -> Result<ToolOutput> {
    let executable = which::which(program).map_err(|_| Error::ToolNotFound {
        tool: program.to_string(),
    })?;

    let command_line = std::iter::once(program.to_string())
        .chain(args.iter().map(|a| a.to_string_lossy().into_owned()))
        .collect::<Vec<_>>()
        .join(" ");
    tracing::debug!("running `{}` in {}", command_line, working_dir.display());

    let output = Command::new(&executable)
        .args(args)
        .current_dir(working_dir)
        .kill_on_drop(true)
        .output()
        .await
        .map_err(|e| Error::Spawn {
            tool: program.to_string(),
            source: Arc::new(e),
        })?;

    Ok(ToolOutput {
        command_line,
        success: output.status.success(),
        status: output.status.to_string(),
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
    })
}

/// Executable shell scripts standing in for the real renderers
#[cfg(all(test, unix))]
pub(crate) mod fake {
    use std::os::unix::fs::PermissionsExt;
    use std::path::{Path, PathBuf};

    pub fn tool(dir: &Path, name: &str, body: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        path
    }
}
