//! Encoder process execution.
//!
//! [`ProcessRunner`] runs an [`EncoderCommand`] to completion on the calling
//! thread. There is no timeout: a hung encoder blocks until it exits.

use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::sync::OnceLock;

use crate::EncoderCommand;

/// Exit status and captured output of one encoder run.
#[derive(Debug, Clone)]
pub struct ProcessOutput {
    /// Exit code, `None` when the process was killed by a signal.
    pub exit_code: Option<i32>,
    /// Standard output followed by standard error (lossy UTF-8).
    pub output: String,
}

impl ProcessOutput {
    /// Whether the process exited with code 0.
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }
}

/// Runs encoder commands, optionally at reduced scheduling priority.
///
/// Whether `nice` is usable is probed on first use and cached for the
/// lifetime of the runner. Share one runner (behind an `Arc`) to probe once.
#[derive(Debug)]
pub struct ProcessRunner {
    nice_program: PathBuf,
    nice_available: OnceLock<bool>,
}

impl Default for ProcessRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl ProcessRunner {
    /// Create a runner that probes for `nice` lazily.
    pub fn new() -> Self {
        Self {
            nice_program: PathBuf::from("nice"),
            nice_available: OnceLock::new(),
        }
    }

    /// Create a runner that never wraps commands in `nice`.
    pub fn without_nice() -> Self {
        Self {
            nice_program: PathBuf::from("nice"),
            nice_available: OnceLock::from(false),
        }
    }

    /// Whether the `nice` wrapper can be used. Probed at most once.
    pub fn nice_available(&self) -> bool {
        *self
            .nice_available
            .get_or_init(|| probe_nice(&self.nice_program))
    }

    /// Execute `command` and wait for it to finish.
    ///
    /// A non-zero exit code is returned as data, not as an error. Errors are
    /// limited to failures to spawn or wait for the process.
    pub fn run(&self, command: &EncoderCommand, use_nice: bool) -> io::Result<ProcessOutput> {
        let command = if use_nice && self.nice_available() {
            command.niced(&self.nice_program)
        } else {
            command.clone()
        };

        tracing::debug!(command = %command, "executing encoder");

        let mut cmd = command.to_command();
        let output = cmd.stdin(Stdio::null()).output()?;

        let mut merged = String::from_utf8_lossy(&output.stdout).into_owned();
        merged.push_str(&String::from_utf8_lossy(&output.stderr));

        Ok(ProcessOutput {
            exit_code: output.status.code(),
            output: merged,
        })
    }

    /// Execute an encoder that writes `destination`.
    ///
    /// On a zero exit the destination's mode is aligned with its parent
    /// directory. On any other exit whatever the encoder left at
    /// `destination` is removed, so a failed run never leaves a partial file.
    pub fn run_to(
        &self,
        command: &EncoderCommand,
        destination: &Path,
        use_nice: bool,
    ) -> io::Result<ProcessOutput> {
        let output = self.run(command, use_nice)?;

        if output.success() {
            if let Err(e) = sync_permissions_with_parent(destination) {
                tracing::warn!(
                    destination = %destination.display(),
                    error = %e,
                    "failed to adjust destination permissions"
                );
            }
        } else {
            remove_partial_output(destination);
        }

        Ok(output)
    }
}

/// Delete a file left behind by a failed encoder run.
pub fn remove_partial_output(destination: &Path) {
    match std::fs::remove_file(destination) {
        Ok(()) => {
            tracing::debug!(destination = %destination.display(), "removed partial output");
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => {
            tracing::warn!(
                destination = %destination.display(),
                error = %e,
                "failed to remove partial output"
            );
        }
    }
}

/// Run the wrapper once with no arguments; a clean exit means it is usable.
fn probe_nice(program: &Path) -> bool {
    let available = Command::new(program)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|status| status.success())
        .unwrap_or(false);

    tracing::debug!(available, "probed for nice");
    available
}

/// Human-readable description of an encoder exit code.
pub fn describe_exit_code(code: Option<i32>) -> String {
    match code {
        Some(0) => "exited successfully".to_string(),
        Some(126) => "exit code 126 (binary is not executable)".to_string(),
        Some(127) => "exit code 127 (binary or one of its libraries was not found)".to_string(),
        Some(code) => format!("exit code {code}"),
        None => "terminated by signal".to_string(),
    }
}

/// Reset `destination`'s mode to its parent directory's mode with the
/// executable bits cleared (`parent & 0o666`).
///
/// Encoders write files with a fixed mode; this aligns them with the host's
/// policy for the destination folder.
#[cfg(unix)]
pub fn sync_permissions_with_parent(destination: &Path) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;

    let parent = match destination.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };

    let parent_mode = std::fs::metadata(parent)?.permissions().mode();
    std::fs::set_permissions(
        destination,
        std::fs::Permissions::from_mode(parent_mode & 0o666),
    )
}

/// No-op on platforms without POSIX permission bits.
#[cfg(not(unix))]
pub fn sync_permissions_with_parent(_destination: &Path) -> io::Result<()> {
    Ok(())
}
