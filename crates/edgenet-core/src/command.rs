//! External command execution.
//!
//! The iptables facade never spawns processes itself; it goes through a
//! [`CommandRunner`] so tests can script outputs and observe invocations.

use edgenet_common::error::{EdgenetError, Result};

/// Captured result of an external command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// Standard output, decoded lossily.
    pub stdout: String,
    /// Standard error, decoded lossily.
    pub stderr: String,
    /// Exit code, or `-1` if the process was killed by a signal.
    pub exit_code: i32,
}

impl CommandOutput {
    /// Returns a successful output with the given stdout.
    #[must_use]
    pub fn success(stdout: impl Into<String>) -> Self {
        Self {
            stdout: stdout.into(),
            ..Self::default()
        }
    }

    /// Returns whether the command exited with status zero.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.exit_code == 0
    }

    /// Returns stdout split into lines, terminators stripped.
    #[must_use]
    pub fn lines(&self) -> Vec<String> {
        self.stdout.lines().map(str::to_string).collect()
    }
}

/// Runs a program with arguments and captures its output.
pub trait CommandRunner: Send + Sync {
    /// Runs `program` with `args` to completion.
    ///
    /// A non-zero exit is not an error at this level; it is reported in
    /// [`CommandOutput::exit_code`].
    ///
    /// # Errors
    ///
    /// Returns an error if the process cannot be spawned.
    fn run(&self, program: &str, args: &[String]) -> Result<CommandOutput>;
}

/// [`CommandRunner`] backed by [`std::process::Command`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemCommandRunner;

impl CommandRunner for SystemCommandRunner {
    fn run(&self, program: &str, args: &[String]) -> Result<CommandOutput> {
        tracing::trace!(program, args = ?args, "running command");

        let output = std::process::Command::new(program)
            .args(args)
            .output()
            .map_err(|e| EdgenetError::Io {
                path: program.into(),
                source: e,
            })?;

        Ok(CommandOutput {
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            exit_code: output.status.code().unwrap_or(-1),
        })
    }
}
