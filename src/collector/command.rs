// src/collector/command.rs
//! Process seam for collectors that shell out to external tools.

use std::io;
use std::path::PathBuf;
use std::process::Command;

/// Captured result of one finished child process.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CommandOutput {
    /// Exit code, `None` when the process was killed by a signal.
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

/// Locates and runs external programs.
///
/// `run` must block until the child has exited and both pipes are drained,
/// and must not leave the child or its pipes behind on any return path.
pub trait CommandRunner {
    /// Resolve `program` the way a shell would, `None` if it cannot be found.
    fn locate(&self, program: &str) -> Option<PathBuf>;

    /// Run `program` with `args`, capturing stdout, stderr and exit status.
    fn run(&self, program: &str, args: &[&str]) -> io::Result<CommandOutput>;
}

impl<R: CommandRunner + ?Sized> CommandRunner for &R {
    fn locate(&self, program: &str) -> Option<PathBuf> {
        (**self).locate(program)
    }

    fn run(&self, program: &str, args: &[&str]) -> io::Result<CommandOutput> {
        (**self).run(program, args)
    }
}

/// Runner backed by `std::process::Command` and the search path.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn locate(&self, program: &str) -> Option<PathBuf> {
        which::which(program).ok()
    }

    fn run(&self, program: &str, args: &[&str]) -> io::Result<CommandOutput> {
        // output() owns the child and both pipes, they are released when it returns.
        let output = Command::new(program).args(args).output()?;

        Ok(CommandOutput {
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}
