//! Running external commands.
//!
//! Every external tool goes through the [`Runner`] trait. [`SystemRunner`]
//! spawns real processes; [`RecordingRunner`] records invocations instead, so
//! update flows can be exercised without `git`, `tar` or the build server.

use std::cell::RefCell;
use std::ffi::{OsStr, OsString};
use std::fmt;
use std::path::{Path, PathBuf};
use std::process::Command;

use crate::error::{Result, ToolError};

/// A command line to run, optionally in a specific directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    program: OsString,
    args: Vec<OsString>,
    cwd: Option<PathBuf>,
}

impl Invocation {
    pub fn new(program: impl AsRef<OsStr>) -> Self {
        Invocation {
            program: program.as_ref().to_owned(),
            args: Vec::new(),
            cwd: None,
        }
    }

    pub fn arg(mut self, arg: impl AsRef<OsStr>) -> Self {
        self.args.push(arg.as_ref().to_owned());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        self.args
            .extend(args.into_iter().map(|a| a.as_ref().to_owned()));
        self
    }

    /// Run the command from `dir` instead of the current directory.
    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cwd = Some(dir.into());
        self
    }

    pub fn program(&self) -> &OsStr {
        &self.program
    }

    pub fn get_args(&self) -> impl Iterator<Item = &OsStr> {
        self.args.iter().map(OsString::as_os_str)
    }

    pub fn get_current_dir(&self) -> Option<&Path> {
        self.cwd.as_deref()
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program.to_string_lossy())?;
        for arg in &self.args {
            write!(f, " {}", arg.to_string_lossy())?;
        }
        Ok(())
    }
}

/// Executes [`Invocation`]s.
pub trait Runner {
    /// Run `invocation` to completion, failing on a non-zero exit.
    fn run(&self, invocation: &Invocation) -> Result<()>;
}

/// Runs commands as child processes and waits for them.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

impl Runner for SystemRunner {
    fn run(&self, invocation: &Invocation) -> Result<()> {
        tracing::debug!("check_call `{invocation}`");

        let mut cmd = Command::new(&invocation.program);
        cmd.args(&invocation.args);
        if let Some(dir) = &invocation.cwd {
            cmd.current_dir(dir);
        }

        let status = cmd.status().map_err(|source| ToolError::Spawn {
            command: invocation.to_string(),
            source,
        })?;
        if !status.success() {
            return Err(ToolError::ExternalProcess {
                command: invocation.to_string(),
                status,
            });
        }
        Ok(())
    }
}

type Hook = Box<dyn Fn(&Invocation) -> Result<()>>;

/// Records invocations instead of running them.
///
/// An optional hook sees each invocation after it is recorded; tests use it to
/// fake a tool's side effects or make it fail.
#[derive(Default)]
pub struct RecordingRunner {
    calls: RefCell<Vec<Invocation>>,
    hook: Option<Hook>,
}

impl RecordingRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Call `hook` for every invocation; its error is returned from `run`.
    pub fn with_hook(hook: impl Fn(&Invocation) -> Result<()> + 'static) -> Self {
        RecordingRunner {
            calls: RefCell::new(Vec::new()),
            hook: Some(Box::new(hook)),
        }
    }

    /// Everything run so far, in order.
    pub fn invocations(&self) -> Vec<Invocation> {
        self.calls.borrow().clone()
    }

    /// Rendered command lines of everything run so far.
    pub fn command_lines(&self) -> Vec<String> {
        self.calls.borrow().iter().map(ToString::to_string).collect()
    }
}

impl Runner for RecordingRunner {
    fn run(&self, invocation: &Invocation) -> Result<()> {
        tracing::debug!("record `{invocation}`");
        self.calls.borrow_mut().push(invocation.clone());
        match &self.hook {
            Some(hook) => hook(invocation),
            None => Ok(()),
        }
    }
}

impl fmt::Debug for RecordingRunner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecordingRunner")
            .field("calls", &self.calls.borrow())
            .field("hook", &self.hook.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invocation_renders_command_line() {
        let inv = Invocation::new("git")
            .args(["rm", "-rf", "--ignore-unmatch"])
            .arg("binutils");
        assert_eq!(inv.to_string(), "git rm -rf --ignore-unmatch binutils");
        assert!(inv.get_current_dir().is_none());
        assert_eq!(inv.get_args().count(), 4);
    }

    #[test]
    fn system_runner_succeeds() {
        let dir = tempfile::tempdir().unwrap();
        let inv = Invocation::new("sh")
            .args(["-c", "touch ran"])
            .current_dir(dir.path());
        SystemRunner.run(&inv).unwrap();
        assert!(dir.path().join("ran").is_file());
    }

    #[test]
    fn system_runner_reports_exit_status() {
        let inv = Invocation::new("sh").args(["-c", "exit 3"]);
        match SystemRunner.run(&inv).unwrap_err() {
            ToolError::ExternalProcess { command, status } => {
                assert_eq!(command, "sh -c exit 3");
                assert_eq!(status.code(), Some(3));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn system_runner_reports_missing_program() {
        let inv = Invocation::new("definitely-not-a-real-program-4f2a");
        assert!(matches!(
            SystemRunner.run(&inv),
            Err(ToolError::Spawn { .. })
        ));
    }

    #[test]
    fn recording_runner_records_and_hooks() {
        let runner = RecordingRunner::with_hook(|inv| {
            if inv.program() == "tar" {
                Err(ToolError::ToolNotFound { name: "tar".into() })
            } else {
                Ok(())
            }
        });
        runner.run(&Invocation::new("git").arg("status")).unwrap();
        assert!(runner.run(&Invocation::new("tar").arg("xf")).is_err());
        assert_eq!(runner.command_lines(), vec!["git status", "tar xf"]);
    }
}
