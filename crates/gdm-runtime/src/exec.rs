//! Execute external commands (gcloud).

use gdm_core::ExecError;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::Mutex;

/// A program and its ordered arguments. Built fresh per call, never retried.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandInvocation {
    pub program: PathBuf,
    pub args: Vec<String>,
}

impl CommandInvocation {
    pub fn new(program: impl Into<PathBuf>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    pub fn program_name(&self) -> String {
        self.program.display().to_string()
    }

    /// Program followed by its arguments, space separated.
    pub fn command_line(&self) -> String {
        std::iter::once(self.program_name())
            .chain(self.args.iter().cloned())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Runs external commands. Blocks until the process exits.
pub trait CommandRunner {
    fn run(&self, invocation: &CommandInvocation) -> Result<(), ExecError>;
}

impl<R: CommandRunner + ?Sized> CommandRunner for &R {
    fn run(&self, invocation: &CommandInvocation) -> Result<(), ExecError> {
        (**self).run(invocation)
    }
}

/// Spawns real processes with stdout and stderr passed straight through.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessRunner;

impl CommandRunner for ProcessRunner {
    fn run(&self, invocation: &CommandInvocation) -> Result<(), ExecError> {
        let program = invocation.program_name();
        let status = Command::new(&invocation.program)
            .args(&invocation.args)
            .status()
            .map_err(|source| ExecError::Spawn {
                program: program.clone(),
                source,
            })?;

        if !status.success() {
            return Err(ExecError::Exit {
                program,
                code: status.code(),
            });
        }
        Ok(())
    }
}

/// Records invocations instead of running them.
///
/// Fails with exit code 1 for any invocation carrying the configured argument.
#[derive(Debug, Default)]
pub struct RecordingRunner {
    calls: Mutex<Vec<CommandInvocation>>,
    fail_on: Option<String>,
}

impl RecordingRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_on(arg: impl Into<String>) -> Self {
        Self {
            calls: Mutex::default(),
            fail_on: Some(arg.into()),
        }
    }

    pub fn calls(&self) -> Vec<CommandInvocation> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }
}

impl CommandRunner for RecordingRunner {
    fn run(&self, invocation: &CommandInvocation) -> Result<(), ExecError> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(invocation.clone());
        }
        match &self.fail_on {
            Some(arg) if invocation.args.iter().any(|a| a == arg) => Err(ExecError::Exit {
                program: invocation.program_name(),
                code: Some(1),
            }),
            _ => Ok(()),
        }
    }
}

pub(crate) fn gcloud(program: &Path, args: &[&str]) -> CommandInvocation {
    CommandInvocation::new(program, args.iter().map(|a| a.to_string()).collect())
}
