//! `+ <command>` echo of every external command, ahead of its output.

use crate::exec::CommandInvocation;
use std::io::{self, Write};
use std::sync::Mutex;

/// Echoes every external command before it runs.
pub trait CommandTracer {
    fn trace(&self, invocation: &CommandInvocation);
}

impl<T: CommandTracer + ?Sized> CommandTracer for &T {
    fn trace(&self, invocation: &CommandInvocation) {
        (**self).trace(invocation)
    }
}

/// Formats the trace line for an invocation: `+ <program> <args...>`.
pub fn trace_line(invocation: &CommandInvocation) -> String {
    format!("+ {}", invocation.command_line())
}

/// Prints trace lines to stdout, interleaved with the commands' own output.
///
/// A closed or broken stdout drops the line; tracing never fails the run.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdoutTracer;

impl CommandTracer for StdoutTracer {
    fn trace(&self, invocation: &CommandInvocation) {
        write_trace(&mut io::stdout().lock(), invocation);
    }
}

fn write_trace<W: Write>(out: &mut W, invocation: &CommandInvocation) {
    let _ = writeln!(out, "{}", trace_line(invocation)).and_then(|()| out.flush());
}

/// Keeps trace lines in memory.
#[derive(Debug, Default)]
pub struct RecordingTracer {
    lines: Mutex<Vec<String>>,
}

impl RecordingTracer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().map(|l| l.clone()).unwrap_or_default()
    }
}

impl CommandTracer for RecordingTracer {
    fn trace(&self, invocation: &CommandInvocation) {
        if let Ok(mut lines) = self.lines.lock() {
            lines.push(trace_line(invocation));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trace_line_prefixes_plus() {
        let inv = CommandInvocation::new(
            "/google-cloud-sdk/bin/gcloud",
            vec!["auth".into(), "activate-service-account".into()],
        );
        assert_eq!(
            trace_line(&inv),
            "+ /google-cloud-sdk/bin/gcloud auth activate-service-account"
        );
    }

    struct BrokenPipe;

    impl Write for BrokenPipe {
        fn write(&mut self, _: &[u8]) -> io::Result<usize> {
            Err(io::ErrorKind::BrokenPipe.into())
        }

        fn flush(&mut self) -> io::Result<()> {
            Err(io::ErrorKind::BrokenPipe.into())
        }
    }

    #[test]
    fn write_trace_appends_newline() {
        let mut out = Vec::new();
        write_trace(&mut out, &CommandInvocation::new("gcloud", vec!["info".into()]));
        assert_eq!(out, b"+ gcloud info\n");
    }

    #[test]
    fn write_trace_survives_broken_stdout() {
        write_trace(&mut BrokenPipe, &CommandInvocation::new("gcloud", vec![]));
    }

    #[test]
    fn recording_tracer_keeps_order() {
        let tracer = RecordingTracer::new();
        tracer.trace(&CommandInvocation::new("a", vec!["1".into()]));
        tracer.trace(&CommandInvocation::new("b", vec![]));
        assert_eq!(tracer.lines(), vec!["+ a 1", "+ b"]);
    }
}
