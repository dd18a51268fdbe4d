//! The step's stages chained in order, over pluggable runner and tracer.

use gdm_core::{ExecutionParameters, Result, resolve};
use std::io::{self, Write};
use std::path::PathBuf;
use tracing::{debug, warn};

use crate::command::{self, Outcome};
use crate::credential;
use crate::dump::{dump_data, dump_file};
use crate::exec::CommandRunner;
use crate::template::interpolate;
use crate::trace::CommandTracer;

/// One deployment step run: resolve, activate, render, deploy.
///
/// Each stage runs once, in order; the first failure ends the run. The
/// service account key stays on disk only until `run` returns.
pub struct Pipeline<R, T> {
    runner: R,
    tracer: T,
    base_dir: PathBuf,
}

impl<R: CommandRunner, T: CommandTracer> Pipeline<R, T> {
    /// `base_dir` is where relative template and output paths are resolved,
    /// normally the current working directory. The resolved output path is
    /// the one handed to gcloud as `--config`.
    pub fn new(runner: R, tracer: T, base_dir: impl Into<PathBuf>) -> Self {
        Self {
            runner,
            tracer,
            base_dir: base_dir.into(),
        }
    }

    pub fn run(&self, params: &ExecutionParameters) -> Result<Outcome> {
        self.run_with_output(params, &mut io::stdout())
    }

    /// Like [`Pipeline::run`], with verbose dumps going to `out`.
    pub fn run_with_output<W: Write>(&self, params: &ExecutionParameters, out: &mut W) -> Result<Outcome> {
        if params.verbose {
            report_dump(dump_data(out, "VARS", &params.vars));
        }

        let mut params = resolve(params)?;
        params.config_template = self.base_dir.join(&params.config_template);
        params.output_file = self.base_dir.join(&params.output_file);
        debug!(
            project = %params.project,
            deployment = %params.deployment,
            config = %params.output_file.display(),
            "parameters resolved"
        );

        let _key_file = credential::activate(&params, &self.runner, &self.tracer)?;

        let output = interpolate(&params.config_template, &params.output_file, &params.vars)?;

        if params.verbose {
            report_dump(dump_file(out, "DEPLOYMENT CONFIGURATION", &output));
        }

        command::deploy(&params, &self.runner, &self.tracer)
    }
}

fn report_dump(result: io::Result<()>) {
    if let Err(err) = result {
        warn!(error = %err, "failed to write verbose output");
    }
}
