//! `gcloud deployment-manager deployments <action>` construction and invocation.

use gdm_core::{GdmError, ResolvedParameters, Result};
use tracing::info;

use crate::exec::{CommandInvocation, CommandRunner};
use crate::trace::CommandTracer;

/// How the deploy stage ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// gcloud ran and succeeded.
    Executed,
    /// The command was traced but not run.
    DryRun,
}

/// Arguments for the deployment command, without the program.
///
/// Optional flags always come in this order: preview, async, create-policy,
/// delete-policy, description.
pub fn deploy_args(params: &ResolvedParameters) -> Vec<String> {
    let mut args: Vec<String> = vec![
        "--project".into(),
        params.project.clone(),
        "deployment-manager".into(),
        "deployments".into(),
        params.action.as_str().into(),
        params.deployment.clone(),
        "--config".into(),
        params.output_file.display().to_string(),
    ];

    if params.preview {
        args.push("--preview".into());
    }
    if params.run_async {
        args.push("--async".into());
    }
    if let Some(policy) = &params.create_policy {
        args.extend(["--create-policy".into(), policy.clone()]);
    }
    if let Some(policy) = &params.delete_policy {
        args.extend(["--delete-policy".into(), policy.clone()]);
    }
    if let Some(description) = &params.description {
        args.push(format!("--description={description}"));
    }
    args
}

pub fn deploy_command(params: &ResolvedParameters) -> CommandInvocation {
    CommandInvocation::new(&params.gcloud_cmd, deploy_args(params))
}

/// Trace the deployment command, then run it unless this is a dry run.
pub fn deploy<R, T>(params: &ResolvedParameters, runner: &R, tracer: &T) -> Result<Outcome>
where
    R: CommandRunner + ?Sized,
    T: CommandTracer + ?Sized,
{
    let invocation = deploy_command(params);
    tracer.trace(&invocation);

    if params.dry_run {
        info!(deployment = %params.deployment, "dry run, skipping deployment command");
        return Ok(Outcome::DryRun);
    }

    runner
        .run(&invocation)
        .map_err(GdmError::DeploymentExecution)?;
    info!(
        deployment = %params.deployment,
        action = %params.action,
        "deployment command succeeded"
    );
    Ok(Outcome::Executed)
}
