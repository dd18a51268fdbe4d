use clap::Parser;
use gdm_core::{Action, DEFAULT_CONFIG_TEMPLATE, DEFAULT_KEY_FILE, DEFAULT_OUTPUT_FILE};
use gdm_core::{ExecutionParameters, parse_vars};

/// Every flag can also be set through the CI plugin environment (`PLUGIN_*`).
#[derive(Parser, Debug)]
#[command(
    name = "drone-gdm",
    version,
    about = "Render a Deployment Manager config template and run gcloud deployments"
)]
pub struct Cli {
    /// gcloud deployments subcommand (create, update, delete, cancel-preview, stop)
    #[arg(long, env = "PLUGIN_ACTION", default_value = "update")]
    pub action: Action,

    /// gcloud pass-through: --async
    #[arg(long = "async", env = "PLUGIN_ASYNC")]
    pub run_async: bool,

    /// Template for the deployment configuration, relative to the working directory
    #[arg(long, env = "PLUGIN_CONFIG_TEMPLATE", default_value = DEFAULT_CONFIG_TEMPLATE)]
    pub config_template: String,

    /// gcloud pass-through: --create-policy
    #[arg(long, env = "PLUGIN_CREATE_POLICY", default_value = "")]
    pub create_policy: String,

    /// gcloud pass-through: --delete-policy
    #[arg(long, env = "PLUGIN_DELETE_POLICY", default_value = "")]
    pub delete_policy: String,

    /// Deployment name (required)
    #[arg(long, env = "PLUGIN_DEPLOYMENT", default_value = "")]
    pub deployment: String,

    /// gcloud pass-through: --description
    #[arg(long, env = "PLUGIN_DESCRIPTION", default_value = "")]
    pub description: String,

    /// Skip the final gcloud deployment-manager command
    #[arg(long, env = "PLUGIN_DRY_RUN")]
    pub dry_run: bool,

    /// Alternative gcloud binary, useful for local testing
    #[arg(long, env = "PLUGIN_GCLOUD_CMD", default_value = "")]
    pub gcloud_cmd: String,

    /// Interpolated template output file path
    #[arg(long, env = "PLUGIN_OUTPUT_FILE", default_value = DEFAULT_OUTPUT_FILE)]
    pub output_file: String,

    /// gcloud pass-through: --preview
    #[arg(long, env = "PLUGIN_PREVIEW")]
    pub preview: bool,

    /// GCP project (defaults to the project_id of the service account key)
    #[arg(long, env = "PLUGIN_PROJECT", default_value = "")]
    pub project: String,

    /// Variables for the config template, as a JSON object
    #[arg(long, env = "PLUGIN_VARS", default_value = "")]
    pub vars: String,

    /// Print the variables and the interpolated template
    #[arg(long, env = "PLUGIN_VERBOSE")]
    pub verbose: bool,

    /// Service account key JSON
    #[arg(long, env = "TOKEN", default_value = "", hide_env_values = true, hide_default_value = true)]
    pub token: String,

    /// Where the service account key is written while the step runs
    #[arg(long, env = "PLUGIN_KEY_FILE", default_value = DEFAULT_KEY_FILE)]
    pub key_file: String,
}

impl Cli {
    /// Build the step parameters. Fails on a malformed `vars` payload before
    /// anything touches the filesystem.
    pub fn into_parameters(self) -> gdm_core::Result<ExecutionParameters> {
        let vars = parse_vars(&self.vars)?;
        Ok(ExecutionParameters {
            action: self.action,
            run_async: self.run_async,
            config_template: self.config_template,
            create_policy: self.create_policy,
            delete_policy: self.delete_policy,
            deployment: self.deployment,
            description: self.description,
            dry_run: self.dry_run,
            gcloud_cmd: self.gcloud_cmd,
            output_file: self.output_file,
            preview: self.preview,
            project: self.project,
            token: self.token,
            vars,
            verbose: self.verbose,
            key_file: self.key_file,
        })
    }
}
