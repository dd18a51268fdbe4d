//! Input and resolved parameter sets for a deployment step run.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use crate::credential::CredentialPayload;
use crate::error::{GdmError, Result};

/// Variables available to the config template.
///
/// Values keep the full JSON shape (null, bool, number, string, array, object).
pub type Vars = serde_json::Map<String, serde_json::Value>;

/// Parse the `vars` input into a variable mapping.
///
/// Blank input is an empty mapping. Anything that is not a JSON object fails.
pub fn parse_vars(raw: &str) -> Result<Vars> {
    if raw.trim().is_empty() {
        return Ok(Vars::new());
    }
    serde_json::from_str(raw).map_err(GdmError::InvalidVarsPayload)
}

/// `gcloud deployment-manager deployments` subcommand to run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Action {
    Create,
    #[default]
    Update,
    Delete,
    CancelPreview,
    Stop,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Create => "create",
            Action::Update => "update",
            Action::Delete => "delete",
            Action::CancelPreview => "cancel-preview",
            Action::Stop => "stop",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when an action name is not a known deployments subcommand.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown action '{0}' (expected create, update, delete, cancel-preview or stop)")]
pub struct UnknownAction(pub String);

impl FromStr for Action {
    type Err = UnknownAction;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim() {
            "create" => Ok(Action::Create),
            "update" => Ok(Action::Update),
            "delete" => Ok(Action::Delete),
            "cancel-preview" => Ok(Action::CancelPreview),
            "stop" => Ok(Action::Stop),
            other => Err(UnknownAction(other.to_string())),
        }
    }
}

/// Parameters as produced by the front-end, before validation.
///
/// Blank strings mean "not provided". `Debug` never prints the token.
#[derive(Clone, Default)]
pub struct ExecutionParameters {
    pub action: Action,
    pub run_async: bool,
    pub config_template: String,
    pub create_policy: String,
    pub delete_policy: String,
    pub deployment: String,
    pub description: String,
    pub dry_run: bool,
    pub gcloud_cmd: String,
    pub output_file: String,
    pub preview: bool,
    pub project: String,
    /// Service account key, JSON text.
    pub token: String,
    pub vars: Vars,
    pub verbose: bool,
    /// Where the service account key is written for activation.
    pub key_file: String,
}

impl fmt::Debug for ExecutionParameters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExecutionParameters")
            .field("action", &self.action)
            .field("run_async", &self.run_async)
            .field("config_template", &self.config_template)
            .field("create_policy", &self.create_policy)
            .field("delete_policy", &self.delete_policy)
            .field("deployment", &self.deployment)
            .field("description", &self.description)
            .field("dry_run", &self.dry_run)
            .field("gcloud_cmd", &self.gcloud_cmd)
            .field("output_file", &self.output_file)
            .field("preview", &self.preview)
            .field("project", &self.project)
            .field("token", &"<redacted>")
            .field("token_len", &self.token.len())
            .field("vars", &self.vars)
            .field("verbose", &self.verbose)
            .field("key_file", &self.key_file)
            .finish()
    }
}

/// Validated parameters. Built only by [`crate::resolve`].
///
/// `deployment` and `project` are never blank and the credential is never empty.
#[derive(Debug, Clone)]
pub struct ResolvedParameters {
    pub action: Action,
    pub run_async: bool,
    pub config_template: PathBuf,
    pub create_policy: Option<String>,
    pub delete_policy: Option<String>,
    pub deployment: String,
    pub description: Option<String>,
    pub dry_run: bool,
    pub gcloud_cmd: PathBuf,
    pub output_file: PathBuf,
    pub preview: bool,
    pub project: String,
    pub credential: CredentialPayload,
    pub vars: Vars,
    pub verbose: bool,
    pub key_file: PathBuf,
}
