//! Error types for the deployment step.

use std::path::PathBuf;
use thiserror::Error;

/// Result alias used across the gdm crates.
pub type Result<T> = std::result::Result<T, GdmError>;

/// Errors that abort a deployment step run.
///
/// Every variant is fatal: the pipeline never retries or recovers locally.
#[derive(Debug, Error)]
pub enum GdmError {
    /// A required input was blank after trimming.
    #[error("missing required param: {field}")]
    MissingRequiredParameter { field: &'static str },

    /// The `vars` input is not a JSON object.
    #[error("failure to unmarshal vars: {0}")]
    InvalidVarsPayload(#[source] serde_json::Error),

    /// The service account key could not be written to disk.
    #[error("error writing token file {}: {source}", path.display())]
    CredentialWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// `gcloud auth activate-service-account` failed.
    #[error("unable to activate service account: {0}")]
    CredentialActivation(#[source] ExecError),

    /// The config template does not exist.
    #[error("error finding template: {} does not exist", path.display())]
    TemplateNotFound { path: PathBuf },

    /// The config template exists but could not be read.
    #[error("error reading template {}: {source}", path.display())]
    TemplateRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The config template has a syntax error.
    #[error("error parsing template {name}: {message}")]
    TemplateParse { name: String, message: String },

    /// The config template referenced something the vars cannot provide.
    #[error("error executing deployment template {name}: {message}")]
    TemplateRender { name: String, message: String },

    /// The rendered config could not be written.
    #[error("error creating deployment config file {}: {source}", path.display())]
    OutputWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The deployment command failed.
    #[error("unable to update deployment: {0}")]
    DeploymentExecution(#[source] ExecError),
}

/// Failure of an external process.
#[derive(Debug, Error)]
pub enum ExecError {
    /// The program could not be started at all.
    #[error("failed to start {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// The program ran and exited unsuccessfully.
    #[error("{program} exited with {}", describe_code(*code))]
    Exit { program: String, code: Option<i32> },
}

fn describe_code(code: Option<i32>) -> String {
    match code {
        Some(code) => format!("exit status {code}"),
        None => "no exit status (terminated by signal)".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_parameter_names_the_field() {
        let err = GdmError::MissingRequiredParameter { field: "deployment" };
        assert_eq!(err.to_string(), "missing required param: deployment");
    }

    #[test]
    fn exec_error_describes_signal_termination() {
        let err = ExecError::Exit {
            program: "gcloud".to_string(),
            code: None,
        };
        assert!(err.to_string().contains("terminated by signal"));

        let err = ExecError::Exit {
            program: "gcloud".to_string(),
            code: Some(2),
        };
        assert_eq!(err.to_string(), "gcloud exited with exit status 2");
    }

    #[test]
    fn deployment_error_keeps_process_error_as_source() {
        let err = GdmError::DeploymentExecution(ExecError::Exit {
            program: "gcloud".to_string(),
            code: Some(1),
        });
        let source = std::error::Error::source(&err).expect("source must be set");
        assert!(source.to_string().contains("exit status 1"));
    }
}
