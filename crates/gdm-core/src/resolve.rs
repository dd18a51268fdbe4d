//! Parameter validation and defaulting.

use std::path::PathBuf;

use crate::credential::CredentialPayload;
use crate::error::{GdmError, Result};
use crate::params::{ExecutionParameters, ResolvedParameters};

/// Installation root of the Cloud SDK inside the step image.
pub const DEFAULT_SDK_PATH: &str = "/google-cloud-sdk";
pub const DEFAULT_CONFIG_TEMPLATE: &str = ".gdm.yml";
pub const DEFAULT_OUTPUT_FILE: &str = ".drone-gdm.yml";
/// Shared key path. Only safe with one step run per container.
pub const DEFAULT_KEY_FILE: &str = "/tmp/gcloud.json";

/// Validate `params` and fill in defaults.
///
/// Checks run token, project, deployment; the first failure is returned.
/// The input is left untouched. The project falls back to the `project_id`
/// embedded in the token when not given explicitly.
pub fn resolve(params: &ExecutionParameters) -> Result<ResolvedParameters> {
    let token = params.token.trim();
    if token.is_empty() {
        return Err(GdmError::MissingRequiredParameter { field: "token" });
    }
    let credential = CredentialPayload::new(token);

    // The key's own project is only a fallback: a service account may be
    // granted deployment rights on other projects.
    let project = match non_blank(&params.project) {
        Some(project) => project,
        None => {
            let derived = credential
                .project_id()
                .ok_or(GdmError::MissingRequiredParameter { field: "project" })?;
            tracing::debug!(project = %derived, "project taken from service account key");
            derived
        }
    };

    let deployment = params.deployment.trim();
    if deployment.is_empty() {
        return Err(GdmError::MissingRequiredParameter {
            field: "deployment",
        });
    }

    let gcloud_cmd = non_blank(&params.gcloud_cmd)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_SDK_PATH).join("bin").join("gcloud"));

    Ok(ResolvedParameters {
        action: params.action,
        run_async: params.run_async,
        config_template: path_or(&params.config_template, DEFAULT_CONFIG_TEMPLATE),
        create_policy: non_blank(&params.create_policy),
        delete_policy: non_blank(&params.delete_policy),
        deployment: deployment.to_string(),
        description: non_blank(&params.description),
        dry_run: params.dry_run,
        gcloud_cmd,
        output_file: path_or(&params.output_file, DEFAULT_OUTPUT_FILE),
        preview: params.preview,
        project,
        credential,
        vars: params.vars.clone(),
        verbose: params.verbose,
        key_file: path_or(&params.key_file, DEFAULT_KEY_FILE),
    })
}

fn non_blank(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

fn path_or(value: &str, default: &str) -> PathBuf {
    PathBuf::from(non_blank(value).unwrap_or_else(|| default.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::Action;

    const KEY_WITH_PROJECT: &str = r#"{"type":"service_account","project_id":"key-proj"}"#;
    const KEY_WITHOUT_PROJECT: &str = r#"{"type":"service_account"}"#;

    fn params() -> ExecutionParameters {
        ExecutionParameters {
            deployment: "dep1".to_string(),
            token: KEY_WITH_PROJECT.to_string(),
            ..Default::default()
        }
    }

    fn missing_field(err: GdmError) -> &'static str {
        match err {
            GdmError::MissingRequiredParameter { field } => field,
            other => panic!("expected MissingRequiredParameter, got {other:?}"),
        }
    }

    #[test]
    fn missing_token_is_reported() {
        for token in ["", "   ", "\n\t"] {
            let p = ExecutionParameters {
                token: token.to_string(),
                ..params()
            };
            assert_eq!(missing_field(resolve(&p).unwrap_err()), "token");
        }
    }

    #[test]
    fn missing_deployment_is_reported() {
        for deployment in ["", "  "] {
            let p = ExecutionParameters {
                deployment: deployment.to_string(),
                ..params()
            };
            assert_eq!(missing_field(resolve(&p).unwrap_err()), "deployment");
        }
    }

    #[test]
    fn missing_project_is_reported_before_missing_deployment() {
        let p = ExecutionParameters {
            deployment: String::new(),
            token: KEY_WITHOUT_PROJECT.to_string(),
            ..params()
        };
        assert_eq!(missing_field(resolve(&p).unwrap_err()), "project");
    }

    #[test]
    fn missing_token_is_reported_before_everything_else() {
        let p = ExecutionParameters {
            token: String::new(),
            deployment: String::new(),
            ..Default::default()
        };
        assert_eq!(missing_field(resolve(&p).unwrap_err()), "token");
    }

    #[test]
    fn project_is_derived_from_token() {
        let resolved = resolve(&params()).unwrap();
        assert_eq!(resolved.project, "key-proj");
    }

    #[test]
    fn explicit_project_beats_token() {
        let p = ExecutionParameters {
            project: "  other-proj ".to_string(),
            ..params()
        };
        assert_eq!(resolve(&p).unwrap().project, "other-proj");
    }

    #[test]
    fn project_missing_everywhere_fails() {
        for token in [KEY_WITHOUT_PROJECT, "not-json"] {
            let p = ExecutionParameters {
                token: token.to_string(),
                ..params()
            };
            assert_eq!(missing_field(resolve(&p).unwrap_err()), "project");
        }
    }

    #[test]
    fn defaults_are_applied() {
        let resolved = resolve(&params()).unwrap();
        assert_eq!(resolved.gcloud_cmd, PathBuf::from("/google-cloud-sdk/bin/gcloud"));
        assert_eq!(resolved.config_template, PathBuf::from(".gdm.yml"));
        assert_eq!(resolved.output_file, PathBuf::from(".drone-gdm.yml"));
        assert_eq!(resolved.key_file, PathBuf::from("/tmp/gcloud.json"));
        assert_eq!(resolved.action, Action::Update);
        assert_eq!(resolved.create_policy, None);
        assert_eq!(resolved.delete_policy, None);
        assert_eq!(resolved.description, None);
    }

    #[test]
    fn string_fields_are_trimmed() {
        let p = ExecutionParameters {
            deployment: " dep1 ".to_string(),
            gcloud_cmd: " /usr/bin/gcloud ".to_string(),
            config_template: " deploy.yml\n".to_string(),
            create_policy: " ACQUIRE ".to_string(),
            description: "   ".to_string(),
            token: format!("\n{KEY_WITH_PROJECT}\n"),
            ..params()
        };
        let resolved = resolve(&p).unwrap();
        assert_eq!(resolved.deployment, "dep1");
        assert_eq!(resolved.gcloud_cmd, PathBuf::from("/usr/bin/gcloud"));
        assert_eq!(resolved.config_template, PathBuf::from("deploy.yml"));
        assert_eq!(resolved.create_policy.as_deref(), Some("ACQUIRE"));
        assert_eq!(resolved.description, None);
        assert_eq!(resolved.credential.as_str(), KEY_WITH_PROJECT);
    }

    #[test]
    fn caller_parameters_are_not_mutated() {
        let p = ExecutionParameters {
            project: String::new(),
            gcloud_cmd: String::new(),
            ..params()
        };
        let before = format!("{p:?}");
        resolve(&p).unwrap();
        assert_eq!(format!("{p:?}"), before);
        assert!(p.project.is_empty());
        assert_eq!(p.token, KEY_WITH_PROJECT);
    }
}
