//! # gdm-runtime
//!
//! The side-effecting stages of the drone-gdm step:
//!
//! - [`credential`]: write the service account key and activate it with gcloud
//! - [`template`]: render the deployment config template with strict key lookup
//! - [`command`]: build, trace and run `gcloud deployment-manager deployments ...`
//! - [`trace`]: `+ <command>` echo of every external command
//! - [`pipeline`]: the stages chained in order
//!
//! ## Example
//!
//! ```rust,no_run
//! use gdm_core::{ExecutionParameters, parse_vars};
//! use gdm_runtime::{Pipeline, ProcessRunner, StdoutTracer};
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let params = ExecutionParameters {
//!     deployment: "my-deployment".to_string(),
//!     token: std::env::var("TOKEN")?,
//!     vars: parse_vars(r#"{"zone":"europe-west1-b"}"#)?,
//!     ..Default::default()
//! };
//!
//! let pipeline = Pipeline::new(ProcessRunner, StdoutTracer, std::env::current_dir()?);
//! pipeline.run(&params)?;
//! # Ok(())
//! # }
//! ```

pub mod command;
pub mod credential;
pub mod dump;
pub mod exec;
pub mod pipeline;
pub mod template;
pub mod trace;

pub use command::{Outcome, deploy, deploy_args, deploy_command};
pub use credential::{KeyFile, activate, activation_command};
pub use exec::{CommandInvocation, CommandRunner, ProcessRunner, RecordingRunner};
pub use pipeline::Pipeline;
pub use template::{Template, interpolate};
pub use trace::{CommandTracer, RecordingTracer, StdoutTracer, trace_line};
