//! # gdm-core
//!
//! Shared types for the drone-gdm deployment step: the input parameter set,
//! its validated form, the error type and the parameter resolver.
//!
//! Nothing in this crate performs I/O. Side effects (key activation,
//! template rendering, running `gcloud`) live in `gdm-runtime`.

pub mod credential;
pub mod error;
pub mod params;
pub mod resolve;

pub use credential::CredentialPayload;
pub use error::{ExecError, GdmError, Result};
pub use params::{Action, ExecutionParameters, ResolvedParameters, UnknownAction, Vars, parse_vars};
pub use resolve::{
    DEFAULT_CONFIG_TEMPLATE, DEFAULT_KEY_FILE, DEFAULT_OUTPUT_FILE, DEFAULT_SDK_PATH, resolve,
};
