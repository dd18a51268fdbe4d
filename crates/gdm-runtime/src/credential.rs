//! Service account activation.
//!
//! The key is written to disk only for as long as the returned [`KeyFile`]
//! lives. Dropping it removes the file on every exit path; a failed removal
//! is logged and never turns into an error.

use gdm_core::{CredentialPayload, GdmError, ResolvedParameters, Result};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::exec::{CommandInvocation, CommandRunner, gcloud};
use crate::trace::CommandTracer;

/// Service account key written to disk, removed on drop.
#[derive(Debug)]
pub struct KeyFile {
    path: PathBuf,
}

impl KeyFile {
    /// Write `credential` to `path`, readable by the owner only.
    pub fn write(path: &Path, credential: &CredentialPayload) -> Result<Self> {
        let write_err = |source| GdmError::CredentialWrite {
            path: path.to_path_buf(),
            source,
        };

        let mut options = OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o600);
        }
        let mut file = options.open(path).map_err(write_err)?;

        // From here on the guard owns the file, so a failed write still cleans up.
        let guard = Self {
            path: path.to_path_buf(),
        };

        // `mode` only applies on creation.
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            file.set_permissions(fs::Permissions::from_mode(0o600))
                .map_err(write_err)?;
        }

        file.write_all(credential.as_bytes()).map_err(write_err)?;
        file.flush().map_err(write_err)?;
        debug!(path = %path.display(), "wrote service account key");
        Ok(guard)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for KeyFile {
    fn drop(&mut self) {
        match fs::remove_file(&self.path) {
            Ok(()) => debug!(path = %self.path.display(), "removed service account key"),
            Err(err) => warn!(
                path = %self.path.display(),
                error = %err,
                "error removing token file"
            ),
        }
    }
}

/// `gcloud auth activate-service-account --key-file <key>`.
pub fn activation_command(gcloud_cmd: &Path, key_file: &Path) -> CommandInvocation {
    let key = key_file.display().to_string();
    gcloud(
        gcloud_cmd,
        &["auth", "activate-service-account", "--key-file", &key],
    )
}

/// Write the key and make it the active gcloud identity.
///
/// The returned guard must be held until the run is over.
pub fn activate<R, T>(params: &ResolvedParameters, runner: &R, tracer: &T) -> Result<KeyFile>
where
    R: CommandRunner + ?Sized,
    T: CommandTracer + ?Sized,
{
    let key_file = KeyFile::write(&params.key_file, &params.credential)?;

    let invocation = activation_command(&params.gcloud_cmd, key_file.path());
    tracer.trace(&invocation);
    runner
        .run(&invocation)
        .map_err(GdmError::CredentialActivation)?;

    info!("service account activated");
    Ok(key_file)
}
