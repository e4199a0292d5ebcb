//! Upload of admitted artefacts to an object store.
//!
//! The [`TransferGateway`] trait is the seam between the airlock and the
//! store. Two gateways ship with the crate: [`HttpGateway`] issues plain
//! HTTP `PUT` requests, and [`DirectoryGateway`] mirrors the store layout
//! on the local file system.
//!
//! Transfer only ever starts from an [`Admission`], so nothing reaches the
//! store unless every validation stage passed. A failed upload does not
//! undo the admission; it is reported and the remaining upload is skipped.

pub mod directory;
pub mod http;

pub use directory::DirectoryGateway;
pub use http::HttpGateway;

use crate::output::write_stderr_line;
use crate::pipeline::{Admission, DeployRequest};
use camino::{Utf8Component, Utf8Path};
use log::{debug, warn};
use serde::Serialize;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Destination that accepts uploaded files.
///
/// Implementations know their bucket; callers supply only the object key.
#[cfg_attr(test, mockall::automock)]
pub trait TransferGateway {
    /// Upload the file at `local_path` under `destination_key`.
    ///
    /// # Errors
    ///
    /// Returns a [`TransferError`] when the store rejects or cannot complete
    /// the upload.
    fn upload(&self, local_path: &Path, destination_key: &str) -> Result<(), TransferError>;

    /// Return the `bucket` or location label shown to users.
    fn location(&self) -> String;
}

/// Errors arising from uploads.
#[derive(Debug, thiserror::Error)]
pub enum TransferError {
    /// The store answered with an error status.
    #[error("upload to {url} was rejected with HTTP status {status}")]
    Rejected {
        /// The destination URL.
        url: String,
        /// The HTTP status code.
        status: u16,
    },

    /// The request could not be completed.
    #[error("upload to {url} failed: {reason}")]
    Http {
        /// The destination URL.
        url: String,
        /// A human-readable description of the failure.
        reason: String,
    },

    /// Reading the source or writing the destination failed.
    #[error("failed to store {key}: {source}")]
    Io {
        /// The object key being written.
        key: String,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// The object key could address something outside the bucket.
    #[error("invalid object key \"{key}\": {reason}")]
    InvalidKey {
        /// The offending key.
        key: String,
        /// Why the key was refused.
        reason: &'static str,
    },

    /// A local path has no file name to use in the object key.
    #[error("cannot derive an object key from {path}")]
    MissingFileName {
        /// The offending path.
        path: PathBuf,
    },
}

/// One file uploaded under the deployment key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UploadedObject {
    /// The local file that was uploaded.
    pub local_path: PathBuf,
    /// The object key it was stored under.
    pub key: String,
}

/// Record of a completed transfer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransferReceipt {
    /// The bucket or location label of the gateway.
    pub location: String,
    /// The deployment key prefix.
    pub deployment_key: String,
    /// Uploaded objects in upload order: artefact first, then manifest.
    pub objects: Vec<UploadedObject>,
}

/// Upload an admitted artefact and its manifest under the deployment key.
///
/// Object keys are `{model_name}/{version}/{file name}`. The artefact is
/// uploaded first; if it fails the manifest is not attempted.
///
/// # Errors
///
/// Returns the first [`TransferError`] the gateway reports.
pub fn transfer_admitted(
    admission: &Admission,
    request: &DeployRequest,
    gateway: &dyn TransferGateway,
    quiet: bool,
    stderr: &mut dyn Write,
) -> Result<TransferReceipt, TransferError> {
    let key = admission.deployment_key();
    let mut objects = Vec::with_capacity(2);

    for local_path in [&request.model_file, &request.config] {
        let file_name = file_name_of(local_path)?;
        let object_key = key.object_key(file_name);
        if !quiet {
            write_stderr_line(stderr, format!("uploading {file_name}..."));
        }
        debug!(target: "transfer", "uploading {local_path} as {object_key}");
        gateway
            .upload(local_path.as_std_path(), &object_key)
            .inspect_err(|err| warn!(target: "transfer", "upload of {local_path} failed: {err}"))?;
        objects.push(UploadedObject {
            local_path: local_path.as_std_path().to_path_buf(),
            key: object_key,
        });
    }

    Ok(TransferReceipt {
        location: gateway.location(),
        deployment_key: key.to_string(),
        objects,
    })
}

/// Check that `key` is a relative path of plain segments.
///
/// Keys are built from manifest fields, so an absolute path, an empty
/// segment, or a `.`/`..` segment must never reach a gateway.
///
/// # Errors
///
/// Returns [`TransferError::InvalidKey`] naming the offending key.
pub(crate) fn check_object_key(key: &str) -> Result<(), TransferError> {
    let invalid = |reason| TransferError::InvalidKey {
        key: key.to_owned(),
        reason,
    };
    if key
        .split('/')
        .any(|segment| matches!(segment, "" | "." | ".."))
    {
        return Err(invalid("empty, `.` and `..` segments are not allowed"));
    }
    if key.contains('\\')
        || Utf8Path::new(key)
            .components()
            .any(|component| !matches!(component, Utf8Component::Normal(_)))
    {
        return Err(invalid("keys must be relative paths"));
    }
    Ok(())
}

fn file_name_of(path: &Utf8Path) -> Result<&str, TransferError> {
    path.file_name().ok_or_else(|| TransferError::MissingFileName {
        path: path.as_std_path().to_path_buf(),
    })
}

#[cfg(test)]
#[path = "transfer_tests.rs"]
mod tests;
