//! Local directory gateway.
//!
//! Mirrors the object store layout as `{root}/{bucket}/{key}`, which is
//! handy for air-gapped hand-offs and for exercising the full deploy flow
//! without a network.

use super::{TransferError, TransferGateway, check_object_key};
use camino::Utf8PathBuf;
use std::fs;
use std::path::Path;

/// Gateway that copies files into a directory tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryGateway {
    root: Utf8PathBuf,
    bucket: String,
}

impl DirectoryGateway {
    /// Build a gateway writing beneath `root/bucket`.
    #[must_use]
    pub fn new(root: impl Into<Utf8PathBuf>, bucket: &str) -> Self {
        Self {
            root: root.into(),
            bucket: bucket.to_owned(),
        }
    }

    /// Return the path an object key is written to.
    ///
    /// The key is not checked here; [`TransferGateway::upload`] refuses keys
    /// that would resolve outside the bucket.
    ///
    /// # Examples
    ///
    /// ```
    /// use model_airlock::transfer::DirectoryGateway;
    ///
    /// let gateway = DirectoryGateway::new("/srv/store", "models");
    /// assert_eq!(
    ///     gateway.object_path("resnet/1.0.0/model.pt").as_str(),
    ///     "/srv/store/models/resnet/1.0.0/model.pt"
    /// );
    /// ```
    #[must_use]
    pub fn object_path(&self, key: &str) -> Utf8PathBuf {
        self.root.join(&self.bucket).join(key)
    }
}

impl TransferGateway for DirectoryGateway {
    fn upload(&self, local_path: &Path, destination_key: &str) -> Result<(), TransferError> {
        check_object_key(destination_key)?;
        let destination = self.object_path(destination_key);
        let io_error = |source| TransferError::Io {
            key: destination_key.to_owned(),
            source,
        };
        if let Some(parent) = destination.parent() {
            fs::create_dir_all(parent).map_err(io_error)?;
        }
        fs::copy(local_path, &destination).map_err(io_error)?;
        Ok(())
    }

    fn location(&self) -> String {
        self.root.join(&self.bucket).into_string()
    }
}
