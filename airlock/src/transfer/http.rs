//! HTTP `PUT` gateway using `ureq`.
//!
//! Objects are written to `{endpoint}/{bucket}/{key}`, the path-style
//! addressing understood by S3-compatible stores that accept unsigned
//! uploads. Requests carry no credentials and are not retried.

use super::{TransferError, TransferGateway, check_object_key};
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use std::fs::File;
use std::path::Path;
use std::time::Duration;

/// Bytes escaped in a URL path segment: everything but RFC 3986 unreserved.
const PATH_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// Gateway that uploads each file with a single HTTP `PUT`.
pub struct HttpGateway {
    endpoint: String,
    bucket: String,
    agent: ureq::Agent,
}

impl HttpGateway {
    /// Build a gateway for `bucket` at `endpoint`.
    ///
    /// A trailing slash on `endpoint` is ignored.
    #[must_use]
    pub fn new(endpoint: &str, bucket: &str, timeout: Duration) -> Self {
        let config = ureq::Agent::config_builder()
            .timeout_global(Some(timeout))
            .build();
        Self {
            endpoint: endpoint.trim_end_matches('/').to_owned(),
            bucket: bucket.to_owned(),
            agent: ureq::Agent::new_with_config(config),
        }
    }

    /// Construct the URL an object key is written to.
    ///
    /// Each `/`-separated key segment is percent-encoded.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::time::Duration;
    /// use model_airlock::transfer::HttpGateway;
    ///
    /// let gateway = HttpGateway::new("http://localhost:9000/", "models", Duration::from_secs(5));
    /// assert_eq!(
    ///     gateway.object_url("resnet/1.0.0/model.pt"),
    ///     "http://localhost:9000/models/resnet/1.0.0/model.pt"
    /// );
    /// ```
    #[must_use]
    pub fn object_url(&self, key: &str) -> String {
        let path = key
            .split('/')
            .map(|segment| utf8_percent_encode(segment, PATH_SEGMENT).to_string())
            .collect::<Vec<_>>()
            .join("/");
        format!("{}/{}/{path}", self.endpoint, self.bucket)
    }
}

impl TransferGateway for HttpGateway {
    fn upload(&self, local_path: &Path, destination_key: &str) -> Result<(), TransferError> {
        check_object_key(destination_key)?;
        let url = self.object_url(destination_key);
        let file = File::open(local_path).map_err(|source| TransferError::Io {
            key: destination_key.to_owned(),
            source,
        })?;
        self.agent
            .put(&url)
            .send(file)
            .map_err(|err| map_ureq_error(&url, &err))?;
        Ok(())
    }

    fn location(&self) -> String {
        format!("{}/{}", self.endpoint, self.bucket)
    }
}

/// Map a ureq error to a [`TransferError`].
fn map_ureq_error(url: &str, err: &ureq::Error) -> TransferError {
    match err {
        ureq::Error::StatusCode(status) => TransferError::Rejected {
            url: url.to_owned(),
            status: *status,
        },
        other => TransferError::Http {
            url: url.to_owned(),
            reason: other.to_string(),
        },
    }
}
