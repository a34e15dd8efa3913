// Copyright 2025 Adobe. All rights reserved.
// This file is licensed to you under the Apache License,
// Version 2.0 (http://www.apache.org/licenses/LICENSE-2.0)
// or the MIT license (http://opensource.org/licenses/MIT),
// at your option.

// Unless required by applicable law or agreed to in writing,
// this software is distributed on an "AS IS" BASIS, WITHOUT
// WARRANTIES OR REPRESENTATIONS OF ANY KIND, either express or
// implied. See the LICENSE-MIT and LICENSE-APACHE files for the
// specific language governing permissions and limitations under
// each license.

//! Retrieval of the certificate chain document.

use std::{io::Read, time::Duration};

use thiserror::Error;

const FETCH_TIMEOUT: Duration = Duration::from_secs(10);

// Upper bound on the chain document size; a legitimate chain is a few KB.
const MAX_CHAIN_DOCUMENT_SIZE: u64 = 1_000_000;

/// Describes errors that can occur while retrieving the certificate chain
/// document.
#[derive(Debug, Eq, Error, PartialEq)]
#[non_exhaustive]
pub enum FetchError {
    /// The server responded with a non-success HTTP status.
    #[error("certificate chain request failed with HTTP status {0}")]
    HttpStatus(u16),

    /// The transfer could not be completed.
    #[error("unable to retrieve the certificate chain: {0}")]
    Transport(String),
}

/// A `CertificateSource` retrieves a certificate chain document and returns
/// its raw bytes.
///
/// IMPORTANT: Implementations do not judge the trustworthiness of `url`; the
/// caller must have run [`check_chain_url`] first. No retries are performed;
/// retry policy, if any, belongs to the caller.
///
/// [`check_chain_url`]: crate::chain_url::check_chain_url
pub trait CertificateSource: Send + Sync {
    /// Fetch the document at `url` and return its full byte content.
    fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError>;
}

/// Fetches the certificate chain document with a blocking HTTPS request.
///
/// Applies an explicit transfer timeout so a stalled fetch cannot block its
/// calling task indefinitely.
pub struct HttpCertificateSource {
    agent: ureq::Agent,
}

impl HttpCertificateSource {
    /// Create a source with the default timeout.
    pub fn new() -> Self {
        Self {
            agent: ureq::AgentBuilder::new().timeout(FETCH_TIMEOUT).build(),
        }
    }
}

impl Default for HttpCertificateSource {
    fn default() -> Self {
        Self::new()
    }
}

impl CertificateSource for HttpCertificateSource {
    fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        let response = self.agent.get(url).call().map_err(|err| match err {
            ureq::Error::Status(code, _response) => FetchError::HttpStatus(code),
            ureq::Error::Transport(transport) => FetchError::Transport(transport.to_string()),
        })?;

        let len = response
            .header("Content-Length")
            .and_then(|s| s.parse::<usize>().ok())
            .unwrap_or(10000);

        let mut chain_bytes: Vec<u8> = Vec::with_capacity(len);

        response
            .into_reader()
            .take(MAX_CHAIN_DOCUMENT_SIZE)
            .read_to_end(&mut chain_bytes)
            .map_err(|err| FetchError::Transport(err.to_string()))?;

        Ok(chain_bytes)
    }
}
