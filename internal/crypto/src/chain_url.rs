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

//! Trust constraints on the certificate chain URL.
//!
//! The chain URL arrives in a request header, which means an attacker chooses
//! it. [`check_chain_url`] must pass before any network request is issued for
//! that URL; otherwise the fetch step becomes a server-side request forgery
//! primitive against arbitrary hosts.

use thiserror::Error;
use url::Url;

/// Required scheme for the certificate chain URL.
pub const SIGNATURE_CHAIN_SCHEME: &str = "https";

/// Required hostname for the certificate chain URL. Matched exactly; no
/// subdomain or suffix matching.
pub const SIGNATURE_CHAIN_HOSTNAME: &str = "s3.amazonaws.com";

/// Required leading path segment for the certificate chain URL.
pub const SIGNATURE_CHAIN_PATH_PREFIX: &str = "/echo.api/";

/// Required port for the certificate chain URL, when one is spelled out.
pub const SIGNATURE_CHAIN_PORT: u16 = 443;

/// Domain that must appear among the signing certificate's subject
/// alternative names.
pub const SERVICE_DOMAIN: &str = "echo-api.amazon.com";

/// Describes where a signing certificate may be fetched from and which
/// service domain it must be issued for.
///
/// [`TrustPolicy::default`] carries the platform's fixed values. The struct
/// exists so that tests can verify against a test certificate authority
/// without touching production code paths; production callers should never
/// construct a policy from runtime configuration.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TrustPolicy {
    /// Required URL scheme.
    pub scheme: String,

    /// Required URL hostname (exact match).
    pub hostname: String,

    /// Required URL path prefix.
    pub path_prefix: String,

    /// Required URL port, enforced only when the URL carries an explicit
    /// port.
    pub port: u16,

    /// Required subject-alternative-name substring in the signing
    /// certificate.
    pub service_domain: String,
}

impl Default for TrustPolicy {
    fn default() -> Self {
        Self {
            scheme: SIGNATURE_CHAIN_SCHEME.to_owned(),
            hostname: SIGNATURE_CHAIN_HOSTNAME.to_owned(),
            path_prefix: SIGNATURE_CHAIN_PATH_PREFIX.to_owned(),
            port: SIGNATURE_CHAIN_PORT,
            service_domain: SERVICE_DOMAIN.to_owned(),
        }
    }
}

/// Describes errors that can be identified when checking the certificate
/// chain URL.
#[derive(Debug, Eq, Error, PartialEq)]
#[non_exhaustive]
pub enum ChainUrlError {
    /// The value could not be parsed as a URL at all.
    #[error("the certificate chain URL could not be parsed")]
    Malformed,

    /// The URL does not use the required scheme.
    #[error("the certificate chain URL must use the https scheme")]
    UnexpectedScheme,

    /// The URL host is not the required signing host.
    #[error("the certificate chain URL host is not the expected signing host")]
    UnexpectedHost,

    /// The URL path does not start with the required prefix.
    #[error("the certificate chain URL path does not start with the expected prefix")]
    UnexpectedPathPrefix,

    /// The URL spells out a port other than the required one.
    #[error("the certificate chain URL uses an unexpected port")]
    UnexpectedPort,
}

/// Check a certificate chain URL against `policy`.
///
/// This check must run strictly before the chain document is fetched; a URL
/// that fails here must never be dereferenced.
///
/// An absent port satisfies the port constraint: `Url::port` reports `None`
/// when the URL relies on the scheme default, which for `https` is the
/// required port anyway.
pub fn check_chain_url(url: &str, policy: &TrustPolicy) -> Result<(), ChainUrlError> {
    let url = Url::parse(url).map_err(|_err| ChainUrlError::Malformed)?;

    if url.scheme() != policy.scheme {
        return Err(ChainUrlError::UnexpectedScheme);
    }

    if url.host_str() != Some(policy.hostname.as_str()) {
        return Err(ChainUrlError::UnexpectedHost);
    }

    if !url.path().starts_with(&policy.path_prefix) {
        return Err(ChainUrlError::UnexpectedPathPrefix);
    }

    if let Some(port) = url.port() {
        if port != policy.port {
            return Err(ChainUrlError::UnexpectedPort);
        }
    }

    Ok(())
}
