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

//! The request-authentication pipeline.
//!
//! Four checks run in a fixed order, short-circuiting on the first failure:
//! timestamp freshness, application identity, certificate validity, raw
//! signature. The cheap local checks come first so that clearly-invalid
//! requests are rejected without a network round trip.

use std::sync::Arc;

use alexa_skill_crypto::{
    base64,
    cache::CertificateCache,
    certificate::{validate_chain, CertificateError, SigningCertificate},
    chain_url::{check_chain_url, TrustPolicy},
    fetch::{CertificateSource, HttpCertificateSource},
    raw_signature::{validator_for_signing_alg, SigningAlg},
};
use chrono::{DateTime, Utc};
use log::{debug, warn};
use thiserror::Error;

/// Maximum allowed difference, in seconds, between the declared request
/// timestamp and the current time. The bound is inclusive: a request exactly
/// this old still passes.
pub const TIMESTAMP_TOLERANCE_SECONDS: i64 = 30;

/// Everything the authenticator needs from one incoming request.
///
/// A context is consumed by a single
/// [`RequestAuthenticator::authenticate`] call and never retained.
#[derive(Clone, Copy, Debug)]
pub struct AuthenticationContext<'a> {
    /// The exact, unmodified body bytes received on the wire.
    pub raw_body: &'a [u8],

    /// Declared request timestamp (ISO-8601).
    pub timestamp: &'a str,

    /// Application identifier declared in the session payload.
    pub application_id: &'a str,

    /// Certificate chain URL from the request header.
    pub cert_chain_url: &'a str,

    /// Base64-encoded signature from the request header.
    pub signature_b64: &'a str,
}

/// Why a request failed authentication.
#[derive(Clone, Copy, Debug, Eq, Error, PartialEq)]
pub enum RejectionReason {
    /// The chain URL failed the scheme/host/path/port policy. No fetch was
    /// attempted.
    #[error("certificate chain URL is not an accepted signing location")]
    InvalidCertificateUrl,

    /// The chain document could not be retrieved.
    #[error("certificate chain could not be retrieved")]
    NetworkFailure,

    /// The chain document is not a well-formed certificate, or its public
    /// key could not be extracted.
    #[error("certificate chain could not be parsed")]
    CertificateParseError,

    /// The current time lies outside the certificate's validity window.
    #[error("signing certificate is outside its validity window")]
    CertificateExpired,

    /// The certificate does not name the expected service domain.
    #[error("signing certificate does not name the expected service domain")]
    CertificateDomainMismatch,

    /// The signature header is not valid base64.
    #[error("signature header is not valid base64")]
    SignatureFormatError,

    /// Cryptographic verification of the signature failed.
    #[error("signature does not match the request body")]
    SignatureMismatch,

    /// The declared timestamp is outside the allowed tolerance, or could not
    /// be parsed at all.
    #[error("request timestamp is outside the allowed tolerance")]
    ReplayWindowExceeded,

    /// The declared application identifier differs from the expected one.
    #[error("declared application id does not match the expected application id")]
    ApplicationIdMismatch,
}

/// The single authoritative output of the authentication pipeline.
///
/// There is no partial or ambiguous verdict: a request is either
/// authenticated or rejected for one specific reason.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum AuthenticationVerdict {
    /// Every check passed; the request genuinely originated from the
    /// platform and is addressed to this skill.
    Authenticated,

    /// A check failed. The request must not be handled.
    Rejected(RejectionReason),
}

impl AuthenticationVerdict {
    /// Return `true` if the verdict is [`AuthenticationVerdict::Authenticated`].
    pub fn is_authenticated(&self) -> bool {
        matches!(self, Self::Authenticated)
    }
}

/// Authenticates inbound webhook requests for one skill.
///
/// An authenticator owns the trust policy, the certificate source, and an
/// in-process cache of validated certificates. It holds no per-request
/// state, so one instance can serve concurrent requests.
pub struct RequestAuthenticator {
    expected_application_id: String,
    policy: TrustPolicy,
    tolerance_seconds: i64,
    source: Box<dyn CertificateSource>,
    cache: CertificateCache,
}

impl RequestAuthenticator {
    /// Create an authenticator for the skill identified by
    /// `expected_application_id`, fetching certificates over HTTPS and using
    /// the platform trust policy.
    pub fn new(expected_application_id: impl Into<String>) -> Self {
        Self {
            expected_application_id: expected_application_id.into(),
            policy: TrustPolicy::default(),
            tolerance_seconds: TIMESTAMP_TOLERANCE_SECONDS,
            source: Box::new(HttpCertificateSource::new()),
            cache: CertificateCache::new(),
        }
    }

    /// Replace the certificate source. Tests use this to serve fixture
    /// chains instead of fetching over the network.
    pub fn with_certificate_source(mut self, source: Box<dyn CertificateSource>) -> Self {
        self.source = source;
        self
    }

    /// Replace the trust policy. Tests use this to verify against a test
    /// certificate authority.
    pub fn with_trust_policy(mut self, policy: TrustPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Run the full authentication pipeline over `context`.
    ///
    /// Checks run in a fixed order and stop at the first failure: timestamp
    /// freshness, application identity, certificate chain URL and
    /// certificate validity, signature verification. Only if all of them
    /// pass is the request [`Authenticated`].
    ///
    /// [`Authenticated`]: AuthenticationVerdict::Authenticated
    pub fn authenticate(&self, context: &AuthenticationContext<'_>) -> AuthenticationVerdict {
        match self.run_checks(context) {
            Ok(()) => {
                debug!(
                    "authenticated request for {}",
                    self.expected_application_id
                );
                AuthenticationVerdict::Authenticated
            }

            Err(reason) => {
                warn!("rejected request: {reason}");
                AuthenticationVerdict::Rejected(reason)
            }
        }
    }

    fn run_checks(&self, context: &AuthenticationContext<'_>) -> Result<(), RejectionReason> {
        check_timestamp(context.timestamp, Utc::now(), self.tolerance_seconds)?;

        if context.application_id != self.expected_application_id {
            return Err(RejectionReason::ApplicationIdMismatch);
        }

        let certificate = self.validated_certificate(context.cert_chain_url)?;

        let signature = base64::decode(context.signature_b64)
            .map_err(|_err| RejectionReason::SignatureFormatError)?;

        let validator = validator_for_signing_alg(SigningAlg::RsaSha1)
            .ok_or(RejectionReason::SignatureMismatch)?;

        validator
            .validate(&signature, context.raw_body, certificate.public_key_der())
            .map_err(|_err| RejectionReason::SignatureMismatch)?;

        Ok(())
    }

    /// Obtain a validated certificate for `url`, preferring a still-valid
    /// cached entry over a fresh fetch.
    ///
    /// The URL policy is re-checked on every request, cached or not, so a
    /// hostile URL can never reach the fetch step.
    fn validated_certificate(
        &self,
        url: &str,
    ) -> Result<Arc<SigningCertificate>, RejectionReason> {
        check_chain_url(url, &self.policy)
            .map_err(|_err| RejectionReason::InvalidCertificateUrl)?;

        if let Some(cached) = self.cache.get(url) {
            return Ok(cached);
        }

        let certificate = Arc::new(
            validate_chain(url, &self.policy, self.source.as_ref()).map_err(RejectionReason::from)?,
        );

        self.cache.put(url, Arc::clone(&certificate));

        Ok(certificate)
    }
}

impl From<CertificateError> for RejectionReason {
    fn from(err: CertificateError) -> Self {
        match err {
            CertificateError::InvalidChainUrl(_) => Self::InvalidCertificateUrl,
            CertificateError::Fetch(_) => Self::NetworkFailure,
            CertificateError::Expired => Self::CertificateExpired,
            CertificateError::DomainMismatch => Self::CertificateDomainMismatch,
            _ => Self::CertificateParseError,
        }
    }
}

/// Check the declared timestamp against `now`.
///
/// The difference is taken in either direction so that clock skew into the
/// future is bounded the same way as age. A timestamp that cannot be parsed
/// cannot prove freshness and is rejected outright.
fn check_timestamp(
    declared: &str,
    now: DateTime<Utc>,
    tolerance_seconds: i64,
) -> Result<(), RejectionReason> {
    let declared = DateTime::parse_from_rfc3339(declared)
        .map_err(|_err| RejectionReason::ReplayWindowExceeded)?;

    let age_seconds = (now - declared.with_timezone(&Utc)).num_seconds().abs();

    if age_seconds > tolerance_seconds {
        return Err(RejectionReason::ReplayWindowExceeded);
    }

    Ok(())
}
