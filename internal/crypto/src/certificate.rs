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

//! Parsing and validation of the platform's signing certificate.

use chrono::{DateTime, Utc};
use rsa::{pkcs8::DecodePublicKey, RsaPublicKey};
use thiserror::Error;
use x509_parser::{pem::Pem, prelude::*};

use crate::{
    chain_url::{check_chain_url, ChainUrlError, TrustPolicy},
    fetch::{CertificateSource, FetchError},
    internal::time::utc_now,
};

/// Describes errors that can be identified while obtaining and validating a
/// signing certificate.
#[derive(Debug, Eq, Error, PartialEq)]
#[non_exhaustive]
pub enum CertificateError {
    /// The chain URL failed the scheme/host/path/port policy; no fetch was
    /// attempted.
    #[error(transparent)]
    InvalidChainUrl(#[from] ChainUrlError),

    /// The chain document could not be retrieved.
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// The chain document is not a well-formed certificate, or the public
    /// key could not be extracted from it.
    #[error("the certificate chain could not be parsed")]
    Parse,

    /// The current time lies outside the certificate's validity window.
    #[error("the certificate is not valid at the current time")]
    Expired,

    /// The certificate's subject alternative names do not include the
    /// required service domain.
    #[error("the certificate does not name the expected service domain")]
    DomainMismatch,
}

/// A validated signing certificate.
///
/// A `SigningCertificate` is only ever observed fully parsed: construction
/// either populates every field or fails with a [`CertificateError`]. Values
/// are created per incoming request (or served from
/// [`CertificateCache`](crate::cache::CertificateCache)) and discarded once
/// the authentication check completes.
#[derive(Clone, Debug)]
pub struct SigningCertificate {
    der: Vec<u8>,
    not_before: DateTime<Utc>,
    not_after: DateTime<Utc>,
    subject_alt_names: Vec<String>,
    public_key_der: Vec<u8>,
}

impl SigningCertificate {
    /// Parse the leaf certificate out of a PEM chain document and validate
    /// it against `policy`.
    ///
    /// The chain document lists the end-entity certificate first; only that
    /// certificate is examined here. Chain building and revocation are out
    /// of scope.
    pub fn from_pem_chain(chain_pem: &[u8], policy: &TrustPolicy) -> Result<Self, CertificateError> {
        let leaf = Pem::iter_from_buffer(chain_pem)
            .next()
            .ok_or(CertificateError::Parse)?
            .map_err(|_err| CertificateError::Parse)?;

        Self::from_der(leaf.contents, policy)
    }

    /// Parse and validate a single DER-encoded certificate against `policy`.
    pub fn from_der(der: Vec<u8>, policy: &TrustPolicy) -> Result<Self, CertificateError> {
        let (_rem, signcert) =
            X509Certificate::from_der(&der).map_err(|_err| CertificateError::Parse)?;

        // Key extraction is checked up front so no partially-usable value
        // escapes: a certificate whose SPKI the verifier can't consume is a
        // parse failure, not a later surprise.
        let spki = signcert.public_key();
        RsaPublicKey::from_public_key_der(spki.raw).map_err(|_err| CertificateError::Parse)?;
        let public_key_der = spki.raw.to_vec();

        let now = utc_now();
        if !signcert.validity().is_valid_at(
            ASN1Time::from_timestamp(now.timestamp()).map_err(|_err| CertificateError::Parse)?,
        ) {
            return Err(CertificateError::Expired);
        }

        let subject_alt_names = collect_subject_alt_names(&signcert)?;
        if !subject_alt_names
            .join(",")
            .contains(policy.service_domain.as_str())
        {
            return Err(CertificateError::DomainMismatch);
        }

        let not_before = DateTime::from_timestamp(signcert.validity().not_before.timestamp(), 0)
            .ok_or(CertificateError::Parse)?;
        let not_after = DateTime::from_timestamp(signcert.validity().not_after.timestamp(), 0)
            .ok_or(CertificateError::Parse)?;

        Ok(Self {
            der,
            not_before,
            not_after,
            subject_alt_names,
            public_key_der,
        })
    }

    /// Raw DER bytes of the leaf certificate.
    pub fn raw_der(&self) -> &[u8] {
        &self.der
    }

    /// Start of the certificate's validity window.
    pub fn not_before(&self) -> DateTime<Utc> {
        self.not_before
    }

    /// End of the certificate's validity window.
    pub fn not_after(&self) -> DateTime<Utc> {
        self.not_after
    }

    /// Subject alternative names listed by the certificate.
    pub fn subject_alt_names(&self) -> &[String] {
        &self.subject_alt_names
    }

    /// DER-encoded `SubjectPublicKeyInfo` of the certificate's public key.
    pub fn public_key_der(&self) -> &[u8] {
        &self.public_key_der
    }

    /// Return `true` if `at` lies within the certificate's validity window.
    /// Both window edges are inclusive.
    pub fn is_valid_at(&self, at: DateTime<Utc>) -> bool {
        self.not_before <= at && at <= self.not_after
    }
}

/// Validate `url` against `policy`, fetch the chain document through
/// `source`, and validate the leaf certificate.
///
/// The URL check runs strictly before the fetch so that no request is ever
/// issued to an origin the policy does not trust.
pub fn validate_chain(
    url: &str,
    policy: &TrustPolicy,
    source: &dyn CertificateSource,
) -> Result<SigningCertificate, CertificateError> {
    check_chain_url(url, policy)?;

    let chain_pem = source.fetch(url)?;

    SigningCertificate::from_pem_chain(&chain_pem, policy)
}

fn collect_subject_alt_names(
    cert: &X509Certificate<'_>,
) -> Result<Vec<String>, CertificateError> {
    let san = cert
        .subject_alternative_name()
        .map_err(|_err| CertificateError::Parse)?
        .ok_or(CertificateError::DomainMismatch)?;

    let mut names = Vec::new();

    for general_name in &san.value.general_names {
        match general_name {
            GeneralName::DNSName(name)
            | GeneralName::RFC822Name(name)
            | GeneralName::URI(name) => {
                names.push((*name).to_owned());
            }
            _ => (),
        }
    }

    Ok(names)
}
