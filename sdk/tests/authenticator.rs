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

//! End-to-end exercises of the request-authentication pipeline with a
//! fixture certificate authority standing in for the platform.

use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};

use alexa_skill::{
    AuthenticationVerdict, CertificateSource, FetchError, RejectionReason, RequestAuthenticator,
    WebhookRequest,
};
use alexa_skill_crypto::base64;
use chrono::{DateTime, Duration, Utc};
use rsa::{pkcs8::DecodePrivateKey, Pkcs1v15Sign, RsaPrivateKey};
use sha1::{Digest, Sha1};

const SIGNER_KEY_PEM: &str = include_str!("fixtures/signer.key.pem");
const VALID_FULL_CHAIN: &[u8] = include_bytes!("fixtures/valid_full_chain.pem");
const EXPIRED_CHAIN: &[u8] = include_bytes!("fixtures/expired_chain.pem");
const WRONG_DOMAIN_CHAIN: &[u8] = include_bytes!("fixtures/wrong_domain_chain.pem");

const CHAIN_URL: &str = "https://s3.amazonaws.com/echo.api/echo-api-cert-12.pem";
const APPLICATION_ID: &str = "amzn1.ask.skill.1234";

/// Serves a fixed chain document and counts fetches.
struct CountingSource {
    document: Vec<u8>,
    fetches: Arc<AtomicUsize>,
}

impl CountingSource {
    fn new(document: &[u8]) -> (Self, Arc<AtomicUsize>) {
        let fetches = Arc::new(AtomicUsize::new(0));

        (
            Self {
                document: document.to_vec(),
                fetches: Arc::clone(&fetches),
            },
            fetches,
        )
    }
}

impl CertificateSource for CountingSource {
    fn fetch(&self, _url: &str) -> Result<Vec<u8>, FetchError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        Ok(self.document.clone())
    }
}

struct UnreachableSource {}

impl CertificateSource for UnreachableSource {
    fn fetch(&self, _url: &str) -> Result<Vec<u8>, FetchError> {
        Err(FetchError::HttpStatus(503))
    }
}

fn skill_body(application_id: &str, timestamp: DateTime<Utc>) -> Vec<u8> {
    format!(
        concat!(
            r#"{{"version":"1.0","#,
            r#""session":{{"new":true,"sessionId":"amzn1.echo-api.session.0000","#,
            r#""application":{{"applicationId":"{}"}},"#,
            r#""user":{{"userId":"amzn1.ask.account.AAAA"}}}},"#,
            r#""request":{{"type":"IntentRequest","#,
            r#""requestId":"amzn1.echo-api.request.0000","#,
            r#""timestamp":"{}","locale":"en-US","#,
            r#""intent":{{"name":"HelloIntent"}}}}}}"#
        ),
        application_id,
        timestamp.format("%Y-%m-%dT%H:%M:%SZ")
    )
    .into_bytes()
}

fn sign(body: &[u8]) -> String {
    let key = RsaPrivateKey::from_pkcs8_pem(SIGNER_KEY_PEM).unwrap();
    let digest = Sha1::digest(body);
    let signature = key.sign(Pkcs1v15Sign::new::<Sha1>(), &digest).unwrap();

    base64::encode(&signature)
}

fn authenticator_with(document: &[u8]) -> (RequestAuthenticator, Arc<AtomicUsize>) {
    let (source, fetches) = CountingSource::new(document);

    (
        RequestAuthenticator::new(APPLICATION_ID).with_certificate_source(Box::new(source)),
        fetches,
    )
}

#[test]
fn authenticates_valid_request() {
    let body = skill_body(APPLICATION_ID, Utc::now());
    let signature = sign(&body);

    let request = WebhookRequest::from_parts(body, Some(CHAIN_URL), Some(&signature)).unwrap();
    let (authenticator, fetches) = authenticator_with(VALID_FULL_CHAIN);

    let verdict = authenticator.authenticate(&request.authentication_context().unwrap());

    assert_eq!(verdict, AuthenticationVerdict::Authenticated);
    assert!(verdict.is_authenticated());
    assert_eq!(fetches.load(Ordering::SeqCst), 1);
}

#[test]
fn slightly_old_timestamp_still_passes() {
    let body = skill_body(APPLICATION_ID, Utc::now() - Duration::seconds(25));
    let signature = sign(&body);

    let request = WebhookRequest::from_parts(body, Some(CHAIN_URL), Some(&signature)).unwrap();
    let (authenticator, _fetches) = authenticator_with(VALID_FULL_CHAIN);

    assert_eq!(
        authenticator.authenticate(&request.authentication_context().unwrap()),
        AuthenticationVerdict::Authenticated
    );
}

#[test]
fn rejects_stale_timestamp_without_fetching() {
    let body = skill_body(APPLICATION_ID, Utc::now() - Duration::seconds(90));
    let signature = sign(&body);

    let request = WebhookRequest::from_parts(body, Some(CHAIN_URL), Some(&signature)).unwrap();
    let (authenticator, fetches) = authenticator_with(VALID_FULL_CHAIN);

    assert_eq!(
        authenticator.authenticate(&request.authentication_context().unwrap()),
        AuthenticationVerdict::Rejected(RejectionReason::ReplayWindowExceeded)
    );
    assert_eq!(fetches.load(Ordering::SeqCst), 0);
}

#[test]
fn rejects_foreign_application_id_without_fetching() {
    // Validly signed, but addressed to some other skill.
    let body = skill_body("amzn1.ask.skill.9999", Utc::now());
    let signature = sign(&body);

    let request = WebhookRequest::from_parts(body, Some(CHAIN_URL), Some(&signature)).unwrap();
    let (authenticator, fetches) = authenticator_with(VALID_FULL_CHAIN);

    assert_eq!(
        authenticator.authenticate(&request.authentication_context().unwrap()),
        AuthenticationVerdict::Rejected(RejectionReason::ApplicationIdMismatch)
    );
    assert_eq!(fetches.load(Ordering::SeqCst), 0);
}

#[test]
fn rejects_untrusted_chain_url_without_fetching() {
    let body = skill_body(APPLICATION_ID, Utc::now());
    let signature = sign(&body);

    let request = WebhookRequest::from_parts(
        body,
        Some("https://mallory.example/echo.api/cert.pem"),
        Some(&signature),
    )
    .unwrap();
    let (authenticator, fetches) = authenticator_with(VALID_FULL_CHAIN);

    assert_eq!(
        authenticator.authenticate(&request.authentication_context().unwrap()),
        AuthenticationVerdict::Rejected(RejectionReason::InvalidCertificateUrl)
    );
    assert_eq!(fetches.load(Ordering::SeqCst), 0);
}

#[test]
fn rejects_tampered_body() {
    let body = skill_body(APPLICATION_ID, Utc::now());
    let signature = sign(&body);

    let mut tampered = body.clone();
    let last = tampered.len() - 2;
    tampered[last] ^= 0x01;

    let request = WebhookRequest::from_parts(body, Some(CHAIN_URL), Some(&signature)).unwrap();
    let (authenticator, _fetches) = authenticator_with(VALID_FULL_CHAIN);

    let mut context = request.authentication_context().unwrap();
    context.raw_body = &tampered;

    assert_eq!(
        authenticator.authenticate(&context),
        AuthenticationVerdict::Rejected(RejectionReason::SignatureMismatch)
    );
}

#[test]
fn rejects_signature_that_is_not_base64() {
    let body = skill_body(APPLICATION_ID, Utc::now());

    let request =
        WebhookRequest::from_parts(body, Some(CHAIN_URL), Some("definitely not base64!")).unwrap();
    let (authenticator, _fetches) = authenticator_with(VALID_FULL_CHAIN);

    assert_eq!(
        authenticator.authenticate(&request.authentication_context().unwrap()),
        AuthenticationVerdict::Rejected(RejectionReason::SignatureFormatError)
    );
}

#[test]
fn rejects_expired_certificate() {
    let body = skill_body(APPLICATION_ID, Utc::now());
    let signature = sign(&body);

    let request = WebhookRequest::from_parts(body, Some(CHAIN_URL), Some(&signature)).unwrap();
    let (authenticator, _fetches) = authenticator_with(EXPIRED_CHAIN);

    assert_eq!(
        authenticator.authenticate(&request.authentication_context().unwrap()),
        AuthenticationVerdict::Rejected(RejectionReason::CertificateExpired)
    );
}

#[test]
fn rejects_certificate_for_wrong_service_domain() {
    let body = skill_body(APPLICATION_ID, Utc::now());
    let signature = sign(&body);

    let request = WebhookRequest::from_parts(body, Some(CHAIN_URL), Some(&signature)).unwrap();
    let (authenticator, _fetches) = authenticator_with(WRONG_DOMAIN_CHAIN);

    assert_eq!(
        authenticator.authenticate(&request.authentication_context().unwrap()),
        AuthenticationVerdict::Rejected(RejectionReason::CertificateDomainMismatch)
    );
}

#[test]
fn reports_network_failure() {
    let body = skill_body(APPLICATION_ID, Utc::now());
    let signature = sign(&body);

    let request = WebhookRequest::from_parts(body, Some(CHAIN_URL), Some(&signature)).unwrap();
    let authenticator = RequestAuthenticator::new(APPLICATION_ID)
        .with_certificate_source(Box::new(UnreachableSource {}));

    assert_eq!(
        authenticator.authenticate(&request.authentication_context().unwrap()),
        AuthenticationVerdict::Rejected(RejectionReason::NetworkFailure)
    );
}

#[test]
fn caches_validated_certificate_across_requests() {
    let (authenticator, fetches) = authenticator_with(VALID_FULL_CHAIN);

    for _ in 0..2 {
        let body = skill_body(APPLICATION_ID, Utc::now());
        let signature = sign(&body);
        let request = WebhookRequest::from_parts(body, Some(CHAIN_URL), Some(&signature)).unwrap();

        assert_eq!(
            authenticator.authenticate(&request.authentication_context().unwrap()),
            AuthenticationVerdict::Authenticated
        );
    }

    assert_eq!(fetches.load(Ordering::SeqCst), 1);
}
