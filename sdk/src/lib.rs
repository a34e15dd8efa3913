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

#![deny(warnings)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![deny(clippy::unwrap_used)]
#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg, doc_cfg_hide))]

pub mod authenticator;
pub use authenticator::{
    AuthenticationContext, AuthenticationVerdict, RejectionReason, RequestAuthenticator,
    TIMESTAMP_TOLERANCE_SECONDS,
};

mod error;
pub use error::{Error, Result};

pub mod request;
pub use request::{
    Envelope, Intent, Slot, WebhookRequest, SIGNATURE_CERT_CHAIN_URL_HEADER, SIGNATURE_HEADER,
};

pub mod response;
pub use response::{Card, Image, OutputSpeech, Reprompt, ResponseEnvelope};

pub mod slots;
pub use slots::{IsoDuration, SlotValues};

// Seams of the underlying crypto crate that callers and tests may need:
// the trust policy value object and the certificate source trait.
pub use alexa_skill_crypto::{
    chain_url::TrustPolicy,
    fetch::{CertificateSource, FetchError, HttpCertificateSource},
};
