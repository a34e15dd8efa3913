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

//! Typed view of an incoming skill webhook request.

use std::collections::HashMap;

use serde::Deserialize;
use serde_json::Value;

use crate::{authenticator::AuthenticationContext, Error, Result};

/// Name of the request header carrying the URL of the signing-certificate
/// chain. Header names compare case-insensitively; normalizing is the HTTP
/// framework's job.
pub const SIGNATURE_CERT_CHAIN_URL_HEADER: &str = "SignatureCertChainUrl";

/// Name of the request header carrying the base64-encoded request signature.
pub const SIGNATURE_HEADER: &str = "Signature";

/// The decoded JSON body of a webhook request.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Envelope {
    /// Version specifier of the request format.
    #[serde(default)]
    pub version: String,

    /// Session data. Absent for requests that arrive outside of a session.
    pub session: Option<Session>,

    /// The request payload itself.
    pub request: RequestBody,
}

/// Session data accompanying a request.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    /// `true` if this request starts a new session.
    #[serde(default)]
    pub new: bool,

    /// Platform-assigned session identifier.
    pub session_id: Option<String>,

    /// The skill this request claims to be addressed to.
    pub application: Option<Application>,

    /// Key-value attributes persisted across turns of the session.
    #[serde(default)]
    pub attributes: HashMap<String, Value>,

    /// The user the session belongs to.
    pub user: Option<User>,
}

/// The application (skill) identity declared by the request.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Application {
    /// Application identifier, e.g. `amzn1.ask.skill.[unique-value]`.
    pub application_id: String,
}

/// The user a session belongs to.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Platform-assigned user identifier.
    pub user_id: String,

    /// Present when the user has linked an account.
    pub access_token: Option<String>,
}

/// The request payload inside the envelope.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestBody {
    /// Request type, e.g. `LaunchRequest`, `IntentRequest`,
    /// `SessionEndedRequest`.
    #[serde(rename = "type")]
    pub request_type: String,

    /// Platform-assigned request identifier.
    pub request_id: Option<String>,

    /// Declared timestamp of the request (ISO-8601).
    pub timestamp: Option<String>,

    /// Locale of the user, e.g. `en-US`.
    pub locale: Option<String>,

    /// The intent, for `IntentRequest`s.
    pub intent: Option<Intent>,

    /// Why the session ended, for `SessionEndedRequest`s.
    pub reason: Option<String>,
}

/// An intent and its slot values.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Intent {
    /// Name of the intent.
    pub name: String,

    /// Slot values keyed by slot name.
    #[serde(default)]
    pub slots: HashMap<String, Slot>,
}

/// A single slot value.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Slot {
    /// Name of the slot.
    pub name: Option<String>,

    /// Spoken value, if the user supplied one.
    pub value: Option<String>,
}

/// An incoming webhook request: the exact bytes received on the wire plus
/// the two signature headers.
///
/// The raw body is stored untouched. Signature verification must see the
/// bytes exactly as received; re-serializing the parsed JSON would change
/// them and invalidate every signature.
#[derive(Clone, Debug)]
pub struct WebhookRequest {
    raw_body: Vec<u8>,
    envelope: Envelope,
    signature_cert_chain_url: Option<String>,
    signature: Option<String>,
}

impl WebhookRequest {
    /// Build a request from the raw body bytes and the values of the
    /// [`SIGNATURE_CERT_CHAIN_URL_HEADER`] and [`SIGNATURE_HEADER`] headers,
    /// as received.
    pub fn from_parts(
        raw_body: impl Into<Vec<u8>>,
        signature_cert_chain_url: Option<&str>,
        signature: Option<&str>,
    ) -> Result<Self> {
        let raw_body = raw_body.into();
        let envelope: Envelope = serde_json::from_slice(&raw_body)?;

        Ok(Self {
            raw_body,
            envelope,
            signature_cert_chain_url: signature_cert_chain_url.map(str::to_owned),
            signature: signature.map(str::to_owned),
        })
    }

    /// The exact body bytes as received on the wire.
    pub fn raw_body(&self) -> &[u8] {
        &self.raw_body
    }

    /// The decoded request envelope.
    pub fn envelope(&self) -> &Envelope {
        &self.envelope
    }

    /// Request type, e.g. `IntentRequest`.
    pub fn request_type(&self) -> &str {
        &self.envelope.request.request_type
    }

    /// Platform-assigned request identifier.
    pub fn request_id(&self) -> Option<&str> {
        self.envelope.request.request_id.as_deref()
    }

    /// Declared timestamp of the request.
    pub fn timestamp(&self) -> Option<&str> {
        self.envelope.request.timestamp.as_deref()
    }

    /// The intent, for `IntentRequest`s.
    pub fn intent(&self) -> Option<&Intent> {
        self.envelope.request.intent.as_ref()
    }

    /// Name of the intent, if any.
    pub fn intent_name(&self) -> Option<&str> {
        self.intent().map(|intent| intent.name.as_str())
    }

    /// Spoken value of the named slot, if present.
    pub fn slot_value(&self, name: &str) -> Option<&str> {
        self.intent()?.slots.get(name)?.value.as_deref()
    }

    /// Session data, if the request arrived inside a session.
    pub fn session(&self) -> Option<&Session> {
        self.envelope.session.as_ref()
    }

    /// `true` if this request starts a new session.
    pub fn is_new_session(&self) -> bool {
        self.session().is_some_and(|session| session.new)
    }

    /// Application identifier declared in the session payload.
    pub fn application_id(&self) -> Option<&str> {
        self.session()?
            .application
            .as_ref()
            .map(|application| application.application_id.as_str())
    }

    /// Session attribute stored under `key`.
    pub fn session_attribute(&self, key: &str) -> Option<&Value> {
        self.session()?.attributes.get(key)
    }

    /// Assemble the input bundle for
    /// [`RequestAuthenticator::authenticate`](crate::RequestAuthenticator::authenticate).
    ///
    /// Fails if either signature header or a required body field is absent;
    /// such a request cannot be authenticated at all.
    pub fn authentication_context(&self) -> Result<AuthenticationContext<'_>> {
        let cert_chain_url = self
            .signature_cert_chain_url
            .as_deref()
            .ok_or(Error::MissingHeader(SIGNATURE_CERT_CHAIN_URL_HEADER))?;

        let signature_b64 = self
            .signature
            .as_deref()
            .ok_or(Error::MissingHeader(SIGNATURE_HEADER))?;

        let timestamp = self
            .timestamp()
            .ok_or(Error::MissingField("request.timestamp"))?;

        let application_id = self
            .application_id()
            .ok_or(Error::MissingField("session.application.applicationId"))?;

        Ok(AuthenticationContext {
            raw_body: &self.raw_body,
            timestamp,
            application_id,
            cert_chain_url,
            signature_b64,
        })
    }
}
