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

use rsa::{pkcs8::DecodePublicKey, Pkcs1v15Sign, RsaPublicKey};
use sha1::{Digest, Sha1};

use crate::raw_signature::{RawSignatureValidationError, RawSignatureValidator};

/// An `RsaSha1Validator` validates raw signatures made with the PKCS#1 v1.5
/// RSA signature scheme over a SHA-1 digest.
///
/// SHA-1 is what the platform signs with; no other digest is accepted here.
pub(crate) struct RsaSha1Validator {}

impl RawSignatureValidator for RsaSha1Validator {
    fn validate(
        &self,
        sig: &[u8],
        data: &[u8],
        public_key: &[u8],
    ) -> Result<(), RawSignatureValidationError> {
        let vk = RsaPublicKey::from_public_key_der(public_key)
            .map_err(|_err| RawSignatureValidationError::InvalidPublicKey)?;

        let digest = Sha1::digest(data);

        // Any non-success from the primitive, malformed signature included,
        // is reported as a mismatch; nothing is coerced through a boolean.
        vk.verify(Pkcs1v15Sign::new::<Sha1>(), &digest, sig)
            .map_err(|_err| RawSignatureValidationError::SignatureMismatch)
    }
}
