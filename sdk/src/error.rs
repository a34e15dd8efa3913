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

use thiserror::Error;

/// `Error` enumerates errors returned by most operations in this crate.
///
/// Authentication outcomes are deliberately not errors: the pipeline returns
/// an [`AuthenticationVerdict`] so that every rejection reason must be
/// handled explicitly.
///
/// [`AuthenticationVerdict`]: crate::AuthenticationVerdict
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// The request body could not be decoded, or a response could not be
    /// encoded.
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// A header required for authentication was not supplied.
    #[error("missing request header: {0}")]
    MissingHeader(&'static str),

    /// A field required for authentication was absent from the request body.
    #[error("missing request field: {0}")]
    MissingField(&'static str),

    /// A slot value did not match the format its type promises.
    #[error("slot `{name}` has unexpected value `{value}`")]
    UnexpectedSlotValue {
        /// Name of the slot.
        name: String,

        /// The value that could not be interpreted.
        value: String,
    },
}

/// A specialized `Result` type for this crate.
pub type Result<T> = std::result::Result<T, Error>;
