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

//! In-process cache of validated signing certificates.

use std::{
    collections::HashMap,
    sync::{Arc, RwLock},
};

use crate::{certificate::SigningCertificate, internal::time::utc_now};

/// Caches validated signing certificates, keyed by the exact chain URL they
/// were fetched from.
///
/// The platform serves its signing certificate from a small, stable set of
/// URLs, so refetching and reparsing on every request wastes a network round
/// trip. Entries are immutable once inserted and are only served while their
/// validity window still contains the current time. The cache lives for the
/// process lifetime; nothing is persisted across restarts.
#[derive(Debug, Default)]
pub struct CertificateCache {
    entries: RwLock<HashMap<String, Arc<SigningCertificate>>>,
}

impl CertificateCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached certificate for `url`, if one exists and is still
    /// within its validity window.
    pub fn get(&self, url: &str) -> Option<Arc<SigningCertificate>> {
        let entries = self.entries.read().ok()?;

        entries
            .get(url)
            .filter(|cert| cert.is_valid_at(utc_now()))
            .cloned()
    }

    /// Store a validated certificate for `url`, replacing any earlier entry.
    pub fn put(&self, url: &str, certificate: Arc<SigningCertificate>) {
        if let Ok(mut entries) = self.entries.write() {
            entries.insert(url.to_owned(), certificate);
        }
    }
}
