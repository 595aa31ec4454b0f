// -------------------------------------------------------------------------------------------------
//  Copyright (C) 2025 Omniperp Developers. All rights reserved.
//
//  Licensed under the GNU Lesser General Public License Version 3.0 (the "License");
//  You may not use this file except in compliance with the License.
//  You may obtain a copy of the License at https://www.gnu.org/licenses/lgpl-3.0.en.html
//
//  Unless required by applicable law or agreed to in writing, software
//  distributed under the License is distributed on an "AS IS" BASIS,
//  WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
//  See the License for the specific language governing permissions and
//  limitations under the License.
// -------------------------------------------------------------------------------------------------

//! Gate.io API credential storage and request signing.

use std::fmt::Debug;

use aws_lc_rs::{digest, hmac};
use ustr::Ustr;
use zeroize::ZeroizeOnDrop;

/// API credentials for signing Gate.io v4 REST requests.
///
/// The signed message is five newline-joined lines:
/// `METHOD\nPATH\nQUERY\nSHA512_HEX(BODY)\nTIMESTAMP`, with an HMAC-SHA512
/// signature sent in the `SIGN` header alongside `KEY` and `Timestamp`.
#[derive(Clone, ZeroizeOnDrop)]
pub struct Credential {
    #[zeroize(skip)]
    api_key: Ustr,
    api_secret: Box<[u8]>,
}

impl Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credential")
            .field("api_key", &self.api_key)
            .field("api_secret", &"<redacted>")
            .finish()
    }
}

impl Credential {
    /// Creates a new [`Credential`] from the API key and secret.
    #[must_use]
    pub fn new(api_key: impl Into<String>, api_secret: impl Into<String>) -> Self {
        Self {
            api_key: Ustr::from(api_key.into().as_str()),
            api_secret: api_secret.into().into_bytes().into_boxed_slice(),
        }
    }

    /// Returns the API key.
    #[must_use]
    pub fn api_key(&self) -> &str {
        self.api_key.as_str()
    }

    /// Produces the hex-encoded HMAC-SHA512 signature for a request.
    ///
    /// `path` must include the `/api/v4` prefix; `query` is the raw encoded
    /// query string (empty when absent); `body` is the exact JSON payload
    /// sent over the wire (empty for GET/DELETE).
    #[must_use]
    pub fn sign(&self, method: &str, path: &str, query: &str, body: &str, timestamp: &str) -> String {
        let body_hash = hex::encode(digest::digest(&digest::SHA512, body.as_bytes()));
        let message = format!("{method}\n{path}\n{query}\n{body_hash}\n{timestamp}");
        let key = hmac::Key::new(hmac::HMAC_SHA512, &self.api_secret);
        let tag = hmac::sign(&key, message.as_bytes());
        hex::encode(tag.as_ref())
    }
}

////////////////////////////////////////////////////////////////////////////////
// Tests
////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    fn signature_shape_and_determinism() {
        let credential = Credential::new("key", "secret");
        let a = credential.sign("GET", "/api/v4/futures/usdt/accounts", "", "", "1700000000");
        let b = credential.sign("GET", "/api/v4/futures/usdt/accounts", "", "", "1700000000");
        // HMAC-SHA512 renders as 128 hex chars and is deterministic.
        assert_eq!(a.len(), 128);
        assert!(a.bytes().all(|b| b.is_ascii_hexdigit()));
        assert_eq!(a, b);
    }

    #[rstest]
    fn signature_covers_every_component() {
        let credential = Credential::new("key", "secret");
        let base = credential.sign("GET", "/api/v4/p", "a=1", "", "1");
        assert_ne!(credential.sign("POST", "/api/v4/p", "a=1", "", "1"), base);
        assert_ne!(credential.sign("GET", "/api/v4/q", "a=1", "", "1"), base);
        assert_ne!(credential.sign("GET", "/api/v4/p", "a=2", "", "1"), base);
        assert_ne!(credential.sign("GET", "/api/v4/p", "a=1", "{}", "1"), base);
        assert_ne!(credential.sign("GET", "/api/v4/p", "a=1", "", "2"), base);
    }

    #[rstest]
    fn empty_body_hashes_as_empty_string() {
        // The empty-body SHA-512 digest is a documented constant.
        let digest = hex::encode(aws_lc_rs::digest::digest(
            &aws_lc_rs::digest::SHA512,
            b"",
        ));
        assert_eq!(
            digest,
            "cf83e1357eefb8bdf1542850d66d8007d620e4050b5715dc83f4a921d36ce9ce\
             47d0d13c5d85f2b0ff8318d2877eec2f63b931bd47417a81a538327af927da3e"
        );
    }
}
