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

//! EVM key handling and EIP-55 address checksumming.

use std::{fmt, str::FromStr};

use alloy_primitives::keccak256;
use alloy_signer_local::PrivateKeySigner;
use omniperp_core::error::{TradeError, TradeResult};
use zeroize::ZeroizeOnDrop;

/// Secure wrapper for an EVM private key, zeroized on drop.
#[derive(Clone, ZeroizeOnDrop)]
pub struct EvmPrivateKey {
    key_hex: String,
}

impl EvmPrivateKey {
    /// Creates a key from a 64-hex-char string, with or without `0x`.
    ///
    /// # Errors
    ///
    /// Returns [`TradeError::Config`] when the input is not 32 bytes of hex.
    pub fn new(key: impl Into<String>) -> TradeResult<Self> {
        let key = key.into();
        let hex_part = key.trim().strip_prefix("0x").unwrap_or(key.trim());
        if hex_part.len() != 64 || !hex_part.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(TradeError::config(
                "EVM private key must be 32 bytes (64 hex chars)",
            ));
        }
        Ok(Self {
            key_hex: hex_part.to_ascii_lowercase(),
        })
    }

    /// Builds a secp256k1 signer from the key.
    ///
    /// # Errors
    ///
    /// Returns [`TradeError::Config`] when the key is outside the curve order.
    pub fn signer(&self) -> TradeResult<PrivateKeySigner> {
        PrivateKeySigner::from_str(&self.key_hex)
            .map_err(|e| TradeError::config(format!("invalid private key: {e}")))
    }
}

impl fmt::Debug for EvmPrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("EvmPrivateKey(<redacted>)")
    }
}

/// Normalizes an Ethereum address to EIP-55 mixed-case checksum form.
///
/// The hex is lowercased, hashed with Keccak-256, and each hex character is
/// uppercased when the corresponding nibble of the hash is ≥ 8. Running the
/// algorithm on an already-checksummed address is the identity.
///
/// # Errors
///
/// Returns [`TradeError::Config`] when the input is not 20 bytes of hex.
pub fn to_checksum_address(address: &str) -> TradeResult<String> {
    let hex_part = address.trim().strip_prefix("0x").unwrap_or(address.trim());
    if hex_part.len() != 40 || !hex_part.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(TradeError::config(format!(
            "invalid ethereum address '{address}'"
        )));
    }
    let lower = hex_part.to_ascii_lowercase();
    let hash = keccak256(lower.as_bytes());
    let mut out = String::with_capacity(42);
    out.push_str("0x");
    for (i, c) in lower.chars().enumerate() {
        let nibble = (hash[i / 2] >> (if i % 2 == 0 { 4 } else { 0 })) & 0x0f;
        if c.is_ascii_alphabetic() && nibble >= 8 {
            out.push(c.to_ascii_uppercase());
        } else {
            out.push(c);
        }
    }
    Ok(out)
}

////////////////////////////////////////////////////////////////////////////////
// Tests
////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    // Reference vectors from the EIP-55 specification.
    #[rstest]
    #[case("0x5aaeb6053f3e94c9b9a09f33669435e7ef1beaed", "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed")]
    #[case("0xfb6916095ca1df60bb79ce92ce3ea74c37c5d359", "0xfB6916095ca1df60bB79Ce92cE3Ea74c37c5d359")]
    #[case("0xdbf03b407c01e7cd3cbea99509d93f8dddc8c6fb", "0xdbF03B407c01E7cD3CBea99509d93f8DDDC8C6FB")]
    #[case("0xd1220a0cf47c7b9be7a2e6ba89f429762e7b9adb", "0xD1220A0cf47c7B9Be7A2E6BA89F429762e7b9aDb")]
    fn checksum_matches_reference(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(to_checksum_address(input).unwrap(), expected);
    }

    #[rstest]
    fn checksum_is_idempotent() {
        let once = to_checksum_address("0x5aaeb6053f3e94c9b9a09f33669435e7ef1beaed").unwrap();
        let twice = to_checksum_address(&once).unwrap();
        assert_eq!(once, twice);
    }

    #[rstest]
    fn bad_addresses_rejected() {
        assert!(to_checksum_address("0x1234").is_err());
        assert!(to_checksum_address("not-an-address").is_err());
    }

    #[rstest]
    fn private_key_validation() {
        assert!(EvmPrivateKey::new("0xgg").is_err());
        let key = EvmPrivateKey::new(
            "0x1234567890abcdef1234567890abcdef1234567890abcdef1234567890abcdef",
        )
        .unwrap();
        assert!(key.signer().is_ok());
        assert_eq!(format!("{key:?}"), "EvmPrivateKey(<redacted>)");
    }
}
