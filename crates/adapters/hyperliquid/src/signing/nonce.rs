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

//! Monotonic wall-clock nonces for `/exchange` actions.
//!
//! The venue requires nonces to increase per signer; wall-clock milliseconds
//! satisfy that except when two actions land in the same millisecond, so the
//! source bumps past the last issued value.

use std::sync::atomic::{AtomicU64, Ordering};

use omniperp_core::time::unix_ms;

/// Issues strictly increasing millisecond nonces.
#[derive(Debug, Default)]
pub struct NonceSource {
    last: AtomicU64,
}

impl NonceSource {
    /// Creates a fresh source.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the next nonce: wall-clock ms, bumped to stay monotonic.
    #[must_use]
    pub fn next(&self) -> u64 {
        let now = unix_ms().max(0) as u64;
        let previous = self
            .last
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |last| {
                Some(now.max(last + 1))
            })
            .unwrap_or(0);
        now.max(previous + 1)
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
    fn nonces_are_strictly_increasing() {
        let source = NonceSource::new();
        let mut last = 0;
        for _ in 0..1_000 {
            let nonce = source.next();
            assert!(nonce > last, "nonce {nonce} not above {last}");
            last = nonce;
        }
    }

    #[rstest]
    fn nonces_track_wall_clock() {
        let source = NonceSource::new();
        let nonce = source.next();
        let now = unix_ms() as u64;
        assert!(nonce >= now - 1_000 && nonce <= now + 1_000);
    }
}
