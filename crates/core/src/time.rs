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

//! Wall-clock helpers and the per-venue server-time offset.
//!
//! Signed venues reject requests whose timestamp runs ahead of their server
//! clock. Each client samples the venue's server-time endpoint once at
//! construction and applies the observed offset to every signed request.

use std::sync::atomic::{AtomicI64, Ordering};

/// Current Unix time in milliseconds.
#[must_use]
pub fn unix_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Tracks the offset between a venue's server clock and the local clock.
#[derive(Debug, Default)]
pub struct ServerClock {
    offset_ms: AtomicI64,
}

impl ServerClock {
    /// Creates a clock with zero offset.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the offset implied by an observed server timestamp.
    pub fn sync(&self, server_time_ms: i64) {
        let offset = server_time_ms - unix_ms();
        self.offset_ms.store(offset, Ordering::Relaxed);
    }

    /// Returns the current offset in milliseconds.
    #[must_use]
    pub fn offset_ms(&self) -> i64 {
        self.offset_ms.load(Ordering::Relaxed)
    }

    /// Current time in milliseconds, adjusted to the venue's clock.
    #[must_use]
    pub fn now_ms(&self) -> i64 {
        unix_ms() + self.offset_ms()
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
    fn sync_applies_offset() {
        let clock = ServerClock::new();
        clock.sync(unix_ms() - 5_000);
        let offset = clock.offset_ms();
        assert!((-5_100..=-4_900).contains(&offset), "offset was {offset}");
        assert!(clock.now_ms() < unix_ms());
    }
}
