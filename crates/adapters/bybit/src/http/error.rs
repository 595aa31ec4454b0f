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

//! Bybit `retCode` decoding into the unified error taxonomy.
//!
//! See <https://bybit-exchange.github.io/docs/v5/error> for error codes.
//! Idempotent no-op codes are not handled here; the trader facade coerces
//! them before classification.

use omniperp_core::error::TradeError;

/// Leverage not modified (already at the requested value).
pub const RET_LEVERAGE_NOT_MODIFIED: i64 = 110043;
/// Cross/isolated margin mode not modified.
pub const RET_MARGIN_MODE_NOT_MODIFIED: i64 = 110026;
/// Isolated margin mode cannot change while positions exist.
pub const RET_MARGIN_MODE_OPEN_POSITION: i64 = 110024;
/// Position mode not modified (hedge mode already enabled).
pub const RET_POSITION_MODE_NOT_MODIFIED: i64 = 110025;
/// Order does not exist or is already in a terminal state.
pub const RET_ORDER_NOT_EXISTS: i64 = 110001;

/// Whether a `retCode` means "nothing to do" and should coerce to success.
#[must_use]
pub fn is_idempotent_noop(ret_code: i64) -> bool {
    matches!(
        ret_code,
        RET_LEVERAGE_NOT_MODIFIED | RET_MARGIN_MODE_NOT_MODIFIED | RET_POSITION_MODE_NOT_MODIFIED
    )
}

/// Classifies a non-zero `retCode` into the unified taxonomy.
#[must_use]
pub fn classify_ret_code(ret_code: i64, message: String) -> TradeError {
    match ret_code {
        10002 => TradeError::Transient {
            // Request timestamp outside the receive window: clock drift,
            // recoverable after the next server-time sync.
            message,
        },
        10003 | 10004 | 10005 | 33004 => TradeError::AuthFailure { message },
        10006 | 10018 => TradeError::RateLimited {
            message,
            retry_after: None,
        },
        110007 => TradeError::Venue {
            code: ret_code,
            message: format!("insufficient balance: {message}"),
        },
        110094 => TradeError::Venue {
            code: ret_code,
            message: format!("below minimum order value: {message}"),
        },
        // Unified-account-only endpoints hit with a classic account, or the
        // reverse; the facade cannot operate on this account type.
        3400045 | 170213 => TradeError::AuthFailure { message },
        _ => TradeError::Venue {
            code: ret_code,
            message,
        },
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
    fn noop_codes() {
        assert!(is_idempotent_noop(RET_LEVERAGE_NOT_MODIFIED));
        assert!(is_idempotent_noop(RET_POSITION_MODE_NOT_MODIFIED));
        assert!(!is_idempotent_noop(RET_ORDER_NOT_EXISTS));
    }

    #[rstest]
    fn auth_codes_are_fatal() {
        let err = classify_ret_code(10003, "invalid api key".to_string());
        assert!(err.is_fatal());
    }

    #[rstest]
    fn rate_limit_is_retryable() {
        let err = classify_ret_code(10006, "too many visits".to_string());
        assert!(err.is_retryable());
    }
}
