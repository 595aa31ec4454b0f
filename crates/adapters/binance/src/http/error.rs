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

//! Binance futures error-code decoding into the unified taxonomy.
//!
//! Binance does not always return stable codes for account-state errors, so
//! message-pattern matching backs up the code table.

use omniperp_core::error::TradeError;

/// Stop orders have migrated to the algo endpoint family.
pub const CODE_STOP_ORDER_SWITCH_ALGO: i64 = -4120;
/// "No need to change position side."
pub const CODE_NO_NEED_CHANGE_POSITION_SIDE: i64 = -4059;
/// "No need to change margin type."
pub const CODE_NO_NEED_CHANGE_MARGIN_TYPE: i64 = -4046;
/// Margin type cannot be changed while a position or open order exists.
pub const CODE_MARGIN_TYPE_POSITION_EXISTS: i64 = -4048;
/// Invalid API key, IP, or permissions.
pub const CODE_REJECTED_MBX_KEY: i64 = -2015;
/// API key format invalid.
pub const CODE_API_KEY_FORMAT: i64 = -2014;
/// Timestamp outside of the receive window.
pub const CODE_TIMESTAMP_OUT_OF_WINDOW: i64 = -1021;
/// Too many requests.
pub const CODE_TOO_MANY_REQUESTS: i64 = -1003;
/// Unknown order sent (cancel of an already-gone order).
pub const CODE_UNKNOWN_ORDER: i64 = -2011;
/// Order would immediately trigger / below min notional family.
pub const CODE_MIN_NOTIONAL: i64 = -4164;

/// Whether the code means "nothing to do" and should coerce to success.
#[must_use]
pub fn is_idempotent_noop(code: i64) -> bool {
    matches!(
        code,
        CODE_NO_NEED_CHANGE_POSITION_SIDE | CODE_NO_NEED_CHANGE_MARGIN_TYPE
    )
}

/// Whether a margin-type change failed only because positions exist; the
/// facade accepts this silently since the venue forbids the change.
#[must_use]
pub fn is_margin_change_blocked_by_position(code: i64, message: &str) -> bool {
    code == CODE_MARGIN_TYPE_POSITION_EXISTS
        || message.contains("Margin type cannot be changed if there exists position")
}

/// Classifies a Binance error body into the unified taxonomy.
#[must_use]
pub fn classify_code(code: i64, message: String) -> TradeError {
    // Unified/Portfolio-Margin accounts answer classic endpoints with
    // account-type complaints; the facade cannot operate there.
    if message.contains("Portfolio Margin") || message.contains("portfolio margin") {
        return TradeError::AuthFailure { message };
    }
    match code {
        CODE_REJECTED_MBX_KEY | CODE_API_KEY_FORMAT => TradeError::AuthFailure { message },
        CODE_TOO_MANY_REQUESTS | -1015 => TradeError::RateLimited {
            message,
            retry_after: None,
        },
        CODE_TIMESTAMP_OUT_OF_WINDOW | -1001 => TradeError::Transient { message },
        CODE_MIN_NOTIONAL => TradeError::venue(code, format!("below minimum notional: {message}")),
        -1121 => TradeError::SymbolUnknown { symbol: message },
        _ => TradeError::Venue { code, message },
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
        assert!(is_idempotent_noop(CODE_NO_NEED_CHANGE_POSITION_SIDE));
        assert!(is_idempotent_noop(CODE_NO_NEED_CHANGE_MARGIN_TYPE));
        assert!(!is_idempotent_noop(CODE_STOP_ORDER_SWITCH_ALGO));
    }

    #[rstest]
    fn auth_codes_are_fatal() {
        assert!(classify_code(CODE_REJECTED_MBX_KEY, "bad key".into()).is_fatal());
        assert!(classify_code(0, "This account is a Portfolio Margin account".into()).is_fatal());
    }

    #[rstest]
    fn timestamp_drift_is_retryable() {
        assert!(classify_code(CODE_TIMESTAMP_OUT_OF_WINDOW, "ahead of server time".into()).is_retryable());
    }

    #[rstest]
    fn margin_change_blocked_detection() {
        assert!(is_margin_change_blocked_by_position(
            CODE_MARGIN_TYPE_POSITION_EXISTS,
            ""
        ));
        assert!(is_margin_change_blocked_by_position(
            0,
            "Margin type cannot be changed if there exists position"
        ));
    }
}
