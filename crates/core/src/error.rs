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

//! Unified error taxonomy surfaced by every venue adapter.
//!
//! Venue translators map wire-level failures (HTTP status, venue error codes,
//! message-pattern matches) into these kinds so callers can branch on meaning
//! rather than on venue-specific codes. Idempotent no-op responses ("no need
//! to change margin type" and friends) are coerced to success *inside* the
//! adapters and never surface here.

use std::time::Duration;

use rust_decimal::Decimal;
use thiserror::Error;

/// Result alias used across the workspace.
pub type TradeResult<T> = Result<T, TradeError>;

/// The error type surfaced by all trading and sync operations.
#[derive(Debug, Error)]
pub enum TradeError {
    /// Bad credentials or an unsupported account type (e.g. Unified/Portfolio Margin).
    #[error("authentication failure: {message}")]
    AuthFailure { message: String },

    /// The symbol is not known to the venue or the registry.
    #[error("unknown symbol: {symbol}")]
    SymbolUnknown { symbol: String },

    /// Precision metadata could not be resolved for the symbol.
    #[error("precision unavailable for {symbol}: {message}")]
    PrecisionUnavailable { symbol: String, message: String },

    /// The order is below the venue minimum or its quantity rounds to zero.
    #[error(
        "order too small for {symbol}: quantity {quantity} at price {price} \
         gives notional {notional}, minimum is {min_notional}"
    )]
    OrderTooSmall {
        symbol: String,
        quantity: Decimal,
        price: Decimal,
        notional: Decimal,
        min_notional: Decimal,
    },

    /// The formatted quantity rendered as zero for a strictly positive input.
    #[error("quantity {quantity} for {symbol} rounds to zero at step {step}")]
    QuantityRoundsToZero {
        symbol: String,
        quantity: Decimal,
        step: String,
    },

    /// Venue rate limit hit.
    #[error("rate limited: {message}")]
    RateLimited {
        message: String,
        retry_after: Option<Duration>,
    },

    /// A venue-imposed cooldown window is still open (e.g. post-leverage-change).
    #[error("cooldown active for {remaining:?}")]
    Cooldown { remaining: Duration },

    /// Network failure or 5xx; the sync engine retries on its next cycle.
    #[error("transient error: {message}")]
    Transient { message: String },

    /// A persisted sync checkpoint lies in the future relative to `now`.
    #[error("corrupt checkpoint: persisted {checkpoint_ms} is ahead of now {now_ms}")]
    CorruptCheckpoint { checkpoint_ms: i64, now_ms: i64 },

    /// Fatal safety violation detected at initialization (agent wallet holds funds).
    #[error("security violation: {message}")]
    SecurityViolation { message: String },

    /// Venue returned an error code this adapter does not classify further.
    #[error("venue error {code}: {message}")]
    Venue { code: i64, message: String },

    /// JSON (de)serialization failure.
    #[error("json error: {message}")]
    Json { message: String },

    /// Local configuration problem (missing credentials, bad URL, ...).
    #[error("configuration error: {0}")]
    Config(String),
}

impl TradeError {
    /// Creates a [`TradeError::Transient`] from any displayable source.
    pub fn transient(message: impl Into<String>) -> Self {
        Self::Transient {
            message: message.into(),
        }
    }

    /// Creates a [`TradeError::AuthFailure`].
    pub fn auth(message: impl Into<String>) -> Self {
        Self::AuthFailure {
            message: message.into(),
        }
    }

    /// Creates a [`TradeError::Venue`] from a raw code and message.
    pub fn venue(code: i64, message: impl Into<String>) -> Self {
        Self::Venue {
            code,
            message: message.into(),
        }
    }

    /// Creates a [`TradeError::Config`].
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Whether the operation is worth retrying (the sync engine relies on
    /// this to decide between "retry next cycle" and "surface now").
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Transient { .. } | Self::RateLimited { .. } | Self::Cooldown { .. }
        )
    }

    /// Whether the error requires operator intervention before any retry.
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::AuthFailure { .. } | Self::SecurityViolation { .. })
    }

    /// Classifies a bare HTTP status with an optional body excerpt.
    pub fn from_http_status(status: u16, message: Option<String>) -> Self {
        let message = message.unwrap_or_else(|| format!("HTTP {status}"));
        match status {
            401 | 403 => Self::AuthFailure { message },
            429 => Self::RateLimited {
                message,
                retry_after: None,
            },
            s if (500..600).contains(&s) => Self::Transient { message },
            _ => Self::Venue {
                code: i64::from(status),
                message,
            },
        }
    }
}

impl From<reqwest::Error> for TradeError {
    fn from(error: reqwest::Error) -> Self {
        if let Some(status) = error.status() {
            Self::from_http_status(status.as_u16(), Some(error.to_string()))
        } else {
            // Timeouts, DNS, connection resets: all retryable.
            Self::Transient {
                message: error.to_string(),
            }
        }
    }
}

impl From<serde_json::Error> for TradeError {
    fn from(error: serde_json::Error) -> Self {
        Self::Json {
            message: error.to_string(),
        }
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
    #[case(401, true, false)]
    #[case(403, true, false)]
    #[case(429, false, true)]
    #[case(500, false, true)]
    #[case(503, false, true)]
    #[case(400, false, false)]
    fn http_status_classification(#[case] status: u16, #[case] fatal: bool, #[case] retryable: bool) {
        let err = TradeError::from_http_status(status, None);
        assert_eq!(err.is_fatal(), fatal);
        assert_eq!(err.is_retryable(), retryable);
    }

    #[rstest]
    fn order_too_small_message_carries_values() {
        let err = TradeError::OrderTooSmall {
            symbol: "BTCUSDT".to_string(),
            quantity: "0.0001".parse().unwrap(),
            price: "40000".parse().unwrap(),
            notional: "4".parse().unwrap(),
            min_notional: "10".parse().unwrap(),
        };
        let text = err.to_string();
        assert!(text.contains("0.0001"));
        assert!(text.contains("40000"));
        assert!(text.contains("10"));
    }

    #[rstest]
    fn security_violation_is_fatal_not_retryable() {
        let err = TradeError::SecurityViolation {
            message: "agent wallet holds funds".to_string(),
        };
        assert!(err.is_fatal());
        assert!(!err.is_retryable());
    }
}
