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

//! Gate.io error-label decoding into the unified taxonomy.
//!
//! Gate returns `{label, message}` bodies; labels are stable strings, so
//! classification is label-first with a message-pattern fallback.

use omniperp_core::error::TradeError;
use serde::{Deserialize, Serialize};

/// Error body returned with non-2xx statuses.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GateErrorBody {
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub detail: String,
}

impl GateErrorBody {
    /// Human-readable message, whichever field the venue populated.
    #[must_use]
    pub fn text(&self) -> &str {
        if !self.message.is_empty() {
            &self.message
        } else {
            &self.detail
        }
    }
}

/// Labels that mean "nothing to do" and coerce to success.
#[must_use]
pub fn is_idempotent_noop(label: &str) -> bool {
    label == "NO_CHANGE"
}

/// Labels meaning the referenced order is already gone.
#[must_use]
pub fn is_order_gone(label: &str) -> bool {
    matches!(label, "ORDER_NOT_FOUND" | "AUTO_ORDER_NOT_FOUND" | "ORDER_FINISHED")
}

/// Classifies an error body into the unified taxonomy.
#[must_use]
pub fn classify_label(body: &GateErrorBody) -> TradeError {
    let message = format!("{}: {}", body.label, body.text());
    match body.label.as_str() {
        "INVALID_KEY" | "INVALID_SIGNATURE" | "FORBIDDEN" | "READ_ONLY" | "IP_FORBIDDEN" => {
            TradeError::AuthFailure { message }
        }
        "TOO_MANY_REQUESTS" => TradeError::RateLimited {
            message,
            retry_after: None,
        },
        "SERVER_ERROR" | "INTERNAL" | "TOO_BUSY" => TradeError::Transient { message },
        "CONTRACT_NOT_FOUND" => TradeError::SymbolUnknown {
            symbol: body.text().to_string(),
        },
        "ORDER_TOO_SMALL" | "SIZE_TOO_SMALL" => TradeError::venue(0, message),
        _ => TradeError::venue(0, message),
    }
}

////////////////////////////////////////////////////////////////////////////////
// Tests
////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    fn body(label: &str) -> GateErrorBody {
        GateErrorBody {
            label: label.to_string(),
            message: "detail".to_string(),
            detail: String::new(),
        }
    }

    #[rstest]
    fn auth_labels_are_fatal() {
        assert!(classify_label(&body("INVALID_SIGNATURE")).is_fatal());
        assert!(classify_label(&body("INVALID_KEY")).is_fatal());
    }

    #[rstest]
    fn transient_labels_are_retryable() {
        assert!(classify_label(&body("SERVER_ERROR")).is_retryable());
        assert!(classify_label(&body("TOO_MANY_REQUESTS")).is_retryable());
    }

    #[rstest]
    fn coercion_labels() {
        assert!(is_idempotent_noop("NO_CHANGE"));
        assert!(is_order_gone("ORDER_NOT_FOUND"));
        assert!(is_order_gone("AUTO_ORDER_NOT_FOUND"));
        assert!(!is_order_gone("SERVER_ERROR"));
    }
}
