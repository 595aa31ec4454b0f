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

//! Order-action inference for fills without an explicit venue direction.

use omniperp_core::models::{OrderAction, PositionSide, TradeRecord, TradeSide};
use rust_decimal::Decimal;

/// Determines a fill's position effect.
///
/// An explicit venue direction wins. In hedge mode the (side, positionSide)
/// pair is unambiguous: a SELL against a SHORT slot *opens* the short and
/// must never be read as an `open_long`. In one-way mode a non-zero realized
/// pnl marks a close, with the direction taken from the side.
#[must_use]
pub fn resolve_action(fill: &TradeRecord) -> OrderAction {
    if let Some(action) = fill.order_action {
        return action;
    }
    infer_action(fill.side, fill.position_side, fill.realized_pnl)
}

/// Infers the action from `(side, position_side, realized_pnl)`.
#[must_use]
pub fn infer_action(
    side: TradeSide,
    position_side: PositionSide,
    realized_pnl: Decimal,
) -> OrderAction {
    match position_side {
        PositionSide::Long => match side {
            TradeSide::Buy => OrderAction::OpenLong,
            TradeSide::Sell => OrderAction::CloseLong,
        },
        PositionSide::Short => match side {
            TradeSide::Sell => OrderAction::OpenShort,
            TradeSide::Buy => OrderAction::CloseShort,
        },
        PositionSide::Both => {
            if realized_pnl.is_zero() {
                match side {
                    TradeSide::Buy => OrderAction::OpenLong,
                    TradeSide::Sell => OrderAction::OpenShort,
                }
            } else {
                match side {
                    TradeSide::Buy => OrderAction::CloseShort,
                    TradeSide::Sell => OrderAction::CloseLong,
                }
            }
        }
    }
}

////////////////////////////////////////////////////////////////////////////////
// Tests
////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use rust_decimal_macros::dec;

    use super::*;

    #[rstest]
    #[case(TradeSide::Buy, PositionSide::Long, dec!(0), OrderAction::OpenLong)]
    #[case(TradeSide::Sell, PositionSide::Long, dec!(12), OrderAction::CloseLong)]
    #[case(TradeSide::Sell, PositionSide::Short, dec!(0), OrderAction::OpenShort)]
    #[case(TradeSide::Buy, PositionSide::Short, dec!(5), OrderAction::CloseShort)]
    #[case(TradeSide::Buy, PositionSide::Both, dec!(0), OrderAction::OpenLong)]
    #[case(TradeSide::Sell, PositionSide::Both, dec!(0), OrderAction::OpenShort)]
    #[case(TradeSide::Buy, PositionSide::Both, dec!(3), OrderAction::CloseShort)]
    #[case(TradeSide::Sell, PositionSide::Both, dec!(-3), OrderAction::CloseLong)]
    fn inference_table(
        #[case] side: TradeSide,
        #[case] position_side: PositionSide,
        #[case] pnl: Decimal,
        #[case] expected: OrderAction,
    ) {
        assert_eq!(infer_action(side, position_side, pnl), expected);
    }

    /// A SELL on a SHORT slot with zero pnl opens the short. Misreading it
    /// as `open_long` fabricates phantom longs out of every short entry.
    #[rstest]
    fn sell_short_zero_pnl_opens_short() {
        assert_eq!(
            infer_action(TradeSide::Sell, PositionSide::Short, dec!(0)),
            OrderAction::OpenShort
        );
        assert_ne!(
            infer_action(TradeSide::Sell, PositionSide::Short, dec!(0)),
            OrderAction::OpenLong
        );
    }
}
