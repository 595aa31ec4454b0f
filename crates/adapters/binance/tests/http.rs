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

//! Integration tests for the Binance HTTP client against a mock server.

use std::{collections::HashMap, net::SocketAddr};

use axum::{
    Router,
    extract::Query,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
};
use omniperp_binance::{
    common::credential::Credential,
    http::{
        client::BinanceHttpClient,
        query::{BinanceIncomeParamsBuilder, BinanceUserTradesParamsBuilder},
    },
};
use omniperp_core::error::TradeError;
use rstest::rstest;
use serde_json::json;

async fn handle_time() -> impl IntoResponse {
    Json(json!({"serverTime": 1_704_470_400_123_i64}))
}

async fn handle_balance(query: Query<HashMap<String, String>>) -> Response {
    // Signed requests must carry timestamp and signature.
    if !query.contains_key("timestamp") || !query.contains_key("signature") {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"code": -1102, "msg": "Mandatory parameter missing"})),
        )
            .into_response();
    }
    Json(json!([
        {
            "asset": "USDT",
            "balance": "1000.5",
            "availableBalance": "800.25",
            "crossUnPnl": "-12.5"
        },
        {
            "asset": "BNB",
            "balance": "0.1",
            "availableBalance": "0.1",
            "crossUnPnl": "0"
        }
    ]))
    .into_response()
}

async fn handle_dual_side() -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(json!({"code": -4059, "msg": "No need to change position side."})),
    )
        .into_response()
}

async fn handle_margin_type() -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(json!({"code": -4046, "msg": "No need to change margin type."})),
    )
        .into_response()
}

async fn handle_user_trades(query: Query<HashMap<String, String>>) -> Response {
    assert_eq!(query.get("symbol").map(String::as_str), Some("ETHUSDT"));
    Json(json!([
        {
            "id": 698759,
            "orderId": 25851813,
            "symbol": "ETHUSDT",
            "side": "SELL",
            "positionSide": "SHORT",
            "price": "3500",
            "qty": "0.05",
            "realizedPnl": "0",
            "commission": "0.07",
            "commissionAsset": "USDT",
            "time": 1_704_470_300_000_i64,
            "buyer": false,
            "maker": false
        }
    ]))
    .into_response()
}

async fn handle_income(query: Query<HashMap<String, String>>) -> Response {
    assert_eq!(query.get("incomeType").map(String::as_str), Some("COMMISSION"));
    Json(json!([
        {"symbol": "ETHUSDT", "incomeType": "COMMISSION", "income": "-0.07", "time": 1_704_470_300_000_i64},
        {"symbol": "BTCUSDT", "incomeType": "COMMISSION", "income": "-0.11", "time": 1_704_470_301_000_i64}
    ]))
    .into_response()
}

async fn handle_auth_error() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({"code": -2015, "msg": "Invalid API-key, IP, or permissions for action."})),
    )
        .into_response()
}

async fn spawn_server(router: Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    addr
}

fn client_for(addr: SocketAddr) -> BinanceHttpClient {
    BinanceHttpClient::new(
        Credential::new("test_key", "test_secret"),
        Some(format!("http://{addr}")),
        None,
    )
    .unwrap()
}

fn router() -> Router {
    Router::new()
        .route("/fapi/v1/time", get(handle_time))
        .route("/fapi/v2/balance", get(handle_balance))
        .route("/fapi/v1/positionSide/dual", post(handle_dual_side))
        .route("/fapi/v1/marginType", post(handle_margin_type))
        .route("/fapi/v1/userTrades", get(handle_user_trades))
        .route("/fapi/v1/income", get(handle_income))
}

#[rstest]
#[tokio::test]
async fn signed_balance_round_trip() {
    let addr = spawn_server(router()).await;
    let client = client_for(addr);
    client.sync_server_time().await.unwrap();

    let balances = client.balances().await.unwrap();
    let usdt = balances.iter().find(|b| b.asset.as_str() == "USDT").unwrap();
    assert_eq!(usdt.balance, "1000.5");
    assert_eq!(usdt.cross_un_pnl, "-12.5");
}

#[rstest]
#[tokio::test]
async fn dual_side_noop_is_coerced_to_success() {
    let addr = spawn_server(router()).await;
    let client = client_for(addr);

    let changed = client.enable_dual_side().await.unwrap();
    assert!(!changed);
}

#[rstest]
#[tokio::test]
async fn margin_type_noop_is_coerced_to_success() {
    let addr = spawn_server(router()).await;
    let client = client_for(addr);

    let params = omniperp_binance::http::query::BinanceMarginTypeParamsBuilder::default()
        .symbol("ETHUSDT")
        .build()
        .unwrap();
    let changed = client.set_margin_type(&params).await.unwrap();
    assert!(!changed);
}

#[rstest]
#[tokio::test]
async fn user_trades_deserialize_with_position_side() {
    let addr = spawn_server(router()).await;
    let client = client_for(addr);

    let params = BinanceUserTradesParamsBuilder::default()
        .symbol("ETHUSDT")
        .limit(500_u32)
        .build()
        .unwrap();
    let trades = client.user_trades(&params).await.unwrap();
    assert_eq!(trades.len(), 1);
    assert_eq!(trades[0].position_side, "SHORT");
    assert_eq!(trades[0].side, "SELL");
    assert_eq!(trades[0].realized_pnl, "0");
}

#[rstest]
#[tokio::test]
async fn income_discovery_lists_symbols() {
    let addr = spawn_server(router()).await;
    let client = client_for(addr);

    let params = BinanceIncomeParamsBuilder::default()
        .start_time(1_704_470_000_000_i64)
        .build()
        .unwrap();
    let records = client.income(&params).await.unwrap();
    let symbols: Vec<&str> = records.iter().map(|r| r.symbol.as_str()).collect();
    assert_eq!(symbols, vec!["ETHUSDT", "BTCUSDT"]);
}

#[rstest]
#[tokio::test]
async fn auth_errors_surface_as_fatal() {
    let router = Router::new()
        .route("/fapi/v1/time", get(handle_time))
        .route("/fapi/v2/balance", get(handle_auth_error));
    let addr = spawn_server(router).await;
    let client = client_for(addr);

    let err = client.balances().await.unwrap_err();
    assert!(matches!(err, TradeError::AuthFailure { .. }));
    assert!(err.is_fatal());
}
