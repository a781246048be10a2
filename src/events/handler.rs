// Copyright 2025 jonefeewang@gmail.com
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use crate::events::event::{
    DepthExchange, FamilyCode, HistogramEntry, HistoricalTick, HistoricalTickBidAsk,
    HistoricalTickLast, NewsProvider, PriceIncrement, SmartComponent, SoftDollarTier,
};
use crate::request::{Bar, Contract, DepthOperation, DepthSide};

/// Receiver side of the dispatch table. One callback per inbound event;
/// every method has a no-op default so an implementation only overrides
/// the events it cares about.
///
/// Callbacks run on the task that pumps `process_events`, never on the
/// reader task, so an implementation may block briefly without stalling
/// socket reads.
#[allow(unused_variables)]
pub trait EventHandler: Send {
    // session / diagnostics
    fn connect_ack(&mut self, server_version: i32) {}
    fn next_valid_order_id(&mut self, order_id: i64) {}
    fn current_time(&mut self, time: DateTime<Utc>) {}
    /// `id < 0` means the error is connection-level, not tied to a request.
    fn error_message(&mut self, id: i64, code: i64, message: &str) {}
    fn managed_accounts(&mut self, accounts: &str) {}
    /// Fired exactly once per session, after the last data event.
    fn connection_closed(&mut self, reason: &str) {}

    // tick data
    fn tick_price(&mut self, request_id: i64, tick_type: i64, price: f64, can_auto_execute: bool) {
    }
    fn tick_size(&mut self, request_id: i64, tick_type: i64, size: Decimal) {}
    fn tick_string(&mut self, request_id: i64, tick_type: i64, value: &str) {}
    fn tick_generic(&mut self, request_id: i64, tick_type: i64, value: f64) {}
    #[allow(clippy::too_many_arguments)]
    fn tick_efp(
        &mut self,
        request_id: i64,
        tick_type: i64,
        basis_points: f64,
        formatted_basis_points: &str,
        implied_futures_price: f64,
        hold_days: i64,
        future_last_trade_date: &str,
        dividend_impact: f64,
        dividends_to_last_trade: f64,
    ) {
    }
    #[allow(clippy::too_many_arguments)]
    fn tick_option_computation(
        &mut self,
        request_id: i64,
        tick_type: i64,
        implied_volatility: f64,
        delta: f64,
        option_price: f64,
        pv_dividend: f64,
        gamma: f64,
        vega: f64,
        theta: f64,
        underlying_price: f64,
    ) {
    }
    fn tick_news(
        &mut self,
        request_id: i64,
        time: DateTime<Utc>,
        provider_code: &str,
        article_id: &str,
        headline: &str,
        extra_data: &str,
    ) {
    }
    fn tick_snapshot_end(&mut self, request_id: i64) {}
    fn market_data_type(&mut self, request_id: i64, data_type: i64) {}
    fn tick_request_params(
        &mut self,
        request_id: i64,
        min_tick: f64,
        bbo_exchange: &str,
        snapshot_permissions: i64,
    ) {
    }

    // tick-by-tick
    fn tick_by_tick_last(
        &mut self,
        request_id: i64,
        time: DateTime<Utc>,
        price: f64,
        size: Decimal,
        exchange: &str,
    ) {
    }
    fn tick_by_tick_bid_ask(
        &mut self,
        request_id: i64,
        time: DateTime<Utc>,
        bid_price: f64,
        ask_price: f64,
        bid_size: Decimal,
        ask_size: Decimal,
    ) {
    }
    fn tick_by_tick_midpoint(&mut self, request_id: i64, time: DateTime<Utc>, midpoint: f64) {}

    // market depth
    fn market_depth_update(
        &mut self,
        request_id: i64,
        position: i64,
        operation: DepthOperation,
        side: DepthSide,
        price: f64,
        size: Decimal,
    ) {
    }
    #[allow(clippy::too_many_arguments)]
    fn market_depth_l2_update(
        &mut self,
        request_id: i64,
        position: i64,
        market_maker: &str,
        operation: DepthOperation,
        side: DepthSide,
        price: f64,
        size: Decimal,
        smart_depth: bool,
    ) {
    }
    fn market_depth_end(&mut self, request_id: i64) {}
    fn market_depth_exchanges(&mut self, exchanges: &[DepthExchange]) {}

    // orders
    #[allow(clippy::too_many_arguments)]
    fn open_order(
        &mut self,
        order_id: i64,
        contract: &Contract,
        action: &str,
        quantity: Decimal,
        order_type: &str,
        limit_price: f64,
        status: &str,
    ) {
    }
    fn open_order_end(&mut self) {}
    #[allow(clippy::too_many_arguments)]
    fn order_status(
        &mut self,
        order_id: i64,
        status: &str,
        filled: Decimal,
        remaining: Decimal,
        avg_fill_price: f64,
        last_fill_price: f64,
        why_held: &str,
    ) {
    }
    fn order_bound(&mut self, order_id: i64, api_client_id: i64, api_order_id: i64) {}
    fn completed_order(&mut self, contract: &Contract, action: &str, quantity: Decimal, status: &str) {
    }
    fn completed_orders_end(&mut self) {}
    fn commission_report(
        &mut self,
        execution_id: &str,
        commission: f64,
        currency: &str,
        realized_pnl: f64,
    ) {
    }
    #[allow(clippy::too_many_arguments)]
    fn execution_details(
        &mut self,
        request_id: i64,
        order_id: i64,
        execution_id: &str,
        time: &str,
        side: &str,
        shares: Decimal,
        price: f64,
        exchange: &str,
    ) {
    }
    fn execution_details_end(&mut self, request_id: i64) {}

    // account
    fn account_value(&mut self, key: &str, value: &str, currency: &str, account: &str) {}
    #[allow(clippy::too_many_arguments)]
    fn portfolio_update(
        &mut self,
        contract: &Contract,
        position: Decimal,
        market_price: f64,
        market_value: f64,
        average_cost: f64,
        unrealized_pnl: f64,
        realized_pnl: f64,
        account: &str,
    ) {
    }
    fn account_update_time(&mut self, time: &str) {}
    fn account_download_end(&mut self, account: &str) {}
    fn account_summary(
        &mut self,
        request_id: i64,
        account: &str,
        summary_tag: &str,
        value: &str,
        currency: &str,
    ) {
    }
    fn account_summary_end(&mut self, request_id: i64) {}
    fn account_update_multi(
        &mut self,
        request_id: i64,
        account: &str,
        model_code: &str,
        key: &str,
        value: &str,
        currency: &str,
    ) {
    }
    fn account_update_multi_end(&mut self, request_id: i64) {}
    fn position(
        &mut self,
        request_id: i64,
        account: &str,
        contract: &Contract,
        position: Decimal,
        average_cost: f64,
    ) {
    }
    fn position_end(&mut self, request_id: i64) {}
    fn position_multi(
        &mut self,
        request_id: i64,
        account: &str,
        model_code: &str,
        contract: &Contract,
        position: Decimal,
        average_cost: f64,
    ) {
    }
    fn position_multi_end(&mut self, request_id: i64) {}
    fn pnl(&mut self, request_id: i64, daily_pnl: f64, unrealized_pnl: f64, realized_pnl: f64) {}
    fn pnl_single(
        &mut self,
        request_id: i64,
        position: Decimal,
        daily_pnl: f64,
        unrealized_pnl: f64,
        realized_pnl: f64,
        value: f64,
    ) {
    }
    fn family_codes(&mut self, family_codes: &[FamilyCode]) {}
    fn user_info(&mut self, white_branding_id: &str) {}

    // contract reference data
    fn contract_details(
        &mut self,
        request_id: i64,
        contract: &Contract,
        long_name: &str,
        category: &str,
        contract_id: i64,
    ) {
    }
    fn bond_contract_details(
        &mut self,
        request_id: i64,
        contract: &Contract,
        coupon: f64,
        maturity: &str,
    ) {
    }
    fn contract_details_end(&mut self, request_id: i64) {}
    fn symbol_samples(&mut self, request_id: i64, samples: &[Contract]) {}
    fn smart_components(&mut self, request_id: i64, components: &[SmartComponent]) {}
    fn market_rule(&mut self, market_rule_id: i64, price_increments: &[PriceIncrement]) {}
    fn soft_dollar_tiers(&mut self, request_id: i64, tiers: &[SoftDollarTier]) {}
    #[allow(clippy::too_many_arguments)]
    fn option_chain_parameter(
        &mut self,
        request_id: i64,
        exchange: &str,
        underlying_contract_id: i64,
        trading_class: &str,
        multiplier: &str,
        expirations: &[String],
        strikes: &[f64],
    ) {
    }
    fn option_chain_parameter_end(&mut self, request_id: i64) {}
    fn delta_neutral_validation(&mut self, request_id: i64, contract_id: i64, delta: f64, price: f64) {
    }

    // historical data
    fn historical_bar(&mut self, request_id: i64, bar: &Bar) {}
    fn historical_bars_end(&mut self, request_id: i64, start: &str, end: &str) {}
    fn historical_bar_update(&mut self, request_id: i64, bar: &Bar) {}
    fn head_timestamp(&mut self, request_id: i64, timestamp: &str) {}
    fn histogram_data(&mut self, request_id: i64, entries: &[HistogramEntry]) {}
    fn historical_ticks(&mut self, request_id: i64, ticks: &[HistoricalTick], done: bool) {}
    fn historical_ticks_bid_ask(
        &mut self,
        request_id: i64,
        ticks: &[HistoricalTickBidAsk],
        done: bool,
    ) {
    }
    fn historical_ticks_last(&mut self, request_id: i64, ticks: &[HistoricalTickLast], done: bool) {
    }
    fn historical_schedule(&mut self, request_id: i64, start: &str, end: &str, time_zone: &str) {}
    fn real_time_bar(&mut self, request_id: i64, bar: &Bar) {}

    // news
    fn news_bulletin(
        &mut self,
        message_id: i64,
        message_type: i64,
        message: &str,
        origin_exchange: &str,
    ) {
    }
    fn news_providers(&mut self, providers: &[NewsProvider]) {}
    fn news_article(&mut self, request_id: i64, article_type: i64, article_text: &str) {}
    fn historical_news(
        &mut self,
        request_id: i64,
        time: &str,
        provider_code: &str,
        article_id: &str,
        headline: &str,
    ) {
    }
    fn historical_news_end(&mut self, request_id: i64, has_more: bool) {}

    // scanner
    fn scanner_parameters(&mut self, xml: &str) {}
    #[allow(clippy::too_many_arguments)]
    fn scanner_data(
        &mut self,
        request_id: i64,
        rank: i64,
        contract: &Contract,
        distance: &str,
        benchmark: &str,
        projection: &str,
    ) {
    }
    fn scanner_data_end(&mut self, request_id: i64) {}

    // fundamentals
    fn fundamental_data(&mut self, request_id: i64, data: &str) {}

    // display groups
    fn display_group_list(&mut self, request_id: i64, groups: &str) {}
    fn display_group_updated(&mut self, request_id: i64, contract_info: &str) {}

    // wall street horizon
    fn wsh_meta_data(&mut self, request_id: i64, data: &str) {}
    fn wsh_event_data(&mut self, request_id: i64, data: &str) {}
}

/// Handler that ignores everything. Useful when a caller only needs the
/// completion handles from the correlator.
#[derive(Debug, Default)]
pub struct NoopHandler;

impl EventHandler for NoopHandler {}
