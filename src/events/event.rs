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

use crate::codec::{FieldCursor, Frame};
use crate::events::tags;
use crate::request::{epoch_secs, Bar, Contract, DepthOperation, DepthSide};
use crate::{AppError, AppResult};

#[derive(Debug, Clone, PartialEq)]
pub struct DepthExchange {
    pub exchange: String,
    pub security_type: String,
    pub listing_exchange: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FamilyCode {
    pub account_id: String,
    pub family_code: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SmartComponent {
    pub bit_number: i64,
    pub exchange: String,
    pub exchange_letter: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PriceIncrement {
    pub low_edge: f64,
    pub increment: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SoftDollarTier {
    pub name: String,
    pub value: String,
    pub display_name: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HistogramEntry {
    pub price: f64,
    pub size: Decimal,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HistoricalTick {
    pub time: DateTime<Utc>,
    pub price: f64,
    pub size: Decimal,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HistoricalTickBidAsk {
    pub time: DateTime<Utc>,
    pub bid_price: f64,
    pub ask_price: f64,
    pub bid_size: Decimal,
    pub ask_size: Decimal,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HistoricalTickLast {
    pub time: DateTime<Utc>,
    pub price: f64,
    pub size: Decimal,
    pub exchange: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewsProvider {
    pub code: String,
    pub name: String,
}

/// The application-level interpretation of one inbound frame.
///
/// One variant per inbound tag, plus the synthetic `ConnectionClosed`
/// marker the reader loop enqueues when the socket goes away. Variants
/// carry only the fields relevant to them and are consumed once by the
/// handler, never retained by the core.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    // session / diagnostics
    ConnectAck {
        server_version: i32,
    },
    NextValidOrderId {
        order_id: i64,
    },
    CurrentTime {
        time: DateTime<Utc>,
    },
    /// `(id, code, message)`; `id < 0` means connection-level, uncorrelated.
    ErrorMessage {
        id: i64,
        code: i64,
        message: String,
    },
    ManagedAccounts {
        accounts: String,
    },
    /// Synthetic; not a wire tag. Exactly one per session.
    ConnectionClosed {
        reason: String,
    },

    // tick data
    TickPrice {
        request_id: i64,
        tick_type: i64,
        price: f64,
        can_auto_execute: bool,
    },
    TickSize {
        request_id: i64,
        tick_type: i64,
        size: Decimal,
    },
    TickString {
        request_id: i64,
        tick_type: i64,
        value: String,
    },
    TickGeneric {
        request_id: i64,
        tick_type: i64,
        value: f64,
    },
    TickEfp {
        request_id: i64,
        tick_type: i64,
        basis_points: f64,
        formatted_basis_points: String,
        implied_futures_price: f64,
        hold_days: i64,
        future_last_trade_date: String,
        dividend_impact: f64,
        dividends_to_last_trade: f64,
    },
    TickOptionComputation {
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
    },
    TickNews {
        request_id: i64,
        time: DateTime<Utc>,
        provider_code: String,
        article_id: String,
        headline: String,
        extra_data: String,
    },
    TickSnapshotEnd {
        request_id: i64,
    },
    MarketDataType {
        request_id: i64,
        data_type: i64,
    },
    TickRequestParams {
        request_id: i64,
        min_tick: f64,
        bbo_exchange: String,
        snapshot_permissions: i64,
    },

    // tick-by-tick
    TickByTickLast {
        request_id: i64,
        time: DateTime<Utc>,
        price: f64,
        size: Decimal,
        exchange: String,
    },
    TickByTickBidAsk {
        request_id: i64,
        time: DateTime<Utc>,
        bid_price: f64,
        ask_price: f64,
        bid_size: Decimal,
        ask_size: Decimal,
    },
    TickByTickMidpoint {
        request_id: i64,
        time: DateTime<Utc>,
        midpoint: f64,
    },

    // market depth
    MarketDepthUpdate {
        request_id: i64,
        position: i64,
        operation: DepthOperation,
        side: DepthSide,
        price: f64,
        size: Decimal,
    },
    MarketDepthL2Update {
        request_id: i64,
        position: i64,
        market_maker: String,
        operation: DepthOperation,
        side: DepthSide,
        price: f64,
        size: Decimal,
        smart_depth: bool,
    },
    MarketDepthEnd {
        request_id: i64,
    },
    MarketDepthExchanges {
        exchanges: Vec<DepthExchange>,
    },

    // orders
    OpenOrder {
        order_id: i64,
        contract: Contract,
        action: String,
        quantity: Decimal,
        order_type: String,
        limit_price: f64,
        status: String,
    },
    OpenOrderEnd,
    OrderStatus {
        order_id: i64,
        status: String,
        filled: Decimal,
        remaining: Decimal,
        avg_fill_price: f64,
        last_fill_price: f64,
        why_held: String,
    },
    OrderBound {
        order_id: i64,
        api_client_id: i64,
        api_order_id: i64,
    },
    CompletedOrder {
        contract: Contract,
        action: String,
        quantity: Decimal,
        status: String,
    },
    CompletedOrdersEnd,
    CommissionReport {
        execution_id: String,
        commission: f64,
        currency: String,
        realized_pnl: f64,
    },
    ExecutionDetails {
        request_id: i64,
        order_id: i64,
        execution_id: String,
        time: String,
        side: String,
        shares: Decimal,
        price: f64,
        exchange: String,
    },
    ExecutionDetailsEnd {
        request_id: i64,
    },

    // account
    AccountValue {
        key: String,
        value: String,
        currency: String,
        account: String,
    },
    PortfolioUpdate {
        contract: Contract,
        position: Decimal,
        market_price: f64,
        market_value: f64,
        average_cost: f64,
        unrealized_pnl: f64,
        realized_pnl: f64,
        account: String,
    },
    AccountUpdateTime {
        time: String,
    },
    AccountDownloadEnd {
        account: String,
    },
    AccountSummary {
        request_id: i64,
        account: String,
        summary_tag: String,
        value: String,
        currency: String,
    },
    AccountSummaryEnd {
        request_id: i64,
    },
    AccountUpdateMulti {
        request_id: i64,
        account: String,
        model_code: String,
        key: String,
        value: String,
        currency: String,
    },
    AccountUpdateMultiEnd {
        request_id: i64,
    },
    Position {
        request_id: i64,
        account: String,
        contract: Contract,
        position: Decimal,
        average_cost: f64,
    },
    PositionEnd {
        request_id: i64,
    },
    PositionMulti {
        request_id: i64,
        account: String,
        model_code: String,
        contract: Contract,
        position: Decimal,
        average_cost: f64,
    },
    PositionMultiEnd {
        request_id: i64,
    },
    Pnl {
        request_id: i64,
        daily_pnl: f64,
        unrealized_pnl: f64,
        realized_pnl: f64,
    },
    PnlSingle {
        request_id: i64,
        position: Decimal,
        daily_pnl: f64,
        unrealized_pnl: f64,
        realized_pnl: f64,
        value: f64,
    },
    FamilyCodes {
        family_codes: Vec<FamilyCode>,
    },
    UserInfo {
        white_branding_id: String,
    },

    // contract reference data
    ContractDetails {
        request_id: i64,
        contract: Contract,
        long_name: String,
        category: String,
        contract_id: i64,
    },
    BondContractDetails {
        request_id: i64,
        contract: Contract,
        coupon: f64,
        maturity: String,
    },
    ContractDetailsEnd {
        request_id: i64,
    },
    SymbolSamples {
        request_id: i64,
        samples: Vec<Contract>,
    },
    SmartComponents {
        request_id: i64,
        components: Vec<SmartComponent>,
    },
    MarketRule {
        market_rule_id: i64,
        price_increments: Vec<PriceIncrement>,
    },
    SoftDollarTiers {
        request_id: i64,
        tiers: Vec<SoftDollarTier>,
    },
    OptionChainParameter {
        request_id: i64,
        exchange: String,
        underlying_contract_id: i64,
        trading_class: String,
        multiplier: String,
        expirations: Vec<String>,
        strikes: Vec<f64>,
    },
    OptionChainParameterEnd {
        request_id: i64,
    },
    DeltaNeutralValidation {
        request_id: i64,
        contract_id: i64,
        delta: f64,
        price: f64,
    },

    // historical data
    HistoricalBar {
        request_id: i64,
        bar: Bar,
    },
    HistoricalBarsEnd {
        request_id: i64,
        start: String,
        end: String,
    },
    HistoricalBarUpdate {
        request_id: i64,
        bar: Bar,
    },
    HeadTimestamp {
        request_id: i64,
        timestamp: String,
    },
    HistogramData {
        request_id: i64,
        entries: Vec<HistogramEntry>,
    },
    HistoricalTicks {
        request_id: i64,
        ticks: Vec<HistoricalTick>,
        done: bool,
    },
    HistoricalTicksBidAsk {
        request_id: i64,
        ticks: Vec<HistoricalTickBidAsk>,
        done: bool,
    },
    HistoricalTicksLast {
        request_id: i64,
        ticks: Vec<HistoricalTickLast>,
        done: bool,
    },
    HistoricalSchedule {
        request_id: i64,
        start: String,
        end: String,
        time_zone: String,
    },
    RealTimeBar {
        request_id: i64,
        bar: Bar,
    },

    // news
    NewsBulletin {
        message_id: i64,
        message_type: i64,
        message: String,
        origin_exchange: String,
    },
    NewsProviders {
        providers: Vec<NewsProvider>,
    },
    NewsArticle {
        request_id: i64,
        article_type: i64,
        article_text: String,
    },
    HistoricalNews {
        request_id: i64,
        time: String,
        provider_code: String,
        article_id: String,
        headline: String,
    },
    HistoricalNewsEnd {
        request_id: i64,
        has_more: bool,
    },

    // scanner
    ScannerParameters {
        xml: String,
    },
    ScannerData {
        request_id: i64,
        rank: i64,
        contract: Contract,
        distance: String,
        benchmark: String,
        projection: String,
    },
    ScannerDataEnd {
        request_id: i64,
    },

    // fundamentals
    FundamentalData {
        request_id: i64,
        data: String,
    },

    // display groups
    DisplayGroupList {
        request_id: i64,
        groups: String,
    },
    DisplayGroupUpdated {
        request_id: i64,
        contract_info: String,
    },

    // wall street horizon
    WshMetaData {
        request_id: i64,
        data: String,
    },
    WshEventData {
        request_id: i64,
        data: String,
    },
}

/// How an event relates to the correlator.
///
/// `Tracked` events belong to a family the client can initiate and are
/// gated on a live pending entry; `terminal` marks the family's end
/// sentinel (or one-shot reply). Request-scoped events outside the
/// outbound surface are `Informational` and flow through ungated, as do
/// session-scoped events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Correlation {
    Session,
    Informational,
    Tracked { request_id: i64, terminal: bool },
    Order { order_id: i64 },
}

fn read_contract(cursor: &mut FieldCursor) -> AppResult<Contract> {
    Ok(Contract {
        symbol: cursor.str()?,
        security_type: cursor.str()?,
        exchange: cursor.str()?,
        currency: cursor.str()?,
    })
}

fn read_bar(cursor: &mut FieldCursor) -> AppResult<Bar> {
    Ok(Bar {
        time: epoch_secs(cursor.int()?)?,
        open: cursor.float()?,
        high: cursor.float()?,
        low: cursor.float()?,
        close: cursor.float()?,
        volume: cursor.decimal()?,
        weighted_avg: cursor.decimal()?,
        count: cursor.int()?,
    })
}

fn read_count(cursor: &mut FieldCursor) -> AppResult<usize> {
    let count = cursor.int()?;
    if count < 0 {
        return Err(AppError::MalformedProtocol(format!(
            "negative list length: {}",
            count
        )));
    }
    Ok(count as usize)
}

impl Event {
    /// Interprets a decoded frame. `Ok(None)` means the tag is unknown to
    /// this client; per the forward-compatibility contract the caller
    /// logs and skips it rather than failing the session.
    pub fn from_frame(frame: &Frame) -> AppResult<Option<Event>> {
        let mut c = FieldCursor::new(&frame.fields);
        let event = match frame.tag {
            tags::CONNECT_ACK => Event::ConnectAck {
                server_version: c.int()? as i32,
            },
            tags::NEXT_VALID_ORDER_ID => Event::NextValidOrderId { order_id: c.int()? },
            tags::CURRENT_TIME => Event::CurrentTime {
                time: epoch_secs(c.int()?)?,
            },
            tags::ERROR => Event::ErrorMessage {
                id: c.int()?,
                code: c.int()?,
                message: c.str()?,
            },
            tags::MANAGED_ACCOUNTS => Event::ManagedAccounts { accounts: c.str()? },

            tags::TICK_PRICE => Event::TickPrice {
                request_id: c.int()?,
                tick_type: c.int()?,
                price: c.float()?,
                can_auto_execute: c.boolean()?,
            },
            tags::TICK_SIZE => Event::TickSize {
                request_id: c.int()?,
                tick_type: c.int()?,
                size: c.decimal()?,
            },
            tags::TICK_STRING => Event::TickString {
                request_id: c.int()?,
                tick_type: c.int()?,
                value: c.str()?,
            },
            tags::TICK_GENERIC => Event::TickGeneric {
                request_id: c.int()?,
                tick_type: c.int()?,
                value: c.float()?,
            },
            tags::TICK_EFP => Event::TickEfp {
                request_id: c.int()?,
                tick_type: c.int()?,
                basis_points: c.float()?,
                formatted_basis_points: c.str()?,
                implied_futures_price: c.float()?,
                hold_days: c.int()?,
                future_last_trade_date: c.str()?,
                dividend_impact: c.float()?,
                dividends_to_last_trade: c.float()?,
            },
            tags::TICK_OPTION_COMPUTATION => Event::TickOptionComputation {
                request_id: c.int()?,
                tick_type: c.int()?,
                implied_volatility: c.float()?,
                delta: c.float()?,
                option_price: c.float()?,
                pv_dividend: c.float()?,
                gamma: c.float()?,
                vega: c.float()?,
                theta: c.float()?,
                underlying_price: c.float()?,
            },
            tags::TICK_NEWS => Event::TickNews {
                request_id: c.int()?,
                time: epoch_secs(c.int()?)?,
                provider_code: c.str()?,
                article_id: c.str()?,
                headline: c.str()?,
                extra_data: c.str()?,
            },
            tags::TICK_SNAPSHOT_END => Event::TickSnapshotEnd { request_id: c.int()? },
            tags::MARKET_DATA_TYPE => Event::MarketDataType {
                request_id: c.int()?,
                data_type: c.int()?,
            },
            tags::TICK_REQUEST_PARAMS => Event::TickRequestParams {
                request_id: c.int()?,
                min_tick: c.float()?,
                bbo_exchange: c.str()?,
                snapshot_permissions: c.int()?,
            },

            tags::TICK_BY_TICK_LAST => Event::TickByTickLast {
                request_id: c.int()?,
                time: epoch_secs(c.int()?)?,
                price: c.float()?,
                size: c.decimal()?,
                exchange: c.str()?,
            },
            tags::TICK_BY_TICK_BID_ASK => Event::TickByTickBidAsk {
                request_id: c.int()?,
                time: epoch_secs(c.int()?)?,
                bid_price: c.float()?,
                ask_price: c.float()?,
                bid_size: c.decimal()?,
                ask_size: c.decimal()?,
            },
            tags::TICK_BY_TICK_MIDPOINT => Event::TickByTickMidpoint {
                request_id: c.int()?,
                time: epoch_secs(c.int()?)?,
                midpoint: c.float()?,
            },

            tags::MARKET_DEPTH_UPDATE => Event::MarketDepthUpdate {
                request_id: c.int()?,
                position: c.int()?,
                operation: DepthOperation::from_i64(c.int()?)?,
                side: DepthSide::from_i64(c.int()?)?,
                price: c.float()?,
                size: c.decimal()?,
            },
            tags::MARKET_DEPTH_L2_UPDATE => Event::MarketDepthL2Update {
                request_id: c.int()?,
                position: c.int()?,
                market_maker: c.str()?,
                operation: DepthOperation::from_i64(c.int()?)?,
                side: DepthSide::from_i64(c.int()?)?,
                price: c.float()?,
                size: c.decimal()?,
                smart_depth: c.boolean()?,
            },
            tags::MARKET_DEPTH_END => Event::MarketDepthEnd { request_id: c.int()? },
            tags::MARKET_DEPTH_EXCHANGES => {
                let count = read_count(&mut c)?;
                let mut exchanges = Vec::with_capacity(count);
                for _ in 0..count {
                    exchanges.push(DepthExchange {
                        exchange: c.str()?,
                        security_type: c.str()?,
                        listing_exchange: c.str()?,
                    });
                }
                Event::MarketDepthExchanges { exchanges }
            }

            tags::OPEN_ORDER => Event::OpenOrder {
                order_id: c.int()?,
                contract: read_contract(&mut c)?,
                action: c.str()?,
                quantity: c.decimal()?,
                order_type: c.str()?,
                limit_price: c.float()?,
                status: c.str()?,
            },
            tags::OPEN_ORDER_END => Event::OpenOrderEnd,
            tags::ORDER_STATUS => Event::OrderStatus {
                order_id: c.int()?,
                status: c.str()?,
                filled: c.decimal()?,
                remaining: c.decimal()?,
                avg_fill_price: c.float()?,
                last_fill_price: c.float()?,
                why_held: c.str()?,
            },
            tags::ORDER_BOUND => Event::OrderBound {
                order_id: c.int()?,
                api_client_id: c.int()?,
                api_order_id: c.int()?,
            },
            tags::COMPLETED_ORDER => Event::CompletedOrder {
                contract: read_contract(&mut c)?,
                action: c.str()?,
                quantity: c.decimal()?,
                status: c.str()?,
            },
            tags::COMPLETED_ORDERS_END => Event::CompletedOrdersEnd,
            tags::COMMISSION_REPORT => Event::CommissionReport {
                execution_id: c.str()?,
                commission: c.float()?,
                currency: c.str()?,
                realized_pnl: c.float()?,
            },
            tags::EXECUTION_DETAILS => Event::ExecutionDetails {
                request_id: c.int()?,
                order_id: c.int()?,
                execution_id: c.str()?,
                time: c.str()?,
                side: c.str()?,
                shares: c.decimal()?,
                price: c.float()?,
                exchange: c.str()?,
            },
            tags::EXECUTION_DETAILS_END => Event::ExecutionDetailsEnd { request_id: c.int()? },

            tags::ACCOUNT_VALUE => Event::AccountValue {
                key: c.str()?,
                value: c.str()?,
                currency: c.str()?,
                account: c.str()?,
            },
            tags::PORTFOLIO_UPDATE => Event::PortfolioUpdate {
                contract: read_contract(&mut c)?,
                position: c.decimal()?,
                market_price: c.float()?,
                market_value: c.float()?,
                average_cost: c.float()?,
                unrealized_pnl: c.float()?,
                realized_pnl: c.float()?,
                account: c.str()?,
            },
            tags::ACCOUNT_UPDATE_TIME => Event::AccountUpdateTime { time: c.str()? },
            tags::ACCOUNT_DOWNLOAD_END => Event::AccountDownloadEnd { account: c.str()? },
            tags::ACCOUNT_SUMMARY => Event::AccountSummary {
                request_id: c.int()?,
                account: c.str()?,
                summary_tag: c.str()?,
                value: c.str()?,
                currency: c.str()?,
            },
            tags::ACCOUNT_SUMMARY_END => Event::AccountSummaryEnd { request_id: c.int()? },
            tags::ACCOUNT_UPDATE_MULTI => Event::AccountUpdateMulti {
                request_id: c.int()?,
                account: c.str()?,
                model_code: c.str()?,
                key: c.str()?,
                value: c.str()?,
                currency: c.str()?,
            },
            tags::ACCOUNT_UPDATE_MULTI_END => {
                Event::AccountUpdateMultiEnd { request_id: c.int()? }
            }
            tags::POSITION => Event::Position {
                request_id: c.int()?,
                account: c.str()?,
                contract: read_contract(&mut c)?,
                position: c.decimal()?,
                average_cost: c.float()?,
            },
            tags::POSITION_END => Event::PositionEnd { request_id: c.int()? },
            tags::POSITION_MULTI => Event::PositionMulti {
                request_id: c.int()?,
                account: c.str()?,
                model_code: c.str()?,
                contract: read_contract(&mut c)?,
                position: c.decimal()?,
                average_cost: c.float()?,
            },
            tags::POSITION_MULTI_END => Event::PositionMultiEnd { request_id: c.int()? },
            tags::PNL => Event::Pnl {
                request_id: c.int()?,
                daily_pnl: c.float()?,
                unrealized_pnl: c.float()?,
                realized_pnl: c.float()?,
            },
            tags::PNL_SINGLE => Event::PnlSingle {
                request_id: c.int()?,
                position: c.decimal()?,
                daily_pnl: c.float()?,
                unrealized_pnl: c.float()?,
                realized_pnl: c.float()?,
                value: c.float()?,
            },
            tags::FAMILY_CODES => {
                let count = read_count(&mut c)?;
                let mut family_codes = Vec::with_capacity(count);
                for _ in 0..count {
                    family_codes.push(FamilyCode {
                        account_id: c.str()?,
                        family_code: c.str()?,
                    });
                }
                Event::FamilyCodes { family_codes }
            }
            tags::USER_INFO => Event::UserInfo {
                white_branding_id: c.str()?,
            },

            tags::CONTRACT_DETAILS => Event::ContractDetails {
                request_id: c.int()?,
                contract: read_contract(&mut c)?,
                long_name: c.str()?,
                category: c.str()?,
                contract_id: c.int()?,
            },
            tags::BOND_CONTRACT_DETAILS => Event::BondContractDetails {
                request_id: c.int()?,
                contract: read_contract(&mut c)?,
                coupon: c.float()?,
                maturity: c.str()?,
            },
            tags::CONTRACT_DETAILS_END => Event::ContractDetailsEnd { request_id: c.int()? },
            tags::SYMBOL_SAMPLES => {
                let request_id = c.int()?;
                let count = read_count(&mut c)?;
                let mut samples = Vec::with_capacity(count);
                for _ in 0..count {
                    samples.push(read_contract(&mut c)?);
                }
                Event::SymbolSamples {
                    request_id,
                    samples,
                }
            }
            tags::SMART_COMPONENTS => {
                let request_id = c.int()?;
                let count = read_count(&mut c)?;
                let mut components = Vec::with_capacity(count);
                for _ in 0..count {
                    components.push(SmartComponent {
                        bit_number: c.int()?,
                        exchange: c.str()?,
                        exchange_letter: c.str()?,
                    });
                }
                Event::SmartComponents {
                    request_id,
                    components,
                }
            }
            tags::MARKET_RULE => {
                let market_rule_id = c.int()?;
                let count = read_count(&mut c)?;
                let mut price_increments = Vec::with_capacity(count);
                for _ in 0..count {
                    price_increments.push(PriceIncrement {
                        low_edge: c.float()?,
                        increment: c.float()?,
                    });
                }
                Event::MarketRule {
                    market_rule_id,
                    price_increments,
                }
            }
            tags::SOFT_DOLLAR_TIERS => {
                let request_id = c.int()?;
                let count = read_count(&mut c)?;
                let mut tiers = Vec::with_capacity(count);
                for _ in 0..count {
                    tiers.push(SoftDollarTier {
                        name: c.str()?,
                        value: c.str()?,
                        display_name: c.str()?,
                    });
                }
                Event::SoftDollarTiers { request_id, tiers }
            }
            tags::OPTION_CHAIN_PARAMETER => {
                let request_id = c.int()?;
                let exchange = c.str()?;
                let underlying_contract_id = c.int()?;
                let trading_class = c.str()?;
                let multiplier = c.str()?;
                let expiration_count = read_count(&mut c)?;
                let mut expirations = Vec::with_capacity(expiration_count);
                for _ in 0..expiration_count {
                    expirations.push(c.str()?);
                }
                let strike_count = read_count(&mut c)?;
                let mut strikes = Vec::with_capacity(strike_count);
                for _ in 0..strike_count {
                    strikes.push(c.float()?);
                }
                Event::OptionChainParameter {
                    request_id,
                    exchange,
                    underlying_contract_id,
                    trading_class,
                    multiplier,
                    expirations,
                    strikes,
                }
            }
            tags::OPTION_CHAIN_PARAMETER_END => {
                Event::OptionChainParameterEnd { request_id: c.int()? }
            }
            tags::DELTA_NEUTRAL_VALIDATION => Event::DeltaNeutralValidation {
                request_id: c.int()?,
                contract_id: c.int()?,
                delta: c.float()?,
                price: c.float()?,
            },

            tags::HISTORICAL_BAR => Event::HistoricalBar {
                request_id: c.int()?,
                bar: read_bar(&mut c)?,
            },
            tags::HISTORICAL_BARS_END => Event::HistoricalBarsEnd {
                request_id: c.int()?,
                start: c.str()?,
                end: c.str()?,
            },
            tags::HISTORICAL_BAR_UPDATE => Event::HistoricalBarUpdate {
                request_id: c.int()?,
                bar: read_bar(&mut c)?,
            },
            tags::HEAD_TIMESTAMP => Event::HeadTimestamp {
                request_id: c.int()?,
                timestamp: c.str()?,
            },
            tags::HISTOGRAM_DATA => {
                let request_id = c.int()?;
                let count = read_count(&mut c)?;
                let mut entries = Vec::with_capacity(count);
                for _ in 0..count {
                    entries.push(HistogramEntry {
                        price: c.float()?,
                        size: c.decimal()?,
                    });
                }
                Event::HistogramData {
                    request_id,
                    entries,
                }
            }
            tags::HISTORICAL_TICKS => {
                let request_id = c.int()?;
                let count = read_count(&mut c)?;
                let mut ticks = Vec::with_capacity(count);
                for _ in 0..count {
                    ticks.push(HistoricalTick {
                        time: epoch_secs(c.int()?)?,
                        price: c.float()?,
                        size: c.decimal()?,
                    });
                }
                let done = c.boolean()?;
                Event::HistoricalTicks {
                    request_id,
                    ticks,
                    done,
                }
            }
            tags::HISTORICAL_TICKS_BID_ASK => {
                let request_id = c.int()?;
                let count = read_count(&mut c)?;
                let mut ticks = Vec::with_capacity(count);
                for _ in 0..count {
                    ticks.push(HistoricalTickBidAsk {
                        time: epoch_secs(c.int()?)?,
                        bid_price: c.float()?,
                        ask_price: c.float()?,
                        bid_size: c.decimal()?,
                        ask_size: c.decimal()?,
                    });
                }
                let done = c.boolean()?;
                Event::HistoricalTicksBidAsk {
                    request_id,
                    ticks,
                    done,
                }
            }
            tags::HISTORICAL_TICKS_LAST => {
                let request_id = c.int()?;
                let count = read_count(&mut c)?;
                let mut ticks = Vec::with_capacity(count);
                for _ in 0..count {
                    ticks.push(HistoricalTickLast {
                        time: epoch_secs(c.int()?)?,
                        price: c.float()?,
                        size: c.decimal()?,
                        exchange: c.str()?,
                    });
                }
                let done = c.boolean()?;
                Event::HistoricalTicksLast {
                    request_id,
                    ticks,
                    done,
                }
            }
            tags::HISTORICAL_SCHEDULE => Event::HistoricalSchedule {
                request_id: c.int()?,
                start: c.str()?,
                end: c.str()?,
                time_zone: c.str()?,
            },
            tags::REAL_TIME_BAR => Event::RealTimeBar {
                request_id: c.int()?,
                bar: read_bar(&mut c)?,
            },

            tags::NEWS_BULLETIN => Event::NewsBulletin {
                message_id: c.int()?,
                message_type: c.int()?,
                message: c.str()?,
                origin_exchange: c.str()?,
            },
            tags::NEWS_PROVIDERS => {
                let count = read_count(&mut c)?;
                let mut providers = Vec::with_capacity(count);
                for _ in 0..count {
                    providers.push(NewsProvider {
                        code: c.str()?,
                        name: c.str()?,
                    });
                }
                Event::NewsProviders { providers }
            }
            tags::NEWS_ARTICLE => Event::NewsArticle {
                request_id: c.int()?,
                article_type: c.int()?,
                article_text: c.str()?,
            },
            tags::HISTORICAL_NEWS => Event::HistoricalNews {
                request_id: c.int()?,
                time: c.str()?,
                provider_code: c.str()?,
                article_id: c.str()?,
                headline: c.str()?,
            },
            tags::HISTORICAL_NEWS_END => Event::HistoricalNewsEnd {
                request_id: c.int()?,
                has_more: c.boolean()?,
            },

            tags::SCANNER_PARAMETERS => Event::ScannerParameters { xml: c.str()? },
            tags::SCANNER_DATA => Event::ScannerData {
                request_id: c.int()?,
                rank: c.int()?,
                contract: read_contract(&mut c)?,
                distance: c.str()?,
                benchmark: c.str()?,
                projection: c.str()?,
            },
            tags::SCANNER_DATA_END => Event::ScannerDataEnd { request_id: c.int()? },

            tags::FUNDAMENTAL_DATA => Event::FundamentalData {
                request_id: c.int()?,
                data: c.str()?,
            },

            tags::DISPLAY_GROUP_LIST => Event::DisplayGroupList {
                request_id: c.int()?,
                groups: c.str()?,
            },
            tags::DISPLAY_GROUP_UPDATED => Event::DisplayGroupUpdated {
                request_id: c.int()?,
                contract_info: c.str()?,
            },

            tags::WSH_META_DATA => Event::WshMetaData {
                request_id: c.int()?,
                data: c.str()?,
            },
            tags::WSH_EVENT_DATA => Event::WshEventData {
                request_id: c.int()?,
                data: c.str()?,
            },

            _ => return Ok(None),
        };
        Ok(Some(event))
    }

    pub(crate) fn correlation(&self) -> Correlation {
        use Correlation::*;
        match self {
            // streaming data and sentinels for families the client issues
            Event::TickPrice { request_id, .. }
            | Event::TickSize { request_id, .. }
            | Event::TickString { request_id, .. }
            | Event::TickGeneric { request_id, .. }
            | Event::TickEfp { request_id, .. }
            | Event::TickOptionComputation { request_id, .. }
            | Event::TickNews { request_id, .. }
            | Event::MarketDataType { request_id, .. }
            | Event::TickRequestParams { request_id, .. }
            | Event::MarketDepthUpdate { request_id, .. }
            | Event::MarketDepthL2Update { request_id, .. }
            | Event::HistoricalBar { request_id, .. }
            | Event::HistoricalBarUpdate { request_id, .. }
            | Event::RealTimeBar { request_id, .. }
            | Event::AccountSummary { request_id, .. }
            | Event::Position { request_id, .. }
            | Event::ContractDetails { request_id, .. }
            | Event::BondContractDetails { request_id, .. }
            | Event::ScannerData { request_id, .. } => Tracked {
                request_id: *request_id,
                terminal: false,
            },
            Event::TickSnapshotEnd { request_id }
            | Event::MarketDepthEnd { request_id }
            | Event::HistoricalBarsEnd { request_id, .. }
            | Event::AccountSummaryEnd { request_id }
            | Event::PositionEnd { request_id }
            | Event::ContractDetailsEnd { request_id }
            | Event::SymbolSamples { request_id, .. }
            | Event::ScannerDataEnd { request_id } => Tracked {
                request_id: *request_id,
                terminal: true,
            },

            Event::OpenOrder { order_id, .. }
            | Event::OrderStatus { order_id, .. }
            | Event::OrderBound { order_id, .. } => Order {
                order_id: *order_id,
            },

            Event::ConnectAck { .. }
            | Event::NextValidOrderId { .. }
            | Event::CurrentTime { .. }
            | Event::ErrorMessage { .. }
            | Event::ManagedAccounts { .. }
            | Event::ConnectionClosed { .. } => Session,

            _ => Informational,
        }
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;
    use crate::codec::FieldValue;

    #[test]
    fn test_unknown_tag_maps_to_none() {
        let frame = Frame::new(9999, vec![FieldValue::Int(1)]);
        assert_eq!(Event::from_frame(&frame).unwrap(), None);
    }

    #[test]
    fn test_current_time_decodes_epoch() {
        let frame = Frame::new(tags::CURRENT_TIME, vec![FieldValue::Int(1_700_000_000)]);
        match Event::from_frame(&frame).unwrap().unwrap() {
            Event::CurrentTime { time } => assert_eq!(time.timestamp(), 1_700_000_000),
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[test]
    fn test_depth_update_decodes_typed_enums() {
        let frame = Frame::new(
            tags::MARKET_DEPTH_UPDATE,
            vec![
                FieldValue::Int(7),
                FieldValue::Int(0),
                FieldValue::Int(1),
                FieldValue::Int(1),
                FieldValue::Float(99.5),
                FieldValue::Decimal(dec!(400)),
            ],
        );
        match Event::from_frame(&frame).unwrap().unwrap() {
            Event::MarketDepthUpdate {
                request_id,
                operation,
                side,
                size,
                ..
            } => {
                assert_eq!(request_id, 7);
                assert_eq!(operation, DepthOperation::Update);
                assert_eq!(side, DepthSide::Bid);
                assert_eq!(size, dec!(400));
            }
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[test]
    fn test_field_shape_mismatch_is_malformed() {
        // tick size with a float where the decimal size belongs
        let frame = Frame::new(
            tags::TICK_SIZE,
            vec![
                FieldValue::Int(1),
                FieldValue::Int(0),
                FieldValue::Float(100.0),
            ],
        );
        assert!(matches!(
            Event::from_frame(&frame),
            Err(AppError::MalformedProtocol(_))
        ));
    }

    #[test]
    fn test_symbol_samples_reads_repeated_groups() {
        let frame = Frame::new(
            tags::SYMBOL_SAMPLES,
            vec![
                FieldValue::Int(11),
                FieldValue::Int(2),
                FieldValue::Str("IBM".into()),
                FieldValue::Str("STK".into()),
                FieldValue::Str("SMART".into()),
                FieldValue::Str("USD".into()),
                FieldValue::Str("IBKR".into()),
                FieldValue::Str("STK".into()),
                FieldValue::Str("SMART".into()),
                FieldValue::Str("USD".into()),
            ],
        );
        match Event::from_frame(&frame).unwrap().unwrap() {
            Event::SymbolSamples {
                request_id,
                samples,
            } => {
                assert_eq!(request_id, 11);
                assert_eq!(samples.len(), 2);
                assert_eq!(samples[0].symbol, "IBM");
                assert_eq!(samples[1].symbol, "IBKR");
            }
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[test]
    fn test_negative_list_length_is_malformed() {
        let frame = Frame::new(
            tags::NEWS_PROVIDERS,
            vec![FieldValue::Int(-3)],
        );
        assert!(matches!(
            Event::from_frame(&frame),
            Err(AppError::MalformedProtocol(_))
        ));
    }

    #[test]
    fn test_correlation_classification() {
        let data = Event::TickPrice {
            request_id: 5,
            tick_type: 2,
            price: 10.0,
            can_auto_execute: false,
        };
        assert_eq!(
            data.correlation(),
            Correlation::Tracked {
                request_id: 5,
                terminal: false
            }
        );

        let sentinel = Event::MarketDepthEnd { request_id: 5 };
        assert_eq!(
            sentinel.correlation(),
            Correlation::Tracked {
                request_id: 5,
                terminal: true
            }
        );

        let pnl = Event::Pnl {
            request_id: 5,
            daily_pnl: 0.0,
            unrealized_pnl: 0.0,
            realized_pnl: 0.0,
        };
        assert_eq!(pnl.correlation(), Correlation::Informational);

        let time = Event::CurrentTime {
            time: epoch_secs(0).unwrap(),
        };
        assert_eq!(time.correlation(), Correlation::Session);
    }
}
