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

use std::sync::Arc;

use tracing::{error, warn};

use crate::client::{RequestCorrelator, RequestOutcome};
use crate::codec::Frame;
use crate::events::event::{Correlation, Event};
use crate::events::EventHandler;

/// Routes decoded frames to the handler and keeps the correlator in sync.
///
/// Dispatch rules, in order:
/// - unknown tags and undecodable bodies are logged and skipped;
/// - events correlated to a request id the client is no longer tracking
///   are dropped (late frames after a cancel or sentinel);
/// - end sentinels terminate their pending entry after the handler has
///   seen them;
/// - a correlated error frame terminates the matching request or order
///   with `Failed`, and is always delivered either way;
/// - the synthetic close marker is delivered at most once per session.
pub(crate) struct Dispatcher {
    handler: Box<dyn EventHandler>,
    correlator: Arc<RequestCorrelator>,
    closed_delivered: bool,
}

impl Dispatcher {
    pub(crate) fn new(handler: Box<dyn EventHandler>, correlator: Arc<RequestCorrelator>) -> Self {
        Dispatcher {
            handler,
            correlator,
            closed_delivered: false,
        }
    }

    pub(crate) fn dispatch_frame(&mut self, frame: &Frame) {
        match Event::from_frame(frame) {
            Ok(Some(event)) => self.deliver(event),
            Ok(None) => {
                warn!("skipping frame with unknown tag {}", frame.tag);
            }
            Err(e) => {
                error!("skipping undecodable frame with tag {}: {}", frame.tag, e);
            }
        }
    }

    /// Entry point for the synthetic close marker the reader enqueues.
    pub(crate) fn dispatch_closed(&mut self, reason: &str) {
        self.deliver(Event::ConnectionClosed {
            reason: reason.to_string(),
        });
    }

    fn deliver(&mut self, event: Event) {
        match event.correlation() {
            Correlation::Tracked {
                request_id,
                terminal,
            } => {
                if !self.correlator.is_pending(request_id) {
                    warn!(
                        "dropping event for retired request id {}: {:?}",
                        request_id, event
                    );
                    return;
                }
                self.call_handler(&event);
                if terminal {
                    self.correlator
                        .complete_request(request_id, RequestOutcome::Completed);
                }
            }
            Correlation::Order { order_id } => {
                self.call_handler(&event);
                if let Event::OrderStatus { status, .. } = &event {
                    if status == "Filled" || status == "Cancelled" {
                        self.correlator
                            .complete_order(order_id, RequestOutcome::Completed);
                    }
                }
            }
            Correlation::Session => {
                match &event {
                    Event::NextValidOrderId { order_id } => {
                        self.correlator.seed_order_ids(*order_id);
                    }
                    Event::ErrorMessage { id, code, message } => {
                        if *id >= 0 {
                            let outcome = RequestOutcome::Failed {
                                code: *code,
                                message: message.clone(),
                            };
                            if !self.correlator.complete_request(*id, outcome.clone()) {
                                self.correlator.complete_order(*id, outcome);
                            }
                        }
                    }
                    Event::ConnectionClosed { .. } => {
                        if self.closed_delivered {
                            return;
                        }
                        self.closed_delivered = true;
                    }
                    _ => {}
                }
                self.call_handler(&event);
            }
            Correlation::Informational => self.call_handler(&event),
        }
    }

    fn call_handler(&mut self, event: &Event) {
        let h = self.handler.as_mut();
        match event {
            Event::ConnectAck { server_version } => h.connect_ack(*server_version),
            Event::NextValidOrderId { order_id } => h.next_valid_order_id(*order_id),
            Event::CurrentTime { time } => h.current_time(*time),
            Event::ErrorMessage { id, code, message } => h.error_message(*id, *code, message),
            Event::ManagedAccounts { accounts } => h.managed_accounts(accounts),
            Event::ConnectionClosed { reason } => h.connection_closed(reason),

            Event::TickPrice {
                request_id,
                tick_type,
                price,
                can_auto_execute,
            } => h.tick_price(*request_id, *tick_type, *price, *can_auto_execute),
            Event::TickSize {
                request_id,
                tick_type,
                size,
            } => h.tick_size(*request_id, *tick_type, *size),
            Event::TickString {
                request_id,
                tick_type,
                value,
            } => h.tick_string(*request_id, *tick_type, value),
            Event::TickGeneric {
                request_id,
                tick_type,
                value,
            } => h.tick_generic(*request_id, *tick_type, *value),
            Event::TickEfp {
                request_id,
                tick_type,
                basis_points,
                formatted_basis_points,
                implied_futures_price,
                hold_days,
                future_last_trade_date,
                dividend_impact,
                dividends_to_last_trade,
            } => h.tick_efp(
                *request_id,
                *tick_type,
                *basis_points,
                formatted_basis_points,
                *implied_futures_price,
                *hold_days,
                future_last_trade_date,
                *dividend_impact,
                *dividends_to_last_trade,
            ),
            Event::TickOptionComputation {
                request_id,
                tick_type,
                implied_volatility,
                delta,
                option_price,
                pv_dividend,
                gamma,
                vega,
                theta,
                underlying_price,
            } => h.tick_option_computation(
                *request_id,
                *tick_type,
                *implied_volatility,
                *delta,
                *option_price,
                *pv_dividend,
                *gamma,
                *vega,
                *theta,
                *underlying_price,
            ),
            Event::TickNews {
                request_id,
                time,
                provider_code,
                article_id,
                headline,
                extra_data,
            } => h.tick_news(
                *request_id,
                *time,
                provider_code,
                article_id,
                headline,
                extra_data,
            ),
            Event::TickSnapshotEnd { request_id } => h.tick_snapshot_end(*request_id),
            Event::MarketDataType {
                request_id,
                data_type,
            } => h.market_data_type(*request_id, *data_type),
            Event::TickRequestParams {
                request_id,
                min_tick,
                bbo_exchange,
                snapshot_permissions,
            } => h.tick_request_params(*request_id, *min_tick, bbo_exchange, *snapshot_permissions),

            Event::TickByTickLast {
                request_id,
                time,
                price,
                size,
                exchange,
            } => h.tick_by_tick_last(*request_id, *time, *price, *size, exchange),
            Event::TickByTickBidAsk {
                request_id,
                time,
                bid_price,
                ask_price,
                bid_size,
                ask_size,
            } => h.tick_by_tick_bid_ask(
                *request_id,
                *time,
                *bid_price,
                *ask_price,
                *bid_size,
                *ask_size,
            ),
            Event::TickByTickMidpoint {
                request_id,
                time,
                midpoint,
            } => h.tick_by_tick_midpoint(*request_id, *time, *midpoint),

            Event::MarketDepthUpdate {
                request_id,
                position,
                operation,
                side,
                price,
                size,
            } => h.market_depth_update(*request_id, *position, *operation, *side, *price, *size),
            Event::MarketDepthL2Update {
                request_id,
                position,
                market_maker,
                operation,
                side,
                price,
                size,
                smart_depth,
            } => h.market_depth_l2_update(
                *request_id,
                *position,
                market_maker,
                *operation,
                *side,
                *price,
                *size,
                *smart_depth,
            ),
            Event::MarketDepthEnd { request_id } => h.market_depth_end(*request_id),
            Event::MarketDepthExchanges { exchanges } => h.market_depth_exchanges(exchanges),

            Event::OpenOrder {
                order_id,
                contract,
                action,
                quantity,
                order_type,
                limit_price,
                status,
            } => h.open_order(
                *order_id,
                contract,
                action,
                *quantity,
                order_type,
                *limit_price,
                status,
            ),
            Event::OpenOrderEnd => h.open_order_end(),
            Event::OrderStatus {
                order_id,
                status,
                filled,
                remaining,
                avg_fill_price,
                last_fill_price,
                why_held,
            } => h.order_status(
                *order_id,
                status,
                *filled,
                *remaining,
                *avg_fill_price,
                *last_fill_price,
                why_held,
            ),
            Event::OrderBound {
                order_id,
                api_client_id,
                api_order_id,
            } => h.order_bound(*order_id, *api_client_id, *api_order_id),
            Event::CompletedOrder {
                contract,
                action,
                quantity,
                status,
            } => h.completed_order(contract, action, *quantity, status),
            Event::CompletedOrdersEnd => h.completed_orders_end(),
            Event::CommissionReport {
                execution_id,
                commission,
                currency,
                realized_pnl,
            } => h.commission_report(execution_id, *commission, currency, *realized_pnl),
            Event::ExecutionDetails {
                request_id,
                order_id,
                execution_id,
                time,
                side,
                shares,
                price,
                exchange,
            } => h.execution_details(
                *request_id,
                *order_id,
                execution_id,
                time,
                side,
                *shares,
                *price,
                exchange,
            ),
            Event::ExecutionDetailsEnd { request_id } => h.execution_details_end(*request_id),

            Event::AccountValue {
                key,
                value,
                currency,
                account,
            } => h.account_value(key, value, currency, account),
            Event::PortfolioUpdate {
                contract,
                position,
                market_price,
                market_value,
                average_cost,
                unrealized_pnl,
                realized_pnl,
                account,
            } => h.portfolio_update(
                contract,
                *position,
                *market_price,
                *market_value,
                *average_cost,
                *unrealized_pnl,
                *realized_pnl,
                account,
            ),
            Event::AccountUpdateTime { time } => h.account_update_time(time),
            Event::AccountDownloadEnd { account } => h.account_download_end(account),
            Event::AccountSummary {
                request_id,
                account,
                summary_tag,
                value,
                currency,
            } => h.account_summary(*request_id, account, summary_tag, value, currency),
            Event::AccountSummaryEnd { request_id } => h.account_summary_end(*request_id),
            Event::AccountUpdateMulti {
                request_id,
                account,
                model_code,
                key,
                value,
                currency,
            } => h.account_update_multi(*request_id, account, model_code, key, value, currency),
            Event::AccountUpdateMultiEnd { request_id } => h.account_update_multi_end(*request_id),
            Event::Position {
                request_id,
                account,
                contract,
                position,
                average_cost,
            } => h.position(*request_id, account, contract, *position, *average_cost),
            Event::PositionEnd { request_id } => h.position_end(*request_id),
            Event::PositionMulti {
                request_id,
                account,
                model_code,
                contract,
                position,
                average_cost,
            } => h.position_multi(
                *request_id,
                account,
                model_code,
                contract,
                *position,
                *average_cost,
            ),
            Event::PositionMultiEnd { request_id } => h.position_multi_end(*request_id),
            Event::Pnl {
                request_id,
                daily_pnl,
                unrealized_pnl,
                realized_pnl,
            } => h.pnl(*request_id, *daily_pnl, *unrealized_pnl, *realized_pnl),
            Event::PnlSingle {
                request_id,
                position,
                daily_pnl,
                unrealized_pnl,
                realized_pnl,
                value,
            } => h.pnl_single(
                *request_id,
                *position,
                *daily_pnl,
                *unrealized_pnl,
                *realized_pnl,
                *value,
            ),
            Event::FamilyCodes { family_codes } => h.family_codes(family_codes),
            Event::UserInfo { white_branding_id } => h.user_info(white_branding_id),

            Event::ContractDetails {
                request_id,
                contract,
                long_name,
                category,
                contract_id,
            } => h.contract_details(*request_id, contract, long_name, category, *contract_id),
            Event::BondContractDetails {
                request_id,
                contract,
                coupon,
                maturity,
            } => h.bond_contract_details(*request_id, contract, *coupon, maturity),
            Event::ContractDetailsEnd { request_id } => h.contract_details_end(*request_id),
            Event::SymbolSamples {
                request_id,
                samples,
            } => h.symbol_samples(*request_id, samples),
            Event::SmartComponents {
                request_id,
                components,
            } => h.smart_components(*request_id, components),
            Event::MarketRule {
                market_rule_id,
                price_increments,
            } => h.market_rule(*market_rule_id, price_increments),
            Event::SoftDollarTiers { request_id, tiers } => {
                h.soft_dollar_tiers(*request_id, tiers)
            }
            Event::OptionChainParameter {
                request_id,
                exchange,
                underlying_contract_id,
                trading_class,
                multiplier,
                expirations,
                strikes,
            } => h.option_chain_parameter(
                *request_id,
                exchange,
                *underlying_contract_id,
                trading_class,
                multiplier,
                expirations,
                strikes,
            ),
            Event::OptionChainParameterEnd { request_id } => {
                h.option_chain_parameter_end(*request_id)
            }
            Event::DeltaNeutralValidation {
                request_id,
                contract_id,
                delta,
                price,
            } => h.delta_neutral_validation(*request_id, *contract_id, *delta, *price),

            Event::HistoricalBar { request_id, bar } => h.historical_bar(*request_id, bar),
            Event::HistoricalBarsEnd {
                request_id,
                start,
                end,
            } => h.historical_bars_end(*request_id, start, end),
            Event::HistoricalBarUpdate { request_id, bar } => {
                h.historical_bar_update(*request_id, bar)
            }
            Event::HeadTimestamp {
                request_id,
                timestamp,
            } => h.head_timestamp(*request_id, timestamp),
            Event::HistogramData {
                request_id,
                entries,
            } => h.histogram_data(*request_id, entries),
            Event::HistoricalTicks {
                request_id,
                ticks,
                done,
            } => h.historical_ticks(*request_id, ticks, *done),
            Event::HistoricalTicksBidAsk {
                request_id,
                ticks,
                done,
            } => h.historical_ticks_bid_ask(*request_id, ticks, *done),
            Event::HistoricalTicksLast {
                request_id,
                ticks,
                done,
            } => h.historical_ticks_last(*request_id, ticks, *done),
            Event::HistoricalSchedule {
                request_id,
                start,
                end,
                time_zone,
            } => h.historical_schedule(*request_id, start, end, time_zone),
            Event::RealTimeBar { request_id, bar } => h.real_time_bar(*request_id, bar),

            Event::NewsBulletin {
                message_id,
                message_type,
                message,
                origin_exchange,
            } => h.news_bulletin(*message_id, *message_type, message, origin_exchange),
            Event::NewsProviders { providers } => h.news_providers(providers),
            Event::NewsArticle {
                request_id,
                article_type,
                article_text,
            } => h.news_article(*request_id, *article_type, article_text),
            Event::HistoricalNews {
                request_id,
                time,
                provider_code,
                article_id,
                headline,
            } => h.historical_news(*request_id, time, provider_code, article_id, headline),
            Event::HistoricalNewsEnd {
                request_id,
                has_more,
            } => h.historical_news_end(*request_id, *has_more),

            Event::ScannerParameters { xml } => h.scanner_parameters(xml),
            Event::ScannerData {
                request_id,
                rank,
                contract,
                distance,
                benchmark,
                projection,
            } => h.scanner_data(*request_id, *rank, contract, distance, benchmark, projection),
            Event::ScannerDataEnd { request_id } => h.scanner_data_end(*request_id),

            Event::FundamentalData { request_id, data } => h.fundamental_data(*request_id, data),

            Event::DisplayGroupList { request_id, groups } => {
                h.display_group_list(*request_id, groups)
            }
            Event::DisplayGroupUpdated {
                request_id,
                contract_info,
            } => h.display_group_updated(*request_id, contract_info),

            Event::WshMetaData { request_id, data } => h.wsh_meta_data(*request_id, data),
            Event::WshEventData { request_id, data } => h.wsh_event_data(*request_id, data),
        }
    }
}
