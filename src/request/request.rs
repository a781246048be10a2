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

use crate::codec::{FieldValue, Frame};
use crate::request::{Contract, Order};

/// Outbound frame tags. Inbound tags live in `events::tags`; the two
/// namespaces never overlap.
pub mod tags {
    pub const CLIENT_HELLO: u16 = 100;
    pub const CURRENT_TIME: u16 = 101;
    pub const MARKET_DATA: u16 = 102;
    pub const CANCEL_MARKET_DATA: u16 = 103;
    pub const MARKET_DEPTH: u16 = 104;
    pub const CANCEL_MARKET_DEPTH: u16 = 105;
    pub const HISTORICAL_BARS: u16 = 106;
    pub const CANCEL_HISTORICAL_BARS: u16 = 107;
    pub const REAL_TIME_BARS: u16 = 108;
    pub const CANCEL_REAL_TIME_BARS: u16 = 109;
    pub const ACCOUNT_SUMMARY: u16 = 110;
    pub const CANCEL_ACCOUNT_SUMMARY: u16 = 111;
    pub const POSITIONS: u16 = 112;
    pub const CANCEL_POSITIONS: u16 = 113;
    pub const CONTRACT_DETAILS: u16 = 114;
    pub const MATCHING_SYMBOLS: u16 = 115;
    pub const SCANNER_SUBSCRIPTION: u16 = 116;
    pub const CANCEL_SCANNER_SUBSCRIPTION: u16 = 117;
    pub const PLACE_ORDER: u16 = 118;
    pub const CANCEL_ORDER: u16 = 119;
}

/// The family an in-flight request belongs to. Stored in the correlator
/// so completions and diagnostics can name what they are terminating.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestKind {
    MarketData,
    MarketDepth,
    HistoricalBars,
    RealTimeBars,
    AccountSummary,
    Positions,
    ContractDetails,
    MatchingSymbols,
    ScannerSubscription,
    PlaceOrder,
}

impl RequestKind {
    /// Streams with no end-sentinel terminate only through cancellation,
    /// a correlated error, or session teardown. Callers awaiting such a
    /// request's completion handle must be prepared to wait indefinitely.
    pub fn is_cancel_only(&self) -> bool {
        matches!(self, RequestKind::RealTimeBars)
    }
}

/// One outbound request message. `into_frame` is the single place that
/// knows each request's field order on the wire.
#[derive(Debug, Clone, PartialEq)]
pub enum Request {
    ClientHello {
        client_id: i32,
        min_version: i32,
        max_version: i32,
    },
    CurrentTime,
    MarketData {
        request_id: i64,
        contract: Contract,
        snapshot: bool,
    },
    CancelMarketData {
        request_id: i64,
    },
    MarketDepth {
        request_id: i64,
        contract: Contract,
        num_rows: i64,
    },
    CancelMarketDepth {
        request_id: i64,
    },
    HistoricalBars {
        request_id: i64,
        contract: Contract,
        end_time: String,
        duration: String,
        bar_size: String,
        what_to_show: String,
        use_rth: bool,
    },
    CancelHistoricalBars {
        request_id: i64,
    },
    RealTimeBars {
        request_id: i64,
        contract: Contract,
        bar_seconds: i64,
        what_to_show: String,
    },
    CancelRealTimeBars {
        request_id: i64,
    },
    AccountSummary {
        request_id: i64,
        group: String,
        summary_tags: String,
    },
    CancelAccountSummary {
        request_id: i64,
    },
    Positions {
        request_id: i64,
    },
    CancelPositions {
        request_id: i64,
    },
    ContractDetails {
        request_id: i64,
        contract: Contract,
    },
    MatchingSymbols {
        request_id: i64,
        pattern: String,
    },
    ScannerSubscription {
        request_id: i64,
        instrument: String,
        location_code: String,
        scan_code: String,
    },
    CancelScannerSubscription {
        request_id: i64,
    },
    PlaceOrder {
        order_id: i64,
        contract: Contract,
        order: Order,
    },
    CancelOrder {
        order_id: i64,
    },
}

fn push_contract(fields: &mut Vec<FieldValue>, contract: &Contract) {
    fields.push(contract.symbol.as_str().into());
    fields.push(contract.security_type.as_str().into());
    fields.push(contract.exchange.as_str().into());
    fields.push(contract.currency.as_str().into());
}

impl Request {
    pub fn into_frame(self) -> Frame {
        let mut fields: Vec<FieldValue> = Vec::new();
        let tag = match self {
            Request::ClientHello {
                client_id,
                min_version,
                max_version,
            } => {
                fields.push((client_id as i64).into());
                fields.push((min_version as i64).into());
                fields.push((max_version as i64).into());
                tags::CLIENT_HELLO
            }
            Request::CurrentTime => tags::CURRENT_TIME,
            Request::MarketData {
                request_id,
                contract,
                snapshot,
            } => {
                fields.push(request_id.into());
                push_contract(&mut fields, &contract);
                fields.push(snapshot.into());
                tags::MARKET_DATA
            }
            Request::CancelMarketData { request_id } => {
                fields.push(request_id.into());
                tags::CANCEL_MARKET_DATA
            }
            Request::MarketDepth {
                request_id,
                contract,
                num_rows,
            } => {
                fields.push(request_id.into());
                push_contract(&mut fields, &contract);
                fields.push(num_rows.into());
                tags::MARKET_DEPTH
            }
            Request::CancelMarketDepth { request_id } => {
                fields.push(request_id.into());
                tags::CANCEL_MARKET_DEPTH
            }
            Request::HistoricalBars {
                request_id,
                contract,
                end_time,
                duration,
                bar_size,
                what_to_show,
                use_rth,
            } => {
                fields.push(request_id.into());
                push_contract(&mut fields, &contract);
                fields.push(end_time.into());
                fields.push(duration.into());
                fields.push(bar_size.into());
                fields.push(what_to_show.into());
                fields.push(use_rth.into());
                tags::HISTORICAL_BARS
            }
            Request::CancelHistoricalBars { request_id } => {
                fields.push(request_id.into());
                tags::CANCEL_HISTORICAL_BARS
            }
            Request::RealTimeBars {
                request_id,
                contract,
                bar_seconds,
                what_to_show,
            } => {
                fields.push(request_id.into());
                push_contract(&mut fields, &contract);
                fields.push(bar_seconds.into());
                fields.push(what_to_show.into());
                tags::REAL_TIME_BARS
            }
            Request::CancelRealTimeBars { request_id } => {
                fields.push(request_id.into());
                tags::CANCEL_REAL_TIME_BARS
            }
            Request::AccountSummary {
                request_id,
                group,
                summary_tags,
            } => {
                fields.push(request_id.into());
                fields.push(group.into());
                fields.push(summary_tags.into());
                tags::ACCOUNT_SUMMARY
            }
            Request::CancelAccountSummary { request_id } => {
                fields.push(request_id.into());
                tags::CANCEL_ACCOUNT_SUMMARY
            }
            Request::Positions { request_id } => {
                fields.push(request_id.into());
                tags::POSITIONS
            }
            Request::CancelPositions { request_id } => {
                fields.push(request_id.into());
                tags::CANCEL_POSITIONS
            }
            Request::ContractDetails {
                request_id,
                contract,
            } => {
                fields.push(request_id.into());
                push_contract(&mut fields, &contract);
                tags::CONTRACT_DETAILS
            }
            Request::MatchingSymbols {
                request_id,
                pattern,
            } => {
                fields.push(request_id.into());
                fields.push(pattern.into());
                tags::MATCHING_SYMBOLS
            }
            Request::ScannerSubscription {
                request_id,
                instrument,
                location_code,
                scan_code,
            } => {
                fields.push(request_id.into());
                fields.push(instrument.into());
                fields.push(location_code.into());
                fields.push(scan_code.into());
                tags::SCANNER_SUBSCRIPTION
            }
            Request::CancelScannerSubscription { request_id } => {
                fields.push(request_id.into());
                tags::CANCEL_SCANNER_SUBSCRIPTION
            }
            Request::PlaceOrder {
                order_id,
                contract,
                order,
            } => {
                fields.push(order_id.into());
                push_contract(&mut fields, &contract);
                fields.push(order.action.as_str().into());
                fields.push(order.quantity.into());
                fields.push(order.kind.type_str().into());
                fields.push(order.kind.limit_price().into());
                fields.push(order.time_in_force.as_str().into());
                tags::PLACE_ORDER
            }
            Request::CancelOrder { order_id } => {
                fields.push(order_id.into());
                tags::CANCEL_ORDER
            }
        };
        Frame::new(tag, fields)
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;
    use crate::request::{OrderAction, OrderKind};

    #[test]
    fn test_market_depth_field_order() {
        let frame = Request::MarketDepth {
            request_id: 7,
            contract: Contract::stock("AAPL"),
            num_rows: 10,
        }
        .into_frame();
        assert_eq!(frame.tag, tags::MARKET_DEPTH);
        assert_eq!(frame.fields[0], FieldValue::Int(7));
        assert_eq!(frame.fields[1], FieldValue::Str("AAPL".into()));
        assert_eq!(frame.fields[5], FieldValue::Int(10));
    }

    #[test]
    fn test_place_order_carries_decimal_quantity() {
        let order = Order::limit(OrderAction::Buy, dec!(100.5), 31.25);
        assert_eq!(order.kind, OrderKind::Limit { limit_price: 31.25 });
        let frame = Request::PlaceOrder {
            order_id: 12,
            contract: Contract::stock("IBM"),
            order,
        }
        .into_frame();
        assert_eq!(frame.tag, tags::PLACE_ORDER);
        assert_eq!(frame.fields[6], FieldValue::Decimal(dec!(100.5)));
        assert_eq!(frame.fields[7], FieldValue::Str("LMT".into()));
        assert_eq!(frame.fields[8], FieldValue::Float(31.25));
    }

    #[test]
    fn test_requests_survive_codec_round_trip() {
        let frame = Request::HistoricalBars {
            request_id: 3,
            contract: Contract::stock("MSFT"),
            end_time: "20260828 16:00:00".into(),
            duration: "1 D".into(),
            bar_size: "5 mins".into(),
            what_to_show: "TRADES".into(),
            use_rth: true,
        }
        .into_frame();
        let mut encoded = frame.encode();
        let decoded = Frame::parse(&mut encoded, 1024 * 1024).unwrap().unwrap();
        assert_eq!(decoded, frame);
    }
}
