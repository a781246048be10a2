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

use crate::{AppError, AppResult};

/// Instrument description carried by market-data and order requests.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Contract {
    pub symbol: String,
    pub security_type: String,
    pub exchange: String,
    pub currency: String,
}

impl Contract {
    pub fn stock(symbol: &str) -> Contract {
        Contract {
            symbol: symbol.to_string(),
            security_type: "STK".to_string(),
            exchange: "SMART".to_string(),
            currency: "USD".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderAction {
    Buy,
    Sell,
}

impl OrderAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderAction::Buy => "BUY",
            OrderAction::Sell => "SELL",
        }
    }

    pub fn from_str(value: &str) -> AppResult<OrderAction> {
        match value {
            "BUY" => Ok(OrderAction::Buy),
            "SELL" => Ok(OrderAction::Sell),
            other => Err(AppError::InvalidValue(format!("order action: {}", other))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OrderKind {
    Market,
    Limit { limit_price: f64 },
}

impl OrderKind {
    pub fn type_str(&self) -> &'static str {
        match self {
            OrderKind::Market => "MKT",
            OrderKind::Limit { .. } => "LMT",
        }
    }

    pub fn limit_price(&self) -> f64 {
        match self {
            OrderKind::Market => 0.0,
            OrderKind::Limit { limit_price } => *limit_price,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimeInForce {
    #[default]
    Day,
    GoodTillCancel,
    ImmediateOrCancel,
}

impl TimeInForce {
    pub fn as_str(&self) -> &'static str {
        match self {
            TimeInForce::Day => "DAY",
            TimeInForce::GoodTillCancel => "GTC",
            TimeInForce::ImmediateOrCancel => "IOC",
        }
    }
}

/// Outbound order. Quantity is fixed-point so partial-fill arithmetic on
/// the caller's side stays exact.
#[derive(Debug, Clone, PartialEq)]
pub struct Order {
    pub action: OrderAction,
    pub quantity: Decimal,
    pub kind: OrderKind,
    pub time_in_force: TimeInForce,
}

impl Order {
    pub fn market(action: OrderAction, quantity: Decimal) -> Order {
        Order {
            action,
            quantity,
            kind: OrderKind::Market,
            time_in_force: TimeInForce::default(),
        }
    }

    pub fn limit(action: OrderAction, quantity: Decimal, limit_price: f64) -> Order {
        Order {
            action,
            quantity,
            kind: OrderKind::Limit { limit_price },
            time_in_force: TimeInForce::default(),
        }
    }
}

/// One historical or real-time bar.
#[derive(Debug, Clone, PartialEq)]
pub struct Bar {
    pub time: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: Decimal,
    pub weighted_avg: Decimal,
    pub count: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DepthOperation {
    Insert,
    Update,
    Delete,
}

impl DepthOperation {
    pub fn from_i64(value: i64) -> AppResult<DepthOperation> {
        match value {
            0 => Ok(DepthOperation::Insert),
            1 => Ok(DepthOperation::Update),
            2 => Ok(DepthOperation::Delete),
            other => Err(AppError::InvalidValue(format!(
                "depth operation: {}",
                other
            ))),
        }
    }

    pub fn as_i64(&self) -> i64 {
        match self {
            DepthOperation::Insert => 0,
            DepthOperation::Update => 1,
            DepthOperation::Delete => 2,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DepthSide {
    Ask,
    Bid,
}

impl DepthSide {
    pub fn from_i64(value: i64) -> AppResult<DepthSide> {
        match value {
            0 => Ok(DepthSide::Ask),
            1 => Ok(DepthSide::Bid),
            other => Err(AppError::InvalidValue(format!("depth side: {}", other))),
        }
    }

    pub fn as_i64(&self) -> i64 {
        match self {
            DepthSide::Ask => 0,
            DepthSide::Bid => 1,
        }
    }
}

/// Converts a wire epoch-seconds field into a timestamp, rejecting values
/// outside the representable range instead of panicking on them.
pub(crate) fn epoch_secs(value: i64) -> AppResult<DateTime<Utc>> {
    DateTime::<Utc>::from_timestamp(value, 0).ok_or_else(|| {
        AppError::MalformedProtocol(format!("epoch seconds out of range: {}", value))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_action_round_trip() {
        assert_eq!(
            OrderAction::from_str(OrderAction::Buy.as_str()).unwrap(),
            OrderAction::Buy
        );
        assert!(OrderAction::from_str("HOLD").is_err());
    }

    #[test]
    fn test_depth_enums_reject_unknown_codes() {
        assert!(DepthOperation::from_i64(3).is_err());
        assert!(DepthSide::from_i64(2).is_err());
        assert_eq!(
            DepthOperation::from_i64(DepthOperation::Delete.as_i64()).unwrap(),
            DepthOperation::Delete
        );
    }

    #[test]
    fn test_epoch_secs_rejects_out_of_range() {
        assert!(epoch_secs(i64::MAX).is_err());
        assert!(epoch_secs(1_700_000_000).is_ok());
    }
}
