//! Outbound request surface: domain value types plus the request enum and
//! its frame encoding.

pub use request::{tags, Request, RequestKind};
pub use types::{
    Bar, Contract, DepthOperation, DepthSide, Order, OrderAction, OrderKind, TimeInForce,
};

pub(crate) use types::epoch_secs;

mod request;
mod types;
