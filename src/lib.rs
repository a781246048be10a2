mod client;
mod codec;
mod events;
mod request;
mod service;

pub use client::{
    CompletionHandle, GatewayClient, RequestCorrelator, RequestOutcome, SessionState, Signal,
    WaitResult,
};
pub use codec::{FieldCursor, FieldValue, Frame};
pub use events::tags as event_tags;
pub use events::{
    DepthExchange, Event, EventHandler, FamilyCode, HistogramEntry, HistoricalTick,
    HistoricalTickBidAsk, HistoricalTickLast, NewsProvider, NoopHandler, PriceIncrement,
    SmartComponent, SoftDollarTier,
};
pub use request::tags as request_tags;
pub use request::{
    Bar, Contract, DepthOperation, DepthSide, Order, OrderAction, OrderKind, Request, RequestKind,
    TimeInForce,
};
pub use service::GLOBAL_CONFIG;
pub use service::{
    global_config, setup_local_tracing, setup_tracing, AppError, AppResult, GatewayConfig, LogGuard,
    NetworkConfig, SessionConfig,
};
