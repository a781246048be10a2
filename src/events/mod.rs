//! Inbound surface: typed events decoded from frames, the handler trait
//! they are delivered through, and the dispatch glue between them.

pub use event::{
    DepthExchange, Event, FamilyCode, HistogramEntry, HistoricalTick, HistoricalTickBidAsk,
    HistoricalTickLast, NewsProvider, PriceIncrement, SmartComponent, SoftDollarTier,
};
pub use handler::{EventHandler, NoopHandler};

pub(crate) use dispatch::Dispatcher;

pub mod tags;

mod dispatch;
mod event;
mod handler;
