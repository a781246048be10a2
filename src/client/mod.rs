//! Session core: the client state machine, the reader task feeding the
//! inbound queue, the wakeup signal between them, and the correlator
//! that tracks in-flight requests.

pub use correlator::{CompletionHandle, RequestCorrelator, RequestOutcome};
pub use session::{GatewayClient, SessionState};
pub use signal::{Signal, WaitResult};

pub(crate) use reader::{Connection, InboundItem, InboundQueue, ReaderLoop};

mod correlator;
mod reader;
mod session;
mod signal;
