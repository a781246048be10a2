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
use std::time::Duration;

use parking_lot::Mutex;
use tokio::io::{AsyncWriteExt, BufWriter};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::client::{
    CompletionHandle, Connection, InboundItem, InboundQueue, ReaderLoop, RequestCorrelator,
    RequestOutcome, Signal, WaitResult,
};
use crate::codec::Frame;
use crate::events::{Dispatcher, Event, EventHandler};
use crate::request::{Contract, Order, Request, RequestKind};
use crate::service::GatewayConfig;
use crate::{AppError, AppResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Disconnected,
    Connecting,
    Connected,
    Disconnecting,
}

/// One client session against a gateway.
///
/// A `GatewayClient` drives at most one connection over its lifetime;
/// once the session ends, for any reason, the client stays disconnected
/// and a new instance is needed to connect again.
///
/// Two tasks touch the socket: the spawned reader task owns the read
/// half, and callers write requests through the shared write half. All
/// handler callbacks fire from whichever task pumps `process_events` or
/// `run_until_closed`.
pub struct GatewayClient {
    config: GatewayConfig,
    state: Mutex<SessionState>,
    was_connected: Mutex<bool>,
    correlator: Arc<RequestCorrelator>,
    signal: Signal,
    queue: Arc<InboundQueue>,
    writer: tokio::sync::Mutex<Option<BufWriter<OwnedWriteHalf>>>,
    reader_handle: Mutex<Option<JoinHandle<()>>>,
    dispatcher: Mutex<Dispatcher>,
}

impl GatewayClient {
    pub fn new(config: GatewayConfig, handler: Box<dyn EventHandler>) -> GatewayClient {
        let correlator = Arc::new(RequestCorrelator::new());
        GatewayClient {
            config,
            state: Mutex::new(SessionState::Disconnected),
            was_connected: Mutex::new(false),
            dispatcher: Mutex::new(Dispatcher::new(handler, correlator.clone())),
            correlator,
            signal: Signal::new(),
            queue: Arc::new(InboundQueue::default()),
            writer: tokio::sync::Mutex::new(None),
            reader_handle: Mutex::new(None),
        }
    }

    pub fn state(&self) -> SessionState {
        *self.state.lock()
    }

    pub fn correlator(&self) -> &RequestCorrelator {
        &self.correlator
    }

    /// Connects and performs the handshake: send the client hello, wait
    /// for the gateway's acknowledgment, validate its protocol version,
    /// then start the reader task. Frames that arrive behind the
    /// acknowledgment (typically the order id announcement) are kept in
    /// the decode buffer and flow through normal dispatch.
    pub async fn connect(&self) -> AppResult<()> {
        {
            let mut state = self.state.lock();
            let mut used = self.was_connected.lock();
            if *state != SessionState::Disconnected || *used {
                return Err(AppError::IllegalStateError(format!(
                    "connect in state {:?}",
                    *state
                )));
            }
            *state = SessionState::Connecting;
            *used = true;
        }
        match self.connect_inner().await {
            Ok(()) => {
                *self.state.lock() = SessionState::Connected;
                Ok(())
            }
            Err(e) => {
                *self.state.lock() = SessionState::Disconnected;
                Err(e)
            }
        }
    }

    async fn connect_inner(&self) -> AppResult<()> {
        let network = &self.config.network;
        let session = &self.config.session;
        let timeout = Duration::from_millis(network.connect_timeout_ms);

        let address = format!("{}:{}", network.host, network.port);
        info!("connecting to gateway at {}", address);
        let stream = tokio::time::timeout(timeout, TcpStream::connect(&address))
            .await
            .map_err(|_| AppError::DetailedIoError(format!("connect timeout to {}", address)))??;
        let (read_half, write_half) = stream.into_split();
        let mut writer = BufWriter::new(write_half);
        let mut connection: Connection<OwnedReadHalf> = Connection::new(
            read_half,
            network.conn_read_buffer_size,
            network.max_frame_size,
        );

        let hello = Request::ClientHello {
            client_id: network.client_id,
            min_version: session.min_server_version,
            max_version: session.max_server_version,
        }
        .into_frame();
        writer.write_all(&hello.encode()).await?;
        writer.flush().await?;

        let ack = tokio::time::timeout(timeout, connection.read_frame())
            .await
            .map_err(|_| AppError::HandshakeFailed("timed out waiting for acknowledgment".into()))??
            .ok_or_else(|| {
                AppError::HandshakeFailed("connection closed during handshake".into())
            })?;
        let server_version = match Event::from_frame(&ack)? {
            Some(Event::ConnectAck { server_version }) => server_version,
            _ => {
                return Err(AppError::HandshakeFailed(format!(
                    "unexpected frame with tag {}",
                    ack.tag
                )))
            }
        };
        if server_version < session.min_server_version
            || server_version > session.max_server_version
        {
            return Err(AppError::UnsupportedVersion(server_version));
        }
        info!(
            "handshake complete, gateway protocol version {}",
            server_version
        );
        self.dispatcher.lock().dispatch_frame(&ack);

        *self.writer.lock().await = Some(writer);
        let reader = ReaderLoop::new(connection, self.queue.clone(), self.signal.clone());
        *self.reader_handle.lock() = Some(tokio::spawn(reader.run()));
        Ok(())
    }

    /// Idempotent. Closes the socket, stops the reader task and queues
    /// the close marker; the next pump delivers `connection_closed` and
    /// resolves whatever was still pending.
    pub async fn disconnect(&self) -> AppResult<()> {
        {
            let mut state = self.state.lock();
            match *state {
                SessionState::Connected | SessionState::Connecting => {
                    *state = SessionState::Disconnecting
                }
                SessionState::Disconnected | SessionState::Disconnecting => return Ok(()),
            }
        }
        info!("disconnecting from gateway");
        if let Some(mut writer) = self.writer.lock().await.take() {
            let _ = writer.shutdown().await;
        }
        let handle = self.reader_handle.lock().take();
        if let Some(handle) = handle {
            handle.abort();
            let _ = handle.await;
        }
        self.queue.push(InboundItem::Closed("disconnected by client".to_string()));
        self.signal.raise();
        self.finish_teardown();
        Ok(())
    }

    fn finish_teardown(&self) {
        self.correlator.abort_all();
        *self.state.lock() = SessionState::Disconnected;
    }

    /// Drains queued frames through the dispatcher, waiting up to
    /// `timeout` for the reader's wakeup when the queue is empty. Returns
    /// false when the wait timed out with nothing processed.
    pub async fn process_events(&self, timeout: Option<Duration>) -> bool {
        if self.drain() {
            return true;
        }
        if self.signal.wait(timeout).await == WaitResult::TimedOut {
            return false;
        }
        self.drain()
    }

    /// Pumps events until the session is torn down.
    pub async fn run_until_closed(&self) {
        while self.state() != SessionState::Disconnected {
            self.process_events(Some(Duration::from_millis(100))).await;
        }
        // a local disconnect flips the state before the close marker is
        // pumped; deliver whatever is still queued
        self.drain();
    }

    fn drain(&self) -> bool {
        let mut processed = false;
        while let Some(item) = self.queue.pop() {
            processed = true;
            match item {
                InboundItem::Frame(frame) => self.dispatcher.lock().dispatch_frame(&frame),
                InboundItem::Closed(cause) => {
                    self.finish_teardown();
                    self.dispatcher.lock().dispatch_closed(&cause);
                }
            }
        }
        processed
    }

    async fn send(&self, frame: Frame) -> AppResult<()> {
        if self.state() != SessionState::Connected {
            return Err(AppError::NotConnected);
        }
        let mut guard = self.writer.lock().await;
        let writer = guard.as_mut().ok_or(AppError::NotConnected)?;
        writer.write_all(&frame.encode()).await?;
        writer.flush().await?;
        Ok(())
    }

    async fn send_tracked(
        &self,
        kind: RequestKind,
        build: impl FnOnce(i64) -> Request,
    ) -> AppResult<(i64, CompletionHandle)> {
        let (request_id, handle) = self.correlator.begin_request(kind);
        match self.send(build(request_id).into_frame()).await {
            Ok(()) => Ok((request_id, handle)),
            Err(e) => {
                self.correlator
                    .complete_request(request_id, RequestOutcome::Aborted);
                Err(e)
            }
        }
    }

    /// Cancels a tracked request: resolve its handle locally, then tell
    /// the gateway to stop the stream. Canceling an id that is no longer
    /// pending is a no-op.
    async fn cancel_tracked(
        &self,
        request_id: i64,
        build: impl FnOnce(i64) -> Request,
    ) -> AppResult<()> {
        if !self
            .correlator
            .complete_request(request_id, RequestOutcome::Cancelled)
        {
            warn!("cancel for request id {} which is not pending", request_id);
            return Ok(());
        }
        self.send(build(request_id).into_frame()).await
    }

    /// Fire and forget; the reply carries no correlation id.
    pub async fn req_current_time(&self) -> AppResult<()> {
        self.send(Request::CurrentTime.into_frame()).await
    }

    pub async fn req_market_data(
        &self,
        contract: Contract,
        snapshot: bool,
    ) -> AppResult<(i64, CompletionHandle)> {
        self.send_tracked(RequestKind::MarketData, |request_id| Request::MarketData {
            request_id,
            contract,
            snapshot,
        })
        .await
    }

    pub async fn cancel_market_data(&self, request_id: i64) -> AppResult<()> {
        self.cancel_tracked(request_id, |request_id| Request::CancelMarketData {
            request_id,
        })
        .await
    }

    pub async fn req_market_depth(
        &self,
        contract: Contract,
        num_rows: i64,
    ) -> AppResult<(i64, CompletionHandle)> {
        self.send_tracked(RequestKind::MarketDepth, |request_id| {
            Request::MarketDepth {
                request_id,
                contract,
                num_rows,
            }
        })
        .await
    }

    pub async fn cancel_market_depth(&self, request_id: i64) -> AppResult<()> {
        self.cancel_tracked(request_id, |request_id| Request::CancelMarketDepth {
            request_id,
        })
        .await
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn req_historical_bars(
        &self,
        contract: Contract,
        end_time: String,
        duration: String,
        bar_size: String,
        what_to_show: String,
        use_rth: bool,
    ) -> AppResult<(i64, CompletionHandle)> {
        self.send_tracked(RequestKind::HistoricalBars, |request_id| {
            Request::HistoricalBars {
                request_id,
                contract,
                end_time,
                duration,
                bar_size,
                what_to_show,
                use_rth,
            }
        })
        .await
    }

    pub async fn cancel_historical_bars(&self, request_id: i64) -> AppResult<()> {
        self.cancel_tracked(request_id, |request_id| Request::CancelHistoricalBars {
            request_id,
        })
        .await
    }

    pub async fn req_real_time_bars(
        &self,
        contract: Contract,
        bar_seconds: i64,
        what_to_show: String,
    ) -> AppResult<(i64, CompletionHandle)> {
        self.send_tracked(RequestKind::RealTimeBars, |request_id| {
            Request::RealTimeBars {
                request_id,
                contract,
                bar_seconds,
                what_to_show,
            }
        })
        .await
    }

    pub async fn cancel_real_time_bars(&self, request_id: i64) -> AppResult<()> {
        self.cancel_tracked(request_id, |request_id| Request::CancelRealTimeBars {
            request_id,
        })
        .await
    }

    pub async fn req_account_summary(
        &self,
        group: String,
        summary_tags: String,
    ) -> AppResult<(i64, CompletionHandle)> {
        self.send_tracked(RequestKind::AccountSummary, |request_id| {
            Request::AccountSummary {
                request_id,
                group,
                summary_tags,
            }
        })
        .await
    }

    pub async fn cancel_account_summary(&self, request_id: i64) -> AppResult<()> {
        self.cancel_tracked(request_id, |request_id| Request::CancelAccountSummary {
            request_id,
        })
        .await
    }

    pub async fn req_positions(&self) -> AppResult<(i64, CompletionHandle)> {
        self.send_tracked(RequestKind::Positions, |request_id| Request::Positions {
            request_id,
        })
        .await
    }

    pub async fn cancel_positions(&self, request_id: i64) -> AppResult<()> {
        self.cancel_tracked(request_id, |request_id| Request::CancelPositions {
            request_id,
        })
        .await
    }

    pub async fn req_contract_details(
        &self,
        contract: Contract,
    ) -> AppResult<(i64, CompletionHandle)> {
        self.send_tracked(RequestKind::ContractDetails, |request_id| {
            Request::ContractDetails {
                request_id,
                contract,
            }
        })
        .await
    }

    pub async fn req_matching_symbols(
        &self,
        pattern: String,
    ) -> AppResult<(i64, CompletionHandle)> {
        self.send_tracked(RequestKind::MatchingSymbols, |request_id| {
            Request::MatchingSymbols {
                request_id,
                pattern,
            }
        })
        .await
    }

    pub async fn req_scanner_subscription(
        &self,
        instrument: String,
        location_code: String,
        scan_code: String,
    ) -> AppResult<(i64, CompletionHandle)> {
        self.send_tracked(RequestKind::ScannerSubscription, |request_id| {
            Request::ScannerSubscription {
                request_id,
                instrument,
                location_code,
                scan_code,
            }
        })
        .await
    }

    pub async fn cancel_scanner_subscription(&self, request_id: i64) -> AppResult<()> {
        self.cancel_tracked(request_id, |request_id| {
            Request::CancelScannerSubscription { request_id }
        })
        .await
    }

    /// Submits an order under a fresh id from the gateway-seeded order id
    /// space. The handle resolves on a terminal order status, a
    /// correlated error, or teardown.
    pub async fn place_order(
        &self,
        contract: Contract,
        order: Order,
    ) -> AppResult<(i64, CompletionHandle)> {
        let (order_id, handle) = self.correlator.begin_order()?;
        let frame = Request::PlaceOrder {
            order_id,
            contract,
            order,
        }
        .into_frame();
        match self.send(frame).await {
            Ok(()) => Ok((order_id, handle)),
            Err(e) => {
                self.correlator
                    .complete_order(order_id, RequestOutcome::Aborted);
                Err(e)
            }
        }
    }

    /// Asks the gateway to cancel an order. Unlike data-stream cancels,
    /// the pending entry stays alive until the gateway confirms with a
    /// terminal order status or a correlated error.
    pub async fn cancel_order(&self, order_id: i64) -> AppResult<()> {
        self.send(Request::CancelOrder { order_id }.into_frame())
            .await
    }
}
