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

use std::collections::VecDeque;
use std::io::{self, ErrorKind};

use bytes::BytesMut;
use parking_lot::Mutex;
use tokio::io::{AsyncRead, AsyncReadExt};
use tracing::{debug, error, info};

use crate::client::Signal;
use crate::codec::Frame;
use crate::AppResult;

/// One item handed from the reader task to the event pump. The `Closed`
/// marker is always the last item a session's queue ever receives.
#[derive(Debug)]
pub(crate) enum InboundItem {
    Frame(Frame),
    Closed(String),
}

/// Unbounded frame queue between the reader task and the event pump.
#[derive(Debug, Default)]
pub(crate) struct InboundQueue {
    items: Mutex<VecDeque<InboundItem>>,
}

impl InboundQueue {
    pub(crate) fn push(&self, item: InboundItem) {
        self.items.lock().push_back(item);
    }

    pub(crate) fn pop(&self) -> Option<InboundItem> {
        self.items.lock().pop_front()
    }
}

/// Read half of the gateway socket plus its decode buffer.
pub(crate) struct Connection<R> {
    reader: R,
    buffer: BytesMut,
    max_frame_size: usize,
}

impl<R: AsyncRead + Unpin> Connection<R> {
    pub(crate) fn new(reader: R, read_buffer_size: usize, max_frame_size: usize) -> Connection<R> {
        Connection {
            reader,
            buffer: BytesMut::with_capacity(read_buffer_size),
            max_frame_size,
        }
    }

    /// Reads one frame, buffering partial data across reads.
    ///
    /// A malformed or oversized frame is an error and the connection must
    /// be torn down. `Ok(None)` means the gateway closed the connection
    /// on a frame boundary; closing mid-frame is an error.
    pub(crate) async fn read_frame(&mut self) -> AppResult<Option<Frame>> {
        loop {
            if let Some(frame) = Frame::parse(&mut self.buffer, self.max_frame_size)? {
                return Ok(Some(frame));
            }
            if 0 == self.reader.read_buf(&mut self.buffer).await? {
                return if self.buffer.is_empty() {
                    Ok(None)
                } else {
                    Err(
                        io::Error::new(ErrorKind::ConnectionReset, "connection reset by peer")
                            .into(),
                    )
                };
            }
        }
    }
}

/// The session's only socket reader. Blocks in `read_frame`, pushes each
/// decoded frame onto the queue and raises the signal, and terminates by
/// enqueueing the `Closed` marker when the connection ends for any
/// reason.
pub(crate) struct ReaderLoop<R> {
    connection: Connection<R>,
    queue: std::sync::Arc<InboundQueue>,
    signal: Signal,
}

impl<R: AsyncRead + Unpin> ReaderLoop<R> {
    pub(crate) fn new(
        connection: Connection<R>,
        queue: std::sync::Arc<InboundQueue>,
        signal: Signal,
    ) -> ReaderLoop<R> {
        ReaderLoop {
            connection,
            queue,
            signal,
        }
    }

    pub(crate) async fn run(mut self) {
        let cause = loop {
            match self.connection.read_frame().await {
                Ok(Some(frame)) => {
                    debug!("read frame with tag {}", frame.tag);
                    self.queue.push(InboundItem::Frame(frame));
                    self.signal.raise();
                }
                Ok(None) => {
                    info!("gateway closed the connection");
                    break "connection closed by gateway".to_string();
                }
                Err(e) => {
                    error!("reader terminating: {}", e);
                    break e.to_string();
                }
            }
        };
        self.queue.push(InboundItem::Closed(cause));
        self.signal.raise();
    }
}
