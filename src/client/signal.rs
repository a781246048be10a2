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

use std::time::Duration;

use async_channel::{bounded, Receiver, Sender, TrySendError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitResult {
    Signaled,
    TimedOut,
}

/// Wakeup edge between the reader task and the event pump.
///
/// Built on a capacity-one channel: `raise` is idempotent while a wakeup
/// is already buffered, and a `raise` that lands before the consumer
/// starts waiting is held rather than lost. The consumer must drain the
/// inbound queue after every wakeup, since many frames can collapse into
/// one buffered signal.
#[derive(Debug, Clone)]
pub struct Signal {
    tx: Sender<()>,
    rx: Receiver<()>,
}

impl Signal {
    pub fn new() -> Signal {
        let (tx, rx) = bounded(1);
        Signal { tx, rx }
    }

    /// Never blocks; safe to call from any task.
    pub fn raise(&self) {
        match self.tx.try_send(()) {
            Ok(()) | Err(TrySendError::Full(())) => {}
            Err(TrySendError::Closed(())) => {}
        }
    }

    pub async fn wait(&self, timeout: Option<Duration>) -> WaitResult {
        match timeout {
            Some(timeout) => {
                match tokio::time::timeout(timeout, self.rx.recv()).await {
                    Ok(_) => WaitResult::Signaled,
                    Err(_) => WaitResult::TimedOut,
                }
            }
            None => {
                let _ = self.rx.recv().await;
                WaitResult::Signaled
            }
        }
    }
}

impl Default for Signal {
    fn default() -> Self {
        Signal::new()
    }
}
