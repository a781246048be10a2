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

use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use std::time::Instant;

use dashmap::DashMap;
use tokio::sync::oneshot;
use tracing::debug;

use crate::request::RequestKind;
use crate::{AppError, AppResult};

/// How a pending request or order ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestOutcome {
    /// The gateway sent the family's end sentinel (or one-shot reply).
    Completed,
    /// The gateway reported a correlated error.
    Failed { code: i64, message: String },
    /// The client cancelled it locally.
    Cancelled,
    /// The session tore down while the request was in flight.
    Aborted,
}

/// Resolves when the correlator terminates the request it was issued for.
/// Every handle resolves eventually; session teardown aborts whatever is
/// still pending.
#[derive(Debug)]
pub struct CompletionHandle {
    rx: oneshot::Receiver<RequestOutcome>,
}

impl CompletionHandle {
    pub async fn outcome(self) -> AppResult<RequestOutcome> {
        self.rx
            .await
            .map_err(|_| AppError::ChannelRecvError("completion sender dropped".into()))
    }
}

struct PendingEntry {
    kind: RequestKind,
    created_at: Instant,
    done_tx: oneshot::Sender<RequestOutcome>,
}

struct PendingOrder {
    done_tx: oneshot::Sender<RequestOutcome>,
}

/// Allocates request and order identifiers and tracks what is in flight.
///
/// The two id spaces are independent: request ids are client-local and
/// start at 1, order ids are seeded from the gateway's handshake
/// announcement. Allocation is a plain `fetch_add`, so concurrent
/// callers get distinct, strictly increasing ids without locking.
pub struct RequestCorrelator {
    next_request_id: AtomicI64,
    next_order_id: AtomicI64,
    order_ids_seeded: AtomicBool,
    pending_requests: DashMap<i64, PendingEntry>,
    pending_orders: DashMap<i64, PendingOrder>,
}

impl RequestCorrelator {
    pub fn new() -> RequestCorrelator {
        RequestCorrelator {
            next_request_id: AtomicI64::new(1),
            next_order_id: AtomicI64::new(0),
            order_ids_seeded: AtomicBool::new(false),
            pending_requests: DashMap::new(),
            pending_orders: DashMap::new(),
        }
    }

    /// Installs the gateway-announced floor for the order id space. Later
    /// announcements only move the floor forward.
    pub fn seed_order_ids(&self, next_order_id: i64) {
        self.next_order_id
            .fetch_max(next_order_id, Ordering::AcqRel);
        self.order_ids_seeded.store(true, Ordering::Release);
    }

    pub fn begin_request(&self, kind: RequestKind) -> (i64, CompletionHandle) {
        let request_id = self.next_request_id.fetch_add(1, Ordering::AcqRel);
        let (done_tx, rx) = oneshot::channel();
        self.pending_requests.insert(
            request_id,
            PendingEntry {
                kind,
                created_at: Instant::now(),
                done_tx,
            },
        );
        (request_id, CompletionHandle { rx })
    }

    /// Allocates an order id. Fails before the handshake has seeded the
    /// order id space, since an unseeded id could collide with ids from a
    /// previous session of the same client id.
    pub fn begin_order(&self) -> AppResult<(i64, CompletionHandle)> {
        if !self.order_ids_seeded.load(Ordering::Acquire) {
            return Err(AppError::IllegalStateError(
                "order id space not seeded yet".into(),
            ));
        }
        let order_id = self.next_order_id.fetch_add(1, Ordering::AcqRel);
        let (done_tx, rx) = oneshot::channel();
        self.pending_orders.insert(order_id, PendingOrder { done_tx });
        Ok((order_id, CompletionHandle { rx }))
    }

    pub fn is_pending(&self, request_id: i64) -> bool {
        self.pending_requests.contains_key(&request_id)
    }

    pub fn is_pending_order(&self, order_id: i64) -> bool {
        self.pending_orders.contains_key(&order_id)
    }

    pub fn kind_of(&self, request_id: i64) -> Option<RequestKind> {
        self.pending_requests.get(&request_id).map(|e| e.kind)
    }

    /// Terminates a pending request. Returns false when the id is not
    /// pending, which makes completion idempotent under duplicate
    /// sentinels or an error frame racing a local cancel.
    pub fn complete_request(&self, request_id: i64, outcome: RequestOutcome) -> bool {
        match self.pending_requests.remove(&request_id) {
            Some((_, entry)) => {
                debug!(
                    "request {} ({:?}) terminated after {:?}: {:?}",
                    request_id,
                    entry.kind,
                    entry.created_at.elapsed(),
                    outcome
                );
                // receiver may already be dropped
                let _ = entry.done_tx.send(outcome);
                true
            }
            None => false,
        }
    }

    pub fn complete_order(&self, order_id: i64, outcome: RequestOutcome) -> bool {
        match self.pending_orders.remove(&order_id) {
            Some((_, order)) => {
                debug!("order {} terminated: {:?}", order_id, outcome);
                let _ = order.done_tx.send(outcome);
                true
            }
            None => false,
        }
    }

    /// Drains both pending maps, resolving every outstanding handle with
    /// `Aborted`. Called once during session teardown.
    pub fn abort_all(&self) {
        let request_ids: Vec<i64> = self.pending_requests.iter().map(|e| *e.key()).collect();
        for request_id in request_ids {
            self.complete_request(request_id, RequestOutcome::Aborted);
        }
        let order_ids: Vec<i64> = self.pending_orders.iter().map(|e| *e.key()).collect();
        for order_id in order_ids {
            self.complete_order(order_id, RequestOutcome::Aborted);
        }
    }

    pub fn pending_count(&self) -> usize {
        self.pending_requests.len() + self.pending_orders.len()
    }
}

impl Default for RequestCorrelator {
    fn default() -> Self {
        RequestCorrelator::new()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::sync::Arc;

    use super::*;

    #[tokio::test]
    async fn test_ids_are_unique_and_increasing_across_tasks() {
        let correlator = Arc::new(RequestCorrelator::new());
        let mut handles = Vec::new();
        for _ in 0..8 {
            let correlator = correlator.clone();
            handles.push(tokio::spawn(async move {
                let mut ids = Vec::new();
                for _ in 0..100 {
                    let (id, _handle) = correlator.begin_request(RequestKind::MarketData);
                    ids.push(id);
                }
                ids
            }));
        }
        let mut all = Vec::new();
        for handle in handles {
            let ids = handle.await.unwrap();
            assert!(ids.windows(2).all(|w| w[0] < w[1]));
            all.extend(ids);
        }
        let distinct: HashSet<i64> = all.iter().copied().collect();
        assert_eq!(distinct.len(), 800);
    }

    #[tokio::test]
    async fn test_completion_is_idempotent() {
        let correlator = RequestCorrelator::new();
        let (id, handle) = correlator.begin_request(RequestKind::MarketDepth);
        assert!(correlator.is_pending(id));
        assert!(correlator.complete_request(id, RequestOutcome::Completed));
        assert!(!correlator.complete_request(id, RequestOutcome::Aborted));
        assert!(!correlator.is_pending(id));
        assert_eq!(handle.outcome().await.unwrap(), RequestOutcome::Completed);
    }

    #[tokio::test]
    async fn test_order_ids_require_handshake_seed() {
        let correlator = RequestCorrelator::new();
        assert!(correlator.begin_order().is_err());
        correlator.seed_order_ids(37);
        let (first, _handle) = correlator.begin_order().unwrap();
        assert_eq!(first, 37);
        // a stale re-announcement must not move the counter backwards
        correlator.seed_order_ids(5);
        let (second, _handle) = correlator.begin_order().unwrap();
        assert_eq!(second, 38);
    }

    #[tokio::test]
    async fn test_abort_all_resolves_every_handle() {
        let correlator = RequestCorrelator::new();
        correlator.seed_order_ids(1);
        let (_, req_handle) = correlator.begin_request(RequestKind::HistoricalBars);
        let (_, order_handle) = correlator.begin_order().unwrap();
        correlator.abort_all();
        assert_eq!(correlator.pending_count(), 0);
        assert_eq!(req_handle.outcome().await.unwrap(), RequestOutcome::Aborted);
        assert_eq!(
            order_handle.outcome().await.unwrap(),
            RequestOutcome::Aborted
        );
    }
}
