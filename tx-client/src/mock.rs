//! Scripted collaborators for tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use futures::stream::{self, StreamExt};

use crate::chain_head::{BoxError, ChainHead, TrackedTxStream};
use crate::model::{BlockInfo, ChainEvent, Phase, SystemEvent, TrackedTx, TxBlock, TxHints};
use crate::signer::TxSigner;

/// Initializes test logging once per process.
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// A chain event without payload.
pub fn event(pallet: &str, variant: &str) -> ChainEvent {
    ChainEvent {
        pallet: pallet.to_string(),
        variant: variant.to_string(),
        data: Vec::new(),
    }
}

/// A block event with no topics.
pub fn system_event(phase: Phase, event: ChainEvent) -> SystemEvent {
    SystemEvent {
        phase,
        event,
        topics: Vec::new(),
    }
}

/// Position `index` in block `hash`.
pub fn tx_block(hash: &str, index: u32) -> TxBlock {
    TxBlock {
        hash: hash.to_string(),
        index,
    }
}

/// How the mock answers `broadcast_tx`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Broadcast {
    /// The pool accepts the payload.
    Ok,
    /// The pool rejects the payload.
    Fail,
    /// The request never completes.
    Pending,
}

/// Raises its flag when dropped.
#[derive(Debug)]
struct DropFlag(Arc<AtomicBool>);

impl Drop for DropFlag {
    fn drop(&mut self) {
        self.0.store(true, Ordering::SeqCst);
    }
}

/// A chain head answering from a script and recording every request.
#[derive(Debug)]
pub struct MockChainHead {
    finalized: BlockInfo,
    valid: bool,
    broadcast: Broadcast,
    tracked: Vec<Result<TrackedTx, String>>,
    tracked_by_tx: HashMap<String, Vec<Result<TrackedTx, String>>>,
    hold_tracking: bool,
    broadcast_dropped: Arc<AtomicBool>,
    tracking_dropped: Arc<AtomicBool>,
    events: Vec<SystemEvent>,
    call_response: Option<String>,
    calls: Mutex<Vec<String>>,
}

impl Default for MockChainHead {
    fn default() -> Self {
        Self::new()
    }
}

impl MockChainHead {
    /// Finalized block `0xf0` at height 10; the transaction is valid, best-chain included and
    /// then finalized at index 1 of block `0xb1`, where it succeeds.
    pub fn new() -> Self {
        Self {
            finalized: BlockInfo {
                hash: "0xf0".to_string(),
                number: 10,
                parent: "0xef".to_string(),
            },
            valid: true,
            broadcast: Broadcast::Ok,
            tracked: vec![
                Ok(TrackedTx::BestChainBlockIncluded(tx_block("0xb1", 1))),
                Ok(TrackedTx::Finalized(tx_block("0xb1", 1))),
            ],
            tracked_by_tx: HashMap::new(),
            hold_tracking: false,
            broadcast_dropped: Arc::new(AtomicBool::new(false)),
            tracking_dropped: Arc::new(AtomicBool::new(false)),
            events: vec![
                system_event(Phase::ApplyExtrinsic(0), event("System", "ExtrinsicSuccess")),
                system_event(Phase::ApplyExtrinsic(1), event("Balances", "Transfer")),
                system_event(Phase::ApplyExtrinsic(1), event("System", "ExtrinsicSuccess")),
            ],
            call_response: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Validation rejects every payload.
    pub fn invalid(mut self) -> Self {
        self.valid = false;
        self
    }

    /// Sets how `broadcast_tx` answers.
    pub fn broadcast(mut self, broadcast: Broadcast) -> Self {
        self.broadcast = broadcast;
        self
    }

    /// Tracking yields `tracked`, then ends.
    pub fn tracked(mut self, tracked: Vec<Result<TrackedTx, String>>) -> Self {
        self.tracked = tracked;
        self
    }

    /// Tracking of the payload `tx` yields `tracked` instead of the shared script.
    pub fn tracked_for(mut self, tx: &str, tracked: Vec<Result<TrackedTx, String>>) -> Self {
        self.tracked_by_tx.insert(tx.to_string(), tracked);
        self
    }

    /// Tracking stays open after the scripted updates.
    pub fn hold_tracking(mut self) -> Self {
        self.hold_tracking = true;
        self
    }

    /// Events returned for every block.
    pub fn events(mut self, events: Vec<SystemEvent>) -> Self {
        self.events = events;
        self
    }

    /// Answer to every runtime call; runtime calls fail when unset.
    pub fn call_response(mut self, response: &str) -> Self {
        self.call_response = Some(response.to_string());
        self
    }

    /// The block reported as finalized.
    pub fn finalized_block(&self) -> BlockInfo {
        self.finalized.clone()
    }

    /// Requests received so far, in order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    /// Returns `true` if any recorded request starts with `prefix`.
    pub fn called(&self, prefix: &str) -> bool {
        self.calls().iter().any(|call| call.starts_with(prefix))
    }

    /// Returns `true` once a started `broadcast_tx` future has been dropped.
    pub fn broadcast_dropped(&self) -> bool {
        self.broadcast_dropped.load(Ordering::SeqCst)
    }

    /// Returns `true` once a tracking stream has been dropped.
    pub fn tracking_dropped(&self) -> bool {
        self.tracking_dropped.load(Ordering::SeqCst)
    }

    /// Appends `call` to the request log.
    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl ChainHead for MockChainHead {
    async fn finalized(&self) -> Result<BlockInfo, BoxError> {
        self.record("finalized".to_string());
        Ok(self.finalized.clone())
    }

    async fn validate_tx(&self, tx: &str, at: &str) -> Result<bool, BoxError> {
        self.record(format!("validate_tx {tx} {at}"));
        Ok(self.valid)
    }

    async fn broadcast_tx(&self, tx: &str) -> Result<(), BoxError> {
        self.record(format!("broadcast_tx {tx}"));
        let _guard = DropFlag(self.broadcast_dropped.clone());
        match self.broadcast {
            Broadcast::Ok => Ok(()),
            Broadcast::Fail => Err("pool is full".into()),
            Broadcast::Pending => futures::future::pending().await,
        }
    }

    fn track_tx(&self, tx: &str) -> TrackedTxStream {
        self.record(format!("track_tx {tx}"));
        let tracked = self.tracked_by_tx.get(tx).unwrap_or(&self.tracked).clone();
        let updates = stream::iter(tracked.into_iter().map(|update| update.map_err(BoxError::from)));
        let updates = if self.hold_tracking {
            updates.chain(stream::pending()).boxed()
        } else {
            updates.boxed()
        };

        let guard = DropFlag(self.tracking_dropped.clone());
        updates
            .map(move |update| {
                let _held = &guard;
                update
            })
            .boxed()
    }

    async fn events_at(&self, block_hash: &str) -> Result<Vec<SystemEvent>, BoxError> {
        self.record(format!("events_at {block_hash}"));
        Ok(self.events.clone())
    }

    async fn call(&self, at: Option<&str>, api: &str, args: &str) -> Result<String, BoxError> {
        self.record(format!("call {at:?} {api} {args}"));
        self.call_response
            .clone()
            .ok_or_else(|| "runtime call unavailable".into())
    }
}

/// One request received by [`MockSigner`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignRequest {
    /// Signing identity.
    pub from: String,
    /// Call bytes to sign.
    pub call_data: Vec<u8>,
    /// Hash of the block signed against.
    pub at: String,
    /// Resolved hints.
    pub hints: TxHints<Vec<u8>>,
}

/// A signer that prefixes the call data with `0xaa` and records every request.
#[derive(Debug, Default)]
pub struct MockSigner {
    /// Every request fails.
    fail: bool,
    /// Requests received so far.
    requests: Mutex<Vec<SignRequest>>,
}

impl MockSigner {
    /// A signer rejecting every request.
    pub fn failing() -> Self {
        Self {
            fail: true,
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Requests received so far, in order.
    pub fn requests(&self) -> Vec<SignRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl TxSigner for MockSigner {
    type Identity = String;

    async fn sign(
        &self,
        from: &String,
        call_data: &[u8],
        at: &BlockInfo,
        hints: TxHints<Vec<u8>>,
    ) -> Result<Vec<u8>, BoxError> {
        self.requests.lock().unwrap().push(SignRequest {
            from: from.clone(),
            call_data: call_data.to_vec(),
            at: at.hash.clone(),
            hints,
        });
        if self.fail {
            return Err("signer rejected the request".into());
        }
        Ok([&[0xaa], call_data].concat())
    }
}
