//! Collaborator contract for the node connection.
//!
//! The engine never talks to the transport directly: it consumes a [`ChainHead`] that follows the
//! node's finalized chain, validates and broadcasts payloads, tracks them into blocks, and runs
//! runtime API calls. Implementations are shared between any number of entries and in-flight
//! submissions, so every method takes `&self`.

use async_trait::async_trait;
use futures::stream::BoxStream;

use crate::model::{BlockInfo, SystemEvent, TrackedTx};

/// Error type returned by collaborators.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Stream of inclusion updates for one transaction.
pub type TrackedTxStream = BoxStream<'static, Result<TrackedTx, BoxError>>;

/// Connection to a node following the chain head.
#[async_trait]
pub trait ChainHead: Send + Sync {
    /// The latest finalized block.
    async fn finalized(&self) -> Result<BlockInfo, BoxError>;

    /// Asks the runtime whether the hex-encoded `tx` is valid at block `at`.
    async fn validate_tx(&self, tx: &str, at: &str) -> Result<bool, BoxError>;

    /// Submits the hex-encoded `tx` to the node's transaction pool.
    async fn broadcast_tx(&self, tx: &str) -> Result<(), BoxError>;

    /// Tracks the hex-encoded `tx` into best-chain and finalized blocks.
    ///
    /// The stream yields every best-chain inclusion, then one `Finalized` update.
    fn track_tx(&self, tx: &str) -> TrackedTxStream;

    /// All events of the block `block_hash`, in emission order.
    async fn events_at(&self, block_hash: &str) -> Result<Vec<SystemEvent>, BoxError>;

    /// Runs the runtime API `api` with hex-encoded `args` at `at`, or at the latest finalized
    /// block when `at` is `None`. Returns the hex-encoded result.
    async fn call(&self, at: Option<&str>, api: &str, args: &str) -> Result<String, BoxError>;
}
