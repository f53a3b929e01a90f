//! # Substrate Transaction Client
//!
//! This library builds, signs, submits and tracks transactions for a Substrate-based chain.
//! Calls are described by typed descriptors generated offline; every transaction is checked
//! against the node's current runtime before it is encoded, and every submission is followed
//! from validation to finality as a stream of lifecycle events.

/// Error handling module.
///
/// Defines a custom error type using the `snafu` crate to provide detailed and structured
/// error messages for the failures encountered while building, signing and submitting
/// transactions.
pub mod error;

/// Node connection contract.
pub mod chain_head;

/// Signer contract.
///
/// Turns call data into a signed extrinsic; key handling stays outside this crate.
pub mod signer;

/// Settings shared by entries and the submission pipeline.
pub mod config;

/// Runtime compatibility module.
///
/// Tracks the node's runtime and decides whether a descriptor still matches it.
pub mod compatibility;

/// Call and asset descriptor tables.
pub mod descriptors;

/// Transaction entry module.
///
/// Typed per-call handles producing transactions that can be encoded, signed, submitted and
/// priced.
pub mod tx_entry;

/// Transaction submission module.
///
/// Validates, broadcasts and tracks signed extrinsics until they are finalized.
pub mod tx_submitter;

/// Submission state machine
pub mod tx_progress;

/// Fee estimation
pub mod fees;

/// Data models
pub mod model;

/// Utils
pub mod utils;

#[cfg(test)]
mod mock;

pub use chain_head::{BoxError, ChainHead, TrackedTxStream};
pub use compatibility::{
    Checksum, CompatibilityHelper, CompatibilityResolver, RuntimeContext, RuntimeProvider,
    RuntimePublisher,
};
pub use config::TxConfig;
pub use descriptors::{AssetDescriptor, CallDescriptor, PalletDescriptors};
pub use error::{Error, Result};
pub use model::{TxEvent, TxFinalizedPayload, TxHints};
pub use signer::TxSigner;
pub use tx_entry::{DecodedCall, Transaction, TxEntry, TxEventStream};
pub use tx_submitter::{TxBroadcastStream, TxSubmitter};
