use snafu::Snafu;

use crate::chain_head::BoxError;
use crate::tx_progress::{SubmissionState, Transition};

/// Represents errors that can occur while building, signing, submitting and tracking
/// transactions.
///
/// No error is recovered locally: every variant terminates the operation that raised it and is
/// handed back to the caller, as a rejected future for one-shot operations or as the final item
/// of an event stream.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum Error {
    /// A value could not be decoded from its binary encoding.
    #[snafu(display("Failed to decode chain value: {source}"))]
    Codec {
        /// The underlying decode error, `Underflow` when the buffer was too short.
        source: scale_combinators::DecodeError,
    },

    /// The runtime's layout for a call does not match the descriptor's checksum.
    #[snafu(display("Incompatible runtime entry Tx({pallet}.{name})"))]
    IncompatibleRuntime {
        /// Pallet of the call.
        pallet: String,
        /// Name of the call.
        name: String,
    },

    /// The runtime's fee-asset layout does not match the entry's expected asset checksum.
    #[snafu(display("Incompatible runtime asset"))]
    IncompatibleRuntimeAsset,

    /// The node rejected the signed payload during validation; it was never broadcast.
    #[snafu(display("Invalid transaction"))]
    Invalid,

    /// Submitting the payload to the node's transaction pool failed.
    #[snafu(display("Error broadcasting tx: {source}"))]
    Broadcast {
        /// The collaborator error.
        source: BoxError,
    },

    /// The inclusion-tracking subscription failed.
    #[snafu(display("Error tracking tx: {source}"))]
    Tracking {
        /// The collaborator error.
        source: BoxError,
    },

    /// The inclusion-tracking subscription ended before the transaction was finalized.
    #[snafu(display("Tx tracking ended before finalization"))]
    TrackingEnded,

    /// The submission state machine received a transition that is not valid from its state.
    #[snafu(display("Illegal transition {transition:?} from state {from:?}"))]
    IllegalTransition {
        /// State the submission was in.
        from: SubmissionState,
        /// The rejected transition.
        transition: Transition,
    },

    /// No event in the finalized block is attributed to the extrinsic, so its outcome is unknown.
    #[snafu(display("No outcome event for extrinsic {index} in block {block_hash}"))]
    MissingOutcomeEvent {
        /// Hash of the finalized block.
        block_hash: String,
        /// Index of the extrinsic within the block.
        index: u32,
    },

    /// The estimated extrinsic length does not fit the runtime's `u32` length argument.
    #[snafu(display("Estimated extrinsic length {length} exceeds u32"))]
    CallTooLarge {
        /// The estimated length.
        length: u128,
    },

    /// The fee-details runtime call returned no value.
    #[snafu(display("Unable to calculate tx fees"))]
    FeeCalculationUnavailable,

    /// A chain-head request other than broadcast or tracking failed.
    #[snafu(display("Chain head {operation} request failed: {source}"))]
    ChainHead {
        /// The request that failed.
        operation: &'static str,
        /// The collaborator error.
        source: BoxError,
    },

    /// The external signer failed to sign the call.
    #[snafu(display("Error signing tx: {source}"))]
    Signing {
        /// The collaborator error.
        source: BoxError,
    },

    /// A hex string returned by a collaborator could not be parsed.
    #[snafu(display("Failed to parse hex payload: {source}"))]
    InvalidHex {
        /// The underlying hex parsing error.
        source: hex::FromHexError,
    },

    /// The operation was cancelled before reaching a terminal state.
    #[snafu(display("Operation cancelled"))]
    Cancelled,
}

/// Type alias for results that return a `Result<T, Error>`, simplifying error handling.
pub type Result<T, E = Error> = std::result::Result<T, E>;
