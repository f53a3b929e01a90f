//! Submission state machine and outcome derivation.
//!
//! A submission moves through
//! `Created → ValidationPending → {Invalid | Broadcasting → Tracking → Finalized}`;
//! any collaborator failure along the way ends it in `Failed`. [`TxProgress`] owns the state
//! of one submission and rejects transitions that are not valid from it.

use log::debug;
use snafu::OptionExt;

use crate::config::{TxConfig, DEFAULT_SUCCESS_PALLET, DEFAULT_SUCCESS_VARIANT};
use crate::error::{IllegalTransitionSnafu, MissingOutcomeEventSnafu, Result};
use crate::model::{Phase, SystemEvent, TxBlock, TxFinalizedPayload};
use crate::utils::short_hex;

/// State of one submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionState {
    /// Nothing has been sent to the node yet.
    Created,
    /// Waiting for the node to validate the payload.
    ValidationPending,
    /// The node rejected the payload. Terminal.
    Invalid,
    /// Validated; broadcast and inclusion tracking are running.
    Broadcasting,
    /// Included in at least one best-chain block.
    Tracking,
    /// Included in a finalized block. Terminal.
    Finalized,
    /// A broadcast, tracking or chain-head error ended the submission. Terminal.
    Failed,
}

/// Typed transition events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Validation was requested.
    Validate,
    /// The node accepted the payload.
    Accept,
    /// The node rejected the payload.
    Reject,
    /// The payload was seen in a best-chain block.
    Include,
    /// The payload was seen in a finalized block and its outcome derived.
    Finalize,
    /// A collaborator failed.
    Fail,
}

impl SubmissionState {
    /// The state reached by applying `transition`, or `None` if it is not allowed.
    pub fn next(self, transition: Transition) -> Option<SubmissionState> {
        use SubmissionState::*;
        use Transition::*;

        match (self, transition) {
            (Created, Validate) => Some(ValidationPending),
            (ValidationPending, Accept) => Some(Broadcasting),
            (ValidationPending, Reject) => Some(Invalid),
            (Broadcasting | Tracking, Include) => Some(Tracking),
            (Broadcasting | Tracking, Finalize) => Some(Finalized),
            (state, Fail) if !state.is_terminal() => Some(Failed),
            _ => None,
        }
    }

    /// Returns `true` for states no transition leaves.
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            SubmissionState::Invalid | SubmissionState::Finalized | SubmissionState::Failed
        )
    }
}

/// Progress of one submission.
#[derive(Debug, Clone)]
pub struct TxProgress {
    tx: String,
    state: SubmissionState,
    inclusions: usize,
}

impl TxProgress {
    /// Starts tracking the hex payload `tx` in [`SubmissionState::Created`].
    pub fn new(tx: &str) -> Self {
        Self {
            tx: short_hex(tx).to_string(),
            state: SubmissionState::Created,
            inclusions: 0,
        }
    }

    /// The current state.
    pub fn state(&self) -> SubmissionState {
        self.state
    }

    /// Number of best-chain inclusions seen so far.
    pub fn inclusions(&self) -> usize {
        self.inclusions
    }

    /// Applies `transition`, failing with `IllegalTransition` if the state does not allow it.
    pub fn apply(&mut self, transition: Transition) -> Result<SubmissionState> {
        let next = self.state.next(transition).context(IllegalTransitionSnafu {
            from: self.state,
            transition,
        })?;
        debug!("{}: {:?} -> {:?}", self.tx, self.state, next);

        if transition == Transition::Include {
            self.inclusions += 1;
        }
        self.state = next;
        Ok(next)
    }

    /// Moves to [`SubmissionState::Failed`] unless the submission already ended.
    pub fn fail(&mut self) {
        if let Some(next) = self.state.next(Transition::Fail) {
            debug!("{}: {:?} -> {:?}", self.tx, self.state, next);
            self.state = next;
        }
    }
}

/// The event that marks a successful dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuccessEvent {
    /// Pallet of the event, `System` on FRAME chains.
    pub pallet: String,
    /// Variant of the event, `ExtrinsicSuccess` on FRAME chains.
    pub variant: String,
}

impl Default for SuccessEvent {
    fn default() -> Self {
        Self {
            pallet: DEFAULT_SUCCESS_PALLET.to_string(),
            variant: DEFAULT_SUCCESS_VARIANT.to_string(),
        }
    }
}

impl From<&TxConfig> for SuccessEvent {
    fn from(config: &TxConfig) -> Self {
        Self {
            pallet: config.success_pallet.clone(),
            variant: config.success_variant.clone(),
        }
    }
}

/// Derives the outcome of the extrinsic at `block.index` from the events of its block.
///
/// Only events emitted while applying that extrinsic are kept, in block order. The last of
/// them decides `ok`. A block with no such event has no outcome and fails with
/// `MissingOutcomeEvent`.
pub fn finalized_outcome(
    events: Vec<SystemEvent>,
    block: TxBlock,
    success: &SuccessEvent,
) -> Result<TxFinalizedPayload> {
    let events: Vec<_> = events
        .into_iter()
        .filter(|event| event.phase == Phase::ApplyExtrinsic(block.index))
        .map(|event| event.event)
        .collect();

    let last = events.last().context(MissingOutcomeEventSnafu {
        block_hash: &block.hash,
        index: block.index,
    })?;
    let ok = last.is(&success.pallet, &success.variant);

    Ok(TxFinalizedPayload { ok, events, block })
}
