//! Submission pipeline.
//!
//! Every submission is an explicit state machine ([`TxProgress`]) driven as a stream: it
//! validates the signed payload against the latest finalized block, then broadcasts it and
//! tracks it into blocks concurrently until it is finalized or an error ends it.
use std::fmt;
use std::future::Future;
use std::sync::Arc;

use futures::future::{BoxFuture, FutureExt, OptionFuture};
use futures::stream::{self, BoxStream, StreamExt};
use log::{error, info, warn};
use snafu::ResultExt;
use tokio_util::sync::CancellationToken;

use crate::chain_head::{BoxError, ChainHead, TrackedTxStream};
use crate::config::TxConfig;
use crate::error::{CancelledSnafu, ChainHeadSnafu, Error, InvalidSnafu, Result, TrackingEndedSnafu};
use crate::model::{TrackedTx, TxBlock, TxBroadcastEvent, TxFinalizedPayload};
use crate::tx_progress::{finalized_outcome, SubmissionState, SuccessEvent, Transition, TxProgress};
use crate::utils::short_hex;

/// Lifecycle events of one submission. Ends after `Finalized` or after the first error.
pub type TxBroadcastStream = BoxStream<'static, Result<TxBroadcastEvent>>;

/// Submits signed payloads and follows them to finality.
///
/// Cloning is cheap; clones share the chain head and the cancellation scope.
#[derive(Clone)]
pub struct TxSubmitter {
    /// Connection used by every submission.
    chain_head: Arc<dyn ChainHead>,
    /// Event marking a successful dispatch.
    success: SuccessEvent,
    /// Parent of every submission's cancellation token.
    cancel: CancellationToken,
}

impl fmt::Debug for TxSubmitter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TxSubmitter")
            .field("success", &self.success)
            .field("cancelled", &self.cancel.is_cancelled())
            .finish_non_exhaustive()
    }
}

impl TxSubmitter {
    /// Creates a submitter that talks to `chain_head`.
    pub fn new(chain_head: Arc<dyn ChainHead>, config: &TxConfig) -> Self {
        Self {
            chain_head,
            success: SuccessEvent::from(config),
            cancel: CancellationToken::new(),
        }
    }

    /// Submits the hex-encoded signed extrinsic `tx` and streams its lifecycle.
    ///
    /// The stream yields `Broadcasted`, zero or more `BestChainBlockIncluded` (repeated when a
    /// reorganization moves the transaction), then one `Finalized`. Any failure is yielded as
    /// the last item. Nothing is sent to the node until the stream is polled, and dropping the
    /// stream stops the broadcast and the tracking subscription.
    pub fn submit_and_watch(&self, tx: String) -> TxBroadcastStream {
        let pipeline = Pipeline::new(
            self.chain_head.clone(),
            self.success.clone(),
            tx,
            self.child_token(),
        );

        stream::unfold(pipeline, |mut pipeline| async move {
            let event = pipeline.next_event().await?;
            Some((event, pipeline))
        })
        .boxed()
    }

    /// Submits `tx` and waits for its finalized outcome.
    pub async fn submit(&self, tx: String) -> Result<TxFinalizedPayload> {
        let mut events = self.submit_and_watch(tx);
        while let Some(event) = events.next().await {
            if let TxBroadcastEvent::Finalized(payload) = event? {
                return Ok(payload);
            }
        }
        TrackingEndedSnafu.fail()
    }

    /// Cancels every in-flight submission of this submitter and its clones.
    ///
    /// Their streams end with [`Error::Cancelled`]. Later submissions are cancelled immediately.
    pub fn shutdown(&self) {
        info!("🛑 Shutting down tx submitter");
        self.cancel.cancel();
    }

    /// A token cancelled by [`Self::shutdown`].
    pub(crate) fn child_token(&self) -> CancellationToken {
        self.cancel.child_token()
    }
}

/// Awaits `fut` unless `cancel` fires first.
pub(crate) async fn cancellable<F: Future>(
    cancel: &CancellationToken,
    fut: F,
) -> Result<F::Output> {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => CancelledSnafu.fail(),
        output = fut => Ok(output),
    }
}

/// What woke the tracking loop.
enum Step {
    /// The submission was cancelled.
    Cancelled,
    /// The broadcast request completed.
    Broadcast(Result<(), BoxError>),
    /// The tracking subscription yielded, or ended with `None`.
    Tracked(Option<Result<TrackedTx, BoxError>>),
}

/// State of one submission.
struct Pipeline {
    chain_head: Arc<dyn ChainHead>,
    success: SuccessEvent,
    tx: String,
    cancel: CancellationToken,
    progress: TxProgress,
    /// In-flight broadcast, cleared once it succeeds.
    broadcast: Option<BoxFuture<'static, Result<(), BoxError>>>,
    tracking: Option<TrackedTxStream>,
}

impl Pipeline {
    fn new(
        chain_head: Arc<dyn ChainHead>,
        success: SuccessEvent,
        tx: String,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            chain_head,
            success,
            progress: TxProgress::new(&tx),
            tx,
            cancel,
            broadcast: None,
            tracking: None,
        }
    }

    /// Drives the submission to its next event, `None` once it reached a terminal state.
    async fn next_event(&mut self) -> Option<Result<TxBroadcastEvent>> {
        let result = match self.progress.state() {
            state if state.is_terminal() => return None,
            SubmissionState::Created => self.validate().await,
            _ => self.track().await,
        };

        if let Err(err) = &result {
            error!("❌ Tx {} failed: {}", short_hex(&self.tx), err);
            self.progress.fail();
            self.broadcast = None;
            self.tracking = None;
        }
        Some(result)
    }

    /// Validates the payload, then starts the broadcast and the tracking subscription.
    async fn validate(&mut self) -> Result<TxBroadcastEvent> {
        self.progress.apply(Transition::Validate)?;

        let finalized = cancellable(&self.cancel, self.chain_head.finalized())
            .await?
            .context(ChainHeadSnafu {
                operation: "finalized",
            })?;
        let valid = cancellable(
            &self.cancel,
            self.chain_head.validate_tx(&self.tx, &finalized.hash),
        )
        .await?
        .context(ChainHeadSnafu {
            operation: "validate",
        })?;

        if !valid {
            self.progress.apply(Transition::Reject)?;
            return InvalidSnafu.fail();
        }
        self.progress.apply(Transition::Accept)?;
        info!(
            "📄 Tx {} validated at block #{}",
            short_hex(&self.tx),
            finalized.number
        );

        let chain_head = self.chain_head.clone();
        let tx = self.tx.clone();
        self.broadcast = Some(async move { chain_head.broadcast_tx(&tx).await }.boxed());
        self.tracking = Some(self.chain_head.track_tx(&self.tx));

        Ok(TxBroadcastEvent::Broadcasted)
    }

    /// Runs the broadcast and the tracking subscription until the next inclusion update.
    async fn track(&mut self) -> Result<TxBroadcastEvent> {
        loop {
            let broadcasting = self.broadcast.is_some();
            let Some(tracking) = self.tracking.as_mut() else {
                return TrackingEndedSnafu.fail();
            };

            let step = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => Step::Cancelled,
                Some(result) = OptionFuture::from(self.broadcast.as_mut()), if broadcasting => {
                    Step::Broadcast(result)
                }
                tracked = tracking.next() => Step::Tracked(tracked),
            };

            match step {
                Step::Cancelled => {
                    warn!("⚠️ Tx {} cancelled", short_hex(&self.tx));
                    return CancelledSnafu.fail();
                }
                Step::Broadcast(Ok(())) => {
                    info!("📡 Tx {} broadcasted", short_hex(&self.tx));
                    self.broadcast = None;
                }
                Step::Broadcast(Err(source)) => return Err(Error::Broadcast { source }),
                Step::Tracked(None) => return TrackingEndedSnafu.fail(),
                Step::Tracked(Some(Err(source))) => return Err(Error::Tracking { source }),
                Step::Tracked(Some(Ok(TrackedTx::BestChainBlockIncluded(block)))) => {
                    return self.include(block);
                }
                Step::Tracked(Some(Ok(TrackedTx::Finalized(block)))) => {
                    return self.finalize(block).await;
                }
            }
        }
    }

    fn include(&mut self, block: TxBlock) -> Result<TxBroadcastEvent> {
        if self.progress.inclusions() > 0 {
            warn!(
                "⚠️ Tx {} moved to best block {} after a reorganization",
                short_hex(&self.tx),
                block.hash
            );
        } else {
            info!(
                "📦 Tx {} is in best block {} at index {}",
                short_hex(&self.tx),
                block.hash,
                block.index
            );
        }
        self.progress.apply(Transition::Include)?;
        Ok(TxBroadcastEvent::BestChainBlockIncluded { block })
    }

    /// Derives the outcome from the events of the finalized block.
    async fn finalize(&mut self, block: TxBlock) -> Result<TxBroadcastEvent> {
        let events = cancellable(&self.cancel, self.chain_head.events_at(&block.hash))
            .await?
            .context(ChainHeadSnafu {
                operation: "events",
            })?;
        let payload = finalized_outcome(events, block, &self.success)?;
        self.progress.apply(Transition::Finalize)?;

        self.broadcast = None;
        self.tracking = None;
        if payload.ok {
            info!(
                "✅ Tx {} finalized in block {}",
                short_hex(&self.tx),
                payload.block.hash
            );
        } else {
            warn!(
                "⚠️ Tx {} finalized in block {} but its dispatch failed",
                short_hex(&self.tx),
                payload.block.hash
            );
        }
        Ok(TxBroadcastEvent::Finalized(payload))
    }
}
