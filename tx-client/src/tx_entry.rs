//! # Transaction entries
//!
//! A [`TxEntry`] is the typed handle for one call of one pallet. It binds the call's descriptor
//! to the chain head, the submitter and a signer, and turns typed arguments into
//! [`Transaction`]s that can be encoded, signed, submitted and priced against whichever runtime
//! is current, as long as that runtime still lays the call out the way the descriptor expects.
use std::fmt;
use std::sync::Arc;

use futures::future;
use futures::stream::{self, BoxStream, StreamExt};
use log::info;
use scale_combinators::{Codec, Unit};
use snafu::{OptionExt, ResultExt};
use tokio_util::sync::CancellationToken;

use crate::chain_head::ChainHead;
use crate::compatibility::{CompatibilityHelper, CompatibilityResolver, RuntimeContext};
use crate::config::TxConfig;
use crate::descriptors::{AssetDescriptor, CallDescriptor};
use crate::error::{
    ChainHeadSnafu, Error, IncompatibleRuntimeAssetSnafu, IncompatibleRuntimeSnafu, Result,
    SigningSnafu,
};
use crate::fees::estimate_fees;
use crate::model::{TxEvent, TxFinalizedPayload, TxHints};
use crate::signer::TxSigner;
use crate::tx_submitter::{cancellable, TxSubmitter};
use crate::utils::to_hex;

/// Lifecycle events of a transaction, starting with `Signed`.
pub type TxEventStream = BoxStream<'static, Result<TxEvent>>;

/// The `{pallet, name, args}` view of a call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedCall<T> {
    /// Pallet of the call.
    pub pallet: String,
    /// Name of the call.
    pub name: String,
    /// Typed arguments.
    pub args: Arc<T>,
}

/// Shared state of an entry and its transactions.
struct EntryInner<C, S, A> {
    call: CallDescriptor<C>,
    asset: AssetDescriptor<A>,
    compatibility: CompatibilityHelper,
    chain_head: Arc<dyn ChainHead>,
    submitter: TxSubmitter,
    signer: Arc<S>,
    config: TxConfig,
}

/// Typed handle for the call `pallet.name`.
///
/// `C` encodes the call arguments, `S` signs, `A` encodes the asset fees may be paid in
/// ([`Unit`] for chains that only accept the native token).
pub struct TxEntry<C, S, A = Unit> {
    inner: Arc<EntryInner<C, S, A>>,
}

impl<C, S, A> Clone for TxEntry<C, S, A> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<C, S, A> fmt::Debug for TxEntry<C, S, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TxEntry")
            .field("pallet", &self.inner.call.pallet)
            .field("name", &self.inner.call.name)
            .field("checksum", &self.inner.call.checksum)
            .finish_non_exhaustive()
    }
}

impl<C, S, A> TxEntry<C, S, A>
where
    C: Codec,
    S: TxSigner,
    A: Codec,
{
    /// Creates the entry for `call`.
    ///
    /// The call checksum of the descriptor is captured here; later runtimes are compatible
    /// only if they report the same checksum for `pallet.name`.
    pub fn new(
        call: CallDescriptor<C>,
        asset: AssetDescriptor<A>,
        chain_head: Arc<dyn ChainHead>,
        submitter: TxSubmitter,
        signer: Arc<S>,
        resolver: &CompatibilityResolver,
        config: TxConfig,
    ) -> Self {
        let (pallet, name) = (call.pallet.clone(), call.name.clone());
        let compatibility = resolver.helper(call.checksum.clone(), move |runtime| {
            runtime.call_checksum(&pallet, &name).cloned()
        });

        Self {
            inner: Arc::new(EntryInner {
                call,
                asset,
                compatibility,
                chain_head,
                submitter,
                signer,
                config,
            }),
        }
    }

    /// Pallet of the call.
    pub fn pallet(&self) -> &str {
        &self.inner.call.pallet
    }

    /// Name of the call.
    pub fn name(&self) -> &str {
        &self.inner.call.name
    }

    /// Returns `true` iff `runtime` lays the call out the way the descriptor expects.
    pub fn is_compatible(&self, runtime: &RuntimeContext) -> bool {
        self.inner.compatibility.is_compatible(runtime)
    }

    /// A transaction calling `pallet.name` with `args`.
    pub fn call(&self, args: C::Value) -> Transaction<C, S, A> {
        Transaction {
            entry: self.clone(),
            args: Arc::new(args),
        }
    }

    fn incompatible(&self) -> Error {
        IncompatibleRuntimeSnafu {
            pallet: self.pallet(),
            name: self.name(),
        }
        .build()
    }

    /// Waits for the latest runtime this entry is compatible with.
    async fn runtime(&self, cancel: &CancellationToken) -> Result<Arc<RuntimeContext>> {
        let compatibility = &self.inner.compatibility;
        cancellable(
            cancel,
            compatibility.compatible_runtime(cancel, || self.incompatible()),
        )
        .await?
    }

    /// Replaces a typed asset hint by its encoding.
    fn resolve_hints(
        &self,
        runtime: &RuntimeContext,
        hints: TxHints<A::Value>,
    ) -> Result<TxHints<Vec<u8>>> {
        match hints {
            TxHints::Native { tip, mortality } => Ok(TxHints::Native { tip, mortality }),
            TxHints::WithAsset {
                tip,
                mortality,
                asset,
            } => {
                let expected = self.inner.asset.checksum.as_ref();
                if expected.is_none() || expected != runtime.asset_checksum() {
                    return IncompatibleRuntimeAssetSnafu.fail();
                }
                Ok(TxHints::WithAsset {
                    tip,
                    mortality,
                    asset: self.inner.asset.codec.encode(&asset),
                })
            }
        }
    }
}

/// One call with its arguments, ready to be encoded or signed.
pub struct Transaction<C: Codec, S, A = Unit> {
    entry: TxEntry<C, S, A>,
    args: Arc<C::Value>,
}

impl<C: Codec, S, A> Clone for Transaction<C, S, A> {
    fn clone(&self) -> Self {
        Self {
            entry: self.entry.clone(),
            args: self.args.clone(),
        }
    }
}

impl<C: Codec, S, A> fmt::Debug for Transaction<C, S, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Transaction")
            .field("entry", &self.entry)
            .finish_non_exhaustive()
    }
}

impl<C, S, A> Transaction<C, S, A>
where
    C: Codec,
    S: TxSigner,
    A: Codec,
{
    /// The call bytes for `runtime`: the call location followed by the encoded arguments.
    ///
    /// # Returns
    /// * `Ok(Vec<u8>)` - The call bytes.
    /// * `Err(Error::IncompatibleRuntime)` - If `runtime` is not compatible with the entry.
    pub fn encoded_data_with(&self, runtime: &RuntimeContext) -> Result<Vec<u8>> {
        let entry = &self.entry;
        if !entry.is_compatible(runtime) {
            return Err(entry.incompatible());
        }
        let location = runtime
            .call_location(entry.pallet(), entry.name())
            .with_context(|| IncompatibleRuntimeSnafu {
                pallet: entry.pallet(),
                name: entry.name(),
            })?;

        let mut data = location.to_vec();
        entry.inner.call.codec.encode_to(&self.args, &mut data);
        Ok(data)
    }

    /// The call bytes for the latest compatible runtime.
    pub async fn encoded_data(&self) -> Result<Vec<u8>> {
        let cancel = self.entry.inner.submitter.child_token();
        let runtime = self.entry.runtime(&cancel).await?;
        self.encoded_data_with(&runtime)
    }

    /// Signs the call as `from`, against the latest finalized block.
    ///
    /// The compatible runtime and the finalized block are resolved concurrently. Returns the
    /// hex-encoded signed extrinsic.
    pub async fn sign(&self, from: &S::Identity, hints: TxHints<A::Value>) -> Result<String> {
        let inner = &self.entry.inner;
        let cancel = inner.submitter.child_token();

        let finalized = async {
            let block = cancellable(&cancel, inner.chain_head.finalized())
                .await?
                .context(ChainHeadSnafu {
                    operation: "finalized",
                })?;
            Ok::<_, Error>(block)
        };
        let (runtime, finalized) = tokio::try_join!(self.entry.runtime(&cancel), finalized)?;

        let call_data = self.encoded_data_with(&runtime)?;
        let hints = self.entry.resolve_hints(&runtime, hints)?;
        let signed = cancellable(
            &cancel,
            inner.signer.sign(from, &call_data, &finalized, hints),
        )
        .await?
        .context(SigningSnafu)?;

        info!(
            "✍️ Signed {}.{} against block #{} of runtime {}",
            self.entry.pallet(),
            self.entry.name(),
            finalized.number,
            runtime.spec_version()
        );
        Ok(to_hex(&signed))
    }

    /// Signs the call, submits it and waits for its finalized outcome.
    pub async fn sign_and_submit(
        &self,
        from: &S::Identity,
        hints: TxHints<A::Value>,
    ) -> Result<TxFinalizedPayload> {
        let tx = self.sign(from, hints).await?;
        self.entry.inner.submitter.submit(tx).await
    }

    /// Estimates the fees of the call against the latest compatible runtime.
    pub async fn estimated_fees(&self) -> Result<u128> {
        let call_data = self.encoded_data().await?;
        let inner = &self.entry.inner;
        estimate_fees(inner.chain_head.as_ref(), &call_data, &inner.config).await
    }

    /// The `{pallet, name, args}` view of the call.
    pub fn decoded_call(&self) -> DecodedCall<C::Value> {
        DecodedCall {
            pallet: self.entry.pallet().to_string(),
            name: self.entry.name().to_string(),
            args: self.args.clone(),
        }
    }
}

impl<C, S, A> Transaction<C, S, A>
where
    C: Codec + Send + Sync + 'static,
    C::Value: Send + Sync,
    S: TxSigner + 'static,
    S::Identity: 'static,
    A: Codec + Send + Sync + 'static,
    A::Value: Send + 'static,
{
    /// Signs the call, submits it and streams its lifecycle.
    ///
    /// The stream yields `Signed` with the hex-encoded extrinsic, then the submission events of
    /// [`TxSubmitter::submit_and_watch`]. A signing failure is yielded as the only item.
    pub fn sign_submit_and_watch(
        &self,
        from: S::Identity,
        hints: TxHints<A::Value>,
    ) -> TxEventStream {
        let transaction = self.clone();
        let submitter = self.entry.inner.submitter.clone();

        stream::once(async move { transaction.sign(&from, hints).await })
            .flat_map(move |signed| match signed {
                Ok(tx) => {
                    let events = submitter
                        .submit_and_watch(tx.clone())
                        .map(|event| event.map(TxEvent::from));
                    stream::once(future::ready(Ok(TxEvent::Signed { tx })))
                        .chain(events)
                        .boxed()
                }
                Err(err) => stream::once(future::ready(Err(err))).boxed(),
            })
            .boxed()
    }
}
