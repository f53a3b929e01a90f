//! # Runtime compatibility
//!
//! Typed descriptors are generated against one runtime version. Before a call is built, the
//! entry checks that the node's current runtime still lays the call out the way the descriptor
//! expects, by comparing structural checksums.
//!
//! - [`RuntimeContext`]: call locations and checksums of one runtime version.
//! - [`RuntimeProvider`]: the latest runtime, shared through a `watch` channel so any number of
//!   entries can follow upgrades concurrently.
//! - [`CompatibilityResolver`] / [`CompatibilityHelper`]: the per-entry compatibility predicate
//!   and the wait for a compatible runtime.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use log::{debug, warn};
use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

/// Structural fingerprint of a call's or type's layout.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Checksum(String);

impl Checksum {
    /// Wraps a checksum produced by the descriptor generator or the runtime.
    pub fn new(checksum: impl Into<String>) -> Self {
        Self(checksum.into())
    }
}

impl From<&str> for Checksum {
    fn from(checksum: &str) -> Self {
        Self::new(checksum)
    }
}

impl fmt::Display for Checksum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Where a call lives in a runtime and what it looks like.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallLayout {
    /// Call prefix: pallet index followed by call index.
    pub location: Vec<u8>,
    /// Checksum of the call's argument layout.
    pub checksum: Checksum,
}

/// Layout of one runtime version, as far as transaction building needs it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeContext {
    spec_version: u32,
    calls: HashMap<String, HashMap<String, CallLayout>>,
    asset_checksum: Option<Checksum>,
}

impl RuntimeContext {
    /// Starts building the context of runtime `spec_version`.
    pub fn builder(spec_version: u32) -> RuntimeContextBuilder {
        RuntimeContextBuilder {
            context: RuntimeContext {
                spec_version,
                calls: HashMap::new(),
                asset_checksum: None,
            },
        }
    }

    /// The runtime's spec version.
    pub fn spec_version(&self) -> u32 {
        self.spec_version
    }

    /// Layout of `pallet.name`, if the runtime has such a call.
    pub fn call(&self, pallet: &str, name: &str) -> Option<&CallLayout> {
        self.calls.get(pallet)?.get(name)
    }

    /// Checksum of `pallet.name` in this runtime.
    pub fn call_checksum(&self, pallet: &str, name: &str) -> Option<&Checksum> {
        self.call(pallet, name).map(|layout| &layout.checksum)
    }

    /// Call prefix of `pallet.name` in this runtime.
    pub fn call_location(&self, pallet: &str, name: &str) -> Option<&[u8]> {
        self.call(pallet, name).map(|layout| layout.location.as_slice())
    }

    /// Checksum of the asset type the runtime accepts for fee payment, if any.
    pub fn asset_checksum(&self) -> Option<&Checksum> {
        self.asset_checksum.as_ref()
    }
}

/// Builder for [`RuntimeContext`].
#[derive(Debug)]
pub struct RuntimeContextBuilder {
    context: RuntimeContext,
}

impl RuntimeContextBuilder {
    /// Registers the call `pallet.name`.
    pub fn call(
        mut self,
        pallet: &str,
        name: &str,
        location: impl Into<Vec<u8>>,
        checksum: impl Into<Checksum>,
    ) -> Self {
        self.context
            .calls
            .entry(pallet.to_string())
            .or_default()
            .insert(
                name.to_string(),
                CallLayout {
                    location: location.into(),
                    checksum: checksum.into(),
                },
            );
        self
    }

    /// Sets the checksum of the fee-payment asset type.
    pub fn asset_checksum(mut self, checksum: impl Into<Checksum>) -> Self {
        self.context.asset_checksum = Some(checksum.into());
        self
    }

    /// Finishes the context.
    pub fn build(self) -> RuntimeContext {
        self.context
    }
}

/// Publishing half of a [`RuntimeProvider`], owned by whoever follows runtime upgrades.
pub type RuntimePublisher = watch::Sender<Option<Arc<RuntimeContext>>>;

/// The latest runtime of the chain, `None` while it is still loading.
#[derive(Debug, Clone)]
pub struct RuntimeProvider {
    rx: watch::Receiver<Option<Arc<RuntimeContext>>>,
}

impl RuntimeProvider {
    /// Creates a provider with no runtime loaded yet, and the sender that publishes runtimes.
    pub fn channel() -> (RuntimePublisher, Self) {
        let (tx, rx) = watch::channel(None);
        (tx, Self { rx })
    }

    /// The runtime currently published.
    pub fn current(&self) -> Option<Arc<RuntimeContext>> {
        self.rx.borrow().clone()
    }

    fn subscribe(&self) -> watch::Receiver<Option<Arc<RuntimeContext>>> {
        self.rx.clone()
    }
}

/// Reads a checksum for one entry out of a runtime.
type ChecksumFn = dyn Fn(&RuntimeContext) -> Option<Checksum> + Send + Sync;

/// Hands out [`CompatibilityHelper`]s bound to the shared runtime stream.
#[derive(Debug, Clone)]
pub struct CompatibilityResolver {
    runtimes: RuntimeProvider,
    wait: Duration,
}

impl CompatibilityResolver {
    /// Creates a resolver that waits at most `wait` for a compatible runtime.
    pub fn new(runtimes: RuntimeProvider, wait: Duration) -> Self {
        Self { runtimes, wait }
    }

    /// Builds the compatibility checks for one entry.
    ///
    /// `expected` is the checksum captured when the entry is built; `checksum_of` computes the
    /// same checksum from a candidate runtime.
    pub fn helper<F>(&self, expected: Checksum, checksum_of: F) -> CompatibilityHelper
    where
        F: Fn(&RuntimeContext) -> Option<Checksum> + Send + Sync + 'static,
    {
        CompatibilityHelper {
            expected,
            checksum_of: Arc::new(checksum_of),
            runtimes: self.runtimes.clone(),
            wait: self.wait,
        }
    }
}

/// Compatibility checks for one entry.
#[derive(Clone)]
pub struct CompatibilityHelper {
    expected: Checksum,
    checksum_of: Arc<ChecksumFn>,
    runtimes: RuntimeProvider,
    wait: Duration,
}

impl fmt::Debug for CompatibilityHelper {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompatibilityHelper")
            .field("expected", &self.expected)
            .field("wait", &self.wait)
            .finish_non_exhaustive()
    }
}

impl CompatibilityHelper {
    /// The checksum the entry was built against.
    pub fn expected(&self) -> &Checksum {
        &self.expected
    }

    /// Returns `true` iff `runtime` computes the expected checksum for this entry.
    pub fn is_compatible(&self, runtime: &RuntimeContext) -> bool {
        (self.checksum_of)(runtime).as_ref() == Some(&self.expected)
    }

    /// Waits for the latest runtime that passes [`Self::is_compatible`].
    ///
    /// Incompatible runtimes are skipped. `on_error` builds the error returned when no compatible
    /// runtime shows up before `cancel` fires, the wait times out, or the runtime source closes.
    pub async fn compatible_runtime<E>(
        &self,
        cancel: &CancellationToken,
        on_error: impl FnOnce() -> E,
    ) -> Result<Arc<RuntimeContext>, E> {
        let mut rx = self.runtimes.subscribe();
        let deadline = tokio::time::sleep(self.wait);
        tokio::pin!(deadline);

        loop {
            let current = rx.borrow_and_update().clone();
            match current {
                Some(runtime) if self.is_compatible(&runtime) => return Ok(runtime),
                Some(runtime) => warn!(
                    "⚠️ Runtime {} is not compatible with checksum {}, waiting for an upgrade",
                    runtime.spec_version(),
                    self.expected
                ),
                None => debug!("Waiting for the runtime to load"),
            }

            tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(on_error()),
                _ = &mut deadline => return Err(on_error()),
                changed = rx.changed() => {
                    if changed.is_err() {
                        return Err(on_error());
                    }
                }
            }
        }
    }
}
