//! Descriptor tables.
//!
//! Descriptors are produced offline from chain metadata and loaded before the engine starts.
//! The engine treats them as plain `(checksum, name, codec)` data.

use scale_combinators::Unit;

use crate::compatibility::Checksum;

/// Describes one call of a pallet.
#[derive(Debug, Clone)]
pub struct CallDescriptor<C> {
    /// Pallet of the call.
    pub pallet: String,
    /// Name of the call.
    pub name: String,
    /// Checksum of the call layout the codec was generated for.
    pub checksum: Checksum,
    /// Codec of the call arguments.
    pub codec: C,
}

/// Describes the asset type fees may be paid in.
#[derive(Debug, Clone)]
pub struct AssetDescriptor<A> {
    /// Checksum of the asset layout the codec was generated for, `None` if the chain has no
    /// fee-asset extension.
    pub checksum: Option<Checksum>,
    /// Codec of the asset value.
    pub codec: A,
}

impl<A> AssetDescriptor<A> {
    /// An asset type with checksum `checksum`, encoded with `codec`.
    pub fn new(checksum: impl Into<Checksum>, codec: A) -> Self {
        Self {
            checksum: Some(checksum.into()),
            codec,
        }
    }
}

impl AssetDescriptor<Unit> {
    /// For chains where fees can only be paid in the native token.
    pub fn none() -> Self {
        Self {
            checksum: None,
            codec: Unit,
        }
    }
}

/// Creates the descriptors of one pallet.
#[derive(Debug, Clone)]
pub struct PalletDescriptors {
    pallet: String,
}

impl PalletDescriptors {
    /// Descriptors for `pallet`.
    pub fn new(pallet: impl Into<String>) -> Self {
        Self {
            pallet: pallet.into(),
        }
    }

    /// The pallet name.
    pub fn pallet(&self) -> &str {
        &self.pallet
    }

    /// Describes the call `name` of this pallet.
    pub fn tx<C>(&self, checksum: impl Into<Checksum>, name: &str, codec: C) -> CallDescriptor<C> {
        CallDescriptor {
            pallet: self.pallet.clone(),
            name: name.to_string(),
            checksum: checksum.into(),
            codec,
        }
    }
}
