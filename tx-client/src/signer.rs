use async_trait::async_trait;

use crate::chain_head::BoxError;
use crate::model::{BlockInfo, TxHints};

/// Turns call data into a signed extrinsic.
///
/// The engine only builds the call bytes and resolves hints; key handling, nonce lookup and
/// extension encoding belong to the signer, which may itself be interactive.
#[async_trait]
pub trait TxSigner: Send + Sync {
    /// Who signs: a key handle, a wallet account, etc.
    type Identity: Send + Sync;

    /// Signs `call_data` as `from`, against the finalized block `at`.
    ///
    /// Returns the SCALE-encoded signed extrinsic.
    async fn sign(
        &self,
        from: &Self::Identity,
        call_data: &[u8],
        at: &BlockInfo,
        hints: TxHints<Vec<u8>>,
    ) -> Result<Vec<u8>, BoxError>;
}
