use std::time::Duration;

use clap::Args;
use serde::Deserialize;

/// Approximate number of bytes the signature, address and signed extensions add to a call.
pub const DEFAULT_FEE_OVERHEAD_BYTES: u32 = 103;

/// Runtime API queried for fee details.
pub const DEFAULT_FEE_DETAILS_API: &str = "TransactionPaymentCallApi_query_call_fee_details";

/// Pallet emitting the dispatch success event on FRAME chains.
pub const DEFAULT_SUCCESS_PALLET: &str = "System";

/// Variant of the dispatch success event on FRAME chains.
pub const DEFAULT_SUCCESS_VARIANT: &str = "ExtrinsicSuccess";

/// Settings for transaction entries and the submission pipeline.
///
/// Flatten it into a host binary's CLI with `#[command(flatten)]`, or load it from JSON with
/// [`TxConfig::from_json`]; missing JSON fields take their defaults.
#[derive(Args, Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TxConfig {
    /// Bytes added to the call length when estimating fees, approximating the signed envelope.
    #[arg(long, env = "TX_FEE_OVERHEAD_BYTES", default_value_t = DEFAULT_FEE_OVERHEAD_BYTES)]
    pub fee_overhead_bytes: u32,

    /// Runtime API used for fee estimation
    #[arg(long, env = "TX_FEE_DETAILS_API", default_value = DEFAULT_FEE_DETAILS_API)]
    pub fee_details_api: String,

    /// Pallet of the event marking a successful dispatch
    #[arg(long, env = "TX_SUCCESS_PALLET", default_value = DEFAULT_SUCCESS_PALLET)]
    pub success_pallet: String,

    /// Variant of the event marking a successful dispatch
    #[arg(long, env = "TX_SUCCESS_VARIANT", default_value = DEFAULT_SUCCESS_VARIANT)]
    pub success_variant: String,

    /// Seconds to wait for a compatible runtime before failing with an incompatibility error
    #[arg(long, env = "TX_RUNTIME_WAIT_SECS", default_value_t = 30)]
    pub runtime_wait_secs: u64,
}

impl Default for TxConfig {
    fn default() -> Self {
        Self {
            fee_overhead_bytes: DEFAULT_FEE_OVERHEAD_BYTES,
            fee_details_api: DEFAULT_FEE_DETAILS_API.to_string(),
            success_pallet: DEFAULT_SUCCESS_PALLET.to_string(),
            success_variant: DEFAULT_SUCCESS_VARIANT.to_string(),
            runtime_wait_secs: 30,
        }
    }
}

impl TxConfig {
    /// Parses a JSON config document.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// How long to wait for a compatible runtime.
    pub fn runtime_wait(&self) -> Duration {
        Duration::from_secs(self.runtime_wait_secs)
    }
}
