//! Fee estimation through the runtime's transaction-payment API.
use log::debug;
use scale_combinators::{compact_len, Codec, OptionCodec, U128, U32};
use snafu::{OptionExt, ResultExt};

use crate::chain_head::ChainHead;
use crate::config::TxConfig;
use crate::error::{
    CallTooLargeSnafu, ChainHeadSnafu, CodecSnafu, FeeCalculationUnavailableSnafu, Result,
};
use crate::utils::{from_hex, to_hex};

/// Length the signed extrinsic of `encoded_call` is expected to have.
///
/// The signed envelope is approximated by `overhead` bytes; the extrinsic is then prefixed with
/// its own compact length. Fails with `CallTooLarge` when the result does not fit a `u32`.
pub fn estimated_length(encoded_call: &[u8], overhead: u32) -> Result<u32> {
    let pre_len = (encoded_call.len() as u128).saturating_add(overhead.into());
    let len = pre_len.saturating_add(compact_len(pre_len) as u128);
    u32::try_from(len).ok().context(CallTooLargeSnafu { length: len })
}

/// Estimates the fees of submitting `encoded_call`, at the latest finalized block.
///
/// # Returns
/// * `Ok(u128)` - The sum of the base, length and weight fees, saturating.
/// * `Err(Error::FeeCalculationUnavailable)` - If the runtime could not compute the fees.
/// * `Err(Error::CallTooLarge)` - If the estimated length does not fit a `u32`.
pub async fn estimate_fees(
    chain_head: &dyn ChainHead,
    encoded_call: &[u8],
    config: &TxConfig,
) -> Result<u128> {
    let len = estimated_length(encoded_call, config.fee_overhead_bytes)?;
    let mut args = encoded_call.to_vec();
    U32.encode_to(&len, &mut args);

    let response = chain_head
        .call(None, &config.fee_details_api, &to_hex(&args))
        .await
        .context(ChainHeadSnafu {
            operation: "runtime call",
        })?;
    let details = OptionCodec((U128, U128, U128))
        .decode_bytes(&from_hex(&response)?)
        .context(CodecSnafu)?;

    let (base_fee, len_fee, weight_fee) = details.context(FeeCalculationUnavailableSnafu)?;
    debug!("Fee details for {len} bytes: base {base_fee}, length {len_fee}, weight {weight_fee}");

    Ok(base_fee.saturating_add(len_fee).saturating_add(weight_fee))
}
