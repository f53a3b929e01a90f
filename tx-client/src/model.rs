use serde::{Deserialize, Serialize};

/// A block as reported by the chain head.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockInfo {
    /// Hex-encoded block hash.
    pub hash: String,
    /// Block number.
    pub number: u32,
    /// Hex-encoded hash of the parent block.
    pub parent: String,
}

/// Position of a transaction within a block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TxBlock {
    /// Hex-encoded block hash.
    pub hash: String,
    /// Index of the extrinsic within the block.
    pub index: u32,
}

/// The phase of block execution an event was emitted in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value")]
pub enum Phase {
    /// Emitted while applying the extrinsic at this index.
    ApplyExtrinsic(u32),
    /// Emitted while finalizing the block.
    Finalization,
    /// Emitted while initializing the block.
    Initialization,
}

/// A chain event, identified by pallet and variant, with its payload left encoded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainEvent {
    /// Name of the pallet that emitted the event.
    pub pallet: String,
    /// Name of the event variant.
    pub variant: String,
    /// SCALE-encoded event fields.
    pub data: Vec<u8>,
}

impl ChainEvent {
    /// Returns `true` if this event is `pallet.variant`.
    pub fn is(&self, pallet: &str, variant: &str) -> bool {
        self.pallet == pallet && self.variant == variant
    }
}

/// An event as stored in the `System.Events` list of a block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemEvent {
    /// When the event was emitted.
    pub phase: Phase,
    /// The event itself.
    pub event: ChainEvent,
    /// Hex-encoded topics.
    pub topics: Vec<String>,
}

/// An inclusion update from the chain head's transaction tracker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "block", rename_all = "camelCase")]
pub enum TrackedTx {
    /// The transaction is in a best-chain block that may still be reorganized away.
    BestChainBlockIncluded(TxBlock),
    /// The transaction is in a finalized block.
    Finalized(TxBlock),
}

/// Outcome of a finalized transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TxFinalizedPayload {
    /// `true` iff the last event attributed to the extrinsic is the dispatch-success event.
    pub ok: bool,
    /// Events attributed to the extrinsic, in block order.
    pub events: Vec<ChainEvent>,
    /// Where the transaction was finalized.
    pub block: TxBlock,
}

/// Lifecycle events emitted by the submission pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum TxBroadcastEvent {
    /// The transaction passed validation and is being broadcast.
    Broadcasted,
    /// The transaction is in a best-chain block. May repeat across reorganizations.
    BestChainBlockIncluded {
        /// Block and index of the inclusion.
        block: TxBlock,
    },
    /// The transaction is finalized. Always the last event.
    Finalized(TxFinalizedPayload),
}

/// Lifecycle events of a transaction that is signed, submitted and watched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum TxEvent {
    /// The transaction was signed.
    Signed {
        /// Hex-encoded signed extrinsic.
        tx: String,
    },
    /// See [`TxBroadcastEvent::Broadcasted`].
    Broadcasted,
    /// See [`TxBroadcastEvent::BestChainBlockIncluded`].
    BestChainBlockIncluded {
        /// Block and index of the inclusion.
        block: TxBlock,
    },
    /// See [`TxBroadcastEvent::Finalized`].
    Finalized(TxFinalizedPayload),
}

impl From<TxBroadcastEvent> for TxEvent {
    fn from(event: TxBroadcastEvent) -> Self {
        match event {
            TxBroadcastEvent::Broadcasted => TxEvent::Broadcasted,
            TxBroadcastEvent::BestChainBlockIncluded { block } => {
                TxEvent::BestChainBlockIncluded { block }
            }
            TxBroadcastEvent::Finalized(payload) => TxEvent::Finalized(payload),
        }
    }
}

/// Mortality requested for a transaction.
///
/// Serialized as `{ "mortal": false }` or `{ "mortal": true, "period": 64 }`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "MortalityRepr", try_from = "MortalityRepr")]
pub enum Mortality {
    /// Valid forever.
    Immortal,
    /// Valid for `period` blocks after the block it was signed against.
    Mortal {
        /// Lifetime in blocks.
        period: u64,
    },
}

/// Wire shape of [`Mortality`].
#[derive(Serialize, Deserialize)]
struct MortalityRepr {
    /// Whether the transaction expires.
    mortal: bool,
    /// Lifetime in blocks, required when `mortal` is set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    period: Option<u64>,
}

impl From<Mortality> for MortalityRepr {
    fn from(mortality: Mortality) -> Self {
        match mortality {
            Mortality::Immortal => MortalityRepr {
                mortal: false,
                period: None,
            },
            Mortality::Mortal { period } => MortalityRepr {
                mortal: true,
                period: Some(period),
            },
        }
    }
}

impl TryFrom<MortalityRepr> for Mortality {
    type Error = String;

    fn try_from(repr: MortalityRepr) -> Result<Self, Self::Error> {
        match (repr.mortal, repr.period) {
            (false, _) => Ok(Mortality::Immortal),
            (true, Some(period)) => Ok(Mortality::Mortal { period }),
            (true, None) => Err("a mortal transaction needs a period".to_string()),
        }
    }
}

/// Signed-extension hints handed to the signer.
///
/// `A` is the fee asset: the caller supplies a typed asset value, and the entry resolves it to
/// its encoded bytes (`TxHints<Vec<u8>>`) before the signer sees it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TxHints<A> {
    /// Fees are paid in the native token.
    Native {
        /// Optional tip.
        tip: Option<u128>,
        /// Optional mortality, the signer's default when absent.
        mortality: Option<Mortality>,
    },
    /// Fees are paid in `asset`.
    WithAsset {
        /// Optional tip.
        tip: Option<u128>,
        /// Optional mortality, the signer's default when absent.
        mortality: Option<Mortality>,
        /// The asset fees are paid in.
        asset: A,
    },
}

impl<A> Default for TxHints<A> {
    fn default() -> Self {
        TxHints::Native {
            tip: None,
            mortality: None,
        }
    }
}

impl<A> TxHints<A> {
    /// The requested tip.
    pub fn tip(&self) -> Option<u128> {
        match self {
            TxHints::Native { tip, .. } | TxHints::WithAsset { tip, .. } => *tip,
        }
    }

    /// The requested mortality.
    pub fn mortality(&self) -> Option<Mortality> {
        match self {
            TxHints::Native { mortality, .. } | TxHints::WithAsset { mortality, .. } => *mortality,
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn block() -> TxBlock {
        TxBlock {
            hash: "0xb1".to_string(),
            index: 2,
        }
    }

    #[test]
    fn lifecycle_events_serialize_with_a_type_tag() {
        let event = TxEvent::from(TxBroadcastEvent::BestChainBlockIncluded { block: block() });
        assert_eq!(
            serde_json::to_value(&event).unwrap(),
            json!({ "type": "bestChainBlockIncluded", "block": { "hash": "0xb1", "index": 2 } })
        );

        let event = TxEvent::from(TxBroadcastEvent::Finalized(TxFinalizedPayload {
            ok: true,
            events: vec![],
            block: block(),
        }));
        assert_eq!(
            serde_json::to_value(&event).unwrap(),
            json!({ "type": "finalized", "ok": true, "events": [], "block": { "hash": "0xb1", "index": 2 } })
        );
    }

    #[test]
    fn we_can_parse_tracking_updates() {
        let update: TrackedTx = serde_json::from_value(
            json!({ "type": "finalized", "block": { "hash": "0xb1", "index": 2 } }),
        )
        .unwrap();
        assert_eq!(update, TrackedTx::Finalized(block()));

        let phase: Phase =
            serde_json::from_value(json!({ "type": "ApplyExtrinsic", "value": 2 })).unwrap();
        assert_eq!(phase, Phase::ApplyExtrinsic(2));
    }

    #[test]
    fn mortality_serializes_with_a_boolean_flag() {
        let immortal = serde_json::to_value(Mortality::Immortal).unwrap();
        assert_eq!(immortal, json!({ "mortal": false }));
        assert_eq!(
            serde_json::from_value::<Mortality>(immortal).unwrap(),
            Mortality::Immortal
        );

        let mortal = serde_json::to_value(Mortality::Mortal { period: 64 }).unwrap();
        assert_eq!(mortal, json!({ "mortal": true, "period": 64 }));
        assert_eq!(
            serde_json::from_value::<Mortality>(mortal).unwrap(),
            Mortality::Mortal { period: 64 }
        );
    }

    #[test]
    fn we_cannot_parse_a_mortal_transaction_without_a_period() {
        let result = serde_json::from_value::<Mortality>(json!({ "mortal": true }));
        assert!(result.unwrap_err().to_string().contains("needs a period"));
    }

    #[test]
    fn hints_default_to_native_without_tip_or_mortality() {
        let hints = TxHints::<u32>::default();
        assert_eq!(hints.tip(), None);
        assert_eq!(hints.mortality(), None);

        let hints = TxHints::WithAsset {
            tip: Some(3),
            mortality: Some(Mortality::Immortal),
            asset: 1u32,
        };
        assert_eq!(hints.tip(), Some(3));
        assert_eq!(hints.mortality(), Some(Mortality::Immortal));
    }
}
