//! Shared types for the aggregation pipeline.

use serde::{Deserialize, Serialize};

use crate::error::SupplyError;

// ─── BlockFlags ───────────────────────────────────────────────────────────────

/// The consensus variant of a block, taken from its `flags` discriminator.
///
/// Only two variants exist upstream. Anything else is a hard
/// [`SupplyError::UnexpectedBlockType`] — never a silent default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BlockFlags {
    ProofOfWork,
    ProofOfStake,
}

impl BlockFlags {
    /// Index of the reward transaction within the block's `txids` list:
    /// the coinbase for proof-of-work, the coinstake for proof-of-stake.
    pub fn reward_tx_index(self) -> usize {
        match self {
            Self::ProofOfWork => 0,
            Self::ProofOfStake => 1,
        }
    }
}

// ─── BlockOverview ────────────────────────────────────────────────────────────

/// A minimal view of a block — enough to locate its reward transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockOverview {
    /// Block height.
    pub height: u64,
    /// Block hash.
    pub hash: String,
    /// Raw `flags` discriminator as reported by the node.
    pub flags: String,
    /// Ordered transaction identifiers.
    pub txids: Vec<String>,
}

impl BlockOverview {
    /// Parse the raw `flags` discriminator.
    pub fn parse_flags(&self) -> Result<BlockFlags, SupplyError> {
        match self.flags.as_str() {
            "proof-of-work" => Ok(BlockFlags::ProofOfWork),
            "proof-of-stake" => Ok(BlockFlags::ProofOfStake),
            other => Err(SupplyError::UnexpectedBlockType {
                height: self.height,
                flags: other.to_string(),
            }),
        }
    }

    /// Returns the identifier of this block's reward transaction.
    pub fn reward_txid(&self, flags: BlockFlags) -> Result<&str, SupplyError> {
        let index = flags.reward_tx_index();
        self.txids
            .get(index)
            .map(String::as_str)
            .ok_or(SupplyError::MissingRewardTx {
                height: self.height,
                index,
            })
    }
}

// ─── RewardTransaction ────────────────────────────────────────────────────────

/// A transaction input, reduced to the value it moves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxInput {
    /// Value in base units (1 coin = 1e8).
    pub value_sat: u64,
}

/// A transaction output, reduced to the value it carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxOutput {
    /// Value in base units (1 coin = 1e8).
    pub value_sat: u64,
}

/// The reward transaction of a block (coinbase or coinstake).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardTransaction {
    /// Transaction identifier.
    pub txid: String,
    /// Inputs; empty for a coinbase, populated for a coinstake.
    pub inputs: Vec<TxInput>,
    /// Outputs.
    pub outputs: Vec<TxOutput>,
}

impl RewardTransaction {
    /// Net coin-value change attributed to this reward transaction.
    ///
    /// Proof-of-work: the coinbase creates every output from nothing, so
    /// the delta is the output sum. Proof-of-stake: the coinstake also
    /// spends the staked inputs, so the delta is outputs minus inputs
    /// (signed — a coinstake can burn value).
    pub fn delta(&self, flags: BlockFlags) -> i128 {
        let out: i128 = self.outputs.iter().map(|o| i128::from(o.value_sat)).sum();
        match flags {
            BlockFlags::ProofOfWork => out,
            BlockFlags::ProofOfStake => {
                let inp: i128 = self.inputs.iter().map(|i| i128::from(i.value_sat)).sum();
                out - inp
            }
        }
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────────
