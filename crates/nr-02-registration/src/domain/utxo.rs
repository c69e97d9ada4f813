//! # UTXO Selector
//!
//! First-fit selection over the order the unspent output index returns.
//! No change minimization and no multi-input aggregation.

use bitcoin::{Amount, OutPoint, Txid};
use serde::{Deserialize, Serialize};

/// Ledger value controlled by the identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpendableOutput {
    pub txid: Txid,
    pub vout: u32,
    #[serde(with = "bitcoin::amount::serde::as_sat")]
    pub amount: Amount,
    pub address: String,
}

impl SpendableOutput {
    pub fn outpoint(&self) -> OutPoint {
        OutPoint {
            txid: self.txid,
            vout: self.vout,
        }
    }
}

/// First output worth at least `min_amount`.
pub fn select_utxo(outputs: &[SpendableOutput], min_amount: Amount) -> Option<&SpendableOutput> {
    outputs.iter().find(|output| output.amount >= min_amount)
}
