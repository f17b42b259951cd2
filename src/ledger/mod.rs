pub mod shared;
pub mod state;
pub mod store;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::transaction::{
    Address, ChainId, FinalizedTransaction, TransactionId, TransactionKey, TransactionRecord,
    TransactionRequest,
};

pub use shared::SharedLedger;
pub use state::LedgerState;
pub use store::{LedgerStore, StoreError};

pub type Ledger = LedgerState;

/// Ways a command can be rejected. Each one means the caller's view of the
/// ledger is out of sync with the ledger itself; nothing is mutated.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    #[error("Duplicate transaction: {0} is already tracked")]
    DuplicateTransaction(TransactionKey),
    #[error("Unknown transaction: {0} is not tracked")]
    UnknownTransaction(TransactionKey),
    #[error("Invalid transaction type: only fiat purchases can be upserted, got {0}")]
    InvalidTransactionType(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum LedgerCommand {
    Add(TransactionRecord),
    Update(TransactionRecord),
    Finalize(FinalizedTransaction),
    Cancel {
        owner: Address,
        chain_id: ChainId,
        id: TransactionId,
        cancel_request: TransactionRequest,
    },
    Replace {
        owner: Address,
        chain_id: ChainId,
        id: TransactionId,
        new_tx_params: TransactionRequest,
    },
    UpsertFiatOnRamp(TransactionRecord),
    Reset,
}

impl LedgerCommand {
    pub fn name(&self) -> &'static str {
        match self {
            LedgerCommand::Add(_) => "add",
            LedgerCommand::Update(_) => "update",
            LedgerCommand::Finalize(_) => "finalize",
            LedgerCommand::Cancel { .. } => "cancel",
            LedgerCommand::Replace { .. } => "replace",
            LedgerCommand::UpsertFiatOnRamp(_) => "upsert-fiat-onramp",
            LedgerCommand::Reset => "reset",
        }
    }
}
