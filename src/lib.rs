pub mod config;
pub mod history;
pub mod ledger;
pub mod metrics;
pub mod types;

pub use history::{aggregate, aggregate_local, HistoryView, PeriodGroup};
pub use ledger::{Ledger, LedgerCommand, LedgerError, LedgerState, LedgerStore, SharedLedger};
pub use types::{
    FinalStatus, FinalizedTransaction, TransactionKey, TransactionReceipt, TransactionRecord,
    TransactionRequest, TransactionStatus, TransactionTypeInfo,
};
