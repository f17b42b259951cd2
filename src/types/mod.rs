pub mod transaction;

pub use transaction::{
    Address, ChainId, FinalStatus, FinalizedTransaction, TransactionId, TransactionKey,
    TransactionReceipt, TransactionRecord, TransactionRequest, TransactionStatus,
    TransactionTypeInfo,
};
