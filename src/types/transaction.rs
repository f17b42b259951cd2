use serde::{Deserialize, Serialize};
use std::fmt;

pub type Address = String;
pub type ChainId = u64;
pub type TransactionId = String;

/// Position of a record inside the ledger: `owner -> chain -> id`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TransactionKey {
    pub owner: Address,
    pub chain_id: ChainId,
    pub id: TransactionId,
}

impl TransactionKey {
    pub fn new(owner: impl Into<Address>, chain_id: ChainId, id: impl Into<TransactionId>) -> Self {
        Self {
            owner: owner.into(),
            chain_id,
            id: id.into(),
        }
    }
}

impl fmt::Display for TransactionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.owner, self.chain_id, self.id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransactionStatus {
    Pending,
    Cancelling,
    Replacing,
    Success,
    Failed,
    Unknown,
}

impl TransactionStatus {
    /// Still in flight: shown in the pending section of the history.
    pub fn is_pending(&self) -> bool {
        matches!(
            self,
            TransactionStatus::Pending | TransactionStatus::Cancelling | TransactionStatus::Replacing
        )
    }
}

impl fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TransactionStatus::Pending => "pending",
            TransactionStatus::Cancelling => "cancelling",
            TransactionStatus::Replacing => "replacing",
            TransactionStatus::Success => "success",
            TransactionStatus::Failed => "failed",
            TransactionStatus::Unknown => "unknown",
        };
        f.write_str(name)
    }
}

/// Statuses a transaction can be finalized with. Receipts only ever
/// arrive together with one of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FinalStatus {
    Success,
    Failed,
}

impl From<FinalStatus> for TransactionStatus {
    fn from(status: FinalStatus) -> Self {
        match status {
            FinalStatus::Success => TransactionStatus::Success,
            FinalStatus::Failed => TransactionStatus::Failed,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum TransactionTypeInfo {
    Approve {
        token_address: Address,
        spender: Address,
    },
    Send {
        token_address: Address,
        recipient: Address,
        amount: String,
    },
    Receive {
        token_address: Address,
        sender: Address,
        amount: String,
    },
    Swap {
        input_currency_id: String,
        output_currency_id: String,
        input_amount: String,
        output_amount: String,
    },
    Wrap {
        unwrapped: bool,
        amount: String,
    },
    /// Off-chain fiat on-ramp purchase tracked until the funds land on chain.
    FiatPurchase {
        explorer_url: Option<String>,
        input_currency: Option<String>,
        input_amount: Option<f64>,
        output_currency_id: Option<String>,
        output_amount: Option<String>,
        synced_with_backend: bool,
    },
    Unknown {
        to_address: Option<Address>,
    },
}

impl TransactionTypeInfo {
    pub fn is_fiat_purchase(&self) -> bool {
        matches!(self, TransactionTypeInfo::FiatPurchase { .. })
    }

    pub fn name(&self) -> &'static str {
        match self {
            TransactionTypeInfo::Approve { .. } => "approve",
            TransactionTypeInfo::Send { .. } => "send",
            TransactionTypeInfo::Receive { .. } => "receive",
            TransactionTypeInfo::Swap { .. } => "swap",
            TransactionTypeInfo::Wrap { .. } => "wrap",
            TransactionTypeInfo::FiatPurchase { .. } => "fiat-purchase",
            TransactionTypeInfo::Unknown { .. } => "unknown",
        }
    }
}

/// Parameters of a chain transaction request, as handed to the signer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionRequest {
    pub to: Option<Address>,
    pub from: Option<Address>,
    pub nonce: Option<u64>,
    pub gas_limit: Option<u64>,
    pub gas_price: Option<u64>,
    pub max_fee_per_gas: Option<u64>,
    pub max_priority_fee_per_gas: Option<u64>,
    pub value: Option<String>,
    pub data: Option<String>,
    pub chain_id: Option<ChainId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionReceipt {
    pub transaction_hash: String,
    pub block_hash: String,
    pub block_number: u64,
    pub transaction_index: u32,
    pub confirmations: u32,
    pub gas_used: u64,
    pub effective_gas_price: u64,
    pub confirmed_time: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionRecord {
    pub id: TransactionId,
    pub owner: Address,
    pub chain_id: ChainId,
    pub status: TransactionStatus,
    /// Milliseconds since the unix epoch.
    pub added_time: i64,
    pub type_info: TransactionTypeInfo,
    pub hash: Option<String>,
    pub nonce: Option<u64>,
    pub receipt: Option<TransactionReceipt>,
    pub cancel_request: Option<TransactionRequest>,
    pub replace_request: Option<TransactionRequest>,
}

impl TransactionRecord {
    pub fn new(
        owner: impl Into<Address>,
        chain_id: ChainId,
        id: impl Into<TransactionId>,
        type_info: TransactionTypeInfo,
        added_time: i64,
    ) -> Self {
        Self {
            id: id.into(),
            owner: owner.into(),
            chain_id,
            status: TransactionStatus::Pending,
            added_time,
            type_info,
            hash: None,
            nonce: None,
            receipt: None,
            cancel_request: None,
            replace_request: None,
        }
    }

    pub fn with_status(mut self, status: TransactionStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_nonce(mut self, nonce: u64) -> Self {
        self.nonce = Some(nonce);
        self
    }

    pub fn with_hash(mut self, hash: impl Into<String>) -> Self {
        self.hash = Some(hash.into());
        self
    }

    pub fn key(&self) -> TransactionKey {
        TransactionKey::new(self.owner.clone(), self.chain_id, self.id.clone())
    }
}

/// Outcome reported by whatever watches the chain for confirmation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinalizedTransaction {
    pub owner: Address,
    pub chain_id: ChainId,
    pub id: TransactionId,
    pub status: FinalStatus,
    pub receipt: Option<TransactionReceipt>,
}

impl FinalizedTransaction {
    pub fn key(&self) -> TransactionKey {
        TransactionKey::new(self.owner.clone(), self.chain_id, self.id.clone())
    }
}
