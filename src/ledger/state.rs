use std::collections::{BTreeMap, HashMap};

use log::{debug, info, warn};

use crate::ledger::{LedgerCommand, LedgerError};
use crate::types::transaction::{
    Address, ChainId, FinalizedTransaction, TransactionId, TransactionKey, TransactionRecord,
    TransactionRequest, TransactionStatus,
};

type ChainTransactions = BTreeMap<ChainId, BTreeMap<TransactionId, TransactionRecord>>;

/// Every transaction tracked by the wallet, keyed `owner -> chain -> id`.
///
/// Each operation checks its precondition before touching the map, so a
/// failed call leaves the state exactly as it was. Receipts only enter
/// through `finalize_transaction`, and `added_time` never changes once a
/// record is stored.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LedgerState {
    transactions: HashMap<Address, ChainTransactions>,
}

impl LedgerState {
    pub fn new() -> Self {
        Self {
            transactions: HashMap::new(),
        }
    }

    /// Rebuilds a ledger from stored records, receipts included. Fails on
    /// the first key that appears twice.
    pub fn from_records(
        records: impl IntoIterator<Item = TransactionRecord>,
    ) -> Result<Self, LedgerError> {
        let mut state = Self::new();
        for record in records {
            let key = record.key();
            if state.get_transaction(&key).is_some() {
                return Err(LedgerError::DuplicateTransaction(key));
            }
            state.insert(record);
        }
        Ok(state)
    }

    /// A receipt on the new record is dropped; it is attached by
    /// `finalize_transaction` only.
    pub fn add_transaction(&mut self, mut transaction: TransactionRecord) -> Result<(), LedgerError> {
        let key = transaction.key();
        if self.get_transaction(&key).is_some() {
            return Err(LedgerError::DuplicateTransaction(key));
        }

        strip_receipt("addTransaction", &key, &mut transaction);
        debug!("Adding transaction {} ({})", key, transaction.type_info.name());
        self.insert(transaction);
        Ok(())
    }

    /// Replaces the stored record. `added_time` and `receipt` are kept from
    /// the stored copy.
    pub fn update_transaction(&mut self, mut transaction: TransactionRecord) -> Result<(), LedgerError> {
        let key = transaction.key();
        let stored = self.get_mut(&key)?;

        keep_added_time("updateTransaction", &key, stored, &mut transaction);
        if stored.receipt != transaction.receipt {
            warn!(
                "updateTransaction for {} tried to change the receipt, keeping the stored one",
                key
            );
            transaction.receipt = stored.receipt.clone();
        }

        debug!("Updating transaction {} to status {}", key, transaction.status);
        *stored = transaction;
        Ok(())
    }

    /// Sets the final status and attaches the receipt if one is given.
    /// Nothing else on the stored record changes.
    pub fn finalize_transaction(&mut self, finalized: FinalizedTransaction) -> Result<(), LedgerError> {
        let key = finalized.key();
        let stored = self.get_mut(&key)?;

        stored.status = finalized.status.into();
        if let Some(receipt) = finalized.receipt {
            stored.receipt = Some(receipt);
        }
        debug!("Finalized transaction {} as {}", key, stored.status);
        Ok(())
    }

    pub fn cancel_transaction(
        &mut self,
        owner: &str,
        chain_id: ChainId,
        id: &str,
        cancel_request: TransactionRequest,
    ) -> Result<(), LedgerError> {
        let key = TransactionKey::new(owner, chain_id, id);
        let stored = self.get_mut(&key)?;

        stored.status = TransactionStatus::Cancelling;
        stored.cancel_request = Some(cancel_request);
        debug!("Cancelling transaction {}", key);
        Ok(())
    }

    pub fn replace_transaction(
        &mut self,
        owner: &str,
        chain_id: ChainId,
        id: &str,
        new_tx_params: TransactionRequest,
    ) -> Result<(), LedgerError> {
        let key = TransactionKey::new(owner, chain_id, id);
        let stored = self.get_mut(&key)?;

        stored.status = TransactionStatus::Replacing;
        stored.replace_request = Some(new_tx_params);
        debug!("Replacing transaction {}", key);
        Ok(())
    }

    /// Fiat purchases share this ledger while the purchase is off chain.
    /// Once it succeeds (funds visible on chain) or is abandoned, tracking
    /// stops and the record is dropped.
    pub fn upsert_fiat_onramp_transaction(
        &mut self,
        mut transaction: TransactionRecord,
    ) -> Result<(), LedgerError> {
        if !transaction.type_info.is_fiat_purchase() {
            return Err(LedgerError::InvalidTransactionType(
                transaction.type_info.name().to_string(),
            ));
        }

        let key = transaction.key();
        match transaction.status {
            TransactionStatus::Success | TransactionStatus::Unknown => {
                if self.remove_transaction(&key).is_some() {
                    debug!("Stopped tracking fiat purchase {} ({})", key, transaction.status);
                }
            }
            TransactionStatus::Failed | TransactionStatus::Pending => {
                strip_receipt("upsertFiatOnRampTransaction", &key, &mut transaction);
                if let Ok(stored) = self.get_mut(&key) {
                    keep_added_time("upsertFiatOnRampTransaction", &key, stored, &mut transaction);
                }
                debug!("Upserting fiat purchase {} ({})", key, transaction.status);
                self.insert(transaction);
            }
            TransactionStatus::Cancelling | TransactionStatus::Replacing => {
                // fiat purchases never go through on-chain cancel/replace
                debug!("Ignoring fiat purchase {} with status {}", key, transaction.status);
            }
        }
        Ok(())
    }

    pub fn reset_transactions(&mut self) {
        info!("Resetting ledger ({} transactions dropped)", self.len());
        self.transactions.clear();
    }

    pub fn apply(&mut self, command: LedgerCommand) -> Result<(), LedgerError> {
        match command {
            LedgerCommand::Add(transaction) => self.add_transaction(transaction),
            LedgerCommand::Update(transaction) => self.update_transaction(transaction),
            LedgerCommand::Finalize(finalized) => self.finalize_transaction(finalized),
            LedgerCommand::Cancel {
                owner,
                chain_id,
                id,
                cancel_request,
            } => self.cancel_transaction(&owner, chain_id, &id, cancel_request),
            LedgerCommand::Replace {
                owner,
                chain_id,
                id,
                new_tx_params,
            } => self.replace_transaction(&owner, chain_id, &id, new_tx_params),
            LedgerCommand::UpsertFiatOnRamp(transaction) => {
                self.upsert_fiat_onramp_transaction(transaction)
            }
            LedgerCommand::Reset => {
                self.reset_transactions();
                Ok(())
            }
        }
    }

    /// Records of one owner, optionally limited to one chain. Ordered by
    /// chain then id.
    pub fn snapshot(&self, owner: &str, chain_id: Option<ChainId>) -> Vec<TransactionRecord> {
        let Some(chains) = self.transactions.get(owner) else {
            return Vec::new();
        };

        match chain_id {
            Some(chain_id) => chains
                .get(&chain_id)
                .map(|txs| txs.values().cloned().collect())
                .unwrap_or_default(),
            None => chains
                .values()
                .flat_map(|txs| txs.values().cloned())
                .collect(),
        }
    }

    /// Every record, ordered by owner, chain, then id.
    pub fn records(&self) -> Vec<TransactionRecord> {
        self.owners()
            .into_iter()
            .flat_map(|owner| self.snapshot(owner, None))
            .collect()
    }

    pub fn get_transaction(&self, key: &TransactionKey) -> Option<&TransactionRecord> {
        self.transactions
            .get(&key.owner)
            .and_then(|chains| chains.get(&key.chain_id))
            .and_then(|txs| txs.get(&key.id))
    }

    pub fn owners(&self) -> Vec<&Address> {
        let mut owners: Vec<_> = self.transactions.keys().collect();
        owners.sort();
        owners
    }

    pub fn len(&self) -> usize {
        self.transactions
            .values()
            .flat_map(|chains| chains.values())
            .map(|txs| txs.len())
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn insert(&mut self, transaction: TransactionRecord) {
        self.transactions
            .entry(transaction.owner.clone())
            .or_default()
            .entry(transaction.chain_id)
            .or_default()
            .insert(transaction.id.clone(), transaction);
    }

    fn get_mut(&mut self, key: &TransactionKey) -> Result<&mut TransactionRecord, LedgerError> {
        self.transactions
            .get_mut(&key.owner)
            .and_then(|chains| chains.get_mut(&key.chain_id))
            .and_then(|txs| txs.get_mut(&key.id))
            .ok_or_else(|| LedgerError::UnknownTransaction(key.clone()))
    }

    fn remove_transaction(&mut self, key: &TransactionKey) -> Option<TransactionRecord> {
        let chains = self.transactions.get_mut(&key.owner)?;
        let txs = chains.get_mut(&key.chain_id)?;
        let removed = txs.remove(&key.id);

        if txs.is_empty() {
            chains.remove(&key.chain_id);
        }
        if chains.is_empty() {
            self.transactions.remove(&key.owner);
        }
        removed
    }
}

fn strip_receipt(operation: &str, key: &TransactionKey, transaction: &mut TransactionRecord) {
    if transaction.receipt.take().is_some() {
        warn!("{} for {} carried a receipt, dropping it", operation, key);
    }
}

fn keep_added_time(
    operation: &str,
    key: &TransactionKey,
    stored: &TransactionRecord,
    transaction: &mut TransactionRecord,
) {
    if stored.added_time != transaction.added_time {
        warn!(
            "{} for {} tried to move added_time from {} to {}, keeping the original",
            operation, key, stored.added_time, transaction.added_time
        );
        transaction.added_time = stored.added_time;
    }
}
