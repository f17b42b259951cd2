use std::sync::Arc;

use chrono::{DateTime, TimeZone};
use log::{info, warn};
use parking_lot::RwLock;

use crate::history::{self, HistoryView};
use crate::ledger::{LedgerCommand, LedgerError, LedgerState};
use crate::metrics;
use crate::types::transaction::{ChainId, TransactionRecord};

/// Handle for hosts that touch the ledger from more than one thread.
///
/// Commands run one at a time under the write lock; readers clone out of
/// the read lock and so only ever see whole commands applied.
#[derive(Debug, Clone, Default)]
pub struct SharedLedger {
    inner: Arc<RwLock<LedgerState>>,
}

impl SharedLedger {
    pub fn new(state: LedgerState) -> Self {
        Self {
            inner: Arc::new(RwLock::new(state)),
        }
    }

    pub fn dispatch(&self, command: LedgerCommand) -> Result<(), LedgerError> {
        let name = command.name();
        let is_reset = matches!(command, LedgerCommand::Reset);

        let result = self.inner.write().apply(command);
        match &result {
            Ok(()) => {
                metrics::increment_applied();
                if is_reset {
                    metrics::increment_reset_count();
                    info!("Ledger reset");
                }
            }
            Err(e) => {
                metrics::increment_rejected();
                warn!("Rejected {} command: {}", name, e);
            }
        }
        result
    }

    pub fn snapshot(&self, owner: &str, chain_id: Option<ChainId>) -> Vec<TransactionRecord> {
        metrics::increment_snapshot_count();
        self.inner.read().snapshot(owner, chain_id)
    }

    pub fn history<Tz: TimeZone>(
        &self,
        owner: &str,
        chain_id: Option<ChainId>,
        now: &DateTime<Tz>,
    ) -> HistoryView
    where
        Tz::Offset: std::fmt::Display,
    {
        history::aggregate(self.snapshot(owner, chain_id), now)
    }

    /// Copy of the whole ledger, e.g. for persisting.
    pub fn state(&self) -> LedgerState {
        self.inner.read().clone()
    }

    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }
}
