use std::io;
use std::path::{Path, PathBuf};

use log::{debug, error, info};
use thiserror::Error;

use crate::ledger::{LedgerError, LedgerState};
use crate::types::transaction::TransactionRecord;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("Corrupt ledger file: {0}")]
    Corrupt(#[from] LedgerError),
}

/// JSON file holding a ledger between runs. The ledger itself never does
/// I/O; hosts load it at startup and save after dispatching commands.
///
/// The file is a flat array of records. Loading rebuilds the keyed map from
/// each record's own owner, chain and id, so the file cannot place a record
/// under a key other than its own.
#[derive(Debug, Clone)]
pub struct LedgerStore {
    path: PathBuf,
}

impl LedgerStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// A missing file is an empty ledger.
    pub fn load(&self) -> Result<LedgerState, StoreError> {
        let contents = match std::fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                info!("No ledger at {}, starting empty", self.path.display());
                return Ok(LedgerState::new());
            }
            Err(e) => return Err(e.into()),
        };

        let records: Vec<TransactionRecord> = serde_json::from_str(&contents)?;
        let state = LedgerState::from_records(records).map_err(|e| {
            error!("Rejecting ledger at {}: {}", self.path.display(), e);
            e
        })?;
        debug!("Loaded {} transactions from {}", state.len(), self.path.display());
        Ok(state)
    }

    /// Writes to a temp file next to the target and renames it over.
    pub fn save(&self, state: &LedgerState) -> Result<(), StoreError> {
        let contents = serde_json::to_vec_pretty(&state.records())?;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let tmp_path = self.path.with_extension("json.tmp");
        std::fs::write(&tmp_path, &contents).map_err(|e| {
            error!("Failed to write {}: {}", tmp_path.display(), e);
            e
        })?;

        if let Err(e) = std::fs::rename(&tmp_path, &self.path) {
            error!(
                "Failed to move {} to {}: {}",
                tmp_path.display(),
                self.path.display(),
                e
            );
            let _ = std::fs::remove_file(&tmp_path);
            return Err(e.into());
        }

        debug!("Saved {} transactions to {}", state.len(), self.path.display());
        Ok(())
    }
}
