use std::sync::{Arc, PoisonError, RwLock};

use crate::{error::LedgerError, ledger::Ledger};

/// In-memory ledger for tests and dry runs.
#[derive(Clone, Default)]
pub struct MemoryLedger {
    inner: Arc<RwLock<Vec<String>>>,
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ledger pre-populated with `ids`.
    pub fn with_entries<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            inner: Arc::new(RwLock::new(ids.into_iter().map(Into::into).collect())),
        }
    }

    /// Snapshot of every entry, duplicates included.
    pub fn entries(&self) -> Vec<String> {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Ledger for MemoryLedger {
    fn contains(&self, id: &str) -> Result<bool, LedgerError> {
        let inner = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        Ok(inner.iter().any(|entry| entry == id))
    }

    fn append(&self, id: &str) -> Result<(), LedgerError> {
        let mut inner = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        inner.push(id.to_string());
        Ok(())
    }
}
