//! Completion ledger: the append-only record of subjects that finished a pipeline stage.
//!
//! Only two operations exist so that the backing store can be swapped without touching the decision engine.
//! Entries are never removed; forced reruns append the id again.
mod file;
pub use file::FileLedger;

mod memory;
pub use memory::MemoryLedger;

use crate::error::LedgerError;

pub trait Ledger: Send + Sync {
    /// Exact full-line membership test.
    fn contains(&self, id: &str) -> Result<bool, LedgerError>;

    /// Record `id` as completed. Does not deduplicate.
    fn append(&self, id: &str) -> Result<(), LedgerError>;
}

impl<L: Ledger + ?Sized> Ledger for &L {
    fn contains(&self, id: &str) -> Result<bool, LedgerError> {
        (**self).contains(id)
    }

    fn append(&self, id: &str) -> Result<(), LedgerError> {
        (**self).append(id)
    }
}

impl<L: Ledger + ?Sized> Ledger for std::sync::Arc<L> {
    fn contains(&self, id: &str) -> Result<bool, LedgerError> {
        (**self).contains(id)
    }

    fn append(&self, id: &str) -> Result<(), LedgerError> {
        (**self).append(id)
    }
}
