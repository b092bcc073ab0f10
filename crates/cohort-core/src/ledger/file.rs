use std::{
    fs::{self, File, OpenOptions},
    io::{self, Read, Seek, SeekFrom, Write},
    path::{Path, PathBuf},
};

use fd_lock::RwLock;
use tracing::{debug, trace};

use crate::{error::LedgerError, ledger::Ledger};

/// Plain-text ledger, one subject id per line.
///
/// A missing file (and its parent directories) is created empty on first access; an existing one
/// is only opened for writing by `append`, so a read-only ledger still answers lookups.
/// Reads take a shared advisory lock and appends an exclusive one, so concurrent array tasks
/// never interleave partial lines. The read-then-append sequence itself is not atomic.
#[derive(Debug, Clone)]
pub struct FileLedger {
    path: PathBuf,
}

impl FileLedger {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[inline]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Every line currently in the ledger, duplicates included.
    pub fn entries(&self) -> Result<Vec<String>, LedgerError> {
        let text = self.read_all()?;
        Ok(text.lines().map(str::to_string).collect())
    }

    fn open_append(&self) -> Result<File, LedgerError> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).map_err(|e| self.io(e))?;
        }
        OpenOptions::new()
            .read(true)
            .append(true)
            .create(true)
            .open(&self.path)
            .map_err(|e| self.io(e))
    }

    fn open_read(&self) -> Result<File, LedgerError> {
        match File::open(&self.path) {
            Ok(file) => Ok(file),
            Err(e) if e.kind() == io::ErrorKind::NotFound => self.open_append(),
            Err(e) => Err(self.io(e)),
        }
    }

    fn read_all(&self) -> Result<String, LedgerError> {
        let lock = RwLock::new(self.open_read()?);
        let guard = lock.read().map_err(|e| self.io(e))?;

        let mut text = String::new();
        (&*guard)
            .read_to_string(&mut text)
            .map_err(|e| self.io(e))?;
        Ok(text)
    }

    fn io(&self, source: io::Error) -> LedgerError {
        LedgerError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

impl Ledger for FileLedger {
    fn contains(&self, id: &str) -> Result<bool, LedgerError> {
        let found = self.read_all()?.lines().any(|line| line == id);
        trace!(target: "cohort.core.ledger", path = %self.path.display(), id, found, "lookup");
        Ok(found)
    }

    fn append(&self, id: &str) -> Result<(), LedgerError> {
        let mut lock = RwLock::new(self.open_append()?);
        let mut guard = lock.write().map_err(|e| self.io(e))?;

        let mut line = String::with_capacity(id.len() + 2);
        if !ends_with_newline(&mut guard).map_err(|e| self.io(e))? {
            line.push('\n');
        }
        line.push_str(id);
        line.push('\n');

        guard.write_all(line.as_bytes()).map_err(|e| self.io(e))?;
        guard.flush().map_err(|e| self.io(e))?;
        debug!(target: "cohort.core.ledger", path = %self.path.display(), id, "subject recorded as completed");
        Ok(())
    }
}

/// `true` for an empty file or one whose last byte is `\n`.
fn ends_with_newline(file: &mut File) -> io::Result<bool> {
    let len = file.seek(SeekFrom::End(0))?;
    if len == 0 {
        return Ok(true);
    }
    file.seek(SeekFrom::End(-1))?;
    let mut last = [0u8; 1];
    file.read_exact(&mut last)?;
    Ok(last[0] == b'\n')
}
