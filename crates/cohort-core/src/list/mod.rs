//! Array index resolution over the subject list file.
//!
//! Blank lines and lines whose first non-blank character is `#` are dropped before indexing, so
//! array index `i` selects the `(i + 1)`-th surviving line.
use std::{
    fs,
    path::{Path, PathBuf},
};

use cohort_model::{COMMENT_MARKER, SubjectEntry, TaskIndex};
use tracing::{debug, instrument};

use crate::error::ListError;

#[derive(Debug, Clone)]
pub struct SubjectList {
    path: PathBuf,
    entries: Vec<SubjectEntry>,
}

impl SubjectList {
    /// Read and filter the list at `path`.
    #[instrument(level = "debug", target = "cohort.core.list", skip(path), fields(path = %path.as_ref().display()))]
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ListError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ListError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let list = Self::from_text(path, &text);
        debug!(target: "cohort.core.list", entries = list.len(), "subject list loaded");
        Ok(list)
    }

    /// Build a list from in-memory text; `path` is only used in error messages.
    pub fn from_text(path: impl Into<PathBuf>, text: &str) -> Self {
        let entries = text
            .lines()
            .filter(|line| is_entry(line))
            .map(SubjectEntry::from)
            .collect();
        Self {
            path: path.into(),
            entries,
        }
    }

    /// Entry for a zero-based array index.
    pub fn entry(&self, index: TaskIndex) -> Result<&SubjectEntry, ListError> {
        if self.entries.is_empty() {
            return Err(ListError::EmptyList {
                path: self.path.clone(),
            });
        }
        self.entries.get(index).ok_or_else(|| ListError::NotFound {
            index,
            len: self.entries.len(),
            path: self.path.clone(),
        })
    }

    #[inline]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &SubjectEntry> {
        self.entries.iter()
    }
}

fn is_entry(line: &str) -> bool {
    let line = line.trim_start();
    !line.is_empty() && !line.starts_with(COMMENT_MARKER)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const LIST: &str = "101\n# comment\n\n102:step1\n   \n  # indented comment\n103:force\n";

    #[test]
    fn filters_blank_and_comment_lines() {
        let list = SubjectList::from_text("subjects.txt", LIST);
        let raw: Vec<&str> = list.iter().map(SubjectEntry::raw_text).collect();
        assert_eq!(raw, vec!["101", "102:step1", "103:force"]);
    }

    #[test]
    fn index_is_zero_based_after_filtering() {
        let list = SubjectList::from_text("subjects.txt", LIST);
        assert_eq!(list.entry(0).unwrap().raw_text(), "101");
        assert_eq!(list.entry(1).unwrap().raw_text(), "102:step1");
        assert_eq!(list.entry(2).unwrap().raw_text(), "103:force");
    }

    #[test]
    fn index_past_the_end_is_not_found() {
        let list = SubjectList::from_text("subjects.txt", LIST);
        match list.entry(3) {
            Err(ListError::NotFound { index, len, .. }) => {
                assert_eq!(index, 3);
                assert_eq!(len, 3);
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn only_comments_is_an_empty_list() {
        let list = SubjectList::from_text("subjects.txt", "# nothing\n\n   \n");
        assert!(list.is_empty());
        assert!(matches!(list.entry(0), Err(ListError::EmptyList { .. })));
    }

    #[test]
    fn crlf_lines_are_handled() {
        let list = SubjectList::from_text("subjects.txt", "101\r\n# c\r\n102:skip\r\n");
        assert_eq!(list.entry(1).unwrap().raw_text(), "102:skip");
    }

    #[test]
    fn load_reads_from_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(LIST.as_bytes()).unwrap();

        let list = SubjectList::load(file.path()).unwrap();
        assert_eq!(list.len(), 3);
        assert_eq!(list.path(), file.path());
    }

    #[test]
    fn load_missing_file_is_a_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = SubjectList::load(dir.path().join("missing.txt")).unwrap_err();
        assert!(matches!(err, ListError::Read { .. }));
    }
}
