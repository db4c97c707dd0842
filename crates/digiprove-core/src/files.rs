//! Content-file fingerprint table
//!
//! Files are hashed over their raw bytes and collected into an ordered table
//! keyed by base filename, preserving first-seen order. Submitting the same
//! file twice is cheap to detect and silently dropped; a name collision with
//! new content gets a numeric suffix instead of overwriting.

use crate::error::Result;
use crate::fingerprint;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Ordered filename-to-fingerprint mapping (first-seen order)
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct FileTable {
    entries: Vec<(String, String)>,
}

impl FileTable {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when the table holds no entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Fingerprint recorded under a filename
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, fp)| fp.as_str())
    }

    /// True when a file of this name is already in the table
    pub fn contains_name(&self, name: &str) -> bool {
        self.entries.iter().any(|(n, _)| n == name)
    }

    /// True when this fingerprint appears anywhere in the table
    pub fn contains_fingerprint(&self, fp: &str) -> bool {
        self.entries.iter().any(|(_, f)| f == fp)
    }

    /// Iterate entries in first-seen order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(n, f)| (n.as_str(), f.as_str()))
    }

    /// Insert with the de-duplication policy: drop the entry when both the
    /// name and the fingerprint were seen before; otherwise disambiguate a
    /// colliding name with a `(2)`, `(3)`, ... suffix until a free key is
    /// found. Never overwrites.
    pub fn insert(&mut self, name: &str, fp: String) {
        if self.contains_name(name) && self.contains_fingerprint(&fp) {
            return;
        }
        let mut key = name.to_string();
        let mut n = 1;
        while self.contains_name(&key) {
            n += 1;
            key = format!("{name}({n})");
        }
        self.entries.push((key, fp));
    }
}

/// Hash the given files into a table, sequentially, halting at the first
/// unreadable file.
pub fn collect<P: AsRef<Path>>(paths: &[P]) -> Result<FileTable> {
    let mut table = FileTable::new();
    for path in paths {
        let path = path.as_ref();
        let fp = fingerprint::hash_file(path)?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        table.insert(&name, fp);
    }
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use std::fs;

    #[test]
    fn test_duplicate_submission_dropped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.txt");
        fs::write(&path, "same bytes").unwrap();

        let table = collect(&[path.clone(), path]).unwrap();
        assert_eq!(table.len(), 1);
        assert!(table.contains_name("a.txt"));
    }

    #[test]
    fn test_name_collision_gets_suffix() {
        let dir = tempfile::tempdir().unwrap();
        let d1 = dir.path().join("d1");
        let d2 = dir.path().join("d2");
        fs::create_dir_all(&d1).unwrap();
        fs::create_dir_all(&d2).unwrap();
        fs::write(d1.join("a.txt"), "first").unwrap();
        fs::write(d2.join("a.txt"), "second").unwrap();

        let table = collect(&[d1.join("a.txt"), d2.join("a.txt")]).unwrap();
        assert_eq!(table.len(), 2);
        assert!(table.contains_name("a.txt"));
        assert!(table.contains_name("a.txt(2)"));
        assert_ne!(table.get("a.txt"), table.get("a.txt(2)"));
    }

    #[test]
    fn test_suffix_keeps_counting() {
        let mut table = FileTable::new();
        table.insert("f", "AA".into());
        table.insert("f", "BB".into());
        table.insert("f", "CC".into());
        assert_eq!(table.get("f"), Some("AA"));
        assert_eq!(table.get("f(2)"), Some("BB"));
        assert_eq!(table.get("f(3)"), Some("CC"));
    }

    #[test]
    fn test_unreadable_file_aborts_collection() {
        let dir = tempfile::tempdir().unwrap();
        let good = dir.path().join("ok.txt");
        fs::write(&good, "fine").unwrap();
        let missing = dir.path().join("missing.txt");

        let err = collect(&[good, missing]).unwrap_err();
        assert!(matches!(err, Error::FileRead { .. }));
    }

    #[test]
    fn test_order_is_first_seen() {
        let mut table = FileTable::new();
        table.insert("z", "1".into());
        table.insert("a", "2".into());
        let names: Vec<&str> = table.iter().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["z", "a"]);
    }
}
