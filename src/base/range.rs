//! Ranges tagged with their source file.
//!
//! Targets and origins are collected per file but compared across files, so
//! every range that leaves the syntax layer carries its file name.

use smol_str::SmolStr;
use text_size::{TextRange, TextSize};

/// A byte range within a named file.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct FileRange {
    pub file: SmolStr,
    pub range: TextRange,
}

impl FileRange {
    pub fn new(file: impl Into<SmolStr>, range: TextRange) -> Self {
        Self {
            file: file.into(),
            range,
        }
    }

    /// Create a zero-width range at `offset`.
    pub fn empty(file: impl Into<SmolStr>, offset: TextSize) -> Self {
        Self::new(file, TextRange::empty(offset))
    }

    pub fn start(&self) -> TextSize {
        self.range.start()
    }

    pub fn end(&self) -> TextSize {
        self.range.end()
    }

    /// Check if `offset` in `file` falls within this range (end inclusive).
    ///
    /// The end is inclusive so a cursor placed right after a token still
    /// counts as being "on" it.
    pub fn contains_pos(&self, file: &str, offset: TextSize) -> bool {
        self.file == file && self.range.contains_inclusive(offset)
    }

    /// Check if `other` lies entirely within this range.
    pub fn contains_range(&self, other: &FileRange) -> bool {
        self.file == other.file && self.range.contains_range(other.range)
    }

    /// Check if the two ranges share at least one offset.
    pub fn overlaps(&self, other: &FileRange) -> bool {
        self.file == other.file
            && self.range.start() <= other.range.end()
            && other.range.start() <= self.range.end()
    }

    /// Sort key used for deterministic ordering: file name, then start offset.
    pub fn sort_key(&self) -> (&str, TextSize, TextSize) {
        (self.file.as_str(), self.range.start(), self.range.end())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn range(start: u32, end: u32) -> TextRange {
        TextRange::new(start.into(), end.into())
    }

    #[test]
    fn test_contains_pos_is_end_inclusive() {
        let r = FileRange::new("main.hcl", range(4, 8));
        assert!(r.contains_pos("main.hcl", 4.into()));
        assert!(r.contains_pos("main.hcl", 8.into()));
        assert!(!r.contains_pos("main.hcl", 9.into()));
        assert!(!r.contains_pos("other.hcl", 5.into()));
    }

    #[test]
    fn test_contains_range_requires_same_file() {
        let outer = FileRange::new("a.hcl", range(0, 20));
        assert!(outer.contains_range(&FileRange::new("a.hcl", range(2, 5))));
        assert!(!outer.contains_range(&FileRange::new("b.hcl", range(2, 5))));
        assert!(!outer.contains_range(&FileRange::new("a.hcl", range(15, 25))));
    }

    #[test]
    fn test_overlaps() {
        let a = FileRange::new("a.hcl", range(0, 10));
        assert!(a.overlaps(&FileRange::new("a.hcl", range(10, 12))));
        assert!(!a.overlaps(&FileRange::new("a.hcl", range(11, 12))));
    }
}
