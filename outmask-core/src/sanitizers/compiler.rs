//! compiler.rs - Compiles literal secret values into a byte-indexed skip table.
//!
//! The table drives the scan in [`crate::redactor::Redactor`]: for every byte value it
//! records how far the scan cursor may jump when it lands on that byte, and which
//! needles end in that byte. Matching looks for needle *ends*, bad-character style,
//! so most bytes of clean output are never inspected.
//!
//! License: MIT OR APACHE 2.0

use log::{debug, warn};

/// One entry of the skip table, indexed by byte value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SkipEntry {
    /// Minimum distance from an occurrence of this byte to the end of any needle.
    /// Zero means at least one needle ends in this byte.
    pub skip: usize,
    /// Indices (into [`SkipTable::needles`]) of the needles ending in this byte,
    /// in registration order.
    pub candidates: Vec<usize>,
}

/// The compiled, immutable form of a needle set plus its replacement.
///
/// Built once by [`SkipTable::compile`] and never mutated afterwards, so it can be
/// shared between redactors behind an `Arc`.
#[derive(Debug, Clone)]
pub struct SkipTable {
    entries: Vec<SkipEntry>,
    needles: Vec<Vec<u8>>,
    replacement: Vec<u8>,
    min_len: usize,
    max_len: usize,
}

impl SkipTable {
    /// Compiles `needles` into a skip table.
    ///
    /// Never fails. Zero-length needles are dropped and duplicates keep only their
    /// first occurrence, which fixes candidate precedence to registration order. An
    /// empty set yields a table that makes the redactor a pass-through.
    pub fn compile<I, N>(needles: I, replacement: impl Into<Vec<u8>>) -> Self
    where
        I: IntoIterator<Item = N>,
        N: AsRef<[u8]>,
    {
        let mut unique: Vec<Vec<u8>> = Vec::new();
        for needle in needles {
            let needle = needle.as_ref();
            if needle.is_empty() {
                warn!("Ignoring zero-length secret value; it can never be redacted.");
                continue;
            }
            if unique.iter().any(|n| n.as_slice() == needle) {
                continue;
            }
            unique.push(needle.to_vec());
        }

        let min_len = unique.iter().map(Vec::len).min().unwrap_or(0);
        let max_len = unique.iter().map(Vec::len).max().unwrap_or(0);

        let mut entries = vec![
            SkipEntry {
                skip: min_len,
                candidates: Vec::new(),
            };
            256
        ];

        for (index, needle) in unique.iter().enumerate() {
            for (i, &byte) in needle.iter().enumerate() {
                let entry = &mut entries[byte as usize];
                let distance = needle.len() - i - 1;
                if distance < entry.skip {
                    entry.skip = distance;
                }
                if distance == 0 {
                    entry.candidates.push(index);
                }
            }
        }

        debug!(
            "Compiled skip table for {} needle(s), min_len={}, max_len={}.",
            unique.len(),
            min_len,
            max_len
        );

        Self {
            entries,
            needles: unique,
            replacement: replacement.into(),
            min_len,
            max_len,
        }
    }

    /// Looks up the entry for `byte`.
    #[inline]
    pub fn entry(&self, byte: u8) -> &SkipEntry {
        &self.entries[byte as usize]
    }

    pub fn needles(&self) -> &[Vec<u8>] {
        &self.needles
    }

    pub fn needle(&self, index: usize) -> &[u8] {
        &self.needles[index]
    }

    pub fn replacement(&self) -> &[u8] {
        &self.replacement
    }

    /// Length of the shortest needle (0 for an empty set).
    pub fn min_len(&self) -> usize {
        self.min_len
    }

    /// Length of the longest needle (0 for an empty set).
    pub fn max_len(&self) -> usize {
        self.max_len
    }

    /// True when there is nothing to redact.
    pub fn is_empty(&self) -> bool {
        self.needles.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compile_empty_set_is_pass_through() {
        let table = SkipTable::compile(Vec::<&str>::new(), "[REDACTED]");
        assert!(table.is_empty());
        assert_eq!(table.min_len(), 0);
        assert_eq!(table.max_len(), 0);
        for b in 0..=255u8 {
            let entry = table.entry(b);
            assert_eq!(entry.skip, 0);
            assert!(entry.candidates.is_empty());
        }
    }

    #[test]
    fn test_compile_skip_distances() {
        let table = SkipTable::compile(["hunter2", "s3cr3t"], "[REDACTED]");
        assert_eq!(table.min_len(), 6);
        assert_eq!(table.max_len(), 7);

        // Bytes absent from every needle jump by the shortest needle length.
        assert_eq!(table.entry(b'z').skip, 6);
        // 'h' is 6 from the end of "hunter2".
        assert_eq!(table.entry(b'h').skip, 6);
        // 'r' is 1 from the end of "hunter2" and 2 from the end of "s3cr3t".
        assert_eq!(table.entry(b'r').skip, 1);
        // '3' appears twice in "s3cr3t"; the rightmost wins.
        assert_eq!(table.entry(b'3').skip, 1);
        assert_eq!(table.entry(b'2').skip, 0);
        assert_eq!(table.entry(b't').skip, 0);
        assert_eq!(table.entry(b'2').candidates, vec![0]);
        assert_eq!(table.entry(b't').candidates, vec![1]);
    }

    #[test]
    fn test_compile_candidates_keep_registration_order() {
        let table = SkipTable::compile(["longtoken", "token", "en"], "*");
        assert_eq!(table.entry(b'n').candidates, vec![0, 1, 2]);
        assert_eq!(table.entry(b'n').skip, 0);
    }

    #[test]
    fn test_compile_drops_empty_and_duplicate_needles() {
        let table = SkipTable::compile(["", "abc", "abc", "de"], "");
        assert_eq!(table.needles(), &[b"abc".to_vec(), b"de".to_vec()]);
        assert_eq!(table.min_len(), 2);
        assert_eq!(table.max_len(), 3);
        assert!(table.replacement().is_empty());
    }

    #[test]
    fn test_compile_single_byte_needle() {
        let table = SkipTable::compile(["x"], "#");
        assert_eq!(table.entry(b'x').skip, 0);
        assert_eq!(table.entry(b'y').skip, 1);
    }
}
