// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Source location tracking.
//!
//! Every file loaded into a [`SourceMap`] occupies its own range of a single
//! global offset space, so a [`Span`] is enough to locate code in any file.

use std::path::PathBuf;

/// A span in the source code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Smallest span covering both `self` and `other`.
    pub fn to(self, other: Span) -> Span {
        Span::new(self.start.min(other.start), self.end.max(other.end))
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A resolved location: 1-based line and column plus the byte offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Position {
    pub line: u32,
    pub column: u32,
    pub offset: usize,
}

/// Precomputed line-start offsets for O(log n) byte-offset → line:col lookup.
#[derive(Debug, Clone)]
pub struct LineMap {
    /// Byte offset of the start of each line. line_starts[0] is always 0.
    line_starts: Vec<u32>,
}

impl LineMap {
    /// Build a line map by scanning source for newlines. O(n).
    pub fn new(source: &str) -> Self {
        let mut line_starts = vec![0u32];
        for (i, b) in source.bytes().enumerate() {
            if b == b'\n' {
                line_starts.push((i + 1) as u32);
            }
        }
        LineMap { line_starts }
    }

    /// Convert byte offset to (line, col), both 1-based. O(log n).
    ///
    /// Columns count bytes; use [`LineMap::position`] for character columns.
    pub fn offset_to_line_col(&self, offset: usize) -> (u32, u32) {
        let offset = offset as u32;
        let line_idx = self.line_index(offset);
        let line = (line_idx + 1) as u32;
        let col = offset - self.line_starts[line_idx] + 1;
        (line, col)
    }

    /// Position of `offset`, with the column counted in characters.
    pub fn position(&self, source: &str, offset: usize) -> Position {
        let line_idx = self.line_index(offset as u32);
        let line_start = self.line_starts[line_idx] as usize;
        let column = source
            .get(line_start..offset.min(source.len()))
            .map(|prefix| prefix.chars().count())
            .unwrap_or(offset - line_start);
        Position {
            line: (line_idx + 1) as u32,
            column: column as u32 + 1,
            offset,
        }
    }

    fn line_index(&self, offset: u32) -> usize {
        match self.line_starts.binary_search(&offset) {
            Ok(i) => i,
            Err(i) => i.saturating_sub(1),
        }
    }

    /// Get the source text of a 1-based line number. O(1).
    pub fn line_text<'a>(&self, source: &'a str, line: u32) -> Option<&'a str> {
        let idx = (line as usize).checked_sub(1)?;
        let start = *self.line_starts.get(idx)? as usize;
        let end = self
            .line_starts
            .get(idx + 1)
            .map(|&s| (s as usize).saturating_sub(1)) // exclude the \n
            .unwrap_or(source.len());
        source.get(start..end).map(|text| text.strip_suffix('\r').unwrap_or(text))
    }

    /// Number of lines in the source.
    pub fn line_count(&self) -> u32 {
        self.line_starts.len() as u32
    }
}

/// Index of a file inside a [`SourceMap`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FileId(pub u32);

/// One loaded source file.
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub id: FileId,
    pub name: String,
    pub path: Option<PathBuf>,
    pub source: String,
    /// Global offset of this file's first byte.
    pub base: usize,
    pub lines: LineMap,
}

impl SourceFile {
    pub fn end(&self) -> usize {
        self.base + self.source.len()
    }

    /// Whether a global offset falls inside this file (end inclusive).
    pub fn contains(&self, offset: usize) -> bool {
        offset >= self.base && offset <= self.end()
    }

    /// Position of a global offset, relative to this file.
    pub fn position(&self, offset: usize) -> Position {
        let local = offset.saturating_sub(self.base).min(self.source.len());
        self.lines.position(&self.source, local)
    }

    pub fn line_text(&self, line: u32) -> Option<&str> {
        self.lines.line_text(&self.source, line)
    }
}

/// All files of one compilation, laid out back to back in one offset space.
///
/// Files are separated by one unused byte so an end-of-file offset never
/// collides with the next file's first byte.
#[derive(Debug, Clone, Default)]
pub struct SourceMap {
    files: Vec<SourceFile>,
}

impl SourceMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a file; returns its id and base offset.
    pub fn add_file(&mut self, name: impl Into<String>, path: Option<PathBuf>, source: String) -> (FileId, usize) {
        let base = self.files.last().map(|f| f.end() + 1).unwrap_or(0);
        let id = FileId(self.files.len() as u32);
        let lines = LineMap::new(&source);
        self.files.push(SourceFile { id, name: name.into(), path, source, base, lines });
        (id, base)
    }

    pub fn file(&self, id: FileId) -> Option<&SourceFile> {
        self.files.get(id.0 as usize)
    }

    pub fn files(&self) -> &[SourceFile] {
        &self.files
    }

    /// The file containing a global offset.
    pub fn lookup(&self, offset: usize) -> Option<&SourceFile> {
        let idx = self.files.partition_point(|f| f.base <= offset);
        let file = self.files.get(idx.checked_sub(1)?)?;
        file.contains(offset).then_some(file)
    }

    /// Whether any loaded file has the given path.
    pub fn contains_path(&self, path: &std::path::Path) -> bool {
        self.files.iter().any(|f| f.path.as_deref() == Some(path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_source() {
        let lm = LineMap::new("");
        assert_eq!(lm.offset_to_line_col(0), (1, 1));
        assert_eq!(lm.line_count(), 1);
    }

    #[test]
    fn multi_line() {
        let src = "abc\ndef\nghi";
        let lm = LineMap::new(src);
        assert_eq!(lm.line_count(), 3);
        assert_eq!(lm.offset_to_line_col(0), (1, 1));
        assert_eq!(lm.offset_to_line_col(2), (1, 3));
        assert_eq!(lm.offset_to_line_col(4), (2, 1));
        assert_eq!(lm.offset_to_line_col(8), (3, 1));
        assert_eq!(lm.line_text(src, 2), Some("def"));
        assert_eq!(lm.line_text(src, 4), None);
    }

    #[test]
    fn offset_at_newline() {
        let src = "ab\ncd\n";
        let lm = LineMap::new(src);
        // The '\n' belongs to the line it ends
        assert_eq!(lm.offset_to_line_col(2), (1, 3));
        assert_eq!(lm.offset_to_line_col(3), (2, 1));
        assert_eq!(lm.line_text(src, 3), Some(""));
    }

    #[test]
    fn char_columns() {
        let src = "let é = 1;";
        let lm = LineMap::new(src);
        // 'é' is two bytes: '=' is at byte 7, which is the 7th character
        let pos = lm.position(src, 7);
        assert_eq!(pos.line, 1);
        assert_eq!(pos.column, 7);
        assert_eq!(pos.offset, 7);
    }

    #[test]
    fn crlf_line_text() {
        let src = "a\r\nb";
        let lm = LineMap::new(src);
        assert_eq!(lm.line_text(src, 1), Some("a"));
        assert_eq!(lm.line_text(src, 2), Some("b"));
    }

    #[test]
    fn source_map_lookup() {
        let mut map = SourceMap::new();
        let (a, base_a) = map.add_file("a.rcn", None, "fn a() {}".to_string());
        let (b, base_b) = map.add_file("b.rcn", None, "x\ny".to_string());
        assert_eq!(base_a, 0);
        assert_eq!(base_b, 10);
        assert_eq!(map.lookup(3).map(|f| f.id), Some(a));
        assert_eq!(map.lookup(9).map(|f| f.id), Some(a));
        assert_eq!(map.lookup(12).map(|f| f.id), Some(b));
        let file = map.file(b).unwrap();
        assert_eq!(file.position(12).line, 2);
        assert!(map.lookup(100).is_none());
    }
}
