// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Source location tracking.
//!
//! Spans are byte ranges tagged with the file they came from. They exist
//! for diagnostics only; nothing in checking or evaluation reads them.

/// Identifies one loaded source file inside a [`SourceMap`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FileId(pub u32);

/// A span in the source code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Span {
    pub file: FileId,
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { file: FileId::default(), start, end }
    }

    pub fn in_file(self, file: FileId) -> Self {
        Self { file, ..self }
    }

    /// Smallest span covering both `self` and `other`.
    pub fn to(self, other: Span) -> Span {
        Span {
            file: self.file,
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }
}

/// Line-start offsets for byte offset → line:col lookup.
#[derive(Debug, Clone)]
pub struct LineMap {
    starts: Vec<usize>,
}

impl LineMap {
    pub fn new(source: &str) -> Self {
        let starts = std::iter::once(0)
            .chain(source.match_indices('\n').map(|(i, _)| i + 1))
            .collect();
        LineMap { starts }
    }

    /// Convert a byte offset to (line, col), both 1-based.
    pub fn offset_to_line_col(&self, offset: usize) -> (usize, usize) {
        let idx = self.starts.partition_point(|&s| s <= offset).saturating_sub(1);
        (idx + 1, offset - self.starts[idx] + 1)
    }

    /// Text of a 1-based line, without its newline.
    pub fn line_text<'a>(&self, source: &'a str, line: usize) -> Option<&'a str> {
        let start = *self.starts.get(line.checked_sub(1)?)?;
        let end = match self.starts.get(line) {
            Some(&next) => next - 1,
            None => source.len(),
        };
        source.get(start..end).map(|s| s.trim_end_matches('\r'))
    }

    pub fn line_count(&self) -> usize {
        self.starts.len()
    }
}

/// One file known to a [`SourceMap`].
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub url: String,
    pub source: String,
    pub lines: LineMap,
}

/// Every source file loaded for one program: the main module, its file
/// dependencies, and the embedded native signatures.
#[derive(Debug, Clone, Default)]
pub struct SourceMap {
    files: Vec<SourceFile>,
}

impl SourceMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, url: impl Into<String>, source: impl Into<String>) -> FileId {
        let source = source.into();
        let id = FileId(self.files.len() as u32);
        self.files.push(SourceFile { url: url.into(), lines: LineMap::new(&source), source });
        id
    }

    pub fn get(&self, id: FileId) -> Option<&SourceFile> {
        self.files.get(id.0 as usize)
    }

    pub fn find(&self, url: &str) -> Option<FileId> {
        self.files.iter().position(|f| f.url == url).map(|i| FileId(i as u32))
    }

    /// `(url, line, column)` of a span's start.
    pub fn location(&self, span: Span) -> Option<(&str, usize, usize)> {
        let file = self.get(span.file)?;
        let (line, col) = file.lines.offset_to_line_col(span.start);
        Some((file.url.as_str(), line, col))
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}
