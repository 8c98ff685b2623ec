//! Span-replacement edit buffer.
//!
//! Edits are recorded against the immutable original text and applied only
//! when the output is rendered. Bytes outside the edited spans are copied
//! verbatim, and the source map is derived from the same edit list.

use super::sourcemap::{MappingsBuilder, Segment, SourceMap};
use std::fmt;
use thiserror::Error;

/// Error recording an edit.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EditError {
    #[error("edit range {start}..{end} is outside the source (length {len})")]
    OutOfBounds { start: usize, end: usize, len: usize },

    #[error("edit range {start}..{end} does not fall on character boundaries")]
    NotCharBoundary { start: usize, end: usize },

    #[error("edit range {start}..{end} overlaps an earlier edit")]
    Overlap { start: usize, end: usize },
}

#[derive(Debug, Clone)]
struct Edit {
    start: usize,
    end: usize,
    content: String,
}

/// Text with pending span replacements.
#[derive(Debug, Clone)]
pub struct EditBuffer<'a> {
    original: &'a str,
    /// Sorted by `start`, non-overlapping.
    edits: Vec<Edit>,
}

impl<'a> EditBuffer<'a> {
    #[must_use]
    pub fn new(original: &'a str) -> Self {
        Self {
            original,
            edits: Vec::new(),
        }
    }

    /// The untouched source text.
    #[must_use]
    pub fn original(&self) -> &'a str {
        self.original
    }

    /// Whether any edit has been recorded.
    #[must_use]
    pub fn has_changed(&self) -> bool {
        !self.edits.is_empty()
    }

    /// Replace the byte range `start..end` of the original with `content`.
    pub fn overwrite(
        &mut self,
        start: usize,
        end: usize,
        content: impl Into<String>,
    ) -> Result<(), EditError> {
        let len = self.original.len();
        if start > end || end > len {
            return Err(EditError::OutOfBounds { start, end, len });
        }
        if !self.original.is_char_boundary(start) || !self.original.is_char_boundary(end) {
            return Err(EditError::NotCharBoundary { start, end });
        }

        let idx = self.edits.partition_point(|e| e.start < start);
        let overlaps_prev = idx > 0 && self.edits[idx - 1].end > start;
        let overlaps_next = self
            .edits
            .get(idx)
            .is_some_and(|next| next.start < end || next.start == start);
        if overlaps_prev || overlaps_next {
            return Err(EditError::Overlap { start, end });
        }

        self.edits.insert(
            idx,
            Edit {
                start,
                end,
                content: content.into(),
            },
        );
        Ok(())
    }

    /// Replace the first occurrence of `pattern` in the original.
    ///
    /// Returns `false` (and records nothing) if the pattern does not occur.
    pub fn replace_first(
        &mut self,
        pattern: &str,
        content: impl Into<String>,
    ) -> Result<bool, EditError> {
        if pattern.is_empty() {
            return Ok(false);
        }
        match self.original.find(pattern) {
            Some(start) => {
                self.overwrite(start, start + pattern.len(), content)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Build a source map from the rendered output back to the original.
    ///
    /// `source` names the original file; its content is embedded.
    #[must_use]
    pub fn generate_map(&self, source: &str) -> SourceMap {
        let index = LineIndex::new(self.original);
        let mut builder = MappingsBuilder::default();
        let mut pos = GeneratedPos::default();
        let mut cursor = 0;

        for edit in &self.edits {
            map_unchanged(&index, self.original, cursor, edit.start, &mut pos, &mut builder);
            if !edit.content.is_empty() {
                let (src_line, src_col) = index.position(self.original, edit.start);
                builder.push(Segment {
                    gen_line: pos.line,
                    gen_col: pos.col,
                    src_line,
                    src_col,
                });
                pos.advance(&edit.content);
            }
            cursor = edit.end;
        }
        map_unchanged(
            &index,
            self.original,
            cursor,
            self.original.len(),
            &mut pos,
            &mut builder,
        );

        SourceMap {
            version: 3,
            file: None,
            sources: vec![source.to_string()],
            sources_content: vec![self.original.to_string()],
            names: Vec::new(),
            mappings: builder.encode(),
        }
    }
}

impl fmt::Display for EditBuffer<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut cursor = 0;
        for edit in &self.edits {
            f.write_str(&self.original[cursor..edit.start])?;
            f.write_str(&edit.content)?;
            cursor = edit.end;
        }
        f.write_str(&self.original[cursor..])
    }
}

/// Emit segments for an untouched range: one at its start and one at the
/// start of every following line inside it.
fn map_unchanged(
    index: &LineIndex,
    original: &str,
    start: usize,
    end: usize,
    pos: &mut GeneratedPos,
    builder: &mut MappingsBuilder,
) {
    if start >= end {
        return;
    }
    let text = &original[start..end];

    let (src_line, src_col) = index.position(original, start);
    builder.push(Segment {
        gen_line: pos.line,
        gen_col: pos.col,
        src_line,
        src_col,
    });

    let mut line_start = 0;
    let mut src_line = src_line;
    for (offset, _) in text.match_indices('\n') {
        src_line += 1;
        line_start = offset + 1;
        pos.line += 1;
        pos.col = 0;
        if line_start < text.len() {
            builder.push(Segment {
                gen_line: pos.line,
                gen_col: 0,
                src_line,
                src_col: 0,
            });
        }
    }
    pos.col += utf16_len(&text[line_start..]);
}

#[derive(Debug, Default, Clone, Copy)]
struct GeneratedPos {
    line: u32,
    col: u32,
}

impl GeneratedPos {
    fn advance(&mut self, text: &str) {
        match text.rfind('\n') {
            Some(last) => {
                self.line += count_lines(text);
                self.col = utf16_len(&text[last + 1..]);
            }
            None => self.col += utf16_len(text),
        }
    }
}

/// Byte offsets of line starts, for offset -> (line, column) lookups.
struct LineIndex {
    starts: Vec<usize>,
}

impl LineIndex {
    fn new(text: &str) -> Self {
        let mut starts = vec![0];
        starts.extend(text.match_indices('\n').map(|(i, _)| i + 1));
        Self { starts }
    }

    /// Zero-based line and UTF-16 column of a byte offset.
    fn position(&self, text: &str, offset: usize) -> (u32, u32) {
        let line = self.starts.partition_point(|&s| s <= offset) - 1;
        let col = utf16_len(&text[self.starts[line]..offset]);
        (to_u32(line), col)
    }
}

fn count_lines(text: &str) -> u32 {
    to_u32(text.bytes().filter(|&b| b == b'\n').count())
}

fn utf16_len(text: &str) -> u32 {
    to_u32(text.encode_utf16().count())
}

fn to_u32(n: usize) -> u32 {
    u32::try_from(n).unwrap_or(u32::MAX)
}
