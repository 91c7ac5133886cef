//! Line/column positions, derived from byte offsets via a precomputed line map.
//!
//! The tree interface (§6) hands the engine an optional `loc` per node, but
//! annotations must always carry line/column, so the engine falls back to
//! this module's [`LineMap`] when a node omits `loc`.

use crate::span::Span;

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Position {
    /// 0-indexed line number.
    pub line: u32,
    /// 0-indexed column (UTF-8 byte offset within the line).
    pub column: u32,
}

impl Position {
    pub fn new(line: u32, column: u32) -> Self {
        Self { line, column }
    }
}

/// Maps byte offsets to line/column positions for a single source file.
#[derive(Debug, Clone)]
pub struct LineMap {
    /// Byte offset of the start of each line.
    line_starts: Vec<u32>,
}

impl LineMap {
    pub fn new(source: &str) -> Self {
        let mut line_starts = vec![0u32];
        for (i, byte) in source.bytes().enumerate() {
            if byte == b'\n' {
                line_starts.push(i as u32 + 1);
            }
        }
        LineMap { line_starts }
    }

    /// Resolve a byte offset to a 0-indexed line/column position.
    pub fn position_for(&self, offset: u32) -> Position {
        let line = match self.line_starts.binary_search(&offset) {
            Ok(idx) => idx,
            Err(idx) => idx.saturating_sub(1),
        };
        let line_start = self.line_starts[line];
        Position::new(line as u32, offset.saturating_sub(line_start))
    }

    pub fn range_for(&self, span: Span) -> (Position, Position) {
        (self.position_for(span.start), self.position_for(span.end))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_line_starts_at_zero() {
        let map = LineMap::new("abc\ndef\nghi");
        assert_eq!(map.position_for(0), Position::new(0, 0));
        assert_eq!(map.position_for(2), Position::new(0, 2));
    }

    #[test]
    fn offset_after_newline_is_next_line() {
        let map = LineMap::new("abc\ndef\nghi");
        assert_eq!(map.position_for(4), Position::new(1, 0));
        assert_eq!(map.position_for(6), Position::new(1, 2));
        assert_eq!(map.position_for(8), Position::new(2, 0));
    }

    #[test]
    fn range_for_spans_both_ends() {
        let map = LineMap::new("abc\ndef");
        let (start, end) = map.range_for(Span::new(1, 5));
        assert_eq!(start, Position::new(0, 1));
        assert_eq!(end, Position::new(1, 1));
    }
}
