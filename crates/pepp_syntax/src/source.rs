//! Source positions and the seekable text cursor the lexer reads from.
//!
//! [`SeekableData`] keeps two cursors into the text. `start` marks the beginning of the token being composed, `end` the
//! first character not yet examined. [`SeekableData::advance`] grows the token, [`SeekableData::skip`] throws the
//! examined text away, and [`SeekableData::match_view`] tries an anchored pattern without moving either cursor.

use regex::Regex;

/// A (row, column) position, plus the byte offset it corresponds to.
///
/// Rows and columns are zero-based. Ordering is by row, then column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Location {
    pub row: u32,
    pub column: u32,
    pub offset: usize,
}

/// A half-open span of source between two locations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct LocationInterval {
    lower: Location,
    upper: Location,
}

impl LocationInterval {
    pub fn new(lower: Location, upper: Location) -> Self {
        debug_assert!(lower <= upper, "interval bounds out of order: {lower:?} > {upper:?}");
        Self { lower, upper }
    }

    pub fn lower(&self) -> Location {
        self.lower
    }

    pub fn upper(&self) -> Location {
        self.upper
    }

    /// Smallest interval covering both.
    pub fn merge(&self, other: &LocationInterval) -> LocationInterval {
        LocationInterval {
            lower: self.lower.min(other.lower),
            upper: self.upper.max(other.upper),
        }
    }

    /// Byte length of the span.
    pub fn len(&self) -> usize {
        self.upper.offset - self.lower.offset
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Byte span for miette labels.
    pub fn span(&self) -> miette::SourceSpan {
        (self.lower.offset, self.len()).into()
    }
}

impl std::fmt::Display for LocationInterval {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.lower.row + 1, self.lower.column + 1)
    }
}

/// Owned source text with a token-composition cursor.
#[derive(Debug, Clone)]
pub struct SeekableData {
    text: String,
    start: Location,
    end: Location,
}

impl SeekableData {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            start: Location::default(),
            end: Location::default(),
        }
    }

    /// Next unexamined character.
    pub fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    /// Text between `start` and `end`: the token composed so far.
    pub fn select(&self) -> &str {
        &self.text[self.start.offset..self.end.offset]
    }

    /// Text not yet examined.
    pub fn rest(&self) -> &str {
        &self.text[self.end.offset..]
    }

    pub fn input_remains(&self) -> bool {
        self.end.offset < self.text.len()
    }

    /// Location of `end`.
    pub fn location(&self) -> Location {
        self.end
    }

    /// Interval covered by the token composed so far.
    pub fn interval(&self) -> LocationInterval {
        LocationInterval::new(self.start, self.end)
    }

    /// Extend the composed token by `n` bytes.
    ///
    /// Columns advance once per character. A `'\n'` is not treated specially; see [`SeekableData::newline`].
    pub fn advance(&mut self, n: usize) {
        let n = n.min(self.rest().len());
        let consumed = &self.text[self.end.offset..self.end.offset + n];
        self.end.column += consumed.chars().count() as u32;
        self.end.offset += n;
    }

    /// Discard `n` more bytes together with the composed token; afterwards `start == end`.
    pub fn skip(&mut self, n: usize) {
        self.advance(n);
        self.start = self.end;
    }

    /// Move `end` to the first column of the next row.
    pub fn newline(&mut self) {
        self.end.row += 1;
        self.end.column = 0;
    }

    /// Probe `pattern` at `end` without consuming anything.
    ///
    /// ## Returns
    /// - The matched text when `pattern` matches starting exactly at `end`, `None` otherwise.
    pub fn match_view(&self, pattern: &Regex) -> Option<&str> {
        let rest = self.rest();
        pattern.find(rest).filter(|m| m.start() == 0).map(|m| m.as_str())
    }

    /// The whole text, for rendering diagnostics.
    pub fn text(&self) -> &str {
        &self.text
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_advance_composes_and_skip_discards() {
        let mut data = SeekableData::new("abc def");
        data.advance(3);
        assert_eq!(data.select(), "abc");
        assert_eq!(data.rest(), " def");
        data.skip(1);
        assert_eq!(data.select(), "");
        assert_eq!(data.peek(), Some('d'));
        assert_eq!(data.location().column, 4);
    }

    #[test]
    fn test_newline_resets_column() {
        let mut data = SeekableData::new("a\nb");
        data.advance(2);
        data.newline();
        data.skip(0);
        assert_eq!(data.location().row, 1);
        assert_eq!(data.location().column, 0);
        assert_eq!(data.peek(), Some('b'));
    }

    #[test]
    fn test_match_view_is_anchored_and_non_consuming() {
        let re = Regex::new("[0-9]+").expect("valid regex");
        let data = SeekableData::new("x12");
        assert_eq!(data.match_view(&re), None);

        let data = SeekableData::new("12x");
        assert_eq!(data.match_view(&re), Some("12"));
        assert_eq!(data.rest(), "12x");
    }

    #[test]
    fn test_peek_exhausted() {
        let mut data = SeekableData::new("a");
        data.skip(1);
        assert_eq!(data.peek(), None);
        assert!(!data.input_remains());
    }
}
