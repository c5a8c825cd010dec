use std::fmt::{self, Display, Formatter};
use std::rc::Rc;

use crate::common::source::Source;

/// A `Span` refers to a section of a source, much like a `&str`, but
/// with a counted reference to the `Source` rather than a borrow.
/// Spans are attached to tokens and to every collection node, and are
/// what diagnostics point at.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Span {
    source: Option<Rc<Source>>,
    offset: usize,
    length: usize,
}

impl Span {
    /// Creates a new `Span` from an offset and a length.
    pub fn new(source: &Rc<Source>, offset: usize, length: usize) -> Span {
        Span {
            source: Some(Rc::clone(source)),
            offset,
            length,
        }
    }

    /// A `Span` that points at a single position in the source.
    pub fn point(source: &Rc<Source>, offset: usize) -> Span {
        Span::new(source, offset, 1)
    }

    /// Creates a new empty `Span`.
    /// An empty `Span` has no source; combined with another `Span`,
    /// the result is just the other one.
    pub fn empty() -> Span {
        Span {
            source: None,
            offset: 0,
            length: 0,
        }
    }

    /// Checks whether this `Span` is the empty one.
    pub fn is_empty(&self) -> bool {
        self.source.is_none()
    }

    /// Creates a new `Span` covering both arguments.
    /// ```plain
    /// hello this is cool
    /// ^^^^^              | a
    ///            ^^      | b
    /// ^^^^^^^^^^^^^      | combined
    /// ```
    pub fn combine(a: &Span, b: &Span) -> Span {
        if a.is_empty() {
            return b.clone();
        }
        if b.is_empty() {
            return a.clone();
        }

        if a.source != b.source {
            panic!("Can't combine two Spans with separate sources");
        }

        let offset = a.offset.min(b.offset);
        let end = (a.offset + a.length).max(b.offset + b.length);

        Span {
            source: a.source.clone(),
            offset,
            length: end - offset,
        }
    }

    /// Combines a set of `Span`s (a fold over `Span::combine`).
    pub fn join(mut spans: Vec<Span>) -> Span {
        let mut combined = match spans.pop() {
            Some(span) => span,
            None => return Span::empty(),
        };

        while let Some(span) = spans.pop() {
            combined = Span::combine(&combined, &span);
        }

        combined
    }

    /// The text this `Span` covers; empty spans cover nothing, and
    /// spans pointing past the source (an error at the very end)
    /// cover up to its last byte.
    pub fn contents(&self) -> String {
        match &self.source {
            None => String::new(),
            Some(source) => {
                let end = (self.offset + self.length).min(source.contents.len());
                let start = self.offset.min(end);
                source.contents[start..end].to_string()
            },
        }
    }

    /// The 1-based line this `Span` starts on, or 0 for the empty
    /// `Span`. The preprocessor leans on this to delimit `Let`
    /// substitutions and to report duplicated `Let`s.
    pub fn line(&self) -> usize {
        match &self.source {
            None => 0,
            Some(source) => source.contents[..self.offset].matches('\n').count() + 1,
        }
    }

    /// The 1-based column this `Span` starts on, or 0 when empty.
    pub fn column(&self) -> usize {
        match &self.source {
            None => 0,
            Some(source) => {
                let before = &source.contents[..self.offset];
                match before.rfind('\n') {
                    Some(newline) => self.offset - newline,
                    None => self.offset + 1,
                }
            },
        }
    }
}

impl Display for Span {
    /// Prints where the `Span` occurs in its source:
    /// ```plain
    /// In ./source:1:5
    ///   |
    /// 1 | x = blatant error
    ///   |     ^^^^^^^^^^^^^
    /// ```
    /// Spans that run over several lines are pointed at by their
    /// first line only.
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let source = match &self.source {
            // Nothing to point at.
            None => return Ok(()),
            Some(source) => source,
        };

        let line_number = self.line();
        let column = self.column();
        let line = source
            .contents
            .lines()
            .nth(line_number - 1)
            .unwrap_or("");

        let width = line.len().saturating_sub(column.saturating_sub(1)).max(1);
        let carets = self.length.clamp(1, width);
        let gutter = " ".repeat(line_number.to_string().len());

        writeln!(f, "In {}:{}:{}", source.path.display(), line_number, column)?;
        writeln!(f, "{} |", gutter)?;
        writeln!(f, "{} | {}", line_number, line)?;
        writeln!(
            f,
            "{} | {}{}",
            gutter,
            " ".repeat(column.saturating_sub(1)),
            "^".repeat(carets),
        )
    }
}

/// A wrapper for spanning types: a `Spanned<Token>` is a token plus
/// the region of source it was read from.
#[derive(Debug, Clone, PartialEq)]
pub struct Spanned<T> {
    pub item: T,
    pub span: Span,
}

impl<T> Spanned<T> {
    pub fn new(item: T, span: Span) -> Spanned<T> {
        Spanned { item, span }
    }

    /// A destructive alias for `self.item`.
    pub fn into_item(self) -> T {
        self.item
    }
}
