use std::fmt;

use crate::common::span::Span;

/// A note attached to a `Syntax` error: a location in source code
/// with an optional hint for that specific location.
#[derive(Debug, Clone, PartialEq)]
pub struct Note {
    pub span: Span,
    pub hint: Option<String>,
}

impl Note {
    pub fn new(span: Span) -> Note {
        Note { span, hint: None }
    }

    pub fn new_with_hint(hint: &str, span: &Span) -> Note {
        Note {
            span: span.clone(),
            hint: Some(hint.to_string()),
        }
    }
}

/// A static error (lexical, syntactic, semantic) found at compile
/// time. Usually one `Note` per error is enough; errors that involve
/// two locations — say, two `Let`s — carry one note for each.
#[derive(Debug, Clone, PartialEq)]
pub struct Syntax {
    pub reason: String,
    pub notes: Vec<Note>,
}

impl Syntax {
    /// Creates a new static error pointing at one location.
    pub fn error(reason: &str, span: &Span) -> Syntax {
        Syntax {
            reason: reason.to_string(),
            notes: vec![Note::new(span.clone())],
        }
    }

    /// Creates a new static error from a prepared note.
    pub fn error_with_note(reason: &str, note: Note) -> Syntax {
        Syntax {
            reason: reason.to_string(),
            notes: vec![note],
        }
    }

    /// Extends the error with another note.
    pub fn add_note(mut self, note: Note) -> Syntax {
        self.notes.push(note);
        self
    }
}

impl fmt::Display for Syntax {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for note in &self.notes {
            write!(f, "{}", note.span)?;
            if let Some(hint) = &note.hint {
                writeln!(f, "note: {}", hint)?;
            }
        }
        write!(f, "Syntax Error: {}", self.reason)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::common::source::Source;

    #[test]
    fn formatting() {
        // This is just a demo to check formatting,
        // it might not coincide with an actual Wave error.
        let source = Source::source("(1;2;plop).");
        let error = Syntax::error("Unknown word `plop`", &Span::new(&source, 5, 4));

        let rendered = format!("{}", error);
        assert!(rendered.contains("In ./source:1:6"));
        assert!(rendered.contains("(1;2;plop)."));
        assert!(rendered.contains("^^^^"));
        assert!(rendered.ends_with("Syntax Error: Unknown word `plop`"));
    }

    #[test]
    fn notes_accumulate() {
        let source = Source::source("Let a\nLet b");
        let error = Syntax::error("two `Let`s without an intervening `be`", &Span::new(&source, 6, 3))
            .add_note(Note::new_with_hint(
                "first `Let` started here",
                &Span::new(&source, 0, 3),
            ));

        assert_eq!(error.notes.len(), 2);
        let rendered = format!("{}", error);
        assert!(rendered.contains("note: first `Let` started here"));
    }
}
