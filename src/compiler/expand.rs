use std::collections::HashMap;
use std::iter::Peekable;
use std::vec::IntoIter;

use crate::common::span::{Span, Spanned};
use crate::compiler::syntax::{Note, Syntax};
use crate::construct::token::{Token, Tokens};

/// The `Let` preprocessor.
///
/// `Let <identifier> be <expr>` binds the identifier, case
/// sensitively, to the tokens of `<expr>` — everything up to the end
/// of the line (or the next `Let`). Later occurrences of the
/// identifier splice the bound tokens in. Reserved words never reach
/// this table: the lexer has already turned them into non-`Word`
/// tokens.
pub struct Expander {
    definitions: HashMap<String, Vec<Spanned<Token>>>,
}

type Stream = Peekable<IntoIter<Spanned<Token>>>;

impl Expander {
    /// Expands all `Let` bindings and removes them from the stream.
    pub fn expand(tokens: Tokens) -> Result<Tokens, Syntax> {
        let mut expander = Expander {
            definitions: HashMap::new(),
        };
        let mut input: Stream = tokens.into_iter().peekable();
        let mut output = Vec::new();

        while let Some(token) = input.next() {
            match token.item {
                Token::Let => expander.definition(&token.span, &mut input)?,
                Token::Word(name) => expander.substitute(name, token.span, &mut output),
                _ => output.push(token),
            }
        }

        Ok(output)
    }

    /// Reads `<identifier> be <expr>` after a `Let`.
    fn definition(&mut self, let_span: &Span, input: &mut Stream) -> Result<(), Syntax> {
        let (name, name_span) = match input.next() {
            Some(Spanned {
                item: Token::Word(name),
                span,
            }) => (name, span),
            Some(Spanned {
                item: Token::Let,
                span,
            }) => return Err(two_lets(let_span, &span)),
            Some(other) => {
                return Err(Syntax::error_with_note(
                    "`Let` must bind an identifier",
                    Note::new_with_hint(
                        "reserved words cannot be substituted",
                        &other.span,
                    ),
                ));
            },
            None => {
                return Err(Syntax::error(
                    "Unexpected end of source after `Let`",
                    let_span,
                ));
            },
        };

        // The single-letter path moves look like ordinary words to
        // the lexer, but they are reserved all the same.
        if matches!(name.as_str(), "u" | "d" | "p" | "s" | "r") {
            return Err(Syntax::error_with_note(
                &format!("`{}` is a reserved path move", name),
                Note::new_with_hint("reserved words cannot be substituted", &name_span),
            ));
        }

        let be_span = match input.next() {
            Some(Spanned {
                item: Token::Be,
                span,
            }) => span,
            Some(Spanned {
                item: Token::Let,
                span,
            }) => return Err(two_lets(let_span, &span)),
            Some(other) => {
                return Err(Syntax::error(
                    &format!("Expected `be` after `Let {}`, found {}", name, other.item),
                    &other.span,
                ));
            },
            None => {
                return Err(Syntax::error(
                    "Unexpected end of source before the `be` of a `Let`",
                    let_span,
                ));
            },
        };

        // The substitution runs to the end of the line. Earlier
        // bindings are spliced into the body now, so lookups later
        // need no recursion.
        let line = be_span.line();
        let mut body = Vec::new();
        while let Some(next) = input.peek() {
            if next.span.line() != line || next.item == Token::Let {
                break;
            }
            let token = match input.next() {
                Some(token) => token,
                None => break,
            };
            match token.item {
                Token::Word(name) => self.substitute(name, token.span, &mut body),
                _ => body.push(token),
            }
        }

        if body.is_empty() {
            return Err(Syntax::error(
                &format!("`Let {}` binds an empty substitution", name),
                &be_span,
            ));
        }

        self.definitions.insert(name, body);
        Ok(())
    }

    /// Splices the binding of `name`, or passes the word through
    /// untouched for the parser to complain about.
    fn substitute(&self, name: String, span: Span, output: &mut Vec<Spanned<Token>>) {
        match self.definitions.get(&name) {
            Some(body) => output.extend(body.iter().cloned()),
            None => output.push(Spanned::new(Token::Word(name), span)),
        }
    }
}

fn two_lets(first: &Span, second: &Span) -> Syntax {
    Syntax::error_with_note(
        &format!(
            "Two `Let`s without an intervening `be` (lines {} and {})",
            first.line(),
            second.line(),
        ),
        Note::new(second.clone()),
    )
    .add_note(Note::new_with_hint("first `Let` started here", first))
}
