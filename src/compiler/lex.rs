use std::rc::Rc;

use wave_common::operator::Operator;

use crate::common::{
    source::Source,
    span::{Span, Spanned},
};
use crate::compiler::syntax::{Note, Syntax};
use crate::construct::token::{Token, Tokens};

/// The lexer reads a source file into a stream of spanned tokens.
/// It is greedy: at every position it takes the longest token that
/// matches, so `<=` never splits into `<` and `=`, and `{;` is one
/// token rather than a brace and a separator.
#[derive(Debug)]
pub struct Lexer {
    source: Rc<Source>,
    index: usize,
    tokens: Tokens,
}

/// The symbolic tokens, longest spelling first.
fn symbol(rest: &str) -> Option<(Token, usize)> {
    let table = [
        ("{||", Token::CurlyPar),
        ("{;", Token::CurlySeq),
        ("||", Token::Parallel),
        ("<=", Token::Op(Operator::LesserOrEquals)),
        (">=", Token::Op(Operator::GreaterOrEquals)),
        ("<>", Token::Op(Operator::Differs)),
        ("~+", Token::Op(Operator::UnaryPlus)),
        ("~-", Token::Op(Operator::UnaryMinus)),
        ("++", Token::Op(Operator::Increment)),
        ("--", Token::Op(Operator::Decrement)),
        ("(", Token::OpenParen),
        (")", Token::CloseParen),
        ("[", Token::OpenSquare),
        ("]", Token::CloseSquare),
        ("}", Token::CloseCurly),
        (";", Token::Semicolon),
        ("#", Token::Hash),
        ("@", Token::At),
        (".", Token::Dot),
        ("+", Token::Op(Operator::Plus)),
        ("-", Token::Op(Operator::Minus)),
        ("*", Token::Op(Operator::Times)),
        ("/", Token::Op(Operator::Divide)),
        ("=", Token::Op(Operator::Equals)),
        ("<", Token::Op(Operator::Lesser)),
        (">", Token::Op(Operator::Greater)),
        ("?", Token::Op(Operator::Stop)),
        ("!", Token::Op(Operator::Cut)),
    ];

    table
        .into_iter()
        .find(|(spelling, _)| rest.starts_with(spelling))
        .map(|(spelling, token)| (token, spelling.len()))
}

impl Lexer {
    /// Lexes a source file into a stream of tokens.
    pub fn lex(source: Rc<Source>) -> Result<Tokens, Syntax> {
        let mut lexer = Lexer {
            source,
            index: 0,
            tokens: vec![],
        };

        lexer.strip();
        while lexer.index < lexer.source.contents.len() {
            let token = lexer.next_token()?;
            lexer.tokens.push(token);
            lexer.strip();
        }

        Ok(lexer.tokens)
    }

    /// All characters after the current position.
    fn remaining(&self) -> &str {
        &self.source.contents[self.index..]
    }

    /// Eats whitespace, newlines included — Wave has no comments and
    /// no line-sensitive syntax outside the preprocessor, which does
    /// its own line bookkeeping through spans.
    fn strip(&mut self) {
        while let Some(c) = self.remaining().chars().next() {
            if !c.is_whitespace() {
                break;
            }
            self.index += c.len_utf8();
        }
    }

    /// Wraps a token with the span of its `length` bytes and
    /// advances past it.
    fn spanned(&mut self, token: Token, length: usize) -> Spanned<Token> {
        let span = Span::new(&self.source, self.index, length);
        self.index += length;
        Spanned::new(token, span)
    }

    fn next_token(&mut self) -> Result<Spanned<Token>, Syntax> {
        if let Some((token, length)) = symbol(self.remaining()) {
            return Ok(self.spanned(token, length));
        }

        let next = self.remaining().chars().next();
        match next {
            Some('{') => Err(Syntax::error_with_note(
                "Expected `;` or `||` after `{`",
                Note::new_with_hint(
                    "cyclic collections and repetitions open with `{;` or `{||`",
                    &Span::point(&self.source, self.index),
                ),
            )),
            Some('"') => self.string(),
            Some('\'') => self.character(),
            Some(c) if c.is_ascii_digit() => self.number(),
            Some(c) if c.is_alphabetic() || c == '_' => Ok(self.word()),
            Some(c) => Err(Syntax::error(
                &format!("Unexpected character `{}`", c),
                &Span::point(&self.source, self.index),
            )),
            None => Err(Syntax::error(
                "Unexpected end of source",
                &Span::point(&self.source, self.index),
            )),
        }
    }

    fn number(&mut self) -> Result<Spanned<Token>, Syntax> {
        let rest = self.remaining();
        let digits = rest.chars().take_while(|c| c.is_ascii_digit()).count();

        // A dot only belongs to the number when digits follow;
        // otherwise it is the phrase terminator, as in `42.`.
        let bytes = rest.as_bytes();
        let fractional = bytes.get(digits) == Some(&b'.')
            && bytes.get(digits + 1).is_some_and(|b| b.is_ascii_digit());

        if fractional {
            let tail = rest[digits + 1..]
                .chars()
                .take_while(|c| c.is_ascii_digit())
                .count();
            let length = digits + 1 + tail;
            let value = rest[..length].parse::<f64>().map_err(|_| {
                Syntax::error(
                    "Float literal out of range",
                    &Span::new(&self.source, self.index, length),
                )
            })?;
            Ok(self.spanned(Token::Float(value), length))
        } else {
            let value = rest[..digits].parse::<i64>().map_err(|_| {
                Syntax::error(
                    "Integer literal out of range",
                    &Span::new(&self.source, self.index, digits),
                )
            })?;
            Ok(self.spanned(Token::Int(value), digits))
        }
    }

    fn string(&mut self) -> Result<Spanned<Token>, Syntax> {
        // The opening quote is at the current position.
        let mut length = 1;
        let mut escape = false;
        let mut string = String::new();

        for c in self.remaining().chars().skip(1) {
            let bytes = c.len_utf8();
            length += bytes;
            if escape {
                escape = false;
                string.push(match c {
                    '"' => '"',
                    '\\' => '\\',
                    'n' => '\n',
                    'r' => '\r',
                    't' => '\t',
                    '0' => '\0',
                    other => {
                        return Err(Syntax::error_with_note(
                            &format!("Unknown escape code `\\{}` in string literal", other),
                            Note::new_with_hint(
                                "to include a single backslash `\\`, escape it first: `\\\\`",
                                &Span::new(&self.source, self.index + length - bytes, bytes),
                            ),
                        ));
                    },
                })
            } else {
                match c {
                    '\\' => escape = true,
                    '"' => return Ok(self.spanned(Token::Str(string), length)),
                    c => string.push(c),
                }
            }
        }

        Err(Syntax::error(
            "Unexpected end of source while lexing a string literal",
            &Span::point(&self.source, self.index + length),
        ))
    }

    fn character(&mut self) -> Result<Spanned<Token>, Syntax> {
        let mut chars = self.remaining().chars().skip(1);

        let (c, body_length) = match chars.next() {
            Some('\\') => {
                let escaped = match chars.next() {
                    Some('n') => b'\n',
                    Some('t') => b'\t',
                    Some('r') => b'\r',
                    Some('0') => b'\0',
                    Some('\\') => b'\\',
                    Some('\'') => b'\'',
                    _ => {
                        return Err(Syntax::error(
                            "Unknown escape code in character literal",
                            &Span::new(&self.source, self.index, 3),
                        ));
                    },
                };
                (escaped, 2)
            },
            Some(c) if c.is_ascii() && c != '\'' => (c as u8, 1),
            _ => {
                return Err(Syntax::error(
                    "Character literals hold a single ASCII character",
                    &Span::new(&self.source, self.index, 2),
                ));
            },
        };

        match chars.next() {
            Some('\'') => {},
            _ => {
                return Err(Syntax::error(
                    "Expected `'` to close a character literal",
                    &Span::new(&self.source, self.index, body_length + 1),
                ));
            },
        }

        Ok(self.spanned(Token::Char(c), body_length + 2))
    }

    fn word(&mut self) -> Spanned<Token> {
        let length: usize = self
            .remaining()
            .chars()
            .take_while(|c| c.is_alphanumeric() || *c == '_')
            .map(|c| c.len_utf8())
            .sum();
        let word = &self.remaining()[..length];

        let token = match word {
            "Let" => Token::Let,
            "be" => Token::Be,
            "true" => Token::Bool(true),
            "false" => Token::Bool(false),
            word => match Operator::from_token(word) {
                Some(op) => Token::Op(op),
                None => Token::Word(word.to_string()),
            },
        };

        self.spanned(token, length)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn kinds(source: &str) -> Vec<Token> {
        Lexer::lex(Source::source(source))
            .unwrap()
            .into_iter()
            .map(|spanned| spanned.item)
            .collect()
    }

    #[test]
    fn scalar_sum() {
        assert_eq!(
            kinds("(1;2;+)."),
            vec![
                Token::OpenParen,
                Token::Int(1),
                Token::Semicolon,
                Token::Int(2),
                Token::Semicolon,
                Token::Op(Operator::Plus),
                Token::CloseParen,
                Token::Dot,
            ],
        );
    }

    #[test]
    fn longest_match_wins() {
        assert_eq!(
            kinds("{|| <= <> ~+ ++"),
            vec![
                Token::CurlyPar,
                Token::Op(Operator::LesserOrEquals),
                Token::Op(Operator::Differs),
                Token::Op(Operator::UnaryPlus),
                Token::Op(Operator::Increment),
            ],
        );
    }

    #[test]
    fn trailing_dot_is_not_a_fraction() {
        assert_eq!(kinds("42."), vec![Token::Int(42), Token::Dot]);
        assert_eq!(kinds("4.25."), vec![Token::Float(4.25), Token::Dot]);
    }

    #[test]
    fn words_and_keywords() {
        assert_eq!(
            kinds("Let x be sqrt true ssu"),
            vec![
                Token::Let,
                Token::Word("x".to_string()),
                Token::Be,
                Token::Op(Operator::Sqrt),
                Token::Bool(true),
                Token::Word("ssu".to_string()),
            ],
        );
    }

    #[test]
    fn literals() {
        assert_eq!(
            kinds("'a' '\\n' \"hi\\\"there\""),
            vec![
                Token::Char(b'a'),
                Token::Char(b'\n'),
                Token::Str("hi\"there".to_string()),
            ],
        );
    }

    #[test]
    fn path_alphabet_stays_wordy() {
        // Path letters reach the parser as plain words; only the
        // parser knows it is inside a path.
        assert_eq!(
            kinds("@ssu"),
            vec![Token::At, Token::Word("ssu".to_string())],
        );
    }

    #[test]
    fn bare_curly_is_an_error() {
        assert!(Lexer::lex(Source::source("{ 1 }")).is_err());
    }

    #[test]
    fn unterminated_string_is_an_error() {
        assert!(Lexer::lex(Source::source("\"oops")).is_err());
    }
}
