use crate::common::span::{Span, Spanned};
use crate::compiler::syntax::{Note, Syntax};
use crate::construct::{
    atom::Atom,
    collection::{NodeId, Repetition, Tree},
    path::{Move, Path, Repeat},
    token::{Token, Tokens},
};
use crate::construct::phrase::Program;

/// The parser builds the phrase list out of the token stream.
/// It is a plain recursive descent parser; the grammar is small
/// enough that every production is one method.
pub struct Parser {
    tokens: Tokens,
    index: usize,
}

/// Which separator a bracketed list uses; the first one seen wins
/// and the rest must agree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Separator {
    Seq,
    Par,
}

impl Parser {
    /// Parses a whole token stream into a program.
    pub fn parse(tokens: Tokens) -> Result<Program, Syntax> {
        let mut parser = Parser { tokens, index: 0 };
        let mut program = Program::new();

        while parser.peek().is_some() {
            let root = parser.collection(&mut program.tree)?;
            parser.expect(Token::Dot, "every phrase ends with a `.`")?;
            program.append(root);
        }

        Ok(program)
    }

    ////////////////////////////////////////////////////////////////////////
    // Token plumbing.
    ////////////////////////////////////////////////////////////////////////

    fn peek(&self) -> Option<&Spanned<Token>> {
        self.tokens.get(self.index)
    }

    fn next(&mut self) -> Option<Spanned<Token>> {
        let token = self.tokens.get(self.index).cloned();
        if token.is_some() {
            self.index += 1;
        }
        token
    }

    /// The span to blame right now: the next token's, or the end of
    /// the last one.
    fn here(&self) -> Span {
        match self.peek() {
            Some(token) => token.span.clone(),
            None => match self.tokens.last() {
                Some(token) => token.span.clone(),
                None => Span::empty(),
            },
        }
    }

    fn expect(&mut self, token: Token, hint: &str) -> Result<Span, Syntax> {
        match self.next() {
            Some(found) if found.item == token => Ok(found.span),
            Some(found) => Err(Syntax::error_with_note(
                &format!("Expected {}, found {}", token, found.item),
                Note::new_with_hint(hint, &found.span),
            )),
            None => Err(Syntax::error_with_note(
                &format!("Expected {}, found the end of the source", token),
                Note::new_with_hint(hint, &self.here()),
            )),
        }
    }

    ////////////////////////////////////////////////////////////////////////
    // Collections.
    ////////////////////////////////////////////////////////////////////////

    fn collection(&mut self, tree: &mut Tree) -> Result<NodeId, Syntax> {
        match self.peek().map(|t| t.item.clone()) {
            Some(Token::OpenParen) => self.bracketed(tree),
            Some(Token::CurlySeq) => self.curly(tree, Separator::Seq),
            Some(Token::CurlyPar) => self.curly(tree, Separator::Par),
            Some(_) => self.atom(tree),
            None => Err(Syntax::error(
                "Expected a collection, found the end of the source",
                &self.here(),
            )),
        }
    }

    /// `( … ; … )` or `( … || … )` — the separator decides between a
    /// sequential and a parallel collection. A single element with no
    /// separator reads as sequential.
    fn bracketed(&mut self, tree: &mut Tree) -> Result<NodeId, Syntax> {
        let open = self.expect(Token::OpenParen, "a collection opens here")?;
        let (head, separator) = self.elements(tree, Token::CloseParen)?;
        let close = self.expect(Token::CloseParen, "this collection never closes")?;

        let span = Span::combine(&open, &close);
        Ok(match separator {
            Separator::Par => tree.par(Some(head), span),
            Separator::Seq => tree.seq(Some(head), span),
        })
    }

    /// `{; … }` or `{|| … }`, then an optional repetition suffix:
    /// a positive count or `#` and a path. With a suffix this is a
    /// repetition, without one a cyclic collection.
    fn curly(&mut self, tree: &mut Tree, separator: Separator) -> Result<NodeId, Syntax> {
        let open = match separator {
            Separator::Seq => self.expect(Token::CurlySeq, "a cyclic collection opens here")?,
            Separator::Par => self.expect(Token::CurlyPar, "a cyclic collection opens here")?,
        };
        let (head, found) = self.elements(tree, Token::CloseCurly)?;
        if found != separator && tree.next(head).is_some() {
            return Err(Syntax::error(
                "Cannot mix `;` and `||` inside one collection",
                &self.here(),
            ));
        }
        let close = self.expect(Token::CloseCurly, "this collection never closes")?;

        match self.peek().map(|t| t.item.clone()) {
            Some(Token::Int(times)) => {
                let suffix = self.next().map(|t| t.span).unwrap_or_else(Span::empty);
                if times <= 0 {
                    return Err(Syntax::error(
                        "A repetition count must be positive",
                        &suffix,
                    ));
                }
                let span = Span::combine(&open, &suffix);
                let repetition = Repetition::Times(times as usize);
                Ok(match separator {
                    Separator::Seq => tree.rep_seq(repetition, Some(head), span),
                    Separator::Par => tree.rep_par(repetition, Some(head), span),
                })
            },
            Some(Token::Hash) => {
                self.next();
                let path = self.path()?;
                let span = Span::combine(&open, &self.here());
                let repetition = Repetition::Path(path);
                Ok(match separator {
                    Separator::Seq => tree.rep_seq(repetition, Some(head), span),
                    Separator::Par => tree.rep_par(repetition, Some(head), span),
                })
            },
            _ => {
                let span = Span::combine(&open, &close);
                Ok(match separator {
                    Separator::Seq => tree.cyclic_seq(Some(head), span),
                    Separator::Par => tree.cyclic_par(Some(head), span),
                })
            },
        }
    }

    /// The elements of a bracketed collection, up to (not consuming)
    /// `close`. Returns the chain head and the separator in use.
    fn elements(&mut self, tree: &mut Tree, close: Token) -> Result<(NodeId, Separator), Syntax> {
        let head = self.collection(tree)?;
        let mut separator = None;

        loop {
            match self.peek().map(|t| t.item.clone()) {
                Some(token) if token == close => break,
                Some(Token::Semicolon) | Some(Token::Parallel) => {
                    let token = match self.next() {
                        Some(token) => token,
                        None => break,
                    };
                    let found = match token.item {
                        Token::Parallel => Separator::Par,
                        _ => Separator::Seq,
                    };
                    match separator {
                        None => separator = Some(found),
                        Some(used) if used == found => {},
                        Some(_) => {
                            return Err(Syntax::error(
                                "Cannot mix `;` and `||` inside one collection",
                                &token.span,
                            ));
                        },
                    }
                    let element = self.collection(tree)?;
                    tree.append_sibling(head, element);
                },
                Some(other) => {
                    return Err(Syntax::error(
                        &format!("Expected a separator or {}, found {}", close, other),
                        &self.here(),
                    ));
                },
                None => break,
            }
        }

        Ok((head, separator.unwrap_or(Separator::Seq)))
    }

    ////////////////////////////////////////////////////////////////////////
    // Atoms.
    ////////////////////////////////////////////////////////////////////////

    fn atom(&mut self, tree: &mut Tree) -> Result<NodeId, Syntax> {
        let token = match self.next() {
            Some(token) => token,
            None => {
                return Err(Syntax::error(
                    "Expected an atom, found the end of the source",
                    &self.here(),
                ));
            },
        };

        let atom = match token.item {
            Token::Int(i) => Atom::Int(i),
            Token::Float(x) => Atom::Float(x),
            Token::Bool(b) => Atom::Bool(b),
            Token::Char(c) => Atom::Char(c),
            Token::Str(s) => Atom::String(s),
            Token::Op(op) => Atom::Operator(op),
            Token::At => {
                let path = self.path()?;
                let span = Span::combine(&token.span, &self.here());
                return Ok(tree.atom(Atom::Path(path), span));
            },
            other => {
                return Err(Syntax::error(
                    &format!("Expected an atom, found {}", other),
                    &token.span,
                ));
            },
        };

        Ok(tree.atom(atom, token.span))
    }

    ////////////////////////////////////////////////////////////////////////
    // Paths.
    ////////////////////////////////////////////////////////////////////////

    /// A non-empty sequence of moves. Single letters may be run
    /// together (`ssu`); `[ … ]` records a part; `( … )` followed by
    /// a count or `*` repeats.
    fn path(&mut self) -> Result<Path, Syntax> {
        let mut path = Path::new();

        loop {
            match self.peek().map(|t| t.item.clone()) {
                Some(Token::Word(word)) => {
                    let span = self.next().map(|t| t.span).unwrap_or_else(Span::empty);
                    for letter in word.chars() {
                        path.push(match letter {
                            'u' => Move::Up,
                            'd' => Move::Down,
                            'p' => Move::Pre,
                            's' => Move::Suc,
                            'r' => Move::Rewind,
                            other => {
                                return Err(Syntax::error(
                                    &format!("Unknown path move `{}`", other),
                                    &span,
                                ));
                            },
                        });
                    }
                },
                Some(Token::OpenSquare) => {
                    self.next();
                    let inner = self.path()?;
                    self.expect(Token::CloseSquare, "this recorded group never closes")?;
                    path.push(Move::Part(inner));
                },
                Some(Token::OpenParen) => {
                    self.next();
                    let inner = self.path()?;
                    self.expect(Token::CloseParen, "this repeated group never closes")?;
                    match self.next() {
                        Some(Spanned {
                            item: Token::Int(times),
                            span,
                        }) => {
                            if times < 0 {
                                return Err(Syntax::error(
                                    "A path repetition count cannot be negative",
                                    &span,
                                ));
                            }
                            path.push(Move::Rep(Repeat::Constant(times as usize), inner));
                        },
                        Some(Spanned {
                            item: Token::Op(wave_common::operator::Operator::Times),
                            ..
                        }) => path.push(Move::Rep(Repeat::Infinite, inner)),
                        found => {
                            let span = found.map(|t| t.span).unwrap_or_else(|| self.here());
                            return Err(Syntax::error_with_note(
                                "A repeated group needs a count or `*`",
                                Note::new_with_hint("write `( … ) 3` or `( … ) *`", &span),
                            ));
                        },
                    }
                },
                _ => break,
            }
        }

        if path.is_empty() {
            return Err(Syntax::error("Expected a path", &self.here()));
        }
        Ok(path)
    }
}
