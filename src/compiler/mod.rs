//! The compiler pipeline.
//!
//! Each stage is its own module and can be driven on its own; the
//! [`compile`] function chains them the way the driver does:
//! lex → expand → parse → annotate → unroll → annotate → replace →
//! generate.

use std::rc::Rc;

pub mod syntax;
pub use syntax::Syntax;

pub mod lex;
pub use lex::Lexer;

pub mod expand;
pub use expand::Expander;

pub mod parse;
pub use parse::Parser;

pub mod annotate;
pub mod follow;
pub mod replace;
pub mod unroll;

pub mod gen;
pub use gen::CProgram;

use crate::common::Source;
use crate::construct::phrase::Program;

/// Lexes and expands a source into tokens.
#[inline(always)]
pub fn tokenize(source: Rc<Source>) -> Result<crate::construct::token::Tokens, Syntax> {
    let tokens = Lexer::lex(source)?;
    Expander::expand(tokens)
}

/// Parses a source into its phrase list.
#[inline(always)]
pub fn parse(source: Rc<Source>) -> Result<Program, Syntax> {
    let tokens = tokenize(source)?;
    Parser::parse(tokens)
}

/// Parses and fully analyses a source: annotations computed,
/// repetitions unrolled, resolvable path atoms substituted.
#[inline(always)]
pub fn analyze(source: Rc<Source>) -> Result<Program, Syntax> {
    let mut program = parse(source)?;
    annotate::annotate(&mut program);
    unroll::unroll(&mut program)?;
    annotate::annotate(&mut program);
    replace::replace(&mut program);
    Ok(program)
}

/// Compiles a source down to its C program.
#[inline(always)]
pub fn compile(source: Rc<Source>) -> Result<CProgram, Syntax> {
    let program = analyze(source)?;
    gen::generate(&program)
}
