//! Path-atom substitution.
//!
//! A path atom that resolves at compile time can be replaced by a
//! deep copy of its target, turning a reference into a value the
//! code generator can emit as a plain slot copy or recurse into.
//!
//! Whether a substitution is safe depends on program order, read off
//! the full-index tuples of the atom (`me`) and its target (`them`):
//!
//! - `me < them`: substitute unconditionally;
//! - `me > them`: substitute only when the target's subtree holds no
//!   further path atoms, since a copied reference could otherwise
//!   chase its own tail;
//! - the path does not resolve: leave the atom in place for the
//!   runtime to follow.
//!
//! The pass always runs to completion; skipped atoms are not errors.

use crate::compiler::annotate::index_chain;
use crate::compiler::follow::{follow, Count};
use crate::construct::atom::Atom;
use crate::construct::collection::{Collection, NodeId, Tree};
use crate::construct::path::Path;
use crate::construct::phrase::Program;

/// Substitutes every resolvable path atom in the program.
pub fn replace(program: &mut Program) {
    for position in 0..program.phrases.len() {
        let root = program.phrases[position].root;
        if let Some(replacement) = substitute(&mut program.tree, root) {
            program.phrases[position].root = replacement;
        } else {
            replace_chain(&mut program.tree, root);
        }
    }
}

/// What to do with one node during the walk.
enum Step {
    Substitute,
    Recurse(Option<NodeId>),
    Skip,
}

fn replace_chain(tree: &mut Tree, head: NodeId) {
    let mut current = Some(head);
    while let Some(id) = current {
        let next = tree.next(id);

        let step = match tree.kind(id) {
            Collection::Atom(Atom::Path(_)) => Step::Substitute,
            // Repetitions are gone by now; only the plain shapes
            // still nest.
            Collection::Seq(list)
            | Collection::Par(list)
            | Collection::CyclicSeq(list)
            | Collection::CyclicPar(list) => Step::Recurse(*list),
            _ => Step::Skip,
        };

        match step {
            Step::Substitute => {
                substitute(tree, id);
            },
            Step::Recurse(Some(list)) => replace_chain(tree, list),
            _ => {},
        }

        current = next;
    }
}

/// Tries to substitute one path atom; returns the replacement node
/// when the substitution happened.
fn substitute(tree: &mut Tree, id: NodeId) -> Option<NodeId> {
    let path: Path = match tree.kind(id) {
        Collection::Atom(Atom::Path(path)) => path.clone(),
        _ => return None,
    };

    let journey = follow(tree, id, &path, Count::LastRecord, None)?;
    let pointed = journey.destination;

    let me = tree.full_indexes(id);
    let them = tree.full_indexes(pointed);

    let safe = me < them || (me > them && !tree.contains_path(pointed));
    if !safe {
        return None;
    }

    // Copy first; the original is only detached once the replacement
    // is fully built.
    let copy = tree.copy_node(pointed);
    tree[copy].info = tree[id].info.clone();
    tree.replace_with_chain(id, copy);
    if let Some(list) = tree.children(copy) {
        index_chain(tree, list);
    }
    Some(copy)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::common::source::Source;
    use crate::compiler::annotate::annotate;
    use crate::compiler::syntax::Syntax;
    use crate::compiler::{lex::Lexer, parse::Parser};

    fn replaced(source: &str) -> Result<Program, Syntax> {
        let mut program = Parser::parse(Lexer::lex(Source::source(source))?)?;
        annotate(&mut program);
        replace(&mut program);
        Ok(program)
    }

    #[test]
    fn forward_reference_substitutes() {
        let program = replaced("(1;@p).").unwrap();
        assert_eq!(program.to_text(), "(1;1).\n");
        assert!(program.tree.well_formed(program.phrases[0].root));
    }

    #[test]
    fn substitution_keeps_the_reference_slot() {
        let program = replaced("(1;2;@pp).").unwrap();
        assert_eq!(program.to_text(), "(1;2;1).\n");

        let tree = &program.tree;
        let children = tree.chain(tree.children(program.phrases[0].root).unwrap());
        // The copy sits at the index and coordinate of the atom it
        // replaced.
        assert_eq!(tree[children[2]].info.index, 2);
        assert_eq!(tree[children[2]].info.coordinate.as_constant(), Some(2));
    }

    #[test]
    fn whole_collections_substitute() {
        let program = replaced("((1;2);@p).").unwrap();
        assert_eq!(program.to_text(), "((1;2);(1;2)).\n");
        assert!(program.tree.well_formed(program.phrases[0].root));
    }

    #[test]
    fn backward_reference_to_a_plain_target_substitutes() {
        let program = replaced("(@s;5).").unwrap();
        assert_eq!(program.to_text(), "(5;5).\n");
    }

    #[test]
    fn early_reference_substitutes_even_a_pathy_target() {
        // `me < them` substitutes unconditionally; the copy carries
        // the unresolved `@p` along, deferred to runtime, while the
        // original target still gets its own substitution.
        let program = replaced("(@s;(1;@p)).").unwrap();
        assert_eq!(program.to_text(), "((1;@p);(1;1)).\n");
    }

    #[test]
    fn late_reference_to_a_pathy_target_is_left_alone() {
        // `me > them` and the target subtree still holds a path atom
        // (the unresolvable `@uuuu` stays put): the substitution is
        // skipped and the atom survives.
        let program = replaced("((1;@uuuu);@p).").unwrap();
        assert_eq!(program.to_text(), "((1;@u u u u);@p).\n");
    }

    #[test]
    fn unresolvable_path_is_deferred_to_runtime() {
        let program = replaced("(1;@ppp).").unwrap();
        assert_eq!(program.to_text(), "(1;@p p p).\n");
    }
}
