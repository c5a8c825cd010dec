//! Repetition unrolling.
//!
//! Every repetition is replaced by the flat expansion of its child
//! list: a constant repetition by that many copies, a path-driven
//! repetition by as many copies as the path records (see the path
//! interpreter). Inner repetitions expand before the count of an
//! enclosing path repetition is measured, so sibling counts are
//! already final when a path sweeps over them.
//!
//! The expansion splices into the parent's sibling chain in place; a
//! repetition at the root of a phrase has no chain to join, so it is
//! wrapped in a fresh `Seq` or `Par` instead.

use crate::compiler::follow::{follow, Count};
use crate::compiler::syntax::{Note, Syntax};
use crate::construct::collection::{Collection, NodeId, Repetition, Tree};
use crate::construct::phrase::Program;

/// Unrolls every repetition in the program. The tree needs to be
/// re-annotated afterwards.
pub fn unroll(program: &mut Program) -> Result<(), Syntax> {
    for position in 0..program.phrases.len() {
        let root = program.phrases[position].root;
        let tree = &mut program.tree;

        if tree.kind(root).is_repetition() {
            let parallel = tree.kind(root).is_parallel();
            let span = tree[root].span.clone();
            let expanded = expand_repetition(tree, root)?;
            let wrapper = if parallel {
                tree.par(Some(expanded), span)
            } else {
                tree.seq(Some(expanded), span)
            };
            program.phrases[position].root = wrapper;
        } else {
            unroll_chain(tree, root)?;
        }
    }
    Ok(())
}

/// What to do with one node during the walk.
enum Action {
    Expand,
    Recurse(Option<NodeId>),
    Skip,
}

fn unroll_chain(tree: &mut Tree, head: NodeId) -> Result<(), Syntax> {
    let mut current = Some(head);
    while let Some(id) = current {
        // The continuation is pinned down before any splicing.
        let next = tree.next(id);

        let action = match tree.kind(id) {
            Collection::RepSeq(..) | Collection::RepPar(..) => Action::Expand,
            Collection::Atom(_) => Action::Skip,
            kind => Action::Recurse(kind.list()),
        };

        match action {
            Action::Expand => {
                let expanded = expand_repetition(tree, id)?;
                tree.replace_with_chain(id, expanded);
            },
            Action::Recurse(Some(list)) => unroll_chain(tree, list)?,
            _ => {},
        }

        current = next;
    }
    Ok(())
}

/// Expands one repetition node into a detached sibling chain made of
/// its (recursively unrolled) child list plus the needed copies.
fn expand_repetition(tree: &mut Tree, id: NodeId) -> Result<NodeId, Syntax> {
    let span = tree[id].span.clone();
    let list = match tree.children(id) {
        Some(list) => list,
        None => return Err(Syntax::error("A repetition with no body", &span)),
    };

    // Children first: a path measured over the siblings of this node
    // must see them in final, repetition-free shape.
    unroll_chain(tree, list)?;
    let list = match tree.children(id) {
        Some(list) => list,
        None => return Err(Syntax::error("A repetition with no body", &span)),
    };

    let repetition = match tree.kind(id) {
        Collection::RepSeq(repetition, _) | Collection::RepPar(repetition, _) => {
            repetition.clone()
        },
        _ => return Err(Syntax::error("Only repetitions can be unrolled", &span)),
    };

    let count = match repetition {
        Repetition::Times(times) => times,
        Repetition::Path(path) => {
            let journey = follow(tree, id, &path, Count::LastRecord, None);
            match journey {
                None => {
                    return Err(Syntax::error_with_note(
                        "The path of this repetition is not valid here",
                        Note::new_with_hint(
                            "the path walks off the collection tree",
                            &span,
                        ),
                    ));
                },
                Some(journey) if journey.length == 0 => {
                    return Err(Syntax::error_with_note(
                        "The path of this repetition did not record any steps",
                        Note::new_with_hint(
                            "wrap the moves to count in `[ … ]`",
                            &span,
                        ),
                    ));
                },
                Some(journey) => journey.length,
            }
        },
    };

    for _ in 1..count {
        let copy = tree.copy_chain(list);
        tree.append_sibling(list, copy);
    }

    tree.detach_children(id);
    Ok(list)
}
