//! The annotation passes: sibling indexing, then lengths and
//! coordinates, phrase by phrase.
//!
//! Both passes are idempotent; the pipeline re-runs them after any
//! pass that reshapes the tree.

use crate::compiler::follow::{follow, Count};
use crate::construct::collection::{Collection, NodeId, Repetition, Tree};
use crate::construct::coordinate::Coordinate;
use crate::construct::path::Path;
use crate::construct::phrase::Program;

/// Annotates every phrase of the program.
///
/// Phrase roots are indexed by their phrase ordinal, so the tables of
/// different phrases get distinct names in the emitted program;
/// inside a phrase, siblings count from zero.
pub fn annotate(program: &mut Program) {
    for (ordinal, phrase) in program.phrases.iter().enumerate() {
        index_node(&mut program.tree, phrase.root, ordinal as i32);
        compute_chain(&mut program.tree, phrase.root);
    }
}

/// Assigns one index and recurses into the child list.
fn index_node(tree: &mut Tree, id: NodeId, index: i32) {
    tree[id].info.index = index;
    if let Some(list) = tree.children(id) {
        index_chain(tree, list);
    }
}

/// Assigns 0, 1, 2, … along a sibling chain.
pub(crate) fn index_chain(tree: &mut Tree, head: NodeId) {
    for (position, id) in tree.chain(head).into_iter().enumerate() {
        index_node(tree, id, position as i32);
    }
}

/// Post-order: children first, then the node's own length and
/// coordinate. Iteration is head to tail so a node's previous
/// sibling is always annotated before the node itself.
fn compute_chain(tree: &mut Tree, head: NodeId) {
    for id in tree.chain(head) {
        if let Some(list) = tree.children(id) {
            compute_chain(tree, list);
        }
        set_length(tree, id);
        set_coordinate(tree, id);
    }
}

/// What multiplies the child lengths of a repetition.
enum Multiplier {
    Times(usize),
    Path(Path),
}

fn set_length(tree: &mut Tree, id: NodeId) {
    let repetition = match &tree[id].kind {
        Collection::RepSeq(repetition, list) | Collection::RepPar(repetition, list) => {
            let multiplier = match repetition {
                Repetition::Times(times) => Multiplier::Times(*times),
                Repetition::Path(path) => Multiplier::Path(path.clone()),
            };
            Some((multiplier, *list))
        },
        // Atoms and plain collections fill a single slot: a nested
        // collection materialises as one cell holding its own table.
        _ => None,
    };

    let length = match repetition {
        None => Coordinate::Constant(1),
        Some((multiplier, list)) => {
            let sum = match list {
                Some(head) => tree.sum_chain_lengths(head),
                None => Coordinate::Constant(0),
            };
            let count = match multiplier {
                Multiplier::Times(times) => times as i64,
                // The statically known record length of the path; 0
                // when the path cannot be resolved yet. The unroll
                // pass recomputes it.
                Multiplier::Path(path) => follow(tree, id, &path, Count::LastRecord, None)
                    .map(|journey| journey.length as i64)
                    .unwrap_or(0),
            };
            Coordinate::times(Coordinate::Constant(count), sum)
        },
    };

    tree[id].info.length = length;
}

fn set_coordinate(tree: &mut Tree, id: NodeId) {
    let coordinate = match tree.previous(id) {
        None => Coordinate::Constant(0),
        Some(previous) => Coordinate::plus(
            tree[previous].info.coordinate.clone(),
            tree[previous].info.length.clone(),
        ),
    };
    tree[id].info.coordinate = coordinate;
}
