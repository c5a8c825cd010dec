//! The path interpreter.
//!
//! [`follow`] walks the collection tree under a path program and
//! reports where it ended up and how far it travelled. It is a pure
//! function of its inputs: the tree is never touched, and the only
//! allocation is the optional inverse record handed back to the
//! caller.
//!
//! Recursion depth is bounded by the static nesting of the path
//! (`Part` and `Rep` groups), not by the size of the tree — an
//! infinite repetition iterates in place.

use crate::construct::collection::{NodeId, Tree};
use crate::construct::path::{Move, Path, Repeat};

/// What the returned length counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Count {
    /// Every basic move performed.
    All,
    /// Only the moves recorded by the most recent `Part` group (a
    /// `Rep` whose body opens with a `Part` re-records per
    /// iteration). Path-driven repetitions unroll by this number.
    LastRecord,
}

/// A successful walk: where the cursor ended, and the step count
/// selected by [`Count`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Journey {
    pub destination: NodeId,
    pub length: usize,
}

/// Follows `path` from `start`.
///
/// Returns `None` when any unconditional move walks off the tree —
/// `u` off the root, `d` on an atom, `p` off the head, `s` off the
/// tail — or when a constant repetition cannot complete. `None` is
/// the sole invalidity signal.
///
/// When `record_buffer` is given, it receives the inverse of every
/// basic move performed, in undo order: replaying the buffer from
/// the destination leads back to `start`.
pub fn follow(
    tree: &Tree,
    start: NodeId,
    path: &Path,
    count: Count,
    record_buffer: Option<&mut Path>,
) -> Option<Journey> {
    let mut record = None;
    let (destination, length) = walk(
        tree,
        Some(start),
        &path.moves,
        &mut record,
        record_buffer,
        count == Count::All,
    );

    destination.map(|destination| Journey {
        destination,
        length,
    })
}

/// One level of the interpreter. `record` is the most recent
/// completed `Part` group, stored as the inverse of the moves it
/// performed; `rewind` accumulates inverses for the caller.
fn walk(
    tree: &Tree,
    start: Option<NodeId>,
    moves: &[Move],
    record: &mut Option<Path>,
    mut rewind: Option<&mut Path>,
    count_all: bool,
) -> (Option<NodeId>, usize) {
    let mut cursor = start;
    let mut size = 0;

    for step in moves {
        let current = match cursor {
            Some(current) => current,
            None => break,
        };

        match step {
            Move::Up | Move::Down | Move::Pre | Move::Suc => {
                if count_all {
                    size += 1;
                }
                if let Some(buffer) = rewind.as_deref_mut() {
                    if let Some(inverse) = step.inverse() {
                        // Undo order: the newest move is undone first.
                        buffer.push_front(inverse);
                    }
                }
                cursor = match step {
                    Move::Up => tree.parent(current),
                    Move::Down => tree.down(current),
                    Move::Pre => tree.previous(current),
                    Move::Suc => tree.next(current),
                    _ => unreachable!(),
                };
            },

            Move::Rewind => {
                // Replay the last record; with no record, a no-op.
                if let Some(recorded) = record.clone() {
                    let (after, steps) = walk(
                        tree,
                        cursor,
                        &recorded.moves,
                        record,
                        rewind.as_deref_mut(),
                        count_all,
                    );
                    cursor = after;
                    if count_all {
                        size += steps;
                    }
                }
            },

            Move::Part(inner) => {
                let mut inverse = Path::new();
                let (after, steps) =
                    walk(tree, cursor, &inner.moves, record, Some(&mut inverse), true);
                cursor = after;
                if count_all {
                    size += steps;
                } else {
                    size = steps;
                }
                if let Some(buffer) = rewind.as_deref_mut() {
                    buffer.prepend(inverse.clone());
                }
                *record = Some(inverse);
            },

            Move::Rep(repeat, inner) => {
                let (after, steps) = repeat_moves(
                    tree,
                    cursor,
                    *repeat,
                    inner,
                    record,
                    rewind.as_deref_mut(),
                    count_all,
                    size,
                );
                cursor = after;
                size = steps;
            },
        }
    }

    (cursor, size)
}

/// Runs a `Rep` move: the inner path either a constant number of
/// times (failing if any iteration walks off the tree), or until it
/// would (keeping the last valid position).
#[allow(clippy::too_many_arguments)]
fn repeat_moves(
    tree: &Tree,
    start: Option<NodeId>,
    repeat: Repeat,
    inner: &Path,
    record: &mut Option<Path>,
    mut rewind: Option<&mut Path>,
    count_all: bool,
    size_in: usize,
) -> (Option<NodeId>, usize) {
    // A repetition only re-records when its body opens with a
    // recorded group.
    let records = matches!(inner.first(), Some(Move::Part(_)));
    let mut cursor = start;
    let mut size = size_in;

    let mut iteration = 0;
    loop {
        match repeat {
            Repeat::Constant(times) if iteration >= times => break,
            _ => {},
        }
        if cursor.is_none() {
            break;
        }
        iteration += 1;

        let save = cursor;
        let mut inverse = Path::new();
        let (after, steps) = walk(
            tree,
            cursor,
            &inner.moves,
            record,
            Some(&mut inverse),
            count_all,
        );

        if after.is_none() {
            match repeat {
                // The cursor stops at the last valid position.
                Repeat::Infinite => cursor = save,
                // A constant repetition must complete.
                Repeat::Constant(_) => cursor = None,
            }
            break;
        }

        if matches!(repeat, Repeat::Infinite) && inverse.is_empty() && after == save {
            // The body moved nowhere; running it again never will.
            break;
        }

        cursor = after;
        if count_all {
            size += steps;
        } else if records {
            size = steps;
        }
        if let Some(buffer) = rewind.as_deref_mut() {
            buffer.prepend(inverse.clone());
        }
        if records {
            *record = Some(inverse);
        }
    }

    (cursor, size)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::common::span::Span;
    use crate::construct::atom::Atom;

    fn path(moves: Vec<Move>) -> Path {
        Path { moves }
    }

    /// Builds `(1;2;(3;4);5)` and returns the interesting nodes.
    fn playground(tree: &mut Tree) -> (NodeId, Vec<NodeId>, Vec<NodeId>) {
        let one = tree.atom(Atom::Int(1), Span::empty());
        let two = tree.atom(Atom::Int(2), Span::empty());

        let three = tree.atom(Atom::Int(3), Span::empty());
        let four = tree.atom(Atom::Int(4), Span::empty());
        tree.append_sibling(three, four);
        let inner = tree.seq(Some(three), Span::empty());

        let five = tree.atom(Atom::Int(5), Span::empty());
        tree.append_sibling(one, two);
        tree.append_sibling(one, inner);
        tree.append_sibling(one, five);
        let root = tree.seq(Some(one), Span::empty());

        (root, vec![one, two, inner, five], vec![three, four])
    }

    #[test]
    fn basic_moves() {
        let mut tree = Tree::new();
        let (root, top, inner) = playground(&mut tree);

        // d: into the child list.
        let journey = follow(&tree, root, &path(vec![Move::Down]), Count::All, None).unwrap();
        assert_eq!(journey.destination, top[0]);
        assert_eq!(journey.length, 1);

        // d s s d s: to the 4.
        let journey = follow(
            &tree,
            root,
            &path(vec![Move::Down, Move::Suc, Move::Suc, Move::Down, Move::Suc]),
            Count::All,
            None,
        )
        .unwrap();
        assert_eq!(journey.destination, inner[1]);
        assert_eq!(journey.length, 5);

        // u from a child.
        let journey = follow(&tree, inner[0], &path(vec![Move::Up]), Count::All, None).unwrap();
        assert_eq!(journey.destination, top[2]);
    }

    #[test]
    fn falling_off_is_invalid() {
        let mut tree = Tree::new();
        let (root, top, _) = playground(&mut tree);

        assert!(follow(&tree, root, &path(vec![Move::Up]), Count::All, None).is_none());
        assert!(follow(&tree, top[0], &path(vec![Move::Pre]), Count::All, None).is_none());
        assert!(follow(&tree, top[3], &path(vec![Move::Suc]), Count::All, None).is_none());
        // d on an atom.
        assert!(follow(&tree, top[0], &path(vec![Move::Down]), Count::All, None).is_none());
    }

    #[test]
    fn constant_repetition() {
        let mut tree = Tree::new();
        let (_, top, _) = playground(&mut tree);

        let two_right = path(vec![Move::Rep(
            Repeat::Constant(2),
            path(vec![Move::Suc]),
        )]);
        let journey = follow(&tree, top[0], &two_right, Count::All, None).unwrap();
        assert_eq!(journey.destination, top[2]);
        assert_eq!(journey.length, 2);

        // Four steps right runs off the tail: invalid.
        let four_right = path(vec![Move::Rep(
            Repeat::Constant(4),
            path(vec![Move::Suc]),
        )]);
        assert!(follow(&tree, top[0], &four_right, Count::All, None).is_none());
    }

    #[test]
    fn infinite_repetition_stops_at_the_tail() {
        let mut tree = Tree::new();
        let (_, top, _) = playground(&mut tree);

        let rightmost = path(vec![Move::Rep(Repeat::Infinite, path(vec![Move::Suc]))]);
        let journey = follow(&tree, top[0], &rightmost, Count::All, None).unwrap();
        assert_eq!(journey.destination, top[3]);
        assert_eq!(journey.length, 3);
    }

    #[test]
    fn part_and_rewind() {
        let mut tree = Tree::new();
        let (_, top, _) = playground(&mut tree);

        // [s s] r: walk two right, then rewind back.
        let there_and_back = path(vec![
            Move::Part(path(vec![Move::Suc, Move::Suc])),
            Move::Rewind,
        ]);
        let journey = follow(&tree, top[0], &there_and_back, Count::All, None).unwrap();
        assert_eq!(journey.destination, top[0]);
        assert_eq!(journey.length, 4);
    }

    #[test]
    fn record_only_counts_the_last_part() {
        let mut tree = Tree::new();
        let (_, top, _) = playground(&mut tree);

        // s [s s]: one unrecorded step, then a two-step part.
        let p = path(vec![
            Move::Suc,
            Move::Part(path(vec![Move::Suc, Move::Suc])),
        ]);
        let journey = follow(&tree, top[0], &p, Count::LastRecord, None).unwrap();
        assert_eq!(journey.length, 2);

        // Without any part, nothing is recorded.
        let bare = path(vec![Move::Suc]);
        let journey = follow(&tree, top[0], &bare, Count::LastRecord, None).unwrap();
        assert_eq!(journey.length, 0);
    }

    #[test]
    fn part_of_infinite_rep_records_the_sweep() {
        let mut tree = Tree::new();
        let (_, top, _) = playground(&mut tree);

        // [(s)*]: a part recording the walk to the tail.
        let sweep = path(vec![Move::Part(path(vec![Move::Rep(
            Repeat::Infinite,
            path(vec![Move::Suc]),
        )]))]);
        let journey = follow(&tree, top[0], &sweep, Count::LastRecord, None).unwrap();
        assert_eq!(journey.destination, top[3]);
        assert_eq!(journey.length, 3);
    }

    #[test]
    fn inverse_record_returns_home() {
        let mut tree = Tree::new();
        let (root, _, inner) = playground(&mut tree);

        let p = path(vec![Move::Down, Move::Suc, Move::Suc, Move::Down, Move::Suc]);
        let mut buffer = Path::new();
        let journey = follow(&tree, root, &p, Count::All, Some(&mut buffer)).unwrap();
        assert_eq!(journey.destination, inner[1]);

        // Replaying the buffer from the destination walks back.
        let home = follow(&tree, journey.destination, &buffer, Count::All, None).unwrap();
        assert_eq!(home.destination, root);
    }

    #[test]
    fn determinism() {
        let mut tree = Tree::new();
        let (root, _, _) = playground(&mut tree);

        let p = path(vec![
            Move::Down,
            Move::Part(path(vec![Move::Suc, Move::Suc])),
            Move::Rewind,
            Move::Rep(Repeat::Infinite, path(vec![Move::Suc])),
        ]);
        let first = follow(&tree, root, &p, Count::All, None);
        let second = follow(&tree, root, &p, Count::All, None);
        assert_eq!(first, second);
    }

    #[test]
    fn rewind_without_record_is_a_no_op() {
        let mut tree = Tree::new();
        let (_, top, _) = playground(&mut tree);

        let p = path(vec![Move::Suc, Move::Rewind]);
        let journey = follow(&tree, top[0], &p, Count::All, None).unwrap();
        assert_eq!(journey.destination, top[1]);
        assert_eq!(journey.length, 1);
    }
}
