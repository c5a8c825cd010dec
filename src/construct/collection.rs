//! The collection tree.
//!
//! Collections form a tree with parent, previous-sibling and
//! next-sibling navigation on top of the child lists. Rather than
//! juggling owning and non-owning pointers, all nodes live in an
//! arena ([`Tree`]) and refer to each other through stable
//! [`NodeId`]s; the arena hands out copies with fresh ids, and
//! detached nodes simply become unreachable.

use std::fmt::Write as _;
use std::ops::{Index, IndexMut};

use crate::common::span::Span;
use crate::construct::{
    atom::Atom,
    coordinate::Coordinate,
    index::IndexList,
    info::Info,
    path::Path,
};

/// A stable handle to a node in a [`Tree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(u32);

impl NodeId {
    fn index(self) -> usize {
        self.0 as usize
    }
}

/// How a repetition describes its repeat count: a literal number of
/// times, or a path whose recorded length is the count.
#[derive(Debug, Clone, PartialEq)]
pub enum Repetition {
    Times(usize),
    Path(Path),
}

/// The shape of a collection node. The child list, when there is
/// one, is referenced by its head; siblings hang off one another.
#[derive(Debug, Clone, PartialEq)]
pub enum Collection {
    Atom(Atom),
    Seq(Option<NodeId>),
    Par(Option<NodeId>),
    CyclicSeq(Option<NodeId>),
    CyclicPar(Option<NodeId>),
    RepSeq(Repetition, Option<NodeId>),
    RepPar(Repetition, Option<NodeId>),
}

impl Collection {
    /// The head of the child list, whatever the shape.
    pub fn list(&self) -> Option<NodeId> {
        match self {
            Collection::Atom(_) => None,
            Collection::Seq(list)
            | Collection::Par(list)
            | Collection::CyclicSeq(list)
            | Collection::CyclicPar(list)
            | Collection::RepSeq(_, list)
            | Collection::RepPar(_, list) => *list,
        }
    }

    pub fn is_atom(&self) -> bool {
        matches!(self, Collection::Atom(_))
    }

    pub fn is_repetition(&self) -> bool {
        matches!(self, Collection::RepSeq(..) | Collection::RepPar(..))
    }

    /// The shapes whose bodies execute in parallel.
    pub fn is_parallel(&self) -> bool {
        matches!(
            self,
            Collection::Par(_) | Collection::CyclicPar(_) | Collection::RepPar(..)
        )
    }

    fn set_list(&mut self, new: Option<NodeId>) {
        match self {
            Collection::Atom(_) => {},
            Collection::Seq(list)
            | Collection::Par(list)
            | Collection::CyclicSeq(list)
            | Collection::CyclicPar(list)
            | Collection::RepSeq(_, list)
            | Collection::RepPar(_, list) => *list = new,
        }
    }
}

/// One node of the tree: its shape, its navigation links, its
/// annotation and the source region it came from.
#[derive(Debug)]
pub struct Node {
    pub(crate) kind: Collection,
    pub(crate) next: Option<NodeId>,
    pub(crate) previous: Option<NodeId>,
    pub(crate) parent: Option<NodeId>,
    pub info: Info,
    pub span: Span,
}

/// The arena all collection nodes live in.
#[derive(Debug, Default)]
pub struct Tree {
    nodes: Vec<Node>,
}

impl Index<NodeId> for Tree {
    type Output = Node;

    fn index(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }
}

impl IndexMut<NodeId> for Tree {
    fn index_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.index()]
    }
}

impl Tree {
    pub fn new() -> Tree {
        Tree::default()
    }

    /// The number of nodes ever allocated, detached ones included.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    fn alloc(&mut self, kind: Collection, span: Span) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(Node {
            kind,
            next: None,
            previous: None,
            parent: None,
            info: Info::default(),
            span,
        });
        id
    }

    ////////////////////////////////////////////////////////////////////////
    // Construction.
    ////////////////////////////////////////////////////////////////////////

    pub fn atom(&mut self, atom: Atom, span: Span) -> NodeId {
        self.alloc(Collection::Atom(atom), span)
    }

    pub fn seq(&mut self, list: Option<NodeId>, span: Span) -> NodeId {
        self.with_list(Collection::Seq(list), list, span)
    }

    pub fn par(&mut self, list: Option<NodeId>, span: Span) -> NodeId {
        self.with_list(Collection::Par(list), list, span)
    }

    pub fn cyclic_seq(&mut self, list: Option<NodeId>, span: Span) -> NodeId {
        self.with_list(Collection::CyclicSeq(list), list, span)
    }

    pub fn cyclic_par(&mut self, list: Option<NodeId>, span: Span) -> NodeId {
        self.with_list(Collection::CyclicPar(list), list, span)
    }

    pub fn rep_seq(&mut self, repetition: Repetition, list: Option<NodeId>, span: Span) -> NodeId {
        self.with_list(Collection::RepSeq(repetition, list), list, span)
    }

    pub fn rep_par(&mut self, repetition: Repetition, list: Option<NodeId>, span: Span) -> NodeId {
        self.with_list(Collection::RepPar(repetition, list), list, span)
    }

    fn with_list(&mut self, kind: Collection, list: Option<NodeId>, span: Span) -> NodeId {
        let id = self.alloc(kind, span);
        if let Some(head) = list {
            self.reparent(head, Some(id));
        }
        id
    }

    ////////////////////////////////////////////////////////////////////////
    // Navigation.
    ////////////////////////////////////////////////////////////////////////

    pub fn kind(&self, id: NodeId) -> &Collection {
        &self[id].kind
    }

    pub fn next(&self, id: NodeId) -> Option<NodeId> {
        self[id].next
    }

    pub fn previous(&self, id: NodeId) -> Option<NodeId> {
        self[id].previous
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self[id].parent
    }

    /// The head of the child list, whatever the shape.
    pub fn children(&self, id: NodeId) -> Option<NodeId> {
        self[id].kind.list()
    }

    /// Where the `d` move goes: into the child list of a plain `Seq`
    /// or `Par`, and nowhere else.
    pub fn down(&self, id: NodeId) -> Option<NodeId> {
        match &self[id].kind {
            Collection::Seq(list) | Collection::Par(list) => *list,
            _ => None,
        }
    }

    /// The last node of the sibling chain through `id`.
    pub fn last_sibling(&self, id: NodeId) -> NodeId {
        let mut current = id;
        while let Some(next) = self[current].next {
            current = next;
        }
        current
    }

    /// The sibling chain from `head` to the end, in order.
    pub fn chain(&self, head: NodeId) -> Vec<NodeId> {
        let mut ids = Vec::new();
        let mut current = Some(head);
        while let Some(id) = current {
            ids.push(id);
            current = self[id].next;
        }
        ids
    }

    ////////////////////////////////////////////////////////////////////////
    // Structure editing.
    ////////////////////////////////////////////////////////////////////////

    /// Walks to the tail of `at`'s sibling chain and splices the
    /// chain of `other` after it, re-parenting the newcomers.
    pub fn append_sibling(&mut self, at: NodeId, other: NodeId) {
        let last = self.last_sibling(at);
        self[last].next = Some(other);
        self[other].previous = Some(last);
        let parent = self[last].parent;
        self.reparent(other, parent);
    }

    /// Points every node of the chain through `head` at `parent`.
    pub fn reparent(&mut self, head: NodeId, parent: Option<NodeId>) {
        for id in self.chain(head) {
            self[id].parent = parent;
        }
    }

    /// Replaces `old` inside its sibling chain by the chain starting
    /// at `head`, patching the neighbour links and the parent's child
    /// list. `old` itself is detached and becomes unreachable.
    pub fn replace_with_chain(&mut self, old: NodeId, head: NodeId) {
        let previous = self[old].previous;
        let next = self[old].next;
        let parent = self[old].parent;
        let tail = self.last_sibling(head);

        self.reparent(head, parent);
        self[head].previous = previous;
        match previous {
            Some(p) => self[p].next = Some(head),
            None => {
                if let Some(par) = parent {
                    if self[par].kind.list() == Some(old) {
                        self[par].kind.set_list(Some(head));
                    }
                }
            },
        }

        self[tail].next = next;
        if let Some(n) = next {
            self[n].previous = Some(tail);
        }

        self[old].next = None;
        self[old].previous = None;
        self[old].parent = None;
    }

    /// Drops the link from `id` to its child list (the children keep
    /// existing; they are just no longer reachable through `id`).
    pub fn detach_children(&mut self, id: NodeId) {
        self[id].kind.set_list(None);
    }

    ////////////////////////////////////////////////////////////////////////
    // Copying.
    ////////////////////////////////////////////////////////////////////////

    /// Deep-copies one node and everything below it. The copy has no
    /// siblings and no parent; annotations and spans are carried
    /// over.
    pub fn copy_node(&mut self, id: NodeId) -> NodeId {
        let (kind, span, info) = {
            let node = &self[id];
            (node.kind.clone(), node.span.clone(), node.info.clone())
        };

        let copy = self.alloc(Collection::Atom(Atom::Unknown), span);
        let kind = match kind {
            Collection::Atom(atom) => Collection::Atom(atom),
            Collection::Seq(list) => Collection::Seq(self.copy_list(list, copy)),
            Collection::Par(list) => Collection::Par(self.copy_list(list, copy)),
            Collection::CyclicSeq(list) => Collection::CyclicSeq(self.copy_list(list, copy)),
            Collection::CyclicPar(list) => Collection::CyclicPar(self.copy_list(list, copy)),
            Collection::RepSeq(repetition, list) => {
                Collection::RepSeq(repetition, self.copy_list(list, copy))
            },
            Collection::RepPar(repetition, list) => {
                Collection::RepPar(repetition, self.copy_list(list, copy))
            },
        };
        self[copy].kind = kind;
        self[copy].info = info;
        copy
    }

    /// Deep-copies a whole sibling chain; returns the new head.
    pub fn copy_chain(&mut self, head: NodeId) -> NodeId {
        let originals = self.chain(head);
        let mut copies = Vec::with_capacity(originals.len());
        for id in originals {
            copies.push(self.copy_node(id));
        }

        for pair in copies.windows(2) {
            self[pair[0]].next = Some(pair[1]);
            self[pair[1]].previous = Some(pair[0]);
        }
        copies[0]
    }

    fn copy_list(&mut self, list: Option<NodeId>, parent: NodeId) -> Option<NodeId> {
        let head = list?;
        let copy = self.copy_chain(head);
        self.reparent(copy, Some(parent));
        Some(copy)
    }

    ////////////////////////////////////////////////////////////////////////
    // Queries.
    ////////////////////////////////////////////////////////////////////////

    /// The tuple of sibling indexes from the root down to `id`,
    /// inclusive.
    pub fn full_indexes(&self, id: NodeId) -> IndexList {
        let mut indexes = IndexList::new();
        let mut current = Some(id);
        while let Some(node) = current {
            indexes.push_front(self[node].info.index as i64);
            current = self[node].parent;
        }
        indexes
    }

    /// Whether the subtree below (and including) `id` holds any path
    /// atom. Backward substitution consults this to avoid copying a
    /// reference that could point back at itself.
    pub fn contains_path(&self, id: NodeId) -> bool {
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            match &self[current].kind {
                Collection::Atom(Atom::Path(_)) => return true,
                Collection::Atom(_) => {},
                kind => {
                    if let Some(head) = kind.list() {
                        stack.extend(self.chain(head));
                    }
                },
            }
        }
        false
    }

    /// The symbolic sum of the lengths of a sibling chain.
    pub fn sum_chain_lengths(&self, head: NodeId) -> Coordinate {
        let mut sum: Option<Coordinate> = None;
        for id in self.chain(head) {
            let length = self[id].info.length.clone();
            sum = Some(match sum {
                None => length,
                Some(total) => Coordinate::plus(total, length),
            });
        }
        sum.unwrap_or(Coordinate::Constant(0))
    }

    /// The symbolic size of the table a collection declares: the
    /// coordinate of its last child plus that child's length. `None`
    /// for childless nodes, which declare no table.
    pub fn table_size(&self, id: NodeId) -> Option<Coordinate> {
        let head = self.children(id)?;
        let last = self.last_sibling(head);
        Some(Coordinate::plus(
            self[last].info.coordinate.clone(),
            self[last].info.length.clone(),
        ))
    }

    /// Checks the navigation invariants over the chain through
    /// `head` and everything below it: sibling links mirror each
    /// other, siblings share a parent, children point back at their
    /// parent.
    pub fn well_formed(&self, head: NodeId) -> bool {
        for id in self.chain(head) {
            if let Some(next) = self[id].next {
                if self[next].previous != Some(id) || self[next].parent != self[id].parent {
                    return false;
                }
            }
            if let Some(previous) = self[id].previous {
                if self[previous].next != Some(id) {
                    return false;
                }
            }
            if let Some(list) = self[id].kind.list() {
                for child in self.chain(list) {
                    if self[child].parent != Some(id) {
                        return false;
                    }
                }
                if !self.well_formed(list) {
                    return false;
                }
            }
        }
        true
    }

    ////////////////////////////////////////////////////////////////////////
    // Printing.
    ////////////////////////////////////////////////////////////////////////

    /// Renders a collection back into source form.
    pub fn print_collection(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.print_node(id, &mut out);
        out
    }

    fn print_node(&self, id: NodeId, out: &mut String) {
        match &self[id].kind {
            Collection::Atom(atom) => {
                let _ = write!(out, "{}", atom);
            },
            Collection::Seq(list) => self.print_list(*list, ";", "(", ")", out),
            Collection::Par(list) => self.print_list(*list, "||", "(", ")", out),
            Collection::CyclicSeq(list) => self.print_list(*list, ";", "{;", "}", out),
            Collection::CyclicPar(list) => self.print_list(*list, "||", "{||", "}", out),
            Collection::RepSeq(repetition, list) => {
                self.print_list(*list, ";", "{;", "}", out);
                self.print_repetition(repetition, out);
            },
            Collection::RepPar(repetition, list) => {
                self.print_list(*list, "||", "{||", "}", out);
                self.print_repetition(repetition, out);
            },
        }
    }

    fn print_list(
        &self,
        list: Option<NodeId>,
        separator: &str,
        open: &str,
        close: &str,
        out: &mut String,
    ) {
        out.push_str(open);
        if let Some(head) = list {
            for (i, child) in self.chain(head).into_iter().enumerate() {
                if i > 0 {
                    out.push_str(separator);
                }
                self.print_node(child, out);
            }
        }
        out.push_str(close);
    }

    fn print_repetition(&self, repetition: &Repetition, out: &mut String) {
        match repetition {
            Repetition::Times(times) => {
                let _ = write!(out, " {}", times);
            },
            Repetition::Path(path) => {
                let _ = write!(out, "#{}", path);
            },
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn leaf(tree: &mut Tree, value: i64) -> NodeId {
        tree.atom(Atom::Int(value), Span::empty())
    }

    /// Builds `(1;2;3)` and returns (seq, children).
    fn small_seq(tree: &mut Tree) -> (NodeId, Vec<NodeId>) {
        let a = leaf(tree, 1);
        let b = leaf(tree, 2);
        let c = leaf(tree, 3);
        tree.append_sibling(a, b);
        tree.append_sibling(a, c);
        let seq = tree.seq(Some(a), Span::empty());
        (seq, vec![a, b, c])
    }

    #[test]
    fn sibling_links_mirror() {
        let mut tree = Tree::new();
        let (seq, children) = small_seq(&mut tree);

        assert!(tree.well_formed(seq));
        assert_eq!(tree.next(children[0]), Some(children[1]));
        assert_eq!(tree.previous(children[2]), Some(children[1]));
        assert_eq!(tree.previous(children[0]), None);
        for child in &children {
            assert_eq!(tree.parent(*child), Some(seq));
        }
    }

    #[test]
    fn down_only_into_seq_and_par() {
        let mut tree = Tree::new();
        let a = leaf(&mut tree, 1);
        let cyclic = tree.cyclic_seq(Some(a), Span::empty());
        assert_eq!(tree.down(cyclic), None);

        let b = leaf(&mut tree, 2);
        let seq = tree.seq(Some(b), Span::empty());
        assert_eq!(tree.down(seq), Some(b));
    }

    #[test]
    fn copies_are_fresh_and_deep() {
        let mut tree = Tree::new();
        let (seq, children) = small_seq(&mut tree);

        let copy = tree.copy_node(seq);
        assert_ne!(copy, seq);
        assert!(tree.well_formed(copy));

        let copied_children = tree.chain(tree.children(copy).unwrap());
        assert_eq!(copied_children.len(), 3);
        for (original, copied) in children.iter().zip(&copied_children) {
            assert_ne!(original, copied);
            assert_eq!(tree.kind(*original), tree.kind(*copied));
            assert_eq!(tree.parent(*copied), Some(copy));
        }
    }

    #[test]
    fn replace_head_updates_the_parent_list() {
        let mut tree = Tree::new();
        let (seq, children) = small_seq(&mut tree);

        let replacement = leaf(&mut tree, 9);
        tree.replace_with_chain(children[0], replacement);

        assert_eq!(tree.children(seq), Some(replacement));
        assert_eq!(tree.next(replacement), Some(children[1]));
        assert_eq!(tree.previous(children[1]), Some(replacement));
        assert!(tree.well_formed(seq));
    }

    #[test]
    fn replace_middle_with_chain() {
        let mut tree = Tree::new();
        let (seq, children) = small_seq(&mut tree);

        let x = leaf(&mut tree, 7);
        let y = leaf(&mut tree, 8);
        tree.append_sibling(x, y);
        tree.replace_with_chain(children[1], x);

        let order: Vec<_> = tree
            .chain(tree.children(seq).unwrap())
            .into_iter()
            .map(|id| tree.kind(id).clone())
            .collect();
        assert_eq!(
            order,
            vec![
                Collection::Atom(Atom::Int(1)),
                Collection::Atom(Atom::Int(7)),
                Collection::Atom(Atom::Int(8)),
                Collection::Atom(Atom::Int(3)),
            ],
        );
        assert!(tree.well_formed(seq));
    }

    #[test]
    fn path_containment() {
        let mut tree = Tree::new();
        let mut path = Path::new();
        path.push(crate::construct::path::Move::Pre);

        let plain = leaf(&mut tree, 1);
        let pathy = tree.atom(Atom::Path(path), Span::empty());
        tree.append_sibling(plain, pathy);
        let seq = tree.seq(Some(plain), Span::empty());

        assert!(tree.contains_path(seq));
        assert!(!tree.contains_path(plain));
    }

    #[test]
    fn printing_round_shapes() {
        let mut tree = Tree::new();
        let (seq, _) = small_seq(&mut tree);
        assert_eq!(tree.print_collection(seq), "(1;2;3)");

        let a = leaf(&mut tree, 4);
        let b = leaf(&mut tree, 5);
        tree.append_sibling(a, b);
        let par = tree.par(Some(a), Span::empty());
        assert_eq!(tree.print_collection(par), "(4||5)");

        let c = leaf(&mut tree, 6);
        let rep = tree.rep_seq(Repetition::Times(3), Some(c), Span::empty());
        assert_eq!(tree.print_collection(rep), "{;6} 3");
    }
}
