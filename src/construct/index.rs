use std::collections::VecDeque;
use std::fmt;

/// An ordered tuple of signed indexes, read root-first: the route of
/// sibling positions that leads from the top of a phrase down to one
/// collection. Full-index tuples name the value tables of the emitted
/// program, and their lexicographic order is program order, which is
/// what the substitution pass compares.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct IndexList {
    indexes: VecDeque<i64>,
}

impl IndexList {
    pub fn new() -> IndexList {
        IndexList::default()
    }

    pub fn push_back(&mut self, index: i64) {
        self.indexes.push_back(index);
    }

    pub fn push_front(&mut self, index: i64) {
        self.indexes.push_front(index);
    }

    pub fn pop_back(&mut self) -> Option<i64> {
        self.indexes.pop_back()
    }

    pub fn pop_front(&mut self) -> Option<i64> {
        self.indexes.pop_front()
    }

    pub fn get(&self, position: usize) -> Option<i64> {
        self.indexes.get(position).copied()
    }

    pub fn len(&self) -> usize {
        self.indexes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indexes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &i64> {
        self.indexes.iter()
    }
}

impl From<Vec<i64>> for IndexList {
    fn from(indexes: Vec<i64>) -> IndexList {
        IndexList {
            indexes: indexes.into(),
        }
    }
}

impl fmt::Display for IndexList {
    /// Prints the tuple in the underscore-joined form used to name
    /// tables in the emitted program: `_0_2_1`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for index in &self.indexes {
            write!(f, "_{}", index)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn both_ends() {
        let mut list = IndexList::new();
        list.push_back(1);
        list.push_back(2);
        list.push_front(0);

        assert_eq!(list.len(), 3);
        assert_eq!(list.get(0), Some(0));
        assert_eq!(list.get(2), Some(2));
        assert_eq!(list.pop_front(), Some(0));
        assert_eq!(list.pop_back(), Some(2));
        assert_eq!(list.pop_back(), Some(1));
        assert_eq!(list.pop_back(), None);
    }

    #[test]
    fn code_form() {
        let list = IndexList::from(vec![0, 2, 1]);
        assert_eq!(list.to_string(), "_0_2_1");
        assert_eq!(IndexList::new().to_string(), "");
    }

    proptest! {
        /// Comparison is lexicographic, i.e. it agrees with the
        /// comparison of the plain vectors.
        #[test]
        fn comparison_is_lexicographic(a: Vec<i64>, b: Vec<i64>) {
            let left = IndexList::from(a.clone());
            let right = IndexList::from(b.clone());
            prop_assert_eq!(left.cmp(&right), a.cmp(&b));
        }
    }
}
