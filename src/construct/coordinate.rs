use std::fmt;

use crate::construct::index::IndexList;

/// A symbolic arithmetic expression naming a position or an extent in
/// the flattened value table of a collection. Coordinates stay
/// symbolic through the annotation passes and are printed as C
/// expressions by the code generator.
///
/// `Var` names an iteration variable by the full-index tuple of the
/// repetition it belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Coordinate {
    Constant(i64),
    Var(IndexList),
    Plus(Box<Coordinate>, Box<Coordinate>),
    Times(Box<Coordinate>, Box<Coordinate>),
}

impl Coordinate {
    /// A sum. Two constants fold into one on the spot, so chains of
    /// coordinate arithmetic over literal trees collapse to plain
    /// numbers.
    pub fn plus(left: Coordinate, right: Coordinate) -> Coordinate {
        match (left, right) {
            (Coordinate::Constant(a), Coordinate::Constant(b)) => Coordinate::Constant(a + b),
            (left, right) => Coordinate::Plus(Box::new(left), Box::new(right)),
        }
    }

    /// A product; constants fold exactly as for [`Coordinate::plus`].
    pub fn times(left: Coordinate, right: Coordinate) -> Coordinate {
        match (left, right) {
            (Coordinate::Constant(a), Coordinate::Constant(b)) => Coordinate::Constant(a * b),
            (left, right) => Coordinate::Times(Box::new(left), Box::new(right)),
        }
    }

    /// The constant value, when the coordinate has folded down to one.
    pub fn as_constant(&self) -> Option<i64> {
        match self {
            Coordinate::Constant(value) => Some(*value),
            _ => None,
        }
    }
}

impl Default for Coordinate {
    fn default() -> Coordinate {
        Coordinate::Constant(0)
    }
}

/// Prints a factor of a product, parenthesised when it is itself a
/// compound expression, so products never capture a bare `+`.
fn factor(f: &mut fmt::Formatter<'_>, coordinate: &Coordinate) -> fmt::Result {
    match coordinate {
        Coordinate::Constant(_) | Coordinate::Var(_) => write!(f, "{}", coordinate),
        compound => write!(f, "({})", compound),
    }
}

impl fmt::Display for Coordinate {
    /// Conventional infix form, legal as a C expression.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Coordinate::Constant(value) => write!(f, "{}", value),
            Coordinate::Var(indexes) => write!(f, "var{}", indexes),
            Coordinate::Plus(left, right) => write!(f, "{} + {}", left, right),
            Coordinate::Times(left, right) => {
                factor(f, left)?;
                write!(f, " * ")?;
                factor(f, right)
            },
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn constants_fold() {
        assert_eq!(
            Coordinate::plus(Coordinate::Constant(1), Coordinate::Constant(2)),
            Coordinate::Constant(3),
        );
        assert_eq!(
            Coordinate::times(Coordinate::Constant(3), Coordinate::Constant(4)),
            Coordinate::Constant(12),
        );
    }

    #[test]
    fn symbolic_operands_do_not_fold() {
        let var = Coordinate::Var(IndexList::from(vec![0, 1]));
        let sum = Coordinate::plus(var.clone(), Coordinate::Constant(2));
        assert_eq!(
            sum,
            Coordinate::Plus(Box::new(var), Box::new(Coordinate::Constant(2))),
        );
    }

    #[test]
    fn printing() {
        let var = Coordinate::Var(IndexList::from(vec![0, 1]));
        let expression = Coordinate::times(
            Coordinate::plus(var, Coordinate::Constant(1)),
            Coordinate::Constant(2),
        );
        assert_eq!(expression.to_string(), "(var_0_1 + 1) * 2");
    }

    proptest! {
        #[test]
        fn fold_laws(a: i32, b: i32) {
            let (a, b) = (a as i64, b as i64);
            prop_assert_eq!(
                Coordinate::plus(Coordinate::Constant(a), Coordinate::Constant(b)),
                Coordinate::Constant(a + b),
            );
            prop_assert_eq!(
                Coordinate::times(Coordinate::Constant(a), Coordinate::Constant(b)),
                Coordinate::Constant(a * b),
            );
        }
    }
}
