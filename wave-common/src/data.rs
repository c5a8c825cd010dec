//! Runtime values and operator dispatch.
//!
//! `Data` is the tagged value the emitted program computes with. The
//! compiler itself never evaluates `Data`; this module is the reference
//! implementation of the runtime library the emitted C calls into, so
//! its dispatch rules are the ground truth for what the code generator
//! is allowed to emit directly and what it must defer to the
//! dispatcher.

use std::fmt;
use std::io::{self, BufRead, Write};
use std::process;

use rayon::prelude::*;

use crate::operator::Operator;
use crate::types;

/// Exit code for a runtime type error, `EX_DATAERR` from `sysexits`.
pub const EX_DATAERR: i32 = 65;

/// A runtime value.
///
/// `Seq` and `Par` own their element storage; operations over `Par`
/// values allocate a fresh element vector of the same length.
#[derive(Debug, Clone, PartialEq)]
pub enum Data {
    Int(i64),
    Float(f64),
    Bool(bool),
    Char(u8),
    String(String),
    Seq(Vec<Data>),
    Par(Vec<Data>),
    Operator(Operator),
    Unknown,
}

/// The shape of a `Data`, used to key the dispatch tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Shape {
    Int,
    Float,
    Bool,
    Char,
    String,
    Seq,
    Par,
    Operator,
    Unknown,
}

impl Data {
    fn shape(&self) -> Shape {
        match self {
            Data::Int(_) => Shape::Int,
            Data::Float(_) => Shape::Float,
            Data::Bool(_) => Shape::Bool,
            Data::Char(_) => Shape::Char,
            Data::String(_) => Shape::String,
            Data::Seq(_) => Shape::Seq,
            Data::Par(_) => Shape::Par,
            Data::Operator(_) => Shape::Operator,
            Data::Unknown => Shape::Unknown,
        }
    }

    /// What the `atom` operator reports: scalars are atomic,
    /// collections and everything else are not.
    pub fn is_atomic(&self) -> bool {
        matches!(
            self,
            Data::Int(_) | Data::Float(_) | Data::Bool(_) | Data::Char(_) | Data::String(_)
        )
    }

    /// Numeric view of the value, promoting `Int` to `Float`.
    pub fn float_value(&self) -> Option<f64> {
        match self {
            Data::Int(i) => Some(types::float_from_int(*i)),
            Data::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Textual view of the value: a `Char` converts to the
    /// one-character string.
    pub fn string_value(&self) -> Option<String> {
        match self {
            Data::Char(c) => Some(types::string_from_char(*c)),
            Data::String(s) => Some(s.clone()),
            _ => None,
        }
    }

    /// Writes the value followed by a newline; the `print` operator.
    pub fn print<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        writeln!(writer, "{}", self)
    }

    /// Reads one line and tags it; the `read` operator. Whatever does
    /// not parse as an integer, a float or a boolean is kept as text.
    pub fn read<R: BufRead>(reader: &mut R) -> io::Result<Data> {
        let mut line = String::new();
        reader.read_line(&mut line)?;
        let word = line.trim_end_matches('\n');

        if let Ok(i) = word.parse::<i64>() {
            return Ok(Data::Int(i));
        }
        if let Ok(f) = word.parse::<f64>() {
            return Ok(Data::Float(f));
        }
        Ok(match word {
            "true" => Data::Bool(true),
            "false" => Data::Bool(false),
            _ => Data::String(word.to_string()),
        })
    }
}

fn collection_fmt(f: &mut fmt::Formatter<'_>, elems: &[Data], separator: &str) -> fmt::Result {
    write!(f, "(")?;
    for (i, element) in elems.iter().enumerate() {
        if i > 0 {
            write!(f, "{}", separator)?;
        }
        write!(f, "{}", element)?;
    }
    write!(f, ")")
}

impl fmt::Display for Data {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Data::Int(i) => write!(f, "{}", i),
            Data::Float(x) => write!(f, "{:?}", x),
            Data::Bool(b) => write!(f, "{}", b),
            Data::Char(c) => write!(f, "'{}'", *c as char),
            Data::String(s) => write!(f, "\"{}\"", s),
            Data::Seq(elems) => collection_fmt(f, elems, ";"),
            Data::Par(elems) => collection_fmt(f, elems, "||"),
            Data::Operator(op) => write!(f, "{}", op),
            Data::Unknown => write!(f, "unknown"),
        }
    }
}

/// An operation outside the admissible operator/type matrix.
/// Aborting entry points print this and exit with [`EX_DATAERR`].
#[derive(Debug, Clone, PartialEq)]
pub struct TypeError {
    pub op: Operator,
    pub left: Data,
    pub right: Option<Data>,
}

impl TypeError {
    fn unary(op: Operator, operand: Data) -> TypeError {
        TypeError {
            op,
            left: operand,
            right: None,
        }
    }

    fn binary(op: Operator, left: Data, right: Data) -> TypeError {
        TypeError {
            op,
            left,
            right: Some(right),
        }
    }

    /// Reports the error and exits the process with `EX_DATAERR`.
    pub fn abort(&self) -> ! {
        eprintln!("{}", self);
        process::exit(EX_DATAERR)
    }
}

impl fmt::Display for TypeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Error: bad operator use.")?;
        writeln!(f, "operator: {}", self.op)?;
        match &self.right {
            None => write!(f, "operand: {}", self.left),
            Some(right) => {
                writeln!(f, "left operand: {}", self.left)?;
                write!(f, "right operand: {}", right)
            },
        }
    }
}

////////////////////////////////////////////////////////////////////////////////
// Admissibility.
////////////////////////////////////////////////////////////////////////////////

/// The admissible operator/type matrix, per scalar shape.
fn defined(shape: Shape, op: Operator) -> bool {
    use Operator::*;
    match shape {
        Shape::Int => matches!(
            op,
            UnaryPlus
                | UnaryMinus
                | Increment
                | Decrement
                | Sqrt
                | Sin
                | Cos
                | Log
                | Exp
                | Ceil
                | Floor
                | Chr
                | Plus
                | Minus
                | Min
                | Max
                | Times
                | Divide
                | Mod
        ) || op.is_test(),
        Shape::Float => matches!(
            op,
            UnaryPlus
                | UnaryMinus
                | Increment
                | Decrement
                | Sqrt
                | Sin
                | Cos
                | Log
                | Exp
                | Ceil
                | Floor
                | Plus
                | Minus
                | Min
                | Max
                | Times
                | Divide
                | Mod
        ) || op.is_test(),
        Shape::Bool => matches!(op, Not | And | Or) || op.is_test(),
        Shape::Char => matches!(op, Code | Plus | Min | Max) || op.is_test(),
        Shape::String => matches!(op, Plus | Min | Max) || op.is_test(),
        _ => false,
    }
}

////////////////////////////////////////////////////////////////////////////////
// Unary dispatch.
////////////////////////////////////////////////////////////////////////////////

/// Applies a unary operator, or explains why it cannot be applied.
/// `Par` operands are mapped element-wise in parallel.
pub fn try_unary(operand: &Data, op: Operator) -> Result<Data, TypeError> {
    if !op.is_unary() {
        return Err(TypeError::unary(op, operand.clone()));
    }

    if let Data::Par(elems) = operand {
        let elems = elems
            .par_iter()
            .map(|element| try_unary(element, op))
            .collect::<Result<Vec<_>, _>>()?;
        return Ok(Data::Par(elems));
    }

    if !defined(operand.shape(), op) {
        return Err(TypeError::unary(op, operand.clone()));
    }

    use Operator::*;
    Ok(match *operand {
        Data::Int(a) => match op {
            UnaryPlus => Data::Int(types::int_unary_plus(a)),
            UnaryMinus => Data::Int(types::int_unary_minus(a)),
            Increment => Data::Int(types::int_increment(a)),
            Decrement => Data::Int(types::int_decrement(a)),
            Chr => Data::Char(types::int_chr(a)),
            // The remaining admissible unaries carry an Int into Float.
            _ => Data::Float(unary_float(types::float_from_int(a), op)),
        },
        Data::Float(a) => Data::Float(match op {
            UnaryPlus => types::float_unary_plus(a),
            UnaryMinus => types::float_unary_minus(a),
            Increment => types::float_increment(a),
            Decrement => types::float_decrement(a),
            _ => unary_float(a, op),
        }),
        Data::Bool(b) => Data::Bool(types::bool_not(b)),
        Data::Char(c) => Data::Int(types::char_code(c)),
        ref other => return Err(TypeError::unary(op, other.clone())),
    })
}

/// Aborting version of [`try_unary`], the surface the emitted program
/// sees.
pub fn unary(operand: &Data, op: Operator) -> Data {
    match try_unary(operand, op) {
        Ok(data) => data,
        Err(error) => error.abort(),
    }
}

fn unary_float(a: f64, op: Operator) -> f64 {
    use Operator::*;
    match op {
        Sqrt => types::float_sqrt(a),
        Sin => types::float_sin(a),
        Cos => types::float_cos(a),
        Log => types::float_log(a),
        Exp => types::float_exp(a),
        Ceil => types::float_ceil(a),
        Floor => types::float_floor(a),
        _ => unreachable!("not a float-producing unary operator: {:?}", op),
    }
}

////////////////////////////////////////////////////////////////////////////////
// Binary dispatch.
////////////////////////////////////////////////////////////////////////////////

/// Applies a binary operator, or explains why it cannot be applied.
///
/// Two `Par` values of equal length map element-wise in parallel;
/// unequal lengths are an error. Otherwise both sides must be scalar:
/// matching types use the same-type rules, and the only accepted
/// cross-type pairs are `{Int, Float}` (promoted to `Float`) and
/// `{Char, String}` (promoted to `String`).
pub fn try_binary(left: &Data, right: &Data, op: Operator) -> Result<Data, TypeError> {
    if !op.is_binary() {
        return Err(TypeError::binary(op, left.clone(), right.clone()));
    }

    if let (Data::Par(l), Data::Par(r)) = (left, right) {
        if l.len() != r.len() {
            return Err(TypeError::binary(op, left.clone(), right.clone()));
        }
        let elems = l
            .par_iter()
            .zip(r.par_iter())
            .map(|(a, b)| try_binary(a, b, op))
            .collect::<Result<Vec<_>, _>>()?;
        return Ok(Data::Par(elems));
    }

    let (ls, rs) = (left.shape(), right.shape());
    if !defined(ls, op) || !defined(rs, op) {
        return Err(TypeError::binary(op, left.clone(), right.clone()));
    }

    match (ls, rs) {
        (Shape::Int, Shape::Int) => binary_int(left, right, op),
        (Shape::Bool, Shape::Bool) => binary_bool(left, right, op),
        (Shape::Char, Shape::Char) => binary_char(left, right, op),
        (Shape::Float, Shape::Float)
        | (Shape::Int, Shape::Float)
        | (Shape::Float, Shape::Int) => binary_float(left, right, op),
        (Shape::String, Shape::String)
        | (Shape::Char, Shape::String)
        | (Shape::String, Shape::Char) => binary_string(left, right, op),
        _ => Err(TypeError::binary(op, left.clone(), right.clone())),
    }
}

/// Aborting version of [`try_binary`], the surface the emitted program
/// sees.
pub fn binary(left: &Data, right: &Data, op: Operator) -> Data {
    match try_binary(left, right, op) {
        Ok(data) => data,
        Err(error) => error.abort(),
    }
}

fn binary_int(left: &Data, right: &Data, op: Operator) -> Result<Data, TypeError> {
    use Operator::*;
    let (a, b) = match (left, right) {
        (Data::Int(a), Data::Int(b)) => (*a, *b),
        _ => unreachable!("binary_int called on non-Int operands"),
    };

    Ok(match op {
        Plus => Data::Int(types::int_binary_plus(a, b)),
        Minus => Data::Int(types::int_binary_minus(a, b)),
        Min => Data::Int(types::int_min(a, b)),
        Max => Data::Int(types::int_max(a, b)),
        Times => Data::Int(types::int_times(a, b)),
        Divide => Data::Int(types::int_divide(a, b)),
        Mod => Data::Int(types::int_mod(a, b)),
        Equals => Data::Bool(types::int_equals(a, b)),
        Differs => Data::Bool(types::int_differs(a, b)),
        LesserOrEquals => Data::Bool(types::int_lesser_or_equals(a, b)),
        GreaterOrEquals => Data::Bool(types::int_greater_or_equals(a, b)),
        Greater => Data::Bool(types::int_greater(a, b)),
        Lesser => Data::Bool(types::int_lesser(a, b)),
        _ => return Err(TypeError::binary(op, left.clone(), right.clone())),
    })
}

fn binary_float(left: &Data, right: &Data, op: Operator) -> Result<Data, TypeError> {
    use Operator::*;
    let (a, b) = match (left.float_value(), right.float_value()) {
        (Some(a), Some(b)) => (a, b),
        _ => unreachable!("binary_float called on non-numeric operands"),
    };

    Ok(match op {
        Plus => Data::Float(types::float_binary_plus(a, b)),
        Minus => Data::Float(types::float_binary_minus(a, b)),
        Min => Data::Float(types::float_min(a, b)),
        Max => Data::Float(types::float_max(a, b)),
        Times => Data::Float(types::float_times(a, b)),
        Divide => Data::Float(types::float_divide(a, b)),
        Mod => Data::Float(types::float_mod(a, b)),
        Equals => Data::Bool(types::float_equals(a, b)),
        Differs => Data::Bool(types::float_differs(a, b)),
        LesserOrEquals => Data::Bool(types::float_lesser_or_equals(a, b)),
        GreaterOrEquals => Data::Bool(types::float_greater_or_equals(a, b)),
        Greater => Data::Bool(types::float_greater(a, b)),
        Lesser => Data::Bool(types::float_lesser(a, b)),
        _ => return Err(TypeError::binary(op, left.clone(), right.clone())),
    })
}

// Boolean ordering: `true` sorts before `false`, so `lesser (a, b)`
// holds exactly when `a` and not `b`.
fn binary_bool(left: &Data, right: &Data, op: Operator) -> Result<Data, TypeError> {
    use Operator::*;
    let (a, b) = match (left, right) {
        (Data::Bool(a), Data::Bool(b)) => (*a, *b),
        _ => unreachable!("binary_bool called on non-Bool operands"),
    };

    Ok(Data::Bool(match op {
        And => types::bool_and(a, b),
        Or => types::bool_or(a, b),
        Equals => types::bool_equals(a, b),
        Differs => types::bool_differs(a, b),
        Lesser => types::bool_lesser(a, b),
        Greater => types::bool_greater(a, b),
        LesserOrEquals => types::bool_lesser_or_equals(a, b),
        GreaterOrEquals => types::bool_greater_or_equals(a, b),
        _ => return Err(TypeError::binary(op, left.clone(), right.clone())),
    }))
}

fn binary_char(left: &Data, right: &Data, op: Operator) -> Result<Data, TypeError> {
    use Operator::*;
    let (a, b) = match (left, right) {
        (Data::Char(a), Data::Char(b)) => (*a, *b),
        _ => unreachable!("binary_char called on non-Char operands"),
    };

    Ok(match op {
        // `plus` on characters concatenates into a string.
        Plus => Data::String(types::char_binary_plus(a, b)),
        Min => Data::Char(types::char_min(a, b)),
        Max => Data::Char(types::char_max(a, b)),
        Equals => Data::Bool(types::char_equals(a, b)),
        Differs => Data::Bool(types::char_differs(a, b)),
        LesserOrEquals => Data::Bool(types::char_lesser_or_equals(a, b)),
        GreaterOrEquals => Data::Bool(types::char_greater_or_equals(a, b)),
        Greater => Data::Bool(types::char_greater(a, b)),
        Lesser => Data::Bool(types::char_lesser(a, b)),
        _ => return Err(TypeError::binary(op, left.clone(), right.clone())),
    })
}

// String ordering is lexicographic; `min` and `max` hand back a copy
// of the lesser or greater operand, `plus` concatenates.
fn binary_string(left: &Data, right: &Data, op: Operator) -> Result<Data, TypeError> {
    use Operator::*;
    let (a, b) = match (left.string_value(), right.string_value()) {
        (Some(a), Some(b)) => (a, b),
        _ => unreachable!("binary_string called on non-textual operands"),
    };

    Ok(match op {
        Plus => Data::String(types::string_binary_plus(&a, &b)),
        Min => Data::String(types::string_min(&a, &b)),
        Max => Data::String(types::string_max(&a, &b)),
        Equals => Data::Bool(types::string_equals(&a, &b)),
        Differs => Data::Bool(types::string_differs(&a, &b)),
        LesserOrEquals => Data::Bool(types::string_lesser_or_equals(&a, &b)),
        GreaterOrEquals => Data::Bool(types::string_greater_or_equals(&a, &b)),
        Greater => Data::Bool(types::string_greater(&a, &b)),
        Lesser => Data::Bool(types::string_lesser(&a, &b)),
        _ => return Err(TypeError::binary(op, left.clone(), right.clone())),
    })
}

#[cfg(test)]
mod test {
    use super::*;
    use Operator::*;

    #[test]
    fn int_sum() {
        assert_eq!(try_binary(&Data::Int(1), &Data::Int(2), Plus), Ok(Data::Int(3)));
    }

    #[test]
    fn int_float_promotes() {
        assert_eq!(
            try_binary(&Data::Int(1), &Data::Float(0.5), Plus),
            Ok(Data::Float(1.5)),
        );
        assert_eq!(
            try_binary(&Data::Float(2.0), &Data::Int(3), Times),
            Ok(Data::Float(6.0)),
        );
    }

    #[test]
    fn float_equality_is_approximate() {
        assert_eq!(
            try_binary(&Data::Float(1.0), &Data::Float(1.0 + 1.0e-7), Equals),
            Ok(Data::Bool(true)),
        );
        assert_eq!(
            try_binary(&Data::Float(1.0), &Data::Float(1.1), Equals),
            Ok(Data::Bool(false)),
        );
    }

    #[test]
    fn comparisons_return_bool() {
        assert_eq!(
            try_binary(&Data::String("a".into()), &Data::String("b".into()), Lesser),
            Ok(Data::Bool(true)),
        );
        assert_eq!(
            try_binary(&Data::Char(b'a'), &Data::Char(b'a'), GreaterOrEquals),
            Ok(Data::Bool(true)),
        );
    }

    #[test]
    fn char_plus_builds_a_string() {
        assert_eq!(
            try_binary(&Data::Char(b'h'), &Data::Char(b'i'), Plus),
            Ok(Data::String("hi".into())),
        );
        assert_eq!(
            try_binary(&Data::Char(b'a'), &Data::String("bc".into()), Plus),
            Ok(Data::String("abc".into())),
        );
    }

    #[test]
    fn string_min_copies_the_lesser() {
        assert_eq!(
            try_binary(&Data::String("pea".into()), &Data::String("hen".into()), Min),
            Ok(Data::String("hen".into())),
        );
    }

    #[test]
    fn int_string_is_a_type_error() {
        let error = try_binary(&Data::Int(1), &Data::String("a".into()), Plus).unwrap_err();
        let message = error.to_string();
        assert!(message.contains('+'));
        assert!(message.contains('1'));
        assert!(message.contains("\"a\""));
    }

    #[test]
    fn unary_results() {
        assert_eq!(try_unary(&Data::Int(3), UnaryMinus), Ok(Data::Int(-3)));
        assert_eq!(try_unary(&Data::Int(4), Sqrt), Ok(Data::Float(2.0)));
        assert_eq!(try_unary(&Data::Int(97), Chr), Ok(Data::Char(b'a')));
        assert_eq!(try_unary(&Data::Char(b'a'), Code), Ok(Data::Int(97)));
        assert_eq!(try_unary(&Data::Bool(true), Not), Ok(Data::Bool(false)));
        assert!(try_unary(&Data::String("x".into()), Sqrt).is_err());
    }

    #[test]
    fn par_maps_element_wise() {
        let par = Data::Par(vec![Data::Int(1), Data::Int(2), Data::Int(3)]);
        assert_eq!(
            try_unary(&par, Increment),
            Ok(Data::Par(vec![Data::Int(2), Data::Int(3), Data::Int(4)])),
        );

        let other = Data::Par(vec![Data::Int(10), Data::Int(20), Data::Int(30)]);
        assert_eq!(
            try_binary(&par, &other, Plus),
            Ok(Data::Par(vec![Data::Int(11), Data::Int(22), Data::Int(33)])),
        );
    }

    #[test]
    fn par_length_mismatch_is_an_error() {
        let short = Data::Par(vec![Data::Int(1)]);
        let long = Data::Par(vec![Data::Int(1), Data::Int(2)]);
        assert!(try_binary(&short, &long, Plus).is_err());
    }

    #[test]
    fn atomicity() {
        assert!(Data::Int(1).is_atomic());
        assert!(Data::String("s".into()).is_atomic());
        assert!(!Data::Seq(vec![]).is_atomic());
        assert!(!Data::Par(vec![]).is_atomic());
        assert!(!Data::Unknown.is_atomic());
    }

    #[test]
    fn bool_ordering_matches_the_runtime() {
        // true sorts before false.
        assert_eq!(
            try_binary(&Data::Bool(true), &Data::Bool(false), Lesser),
            Ok(Data::Bool(true)),
        );
        assert_eq!(
            try_binary(&Data::Bool(false), &Data::Bool(true), Greater),
            Ok(Data::Bool(true)),
        );
    }

    #[test]
    fn get_is_never_admissible() {
        assert!(try_binary(&Data::Int(0), &Data::Int(1), Get).is_err());
    }

    #[test]
    fn read_tags_its_input() {
        let mut input = std::io::Cursor::new(b"42\n".to_vec());
        assert_eq!(Data::read(&mut input).unwrap(), Data::Int(42));

        let mut input = std::io::Cursor::new(b"2.5\n".to_vec());
        assert_eq!(Data::read(&mut input).unwrap(), Data::Float(2.5));

        let mut input = std::io::Cursor::new(b"pelican\n".to_vec());
        assert_eq!(
            Data::read(&mut input).unwrap(),
            Data::String("pelican".into()),
        );
    }

    #[test]
    fn print_writes_one_line() {
        let mut out = Vec::new();
        Data::String("hello".into()).print(&mut out).unwrap();
        assert_eq!(out, b"\"hello\"\n");
    }
}
