use std::fmt;

/// A Wave operator.
/// Operators come in three disjoint groups:
/// *unary* operators consume the value in the slot before them,
/// *binary* operators consume the two slots before them,
/// and *specific* operators have their own calling conventions.
/// The groups can be told apart with [`Operator::is_unary`],
/// [`Operator::is_binary`] and [`Operator::is_specific`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, proptest_derive::Arbitrary)]
pub enum Operator {
    // Unary.
    UnaryPlus,
    UnaryMinus,
    Increment,
    Decrement,
    Sqrt,
    Sin,
    Cos,
    Not,
    Log,
    Exp,
    Ceil,
    Floor,
    Chr,
    Code,

    // Binary.
    Plus,
    Minus,
    Min,
    Max,
    Times,
    Divide,
    Mod,
    Equals,
    Differs,
    LesserOrEquals,
    GreaterOrEquals,
    Greater,
    Lesser,
    And,
    Or,
    Get,

    // Specific.
    Atom,
    Stop,
    Cut,
    Read,
    Print,

    Unknown,
}

impl Operator {
    /// Looks up the operator a source token spells, if any.
    /// Both the symbolic spellings (`~+`, `<>`, …) and the word
    /// spellings (`sqrt`, `min`, …) live here, so the lexer and the
    /// preprocessor agree on what is reserved.
    pub fn from_token(token: &str) -> Option<Operator> {
        use Operator::*;
        Some(match token {
            "~+" => UnaryPlus,
            "~-" => UnaryMinus,
            "++" => Increment,
            "--" => Decrement,
            "sqrt" => Sqrt,
            "sin" => Sin,
            "cos" => Cos,
            "not" => Not,
            "log" => Log,
            "exp" => Exp,
            "ceil" => Ceil,
            "floor" => Floor,
            "chr" => Chr,
            "code" => Code,
            "+" => Plus,
            "-" => Minus,
            "min" => Min,
            "max" => Max,
            "*" => Times,
            "/" => Divide,
            "mod" => Mod,
            "=" => Equals,
            "<>" => Differs,
            "<=" => LesserOrEquals,
            ">=" => GreaterOrEquals,
            ">" => Greater,
            "<" => Lesser,
            "and" => And,
            "or" => Or,
            "get" => Get,
            "atom" => Atom,
            "?" => Stop,
            "!" => Cut,
            "read" => Read,
            "print" => Print,
            _ => return None,
        })
    }

    /// Whether the operator takes a single operand.
    pub fn is_unary(self) -> bool {
        use Operator::*;
        matches!(
            self,
            UnaryPlus
                | UnaryMinus
                | Increment
                | Decrement
                | Sqrt
                | Sin
                | Cos
                | Not
                | Log
                | Exp
                | Ceil
                | Floor
                | Chr
                | Code
        )
    }

    /// Whether the operator takes two operands.
    pub fn is_binary(self) -> bool {
        use Operator::*;
        matches!(
            self,
            Plus | Minus
                | Min
                | Max
                | Times
                | Divide
                | Mod
                | Equals
                | Differs
                | LesserOrEquals
                | GreaterOrEquals
                | Greater
                | Lesser
                | And
                | Or
                | Get
        )
    }

    /// Whether the operator is one of the specific operators
    /// (`atom`, `?`, `!`, `read`, `print`).
    pub fn is_specific(self) -> bool {
        use Operator::*;
        matches!(self, Atom | Stop | Cut | Read | Print)
    }

    /// The binary operators that produce a boolean,
    /// whatever the operand type.
    pub fn is_test(self) -> bool {
        use Operator::*;
        matches!(
            self,
            Equals | Differs | LesserOrEquals | GreaterOrEquals | Greater | Lesser
        )
    }

    /// The suffix of the typed runtime functions the code generator
    /// calls, as in `wave_int_binary_plus` or `wave_float_sqrt`.
    pub fn runtime_suffix(self) -> &'static str {
        use Operator::*;
        match self {
            UnaryPlus => "unary_plus",
            UnaryMinus => "unary_minus",
            Increment => "increment",
            Decrement => "decrement",
            Sqrt => "sqrt",
            Sin => "sin",
            Cos => "cos",
            Not => "not",
            Log => "log",
            Exp => "exp",
            Ceil => "ceil",
            Floor => "floor",
            Chr => "chr",
            Code => "code",
            Plus => "binary_plus",
            Minus => "binary_minus",
            Min => "min",
            Max => "max",
            Times => "times",
            Divide => "divide",
            Mod => "mod",
            Equals => "equals",
            Differs => "differs",
            LesserOrEquals => "lesser_or_equals",
            GreaterOrEquals => "greater_or_equals",
            Greater => "greater",
            Lesser => "lesser",
            And => "and",
            Or => "or",
            Get => "get",
            Atom => "is_atom",
            Stop => "stop",
            Cut => "cut",
            Read => "read",
            Print => "print",
            Unknown => "unknown",
        }
    }

    /// The spelling of the matching `wave_operator` constant in the
    /// emitted program, for calls into the runtime dispatcher.
    pub fn runtime_constant(self) -> &'static str {
        use Operator::*;
        match self {
            UnaryPlus => "WAVE_OP_UNARY_PLUS",
            UnaryMinus => "WAVE_OP_UNARY_MINUS",
            Increment => "WAVE_OP_UNARY_INCREMENT",
            Decrement => "WAVE_OP_UNARY_DECREMENT",
            Sqrt => "WAVE_OP_UNARY_SQRT",
            Sin => "WAVE_OP_UNARY_SIN",
            Cos => "WAVE_OP_UNARY_COS",
            Not => "WAVE_OP_UNARY_NOT",
            Log => "WAVE_OP_UNARY_LOG",
            Exp => "WAVE_OP_UNARY_EXP",
            Ceil => "WAVE_OP_UNARY_CEIL",
            Floor => "WAVE_OP_UNARY_FLOOR",
            Chr => "WAVE_OP_UNARY_CHR",
            Code => "WAVE_OP_UNARY_CODE",
            Plus => "WAVE_OP_BINARY_PLUS",
            Minus => "WAVE_OP_BINARY_MINUS",
            Min => "WAVE_OP_BINARY_MIN",
            Max => "WAVE_OP_BINARY_MAX",
            Times => "WAVE_OP_BINARY_TIMES",
            Divide => "WAVE_OP_BINARY_DIVIDE",
            Mod => "WAVE_OP_BINARY_MOD",
            Equals => "WAVE_OP_BINARY_EQUALS",
            Differs => "WAVE_OP_BINARY_DIFFERS",
            LesserOrEquals => "WAVE_OP_BINARY_LESSER_OR_EQUALS",
            GreaterOrEquals => "WAVE_OP_BINARY_GREATER_OR_EQUALS",
            Greater => "WAVE_OP_BINARY_GREATER",
            Lesser => "WAVE_OP_BINARY_LESSER",
            And => "WAVE_OP_BINARY_AND",
            Or => "WAVE_OP_BINARY_OR",
            Get => "WAVE_OP_BINARY_GET",
            Atom => "WAVE_OP_SPECIFIC_ATOM",
            Stop => "WAVE_OP_SPECIFIC_STOP",
            Cut => "WAVE_OP_SPECIFIC_CUT",
            Read => "WAVE_OP_SPECIFIC_READ",
            Print => "WAVE_OP_SPECIFIC_PRINT",
            Unknown => "WAVE_OP_UNKNOWN",
        }
    }
}

impl fmt::Display for Operator {
    /// Prints the operator the way it is spelled in Wave source.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use Operator::*;
        let token = match self {
            UnaryPlus => "~+",
            UnaryMinus => "~-",
            Increment => "++",
            Decrement => "--",
            Sqrt => "sqrt",
            Sin => "sin",
            Cos => "cos",
            Not => "not",
            Log => "log",
            Exp => "exp",
            Ceil => "ceil",
            Floor => "floor",
            Chr => "chr",
            Code => "code",
            Plus => "+",
            Minus => "-",
            Min => "min",
            Max => "max",
            Times => "*",
            Divide => "/",
            Mod => "mod",
            Equals => "=",
            Differs => "<>",
            LesserOrEquals => "<=",
            GreaterOrEquals => ">=",
            Greater => ">",
            Lesser => "<",
            And => "and",
            Or => "or",
            Get => "get",
            Atom => "atom",
            Stop => "?",
            Cut => "!",
            Read => "read",
            Print => "print",
            Unknown => "",
        };

        write!(f, "{}", token)
    }
}
