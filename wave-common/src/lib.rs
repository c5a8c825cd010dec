//! Datastructures shared between the Wave compiler and the runtime
//! library of the programs it emits.
//!
//! - Operators and their group classifiers.
//! - The scalar types and their typed operations, one function per
//!   admissible pair, under the names the code generator emits.
//! - The runtime value model (`Data`) and its dispatch rules, which
//!   are the reference for what the code generator may emit.
//! - The allocation registry cleaned at phrase boundaries.

pub mod data;
pub mod operator;
pub mod registry;
pub mod types;

pub use data::{Data, TypeError, EX_DATAERR};
pub use operator::Operator;
