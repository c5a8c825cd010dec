//! The datastructures the compiler works over: tokens, atoms, paths,
//! coordinates, and the collection tree with its phrase list.

pub mod atom;
pub mod collection;
pub mod coordinate;
pub mod index;
pub mod info;
pub mod path;
pub mod phrase;
pub mod token;
