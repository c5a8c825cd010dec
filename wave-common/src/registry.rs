//! The allocation registry of the runtime.
//!
//! The emitted program allocates strings and `Par` element arrays
//! while evaluating a phrase, and releases them all at once at the
//! phrase boundary: the generator emits a `wave_garbage_clean ();`
//! after every phrase and a final `wave_garbage_destroy ();`.
//!
//! The registry is process-wide and guarded by a single lock, which
//! is enough because `Par` evaluation is fork-join and registrations
//! from inside parallel regions are short.

use std::sync::{Mutex, MutexGuard};

use crate::data::Data;

/// One tracked allocation: the owned storage behind a string result
/// or behind the element array of a collection result.
#[derive(Debug)]
pub enum Allocation {
    Text(String),
    Elements(Vec<Data>),
}

static REGISTRY: Mutex<Vec<Allocation>> = Mutex::new(Vec::new());

fn table() -> MutexGuard<'static, Vec<Allocation>> {
    // A poisoned registry only means another worker died mid-phrase;
    // the pointer list itself is still sound.
    match REGISTRY.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

/// Tracks an allocation until the next [`clean`].
/// Returns the number of allocations now tracked.
pub fn register(allocation: Allocation) -> usize {
    let mut registry = table();
    registry.push(allocation);
    registry.len()
}

/// The number of currently tracked allocations.
pub fn live() -> usize {
    table().len()
}

/// Releases every tracked allocation. The registry's own storage is
/// kept so the next phrase does not have to regrow it.
pub fn clean() {
    table().clear();
}

/// Releases every tracked allocation and the registry's own storage.
pub fn destroy() {
    let mut registry = table();
    registry.clear();
    registry.shrink_to_fit();
}
