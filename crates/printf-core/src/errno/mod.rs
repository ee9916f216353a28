//! Error number storage.
//!
//! Thread-local `errno` as read by the `%m` conversion.

use std::cell::Cell;

thread_local! {
    static ERRNO: Cell<i32> = const { Cell::new(0) };
}

pub const ENOENT: i32 = 2;
pub const EINVAL: i32 = 22;

/// Returns the current thread-local errno value.
///
/// Equivalent to reading C `errno`.
pub fn get_errno() -> i32 {
    ERRNO.get()
}

/// Sets the current thread-local errno value.
///
/// Equivalent to assigning to C `errno`.
pub fn set_errno(value: i32) {
    ERRNO.set(value);
}
