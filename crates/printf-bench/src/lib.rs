//! Format strings and argument lists shared by the printf benchmarks.

use std::fmt::Write;

use printf_core::stdio::printf::Arg;

/// A typical log line: text runs between a handful of sequential conversions.
pub const SEQUENTIAL: &[u8] = b"[%5d] %-12s took %lu.%03lu ms (%x) %% done\n";

/// Arguments matching [`SEQUENTIAL`].
#[must_use]
pub fn sequential_args(text: &[u8]) -> Vec<Arg> {
    vec![
        Arg::Int(42),
        Arg::pointer_to(text),
        Arg::Long(17),
        Arg::Long(250),
        Arg::Int(0xbeef),
    ]
}

/// `count` positional references in descending order, so every
/// conversion rewinds and skips over the arguments before it.
#[must_use]
pub fn descending_positional(count: usize) -> (String, Vec<Arg>) {
    let mut fmt = String::new();
    for i in (1..=count).rev() {
        let _ = write!(fmt, "%{i}$d ");
    }
    let args = (1..=count)
        .map(|i| Arg::Int(i32::try_from(i).unwrap_or(i32::MAX)))
        .collect();
    (fmt, args)
}
