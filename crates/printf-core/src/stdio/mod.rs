//! Standard I/O support.
//!
//! Only the printf format decoder lives here; rendering and output sinks are
//! supplied by the caller.

pub mod printf;

pub use printf::{FormatSection, Parser};
