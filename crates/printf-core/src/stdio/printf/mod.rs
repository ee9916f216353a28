//! printf format decoding.
//!
//! [`Parser`] turns a format string plus an [`ArgProvider`] into a sequence of
//! [`FormatSection`]s. Each section is either literal text or a conversion
//! whose width, precision and argument value are already resolved.
//!
//! Reference: POSIX.1-2024 fprintf, ISO C23 7.23.6.1

pub mod arg_list;
pub mod core_structs;
#[cfg(feature = "index-mode")]
pub mod index;
pub mod parser;

pub use arg_list::{Arg, ArgKind, ArgProvider, DummyArgs, PackedArgs, SliceArgs, pack_args};
pub use core_structs::{
    ConvValue, FormatFlags, FormatSection, LengthModifier, LengthSpec, TypeDesc,
};
pub use parser::Parser;
