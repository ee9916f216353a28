//! # printf-core
//!
//! Format-string decoder for a printf-family implementation.
//!
//! The decoder walks a C format string and produces one fully resolved
//! [`FormatSection`](stdio::printf::FormatSection) per call: either a run of
//! literal text or a conversion specifier whose argument has already been
//! fetched from an [`ArgProvider`](stdio::printf::ArgProvider). Rendering the
//! sections into bytes is left to the caller. No `unsafe` code is permitted
//! at the crate level.

#![deny(unsafe_code)]

pub mod config;
pub mod errno;
pub mod stdio;

pub use config::Capabilities;
