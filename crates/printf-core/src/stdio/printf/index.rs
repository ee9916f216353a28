//! Argument type bookkeeping for positional (`%N$`) conversions.
//!
//! A variadic list can only be walked by reading each argument with its
//! correct type. To reach argument N the parser must therefore know the types
//! of arguments 1..N, which only the format string can tell it. Types already
//! seen are kept in a small [`TypeCatalog`]; anything else is found by
//! scanning the format string from the start.

use super::arg_list::ArgKind;
use super::core_structs::TypeDesc;
use super::parser::{
    Conversion, byte_at, classify, parse_flags, parse_index, parse_length_modifier, skip_digits,
};
use crate::config::INDEX_ARR_LEN;

/// Bounded cache of argument types keyed by 1-based positional index.
///
/// Only indices `1..=INDEX_ARR_LEN` are stored. Lookups above the bound
/// always miss, which costs a re-scan but never a wrong answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeCatalog {
    descs: [TypeDesc; INDEX_ARR_LEN],
}

impl TypeCatalog {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            descs: [TypeDesc::Unknown; INDEX_ARR_LEN],
        }
    }

    /// Cached type of argument `index`, `Unknown` when not cached.
    #[must_use]
    pub fn get(&self, index: usize) -> TypeDesc {
        index
            .checked_sub(1)
            .and_then(|slot| self.descs.get(slot))
            .copied()
            .unwrap_or_default()
    }

    /// Record the type of argument `index`. Index 0 and indices past the
    /// capacity are ignored.
    pub fn set(&mut self, index: usize, desc: TypeDesc) {
        if let Some(slot) = index
            .checked_sub(1)
            .and_then(|slot| self.descs.get_mut(slot))
        {
            *slot = desc;
        }
    }

    /// Find the type of argument `index` by scanning `fmt` from the start.
    ///
    /// A `*N$` width or precision makes argument N an `int`. A conversion's
    /// own `N$` types N by its conversion character and length modifier.
    /// Every positional reference passed on the way is recorded. Returns
    /// `Unknown` when nothing in the string references `index`.
    pub fn scan(&mut self, fmt: &[u8], index: usize) -> TypeDesc {
        let int_desc = ArgKind::Int.type_desc();
        let mut pos = 0;

        while byte_at(fmt, pos) != 0 {
            if byte_at(fmt, pos) == b'%' {
                pos += 1;
                let conv_index = parse_index(fmt, &mut pos);

                // Flags only need skipping.
                parse_flags(fmt, &mut pos);

                if byte_at(fmt, pos) == b'*' {
                    pos += 1;
                    let width_index = parse_index(fmt, &mut pos);
                    self.set(width_index, int_desc);
                    if width_index == index {
                        return int_desc;
                    }
                } else {
                    skip_digits(fmt, &mut pos);
                }

                if byte_at(fmt, pos) == b'.' {
                    pos += 1;
                    if byte_at(fmt, pos) == b'*' {
                        pos += 1;
                        let precision_index = parse_index(fmt, &mut pos);
                        self.set(precision_index, int_desc);
                        if precision_index == index {
                            return int_desc;
                        }
                    } else {
                        skip_digits(fmt, &mut pos);
                    }
                }

                let length = parse_length_modifier(fmt, &mut pos);

                // A sequential conversion says nothing about positions; it
                // was only parsed to step over it correctly (think `%%`).
                if conv_index != 0 {
                    // `%N$%` reads nothing, so N stays untyped and cannot be
                    // skipped. Everything without an argument type of its own,
                    // `%N$m` included, skips as an `int`.
                    let desc = match classify(byte_at(fmt, pos), length) {
                        Conversion::Fetch(kind) => kind.type_desc(),
                        Conversion::Percent => TypeDesc::Unknown,
                        Conversion::Errno | Conversion::ZeroBitWidth | Conversion::Undefined => {
                            int_desc
                        }
                    };
                    self.set(conv_index, desc);
                    if conv_index == index {
                        return desc;
                    }
                }
            }
            if byte_at(fmt, pos) != 0 {
                pos += 1;
            }
        }

        TypeDesc::Unknown
    }
}

impl Default for TypeCatalog {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_and_set_respect_bounds() {
        let mut catalog = TypeCatalog::new();
        catalog.set(0, TypeDesc::Double);
        assert_eq!(catalog.get(0), TypeDesc::Unknown);

        catalog.set(1, TypeDesc::Double);
        assert_eq!(catalog.get(1), TypeDesc::Double);

        catalog.set(INDEX_ARR_LEN, TypeDesc::Pointer);
        assert_eq!(catalog.get(INDEX_ARR_LEN), TypeDesc::Pointer);

        catalog.set(INDEX_ARR_LEN + 1, TypeDesc::Pointer);
        assert_eq!(catalog.get(INDEX_ARR_LEN + 1), TypeDesc::Unknown);
    }

    #[test]
    fn scan_finds_conversion_type() {
        let mut catalog = TypeCatalog::new();
        assert_eq!(catalog.scan(b"%2$s %1$lld", 1), TypeDesc::Int64);
        // Index 2 was passed on the way and is now cached.
        assert_eq!(catalog.get(2), TypeDesc::Pointer);
    }

    #[test]
    fn scan_types_star_references_as_int() {
        let mut catalog = TypeCatalog::new();
        assert_eq!(catalog.scan(b"%3$*1$.*2$s", 2), TypeDesc::Int32);
        assert_eq!(catalog.get(1), TypeDesc::Int32);
        assert_eq!(catalog.get(3), TypeDesc::Unknown);
    }

    #[test]
    fn scan_misses_unreferenced_index() {
        let mut catalog = TypeCatalog::new();
        assert_eq!(catalog.scan(b"%2$d", 1), TypeDesc::Unknown);
        assert_eq!(catalog.scan(b"%d %d", 1), TypeDesc::Unknown);
    }

    #[test]
    fn scan_stops_at_positional_percent() {
        let mut catalog = TypeCatalog::new();
        assert_eq!(catalog.scan(b"%1$% %1$d", 1), TypeDesc::Unknown);
        assert_eq!(catalog.get(1), TypeDesc::Unknown);
    }

    #[test]
    fn scan_steps_over_sequential_percent() {
        let mut catalog = TypeCatalog::new();
        assert_eq!(catalog.scan(b"%% %%1$d %1$p", 1), TypeDesc::Pointer);
    }

    #[test]
    fn scan_types_positional_errno_as_int() {
        let mut catalog = TypeCatalog::new();
        assert_eq!(catalog.scan(b"%1$m %2$d", 1), TypeDesc::Int32);
        assert_eq!(catalog.get(1), TypeDesc::Int32);
    }

    #[cfg(feature = "float")]
    #[test]
    fn scan_distinguishes_float_widths() {
        let mut catalog = TypeCatalog::new();
        assert_eq!(catalog.scan(b"%1$f %2$Lf", 1), TypeDesc::Double);
        assert_eq!(catalog.scan(b"%1$f %2$Lf", 2), TypeDesc::LongDouble);
    }

    #[test]
    fn scan_stops_at_terminator() {
        let mut catalog = TypeCatalog::new();
        assert_eq!(catalog.scan(b"%1$", 1), TypeDesc::Int32);
        assert_eq!(catalog.scan(b"%", 1), TypeDesc::Unknown);
    }
}
