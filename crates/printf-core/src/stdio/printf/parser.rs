//! printf format string parser.
//!
//! Clean-room implementation of the ISO C / POSIX conversion specification
//! grammar:
//!
//! ```text
//! %[N$][flags][width|*[N$]][.precision|.*[N$]][length]conversion
//! ```
//!
//! The parser hands out one [`FormatSection`] per call. Conversions have
//! their `*` width, `*` precision and value already fetched from the
//! [`ArgProvider`], so the renderer never touches the argument list.
//!
//! The format string ends at its first NUL byte or at the end of the slice,
//! whichever comes first. A specifier that runs into the end is cut short
//! there and echoed verbatim.

use super::arg_list::{ArgKind, ArgProvider};
use super::core_structs::{ConvValue, FormatFlags, FormatSection, LengthModifier, LengthSpec};
#[cfg(feature = "index-mode")]
use super::index::TypeCatalog;
use crate::errno;

// ---------------------------------------------------------------------------
// Parser
// ---------------------------------------------------------------------------

/// Incremental format string decoder.
///
/// Created once per formatting call and dropped when the format string is
/// exhausted. Two parsers over equal inputs produce equal sections.
#[derive(Debug)]
pub struct Parser<'a, A: ArgProvider> {
    fmt: &'a [u8],
    cur_pos: usize,
    args_cur: A,

    // Positional arguments need to revisit earlier values. `args_start` is a
    // snapshot of the argument list before any read and `args_index` is the
    // 1-based index of the argument `args_cur` will read next.
    #[cfg(feature = "index-mode")]
    args_start: A,
    #[cfg(feature = "index-mode")]
    args_index: usize,
    #[cfg(feature = "index-mode")]
    catalog: TypeCatalog,
}

impl<'a, A: ArgProvider> Parser<'a, A> {
    /// Create a parser over `fmt` reading arguments from `args`.
    pub fn new(fmt: &'a [u8], args: A) -> Self {
        let end = fmt.iter().position(|&b| b == 0).unwrap_or(fmt.len());
        Self {
            fmt: &fmt[..end],
            cur_pos: 0,
            #[cfg(feature = "index-mode")]
            args_start: args.clone(),
            args_cur: args,
            #[cfg(feature = "index-mode")]
            args_index: 1,
            #[cfg(feature = "index-mode")]
            catalog: TypeCatalog::new(),
        }
    }

    /// Byte offset of the next section.
    #[must_use]
    pub fn position(&self) -> usize {
        self.cur_pos
    }

    /// Returns true once every byte of the format string has been handed out.
    #[must_use]
    pub fn is_done(&self) -> bool {
        self.cur_pos >= self.fmt.len()
    }

    /// The argument cursor in its current position.
    #[must_use]
    pub fn args(&self) -> &A {
        &self.args_cur
    }

    /// Decode the next section, or `None` at the end of the format string.
    ///
    /// A section is either a maximal run of bytes without `%`, or one
    /// complete conversion specification starting at `%`.
    pub fn next_section(&mut self) -> Option<FormatSection<'a>> {
        if self.is_done() {
            return None;
        }
        let starting_pos = self.cur_pos;
        let mut section = FormatSection::literal(&[]);

        if self.at() == b'%' {
            section.is_conversion = true;
            self.cur_pos += 1;
            let conv_index = self.parse_conv_index();

            section.flags = parse_flags(self.fmt, &mut self.cur_pos);

            // --- width ---
            if self.at() == b'*' {
                self.cur_pos += 1;
                let index = self.parse_conv_index();
                match self.fetch_int(index) {
                    Some(width) => section.min_width = width,
                    None => section.is_conversion = false,
                }
            } else if self.at().is_ascii_digit() {
                section.min_width = parse_int(self.fmt, &mut self.cur_pos);
            }
            if section.min_width < 0 {
                section.min_width = section.min_width.checked_neg().unwrap_or(i32::MAX);
                section.flags.left_justify = true;
            }

            // --- precision ---
            // A negative `*` precision is kept as fetched; consumers treat it
            // as absent.
            if self.at() == b'.' {
                self.cur_pos += 1;
                section.precision = 0;
                if self.at() == b'*' {
                    self.cur_pos += 1;
                    let index = self.parse_conv_index();
                    match self.fetch_int(index) {
                        Some(precision) => section.precision = precision,
                        None => section.is_conversion = false,
                    }
                } else if self.at().is_ascii_digit() {
                    section.precision = parse_int(self.fmt, &mut self.cur_pos);
                }
            }

            // --- length modifier ---
            let length = parse_length_modifier(self.fmt, &mut self.cur_pos);
            section.length = length.modifier;
            section.bit_width = length.bit_width;

            // --- conversion ---
            section.conversion = self.at();
            match classify(section.conversion, length) {
                // Any specification ending in '%' prints '%', whatever came
                // before it.
                Conversion::Percent => section.is_conversion = true,
                Conversion::Errno => {
                    // Stored like a 64-bit double payload.
                    section.value = ConvValue::Raw(u128::from(errno::get_errno() as u64));
                }
                Conversion::Fetch(kind) => match self.fetch(kind, conv_index) {
                    Some(raw) if kind == ArgKind::Pointer => {
                        section.value = ConvValue::Pointer(raw as usize);
                    }
                    Some(raw) => section.value = ConvValue::Raw(kind.to_storage(raw)),
                    None => section.is_conversion = false,
                },
                Conversion::ZeroBitWidth | Conversion::Undefined => {
                    section.is_conversion = false;
                }
            }

            // Never step over the terminator.
            if self.at() != 0 {
                self.cur_pos += 1;
            }
        } else {
            while self.at() != b'%' && self.at() != 0 {
                self.cur_pos += 1;
            }
        }

        let fmt = self.fmt;
        section.raw_text = &fmt[starting_pos..self.cur_pos];
        Some(section)
    }

    fn at(&self) -> u8 {
        byte_at(self.fmt, self.cur_pos)
    }

    fn fetch_int(&mut self, index: usize) -> Option<i32> {
        self.fetch(ArgKind::Int, index)
            .map(|raw| ArgKind::Int.to_storage(raw) as u32 as i32)
    }

    // -----------------------------------------------------------------------
    // Sequential argument access
    // -----------------------------------------------------------------------

    #[cfg(not(feature = "index-mode"))]
    fn parse_conv_index(&mut self) -> usize {
        0
    }

    #[cfg(not(feature = "index-mode"))]
    fn fetch(&mut self, kind: ArgKind, _index: usize) -> Option<u128> {
        Some(self.args_cur.next_var(kind))
    }

    // -----------------------------------------------------------------------
    // Positional argument access
    // -----------------------------------------------------------------------

    #[cfg(feature = "index-mode")]
    fn parse_conv_index(&mut self) -> usize {
        parse_index(self.fmt, &mut self.cur_pos)
    }

    /// Read the argument at 1-based `index`, or the next one when `index`
    /// is 0.
    ///
    /// Fails when an argument before `index` has a type no specifier in the
    /// format string states, since the list cannot be walked past it.
    #[cfg(feature = "index-mode")]
    fn fetch(&mut self, kind: ArgKind, index: usize) -> Option<u128> {
        if index != 0 && index != self.args_index && !self.args_to_index(index) {
            return None;
        }
        self.catalog.set(index, kind.type_desc());
        self.args_index += 1;
        Some(self.args_cur.next_var(kind))
    }

    /// Move `args_cur` so that its next read is argument `index`.
    ///
    /// Going backwards restarts from `args_start`. Going forwards skips one
    /// argument at a time, which needs each skipped argument's type: from the
    /// catalog if known, else from a scan of the whole format string. Worst
    /// case is O(n^2) in the number of positional references.
    #[cfg(feature = "index-mode")]
    fn args_to_index(&mut self, index: usize) -> bool {
        if self.args_index > index {
            self.args_index = 1;
            self.args_cur = self.args_start.clone();
        }

        while self.args_index < index {
            let mut desc = self.catalog.get(self.args_index);
            if !desc.is_known() {
                desc = self.catalog.scan(self.fmt, self.args_index);
            }
            let Some(skip) = ArgKind::for_skip(desc) else {
                return false;
            };
            self.args_cur.next_var(skip);
            self.args_index += 1;
        }
        true
    }
}

impl<'a, A: ArgProvider> Iterator for Parser<'a, A> {
    type Item = FormatSection<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_section()
    }
}

// ---------------------------------------------------------------------------
// Grammar helpers
// ---------------------------------------------------------------------------
//
// These work on a byte slice and a caller-owned position so that the type
// scan can walk the format string without disturbing the live parser.

/// Byte at `pos`, or 0 past the end.
pub(crate) fn byte_at(fmt: &[u8], pos: usize) -> u8 {
    fmt.get(pos).copied().unwrap_or(0)
}

/// Parse any run of flag characters.
pub(crate) fn parse_flags(fmt: &[u8], pos: &mut usize) -> FormatFlags {
    let mut flags = FormatFlags::default();
    loop {
        match byte_at(fmt, *pos) {
            b'-' => flags.left_justify = true,
            b'+' => flags.force_sign = true,
            b' ' => flags.space_sign = true,
            b'#' => flags.alt_form = true,
            b'0' => flags.zero_pad = true,
            _ => return flags,
        }
        *pos += 1;
    }
}

/// Parse a decimal integer, consuming every digit and saturating at
/// `i32::MAX`.
pub(crate) fn parse_int(fmt: &[u8], pos: &mut usize) -> i32 {
    let mut value: i32 = 0;
    while let digit @ b'0'..=b'9' = byte_at(fmt, *pos) {
        value = value
            .saturating_mul(10)
            .saturating_add(i32::from(digit - b'0'));
        *pos += 1;
    }
    value
}

#[cfg(feature = "index-mode")]
pub(crate) fn skip_digits(fmt: &[u8], pos: &mut usize) {
    while byte_at(fmt, *pos).is_ascii_digit() {
        *pos += 1;
    }
}

/// Parse a positional reference `N$`.
///
/// Returns 0 without moving `pos` when there are no digits or they are not
/// followed by `$`.
#[cfg(feature = "index-mode")]
pub(crate) fn parse_index(fmt: &[u8], pos: &mut usize) -> usize {
    if !byte_at(fmt, *pos).is_ascii_digit() {
        return 0;
    }
    let mut end = *pos;
    let value = parse_int(fmt, &mut end);
    if byte_at(fmt, end) != b'$' {
        return 0;
    }
    *pos = end + 1;
    value as usize
}

/// Parse a length modifier, taking the longest match.
pub(crate) fn parse_length_modifier(fmt: &[u8], pos: &mut usize) -> LengthSpec {
    let (modifier, len) = match (byte_at(fmt, *pos), byte_at(fmt, *pos + 1)) {
        (b'h', b'h') => (LengthModifier::Hh, 2),
        (b'h', _) => (LengthModifier::H, 1),
        (b'l', b'l') => (LengthModifier::Ll, 2),
        (b'l', _) => (LengthModifier::L, 1),
        (b'w', b'f') => (LengthModifier::Wf, 2),
        (b'w', _) => (LengthModifier::W, 1),
        (b'L', _) => (LengthModifier::BigL, 1),
        (b'j', _) => (LengthModifier::J, 1),
        (b'z', _) => (LengthModifier::Z, 1),
        (b't', _) => (LengthModifier::T, 1),
        _ => return LengthSpec::default(),
    };
    *pos += len;

    let mut bit_width = 0;
    if matches!(modifier, LengthModifier::W | LengthModifier::Wf) {
        bit_width = parse_int(fmt, pos) as usize;
    }
    LengthSpec {
        modifier,
        bit_width,
    }
}

// ---------------------------------------------------------------------------
// Conversion dispatch
// ---------------------------------------------------------------------------

/// What a conversion character needs from the argument list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Conversion {
    /// `%`: prints itself, reads nothing.
    Percent,
    /// `%m`: reads the current errno instead of an argument.
    #[cfg_attr(not(feature = "strerror"), allow(dead_code))]
    Errno,
    /// Reads one argument of the given kind.
    Fetch(ArgKind),
    /// `w`/`wf` without a usable bit count.
    ZeroBitWidth,
    /// Unknown or compiled-out conversion.
    Undefined,
}

/// Select the argument type for conversion `conv` under `length`.
pub(crate) fn classify(conv: u8, length: LengthSpec) -> Conversion {
    match conv {
        b'%' => Conversion::Percent,
        b'c' => Conversion::Fetch(ArgKind::Int),
        b'd' | b'i' | b'o' | b'x' | b'X' | b'u' | b'b' | b'B' => classify_int(length),
        #[cfg(feature = "float")]
        b'f' | b'F' | b'e' | b'E' | b'a' | b'A' | b'g' | b'G' => {
            if length.modifier == LengthModifier::BigL {
                Conversion::Fetch(ArgKind::LongDouble)
            } else {
                Conversion::Fetch(ArgKind::Double)
            }
        }
        // Case only selects signedness; every fract fits in 32 bits.
        #[cfg(feature = "fixed-point")]
        b'r' | b'R' => Conversion::Fetch(ArgKind::U32),
        #[cfg(feature = "fixed-point")]
        b'k' | b'K' => {
            if length.modifier == LengthModifier::L {
                Conversion::Fetch(ArgKind::U64)
            } else {
                Conversion::Fetch(ArgKind::U32)
            }
        }
        #[cfg(feature = "strerror")]
        b'm' => Conversion::Errno,
        #[cfg(feature = "write-int")]
        b'n' => Conversion::Fetch(ArgKind::Pointer),
        b'p' | b's' => Conversion::Fetch(ArgKind::Pointer),
        _ => Conversion::Undefined,
    }
}

fn classify_int(length: LengthSpec) -> Conversion {
    let kind = match length.modifier {
        LengthModifier::None | LengthModifier::H | LengthModifier::Hh => ArgKind::Int,
        LengthModifier::L => ArgKind::Long,
        // 'L' on an integer is not ISO C, but other libcs accept it.
        LengthModifier::Ll | LengthModifier::BigL => ArgKind::LongLong,
        LengthModifier::J => ArgKind::IntMax,
        LengthModifier::Z => ArgKind::Size,
        LengthModifier::T => ArgKind::PtrDiff,
        LengthModifier::W | LengthModifier::Wf => {
            let bits = length.bit_width;
            if bits == 0 {
                return Conversion::ZeroBitWidth;
            }
            // Smallest of int, long, long long, intmax_t that holds `bits`.
            [ArgKind::Int, ArgKind::Long, ArgKind::LongLong]
                .into_iter()
                .find(|kind| bits <= kind.bits() as usize)
                .unwrap_or(ArgKind::IntMax)
        }
    };
    Conversion::Fetch(kind)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
