//! Data types shared by the decoder and its consumers.

// ---------------------------------------------------------------------------
// Specifier fields
// ---------------------------------------------------------------------------

/// Flags parsed from a printf format directive.
///
/// Flags are recorded as written. Precedence rules between them (`+` over
/// ` `, `-` over `0`) belong to the renderer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct FormatFlags {
    pub left_justify: bool, // '-'
    pub force_sign: bool,   // '+'
    pub space_sign: bool,   // ' '
    pub alt_form: bool,     // '#'
    pub zero_pad: bool,     // '0'
}

/// Length modifier.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum LengthModifier {
    #[default]
    None,
    Hh,   // 'hh'
    H,    // 'h'
    L,    // 'l'
    Ll,   // 'll'
    BigL, // 'L'
    J,    // 'j'
    Z,    // 'z'
    T,    // 't'
    W,    // 'wN'
    Wf,   // 'wfN'
}

/// A length modifier together with the bit count of a `wN`/`wfN` form.
///
/// `bit_width` is zero for every other modifier and for a `w` written
/// without digits.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct LengthSpec {
    pub modifier: LengthModifier,
    pub bit_width: usize,
}

// ---------------------------------------------------------------------------
// Argument classification
// ---------------------------------------------------------------------------

/// Coarse storage class of one argument slot.
///
/// Used in index mode to skip an argument whose value is not needed: the
/// cursor must advance over it with a read of the right size and register
/// class. `Unknown` means the class has not been determined.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum TypeDesc {
    #[default]
    Unknown,
    Int32,
    Int64,
    Pointer,
    Double,
    LongDouble,
}

impl TypeDesc {
    #[must_use]
    pub const fn is_known(self) -> bool {
        !matches!(self, Self::Unknown)
    }
}

// ---------------------------------------------------------------------------
// Sections
// ---------------------------------------------------------------------------

/// Argument payload of a conversion section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConvValue {
    /// Bits of an integer, floating point or fixed point argument, widened to
    /// the largest storage any conversion needs. Signed arguments are
    /// sign-extended.
    Raw(u128),
    /// Address of a `%s`, `%p` or `%n` argument.
    Pointer(usize),
}

impl ConvValue {
    #[must_use]
    pub const fn as_raw(self) -> Option<u128> {
        match self {
            Self::Raw(bits) => Some(bits),
            Self::Pointer(_) => None,
        }
    }

    #[must_use]
    pub const fn as_pointer(self) -> Option<usize> {
        match self {
            Self::Pointer(addr) => Some(addr),
            Self::Raw(_) => None,
        }
    }
}

impl Default for ConvValue {
    fn default() -> Self {
        Self::Raw(0)
    }
}

/// One decoded piece of a format string.
///
/// When `is_conversion` is false the renderer emits `raw_text` unchanged and
/// every other field is meaningless. This covers literal runs as well as
/// specifiers that could not be decoded (undefined conversion, `w` without a
/// bit count, positional gap).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FormatSection<'a> {
    /// Exact bytes of the format string covered by this section.
    pub raw_text: &'a [u8],
    pub is_conversion: bool,
    /// Conversion character, or 0 when the specifier ran into the terminator.
    pub conversion: u8,
    pub length: LengthModifier,
    /// Requested bit count for `wN`/`wfN`.
    pub bit_width: usize,
    pub flags: FormatFlags,
    /// Always non-negative. A negative `*` width is folded into
    /// `flags.left_justify`.
    pub min_width: i32,
    /// `-1` when no precision was given. A `*` precision is passed through
    /// as fetched, so any negative value must be read as "absent".
    pub precision: i32,
    pub value: ConvValue,
}

impl<'a> FormatSection<'a> {
    /// A section that echoes `raw_text` verbatim.
    #[must_use]
    pub const fn literal(raw_text: &'a [u8]) -> Self {
        Self {
            raw_text,
            is_conversion: false,
            conversion: 0,
            length: LengthModifier::None,
            bit_width: 0,
            flags: FormatFlags {
                left_justify: false,
                force_sign: false,
                space_sign: false,
                alt_form: false,
                zero_pad: false,
            },
            min_width: 0,
            precision: -1,
            value: ConvValue::Raw(0),
        }
    }

    /// Precision with every negative value mapped to `None`.
    #[must_use]
    pub fn precision_or_none(&self) -> Option<usize> {
        usize::try_from(self.precision).ok()
    }
}
