//! Argument sources for the decoder.
//!
//! A C variadic argument list can only be read forward, one value at a time,
//! and the reader must know each value's type to find the next one. The
//! [`ArgProvider`] trait captures exactly that: `next_var` consumes one
//! argument of a requested [`ArgKind`], and `Clone` takes a snapshot that can
//! later be assigned back to restart from an earlier position.

use core::ffi::{c_int, c_long, c_longlong};
use std::cell::Cell;
use std::rc::Rc;

use super::core_structs::TypeDesc;

// ---------------------------------------------------------------------------
// Argument kinds
// ---------------------------------------------------------------------------

/// C storage type requested from an argument list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArgKind {
    /// `int` (also `char`/`short` after default promotion).
    Int,
    /// `long`.
    Long,
    /// `long long`.
    LongLong,
    /// `intmax_t`.
    IntMax,
    /// `size_t`.
    Size,
    /// `ptrdiff_t`.
    PtrDiff,
    /// 32-bit fixed point storage (`fract`, `short accum`, `accum`).
    U32,
    /// 64-bit fixed point storage (`long accum`).
    U64,
    /// `double` (also `float` after default promotion).
    Double,
    /// `long double`.
    LongDouble,
    /// Any object pointer.
    Pointer,
}

impl ArgKind {
    /// Size of the C type in bytes.
    #[must_use]
    pub const fn size(self) -> usize {
        match self {
            Self::Int => size_of::<c_int>(),
            Self::Long => size_of::<c_long>(),
            Self::LongLong => size_of::<c_longlong>(),
            Self::IntMax | Self::U64 | Self::Double => 8,
            Self::Size | Self::PtrDiff | Self::Pointer => size_of::<usize>(),
            Self::U32 => 4,
            Self::LongDouble => 16,
        }
    }

    /// Natural alignment of the C type in bytes.
    #[must_use]
    pub const fn align(self) -> usize {
        self.size()
    }

    #[must_use]
    pub const fn bits(self) -> u32 {
        (self.size() * 8) as u32
    }

    #[must_use]
    pub const fn is_signed(self) -> bool {
        matches!(
            self,
            Self::Int | Self::Long | Self::LongLong | Self::IntMax | Self::PtrDiff
        )
    }

    /// Storage class used to skip an argument of this kind.
    #[must_use]
    pub const fn type_desc(self) -> TypeDesc {
        match self {
            Self::Double => TypeDesc::Double,
            Self::LongDouble => TypeDesc::LongDouble,
            Self::Pointer => TypeDesc::Pointer,
            _ if self.size() <= 4 => TypeDesc::Int32,
            _ => TypeDesc::Int64,
        }
    }

    /// Kind to read when skipping an argument of class `desc`.
    #[must_use]
    pub const fn for_skip(desc: TypeDesc) -> Option<Self> {
        match desc {
            TypeDesc::Unknown => None,
            TypeDesc::Int32 => Some(Self::U32),
            TypeDesc::Int64 => Some(Self::U64),
            TypeDesc::Pointer => Some(Self::Pointer),
            TypeDesc::Double => Some(Self::Double),
            TypeDesc::LongDouble => Some(Self::LongDouble),
        }
    }

    /// Widen the raw bits of a fetched argument to section storage.
    ///
    /// Only the low `self.bits()` bits of `raw` are significant. Signed kinds
    /// are sign-extended, the rest zero-extended, which is what a C cast of
    /// the fetched value to the widest unsigned storage type produces.
    #[must_use]
    pub const fn to_storage(self, raw: u128) -> u128 {
        let bits = self.bits();
        if bits >= u128::BITS {
            return raw;
        }
        let mask = (1u128 << bits) - 1;
        let masked = raw & mask;
        if self.is_signed() && (masked >> (bits - 1)) & 1 == 1 {
            masked | !mask
        } else {
            masked
        }
    }
}

// ---------------------------------------------------------------------------
// Provider trait
// ---------------------------------------------------------------------------

/// Forward-only cursor over a variadic argument sequence.
///
/// `Clone` is the snapshot operation: a clone taken before any read can be
/// assigned back over the cursor to restart from the first argument.
pub trait ArgProvider: Clone {
    /// Consume the next argument as `kind`.
    ///
    /// Returns the argument's bits in the low `kind.bits()` bits; anything
    /// above is ignored by the caller.
    fn next_var(&mut self, kind: ArgKind) -> u128;
}

// ---------------------------------------------------------------------------
// Typed argument values
// ---------------------------------------------------------------------------

/// One argument as the caller wrote it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Arg {
    Int(i32),
    Long(i64),
    LongLong(i64),
    Size(usize),
    U32(u32),
    U64(u64),
    Double(f64),
    /// Bits of a `long double` in the target's storage format.
    LongDouble(u128),
    Pointer(usize),
}

impl Arg {
    /// Pointer argument holding the address of `target`.
    #[must_use]
    pub fn pointer_to<T: ?Sized>(target: &T) -> Self {
        Self::Pointer(core::ptr::from_ref(target).cast::<u8>() as usize)
    }

    /// The C type this value is passed as.
    #[must_use]
    pub const fn kind(self) -> ArgKind {
        match self {
            Self::Int(_) => ArgKind::Int,
            Self::Long(_) => ArgKind::Long,
            Self::LongLong(_) => ArgKind::LongLong,
            Self::Size(_) => ArgKind::Size,
            Self::U32(_) => ArgKind::U32,
            Self::U64(_) => ArgKind::U64,
            Self::Double(_) => ArgKind::Double,
            Self::LongDouble(_) => ArgKind::LongDouble,
            Self::Pointer(_) => ArgKind::Pointer,
        }
    }

    /// Bits of the value as they sit in an argument slot.
    ///
    /// Integers are stored two's complement and sign-extended to the full
    /// slot, as a register-passed `int` would be. Doubles are stored as their
    /// IEEE 754 bit pattern.
    #[must_use]
    pub fn storage_bits(self) -> u128 {
        match self {
            Self::Int(v) => i128::from(v) as u128,
            Self::Long(v) | Self::LongLong(v) => i128::from(v) as u128,
            Self::Size(v) | Self::Pointer(v) => v as u128,
            Self::U32(v) => u128::from(v),
            Self::U64(v) => u128::from(v),
            Self::Double(v) => u128::from(v.to_bits()),
            Self::LongDouble(bits) => bits,
        }
    }
}

// ---------------------------------------------------------------------------
// Slice-backed provider
// ---------------------------------------------------------------------------

/// Argument cursor over a slice of typed values.
///
/// Each read consumes one slot regardless of the requested kind. Reads past
/// the end yield zero.
#[derive(Debug, Clone, Copy)]
pub struct SliceArgs<'a> {
    args: &'a [Arg],
    pos: usize,
}

impl<'a> SliceArgs<'a> {
    #[must_use]
    pub const fn new(args: &'a [Arg]) -> Self {
        Self { args, pos: 0 }
    }

    /// Number of slots read so far.
    #[must_use]
    pub const fn consumed(&self) -> usize {
        self.pos
    }
}

impl ArgProvider for SliceArgs<'_> {
    fn next_var(&mut self, _kind: ArgKind) -> u128 {
        let bits = self.args.get(self.pos).map_or(0, |arg| arg.storage_bits());
        self.pos = self.pos.saturating_add(1);
        bits
    }
}

// ---------------------------------------------------------------------------
// Packed buffer provider
// ---------------------------------------------------------------------------

/// Argument cursor over a byte buffer of little-endian, naturally aligned
/// values, the layout produced by [`pack_args`].
///
/// Alignment is relative to the start of the buffer. Reads that do not fit
/// in the remaining bytes yield zero.
#[derive(Debug, Clone, Copy)]
pub struct PackedArgs<'a> {
    buf: &'a [u8],
    offset: usize,
}

impl<'a> PackedArgs<'a> {
    #[must_use]
    pub const fn new(buf: &'a [u8]) -> Self {
        Self { buf, offset: 0 }
    }

    /// Byte offset of the next read, before alignment.
    #[must_use]
    pub const fn offset(&self) -> usize {
        self.offset
    }
}

impl ArgProvider for PackedArgs<'_> {
    fn next_var(&mut self, kind: ArgKind) -> u128 {
        let Some(start) = self.offset.checked_next_multiple_of(kind.align()) else {
            return 0;
        };
        let Some(end) = start.checked_add(kind.size()) else {
            return 0;
        };
        self.offset = end;
        let Some(bytes) = self.buf.get(start..end) else {
            return 0;
        };
        let mut le = [0u8; 16];
        le[..bytes.len()].copy_from_slice(bytes);
        u128::from_le_bytes(le)
    }
}

/// Serialize `args` into the buffer layout read by [`PackedArgs`].
#[must_use]
pub fn pack_args(args: &[Arg]) -> Vec<u8> {
    let mut buf = Vec::new();
    for arg in args {
        let kind = arg.kind();
        let start = buf.len().next_multiple_of(kind.align());
        buf.resize(start, 0);
        buf.extend_from_slice(&arg.storage_bits().to_le_bytes()[..kind.size()]);
    }
    buf
}

// ---------------------------------------------------------------------------
// Sizing provider
// ---------------------------------------------------------------------------

/// Provider that reads nothing and measures how large a [`PackedArgs`]
/// buffer must be to satisfy every read a format string makes.
///
/// Clones share the measurement, so restoring a snapshot (as positional
/// decoding does) keeps the furthest extent reached.
#[derive(Debug, Clone, Default)]
pub struct DummyArgs {
    offset: usize,
    high_water: Rc<Cell<usize>>,
}

impl DummyArgs {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Bytes a packed buffer needs for all reads made so far.
    #[must_use]
    pub fn read_count(&self) -> usize {
        self.high_water.get()
    }
}

impl ArgProvider for DummyArgs {
    fn next_var(&mut self, kind: ArgKind) -> u128 {
        self.offset = self
            .offset
            .next_multiple_of(kind.align())
            .saturating_add(kind.size());
        if self.offset > self.high_water.get() {
            self.high_water.set(self.offset);
        }
        0
    }
}
