//! Compile-time capability configuration.
//!
//! The decoder's optional conversions are selected with cargo features:
//! - `float`: `%f %F %e %E %a %A %g %G` fetch a `double` (or `long double`
//!   with `L`).
//! - `fixed-point`: `%r %R %k %K` fetch fixed point storage.
//! - `index-mode`: `%N$` and `*N$` positional arguments.
//! - `write-int`: `%n` fetches a pointer.
//! - `strerror`: `%m` captures the current `errno`.
//!
//! A conversion whose feature is disabled is treated like any other
//! undefined conversion and echoed as literal text.
//!
//! The positional type cache holds [`INDEX_ARR_LEN`] entries. The capacity is
//! read from the `PRINTF_INDEX_ARR_LEN` environment variable at build time;
//! a missing, zero or unparsable value keeps the default of 128.

const DEFAULT_INDEX_ARR_LEN: usize = 128;

/// Number of positional indices whose argument type is cached.
///
/// Indices above this bound are still resolved, but every lookup re-scans the
/// format string.
pub const INDEX_ARR_LEN: usize =
    parse_len_or(option_env!("PRINTF_INDEX_ARR_LEN"), DEFAULT_INDEX_ARR_LEN);

const fn parse_len_or(raw: Option<&str>, default: usize) -> usize {
    let Some(raw) = raw else {
        return default;
    };
    let bytes = raw.as_bytes();
    if bytes.is_empty() {
        return default;
    }
    let mut value: usize = 0;
    let mut i = 0;
    while i < bytes.len() {
        let b = bytes[i];
        if !b.is_ascii_digit() {
            return default;
        }
        value = match value.checked_mul(10) {
            Some(v) => match v.checked_add((b - b'0') as usize) {
                Some(v) => v,
                None => return default,
            },
            None => return default,
        };
        i += 1;
    }
    if value == 0 { default } else { value }
}

/// Capabilities compiled into this build of the decoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Capabilities {
    pub float: bool,
    pub fixed_point: bool,
    pub index_mode: bool,
    pub write_int: bool,
    pub strerror: bool,
    pub index_arr_len: usize,
}

impl Capabilities {
    /// Capabilities of the current build.
    #[must_use]
    pub const fn current() -> Self {
        Self {
            float: cfg!(feature = "float"),
            fixed_point: cfg!(feature = "fixed-point"),
            index_mode: cfg!(feature = "index-mode"),
            write_int: cfg!(feature = "write-int"),
            strerror: cfg!(feature = "strerror"),
            index_arr_len: INDEX_ARR_LEN,
        }
    }

    /// Returns true if `conv` names a conversion that is decoded (rather than
    /// echoed verbatim) under these capabilities.
    #[must_use]
    pub const fn supports_conversion(self, conv: u8) -> bool {
        match conv {
            b'%' | b'c' | b'd' | b'i' | b'o' | b'x' | b'X' | b'u' | b'b' | b'B' | b'p'
            | b's' => true,
            b'f' | b'F' | b'e' | b'E' | b'a' | b'A' | b'g' | b'G' => self.float,
            b'r' | b'R' | b'k' | b'K' => self.fixed_point,
            b'n' => self.write_int,
            b'm' => self.strerror,
            _ => false,
        }
    }
}

impl Default for Capabilities {
    fn default() -> Self {
        Self::current()
    }
}
