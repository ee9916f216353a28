//! Typed argument lists built from `kind:value` text.
//!
//! | prefix | C type | example |
//! |---|---|---|
//! | `i` | `int` | `i:-5` |
//! | `l` | `long` | `l:0x7fffffff` |
//! | `ll` | `long long` | `ll:-1` |
//! | `z` | `size_t` | `z:4096` |
//! | `u32` / `u64` | fixed point storage | `u32:0x8000` |
//! | `f` | `double` | `f:2.5` |
//! | `ld` | `long double` storage bits | `ld:0x3fff8000000000000000` |
//! | `p` | `void *` | `p:0xdead` |
//! | `s` | `char *` | `s:hello` |
//!
//! Text arguments are owned by the [`ArgPack`]; the argument list carries
//! their address, the way a C caller passes a string.

use printf_core::stdio::printf::Arg;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ArgSpecError {
    #[error("argument spec `{0}` is missing a `kind:` prefix")]
    MissingKind(String),
    #[error("unknown argument kind `{kind}` in `{spec}`")]
    UnknownKind { kind: String, spec: String },
    #[error("invalid {kind} value `{value}`")]
    InvalidValue { kind: &'static str, value: String },
}

/// An argument list together with the storage of its text arguments.
#[derive(Debug, Default)]
pub struct ArgPack {
    args: Vec<Arg>,
    // NUL-terminated; boxed so addresses survive growth of the vector.
    texts: Vec<Box<[u8]>>,
}

impl ArgPack {
    /// Parse every spec, in order.
    pub fn parse<I, S>(specs: I) -> Result<Self, ArgSpecError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut pack = Self::default();
        for spec in specs {
            pack.push_spec(spec.as_ref())?;
        }
        Ok(pack)
    }

    /// Parse one spec and append it.
    pub fn push_spec(&mut self, spec: &str) -> Result<(), ArgSpecError> {
        let (kind, value) = spec
            .split_once(':')
            .ok_or_else(|| ArgSpecError::MissingKind(spec.to_string()))?;
        let arg = match kind {
            "i" => Arg::Int(parse_signed(value, "int")?.try_into().map_err(|_| {
                invalid("int", value)
            })?),
            "l" => Arg::Long(parse_signed(value, "long")?),
            "ll" => Arg::LongLong(parse_signed(value, "long long")?),
            "z" => Arg::Size(
                parse_unsigned(value, "size_t")?
                    .try_into()
                    .map_err(|_| invalid("size_t", value))?,
            ),
            "u32" => Arg::U32(
                parse_unsigned(value, "u32")?
                    .try_into()
                    .map_err(|_| invalid("u32", value))?,
            ),
            "u64" => Arg::U64(
                parse_unsigned(value, "u64")?
                    .try_into()
                    .map_err(|_| invalid("u64", value))?,
            ),
            "f" => Arg::Double(value.parse().map_err(|_| invalid("double", value))?),
            "ld" => Arg::LongDouble(parse_unsigned(value, "long double")?),
            "p" => Arg::Pointer(
                parse_unsigned(value, "pointer")?
                    .try_into()
                    .map_err(|_| invalid("pointer", value))?,
            ),
            "s" => {
                let mut text = Vec::with_capacity(value.len() + 1);
                text.extend_from_slice(value.as_bytes());
                text.push(0);
                let text = text.into_boxed_slice();
                let arg = Arg::pointer_to(&*text);
                self.texts.push(text);
                arg
            }
            _ => {
                return Err(ArgSpecError::UnknownKind {
                    kind: kind.to_string(),
                    spec: spec.to_string(),
                });
            }
        };
        self.args.push(arg);
        Ok(())
    }

    #[must_use]
    pub fn args(&self) -> &[Arg] {
        &self.args
    }

    /// Text owned by this pack that starts at `addr`, without its NUL.
    #[must_use]
    pub fn text_at(&self, addr: usize) -> Option<&[u8]> {
        self.texts
            .iter()
            .find(|text| text.as_ptr() as usize == addr)
            .map(|text| &text[..text.len() - 1])
    }
}

fn invalid(kind: &'static str, value: &str) -> ArgSpecError {
    ArgSpecError::InvalidValue {
        kind,
        value: value.to_string(),
    }
}

fn parse_signed(value: &str, kind: &'static str) -> Result<i64, ArgSpecError> {
    let (negative, digits) = match value.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, value),
    };
    let magnitude = parse_unsigned(digits, kind)?;
    let signed = if negative {
        0i128.checked_sub_unsigned(magnitude)
    } else {
        i128::try_from(magnitude).ok()
    };
    signed
        .and_then(|v| i64::try_from(v).ok())
        .ok_or_else(|| invalid(kind, value))
}

fn parse_unsigned(value: &str, kind: &'static str) -> Result<u128, ArgSpecError> {
    let parsed = match value
        .strip_prefix("0x")
        .or_else(|| value.strip_prefix("0X"))
    {
        Some(hex) => u128::from_str_radix(hex, 16),
        None => value.parse(),
    };
    parsed.map_err(|_| invalid(kind, value))
}
