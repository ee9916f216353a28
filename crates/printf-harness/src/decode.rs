//! Serializable view of decoded format sections.

use printf_core::stdio::printf::{ConvValue, FormatSection, Parser, SliceArgs};
use serde::{Deserialize, Serialize};

use crate::args::ArgPack;

/// One section as the harness reports and compares it.
///
/// Decoding fills every field that applies. Fixtures may leave the optional
/// fields out, in which case they are not compared.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionRecord {
    pub raw: String,
    /// Conversion character; `None` for sections emitted verbatim.
    pub conv: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub precision: Option<i32>,
    /// Set flags in `-+ #0` order.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flags: Option<String>,
}

impl SectionRecord {
    #[must_use]
    pub fn from_section(section: &FormatSection<'_>, pack: &ArgPack) -> Self {
        let raw = String::from_utf8_lossy(section.raw_text).into_owned();
        if !section.is_conversion {
            return Self {
                raw,
                ..Self::default()
            };
        }

        let conv = section.conversion;
        let value = (conv != b'%').then(|| render_value(conv, section.value, pack));
        let flags = section.flags;
        let flag_text: String = [
            (flags.left_justify, '-'),
            (flags.force_sign, '+'),
            (flags.space_sign, ' '),
            (flags.alt_form, '#'),
            (flags.zero_pad, '0'),
        ]
        .into_iter()
        .filter_map(|(set, c)| set.then_some(c))
        .collect();

        Self {
            raw,
            conv: Some(char::from(conv).to_string()),
            value,
            width: Some(section.min_width),
            precision: Some(section.precision),
            flags: Some(flag_text),
        }
    }

    /// Whether `actual` agrees with every field this record specifies.
    ///
    /// `raw` and `conv` always take part, so a literal expectation never
    /// matches a conversion.
    #[must_use]
    pub fn matches(&self, actual: &Self) -> bool {
        fn agrees<T: PartialEq>(expected: &Option<T>, actual: &Option<T>) -> bool {
            expected.as_ref().is_none_or(|e| actual.as_ref() == Some(e))
        }

        self.raw == actual.raw
            && self.conv == actual.conv
            && agrees(&self.value, &actual.value)
            && agrees(&self.width, &actual.width)
            && agrees(&self.precision, &actual.precision)
            && agrees(&self.flags, &actual.flags)
    }
}

fn render_value(conv: u8, value: ConvValue, pack: &ArgPack) -> String {
    match value {
        ConvValue::Pointer(addr) => match pack.text_at(addr) {
            Some(text) => format!("s:{}", String::from_utf8_lossy(text)),
            None => format!("{addr:#x}"),
        },
        ConvValue::Raw(bits) if is_float_conv(conv) => format!("{bits:#x}"),
        // Integer slots are sign-extended, so the signed view is the
        // value the caller passed.
        ConvValue::Raw(bits) => (bits as i128).to_string(),
    }
}

fn is_float_conv(conv: u8) -> bool {
    matches!(conv, b'f' | b'F' | b'e' | b'E' | b'g' | b'G' | b'a' | b'A')
}

/// Decode `format` against `pack` into records.
#[must_use]
pub fn decode_sections(format: &[u8], pack: &ArgPack) -> Vec<SectionRecord> {
    Parser::new(format, SliceArgs::new(pack.args()))
        .map(|section| SectionRecord::from_section(&section, pack))
        .collect()
}
