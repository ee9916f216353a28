//! Integration test: printf format section decoding
//!
//! Validates that:
//! 1. Concatenating every section's raw text reproduces the format string.
//! 2. `%` conversions read nothing and are always conversions.
//! 3. `*` width and precision are fetched and normalized.
//! 4. Undefined conversions are echoed as literal text.
//! 5. Sequential and positional arguments resolve to the right values.
//! 6. Positional gaps fail the whole section.
//! 7. Decoding is deterministic across parser instances.
//!
//! Run: cargo test -p printf-core --test parser_sections_test

use printf_core::stdio::printf::{
    Arg, ConvValue, DummyArgs, FormatSection, PackedArgs, Parser, SliceArgs, pack_args,
};

fn decode<'a>(fmt: &'a [u8], args: &[Arg]) -> Vec<FormatSection<'a>> {
    Parser::new(fmt, SliceArgs::new(args)).collect()
}

fn raw(value: i64) -> ConvValue {
    ConvValue::Raw(i128::from(value) as u128)
}

// ---------------------------------------------------------------------------
// Partition
// ---------------------------------------------------------------------------

#[test]
fn raw_text_partitions_format_string() {
    let formats: [&[u8]; 8] = [
        b"plain text",
        b"%d%%%s",
        b"a %5.2f b %-+#0x c",
        b"%Q%y%",
        b"%*.*d|%.*s|",
        b"trailing %-",
        b"%1$d %2$s %1$d",
        b"%w%wf%w64d",
    ];
    let args = [Arg::Int(1), Arg::Int(2), Arg::Int(3), Arg::Int(4)];
    for fmt in formats {
        let joined: Vec<u8> = decode(fmt, &args)
            .iter()
            .flat_map(|s| s.raw_text.iter().copied())
            .collect();
        assert_eq!(joined, fmt, "{}", String::from_utf8_lossy(fmt));
    }
}

#[test]
fn sections_advance_monotonically() {
    let args = [Arg::Int(1), Arg::Int(2)];
    let mut parser = Parser::new(b"x%dy%dz", SliceArgs::new(&args));
    let mut last = 0;
    while let Some(section) = parser.next_section() {
        assert!(!section.raw_text.is_empty());
        assert!(parser.position() > last);
        last = parser.position();
    }
    assert!(parser.is_done());
    assert!(parser.next_section().is_none());
}

// ---------------------------------------------------------------------------
// Percent
// ---------------------------------------------------------------------------

#[test]
fn percent_is_always_a_conversion() {
    for fmt in [&b"%%"[..], b"%+%", b"%-10.3%", b"%ll%"] {
        let args = [Arg::Int(99)];
        let mut parser = Parser::new(fmt, SliceArgs::new(&args));
        let section = parser.next_section().unwrap();
        assert!(section.is_conversion, "{}", String::from_utf8_lossy(fmt));
        assert_eq!(section.conversion, b'%');
        assert_eq!(section.raw_text, fmt);
        assert_eq!(parser.args().consumed(), 0);
        assert!(parser.next_section().is_none());
    }
}

// ---------------------------------------------------------------------------
// Width / precision
// ---------------------------------------------------------------------------

#[test]
fn negative_star_width_sets_left_justify() {
    let out = decode(b"%*d", &[Arg::Int(-5), Arg::Int(7)]);
    assert_eq!(out.len(), 1);
    let s = out[0];
    assert!(s.is_conversion);
    assert_eq!(s.min_width, 5);
    assert!(s.flags.left_justify);
    assert_eq!(s.value, raw(7));
}

#[test]
fn star_width_and_precision_consume_in_order() {
    let args = [Arg::Int(10), Arg::Int(3), Arg::Int(42)];
    let mut parser = Parser::new(b"%*.*d", SliceArgs::new(&args));
    let s = parser.next_section().unwrap();
    assert_eq!(s.min_width, 10);
    assert_eq!(s.precision, 3);
    assert_eq!(s.value, raw(42));
    assert_eq!(parser.args().consumed(), 3);
}

// ---------------------------------------------------------------------------
// Undefined conversions
// ---------------------------------------------------------------------------

#[test]
fn undefined_conversion_passes_through() {
    let args = [Arg::Int(1)];
    let mut parser = Parser::new(b"%Q", SliceArgs::new(&args));
    let s = parser.next_section().unwrap();
    assert!(!s.is_conversion);
    assert_eq!(s.raw_text, b"%Q");
    assert!(parser.next_section().is_none());
}

#[test]
fn undefined_conversion_keeps_whole_specifier() {
    let out = decode(b"a%-08.3hhyb", &[]);
    assert_eq!(out.len(), 3);
    assert_eq!(out[1].raw_text, b"%-08.3hhy");
    assert!(!out[1].is_conversion);
    assert_eq!(out[2].raw_text, b"b");
}

// ---------------------------------------------------------------------------
// Sequential
// ---------------------------------------------------------------------------

#[test]
fn sequential_round_trip() {
    let text = b"hi\0";
    let args = [Arg::Int(42), Arg::pointer_to(text)];
    let mut parser = Parser::new(b"%d-%s", SliceArgs::new(&args));

    let d = parser.next_section().unwrap();
    assert!(d.is_conversion);
    assert_eq!(d.conversion, b'd');
    assert_eq!(d.value, raw(42));
    assert_eq!(parser.args().consumed(), 1);

    let dash = parser.next_section().unwrap();
    assert!(!dash.is_conversion);
    assert_eq!(dash.raw_text, b"-");

    let s = parser.next_section().unwrap();
    assert!(s.is_conversion);
    assert_eq!(s.conversion, b's');
    assert_eq!(s.value, ConvValue::Pointer(text.as_ptr() as usize));
    assert_eq!(parser.args().consumed(), 2);
}

#[test]
fn packed_arguments_decode_like_typed_ones() {
    let args = [Arg::Int(-3), Arg::LongLong(1 << 40), Arg::Pointer(0xdead)];
    let buf = pack_args(&args);
    let packed: Vec<_> = Parser::new(b"%d %lld %p", PackedArgs::new(&buf)).collect();
    let typed = decode(b"%d %lld %p", &args);
    assert_eq!(packed, typed);
    assert_eq!(packed[0].value, raw(-3));
    assert_eq!(packed[2].value, raw(1 << 40));
    assert_eq!(packed[4].value, ConvValue::Pointer(0xdead));
}

#[test]
fn dummy_args_sizes_packed_buffer() {
    let dummy = DummyArgs::new();
    let sections: Vec<_> = Parser::new(b"%d %lld %p %c", dummy.clone()).collect();
    assert_eq!(sections.len(), 7);
    let args = [
        Arg::Int(0),
        Arg::LongLong(0),
        Arg::Pointer(0),
        Arg::Int(0),
    ];
    assert_eq!(dummy.read_count(), pack_args(&args).len());
}

// ---------------------------------------------------------------------------
// Positional
// ---------------------------------------------------------------------------

#[cfg(feature = "index-mode")]
mod positional {
    use super::*;

    #[test]
    fn rewind_to_earlier_index() {
        let args = [Arg::Int(10), Arg::Int(20)];
        let out = decode(b"%2$d %1$d", &args);
        assert_eq!(out.len(), 3);
        assert!(out[0].is_conversion);
        assert_eq!(out[0].value, raw(20));
        assert!(out[2].is_conversion);
        assert_eq!(out[2].value, raw(10));
    }

    #[test]
    fn gap_fails_whole_section() {
        let args = [Arg::Int(10), Arg::Int(20)];
        let out = decode(b"%2$d", &args);
        assert_eq!(out.len(), 1);
        assert!(!out[0].is_conversion);
        assert_eq!(out[0].raw_text, b"%2$d");
    }

    #[test]
    fn gap_in_star_width_fails_section() {
        let args = [Arg::Int(10), Arg::Int(20), Arg::Int(30)];
        let out = decode(b"%3$*2$d", &args);
        assert!(!out[0].is_conversion);
    }

    #[test]
    fn positional_star_width_and_precision() {
        let args = [Arg::Int(-6), Arg::Int(2), Arg::Int(77)];
        let out = decode(b"%3$*1$.*2$d", &args);
        let s = out[0];
        assert!(s.is_conversion);
        assert_eq!(s.min_width, 6);
        assert!(s.flags.left_justify);
        assert_eq!(s.precision, 2);
        assert_eq!(s.value, raw(77));
    }

    #[test]
    fn skip_uses_types_from_later_specifiers() {
        let text = b"str\0";
        let args = [
            Arg::LongLong(-9),
            Arg::pointer_to(text),
            Arg::Int(5),
        ];
        let out = decode(b"%3$d %2$s %1$lld", &args);
        assert_eq!(out[0].value, raw(5));
        assert_eq!(out[2].value, ConvValue::Pointer(text.as_ptr() as usize));
        assert_eq!(out[4].value, raw(-9));
    }

    #[test]
    fn repeated_index_reads_same_value() {
        let args = [Arg::Int(1), Arg::Int(2)];
        let out = decode(b"%1$d %2$d %1$d %1$d", &args);
        let values: Vec<_> = out
            .iter()
            .filter(|s| s.is_conversion)
            .map(|s| s.value)
            .collect();
        assert_eq!(values, [raw(1), raw(2), raw(1), raw(1)]);
    }

    #[test]
    fn packed_positional_respects_skipped_widths() {
        let args = [Arg::Int(7), Arg::LongLong(1 << 33), Arg::Int(9)];
        let buf = pack_args(&args);
        let out: Vec<_> = Parser::new(b"%3$d %2$lld %1$d", PackedArgs::new(&buf)).collect();
        assert_eq!(out[0].value, raw(9));
        assert_eq!(out[2].value, raw(1 << 33));
        assert_eq!(out[4].value, raw(7));
    }

    #[test]
    fn index_beyond_cache_still_resolves() {
        use printf_core::config::INDEX_ARR_LEN;
        use std::fmt::Write;

        let count = INDEX_ARR_LEN + 3;
        let mut fmt = String::new();
        for i in (1..=count).rev() {
            write!(fmt, "%{i}$d ").unwrap();
        }
        let args: Vec<Arg> = (1..=count).map(|i| Arg::Int(i as i32)).collect();
        let out = decode(fmt.as_bytes(), &args);
        let values: Vec<_> = out
            .iter()
            .filter(|s| s.is_conversion)
            .map(|s| s.value)
            .collect();
        let expected: Vec<_> = (1..=count).rev().map(|i| raw(i as i64)).collect();
        assert_eq!(values, expected);
    }

    #[test]
    fn parsers_are_deterministic() {
        let args = [Arg::Int(4), Arg::Double(0.5), Arg::Int(-1)];
        let fmt = b"%3$d %1$*3$d %2$f %1$d";
        let first = decode(fmt, &args);
        let second = decode(fmt, &args);
        assert_eq!(first, second);
        assert!(first.iter().filter(|s| s.raw_text.starts_with(b"%")).all(|s| s.is_conversion));
    }

    #[test]
    fn mixed_sequential_and_positional() {
        let args = [Arg::Int(1), Arg::Int(2), Arg::Int(3)];
        let out = decode(b"%d %2$d %d", &args);
        let values: Vec<_> = out
            .iter()
            .filter(|s| s.is_conversion)
            .map(|s| s.value)
            .collect();
        assert_eq!(values, [raw(1), raw(2), raw(3)]);
    }

    #[cfg(feature = "strerror")]
    #[test]
    fn positional_errno_skips_as_int() {
        let args = [Arg::Int(1), Arg::Int(2)];
        let out = decode(b"%1$m%2$d", &args);
        assert!(out[0].is_conversion);
        assert!(out[1].is_conversion);
        assert_eq!(out[1].value, raw(2));
    }

    #[test]
    fn positional_percent_leaves_index_untyped() {
        let args = [Arg::Int(1), Arg::Int(2)];
        let out = decode(b"%2$d%1$%%1$d", &args);
        assert_eq!(out.len(), 3);
        // Argument 1 is first described by `%1$%`, which reads nothing.
        assert!(!out[0].is_conversion);
        assert_eq!(out[0].raw_text, b"%2$d");
        assert!(out[1].is_conversion);
        assert_eq!(out[1].conversion, b'%');
        assert!(out[2].is_conversion);
        assert_eq!(out[2].value, raw(1));
    }

    #[test]
    fn sequential_conversions_do_not_type_positions() {
        let args = [Arg::Int(1), Arg::Int(2), Arg::Int(3)];
        let out = decode(b"%d %3$d", &args);
        // Argument 2 is never named, so it cannot be skipped.
        assert!(out[0].is_conversion);
        assert!(!out[2].is_conversion);
    }
}
