#![no_main]
use libfuzzer_sys::fuzz_target;
use printf_core::stdio::printf::{PackedArgs, Parser};

fuzz_target!(|data: &[u8]| {
    // Format string up to the first NUL; whatever follows is the packed
    // argument area.
    let split = data.iter().position(|&b| b == 0).unwrap_or(data.len());
    let fmt = &data[..split];
    let arg_bytes = data.get(split + 1..).unwrap_or(&[]);

    let mut parser = Parser::new(data, PackedArgs::new(arg_bytes));
    let mut rebuilt = Vec::with_capacity(fmt.len());
    let mut last = 0;
    while let Some(section) = parser.next_section() {
        assert!(!section.raw_text.is_empty());
        assert!(parser.position() > last);
        last = parser.position();
        if section.is_conversion {
            assert!(section.raw_text.starts_with(b"%"));
            assert!(section.min_width >= 0);
        }
        rebuilt.extend_from_slice(section.raw_text);
    }
    assert_eq!(rebuilt, fmt);
});
