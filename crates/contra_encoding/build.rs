//! Generates the `c2w` width table as a sorted array of ranges.
//!
//! Ranges are Unicode East Asian Wide/Fullwidth blocks (width 2),
//! C0/C1 controls and combining marks (width 0, encoded as -1 meaning
//! "not a printable width" so callers can distinguish "control" from
//! "zero-width joiner/combining"), and everything else defaults to 1.

use std::env;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

// (start, end inclusive, width)
const WIDE_RANGES: &[(u32, u32, i8)] = &[
    (0x1100, 0x115F, 2),   // Hangul Jamo
    (0x2E80, 0x303E, 2),   // CJK Radicals .. CJK Symbols
    (0x3041, 0x33FF, 2),   // Hiragana .. CJK Compatibility
    (0x3400, 0x4DBF, 2),   // CJK Extension A
    (0x4E00, 0x9FFF, 2),   // CJK Unified Ideographs
    (0xA000, 0xA4CF, 2),   // Yi
    (0xAC00, 0xD7A3, 2),   // Hangul Syllables
    (0xF900, 0xFAFF, 2),   // CJK Compatibility Ideographs
    (0xFE30, 0xFE4F, 2),   // CJK Compatibility Forms
    (0xFF00, 0xFF60, 2),   // Fullwidth Forms
    (0xFFE0, 0xFFE6, 2),   // Fullwidth Signs
    (0x1F300, 0x1F64F, 2), // Misc symbols, emoticons
    (0x1F900, 0x1F9FF, 2), // Supplemental Symbols and Pictographs
    (0x20000, 0x3FFFD, 2), // CJK Extension B..
];

// Zero-width combining marks: encoded as 0, distinct from -1 controls.
const ZERO_WIDTH_RANGES: &[(u32, u32, i8)] = &[
    (0x0300, 0x036F, 0), // Combining Diacritical Marks
    (0x200B, 0x200F, 0), // ZWSP, ZWNJ, ZWJ, LRM, RLM
    (0x202A, 0x202E, 0), // directional formatting (also markers, see contra_model)
    (0x2060, 0x2064, 0), // word joiner etc.
    (0x2066, 0x2069, 0), // isolates
    (0xFE00, 0xFE0F, 0), // variation selectors
    (0xFE20, 0xFE2F, 0), // combining half marks
];

const CONTROL_RANGES: &[(u32, u32, i8)] = &[
    (0x0000, 0x001F, -1),
    (0x007F, 0x009F, -1),
];

fn main() {
    println!("cargo:rerun-if-changed=build.rs");

    let mut ranges: Vec<(u32, u32, i8)> = Vec::new();
    ranges.extend_from_slice(CONTROL_RANGES);
    ranges.extend_from_slice(ZERO_WIDTH_RANGES);
    ranges.extend_from_slice(WIDE_RANGES);
    ranges.sort_by_key(|&(start, _, _)| start);

    let out_dir = env::var("OUT_DIR").unwrap();
    let dest_path = Path::new(&out_dir).join("width_table.rs");
    let mut out = BufWriter::new(File::create(dest_path).unwrap());

    writeln!(out, "// @generated by build.rs — do not edit by hand.").unwrap();
    writeln!(
        out,
        "pub static WIDTH_RANGES: [(u32, u32, i8); {}] = [",
        ranges.len()
    )
    .unwrap();
    for (start, end, width) in ranges {
        writeln!(out, "    (0x{start:X}, 0x{end:X}, {width}),").unwrap();
    }
    writeln!(out, "];").unwrap();
}
