include!(concat!(env!("OUT_DIR"), "/width_table.rs"));

/// Character width lookup, `c2w(u) -> {-1, 0, 1, 2}`.
///
/// `-1` marks a C0/C1 control code point (never printed as a cell: the
/// caller dispatches it as a control function instead). `0` marks a
/// zero-width combining mark, joiner, or bidi-format character — these
/// become `cluster_extension`/`marker` cells in `contra_model`, never a
/// printable cell on their own. `1`/`2` are ordinary and wide glyphs.
#[must_use]
pub fn c2w(u: char) -> i8 {
    let cp = u as u32;
    match WIDTH_RANGES.binary_search_by(|&(start, end, _)| {
        if cp < start {
            std::cmp::Ordering::Greater
        } else if cp > end {
            std::cmp::Ordering::Less
        } else {
            std::cmp::Ordering::Equal
        }
    }) {
        Ok(idx) => WIDTH_RANGES[idx].2,
        Err(_) => 1,
    }
}

#[cfg(test)]
mod tests {
    use super::c2w;

    #[test]
    fn ascii_is_narrow() {
        assert_eq!(c2w('A'), 1);
        assert_eq!(c2w(' '), 1);
    }

    #[test]
    fn cjk_is_wide() {
        assert_eq!(c2w('日'), 2);
        assert_eq!(c2w('本'), 2);
    }

    #[test]
    fn controls_are_negative() {
        assert_eq!(c2w('\u{0007}'), -1);
        assert_eq!(c2w('\u{001B}'), -1);
    }

    #[test]
    fn combining_marks_are_zero_width() {
        assert_eq!(c2w('\u{0301}'), 0);
        assert_eq!(c2w('\u{200D}'), 0);
    }
}
