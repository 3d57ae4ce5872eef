//! Minimal SGR parameter diffing between two attributes.

use contra_model::{Attribute, AttributeFlags, ColorSpec, ExtraAttributeFlags};
use smallvec::SmallVec;

use crate::commands::SgrParam;
use crate::termcap::TermcapSgrType;

/// Resolve a `Default`-space color against the board's currently
/// configured default, so a cell that's just been painted with the
/// literal default RGB (say, via an explicit OSC 10/11 override) still
/// diffs against the remote as "default" rather than an explicit color.
#[must_use]
pub fn apply_default_attribute(mut attr: Attribute, default_fg: ColorSpec, default_bg: ColorSpec) -> Attribute {
    if attr.fg == default_fg {
        attr.fg = ColorSpec::Default;
    }
    if attr.bg == default_bg {
        attr.bg = ColorSpec::Default;
    }
    attr
}

/// Compute the SGR parameters needed to move the remote terminal's
/// rendition from `old` to `new`, honoring `cap`'s off-code
/// availability. Returns an empty list when no change is needed.
#[must_use]
pub fn diff_sgr(cap: &TermcapSgrType, old: Attribute, new: Attribute) -> Vec<SgrParam> {
    if new.is_default() {
        return if old.is_default() {
            Vec::new()
        } else {
            vec![SgrParam::Single(0)]
        };
    }

    let mut cur = old;
    let mut codes = Vec::new();

    // Each shared reset code clears every flag in its group at once.
    // When a group loses some but not all of its members, clear the
    // whole group with the shared off code and let the "additions" pass
    // below re-set whatever should remain.
    macro_rules! group {
        ($mask:expr, $has_off:expr, $off:expr) => {
            let removed = cur.aflags & $mask & !(new.aflags & $mask);
            if !removed.is_empty() {
                if !$has_off {
                    codes.push(SgrParam::Single(0));
                    cur = Attribute::default();
                } else {
                    codes.push(SgrParam::Single($off));
                    cur.aflags.remove($mask);
                }
            }
        };
    }
    group!(
        AttributeFlags::BOLD | AttributeFlags::FAINT,
        cap.bold_faint_off,
        22
    );
    group!(
        AttributeFlags::ITALIC | AttributeFlags::FRAKTUR,
        cap.italic_off,
        23
    );
    group!(
        AttributeFlags::UNDERLINE_SINGLE | AttributeFlags::UNDERLINE_DOUBLE,
        cap.underline_off,
        24
    );
    group!(
        AttributeFlags::BLINK_SLOW | AttributeFlags::BLINK_RAPID,
        cap.blink_off,
        25
    );
    group!(AttributeFlags::INVERSE, cap.inverse_off, 27);
    group!(AttributeFlags::INVISIBLE, cap.invisible_off, 28);
    group!(AttributeFlags::STRIKE, cap.strike_off, 29);

    macro_rules! xgroup {
        ($mask:expr, $has_off:expr, $off:expr) => {
            let removed = cur.xflags & $mask & !(new.xflags & $mask);
            if !removed.is_empty() {
                if !$has_off {
                    codes.push(SgrParam::Single(0));
                    cur = Attribute::default();
                } else {
                    codes.push(SgrParam::Single($off));
                    cur.xflags.remove($mask);
                }
            }
        };
    }
    xgroup!(
        ExtraAttributeFlags::FRAME | ExtraAttributeFlags::CIRCLE,
        cap.frame_circle_off,
        54
    );
    xgroup!(ExtraAttributeFlags::OVERLINE, cap.overline_off, 55);
    xgroup!(ExtraAttributeFlags::PROPORTIONAL, cap.proportional_off, 57);
    xgroup!(ExtraAttributeFlags::IDEOGRAM_MASK, cap.ideogram_off, 69);

    // If a full reset fired above, `cur` is back to the zero attribute,
    // so the additions below cover everything `new` needs from scratch
    // rather than just what survived the removal pass.
    codes.extend(additions(&cur, &new, cap));
    codes
}

fn additions(cur: &Attribute, new: &Attribute, cap: &TermcapSgrType) -> Vec<SgrParam> {
    let mut codes = Vec::new();

    let added = new.aflags & !cur.aflags;
    if added.contains(AttributeFlags::BOLD) {
        codes.push(SgrParam::Single(1));
    }
    if added.contains(AttributeFlags::FAINT) {
        codes.push(SgrParam::Single(2));
    }
    if added.contains(AttributeFlags::ITALIC) {
        codes.push(SgrParam::Single(3));
    }
    if added.contains(AttributeFlags::FRAKTUR) {
        codes.push(SgrParam::Single(20));
    }
    if added.contains(AttributeFlags::UNDERLINE_SINGLE) {
        codes.push(SgrParam::Single(4));
    }
    if added.contains(AttributeFlags::UNDERLINE_DOUBLE) {
        codes.push(SgrParam::Single(21));
    }
    if added.contains(AttributeFlags::BLINK_SLOW) {
        codes.push(SgrParam::Single(5));
    }
    if added.contains(AttributeFlags::BLINK_RAPID) {
        codes.push(SgrParam::Single(6));
    }
    if added.contains(AttributeFlags::INVERSE) {
        codes.push(SgrParam::Single(7));
    }
    if added.contains(AttributeFlags::INVISIBLE) {
        codes.push(SgrParam::Single(8));
    }
    if added.contains(AttributeFlags::STRIKE) {
        codes.push(SgrParam::Single(9));
    }

    let xadded = new.xflags & !cur.xflags;
    if xadded.contains(ExtraAttributeFlags::FRAME) {
        codes.push(SgrParam::Single(51));
    }
    if xadded.contains(ExtraAttributeFlags::CIRCLE) {
        codes.push(SgrParam::Single(52));
    }
    if xadded.contains(ExtraAttributeFlags::OVERLINE) {
        codes.push(SgrParam::Single(53));
    }
    if xadded.contains(ExtraAttributeFlags::PROPORTIONAL) {
        codes.push(SgrParam::Single(56));
    }
    for (bit, code) in [
        (ExtraAttributeFlags::IDEOGRAM_POS_0, 60),
        (ExtraAttributeFlags::IDEOGRAM_POS_1, 61),
        (ExtraAttributeFlags::IDEOGRAM_POS_2, 62),
        (ExtraAttributeFlags::IDEOGRAM_POS_3, 63),
        (ExtraAttributeFlags::IDEOGRAM_POS_4, 64),
        (ExtraAttributeFlags::IDEOGRAM_POS_5, 65),
        (ExtraAttributeFlags::IDEOGRAM_POS_6, 66),
        (ExtraAttributeFlags::IDEOGRAM_POS_7, 67),
        (ExtraAttributeFlags::IDEOGRAM_POS_8, 68),
    ] {
        if xadded.contains(bit) {
            codes.push(SgrParam::Single(code));
        }
    }

    if cur.fg != new.fg {
        codes.extend(color_codes(30, 90, new.fg, cap));
    }
    if cur.bg != new.bg {
        codes.extend(color_codes(40, 100, new.bg, cap));
    }

    codes
}

fn color_codes(base: u16, bright_base: u16, color: ColorSpec, cap: &TermcapSgrType) -> Vec<SgrParam> {
    match color {
        ColorSpec::Default | ColorSpec::Transparent => vec![SgrParam::Single(base + 9)],
        ColorSpec::Indexed(n) if n < 8 => vec![SgrParam::Single(base + u16::from(n))],
        ColorSpec::Indexed(n) if cap.aixterm_bright && (8..16).contains(&n) => {
            vec![SgrParam::Single(bright_base + u16::from(n) - 8)]
        }
        ColorSpec::Indexed(n) => extended(base, SmallVec::from_slice(&[5, u16::from(n)]), cap),
        ColorSpec::Rgb(r, g, b) if cap.rgb => {
            extended(base, SmallVec::from_slice(&[2, u16::from(r), u16::from(g), u16::from(b)]), cap)
        }
        // Without direct RGB support, fall back to the nearest indexed
        // slot; a full color-quantizer is out of scope here.
        ColorSpec::Rgb(..) | ColorSpec::Cmy(..) | ColorSpec::Cmyk(..) => {
            extended(base, SmallVec::from_slice(&[5, 7]), cap)
        }
    }
}

fn extended(base: u16, mut values: SmallVec<[u16; 5]>, cap: &TermcapSgrType) -> Vec<SgrParam> {
    let extended_code = if base == 30 { 38 } else { 48 };
    if cap.colon_subparams {
        values.insert(0, extended_code);
        vec![SgrParam::Group(values)]
    } else {
        let mut out = vec![SgrParam::Single(extended_code)];
        out.extend(values.into_iter().map(SgrParam::Single));
        out
    }
}
