//! SGR (Select Graphic Rendition) parameter dispatch.
//!
//! Parameters are applied left to right against a running [`Attribute`].
//! `38`/`48` accept both the ISO 8613-6 sub-parameter form
//! (`38:5:196`, all inside one CSI parameter group) and the legacy
//! xterm semicolon-separated form (`38;5;196`, one value per group) —
//! the decoder already tells them apart by how it grouped the digits,
//! so this module just has to walk both shapes uniformly.

use contra_model::{Attribute, AttributeFlags, ColorSpec, ExtraAttributeFlags};
use contra_parser::Param;

/// One SGR numeric token plus whether the decoder started a new
/// parameter group here (semicolon-separated) or continued the
/// previous one (colon sub-parameter).
#[derive(Debug, Clone, Copy)]
struct Token {
    value: i32,
    group_start: bool,
}

fn flatten(params: &[Param]) -> Vec<Token> {
    let mut out = Vec::new();
    for group in params {
        if group.is_empty() {
            out.push(Token {
                value: 0,
                group_start: true,
            });
        } else {
            for (i, &v) in group.iter().enumerate() {
                out.push(Token {
                    value: v,
                    group_start: i == 0,
                });
            }
        }
    }
    if out.is_empty() {
        out.push(Token {
            value: 0,
            group_start: true,
        });
    }
    out
}

/// Apply every SGR parameter in `params`, in order, to `attr`.
pub fn apply_sgr(attr: &mut Attribute, params: &[Param]) {
    let tokens = flatten(params);
    let mut i = 0usize;
    while i < tokens.len() {
        let code = tokens[i].value;
        match code {
            0 => *attr = Attribute::default(),
            1 => attr.aflags |= AttributeFlags::BOLD,
            2 => attr.aflags |= AttributeFlags::FAINT,
            3 => attr.aflags |= AttributeFlags::ITALIC,
            4 => attr.aflags |= AttributeFlags::UNDERLINE_SINGLE,
            5 => attr.aflags |= AttributeFlags::BLINK_SLOW,
            6 => attr.aflags |= AttributeFlags::BLINK_RAPID,
            7 => attr.aflags |= AttributeFlags::INVERSE,
            8 => attr.aflags |= AttributeFlags::INVISIBLE,
            9 => attr.aflags |= AttributeFlags::STRIKE,
            20 => attr.aflags |= AttributeFlags::FRAKTUR,
            21 => {
                attr.aflags.remove(AttributeFlags::BOLD);
                attr.aflags |= AttributeFlags::UNDERLINE_DOUBLE;
            }
            22 => attr.aflags.remove(AttributeFlags::BOLD | AttributeFlags::FAINT),
            23 => attr.aflags.remove(AttributeFlags::ITALIC | AttributeFlags::FRAKTUR),
            24 => attr
                .aflags
                .remove(AttributeFlags::UNDERLINE_SINGLE | AttributeFlags::UNDERLINE_DOUBLE),
            25 => attr.aflags.remove(AttributeFlags::BLINK_SLOW | AttributeFlags::BLINK_RAPID),
            27 => attr.aflags.remove(AttributeFlags::INVERSE),
            28 => attr.aflags.remove(AttributeFlags::INVISIBLE),
            29 => attr.aflags.remove(AttributeFlags::STRIKE),
            30..=37 => attr.fg = ColorSpec::Indexed((code - 30) as u8),
            38 => {
                let (color, consumed) = read_extended_color(&tokens, i);
                if let Some(c) = color {
                    attr.fg = c;
                }
                i += consumed;
                continue;
            }
            39 => attr.fg = ColorSpec::Default,
            40..=47 => attr.bg = ColorSpec::Indexed((code - 40) as u8),
            48 => {
                let (color, consumed) = read_extended_color(&tokens, i);
                if let Some(c) = color {
                    attr.bg = c;
                }
                i += consumed;
                continue;
            }
            49 => attr.bg = ColorSpec::Default,
            51 => attr.xflags |= ExtraAttributeFlags::FRAME,
            52 => attr.xflags |= ExtraAttributeFlags::CIRCLE,
            53 => attr.xflags |= ExtraAttributeFlags::OVERLINE,
            54 => attr.xflags.remove(ExtraAttributeFlags::FRAME | ExtraAttributeFlags::CIRCLE),
            55 => attr.xflags.remove(ExtraAttributeFlags::OVERLINE),
            56 => attr.xflags |= ExtraAttributeFlags::PROPORTIONAL,
            57 => attr.xflags.remove(ExtraAttributeFlags::PROPORTIONAL),
            60..=68 => {
                // Mutually exclusive by default: clear the other eight
                // ideogram bits before setting this one.
                attr.xflags.remove(ExtraAttributeFlags::IDEOGRAM_MASK);
                attr.xflags |= ideogram_bit((code - 60) as u8);
            }
            69 => attr.xflags.remove(ExtraAttributeFlags::IDEOGRAM_MASK),
            90..=97 => attr.fg = ColorSpec::Indexed((code - 90) as u8 + 8),
            100..=107 => attr.bg = ColorSpec::Indexed((code - 100) as u8 + 8),
            _ => {
                tracing::debug!(code, "unrecognized SGR parameter, ignoring");
            }
        }
        i += 1;
    }
}

fn ideogram_bit(pos: u8) -> ExtraAttributeFlags {
    match pos {
        0 => ExtraAttributeFlags::IDEOGRAM_POS_0,
        1 => ExtraAttributeFlags::IDEOGRAM_POS_1,
        2 => ExtraAttributeFlags::IDEOGRAM_POS_2,
        3 => ExtraAttributeFlags::IDEOGRAM_POS_3,
        4 => ExtraAttributeFlags::IDEOGRAM_POS_4,
        5 => ExtraAttributeFlags::IDEOGRAM_POS_5,
        6 => ExtraAttributeFlags::IDEOGRAM_POS_6,
        7 => ExtraAttributeFlags::IDEOGRAM_POS_7,
        _ => ExtraAttributeFlags::IDEOGRAM_POS_8,
    }
}

/// Read the `5;n` (indexed) or `2;r;g;b` (RGB) extended-color argument
/// that follows a `38`/`48` token at `tokens[start]`. Returns the color
/// (`None` if malformed) and the number of tokens consumed, including
/// the leading `38`/`48` itself.
fn read_extended_color(tokens: &[Token], start: usize) -> (Option<ColorSpec>, usize) {
    let colon_form = tokens
        .get(start + 1)
        .is_some_and(|t| !t.group_start);

    let mut i = start + 1;
    let Some(mode_tok) = tokens.get(i) else {
        return (None, i - start);
    };
    let mode = mode_tok.value;
    i += 1;

    // In the colon form all remaining components stay within the same
    // group (group_start == false); in the legacy form each component
    // is its own semicolon-separated group, so we just take its first
    // (and only meaningful) value regardless of group_start.
    let _ = colon_form;

    match mode {
        5 => {
            let Some(n) = tokens.get(i) else {
                return (None, i - start);
            };
            i += 1;
            (Some(ColorSpec::Indexed(n.value.clamp(0, 255) as u8)), i - start)
        }
        2 => {
            let mut comp = [0u8; 3];
            for c in &mut comp {
                let Some(n) = tokens.get(i) else {
                    return (None, i - start);
                };
                *c = n.value.clamp(0, 255) as u8;
                i += 1;
            }
            (Some(ColorSpec::Rgb(comp[0], comp[1], comp[2])), i - start)
        }
        _ => (None, i - start),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use smallvec::smallvec;

    fn params(groups: &[&[i32]]) -> Vec<Param> {
        groups.iter().map(|g| g.iter().copied().collect()).collect()
    }

    #[test]
    fn reset_clears_everything() {
        let mut a = Attribute::default();
        a.aflags |= AttributeFlags::BOLD;
        apply_sgr(&mut a, &params(&[&[0]]));
        assert!(a.is_default());
    }

    #[test]
    fn bold_then_fg_red() {
        let mut a = Attribute::default();
        apply_sgr(&mut a, &params(&[&[1], &[31]]));
        assert!(a.aflags.contains(AttributeFlags::BOLD));
        assert_eq!(a.fg, ColorSpec::Indexed(1));
    }

    #[test]
    fn sgr_22_clears_bold_but_keeps_fg() {
        let mut a = Attribute::default();
        apply_sgr(&mut a, &params(&[&[1], &[31]]));
        apply_sgr(&mut a, &params(&[&[22]]));
        assert!(!a.aflags.contains(AttributeFlags::BOLD));
        assert_eq!(a.fg, ColorSpec::Indexed(1));
    }

    #[test]
    fn colon_subparam_indexed_then_semicolon_underline() {
        // "38:5:196;4" — scenario 2 from the end-to-end test pack.
        let groups: Vec<Param> = vec![smallvec![38, 5, 196], smallvec![4]];
        let mut a = Attribute::default();
        apply_sgr(&mut a, &groups);
        assert_eq!(a.fg, ColorSpec::Indexed(196));
        assert!(a.aflags.contains(AttributeFlags::UNDERLINE_SINGLE));
    }

    #[test]
    fn legacy_semicolon_rgb_form() {
        // "38;2;10;20;30"
        let groups: Vec<Param> = vec![
            smallvec![38],
            smallvec![2],
            smallvec![10],
            smallvec![20],
            smallvec![30],
        ];
        let mut a = Attribute::default();
        apply_sgr(&mut a, &groups);
        assert_eq!(a.fg, ColorSpec::Rgb(10, 20, 30));
    }

    #[test]
    fn ideogram_codes_are_mutually_exclusive() {
        let mut a = Attribute::default();
        apply_sgr(&mut a, &params(&[&[60]]));
        apply_sgr(&mut a, &params(&[&[61]]));
        assert!(a.xflags.contains(ExtraAttributeFlags::IDEOGRAM_POS_1));
        assert!(!a.xflags.contains(ExtraAttributeFlags::IDEOGRAM_POS_0));
    }
}
