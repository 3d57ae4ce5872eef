use crate::color::ColorSpec;

bitflags::bitflags! {
    /// Primary SGR attribute flags (parameters `1..9`, `21..29`).
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct AttributeFlags: u16 {
        const BOLD              = 1 << 0;
        const FAINT              = 1 << 1;
        const ITALIC              = 1 << 2;
        const FRAKTUR              = 1 << 3;
        const UNDERLINE_SINGLE      = 1 << 4;
        const UNDERLINE_DOUBLE      = 1 << 5;
        const BLINK_SLOW          = 1 << 6;
        const BLINK_RAPID          = 1 << 7;
        const INVERSE              = 1 << 8;
        const INVISIBLE          = 1 << 9;
        const STRIKE              = 1 << 10;
    }
}

bitflags::bitflags! {
    /// Extended SGR attribute flags (parameters `51..55`, `60..69`).
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct ExtraAttributeFlags: u16 {
        const FRAME              = 1 << 0;
        const CIRCLE              = 1 << 1;
        const OVERLINE              = 1 << 2;
        const PROPORTIONAL          = 1 << 3;
        /// Ideogram decoration line position 0 (SGR 60).
        const IDEOGRAM_POS_0      = 1 << 4;
        const IDEOGRAM_POS_1      = 1 << 5;
        const IDEOGRAM_POS_2      = 1 << 6;
        const IDEOGRAM_POS_3      = 1 << 7;
        const IDEOGRAM_POS_4      = 1 << 8;
        const IDEOGRAM_POS_5      = 1 << 9;
        const IDEOGRAM_POS_6      = 1 << 10;
        const IDEOGRAM_POS_7      = 1 << 11;
        /// Ideogram decoration line position 8 (SGR 68), stress marking.
        const IDEOGRAM_POS_8      = 1 << 12;
        const STRESS              = 1 << 13;

        /// All nine ideogram decoration positions, SGR 60..=69 being
        /// mutually exclusive by default (§4.4).
        const IDEOGRAM_MASK = Self::IDEOGRAM_POS_0.bits()
            | Self::IDEOGRAM_POS_1.bits()
            | Self::IDEOGRAM_POS_2.bits()
            | Self::IDEOGRAM_POS_3.bits()
            | Self::IDEOGRAM_POS_4.bits()
            | Self::IDEOGRAM_POS_5.bits()
            | Self::IDEOGRAM_POS_6.bits()
            | Self::IDEOGRAM_POS_7.bits()
            | Self::IDEOGRAM_POS_8.bits();
    }
}

/// A cell's full rendition: attribute flags plus foreground/background
/// color specs. The default attribute has every field zero;
/// [`Attribute::is_default`] must hold iff the attribute equals that
/// zero value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Attribute {
    pub aflags: AttributeFlags,
    pub xflags: ExtraAttributeFlags,
    pub fg: ColorSpec,
    pub bg: ColorSpec,
}

impl Attribute {
    #[must_use]
    pub fn is_default(&self) -> bool {
        *self == Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_attribute_is_default() {
        assert!(Attribute::default().is_default());
    }

    #[test]
    fn non_default_attribute_is_not_default() {
        let mut a = Attribute::default();
        a.aflags |= AttributeFlags::BOLD;
        assert!(!a.is_default());
    }

    #[test]
    fn default_fg_or_bg_alone_keeps_default() {
        let a = Attribute {
            fg: ColorSpec::Default,
            bg: ColorSpec::Default,
            ..Attribute::default()
        };
        assert!(a.is_default());
    }
}
