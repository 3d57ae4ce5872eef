/// A color specification for one ground (foreground or background).
///
/// Each SGR semantic parameter is a `color_space × color` pair per
/// ground, per spec §4.4. `Default` and `Transparent` carry no
/// component data; the rest carry the components for their space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColorSpec {
    #[default]
    Default,
    Transparent,
    Indexed(u8),
    Rgb(u8, u8, u8),
    Cmy(u8, u8, u8),
    Cmyk(u8, u8, u8, u8),
}

impl ColorSpec {
    #[must_use]
    pub const fn is_default(self) -> bool {
        matches!(self, Self::Default)
    }
}
