//! The remote terminal's SGR capability table.
//!
//! Grounded on `termcap_sgr_type`: per-flag on/off code availability plus
//! color-space support, consulted by [`crate::sgr_diff`] to decide
//! whether a flag can be cleared with its own off code or the renderer
//! has to fall back to `CSI 0 m` and rebuild the attribute from there.
#[derive(Debug, Clone, Copy)]
pub struct TermcapSgrType {
    /// `38:2:r:g:b` / `38:5:n` sub-parameter form (ISO 8613-6) as opposed
    /// to the legacy `38;2;r;g;b` semicolon form.
    pub colon_subparams: bool,
    /// Bright colors available as their own SGR codes (90-97/100-107)
    /// rather than only through indexed 256-color escapes.
    pub aixterm_bright: bool,
    pub max_indexed: u16,
    pub rgb: bool,
    pub bold_faint_off: bool,
    pub italic_off: bool,
    pub underline_off: bool,
    pub blink_off: bool,
    pub inverse_off: bool,
    pub invisible_off: bool,
    pub strike_off: bool,
    pub frame_circle_off: bool,
    pub overline_off: bool,
    pub proportional_off: bool,
    pub ideogram_off: bool,
}

impl Default for TermcapSgrType {
    /// The capability profile of a modern xterm-class terminal: every
    /// flag has its own off code, colons and direct RGB are understood,
    /// and bright foregrounds/backgrounds get their dedicated codes.
    fn default() -> Self {
        Self {
            colon_subparams: true,
            aixterm_bright: true,
            max_indexed: 255,
            rgb: true,
            bold_faint_off: true,
            italic_off: true,
            underline_off: true,
            blink_off: true,
            inverse_off: true,
            invisible_off: true,
            strike_off: true,
            frame_circle_off: true,
            overline_off: true,
            proportional_off: true,
            ideogram_off: true,
        }
    }
}

impl TermcapSgrType {
    /// A conservative ECMA-48 profile without ISO 8613-6 sub-parameters,
    /// aixterm brights, or direct RGB — every flag still has an off code,
    /// since that much is guaranteed by ECMA-48 itself.
    #[must_use]
    pub fn ansi_minimal() -> Self {
        Self {
            colon_subparams: false,
            aixterm_bright: false,
            max_indexed: 7,
            rgb: false,
            ..Self::default()
        }
    }
}
