bitflags::bitflags! {
    /// Configuration toggles for [`crate::SequenceDecoder`].
    ///
    /// All four default on, matching a typical xterm-compatible
    /// configuration; a strict-ECMA-48 decoder would clear all of them.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct DecoderOptions: u8 {
        /// Accept 8-bit C1 codes (`0x80..=0x9F`) as control introducers,
        /// in addition to 7-bit `ESC F` sequences.
        const ACCEPT_C1 = 0b0000_0001;
        /// Accept BEL (`0x07`) as a terminator for OSC specifically.
        const BEL_TERMINATES_OSC = 0b0000_0010;
        /// Accept BEL as a terminator for any command string (DCS/OSC/PM/APC).
        const BEL_TERMINATES_COMMAND_STRING = 0b0000_0100;
        /// Accept BEL as a terminator for character strings (SOS/TITLE).
        const BEL_TERMINATES_CHARACTER_STRING = 0b0000_1000;
        /// Recognize `ESC k ... ST` (GNU Screen title-definition string).
        const TITLE_STRINGS = 0b0001_0000;
    }
}

impl Default for DecoderOptions {
    fn default() -> Self {
        Self::all()
    }
}
