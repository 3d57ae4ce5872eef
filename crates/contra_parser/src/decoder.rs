use contra_encoding::{Utf8Decoder, Utf8Step};

use crate::options::DecoderOptions;
use crate::sequence::{Sequence, SequenceKind};

const ESC: u8 = 0x1B;
const BEL: u8 = 0x07;

/// The callback contract the decoder drives: exactly one event per
/// logically completed unit, with no state carried across calls other
/// than the decoder's own reused [`Sequence`] buffer.
pub trait SequenceHandler {
    /// A graphic character (including zero-width marks; width is a
    /// matter for the board model, not the decoder).
    fn insert_char(&mut self, c: char);
    /// A C0 or C1 control code that does not introduce a sequence.
    fn control_character(&mut self, byte: u8);
    /// A complete two-character (or Fe) escape sequence, `ESC F`.
    fn escape_sequence(&mut self, seq: &Sequence);
    /// A complete CSI control sequence.
    fn control_sequence(&mut self, seq: &Sequence);
    /// A complete DCS/OSC/PM/APC command string.
    fn command_string(&mut self, seq: &Sequence);
    /// A complete SOS or title-definition character string.
    fn character_string(&mut self, seq: &Sequence);
    /// A malformed or truncated sequence; `seq` carries whatever was
    /// accumulated before the decoder gave up.
    fn invalid_sequence(&mut self, seq: &Sequence);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Ground,
    Escape,
    Csi,
    CommandString(SequenceKind),
    CharacterString(SequenceKind),
}

/// The sequence decoder: a byte-level state machine that classifies an
/// incoming byte stream into graphic characters, C0/C1 controls, escape
/// sequences, CSI control sequences, and the three string-bodied
/// sequence classes.
///
/// Carries no allocation across events except the current [`Sequence`]
/// buffer, which is cleared on every dispatch.
pub struct SequenceDecoder {
    state: State,
    options: DecoderOptions,
    utf8: Utf8Decoder,
    seq: Sequence,
    /// Set once an ESC is seen while collecting a command/character
    /// string, to recognize `ESC \` as the string terminator without a
    /// dedicated state (this is the `pending_ESC` flag from the design).
    expecting_st: bool,
    csi_started: bool,
    csi_seen_intermediate: bool,
    csi_current: Option<i32>,
    csi_group: crate::sequence::Param,
}

impl Default for SequenceDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl SequenceDecoder {
    #[must_use]
    pub fn new() -> Self {
        Self::with_options(DecoderOptions::default())
    }

    #[must_use]
    pub fn with_options(options: DecoderOptions) -> Self {
        Self {
            state: State::Ground,
            options,
            utf8: Utf8Decoder::new(),
            seq: Sequence::default(),
            expecting_st: false,
            csi_started: false,
            csi_seen_intermediate: false,
            csi_current: None,
            csi_group: crate::sequence::Param::new(),
        }
    }

    /// Feed one byte of input, driving zero or more callbacks on `h`.
    pub fn process_byte(&mut self, byte: u8, h: &mut impl SequenceHandler) {
        match self.state {
            State::Ground => self.process_ground(byte, h),
            State::Escape => self.process_escape(byte, h),
            State::Csi => self.process_csi(byte, h),
            State::CommandString(kind) => {
                self.process_command_string(kind, byte, h);
            }
            State::CharacterString(kind) => {
                self.process_character_string(kind, byte, h);
            }
        }
    }

    /// Feed a whole buffer. Equivalent (per the chunking-independence
    /// invariant) to calling [`Self::process_byte`] once per byte.
    pub fn process_buffer(&mut self, bytes: &[u8], h: &mut impl SequenceHandler) {
        for &b in bytes {
            self.process_byte(b, h);
        }
    }

    /// Flush any in-progress non-Ground sequence as `invalid_sequence`,
    /// for use at stream EOF.
    pub fn process_end(&mut self, h: &mut impl SequenceHandler) {
        if self.state != State::Ground {
            h.invalid_sequence(&self.seq);
        }
        self.reset_to_ground();
    }

    fn reset_to_ground(&mut self) {
        self.state = State::Ground;
        self.expecting_st = false;
        self.csi_started = false;
        self.csi_seen_intermediate = false;
        self.csi_current = None;
        self.csi_group.clear();
        self.seq.clear();
    }

    // ---- Ground -----------------------------------------------------

    fn process_ground(&mut self, byte: u8, h: &mut impl SequenceHandler) {
        if byte == ESC {
            self.state = State::Escape;
            return;
        }
        if is_c0(byte) {
            h.control_character(byte);
            return;
        }
        if (0x80..=0x9F).contains(&byte)
            && self.options.contains(DecoderOptions::ACCEPT_C1)
            && !self.utf8.is_pending()
        {
            self.dispatch_c1(byte, h);
            return;
        }
        self.feed_utf8(byte, h);
    }

    fn feed_utf8(&mut self, byte: u8, h: &mut impl SequenceHandler) {
        match self.utf8.feed(byte) {
            Utf8Step::Accept(c) => h.insert_char(c),
            Utf8Step::Pending | Utf8Step::Invalid => {}
        }
    }

    fn dispatch_c1(&mut self, c1: u8, h: &mut impl SequenceHandler) {
        match c1 {
            0x9B => {
                self.state = State::Csi;
                self.start_csi();
            }
            0x90 => self.enter_command_string(SequenceKind::Dcs),
            0x9D => self.enter_command_string(SequenceKind::Osc),
            0x9E => self.enter_command_string(SequenceKind::Pm),
            0x9F => self.enter_command_string(SequenceKind::Apc),
            0x98 => self.enter_character_string(SequenceKind::Sos),
            _ => h.control_character(c1),
        }
    }

    fn enter_command_string(&mut self, kind: SequenceKind) {
        self.seq.clear();
        self.seq.kind = Some(kind);
        self.expecting_st = false;
        self.state = State::CommandString(kind);
    }

    fn enter_character_string(&mut self, kind: SequenceKind) {
        self.seq.clear();
        self.seq.kind = Some(kind);
        self.expecting_st = false;
        self.state = State::CharacterString(kind);
    }

    fn start_csi(&mut self) {
        self.seq.clear();
        self.seq.kind = Some(SequenceKind::Csi);
        self.csi_started = false;
        self.csi_seen_intermediate = false;
        self.csi_current = None;
        self.csi_group.clear();
    }

    // ---- Escape -------------------------------------------------------

    fn process_escape(&mut self, byte: u8, h: &mut impl SequenceHandler) {
        match byte {
            0x20..=0x2F => {
                self.seq.intermediates.push(byte);
            }
            0x30..=0x7E => {
                if (0x40..=0x5F).contains(&byte) {
                    let c1 = (byte & 0x1F) | 0x80;
                    self.state = State::Ground;
                    self.dispatch_c1(c1, h);
                } else if byte == b'k' && self.options.contains(DecoderOptions::TITLE_STRINGS) {
                    self.enter_character_string(SequenceKind::Title);
                } else {
                    self.seq.kind = Some(SequenceKind::Esc);
                    self.seq.final_byte = byte;
                    h.escape_sequence(&self.seq);
                    self.reset_to_ground();
                }
            }
            _ => {
                h.invalid_sequence(&self.seq);
                self.reset_to_ground();
                self.process_byte(byte, h);
            }
        }
    }

    // ---- CSI ------------------------------------------------------------

    fn process_csi(&mut self, byte: u8, h: &mut impl SequenceHandler) {
        if byte == ESC {
            h.invalid_sequence(&self.seq);
            self.reset_to_ground();
            self.process_byte(byte, h);
            return;
        }
        if is_c0(byte) {
            // vttest-compatible: dispatch immediately, keep collecting.
            h.control_character(byte);
            return;
        }
        match byte {
            0x3C..=0x3F if !self.csi_started && self.seq.intermediates.is_empty() => {
                self.seq.private_marker = Some(byte);
                self.csi_started = true;
            }
            0x30..=0x39 if !self.csi_seen_intermediate => {
                self.csi_started = true;
                let digit = i32::from(byte - b'0');
                self.csi_current = Some(
                    self.csi_current
                        .unwrap_or(0)
                        .saturating_mul(10)
                        .saturating_add(digit),
                );
            }
            0x3A if !self.csi_seen_intermediate => {
                self.csi_started = true;
                self.csi_group.push(self.csi_current.take().unwrap_or(0));
            }
            0x3B if !self.csi_seen_intermediate => {
                self.csi_started = true;
                self.finish_param_group();
            }
            0x20..=0x2F => {
                if !self.csi_seen_intermediate {
                    self.finish_param_group();
                }
                self.csi_seen_intermediate = true;
                self.seq.intermediates.push(byte);
            }
            0x40..=0x7E => {
                self.finish_param_group();
                self.seq.final_byte = byte;
                h.control_sequence(&self.seq);
                self.reset_to_ground();
            }
            _ => {
                h.invalid_sequence(&self.seq);
                self.reset_to_ground();
                self.process_byte(byte, h);
            }
        }
    }

    fn finish_param_group(&mut self) {
        if self.csi_current.is_some() || !self.csi_group.is_empty() {
            self.csi_group.push(self.csi_current.take().unwrap_or(0));
            self.seq.params.push(std::mem::take(&mut self.csi_group));
        }
    }

    // ---- command string (DCS/OSC/PM/APC) -------------------------------

    fn process_command_string(
        &mut self,
        kind: SequenceKind,
        byte: u8,
        h: &mut impl SequenceHandler,
    ) {
        if self.expecting_st {
            if byte == b'\\' {
                h.command_string(&self.seq);
                self.reset_to_ground();
            } else {
                h.invalid_sequence(&self.seq);
                self.reset_to_ground();
                self.process_byte(byte, h);
            }
            return;
        }
        if byte == ESC {
            self.expecting_st = true;
            return;
        }
        if byte == BEL
            && (self.options.contains(DecoderOptions::BEL_TERMINATES_COMMAND_STRING)
                || (kind == SequenceKind::Osc
                    && self.options.contains(DecoderOptions::BEL_TERMINATES_OSC)))
        {
            h.command_string(&self.seq);
            self.reset_to_ground();
            return;
        }
        if byte == 0x9C && self.options.contains(DecoderOptions::ACCEPT_C1) {
            h.command_string(&self.seq);
            self.reset_to_ground();
            return;
        }
        if matches!(byte, 0x08..=0x0D | 0x20..=0x7E) {
            self.seq.payload.push(byte);
            return;
        }
        h.invalid_sequence(&self.seq);
        self.reset_to_ground();
    }

    // ---- character string (SOS/TITLE) ----------------------------------

    fn process_character_string(
        &mut self,
        kind: SequenceKind,
        byte: u8,
        h: &mut impl SequenceHandler,
    ) {
        let _ = kind;
        if self.expecting_st {
            if byte == b'\\' {
                h.character_string(&self.seq);
                self.reset_to_ground();
            } else {
                h.invalid_sequence(&self.seq);
                self.reset_to_ground();
                self.process_byte(byte, h);
            }
            return;
        }
        if byte == ESC {
            self.expecting_st = true;
            return;
        }
        if byte == 0x98 && self.options.contains(DecoderOptions::ACCEPT_C1) {
            h.invalid_sequence(&self.seq);
            self.reset_to_ground();
            return;
        }
        if byte == 0x9C && self.options.contains(DecoderOptions::ACCEPT_C1) {
            h.character_string(&self.seq);
            self.reset_to_ground();
            return;
        }
        if byte == BEL && self.options.contains(DecoderOptions::BEL_TERMINATES_CHARACTER_STRING) {
            h.character_string(&self.seq);
            self.reset_to_ground();
            return;
        }
        self.seq.payload.push(byte);
    }
}

const fn is_c0(byte: u8) -> bool {
    byte <= 0x1F && byte != ESC
}
