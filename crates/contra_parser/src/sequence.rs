use smallvec::SmallVec;

/// The class of a decoded sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequenceKind {
    /// Control Sequence Introducer: `ESC [ P* I* F` or the 8-bit `0x9B`.
    Csi,
    /// A two-character (or C1) escape sequence with no parameter section.
    Esc,
    /// Device Control String.
    Dcs,
    /// Operating System Command.
    Osc,
    /// Start of String.
    Sos,
    /// Privacy Message.
    Pm,
    /// Application Program Command.
    Apc,
    /// GNU Screen title-definition string, `ESC k ... ST`.
    Title,
}

impl SequenceKind {
    /// True for the three "command string" classes (DCS/OSC/PM/APC),
    /// whose payload is restricted to `0x08..=0x0D` and `0x20..=0x7E`.
    #[must_use]
    pub const fn is_command_string(self) -> bool {
        matches!(self, Self::Dcs | Self::Osc | Self::Pm | Self::Apc)
    }

    /// True for the two "character string" classes (SOS, and the
    /// GNU Screen title string), whose payload is unrestricted text.
    #[must_use]
    pub const fn is_character_string(self) -> bool {
        matches!(self, Self::Sos | Self::Title)
    }
}

/// A single CSI parameter, with any `:`-separated sub-parameters.
pub type Param = SmallVec<[i32; 2]>;

/// A fully decoded sequence: immutable, owned by the decoder's single
/// reusable buffer, and cleared on every dispatch. Callbacks borrow it
/// for the duration of one call only — there is no aliasing across
/// events.
#[derive(Debug, Clone, Default)]
pub struct Sequence {
    pub kind: Option<SequenceKind>,
    /// The private marker byte for CSI (one of `< = > ?`), if any.
    pub private_marker: Option<u8>,
    /// Numeric parameters, each with its `:`-joined sub-parameters.
    /// Populated for CSI; empty for the other kinds.
    pub params: SmallVec<[Param; 8]>,
    /// Intermediate bytes (`0x20..=0x2F`), in order.
    pub intermediates: SmallVec<[u8; 4]>,
    /// The final byte, for CSI and ESC sequences.
    pub final_byte: u8,
    /// Raw payload bytes, for DCS/OSC/SOS/PM/APC/TITLE.
    pub payload: Vec<u8>,
}

impl Sequence {
    pub(crate) fn clear(&mut self) {
        self.kind = None;
        self.private_marker = None;
        self.params.clear();
        self.intermediates.clear();
        self.final_byte = 0;
        self.payload.clear();
    }

    /// Get parameter `idx`, defaulting to `default` if absent or zero
    /// (per ECMA-48: a missing or explicit-zero numeric parameter to a
    /// movement/count function defaults to 1, but callers choose the
    /// default per operation so this just returns the raw stored value).
    #[must_use]
    pub fn param(&self, idx: usize) -> Option<i32> {
        self.params.get(idx).and_then(|p| p.first()).copied()
    }

    /// Get parameter `idx`, or `default` if absent.
    #[must_use]
    pub fn param_or(&self, idx: usize, default: i32) -> i32 {
        self.param(idx).unwrap_or(default)
    }

    /// Get parameter `idx` treating a missing value *or* an explicit
    /// zero as `default` — the common "`Pn=0` means 1" rule for cursor
    /// movement counts.
    #[must_use]
    pub fn param_nonzero_or(&self, idx: usize, default: i32) -> i32 {
        match self.param(idx) {
            Some(0) | None => default,
            Some(v) => v,
        }
    }

    /// Sub-parameters of parameter `idx` (e.g. the `5` and `196` in
    /// `38:5:196`), skipping the parameter's own leading value.
    #[must_use]
    pub fn subparams(&self, idx: usize) -> &[i32] {
        self.params.get(idx).map_or(&[], |p| &p[1..])
    }
}
