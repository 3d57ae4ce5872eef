#![warn(clippy::pedantic)]

//! The sequence decoder and its [`Sequence`] value type.

mod decoder;
mod options;
mod sequence;

pub use decoder::{SequenceDecoder, SequenceHandler};
pub use options::DecoderOptions;
pub use sequence::{Param, Sequence, SequenceKind};

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    #[derive(Debug, Clone, PartialEq)]
    enum Event {
        Insert(char),
        Control(u8),
        Esc(u8, Vec<u8>),
        Csi {
            final_byte: u8,
            params: Vec<Vec<i32>>,
            marker: Option<u8>,
            intermediates: Vec<u8>,
        },
        Command(SequenceKind, Vec<u8>),
        Character(SequenceKind, Vec<u8>),
        Invalid,
    }

    #[derive(Default)]
    struct Recorder(RefCell<Vec<Event>>);

    impl SequenceHandler for Recorder {
        fn insert_char(&mut self, c: char) {
            self.0.borrow_mut().push(Event::Insert(c));
        }
        fn control_character(&mut self, byte: u8) {
            self.0.borrow_mut().push(Event::Control(byte));
        }
        fn escape_sequence(&mut self, seq: &Sequence) {
            self.0.borrow_mut().push(Event::Esc(
                seq.final_byte,
                seq.intermediates.to_vec(),
            ));
        }
        fn control_sequence(&mut self, seq: &Sequence) {
            self.0.borrow_mut().push(Event::Csi {
                final_byte: seq.final_byte,
                params: seq.params.iter().map(|p| p.to_vec()).collect(),
                marker: seq.private_marker,
                intermediates: seq.intermediates.to_vec(),
            });
        }
        fn command_string(&mut self, seq: &Sequence) {
            self.0
                .borrow_mut()
                .push(Event::Command(seq.kind.unwrap(), seq.payload.clone()));
        }
        fn character_string(&mut self, seq: &Sequence) {
            self.0
                .borrow_mut()
                .push(Event::Character(seq.kind.unwrap(), seq.payload.clone()));
        }
        fn invalid_sequence(&mut self, _seq: &Sequence) {
            self.0.borrow_mut().push(Event::Invalid);
        }
    }

    fn run(bytes: &[u8]) -> Vec<Event> {
        let mut dec = SequenceDecoder::new();
        let mut h = Recorder::default();
        dec.process_buffer(bytes, &mut h);
        h.0.into_inner()
    }

    fn run_byte_by_byte(bytes: &[u8]) -> Vec<Event> {
        let mut dec = SequenceDecoder::new();
        let mut h = Recorder::default();
        for &b in bytes {
            dec.process_byte(b, &mut h);
        }
        h.0.into_inner()
    }

    #[test]
    fn plain_text() {
        assert_eq!(
            run(b"hi"),
            vec![Event::Insert('h'), Event::Insert('i')]
        );
    }

    #[test]
    fn control_character_is_emitted() {
        assert_eq!(run(b"\x07"), vec![Event::Control(0x07)]);
    }

    #[test]
    fn csi_cursor_position() {
        let events = run(b"\x1b[10;20H");
        assert_eq!(
            events,
            vec![Event::Csi {
                final_byte: b'H',
                params: vec![vec![10], vec![20]],
                marker: None,
                intermediates: vec![],
            }]
        );
    }

    #[test]
    fn csi_missing_params_default_empty() {
        let events = run(b"\x1b[H");
        assert_eq!(
            events,
            vec![Event::Csi {
                final_byte: b'H',
                params: vec![],
                marker: None,
                intermediates: vec![],
            }]
        );
    }

    #[test]
    fn csi_private_marker() {
        let events = run(b"\x1b[?25h");
        assert_eq!(
            events,
            vec![Event::Csi {
                final_byte: b'h',
                params: vec![vec![25]],
                marker: Some(b'?'),
                intermediates: vec![],
            }]
        );
    }

    #[test]
    fn csi_subparameters() {
        let events = run(b"\x1b[38:5:196m");
        assert_eq!(
            events,
            vec![Event::Csi {
                final_byte: b'm',
                params: vec![vec![38, 5, 196]],
                marker: None,
                intermediates: vec![],
            }]
        );
    }

    #[test]
    fn csi_mid_sequence_control_character_passthrough() {
        // vttest sends a control char mid-CSI; it dispatches immediately
        // and the CSI sequence continues collecting afterward.
        let events = run(b"\x1b[1\x0A;2m");
        assert_eq!(
            events,
            vec![
                Event::Control(0x0A),
                Event::Csi {
                    final_byte: b'm',
                    params: vec![vec![1], vec![2]],
                    marker: None,
                    intermediates: vec![],
                },
            ]
        );
    }

    #[test]
    fn esc_mid_csi_aborts_and_reprocesses() {
        let events = run(b"\x1b[1\x1b[2J");
        assert_eq!(
            events,
            vec![
                Event::Invalid,
                Event::Csi {
                    final_byte: b'J',
                    params: vec![vec![2]],
                    marker: None,
                    intermediates: vec![],
                },
            ]
        );
    }

    #[test]
    fn osc_title_bel_terminated() {
        let events = run(b"\x1b]0;My Title\x07");
        assert_eq!(
            events,
            vec![Event::Command(SequenceKind::Osc, b"0;My Title".to_vec())]
        );
    }

    #[test]
    fn osc_title_st_terminated() {
        let events = run(b"\x1b]0;My Title\x1b\\");
        assert_eq!(
            events,
            vec![Event::Command(SequenceKind::Osc, b"0;My Title".to_vec())]
        );
    }

    #[test]
    fn esc_save_cursor() {
        assert_eq!(run(b"\x1b7"), vec![Event::Esc(b'7', vec![])]);
    }

    #[test]
    fn title_definition_string() {
        let events = run(b"\x1bkwindow title\x1b\\");
        assert_eq!(
            events,
            vec![Event::Character(
                SequenceKind::Title,
                b"window title".to_vec()
            )]
        );
    }

    #[test]
    fn process_end_flushes_incomplete_sequence() {
        let mut dec = SequenceDecoder::new();
        let mut h = Recorder::default();
        dec.process_buffer(b"\x1b[1;2", &mut h);
        assert!(h.0.borrow().is_empty());
        dec.process_end(&mut h);
        assert_eq!(h.0.into_inner(), vec![Event::Invalid]);
    }

    #[test]
    fn utf8_multibyte_char() {
        assert_eq!(run("日".as_bytes()), vec![Event::Insert('日')]);
    }

    #[test]
    fn utf8_continuation_byte_in_c1_range_is_not_misread_as_control() {
        // 日 = E6 97 A5; the second byte 0x97 falls in 0x80..=0x9F, the
        // 8-bit C1 range, but it's a UTF-8 continuation byte here, not a
        // C1 introducer.
        assert_eq!(run(b"\xE6\x97\xA5"), vec![Event::Insert('日')]);
    }

    // Invariant 7: chunking independence — feeding byte-by-byte must
    // equal feeding the whole buffer at once.
    #[test]
    fn chunking_independence() {
        let samples: &[&[u8]] = &[
            b"hello\r\x1b[2J\x1b[10;20H",
            b"\x1b]0;title\x07rest",
            b"\x1b[38:5:196mABC",
            b"\x1bkt\x1b\\",
            "日本語mix\x1b[1m".as_bytes(),
        ];
        for sample in samples {
            assert_eq!(run(sample), run_byte_by_byte(sample), "sample: {sample:?}");
        }
    }
}
