//! Decoder throughput on a few representative byte mixes: plain text,
//! SGR-heavy output, and a chunked OSC title sequence. Mirrors vtio's
//! own `benches/parser.rs`, scaled down to this crate's single decoder.

use std::hint::black_box;

use criterion::{Criterion, criterion_group, criterion_main};

use contra_parser::{Sequence, SequenceDecoder, SequenceHandler};

#[derive(Default)]
struct Discard;

impl SequenceHandler for Discard {
    fn insert_char(&mut self, _c: char) {}
    fn control_character(&mut self, _byte: u8) {}
    fn escape_sequence(&mut self, _seq: &Sequence) {}
    fn control_sequence(&mut self, _seq: &Sequence) {}
    fn command_string(&mut self, _seq: &Sequence) {}
    fn character_string(&mut self, _seq: &Sequence) {}
    fn invalid_sequence(&mut self, _seq: &Sequence) {}
}

fn plain_text(n: usize) -> Vec<u8> {
    "the quick brown fox jumps over the lazy dog\r\n".repeat(n).into_bytes()
}

fn sgr_heavy(n: usize) -> Vec<u8> {
    "\x1b[38:5:196mred\x1b[0m \x1b[1;4mbold-underline\x1b[0m\r\n".repeat(n).into_bytes()
}

fn osc_title(n: usize) -> Vec<u8> {
    "\x1b]0;window title goes here\x07".repeat(n).into_bytes()
}

fn bench_decoder(c: &mut Criterion) {
    let mut group = c.benchmark_group("decoder");
    for (label, data) in [
        ("plain_text", plain_text(200)),
        ("sgr_heavy", sgr_heavy(200)),
        ("osc_title", osc_title(200)),
    ] {
        group.bench_function(label, |b| {
            b.iter(|| {
                let mut decoder = SequenceDecoder::new();
                let mut handler = Discard;
                decoder.process_buffer(black_box(&data), &mut handler);
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_decoder);
criterion_main!(benches);
