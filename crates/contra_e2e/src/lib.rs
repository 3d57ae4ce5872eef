//! No runtime code of its own — see `tests/e2e.rs` for the six spec §8
//! end-to-end scenarios run against the real decoder/board/renderer
//! stack.
