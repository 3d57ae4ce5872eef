#![warn(clippy::pedantic)]

//! UTF-8 streaming codec and the `c2w` character-width function.
//!
//! These are consulted as pure functions by the rest of the workspace;
//! neither carries any terminal-specific state.

mod sink;
mod utf8;
mod width;

pub use sink::ByteSink;
pub use utf8::{Utf8Decoder, Utf8Step, encode_utf8_into};
pub use width::c2w;
