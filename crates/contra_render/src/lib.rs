#![warn(clippy::pedantic)]

//! Differential rendering: turn board state into the minimal ANSI byte
//! stream that brings a remote terminal's screen in sync with it.

mod commands;
mod renderer;
mod sgr_diff;
mod termcap;
mod view;

pub use commands::{
    ClearScreen, DeleteChar, DeleteLine, Encode, HideCursor, InsertChar, InsertLine, MoveDown,
    MoveLeft, MoveRight, MoveTo, MoveUp, SetGraphicsRendition, ShowCursor, SgrParam, EraseChars,
};
pub use renderer::DifferentialRenderer;
pub use sgr_diff::{apply_default_attribute, diff_sgr};
pub use termcap::TermcapSgrType;
pub use view::TermView;
