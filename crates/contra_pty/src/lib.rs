#![warn(clippy::pedantic)]

//! Owns a real pseudoterminal, fans its output out to multiple sinks,
//! and encodes typed key/mouse events back into the wire bytes a real
//! terminal would have sent.

mod error;
pub mod input;
mod multicast;
mod session;
pub mod winch;

pub use error::PtyError;
pub use multicast::Multicast;
pub use session::PtySession;
