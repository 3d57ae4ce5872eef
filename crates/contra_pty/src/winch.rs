//! `SIGWINCH` handling.
//!
//! The signal handler itself only sets a flag — the one thing that's
//! async-signal-safe to do from a handler — and the event loop polls it
//! between reads and forwards the new size via
//! [`crate::PtySession::set_winsize`].

use std::sync::atomic::{AtomicBool, Ordering};

use nix::sys::signal::{SaFlags, SigAction, SigHandler, SigSet, Signal, sigaction};

static WINCH_PENDING: AtomicBool = AtomicBool::new(false);

extern "C" fn on_winch(_: i32) {
    WINCH_PENDING.store(true, Ordering::Relaxed);
}

/// Install the `SIGWINCH` handler for the current process.
///
/// # Errors
///
/// Returns an error if `sigaction` fails.
pub fn install() -> nix::Result<()> {
    let action = SigAction::new(SigHandler::Handler(on_winch), SaFlags::SA_RESTART, SigSet::empty());
    unsafe { sigaction(Signal::SIGWINCH, &action) }?;
    Ok(())
}

/// Consume the pending-resize flag, if one was set since the last call.
pub fn take_pending() -> bool {
    WINCH_PENDING.swap(false, Ordering::Relaxed)
}
