//! The `tty` backend: a terminal-in-a-terminal. Puts the controlling
//! terminal into raw mode, starts the child shell on a PTY, and pumps
//! bytes between the two through a [`contra_term::Term`] and a
//! [`contra_render::DifferentialRenderer`].

use std::io::{self, Read, Write};
use std::os::fd::{AsRawFd, BorrowedFd, RawFd};

use nix::poll::{PollFd, PollFlags, poll};
use nix::pty::Winsize;
use nix::sys::termios::{self, SetArg, Termios};

use contra_encoding::ByteSink;
use contra_pty::{PtySession, winch};
use contra_render::DifferentialRenderer;
use contra_term::Term;

use crate::error::CliError;

nix::ioctl_read_bad!(tiocgwinsz, libc::TIOCGWINSZ, Winsize);

fn terminal_size(fd: RawFd) -> (u16, u16) {
    let mut ws = Winsize {
        ws_row: 0,
        ws_col: 0,
        ws_xpixel: 0,
        ws_ypixel: 0,
    };
    if unsafe { tiocgwinsz(fd, &mut ws) }.is_ok() && ws.ws_col > 0 && ws.ws_row > 0 {
        (ws.ws_col, ws.ws_row)
    } else {
        (80, 24)
    }
}

/// Puts stdin into raw mode on construction and restores the saved
/// state when dropped, so a panic or early return still leaves the
/// user's shell usable.
struct RawModeGuard {
    fd: RawFd,
    saved: Termios,
}

impl RawModeGuard {
    fn enable(fd: RawFd) -> Result<Self, CliError> {
        let borrowed = unsafe { BorrowedFd::borrow_raw(fd) };
        let saved = termios::tcgetattr(borrowed)?;
        let mut raw = saved.clone();
        termios::cfmakeraw(&mut raw);
        termios::tcsetattr(borrowed, SetArg::TCSAFLUSH, &raw)?;
        Ok(Self { fd, saved })
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        let borrowed = unsafe { BorrowedFd::borrow_raw(self.fd) };
        let _ = termios::tcsetattr(borrowed, SetArg::TCSAFLUSH, &self.saved);
    }
}

struct TermSink<'a>(&'a mut Term);

impl ByteSink for TermSink<'_> {
    fn write(&mut self, bytes: &[u8]) {
        self.0.write(bytes);
    }
}

struct StdoutSink<'a>(&'a mut dyn Write);

impl ByteSink for StdoutSink<'_> {
    fn write(&mut self, bytes: &[u8]) {
        let _ = self.0.write_all(bytes);
        let _ = self.0.flush();
    }
}

/// Run the `tty` backend: `command` (with `args`) on a PTY sized to the
/// current controlling terminal, rendered differentially back to
/// stdout, until the child exits.
///
/// # Errors
///
/// Returns an error if the controlling terminal can't be put into raw
/// mode, the PTY can't be started, or a subsequent I/O operation fails.
pub fn run(command: &str, args: &[String]) -> Result<(), CliError> {
    let stdin_fd = io::stdin().as_raw_fd();
    let (cols, rows) = terminal_size(stdin_fd);
    let _raw_guard = RawModeGuard::enable(stdin_fd)?;
    winch::install()?;

    let mut pty = PtySession::new();
    pty.start(command, args, cols, rows)?;

    let mut term = Term::new(cols, rows);
    let mut renderer = DifferentialRenderer::default();
    let mut stdout = io::stdout();

    let mut in_buf = [0u8; 4096];
    loop {
        if winch::take_pending() {
            let (cols, rows) = terminal_size(stdin_fd);
            pty.set_winsize(cols, rows)?;
            term.board.resize(cols, rows);
        }

        let master_fd = match pty.master_fd() {
            Some(fd) => fd,
            None => break,
        };
        let stdin_borrowed = unsafe { BorrowedFd::borrow_raw(stdin_fd) };
        let master_borrowed = unsafe { BorrowedFd::borrow_raw(master_fd) };
        let mut fds = [
            PollFd::new(stdin_borrowed, PollFlags::POLLIN),
            PollFd::new(master_borrowed, PollFlags::POLLIN),
        ];

        match poll(&mut fds, 50u16) {
            Ok(_) => {}
            Err(nix::Error::EINTR) => continue,
            Err(e) => return Err(e.into()),
        }

        if fds[0].revents().is_some_and(|r| r.contains(PollFlags::POLLIN)) {
            match io::stdin().read(&mut in_buf) {
                Ok(0) => {}
                Ok(n) => {
                    pty.write(&in_buf[..n])?;
                }
                Err(e) if e.kind() == io::ErrorKind::WouldBlock || e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) => return Err(e.into()),
            }
        }

        if fds[1].revents().is_some_and(|r| r.contains(PollFlags::POLLIN)) {
            let mut sink = TermSink(&mut term);
            pty.read(&mut sink)?;
        }

        if !term.pending_output.is_empty() {
            let reply = std::mem::take(&mut term.pending_output);
            pty.write(&reply)?;
        }

        let mut out_sink = StdoutSink(&mut stdout);
        renderer.update(&term.board, &mut out_sink);

        if !pty.is_alive() {
            term.end_of_stream();
            let mut out_sink = StdoutSink(&mut stdout);
            renderer.update(&term.board, &mut out_sink);
            break;
        }
    }

    Ok(())
}
