//! Owns the pseudoterminal: opens the master/slave pair, forks the child
//! shell onto the slave side in raw mode, and forwards bytes and
//! resizes across the boundary.
//!
//! Grounded on the `posix_openpt`/`grantpt`/`unlockpt`/`ptsname` + manual
//! `fork` pattern (rather than the combined `forkpty` helper) so the
//! slave side's termios can be configured explicitly per the raw-mode
//! contract before the child ever sees it.

use std::ffi::CString;
use std::fs::File;
use std::io::{self, Read, Write};
use std::os::fd::{AsFd, AsRawFd, BorrowedFd, FromRawFd, IntoRawFd, RawFd};
use std::path::Path;

use nix::fcntl::{FcntlArg, OFlag, fcntl, open};
use nix::pty::{Winsize, grantpt, posix_openpt, ptsname, unlockpt};
use nix::sys::signal::{self, Signal};
use nix::sys::stat::Mode;
use nix::sys::termios::{self, ControlFlags, InputFlags, LocalFlags, OutputFlags, SetArg, SpecialCharacterIndices, Termios};
use nix::sys::wait::{WaitPidFlag, WaitStatus, waitpid};
use nix::unistd::{ForkResult, Pid, close, dup2, execvp, fork, setsid};

use contra_encoding::ByteSink;

use crate::error::PtyError;

nix::ioctl_write_ptr_bad!(tiocswinsz, libc::TIOCSWINSZ, Winsize);

impl From<nix::Error> for PtyError {
    fn from(e: nix::Error) -> Self {
        PtyError::Io(e)
    }
}

/// Configure `termios` for the §6 raw-mode contract: no `ECHO`/`ICANON`/
/// `IEXTEN`/`ISIG`, no `BRKINT`/`ICRNL`/`INPCK`/`ISTRIP`/`IXON`, 8-bit
/// `CS8`, no `OPOST`, `VMIN=1`/`VTIME=0`.
fn make_raw(termios: &mut Termios) {
    termios.input_flags.remove(
        InputFlags::BRKINT
            | InputFlags::ICRNL
            | InputFlags::INPCK
            | InputFlags::ISTRIP
            | InputFlags::IXON,
    );
    termios.output_flags.remove(OutputFlags::OPOST);
    termios
        .local_flags
        .remove(LocalFlags::ECHO | LocalFlags::ICANON | LocalFlags::IEXTEN | LocalFlags::ISIG);
    termios.control_flags.remove(ControlFlags::CSIZE | ControlFlags::PARENB);
    termios.control_flags.insert(ControlFlags::CS8);
    termios.control_chars[SpecialCharacterIndices::VMIN as usize] = 1;
    termios.control_chars[SpecialCharacterIndices::VTIME as usize] = 0;
}

fn set_nonblocking(fd: RawFd) -> nix::Result<()> {
    let flags = fcntl(fd, FcntlArg::F_GETFL)?;
    let mut oflags = OFlag::from_bits_truncate(flags);
    oflags.insert(OFlag::O_NONBLOCK);
    fcntl(fd, FcntlArg::F_SETFL(oflags))?;
    Ok(())
}

fn cstring(s: &str) -> Result<CString, PtyError> {
    CString::new(s).map_err(|_| PtyError::InvalidArgument)
}

/// A running (or not-yet-started) PTY session.
pub struct PtySession {
    master: Option<File>,
    child: Option<Pid>,
    alive: bool,
    on_exec_failure: Option<Box<dyn Fn() + Send + Sync>>,
}

impl PtySession {
    #[must_use]
    pub fn new() -> Self {
        Self {
            master: None,
            child: None,
            alive: false,
            on_exec_failure: None,
        }
    }

    /// Install a callback run in the child, just before `_exit(127)`, if
    /// `execvp` fails (the shell binary is missing, say).
    pub fn set_on_exec_failure(&mut self, cb: impl Fn() + Send + Sync + 'static) {
        self.on_exec_failure = Some(Box::new(cb));
    }

    /// Open a PTY, fork, and `execvp` `command` with `args` on the slave
    /// side, sized to `cols`x`rows`.
    ///
    /// # Errors
    ///
    /// Returns an error if opening the PTY, forking, or configuring the
    /// slave's termios fails.
    pub fn start(&mut self, command: &str, args: &[String], cols: u16, rows: u16) -> Result<(), PtyError> {
        let master_fd = posix_openpt(OFlag::O_RDWR | OFlag::O_NOCTTY)?;
        grantpt(&master_fd)?;
        unlockpt(&master_fd)?;
        let slave_name = unsafe { ptsname(&master_fd) }?;

        let winsize = Winsize {
            ws_row: rows,
            ws_col: cols,
            ws_xpixel: 0,
            ws_ypixel: 0,
        };
        unsafe { tiocswinsz(master_fd.as_raw_fd(), &winsize) }?;

        let cmd = cstring(command)?;
        let mut argv = vec![cmd.clone()];
        for a in args {
            argv.push(cstring(a)?);
        }

        match unsafe { fork() }? {
            ForkResult::Child => {
                drop(master_fd);
                let _ = setsid();
                let slave_fd = match open(Path::new(&slave_name), OFlag::O_RDWR, Mode::empty()) {
                    Ok(fd) => fd,
                    Err(_) => std::process::exit(127),
                };

                let borrowed = unsafe { BorrowedFd::borrow_raw(slave_fd) };
                if let Ok(mut term) = termios::tcgetattr(borrowed) {
                    make_raw(&mut term);
                    let _ = termios::tcsetattr(borrowed, SetArg::TCSAFLUSH, &term);
                }

                let _ = dup2(slave_fd, libc::STDIN_FILENO);
                let _ = dup2(slave_fd, libc::STDOUT_FILENO);
                let _ = dup2(slave_fd, libc::STDERR_FILENO);
                if slave_fd > 2 {
                    let _ = close(slave_fd);
                }

                let _ = execvp(&cmd, &argv);
                if let Some(cb) = &self.on_exec_failure {
                    cb();
                }
                std::process::exit(127);
            }
            ForkResult::Parent { child } => {
                set_nonblocking(master_fd.as_raw_fd())?;
                self.master = Some(unsafe { File::from_raw_fd(master_fd.into_raw_fd()) });
                self.child = Some(child);
                self.alive = true;
                Ok(())
            }
        }
    }

    /// Read whatever is currently available from the child and hand it
    /// to `sink`. Returns `Ok(0)` both when there was nothing to read
    /// yet (`EAGAIN`/`EWOULDBLOCK`) and when the child has exited.
    ///
    /// # Errors
    ///
    /// Returns an error for any I/O failure other than "would block".
    pub fn read(&mut self, sink: &mut dyn ByteSink) -> Result<usize, PtyError> {
        let master = self.master.as_mut().ok_or(PtyError::NotStarted)?;
        let mut buf = [0u8; 4096];
        loop {
            match master.read(&mut buf) {
                Ok(0) => {
                    self.reap();
                    return Ok(0);
                }
                Ok(n) => {
                    sink.write(&buf[..n]);
                    return Ok(n);
                }
                Err(e) if e.kind() == io::ErrorKind::WouldBlock => return Ok(0),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(PtyError::Io(nix::Error::from(e.raw_os_error().map_or(nix::Error::EIO, nix::Error::from_i32)))),
            }
        }
    }

    /// Write `bytes` to the child, retrying on `EAGAIN`/`EINTR`.
    ///
    /// # Errors
    ///
    /// Returns an error for any I/O failure other than a transient retry.
    pub fn write(&mut self, bytes: &[u8]) -> Result<usize, PtyError> {
        let master = self.master.as_mut().ok_or(PtyError::NotStarted)?;
        loop {
            match master.write(bytes) {
                Ok(n) => return Ok(n),
                Err(e) if e.kind() == io::ErrorKind::WouldBlock => {
                    std::thread::sleep(std::time::Duration::from_millis(2));
                    continue;
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(PtyError::Io(e.raw_os_error().map_or(nix::Error::EIO, nix::Error::from_i32))),
            }
        }
    }

    /// Forward a window-size change to the slave.
    ///
    /// # Errors
    ///
    /// Returns an error if the `TIOCSWINSZ` ioctl fails.
    pub fn set_winsize(&mut self, cols: u16, rows: u16) -> Result<(), PtyError> {
        let master = self.master.as_ref().ok_or(PtyError::NotStarted)?;
        let winsize = Winsize {
            ws_row: rows,
            ws_col: cols,
            ws_xpixel: 0,
            ws_ypixel: 0,
        };
        unsafe { tiocswinsz(master.as_fd().as_raw_fd(), &winsize) }?;
        Ok(())
    }

    /// Send `SIGTERM` to the child and stop tracking it as alive.
    pub fn terminate(&mut self) {
        if let Some(pid) = self.child {
            let _ = signal::kill(pid, Signal::SIGTERM);
        }
        self.alive = false;
    }

    /// The master fd, for an event loop to `poll`/`select` on alongside
    /// the controlling terminal's own stdin fd.
    #[must_use]
    pub fn master_fd(&self) -> Option<RawFd> {
        self.master.as_ref().map(|f| f.as_raw_fd())
    }

    #[must_use]
    pub fn is_alive(&mut self) -> bool {
        self.reap();
        self.alive
    }

    fn reap(&mut self) {
        let Some(pid) = self.child else {
            return;
        };
        match waitpid(pid, Some(WaitPidFlag::WNOHANG)) {
            Ok(WaitStatus::StillAlive) => {}
            Ok(_) | Err(_) => self.alive = false,
        }
    }
}

impl Default for PtySession {
    fn default() -> Self {
        Self::new()
    }
}
