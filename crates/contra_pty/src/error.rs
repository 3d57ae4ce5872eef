#[derive(Debug, thiserror::Error)]
pub enum PtyError {
    #[error("pty i/o error: {0}")]
    Io(#[source] nix::Error),
    #[error("command name contains an embedded NUL byte")]
    InvalidArgument,
    #[error("session has not been started")]
    NotStarted,
    #[error("child process has already exited")]
    ChildExited,
}
