#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("unknown subcommand {0:?}, expected one of: tty, x11, win")]
    UnknownSubcommand(String),

    #[error("backend {0:?} is not built into this binary")]
    UnsupportedBackend(&'static str),

    #[error(transparent)]
    Pty(#[from] contra_pty::PtyError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Nix(#[from] nix::Error),
}
