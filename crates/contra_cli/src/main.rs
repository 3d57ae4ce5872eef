#![warn(clippy::pedantic)]

//! `contra`: wires a PTY to a `contra_term::Term` to a
//! `contra_render::DifferentialRenderer` and the outer terminal. Backend
//! selection is a hand-rolled subcommand (`tty`, `x11`, `win`) — nothing
//! else in this pack depends on a CLI-parsing crate for a dispatch this
//! shallow.

mod error;
mod tty;

use std::env;

use error::CliError;

const USAGE: &str = "usage: contra [tty|x11|win] [-- COMMAND [ARGS...]]\n\n\
backends:\n  \
  tty   run inside the controlling terminal (default)\n  \
  x11   not built with this backend\n  \
  win   not built with this backend\n";

enum Backend {
    Tty,
    Unsupported(&'static str),
}

fn parse_backend(arg: Option<&str>) -> Result<Backend, CliError> {
    match arg {
        None | Some("tty") => Ok(Backend::Tty),
        Some("x11") => Ok(Backend::Unsupported("x11")),
        Some("win") => Ok(Backend::Unsupported("win")),
        Some("--help" | "-h") => {
            print!("{USAGE}");
            std::process::exit(0);
        }
        Some(other) => Err(CliError::UnknownSubcommand(other.to_string())),
    }
}

fn main() -> anyhow::Result<()> {
    contra_config::init_logging();
    let config = contra_config::Config::load_default();

    let mut args: Vec<String> = env::args().skip(1).collect();

    // A bare `--help`/`-h` before any subcommand.
    if args.first().is_some_and(|a| a == "--help" || a == "-h") {
        print!("{USAGE}");
        return Ok(());
    }

    let backend_arg = args.first().filter(|a| !a.starts_with('-')).cloned();
    let backend = match parse_backend(backend_arg.as_deref()) {
        Ok(b) => b,
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
    };
    if backend_arg.is_some() {
        args.remove(0);
    }

    // Everything after an optional `--` is the command to launch;
    // otherwise fall back to $SHELL / the configured default.
    let (command, command_args): (String, Vec<String>) = if let Some(pos) = args.iter().position(|a| a == "--") {
        let rest = args.split_off(pos + 1);
        (rest.first().cloned().unwrap_or_default(), rest.into_iter().skip(1).collect())
    } else {
        (String::new(), Vec::new())
    };
    let command = if command.is_empty() {
        env::var("SHELL").unwrap_or_else(|_| config.get_str("shell", "/bin/sh").to_string())
    } else {
        command
    };

    match backend {
        Backend::Tty => tty::run(&command, &command_args)?,
        Backend::Unsupported(name) => {
            return Err(CliError::UnsupportedBackend(name).into());
        }
    }

    Ok(())
}
