#![warn(clippy::pedantic)]

//! Config-file grammar and logging setup.
//!
//! Grammar (spec §6): `key = value` per line, `#` starts a comment that
//! runs to end of line, values containing whitespace are single-quoted,
//! and a backslash inside a quoted value escapes the next character.
//! Unknown keys are retained (future-compatible); a malformed line is
//! reported with its line number but never aborts startup — the whole
//! point of per-line recovery is that one bad line in a user's config
//! doesn't keep `contra` from starting at all.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// One `key = value` pair as read from the file, in file order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub key: String,
    pub value: String,
    pub line: usize,
}

/// A recoverable problem found while parsing one line. The line itself
/// is always skipped; nothing here is fatal.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LineWarning {
    #[error("{file}:{line}: unterminated quoted value")]
    UnterminatedQuote { file: String, line: usize },
    #[error("{file}:{line}: missing '=' in assignment")]
    MissingEquals { file: String, line: usize },
    #[error("{file}:{line}: empty key")]
    EmptyKey { file: String, line: usize },
}

/// The parsed config: an ordered list of entries plus whatever
/// per-line warnings were produced along the way. Lookups are linear —
/// config files are small and read once at startup.
#[derive(Debug, Clone, Default)]
pub struct Config {
    entries: Vec<Entry>,
    pub warnings: Vec<LineWarning>,
}

impl Config {
    /// Default path: `$XDG_CONFIG_HOME/contra.conf`, falling back to
    /// `~/.config/contra.conf`.
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        if let Ok(xdg) = env::var("XDG_CONFIG_HOME") {
            if !xdg.is_empty() {
                return Some(Path::new(&xdg).join("contra.conf"));
            }
        }
        let home = env::var("HOME").ok()?;
        Some(Path::new(&home).join(".config").join("contra.conf"))
    }

    /// Load the default config path. A missing file is not an error —
    /// it just means "use built-in defaults" — but an unreadable
    /// existing file (permissions, not-a-file) is reported.
    #[must_use]
    pub fn load_default() -> Self {
        match Self::default_path() {
            Some(path) if path.exists() => match fs::read_to_string(&path) {
                Ok(text) => Self::parse(&text, &path.display().to_string()),
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "failed to read config file");
                    Self::default()
                }
            },
            _ => Self::default(),
        }
    }

    /// Parse `text` (the contents of file `file_label`, used only for
    /// diagnostics) into a [`Config`].
    #[must_use]
    pub fn parse(text: &str, file_label: &str) -> Self {
        let mut entries = Vec::new();
        let mut warnings = Vec::new();
        for (idx, raw_line) in text.lines().enumerate() {
            let line_no = idx + 1;
            let line = strip_comment(raw_line).trim();
            if line.is_empty() {
                continue;
            }
            let Some((key, rest)) = line.split_once('=') else {
                warnings.push(LineWarning::MissingEquals {
                    file: file_label.to_string(),
                    line: line_no,
                });
                continue;
            };
            let key = key.trim();
            if key.is_empty() {
                warnings.push(LineWarning::EmptyKey {
                    file: file_label.to_string(),
                    line: line_no,
                });
                continue;
            }
            match unquote(rest.trim()) {
                Ok(value) => entries.push(Entry {
                    key: key.to_string(),
                    value,
                    line: line_no,
                }),
                Err(()) => warnings.push(LineWarning::UnterminatedQuote {
                    file: file_label.to_string(),
                    line: line_no,
                }),
            }
        }
        Self { entries, warnings }
    }

    #[must_use]
    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    fn find(&self, key: &str) -> Option<&Entry> {
        // Last assignment wins, matching a config file read top to
        // bottom where a later line overrides an earlier one.
        self.entries.iter().rev().find(|e| e.key == key)
    }

    #[must_use]
    pub fn get_str<'a>(&'a self, key: &str, default: &'a str) -> &'a str {
        self.find(key).map_or(default, |e| e.value.as_str())
    }

    #[must_use]
    pub fn get_bool(&self, key: &str, default: bool) -> bool {
        let Some(entry) = self.find(key) else {
            return default;
        };
        match entry.value.as_str() {
            "true" => true,
            "false" => false,
            _ => {
                tracing::warn!(
                    key,
                    value = entry.value.as_str(),
                    line = entry.line,
                    "expected true/false, keeping default"
                );
                default
            }
        }
    }

    #[must_use]
    pub fn get_int(&self, key: &str, default: i64) -> i64 {
        let Some(entry) = self.find(key) else {
            return default;
        };
        entry.value.parse().unwrap_or_else(|_| {
            tracing::warn!(key, value = entry.value.as_str(), line = entry.line, "expected integer, keeping default");
            default
        })
    }

    #[must_use]
    pub fn get_float(&self, key: &str, default: f64) -> f64 {
        let Some(entry) = self.find(key) else {
            return default;
        };
        entry.value.parse().unwrap_or_else(|_| {
            tracing::warn!(key, value = entry.value.as_str(), line = entry.line, "expected float, keeping default");
            default
        })
    }
}

/// Strip a `#` comment that isn't inside a single-quoted value. A
/// `#` appearing after an opening `'` with no closing `'` yet is left
/// alone, since quoted values may legitimately contain `#`.
fn strip_comment(line: &str) -> &str {
    let mut in_quote = false;
    let mut escaped = false;
    for (idx, c) in line.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' if in_quote => escaped = true,
            '\'' => in_quote = !in_quote,
            '#' if !in_quote => return &line[..idx],
            _ => {}
        }
    }
    line
}

/// Unwrap a single-quoted value with backslash escapes, or pass through
/// a bare value unchanged. `Err(())` signals an opening quote with no
/// matching close.
fn unquote(value: &str) -> Result<String, ()> {
    if !value.starts_with('\'') {
        return Ok(value.to_string());
    }
    let mut out = String::new();
    let mut chars = value[1..].chars();
    loop {
        match chars.next() {
            None => return Err(()),
            Some('\'') => return Ok(out),
            Some('\\') => match chars.next() {
                Some(c) => out.push(c),
                None => return Err(()),
            },
            Some(c) => out.push(c),
        }
    }
}

/// Install `tracing-subscriber` with `EnvFilter` reading `RUST_LOG`
/// (`contra=debug` enables the decoder/interpreter diagnostic trace
/// from spec §7). Safe to call more than once per process; a second
/// call is a no-op rather than a panic.
pub fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn parses_simple_assignments() {
        let cfg = Config::parse("shell = /bin/bash\nfont_size = 12\n", "test.conf");
        assert_eq!(cfg.get_str("shell", ""), "/bin/bash");
        assert_eq!(cfg.get_int("font_size", 0), 12);
        assert!(cfg.warnings.is_empty());
    }

    #[test]
    fn comments_and_blank_lines_are_ignored() {
        let cfg = Config::parse("# a comment\n\nkey = value\n", "test.conf");
        assert_eq!(cfg.entries().len(), 1);
    }

    #[test]
    fn single_quoted_values_keep_whitespace() {
        let cfg = Config::parse("title = 'hello world'\n", "test.conf");
        assert_eq!(cfg.get_str("title", ""), "hello world");
    }

    #[test]
    fn backslash_escapes_inside_quotes() {
        let cfg = Config::parse(r"title = 'it\'s here'", "test.conf");
        assert_eq!(cfg.get_str("title", ""), "it's here");
    }

    #[test]
    fn hash_inside_quotes_is_not_a_comment() {
        let cfg = Config::parse("title = 'a # b'\n", "test.conf");
        assert_eq!(cfg.get_str("title", ""), "a # b");
    }

    #[test]
    fn malformed_line_is_reported_and_skipped_not_fatal() {
        let cfg = Config::parse("good = 1\nno_equals_here\nalso_good = 2\n", "test.conf");
        assert_eq!(cfg.get_int("good", 0), 1);
        assert_eq!(cfg.get_int("also_good", 0), 2);
        assert_eq!(cfg.warnings.len(), 1);
        assert!(matches!(cfg.warnings[0], LineWarning::MissingEquals { line: 2, .. }));
    }

    #[test]
    fn unknown_keys_are_retained() {
        let cfg = Config::parse("mystery_key = 1\n", "test.conf");
        assert_eq!(cfg.entries()[0].key, "mystery_key");
    }

    #[test]
    fn bool_parse_falls_back_to_default_on_bad_value() {
        let cfg = Config::parse("flag = maybe\n", "test.conf");
        assert!(!cfg.get_bool("flag", false));
        assert!(cfg.get_bool("flag", true));
    }

    #[test]
    fn later_assignment_overrides_earlier_one() {
        let cfg = Config::parse("x = 1\nx = 2\n", "test.conf");
        assert_eq!(cfg.get_int("x", 0), 2);
    }

    #[test]
    fn unterminated_quote_is_reported() {
        let cfg = Config::parse("title = 'oops\n", "test.conf");
        assert_eq!(cfg.warnings.len(), 1);
        assert!(matches!(cfg.warnings[0], LineWarning::UnterminatedQuote { .. }));
    }
}
