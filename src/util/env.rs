//! Terminal detection.

use std::io::IsTerminal;

#[must_use]
pub fn stdout_is_tty() -> bool {
    std::io::stdout().is_terminal()
}

#[must_use]
pub fn stderr_is_tty() -> bool {
    std::io::stderr().is_terminal()
}

/// Whether to color output written to a stream with the given TTY state.
///
/// Off when the flag is set, `NO_COLOR` is present, or `TERM=dumb`.
#[must_use]
pub fn should_use_color(no_color_flag: bool, is_tty: bool) -> bool {
    if no_color_flag || std::env::var_os("NO_COLOR").is_some() {
        return false;
    }
    if std::env::var("TERM").is_ok_and(|t| t == "dumb") {
        return false;
    }
    is_tty
}
