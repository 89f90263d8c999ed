//! User-facing output.
//!
//! Every progress message is tagged with `PUG: ` so it stands out from the
//! external tools' own output, which is relayed on the same terminal.
//! Diagnostics for developers go through `tracing` instead.

use std::fmt::Display;
use std::io::{self, IsTerminal};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Tag printed in front of every line pug says.
pub const PUG_TAG: &str = "PUG: ";

/// Output verbosity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Verbosity {
    /// errors only
    Quiet,
    #[default]
    Normal,
    /// external helper builds are streamed too
    Verbose,
}

impl Verbosity {
    /// Map a numeric level (`--verbosity`) onto a verbosity.
    pub fn from_level(level: u8) -> Self {
        match level {
            0 => Verbosity::Quiet,
            1 => Verbosity::Normal,
            _ => Verbosity::Verbose,
        }
    }
}

/// Color output mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColorChoice {
    /// Detect TTY and use colors if available.
    #[default]
    Auto,
    Always,
    Never,
}

impl std::str::FromStr for ColorChoice {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "auto" => Ok(ColorChoice::Auto),
            "always" => Ok(ColorChoice::Always),
            "never" => Ok(ColorChoice::Never),
            _ => Err(format!(
                "invalid color choice '{}'; expected 'auto', 'always', or 'never'",
                s
            )),
        }
    }
}

/// Status of a message; decides color and whether quiet mode prints it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Info,
    Success,
    Warning,
    Error,
}

impl Status {
    fn color_code(&self) -> &'static str {
        match self {
            Status::Info => "\x1b[1;36m",
            Status::Success => "\x1b[1;32m",
            Status::Warning => "\x1b[1;33m",
            Status::Error => "\x1b[1;31m",
        }
    }
}

/// Central shell for all CLI output.
#[derive(Debug)]
pub struct Shell {
    verbosity: Verbosity,
    use_color: bool,
}

impl Shell {
    pub fn new(verbosity: Verbosity, color: ColorChoice) -> Self {
        let use_color = match color {
            ColorChoice::Auto => io::stderr().is_terminal(),
            ColorChoice::Always => true,
            ColorChoice::Never => false,
        };
        Shell {
            verbosity,
            use_color,
        }
    }

    pub fn is_quiet(&self) -> bool {
        self.verbosity == Verbosity::Quiet
    }

    pub fn is_verbose(&self) -> bool {
        self.verbosity == Verbosity::Verbose
    }

    /// Print an informational message.
    pub fn say(&self, msg: impl Display) {
        self.status(Status::Info, msg);
    }

    pub fn success(&self, msg: impl Display) {
        self.status(Status::Success, msg);
    }

    pub fn warn(&self, msg: impl Display) {
        self.status(Status::Warning, msg);
    }

    pub fn error(&self, msg: impl Display) {
        self.status(Status::Error, msg);
    }

    /// Print a message with the given status.
    ///
    /// In quiet mode only errors are printed.
    pub fn status(&self, status: Status, msg: impl Display) {
        if self.is_quiet() && status != Status::Error {
            return;
        }
        let tag = if self.use_color {
            format!("{}{}\x1b[0m", status.color_code(), PUG_TAG.trim_end())
        } else {
            PUG_TAG.trim_end().to_string()
        };
        eprintln!("{}", tag_lines(&msg.to_string(), &tag));
    }

    /// Create a scoped span timing a pipeline stage.
    pub fn span(self: &Arc<Self>, msg: impl Display) -> Span {
        Span::new(Arc::clone(self), msg.to_string())
    }
}

impl Default for Shell {
    fn default() -> Self {
        Shell::new(Verbosity::Normal, ColorChoice::Auto)
    }
}

/// Prefix every line of `msg` with `tag`.
///
/// A leading newline becomes an untagged blank line, so messages can be
/// visually separated from the preceding output.
pub fn tag_lines(msg: &str, tag: &str) -> String {
    let (lead, body) = match msg.strip_prefix('\n') {
        Some(rest) => ("\n", rest),
        None => ("", msg),
    };
    let tagged = body
        .split('\n')
        .map(|line| format!("{} {}", tag, line))
        .collect::<Vec<_>>()
        .join("\n");
    format!("{}{}", lead, tagged)
}

/// A scoped timing span. Prints the elapsed time when finished in verbose
/// mode.
pub struct Span {
    shell: Arc<Shell>,
    message: String,
    start: Instant,
}

impl Span {
    fn new(shell: Arc<Shell>, message: String) -> Self {
        tracing::debug!("{}", message);
        Span {
            shell,
            message,
            start: Instant::now(),
        }
    }

    pub fn finish(self) {
        if self.shell.is_verbose() {
            self.shell.say(format!(
                "{} finished in {}",
                self.message,
                format_duration(self.start.elapsed())
            ));
        }
    }
}

/// Format a duration in a human-readable way.
pub fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs_f64();
    if secs < 60.0 {
        format!("{:.2}s", secs)
    } else {
        format!("{:.1}m", secs / 60.0)
    }
}

/// Format a run time as `HH:MM:SS`, adding `, N day(s)` beyond a day.
pub fn format_elapsed(duration: Duration) -> String {
    let total = duration.as_secs_f64().round() as u64;
    let days = total / 86_400;
    let rest = total % 86_400;
    let mut out = format!(
        "{:02}:{:02}:{:02}",
        rest / 3600,
        (rest % 3600) / 60,
        rest % 60
    );
    if days > 0 {
        out.push_str(&format!(", {} day(s)", days));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verbosity_levels() {
        assert_eq!(Verbosity::from_level(0), Verbosity::Quiet);
        assert_eq!(Verbosity::from_level(1), Verbosity::Normal);
        assert_eq!(Verbosity::from_level(2), Verbosity::Verbose);
        assert_eq!(Verbosity::from_level(9), Verbosity::Verbose);

        let shell = Shell::new(Verbosity::Quiet, ColorChoice::Never);
        assert!(shell.is_quiet());
        assert!(!shell.is_verbose());
    }

    #[test]
    fn test_color_choice_parse() {
        assert_eq!("auto".parse::<ColorChoice>().unwrap(), ColorChoice::Auto);
        assert_eq!("ALWAYS".parse::<ColorChoice>().unwrap(), ColorChoice::Always);
        assert_eq!("never".parse::<ColorChoice>().unwrap(), ColorChoice::Never);
        assert!("invalid".parse::<ColorChoice>().is_err());
    }

    #[test]
    fn test_tag_lines() {
        assert_eq!(tag_lines("hello", "PUG:"), "PUG: hello");
        assert_eq!(tag_lines("a\nb", "PUG:"), "PUG: a\nPUG: b");
        assert_eq!(tag_lines("\nelapsed", "PUG:"), "\nPUG: elapsed");
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(Duration::from_millis(500)), "0.50s");
        assert_eq!(format_duration(Duration::from_secs(2)), "2.00s");
        assert_eq!(format_duration(Duration::from_secs(90)), "1.5m");
    }

    #[test]
    fn test_format_elapsed() {
        assert_eq!(format_elapsed(Duration::from_secs(0)), "00:00:00");
        assert_eq!(format_elapsed(Duration::from_secs(3_723)), "01:02:03");
        assert_eq!(
            format_elapsed(Duration::from_secs(86_400 + 61)),
            "00:01:01, 1 day(s)"
        );
    }
}
