//! Best-effort Lua syntax checking.
//!
//! Sources are compiled by an embedded Lua parser but never run. Failures
//! only ever produce a warning; compilation of the model goes on.

use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;

static LOCATED_MESSAGE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)^.*?:(\d+):\s*(.*)$").expect("syntax message pattern is valid"));

/// A syntax problem reported for one chunk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxWarning {
    /// Name the chunk was compiled under, usually the file path
    pub chunk: String,
    /// 1-based line of the problem, when the parser reported one
    pub line: Option<usize>,
    pub message: String,
}

impl SyntaxWarning {
    /// Build a warning from a raw parser message of the form
    /// `<chunk>:<line>: <message>`.
    pub fn from_parser_message(chunk: &str, raw: &str) -> Self {
        let raw = raw.trim();
        match LOCATED_MESSAGE.captures(raw) {
            Some(caps) => Self {
                chunk: chunk.to_string(),
                line: caps[1].parse().ok(),
                message: caps[2].trim().to_string(),
            },
            None => Self {
                chunk: chunk.to_string(),
                line: None,
                message: raw.to_string(),
            },
        }
    }
}

impl fmt::Display for SyntaxWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.line {
            Some(line) => write!(f, "{}:{}: {}", self.chunk, line, self.message),
            None => write!(f, "{}: {}", self.chunk, self.message),
        }
    }
}

/// Parses Lua sources without executing them
pub struct SyntaxChecker {
    #[cfg(feature = "syntax-check")]
    lua: mlua::Lua,
}

impl SyntaxChecker {
    pub fn new() -> Self {
        Self {
            #[cfg(feature = "syntax-check")]
            lua: mlua::Lua::new(),
        }
    }

    /// Whether checks actually run in this build
    pub fn is_available() -> bool {
        cfg!(feature = "syntax-check")
    }

    /// Compile `source` as a chunk named `chunk`, returning any syntax problem
    #[cfg(feature = "syntax-check")]
    pub fn check(&self, chunk: &str, source: &str) -> Option<SyntaxWarning> {
        // A leading '=' makes Lua use the name verbatim in messages.
        let result = self
            .lua
            .load(source)
            .set_name(format!("={}", chunk))
            .into_function();

        match result {
            Ok(_) => None,
            Err(mlua::Error::SyntaxError { message, .. }) => {
                Some(SyntaxWarning::from_parser_message(chunk, &message))
            }
            Err(other) => {
                tracing::debug!("syntax check of {} failed to run: {}", chunk, other);
                None
            }
        }
    }

    #[cfg(not(feature = "syntax-check"))]
    pub fn check(&self, _chunk: &str, _source: &str) -> Option<SyntaxWarning> {
        None
    }
}

impl Default for SyntaxChecker {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for SyntaxChecker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SyntaxChecker")
            .field("available", &Self::is_available())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rewrites_located_messages() {
        let warning = SyntaxWarning::from_parser_message(
            "src/Main.lua",
            "src/Main.lua:3: unexpected symbol near 'end'",
        );
        assert_eq!(warning.line, Some(3));
        assert_eq!(warning.message, "unexpected symbol near 'end'");
        assert_eq!(
            warning.to_string(),
            "src/Main.lua:3: unexpected symbol near 'end'"
        );
    }

    #[test]
    fn keeps_unlocated_messages() {
        let warning = SyntaxWarning::from_parser_message("a.lua", "out of memory");
        assert_eq!(warning.line, None);
        assert_eq!(warning.to_string(), "a.lua: out of memory");
    }

    #[cfg(feature = "syntax-check")]
    #[test]
    fn valid_source_passes() {
        let checker = SyntaxChecker::new();
        let source = "local t = {}\nfunction t.f(x) return x * 2 end\nreturn t\n";
        assert_eq!(checker.check("ok.lua", source), None);
    }

    #[cfg(feature = "syntax-check")]
    #[test]
    fn broken_source_reports_line() {
        let checker = SyntaxChecker::new();
        let warning = checker
            .check("broken.lua", "local x = 1\nlocal y = = 2\n")
            .expect("syntax error expected");
        assert_eq!(warning.chunk, "broken.lua");
        assert_eq!(warning.line, Some(2));
        assert!(warning.to_string().starts_with("broken.lua:2: "));
    }

    #[cfg(feature = "syntax-check")]
    #[test]
    fn sources_are_not_executed() {
        let checker = SyntaxChecker::new();
        assert_eq!(checker.check("boom.lua", "error('ran')"), None);
    }
}
