//! Command encoding for the wire format
//!
//! Commands are a verb followed by zero or more arguments, newline
//! terminated. Arguments containing whitespace, quotes, or backslashes are
//! double-quoted with backslash escapes. `split_line` is the inverse
//! tokenization (the server-side view), kept here so the round trip can be
//! verified without a server.

use std::fmt;

use crate::filter::Filter;

/// A single protocol command ready to be encoded onto the wire
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    verb: &'static str,
    args: Vec<String>,
}

impl Command {
    pub fn new(verb: &'static str) -> Self {
        Self {
            verb,
            args: Vec::new(),
        }
    }

    /// Append one argument, formatted via `Display`
    pub fn arg(mut self, arg: impl fmt::Display) -> Self {
        self.args.push(arg.to_string());
        self
    }

    /// Append an argument only when present
    pub fn opt_arg(mut self, arg: Option<impl fmt::Display>) -> Self {
        if let Some(arg) = arg {
            self.args.push(arg.to_string());
        }
        self
    }

    /// Append a tag/value filter as two positional arguments
    pub fn filter(mut self, filter: &Filter) -> Self {
        self.args.push(filter.tag.as_str().to_string());
        self.args.push(filter.value.clone());
        self
    }

    pub fn verb(&self) -> &'static str {
        self.verb
    }

    /// Encode to the newline-terminated wire line
    pub fn encode(&self) -> String {
        let mut line = String::from(self.verb);
        for arg in &self.args {
            line.push(' ');
            if needs_quoting(arg) {
                line.push('"');
                for ch in arg.chars() {
                    if ch == '"' || ch == '\\' {
                        line.push('\\');
                    }
                    line.push(ch);
                }
                line.push('"');
            } else {
                line.push_str(arg);
            }
        }
        line.push('\n');
        line
    }
}

fn needs_quoting(arg: &str) -> bool {
    arg.is_empty() || arg.contains(|c: char| c.is_whitespace() || c == '"' || c == '\\' || c == '\'')
}

/// Tokenize a command line back into verb + arguments
///
/// Unquoted tokens end at whitespace; quoted tokens honor `\"` and `\\`
/// escapes. Used by tests and by tooling that replays command transcripts.
pub fn split_line(line: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut chars = line.trim_end_matches('\n').chars().peekable();

    while let Some(&ch) = chars.peek() {
        if ch.is_whitespace() {
            chars.next();
            continue;
        }
        let mut token = String::new();
        if ch == '"' {
            chars.next();
            while let Some(ch) = chars.next() {
                match ch {
                    '"' => break,
                    '\\' => {
                        if let Some(escaped) = chars.next() {
                            token.push(escaped);
                        }
                    }
                    other => token.push(other),
                }
            }
        } else {
            while let Some(&ch) = chars.peek() {
                if ch.is_whitespace() {
                    break;
                }
                token.push(ch);
                chars.next();
            }
        }
        tokens.push(token);
    }

    tokens
}
