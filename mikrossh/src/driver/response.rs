//! Response type for command execution results.

use std::time::Duration;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::channel::PromptMatcher;
use crate::error::{DriverError, Result};

/// Whole-line shapes of the errors RouterOS prints instead of output.
///
/// Parser errors always carry their `(line N column M)` position.
static ERROR_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(concat!(
        r"^(?:",
        r"(?:syntax error|bad command name \S+|expected end of command|expected command name)\b.*\(line \d+ column \d+\)",
        r"|no such item(?: \(\d+\))?",
        r"|input does not match any value of [\w-]+",
        r"|invalid value (?:for argument|of) [\w-]+.*",
        r"|ambiguous value of [\w-]+.*",
        r"|value of [\w-]+ out of range.*",
        r")$"
    ))
    .expect("error line pattern is valid")
});

/// Prefix of errors raised while applying `set`, `add` and friends.
const ACTION_FAILURE: &str = "failure: ";

/// Response from a command execution.
#[derive(Debug, Clone)]
pub struct Response {
    /// The command that was executed.
    pub command: String,

    /// The command output (normalized - command echo and trailing prompt removed).
    pub result: String,

    /// The raw output before normalization.
    pub raw_result: String,

    /// The prompt that was matched at the end.
    pub prompt: String,

    /// Time taken to execute the command.
    pub elapsed: Duration,

    /// Error line the router printed instead of output, if any.
    pub failure_message: Option<String>,
}

impl Response {
    /// Build a response from the raw console transcript of one command.
    pub fn from_raw(
        command: impl Into<String>,
        raw_result: impl Into<String>,
        prompt: &dyn PromptMatcher,
        elapsed: Duration,
    ) -> Self {
        let command = command.into();
        let raw_result = raw_result.into();
        let (result, prompt) = normalize_output(&raw_result, &command, prompt);
        let failure_message = detect_failure(&command, &result);

        Self {
            command,
            result,
            raw_result,
            prompt,
            elapsed,
            failure_message,
        }
    }

    /// Check if the response indicates success.
    pub fn is_success(&self) -> bool {
        self.failure_message.is_none()
    }

    /// Turn a flagged response into [`DriverError::CommandFailed`].
    pub fn into_result(self) -> Result<Self> {
        match self.failure_message {
            Some(message) => Err(DriverError::CommandFailed {
                command: self.command,
                message,
            }
            .into()),
            None => Ok(self),
        }
    }

    /// Get the result lines as an iterator.
    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.result.lines()
    }

    /// Check if the result contains a substring.
    pub fn contains(&self, pattern: &str) -> bool {
        self.result.contains(pattern)
    }
}

impl std::fmt::Display for Response {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.result)
    }
}

/// Strip the command echo and the trailing prompt.
///
/// Returns the cleaned output and the prompt line.
fn normalize_output(raw: &str, command: &str, prompt: &dyn PromptMatcher) -> (String, String) {
    let text = raw.replace('\r', "");
    let mut lines: Vec<&str> = text.lines().collect();

    let prompt_line = if lines.last().is_some_and(|l| prompt.is_match(l.as_bytes())) {
        lines.pop().map(|l| l.trim().to_string()).unwrap_or_default()
    } else {
        String::new()
    };

    // The echo may come back behind a redrawn prompt
    if lines
        .first()
        .is_some_and(|first| first.trim_end().ends_with(command.trim()))
    {
        lines.remove(0);
    }

    (lines.join("\n").trim().to_string(), prompt_line)
}

/// Only the first line of output can be an error. Values read back with
/// `return [...]` are data, so a `failure: ` prefix there is not one.
fn detect_failure(command: &str, output: &str) -> Option<String> {
    let first = output.lines().map(str::trim).find(|line| !line.is_empty())?;
    let is_query = command.trim_start().starts_with("return ");

    let refused = ERROR_LINE.is_match(first) || (!is_query && first.starts_with(ACTION_FAILURE));
    refused.then(|| first.to_string())
}

#[cfg(test)]
mod tests {
    use regex::bytes::Regex;

    use super::*;

    fn prompt() -> Regex {
        Regex::new(r"\[admin@[^\]]+\][^\r\n\]]*>\s*$").unwrap()
    }

    #[test]
    fn test_strips_echo_and_prompt() {
        let raw = "/system identity print\r\n  name: MikroTik\r\n[admin@MikroTik] > ";
        let response =
            Response::from_raw("/system identity print", raw, &prompt(), Duration::ZERO);

        assert_eq!(response.result, "name: MikroTik");
        assert_eq!(response.prompt, "[admin@MikroTik] >");
        assert_eq!(response.raw_result, raw);
        assert!(response.is_success());
    }

    #[test]
    fn test_echo_behind_redrawn_prompt() {
        let raw = "[admin@MikroTik] > return [/system note get note]\r\nhello\r\n[admin@MikroTik] > ";
        let response =
            Response::from_raw("return [/system note get note]", raw, &prompt(), Duration::ZERO);
        assert_eq!(response.result, "hello");
    }

    #[test]
    fn test_empty_output() {
        let raw = "return [/ip service get api address]\r\n[admin@MikroTik] > ";
        let response = Response::from_raw(
            "return [/ip service get api address]",
            raw,
            &prompt(),
            Duration::ZERO,
        );
        assert_eq!(response.result, "");
    }

    #[test]
    fn test_multiline_output_kept() {
        let raw = "/system history print\r\nFlags: U - UNDOABLE\r\nColumns: ACTION, BY, POLICY\r\n  ACTION  BY  POLICY\r\n[admin@MikroTik] > ";
        let response = Response::from_raw("/system history print", raw, &prompt(), Duration::ZERO);
        assert_eq!(response.lines().count(), 3);
        assert!(response.contains("Columns: ACTION, BY, POLICY"));
    }

    #[test]
    fn test_failure_detection() {
        let raw = "/ip service set nope port=1\r\ninput does not match any value of name\r\n[admin@MikroTik] > ";
        let response =
            Response::from_raw("/ip service set nope port=1", raw, &prompt(), Duration::ZERO);

        assert!(!response.is_success());
        assert_eq!(
            response.failure_message.as_deref(),
            Some("input does not match any value of name")
        );

        let err = response.into_result().unwrap_err();
        assert!(matches!(
            err,
            crate::Error::Driver(DriverError::CommandFailed { .. })
        ));
    }

    #[test]
    fn test_error_line_shapes() {
        for (command, output) in [
            ("/bogus", "bad command name bogus (line 1 column 2)"),
            ("/ip service set api port=", "syntax error (line 1 column 25)"),
            ("/system identity set name=a b", "expected end of command (line 1 column 30)"),
            ("return [/ip service get gopher port]", "no such item"),
            ("/ip service set api port=x", "invalid value for argument port"),
            ("/ip service set api port=70000", "value of port out of range (0..65535)"),
            ("/system ntp client set mode=x", "input does not match any value of mode"),
            ("/ip service set ssh port=80", "failure: port already in use"),
        ] {
            assert_eq!(
                detect_failure(command, output).as_deref(),
                Some(output),
                "{command}"
            );
        }
    }

    #[test]
    fn test_data_mentioning_errors_is_not_a_failure() {
        for (command, output) in [
            ("return [/system note get note]", "Report any login failure: call NOC"),
            ("return [/system note get note]", "failure: disk 2 replaced"),
            ("return [/system identity get name]", "no such item here"),
            ("return [/system note get note]", "syntax error in line 4 of the runbook"),
            ("/system history print", "U note set  admin  write\nbad command name foo (line 1 column 2)"),
            ("/system note print", "  note: invalid value"),
        ] {
            assert_eq!(detect_failure(command, output), None, "{output}");
        }
    }
}
