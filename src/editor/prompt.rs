//! Blocking text prompts used by link insertion.

use std::collections::VecDeque;
use std::io::{BufRead, Write};

/// Asks the user for a line of text.
///
/// `None` means the prompt was cancelled.
pub trait Prompter {
    fn prompt(&mut self, message: &str, default: Option<&str>) -> Option<String>;
}

/// Answers prompts from a fixed queue. Runs out → cancelled.
#[derive(Debug, Default, Clone)]
pub struct ScriptedPrompter {
    answers: VecDeque<Option<String>>,
    asked: Vec<String>,
}

impl ScriptedPrompter {
    pub fn new<I, S>(answers: I) -> Self
    where
        I: IntoIterator<Item = Option<S>>,
        S: Into<String>,
    {
        Self {
            answers: answers.into_iter().map(|a| a.map(Into::into)).collect(),
            asked: Vec::new(),
        }
    }

    /// Messages shown so far, in order.
    pub fn asked(&self) -> &[String] {
        &self.asked
    }
}

impl Prompter for ScriptedPrompter {
    fn prompt(&mut self, message: &str, _default: Option<&str>) -> Option<String> {
        self.asked.push(message.to_string());
        self.answers.pop_front().flatten()
    }
}

/// Line-based prompt over a reader/writer pair (stdin/stderr in the CLI).
///
/// An empty answer takes the default; end of input cancels.
pub struct LinePrompter<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> LinePrompter<R, W> {
    pub const fn new(input: R, output: W) -> Self {
        Self { input, output }
    }
}

impl<R: BufRead, W: Write> Prompter for LinePrompter<R, W> {
    fn prompt(&mut self, message: &str, default: Option<&str>) -> Option<String> {
        let shown = match default {
            Some(default) => write!(self.output, "{message} [{default}] "),
            None => write!(self.output, "{message} "),
        };
        if let Err(err) = shown.and_then(|()| self.output.flush()) {
            tracing::warn!(%err, "failed to show prompt");
        }

        let mut line = String::new();
        match self.input.read_line(&mut line) {
            Ok(0) => None,
            Ok(_) => {
                let answer = line.trim_end_matches(['\n', '\r']);
                if answer.is_empty() {
                    default.map(ToOwned::to_owned)
                } else {
                    Some(answer.to_string())
                }
            }
            Err(err) => {
                tracing::warn!(%err, "failed to read prompt answer");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_scripted_prompter_pops_answers_in_order() {
        let mut prompter = ScriptedPrompter::new([Some("one"), None]);
        assert_eq!(prompter.prompt("first", None), Some("one".to_string()));
        assert_eq!(prompter.prompt("second", None), None);
        assert_eq!(prompter.prompt("third", None), None);
        assert_eq!(prompter.asked(), ["first", "second", "third"]);
    }

    #[test]
    fn test_line_prompter_reads_answer() {
        let mut out = Vec::new();
        let mut prompter = LinePrompter::new(Cursor::new("https://x.com\n"), &mut out);
        let answer = prompter.prompt("Enter the URL:", Some("https://"));
        assert_eq!(answer.as_deref(), Some("https://x.com"));
        assert_eq!(String::from_utf8(out).unwrap(), "Enter the URL: [https://] ");
    }

    #[test]
    fn test_line_prompter_empty_answer_takes_default() {
        let mut prompter = LinePrompter::new(Cursor::new("\n"), Vec::new());
        assert_eq!(
            prompter.prompt("Enter the URL:", Some("https://")).as_deref(),
            Some("https://")
        );
    }

    #[test]
    fn test_line_prompter_empty_answer_without_default_cancels() {
        let mut prompter = LinePrompter::new(Cursor::new("\r\n"), Vec::new());
        assert_eq!(prompter.prompt("Enter the link text:", None), None);
    }

    #[test]
    fn test_line_prompter_eof_cancels() {
        let mut prompter = LinePrompter::new(Cursor::new(""), Vec::new());
        assert_eq!(prompter.prompt("Enter the URL:", Some("https://")), None);
    }
}
