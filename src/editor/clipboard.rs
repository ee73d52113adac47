//! Clipboard sinks for the copy actions.

use std::io::{Write, stdout};

use base64::Engine;

/// Destination for copied text.
pub trait Clipboard {
    /// Place `text` on the clipboard.
    ///
    /// # Errors
    /// Returns an error if the text could not be delivered.
    fn write_text(&mut self, text: &str) -> std::io::Result<()>;
}

/// The system clipboard: `pbcopy` on macOS, OSC 52 on the terminal otherwise.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClipboard;

impl Clipboard for SystemClipboard {
    fn write_text(&mut self, text: &str) -> std::io::Result<()> {
        #[cfg(target_os = "macos")]
        {
            if copy_to_pbcopy(text).is_ok() {
                return Ok(());
            }
        }
        copy_to_clipboard_osc52(text)
    }
}

#[cfg(target_os = "macos")]
fn copy_to_pbcopy(text: &str) -> std::io::Result<()> {
    use std::process::{Command, Stdio};

    let mut child = Command::new("pbcopy").stdin(Stdio::piped()).spawn()?;
    if let Some(mut stdin) = child.stdin.take() {
        stdin.write_all(text.as_bytes())?;
    }
    let status = child.wait()?;
    if status.success() {
        Ok(())
    } else {
        Err(std::io::Error::other("pbcopy failed"))
    }
}

fn copy_to_clipboard_osc52(text: &str) -> std::io::Result<()> {
    let mut out = stdout();
    out.write_all(osc52_sequence(text).as_bytes())?;
    out.flush()
}

fn osc52_sequence(text: &str) -> String {
    let encoded = base64::engine::general_purpose::STANDARD.encode(text.as_bytes());
    format!("\x1b]52;c;{encoded}\x07")
}

#[cfg(test)]
mod tests {
    use super::osc52_sequence;

    #[test]
    fn test_osc52_sequence_encodes_text() {
        assert_eq!(osc52_sequence("hi"), "\x1b]52;c;aGk=\x07");
    }

    #[test]
    fn test_osc52_sequence_encodes_markup() {
        assert_eq!(osc52_sequence("<p>"), "\x1b]52;c;PHA+\x07");
    }
}
