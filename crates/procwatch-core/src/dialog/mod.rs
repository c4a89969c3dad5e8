use anyhow::{Context, Result};
use async_trait::async_trait;
use std::io::{BufRead, Write};

#[cfg(target_os = "windows")]
pub mod windows;

/// Answer to the three-way decision prompt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptChoice {
    Yes,
    No,
    Cancel,
}

impl PromptChoice {
    /// Parse a typed answer (`y`, `yes`, `n`, `no`, `c`, `cancel`)
    #[must_use]
    pub fn parse(input: &str) -> Option<Self> {
        match input.trim().to_ascii_lowercase().as_str() {
            "y" | "yes" => Some(Self::Yes),
            "n" | "no" => Some(Self::No),
            "c" | "cancel" => Some(Self::Cancel),
            _ => None,
        }
    }
}

/// Modal Yes/No/Cancel prompt.
///
/// The returned future completes only once the user has answered.
#[async_trait]
pub trait Dialog: Send + Sync {
    async fn show_yes_no_cancel(&self, title: &str, text: &str) -> Result<PromptChoice>;
}

/// Prompt on the controlling terminal
#[derive(Debug, Default)]
pub struct TerminalDialog;

#[async_trait]
impl Dialog for TerminalDialog {
    async fn show_yes_no_cancel(&self, title: &str, text: &str) -> Result<PromptChoice> {
        let (title, text) = (title.to_string(), text.to_string());
        tokio::task::spawn_blocking(move || {
            let stdin = std::io::stdin();
            let stdout = std::io::stdout();
            read_choice(&mut stdin.lock(), &mut stdout.lock(), &title, &text)
        })
        .await
        .context("Terminal prompt task failed")?
    }
}

/// Ask until a valid answer is typed. End of input counts as "Cancel".
///
/// # Errors
///
/// Returns an error if reading or writing fails
pub fn read_choice<R: BufRead, W: Write>(
    reader: &mut R,
    writer: &mut W,
    title: &str,
    text: &str,
) -> Result<PromptChoice> {
    writeln!(writer, "== {title} ==\n{text}")?;
    loop {
        write!(writer, "[y]es / [n]o / [c]ancel: ")?;
        writer.flush()?;

        let mut line = String::new();
        if reader.read_line(&mut line)? == 0 {
            return Ok(PromptChoice::Cancel);
        }
        if let Some(choice) = PromptChoice::parse(&line) {
            return Ok(choice);
        }
        writeln!(writer, "Unrecognised answer: {}", line.trim())?;
    }
}

/// Create platform-specific dialog
#[must_use]
pub fn create_dialog() -> Box<dyn Dialog> {
    #[cfg(target_os = "windows")]
    {
        Box::new(windows::MessageBoxDialog)
    }

    #[cfg(not(target_os = "windows"))]
    {
        Box::new(TerminalDialog)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_parse_choice() {
        assert_eq!(PromptChoice::parse("Y\n"), Some(PromptChoice::Yes));
        assert_eq!(PromptChoice::parse(" no "), Some(PromptChoice::No));
        assert_eq!(PromptChoice::parse("Cancel"), Some(PromptChoice::Cancel));
        assert_eq!(PromptChoice::parse("maybe"), None);
    }

    #[test]
    fn test_read_choice_retries_until_valid() {
        let mut input = Cursor::new("what\n\nn\n");
        let mut output = Vec::new();

        let choice = read_choice(&mut input, &mut output, "Title", "Open it?").unwrap();

        assert_eq!(choice, PromptChoice::No);
        let printed = String::from_utf8(output).unwrap();
        assert!(printed.starts_with("== Title ==\nOpen it?\n"));
        assert!(printed.contains("Unrecognised answer: what"));
    }

    #[test]
    fn test_read_choice_end_of_input_cancels() {
        let mut input = Cursor::new("");
        let mut output = Vec::new();

        let choice = read_choice(&mut input, &mut output, "Title", "Open it?").unwrap();

        assert_eq!(choice, PromptChoice::Cancel);
    }
}
