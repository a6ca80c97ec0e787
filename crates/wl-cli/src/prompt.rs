//! Line-based terminal prompts.
//!
//! Questions go to the output writer (stderr for the real terminal) so stdout
//! stays free for command output. End of input answers "no" to confirmations
//! and skips selections.

use std::io::{self, BufRead, Stderr, StdinLock, Write};

use wl_core::{BoxError, Prompter, Selection, TicketChoice};

/// Prompts on a line-oriented reader and writer.
#[derive(Debug)]
pub struct TerminalPrompter<R, W> {
    input: R,
    output: W,
}

impl TerminalPrompter<StdinLock<'static>, Stderr> {
    /// Prompts on the process terminal.
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stderr())
    }
}

impl<R: BufRead, W: Write> TerminalPrompter<R, W> {
    pub const fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// Asks for free text. An empty answer takes `initial`; `None` on end of
    /// input.
    pub fn text(&mut self, message: &str, initial: &str) -> io::Result<Option<String>> {
        let answer = self.ask(&format!("{message} ({initial}): "))?;
        Ok(answer.map(|answer| {
            if answer.is_empty() {
                initial.to_string()
            } else {
                answer
            }
        }))
    }

    fn ask(&mut self, prompt: &str) -> io::Result<Option<String>> {
        write!(self.output, "{prompt}")?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            writeln!(self.output)?;
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }
}

impl<R: BufRead, W: Write> Prompter for TerminalPrompter<R, W> {
    fn confirm(&mut self, message: &str, default: bool) -> Result<bool, BoxError> {
        let hint = if default { "[Y/n]" } else { "[y/N]" };
        loop {
            let Some(answer) = self.ask(&format!("{message} {hint} "))? else {
                return Ok(false);
            };
            match answer.to_lowercase().as_str() {
                "" => return Ok(default),
                "y" | "yes" => return Ok(true),
                "n" | "no" => return Ok(false),
                _ => writeln!(self.output, "Please answer y or n.")?,
            }
        }
    }

    fn select(&mut self, message: &str, choices: &[TicketChoice]) -> Result<Selection, BoxError> {
        loop {
            writeln!(self.output, "{message}")?;
            for (index, choice) in choices.iter().enumerate() {
                writeln!(self.output, "  {}) {}", index + 1, choice.title)?;
            }
            if choices.is_empty() {
                writeln!(self.output, "  (no matching tickets)")?;
            }
            writeln!(
                self.output,
                "Enter a number, other text to search again, or x to skip."
            )?;

            let Some(answer) = self.ask("> ")? else {
                return Ok(Selection::Skip);
            };
            if answer.eq_ignore_ascii_case("x") || answer.eq_ignore_ascii_case("skip") {
                return Ok(Selection::Skip);
            }
            if answer.is_empty() {
                if let Some(first) = choices.first() {
                    return Ok(Selection::Pick(first.key.clone()));
                }
                continue;
            }
            if let Ok(number) = answer.parse::<usize>() {
                match number.checked_sub(1).and_then(|index| choices.get(index)) {
                    Some(choice) => return Ok(Selection::Pick(choice.key.clone())),
                    None => {
                        writeln!(self.output, "No ticket numbered {number}.")?;
                        continue;
                    }
                }
            }
            return Ok(Selection::Search(answer));
        }
    }

    fn notify(&mut self, message: &str) {
        if let Err(err) = writeln!(self.output, "{message}") {
            tracing::debug!(error = %err, "failed to write progress line");
        }
    }
}
