use std::collections::VecDeque;
use std::io::{self, BufRead, Write};

/// Text returned by `input` when no real read is configured.
pub const PLACEHOLDER_INPUT: &str = "user_input";

/// Where the `input` construct gets its text from.
pub trait InputSource {
    fn read_line(&mut self, prompt: Option<&str>) -> io::Result<String>;
}

/// Ignores the prompt and always answers with the same text.
#[derive(Debug, Clone)]
pub struct Placeholder {
    text: String,
}

impl Placeholder {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

impl Default for Placeholder {
    fn default() -> Self {
        Self::new(PLACEHOLDER_INPUT)
    }
}

impl InputSource for Placeholder {
    fn read_line(&mut self, _prompt: Option<&str>) -> io::Result<String> {
        Ok(self.text.clone())
    }
}

/// Shows the prompt on stdout and reads one line from stdin. End of input
/// reads as an empty string.
#[derive(Debug, Default)]
pub struct StdinInput;

impl InputSource for StdinInput {
    fn read_line(&mut self, prompt: Option<&str>) -> io::Result<String> {
        if let Some(prompt) = prompt {
            let mut stdout = io::stdout();
            write!(stdout, "{prompt}")?;
            stdout.flush()?;
        }
        let mut line = String::new();
        io::stdin().lock().read_line(&mut line)?;
        Ok(line.trim_end_matches(['\n', '\r']).to_string())
    }
}

/// Replays a fixed list of lines, then empty strings.
#[derive(Debug, Default, Clone)]
pub struct ScriptedInput {
    lines: VecDeque<String>,
}

impl ScriptedInput {
    pub fn new<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            lines: lines.into_iter().map(Into::into).collect(),
        }
    }
}

impl InputSource for ScriptedInput {
    fn read_line(&mut self, _prompt: Option<&str>) -> io::Result<String> {
        Ok(self.lines.pop_front().unwrap_or_default())
    }
}
