use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use clap::ValueEnum;
use serde::Deserialize;

use crate::interpreter::{InputSource, PLACEHOLDER_INPUT, Placeholder, StdinInput};

/// Behaviour of the `input` construct.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum InputMode {
    /// Every read yields the configured placeholder text.
    #[default]
    Placeholder,
    /// Show the prompt and read a line from standard input.
    Stdin,
}

/// Run settings, usually loaded from a YAML file.
///
/// ```yaml
/// input: stdin
/// placeholder: user_input
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub input: InputMode,
    pub placeholder: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            input: InputMode::default(),
            placeholder: PLACEHOLDER_INPUT.to_string(),
        }
    }
}

impl Config {
    pub fn from_yaml_str(raw: &str) -> Result<Self> {
        serde_yaml::from_str(raw).context("Parsing configuration")
    }

    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("Reading config {}", path.display()))?;
        Self::from_yaml_str(&raw).with_context(|| format!("Loading config {}", path.display()))
    }

    pub fn input_source(&self) -> Box<dyn InputSource> {
        match self.input {
            InputMode::Placeholder => Box::new(Placeholder::new(self.placeholder.clone())),
            InputMode::Stdin => Box::new(StdinInput),
        }
    }
}
