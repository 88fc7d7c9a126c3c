//! Input and output helpers.

use std::fs::{self, File};
use std::io::{self, Read, Write};

use anyhow::Context;
use serde::Serialize;

/// Path standing for stdin or stdout.
pub const STDIO: &str = "-";

/// Report format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// YAML format (default).
    #[default]
    Yaml,
    /// JSON format.
    Json,
}

impl OutputFormat {
    pub fn from_json_flag(json: bool) -> Self {
        if json { Self::Json } else { Self::Yaml }
    }
}

/// Report output configuration.
pub struct Output {
    pub format: OutputFormat,
    pub file: Option<String>,
}

impl Output {
    pub fn new(format: OutputFormat, file: Option<String>) -> Self {
        Self { format, file }
    }

    /// Renders the value in the configured format.
    pub fn render<T: Serialize>(&self, value: &T) -> anyhow::Result<String> {
        Ok(match self.format {
            OutputFormat::Yaml => serde_yaml::to_string(value)?,
            OutputFormat::Json => serde_json::to_string_pretty(value)?,
        })
    }

    /// Writes the value to the file, or stdout when none is set.
    pub fn write<T: Serialize>(&self, value: &T) -> anyhow::Result<()> {
        let output = self.render(value)?;
        match &self.file {
            Some(path) => {
                let mut file = File::create(path).with_context(|| format!("create {}", path))?;
                file.write_all(output.as_bytes())?;
            }
            None => {
                println!("{}", output);
            }
        }
        Ok(())
    }
}

/// Reads a whole file, or stdin for "-".
pub fn read_input(path: &str) -> anyhow::Result<Vec<u8>> {
    if path == STDIO {
        let mut data = Vec::new();
        io::stdin().read_to_end(&mut data).context("read stdin")?;
        return Ok(data);
    }
    fs::read(path).with_context(|| format!("read {}", path))
}

/// Writes binary data to a file, or stdout for "-".
pub fn write_binary(data: &[u8], path: &str) -> anyhow::Result<()> {
    if path == STDIO {
        let mut stdout = io::stdout().lock();
        stdout.write_all(data).context("write stdout")?;
        stdout.flush()?;
        return Ok(());
    }
    fs::write(path, data).with_context(|| format!("write {}", path))
}
