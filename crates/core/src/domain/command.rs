// Command Domain Model

use super::error::{DomainError, Result};
use std::fmt;

/// An external command: executable plus arguments.
///
/// Built from a display string split on whitespace. The display string is
/// kept verbatim because it labels the command's output in the transcript.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    display: String,
    program: String,
    args: Vec<String>,
}

impl CommandSpec {
    /// Parse a command line such as `tr a-z A-Z`
    ///
    /// # Errors
    /// - DomainError::EmptyCommand if the string holds no executable name
    ///
    /// # Example
    /// ```text
    /// let spec = CommandSpec::parse("tr a-z A-Z")?;
    /// assert_eq!(spec.program(), "tr");
    /// assert_eq!(spec.args(), ["a-z", "A-Z"]);
    /// ```
    pub fn parse(display: impl Into<String>) -> Result<Self> {
        let display = display.into();
        let mut parts = display.split_whitespace().map(str::to_string);
        let program = parts.next().ok_or(DomainError::EmptyCommand)?;
        let args = parts.collect();

        Ok(Self {
            display,
            program,
            args,
        })
    }

    /// Build a command from already separated parts
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        let program = program.into();
        let display = std::iter::once(program.as_str())
            .chain(args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ");

        Self {
            display,
            program,
            args,
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }

    pub fn display(&self) -> &str {
        &self.display
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display)
    }
}
