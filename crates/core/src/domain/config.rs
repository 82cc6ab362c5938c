// Run Configuration (loaded once at start, immutable afterwards)

use super::command::CommandSpec;
use super::error::Result;

/// Whether a reference command is compared against the primary one
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    /// Print every paragraph's output
    Single,
    /// Print only paragraphs where primary and reference outputs differ
    Diff,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunConfig {
    pub primary: CommandSpec,
    pub reference: Option<CommandSpec>,
    /// Suppress the `(input)` echo
    pub output_only: bool,
}

impl RunConfig {
    pub fn new(primary: CommandSpec) -> Self {
        Self {
            primary,
            reference: None,
            output_only: false,
        }
    }

    pub fn with_reference(mut self, reference: CommandSpec) -> Self {
        self.reference = Some(reference);
        self
    }

    pub fn with_output_only(mut self, output_only: bool) -> Self {
        self.output_only = output_only;
        self
    }

    /// Build from raw flag values. A blank diff command counts as absent.
    ///
    /// # Errors
    /// - DomainError::EmptyCommand if the primary command is missing or blank
    pub fn from_flags(
        command: Option<&str>,
        diff: Option<&str>,
        output_only: bool,
    ) -> Result<Self> {
        let mut config = Self::new(CommandSpec::parse(command.unwrap_or_default())?)
            .with_output_only(output_only);

        if let Some(diff) = diff.filter(|d| !d.trim().is_empty()) {
            config = config.with_reference(CommandSpec::parse(diff)?);
        }

        Ok(config)
    }

    pub fn mode(&self) -> RunMode {
        match self.reference {
            Some(_) => RunMode::Diff,
            None => RunMode::Single,
        }
    }
}
