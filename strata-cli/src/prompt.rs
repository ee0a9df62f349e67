//! Line-based prompts on the terminal.
//!
//! [`LinePrompter`] is generic over its input and output so the prompts can
//! be driven from a buffer in tests; [`stdio`] wires it to the terminal.

use std::io::{self, BufRead, Write};

use strata_migrate::{DecisionChannel, RenamePrompt, normalize_name};

use crate::error::{CliError, CliResult};

/// What to do with a generated migration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Write the migration files.
    Generate,
    /// Write the migration files and apply them to the snapshot.
    Migrate,
    /// Do nothing.
    Cancel,
}

impl Action {
    /// Interpret a response to the action question.
    pub fn from_response(response: &str) -> Option<Self> {
        match response.trim().to_lowercase().as_str() {
            "g" => Some(Self::Generate),
            "m" => Some(Self::Migrate),
            "c" => Some(Self::Cancel),
            _ => None,
        }
    }
}

/// Asks questions on an output and reads answers line by line.
pub struct LinePrompter<R, W> {
    input: R,
    output: W,
}

/// A prompter on stdin/stdout.
pub fn stdio() -> LinePrompter<io::StdinLock<'static>, io::Stdout> {
    LinePrompter::new(io::stdin().lock(), io::stdout())
}

impl<R: BufRead, W: Write> LinePrompter<R, W> {
    /// Create a prompter.
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// Consume the prompter, returning its output.
    pub fn into_output(self) -> W {
        self.output
    }

    fn say(&mut self, line: &str) {
        // A closed stdout surfaces as end of input on the next read.
        let _ = writeln!(self.output, "{line}");
    }

    /// Print `prompt` and read one line. `None` at end of input.
    pub fn read_line(&mut self, prompt: &str) -> Option<String> {
        let _ = write!(self.output, "{prompt} ");
        let _ = self.output.flush();

        let mut line = String::new();
        match self.input.read_line(&mut line) {
            Ok(0) | Err(_) => None,
            Ok(_) => Some(line.trim_end_matches(['\r', '\n']).to_string()),
        }
    }

    /// Ask what to do with the migration until the answer is understood.
    pub fn choose_action(&mut self) -> CliResult<Action> {
        loop {
            let response = self
                .read_line("What now: [g]enerate migration, generate and [m]igrate now or [c]ancel?")
                .ok_or_else(|| CliError::InputClosed("migration action".to_string()))?;
            if let Some(action) = Action::from_response(&response) {
                return Ok(action);
            }
        }
    }

    /// Ask for a migration name until it is acceptable. Empty picks `default`.
    pub fn migration_name(&mut self, default: &str) -> CliResult<String> {
        self.say("Migration filename:");
        self.say("(you can type spaces instead of '_' -- every little helps)");
        loop {
            let response = self
                .read_line(&format!("Filename [{default}]:"))
                .ok_or_else(|| CliError::InputClosed("migration filename".to_string()))?;
            match normalize_name(&response.to_lowercase()) {
                Some(name) if name.is_empty() => return Ok(default.to_string()),
                Some(name) => return Ok(name),
                None => continue,
            }
        }
    }
}

impl<R: BufRead, W: Write> DecisionChannel for LinePrompter<R, W> {
    fn ask(&mut self, prompt: &RenamePrompt) -> Option<String> {
        self.say("");
        self.say(&prompt.heading());
        if let Some(choices) = prompt.choices() {
            self.say(&choices);
        }
        self.read_line(&prompt.question())
    }
}
