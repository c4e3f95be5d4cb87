// Copyright (C) 2026 Michael Wilson <mike@mdwn.dev>
//
// This program is free software: you can redistribute it and/or modify it under
// the terms of the GNU General Public License as published by the Free Software
// Foundation, version 3.
//
// This program is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
// FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along with
// this program. If not, see <https://www.gnu.org/licenses/>.
//
use std::collections::HashMap;
use std::path::PathBuf;

use pest::Parser;
use pest_derive::Parser;
use tracing::debug;

use super::error::ConfigError;

#[derive(Parser)]
#[grammar_inline = r#"
blank   = _{ " " | "\t" }
pin     = @{ ASCII_DIGIT+ }
path    = @{ (ASCII_ALPHANUMERIC | "_" | "." | "/")+ }
binding = { SOI ~ "pin" ~ pin ~ blank* ~ "=" ~ blank* ~ path ~ (blank | "\r")* ~ EOI }
"#]
struct BindingParser;

/// A GPIO line and the sound file it triggers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineBinding {
    pin: u32,
    sound_file: PathBuf,
}

impl LineBinding {
    #[cfg(test)]
    pub fn new(pin: u32, sound_file: impl Into<PathBuf>) -> LineBinding {
        LineBinding {
            pin,
            sound_file: sound_file.into(),
        }
    }

    /// The line offset on the GPIO chip.
    pub fn pin(&self) -> u32 {
        self.pin
    }

    /// The sound file handed to the player when the line fires.
    pub fn sound_file(&self) -> &PathBuf {
        &self.sound_file
    }
}

/// Parses the contents of a bindings file. Every non-blank line must have the form
/// `pin<number> = <path>`, and each pin may only be bound once.
pub fn parse_bindings(content: &str) -> Result<Vec<LineBinding>, ConfigError> {
    let mut bindings = Vec::new();
    let mut seen: HashMap<u32, usize> = HashMap::new();

    for (index, content) in content.lines().enumerate() {
        let line = index + 1;
        if content.trim().is_empty() {
            continue;
        }

        let binding = parse_line(line, content)?;
        if let Some(first_line) = seen.insert(binding.pin, line) {
            return Err(ConfigError::DuplicatePin {
                pin: binding.pin,
                first_line,
                line,
            });
        }

        debug!(
            line,
            pin = binding.pin,
            sound_file = %binding.sound_file.display(),
            "Parsed line binding."
        );
        bindings.push(binding);
    }

    Ok(bindings)
}

fn parse_line(line: usize, content: &str) -> Result<LineBinding, ConfigError> {
    let syntax = |message: String| ConfigError::Syntax {
        line,
        content: content.to_string(),
        message,
    };

    let pairs = BindingParser::parse(Rule::binding, content).map_err(|e| {
        let col = match e.line_col {
            pest::error::LineColLocation::Pos((_, col)) => col,
            pest::error::LineColLocation::Span((_, col), _) => col,
        };
        syntax(format!("column {}: {}", col, e.variant.message()))
    })?;

    let mut pin = None;
    let mut sound_file = None;
    for pair in pairs.flatten() {
        match pair.as_rule() {
            Rule::pin => {
                pin = Some(pair.as_str().parse::<u32>().map_err(|_| {
                    syntax(format!("pin number {} is out of range", pair.as_str()))
                })?)
            }
            Rule::path => sound_file = Some(PathBuf::from(pair.as_str())),
            _ => {}
        }
    }

    match (pin, sound_file) {
        (Some(pin), Some(sound_file)) => Ok(LineBinding { pin, sound_file }),
        _ => Err(syntax("expected pin<number> = <path>".to_string())),
    }
}
