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
use std::path::PathBuf;

/// Typed error for config load/parse failures so callers can distinguish
/// e.g. file-not-found from syntax errors without string matching.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("unable to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid syntax on line {line} (\"{content}\"): {message}")]
    Syntax {
        line: usize,
        content: String,
        message: String,
    },

    #[error("pin {pin} on line {line} is already bound on line {first_line}")]
    DuplicatePin {
        pin: u32,
        first_line: usize,
        line: usize,
    },

    #[error("trigger pin {0} is not bound to a sound file")]
    UnboundTrigger(u32),

    #[error("invalid duration \"{value}\": {reason}")]
    Duration { value: String, reason: String },

    #[error("Config load/parse error: {0}")]
    Settings(#[from] ::config::ConfigError),
}
