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
use std::fs;
use std::path::Path;

use tracing::info;

mod bindings;
mod error;
mod service;

pub use self::bindings::{parse_bindings, LineBinding};
pub use self::error::ConfigError;
pub use self::service::Service;
#[cfg(test)]
pub use self::service::Trigger;

/// Reads and parses a bindings file. Any malformed line fails the whole file, so a
/// partially valid configuration never starts a worker.
pub fn load_bindings(path: &Path) -> Result<Vec<LineBinding>, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let bindings = parse_bindings(&content)?;
    info!(
        path = %path.display(),
        count = bindings.len(),
        "Loaded line bindings."
    );
    Ok(bindings)
}
