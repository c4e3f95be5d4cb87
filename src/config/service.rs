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
use std::path::{Path, PathBuf};
use std::time::Duration;

use ::config::{Config, File, FileFormat};
use duration_string::DurationString;
use serde::Deserialize;

use super::error::ConfigError;

const DEFAULT_DEVICE: &str = "/dev/gpiochip0";
const DEFAULT_PLAYER: &str = "mpg123";
const DEFAULT_QUIET_FLAG: &str = "-q";
const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(20);
const DEFAULT_CONSUMER_PREFIX: &str = "gpiosound";
const DEFAULT_BINDINGS: &str = "config.cfg";

/// A YAML representation of the service settings. Every field is optional.
#[derive(Deserialize, Clone, Default)]
pub struct Service {
    /// The GPIO character device holding all bound lines.
    device: Option<String>,

    /// The external player command.
    player: Option<String>,

    /// The flag passed to the player ahead of the sound file.
    quiet_flag: Option<String>,

    /// How long to let a line settle after the first edge arrives (default: 20ms).
    debounce: Option<String>,

    /// Prefix of the consumer label requested from the kernel for each line.
    consumer_prefix: Option<String>,

    /// Path of the bindings file.
    bindings: Option<String>,

    /// Optional named pipe that can trigger one line.
    trigger: Option<Trigger>,
}

/// A named pipe accepting `p` (play) and `s` (stop) bytes for one bound pin.
#[derive(Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Trigger {
    path: String,
    pin: u32,
}

impl Trigger {
    #[cfg(test)]
    pub fn new(path: &str, pin: u32) -> Trigger {
        Trigger {
            path: path.to_string(),
            pin,
        }
    }

    pub fn path(&self) -> &Path {
        Path::new(&self.path)
    }

    pub fn pin(&self) -> u32 {
        self.pin
    }
}

impl Service {
    /// Loads the settings from a YAML file.
    pub fn load(path: &Path) -> Result<Service, ConfigError> {
        let service: Service = Config::builder()
            .add_source(File::from(path).format(FileFormat::Yaml))
            .build()?
            .try_deserialize()?;
        service.debounce()?;
        Ok(service)
    }

    /// Returns the GPIO character device (default: /dev/gpiochip0).
    pub fn device(&self) -> &str {
        self.device.as_deref().unwrap_or(DEFAULT_DEVICE)
    }

    /// Returns the player command (default: mpg123).
    pub fn player(&self) -> &str {
        self.player.as_deref().unwrap_or(DEFAULT_PLAYER)
    }

    /// Returns the quiet flag for the player (default: -q).
    pub fn quiet_flag(&self) -> &str {
        self.quiet_flag.as_deref().unwrap_or(DEFAULT_QUIET_FLAG)
    }

    /// Returns the debounce window.
    pub fn debounce(&self) -> Result<Duration, ConfigError> {
        match &self.debounce {
            Some(debounce) => DurationString::from_string(debounce.clone())
                .map(Duration::from)
                .map_err(|e| ConfigError::Duration {
                    value: debounce.clone(),
                    reason: e.to_string(),
                }),
            None => Ok(DEFAULT_DEBOUNCE),
        }
    }

    /// Returns the consumer label for the given pin, e.g. gpiosound-pin17.
    pub fn consumer(&self, pin: u32) -> String {
        format!(
            "{}-pin{}",
            self.consumer_prefix
                .as_deref()
                .unwrap_or(DEFAULT_CONSUMER_PREFIX),
            pin
        )
    }

    /// Returns the path to the bindings file (default: config.cfg).
    pub fn bindings(&self) -> PathBuf {
        PathBuf::from(self.bindings.as_deref().unwrap_or(DEFAULT_BINDINGS))
    }

    pub fn trigger(&self) -> Option<&Trigger> {
        self.trigger.as_ref()
    }

    #[cfg(test)]
    pub fn with_trigger(mut self, trigger: Trigger) -> Service {
        self.trigger = Some(trigger);
        self
    }
}
