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
use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use tracing::{debug, error, info, span, warn, Level, Span};

use crate::gpio::Edge;

#[cfg(test)]
pub mod mock;
pub mod process;

#[derive(Debug, thiserror::Error)]
pub enum PlayerError {
    #[error("unable to start player for {}: {source}", sound_file.display())]
    Spawn {
        sound_file: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("unable to signal player {pid}: {source}")]
    Signal {
        pid: u32,
        #[source]
        source: nix::Error,
    },

    #[error("no tokio runtime to reap players on: {0}")]
    Runtime(#[from] tokio::runtime::TryCurrentError),
}

/// A running player instance.
pub trait Playback: Send {
    /// The process ID of the player.
    fn pid(&self) -> u32;

    /// The sound file being played.
    fn sound_file(&self) -> &Path;

    /// Checks whether the player is still running without disturbing it.
    fn is_alive(&self) -> bool;

    /// Asks the player to stop. Does not wait for it to exit.
    fn terminate(&self) -> Result<(), PlayerError>;
}

/// Starts players. Finished players are reclaimed by the launcher, never by the caller.
pub trait Launcher: Send + Sync + 'static {
    fn launch(&self, sound_file: &Path) -> Result<Box<dyn Playback>, PlayerError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    Idle,
    Playing,
}

/// Supervises the player of a single line. At most one player is tracked at a time, and
/// every event stops the tracked player before anything new is started.
pub struct Supervisor {
    /// The sound file bound to the line.
    sound_file: PathBuf,
    /// Starts new players.
    launcher: Arc<dyn Launcher>,
    /// The tracked player, if any.
    current: Option<Box<dyn Playback>>,
    /// The logging span.
    span: Span,
}

impl Supervisor {
    pub fn new(pin: u32, sound_file: PathBuf, launcher: Arc<dyn Launcher>) -> Supervisor {
        Supervisor {
            sound_file,
            launcher,
            current: None,
            span: span!(Level::INFO, "supervisor", pin),
        }
    }

    pub fn state(&self) -> State {
        match self.current {
            Some(_) => State::Playing,
            None => State::Idle,
        }
    }

    /// The tracked player, if any.
    #[cfg(test)]
    pub fn current(&self) -> Option<&dyn Playback> {
        self.current.as_deref()
    }

    /// A falling edge replaces the current player with a new one; a rising edge only stops it.
    pub fn on_edge(&mut self, edge: Edge) {
        match edge {
            Edge::Falling => self.play(),
            Edge::Rising => self.stop(),
        }
    }

    /// Stops the current player, if any, and starts a new one for the bound sound file.
    /// A failed start leaves the supervisor idle.
    pub fn play(&mut self) {
        self.stop();

        let _enter = self.span.enter();
        match self.launcher.launch(&self.sound_file) {
            Ok(playback) => {
                info!(
                    pid = playback.pid(),
                    sound_file = %playback.sound_file().display(),
                    "Started player."
                );
                self.current = Some(playback);
            }
            Err(e) => error!(err = %e, "Failed to start player."),
        }
    }

    /// Asks the current player to stop and forgets it without waiting for it to exit.
    pub fn stop(&mut self) {
        let _enter = self.span.enter();
        let Some(playback) = self.current.take() else {
            return;
        };

        if !playback.is_alive() {
            debug!(pid = playback.pid(), "Player already exited.");
            return;
        }

        info!(pid = playback.pid(), "Stopping player.");
        if let Err(e) = playback.terminate() {
            warn!(err = %e, "Failed to stop player.");
        }
    }
}
