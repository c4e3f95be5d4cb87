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
    collections::HashMap,
    io,
    path::{Path, PathBuf},
    sync::Arc,
};

use parking_lot::Mutex;

use super::PlayerError;

#[derive(Default)]
struct State {
    next_pid: u32,
    fail: bool,
    launched: Vec<PathBuf>,
    terminated: Vec<u32>,
    live: HashMap<u32, PathBuf>,
    max_live: usize,
}

/// A mock launcher. Doesn't start anything, but records what would have happened.
#[derive(Default)]
pub struct Launcher {
    state: Arc<Mutex<State>>,
}

impl Launcher {
    pub fn new() -> Launcher {
        Launcher::default()
    }

    /// Makes subsequent launches fail (or succeed again).
    pub fn fail_launches(&self, fail: bool) {
        self.state.lock().fail = fail;
    }

    /// Simulates every running player finishing on its own.
    pub fn finish_all(&self) {
        self.state.lock().live.clear();
    }

    /// Sound files of every successful launch, in order.
    pub fn launched(&self) -> Vec<PathBuf> {
        self.state.lock().launched.clone()
    }

    /// PIDs of every player that was asked to terminate, in order.
    pub fn terminated(&self) -> Vec<u32> {
        self.state.lock().terminated.clone()
    }

    /// The number of players currently running.
    pub fn live_count(&self) -> usize {
        self.state.lock().live.len()
    }

    /// The most players that were ever running at once.
    pub fn max_live(&self) -> usize {
        self.state.lock().max_live
    }
}

impl super::Launcher for Launcher {
    fn launch(&self, sound_file: &Path) -> Result<Box<dyn super::Playback>, PlayerError> {
        let mut state = self.state.lock();
        if state.fail {
            return Err(PlayerError::Spawn {
                sound_file: sound_file.to_path_buf(),
                source: io::Error::new(io::ErrorKind::NotFound, "mock launch failure"),
            });
        }

        state.next_pid += 1;
        let pid = state.next_pid;
        state.launched.push(sound_file.to_path_buf());
        state.live.insert(pid, sound_file.to_path_buf());
        state.max_live = state.max_live.max(state.live.len());

        Ok(Box::new(Playback {
            pid,
            sound_file: sound_file.to_path_buf(),
            state: self.state.clone(),
        }))
    }
}

struct Playback {
    pid: u32,
    sound_file: PathBuf,
    state: Arc<Mutex<State>>,
}

impl super::Playback for Playback {
    fn pid(&self) -> u32 {
        self.pid
    }

    fn sound_file(&self) -> &Path {
        &self.sound_file
    }

    fn is_alive(&self) -> bool {
        self.state.lock().live.contains_key(&self.pid)
    }

    fn terminate(&self) -> Result<(), PlayerError> {
        let mut state = self.state.lock();
        state.live.remove(&self.pid);
        state.terminated.push(self.pid);
        Ok(())
    }
}
