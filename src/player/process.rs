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
    process::Stdio,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
};

use nix::sys::signal::{self, Signal};
use nix::unistd::Pid;
use tokio::{process::Command, runtime::Handle};
use tracing::debug;

use super::PlayerError;

/// Starts an external player process as `<command> <quiet flag> <sound file>`.
pub struct Launcher {
    command: String,
    quiet_flag: String,
    /// The runtime the reaper tasks run on.
    runtime: Handle,
}

impl Launcher {
    /// Creates a launcher bound to the current tokio runtime. Fails when called outside one.
    pub fn new(command: &str, quiet_flag: &str) -> Result<Launcher, PlayerError> {
        Ok(Launcher {
            command: command.to_string(),
            quiet_flag: quiet_flag.to_string(),
            runtime: Handle::try_current()?,
        })
    }
}

impl super::Launcher for Launcher {
    fn launch(&self, sound_file: &Path) -> Result<Box<dyn super::Playback>, PlayerError> {
        let spawn_error = |source| PlayerError::Spawn {
            sound_file: sound_file.to_path_buf(),
            source,
        };

        let _guard = self.runtime.enter();
        let mut child = Command::new(&self.command)
            .arg(&self.quiet_flag)
            .arg(sound_file)
            .stdin(Stdio::null())
            .spawn()
            .map_err(spawn_error)?;
        let pid = child.id().ok_or_else(|| {
            spawn_error(std::io::Error::other("player exited before it was tracked"))
        })?;

        // Nobody else waits on the child, so the reaper owns it until it exits.
        let exited = Arc::new(AtomicBool::new(false));
        let reaped = exited.clone();
        self.runtime.spawn(async move {
            // The PID is free for reuse from the moment wait() reaps it until the store
            // below; a liveness check landing in that gap may signal a stranger. Accepted.
            let status = child.wait().await;
            reaped.store(true, Ordering::SeqCst);
            debug!(pid, status = ?status, "Player exited.");
        });

        Ok(Box::new(Playback {
            pid,
            sound_file: sound_file.to_path_buf(),
            exited,
        }))
    }
}

struct Playback {
    pid: u32,
    sound_file: PathBuf,
    exited: Arc<AtomicBool>,
}

impl Playback {
    fn nix_pid(&self) -> Pid {
        Pid::from_raw(self.pid as i32)
    }
}

impl super::Playback for Playback {
    fn pid(&self) -> u32 {
        self.pid
    }

    fn sound_file(&self) -> &Path {
        &self.sound_file
    }

    fn is_alive(&self) -> bool {
        // Once reaped the PID may belong to someone else, so the flag is checked first.
        !self.exited.load(Ordering::SeqCst) && signal::kill(self.nix_pid(), None).is_ok()
    }

    fn terminate(&self) -> Result<(), PlayerError> {
        signal::kill(self.nix_pid(), Signal::SIGTERM).map_err(|source| PlayerError::Signal {
            pid: self.pid,
            source,
        })
    }
}
