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
    fs::{self, File},
    io::{self, BufReader, Read},
    os::unix::fs::FileTypeExt,
    path::{Path, PathBuf},
};

use nix::{errno::Errno, sys::stat::Mode, unistd};
use tokio::{sync::mpsc::Sender, task::JoinHandle};
use tracing::{debug, error, info, span, warn, Level};

use super::{Event, WorkerError};

const PLAY: u8 = b'p';
const STOP: u8 = b's';

/// A driver that reads single-byte commands from a named pipe: `p` plays, `s` stops.
pub struct Driver {
    path: PathBuf,
}

impl Driver {
    pub fn new(path: &Path) -> Driver {
        Driver {
            path: path.to_path_buf(),
        }
    }

    /// Creates the named pipe unless one already exists at the path.
    fn create(path: &Path) -> Result<(), io::Error> {
        match unistd::mkfifo(path, Mode::from_bits_truncate(0o666)) {
            Ok(()) => Ok(()),
            Err(Errno::EEXIST) if fs::metadata(path)?.file_type().is_fifo() => Ok(()),
            Err(Errno::EEXIST) => Err(io::Error::new(
                io::ErrorKind::AlreadyExists,
                format!("{} exists and is not a named pipe", path.display()),
            )),
            Err(e) => Err(e.into()),
        }
    }

    /// Forwards commands until the reader is exhausted. Returns false if the worker is gone.
    fn forward<R>(events_tx: &Sender<Event>, reader: R) -> Result<bool, io::Error>
    where
        R: Read,
    {
        for byte in reader.bytes() {
            let event = match byte? {
                PLAY => Event::Play,
                STOP => Event::Stop,
                b'\n' | b'\r' => continue,
                other => {
                    warn!(command = %other.escape_ascii(), "Unrecognized trigger command");
                    continue;
                }
            };

            debug!(event = ?event, "Trigger command.");
            if events_tx.blocking_send(event).is_err() {
                return Ok(false);
            }
        }
        Ok(true)
    }
}

impl super::Driver for Driver {
    fn monitor_events(
        self: Box<Self>,
        events_tx: Sender<Event>,
    ) -> JoinHandle<Result<(), WorkerError>> {
        let path = self.path;
        tokio::task::spawn_blocking(move || {
            let span = span!(Level::INFO, "fifo driver");
            let _enter = span.enter();

            if let Err(e) = Self::create(&path) {
                error!(path = %path.display(), err = %e, "Unable to create trigger pipe.");
                return Ok(());
            }
            info!(path = %path.display(), "FIFO driver started.");

            loop {
                // Opening blocks until a writer shows up.
                let file = match File::open(&path) {
                    Ok(file) => file,
                    Err(e) => {
                        error!(path = %path.display(), err = %e, "Unable to open trigger pipe.");
                        return Ok(());
                    }
                };

                match Self::forward(&events_tx, BufReader::new(file)) {
                    Ok(true) => debug!("All writers closed the trigger pipe."),
                    Ok(false) => {
                        info!("Line worker closed, FIFO driver stopping.");
                        return Ok(());
                    }
                    Err(e) => {
                        error!(err = %e, "Error reading trigger pipe.");
                        return Ok(());
                    }
                }
            }
        })
    }
}
