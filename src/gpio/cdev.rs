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
use std::os::unix::io::AsRawFd;
use std::path::{Path, PathBuf};

use gpio_cdev::{Chip, EventRequestFlags, EventType, LineEventHandle, LineRequestFlags};
use nix::errno::Errno;
use nix::poll::{poll, PollFd, PollFlags};

use super::{Edge, EdgeSource, GpioError, RawEdgeEvent};

/// A GPIO controller exposed through the Linux GPIO character device.
pub struct Device {
    path: PathBuf,
}

impl Device {
    pub fn new(path: impl AsRef<Path>) -> Device {
        Device {
            path: path.as_ref().to_path_buf(),
        }
    }
}

impl super::Device for Device {
    fn open_line(&self, pin: u32, consumer: &str) -> Result<Box<dyn EdgeSource>, GpioError> {
        let unavailable = |e: gpio_cdev::Error| GpioError::DeviceUnavailable {
            pin,
            device: self.path.display().to_string(),
            reason: e.to_string(),
        };

        let mut chip = Chip::new(&self.path).map_err(unavailable)?;
        let handle = chip
            .get_line(pin)
            .map_err(unavailable)?
            .events(
                LineRequestFlags::INPUT,
                EventRequestFlags::BOTH_EDGES,
                consumer,
            )
            .map_err(unavailable)?;

        Ok(Box::new(Line { pin, handle }))
    }
}

struct Line {
    pin: u32,
    handle: LineEventHandle,
}

impl Line {
    fn read_failure(&self, reason: impl ToString) -> GpioError {
        GpioError::ReadFailure {
            pin: self.pin,
            reason: reason.to_string(),
        }
    }

    /// Polls the event fd for readability. A negative timeout waits forever.
    fn poll(&self, timeout: i32) -> Result<bool, GpioError> {
        let mut fds = [PollFd::new(self.handle.as_raw_fd(), PollFlags::POLLIN)];
        loop {
            match poll(&mut fds, timeout) {
                Ok(ready) => return Ok(ready > 0),
                Err(Errno::EINTR) => continue,
                Err(e) => return Err(self.read_failure(e)),
            }
        }
    }
}

impl EdgeSource for Line {
    fn pin(&self) -> u32 {
        self.pin
    }

    fn value(&self) -> Result<u8, GpioError> {
        self.handle.get_value().map_err(|e| self.read_failure(e))
    }

    fn wait_ready(&mut self) -> Result<(), GpioError> {
        while !self.poll(-1)? {}
        Ok(())
    }

    fn try_next(&mut self) -> Result<Option<RawEdgeEvent>, GpioError> {
        if !self.poll(0)? {
            return Ok(None);
        }

        let event = self.handle.get_event().map_err(|e| self.read_failure(e))?;
        let kind = match event.event_type() {
            EventType::RisingEdge => Edge::Rising,
            EventType::FallingEdge => Edge::Falling,
        };
        Ok(Some(RawEdgeEvent {
            kind,
            timestamp: event.timestamp(),
        }))
    }
}
