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
use std::{fmt, thread, time::Duration};

use tracing::{debug, info, warn};

pub mod cdev;
#[cfg(test)]
pub mod mock;

/// The direction of a transition on a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edge {
    /// Low to high. With pull-up wiring this is a button being released.
    Rising,
    /// High to low. With pull-up wiring this is a button being pressed.
    Falling,
}

impl fmt::Display for Edge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Edge::Rising => write!(f, "rising"),
            Edge::Falling => write!(f, "falling"),
        }
    }
}

/// An edge event as the kernel reports it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawEdgeEvent {
    pub kind: Edge,
    /// Kernel timestamp in nanoseconds.
    pub timestamp: u64,
}

#[derive(Debug, thiserror::Error)]
pub enum GpioError {
    #[error("unable to acquire line {pin} on {device}: {reason}")]
    DeviceUnavailable {
        pin: u32,
        device: String,
        reason: String,
    },

    #[error("unable to read events from line {pin}: {reason}")]
    ReadFailure { pin: u32, reason: String },
}

/// A requested line that queues edge events.
pub trait EdgeSource: Send + 'static {
    /// The line offset this source belongs to.
    fn pin(&self) -> u32;

    /// The current value of the line.
    fn value(&self) -> Result<u8, GpioError>;

    /// Blocks until at least one event is queued.
    fn wait_ready(&mut self) -> Result<(), GpioError>;

    /// Returns the next queued event, or None if the queue is empty. Never blocks.
    fn try_next(&mut self) -> Result<Option<RawEdgeEvent>, GpioError>;
}

/// A GPIO controller that hands out edge sources by line offset.
pub trait Device: Send + Sync {
    fn open_line(&self, pin: u32, consumer: &str) -> Result<Box<dyn EdgeSource>, GpioError>;
}

/// Turns the raw edge events of one line into debounced edges.
pub struct LineMonitor {
    source: Box<dyn EdgeSource>,
    debounce: Duration,
}

impl LineMonitor {
    /// Requests edge events for the given pin. The resting value is only logged.
    pub fn open(
        device: &dyn Device,
        pin: u32,
        consumer: &str,
        debounce: Duration,
    ) -> Result<LineMonitor, GpioError> {
        let source = device.open_line(pin, consumer)?;
        match source.value() {
            Ok(value) => info!(pin, value, consumer, "Line acquired."),
            Err(e) => warn!(pin, err = %e, "Line acquired, but its value is unreadable."),
        }

        Ok(LineMonitor { source, debounce })
    }

    pub fn pin(&self) -> u32 {
        self.source.pin()
    }

    /// Blocks until the next debounced edge. Once the first event of a burst arrives, the
    /// line is given the debounce window to settle, then the queue is drained and the last
    /// event wins. A wakeup that finds the queue empty produces nothing.
    pub fn wait_for_edge(&mut self) -> Result<Edge, GpioError> {
        loop {
            self.source.wait_ready()?;
            thread::sleep(self.debounce);

            let mut last = None;
            let mut drained = 0usize;
            while let Some(event) = self.source.try_next()? {
                drained += 1;
                last = Some(event);
            }

            match last {
                Some(event) => {
                    debug!(
                        pin = self.pin(),
                        edge = %event.kind,
                        timestamp = event.timestamp,
                        discarded = drained - 1,
                        "Debounced edge."
                    );
                    return Ok(event.kind);
                }
                None => debug!(pin = self.pin(), "Woke with an empty event queue."),
            }
        }
    }
}
