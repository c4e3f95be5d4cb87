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
use tokio::{sync::mpsc::Sender, task::JoinHandle};
use tracing::{info, span, Level};

use super::{Event, WorkerError};
use crate::gpio::LineMonitor;

/// A driver that turns the debounced edges of a line into events.
pub struct Driver {
    monitor: LineMonitor,
}

impl Driver {
    pub fn new(monitor: LineMonitor) -> Driver {
        Driver { monitor }
    }
}

impl super::Driver for Driver {
    fn monitor_events(
        self: Box<Self>,
        events_tx: Sender<Event>,
    ) -> JoinHandle<Result<(), WorkerError>> {
        let mut monitor = self.monitor;
        tokio::task::spawn_blocking(move || -> Result<(), WorkerError> {
            let span = span!(Level::INFO, "gpio driver", pin = monitor.pin());
            let _enter = span.enter();

            info!("GPIO driver started.");

            loop {
                let edge = monitor.wait_for_edge()?;
                if events_tx.blocking_send(Event::from(edge)).is_err() {
                    info!("Line worker closed, GPIO driver stopping.");
                    return Ok(());
                }
            }
        })
    }
}
