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
use tokio::sync::mpsc::{self, Receiver, Sender};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, span, Instrument, Level};

use crate::gpio::{Edge, GpioError};
use crate::player::Supervisor;

pub mod fifo;
pub mod gpio;

const EVENT_BUFFER: usize = 16;

/// Events that drive the supervisor of a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    /// A debounced edge on the line.
    Edge(Edge),

    /// Stops the current player and starts a new one.
    Play,

    /// Stops the current player. If nothing is playing, does nothing.
    Stop,
}

impl From<Edge> for Event {
    fn from(edge: Edge) -> Self {
        Event::Edge(edge)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum WorkerError {
    #[error(transparent)]
    Line(#[from] GpioError),

    #[error("line {0} stopped delivering events")]
    LineClosed(u32),

    #[error("worker for line {pin} aborted: {reason}")]
    Aborted { pin: u32, reason: String },

    #[error("worker task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

pub trait Driver: Send + 'static {
    fn monitor_events(self: Box<Self>, events_tx: Sender<Event>)
        -> JoinHandle<Result<(), WorkerError>>;
}

/// The worker for a single line. Owns the line's driver and supervisor; shares nothing with
/// the workers of other lines.
pub struct Controller {
    pin: u32,
    handle: JoinHandle<Result<(), WorkerError>>,
    events_tx: Sender<Event>,
}

impl Controller {
    /// Starts a worker that applies the events of the line driver to the supervisor. The
    /// worker fails as soon as the line driver ends.
    pub fn new(pin: u32, supervisor: Supervisor, line: Box<dyn Driver>) -> Controller {
        let (events_tx, events_rx) = mpsc::channel(EVENT_BUFFER);
        let line = line.monitor_events(events_tx.clone());
        let handle = tokio::spawn(
            Controller::trigger_events(pin, supervisor, events_rx, line)
                .instrument(span!(Level::INFO, "line worker", pin)),
        );

        Controller {
            pin,
            handle,
            events_tx,
        }
    }

    pub fn pin(&self) -> u32 {
        self.pin
    }

    /// Feeds the events of an auxiliary driver into this worker. The auxiliary driver ending,
    /// for whatever reason, does not affect the worker.
    pub fn attach(&self, driver: Box<dyn Driver>) -> JoinHandle<Result<(), WorkerError>> {
        driver.monitor_events(self.events_tx.clone())
    }

    /// Join will block until the worker fails.
    pub async fn join(&mut self) -> Result<(), WorkerError> {
        match (&mut self.handle).await {
            Ok(result) => result,
            Err(e) => Err(WorkerError::Aborted {
                pin: self.pin,
                reason: e.to_string(),
            }),
        }
    }

    async fn trigger_events(
        pin: u32,
        mut supervisor: Supervisor,
        mut events_rx: Receiver<Event>,
        mut line: JoinHandle<Result<(), WorkerError>>,
    ) -> Result<(), WorkerError> {
        info!("Line worker started.");

        loop {
            tokio::select! {
                biased;

                event = events_rx.recv() => match event {
                    Some(event) => {
                        match event {
                            Event::Edge(edge) => supervisor.on_edge(edge),
                            Event::Play => supervisor.play(),
                            Event::Stop => supervisor.stop(),
                        }
                        debug!(event = ?event, state = ?supervisor.state(), "Handled event.");
                    }
                    None => {
                        info!("Line worker closing.");
                        return Ok(());
                    }
                },

                result = &mut line => {
                    let err = match result {
                        Ok(Ok(())) => WorkerError::LineClosed(pin),
                        Ok(Err(e)) => e,
                        Err(e) => WorkerError::Aborted {
                            pin,
                            reason: e.to_string(),
                        },
                    };
                    error!(err = %err, "Line worker failed.");
                    return Err(err);
                }
            }
        }
    }
}
