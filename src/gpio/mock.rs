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
    collections::{HashMap, VecDeque},
    sync::{
        atomic::{AtomicUsize, Ordering},
        mpsc, Arc,
    },
};

use parking_lot::Mutex;

use super::{Edge, EdgeSource, GpioError, RawEdgeEvent};

/// A mock GPIO controller. Lines must be registered with `line` before they can be opened.
#[derive(Default)]
pub struct Device {
    sources: Mutex<HashMap<u32, Source>>,
}

impl Device {
    pub fn new() -> Device {
        Device::default()
    }

    /// Registers a line and returns the handle used to inject events into it.
    pub fn line(&self, pin: u32) -> Line {
        let (bursts_tx, bursts_rx) = mpsc::channel();
        let wakeups = Arc::new(AtomicUsize::new(0));
        let drains = Arc::new(AtomicUsize::new(0));
        self.sources.lock().insert(
            pin,
            Source {
                pin,
                bursts: bursts_rx,
                queue: VecDeque::new(),
                timestamp: 0,
                wakeups: wakeups.clone(),
                drains: drains.clone(),
            },
        );
        Line {
            bursts: Mutex::new(Some(bursts_tx)),
            wakeups,
            drains,
        }
    }
}

impl super::Device for Device {
    fn open_line(&self, pin: u32, _consumer: &str) -> Result<Box<dyn EdgeSource>, GpioError> {
        match self.sources.lock().remove(&pin) {
            Some(source) => Ok(Box::new(source)),
            None => Err(GpioError::DeviceUnavailable {
                pin,
                device: "mock".to_string(),
                reason: "line not registered or already requested".to_string(),
            }),
        }
    }
}

/// The test side of a mock line.
pub struct Line {
    bursts: Mutex<Option<mpsc::Sender<Vec<Edge>>>>,
    wakeups: Arc<AtomicUsize>,
    drains: Arc<AtomicUsize>,
}

impl Line {
    /// Queues a burst of edges. Edges queued before the reader drains its queue are read
    /// together with whatever woke it. An empty burst wakes the reader without any events.
    pub fn burst(&self, edges: &[Edge]) {
        if let Some(bursts) = self.bursts.lock().as_ref() {
            let _ = bursts.send(edges.to_vec());
        }
    }

    /// Makes the next read fail.
    pub fn close(&self) {
        self.bursts.lock().take();
    }

    /// The number of times the reader has woken up.
    pub fn wakeups(&self) -> usize {
        self.wakeups.load(Ordering::SeqCst)
    }

    /// The number of times the reader has emptied its queue.
    pub fn drains(&self) -> usize {
        self.drains.load(Ordering::SeqCst)
    }
}

struct Source {
    pin: u32,
    bursts: mpsc::Receiver<Vec<Edge>>,
    queue: VecDeque<RawEdgeEvent>,
    timestamp: u64,
    wakeups: Arc<AtomicUsize>,
    drains: Arc<AtomicUsize>,
}

impl Source {
    fn enqueue(&mut self, burst: Vec<Edge>) {
        for kind in burst {
            self.timestamp += 1_000;
            self.queue.push_back(RawEdgeEvent {
                kind,
                timestamp: self.timestamp,
            });
        }
    }
}

impl EdgeSource for Source {
    fn pin(&self) -> u32 {
        self.pin
    }

    fn value(&self) -> Result<u8, GpioError> {
        Ok(1)
    }

    fn wait_ready(&mut self) -> Result<(), GpioError> {
        if self.queue.is_empty() {
            let burst = self.bursts.recv().map_err(|e| GpioError::ReadFailure {
                pin: self.pin,
                reason: e.to_string(),
            })?;
            self.enqueue(burst);
        }
        self.wakeups.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn try_next(&mut self) -> Result<Option<RawEdgeEvent>, GpioError> {
        // Like the kernel queue, anything that arrived since the wakeup is pending too.
        while self.queue.is_empty() {
            match self.bursts.try_recv() {
                Ok(burst) => self.enqueue(burst),
                Err(_) => break,
            }
        }

        let event = self.queue.pop_front();
        if event.is_none() {
            self.drains.fetch_add(1, Ordering::SeqCst);
        }
        Ok(event)
    }
}
