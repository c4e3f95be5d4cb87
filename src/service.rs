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
use std::{error::Error, sync::Arc};

use tokio::task::{JoinHandle, JoinSet};
use tracing::{info, warn};

use crate::{
    config::{self, ConfigError, LineBinding},
    controller::{self, Controller, WorkerError},
    gpio::{self, LineMonitor},
    player::{Launcher, Supervisor},
};

/// Runs one worker per bound line.
pub struct Service {
    controllers: Vec<Controller>,
    triggers: Vec<JoinHandle<Result<(), WorkerError>>>,
}

impl Service {
    /// Acquires every bound line, then starts a worker for each. Nothing is started unless
    /// every line could be acquired.
    pub fn start(
        bindings: &[LineBinding],
        settings: &config::Service,
        device: &dyn gpio::Device,
        launcher: Arc<dyn Launcher>,
    ) -> Result<Service, Box<dyn Error>> {
        let debounce = settings.debounce()?;
        if let Some(trigger) = settings.trigger() {
            if !bindings.iter().any(|binding| binding.pin() == trigger.pin()) {
                return Err(ConfigError::UnboundTrigger(trigger.pin()).into());
            }
        }

        let monitors = bindings
            .iter()
            .map(|binding| {
                LineMonitor::open(
                    device,
                    binding.pin(),
                    &settings.consumer(binding.pin()),
                    debounce,
                )
            })
            .collect::<Result<Vec<_>, _>>()?;

        let controllers = bindings
            .iter()
            .zip(monitors)
            .map(|(binding, monitor)| {
                Controller::new(
                    binding.pin(),
                    Supervisor::new(
                        binding.pin(),
                        binding.sound_file().clone(),
                        launcher.clone(),
                    ),
                    Box::new(controller::gpio::Driver::new(monitor)),
                )
            })
            .collect::<Vec<_>>();

        let triggers = settings
            .trigger()
            .into_iter()
            .filter_map(|trigger| {
                controllers
                    .iter()
                    .find(|controller| controller.pin() == trigger.pin())
                    .map(|controller| {
                        controller.attach(Box::new(controller::fifo::Driver::new(trigger.path())))
                    })
            })
            .collect::<Vec<_>>();

        info!(workers = controllers.len(), "Service started.");
        Ok(Service {
            controllers,
            triggers,
        })
    }

    #[cfg(test)]
    pub fn worker_count(&self) -> usize {
        self.controllers.len()
    }

    /// Runs until a worker fails. Workers never finish on their own, so with no failures this
    /// never returns.
    pub async fn run(self) -> Result<(), WorkerError> {
        // Held so the trigger drivers stay attached for the life of the service.
        let _triggers = self.triggers;

        let mut workers = JoinSet::new();
        for mut controller in self.controllers {
            workers.spawn(async move { controller.join().await });
        }

        while let Some(result) = workers.join_next().await {
            match result {
                Ok(Ok(())) => warn!("Line worker closed."),
                Ok(Err(e)) => return Err(e),
                Err(e) => return Err(e.into()),
            }
        }

        info!("No line workers running, idling.");
        std::future::pending::<Result<(), WorkerError>>().await
    }
}
