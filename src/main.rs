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
mod config;
mod controller;
mod gpio;
mod player;
mod service;
#[cfg(test)]
mod testutil;

use std::error::Error;
use std::path::PathBuf;
use std::process;
use std::sync::Arc;

use clap::{crate_version, Parser, Subcommand};
use tracing::error;
use tracing_subscriber::EnvFilter;

const SYSTEMD_SERVICE: &str = r#"
[Unit]
Description=GPIO sound trigger

[Service]
Type=simple
Restart=on-failure
ExecStart=/usr/local/bin/gpiosound start --settings /etc/gpiosound/settings.yaml

[Install]
WantedBy=multi-user.target
Alias=gpiosound.service
"#;

#[derive(Parser)]
#[clap(
    author = "Michael Wilson",
    version = crate_version!(),
    about = "Plays a sound whenever a GPIO line is triggered."
)]
struct Cli {
    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start will watch every bound line and play its sound file when the line is triggered.
    Start {
        /// The path to the service settings.
        #[arg(short, long)]
        settings: Option<String>,
        /// The path to the bindings file. Overrides the settings.
        bindings: Option<String>,
    },
    /// Verifies a bindings file and lists its bindings.
    Verify {
        /// The path to the bindings file.
        #[arg(default_value = "config.cfg")]
        bindings: String,
    },
    /// Prints a systemd service definition to stdout.
    Systemd {},
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Start { settings, bindings } => {
            let settings = match settings {
                Some(path) => config::Service::load(&PathBuf::from(path))?,
                None => config::Service::default(),
            };
            let bindings_path = bindings
                .map(PathBuf::from)
                .unwrap_or_else(|| settings.bindings());
            let bindings = config::load_bindings(&bindings_path)?;

            let device = gpio::cdev::Device::new(settings.device());
            let launcher = Arc::new(player::process::Launcher::new(
                settings.player(),
                settings.quiet_flag(),
            )?);
            let service = service::Service::start(&bindings, &settings, &device, launcher)?;

            if let Err(e) = service.run().await {
                // The remaining line readers block forever, so don't wait for the runtime
                // to wind them down.
                error!(err = %e, "Line worker failed, exiting.");
                process::exit(1);
            }
        }
        Commands::Verify { bindings } => {
            let bindings = config::load_bindings(&PathBuf::from(&bindings))?;

            if bindings.is_empty() {
                println!("No bindings found.");
                return Ok(());
            }

            println!("Bindings (count: {}):", bindings.len());
            for binding in bindings.iter() {
                println!(
                    "- pin {} -> {}",
                    binding.pin(),
                    binding.sound_file().display()
                );
            }
        }
        Commands::Systemd {} => {
            println!("{}", SYSTEMD_SERVICE)
        }
    }

    Ok(())
}
