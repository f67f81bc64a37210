// Copyright 2026 Open Nexus OS Contributors
// SPDX-License-Identifier: Apache-2.0

use std::process::ExitCode;
use std::time::Duration;

use clap::Parser;

use cmdlogd::cli::Cli;
use cmdlogd::server::{FrontendConfig, NetworkFrontend};

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    let frontend = NetworkFrontend::new(FrontendConfig {
        port: cli.port,
        ring_capacity: cli.ring_capacity,
        timestamp_interval: Duration::from_secs(cli.timestamp_interval_secs),
    });

    let shutdown = frontend.shutdown_handle();
    if let Err(e) = ctrlc::set_handler(move || {
        shutdown.store(true, std::sync::atomic::Ordering::Relaxed);
    }) {
        log::warn!("failed to install signal handler: {e}");
    }

    match frontend.run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("fatal: {e}");
            ExitCode::FAILURE
        }
    }
}
