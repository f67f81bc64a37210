// Copyright 2026 Open Nexus OS Contributors
// SPDX-License-Identifier: Apache-2.0

//! CONTEXT: command-line configuration surface for the `cmdlogd` binary

use clap::Parser;

use crate::ring::DEFAULT_CAPACITY;
use crate::server::DEFAULT_PORT;

/// Bounded-history command log daemon.
#[derive(Parser, Debug)]
#[command(name = "cmdlogd", version, about)]
pub struct Cli {
    /// TCP port to listen on.
    #[arg(long, default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Number of commands retained in the ring before the oldest is evicted.
    #[arg(long, default_value_t = DEFAULT_CAPACITY)]
    pub ring_capacity: usize,

    /// Interval, in seconds, between timestamp injections.
    #[arg(long, default_value_t = 10)]
    pub timestamp_interval_secs: u64,
}
