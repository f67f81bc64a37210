// Copyright 2026 Open Nexus OS Contributors
// SPDX-License-Identifier: Apache-2.0

//! CONTEXT: TCP multiplexer that drives one session per client against the
//! device surface, plus the periodic timestamp injector
//!
//! STATUS: Experimental
//!
//! Thread-per-connection accept loop with cooperative shutdown: the listener
//! is polled non-blocking so the loop can observe the shutdown flag between
//! iterations instead of blocking forever in `accept()`.

use std::io::{Read, Write};
use std::net::{Ipv4Addr, SocketAddr, TcpListener, TcpStream};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use chrono::Local;

use crate::device::{DeviceSurface, SessionId};
use crate::error::{DeviceError, NetError};
use crate::wire::{self, Request};

/// Default TCP port for the network front end.
pub const DEFAULT_PORT: u16 = 9000;
/// Accept backlog, matching the reference `listen(sockfd, 10)`.
pub const DEFAULT_BACKLOG: i32 = 10;
/// Size of each socket read, matching the reference `BUFFER_SIZE`.
const READ_CHUNK: usize = 1024;
/// How long the accept loop blocks per poll while waiting for a connection
/// or the shutdown flag, whichever comes first.
const ACCEPT_POLL_INTERVAL: Duration = Duration::from_millis(200);

/// Runtime configuration for one [`NetworkFrontend`] instance.
#[derive(Clone, Copy, Debug)]
pub struct FrontendConfig {
    pub port: u16,
    pub ring_capacity: usize,
    pub timestamp_interval: Duration,
}

impl Default for FrontendConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            ring_capacity: crate::ring::DEFAULT_CAPACITY,
            timestamp_interval: Duration::from_secs(10),
        }
    }
}

/// Accepts TCP clients in parallel and multiplexes them onto a shared
/// [`DeviceSurface`], including the timestamp injector thread.
pub struct NetworkFrontend {
    device: Arc<DeviceSurface>,
    shutdown: Arc<AtomicBool>,
    config: FrontendConfig,
    bound_addr: Arc<OnceLock<SocketAddr>>,
}

impl NetworkFrontend {
    pub fn new(config: FrontendConfig) -> Self {
        Self {
            device: Arc::new(DeviceSurface::new(config.ring_capacity)),
            shutdown: Arc::new(AtomicBool::new(false)),
            config,
            bound_addr: Arc::new(OnceLock::new()),
        }
    }

    /// A handle that, when invoked, requests shutdown. Intended to be wired
    /// to `ctrlc::set_handler` in `main`.
    pub fn shutdown_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.shutdown)
    }

    /// The address the listener actually bound to, once `run` has started.
    /// Useful for tests that bind to an ephemeral port (`:0`) and need to
    /// discover which port the OS assigned.
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.bound_addr.get().copied()
    }

    /// Binds the listener (retrying a few times to ride out a lingering
    /// `TIME_WAIT` from a just-restarted process), then runs the accept loop
    /// and the timestamp injector until shutdown is requested. Joins all
    /// outstanding session workers before returning.
    pub fn run(&self) -> Result<(), NetError> {
        let addr = SocketAddr::from((Ipv4Addr::UNSPECIFIED, self.config.port));
        let listener = bind_with_retry(addr, 5, Duration::from_secs(1))?;
        listener.set_nonblocking(true).map_err(NetError::Fatal)?;
        let actual_addr = listener.local_addr().map_err(NetError::Fatal)?;
        let _ = self.bound_addr.set(actual_addr);

        let timestamp_thread = {
            let device = Arc::clone(&self.device);
            let shutdown = Arc::clone(&self.shutdown);
            let interval = self.config.timestamp_interval;
            thread::spawn(move || run_timestamp_injector(device, shutdown, interval))
        };

        let mut workers: Vec<JoinHandle<()>> = Vec::new();
        loop {
            if self.shutdown.load(Ordering::Relaxed) {
                break;
            }
            match listener.accept() {
                Ok((stream, peer)) => {
                    log::info!("accepted connection from {}", peer.ip());
                    let device = Arc::clone(&self.device);
                    workers.push(thread::spawn(move || handle_session(stream, device)));
                }
                Err(e) if e.kind() == std::io::ErrorKind::WouldBlock => {
                    thread::sleep(ACCEPT_POLL_INTERVAL);
                }
                Err(e) => {
                    log::warn!("transient accept error, retrying: {e}");
                }
            }
        }

        for handle in workers {
            let _ = handle.join();
        }
        let _ = timestamp_thread.join();
        Ok(())
    }
}

fn bind_with_retry(addr: SocketAddr, attempts: u32, delay: Duration) -> Result<TcpListener, NetError> {
    let mut last_err = None;
    for attempt in 0..attempts {
        match TcpListener::bind(addr) {
            Ok(listener) => return Ok(listener),
            Err(e) => {
                log::warn!("bind attempt {} of {attempts} failed: {e}", attempt + 1);
                last_err = Some(e);
                thread::sleep(delay);
            }
        }
    }
    Err(NetError::Fatal(last_err.expect("at least one bind attempt was made")))
}

fn run_timestamp_injector(device: Arc<DeviceSurface>, shutdown: Arc<AtomicBool>, interval: Duration) {
    // Poll the shutdown flag at 1-second granularity (per spec §4.4), or at
    // the injector interval itself when that's shorter, so a test harness
    // can shrink the interval without waiting a full second per check.
    let poll = Duration::from_secs(1).min(interval).max(Duration::from_millis(1));
    while !shutdown.load(Ordering::Relaxed) {
        let mut waited = Duration::ZERO;
        while waited < interval {
            if shutdown.load(Ordering::Relaxed) {
                return;
            }
            thread::sleep(poll);
            waited += poll;
        }
        let line = format!("timestamp: {}\n", Local::now().format("%Y-%m-%d %H:%M:%S"));
        if let Err(e) = device.write(line.as_bytes()) {
            log::warn!("timestamp injection failed: {e}");
        }
    }
}

fn handle_session(mut stream: TcpStream, device: Arc<DeviceSurface>) {
    let _ = stream.set_nodelay(true);
    let mut buf = Vec::new();
    let mut chunk = [0u8; READ_CHUNK];
    loop {
        let n = match stream.read(&mut chunk) {
            Ok(0) => return,
            Ok(n) => n,
            Err(e) => {
                log::warn!("session read error: {e}");
                return;
            }
        };
        buf.extend_from_slice(&chunk[..n]);
        if chunk[..n].contains(&b'\n') {
            break;
        }
    }

    match wire::classify(&buf) {
        Request::Seek(directive) => {
            handle_seek(&mut stream, &device, directive.write_cmd, directive.write_cmd_offset);
        }
        Request::Append(line) => {
            handle_append(&mut stream, &device, line);
        }
    }
}

fn handle_seek(stream: &mut TcpStream, device: &Arc<DeviceSurface>, write_cmd: u32, write_cmd_offset: u32) {
    let session = device.open();
    let outcome = device.seek_to_command(session, write_cmd as usize, write_cmd_offset as usize);
    match outcome {
        Ok(_) => {
            if let Err(e) = stream_log_to_peer(stream, device, session) {
                log::warn!("failed streaming seek response: {e}");
            }
        }
        Err(DeviceError::Invalid) => {
            log::info!("seek directive out of range: cmd={write_cmd} offset={write_cmd_offset}");
        }
        Err(e) => {
            log::warn!("seek directive failed: {e}");
        }
    }
    device.release(session);
}

fn handle_append(stream: &mut TcpStream, device: &Arc<DeviceSurface>, line: &[u8]) {
    if let Err(e) = device.write(line) {
        log::warn!("write failed: {e}");
        return;
    }
    let session = device.open();
    if let Err(e) = stream_log_to_peer(stream, device, session) {
        log::warn!("failed streaming append response: {e}");
    }
    device.release(session);
}

fn stream_log_to_peer(
    stream: &mut TcpStream,
    device: &Arc<DeviceSurface>,
    session: SessionId,
) -> std::io::Result<()> {
    loop {
        let chunk = device
            .read(session, READ_CHUNK)
            .unwrap_or_default();
        if chunk.is_empty() {
            break;
        }
        stream.write_all(&chunk)?;
    }
    Ok(())
}
