//! # UDP Listener Module
//!
//! Receives Condor datagrams on a local UDP socket and hands decoded records
//! to a [`TelemetrySink`].
//!
//! This module handles:
//! - Binding the loopback socket (retrying with backoff on failure)
//! - Liveness tracking: UDP has no connection state, so the source counts as
//!   connected while datagrams keep arriving and as disconnected after the
//!   idle timeout
//! - Decoding each datagram and delivering it synchronously, in order
//! - Containing faults: socket errors and sink panics are logged, clear the
//!   liveness flags and back off; only `stop()` ends the worker
//!
//! ## Usage
//!
//! ```no_run
//! use condor_bridge::config::{DecoderConfig, ListenerConfig};
//! use condor_bridge::listener::UdpListener;
//! use condor_bridge::telemetry::event::TelemetryEvent;
//!
//! #[tokio::main]
//! async fn main() {
//!     let mut listener = UdpListener::new(ListenerConfig::default(), DecoderConfig::default());
//!     listener.start(Box::new(|event: &TelemetryEvent| {
//!         println!("pitch {:.1}", event.record().pitch);
//!     }));
//!
//!     tokio::signal::ctrl_c().await.ok();
//!     listener.stop().await;
//! }
//! ```

pub mod sink;

pub use sink::TelemetrySink;

use std::any::Any;
use std::net::SocketAddr;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use tokio::net::UdpSocket;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, error, info, warn};

use crate::condor::decoder::Decoder;
use crate::config::{DecoderConfig, ListenerConfig};
use crate::error::BridgeError;
use crate::telemetry::event::TelemetryEvent;

/// Liveness flags and counters shared between the worker and its handle.
///
/// Only the worker writes; the handle reads.
#[derive(Debug, Default)]
struct ListenerState {
    connected: AtomicBool,
    running: AtomicBool,
    packets_received: AtomicU64,
    records_emitted: AtomicU64,
    local_addr: Mutex<Option<SocketAddr>>,
}

impl ListenerState {
    /// Mark the source live. Returns true on the disconnected -> connected edge.
    fn mark_connected(&self) -> bool {
        self.running.store(true, Ordering::Release);
        !self.connected.swap(true, Ordering::AcqRel)
    }

    /// Mark the source gone. Returns true on the connected -> disconnected edge.
    fn mark_disconnected(&self) -> bool {
        self.running.store(false, Ordering::Release);
        self.connected.swap(false, Ordering::AcqRel)
    }

    fn set_local_addr(&self, addr: Option<SocketAddr>) {
        if let Ok(mut slot) = self.local_addr.lock() {
            *slot = addr;
        }
    }
}

/// Handle on a running worker task
struct Worker {
    stop_tx: watch::Sender<bool>,
    handle: JoinHandle<()>,
}

/// UDP telemetry listener.
///
/// Owns one background worker task while started. The worker owns the socket
/// and the decoder (and with it the previous record); the handle only reads
/// the liveness flags.
pub struct UdpListener {
    config: ListenerConfig,
    decoder_config: DecoderConfig,
    state: Arc<ListenerState>,
    worker: Option<Worker>,
}

impl std::fmt::Debug for UdpListener {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UdpListener")
            .field("bind_addr", &self.config.bind_addr())
            .field("connected", &self.is_connected())
            .field("started", &self.is_started())
            .finish_non_exhaustive()
    }
}

impl UdpListener {
    /// Create a stopped listener
    pub fn new(config: ListenerConfig, decoder_config: DecoderConfig) -> Self {
        Self {
            config,
            decoder_config,
            state: Arc::new(ListenerState::default()),
            worker: None,
        }
    }

    /// Start the worker task.
    ///
    /// Must be called from within a tokio runtime. Does nothing (and drops
    /// `sink`) if the worker is already running.
    pub fn start(&mut self, sink: Box<dyn TelemetrySink>) {
        if self.is_started() {
            debug!("Condor listener already running");
            return;
        }

        debug!("Starting Condor listener on {}", self.config.bind_addr());

        let (stop_tx, stop_rx) = watch::channel(false);
        let worker = WorkerLoop {
            config: self.config.clone(),
            decoder: Decoder::from_config(&self.decoder_config),
            sink,
            state: Arc::clone(&self.state),
            stop_rx,
        };

        let handle = tokio::spawn(worker.run());
        self.worker = Some(Worker { stop_tx, handle });
    }

    /// Stop the worker and wait for it to exit.
    ///
    /// Waits at most the configured stop timeout before aborting the task.
    /// Once this returns, the sink will not be called again.
    pub async fn stop(&mut self) {
        let Some(Worker { stop_tx, mut handle }) = self.worker.take() else {
            return;
        };

        debug!("Stopping Condor listener");
        let _ = stop_tx.send(true);

        match tokio::time::timeout(self.config.stop_timeout(), &mut handle).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => warn!("Condor listener worker ended abnormally: {}", e),
            Err(_) => {
                warn!(
                    "Condor listener did not stop within {:?}, aborting",
                    self.config.stop_timeout()
                );
                handle.abort();
                let _ = handle.await;
            }
        }

        self.state.mark_disconnected();
        self.state.set_local_addr(None);
        info!("Condor listener stopped");
    }

    /// True while a worker task exists
    pub fn is_started(&self) -> bool {
        self.worker
            .as_ref()
            .map(|worker| !worker.handle.is_finished())
            .unwrap_or(false)
    }

    /// True while datagrams keep arriving within the idle timeout
    pub fn is_connected(&self) -> bool {
        self.state.connected.load(Ordering::Acquire)
    }

    /// True while the simulator is producing samples
    pub fn is_running(&self) -> bool {
        self.state.running.load(Ordering::Acquire)
    }

    /// Address the socket is bound to, once bound
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.state.local_addr.lock().ok().and_then(|slot| *slot)
    }

    /// Datagrams received since creation
    pub fn packets_received(&self) -> u64 {
        self.state.packets_received.load(Ordering::Relaxed)
    }

    /// Events delivered to the sink since creation
    pub fn records_emitted(&self) -> u64 {
        self.state.records_emitted.load(Ordering::Relaxed)
    }

    /// Listener configuration
    pub fn config(&self) -> &ListenerConfig {
        &self.config
    }
}

impl Drop for UdpListener {
    fn drop(&mut self) {
        if let Some(worker) = self.worker.take() {
            let _ = worker.stop_tx.send(true);
            worker.handle.abort();
        }
    }
}

/// What one wait on the socket produced
enum Poll {
    Stop,
    Datagram(usize, SocketAddr),
    Oversized(std::io::Error),
    Failed(std::io::Error),
    Idle,
}

/// State owned by the worker task
struct WorkerLoop {
    config: ListenerConfig,
    decoder: Decoder,
    sink: Box<dyn TelemetrySink>,
    state: Arc<ListenerState>,
    stop_rx: watch::Receiver<bool>,
}

impl WorkerLoop {
    async fn run(mut self) {
        let bind_addr = self.config.bind_addr();
        let idle_timeout = self.config.idle_timeout();
        let mut buf = vec![0u8; self.config.max_datagram_size];
        let mut socket: Option<UdpSocket> = None;
        let mut last_datagram = Instant::now();
        let mut sequence: u64 = 0;

        while !*self.stop_rx.borrow() {
            let Some(sock) = socket.as_ref() else {
                match UdpSocket::bind(bind_addr).await {
                    Ok(bound) => {
                        let local_addr = bound.local_addr().ok();
                        info!("Condor listener bound to {:?}", local_addr);
                        self.state.set_local_addr(local_addr);
                        last_datagram = Instant::now();
                        socket = Some(bound);
                    }
                    Err(source) => {
                        error!("{}", BridgeError::Bind { addr: bind_addr, source });
                        self.state.mark_disconnected();
                        if self.backoff().await {
                            break;
                        }
                    }
                }
                continue;
            };

            let poll = tokio::select! {
                _ = self.stop_rx.changed() => Poll::Stop,
                received = tokio::time::timeout(self.config.poll_interval(), sock.recv_from(&mut buf)) => {
                    match received {
                        Ok(Ok((len, source))) => Poll::Datagram(len, source),
                        Ok(Err(e)) if is_oversized(&e) => Poll::Oversized(e),
                        Ok(Err(e)) => Poll::Failed(e),
                        Err(_) => Poll::Idle,
                    }
                }
            };

            match poll {
                Poll::Stop => break,
                Poll::Datagram(len, source) => {
                    last_datagram = Instant::now();
                    self.state.packets_received.fetch_add(1, Ordering::Relaxed);
                    if self.state.mark_connected() {
                        info!("Condor telemetry connected from {}", source);
                    }

                    let payload = String::from_utf8_lossy(&buf[..len]);
                    let Some(record) = self.decoder.decode(&payload) else {
                        continue;
                    };

                    let event = TelemetryEvent::new(record, sequence, source, len);
                    sequence = sequence.wrapping_add(1);

                    if let Err(panic) = self.deliver(&event) {
                        error!("Telemetry sink panicked: {}", panic_message(panic.as_ref()));
                        self.state.mark_disconnected();
                        if self.backoff().await {
                            break;
                        }
                    }
                }
                Poll::Oversized(e) => {
                    last_datagram = Instant::now();
                    self.state.packets_received.fetch_add(1, Ordering::Relaxed);
                    self.state.mark_connected();
                    warn!(
                        "Dropping datagram larger than {} bytes: {}",
                        self.config.max_datagram_size, e
                    );
                }
                Poll::Failed(e) => {
                    error!("Condor UDP receive failed: {}", e);
                    self.state.mark_disconnected();
                    socket = None;
                    if self.backoff().await {
                        break;
                    }
                }
                Poll::Idle => {
                    if last_datagram.elapsed() > idle_timeout {
                        if self.state.mark_disconnected() {
                            info!("No Condor telemetry for {:?}, marking disconnected", idle_timeout);
                        }
                        if self.backoff().await {
                            break;
                        }
                    }
                }
            }
        }

        self.state.mark_disconnected();
        debug!("Condor listener worker exited after {} records", sequence);
    }

    /// Hand one event to the sink, catching a panic inside it
    fn deliver(&mut self, event: &TelemetryEvent) -> Result<(), Box<dyn Any + Send>> {
        let sink = &mut self.sink;
        panic::catch_unwind(AssertUnwindSafe(|| sink.on_telemetry(event)))?;
        self.state.records_emitted.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    /// Sleep for the reconnect backoff. Returns true if stop was requested.
    async fn backoff(&mut self) -> bool {
        tokio::select! {
            _ = self.stop_rx.changed() => true,
            _ = tokio::time::sleep(self.config.reconnect_backoff()) => false,
        }
    }
}

/// True when the datagram did not fit the receive buffer.
///
/// Windows reports this as `WSAEMSGSIZE`; other platforms truncate silently.
fn is_oversized(e: &std::io::Error) -> bool {
    #[cfg(windows)]
    {
        const WSAEMSGSIZE: i32 = 10040;
        e.raw_os_error() == Some(WSAEMSGSIZE)
    }
    #[cfg(not(windows))]
    {
        let _ = e;
        false
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> &str {
    if let Some(msg) = panic.downcast_ref::<&str>() {
        msg
    } else if let Some(msg) = panic.downcast_ref::<String>() {
        msg.as_str()
    } else {
        "unknown panic payload"
    }
}
