// MIT License - Copyright (c) 2026 insteon-hub-bridge authors

//! Reconnect-with-retry logic around a [`HubTransport`].

use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};

use tokio::net::TcpStream;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{sleep, Duration};
use tracing::{info, warn};

use super::{BoxedStream, HubTransport};

pub type DialFuture<'a> = Pin<Box<dyn Future<Output = std::io::Result<BoxedStream>> + Send + 'a>>;

/// Opens a connection to the hub. The production implementation is
/// [`TcpDialer`]; tests substitute fakes to drive the retry loop.
pub trait Dialer: Send + Sync + 'static {
    fn dial(&self) -> DialFuture<'_>;

    /// Connection string for log output.
    fn label(&self) -> String;
}

/// Dials the hub's TCP serial port.
pub struct TcpDialer {
    host: String,
    port: u16,
}

impl TcpDialer {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }
}

impl Dialer for TcpDialer {
    fn dial(&self) -> DialFuture<'_> {
        Box::pin(async move {
            let stream = TcpStream::connect((self.host.as_str(), self.port)).await?;
            Ok(Box::new(stream) as BoxedStream)
        })
    }

    fn label(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

struct Attempt {
    cancel: watch::Sender<bool>,
    handle: JoinHandle<()>,
}

/// Owns the reconnect loop: retries a connection attempt at a fixed
/// interval until it succeeds, then hands the live stream to the
/// transport. At most one attempt loop runs at a time.
pub struct HubConnector {
    dialer: Arc<dyn Dialer>,
    transport: Arc<HubTransport>,
    retry_interval: Duration,
    attempt: Mutex<Option<Attempt>>,
}

impl HubConnector {
    pub fn new(
        dialer: Arc<dyn Dialer>,
        transport: Arc<HubTransport>,
        retry_interval: Duration,
    ) -> Self {
        Self {
            dialer,
            transport,
            retry_interval,
            attempt: Mutex::new(None),
        }
    }

    /// Begin connecting. Equivalent to [`reconnect`](Self::reconnect).
    pub fn start(&self) {
        self.reconnect();
    }

    /// Trigger a reconnect unless an attempt is already in progress.
    /// Tears down any existing connection first.
    pub fn reconnect(&self) {
        let mut attempt = self.attempt.lock().expect("attempt lock poisoned");
        if let Some(current) = attempt.as_ref() {
            if !current.handle.is_finished() {
                return;
            }
        }

        self.transport.stop();

        let (cancel_tx, cancel_rx) = watch::channel(false);
        let handle = tokio::spawn(run_connect_loop(
            self.dialer.clone(),
            self.transport.clone(),
            self.retry_interval,
            cancel_rx,
        ));
        *attempt = Some(Attempt {
            cancel: cancel_tx,
            handle,
        });
    }

    /// Cancel any in-progress reconnect and tear down the transport.
    pub fn stop(&self) {
        if let Some(attempt) = self.attempt.lock().expect("attempt lock poisoned").take() {
            let _ = attempt.cancel.send(true);
        }
        self.transport.stop();
    }
}

async fn run_connect_loop(
    dialer: Arc<dyn Dialer>,
    transport: Arc<HubTransport>,
    retry_interval: Duration,
    mut cancel: watch::Receiver<bool>,
) {
    let label = dialer.label();
    loop {
        if *cancel.borrow() {
            return;
        }
        match dialer.dial().await {
            Ok(stream) => {
                if *cancel.borrow() {
                    // stopped while the dial was in flight
                    return;
                }
                transport.start(stream);
                info!("Connected to Insteon Hub {label}");
                return;
            }
            Err(e) => {
                warn!(
                    "Could not connect to Insteon Hub {label}: {e}. Will retry in {} seconds...",
                    retry_interval.as_secs()
                );
                tokio::select! {
                    _ = sleep(retry_interval) => {}
                    _ = cancel.changed() => return,
                }
            }
        }
    }
}
