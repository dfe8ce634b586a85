// MIT License - Copyright (c) 2026 insteon-hub-bridge authors

//! Socket transport: framed I/O, reconnect handling and the bus-facing
//! proxy.

pub mod connector;
pub mod framing;
pub mod proxy;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt, ReadHalf, WriteHalf};
use tokio::sync::{mpsc, watch};
use tracing::{debug, error, warn};

/// Byte stream the transport can run over. Production code uses
/// `TcpStream`; tests use in-memory duplex streams.
pub trait HubStream: AsyncRead + AsyncWrite + Send + Unpin {}

impl<T: AsyncRead + AsyncWrite + Send + Unpin> HubStream for T {}

/// An owned, connected byte stream handed from the connector to the
/// transport.
pub type BoxedStream = Box<dyn HubStream>;

/// Callbacks the transport invokes from its receive loop.
pub trait TransportHandler: Send + Sync {
    /// A complete frame was reconstructed from the stream.
    fn on_frame(&self, frame: Vec<u8>);

    /// The connection failed. Invoked exactly once per connection, and
    /// only for I/O failures, never for a deliberate [`HubTransport::stop`].
    fn on_disconnect(&self);
}

/// Does the heavy lifting of serial I/O with the hub: a sender task
/// draining the outbound command queue and a receiver task parsing framed
/// messages off the stream.
///
/// The outbound queue outlives individual connections; commands enqueued
/// while disconnected are sent once a new stream is started.
pub struct HubTransport {
    handler: Arc<dyn TransportHandler>,
    outbound_tx: mpsc::UnboundedSender<Vec<u8>>,
    outbound_rx: Arc<tokio::sync::Mutex<mpsc::UnboundedReceiver<Vec<u8>>>>,
    shutdown: Mutex<Option<watch::Sender<bool>>>,
    started: AtomicBool,
    label: String,
}

impl HubTransport {
    /// `label` identifies the connection in log output (host:port).
    pub fn new(handler: Arc<dyn TransportHandler>, label: impl Into<String>) -> Self {
        let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();
        Self {
            handler,
            outbound_tx,
            outbound_rx: Arc::new(tokio::sync::Mutex::new(outbound_rx)),
            shutdown: Mutex::new(None),
            started: AtomicBool::new(false),
            label: label.into(),
        }
    }

    /// Whether a connection is currently active.
    pub fn is_started(&self) -> bool {
        self.started.load(Ordering::Acquire)
    }

    /// Take ownership of a connected stream and spawn the sender and
    /// receiver loops. Any previous connection is shut down first.
    pub fn start(&self, stream: BoxedStream) {
        self.stop();
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        *self.shutdown.lock().expect("shutdown lock poisoned") = Some(shutdown_tx);
        self.started.store(true, Ordering::Release);

        let (reader, writer) = tokio::io::split(stream);
        tokio::spawn(run_sender(
            writer,
            self.outbound_rx.clone(),
            shutdown_rx.clone(),
            self.label.clone(),
        ));
        tokio::spawn(run_receiver(
            reader,
            self.handler.clone(),
            shutdown_rx,
            self.label.clone(),
        ));
    }

    /// Queue a serialized frame for sending. Never blocks; safe from any
    /// task, whether or not a connection is active.
    pub fn enqueue_command(&self, msg: Vec<u8>) {
        if self.outbound_tx.send(msg).is_err() {
            error!("Outbound queue closed, dropping command");
        }
    }

    /// Signal both loops to exit and release the stream. Idempotent.
    pub fn stop(&self) {
        self.started.store(false, Ordering::Release);
        if let Some(tx) = self.shutdown.lock().expect("shutdown lock poisoned").take() {
            let _ = tx.send(true);
        }
    }
}

/// Takes commands off the outbound queue and writes them to the stream.
async fn run_sender(
    mut writer: WriteHalf<BoxedStream>,
    outbound_rx: Arc<tokio::sync::Mutex<mpsc::UnboundedReceiver<Vec<u8>>>>,
    mut shutdown: watch::Receiver<bool>,
    label: String,
) {
    // held for this connection's lifetime; a sender for a superseding
    // connection waits here until we exit
    let mut rx = outbound_rx.lock().await;
    loop {
        tokio::select! {
            res = shutdown.changed() => {
                if res.is_err() || *shutdown.borrow() {
                    break;
                }
            }
            msg = rx.recv() => {
                let Some(msg) = msg else { break };
                if let Err(e) = writer.write_all(&msg).await {
                    error!("Failure writing to {label}: {e}");
                    break;
                }
                if let Err(e) = writer.flush().await {
                    error!("Failure flushing to {label}: {e}");
                    break;
                }
            }
        }
    }
    debug!("{label} sender stopped");
}

/// Parses frames off the stream and passes them to the handler.
async fn run_receiver(
    mut reader: ReadHalf<BoxedStream>,
    handler: Arc<dyn TransportHandler>,
    mut shutdown: watch::Receiver<bool>,
    label: String,
) {
    loop {
        tokio::select! {
            _ = shutdown.changed() => break,
            res = framing::read_frame(&mut reader) => {
                match res {
                    Ok(Some(frame)) => handler.on_frame(frame),
                    // unknown opcode: frame dropped, resync at next marker
                    Ok(None) => {}
                    Err(e) => {
                        if !*shutdown.borrow() {
                            error!("Failure reading from {label}: {e}");
                            handler.on_disconnect();
                        } else {
                            warn!("Read aborted during shutdown of {label}: {e}");
                        }
                        break;
                    }
                }
            }
        }
    }
    debug!("{label} receiver stopped");
}
