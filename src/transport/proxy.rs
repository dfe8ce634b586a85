// MIT License - Copyright (c) 2026 insteon-hub-bridge authors

//! The proxy is the boundary component owning the physical hub
//! connection. It listens on the bus for protocol commands, serializes
//! and queues them for the transport, and posts protocol updates parsed
//! from received frames back to the bus.

use std::sync::{Arc, OnceLock};

use tokio::time::Duration;
use tracing::{debug, error, info};

use crate::bus::{BusEvent, BusListener, HubBus, ListenerId};
use crate::codec::bytes_to_hex;
use crate::update::HubUpdate;

use super::connector::{Dialer, HubConnector};
use super::{HubTransport, TransportHandler};

/// Transport callbacks: frame receipt and connection loss.
struct ProxyHandler {
    bus: HubBus,
    // set once during proxy construction; the connector needs the
    // transport, which needs this handler
    connector: OnceLock<Arc<HubConnector>>,
    label: String,
}

impl TransportHandler for ProxyHandler {
    fn on_frame(&self, frame: Vec<u8>) {
        match HubUpdate::from_frame(&frame) {
            Some(update) => self.bus.post_hub_update(update.device_id(), update),
            None => debug!("No update mapping for frame: {}", bytes_to_hex(&frame)),
        }
    }

    fn on_disconnect(&self) {
        error!("Insteon Hub {} connection lost", self.label);
        if let Some(connector) = self.connector.get() {
            connector.reconnect();
        }
    }
}

/// Forwards bus protocol commands into the transport's outbound queue.
struct ProxyBusListener {
    transport: Arc<HubTransport>,
}

impl BusListener for ProxyBusListener {
    fn on_event(&self, event: &BusEvent) {
        if let BusEvent::HubCommand { command, .. } = event {
            if !self.transport.is_started() {
                info!("Not sending message - not connected to hub");
                return;
            }
            self.transport.enqueue_command(command.to_frame().to_vec());
        }
    }
}

/// Owns the transport and connector for one hub and wires them to the
/// bus. Dropping the proxy does not stop its tasks; call
/// [`stop`](Self::stop) and [`detach`](Self::detach) first.
pub struct HubProxy {
    transport: Arc<HubTransport>,
    connector: Arc<HubConnector>,
    bus: HubBus,
    listener: ListenerId,
}

impl HubProxy {
    pub fn new(dialer: Arc<dyn Dialer>, bus: HubBus, retry_interval: Duration) -> Self {
        let label = dialer.label();
        let handler = Arc::new(ProxyHandler {
            bus: bus.clone(),
            connector: OnceLock::new(),
            label: label.clone(),
        });
        let transport = Arc::new(HubTransport::new(handler.clone(), label));
        let connector = Arc::new(HubConnector::new(
            dialer,
            transport.clone(),
            retry_interval,
        ));
        handler
            .connector
            .set(connector.clone())
            .unwrap_or_else(|_| unreachable!("connector set twice"));
        let listener = bus.add_listener(Arc::new(ProxyBusListener {
            transport: transport.clone(),
        }));
        Self {
            transport,
            connector,
            bus,
            listener,
        }
    }

    /// Connect, retrying until the hub accepts.
    pub fn start(&self) {
        self.connector.start();
    }

    /// Cancel any reconnect attempt and close the connection.
    pub fn stop(&self) {
        self.connector.stop();
    }

    /// Unregister from the bus. Used when the proxy is replaced.
    pub fn detach(&self) {
        self.bus.remove_listener(self.listener);
    }

    pub fn is_connected(&self) -> bool {
        self.transport.is_started()
    }
}
