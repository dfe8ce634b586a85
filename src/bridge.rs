// MIT License - Copyright (c) 2026 insteon-hub-bridge authors

//! High-level facade tying the bus, devices, transport and ramp
//! scheduler together for one hub.

use std::sync::{Arc, Mutex};

use tokio::sync::{broadcast, watch};
use tracing::{debug, info};

use crate::bus::{BusEvent, BusListener, HubBus, ListenerId};
use crate::codec::DeviceId;
use crate::config::HubConfig;
use crate::device::{Device, DeviceManager, DeviceType};
use crate::ramp::RampScheduler;
use crate::transport::connector::TcpDialer;
use crate::transport::proxy::HubProxy;
use crate::types::{AutomationCommand, AutomationState};

/// A device state change, as handed to [`HubBridge::subscribe`]rs.
#[derive(Debug, Clone)]
pub struct StateUpdate {
    pub device_id: DeviceId,
    pub state: AutomationState,
}

/// Republishes automation state updates from the bus onto the broadcast
/// channel handed out by `subscribe()`.
struct UpdateForwarder {
    tx: broadcast::Sender<StateUpdate>,
}

impl BusListener for UpdateForwarder {
    fn on_event(&self, event: &BusEvent) {
        if let BusEvent::AutomationUpdate { device_id, state } = event {
            // err means no subscriber is currently listening
            let _ = self.tx.send(StateUpdate {
                device_id: *device_id,
                state: state.clone(),
            });
        }
    }
}

/// Everything needed to integrate one Insteon hub: owns the event bus,
/// the device registry, the TCP proxy and the ramp scheduler, and runs a
/// periodic status poll so device state stays fresh even when nothing is
/// being switched.
pub struct HubBridge {
    config: HubConfig,
    bus: HubBus,
    devices: Arc<DeviceManager>,
    proxy: HubProxy,
    ramp: RampScheduler,
    updates: broadcast::Sender<StateUpdate>,
    forwarder: ListenerId,
    poll_shutdown: Mutex<Option<watch::Sender<bool>>>,
}

impl HubBridge {
    pub fn new(config: HubConfig) -> Self {
        let bus = HubBus::new();
        let devices = Arc::new(DeviceManager::new(bus.clone()));
        let dialer = Arc::new(TcpDialer::new(config.host.clone(), config.port));
        let proxy = HubProxy::new(dialer, bus.clone(), config.retry_interval);
        let ramp = RampScheduler::new(bus.clone());
        let (updates, _) = broadcast::channel(config.update_capacity);
        let forwarder = bus.add_listener(Arc::new(UpdateForwarder {
            tx: updates.clone(),
        }));
        Self {
            config,
            bus,
            devices,
            proxy,
            ramp,
            updates,
            forwarder,
            poll_shutdown: Mutex::new(None),
        }
    }

    /// Start the bus dispatcher, ramp scheduler, connection loop and
    /// status poll. Must be called from within a tokio runtime.
    pub fn start(&self) {
        info!(
            "Starting Insteon Hub bridge for {}:{}",
            self.config.host, self.config.port
        );
        self.bus.start();
        self.ramp.start();
        self.proxy.start();
        self.start_poll();
    }

    /// Stop everything. Registered devices stay registered and the
    /// bridge can be started again.
    pub fn stop(&self) {
        if let Some(tx) = self
            .poll_shutdown
            .lock()
            .expect("poll shutdown lock poisoned")
            .take()
        {
            let _ = tx.send(true);
        }
        self.ramp.stop();
        self.proxy.stop();
        self.bus.stop();
        info!("Stopped Insteon Hub bridge");
    }

    fn start_poll(&self) {
        let (shutdown_tx, mut shutdown_rx) = watch::channel(false);
        if let Some(previous) = self
            .poll_shutdown
            .lock()
            .expect("poll shutdown lock poisoned")
            .replace(shutdown_tx)
        {
            let _ = previous.send(true);
        }

        let devices = self.devices.clone();
        let poll_interval = self.config.poll_interval;
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(poll_interval);
            // skip the immediate first tick; the connection is rarely
            // up yet and the commands would just be dropped
            ticker.tick().await;
            loop {
                tokio::select! {
                    _ = shutdown_rx.changed() => break,
                    _ = ticker.tick() => {
                        debug!("Polling all device statuses");
                        devices.request_all_statuses();
                    }
                }
            }
        });
    }

    /// Create and register a device, replacing any device previously
    /// registered at the same ID.
    pub fn add_device(&self, device_id: DeviceId, device_type: DeviceType) -> Arc<Device> {
        let device = Device::new(device_id, device_type, self.bus.clone());
        self.devices.add(device.clone());
        device
    }

    /// Deregister a device.
    pub fn remove_device(&self, device_id: DeviceId) -> Option<Arc<Device>> {
        self.devices.remove(device_id)
    }

    /// Send an automation command to a device. Increase/Decrease streams
    /// are coalesced into ramps; everything else is published directly.
    pub fn send_command(&self, device_id: DeviceId, command: AutomationCommand) {
        match command {
            AutomationCommand::Increase => self.ramp.increase(device_id),
            AutomationCommand::Decrease => self.ramp.decrease(device_id),
            other => self.bus.send_automation_command(device_id, other),
        }
    }

    /// Subscribe to device state updates. Slow subscribers lag rather
    /// than block the bus.
    pub fn subscribe(&self) -> broadcast::Receiver<StateUpdate> {
        self.updates.subscribe()
    }

    pub fn bus(&self) -> &HubBus {
        &self.bus
    }

    pub fn devices(&self) -> &DeviceManager {
        &self.devices
    }

    pub fn is_connected(&self) -> bool {
        self.proxy.is_connected()
    }
}

impl Drop for HubBridge {
    fn drop(&mut self) {
        self.bus.remove_listener(self.forwarder);
        self.proxy.detach();
    }
}
