// MIT License - Copyright (c) 2026 insteon-hub-bridge authors

//! Coalesces rapid-fire increase/decrease command streams into discrete
//! ramp start/stop commands.
//!
//! The hub copes badly with a burst of arbitrary step dim/brighten
//! commands, which is exactly what a held dimmer button produces. Each
//! device tracks a debounce deadline: the first increase/decrease while
//! idle emits an Up/Down command and arms the deadline, further calls
//! within the window merely refresh it, and a background ticker emits a
//! single Stop once the deadline elapses.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tokio::sync::watch;
use tokio::time::{interval, Duration, Instant};
use tracing::debug;

use crate::bus::HubBus;
use crate::codec::DeviceId;
use crate::types::AutomationCommand;

/// Debounce window: a gap longer than this ends the hold gesture.
const DEBOUNCE_WINDOW: Duration = Duration::from_millis(400);
/// How often elapsed deadlines are scanned for.
const TICK_PERIOD: Duration = Duration::from_millis(300);

/// Per-device ramp state: `None` deadline = idle, `Some` = ramping.
#[derive(Default)]
struct DimInfo {
    deadline: Option<Instant>,
}

/// Converts a high-frequency increase/decrease stream into exactly one
/// start and one stop command per hold gesture.
pub struct RampScheduler {
    bus: HubBus,
    ramps: Arc<Mutex<HashMap<DeviceId, DimInfo>>>,
    shutdown: Mutex<Option<watch::Sender<bool>>>,
}

impl RampScheduler {
    pub fn new(bus: HubBus) -> Self {
        Self {
            bus,
            ramps: Arc::new(Mutex::new(HashMap::new())),
            shutdown: Mutex::new(None),
        }
    }

    /// One brighten step. Starts an Up ramp if the device was idle,
    /// otherwise refreshes the debounce deadline.
    pub fn increase(&self, device_id: DeviceId) {
        self.refresh(device_id, AutomationCommand::Up, "UP");
    }

    /// One dim step. Starts a Down ramp if the device was idle,
    /// otherwise refreshes the debounce deadline.
    pub fn decrease(&self, device_id: DeviceId) {
        self.refresh(device_id, AutomationCommand::Down, "DOWN");
    }

    fn refresh(&self, device_id: DeviceId, start_command: AutomationCommand, direction: &str) {
        let was_idle = {
            let mut ramps = self.ramps.lock().expect("ramp map poisoned");
            let info = ramps.entry(device_id).or_default();
            let was_idle = info.deadline.is_none();
            info.deadline = Some(Instant::now() + DEBOUNCE_WINDOW);
            was_idle
        };
        if was_idle {
            self.bus.send_automation_command(device_id, start_command);
            debug!("Started ramp {direction} for {device_id}");
        }
    }

    /// Spawn the ticker task that stops elapsed ramps.
    pub fn start(&self) {
        let (shutdown_tx, mut shutdown_rx) = watch::channel(false);
        if let Some(previous) = self
            .shutdown
            .lock()
            .expect("shutdown lock poisoned")
            .replace(shutdown_tx)
        {
            let _ = previous.send(true);
        }

        let ramps = self.ramps.clone();
        let bus = self.bus.clone();
        tokio::spawn(async move {
            let mut ticker = interval(TICK_PERIOD);
            loop {
                tokio::select! {
                    _ = shutdown_rx.changed() => break,
                    _ = ticker.tick() => {
                        let now = Instant::now();
                        let expired: Vec<DeviceId> = {
                            let mut ramps = ramps.lock().expect("ramp map poisoned");
                            let mut expired = Vec::new();
                            for (device_id, info) in ramps.iter_mut() {
                                if info.deadline.is_some_and(|deadline| now > deadline) {
                                    info.deadline = None;
                                    expired.push(*device_id);
                                }
                            }
                            expired
                        };
                        for device_id in expired {
                            bus.send_automation_command(device_id, AutomationCommand::Stop);
                            debug!("Stopped ramp for {device_id}");
                        }
                    }
                }
            }
            debug!("Ramp scheduler stopped");
        });
    }

    /// Stop the ticker. In-progress ramps are left for the hub to time
    /// out; no further stop commands are emitted.
    pub fn stop(&self) {
        if let Some(tx) = self.shutdown.lock().expect("shutdown lock poisoned").take() {
            let _ = tx.send(true);
        }
    }
}
