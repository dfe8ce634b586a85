// MIT License - Copyright (c) 2026 insteon-hub-bridge authors

//! The event bus all components communicate over.
//!
//! The flow of communication: the automation layer resolves item names to
//! device IDs and publishes automation commands to the bus. Each
//! [`Device`](crate::device::Device) listens for automation commands with
//! its own device ID, translates them into [`HubCommand`]s and publishes
//! those back to the bus. The proxy listens for hub commands, serializes
//! them and sends them over the wire; it also parses messages from the hub
//! into [`HubUpdate`]s and publishes them. Devices translate hub updates
//! for their ID into [`AutomationState`] updates, which the bridge
//! republishes to the automation layer.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use tokio::sync::mpsc;
use tracing::{debug, error};

use crate::codec::DeviceId;
use crate::command::HubCommand;
use crate::types::{AutomationCommand, AutomationState};
use crate::update::HubUpdate;

/// One event flowing over the bus.
///
/// Listeners receive every event and pattern-match on the kinds they care
/// about; most listeners handle one or two variants and ignore the rest.
#[derive(Debug, Clone)]
pub enum BusEvent {
    /// Command from the automation layer, to be translated by a device.
    AutomationCommand {
        device_id: DeviceId,
        command: AutomationCommand,
    },
    /// State update produced by a device, bound for the automation layer.
    AutomationUpdate {
        device_id: DeviceId,
        state: AutomationState,
    },
    /// Protocol command produced by a device, bound for the hub.
    HubCommand {
        device_id: DeviceId,
        command: HubCommand,
    },
    /// Protocol update received from the hub, to be translated by a device.
    HubUpdate {
        device_id: DeviceId,
        update: HubUpdate,
    },
}

impl BusEvent {
    pub fn device_id(&self) -> DeviceId {
        match self {
            Self::AutomationCommand { device_id, .. }
            | Self::AutomationUpdate { device_id, .. }
            | Self::HubCommand { device_id, .. }
            | Self::HubUpdate { device_id, .. } => *device_id,
        }
    }
}

/// Callback object registered on the bus.
///
/// Invoked by the single dispatcher task, one event at a time, in listener
/// registration order. Adding or removing listeners from within the
/// callback is allowed and takes effect before the next event.
pub trait BusListener: Send + Sync {
    fn on_event(&self, event: &BusEvent);
}

/// Handle returned by [`HubBus::add_listener`], used to unregister.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

enum QueueItem {
    Event(BusEvent),
    /// Retires every dispatcher whose epoch is at or below the carried
    /// value; newer dispatchers ignore it.
    Shutdown(u64),
}

/// Listener membership with staged mutations. Adds and removes are
/// applied by the dispatcher between events, never during a dispatch.
#[derive(Default)]
struct ListenerSet {
    active: Vec<(ListenerId, Arc<dyn BusListener>)>,
    to_add: Vec<(ListenerId, Arc<dyn BusListener>)>,
    to_remove: Vec<ListenerId>,
}

impl ListenerSet {
    fn apply_staged(&mut self) {
        self.active.append(&mut self.to_add);
        if !self.to_remove.is_empty() {
            let remove = std::mem::take(&mut self.to_remove);
            self.active.retain(|(id, _)| !remove.contains(id));
        }
    }
}

struct BusInner {
    tx: mpsc::UnboundedSender<QueueItem>,
    rx: tokio::sync::Mutex<mpsc::UnboundedReceiver<QueueItem>>,
    listeners: Mutex<ListenerSet>,
    next_listener_id: AtomicU64,
    running: AtomicBool,
    // bumped on every start; each dispatcher carries the epoch it was
    // started with
    generation: AtomicU64,
}

/// Single-consumer, multi-producer asynchronous event bus.
///
/// `publish` enqueues without blocking; a dedicated dispatcher task
/// delivers events strictly in FIFO order to every registered listener.
/// Cloning the bus clones a cheap handle to the same queue.
#[derive(Clone)]
pub struct HubBus {
    inner: Arc<BusInner>,
}

impl Default for HubBus {
    fn default() -> Self {
        Self::new()
    }
}

impl HubBus {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            inner: Arc::new(BusInner {
                tx,
                rx: tokio::sync::Mutex::new(rx),
                listeners: Mutex::new(ListenerSet::default()),
                next_listener_id: AtomicU64::new(0),
                running: AtomicBool::new(false),
                generation: AtomicU64::new(0),
            }),
        }
    }

    /// Spawn the dispatcher task. Must be called from within a tokio
    /// runtime. Any dispatcher from an earlier start is retired first;
    /// the new dispatcher waits for it to release the queue, so events
    /// published after a stop/start cycle are still delivered.
    pub fn start(&self) {
        let epoch = self.inner.generation.fetch_add(1, Ordering::AcqRel) + 1;
        self.inner.running.store(true, Ordering::Release);
        // retire any predecessor still draining the queue
        let _ = self.inner.tx.send(QueueItem::Shutdown(epoch - 1));
        let inner = self.inner.clone();
        tokio::spawn(async move {
            // the lock is held for the dispatcher's lifetime; blocks
            // here until the retired predecessor releases it
            let mut rx = inner.rx.lock().await;
            debug!("Bus started");
            loop {
                let Some(item) = rx.recv().await else { break };
                match item {
                    QueueItem::Shutdown(retired) => {
                        if retired >= epoch {
                            break;
                        }
                    }
                    QueueItem::Event(event) => {
                        if !inner.running.load(Ordering::Acquire) {
                            break;
                        }
                        inner.dispatch(&event);
                    }
                }
            }
            debug!("Bus stopped");
        });
    }

    /// Stop the dispatcher: clears the running flag and enqueues a
    /// shutdown sentinel for the current epoch. Events already dequeued
    /// may still be delivered.
    pub fn stop(&self) {
        self.inner.running.store(false, Ordering::Release);
        let epoch = self.inner.generation.load(Ordering::Acquire);
        let _ = self.inner.tx.send(QueueItem::Shutdown(epoch));
    }

    /// Enqueue an event for dispatch. Never blocks the caller.
    pub fn publish(&self, event: BusEvent) {
        if self.inner.tx.send(QueueItem::Event(event)).is_err() {
            error!("Bus queue closed, dropping event");
        }
    }

    pub fn send_automation_command(&self, device_id: DeviceId, command: AutomationCommand) {
        self.publish(BusEvent::AutomationCommand { device_id, command });
    }

    pub fn post_automation_update(&self, device_id: DeviceId, state: AutomationState) {
        self.publish(BusEvent::AutomationUpdate { device_id, state });
    }

    pub fn send_hub_command(&self, device_id: DeviceId, command: HubCommand) {
        self.publish(BusEvent::HubCommand { device_id, command });
    }

    pub fn post_hub_update(&self, device_id: DeviceId, update: HubUpdate) {
        self.publish(BusEvent::HubUpdate { device_id, update });
    }

    /// Register a listener. Takes effect before the next event is
    /// dispatched; safe to call from within a listener callback.
    pub fn add_listener(&self, listener: Arc<dyn BusListener>) -> ListenerId {
        let id = ListenerId(self.inner.next_listener_id.fetch_add(1, Ordering::Relaxed));
        let mut set = self.inner.listeners.lock().expect("listener set poisoned");
        set.to_add.push((id, listener));
        id
    }

    /// Unregister a listener. Takes effect before the next event is
    /// dispatched; safe to call from within a listener callback.
    pub fn remove_listener(&self, id: ListenerId) {
        let mut set = self.inner.listeners.lock().expect("listener set poisoned");
        set.to_remove.push(id);
    }
}

impl BusInner {
    fn dispatch(&self, event: &BusEvent) {
        // apply staged mutations and snapshot outside the lock so
        // callbacks can re-enter add_listener/remove_listener
        let snapshot: Vec<Arc<dyn BusListener>> = {
            let mut set = self.listeners.lock().expect("listener set poisoned");
            set.apply_staged();
            set.active.iter().map(|(_, l)| l.clone()).collect()
        };
        for listener in snapshot {
            if catch_unwind(AssertUnwindSafe(|| listener.on_event(event))).is_err() {
                error!(device_id = %event.device_id(), "Listener panicked while handling bus event");
            }
        }
    }
}
