// MIT License - Copyright (c) 2026 insteon-hub-bridge authors
//
// Device behavior through the full bus path: automation commands in,
// protocol commands out; protocol updates in, state updates out. Also
// covers manager replacement semantics and ramp coalescing.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::time::{sleep, Duration};

use insteon_hub_bridge::bus::{BusEvent, BusListener, HubBus};
use insteon_hub_bridge::codec::DeviceId;
use insteon_hub_bridge::command::HubCommandType;
use insteon_hub_bridge::device::{Device, DeviceManager, DeviceType};
use insteon_hub_bridge::ramp::RampScheduler;
use insteon_hub_bridge::types::{AutomationCommand, AutomationState};
use insteon_hub_bridge::update::{HubUpdate, StdMsgFlags, StdUpdate};

/// `RUST_LOG`-controlled log output for debugging test failures.
fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

struct Recorder {
    tx: mpsc::UnboundedSender<BusEvent>,
}

impl Recorder {
    fn listen(bus: &HubBus) -> mpsc::UnboundedReceiver<BusEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        bus.add_listener(Arc::new(Recorder { tx }));
        rx
    }
}

impl BusListener for Recorder {
    fn on_event(&self, event: &BusEvent) {
        let _ = self.tx.send(event.clone());
    }
}

/// Receive events until the next HubCommand.
async fn next_hub_command(
    rx: &mut mpsc::UnboundedReceiver<BusEvent>,
) -> insteon_hub_bridge::command::HubCommand {
    loop {
        match rx.recv().await.expect("bus closed") {
            BusEvent::HubCommand { command, .. } => return command,
            _ => continue,
        }
    }
}

/// Receive events until the next AutomationUpdate.
async fn next_state(rx: &mut mpsc::UnboundedReceiver<BusEvent>) -> AutomationState {
    loop {
        match rx.recv().await.expect("bus closed") {
            BusEvent::AutomationUpdate { state, .. } => return state,
            _ => continue,
        }
    }
}

fn std_update(device_id: DeviceId, flags: u8, cmd1: u8, cmd2: u8) -> HubUpdate {
    HubUpdate::Std(StdUpdate {
        device_id,
        flags: StdMsgFlags::from_byte(flags),
        cmd1,
        cmd2,
    })
}

#[tokio::test]
async fn test_dimmer_percent_command_maps_to_level() {
    init_logging();
    let bus = HubBus::new();
    bus.start();
    let manager = DeviceManager::new(bus.clone());
    let id = DeviceId::new(0x1A2B3C).unwrap();
    manager.add(Device::new(id, DeviceType::Dimmer, bus.clone()));
    let mut rx = Recorder::listen(&bus);

    bus.send_automation_command(id, AutomationCommand::Percent(50));
    let cmd = next_hub_command(&mut rx).await;
    assert_eq!(cmd.command_type(), HubCommandType::On);
    assert_eq!(cmd.cmd2(), 128);

    bus.send_automation_command(id, AutomationCommand::Percent(49));
    let cmd = next_hub_command(&mut rx).await;
    assert_eq!(cmd.cmd2(), 125);

    // 0% becomes an off command, not on-with-level-0
    bus.send_automation_command(id, AutomationCommand::Off);
    let cmd = next_hub_command(&mut rx).await;
    assert_eq!(cmd.command_type(), HubCommandType::Off);

    bus.stop();
}

#[tokio::test]
async fn test_dimmer_status_response_maps_to_state() {
    init_logging();
    let bus = HubBus::new();
    bus.start();
    let manager = DeviceManager::new(bus.clone());
    let id = DeviceId::new(0x1A2B3C).unwrap();
    manager.add(Device::new(id, DeviceType::Dimmer, bus.clone()));
    let mut rx = Recorder::listen(&bus);

    // ack with level 127 truncates to 49%
    bus.post_hub_update(id, std_update(id, 0x20, 0x19, 127));
    assert_eq!(next_state(&mut rx).await, AutomationState::Percent(49));

    // 254 reads as fully on, not 99%
    bus.post_hub_update(id, std_update(id, 0x20, 0x19, 254));
    assert_eq!(next_state(&mut rx).await, AutomationState::On);

    bus.post_hub_update(id, std_update(id, 0x20, 0x19, 0));
    assert_eq!(next_state(&mut rx).await, AutomationState::Off);

    bus.stop();
}

#[tokio::test]
async fn test_updates_for_other_devices_are_ignored() {
    init_logging();
    let bus = HubBus::new();
    bus.start();
    let manager = DeviceManager::new(bus.clone());
    let id = DeviceId::new(1).unwrap();
    let other = DeviceId::new(2).unwrap();
    manager.add(Device::new(id, DeviceType::Switch, bus.clone()));
    let mut rx = Recorder::listen(&bus);

    bus.post_hub_update(other, std_update(other, 0x20, 0x19, 0xFF));
    bus.post_hub_update(id, std_update(id, 0x20, 0x19, 0xFF));

    // only the update addressed to the registered switch produces state
    let state = next_state(&mut rx).await;
    assert_eq!(state, AutomationState::On);
    sleep(Duration::from_millis(50)).await;
    assert!(rx.try_recv().is_err());

    bus.stop();
}

#[tokio::test]
async fn test_manager_replace_detaches_previous_device() {
    init_logging();
    let bus = HubBus::new();
    bus.start();
    let manager = DeviceManager::new(bus.clone());
    let id = DeviceId::new(0x111111).unwrap();

    manager.add(Device::new(id, DeviceType::Dimmer, bus.clone()));
    // same ID re-registered as a switch; the dimmer must stop listening
    manager.add(Device::new(id, DeviceType::Switch, bus.clone()));
    let mut rx = Recorder::listen(&bus);

    bus.send_automation_command(id, AutomationCommand::On);

    // exactly one protocol command, and it is the switch's fast-on
    let cmd = next_hub_command(&mut rx).await;
    assert_eq!(cmd.command_type(), HubCommandType::FastOn);
    assert_eq!(cmd.cmd2(), 0xFF);
    sleep(Duration::from_millis(50)).await;
    assert!(rx.try_recv().is_err());

    bus.stop();
}

#[tokio::test]
async fn test_open_close_sensor_states() {
    init_logging();
    let bus = HubBus::new();
    bus.start();
    let manager = DeviceManager::new(bus.clone());
    let id = DeviceId::new(0x222222).unwrap();
    manager.add(Device::new(id, DeviceType::OpenCloseSensor, bus.clone()));
    let mut rx = Recorder::listen(&bus);

    bus.post_hub_update(id, std_update(id, 0x80, 0x11, 0x01));
    assert_eq!(next_state(&mut rx).await, AutomationState::Open);
    bus.post_hub_update(id, std_update(id, 0x80, 0x13, 0x00));
    assert_eq!(next_state(&mut rx).await, AutomationState::Closed);

    bus.stop();
}

#[tokio::test(start_paused = true)]
async fn test_ramp_coalesces_increase_stream() {
    init_logging();
    let bus = HubBus::new();
    bus.start();
    let scheduler = RampScheduler::new(bus.clone());
    scheduler.start();
    let mut rx = Recorder::listen(&bus);
    let id = DeviceId::new(0x333333).unwrap();

    // a held button: five increase steps 100ms apart
    for _ in 0..5 {
        scheduler.increase(id);
        sleep(Duration::from_millis(100)).await;
    }

    // exactly one UP so far, no STOP while steps keep arriving
    let BusEvent::AutomationCommand { command, .. } = rx.recv().await.unwrap() else {
        panic!("unexpected event kind");
    };
    assert_eq!(command, AutomationCommand::Up);
    assert!(rx.try_recv().is_err());

    // button released: the debounce window lapses and a STOP is emitted
    sleep(Duration::from_millis(1000)).await;
    let BusEvent::AutomationCommand { command, .. } = rx.recv().await.unwrap() else {
        panic!("unexpected event kind");
    };
    assert_eq!(command, AutomationCommand::Stop);
    assert!(rx.try_recv().is_err());

    // a fresh hold starts a new ramp
    scheduler.decrease(id);
    let BusEvent::AutomationCommand { command, .. } = rx.recv().await.unwrap() else {
        panic!("unexpected event kind");
    };
    assert_eq!(command, AutomationCommand::Down);

    scheduler.stop();
    bus.stop();
}
