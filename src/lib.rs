// MIT License - Copyright (c) 2026 insteon-hub-bridge authors
//
//! # insteon-hub-bridge
//!
//! Direct TCP/IP communication with the Insteon Hub's raw PLM port,
//! bridging Insteon dimmers, switches and sensors to automation
//! software. No external dependencies beyond tokio, thiserror, tracing,
//! and bitflags.
//!
//! ## Quick Start
//!
//! ```no_run
//! use insteon_hub_bridge::{AutomationCommand, DeviceType, HubBridge, HubConfig};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = HubConfig::builder()
//!         .host("192.168.0.100")
//!         .port(9761)
//!         .build();
//!
//!     let bridge = HubBridge::new(config);
//!     bridge.start();
//!
//!     let kitchen = "1A.2B.3C".parse()?;
//!     bridge.add_device(kitchen, DeviceType::Dimmer);
//!
//!     let mut updates = bridge.subscribe();
//!     tokio::spawn(async move {
//!         while let Ok(update) = updates.recv().await {
//!             println!("{} -> {}", update.device_id, update.state);
//!         }
//!     });
//!
//!     bridge.send_command(kitchen, AutomationCommand::Percent(75));
//!
//!     tokio::signal::ctrl_c().await?;
//!     bridge.stop();
//!     Ok(())
//! }
//! ```

pub mod bridge;
pub mod bus;
pub mod codec;
pub mod command;
pub mod config;
pub mod constants;
pub mod device;
pub mod error;
pub mod ramp;
pub mod transport;
pub mod types;
pub mod update;

// Re-exports for convenience
pub use bridge::{HubBridge, StateUpdate};
pub use bus::{BusEvent, BusListener, HubBus, ListenerId};
pub use codec::DeviceId;
pub use command::{HubCommand, HubCommandType};
pub use config::{HubConfig, HubConfigBuilder};
pub use device::{Device, DeviceManager, DeviceType};
pub use error::{HubError, Result};
pub use ramp::RampScheduler;
pub use types::{AutomationCommand, AutomationState};
pub use update::{HubUpdate, StdMsgFlags, StdUpdate};
