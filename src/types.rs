// MIT License - Copyright (c) 2026 insteon-hub-bridge authors

//! Automation-side command and state types.
//!
//! These stand in for the host automation framework's command/state
//! objects at the bus boundary. The bridge never interprets item names;
//! resolving an item to a [`DeviceId`](crate::codec::DeviceId) is the
//! caller's responsibility.

use std::fmt;

/// A command arriving from the automation layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AutomationCommand {
    On,
    Off,
    /// Start a continuous brighten ramp.
    Up,
    /// Start a continuous dim ramp.
    Down,
    /// Stop an in-progress ramp.
    Stop,
    /// One step brighter. Coalesced into Up/Stop by the ramp scheduler.
    Increase,
    /// One step dimmer. Coalesced into Down/Stop by the ramp scheduler.
    Decrease,
    /// Absolute level, 0-100.
    Percent(u8),
    /// Unrecognized command text; dimmers attempt to parse it as a percent.
    Raw(String),
}

impl fmt::Display for AutomationCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::On => write!(f, "ON"),
            Self::Off => write!(f, "OFF"),
            Self::Up => write!(f, "UP"),
            Self::Down => write!(f, "DOWN"),
            Self::Stop => write!(f, "STOP"),
            Self::Increase => write!(f, "INCREASE"),
            Self::Decrease => write!(f, "DECREASE"),
            Self::Percent(p) => write!(f, "{p}"),
            Self::Raw(s) => write!(f, "{s}"),
        }
    }
}

/// A state update posted back to the automation layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AutomationState {
    On,
    Off,
    Open,
    Closed,
    /// Level 0-100.
    Percent(u8),
}

impl fmt::Display for AutomationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::On => write!(f, "ON"),
            Self::Off => write!(f, "OFF"),
            Self::Open => write!(f, "OPEN"),
            Self::Closed => write!(f, "CLOSED"),
            Self::Percent(p) => write!(f, "{p}"),
        }
    }
}
