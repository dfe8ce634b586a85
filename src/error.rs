// MIT License - Copyright (c) 2026 insteon-hub-bridge authors

/// All errors that can occur in the insteon-hub-bridge library.
#[derive(Debug, thiserror::Error)]
pub enum HubError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid device ID '{input}'")]
    InvalidDeviceId { input: String },

    #[error("Device ID {id:#08x} out of range (max {max:#08x})")]
    DeviceIdOutOfRange { id: u32, max: u32 },

    #[error("Not connected to hub")]
    Disconnected,

    #[error("Bus queue closed")]
    BusClosed,
}

pub type Result<T> = std::result::Result<T, HubError>;
