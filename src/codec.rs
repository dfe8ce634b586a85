// MIT License - Copyright (c) 2026 insteon-hub-bridge authors

//! Device ID encoding and hex formatting shared by the command and
//! update codecs. Flag-byte parsing lives with
//! [`StdMsgFlags`](crate::update::StdMsgFlags).

use std::fmt;
use std::str::FromStr;

use crate::error::HubError;

/// 3-byte Insteon device address.
///
/// The canonical text form is three 2-hex-digit groups separated by dots
/// (e.g. `4A.3C.01`), case-insensitive on input, uppercase on output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DeviceId(u32);

impl DeviceId {
    /// Largest valid raw value (24 bits).
    pub const MAX: u32 = 0x00FF_FFFF;

    /// Construct from a raw integer, rejecting anything above 24 bits.
    pub fn new(raw: u32) -> crate::error::Result<Self> {
        if raw > Self::MAX {
            return Err(HubError::DeviceIdOutOfRange {
                id: raw,
                max: Self::MAX,
            });
        }
        Ok(Self(raw))
    }

    /// Construct from the 3 wire bytes, MSB first.
    pub fn from_bytes(bytes: [u8; 3]) -> Self {
        Self(u32::from(bytes[0]) << 16 | u32::from(bytes[1]) << 8 | u32::from(bytes[2]))
    }

    /// The 3 wire bytes, MSB first.
    pub fn to_bytes(self) -> [u8; 3] {
        [
            (self.0 >> 16) as u8,
            (self.0 >> 8) as u8,
            self.0 as u8,
        ]
    }

    pub fn as_u32(self) -> u32 {
        self.0
    }
}

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c] = self.to_bytes();
        write!(f, "{a:02X}.{b:02X}.{c:02X}")
    }
}

impl FromStr for DeviceId {
    type Err = HubError;

    /// Parse `XX.XX.XX` (dots optional, case-insensitive).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hex: String = s.chars().filter(|c| *c != '.').collect();
        if hex.len() != 6 {
            return Err(HubError::InvalidDeviceId {
                input: s.to_string(),
            });
        }
        let raw = u32::from_str_radix(&hex, 16).map_err(|_| HubError::InvalidDeviceId {
            input: s.to_string(),
        })?;
        Ok(Self(raw))
    }
}

/// Format a byte buffer as space-separated uppercase hex, for log output.
pub fn bytes_to_hex(buf: &[u8]) -> String {
    let mut out = String::with_capacity(buf.len() * 3);
    for b in buf {
        out.push_str(&format!("{b:02X} "));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_device_id_text_roundtrip() {
        for raw in [0u32, 1, 0x4A3C01, 0xABCDEF, DeviceId::MAX] {
            let id = DeviceId::new(raw).unwrap();
            let text = id.to_string();
            assert_eq!(text.parse::<DeviceId>().unwrap(), id, "text: {text}");
        }
    }

    #[test]
    fn test_device_id_display_format() {
        let id = DeviceId::new(0x4A3C01).unwrap();
        assert_eq!(id.to_string(), "4A.3C.01");
        // every output matches ^[0-9A-F]{2}\.[0-9A-F]{2}\.[0-9A-F]{2}$
        for raw in (0..=DeviceId::MAX).step_by(0x1_0001) {
            let text = DeviceId::new(raw).unwrap().to_string();
            let bytes = text.as_bytes();
            assert_eq!(bytes.len(), 8);
            assert_eq!(bytes[2], b'.');
            assert_eq!(bytes[5], b'.');
            for (i, b) in bytes.iter().enumerate() {
                if i != 2 && i != 5 {
                    assert!(b.is_ascii_digit() || (b'A'..=b'F').contains(b));
                }
            }
        }
    }

    #[test]
    fn test_device_id_parse_forms() {
        assert_eq!(
            "4a.3c.01".parse::<DeviceId>().unwrap(),
            DeviceId::new(0x4A3C01).unwrap()
        );
        assert_eq!(
            "4A3C01".parse::<DeviceId>().unwrap(),
            DeviceId::new(0x4A3C01).unwrap()
        );
        assert!("4A.3C".parse::<DeviceId>().is_err());
        assert!("4A.3C.0G".parse::<DeviceId>().is_err());
        assert!("".parse::<DeviceId>().is_err());
    }

    #[test]
    fn test_device_id_range() {
        assert!(DeviceId::new(DeviceId::MAX).is_ok());
        assert!(DeviceId::new(DeviceId::MAX + 1).is_err());
    }

    #[test]
    fn test_device_id_byte_roundtrip() {
        let id = DeviceId::new(0x0A0B0C).unwrap();
        assert_eq!(id.to_bytes(), [0x0A, 0x0B, 0x0C]);
        assert_eq!(DeviceId::from_bytes([0x0A, 0x0B, 0x0C]), id);
    }

    #[test]
    fn test_bytes_to_hex() {
        assert_eq!(bytes_to_hex(&[0x02, 0x62, 0xFF]), "02 62 FF ");
        assert_eq!(bytes_to_hex(&[]), "");
    }
}
