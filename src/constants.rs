// MIT License - Copyright (c) 2026 insteon-hub-bridge authors

//! Wire protocol constants for the Insteon Hub serial-over-TCP API.

/// Start-of-message marker. Every frame begins with this byte.
pub const STX: u8 = 0x02;
/// Positive acknowledgement appended to echoed send frames.
pub const ACK: u8 = 0x06;
/// Negative acknowledgement.
pub const NAK: u8 = 0x15;

/// Send opcode: standard or extended Insteon message.
pub const SND_STD_OR_EXT_MSG: u8 = 0x62;

/// Receive opcode: Insteon standard message. Most device status
/// messages use this code.
pub const REC_STD_MSG: u8 = 0x50;
/// Receive opcode: Insteon extended message.
pub const REC_EXT_MSG: u8 = 0x51;

/// Fixed frame length per opcode, including the STX and opcode bytes.
///
/// Extended 0x62 echoes grow by 14 bytes beyond the listed base length;
/// that is handled by the framing layer after inspecting the flag byte.
/// Returns `None` for an opcode absent from the table, which is a
/// recoverable parse error (the frame is dropped and the stream
/// resynchronized at the next start marker).
pub fn frame_len(opcode: u8) -> Option<usize> {
    let len = match opcode {
        REC_STD_MSG => 11,
        REC_EXT_MSG => 25,
        0x52 => 4,  // X10 received
        0x53 => 10, // all-linking completed
        0x54 => 3,  // button event report
        0x55 => 2,  // user reset detected
        0x56 => 7,  // all-link cleanup failure report
        0x57 => 10, // all-link record response
        0x58 => 3,  // all-link cleanup status report
        0x60 => 9,  // get IM info
        0x61 => 6,  // send all-link command
        SND_STD_OR_EXT_MSG => 9,
        0x63 => 5,  // send X10
        0x64 => 5,  // start all-linking
        0x65 => 3,  // cancel all-linking
        0x66 => 6,  // set host device category
        0x67 => 3,  // reset the IM
        0x68 => 4,  // set Insteon ACK message byte
        0x69 => 3,  // get first all-link record
        0x6A => 3,  // get next all-link record
        0x6B => 4,  // set IM configuration
        0x6C => 3,  // get all-link record for sender
        0x6D => 3,  // LED on
        0x6E => 3,  // LED off
        0x6F => 12, // manage all-link record
        0x70 => 4,  // set Insteon NAK message byte
        0x71 => 5,  // set Insteon ACK message two bytes
        0x72 => 3,  // RF sleep
        0x73 => 6,  // get IM configuration
        _ => return None,
    };
    Some(len)
}

/// Standard-message flag byte bit positions.
pub const STD_FLAG_BIT_EXT: u8 = 4;
pub const STD_FLAG_BIT_ACK: u8 = 5;
pub const STD_FLAG_BIT_GROUP: u8 = 6;
pub const STD_FLAG_BIT_BC_OR_NAK: u8 = 7;

/// Command-1 bytes seen in standard messages.
pub const CMD1_ON: u8 = 0x11;
pub const CMD1_ON_FAST: u8 = 0x12;
pub const CMD1_OFF: u8 = 0x13;
pub const CMD1_OFF_FAST: u8 = 0x14;
pub const CMD1_BRT: u8 = 0x15;
pub const CMD1_DIM: u8 = 0x16;
pub const CMD1_START_DIM_BRT: u8 = 0x17;
pub const CMD1_STOP_DIM_BRT: u8 = 0x18;
pub const CMD1_STATUS_REQUEST: u8 = 0x19;
