// MIT License - Copyright (c) 2026 insteon-hub-bridge authors

//! Frame reconstruction from the hub's byte stream.

use tokio::io::{AsyncRead, AsyncReadExt};
use tracing::{debug, info};

use crate::constants::{frame_len, ACK, SND_STD_OR_EXT_MSG, STX};
use crate::update::StdMsgFlags;

/// Read one complete frame from the stream.
///
/// Scans byte-by-byte for the start marker, logging and discarding any
/// noise seen before it, then reads the opcode and fills the frame to the
/// fixed length the opcode dictates. Returns `Ok(None)` for an opcode
/// absent from the length table: the partial frame is dropped and the
/// caller resynchronizes by reading again. Any I/O error, including end
/// of stream, is fatal to the connection and returned as `Err`.
pub async fn read_frame<R>(reader: &mut R) -> std::io::Result<Option<Vec<u8>>>
where
    R: AsyncRead + Unpin,
{
    // scan to start of message
    loop {
        let b = reader.read_u8().await?;
        if b == STX {
            break;
        }
        info!("Ignoring non-start byte: {b:#04x}");
    }

    let opcode = reader.read_u8().await?;
    let Some(len) = frame_len(opcode) else {
        info!("Received unknown opcode {opcode:#04x}, dropping frame");
        return Ok(None);
    };

    let mut frame = vec![0u8; len];
    frame[0] = STX;
    frame[1] = opcode;
    reader.read_exact(&mut frame[2..]).await?;

    if opcode == SND_STD_OR_EXT_MSG {
        let flags = StdMsgFlags::from_byte(frame[5]);
        if flags.is_extended() {
            // extended message: 14 more user-data bytes follow
            let mut extended = [0u8; 14];
            reader.read_exact(&mut extended).await?;
            frame.extend_from_slice(&extended);
        } else if frame[8] == STX {
            // Hub firmware quirk: some firmwares put 0x02 in the ack slot
            // of a 0x62 echo and follow it with 8 filler bytes. Swallow
            // the filler and treat the echo as acknowledged. Root cause
            // undocumented; do not generalize to other opcodes.
            let mut filler = [0u8; 8];
            reader.read_exact(&mut filler).await?;
            frame[8] = ACK;
        }
    }

    debug!(
        "Received message from hub: {}",
        crate::codec::bytes_to_hex(&frame)
    );

    Ok(Some(frame))
}
