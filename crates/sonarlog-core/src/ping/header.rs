use std::fmt;

use serde::Serialize;

use super::decoder::{Value, decode_layout};
use super::error::DecodeError;
use super::layout;
use super::reader::PingReader;

/// Fixed 8-byte frame header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Header {
    #[serde(skip)]
    pub marker: [u8; 2],
    pub payload_length: u16,
    pub message_id: u16,
    pub sender_id: u8,
    pub receiver_id: u8,
}

impl Header {
    /// Bytes from the marker through the checksum.
    pub fn frame_len(&self) -> usize {
        layout::FRAME_OVERHEAD + self.payload_length as usize
    }
}

impl fmt::Display for Header {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Header(marker='{}', payload_length={}, message_id={}, sender_id={}, receiver_id={})",
            self.marker.escape_ascii(),
            self.payload_length,
            self.message_id,
            self.sender_id,
            self.receiver_id
        )
    }
}

/// Decode and validate the header at the start of `bytes`.
///
/// Only the first [`layout::HEADER_LEN`] bytes are read.
///
/// # Examples
/// ```
/// use sonarlog_core::decode_header;
///
/// let header = decode_header(&[0x42, 0x52, 0x04, 0x00, 0x0a, 0x00, 0x01, 0x00])?;
/// assert_eq!(header.payload_length, 4);
/// assert_eq!(header.message_id, 10);
/// # Ok::<(), sonarlog_core::DecodeError>(())
/// ```
///
/// # Errors
/// Returns `InsufficientBytes` for fewer than 8 bytes and `BadSignature`
/// when the marker is not `BR`.
pub fn decode_header(bytes: &[u8]) -> Result<Header, DecodeError> {
    let reader = PingReader::new(bytes);
    reader.require_len(layout::HEADER_LEN)?;

    let mut record = decode_layout(&layout::HEADER_LAYOUT, &bytes[..layout::HEADER_LEN])?;
    let marker_bytes = record.take_as("marker", "u8[2]", Value::into_u8_array)?;
    let marker = [marker_bytes[0], marker_bytes[1]];
    if &marker != layout::MARKER {
        return Err(DecodeError::BadSignature { actual: marker });
    }

    Ok(Header {
        marker,
        payload_length: record.take_as("payload_length", "u16", Value::into_u16)?,
        message_id: record.take_as("message_id", "u16", Value::into_u16)?,
        sender_id: record.take_as("sender_id", "u8", Value::into_u8)?,
        receiver_id: record.take_as("receiver_id", "u8", Value::into_u8)?,
    })
}
