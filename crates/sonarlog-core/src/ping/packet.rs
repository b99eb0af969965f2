use serde::Serialize;

use super::checksum::{ChecksumCheck, verify_checksum};
use super::error::DecodeError;
use super::header::{Header, decode_header};
use super::layout;
use super::payload::{Payload, decode_payload};
use super::registry::MessageRegistry;

/// One frame found in a capture buffer.
///
/// `payload` is `None` exactly when `corrupted` is true.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Packet {
    /// Byte offset of the marker in the source buffer.
    pub offset: usize,
    pub header: Header,
    pub checksum: u16,
    pub corrupted: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload: Option<Payload>,
    #[serde(skip)]
    computed_checksum: u16,
}

impl Packet {
    pub fn message_id(&self) -> u16 {
        self.header.message_id
    }

    /// Checksum mismatch for corrupted packets.
    pub fn checksum_error(&self) -> Option<DecodeError> {
        ChecksumCheck {
            expected: self.checksum,
            computed: self.computed_checksum,
        }
        .to_error()
    }
}

#[derive(Clone, Copy)]
enum UnknownPolicy {
    Reject,
    Generic,
}

/// Decode the frame whose marker sits at `offset` in `buffer`.
///
/// This is the scanner's per-candidate step. The header is validated, then
/// the id must be registered, then the whole frame must fit in the buffer.
/// A checksum mismatch is not an error: the packet comes back with
/// `corrupted` set and no payload.
///
/// # Errors
/// Returns `UnknownMessageType` for unregistered ids, `InsufficientBytes`
/// when the frame runs past the end of the buffer, and any header or
/// payload layout error.
pub fn decode_packet_at(
    buffer: &[u8],
    offset: usize,
    registry: &MessageRegistry,
) -> Result<Packet, DecodeError> {
    decode_with_policy(buffer, offset, registry, UnknownPolicy::Reject)
}

/// Decode a single frame starting at the beginning of `frame`.
///
/// Unlike the scanner path, unregistered ids are accepted and decode to an
/// unknown payload carrying only length and id. Bytes after the checksum are
/// ignored.
///
/// # Examples
/// ```
/// use sonarlog_core::{decode_frame, default_registry};
///
/// let mut frame = vec![0x42, 0x52, 0x04, 0x00, 0x0a, 0x00, 0x01, 0x00];
/// frame.extend_from_slice(b"a\0\0\0");
/// let sum: u16 = frame.iter().map(|&b| u16::from(b)).sum();
/// frame.extend_from_slice(&sum.to_le_bytes());
///
/// let packet = decode_frame(&frame, default_registry())?;
/// assert!(!packet.corrupted);
/// assert_eq!(packet.payload.unwrap().message_type, "JSON header");
/// # Ok::<(), sonarlog_core::DecodeError>(())
/// ```
///
/// # Errors
/// Returns header, bounds and payload layout errors.
pub fn decode_frame(frame: &[u8], registry: &MessageRegistry) -> Result<Packet, DecodeError> {
    decode_with_policy(frame, 0, registry, UnknownPolicy::Generic)
}

fn decode_with_policy(
    buffer: &[u8],
    offset: usize,
    registry: &MessageRegistry,
    policy: UnknownPolicy,
) -> Result<Packet, DecodeError> {
    let window = buffer.get(offset..).unwrap_or_default();
    let header = decode_header(window)?;

    if matches!(policy, UnknownPolicy::Reject) && !registry.contains(header.message_id) {
        return Err(DecodeError::UnknownMessageType {
            id: header.message_id,
        });
    }

    if window.len() < header.frame_len() {
        return Err(DecodeError::InsufficientBytes {
            needed: header.frame_len(),
            actual: window.len(),
        });
    }

    let payload_length = header.payload_length as usize;
    let check = verify_checksum(window, 0, payload_length)?;
    let corrupted = !check.is_valid();
    let payload = if corrupted {
        None
    } else {
        let start = layout::PAYLOAD_OFFSET;
        let bytes = &window[start..start + payload_length];
        Some(decode_payload(registry, header.message_id, bytes)?)
    };

    Ok(Packet {
        offset,
        header,
        checksum: check.expected,
        corrupted,
        payload,
        computed_checksum: check.computed,
    })
}
