use super::error::DecodeError;
use super::layout;
use super::reader::PingReader;

/// Sum of `bytes` truncated to 16 bits.
pub fn compute_checksum(bytes: &[u8]) -> u16 {
    bytes
        .iter()
        .fold(0u16, |acc, &byte| acc.wrapping_add(u16::from(byte)))
}

/// Checksum carried by a frame and the one computed over its header and payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChecksumCheck {
    pub expected: u16,
    pub computed: u16,
}

impl ChecksumCheck {
    pub fn is_valid(&self) -> bool {
        self.expected == self.computed
    }

    pub fn to_error(self) -> Option<DecodeError> {
        if self.is_valid() {
            None
        } else {
            Some(DecodeError::ChecksumMismatch {
                expected: self.expected,
                computed: self.computed,
            })
        }
    }
}

/// Verify the frame starting at `offset` whose payload is `payload_length` bytes.
///
/// The sum covers `[offset, offset + 8 + payload_length)`; the trailing
/// little-endian checksum field is not part of it.
///
/// # Errors
/// Returns `InsufficientBytes` if the buffer ends before the checksum field.
pub fn verify_checksum(
    buffer: &[u8],
    offset: usize,
    payload_length: usize,
) -> Result<ChecksumCheck, DecodeError> {
    let frame = buffer.get(offset..).unwrap_or_default();
    let summed_len = layout::HEADER_LEN + payload_length;
    let mut reader = PingReader::new(frame);
    reader.require_len(summed_len + layout::CHECKSUM_LEN)?;

    let summed = reader.read_slice(summed_len)?;
    let expected = reader.read_u16_le()?;
    Ok(ChecksumCheck {
        expected,
        computed: compute_checksum(summed),
    })
}
