use super::error::DecodeError;

/// Cursor over a byte slice decoding little-endian primitives.
///
/// Every read either consumes exactly the bytes of the requested type or
/// fails with `InsufficientBytes` and leaves the cursor untouched.
pub struct PingReader<'a> {
    payload: &'a [u8],
    cursor: usize,
}

impl<'a> PingReader<'a> {
    pub fn new(payload: &'a [u8]) -> Self {
        Self { payload, cursor: 0 }
    }

    pub fn position(&self) -> usize {
        self.cursor
    }

    pub fn remaining(&self) -> usize {
        self.payload.len() - self.cursor
    }

    pub fn require_len(&self, needed: usize) -> Result<(), DecodeError> {
        if self.payload.len() < needed {
            return Err(DecodeError::InsufficientBytes {
                needed,
                actual: self.payload.len(),
            });
        }
        Ok(())
    }

    pub fn read_slice(&mut self, len: usize) -> Result<&'a [u8], DecodeError> {
        let end = self.cursor.checked_add(len).ok_or(DecodeError::InsufficientBytes {
            needed: usize::MAX,
            actual: self.payload.len(),
        })?;
        let bytes = self
            .payload
            .get(self.cursor..end)
            .ok_or(DecodeError::InsufficientBytes {
                needed: end,
                actual: self.payload.len(),
            })?;
        self.cursor = end;
        Ok(bytes)
    }

    fn read_array<const N: usize>(&mut self) -> Result<[u8; N], DecodeError> {
        let bytes = self.read_slice(N)?;
        let mut out = [0u8; N];
        out.copy_from_slice(bytes);
        Ok(out)
    }

    pub fn read_u8(&mut self) -> Result<u8, DecodeError> {
        Ok(self.read_array::<1>()?[0])
    }

    pub fn read_u16_le(&mut self) -> Result<u16, DecodeError> {
        self.read_array().map(u16::from_le_bytes)
    }

    pub fn read_u32_le(&mut self) -> Result<u32, DecodeError> {
        self.read_array().map(u32::from_le_bytes)
    }

    pub fn read_f32_le(&mut self) -> Result<f32, DecodeError> {
        self.read_array().map(f32::from_le_bytes)
    }

    /// Read `len` ASCII bytes and strip trailing NULs.
    ///
    /// Interior NULs are kept; any byte above 0x7f fails the read.
    pub fn read_ascii_string(&mut self, len: usize, field: &str) -> Result<String, DecodeError> {
        let start = self.cursor;
        let bytes = self.read_slice(len)?;
        if !bytes.is_ascii() {
            self.cursor = start;
            return Err(DecodeError::InvalidText {
                field: field.to_string(),
            });
        }
        let text: String = bytes.iter().map(|&b| b as char).collect();
        Ok(text.trim_end_matches('\0').to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::PingReader;
    use crate::ping::error::DecodeError;

    #[test]
    fn reads_little_endian_primitives() {
        let mut bytes = vec![0x7f];
        bytes.extend_from_slice(&0xbeefu16.to_le_bytes());
        bytes.extend_from_slice(&0xdead_beefu32.to_le_bytes());
        bytes.extend_from_slice(&1.5f32.to_le_bytes());
        let mut reader = PingReader::new(&bytes);

        assert_eq!(reader.read_u8().unwrap(), 0x7f);
        assert_eq!(reader.read_u16_le().unwrap(), 0xbeef);
        assert_eq!(reader.read_u32_le().unwrap(), 0xdead_beef);
        assert_eq!(reader.read_f32_le().unwrap(), 1.5);
        assert_eq!(reader.position(), 11);
        assert_eq!(reader.remaining(), 0);
    }

    #[test]
    fn short_read_reports_needed_and_keeps_cursor() {
        let bytes = [0x01, 0x02, 0x03];
        let mut reader = PingReader::new(&bytes);
        reader.read_u16_le().unwrap();
        let err = reader.read_u16_le().unwrap_err();
        assert_eq!(
            err,
            DecodeError::InsufficientBytes {
                needed: 4,
                actual: 3
            }
        );
        assert_eq!(reader.position(), 2);
        assert_eq!(reader.read_u8().unwrap(), 0x03);
    }

    #[test]
    fn ascii_string_strips_only_trailing_nuls() {
        let bytes = b"a\0b\0\0";
        let mut reader = PingReader::new(bytes);
        assert_eq!(reader.read_ascii_string(5, "text").unwrap(), "a\0b");
    }

    #[test]
    fn ascii_string_rejects_high_bytes() {
        let bytes = [b'o', 0xff];
        let mut reader = PingReader::new(&bytes);
        let err = reader.read_ascii_string(2, "text").unwrap_err();
        assert!(matches!(err, DecodeError::InvalidText { .. }));
        assert_eq!(reader.position(), 0);
    }

    #[test]
    fn require_len() {
        let bytes = [0u8; 4];
        let reader = PingReader::new(&bytes);
        assert!(reader.require_len(4).is_ok());
        assert!(matches!(
            reader.require_len(5),
            Err(DecodeError::InsufficientBytes { needed: 5, actual: 4 })
        ));
    }
}
