use std::io::Write;

use super::ExportError;
use crate::ping::packet::Packet;

/// Write the human-readable message log, one block per packet.
///
/// # Errors
/// Returns `ExportError::Io` when the writer fails.
pub fn write_message_log<W: Write>(mut writer: W, packets: &[Packet]) -> Result<(), ExportError> {
    writeln!(writer, "Message logs:")?;
    writeln!(writer)?;
    for packet in packets {
        writeln!(writer, "Packet at byte {}:", packet.offset)?;
        writeln!(writer, "  Header: {}", packet.header)?;
        match &packet.payload {
            Some(payload) => writeln!(writer, "  Payload: {payload}")?,
            None => writeln!(writer, "  Payload: None")?,
        }
        writeln!(writer, "  Checksum: {}", packet.checksum)?;
        writeln!(writer, "  Corrupted: {}", packet.corrupted)?;
        writeln!(writer)?;
    }
    writer.flush()?;
    Ok(())
}
