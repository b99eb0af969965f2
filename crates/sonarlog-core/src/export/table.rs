use std::collections::BTreeSet;
use std::io::Write;

use csv::Writer;
use serde_json::{Map, Value};

use super::ExportError;
use crate::ping::layout::MONO_PROFILE_ID;
use crate::ping::packet::Packet;

pub const PACKET_COLUMNS: [&str; 6] = [
    "Packet Position",
    "Message ID",
    "Message Type",
    "Sender ID",
    "Receiver ID",
    "Payload Data",
];

/// Write one CSV row per packet, payload serialized as a JSON object.
///
/// Packets without a payload get empty `Message Type` and `Payload Data`
/// cells.
///
/// # Errors
/// Returns `ExportError` on write or serialization failure.
pub fn write_packets_csv<W: Write>(writer: W, packets: &[Packet]) -> Result<(), ExportError> {
    let mut csv = Writer::from_writer(writer);
    csv.write_record(PACKET_COLUMNS)?;
    for packet in packets {
        let (message_type, payload_data) = match &packet.payload {
            Some(payload) => (
                payload.message_type.to_string(),
                serde_json::to_string(payload)?,
            ),
            None => (String::new(), String::new()),
        };
        csv.write_record([
            packet.offset.to_string(),
            packet.header.message_id.to_string(),
            message_type,
            packet.header.sender_id.to_string(),
            packet.header.receiver_id.to_string(),
            payload_data,
        ])?;
    }
    csv.flush()?;
    Ok(())
}

/// Write Mono Profile payloads from `sender_id` as flat CSV rows.
///
/// Columns are the union of payload keys in alphabetical order. Arrays are
/// written as JSON text and missing keys as empty cells. Returns the number
/// of rows written; nothing at all is written when no packet matches.
///
/// # Errors
/// Returns `ExportError` on write or serialization failure.
pub fn write_profiles_csv<W: Write>(
    writer: W,
    packets: &[Packet],
    sender_id: u8,
) -> Result<usize, ExportError> {
    let mut rows: Vec<Map<String, Value>> = Vec::new();
    for packet in packets {
        if packet.header.message_id != MONO_PROFILE_ID || packet.header.sender_id != sender_id {
            continue;
        }
        let Some(payload) = &packet.payload else {
            continue;
        };
        if let Value::Object(map) = serde_json::to_value(payload)? {
            rows.push(map);
        }
    }
    if rows.is_empty() {
        return Ok(0);
    }

    let columns: BTreeSet<&str> = rows
        .iter()
        .flat_map(|row| row.keys().map(String::as_str))
        .collect();

    let mut csv = Writer::from_writer(writer);
    csv.write_record(&columns)?;
    for row in &rows {
        let cells = columns
            .iter()
            .map(|column| row.get(*column).map(render_cell).unwrap_or_default());
        csv.write_record(cells)?;
    }
    csv.flush()?;
    Ok(rows.len())
}

fn render_cell(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{MessageRegistry, ScanOptions, scan_buffer};
    use crate::ping::checksum::compute_checksum;
    use crate::ping::layout;

    fn frame(message_id: u16, sender: u8, payload: &[u8]) -> Vec<u8> {
        let mut bytes = layout::MARKER.to_vec();
        bytes.extend_from_slice(&(payload.len() as u16).to_le_bytes());
        bytes.extend_from_slice(&message_id.to_le_bytes());
        bytes.extend_from_slice(&[sender, 0]);
        bytes.extend_from_slice(payload);
        let sum = compute_checksum(&bytes);
        bytes.extend_from_slice(&sum.to_le_bytes());
        bytes
    }

    fn profile(ping_number: u32, results: &[u16]) -> Vec<u8> {
        let mut payload = vec![0u8; layout::MONO_PROFILE_FIXED_LEN];
        payload[..4].copy_from_slice(&ping_number.to_le_bytes());
        for v in results {
            payload.extend_from_slice(&v.to_le_bytes());
        }
        payload
    }

    fn packets(data: &[u8]) -> Vec<Packet> {
        scan_buffer(data, &MessageRegistry::builtin(), &ScanOptions::default()).packets
    }

    #[test]
    fn packet_rows_carry_payload_json() {
        let data = frame(layout::JSON_HEADER_ID, 1, b"ok\0\0");
        let mut out = Vec::new();
        write_packets_csv(&mut out, &packets(&data)).unwrap();
        let text = String::from_utf8(out).unwrap();
        let mut lines = text.lines();
        assert_eq!(
            lines.next(),
            Some("Packet Position,Message ID,Message Type,Sender ID,Receiver ID,Payload Data")
        );
        let row = lines.next().unwrap();
        assert!(row.starts_with("0,10,JSON header,1,0,"));
        assert!(row.contains(r#"""JSON_message"":""ok"""#));
        assert!(lines.next().is_none());
    }

    #[test]
    fn profile_rows_filter_by_sender() {
        let mut data = frame(layout::MONO_PROFILE_ID, 1, &profile(1, &[5, 6]));
        data.extend(frame(layout::MONO_PROFILE_ID, 2, &profile(2, &[7])));
        data.extend(frame(layout::JSON_HEADER_ID, 1, b"{}"));

        let mut out = Vec::new();
        let rows = write_profiles_csv(&mut out, &packets(&data), 1).unwrap();
        assert_eq!(rows, 1);

        let mut reader = csv::Reader::from_reader(out.as_slice());
        let headers = reader.headers().unwrap().clone();
        assert_eq!(headers.get(0), Some("analog_gain"));
        let ping_col = headers.iter().position(|h| h == "ping_number").unwrap();
        let pwr_col = headers.iter().position(|h| h == "pwr_results").unwrap();
        let record = reader.records().next().unwrap().unwrap();
        assert_eq!(record.get(ping_col), Some("1"));
        assert_eq!(record.get(pwr_col), Some("[5,6]"));
    }

    #[test]
    fn profile_export_without_matches_writes_nothing() {
        let data = frame(layout::JSON_HEADER_ID, 1, b"{}");
        let mut out = Vec::new();
        let rows = write_profiles_csv(&mut out, &packets(&data), 1).unwrap();
        assert_eq!(rows, 0);
        assert!(out.is_empty());
    }
}
