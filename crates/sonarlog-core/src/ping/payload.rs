use std::borrow::Cow;
use std::fmt;

use serde::Serialize;

use super::decoder::{Record, Value};
use super::error::DecodeError;
use super::layout;
use super::registry::MessageRegistry;

/// Message type 2: a request the device refused.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Nack {
    pub nacked_id: u16,
    pub nack_message: String,
}

/// Message type 10: JSON document describing the capture.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JsonHeader {
    /// Keyed `JSON_message` in serialized payloads.
    #[serde(rename = "JSON_message")]
    pub json_message: String,
}

/// Message type 2198: one sonar ping with its power returns.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonoProfile {
    /// Sequential from 0 at power up.
    pub ping_number: u32,
    pub start_mm: u32,
    pub length_mm: u32,
    /// Milliseconds since power up.
    pub timestamp_ms: u32,
    pub ping_hz: u32,
    pub gain_index: u16,
    pub num_results: u16,
    /// Speed of sound, decimeters per second.
    pub sos_dmps: u16,
    pub channel_number: u8,
    pub reserved: u8,
    pub pulse_duration_sec: f32,
    pub analog_gain: f32,
    pub max_pwr_db: f32,
    pub min_pwr_db: f32,
    pub transducer_heading_deg: f32,
    pub vehicle_heading_deg: f32,
    /// Return strength from nearest to farthest, scaled between
    /// `min_pwr_db` and `max_pwr_db`.
    pub pwr_results: Vec<u16>,
}

/// Decoded payload fields, one variant per message shape.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum MessageBody {
    Nack(Nack),
    JsonHeader(JsonHeader),
    MonoProfile(MonoProfile),
    /// Registered at runtime; fields kept as decoded.
    Generic(Record),
    /// Not registered; only length and id are known.
    Unknown {},
}

/// Builds a typed body from the record decoded with the type's layout.
pub type BodyBuilder = fn(Record) -> Result<MessageBody, DecodeError>;

pub(crate) fn build_nack(mut record: Record) -> Result<MessageBody, DecodeError> {
    Ok(MessageBody::Nack(Nack {
        nacked_id: record.take_as("nacked_id", "u16", Value::into_u16)?,
        nack_message: record.take_as("nack_message", "text", Value::into_text)?,
    }))
}

pub(crate) fn build_json_header(mut record: Record) -> Result<MessageBody, DecodeError> {
    Ok(MessageBody::JsonHeader(JsonHeader {
        json_message: record.take_as("JSON_message", "text", Value::into_text)?,
    }))
}

pub(crate) fn build_mono_profile(mut r: Record) -> Result<MessageBody, DecodeError> {
    Ok(MessageBody::MonoProfile(MonoProfile {
        ping_number: r.take_as("ping_number", "u32", Value::into_u32)?,
        start_mm: r.take_as("start_mm", "u32", Value::into_u32)?,
        length_mm: r.take_as("length_mm", "u32", Value::into_u32)?,
        timestamp_ms: r.take_as("timestamp_ms", "u32", Value::into_u32)?,
        ping_hz: r.take_as("ping_hz", "u32", Value::into_u32)?,
        gain_index: r.take_as("gain_index", "u16", Value::into_u16)?,
        num_results: r.take_as("num_results", "u16", Value::into_u16)?,
        sos_dmps: r.take_as("sos_dmps", "u16", Value::into_u16)?,
        channel_number: r.take_as("channel_number", "u8", Value::into_u8)?,
        reserved: r.take_as("reserved", "u8", Value::into_u8)?,
        pulse_duration_sec: r.take_as("pulse_duration_sec", "f32", Value::into_f32)?,
        analog_gain: r.take_as("analog_gain", "f32", Value::into_f32)?,
        max_pwr_db: r.take_as("max_pwr_db", "f32", Value::into_f32)?,
        min_pwr_db: r.take_as("min_pwr_db", "f32", Value::into_f32)?,
        transducer_heading_deg: r.take_as("transducer_heading_deg", "f32", Value::into_f32)?,
        vehicle_heading_deg: r.take_as("vehicle_heading_deg", "f32", Value::into_f32)?,
        pwr_results: r.take_as("pwr_results", "u16[]", Value::into_u16_array)?,
    }))
}

pub(crate) fn build_generic(record: Record) -> Result<MessageBody, DecodeError> {
    Ok(MessageBody::Generic(record))
}

/// Decoded payload with the attributes shared by every message type.
///
/// Serializes flat: `length`, `message_id`, `message_type`, then the body
/// fields in layout order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Payload {
    /// Raw payload size in bytes.
    pub length: usize,
    pub message_id: u16,
    pub message_type: Cow<'static, str>,
    #[serde(flatten)]
    pub body: MessageBody,
}

impl Payload {
    pub fn unknown(message_id: u16, length: usize) -> Self {
        Self {
            length,
            message_id,
            message_type: Cow::Borrowed(layout::UNKNOWN_LABEL),
            body: MessageBody::Unknown {},
        }
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self.body, MessageBody::Unknown {})
    }

    pub fn as_mono_profile(&self) -> Option<&MonoProfile> {
        match &self.body {
            MessageBody::MonoProfile(profile) => Some(profile),
            _ => None,
        }
    }
}

impl fmt::Display for Payload {
    /// One-line summary in layout order; arrays are shown as `[n values]`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Payload(length={}, message_id={}, message_type='{}'",
            self.length, self.message_id, self.message_type
        )?;
        let fields = serde_json::to_value(&self.body).unwrap_or_default();
        if let serde_json::Value::Object(map) = fields {
            for (key, value) in map {
                match value {
                    serde_json::Value::String(text) => write!(f, ", {key}='{text}'")?,
                    serde_json::Value::Array(items) => {
                        write!(f, ", {key}=[{} values]", items.len())?
                    }
                    other => write!(f, ", {key}={other}")?,
                }
            }
        }
        write!(f, ")")
    }
}

/// Decode a payload directly, without the scanner's registry gate.
///
/// Unregistered ids do not fail here: they produce a payload whose body is
/// [`MessageBody::Unknown`], carrying only length and id. The scanner never
/// reaches this fallback because it drops unregistered ids first.
///
/// # Examples
/// ```
/// use sonarlog_core::{decode_payload, default_registry};
///
/// let payload = decode_payload(default_registry(), 10, b"{}\0\0")?;
/// assert_eq!(payload.message_type, "JSON header");
///
/// let unknown = decode_payload(default_registry(), 0x9999, &[1, 2, 3])?;
/// assert!(unknown.is_unknown());
/// assert_eq!(unknown.length, 3);
/// # Ok::<(), sonarlog_core::DecodeError>(())
/// ```
///
/// # Errors
/// Returns the layout decoding error for registered types.
pub fn decode_payload(
    registry: &MessageRegistry,
    message_id: u16,
    bytes: &[u8],
) -> Result<Payload, DecodeError> {
    match registry.resolve(message_id) {
        Some(message_type) => message_type.decode(bytes),
        None => Ok(Payload::unknown(message_id, bytes.len())),
    }
}
