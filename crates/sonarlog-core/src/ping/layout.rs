use super::schema::{ElementType, FieldSpec, FieldType, LayoutDescriptor, ScalarType};

pub const MARKER: &[u8; 2] = b"BR";

pub const HEADER_LEN: usize = 8;
pub const CHECKSUM_LEN: usize = 2;
pub const FRAME_OVERHEAD: usize = HEADER_LEN + CHECKSUM_LEN;
pub const PAYLOAD_OFFSET: usize = HEADER_LEN;

pub const NACK_ID: u16 = 2;
pub const JSON_HEADER_ID: u16 = 10;
pub const MONO_PROFILE_ID: u16 = 2198;

pub const NACK_LABEL: &str = "Not acknowledged";
pub const JSON_HEADER_LABEL: &str = "JSON header";
pub const MONO_PROFILE_LABEL: &str = "Mono Profile";
pub const UNKNOWN_LABEL: &str = "Unknown message type";

const U8: FieldType = FieldType::Scalar(ScalarType::U8);
const U16: FieldType = FieldType::Scalar(ScalarType::U16);
const U32: FieldType = FieldType::Scalar(ScalarType::U32);
const F32: FieldType = FieldType::Scalar(ScalarType::F32);
const OPEN_TEXT: FieldType = FieldType::Open(ElementType::Char);

static HEADER_FIELDS: [FieldSpec; 5] = [
    FieldSpec::new(
        "marker",
        FieldType::Array {
            element: ScalarType::U8,
            len: MARKER.len(),
        },
    ),
    FieldSpec::new("payload_length", U16),
    FieldSpec::new("message_id", U16),
    FieldSpec::new("sender_id", U8),
    FieldSpec::new("receiver_id", U8),
];

static NACK_FIELDS: [FieldSpec; 2] = [
    FieldSpec::new("nacked_id", U16),
    FieldSpec::new("nack_message", OPEN_TEXT),
];

static JSON_HEADER_FIELDS: [FieldSpec; 1] = [FieldSpec::new("JSON_message", OPEN_TEXT)];

static MONO_PROFILE_FIELDS: [FieldSpec; 17] = [
    FieldSpec::new("ping_number", U32),
    FieldSpec::new("start_mm", U32),
    FieldSpec::new("length_mm", U32),
    FieldSpec::new("timestamp_ms", U32),
    FieldSpec::new("ping_hz", U32),
    FieldSpec::new("gain_index", U16),
    FieldSpec::new("num_results", U16),
    FieldSpec::new("sos_dmps", U16),
    FieldSpec::new("channel_number", U8),
    FieldSpec::new("reserved", U8),
    FieldSpec::new("pulse_duration_sec", F32),
    FieldSpec::new("analog_gain", F32),
    FieldSpec::new("max_pwr_db", F32),
    FieldSpec::new("min_pwr_db", F32),
    FieldSpec::new("transducer_heading_deg", F32),
    FieldSpec::new("vehicle_heading_deg", F32),
    FieldSpec::new("pwr_results", FieldType::Open(ElementType::Scalar(ScalarType::U16))),
];

pub static HEADER_LAYOUT: LayoutDescriptor = LayoutDescriptor::from_static(&HEADER_FIELDS);
pub static NACK_LAYOUT: LayoutDescriptor = LayoutDescriptor::from_static(&NACK_FIELDS);
pub static JSON_HEADER_LAYOUT: LayoutDescriptor =
    LayoutDescriptor::from_static(&JSON_HEADER_FIELDS);
pub static MONO_PROFILE_LAYOUT: LayoutDescriptor =
    LayoutDescriptor::from_static(&MONO_PROFILE_FIELDS);

/// Size of the fixed part of a Mono Profile payload, before `pwr_results`.
pub const MONO_PROFILE_FIXED_LEN: usize = 52;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ping::schema::validate_fields;

    #[test]
    fn builtin_layouts_are_valid() {
        for layout in [
            &HEADER_LAYOUT,
            &NACK_LAYOUT,
            &JSON_HEADER_LAYOUT,
            &MONO_PROFILE_LAYOUT,
        ] {
            validate_fields(layout.fields()).unwrap();
        }
    }

    #[test]
    fn header_layout_is_eight_bytes() {
        assert_eq!(HEADER_LAYOUT.fixed_size(), HEADER_LEN);
        assert!(HEADER_LAYOUT.open_field().is_none());
    }

    #[test]
    fn mono_profile_fixed_prefix() {
        assert_eq!(MONO_PROFILE_LAYOUT.fixed_size(), MONO_PROFILE_FIXED_LEN);
        assert_eq!(
            MONO_PROFILE_LAYOUT.open_field().map(|f| f.name.as_ref()),
            Some("pwr_results")
        );
    }
}
