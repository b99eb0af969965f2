use std::borrow::Cow;

use serde::Serialize;
use serde::ser::SerializeMap;

use super::error::DecodeError;
use super::reader::PingReader;
use super::schema::{ElementType, FieldType, LayoutDescriptor, ScalarType};

/// Decoded value of one layout field.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    U8(u8),
    U16(u16),
    U32(u32),
    F32(f32),
    Text(String),
    U8Array(Vec<u8>),
    U16Array(Vec<u16>),
    U32Array(Vec<u32>),
    F32Array(Vec<f32>),
}

impl Value {
    pub fn into_u8(self) -> Option<u8> {
        match self {
            Value::U8(v) => Some(v),
            _ => None,
        }
    }

    pub fn into_u16(self) -> Option<u16> {
        match self {
            Value::U16(v) => Some(v),
            _ => None,
        }
    }

    pub fn into_u32(self) -> Option<u32> {
        match self {
            Value::U32(v) => Some(v),
            _ => None,
        }
    }

    pub fn into_f32(self) -> Option<f32> {
        match self {
            Value::F32(v) => Some(v),
            _ => None,
        }
    }

    pub fn into_text(self) -> Option<String> {
        match self {
            Value::Text(v) => Some(v),
            _ => None,
        }
    }

    pub fn into_u8_array(self) -> Option<Vec<u8>> {
        match self {
            Value::U8Array(v) => Some(v),
            _ => None,
        }
    }

    pub fn into_u16_array(self) -> Option<Vec<u16>> {
        match self {
            Value::U16Array(v) => Some(v),
            _ => None,
        }
    }
}

/// Field name to value record, in layout declaration order.
///
/// Serializes as a JSON object whose keys keep the declaration order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    fields: Vec<(Cow<'static, str>, Value)>,
}

impl Record {
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields
            .iter()
            .find(|(field, _)| field == name)
            .map(|(_, value)| value)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields
            .iter()
            .map(|(name, value)| (name.as_ref(), value))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    fn push(&mut self, name: Cow<'static, str>, value: Value) {
        self.fields.push((name, value));
    }

    /// Remove `field` and convert it, failing when absent or of another shape.
    pub(crate) fn take_as<T>(
        &mut self,
        field: &'static str,
        expected: &'static str,
        convert: fn(Value) -> Option<T>,
    ) -> Result<T, DecodeError> {
        let mismatch = DecodeError::FieldMismatch { field, expected };
        let index = self
            .fields
            .iter()
            .position(|(name, _)| name == field)
            .ok_or(mismatch.clone())?;
        let (_, value) = self.fields.remove(index);
        convert(value).ok_or(mismatch)
    }
}

impl Serialize for Record {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (name, value) in &self.fields {
            map.serialize_entry(name.as_ref(), value)?;
        }
        map.end()
    }
}

/// Decode `bytes` field by field according to `layout`.
///
/// The layout must account for every byte: running out of data part-way or
/// leaving bytes behind both fail with `SizeMismatch`. An open-length final
/// field takes `remaining / element_size` elements, so a remainder that is
/// not a multiple of the element size also ends in `SizeMismatch`.
///
/// # Examples
/// ```
/// use sonarlog_core::{decode_layout, FieldSpec, FieldType, LayoutDescriptor, ScalarType, Value};
///
/// let layout = LayoutDescriptor::new(vec![
///     FieldSpec::named("id", FieldType::Scalar(ScalarType::U16)),
/// ])?;
/// let record = decode_layout(&layout, &[0x96, 0x08])?;
/// assert_eq!(record.get("id"), Some(&Value::U16(2198)));
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
///
/// # Errors
/// Returns `SizeMismatch` when the layout does not partition the data
/// exactly, and `InvalidText` for non-ASCII text fields.
pub fn decode_layout(layout: &LayoutDescriptor, bytes: &[u8]) -> Result<Record, DecodeError> {
    let mut reader = PingReader::new(bytes);
    let mut record = Record::default();

    for field in layout.fields() {
        let value = decode_field(&mut reader, &field.name, field.ty).map_err(|err| match err {
            DecodeError::InsufficientBytes { .. } => DecodeError::SizeMismatch {
                expected: layout.fixed_size(),
                actual: bytes.len(),
            },
            other => other,
        })?;
        record.push(field.name.clone(), value);
    }

    if reader.position() != bytes.len() {
        return Err(DecodeError::SizeMismatch {
            expected: reader.position(),
            actual: bytes.len(),
        });
    }
    Ok(record)
}

fn decode_field(
    reader: &mut PingReader<'_>,
    name: &str,
    ty: FieldType,
) -> Result<Value, DecodeError> {
    match ty {
        FieldType::Scalar(scalar) => read_scalar(reader, scalar),
        FieldType::Array { element, len } => read_scalar_array(reader, element, len),
        FieldType::Text { len } => reader.read_ascii_string(len, name).map(Value::Text),
        FieldType::Open(ElementType::Char) => {
            let len = reader.remaining();
            reader.read_ascii_string(len, name).map(Value::Text)
        }
        FieldType::Open(ElementType::Scalar(element)) => {
            let len = reader.remaining() / element.size();
            read_scalar_array(reader, element, len)
        }
    }
}

fn read_scalar(reader: &mut PingReader<'_>, scalar: ScalarType) -> Result<Value, DecodeError> {
    Ok(match scalar {
        ScalarType::U8 => Value::U8(reader.read_u8()?),
        ScalarType::U16 => Value::U16(reader.read_u16_le()?),
        ScalarType::U32 => Value::U32(reader.read_u32_le()?),
        ScalarType::F32 => Value::F32(reader.read_f32_le()?),
    })
}

fn read_scalar_array(
    reader: &mut PingReader<'_>,
    element: ScalarType,
    len: usize,
) -> Result<Value, DecodeError> {
    let end = element
        .size()
        .checked_mul(len)
        .and_then(|size| reader.position().checked_add(size))
        .unwrap_or(usize::MAX);
    reader.require_len(end)?;
    Ok(match element {
        ScalarType::U8 => Value::U8Array(reader.read_slice(len)?.to_vec()),
        ScalarType::U16 => Value::U16Array(
            (0..len)
                .map(|_| reader.read_u16_le())
                .collect::<Result<_, _>>()?,
        ),
        ScalarType::U32 => Value::U32Array(
            (0..len)
                .map(|_| reader.read_u32_le())
                .collect::<Result<_, _>>()?,
        ),
        ScalarType::F32 => Value::F32Array(
            (0..len)
                .map(|_| reader.read_f32_le())
                .collect::<Result<_, _>>()?,
        ),
    })
}
