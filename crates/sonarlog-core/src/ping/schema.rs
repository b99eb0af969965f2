use std::borrow::Cow;
use std::collections::BTreeSet;

use serde::Serialize;

use super::error::LayoutError;

/// Fixed-width little-endian primitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ScalarType {
    U8,
    U16,
    U32,
    F32,
}

impl ScalarType {
    /// Encoded width in bytes.
    pub const fn size(self) -> usize {
        match self {
            ScalarType::U8 => 1,
            ScalarType::U16 => 2,
            ScalarType::U32 | ScalarType::F32 => 4,
        }
    }
}

/// Element of an open-length field: a scalar or an ASCII character.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementType {
    Scalar(ScalarType),
    Char,
}

impl ElementType {
    pub const fn size(self) -> usize {
        match self {
            ElementType::Scalar(scalar) => scalar.size(),
            ElementType::Char => 1,
        }
    }
}

/// Shape of a single layout field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    /// One primitive.
    Scalar(ScalarType),
    /// Exactly `len` primitives.
    Array { element: ScalarType, len: usize },
    /// `len` ASCII bytes, trailing NULs stripped.
    Text { len: usize },
    /// Everything left in the slice; only valid as the final field.
    Open(ElementType),
}

impl FieldType {
    /// Byte size of the field, or `None` for open-length fields and sizes
    /// that do not fit in `usize`.
    pub const fn fixed_size(self) -> Option<usize> {
        match self {
            FieldType::Scalar(scalar) => Some(scalar.size()),
            FieldType::Array { element, len } => element.size().checked_mul(len),
            FieldType::Text { len } => Some(len),
            FieldType::Open(_) => None,
        }
    }

    pub const fn is_open(self) -> bool {
        matches!(self, FieldType::Open(_))
    }
}

/// Named field in a [`LayoutDescriptor`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldSpec {
    pub name: Cow<'static, str>,
    #[serde(rename = "type")]
    pub ty: FieldType,
}

impl FieldSpec {
    /// Field with a static name, usable in `const` tables.
    pub const fn new(name: &'static str, ty: FieldType) -> Self {
        Self {
            name: Cow::Borrowed(name),
            ty,
        }
    }

    /// Field with a runtime-provided name.
    pub fn named(name: impl Into<String>, ty: FieldType) -> Self {
        Self {
            name: Cow::Owned(name.into()),
            ty,
        }
    }
}

/// Ordered field schema driving binary decoding.
///
/// A descriptor built through [`LayoutDescriptor::new`] is always valid:
/// field names are unique, fixed arrays have a non-zero length, the fixed
/// fields add up to a representable size, and at most one open-length field
/// exists, in last position.
///
/// # Examples
/// ```
/// use sonarlog_core::{ElementType, FieldSpec, FieldType, LayoutDescriptor, ScalarType};
///
/// let layout = LayoutDescriptor::new(vec![
///     FieldSpec::named("status", FieldType::Scalar(ScalarType::U16)),
///     FieldSpec::named("text", FieldType::Open(ElementType::Char)),
/// ])?;
/// assert_eq!(layout.fixed_size(), 2);
/// assert!(layout.open_field().is_some());
/// # Ok::<(), sonarlog_core::LayoutError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct LayoutDescriptor {
    fields: Cow<'static, [FieldSpec]>,
}

impl LayoutDescriptor {
    /// Validate and wrap a runtime field list.
    ///
    /// # Errors
    /// Returns `LayoutError` when the field list breaks a descriptor invariant.
    pub fn new(fields: Vec<FieldSpec>) -> Result<Self, LayoutError> {
        validate_fields(&fields)?;
        Ok(Self {
            fields: Cow::Owned(fields),
        })
    }

    /// Wrap a static table. Built-in tables are checked by unit tests.
    pub(crate) const fn from_static(fields: &'static [FieldSpec]) -> Self {
        Self {
            fields: Cow::Borrowed(fields),
        }
    }

    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    /// Total size of all fixed fields (the minimum payload length).
    pub fn fixed_size(&self) -> usize {
        self.fields.iter().filter_map(|f| f.ty.fixed_size()).sum()
    }

    pub fn open_field(&self) -> Option<&FieldSpec> {
        self.fields.last().filter(|f| f.ty.is_open())
    }
}

pub(crate) fn validate_fields(fields: &[FieldSpec]) -> Result<(), LayoutError> {
    let mut seen = BTreeSet::new();
    let mut total: usize = 0;
    let last = fields.len().saturating_sub(1);
    for (index, field) in fields.iter().enumerate() {
        if !seen.insert(field.name.as_ref()) {
            return Err(LayoutError::DuplicateField {
                name: field.name.to_string(),
            });
        }
        match field.ty {
            FieldType::Array { len: 0, .. } | FieldType::Text { len: 0 } => {
                return Err(LayoutError::ZeroLength {
                    name: field.name.to_string(),
                });
            }
            FieldType::Open(_) if index != last => {
                return Err(LayoutError::OpenFieldNotLast {
                    name: field.name.to_string(),
                });
            }
            FieldType::Open(_) => continue,
            _ => {}
        }
        total = field
            .ty
            .fixed_size()
            .and_then(|size| total.checked_add(size))
            .ok_or_else(|| LayoutError::TooLarge {
                name: field.name.to_string(),
            })?;
    }
    Ok(())
}
