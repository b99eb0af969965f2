use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::OnceLock;

use super::decoder::decode_layout;
use super::error::{DecodeError, RegistryError};
use super::layout;
use super::payload::{
    BodyBuilder, Payload, build_generic, build_json_header, build_mono_profile, build_nack,
};
use super::schema::LayoutDescriptor;

/// Registered message type: label, payload layout and body constructor.
#[derive(Clone)]
pub struct MessageType {
    pub id: u16,
    pub label: Cow<'static, str>,
    pub layout: LayoutDescriptor,
    build: BodyBuilder,
}

impl MessageType {
    /// Decode a payload of this type.
    ///
    /// # Errors
    /// Returns the layout decoding error when `bytes` do not fit the layout.
    pub fn decode(&self, bytes: &[u8]) -> Result<Payload, DecodeError> {
        let record = decode_layout(&self.layout, bytes)?;
        Ok(Payload {
            length: bytes.len(),
            message_id: self.id,
            message_type: self.label.clone(),
            body: (self.build)(record)?,
        })
    }
}

impl fmt::Debug for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MessageType")
            .field("id", &self.id)
            .field("label", &self.label)
            .field("layout", &self.layout)
            .finish_non_exhaustive()
    }
}

/// Mapping from message id to its [`MessageType`].
///
/// Built once, extended with [`MessageRegistry::register`] before scanning,
/// then shared immutably by scans.
///
/// # Examples
/// ```
/// use sonarlog_core::{ElementType, FieldSpec, FieldType, LayoutDescriptor, MessageRegistry};
///
/// let mut registry = MessageRegistry::builtin();
/// let layout = LayoutDescriptor::new(vec![
///     FieldSpec::named("note", FieldType::Open(ElementType::Char)),
/// ])?;
/// registry.register(4000, "Operator note", layout)?;
/// assert_eq!(registry.resolve(4000).map(|t| t.label.as_ref()), Some("Operator note"));
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct MessageRegistry {
    entries: BTreeMap<u16, MessageType>,
}

impl MessageRegistry {
    /// Registry with no message types.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Registry holding the built-in message types.
    pub fn builtin() -> Self {
        let mut registry = Self::empty();
        let builtins: [(u16, &'static str, &'static LayoutDescriptor, BodyBuilder); 3] = [
            (layout::NACK_ID, layout::NACK_LABEL, &layout::NACK_LAYOUT, build_nack),
            (
                layout::JSON_HEADER_ID,
                layout::JSON_HEADER_LABEL,
                &layout::JSON_HEADER_LAYOUT,
                build_json_header,
            ),
            (
                layout::MONO_PROFILE_ID,
                layout::MONO_PROFILE_LABEL,
                &layout::MONO_PROFILE_LAYOUT,
                build_mono_profile,
            ),
        ];
        for (id, label, layout, build) in builtins {
            registry.entries.insert(
                id,
                MessageType {
                    id,
                    label: Cow::Borrowed(label),
                    layout: layout.clone(),
                    build,
                },
            );
        }
        registry
    }

    /// Add a message type whose payloads decode into a generic record.
    ///
    /// # Errors
    /// Returns `RegistryError::Duplicate` if `id` is already registered.
    pub fn register(
        &mut self,
        id: u16,
        label: impl Into<String>,
        layout: LayoutDescriptor,
    ) -> Result<(), RegistryError> {
        if let Some(existing) = self.entries.get(&id) {
            return Err(RegistryError::Duplicate {
                id,
                label: existing.label.to_string(),
            });
        }
        self.entries.insert(
            id,
            MessageType {
                id,
                label: Cow::Owned(label.into()),
                layout,
                build: build_generic,
            },
        );
        Ok(())
    }

    pub fn resolve(&self, id: u16) -> Option<&MessageType> {
        self.entries.get(&id)
    }

    pub fn contains(&self, id: u16) -> bool {
        self.entries.contains_key(&id)
    }

    /// Registered ids in ascending order.
    pub fn ids(&self) -> impl Iterator<Item = u16> + '_ {
        self.entries.keys().copied()
    }
}

/// Shared registry holding only the built-in message types.
pub fn default_registry() -> &'static MessageRegistry {
    static REGISTRY: OnceLock<MessageRegistry> = OnceLock::new();
    REGISTRY.get_or_init(MessageRegistry::builtin)
}
