//! The resource-base wrapper: dirty-tracking, size-delta accounting, and raw-byte
//! bookkeeping shared by every typed resource, grounded on the original driver's
//! `DBPF_resourceType` base class. The decoders in `resource_types/` only know how
//! to parse and serialize their own wire format; this is the layer a caller actually
//! holds onto while editing one, since it decides when re-serialization is owed and
//! tracks how far a package's on-disk size has drifted since the last write.

use crate::package::index::ResourceKey;
use crate::qfs;
use crate::resource_types::property_bag::{PropertyValue, SetOutcome, TaggedValueBag};

/// Whether a resource's stored raw bytes are the QFS-compressed on-disk form or
/// plain decompressed bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RawBytesKind {
    Decompressed,
    Compressed,
}

/// A typed resource value plus the key, raw-byte cache, and edit-tracking state a
/// package writer needs around it.
///
/// `raw_bytes` is only trustworthy immediately after construction or after
/// [`ResourceHandle::update_raw_bytes`] — calling it while [`ResourceHandle::is_dirty`]
/// is true hands back a stale cache; that's a caller precondition, not something this
/// type enforces.
pub struct ResourceHandle<T> {
    key: ResourceKey,
    value: T,
    raw_bytes: Vec<u8>,
    raw_kind: RawBytesKind,
    location: Option<u32>,
    dirty: bool,
    size_delta: i64,
}

impl<T> ResourceHandle<T> {
    /// Wraps an already-parsed value together with the raw bytes it was parsed
    /// from. Starts clean: not dirty, zero size delta.
    pub fn new(key: ResourceKey, value: T, raw_bytes: Vec<u8>, raw_kind: RawBytesKind) -> Self {
        ResourceHandle { key, value, raw_bytes, raw_kind, location: None, dirty: false, size_delta: 0 }
    }

    pub fn key(&self) -> ResourceKey {
        self.key
    }

    pub fn value(&self) -> &T {
        &self.value
    }

    pub fn value_mut(&mut self) -> &mut T {
        &mut self.value
    }

    /// Always true for a [`ResourceHandle`]: by construction it only exists once its
    /// value has been parsed. Opaque (never-decoded) resources are represented
    /// elsewhere, by the package's raw index entries, not as a handle.
    pub fn is_initialized(&self) -> bool {
        true
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Bytes accumulated since the last [`ResourceHandle::update_raw_bytes`] call,
    /// positive when edits have grown the resource and negative when they've
    /// shrunk it.
    pub fn size_delta(&self) -> i64 {
        self.size_delta
    }

    pub fn raw_bytes(&self) -> &[u8] {
        &self.raw_bytes
    }

    pub fn location(&self) -> Option<u32> {
        self.location
    }

    /// Records this resource's byte offset within its package. An offset change on
    /// its own isn't a content edit, so this never flips the dirty flag.
    pub fn set_location(&mut self, offset: u32) {
        self.location = Some(offset);
    }

    /// If the raw bytes are QFS-framed, returns `(compressed_size, decompressed_size)`
    /// read straight from the frame header.
    pub fn is_compressed(&self) -> Option<(u32, u32)> {
        match self.raw_kind {
            RawBytesKind::Compressed => qfs::peek_header(&self.raw_bytes),
            RawBytesKind::Decompressed => None,
        }
    }

    /// Attempts to QFS-compress the current raw bytes in place. Idempotent: a no-op
    /// if already compressed, and a no-op (not an error) if the encoder declines
    /// because the payload is too small or doesn't shrink.
    pub fn compress_raw_bytes(&mut self) {
        if self.raw_kind == RawBytesKind::Compressed {
            return;
        }
        if let Some(compressed) = qfs::try_compress(&self.raw_bytes) {
            self.raw_bytes = compressed;
            self.raw_kind = RawBytesKind::Compressed;
        }
    }

    /// Re-serializes `self.value` via `serialize`, refreshing the raw-byte cache
    /// and clearing dirty/size-delta. Call before [`ResourceHandle::raw_bytes`] if
    /// [`ResourceHandle::is_dirty`] is true.
    pub fn update_raw_bytes(&mut self, serialize: impl FnOnce(&T, &mut Vec<u8>)) {
        let mut out = Vec::new();
        serialize(&self.value, &mut out);
        self.raw_bytes = out;
        self.raw_kind = RawBytesKind::Decompressed;
        self.dirty = false;
        self.size_delta = 0;
    }
}

/// Implemented by typed resources backed by a single [`TaggedValueBag`] (property
/// sets, hair tones, binary indexes), so [`ResourceHandle::set_property`] can reach
/// into it generically instead of every call site matching on the concrete type.
pub trait TaggedPropertyResource {
    fn properties_mut(&mut self) -> &mut TaggedValueBag;
}

impl TaggedPropertyResource for crate::resource_types::property_set::PropertySet {
    fn properties_mut(&mut self) -> &mut TaggedValueBag {
        &mut self.properties
    }
}

impl TaggedPropertyResource for crate::resource_types::hair_tone::HairTone {
    fn properties_mut(&mut self) -> &mut TaggedValueBag {
        &mut self.properties
    }
}

impl TaggedPropertyResource for crate::resource_types::binary_index::BinaryIndex {
    fn properties_mut(&mut self) -> &mut TaggedValueBag {
        &mut self.properties
    }
}

/// The approximate serialized size, in bytes, of a brand-new tagged-value bag entry
/// (4-byte tag + 4-byte name length + name + the value's own wire form). Used to
/// size a size-delta when `set_property` inserts a key that didn't exist before,
/// since there's no "old" length to diff against.
fn inserted_entry_size(name: &str, value: &PropertyValue) -> i64 {
    let value_len = match value {
        PropertyValue::Bool(_) => 1,
        PropertyValue::UInt(_) | PropertyValue::Int(_) | PropertyValue::Float(_) => 4,
        PropertyValue::Str(s) => 4 + s.len(),
    };
    (4 + 4 + name.len() + value_len) as i64
}

impl<T: TaggedPropertyResource> ResourceHandle<T> {
    /// Sets a property on the wrapped resource's tagged-value bag, flipping dirty
    /// and accumulating the resulting size delta whenever the bag actually changes.
    /// A rejected (`TypeMismatch`) or no-op (`Unchanged`) write leaves dirty alone.
    pub fn set_property(&mut self, name: impl Into<String>, value: PropertyValue) -> SetOutcome {
        let name = name.into();
        let outcome = self.value.properties_mut().set(name.clone(), value.clone());
        match outcome {
            SetOutcome::Inserted => {
                self.dirty = true;
                self.size_delta += inserted_entry_size(&name, &value);
            }
            SetOutcome::Updated { size_delta } => {
                self.dirty = true;
                self.size_delta += size_delta;
            }
            SetOutcome::Unchanged | SetOutcome::TypeMismatch => {}
        }
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource_types::property_set::PropertySet;

    fn handle(value: PropertySet) -> ResourceHandle<PropertySet> {
        ResourceHandle::new(ResourceKey::new(0xEBCF3E27, 1, 2), value, Vec::new(), RawBytesKind::Decompressed)
    }

    #[test]
    fn starts_clean() {
        let h = handle(PropertySet::default());
        assert!(!h.is_dirty());
        assert_eq!(h.size_delta(), 0);
    }

    #[test]
    fn set_property_on_new_key_marks_dirty_and_grows_size_delta() {
        let mut h = handle(PropertySet::default());
        let outcome = h.set_property("family", PropertyValue::Str("Goth".into()));
        assert_eq!(outcome, SetOutcome::Inserted);
        assert!(h.is_dirty());
        assert!(h.size_delta() > 0);
    }

    #[test]
    fn set_property_with_equal_value_is_a_no_op() {
        let mut h = handle(PropertySet::default());
        h.set_property("family", PropertyValue::Str("Goth".into()));
        h.update_raw_bytes(|value, out| value.write_to_vec(out));
        assert!(!h.is_dirty());

        let outcome = h.set_property("family", PropertyValue::Str("Goth".into()));
        assert_eq!(outcome, SetOutcome::Unchanged);
        assert!(!h.is_dirty());
        assert_eq!(h.size_delta(), 0);
    }

    #[test]
    fn set_property_rejects_a_tag_change() {
        let mut h = handle(PropertySet::default());
        h.set_property("age", PropertyValue::Str("adult".into()));
        h.update_raw_bytes(|value, out| value.write_to_vec(out));

        let outcome = h.set_property("age", PropertyValue::UInt(1));
        assert_eq!(outcome, SetOutcome::TypeMismatch);
        assert!(!h.is_dirty());
    }

    #[test]
    fn set_property_on_existing_key_accumulates_string_size_delta() {
        let mut h = handle(PropertySet::default());
        h.set_property("family", PropertyValue::Str("Goth".into()));
        h.update_raw_bytes(|value, out| value.write_to_vec(out));

        let outcome = h.set_property("family", PropertyValue::Str("Pleasant".into()));
        assert_eq!(outcome, SetOutcome::Updated { size_delta: "Pleasant".len() as i64 - "Goth".len() as i64 });
        assert!(h.is_dirty());
    }

    #[test]
    fn set_location_does_not_mark_dirty() {
        let mut h = handle(PropertySet::default());
        h.set_location(128);
        assert_eq!(h.location(), Some(128));
        assert!(!h.is_dirty());
    }

    #[test]
    fn compress_raw_bytes_is_idempotent() {
        let mut repetitive = Vec::new();
        for _ in 0..80 {
            repetitive.extend_from_slice(b"abcdefghijklmnopqrstuvwxyz");
        }
        let mut h = ResourceHandle::new(
            ResourceKey::new(0xEBCF3E27, 1, 2),
            PropertySet::default(),
            repetitive,
            RawBytesKind::Decompressed,
        );
        h.compress_raw_bytes();
        let first = h.raw_bytes().to_vec();
        h.compress_raw_bytes();
        assert_eq!(h.raw_bytes(), first.as_slice());
        assert!(h.is_compressed().is_some());
    }
}
