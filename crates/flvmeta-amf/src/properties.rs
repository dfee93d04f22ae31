//! Ordered property lists shared by objects and associative arrays.

use bytes::BufMut;

use crate::value::{put_short_str, short_name};
use crate::AmfValue;

/// Ordered list of named values.
///
/// AMF0 objects keep their properties in wire order, and players read
/// `onMetaData` fields positionally often enough that the order matters.
/// [`set`](Properties::set) therefore replaces a value where it already
/// sits instead of moving it to the end.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Properties {
    entries: Vec<(String, AmfValue)>,
}

impl Properties {
    /// Create an empty property list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of properties.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the list has no properties.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Set a property, replacing an existing value in place or appending.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<AmfValue>) {
        let name = name.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some((_, slot)) => *slot = value,
            None => self.entries.push((name, value)),
        }
    }

    /// Append a property without checking for duplicates.
    pub fn push(&mut self, name: impl Into<String>, value: AmfValue) {
        self.entries.push((name.into(), value));
    }

    /// Get a property by name.
    pub fn get(&self, name: &str) -> Option<&AmfValue> {
        self.entries.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    /// Get a mutable reference to a property by name.
    pub fn get_mut(&mut self, name: &str) -> Option<&mut AmfValue> {
        self.entries
            .iter_mut()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
    }

    /// Remove a property, returning its value.
    pub fn remove(&mut self, name: &str) -> Option<AmfValue> {
        let index = self.entries.iter().position(|(n, _)| n == name)?;
        Some(self.entries.remove(index).1)
    }

    /// Whether a property exists.
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Iterate over properties in order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &AmfValue)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v))
    }

    /// Merge another list into this one with [`set`](Self::set) semantics.
    pub fn extend(&mut self, other: Properties) {
        for (name, value) in other.entries {
            self.set(name, value);
        }
    }

    /// Serialized size of the name/value pairs, excluding the end marker.
    pub fn encoded_len(&self) -> usize {
        self.entries
            .iter()
            .map(|(n, v)| 2 + short_name(n).len() + v.encoded_len())
            .sum()
    }

    pub(crate) fn encode<B: BufMut>(&self, buf: &mut B) {
        for (name, value) in &self.entries {
            put_short_str(buf, name);
            value.encode(buf);
        }
    }
}

impl FromIterator<(String, AmfValue)> for Properties {
    fn from_iter<I: IntoIterator<Item = (String, AmfValue)>>(iter: I) -> Self {
        let mut props = Properties::new();
        for (name, value) in iter {
            props.set(name, value);
        }
        props
    }
}

impl IntoIterator for Properties {
    type Item = (String, AmfValue);
    type IntoIter = std::vec::IntoIter<(String, AmfValue)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}
