//! AMF0 value representation and serialization.

use bytes::BufMut;

use crate::Properties;

/// AMF0 type markers.
pub mod marker {
    pub const NUMBER: u8 = 0x00;
    pub const BOOLEAN: u8 = 0x01;
    pub const STRING: u8 = 0x02;
    pub const OBJECT: u8 = 0x03;
    pub const MOVIECLIP: u8 = 0x04;
    pub const NULL: u8 = 0x05;
    pub const UNDEFINED: u8 = 0x06;
    pub const REFERENCE: u8 = 0x07;
    pub const ECMA_ARRAY: u8 = 0x08;
    pub const OBJECT_END: u8 = 0x09;
    pub const STRICT_ARRAY: u8 = 0x0A;
    pub const DATE: u8 = 0x0B;
    pub const LONG_STRING: u8 = 0x0C;
    pub const UNSUPPORTED: u8 = 0x0D;
    pub const RECORDSET: u8 = 0x0E;
    pub const XML_DOCUMENT: u8 = 0x0F;
    pub const TYPED_OBJECT: u8 = 0x10;
}

/// Longest string that fits the 16-bit length prefix.
pub const MAX_SHORT_STRING: usize = u16::MAX as usize;

/// A single AMF0 value.
#[derive(Debug, Clone, PartialEq)]
pub enum AmfValue {
    /// IEEE-754 double. Always serialized on 9 bytes.
    Number(f64),
    Boolean(bool),
    /// UTF-8 string. Serialized as a long string when it exceeds 65535 bytes.
    String(String),
    /// Anonymous object with ordered properties.
    Object(Properties),
    Null,
    Undefined,
    /// Index into the table of previously decoded complex values.
    Reference(u16),
    /// Associative array. The serialized count is derived from the properties.
    EcmaArray(Properties),
    StrictArray(Vec<AmfValue>),
    /// Milliseconds since the Unix epoch plus a timezone offset in minutes.
    Date { millis: f64, timezone: i16 },
    LongString(String),
    Unsupported,
    XmlDocument(String),
    TypedObject { class: String, properties: Properties },
}

impl AmfValue {
    /// Create a string value.
    pub fn string(s: impl Into<String>) -> Self {
        Self::String(s.into())
    }

    /// Create an empty associative array.
    pub fn ecma_array() -> Self {
        Self::EcmaArray(Properties::new())
    }

    /// Create an empty anonymous object.
    pub fn object() -> Self {
        Self::Object(Properties::new())
    }

    /// Get the number held by this value.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Get the boolean held by this value.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    /// Get the text of a string, long string or XML value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) | Self::LongString(s) | Self::XmlDocument(s) => Some(s),
            _ => None,
        }
    }

    /// Get the properties of an object-like value.
    pub fn properties(&self) -> Option<&Properties> {
        match self {
            Self::Object(p) | Self::EcmaArray(p) => Some(p),
            Self::TypedObject { properties, .. } => Some(properties),
            _ => None,
        }
    }

    /// Mutable access to the properties of an object-like value.
    pub fn properties_mut(&mut self) -> Option<&mut Properties> {
        match self {
            Self::Object(p) | Self::EcmaArray(p) => Some(p),
            Self::TypedObject { properties, .. } => Some(properties),
            _ => None,
        }
    }

    /// Get the elements of a strict array.
    pub fn as_array(&self) -> Option<&[AmfValue]> {
        match self {
            Self::StrictArray(items) => Some(items),
            _ => None,
        }
    }

    /// Mutable access to the elements of a strict array.
    pub fn as_array_mut(&mut self) -> Option<&mut Vec<AmfValue>> {
        match self {
            Self::StrictArray(items) => Some(items),
            _ => None,
        }
    }

    /// Type marker written in front of this value.
    pub fn marker(&self) -> u8 {
        match self {
            Self::Number(_) => marker::NUMBER,
            Self::Boolean(_) => marker::BOOLEAN,
            Self::String(s) if s.len() > MAX_SHORT_STRING => marker::LONG_STRING,
            Self::String(_) => marker::STRING,
            Self::Object(_) => marker::OBJECT,
            Self::Null => marker::NULL,
            Self::Undefined => marker::UNDEFINED,
            Self::Reference(_) => marker::REFERENCE,
            Self::EcmaArray(_) => marker::ECMA_ARRAY,
            Self::StrictArray(_) => marker::STRICT_ARRAY,
            Self::Date { .. } => marker::DATE,
            Self::LongString(_) => marker::LONG_STRING,
            Self::Unsupported => marker::UNSUPPORTED,
            Self::XmlDocument(_) => marker::XML_DOCUMENT,
            Self::TypedObject { .. } => marker::TYPED_OBJECT,
        }
    }

    /// Exact number of bytes [`encode`](Self::encode) will write.
    pub fn encoded_len(&self) -> usize {
        match self {
            Self::Number(_) => 1 + 8,
            Self::Boolean(_) => 1 + 1,
            Self::String(s) if s.len() > MAX_SHORT_STRING => 1 + 4 + s.len(),
            Self::String(s) => 1 + 2 + s.len(),
            Self::Object(props) => 1 + props.encoded_len() + 3,
            Self::Null | Self::Undefined | Self::Unsupported => 1,
            Self::Reference(_) => 1 + 2,
            Self::EcmaArray(props) => 1 + 4 + props.encoded_len() + 3,
            Self::StrictArray(items) => 1 + 4 + items.iter().map(Self::encoded_len).sum::<usize>(),
            Self::Date { .. } => 1 + 8 + 2,
            Self::LongString(s) | Self::XmlDocument(s) => 1 + 4 + s.len(),
            Self::TypedObject { class, properties } => {
                1 + 2 + short_name(class).len() + properties.encoded_len() + 3
            }
        }
    }

    /// Serialize this value, marker included.
    pub fn encode<B: BufMut>(&self, buf: &mut B) {
        buf.put_u8(self.marker());
        match self {
            Self::Number(n) => buf.put_f64(*n),
            Self::Boolean(b) => buf.put_u8(u8::from(*b)),
            Self::String(s) if s.len() > MAX_SHORT_STRING => put_long_str(buf, s),
            Self::String(s) => put_short_str(buf, s),
            Self::Object(props) => {
                props.encode(buf);
                put_object_end(buf);
            }
            Self::Null | Self::Undefined | Self::Unsupported => {}
            Self::Reference(index) => buf.put_u16(*index),
            Self::EcmaArray(props) => {
                buf.put_u32(props.len() as u32);
                props.encode(buf);
                put_object_end(buf);
            }
            Self::StrictArray(items) => {
                buf.put_u32(items.len() as u32);
                for item in items {
                    item.encode(buf);
                }
            }
            Self::Date { millis, timezone } => {
                buf.put_f64(*millis);
                buf.put_i16(*timezone);
            }
            Self::LongString(s) | Self::XmlDocument(s) => put_long_str(buf, s),
            Self::TypedObject { class, properties } => {
                put_short_str(buf, class);
                properties.encode(buf);
                put_object_end(buf);
            }
        }
    }

    /// Serialize this value into a new vector.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(self.encoded_len());
        self.encode(&mut buf);
        buf
    }
}

impl From<f64> for AmfValue {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl From<bool> for AmfValue {
    fn from(b: bool) -> Self {
        Self::Boolean(b)
    }
}

impl From<&str> for AmfValue {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<String> for AmfValue {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

/// Property names and class names carry a 16-bit length; longer names are cut.
pub(crate) fn short_name(name: &str) -> &[u8] {
    let bytes = name.as_bytes();
    &bytes[..bytes.len().min(MAX_SHORT_STRING)]
}

pub(crate) fn put_short_str<B: BufMut>(buf: &mut B, s: &str) {
    let bytes = short_name(s);
    buf.put_u16(bytes.len() as u16);
    buf.put_slice(bytes);
}

fn put_long_str<B: BufMut>(buf: &mut B, s: &str) {
    buf.put_u32(s.len() as u32);
    buf.put_slice(s.as_bytes());
}

fn put_object_end<B: BufMut>(buf: &mut B) {
    buf.put_u16(0);
    buf.put_u8(marker::OBJECT_END);
}
