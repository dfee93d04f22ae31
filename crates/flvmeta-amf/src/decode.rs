//! AMF0 decoding.

use bytes::Buf;

use crate::value::marker;
use crate::{AmfValue, Error, Properties, Result};

/// Deepest object/array nesting accepted by [`decode`].
pub const MAX_DEPTH: usize = 64;

/// Decode one AMF0 value from the front of `buf`.
///
/// On success `buf` is advanced past the value. On failure the position
/// of `buf` is unspecified.
pub fn decode<B: Buf>(buf: &mut B) -> Result<AmfValue> {
    decode_value(buf, 0)
}

/// Decode one AMF0 value from a byte slice, returning it with the number
/// of bytes it occupied.
pub fn decode_slice(data: &[u8]) -> Result<(AmfValue, usize)> {
    let mut cursor = data;
    let value = decode(&mut cursor)?;
    Ok((value, data.len() - cursor.len()))
}

fn ensure<B: Buf>(buf: &B, need: usize) -> Result<()> {
    let have = buf.remaining();
    if have < need {
        return Err(Error::Truncated { need, have });
    }
    Ok(())
}

fn decode_value<B: Buf>(buf: &mut B, depth: usize) -> Result<AmfValue> {
    if depth > MAX_DEPTH {
        return Err(Error::TooDeep(MAX_DEPTH));
    }

    ensure(buf, 1)?;
    let type_marker = buf.get_u8();

    let value = match type_marker {
        marker::NUMBER => {
            ensure(buf, 8)?;
            AmfValue::Number(buf.get_f64())
        }
        marker::BOOLEAN => {
            ensure(buf, 1)?;
            AmfValue::Boolean(buf.get_u8() != 0)
        }
        marker::STRING => AmfValue::String(read_short_str(buf)?),
        marker::OBJECT => AmfValue::Object(read_properties(buf, depth, None)?),
        marker::NULL => AmfValue::Null,
        marker::UNDEFINED => AmfValue::Undefined,
        marker::REFERENCE => {
            ensure(buf, 2)?;
            AmfValue::Reference(buf.get_u16())
        }
        marker::ECMA_ARRAY => {
            ensure(buf, 4)?;
            let count = buf.get_u32() as usize;
            AmfValue::EcmaArray(read_properties(buf, depth, Some(count))?)
        }
        marker::STRICT_ARRAY => {
            ensure(buf, 4)?;
            let count = buf.get_u32() as usize;
            // Each element takes at least one byte; don't trust the count for allocation.
            let mut items = Vec::with_capacity(count.min(buf.remaining()));
            for _ in 0..count {
                items.push(decode_value(buf, depth + 1)?);
            }
            AmfValue::StrictArray(items)
        }
        marker::DATE => {
            ensure(buf, 10)?;
            let millis = buf.get_f64();
            let timezone = buf.get_i16();
            AmfValue::Date { millis, timezone }
        }
        marker::LONG_STRING => AmfValue::LongString(read_long_str(buf)?),
        marker::UNSUPPORTED => AmfValue::Unsupported,
        marker::XML_DOCUMENT => AmfValue::XmlDocument(read_long_str(buf)?),
        marker::TYPED_OBJECT => {
            let class = read_short_str(buf)?;
            let properties = read_properties(buf, depth, None)?;
            AmfValue::TypedObject { class, properties }
        }
        other => return Err(Error::UnknownMarker(other)),
    };

    Ok(value)
}

/// Read name/value pairs up to the object end marker.
///
/// Some muxers omit the end marker after an associative array; when the
/// buffer runs out right after the announced number of entries the array
/// is accepted as complete.
fn read_properties<B: Buf>(buf: &mut B, depth: usize, count: Option<usize>) -> Result<Properties> {
    let mut props = Properties::new();
    loop {
        if buf.remaining() == 0 && count.is_some_and(|c| props.len() >= c) {
            return Ok(props);
        }

        let name = read_short_str(buf)?;
        if name.is_empty() {
            ensure(buf, 1)?;
            if buf.chunk()[0] == marker::OBJECT_END {
                buf.advance(1);
                return Ok(props);
            }
        }

        let value = decode_value(buf, depth + 1)?;
        props.push(name, value);
    }
}

fn read_short_str<B: Buf>(buf: &mut B) -> Result<String> {
    ensure(buf, 2)?;
    let len = buf.get_u16() as usize;
    read_utf8(buf, len)
}

fn read_long_str<B: Buf>(buf: &mut B) -> Result<String> {
    ensure(buf, 4)?;
    let len = buf.get_u32() as usize;
    read_utf8(buf, len)
}

fn read_utf8<B: Buf>(buf: &mut B, len: usize) -> Result<String> {
    ensure(buf, len)?;
    let mut bytes = vec![0u8; len];
    buf.copy_to_slice(&mut bytes);
    Ok(match String::from_utf8(bytes) {
        Ok(s) => s,
        Err(e) => String::from_utf8_lossy(e.as_bytes()).into_owned(),
    })
}
