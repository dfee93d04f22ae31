//! AVC (H.264) resolution from the FLV sequence header.
//!
//! The first AVC video tag of a stream normally carries the
//! `AVCDecoderConfigurationRecord`:
//!
//! ```text
//! AVCPacketType (1) = 0, CompositionTime (3),
//! configurationVersion (1), AVCProfileIndication (1),
//! profile_compatibility (1), AVCLevelIndication (1),
//! lengthSizeMinusOne (1), numOfSequenceParameterSets (1),
//! sequenceParameterSetLength (2), sequenceParameterSetNALUnit (n), ...
//! ```
//!
//! The picture size comes from the first SPS.

pub mod nal;
pub mod sps;

use super::DecodedHeader;

/// AVCPacketType of a sequence header.
pub const PACKET_TYPE_SEQUENCE_HEADER: u8 = 0;

/// Offset of the first SPS length field in the tag payload.
const FIRST_SPS_LENGTH_OFFSET: usize = 10;

/// Extract the resolution from an AVC sequence header payload.
pub fn decode(payload: &[u8]) -> DecodedHeader {
    let Some(&packet_type) = payload.first() else {
        return DecodedHeader::default();
    };
    if packet_type != PACKET_TYPE_SEQUENCE_HEADER {
        return DecodedHeader {
            resolution: None,
            consumed: 1,
        };
    }

    if payload.len() < FIRST_SPS_LENGTH_OFFSET + 2 || payload[9] & 0x1F == 0 {
        return DecodedHeader {
            resolution: None,
            consumed: payload.len().min(FIRST_SPS_LENGTH_OFFSET),
        };
    }

    let sps_len = u16::from_be_bytes([payload[10], payload[11]]) as usize;
    let sps_start = FIRST_SPS_LENGTH_OFFSET + 2;
    let sps_end = sps_start + sps_len;
    if payload.len() < sps_end {
        return DecodedHeader {
            resolution: None,
            consumed: payload.len(),
        };
    }

    let sps = &payload[sps_start..sps_end];
    let resolution = sps
        .first()
        .filter(|&&header| nal::nal_unit_type(header) == nal::NAL_TYPE_SPS)
        .and_then(|_| sps::parse_sps(sps))
        .map(|sps| sps.resolution());

    DecodedHeader {
        resolution,
        consumed: sps_end,
    }
}
