//! H.264 Sequence Parameter Set (SPS) parsing

use bitstream_io::{BigEndian, BitRead, BitReader};

use super::nal::remove_emulation_prevention;
use crate::codec::Resolution;

/// Fields of the SPS needed to derive the displayed picture size.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sps {
    pub profile_idc: u8,
    pub level_idc: u8,
    pub chroma_format_idc: u32,
    pub separate_colour_plane: bool,
    pub pic_width_in_mbs: u32,
    pub pic_height_in_map_units: u32,
    pub frame_mbs_only: bool,
    /// Cropping offsets (left, right, top, bottom) in crop units.
    pub frame_crop: Option<[u32; 4]>,
}

impl Sps {
    /// Displayed picture size after frame cropping.
    pub fn resolution(&self) -> Resolution {
        let field_factor = if self.frame_mbs_only { 1 } else { 2 };
        let width = self.pic_width_in_mbs.saturating_mul(16);
        let height = self.pic_height_in_map_units.saturating_mul(16 * field_factor);

        let Some([left, right, top, bottom]) = self.frame_crop else {
            return Resolution::new(width, height);
        };

        let chroma_array_type = if self.separate_colour_plane {
            0
        } else {
            self.chroma_format_idc
        };
        let (crop_x, crop_y) = match chroma_array_type {
            0 => (1, field_factor),
            1 => (2, 2 * field_factor),
            2 => (2, field_factor),
            _ => (1, field_factor),
        };

        Resolution::new(
            width.saturating_sub(left.saturating_add(right).saturating_mul(crop_x)),
            height.saturating_sub(top.saturating_add(bottom).saturating_mul(crop_y)),
        )
    }
}

/// Upper bound on either picture dimension, in macroblocks (65536 pixels).
const MAX_DIMENSION_MBS: u32 = 4096;

/// Profiles whose SPS carries chroma format and bit depth fields.
fn has_chroma_info(profile_idc: u8) -> bool {
    matches!(
        profile_idc,
        100 | 110 | 122 | 244 | 44 | 83 | 86 | 118 | 128 | 138 | 139 | 134 | 135
    )
}

/// Parse an SPS NAL unit, header byte included.
pub fn parse_sps(data: &[u8]) -> Option<Sps> {
    if data.len() < 4 {
        return None;
    }

    let rbsp = remove_emulation_prevention(data);
    let mut reader = RbspReader::new(&rbsp[1..]);

    let profile_idc = reader.read_bits(8)? as u8;
    // constraint_set flags + reserved_zero_2bits
    reader.read_bits(8)?;
    let level_idc = reader.read_bits(8)? as u8;
    // seq_parameter_set_id
    reader.read_ue()?;

    let mut chroma_format_idc = 1;
    let mut separate_colour_plane = false;

    if has_chroma_info(profile_idc) {
        chroma_format_idc = reader.read_ue()?;
        if chroma_format_idc == 3 {
            separate_colour_plane = reader.read_flag()?;
        }
        // bit_depth_luma_minus8, bit_depth_chroma_minus8
        reader.read_ue()?;
        reader.read_ue()?;
        // qpprime_y_zero_transform_bypass_flag
        reader.read_flag()?;

        let seq_scaling_matrix_present = reader.read_flag()?;
        if seq_scaling_matrix_present {
            let lists = if chroma_format_idc == 3 { 12 } else { 8 };
            for i in 0..lists {
                if reader.read_flag()? {
                    skip_scaling_list(&mut reader, if i < 6 { 16 } else { 64 })?;
                }
            }
        }
    }

    // log2_max_frame_num_minus4
    reader.read_ue()?;

    let pic_order_cnt_type = reader.read_ue()?;
    match pic_order_cnt_type {
        0 => {
            // log2_max_pic_order_cnt_lsb_minus4
            reader.read_ue()?;
        }
        1 => {
            // delta_pic_order_always_zero_flag
            reader.read_flag()?;
            // offset_for_non_ref_pic, offset_for_top_to_bottom_field
            reader.read_se()?;
            reader.read_se()?;
            let cycle = reader.read_ue()?;
            for _ in 0..cycle {
                reader.read_se()?;
            }
        }
        _ => {}
    }

    // max_num_ref_frames
    reader.read_ue()?;
    // gaps_in_frame_num_value_allowed_flag
    reader.read_flag()?;

    let pic_width_in_mbs = reader.read_ue()?.checked_add(1)?;
    let pic_height_in_map_units = reader.read_ue()?.checked_add(1)?;
    if pic_width_in_mbs > MAX_DIMENSION_MBS || pic_height_in_map_units > MAX_DIMENSION_MBS {
        return None;
    }

    let frame_mbs_only = reader.read_flag()?;
    if !frame_mbs_only {
        // mb_adaptive_frame_field_flag
        reader.read_flag()?;
    }
    // direct_8x8_inference_flag
    reader.read_flag()?;

    let frame_crop = if reader.read_flag()? {
        let crop = [
            reader.read_ue()?,
            reader.read_ue()?,
            reader.read_ue()?,
            reader.read_ue()?,
        ];
        // Crop offsets are in units of at least one pixel, so any offset
        // past the coded size is garbage.
        let limit = MAX_DIMENSION_MBS * 16;
        if crop.iter().any(|&c| c > limit) {
            return None;
        }
        Some(crop)
    } else {
        None
    };

    Some(Sps {
        profile_idc,
        level_idc,
        chroma_format_idc,
        separate_colour_plane,
        pic_width_in_mbs,
        pic_height_in_map_units,
        frame_mbs_only,
        frame_crop,
    })
}

fn skip_scaling_list(reader: &mut RbspReader<'_>, size: usize) -> Option<()> {
    let mut last_scale = 8i32;
    let mut next_scale = 8i32;

    for _ in 0..size {
        if next_scale != 0 {
            let delta_scale = reader.read_se()?;
            if !(-128..=127).contains(&delta_scale) {
                return None;
            }
            next_scale = (last_scale + delta_scale + 256) % 256;
        }
        if next_scale != 0 {
            last_scale = next_scale;
        }
    }

    Some(())
}

/// Bit reader over RBSP data with Exp-Golomb support.
struct RbspReader<'a> {
    inner: BitReader<&'a [u8], BigEndian>,
}

impl<'a> RbspReader<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self {
            inner: BitReader::endian(data, BigEndian),
        }
    }

    fn read_flag(&mut self) -> Option<bool> {
        self.inner.read_bit().ok()
    }

    /// Read n bits (up to 32)
    fn read_bits(&mut self, n: u32) -> Option<u32> {
        if n == 0 {
            return Some(0);
        }
        self.inner.read(n).ok()
    }

    /// Read unsigned Exp-Golomb coded value
    fn read_ue(&mut self) -> Option<u32> {
        let mut leading_zeros = 0u32;
        while !self.read_flag()? {
            leading_zeros += 1;
            if leading_zeros > 31 {
                return None;
            }
        }

        let suffix = self.read_bits(leading_zeros)? as u64;
        u32::try_from((1u64 << leading_zeros) - 1 + suffix).ok()
    }

    /// Read signed Exp-Golomb coded value
    fn read_se(&mut self) -> Option<i32> {
        let code = self.read_ue()? as i64;
        let value = if code % 2 == 1 {
            (code + 1) / 2
        } else {
            -(code / 2)
        };
        i32::try_from(value).ok()
    }
}
