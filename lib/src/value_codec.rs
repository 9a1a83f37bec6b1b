//! Integer encode/decode for the 3E wire formats: little-endian binary, or
//! uppercase zero-padded hex in ASCII mode, with two's-complement decode.

use bytes::Buf;

use crate::error::McError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Width {
    Byte = 1,
    Short = 2,
    Long = 4,
}

impl Width {
    fn bytes(self) -> usize {
        self as usize
    }

    fn bits(self) -> u32 {
        self.bytes() as u32 * 8
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommMode {
    Binary,
    Ascii,
}

fn mask(width: Width) -> u32 {
    if width.bits() == 32 {
        u32::MAX
    } else {
        (1u32 << width.bits()) - 1
    }
}

/// Encodes an unsigned field (header bytes, counts) in `width`/`mode`.
pub fn encode_value(value: u32, width: Width, mode: CommMode) -> Vec<u8> {
    let masked = value & mask(width);
    match mode {
        CommMode::Binary => masked.to_le_bytes()[..width.bytes()].to_vec(),
        CommMode::Ascii => {
            let hex_width = width.bytes() * 2;
            format!("{masked:0hex_width$X}").into_bytes()
        }
    }
}

/// Encodes a signed field (word/dword values) in `width`/`mode`.
pub fn encode_signed(value: i32, width: Width, mode: CommMode) -> Vec<u8> {
    encode_value((value as u32) & mask(width), width, mode)
}

fn sign_extend(raw: u32, width: Width) -> i64 {
    if width.bits() == 32 {
        return raw as i32 as i64;
    }
    let sign_bit = 1u32 << (width.bits() - 1);
    if raw & sign_bit != 0 {
        raw as i64 - (1i64 << width.bits())
    } else {
        raw as i64
    }
}

/// Decodes `data` as `width`/`mode`, optionally applying a two's-complement
/// sign fold at `width`'s bit size.
pub fn decode_value(
    data: &[u8],
    width: Width,
    mode: CommMode,
    signed: bool,
) -> Result<i64, McError> {
    let raw = match mode {
        CommMode::Binary => {
            if data.len() < width.bytes() {
                return Err(McError::ProtocolError(format!(
                    "payload too short: expected {} bytes, got {}",
                    width.bytes(),
                    data.len()
                )));
            }
            let mut slice = &data[..width.bytes()];
            let raw = match width {
                Width::Byte => slice.get_u8() as u32,
                Width::Short => slice.get_u16_le() as u32,
                Width::Long => slice.get_u32_le(),
            };
            raw & mask(width)
        }
        CommMode::Ascii => {
            let text = std::str::from_utf8(data)
                .map_err(|_| McError::ProtocolError("non-UTF8 ASCII payload".to_string()))?;
            u32::from_str_radix(text, 16)
                .map_err(|_| McError::ProtocolError(format!("invalid hex payload: {text:?}")))?
        }
    };
    Ok(if signed { sign_extend(raw, width) } else { raw as i64 })
}
