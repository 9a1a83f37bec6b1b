//! C6: the three read commands built on the frame codec, transport, and
//! device-code table — `batchread_word`, `batchread_bit`, `randomread`.
//! Each call opens a connection, exchanges one request/response, and closes.

use crate::connection::ConnectionConfig;
use crate::device_code::{self, DeviceClass};
use crate::device_spec::DeviceKind;
use crate::error::McError;
use crate::frame::{check_response, encode_request};
use crate::transport::Connection;
use crate::value_codec::{decode_value, encode_value, CommMode, Width};

fn wordsize(mode: CommMode) -> usize {
    match mode {
        CommMode::Binary => 2,
        CommMode::Ascii => 4,
    }
}

/// Slices `len` bytes out of `response` at `idx`, surfacing a
/// `ProtocolError` instead of panicking when the PLC's reply is shorter
/// than the data-length it declared (§4.5).
fn take(response: &[u8], idx: usize, len: usize) -> Result<&[u8], McError> {
    response
        .get(idx..idx + len)
        .ok_or_else(|| McError::ProtocolError("response shorter than declared data-length".to_string()))
}

fn command_data(command: u16, subcommand: u16, mode: CommMode) -> Vec<u8> {
    let mut out = encode_value(command as u32, Width::Short, mode);
    out.extend(encode_value(subcommand as u32, Width::Short, mode));
    out
}

/// Device-data layout (§4.7): binary packs address + wire code as raw
/// bytes (3+1 on non-iQ-R, 4+2 on iQ-R); ASCII spells out the device code
/// followed by a decimal, zero-padded address.
fn encode_device_data(
    kind: DeviceKind,
    address: u32,
    config: &ConnectionConfig,
) -> Result<Vec<u8>, McError> {
    let code = device_code::lookup(config.series, kind)?;
    let mut out = Vec::new();
    match config.comm_mode {
        CommMode::Binary => {
            let addr_bytes = address.to_le_bytes();
            if config.series.is_iqr() {
                out.extend_from_slice(&addr_bytes);
                out.extend_from_slice(&code.binary_code.to_le_bytes());
            } else {
                out.extend_from_slice(&addr_bytes[..3]);
                out.push(code.binary_code as u8);
            }
        }
        CommMode::Ascii => {
            out.extend_from_slice(code.ascii_code.as_bytes());
            let width = if config.series.is_iqr() { 8 } else { 6 };
            out.extend_from_slice(format!("{address:0width$}").to_uppercase().as_bytes());
        }
    }
    Ok(out)
}

fn execute(config: &ConnectionConfig, body: Vec<u8>) -> Result<(Vec<u8>, usize), McError> {
    let mut conn = Connection::connect(&config.host, config.port, config.timeout, config.transport)?;
    let request = encode_request(&config.header, config.comm_mode, &body);
    conn.send(&request)?;
    let response = conn.recv()?;
    let payload_offset = check_response(&response, config.comm_mode)?;
    Ok((response, payload_offset))
}

/// `0x0401/0x0000..0x0002` — a contiguous range of `count` word devices
/// starting at `(kind, address)`.
pub fn batchread_word(
    config: &ConnectionConfig,
    kind: DeviceKind,
    address: u32,
    count: u16,
) -> Result<Vec<i32>, McError> {
    let subcommand = if config.series.is_iqr() { 0x0002 } else { 0x0000 };
    let mut body = command_data(0x0401, subcommand, config.comm_mode);
    body.extend(encode_device_data(kind, address, config)?);
    body.extend(encode_value(count as u32, Width::Short, config.comm_mode));

    let (response, payload_offset) = execute(config, body)?;
    let ws = wordsize(config.comm_mode);
    let mut values = Vec::with_capacity(count as usize);
    let mut idx = payload_offset;
    for _ in 0..count {
        let value = decode_value(take(&response, idx, ws)?, Width::Short, config.comm_mode, true)?;
        values.push(value as i32);
        idx += ws;
    }
    Ok(values)
}

/// Unpacks `count` bits from a binary bit-read payload: even index lives
/// in the high nibble (bit 4) of `bytes[i/2]`, odd index in the low
/// nibble (bit 0) of the same byte (§4.6.2, S4).
fn unpack_bits(payload: &[u8], count: usize) -> Result<Vec<u8>, McError> {
    let mut bits = Vec::with_capacity(count);
    for i in 0..count {
        let byte = *payload
            .get(i / 2)
            .ok_or_else(|| McError::ProtocolError("bit payload too short".to_string()))?;
        let bit = if i % 2 == 0 { (byte >> 4) & 1 } else { byte & 1 };
        bits.push(bit);
    }
    Ok(bits)
}

/// `0x0401/0x0001..0x0003` — `count` consecutive bit devices starting at
/// `(kind, address)`. Binary responses pack two bits per byte (even index
/// in the high nibble, odd in the low nibble); ASCII responses are one
/// `'0'`/`'1'` character per bit.
pub fn batchread_bit(
    config: &ConnectionConfig,
    kind: DeviceKind,
    address: u32,
    count: u16,
) -> Result<Vec<u8>, McError> {
    let subcommand = if config.series.is_iqr() { 0x0003 } else { 0x0001 };
    let mut body = command_data(0x0401, subcommand, config.comm_mode);
    body.extend(encode_device_data(kind, address, config)?);
    body.extend(encode_value(count as u32, Width::Short, config.comm_mode));

    let (response, payload_offset) = execute(config, body)?;
    let count = count as usize;
    match config.comm_mode {
        CommMode::Binary => {
            let payload = response
                .get(payload_offset..)
                .ok_or_else(|| McError::ProtocolError("bit payload too short".to_string()))?;
            unpack_bits(payload, count)
        }
        CommMode::Ascii => {
            let payload = take(&response, payload_offset, count)?;
            Ok(payload.iter().map(|&ch| if ch == b'1' { 1 } else { 0 }).collect())
        }
    }
}

/// `0x0403/0x0000..0x0002` — a heterogeneous scatter-read: `word_devices`
/// then `dword_devices`, each a `(kind, address)` pair; the response is
/// signed 16-bit words followed by signed 32-bit dwords, in input order.
pub fn randomread(
    config: &ConnectionConfig,
    word_devices: &[(DeviceKind, u32)],
    dword_devices: &[(DeviceKind, u32)],
) -> Result<(Vec<i32>, Vec<i32>), McError> {
    let subcommand = if config.series.is_iqr() { 0x0002 } else { 0x0000 };
    let mut body = command_data(0x0403, subcommand, config.comm_mode);
    body.extend(encode_value(word_devices.len() as u32, Width::Byte, config.comm_mode));
    body.extend(encode_value(dword_devices.len() as u32, Width::Byte, config.comm_mode));
    for &(kind, address) in word_devices {
        body.extend(encode_device_data(kind, address, config)?);
    }
    for &(kind, address) in dword_devices {
        body.extend(encode_device_data(kind, address, config)?);
    }

    let (response, payload_offset) = execute(config, body)?;
    let ws = wordsize(config.comm_mode);
    let mut idx = payload_offset;

    let mut words = Vec::with_capacity(word_devices.len());
    for _ in word_devices {
        let value = decode_value(take(&response, idx, ws)?, Width::Short, config.comm_mode, true)?;
        words.push(value as i32);
        idx += ws;
    }

    let mut dwords = Vec::with_capacity(dword_devices.len());
    for _ in dword_devices {
        let value = decode_value(take(&response, idx, ws * 2)?, Width::Long, config.comm_mode, true)?;
        dwords.push(value as i32);
        idx += ws * 2;
    }

    Ok((words, dwords))
}

/// Looks up `kind`'s read strategy (§4.2) for the batch dispatcher's
/// class-wide grouping (C7) — word, bit, or dword.
pub fn read_class(config: &ConnectionConfig, kind: DeviceKind) -> Result<DeviceClass, McError> {
    Ok(device_code::lookup(config.series, kind)?.class)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn device_data_s6_iqr_binary() {
        let mut config = ConnectionConfig::default();
        config.series = crate::device_code::PlcSeries::IqR;
        config.comm_mode = CommMode::Binary;
        let data = encode_device_data(DeviceKind::D, 1000, &config).unwrap();
        assert_eq!(data, vec![0xE8, 0x03, 0x00, 0x00, 0xA8, 0x00]);
    }

    #[test]
    fn device_data_non_iqr_binary_is_four_bytes() {
        let mut config = ConnectionConfig::default();
        config.series = crate::device_code::PlcSeries::Q;
        config.comm_mode = CommMode::Binary;
        let data = encode_device_data(DeviceKind::X, 0x1A, &config).unwrap();
        assert_eq!(data.len(), 4);
        assert_eq!(&data[..3], &[0x1A, 0x00, 0x00]);
        assert_eq!(data[3], 0x9C);
    }

    #[test]
    fn unpack_bits_s4() {
        // S4: binary response payload [0x10, 0x01] -> bits [1, 0, 1].
        assert_eq!(unpack_bits(&[0x10, 0x01], 3).unwrap(), vec![1, 0, 1]);
    }

    #[test]
    fn unpack_bits_round_trips_through_repacking() {
        let bits = vec![1u8, 0, 1, 1, 0, 0, 1, 0, 1];
        let mut packed = Vec::new();
        for pair in bits.chunks(2) {
            let hi = pair[0];
            let lo = pair.get(1).copied().unwrap_or(0);
            packed.push((hi << 4) | lo);
        }
        assert_eq!(unpack_bits(&packed, bits.len()).unwrap(), bits);
    }

    #[test]
    fn unpack_bits_errors_on_short_payload() {
        assert!(unpack_bits(&[0x10], 3).is_err());
    }

    #[test]
    fn device_data_ascii_non_iqr() {
        let mut config = ConnectionConfig::default();
        config.series = crate::device_code::PlcSeries::Q;
        config.comm_mode = CommMode::Ascii;
        let data = encode_device_data(DeviceKind::D, 100, &config).unwrap();
        assert_eq!(data, b"D*000100");
    }
}
