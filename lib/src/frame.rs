//! 3E frame assembly and response parsing: subheader, routing header,
//! data-length, monitoring timer, status/payload offsets.

use crate::error::McError;
use crate::value_codec::{encode_value, CommMode, Width};

const SUBHEADER: u32 = 0x5000;

/// Header fields shared by every request on a connection, mirroring
/// `ConnectionConfig`'s MC-header overrides (§3).
#[derive(Debug, Clone, Copy)]
pub struct FrameHeader {
    pub network: u8,
    pub pc: u8,
    pub dest_module_io: u16,
    pub dest_module_station: u8,
    /// Monitoring timer in 250ms units.
    pub timer: u16,
}

impl Default for FrameHeader {
    fn default() -> Self {
        FrameHeader {
            network: 0,
            pc: 0xFF,
            dest_module_io: 0x3FF,
            dest_module_station: 0x00,
            timer: 4,
        }
    }
}

/// Assembles a full request frame: subheader + routing header +
/// data-length + timer + `body` (command/subcommand + command-specific
/// payload, already encoded in `mode`).
pub fn encode_request(header: &FrameHeader, mode: CommMode, body: &[u8]) -> Vec<u8> {
    let wordsize = match mode {
        CommMode::Binary => 2,
        CommMode::Ascii => 4,
    };

    let mut frame = Vec::with_capacity(body.len() + 24);
    match mode {
        CommMode::Binary => frame.extend(SUBHEADER.to_be_bytes()[2..].iter()),
        CommMode::Ascii => frame.extend(format!("{SUBHEADER:04X}").into_bytes()),
    }
    frame.extend(encode_value(header.network as u32, Width::Byte, mode));
    frame.extend(encode_value(header.pc as u32, Width::Byte, mode));
    frame.extend(encode_value(header.dest_module_io as u32, Width::Short, mode));
    frame.extend(encode_value(header.dest_module_station as u32, Width::Byte, mode));

    let data_length = wordsize + body.len();
    frame.extend(encode_value(data_length as u32, Width::Short, mode));
    frame.extend(encode_value(header.timer as u32, Width::Short, mode));
    frame.extend_from_slice(body);
    frame
}

fn status_offset(mode: CommMode) -> usize {
    match mode {
        CommMode::Binary => 9,
        CommMode::Ascii => 18,
    }
}

fn payload_offset(mode: CommMode) -> usize {
    match mode {
        CommMode::Binary => 11,
        CommMode::Ascii => 22,
    }
}

fn wordsize(mode: CommMode) -> usize {
    match mode {
        CommMode::Binary => 2,
        CommMode::Ascii => 4,
    }
}

/// Checks a response's end-code, returning `Ok(payload_offset)` on success
/// (status == 0) or `ProtocolError` carrying the non-zero status.
pub fn check_response(response: &[u8], mode: CommMode) -> Result<usize, McError> {
    let status_idx = status_offset(mode);
    let ws = wordsize(mode);
    if response.len() < status_idx + ws {
        return Err(McError::ProtocolError(
            "response shorter than the status field".to_string(),
        ));
    }
    let status =
        crate::value_codec::decode_value(&response[status_idx..status_idx + ws], Width::Short, mode, false)?
            as u16;
    if status != 0 {
        let err = McError::from_status(status);
        log::warn!("PLC returned non-zero end-code: {err}");
        return Err(err);
    }
    Ok(payload_offset(mode))
}
