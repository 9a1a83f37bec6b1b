//! `(series, kind) -> (wire code, ASCII name, bit/word/dword class)`,
//! the common table plus the iQ-R extension table.

use crate::device_spec::DeviceKind;
use crate::error::McError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlcSeries {
    Q,
    L,
    QnA,
    IqL,
    IqR,
}

impl PlcSeries {
    pub fn is_iqr(self) -> bool {
        matches!(self, PlcSeries::IqR)
    }

    pub fn name(self) -> &'static str {
        match self {
            PlcSeries::Q => "Q",
            PlcSeries::L => "L",
            PlcSeries::QnA => "QnA",
            PlcSeries::IqL => "iQ-L",
            PlcSeries::IqR => "iQ-R",
        }
    }

    pub fn parse(s: &str) -> Result<Self, McError> {
        match s {
            "Q" => Ok(PlcSeries::Q),
            "L" => Ok(PlcSeries::L),
            "QnA" => Ok(PlcSeries::QnA),
            "iQ-L" => Ok(PlcSeries::IqL),
            "iQ-R" => Ok(PlcSeries::IqR),
            _ => Err(McError::PLCTypeError),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceClass {
    Bit,
    Word,
    Dword,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceCode {
    pub binary_code: u16,
    pub ascii_code: String,
    pub class: DeviceClass,
}

fn binary_code(series: PlcSeries, kind: DeviceKind) -> Option<u16> {
    use DeviceKind::*;
    let common = match kind {
        Sm => Some(0x91),
        Sd => Some(0xA9),
        X => Some(0x9C),
        Y => Some(0x9D),
        M => Some(0x90),
        L => Some(0x92),
        F => Some(0x93),
        V => Some(0x94),
        B => Some(0xA0),
        D => Some(0xA8),
        W => Some(0xB4),
        Ts => Some(0xC1),
        Tc => Some(0xC0),
        Tn => Some(0xC2),
        Sts => Some(0xC7),
        Stc => Some(0xC6),
        Stn => Some(0xC8),
        Cs => Some(0xC4),
        Cc => Some(0xC3),
        Cn => Some(0xC5),
        Sb => Some(0xA1),
        Sw => Some(0xB5),
        Dx => Some(0xA2),
        Dy => Some(0xA3),
        R => Some(0xAF),
        Zr => Some(0xB0),
        _ => None,
    };
    if common.is_some() {
        return common;
    }
    if !series.is_iqr() {
        return None;
    }
    match kind {
        Lts => Some(0x51),
        Ltc => Some(0x50),
        Ltn => Some(0x52),
        Lsts => Some(0x59),
        Lstn => Some(0x5A),
        Lcs => Some(0x55),
        Lcc => Some(0x54),
        Lcn => Some(0x56),
        Lz => Some(0x62),
        Rd => Some(0x2C),
        _ => None,
    }
}

fn class(series: PlcSeries, kind: DeviceKind) -> Option<DeviceClass> {
    use DeviceKind::*;
    if matches!(kind, Lstn | Lcn | Lz) {
        return Some(DeviceClass::Dword);
    }
    let mut is_bit = matches!(
        kind,
        Sm | X | Y | M | L | F | V | B | Ts | Tc | Sts | Stc | Cs | Cc | Sb | Dx | Dy
    );
    if series.is_iqr() && matches!(kind, Lts | Ltc | Ltn | Lsts | Lcs | Lcc) {
        is_bit = true;
    }
    if is_bit {
        return Some(DeviceClass::Bit);
    }
    if matches!(kind, Sd | D | W | Tn | Stn | Cn | Sw | R | Zr | Rd) {
        return Some(DeviceClass::Word);
    }
    None
}

fn ascii_name(series: PlcSeries, kind: DeviceKind) -> &'static str {
    use DeviceKind::*;
    match kind {
        Sts => {
            if series.is_iqr() {
                "STS"
            } else {
                "SS"
            }
        }
        Stc => {
            if series.is_iqr() {
                "STC"
            } else {
                "SC"
            }
        }
        Stn => {
            if series.is_iqr() {
                "STN"
            } else {
                "SN"
            }
        }
        other => other.as_str(),
    }
}

fn ascii_code(series: PlcSeries, kind: DeviceKind) -> String {
    let width = if series.is_iqr() { 4 } else { 2 };
    let name = ascii_name(series, kind);
    let mut padded = String::from(name);
    while padded.len() < width {
        padded.push('*');
    }
    padded
}

/// Looks up the wire identity of `kind` on `series`. Some kinds parse
/// successfully (§1 grammar) but have no code-table entry for any series
/// (`U`, `N`, `CX`, `TX`) or for non-iQ-R series (the `L*` family); both
/// cases surface as `DeviceCodeError`, not a parse failure.
pub fn lookup(series: PlcSeries, kind: DeviceKind) -> Result<DeviceCode, McError> {
    let binary_code = binary_code(series, kind).ok_or_else(|| McError::DeviceCodeError {
        series: series.name().to_string(),
        kind: kind.as_str().to_string(),
    })?;
    let class = class(series, kind).expect("every binary-coded kind has a class");
    Ok(DeviceCode {
        binary_code,
        ascii_code: ascii_code(series, kind),
        class,
    })
}
