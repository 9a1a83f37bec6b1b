//! Device-specification grammar: `kind address [':' length]` or the
//! `kind 'H' hexaddress` infix form, e.g. `D100`, `M200:3`, `YH20`.

use crate::error::McError;

/// A recognized device family token. Variants are named for the canonical
/// uppercase token (`Sm` for `"SM"`, `Lsts` for `"LSTS"`, etc).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeviceKind {
    X, Y, B, M, D, T, C, Z, H, L, F, V, R, W, S, U, N,
    Sm, Sd, Cn, Cc, Cs, Cx, Tn, Tc, Ts, Tx, Sb, Sw, Dx, Dy, Zr,
    Lts, Ltc, Ltn, Lsts, Lstn, Lcs, Lcc, Lcn, Lz, Rd,
    Sts, Stc, Stn,
}

impl DeviceKind {
    pub fn as_str(self) -> &'static str {
        use DeviceKind::*;
        match self {
            X => "X", Y => "Y", B => "B", M => "M", D => "D", T => "T", C => "C",
            Z => "Z", H => "H", L => "L", F => "F", V => "V", R => "R", W => "W",
            S => "S", U => "U", N => "N",
            Sm => "SM", Sd => "SD", Cn => "CN", Cc => "CC", Cs => "CS", Cx => "CX",
            Tn => "TN", Tc => "TC", Ts => "TS", Tx => "TX", Sb => "SB", Sw => "SW",
            Dx => "DX", Dy => "DY", Zr => "ZR",
            Lts => "LTS", Ltc => "LTC", Ltn => "LTN", Lsts => "LSTS", Lstn => "LSTN",
            Lcs => "LCS", Lcc => "LCC", Lcn => "LCN", Lz => "LZ", Rd => "RD",
            Sts => "STS", Stc => "STC", Stn => "STN",
        }
    }

    /// Families whose address digits are read as hexadecimal by default.
    fn is_hex_addressed(self) -> bool {
        use DeviceKind::*;
        matches!(self, X | Y | B | W | Sb | Sw | Dx | Dy | Zr)
    }
}

impl std::fmt::Display for DeviceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

fn kind_from_token(token: &str) -> Option<DeviceKind> {
    use DeviceKind::*;
    Some(match token {
        "LSTS" => Lsts, "LSTN" => Lstn,
        "LTS" => Lts, "LTC" => Ltc, "LTN" => Ltn,
        "LCS" => Lcs, "LCC" => Lcc, "LCN" => Lcn,
        "STS" => Sts, "STC" => Stc, "STN" => Stn,
        "SM" => Sm, "SD" => Sd, "CN" => Cn, "CC" => Cc, "CS" => Cs, "CX" => Cx,
        "TN" => Tn, "TC" => Tc, "TS" => Ts, "TX" => Tx,
        "SB" => Sb, "SW" => Sw, "DX" => Dx, "DY" => Dy, "ZR" => Zr,
        "LZ" => Lz, "RD" => Rd,
        "X" => X, "Y" => Y, "B" => B, "M" => M, "D" => D, "T" => T, "C" => C,
        "Z" => Z, "H" => H, "L" => L, "F" => F, "V" => V, "R" => R, "W" => W,
        "S" => S, "U" => U, "N" => N,
        _ => return None,
    })
}

/// Parses an address string that does not use the `H`-infix form, trying
/// the `kind`'s default radix first and falling back to hex only for
/// hex-addressed families, matching the original's decimal-then-hex order.
fn parse_address(addr_str: &str, kind: DeviceKind) -> Option<u32> {
    if addr_str.is_empty() {
        return None;
    }
    let upper = addr_str.to_ascii_uppercase();
    if let Some(hex_digits) = upper.strip_prefix("0X") {
        return u32::from_str_radix(hex_digits, 16).ok();
    }
    if let Ok(value) = addr_str.parse::<u32>() {
        return Some(value);
    }
    if kind.is_hex_addressed() {
        return u32::from_str_radix(addr_str, 16).ok();
    }
    None
}

/// Parsed form of a device-spec input string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceSpec {
    pub kind: DeviceKind,
    pub address: u32,
    pub length: u32,
}

/// Parses a raw device-spec string into a `DeviceSpec`.
///
/// Kind tokens are matched longest-first (4, 3, 2, then 1 character); a
/// longer token only wins if the remaining characters parse as a valid
/// address under that kind's radix rules, per the grammar's tie-break rule.
pub fn parse(spec: &str) -> Result<DeviceSpec, McError> {
    let (device_part, length) = match spec.split_once(':') {
        Some((d, len_str)) => {
            let length: u32 = len_str
                .parse()
                .map_err(|_| McError::ParseError(spec.to_string()))?;
            if length == 0 {
                return Err(McError::ParseError(spec.to_string()));
            }
            (d, length)
        }
        None => (spec, 1),
    };

    if device_part.is_empty() {
        return Err(McError::ParseError(spec.to_string()));
    }

    let upper = device_part.to_ascii_uppercase();

    // H-infix form: "H" occurring strictly after the first character forces
    // a hex address, regardless of the kind's default radix.
    if let Some(h_pos) = upper.find('H') {
        if h_pos > 0 {
            let kind_token = &upper[..h_pos];
            let addr_str = &device_part[h_pos + 1..];
            let kind = kind_from_token(kind_token)
                .ok_or_else(|| McError::ParseError(spec.to_string()))?;
            let address = u32::from_str_radix(addr_str, 16)
                .map_err(|_| McError::ParseError(spec.to_string()))?;
            return Ok(DeviceSpec {
                kind,
                address,
                length,
            });
        }
    }

    for &candidate_len in &[4usize, 3, 2, 1] {
        if device_part.len() <= candidate_len {
            continue;
        }
        let candidate = &upper[..candidate_len];
        let Some(kind) = kind_from_token(candidate) else {
            continue;
        };
        let addr_str = &device_part[candidate_len..];
        if let Some(address) = parse_address(addr_str, kind) {
            return Ok(DeviceSpec {
                kind,
                address,
                length,
            });
        }
    }

    Err(McError::ParseError(spec.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use DeviceKind::*;

    #[test]
    fn parses_plain_decimal() {
        assert_eq!(
            parse("D100").unwrap(),
            DeviceSpec { kind: D, address: 100, length: 1 }
        );
    }

    #[test]
    fn parses_length_suffix() {
        assert_eq!(
            parse("D100:5").unwrap(),
            DeviceSpec { kind: D, address: 100, length: 5 }
        );
    }

    #[test]
    fn parses_hex_addressed_family() {
        assert_eq!(
            parse("X1A").unwrap(),
            DeviceSpec { kind: X, address: 0x1A, length: 1 }
        );
    }

    #[test]
    fn parses_h_infix() {
        assert_eq!(
            parse("YH20").unwrap(),
            DeviceSpec { kind: Y, address: 0x20, length: 1 }
        );
    }

    #[test]
    fn parses_0x_prefix_on_decimal_family() {
        assert_eq!(
            parse("M0x10").unwrap(),
            DeviceSpec { kind: M, address: 16, length: 1 }
        );
    }

    #[test]
    fn longest_match_kind_s1_s2() {
        // S1: ZR is hex-addressed, "FF" parses as hex under the 2-char token.
        assert_eq!(
            parse("ZRFF").unwrap(),
            DeviceSpec { kind: Zr, address: 0xFF, length: 1 }
        );
        // S1: D is decimal-addressed and "FF" is not a valid decimal or
        // hex-fallback-eligible address for D.
        assert!(parse("DFF").is_err());
        // S2 / invariant 2: SM wins over a bare "S" + "M100" split.
        assert_eq!(
            parse("SM100").unwrap(),
            DeviceSpec { kind: Sm, address: 100, length: 1 }
        );
    }

    #[test]
    fn rejects_unknown_kind() {
        assert!(parse("QQQQQ1").is_err());
    }

    #[test]
    fn rejects_empty_length_suffix() {
        assert!(parse("D100:0").is_err());
        assert!(parse("D100:").is_err());
    }

    #[test]
    fn bare_leading_h_is_an_ordinary_kind() {
        // "H" at index 0 does not trigger the infix form; H is itself a
        // decimal-addressed kind, so "HXX" fails both decimal and (H not
        // being hex-addressed) hex fallback.
        assert!(parse("HXX").is_err());
        assert_eq!(
            parse("H20").unwrap(),
            DeviceSpec { kind: H, address: 20, length: 1 }
        );
    }
}
