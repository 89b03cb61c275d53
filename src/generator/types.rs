use std::str::FromStr;

use qrcode::EcLevel;

// Error correction level
//------------------------------------------------------------------------------

#[derive(Debug, PartialEq, Eq, Copy, Clone, PartialOrd, Ord, Default)]
pub enum ECLevel {
    L = 0,
    #[default]
    M = 1,
    Q = 2,
    H = 3,
}

impl From<ECLevel> for EcLevel {
    fn from(ecl: ECLevel) -> Self {
        match ecl {
            ECLevel::L => EcLevel::L,
            ECLevel::M => EcLevel::M,
            ECLevel::Q => EcLevel::Q,
            ECLevel::H => EcLevel::H,
        }
    }
}

impl FromStr for ECLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "L" | "LOW" => Ok(Self::L),
            "M" | "MEDIUM" => Ok(Self::M),
            "Q" | "QUARTILE" => Ok(Self::Q),
            "H" | "HIGH" => Ok(Self::H),
            _ => Err(format!("unknown error correction level {s:?}")),
        }
    }
}

// Mode
//------------------------------------------------------------------------------

#[derive(Debug, PartialEq, Eq, Copy, Clone, Default)]
pub enum Mode {
    Numeric,
    Alphanumeric,
    #[default]
    Byte,
    Kanji,
}

impl Mode {
    /// Whether `data`, already in the target charset, fits this mode's alphabet.
    pub fn accepts(&self, data: &[u8]) -> bool {
        match self {
            Self::Numeric => data.iter().all(u8::is_ascii_digit),
            Self::Alphanumeric => data.iter().all(|b| ALPHANUMERIC.contains(b)),
            Self::Byte => true,
            Self::Kanji => {
                data.len() % 2 == 0
                    && data.chunks_exact(2).all(|c| {
                        let sjis = u16::from_be_bytes([c[0], c[1]]);
                        matches!(sjis, 0x8140..=0x9FFC | 0xE040..=0xEBBF)
                    })
            }
        }
    }
}

impl FromStr for Mode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "numeric" => Ok(Self::Numeric),
            "alphanumeric" => Ok(Self::Alphanumeric),
            "byte" => Ok(Self::Byte),
            "kanji" => Ok(Self::Kanji),
            _ => Err(format!("unknown encoding mode {s:?}")),
        }
    }
}

const ALPHANUMERIC: &[u8] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ $%*+-./:";

#[cfg(test)]
mod types_tests {
    use test_case::test_case;

    use super::{ECLevel, Mode};

    #[test_case("m", ECLevel::M; "short_lower")]
    #[test_case("High", ECLevel::H; "long_mixed")]
    #[test_case("Q", ECLevel::Q; "short_upper")]
    fn test_parse_ec_level(s: &str, exp: ECLevel) {
        assert_eq!(s.parse::<ECLevel>().unwrap(), exp);
    }

    #[test]
    fn test_defaults() {
        assert_eq!(ECLevel::default(), ECLevel::M);
        assert_eq!(Mode::default(), Mode::Byte);
        assert!("Z".parse::<ECLevel>().is_err());
        assert!("utf8".parse::<Mode>().is_err());
    }

    #[test_case(Mode::Numeric, b"0123456789", true; "numeric_ok")]
    #[test_case(Mode::Numeric, b"12a", false; "numeric_letter")]
    #[test_case(Mode::Alphanumeric, b"HELLO WORLD $%*+-./:", true; "alnum_ok")]
    #[test_case(Mode::Alphanumeric, b"hello", false; "alnum_lower")]
    #[test_case(Mode::Kanji, &[0x93, 0x5F, 0xE4, 0xAA], true; "kanji_ok")]
    #[test_case(Mode::Kanji, &[0x41, 0x42], false; "kanji_ascii")]
    #[test_case(Mode::Kanji, &[0x93], false; "kanji_odd")]
    #[test_case(Mode::Byte, &[0x00, 0xFF], true; "byte_any")]
    fn test_accepts(mode: Mode, data: &[u8], exp: bool) {
        assert_eq!(mode.accepts(data), exp);
    }
}
