use std::borrow::Cow;

use encoding_rs::Encoding;
use qrcode::{bits::Bits, types::QrError, QrCode, Version};
use tracing::debug;

use super::{
    render::Symbol,
    types::{ECLevel, Mode},
};
use crate::{QrioError, QrioResult};

pub const DEFAULT_CELL_SZ: u32 = 8;
pub const MAX_VERSION: i16 = 40;

// Encode options
//------------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodeOptions {
    version: i16,
    ec_level: ECLevel,
    mode: Mode,
    charset: String,
    size_px: u32,
    cell_size: u32,
    max_text_view_len: Option<usize>,
}

impl Default for EncodeOptions {
    fn default() -> Self {
        Self {
            version: 0,
            ec_level: ECLevel::M,
            mode: Mode::Byte,
            charset: "UTF-8".to_string(),
            size_px: 0,
            cell_size: DEFAULT_CELL_SZ,
            max_text_view_len: None,
        }
    }
}

impl EncodeOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Symbol version 1..=40. 0 picks the smallest version that fits.
    pub fn version(&mut self, version: i16) -> &mut Self {
        self.version = version;
        self
    }

    pub fn ec_level(&mut self, ec_level: ECLevel) -> &mut Self {
        self.ec_level = ec_level;
        self
    }

    pub fn mode(&mut self, mode: Mode) -> &mut Self {
        self.mode = mode;
        self
    }

    /// Any WHATWG encoding label, e.g. "UTF-8" or "Shift_JIS".
    pub fn charset(&mut self, label: &str) -> &mut Self {
        self.charset = label.to_string();
        self
    }

    /// Target image size; overrides the cell size when non zero.
    pub fn size_px(&mut self, size_px: u32) -> &mut Self {
        self.size_px = size_px;
        self
    }

    pub fn cell_size(&mut self, cell_size: u32) -> &mut Self {
        self.cell_size = cell_size;
        self
    }

    pub fn max_text_view_len(&mut self, len: usize) -> &mut Self {
        self.max_text_view_len = Some(len);
        self
    }

    pub fn get_max_text_view_len(&self) -> Option<usize> {
        self.max_text_view_len
    }

    pub fn metadata(&self) -> String {
        let ver = match self.version {
            0 => "Auto".to_string(),
            v => v.to_string(),
        };
        format!(
            "{{ Version: {ver}, Ec level: {:?}, Mode: {:?}, Charset: {} }}",
            self.ec_level, self.mode, self.charset
        )
    }

    /// Cell size in pixels for a symbol with `module_count` modules per side.
    pub fn resolve_cell_size(&self, module_count: usize) -> u32 {
        let cell = match self.size_px {
            0 => self.cell_size,
            px => px / module_count as u32,
        };
        cell.max(1)
    }
}

// Encoding
//------------------------------------------------------------------------------

impl EncodeOptions {
    pub fn build(&self, text: &str) -> QrioResult<Symbol> {
        debug!("Encoding symbol {}", self.metadata());
        if text.is_empty() {
            return Err(QrioError::EmptyMessage);
        }

        let data = self.to_bytes(text)?;
        if !self.mode.accepts(&data) {
            return Err(QrioError::InvalidCharacter(self.mode));
        }

        let ecl = self.ec_level;
        let code = match self.version {
            0 => self.find_version(&data)?,
            v @ 1..=MAX_VERSION => {
                let bits = self.push_bits(&data, Version::Normal(v)).map_err(|e| self.map_err(e))?;
                QrCode::with_bits(bits, ecl.into()).map_err(|e| self.map_err(e))?
            }
            v => return Err(QrioError::InvalidVersion(v)),
        };
        Ok(Symbol::new(code, ecl))
    }

    fn to_bytes<'a>(&self, text: &'a str) -> QrioResult<Cow<'a, [u8]>> {
        let enc = Encoding::for_label(self.charset.as_bytes())
            .ok_or_else(|| QrioError::UnknownCharset(self.charset.clone()))?;
        let (bytes, _, unmappable) = enc.encode(text);
        if unmappable {
            return Err(QrioError::InvalidCharacter(self.mode));
        }
        Ok(bytes)
    }

    fn find_version(&self, data: &[u8]) -> QrioResult<QrCode> {
        for v in 1..=MAX_VERSION {
            match self.push_bits(data, Version::Normal(v)) {
                Ok(bits) => {
                    debug!("Smallest fitting version: {v}");
                    return QrCode::with_bits(bits, self.ec_level.into()).map_err(|e| self.map_err(e));
                }
                Err(QrError::DataTooLong) => continue,
                Err(e) => return Err(self.map_err(e)),
            }
        }
        Err(QrioError::EncodingOverflow)
    }

    fn push_bits(&self, data: &[u8], version: Version) -> Result<Bits, QrError> {
        let mut bits = Bits::new(version);
        match self.mode {
            Mode::Numeric => bits.push_numeric_data(data)?,
            Mode::Alphanumeric => bits.push_alphanumeric_data(data)?,
            Mode::Byte => bits.push_byte_data(data)?,
            Mode::Kanji => bits.push_kanji_data(data)?,
        }
        bits.push_terminator(self.ec_level.into())?;
        Ok(bits)
    }

    fn map_err(&self, e: QrError) -> QrioError {
        match e {
            QrError::DataTooLong => QrioError::EncodingOverflow,
            QrError::InvalidVersion => QrioError::InvalidVersion(self.version),
            _ => QrioError::InvalidCharacter(self.mode),
        }
    }
}
