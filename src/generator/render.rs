use std::io::Cursor;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use image::{DynamicImage, GrayImage, ImageFormat, Luma};
use qrcode::{Color, QrCode, Version};

use super::types::ECLevel;
use crate::{QrioError, QrioResult};

// Symbol
//------------------------------------------------------------------------------

/// An encoded code ready to be rasterized.
#[derive(Clone)]
pub struct Symbol {
    code: QrCode,
    ecl: ECLevel,
}

// `QrCode` does not implement `Debug`.
impl std::fmt::Debug for Symbol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Symbol")
            .field("version", &self.code.version())
            .field("ecl", &self.ecl)
            .finish_non_exhaustive()
    }
}

impl Symbol {
    pub(crate) fn new(code: QrCode, ecl: ECLevel) -> Self {
        Self { code, ecl }
    }

    pub fn version(&self) -> i16 {
        match self.code.version() {
            Version::Normal(v) | Version::Micro(v) => v,
        }
    }

    pub fn ec_level(&self) -> ECLevel {
        self.ecl
    }

    /// Modules per side.
    pub fn module_count(&self) -> usize {
        self.code.width()
    }

    #[inline]
    pub fn is_dark(&self, r: usize, c: usize) -> bool {
        self.code[(c, r)] == Color::Dark
    }
}

// Render
//------------------------------------------------------------------------------

impl Symbol {
    pub fn to_image(&self, cell_sz: u32, margin: u32) -> GrayImage {
        let w = self.module_count() as u32;
        let qr_sz = w * cell_sz;
        let total_sz = margin + qr_sz + margin;

        GrayImage::from_fn(total_sz, total_sz, |x, y| {
            if x < margin || x >= margin + qr_sz || y < margin || y >= margin + qr_sz {
                return Luma([255]);
            }
            let r = (y - margin) / cell_sz;
            let c = (x - margin) / cell_sz;
            if self.is_dark(r as usize, c as usize) {
                Luma([0])
            } else {
                Luma([255])
            }
        })
    }

    pub fn to_png(&self, cell_sz: u32, margin: u32) -> QrioResult<Vec<u8>> {
        let img = DynamicImage::ImageLuma8(self.to_image(cell_sz, margin));
        let mut buf = Cursor::new(Vec::new());
        img.write_to(&mut buf, ImageFormat::Png).map_err(QrioError::Render)?;
        Ok(buf.into_inner())
    }

    pub fn to_data_url(&self, cell_sz: u32, margin: u32) -> QrioResult<String> {
        let png = self.to_png(cell_sz, margin)?;
        Ok(format!("data:image/png;base64,{}", STANDARD.encode(png)))
    }

    /// Terminal rendering, two characters per module.
    pub fn to_str(&self, margin: usize) -> String {
        let w = self.module_count();
        let total_sz = margin + w + margin;

        let mut canvas = String::new();
        for i in 0..total_sz {
            for j in 0..total_sz {
                let dark = i >= margin
                    && i < margin + w
                    && j >= margin
                    && j < margin + w
                    && self.is_dark(i - margin, j - margin);
                canvas.push_str(if dark { "  " } else { "██" });
            }
            canvas.push('\n');
        }
        canvas
    }
}
