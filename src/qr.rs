//! Thin wrapper over the `qrcode` crate: error-correction levels, the module
//! bitmap, and PNG / base64 output.

use std::fmt;
use std::io::Cursor;
use std::path::Path;
use std::str::FromStr;

use base64::{engine::general_purpose, Engine as _};
use image::{DynamicImage, GrayImage, ImageFormat, Luma};
use qrcode::{Color, QrCode};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Light modules added around the symbol, as scanners expect.
pub const QUIET_ZONE: usize = 4;

pub const DEFAULT_SIZE: u32 = 256;

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum EcLevel {
    /// ~7% recovery
    L,
    /// ~15% recovery
    #[default]
    M,
    /// ~25% recovery
    Q,
    /// ~30% recovery
    H,
}

impl EcLevel {
    fn to_qrcode(self) -> qrcode::EcLevel {
        match self {
            EcLevel::L => qrcode::EcLevel::L,
            EcLevel::M => qrcode::EcLevel::M,
            EcLevel::Q => qrcode::EcLevel::Q,
            EcLevel::H => qrcode::EcLevel::H,
        }
    }
}

impl fmt::Display for EcLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            EcLevel::L => "L",
            EcLevel::M => "M",
            EcLevel::Q => "Q",
            EcLevel::H => "H",
        };
        f.write_str(s)
    }
}

impl FromStr for EcLevel {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "L" | "l" => Ok(EcLevel::L),
            "M" | "m" => Ok(EcLevel::M),
            "Q" | "q" => Ok(EcLevel::Q),
            "H" | "h" => Ok(EcLevel::H),
            _ => Err(Error::InvalidLevel(s.to_string())),
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    Terminal,
    Png,
    Base64,
}

impl OutputFormat {
    /// Files are always written as PNG, whatever the extension says.
    pub fn from_path(_path: &Path) -> Self {
        OutputFormat::Png
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Options {
    pub level: EcLevel,
    /// Edge length of raster output in pixels.
    pub size: u32,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            level: EcLevel::M,
            size: DEFAULT_SIZE,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Generator {
    opts: Options,
}

impl Generator {
    pub fn new(opts: Options) -> Self {
        Self { opts }
    }

    pub fn options(&self) -> Options {
        self.opts
    }

    pub fn generate(&self, content: &str) -> Result<Symbol> {
        if content.is_empty() {
            return Err(Error::EmptyContent);
        }
        let code = QrCode::with_error_correction_level(content.as_bytes(), self.opts.level.to_qrcode())?;
        tracing::debug!(
            bytes = content.len(),
            level = %self.opts.level,
            width = code.width(),
            "encoded QR symbol"
        );
        Ok(Symbol { code })
    }
}

/// An encoded QR symbol.
pub struct Symbol {
    code: QrCode,
}

impl Symbol {
    /// Modules per side, without quiet zone.
    pub fn width(&self) -> usize {
        self.code.width()
    }

    /// Module grid including the quiet zone; `true` is dark.
    pub fn bitmap(&self) -> Vec<Vec<bool>> {
        let width = self.code.width();
        let full = width + QUIET_ZONE * 2;
        let colors = self.code.to_colors();

        let mut grid = vec![vec![false; full]; full];
        for (i, color) in colors.iter().enumerate() {
            if *color == Color::Dark {
                grid[i / width + QUIET_ZONE][i % width + QUIET_ZONE] = true;
            }
        }
        grid
    }

    /// Rasterize to `size` x `size` pixels, never less than one pixel per module.
    pub fn to_image(&self, size: u32) -> GrayImage {
        let bitmap = self.bitmap();
        let modules = bitmap.len() as u32;
        let size = size.max(modules);

        GrayImage::from_fn(size, size, |x, y| {
            let row = (y * modules / size) as usize;
            let col = (x * modules / size) as usize;
            if bitmap[row][col] { Luma([0u8]) } else { Luma([255u8]) }
        })
    }

    pub fn png(&self, size: u32) -> Result<Vec<u8>> {
        let mut bytes = Vec::new();
        DynamicImage::ImageLuma8(self.to_image(size)).write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)?;
        Ok(bytes)
    }

    /// Write a PNG to `path`, creating missing parent directories.
    pub fn save_png(&self, path: &Path, size: u32) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(path, self.png(size)?)?;
        tracing::info!(path = %path.display(), size, "saved PNG");
        Ok(())
    }

    /// PNG bytes as standard padded base64.
    pub fn to_base64(&self, size: u32) -> Result<String> {
        Ok(general_purpose::STANDARD.encode(self.png(size)?))
    }
}
