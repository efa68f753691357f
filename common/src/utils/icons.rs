use std::collections::HashMap;
use std::io::Cursor;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::herald_err;
use crate::utils::errors::{HeraldError, HeraldErrorKind};
use crate::utils::paths::{expand_path, home_dir};

const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

/// Raw pixel data as delivered by the host, 8 bits per sample.
///
/// `rowstride` may be larger than `width * channels`; trailing padding
/// bytes of each row are ignored when encoding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RasterImage {
    pub width: u32,
    pub height: u32,
    pub rowstride: u32,
    pub has_alpha: bool,
    pub bits_per_sample: u8,
    pub channels: u8,
    pub data: Vec<u8>,
}
impl RasterImage {
    /// Tightly packed RGBA image without padding.
    pub fn rgba(width: u32, height: u32, data: Vec<u8>) -> Self {
        Self {
            width,
            height,
            rowstride: width * 4,
            has_alpha: true,
            bits_per_sample: 8,
            channels: 4,
            data,
        }
    }

    fn validate(&self) -> Result<(), HeraldError> {
        if self.width == 0 || self.height == 0 {
            return Err(herald_err!(
                HeraldErrorKind::IconDecode,
                "empty image {}x{}",
                self.width,
                self.height
            ));
        }
        if self.bits_per_sample != 8 {
            return Err(herald_err!(
                HeraldErrorKind::IconDecode,
                "unsupported bits per sample: {}",
                self.bits_per_sample
            ));
        }
        let expected = if self.has_alpha { 4 } else { 3 };
        if self.channels != expected {
            return Err(herald_err!(
                HeraldErrorKind::IconDecode,
                "channel count {} does not match alpha flag",
                self.channels
            ));
        }
        let row_len = self.row_len();
        if (self.rowstride as usize) < row_len {
            return Err(herald_err!(
                HeraldErrorKind::IconDecode,
                "rowstride {} shorter than row length {}",
                self.rowstride,
                row_len
            ));
        }
        let needed = self.rowstride as usize * (self.height as usize - 1) + row_len;
        if self.data.len() < needed {
            return Err(herald_err!(
                HeraldErrorKind::IconDecode,
                "pixel buffer holds {} bytes, {} needed",
                self.data.len(),
                needed
            ));
        }
        Ok(())
    }

    fn row_len(&self) -> usize {
        self.width as usize * self.channels as usize
    }

    /// Encodes the image as PNG, dropping row padding.
    pub fn to_png(&self) -> Result<Vec<u8>, HeraldError> {
        self.validate()?;

        let row_len = self.row_len();
        let mut packed = Vec::with_capacity(row_len * self.height as usize);
        for row in self
            .data
            .chunks(self.rowstride as usize)
            .take(self.height as usize)
        {
            packed.extend_from_slice(&row[..row_len]);
        }

        let mut out = Vec::new();
        {
            let mut encoder = png::Encoder::new(&mut out, self.width, self.height);
            encoder.set_color(if self.has_alpha {
                png::ColorType::Rgba
            } else {
                png::ColorType::Rgb
            });
            encoder.set_depth(png::BitDepth::Eight);
            let mut writer = encoder
                .write_header()
                .map_err(|e| herald_err!(HeraldErrorKind::ImageEncode, e.to_string()))?;
            writer
                .write_image_data(&packed)
                .map_err(|e| herald_err!(HeraldErrorKind::ImageEncode, e.to_string()))?;
            writer
                .finish()
                .map_err(|e| herald_err!(HeraldErrorKind::ImageEncode, e.to_string()))?;
        }
        Ok(out)
    }
}

/// A loaded icon, either raw pixels or an already encoded file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Icon {
    Raster(RasterImage),
    Encoded(Vec<u8>),
}
impl Icon {
    /// Reads an icon file from disk. The format is checked in [`Icon::to_png`].
    pub fn from_file(path: &Path) -> Result<Self, HeraldError> {
        let bytes = std::fs::read(path).map_err(|e| {
            herald_err!(
                HeraldErrorKind::IconLoad,
                "{}: {}",
                path.display(),
                e.to_string()
            )
        })?;
        Ok(Self::Encoded(bytes))
    }

    /// Returns the icon as PNG bytes.
    ///
    /// Encoded icons are checked for a readable PNG header and passed through
    /// unchanged.
    pub fn to_png(&self) -> Result<Vec<u8>, HeraldError> {
        match self {
            Self::Raster(image) => image.to_png(),
            Self::Encoded(bytes) => {
                if !bytes.starts_with(&PNG_SIGNATURE) {
                    return Err(herald_err!(
                        HeraldErrorKind::IconDecode,
                        "icon is not a PNG image"
                    ));
                }
                png::Decoder::new(Cursor::new(bytes.as_slice()))
                    .read_info()
                    .map_err(|e| herald_err!(HeraldErrorKind::IconDecode, e.to_string()))?;
                Ok(bytes.clone())
            }
        }
    }
}

/// Icon names mapped to PNG files found below the search paths.
#[derive(Debug, Default)]
pub struct IconTheme {
    pub buf: HashMap<String, PathBuf>,
}
impl IconTheme {
    pub fn new() -> Self {
        Self {
            buf: HashMap::new(),
        }
    }
    pub fn add_path<T: AsRef<Path>>(&mut self, path: T) {
        let path = match home_dir() {
            Ok(home) => expand_path(path, &home),
            Err(_) => path.as_ref().to_path_buf(),
        };
        Self::scan_path(&path, &mut self.buf);
    }
    pub fn lookup_icon(&self, name: &str) -> Option<PathBuf> {
        self.buf
            .get(name)
            .or_else(|| self.buf.get(&name.to_ascii_lowercase()))
            .cloned()
    }
    fn scan_path(path: &Path, buf: &mut HashMap<String, PathBuf>) {
        // Early return if its not a scannable directory
        if !path.is_dir() {
            return;
        }

        let Ok(entries) = std::fs::read_dir(path) else {
            return;
        };
        for entry in entries.flatten() {
            let entry_path = entry.path();
            if entry_path.is_dir() {
                Self::scan_path(&entry_path, buf);
            } else if let Some(ext) = entry_path.extension().and_then(|e| e.to_str()) {
                if ext.eq_ignore_ascii_case("png") {
                    if let Some(stem) = entry_path.file_stem().and_then(|s| s.to_str()) {
                        buf.entry(stem.to_string()).or_insert(entry_path);
                    }
                }
            }
        }
    }
}
