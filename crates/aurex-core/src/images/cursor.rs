//! Windows cursors and icons (CUR/ICO layout).
//!
//! Only the first directory entry is read. Its payload must be a
//! BITMAPINFOHEADER DIB at 24 or 32 bits per pixel; rows are flipped to
//! top-down order.

use std::io::SeekFrom;

use byteorder::{LittleEndian, ReadBytesExt};

use super::{read_level, short_header, ImageDecoder, PixelFormat, Surface};
use crate::archive::ReadSeek;
use crate::error::{CoreError, CoreResult};

const ICON: u16 = 1;
const CURSOR: u16 = 2;
const DIB_HEADER_SIZE: u32 = 40;

/// A Windows icon or cursor image.
#[derive(Debug)]
pub struct WinIcon {
    surface: Surface,
    hotspot: Option<(u16, u16)>,
    images: u16,
}

impl WinIcon {
    pub fn read(r: &mut dyn ReadSeek) -> CoreResult<Self> {
        let header = short_header("CUR");

        let reserved = r.read_u16::<LittleEndian>().map_err(&header)?;
        let kind = r.read_u16::<LittleEndian>().map_err(&header)?;
        let images = r.read_u16::<LittleEndian>().map_err(&header)?;
        if reserved != 0 || !(kind == ICON || kind == CURSOR) {
            return Err(CoreError::Format(format!(
                "CUR: not an icon directory (reserved {reserved}, type {kind})"
            )));
        }
        if images == 0 {
            return Err(CoreError::Format("CUR: no images".to_string()));
        }

        let width = dimension(r.read_u8().map_err(&header)?);
        let height = dimension(r.read_u8().map_err(&header)?);
        let _colors = r.read_u8().map_err(&header)?;
        let _reserved = r.read_u8().map_err(&header)?;
        let hotspot_x = r.read_u16::<LittleEndian>().map_err(&header)?;
        let hotspot_y = r.read_u16::<LittleEndian>().map_err(&header)?;
        let _size = r.read_u32::<LittleEndian>().map_err(&header)?;
        let offset = r.read_u32::<LittleEndian>().map_err(&header)?;

        r.seek(SeekFrom::Start(u64::from(offset)))?;
        let header_size = r.read_u32::<LittleEndian>().map_err(&header)?;
        if header_size != DIB_HEADER_SIZE {
            return Err(CoreError::Format(format!(
                "CUR: unsupported bitmap header size {header_size}"
            )));
        }
        let _dib_width = r.read_i32::<LittleEndian>().map_err(&header)?;
        let _dib_height = r.read_i32::<LittleEndian>().map_err(&header)?;
        let _planes = r.read_u16::<LittleEndian>().map_err(&header)?;
        let bit_count = r.read_u16::<LittleEndian>().map_err(&header)?;
        r.read_exact(&mut [0u8; 24]).map_err(&header)?;

        let format = match bit_count {
            24 => PixelFormat::Bgr8,
            32 => PixelFormat::Bgra8,
            other => {
                return Err(CoreError::Format(format!(
                    "CUR: unsupported bit depth {other}"
                )))
            }
        };

        let row = width as usize * usize::from(bit_count / 8);
        let stride = row.div_ceil(4) * 4;
        let raw = read_level(r, (stride * height as usize) as u64, "CUR")?;

        let mut data = Vec::with_capacity(row * height as usize);
        for line in raw.chunks_exact(stride).rev() {
            data.extend_from_slice(&line[..row]);
        }

        Ok(Self {
            surface: Surface {
                format,
                width,
                height,
                mip_maps: 1,
                data,
            },
            hotspot: (kind == CURSOR).then_some((hotspot_x, hotspot_y)),
            images,
        })
    }

    /// The click position, for cursors.
    pub fn hotspot(&self) -> Option<(u16, u16)> {
        self.hotspot
    }

    /// Number of images in the directory; only the first is decoded.
    pub fn image_count(&self) -> u16 {
        self.images
    }
}

/// Directory entries store 256 as 0.
fn dimension(raw: u8) -> u32 {
    if raw == 0 {
        256
    } else {
        u32::from(raw)
    }
}

impl ImageDecoder for WinIcon {
    fn format_name(&self) -> &'static str {
        "CUR"
    }

    fn surface(&self) -> &Surface {
        &self.surface
    }
}
