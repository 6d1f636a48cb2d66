//! TPC (KotOR) and TXB (Jade Empire) textures.
//!
//! Both carry a 128-byte header with data size, width, height, encoding
//! and mip count at the same offsets. They differ in encoding codes and
//! in what the data size field means.

use byteorder::{LittleEndian, ReadBytesExt};

use super::{read_level, short_header, ImageDecoder, PixelFormat, Surface};
use crate::archive::ReadSeek;
use crate::error::{CoreError, CoreResult};

const HEADER_SIZE: usize = 128;

struct Header {
    data_size: u32,
    width: u32,
    height: u32,
    encoding: u8,
    mip_maps: u8,
}

fn read_header(r: &mut dyn ReadSeek, what: &'static str) -> CoreResult<Header> {
    let mut raw = [0u8; HEADER_SIZE];
    r.read_exact(&mut raw).map_err(short_header(what))?;
    let mut fields = &raw[..14];
    let data_size = fields.read_u32::<LittleEndian>()?;
    let _alpha = fields.read_f32::<LittleEndian>()?;
    let width = u32::from(fields.read_u16::<LittleEndian>()?);
    let height = u32::from(fields.read_u16::<LittleEndian>()?);
    let encoding = fields.read_u8()?;
    let mip_maps = fields.read_u8()?;

    if width == 0 || height == 0 {
        return Err(CoreError::Format(format!(
            "{what}: invalid dimensions {width}x{height}"
        )));
    }
    Ok(Header {
        data_size,
        width,
        height,
        encoding,
        mip_maps,
    })
}

/// A KotOR texture.
#[derive(Debug)]
pub struct Tpc {
    surface: Surface,
    faces: u32,
}

impl Tpc {
    pub fn read(r: &mut dyn ReadSeek) -> CoreResult<Self> {
        let header = read_header(r, "TPC")?;
        let compressed = header.data_size != 0;

        let format = match (compressed, header.encoding) {
            (true, 2) => PixelFormat::Dxt1,
            (true, 4) => PixelFormat::Dxt5,
            (false, 1) => PixelFormat::Gray8,
            (false, 2) => PixelFormat::Rgb8,
            (false, 4) => PixelFormat::Rgba8,
            (_, other) => {
                return Err(CoreError::Format(format!(
                    "TPC: unknown encoding {other} (compressed: {compressed})"
                )))
            }
        };

        // Cube maps stack their six faces vertically.
        let (height, faces) = if header.height == header.width * 6 {
            (header.width, 6)
        } else {
            (header.height, 1)
        };

        let data = read_level(r, format.level_size(header.width, height), "TPC")?;
        Ok(Self {
            surface: Surface {
                format,
                width: header.width,
                height,
                mip_maps: usize::from(header.mip_maps.max(1)),
                data,
            },
            faces,
        })
    }

    /// 6 for cube maps, 1 otherwise. `data()` holds the first face.
    pub fn faces(&self) -> u32 {
        self.faces
    }
}

impl ImageDecoder for Tpc {
    fn format_name(&self) -> &'static str {
        "TPC"
    }

    fn surface(&self) -> &Surface {
        &self.surface
    }
}

/// A Jade Empire texture.
#[derive(Debug)]
pub struct Txb {
    surface: Surface,
}

impl Txb {
    pub fn read(r: &mut dyn ReadSeek) -> CoreResult<Self> {
        let header = read_header(r, "TXB")?;

        let format = match header.encoding {
            0x04 => PixelFormat::Gray8,
            0x09 => PixelFormat::Bgra8,
            0x0A => PixelFormat::Dxt1,
            0x0C => PixelFormat::Dxt5,
            other => {
                return Err(CoreError::Format(format!(
                    "TXB: unknown encoding {other:#04x}"
                )))
            }
        };

        let level = format.level_size(header.width, header.height);
        if header.data_size != 0 && u64::from(header.data_size) < level {
            return Err(CoreError::Format(format!(
                "TXB: data size {} too small for {}x{}",
                header.data_size, header.width, header.height
            )));
        }

        let data = read_level(r, level, "TXB")?;
        Ok(Self {
            surface: Surface {
                format,
                width: header.width,
                height: header.height,
                mip_maps: usize::from(header.mip_maps.max(1)),
                data,
            },
        })
    }
}

impl ImageDecoder for Txb {
    fn format_name(&self) -> &'static str {
        "TXB"
    }

    fn surface(&self) -> &Surface {
        &self.surface
    }
}
