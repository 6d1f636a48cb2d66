//! DirectDraw Surface textures.
//!
//! Two layouts share the extension: the standard Microsoft container with
//! a `DDS ` magic and the headerless BioWare variant used by NWN and KotOR
//! (width, height, bytes per pixel, data size, alpha).

use std::io::SeekFrom;

use byteorder::{LittleEndian, ReadBytesExt};

use super::{read_level, short_header, ImageDecoder, PixelFormat, Surface};
use crate::archive::ReadSeek;
use crate::error::{CoreError, CoreResult};

const HEADER_SIZE: u32 = 124;

const DDSD_MIPMAPCOUNT: u32 = 0x0002_0000;
const DDPF_ALPHAPIXELS: u32 = 0x0000_0001;
const DDPF_FOURCC: u32 = 0x0000_0004;
const DDPF_RGB: u32 = 0x0000_0040;

/// A DDS texture.
#[derive(Debug)]
pub struct Dds {
    surface: Surface,
    bioware: bool,
}

impl Dds {
    pub fn read(r: &mut dyn ReadSeek) -> CoreResult<Self> {
        let mut magic = [0u8; 4];
        r.read_exact(&mut magic).map_err(short_header("DDS"))?;
        if &magic == b"DDS " {
            Self::read_standard(r)
        } else {
            r.seek(SeekFrom::Start(0))?;
            Self::read_bioware(r)
        }
    }

    /// `true` for the headerless BioWare layout.
    pub fn is_bioware(&self) -> bool {
        self.bioware
    }

    fn read_standard(r: &mut dyn ReadSeek) -> CoreResult<Self> {
        let header = short_header("DDS");

        let size = r.read_u32::<LittleEndian>().map_err(&header)?;
        if size != HEADER_SIZE {
            return Err(CoreError::Format(format!(
                "DDS: header size {size}, expected {HEADER_SIZE}"
            )));
        }
        let flags = r.read_u32::<LittleEndian>().map_err(&header)?;
        let height = r.read_u32::<LittleEndian>().map_err(&header)?;
        let width = r.read_u32::<LittleEndian>().map_err(&header)?;
        let _pitch = r.read_u32::<LittleEndian>().map_err(&header)?;
        let _depth = r.read_u32::<LittleEndian>().map_err(&header)?;
        let mip_maps = r.read_u32::<LittleEndian>().map_err(&header)?;
        r.read_exact(&mut [0u8; 44]).map_err(&header)?;

        let _pf_size = r.read_u32::<LittleEndian>().map_err(&header)?;
        let pf_flags = r.read_u32::<LittleEndian>().map_err(&header)?;
        let mut four_cc = [0u8; 4];
        r.read_exact(&mut four_cc).map_err(&header)?;
        let bit_count = r.read_u32::<LittleEndian>().map_err(&header)?;
        let red_mask = r.read_u32::<LittleEndian>().map_err(&header)?;
        r.read_exact(&mut [0u8; 12]).map_err(&header)?;
        // caps1..caps4, reserved
        r.read_exact(&mut [0u8; 20]).map_err(&header)?;

        if width == 0 || height == 0 {
            return Err(CoreError::Format(format!(
                "DDS: invalid dimensions {width}x{height}"
            )));
        }

        let format = if pf_flags & DDPF_FOURCC != 0 {
            match &four_cc {
                b"DXT1" => PixelFormat::Dxt1,
                b"DXT3" => PixelFormat::Dxt3,
                b"DXT5" => PixelFormat::Dxt5,
                other => {
                    return Err(CoreError::Format(format!(
                        "DDS: unsupported FourCC {:?}",
                        String::from_utf8_lossy(other)
                    )))
                }
            }
        } else if pf_flags & DDPF_RGB != 0 {
            let bgr = red_mask == 0x00FF_0000;
            match (bit_count, pf_flags & DDPF_ALPHAPIXELS != 0) {
                (24, _) if bgr => PixelFormat::Bgr8,
                (24, _) => PixelFormat::Rgb8,
                (32, true) if bgr => PixelFormat::Bgra8,
                (32, true) => PixelFormat::Rgba8,
                _ => {
                    return Err(CoreError::Format(format!(
                        "DDS: unsupported {bit_count}-bit pixel format"
                    )))
                }
            }
        } else {
            return Err(CoreError::Format(format!(
                "DDS: unknown pixel format flags {pf_flags:#x}"
            )));
        };

        let mip_maps = if flags & DDSD_MIPMAPCOUNT != 0 {
            mip_maps.max(1) as usize
        } else {
            1
        };

        let data = read_level(r, format.level_size(width, height), "DDS")?;
        Ok(Self {
            surface: Surface {
                format,
                width,
                height,
                mip_maps,
                data,
            },
            bioware: false,
        })
    }

    fn read_bioware(r: &mut dyn ReadSeek) -> CoreResult<Self> {
        let header = short_header("DDS");

        let width = r.read_u32::<LittleEndian>().map_err(&header)?;
        let height = r.read_u32::<LittleEndian>().map_err(&header)?;
        let bpp = r.read_u32::<LittleEndian>().map_err(&header)?;
        let data_size = r.read_u32::<LittleEndian>().map_err(&header)?;
        let _alpha = r.read_f32::<LittleEndian>().map_err(&header)?;

        if !width.is_power_of_two() || !height.is_power_of_two() {
            return Err(CoreError::Format(format!(
                "DDS: BioWare texture dimensions {width}x{height} are not powers of two"
            )));
        }
        let format = match bpp {
            3 => PixelFormat::Dxt1,
            4 => PixelFormat::Dxt5,
            other => {
                return Err(CoreError::Format(format!(
                    "DDS: unsupported BioWare bytes per pixel {other}"
                )))
            }
        };

        let mip_maps = count_mip_maps(format, width, height, u64::from(data_size));
        if mip_maps == 0 {
            return Err(CoreError::Format(format!(
                "DDS: data size {data_size} too small for {width}x{height}"
            )));
        }

        let data = read_level(r, format.level_size(width, height), "DDS")?;
        Ok(Self {
            surface: Surface {
                format,
                width,
                height,
                mip_maps,
                data,
            },
            bioware: true,
        })
    }
}

/// Number of whole mip levels that fit into `data_size` bytes.
fn count_mip_maps(format: PixelFormat, width: u32, height: u32, data_size: u64) -> usize {
    let (mut w, mut h) = (width, height);
    let mut remaining = data_size;
    let mut count = 0;
    loop {
        let size = format.level_size(w, h);
        if size > remaining {
            break;
        }
        remaining -= size;
        count += 1;
        if w == 1 && h == 1 {
            break;
        }
        w = (w / 2).max(1);
        h = (h / 2).max(1);
    }
    count
}

impl ImageDecoder for Dds {
    fn format_name(&self) -> &'static str {
        "DDS"
    }

    fn surface(&self) -> &Surface {
        &self.surface
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::images::fixtures;
    use byteorder::WriteBytesExt;
    use std::io::Cursor;

    fn bioware(width: u32, height: u32, bpp: u32, data_size: u32) -> Vec<u8> {
        let mut out = Vec::new();
        out.write_u32::<LittleEndian>(width).unwrap();
        out.write_u32::<LittleEndian>(height).unwrap();
        out.write_u32::<LittleEndian>(bpp).unwrap();
        out.write_u32::<LittleEndian>(data_size).unwrap();
        out.write_f32::<LittleEndian>(0.0).unwrap();
        out.resize(out.len() + data_size as usize, 0);
        out
    }

    #[test]
    fn reads_standard_dxt1() {
        let dds = Dds::read(&mut Cursor::new(fixtures::dds_dxt1(64, 32))).unwrap();
        assert!(!dds.is_bioware());
        assert_eq!((dds.width(), dds.height()), (64, 32));
        assert_eq!(dds.pixel_format(), PixelFormat::Dxt1);
        assert_eq!(dds.mip_map_count(), 1);
        assert_eq!(dds.data().len(), 1024);
        assert!(dds.data().iter().all(|&b| b == 0xAB));
    }

    #[test]
    fn reads_standard_rgba() {
        let mut bytes = fixtures::dds_dxt1(2, 2);
        bytes.truncate(128);
        // pixel format flags: RGB with alpha, 32 bits, BGRA masks
        bytes[80..84].copy_from_slice(&(DDPF_RGB | DDPF_ALPHAPIXELS).to_le_bytes());
        bytes[84..88].copy_from_slice(&[0; 4]);
        bytes[88..92].copy_from_slice(&32u32.to_le_bytes());
        bytes[92..96].copy_from_slice(&0x00FF_0000u32.to_le_bytes());
        bytes.extend_from_slice(&[1u8; 16]);

        let dds = Dds::read(&mut Cursor::new(bytes)).unwrap();
        assert_eq!(dds.pixel_format(), PixelFormat::Bgra8);
        assert_eq!(dds.data().len(), 16);
    }

    #[test]
    fn rejects_bad_header_size() {
        let mut bytes = fixtures::dds_dxt1(4, 4);
        bytes[4..8].copy_from_slice(&100u32.to_le_bytes());
        let err = Dds::read(&mut Cursor::new(bytes)).unwrap_err();
        assert!(err.to_string().contains("header size 100"));
    }

    #[test]
    fn rejects_unknown_four_cc() {
        let mut bytes = fixtures::dds_dxt1(4, 4);
        bytes[84..88].copy_from_slice(b"ATI2");
        let err = Dds::read(&mut Cursor::new(bytes)).unwrap_err();
        assert!(err.to_string().contains("ATI2"));
    }

    #[test]
    fn rejects_truncated_data() {
        let mut bytes = fixtures::dds_dxt1(64, 64);
        bytes.truncate(bytes.len() - 1);
        let err = Dds::read(&mut Cursor::new(bytes)).unwrap_err();
        assert!(matches!(err, CoreError::Format(_)));
    }

    #[test]
    fn reads_bioware_with_mip_chain() {
        // 16x16 DXT1: 128 + 32 + 8 + 8 + 8 bytes
        let dds = Dds::read(&mut Cursor::new(bioware(16, 16, 3, 184))).unwrap();
        assert!(dds.is_bioware());
        assert_eq!(dds.pixel_format(), PixelFormat::Dxt1);
        assert_eq!(dds.mip_map_count(), 5);
        assert_eq!(dds.data().len(), 128);
    }

    #[test]
    fn bioware_dxt5() {
        let dds = Dds::read(&mut Cursor::new(bioware(8, 8, 4, 64))).unwrap();
        assert_eq!(dds.pixel_format(), PixelFormat::Dxt5);
        assert_eq!(dds.mip_map_count(), 1);
    }

    #[test]
    fn bioware_rejects_odd_dimensions() {
        let err = Dds::read(&mut Cursor::new(bioware(12, 16, 3, 96))).unwrap_err();
        assert!(err.to_string().contains("powers of two"));
    }

    #[test]
    fn bioware_rejects_bad_bpp() {
        let err = Dds::read(&mut Cursor::new(bioware(16, 16, 2, 128))).unwrap_err();
        assert!(err.to_string().contains("bytes per pixel"));
    }

    #[test]
    fn empty_stream_is_a_format_error() {
        let err = Dds::read(&mut Cursor::new(Vec::new())).unwrap_err();
        assert!(matches!(err, CoreError::Format(_)));
    }
}
