//! Image decoders and the type-keyed dispatch table.
//!
//! Each decoder reads one container format from a seekable stream and
//! exposes the top mip level as a [`Surface`]. Compressed (DXT) data is
//! kept compressed; only TGA goes through a full pixel decode.

pub mod cursor;
pub mod dds;
pub mod sbm;
pub mod tga;
pub mod tpc;

use std::io::{Read, SeekFrom};

use crate::archive::ReadSeek;
use crate::error::{CoreError, CoreResult};
use crate::types::FileType;

pub use cursor::WinIcon;
pub use dds::Dds;
pub use sbm::Sbm;
pub use tga::Tga;
pub use tpc::{Tpc, Txb};

/// Pixel layout of a [`Surface`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PixelFormat {
    Dxt1,
    Dxt3,
    Dxt5,
    Gray8,
    Rgb8,
    Bgr8,
    Rgba8,
    Bgra8,
    /// Two bits per pixel, four pixels per byte.
    Packed2,
}

impl PixelFormat {
    /// Byte size of one `width`×`height` level in this format.
    pub fn level_size(self, width: u32, height: u32) -> u64 {
        let (w, h) = (u64::from(width), u64::from(height));
        let blocks = w.div_ceil(4).max(1) * h.div_ceil(4).max(1);
        match self {
            PixelFormat::Dxt1 => blocks * 8,
            PixelFormat::Dxt3 | PixelFormat::Dxt5 => blocks * 16,
            PixelFormat::Gray8 => w * h,
            PixelFormat::Rgb8 | PixelFormat::Bgr8 => w * h * 3,
            PixelFormat::Rgba8 | PixelFormat::Bgra8 => w * h * 4,
            PixelFormat::Packed2 => (w * h).div_ceil(4),
        }
    }
}

/// The top mip level of a decoded image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Surface {
    pub format: PixelFormat,
    pub width: u32,
    pub height: u32,
    pub mip_maps: usize,
    pub data: Vec<u8>,
}

/// Common interface of every image decoder.
pub trait ImageDecoder {
    /// Short container name, e.g. `"DDS"`.
    fn format_name(&self) -> &'static str;

    fn surface(&self) -> &Surface;

    fn width(&self) -> u32 {
        self.surface().width
    }

    fn height(&self) -> u32 {
        self.surface().height
    }

    fn pixel_format(&self) -> PixelFormat {
        self.surface().format
    }

    fn mip_map_count(&self) -> usize {
        self.surface().mip_maps
    }

    fn data(&self) -> &[u8] {
        &self.surface().data
    }
}

impl std::fmt::Debug for dyn ImageDecoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct(self.format_name())
            .field("width", &self.width())
            .field("height", &self.height())
            .field("format", &self.pixel_format())
            .field("mip_maps", &self.mip_map_count())
            .finish()
    }
}

/// Decodes `stream` with the decoder registered for `file_type`.
///
/// TXB and TXB2 files are sometimes TPC data under another name: when
/// the TXB reader rejects the stream it is rewound and read as TPC. If
/// that fails too, both errors are returned in a [`CoreError::Fallback`].
///
/// # Errors
///
/// [`CoreError::UnsupportedType`] for file types with no decoder, or the
/// decoder's own error.
pub fn decode_image(
    stream: &mut dyn ReadSeek,
    file_type: FileType,
) -> CoreResult<Box<dyn ImageDecoder>> {
    let image: Box<dyn ImageDecoder> = match file_type {
        FileType::Dds => Box::new(Dds::read(stream)?),
        FileType::Tpc => Box::new(Tpc::read(stream)?),
        FileType::Txb | FileType::Txb2 => match Txb::read(stream) {
            Ok(txb) => Box::new(txb),
            Err(first) => {
                tracing::debug!("TXB read failed, retrying as TPC: {first}");
                stream.seek(SeekFrom::Start(0))?;
                match Tpc::read(stream) {
                    Ok(tpc) => Box::new(tpc),
                    Err(second) => {
                        return Err(CoreError::Fallback {
                            first: Box::new(first),
                            second: Box::new(second),
                        })
                    }
                }
            }
        },
        FileType::Tga => Box::new(Tga::read(stream)?),
        FileType::Sbm => Box::new(Sbm::read(stream)?),
        FileType::Cur | FileType::Curs => Box::new(WinIcon::read(stream)?),
        other => return Err(CoreError::UnsupportedType(other)),
    };
    Ok(image)
}

/// Reads exactly `size` bytes of pixel data.
pub(crate) fn read_level(r: &mut dyn ReadSeek, size: u64, what: &str) -> CoreResult<Vec<u8>> {
    let mut data = Vec::new();
    let read = (&mut *r).take(size).read_to_end(&mut data)?;
    if (read as u64) < size {
        return Err(CoreError::Format(format!(
            "{what}: image data too short ({read} of {size} bytes)"
        )));
    }
    Ok(data)
}

/// Maps an unexpected EOF while reading an image header to a format error.
pub(crate) fn short_header(what: &'static str) -> impl Fn(std::io::Error) -> CoreError {
    move |err| {
        if err.kind() == std::io::ErrorKind::UnexpectedEof {
            CoreError::Format(format!("{what}: truncated header"))
        } else {
            CoreError::Io(err)
        }
    }
}
