//! Truevision TGA, decoded to RGBA8 by the `image` crate.

use std::io::BufReader;

use image::{ImageFormat, ImageReader};

use super::{ImageDecoder, PixelFormat, Surface};
use crate::archive::ReadSeek;
use crate::error::{CoreError, CoreResult};

#[derive(Debug)]
pub struct Tga {
    surface: Surface,
}

impl Tga {
    pub fn read(r: &mut dyn ReadSeek) -> CoreResult<Self> {
        let img = ImageReader::with_format(BufReader::new(r), ImageFormat::Tga)
            .decode()
            .map_err(|e| CoreError::Format(format!("TGA: {e}")))?;
        let rgba = img.to_rgba8();
        let (width, height) = rgba.dimensions();

        Ok(Self {
            surface: Surface {
                format: PixelFormat::Rgba8,
                width,
                height,
                mip_maps: 1,
                data: rgba.into_raw(),
            },
        })
    }
}

impl ImageDecoder for Tga {
    fn format_name(&self) -> &'static str {
        "TGA"
    }

    fn surface(&self) -> &Surface {
        &self.surface
    }
}
