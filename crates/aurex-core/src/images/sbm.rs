//! SBM font bitmaps (Jade Empire).
//!
//! The file is a sequence of 1024-byte rows; each row holds four 32×32
//! tiles at two bits per pixel. The decoded image is 128 pixels wide and
//! padded to a power-of-two height.

use super::{ImageDecoder, PixelFormat, Surface};
use crate::archive::ReadSeek;
use crate::error::{CoreError, CoreResult};

const ROW_SIZE: usize = 1024;
const ROW_HEIGHT: u32 = 32;
const WIDTH: u32 = 128;

#[derive(Debug)]
pub struct Sbm {
    surface: Surface,
    rows: usize,
}

impl Sbm {
    pub fn read(r: &mut dyn ReadSeek) -> CoreResult<Self> {
        let mut data = Vec::new();
        r.read_to_end(&mut data)?;

        if data.is_empty() || data.len() % ROW_SIZE != 0 {
            return Err(CoreError::Format(format!(
                "SBM: size {} is not a positive multiple of {ROW_SIZE}",
                data.len()
            )));
        }

        let rows = data.len() / ROW_SIZE;
        let height = u32::try_from(rows)
            .ok()
            .and_then(|rows| rows.checked_mul(ROW_HEIGHT))
            .and_then(u32::checked_next_power_of_two)
            .ok_or_else(|| CoreError::Format(format!("SBM: too many rows ({rows})")))?;

        // Pad the pixel data out to the full power-of-two height.
        let full = PixelFormat::Packed2.level_size(WIDTH, height) as usize;
        data.resize(full, 0);

        Ok(Self {
            surface: Surface {
                format: PixelFormat::Packed2,
                width: WIDTH,
                height,
                mip_maps: 1,
                data,
            },
            rows,
        })
    }

    /// Number of glyph rows stored in the file.
    pub fn rows(&self) -> usize {
        self.rows
    }
}

impl ImageDecoder for Sbm {
    fn format_name(&self) -> &'static str {
        "SBM"
    }

    fn surface(&self) -> &Surface {
        &self.surface
    }
}
