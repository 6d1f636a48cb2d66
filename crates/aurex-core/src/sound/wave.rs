//! RIFF/WAVE headers.

use std::io::SeekFrom;
use std::time::Duration;

use byteorder::{LittleEndian, ReadBytesExt};

use super::{Codec, StreamInfo};
use crate::archive::ReadSeek;
use crate::error::{CoreError, CoreResult};

const FORMAT_PCM: u16 = 0x0001;
const FORMAT_MS_ADPCM: u16 = 0x0002;
const FORMAT_IMA_ADPCM: u16 = 0x0011;

#[derive(Debug, Clone, Copy)]
struct Format {
    tag: u16,
    channels: u16,
    sample_rate: u32,
    block_align: u16,
    bits: u16,
}

/// Reads a WAVE header starting at the current position.
pub fn read(r: &mut dyn ReadSeek) -> CoreResult<StreamInfo> {
    let mut riff = [0u8; 12];
    r.read_exact(&mut riff).map_err(truncated)?;
    if &riff[..4] != b"RIFF" || &riff[8..] != b"WAVE" {
        return Err(CoreError::Format("WAVE: missing RIFF/WAVE header".to_string()));
    }

    let mut format = None;
    let mut data_size = None;
    let (format, data_size) = loop {
        if let (Some(format), Some(data_size)) = (format, data_size) {
            break (format, data_size);
        }
        let mut id = [0u8; 4];
        r.read_exact(&mut id).map_err(truncated)?;
        let size = r.read_u32::<LittleEndian>().map_err(truncated)?;
        match &id {
            b"fmt " => {
                if size < 16 {
                    return Err(CoreError::Format(format!(
                        "WAVE: fmt chunk too small ({size} bytes)"
                    )));
                }
                format = Some(Format {
                    tag: r.read_u16::<LittleEndian>().map_err(truncated)?,
                    channels: r.read_u16::<LittleEndian>().map_err(truncated)?,
                    sample_rate: r.read_u32::<LittleEndian>().map_err(truncated)?,
                    block_align: {
                        let _byte_rate = r.read_u32::<LittleEndian>().map_err(truncated)?;
                        r.read_u16::<LittleEndian>().map_err(truncated)?
                    },
                    bits: r.read_u16::<LittleEndian>().map_err(truncated)?,
                });
                skip(r, i64::from(size) - 16 + i64::from(size & 1))?;
            }
            b"data" => {
                data_size = Some(size);
                if format.is_none() {
                    skip(r, i64::from(size) + i64::from(size & 1))?;
                }
            }
            _ => skip(r, i64::from(size) + i64::from(size & 1))?,
        }
    };

    if format.channels == 0 || format.sample_rate == 0 {
        return Err(CoreError::Format(format!(
            "WAVE: invalid stream ({} channels, {} Hz)",
            format.channels, format.sample_rate
        )));
    }

    let codec = match format.tag {
        FORMAT_PCM => Codec::Pcm,
        FORMAT_MS_ADPCM => Codec::MsAdpcm,
        FORMAT_IMA_ADPCM => Codec::ImaAdpcm,
        other => Codec::Wave(other),
    };

    Ok(StreamInfo {
        codec,
        channels: format.channels,
        sample_rate: format.sample_rate,
        duration: sample_frames(&format, data_size)
            .map(|frames| frames_to_duration(frames, format.sample_rate)),
    })
}

/// Sample frames in `data_size` bytes, for codecs with a fixed frame layout.
fn sample_frames(format: &Format, data_size: u32) -> Option<u64> {
    let block_align = u64::from(format.block_align);
    if block_align == 0 {
        return None;
    }
    let data_size = u64::from(data_size);
    match format.tag {
        FORMAT_PCM => Some(data_size / block_align),
        FORMAT_IMA_ADPCM if format.bits == 4 => {
            // 4-byte preamble per channel, then two samples per byte.
            let channels = u64::from(format.channels);
            let preamble = 4 * channels;
            if block_align <= preamble {
                return None;
            }
            let per_block = (block_align - preamble) * 2 / channels + 1;
            Some(data_size / block_align * per_block)
        }
        _ => None,
    }
}

fn frames_to_duration(frames: u64, sample_rate: u32) -> Duration {
    let rate = u64::from(sample_rate);
    Duration::from_secs(frames / rate)
        + Duration::from_nanos((frames % rate) * 1_000_000_000 / rate)
}

fn skip(r: &mut dyn ReadSeek, bytes: i64) -> CoreResult<()> {
    if bytes > 0 {
        r.seek(SeekFrom::Current(bytes))?;
    }
    Ok(())
}

fn truncated(err: std::io::Error) -> CoreError {
    if err.kind() == std::io::ErrorKind::UnexpectedEof {
        CoreError::Format("WAVE: truncated header".to_string())
    } else {
        CoreError::Io(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sound::fixtures::{pcm_one_second, wav};
    use std::io::Cursor;

    #[test]
    fn pcm_stereo_half_second() {
        // 16-bit stereo: 4 bytes per frame, 22050 frames
        let info = read(&mut Cursor::new(wav(1, 2, 44100, 4, 16, 88200))).unwrap();
        assert_eq!(info.codec, Codec::Pcm);
        assert_eq!(info.channels, 2);
        assert_eq!(info.duration, Some(Duration::from_millis(500)));
    }

    #[test]
    fn ima_adpcm_duration() {
        // mono, 512-byte blocks: (512 - 4) * 2 + 1 = 1017 samples per block
        let info = read(&mut Cursor::new(wav(0x11, 1, 1017, 512, 4, 512 * 3))).unwrap();
        assert_eq!(info.codec, Codec::ImaAdpcm);
        assert_eq!(info.duration, Some(Duration::from_secs(3)));
    }

    #[test]
    fn other_codecs_have_no_duration() {
        let info = read(&mut Cursor::new(wav(0x55, 2, 44100, 1, 0, 100))).unwrap();
        assert_eq!(info.codec, Codec::Wave(0x55));
        assert_eq!(info.duration, None);
    }

    #[test]
    fn skips_unknown_chunks() {
        let mut bytes = pcm_one_second();
        let list = b"LIST\x03\x00\x00\x00abc\x00";
        bytes.splice(12..12, list.iter().copied());
        let info = read(&mut Cursor::new(bytes)).unwrap();
        assert_eq!(info.duration, Some(Duration::from_secs(1)));
    }

    #[test]
    fn missing_data_chunk() {
        let mut bytes = pcm_one_second();
        bytes.truncate(36);
        let err = read(&mut Cursor::new(bytes)).unwrap_err();
        assert_eq!(err.to_string(), "format error: WAVE: truncated header");
    }

    #[test]
    fn zero_sample_rate() {
        let err = read(&mut Cursor::new(wav(1, 1, 0, 2, 16, 4))).unwrap_err();
        assert!(err.to_string().contains("0 Hz"));
    }
}
