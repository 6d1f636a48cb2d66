//! Audio stream sniffing.
//!
//! Playback is out of scope; an [`AudioStream`] only reports what a
//! player would need to know up front. The default [`SoundSniffer`]
//! recognises the containers found in Aurora game data.

pub mod mpeg;
pub mod ogg;
pub mod wave;

use std::fmt;
use std::io::SeekFrom;
use std::time::Duration;

use crate::archive::{ReadSeek, ResourceStream};
use crate::error::{CoreError, CoreResult};

/// Some games prepend this many bytes of junk to their WAV and MP3 files.
const OBFUSCATED_HEADER_SIZE: u64 = 470;
const OBFUSCATED_MAGIC: [u8; 4] = [0xFF, 0xF3, 0x60, 0xC4];

/// Audio encodings the sniffer can identify.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Codec {
    Pcm,
    ImaAdpcm,
    MsAdpcm,
    Mp3,
    Vorbis,
    /// A RIFF/WAVE format tag with no dedicated variant.
    Wave(u16),
}

impl fmt::Display for Codec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Codec::Pcm => f.write_str("PCM"),
            Codec::ImaAdpcm => f.write_str("IMA ADPCM"),
            Codec::MsAdpcm => f.write_str("MS ADPCM"),
            Codec::Mp3 => f.write_str("MP3"),
            Codec::Vorbis => f.write_str("Vorbis"),
            Codec::Wave(tag) => write!(f, "WAVE format {tag:#06x}"),
        }
    }
}

/// A sound resource opened for playback.
pub trait AudioStream {
    fn codec(&self) -> Codec;

    fn channels(&self) -> u16;

    fn sample_rate(&self) -> u32;

    /// Total play time, when the container allows computing it cheaply.
    fn duration(&self) -> Option<Duration>;
}

/// Creates audio streams from raw resource bytes.
pub trait AudioDecoder {
    fn make_audio_stream(&self, stream: ResourceStream) -> CoreResult<Box<dyn AudioStream>>;
}

/// Stream properties read from a container header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamInfo {
    pub codec: Codec,
    pub channels: u16,
    pub sample_rate: u32,
    pub duration: Option<Duration>,
}

impl AudioStream for StreamInfo {
    fn codec(&self) -> Codec {
        self.codec
    }

    fn channels(&self) -> u16 {
        self.channels
    }

    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    fn duration(&self) -> Option<Duration> {
        self.duration
    }
}

/// Identifies the container from its magic bytes.
///
/// RIFF/WAVE, `BMU V1.0`, raw MP3 and Ogg Vorbis are recognised. Only
/// WAVE streams report a duration.
#[derive(Debug, Clone, Copy, Default)]
pub struct SoundSniffer;

impl AudioDecoder for SoundSniffer {
    fn make_audio_stream(&self, mut stream: ResourceStream) -> CoreResult<Box<dyn AudioStream>> {
        let info = sniff(stream.as_mut())?;
        tracing::debug!(
            "sniffed {} stream, {} ch @ {} Hz",
            info.codec,
            info.channels,
            info.sample_rate
        );
        Ok(Box::new(info))
    }
}

/// Reads enough of `r` to identify the container and its parameters.
///
/// An obfuscated 470-byte prefix is skipped once; whatever follows it is
/// identified by the regular magic checks.
pub fn sniff(r: &mut dyn ReadSeek) -> CoreResult<StreamInfo> {
    let mut start = r.stream_position()?;
    let mut magic = peek_magic(r, start)?;
    if magic == OBFUSCATED_MAGIC {
        start += OBFUSCATED_HEADER_SIZE;
        r.seek(SeekFrom::Start(start))?;
        magic = peek_magic(r, start)?;
    }

    match &magic {
        b"RIFF" => wave::read(r),
        b"BMU " => mpeg::read_bmu(r),
        b"OggS" => ogg::read(r),
        b"ID3\x03" | b"ID3\x04" | b"ID3\x02" => mpeg::read(r),
        m if mpeg::is_frame_sync(m) => mpeg::read(r),
        _ => Err(CoreError::Format(format!(
            "unrecognised sound format (magic {magic:02x?})"
        ))),
    }
}

/// The first four bytes at `start`; the stream is left at `start`.
fn peek_magic(r: &mut dyn ReadSeek, start: u64) -> CoreResult<[u8; 4]> {
    let mut magic = [0u8; 4];
    if let Err(err) = r.read_exact(&mut magic) {
        if err.kind() == std::io::ErrorKind::UnexpectedEof {
            return Err(CoreError::Format("sound resource is too short".to_string()));
        }
        return Err(err.into());
    }
    r.seek(SeekFrom::Start(start))?;
    Ok(magic)
}

#[cfg(test)]
pub(crate) mod fixtures {
    //! Minimal sound files for tests.

    use byteorder::{LittleEndian, WriteBytesExt};

    /// A RIFF/WAVE file with a bare 16-byte `fmt ` chunk.
    pub fn wav(format: u16, channels: u16, rate: u32, block_align: u16, bits: u16, data_len: usize) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend_from_slice(b"RIFF");
        out.write_u32::<LittleEndian>((4 + 8 + 16 + 8 + data_len) as u32)
            .unwrap();
        out.extend_from_slice(b"WAVE");
        out.extend_from_slice(b"fmt ");
        out.write_u32::<LittleEndian>(16).unwrap();
        out.write_u16::<LittleEndian>(format).unwrap();
        out.write_u16::<LittleEndian>(channels).unwrap();
        out.write_u32::<LittleEndian>(rate).unwrap();
        out.write_u32::<LittleEndian>(rate * u32::from(block_align))
            .unwrap();
        out.write_u16::<LittleEndian>(block_align).unwrap();
        out.write_u16::<LittleEndian>(bits).unwrap();
        out.extend_from_slice(b"data");
        out.write_u32::<LittleEndian>(data_len as u32).unwrap();
        out.resize(out.len() + data_len, 0);
        out
    }

    /// One second of 16-bit mono PCM at 22050 Hz.
    pub fn pcm_one_second() -> Vec<u8> {
        wav(1, 1, 22050, 2, 16, 44100)
    }
}
