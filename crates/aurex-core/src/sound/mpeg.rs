//! MPEG audio (MP3), raw or wrapped in BioWare's BMU container.

use std::io::{Read, SeekFrom};

use super::{Codec, StreamInfo};
use crate::archive::ReadSeek;
use crate::error::{CoreError, CoreResult};

const BMU_MAGIC: &[u8; 8] = b"BMU V1.0";
const ID3_HEADER_SIZE: u64 = 10;
/// How far past the tag to look for the first frame header.
const SYNC_WINDOW: u64 = 8192;

/// `true` if `bytes` starts with an MPEG audio frame sync.
pub fn is_frame_sync(bytes: &[u8]) -> bool {
    bytes.len() >= 2 && bytes[0] == 0xFF && bytes[1] & 0xE0 == 0xE0
}

/// Reads a BMU file: an 8-byte magic followed by plain MP3 data.
pub fn read_bmu(r: &mut dyn ReadSeek) -> CoreResult<StreamInfo> {
    let mut magic = [0u8; 8];
    r.read_exact(&mut magic)
        .map_err(|_| CoreError::Format("BMU: truncated header".to_string()))?;
    if &magic != BMU_MAGIC {
        return Err(CoreError::Format(format!(
            "BMU: unexpected version {:?}",
            String::from_utf8_lossy(&magic)
        )));
    }
    read(r)
}

/// Reads MP3 data from the current position, skipping an ID3v2 tag.
pub fn read(r: &mut dyn ReadSeek) -> CoreResult<StreamInfo> {
    let start = r.stream_position()?;
    let mut id3 = [0u8; ID3_HEADER_SIZE as usize];
    let got = read_up_to(r, &mut id3)?;
    let skip = if got == id3.len() && &id3[..3] == b"ID3" {
        let size = id3[6..10]
            .iter()
            .fold(0u64, |acc, &b| (acc << 7) | u64::from(b & 0x7F));
        let footer = if id3[5] & 0x10 != 0 { ID3_HEADER_SIZE } else { 0 };
        ID3_HEADER_SIZE + size + footer
    } else {
        0
    };
    r.seek(SeekFrom::Start(start + skip))?;

    let mut window = Vec::new();
    (&mut *r).take(SYNC_WINDOW).read_to_end(&mut window)?;
    window
        .windows(4)
        .find_map(parse_frame_header)
        .ok_or_else(|| CoreError::Format("MP3: no frame header found".to_string()))
}

/// Sample rate and channel count from a 4-byte frame header.
fn parse_frame_header(header: &[u8]) -> Option<StreamInfo> {
    if !is_frame_sync(header) {
        return None;
    }
    let version = (header[1] >> 3) & 0x3;
    let layer = (header[1] >> 1) & 0x3;
    let bitrate = header[2] >> 4;
    let rate_index = usize::from((header[2] >> 2) & 0x3);
    if layer == 0 || bitrate == 0xF || rate_index == 3 {
        return None;
    }
    let rates: [u32; 3] = match version {
        0b11 => [44100, 48000, 32000],
        0b10 => [22050, 24000, 16000],
        0b00 => [11025, 12000, 8000],
        _ => return None,
    };
    let channels = if header[3] >> 6 == 0b11 { 1 } else { 2 };

    Some(StreamInfo {
        codec: Codec::Mp3,
        channels,
        sample_rate: rates[rate_index],
        duration: None,
    })
}

fn read_up_to(r: &mut dyn ReadSeek, buf: &mut [u8]) -> CoreResult<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match r.read(&mut buf[filled..])? {
            0 => break,
            n => filled += n,
        }
    }
    Ok(filled)
}
