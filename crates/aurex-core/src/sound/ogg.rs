//! Ogg Vorbis identification headers.

use std::io::SeekFrom;

use byteorder::{LittleEndian, ReadBytesExt};

use super::{Codec, StreamInfo};
use crate::archive::ReadSeek;
use crate::error::{CoreError, CoreResult};

const PAGE_HEADER_SIZE: usize = 27;

/// Reads the first Ogg page and its Vorbis identification packet.
pub fn read(r: &mut dyn ReadSeek) -> CoreResult<StreamInfo> {
    let mut page = [0u8; PAGE_HEADER_SIZE];
    r.read_exact(&mut page).map_err(truncated)?;
    if &page[..4] != b"OggS" {
        return Err(CoreError::Format("Ogg: missing capture pattern".to_string()));
    }
    let segments = page[26];
    r.seek(SeekFrom::Current(i64::from(segments)))?;

    let mut packet = [0u8; 7];
    r.read_exact(&mut packet).map_err(truncated)?;
    if &packet != b"\x01vorbis" {
        return Err(CoreError::Format(
            "Ogg: first packet is not a Vorbis identification header".to_string(),
        ));
    }
    let _version = r.read_u32::<LittleEndian>().map_err(truncated)?;
    let channels = r.read_u8().map_err(truncated)?;
    let sample_rate = r.read_u32::<LittleEndian>().map_err(truncated)?;

    if channels == 0 || sample_rate == 0 {
        return Err(CoreError::Format(format!(
            "Ogg: invalid stream ({channels} channels, {sample_rate} Hz)"
        )));
    }

    Ok(StreamInfo {
        codec: Codec::Vorbis,
        channels: u16::from(channels),
        sample_rate,
        duration: None,
    })
}

fn truncated(err: std::io::Error) -> CoreError {
    if err.kind() == std::io::ErrorKind::UnexpectedEof {
        CoreError::Format("Ogg: truncated header".to_string())
    } else {
        CoreError::Io(err)
    }
}
