//! RIM archives.
//!
//! A RIM header is `RIM `, `V1.0`, a reserved u32, the entry count and
//! the offset to the key table (0 means the table starts at byte 120).
//! Each key entry is 32 bytes: a 16-byte name, then u32 type tag,
//! resource id, data offset and data size.

use std::io::{Seek, SeekFrom};

use byteorder::{LittleEndian, ReadBytesExt};

use super::{
    read_resref, read_tag, tag_str, truncated, Archive, ArchiveSource, DataFiles, Member,
    ResourceStream, MAX_PREALLOC,
};
use crate::error::{CoreError, CoreResult};

const DEFAULT_KEY_OFFSET: u32 = 120;

#[derive(Debug, Clone, Copy)]
struct Entry {
    offset: u32,
    size: u32,
}

/// A parsed RIM archive.
#[derive(Debug)]
pub struct RimFile {
    source: ArchiveSource,
    members: Vec<Member>,
    entries: Vec<Entry>,
}

impl RimFile {
    pub fn open(source: ArchiveSource) -> CoreResult<Self> {
        let mut r = source.open()?;

        let tag = read_tag(&mut r)?;
        if &tag != b"RIM " {
            return Err(CoreError::Format(format!("not a RIM file ({})", tag_str(&tag))));
        }
        let version = read_tag(&mut r)?;
        if &version != b"V1.0" {
            return Err(CoreError::Format(format!(
                "unsupported RIM version {}",
                tag_str(&version)
            )));
        }

        let _reserved = r.read_u32::<LittleEndian>().map_err(truncated)?;
        let entry_count = r.read_u32::<LittleEndian>().map_err(truncated)?;
        let key_offset = match r.read_u32::<LittleEndian>().map_err(truncated)? {
            0 => DEFAULT_KEY_OFFSET,
            offset => offset,
        };

        let capacity = (entry_count as usize).min(MAX_PREALLOC);
        let mut members = Vec::with_capacity(capacity);
        let mut entries = Vec::with_capacity(capacity);
        r.seek(SeekFrom::Start(u64::from(key_offset)))?;
        for index in 0..entry_count {
            let name = read_resref(&mut r, 16)?;
            let type_id = r.read_u32::<LittleEndian>().map_err(truncated)?;
            let _res_id = r.read_u32::<LittleEndian>().map_err(truncated)?;
            let offset = r.read_u32::<LittleEndian>().map_err(truncated)?;
            let size = r.read_u32::<LittleEndian>().map_err(truncated)?;
            members.push(Member {
                name,
                type_id,
                index,
            });
            entries.push(Entry { offset, size });
        }

        tracing::debug!(entries = entry_count, "parsed RIM index");

        Ok(Self {
            source,
            members,
            entries,
        })
    }

    fn entry(&self, index: u32) -> CoreResult<Entry> {
        self.entries
            .get(index as usize)
            .copied()
            .ok_or_else(|| CoreError::Format(format!("RIM resource index {index} out of range")))
    }
}

impl Archive for RimFile {
    fn members(&self) -> &[Member] {
        &self.members
    }

    fn resource_size(&self, index: u32, _data_files: &DataFiles) -> CoreResult<u64> {
        Ok(u64::from(self.entry(index)?.size))
    }

    fn resource(&self, index: u32, _data_files: &DataFiles) -> CoreResult<ResourceStream> {
        let entry = self.entry(index)?;
        self.source
            .extract(u64::from(entry.offset), u64::from(entry.size))
    }
}
