//! ERF archives (`ERF `, `MOD `, `HAK `, `SAV `, `NWM `).
//!
//! Layout, little-endian:
//!
//! | Offset | Field                                   |
//! |--------|-----------------------------------------|
//! | 0x00   | file tag, 4 bytes                       |
//! | 0x04   | version, `V1.0` or `V1.1`               |
//! | 0x08   | language count                          |
//! | 0x0C   | localized string size                   |
//! | 0x10   | entry count                             |
//! | 0x14   | offset to localized strings             |
//! | 0x18   | offset to key list                      |
//! | 0x1C   | offset to resource list                 |
//!
//! Key entries are a NUL-padded name (16 bytes for V1.0, 32 for V1.1),
//! a u32 resource id, a u16 type tag and two unused bytes. Resource
//! entries are `(offset: u32, size: u32)` in the same order.

use std::io::{Seek, SeekFrom};

use byteorder::{LittleEndian, ReadBytesExt};

use super::{
    read_resref, read_tag, tag_str, truncated, Archive, ArchiveSource, DataFiles, Member,
    ResourceStream, MAX_PREALLOC,
};
use crate::error::{CoreError, CoreResult};

const ERF_TAGS: [&[u8; 4]; 5] = [b"ERF ", b"MOD ", b"HAK ", b"SAV ", b"NWM "];

#[derive(Debug, Clone, Copy)]
struct Entry {
    offset: u32,
    size: u32,
}

/// A parsed ERF-family archive.
#[derive(Debug)]
pub struct ErfFile {
    source: ArchiveSource,
    members: Vec<Member>,
    entries: Vec<Entry>,
}

impl ErfFile {
    /// Reads the header and both index tables.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Format`] for unknown tags, versions or a
    /// truncated index.
    pub fn open(source: ArchiveSource) -> CoreResult<Self> {
        let mut r = source.open()?;

        let tag = read_tag(&mut r)?;
        if !ERF_TAGS.contains(&&tag) {
            return Err(CoreError::Format(format!("not an ERF file ({})", tag_str(&tag))));
        }
        let version = read_tag(&mut r)?;
        let name_len = match &version {
            b"V1.0" => 16,
            b"V1.1" => 32,
            other => {
                return Err(CoreError::Format(format!(
                    "unsupported ERF version {}",
                    tag_str(other)
                )))
            }
        };

        let _language_count = r.read_u32::<LittleEndian>().map_err(truncated)?;
        let _localized_size = r.read_u32::<LittleEndian>().map_err(truncated)?;
        let entry_count = r.read_u32::<LittleEndian>().map_err(truncated)?;
        let _localized_offset = r.read_u32::<LittleEndian>().map_err(truncated)?;
        let key_offset = r.read_u32::<LittleEndian>().map_err(truncated)?;
        let resource_offset = r.read_u32::<LittleEndian>().map_err(truncated)?;

        let capacity = (entry_count as usize).min(MAX_PREALLOC);
        let mut members = Vec::with_capacity(capacity);
        r.seek(SeekFrom::Start(u64::from(key_offset)))?;
        for index in 0..entry_count {
            let name = read_resref(&mut r, name_len)?;
            let _res_id = r.read_u32::<LittleEndian>().map_err(truncated)?;
            let type_id = r.read_u16::<LittleEndian>().map_err(truncated)?;
            let _unused = r.read_u16::<LittleEndian>().map_err(truncated)?;
            members.push(Member {
                name,
                type_id: u32::from(type_id),
                index,
            });
        }

        let mut entries = Vec::with_capacity(capacity);
        r.seek(SeekFrom::Start(u64::from(resource_offset)))?;
        for _ in 0..entry_count {
            let offset = r.read_u32::<LittleEndian>().map_err(truncated)?;
            let size = r.read_u32::<LittleEndian>().map_err(truncated)?;
            entries.push(Entry { offset, size });
        }

        tracing::debug!(entries = entry_count, version = %tag_str(&version), "parsed ERF index");

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
            .ok_or_else(|| CoreError::Format(format!("ERF resource index {index} out of range")))
    }
}

impl Archive for ErfFile {
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
