//! BIF data files.
//!
//! A BIF holds the payload for resources indexed by a KEY file. The
//! header is `BIFF`, `V1  `, the variable resource count, the fixed
//! resource count and the offset to the variable resource table. Each
//! table entry is `(id, offset, size, type)`, all u32; the low 20 bits of
//! `id` are the index a KEY uses to address the resource.

use std::collections::HashMap;
use std::io::{Seek, SeekFrom};

use byteorder::{LittleEndian, ReadBytesExt};

use super::{read_tag, tag_str, truncated, ArchiveSource, DataFile, ResourceStream, MAX_PREALLOC};
use crate::error::{CoreError, CoreResult};

const INDEX_MASK: u32 = 0x000F_FFFF;

#[derive(Debug, Clone, Copy)]
struct Entry {
    offset: u32,
    size: u32,
    type_id: u32,
}

/// A parsed BIF data file.
#[derive(Debug)]
pub struct BifFile {
    source: ArchiveSource,
    entries: HashMap<u32, Entry>,
}

impl BifFile {
    pub fn open(source: ArchiveSource) -> CoreResult<Self> {
        let mut r = source.open()?;

        let tag = read_tag(&mut r)?;
        if &tag != b"BIFF" {
            return Err(CoreError::Format(format!("not a BIF file ({})", tag_str(&tag))));
        }
        let version = read_tag(&mut r)?;
        if &version != b"V1  " && &version != b"V1.1" {
            return Err(CoreError::Format(format!(
                "unsupported BIF version {}",
                tag_str(&version)
            )));
        }

        let var_count = r.read_u32::<LittleEndian>().map_err(truncated)?;
        let _fixed_count = r.read_u32::<LittleEndian>().map_err(truncated)?;
        let table_offset = r.read_u32::<LittleEndian>().map_err(truncated)?;

        let mut entries = HashMap::with_capacity((var_count as usize).min(MAX_PREALLOC));
        r.seek(SeekFrom::Start(u64::from(table_offset)))?;
        for _ in 0..var_count {
            let id = r.read_u32::<LittleEndian>().map_err(truncated)?;
            let offset = r.read_u32::<LittleEndian>().map_err(truncated)?;
            let size = r.read_u32::<LittleEndian>().map_err(truncated)?;
            let type_id = r.read_u32::<LittleEndian>().map_err(truncated)?;
            entries.insert(
                id & INDEX_MASK,
                Entry {
                    offset,
                    size,
                    type_id,
                },
            );
        }

        tracing::debug!(resources = var_count, "parsed BIF table");

        Ok(Self { source, entries })
    }

    /// Returns the type tag the BIF itself records for resource `index`.
    pub fn resource_type_id(&self, index: u32) -> Option<u32> {
        self.entries.get(&index).map(|e| e.type_id)
    }

    /// Number of variable resources in the table.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn entry(&self, index: u32) -> CoreResult<Entry> {
        self.entries
            .get(&index)
            .copied()
            .ok_or_else(|| CoreError::Format(format!("BIF has no resource with index {index}")))
    }
}

impl DataFile for BifFile {
    fn resource_size(&self, index: u32) -> CoreResult<u64> {
        Ok(u64::from(self.entry(index)?.size))
    }

    fn resource(&self, index: u32) -> CoreResult<ResourceStream> {
        let entry = self.entry(index)?;
        self.source
            .extract(u64::from(entry.offset), u64::from(entry.size))
    }
}
