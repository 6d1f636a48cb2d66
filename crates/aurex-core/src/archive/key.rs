//! KEY index files.
//!
//! A KEY lists BIF data files and maps resource names to a location
//! inside one of them. The upper 12 bits of a resource id select the BIF
//! in the file table, the lower 20 bits the resource within that BIF.
//! The BIFs themselves are opened by the registry and attached with
//! [`Archive::bind_data_file`].

use std::io::{Read, Seek, SeekFrom};
use std::path::PathBuf;

use byteorder::{LittleEndian, ReadBytesExt};

use super::{
    read_resref, read_tag, tag_str, truncated, Archive, ArchiveSource, DataFileId, DataFiles,
    Member, ResourceStream, MAX_PREALLOC,
};
use crate::error::{CoreError, CoreResult};

#[derive(Debug, Clone, Copy)]
struct Location {
    data_file: u32,
    index: u32,
}

/// A parsed KEY file.
#[derive(Debug)]
pub struct KeyFile {
    members: Vec<Member>,
    locations: Vec<Location>,
    data_file_names: Vec<String>,
    bound: Vec<Option<DataFileId>>,
}

impl KeyFile {
    pub fn open(source: ArchiveSource) -> CoreResult<Self> {
        let mut r = source.open()?;

        let tag = read_tag(&mut r)?;
        if &tag != b"KEY " {
            return Err(CoreError::Format(format!("not a KEY file ({})", tag_str(&tag))));
        }
        let version = read_tag(&mut r)?;
        if &version != b"V1  " && &version != b"V1.1" {
            return Err(CoreError::Format(format!(
                "unsupported KEY version {}",
                tag_str(&version)
            )));
        }

        let file_count = r.read_u32::<LittleEndian>().map_err(truncated)?;
        let key_count = r.read_u32::<LittleEndian>().map_err(truncated)?;
        let file_table_offset = r.read_u32::<LittleEndian>().map_err(truncated)?;
        let key_table_offset = r.read_u32::<LittleEndian>().map_err(truncated)?;

        r.seek(SeekFrom::Start(u64::from(file_table_offset)))?;
        let mut name_spans = Vec::with_capacity((file_count as usize).min(MAX_PREALLOC));
        for _ in 0..file_count {
            let _file_size = r.read_u32::<LittleEndian>().map_err(truncated)?;
            let name_offset = r.read_u32::<LittleEndian>().map_err(truncated)?;
            let name_size = r.read_u16::<LittleEndian>().map_err(truncated)?;
            let _drives = r.read_u16::<LittleEndian>().map_err(truncated)?;
            name_spans.push((name_offset, name_size));
        }

        let mut data_file_names = Vec::with_capacity(name_spans.len());
        for (offset, size) in name_spans {
            r.seek(SeekFrom::Start(u64::from(offset)))?;
            let mut buf = vec![0u8; usize::from(size)];
            r.read_exact(&mut buf).map_err(truncated)?;
            let end = buf.iter().position(|&b| b == 0).unwrap_or(buf.len());
            data_file_names.push(String::from_utf8_lossy(&buf[..end]).replace('\\', "/"));
        }

        r.seek(SeekFrom::Start(u64::from(key_table_offset)))?;
        let capacity = (key_count as usize).min(MAX_PREALLOC);
        let mut members = Vec::with_capacity(capacity);
        let mut locations = Vec::with_capacity(capacity);
        for index in 0..key_count {
            let name = read_resref(&mut r, 16)?;
            let type_id = r.read_u16::<LittleEndian>().map_err(truncated)?;
            let res_id = r.read_u32::<LittleEndian>().map_err(truncated)?;
            members.push(Member {
                name,
                type_id: u32::from(type_id),
                index,
            });
            locations.push(Location {
                data_file: res_id >> 20,
                index: res_id & 0x000F_FFFF,
            });
        }

        tracing::debug!(data_files = file_count, keys = key_count, "parsed KEY index");

        let bound = vec![None; data_file_names.len()];
        Ok(Self {
            members,
            locations,
            data_file_names,
            bound,
        })
    }

    fn locate<'a>(
        &self,
        index: u32,
        data_files: &'a DataFiles,
    ) -> CoreResult<(&'a dyn super::DataFile, u32)> {
        let location = self
            .locations
            .get(index as usize)
            .copied()
            .ok_or_else(|| CoreError::Format(format!("KEY resource index {index} out of range")))?;
        let slot = location.data_file as usize;
        let name = self.data_file_names.get(slot).ok_or_else(|| {
            CoreError::Format(format!("KEY references missing data file #{slot}"))
        })?;
        let id = self.bound[slot].ok_or_else(|| CoreError::NotFound(PathBuf::from(name)))?;
        let file = data_files.get(id).ok_or(CoreError::NoArchive)?;
        Ok((file, location.index))
    }
}

impl Archive for KeyFile {
    fn members(&self) -> &[Member] {
        &self.members
    }

    fn resource_size(&self, index: u32, data_files: &DataFiles) -> CoreResult<u64> {
        let (file, res) = self.locate(index, data_files)?;
        file.resource_size(res)
    }

    fn resource(&self, index: u32, data_files: &DataFiles) -> CoreResult<ResourceStream> {
        let (file, res) = self.locate(index, data_files)?;
        file.resource(res)
    }

    fn data_file_names(&self) -> &[String] {
        &self.data_file_names
    }

    fn bind_data_file(&mut self, slot: usize, id: DataFileId) {
        if let Some(entry) = self.bound.get_mut(slot) {
            *entry = Some(id);
        }
    }
}
