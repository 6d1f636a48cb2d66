//! Aurora archive containers.
//!
//! An [`Archive`] exposes a flat member list and extracts members as
//! seekable streams. KEY indices keep their payload in separate BIF
//! [`DataFile`]s, which the [`registry::ArchiveRegistry`] opens and binds
//! after the KEY itself has been parsed.

pub mod bif;
pub mod erf;
pub mod key;
pub mod registry;
pub mod rim;

use std::fs;
use std::io::{BufReader, Cursor, Read, Seek, SeekFrom};
use std::path::PathBuf;
use std::sync::Arc;

use crate::error::{CoreError, CoreResult};
use crate::types::{ArchiveKind, FileType};

pub use bif::BifFile;
pub use erf::ErfFile;
pub use key::KeyFile;
pub use registry::{ArchiveId, ArchiveKey, ArchiveRegistry, DataFileId, DataFileKey, DataFiles};
pub use rim::RimFile;

/// A readable, seekable byte source.
pub trait ReadSeek: Read + Seek {}

impl<T: Read + Seek> ReadSeek for T {}

/// An owned stream over one resource's bytes, positioned at offset 0.
pub type ResourceStream = Box<dyn ReadSeek>;

/// One entry in an archive's index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Member {
    /// Resource name without extension.
    pub name: String,
    /// Numeric type tag; see [`FileType::from_id`].
    pub type_id: u32,
    /// Position of the member within its archive.
    pub index: u32,
}

/// Where an archive's bytes come from.
#[derive(Debug, Clone)]
pub enum ArchiveSource {
    /// A file on disk, reopened for every extraction.
    File(PathBuf),
    /// An in-memory copy, used for archives nested inside other archives.
    Memory(Arc<[u8]>),
}

impl ArchiveSource {
    /// Opens a fresh stream at offset 0.
    pub fn open(&self) -> CoreResult<ResourceStream> {
        match self {
            ArchiveSource::File(path) => {
                let file = fs::File::open(path).map_err(|e| CoreError::from_io(e, path))?;
                Ok(Box::new(BufReader::new(file)))
            }
            ArchiveSource::Memory(bytes) => Ok(Box::new(Cursor::new(Arc::clone(bytes)))),
        }
    }

    /// Reads `size` bytes at `offset` into a standalone stream.
    pub fn extract(&self, offset: u64, size: u64) -> CoreResult<ResourceStream> {
        let mut stream = self.open()?;
        stream.seek(SeekFrom::Start(offset))?;
        let mut data = Vec::new();
        let read = stream.take(size).read_to_end(&mut data)?;
        if (read as u64) < size {
            return Err(CoreError::Format(format!(
                "resource at offset {offset} wants {size} bytes, only {read} available"
            )));
        }
        Ok(Box::new(Cursor::new(data)))
    }
}

/// A parsed archive index.
pub trait Archive {
    /// Returns every member, in index order.
    fn members(&self) -> &[Member];

    /// Returns the stored byte length of member `index`.
    fn resource_size(&self, index: u32, data_files: &DataFiles) -> CoreResult<u64>;

    /// Extracts member `index`.
    fn resource(&self, index: u32, data_files: &DataFiles) -> CoreResult<ResourceStream>;

    /// Names of external data files this archive stores resources in.
    fn data_file_names(&self) -> &[String] {
        &[]
    }

    /// Attaches an opened data file to the slot at `data_file_names()[slot]`.
    fn bind_data_file(&mut self, _slot: usize, _id: DataFileId) {}
}

/// Resource storage referenced by a KEY index.
pub trait DataFile {
    fn resource_size(&self, index: u32) -> CoreResult<u64>;
    fn resource(&self, index: u32) -> CoreResult<ResourceStream>;
}

/// Constructs archive and data-file readers for a file type.
pub trait ArchiveOpener {
    fn open_archive(&self, file_type: FileType, source: ArchiveSource)
        -> CoreResult<Box<dyn Archive>>;

    fn open_data_file(
        &self,
        file_type: FileType,
        source: ArchiveSource,
    ) -> CoreResult<Box<dyn DataFile>>;
}

/// The built-in readers for ERF, RIM, KEY and BIF.
#[derive(Debug, Clone, Copy, Default)]
pub struct AuroraOpener;

impl ArchiveOpener for AuroraOpener {
    fn open_archive(
        &self,
        file_type: FileType,
        source: ArchiveSource,
    ) -> CoreResult<Box<dyn Archive>> {
        match file_type.archive_kind() {
            Some(ArchiveKind::Erf) => Ok(Box::new(ErfFile::open(source)?)),
            Some(ArchiveKind::Rim) => Ok(Box::new(RimFile::open(source)?)),
            Some(ArchiveKind::Key) => Ok(Box::new(KeyFile::open(source)?)),
            None => Err(CoreError::UnsupportedType(file_type)),
        }
    }

    fn open_data_file(
        &self,
        file_type: FileType,
        source: ArchiveSource,
    ) -> CoreResult<Box<dyn DataFile>> {
        match file_type {
            FileType::Bif => Ok(Box::new(BifFile::open(source)?)),
            other => Err(CoreError::UnsupportedType(other)),
        }
    }
}

/// Reads a four-byte tag such as `ERF ` or `V1.0`.
pub(crate) fn read_tag(r: &mut impl Read) -> CoreResult<[u8; 4]> {
    let mut tag = [0u8; 4];
    r.read_exact(&mut tag).map_err(truncated)?;
    Ok(tag)
}

/// Reads a fixed-width, NUL-padded resource name.
pub(crate) fn read_resref(r: &mut impl Read, len: usize) -> CoreResult<String> {
    let mut buf = vec![0u8; len];
    r.read_exact(&mut buf).map_err(truncated)?;
    let end = buf.iter().position(|&b| b == 0).unwrap_or(len);
    Ok(String::from_utf8_lossy(&buf[..end]).into_owned())
}

/// Maps an unexpected EOF while parsing a header to a format error.
pub(crate) fn truncated(err: std::io::Error) -> CoreError {
    if err.kind() == std::io::ErrorKind::UnexpectedEof {
        CoreError::Format("unexpected end of archive header".to_string())
    } else {
        CoreError::Io(err)
    }
}

pub(crate) fn tag_str(tag: &[u8; 4]) -> String {
    String::from_utf8_lossy(tag).into_owned()
}

/// Upper bound for preallocating index tables read from untrusted headers.
pub(crate) const MAX_PREALLOC: usize = 4096;

#[cfg(test)]
pub(crate) mod fixtures {
    //! Byte-level builders for archive fixtures.

    use byteorder::{LittleEndian, WriteBytesExt};

    pub fn resref(name: &str, len: usize) -> Vec<u8> {
        let mut out = name.as_bytes().to_vec();
        out.resize(len, 0);
        out
    }

    /// Builds an ERF V1.0 image holding `(name, type_id, data)` entries.
    pub fn erf(tag: &[u8; 4], entries: &[(&str, u16, &[u8])]) -> Vec<u8> {
        let header_len = 160u32;
        let keys_len = 24 * entries.len() as u32;
        let res_len = 8 * entries.len() as u32;
        let off_keys = header_len;
        let off_res = off_keys + keys_len;
        let mut data_off = off_res + res_len;

        let mut out = Vec::new();
        out.extend_from_slice(tag);
        out.extend_from_slice(b"V1.0");
        out.write_u32::<LittleEndian>(0).unwrap(); // language count
        out.write_u32::<LittleEndian>(0).unwrap(); // localized string size
        out.write_u32::<LittleEndian>(entries.len() as u32).unwrap();
        out.write_u32::<LittleEndian>(header_len).unwrap(); // localized strings
        out.write_u32::<LittleEndian>(off_keys).unwrap();
        out.write_u32::<LittleEndian>(off_res).unwrap();
        out.resize(header_len as usize, 0);

        for (i, (name, ty, _)) in entries.iter().enumerate() {
            out.extend_from_slice(&resref(name, 16));
            out.write_u32::<LittleEndian>(i as u32).unwrap();
            out.write_u16::<LittleEndian>(*ty).unwrap();
            out.write_u16::<LittleEndian>(0).unwrap();
        }
        for (_, _, data) in entries {
            out.write_u32::<LittleEndian>(data_off).unwrap();
            out.write_u32::<LittleEndian>(data.len() as u32).unwrap();
            data_off += data.len() as u32;
        }
        for (_, _, data) in entries {
            out.extend_from_slice(data);
        }
        out
    }

    /// Builds a BIF V1 image; entry `i` gets resource id `i`.
    pub fn bif(entries: &[(u32, &[u8])]) -> Vec<u8> {
        let header_len = 20u32;
        let mut data_off = header_len + 16 * entries.len() as u32;
        let mut out = Vec::new();
        out.extend_from_slice(b"BIFF");
        out.extend_from_slice(b"V1  ");
        out.write_u32::<LittleEndian>(entries.len() as u32).unwrap();
        out.write_u32::<LittleEndian>(0).unwrap();
        out.write_u32::<LittleEndian>(header_len).unwrap();
        for (i, (ty, data)) in entries.iter().enumerate() {
            out.write_u32::<LittleEndian>(i as u32).unwrap();
            out.write_u32::<LittleEndian>(data_off).unwrap();
            out.write_u32::<LittleEndian>(data.len() as u32).unwrap();
            out.write_u32::<LittleEndian>(*ty).unwrap();
            data_off += data.len() as u32;
        }
        for (_, data) in entries {
            out.extend_from_slice(data);
        }
        out
    }

    /// Builds a KEY V1 image referencing `bifs` with `(name, type, bif, res)` keys.
    pub fn key(bifs: &[&str], keys: &[(&str, u16, u32, u32)]) -> Vec<u8> {
        let header_len = 64u32;
        let off_files = header_len;
        let mut name_off = off_files + 12 * bifs.len() as u32;
        let names_len: u32 = bifs.iter().map(|b| b.len() as u32 + 1).sum();
        let off_keys = name_off + names_len;

        let mut out = Vec::new();
        out.extend_from_slice(b"KEY ");
        out.extend_from_slice(b"V1  ");
        out.write_u32::<LittleEndian>(bifs.len() as u32).unwrap();
        out.write_u32::<LittleEndian>(keys.len() as u32).unwrap();
        out.write_u32::<LittleEndian>(off_files).unwrap();
        out.write_u32::<LittleEndian>(off_keys).unwrap();
        out.resize(header_len as usize, 0);

        for name in bifs {
            out.write_u32::<LittleEndian>(0).unwrap();
            out.write_u32::<LittleEndian>(name_off).unwrap();
            out.write_u16::<LittleEndian>(name.len() as u16 + 1).unwrap();
            out.write_u16::<LittleEndian>(1).unwrap();
            name_off += name.len() as u32 + 1;
        }
        for name in bifs {
            out.extend_from_slice(name.as_bytes());
            out.push(0);
        }
        for (name, ty, bif, res) in keys {
            out.extend_from_slice(&resref(name, 16));
            out.write_u16::<LittleEndian>(*ty).unwrap();
            out.write_u32::<LittleEndian>((bif << 20) | res).unwrap();
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;
    use tempfile::TempDir;

    #[test]
    fn memory_source_extracts_range() {
        let source = ArchiveSource::Memory(Arc::from(&b"0123456789"[..]));
        let mut stream = source.extract(2, 4).unwrap();
        let mut out = String::new();
        stream.read_to_string(&mut out).unwrap();
        assert_eq!(out, "2345");
    }

    #[test]
    fn extract_past_end_is_format_error() {
        let source = ArchiveSource::Memory(Arc::from(&b"short"[..]));
        let err = source.extract(2, 100).err().unwrap();
        assert!(matches!(err, CoreError::Format(_)));
    }

    #[test]
    fn file_source_missing_is_not_found() {
        let tmp = TempDir::new().unwrap();
        let source = ArchiveSource::File(tmp.path().join("gone.erf"));
        assert!(matches!(source.open().err().unwrap(), CoreError::NotFound(_)));
    }

    #[test]
    fn opener_rejects_non_archive_types() {
        let source = ArchiveSource::Memory(Arc::from(&b""[..]));
        let err = AuroraOpener.open_archive(FileType::Txt, source).err().unwrap();
        assert!(matches!(err, CoreError::UnsupportedType(FileType::Txt)));
    }

    #[test]
    fn opener_dispatches_erf_family() {
        let bytes = fixtures::erf(b"HAK ", &[("door", 2033, b"abc")]);
        let archive = AuroraOpener
            .open_archive(FileType::Hak, ArchiveSource::Memory(Arc::from(bytes)))
            .unwrap();
        assert_eq!(archive.members().len(), 1);
        assert_eq!(archive.members()[0].name, "door");
    }

    #[test]
    fn read_resref_stops_at_nul() {
        let bytes = fixtures::resref("tex01", 16);
        let name = read_resref(&mut &bytes[..], 16).unwrap();
        assert_eq!(name, "tex01");
    }
}
