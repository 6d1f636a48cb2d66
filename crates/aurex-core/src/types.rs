//! File and resource type classification.
//!
//! Aurora archives identify resources by a numeric type tag instead of a
//! file extension. The tables here map between tags, extensions and the
//! coarse [`ResourceType`] category used to pick a preview. Everything is
//! a pure lookup over `const` data.

use std::fmt;

/// Classification by container format or file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileType {
    /// No recognised extension, or a directory.
    None,
    Res,
    Bmp,
    Mve,
    Tga,
    Wav,
    Plt,
    Ini,
    Bmu,
    Mpg,
    Txt,
    Wma,
    Wmv,
    Xmv,
    Plh,
    Tex,
    Mdl,
    Thg,
    Fnt,
    Lua,
    Slt,
    Nss,
    Ncs,
    Mod,
    Are,
    Set,
    Ifo,
    Bic,
    Wok,
    TwoDa,
    Tlk,
    Txi,
    Git,
    Uti,
    Utc,
    Dlg,
    Itp,
    Utt,
    Dds,
    Uts,
    Ltr,
    Gff,
    Fac,
    Ute,
    Utd,
    Utp,
    Dft,
    Gic,
    Gui,
    Utm,
    Dwk,
    Pwk,
    Jrl,
    Sav,
    Utw,
    Ssf,
    Hak,
    Nwm,
    Bik,
    Ptm,
    Ptt,
    Lyt,
    Vis,
    Rim,
    Pth,
    Lip,
    Bwm,
    Txb,
    Tpc,
    Mdx,
    Erf,
    Bif,
    Key,
    Bzf,
    Png,
    Jpg,
    Ico,
    Cur,
    Curs,
    Sbm,
    Txb2,
    Ogg,
    Zip,
}

/// Classification by the kind of payload a resource carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceType {
    None,
    Image,
    Video,
    Sound,
}

/// The archive reader responsible for a container file type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArchiveKind {
    /// ERF V1.0/V1.1 and its aliases (MOD, HAK, SAV, NWM).
    Erf,
    Rim,
    /// KEY index whose resources live in BIF data files.
    Key,
}

// Ids below 20000 are the engine's own type tags. Types the engine never
// stores in an archive index get ids from 20000 upwards.
pub(crate) const TYPES: &[(FileType, u32, &str)] = &[
    (FileType::Res, 0, "res"),
    (FileType::Bmp, 1, "bmp"),
    (FileType::Mve, 2, "mve"),
    (FileType::Tga, 3, "tga"),
    (FileType::Wav, 4, "wav"),
    (FileType::Plt, 6, "plt"),
    (FileType::Ini, 7, "ini"),
    (FileType::Bmu, 8, "bmu"),
    (FileType::Mpg, 9, "mpg"),
    (FileType::Txt, 10, "txt"),
    (FileType::Wma, 11, "wma"),
    (FileType::Wmv, 12, "wmv"),
    (FileType::Xmv, 13, "xmv"),
    (FileType::Plh, 2000, "plh"),
    (FileType::Tex, 2001, "tex"),
    (FileType::Mdl, 2002, "mdl"),
    (FileType::Thg, 2003, "thg"),
    (FileType::Fnt, 2005, "fnt"),
    (FileType::Lua, 2007, "lua"),
    (FileType::Slt, 2008, "slt"),
    (FileType::Nss, 2009, "nss"),
    (FileType::Ncs, 2010, "ncs"),
    (FileType::Mod, 2011, "mod"),
    (FileType::Are, 2012, "are"),
    (FileType::Set, 2013, "set"),
    (FileType::Ifo, 2014, "ifo"),
    (FileType::Bic, 2015, "bic"),
    (FileType::Wok, 2016, "wok"),
    (FileType::TwoDa, 2017, "2da"),
    (FileType::Tlk, 2018, "tlk"),
    (FileType::Txi, 2022, "txi"),
    (FileType::Git, 2023, "git"),
    (FileType::Uti, 2025, "uti"),
    (FileType::Utc, 2027, "utc"),
    (FileType::Dlg, 2029, "dlg"),
    (FileType::Itp, 2030, "itp"),
    (FileType::Utt, 2032, "utt"),
    (FileType::Dds, 2033, "dds"),
    (FileType::Uts, 2035, "uts"),
    (FileType::Ltr, 2036, "ltr"),
    (FileType::Gff, 2037, "gff"),
    (FileType::Fac, 2038, "fac"),
    (FileType::Ute, 2040, "ute"),
    (FileType::Utd, 2042, "utd"),
    (FileType::Utp, 2044, "utp"),
    (FileType::Dft, 2045, "dft"),
    (FileType::Gic, 2046, "gic"),
    (FileType::Gui, 2047, "gui"),
    (FileType::Utm, 2051, "utm"),
    (FileType::Dwk, 2052, "dwk"),
    (FileType::Pwk, 2053, "pwk"),
    (FileType::Jrl, 2056, "jrl"),
    (FileType::Sav, 2057, "sav"),
    (FileType::Utw, 2058, "utw"),
    (FileType::Ssf, 2060, "ssf"),
    (FileType::Hak, 2061, "hak"),
    (FileType::Nwm, 2062, "nwm"),
    (FileType::Bik, 2063, "bik"),
    (FileType::Ptm, 2065, "ptm"),
    (FileType::Ptt, 2066, "ptt"),
    (FileType::Lyt, 3000, "lyt"),
    (FileType::Vis, 3001, "vis"),
    (FileType::Rim, 3002, "rim"),
    (FileType::Pth, 3003, "pth"),
    (FileType::Lip, 3004, "lip"),
    (FileType::Bwm, 3005, "bwm"),
    (FileType::Txb, 3006, "txb"),
    (FileType::Tpc, 3007, "tpc"),
    (FileType::Mdx, 3008, "mdx"),
    (FileType::Erf, 9997, "erf"),
    (FileType::Bif, 9998, "bif"),
    (FileType::Key, 9999, "key"),
    (FileType::Bzf, 20000, "bzf"),
    (FileType::Png, 20001, "png"),
    (FileType::Jpg, 20002, "jpg"),
    (FileType::Ico, 20003, "ico"),
    (FileType::Cur, 20004, "cur"),
    (FileType::Curs, 20005, "curs"),
    (FileType::Sbm, 20006, "sbm"),
    (FileType::Txb2, 20007, "txb2"),
    (FileType::Ogg, 20008, "ogg"),
    (FileType::Zip, 20009, "zip"),
];

impl FileType {
    /// Looks up a type by its numeric archive tag. Unknown tags map to [`FileType::None`].
    pub fn from_id(id: u32) -> FileType {
        TYPES
            .iter()
            .find(|(_, tag, _)| *tag == id)
            .map(|(ty, _, _)| *ty)
            .unwrap_or(FileType::None)
    }

    /// Looks up a type by extension, ignoring ASCII case.
    pub fn from_extension(ext: &str) -> FileType {
        TYPES
            .iter()
            .find(|(_, _, e)| e.eq_ignore_ascii_case(ext))
            .map(|(ty, _, _)| *ty)
            .unwrap_or(FileType::None)
    }

    /// Returns the numeric tag, or `None` for [`FileType::None`].
    pub fn id(self) -> Option<u32> {
        self.entry().map(|(_, id, _)| *id)
    }

    /// Returns the lowercase extension without the dot.
    pub fn extension(self) -> Option<&'static str> {
        self.entry().map(|(_, _, ext)| *ext)
    }

    /// Returns the payload category of this file type.
    pub fn resource_type(self) -> ResourceType {
        match self {
            FileType::Bmp
            | FileType::Tga
            | FileType::Dds
            | FileType::Tpc
            | FileType::Txb
            | FileType::Txb2
            | FileType::Sbm
            | FileType::Cur
            | FileType::Curs
            | FileType::Png
            | FileType::Jpg => ResourceType::Image,
            FileType::Wav | FileType::Bmu | FileType::Ogg | FileType::Wma => ResourceType::Sound,
            FileType::Bik | FileType::Mve | FileType::Mpg | FileType::Wmv | FileType::Xmv => {
                ResourceType::Video
            }
            _ => ResourceType::None,
        }
    }

    /// Returns the archive reader for container types.
    pub fn archive_kind(self) -> Option<ArchiveKind> {
        match self {
            FileType::Erf | FileType::Mod | FileType::Hak | FileType::Sav | FileType::Nwm => {
                Some(ArchiveKind::Erf)
            }
            FileType::Rim => Some(ArchiveKind::Rim),
            FileType::Key => Some(ArchiveKind::Key),
            _ => None,
        }
    }

    /// Returns `true` for files a KEY index can reference as resource storage.
    pub fn is_data_file(self) -> bool {
        matches!(self, FileType::Bif | FileType::Bzf)
    }

    fn entry(self) -> Option<&'static (FileType, u32, &'static str)> {
        TYPES.iter().find(|(ty, _, _)| *ty == self)
    }
}

impl fmt::Display for FileType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.entry() {
            Some((_, id, ext)) => write!(f, "{id} ({ext})"),
            None => f.write_str("none"),
        }
    }
}

impl ResourceType {
    /// Human-readable category name.
    pub fn description(self) -> &'static str {
        match self {
            ResourceType::None => "None",
            ResourceType::Image => "Image",
            ResourceType::Video => "Video",
            ResourceType::Sound => "Sound",
        }
    }

    /// Lowercase name with an indefinite article, for messages.
    pub fn with_article(self) -> &'static str {
        match self {
            ResourceType::None => "a typed",
            ResourceType::Image => "an image",
            ResourceType::Video => "a video",
            ResourceType::Sound => "a sound",
        }
    }
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}

/// Classifies a file name by its extension.
pub fn file_type_from_name(name: &str) -> FileType {
    match name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => FileType::from_extension(ext),
        _ => FileType::None,
    }
}

/// Classifies a file name by payload category.
pub fn resource_type_from_name(name: &str) -> ResourceType {
    file_type_from_name(name).resource_type()
}

/// Rebuilds a file name from an archive resource name and its type tag.
///
/// Unknown tags yield the bare name, which classifies as [`FileType::None`].
pub fn compose_filename(base: &str, type_id: u32) -> String {
    match FileType::from_id(type_id).extension() {
        Some(ext) => format!("{base}.{ext}"),
        None => base.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_id_known_tags() {
        assert_eq!(FileType::from_id(3), FileType::Tga);
        assert_eq!(FileType::from_id(2033), FileType::Dds);
        assert_eq!(FileType::from_id(3007), FileType::Tpc);
        assert_eq!(FileType::from_id(9999), FileType::Key);
    }

    #[test]
    fn from_id_unknown_tag_is_none() {
        assert_eq!(FileType::from_id(65000), FileType::None);
    }

    #[test]
    fn tags_are_unique() {
        for (i, (_, a, ext_a)) in TYPES.iter().enumerate() {
            for (_, b, ext_b) in &TYPES[i + 1..] {
                assert_ne!(a, b, "duplicate tag {a}");
                assert_ne!(ext_a, ext_b, "duplicate extension {ext_a}");
            }
        }
    }

    #[test]
    fn extension_lookup_is_case_insensitive() {
        assert_eq!(file_type_from_name("TEX01.DDS"), FileType::Dds);
        assert_eq!(file_type_from_name("readme.Txt"), FileType::Txt);
    }

    #[test]
    fn names_without_extension_are_none() {
        assert_eq!(file_type_from_name("Makefile"), FileType::None);
        assert_eq!(file_type_from_name(".hidden"), FileType::None);
        assert_eq!(file_type_from_name("archive."), FileType::None);
    }

    #[test]
    fn two_da_extension() {
        assert_eq!(file_type_from_name("appearance.2da"), FileType::TwoDa);
        assert_eq!(FileType::TwoDa.extension(), Some("2da"));
    }

    #[test]
    fn resource_categories() {
        assert_eq!(resource_type_from_name("a.tga"), ResourceType::Image);
        assert_eq!(resource_type_from_name("a.txb2"), ResourceType::Image);
        assert_eq!(resource_type_from_name("a.wav"), ResourceType::Sound);
        assert_eq!(resource_type_from_name("a.bik"), ResourceType::Video);
        assert_eq!(resource_type_from_name("a.ico"), ResourceType::None);
        assert_eq!(resource_type_from_name("a.txt"), ResourceType::None);
    }

    #[test]
    fn compose_then_classify_recovers_every_tag() {
        for (ty, id, _) in TYPES {
            let name = compose_filename("res", *id);
            assert_eq!(file_type_from_name(&name), *ty, "tag {id}");
            assert_eq!(resource_type_from_name(&name), ty.resource_type());
        }
    }

    #[test]
    fn compose_with_unknown_tag_is_bare() {
        let name = compose_filename("mystery", 65000);
        assert_eq!(name, "mystery");
        assert_eq!(file_type_from_name(&name), FileType::None);
    }

    #[test]
    fn archive_kinds() {
        assert_eq!(FileType::Hak.archive_kind(), Some(ArchiveKind::Erf));
        assert_eq!(FileType::Rim.archive_kind(), Some(ArchiveKind::Rim));
        assert_eq!(FileType::Key.archive_kind(), Some(ArchiveKind::Key));
        assert_eq!(FileType::Bif.archive_kind(), None);
        assert!(FileType::Bif.is_data_file());
    }

    #[test]
    fn display_formats() {
        assert_eq!(FileType::Dds.to_string(), "2033 (dds)");
        assert_eq!(FileType::None.to_string(), "none");
        assert_eq!(ResourceType::Image.to_string(), "Image");
        assert_eq!(FileType::None.id(), None);
    }
}
