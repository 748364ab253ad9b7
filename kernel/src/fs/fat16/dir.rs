//! FAT16 Directory Entry Structures
//!
//! Directory entries are 32 bytes each and contain:
//! - File name (8.3 format)
//! - Attributes
//! - Timestamps
//! - First cluster
//! - File size
//!
//! The root directory lives in a fixed region after the FATs. Every other
//! directory is an ordinary cluster chain whose contents are entries.
//! Long file name entries are counted like any other record but never
//! match a lookup.

use alloc::string::String;
use alloc::vec::Vec;

use super::bpb::{array, le16, le32};
use super::fat::cluster_values;
use super::file::Fat16Private;
use crate::fs::path::ParsedPath;
use crate::fs::vfs::{FileAttributes, FsResult, FsStatus};

/// Directory entry size
pub const DIR_ENTRY_SIZE: usize = 32;

/// Longest display name: 8 + '.' + 3
const MAX_SHORT_NAME: usize = 12;

/// Special first byte values
pub mod entry_status {
    /// Entry is free and all following entries are free
    pub const END: u8 = 0x00;
    /// Entry was deleted
    pub const DELETED: u8 = 0xE5;
    /// First byte was 0xE5, stored as 0x05
    pub const KANJI: u8 = 0x05;
}

/// Short directory entry (8.3 format)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FatDirEntry {
    /// File name (8 characters, space-padded)
    pub name: [u8; 8],
    /// File extension (3 characters, space-padded)
    pub ext: [u8; 3],
    pub attributes: u8,
    pub reserved: u8,
    /// Creation time, tenths of a second
    pub create_time_tenths: u8,
    pub create_time: u16,
    pub create_date: u16,
    pub access_date: u16,
    /// High word of the first cluster (always 0 on FAT16)
    pub cluster_high: u16,
    pub modify_time: u16,
    pub modify_date: u16,
    /// Low word of the first cluster
    pub cluster_low: u16,
    /// File size in bytes
    pub file_size: u32,
}

impl FatDirEntry {
    pub fn parse(bytes: &[u8; DIR_ENTRY_SIZE]) -> Self {
        Self {
            name: array(bytes, 0),
            ext: array(bytes, 8),
            attributes: bytes[11],
            reserved: bytes[12],
            create_time_tenths: bytes[13],
            create_time: le16(bytes, 14),
            create_date: le16(bytes, 16),
            access_date: le16(bytes, 18),
            cluster_high: le16(bytes, 20),
            modify_time: le16(bytes, 22),
            modify_date: le16(bytes, 24),
            cluster_low: le16(bytes, 26),
            file_size: le32(bytes, 28),
        }
    }

    /// Terminator record: no entries follow.
    pub fn is_end(&self) -> bool {
        self.name[0] == entry_status::END
    }

    pub fn is_deleted(&self) -> bool {
        self.name[0] == entry_status::DELETED
    }

    pub fn attributes(&self) -> FileAttributes {
        FileAttributes::from_bits_retain(self.attributes)
    }

    pub fn is_directory(&self) -> bool {
        self.attributes().contains(FileAttributes::SUBDIRECTORY)
    }

    /// First cluster of the file data
    pub fn first_cluster(&self) -> u16 {
        self.cluster_low
    }

    fn short_name_bytes(&self) -> ([u8; MAX_SHORT_NAME], usize) {
        let mut out = [0u8; MAX_SHORT_NAME];
        let mut len = 0;

        let name_len = self
            .name
            .iter()
            .rposition(|&b| b != b' ')
            .map_or(0, |i| i + 1);
        for (i, &b) in self.name[..name_len].iter().enumerate() {
            out[len] = if i == 0 && b == entry_status::KANJI { 0xE5 } else { b };
            len += 1;
        }

        let ext_len = self
            .ext
            .iter()
            .rposition(|&b| b != b' ')
            .map_or(0, |i| i + 1);
        if ext_len > 0 {
            out[len] = b'.';
            len += 1;
            out[len..len + ext_len].copy_from_slice(&self.ext[..ext_len]);
            len += ext_len;
        }

        (out, len)
    }

    /// Display name, `NAME.EXT` (or `NAME` when the extension is blank).
    pub fn short_name(&self) -> String {
        let (bytes, len) = self.short_name_bytes();
        bytes[..len].iter().map(|&b| char::from(b)).collect()
    }

    /// Check if name matches the display name (case-insensitive)
    pub fn name_matches(&self, name: &str) -> bool {
        let (bytes, len) = self.short_name_bytes();
        bytes[..len].eq_ignore_ascii_case(name.as_bytes())
    }
}

/// Location of the root directory region, in sectors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RootExtent {
    pub start_sector: u32,
    /// One past the last sector
    pub end_sector: u32,
}

/// A loaded directory: its live (non-deleted) entries in on-disk order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Directory {
    entries: Vec<FatDirEntry>,
    extent: Option<RootExtent>,
}

impl Directory {
    /// Number of live entries
    pub fn total(&self) -> usize {
        self.entries.len()
    }

    pub fn entries(&self) -> &[FatDirEntry] {
        &self.entries
    }

    /// Entry at `index`, if in range.
    pub fn get(&self, index: usize) -> Option<&FatDirEntry> {
        self.entries.get(index)
    }

    /// Sector extent; only the root directory has one.
    pub fn extent(&self) -> Option<RootExtent> {
        self.extent
    }

    /// First entry whose display name matches `name`.
    pub fn find(&self, name: &str) -> Option<&FatDirEntry> {
        self.entries.iter().find(|entry| entry.name_matches(name))
    }
}

/// What an open path refers to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FatItem {
    File(FatDirEntry),
    Directory(Directory),
}

/// Where a directory's records live on disk.
#[derive(Debug, Clone, Copy)]
enum DirRegion {
    /// Contiguous sectors holding at most `max_entries` records (the root).
    Fixed { start_sector: u32, max_entries: usize },
    /// A cluster chain.
    Chain { first_cluster: u16 },
}

// ============================================================================
// Directory Loading
// ============================================================================

impl Fat16Private {
    fn read_dir_record(&mut self) -> FsResult<FatDirEntry> {
        let mut raw = [0u8; DIR_ENTRY_SIZE];
        self.directory_stream.read(&mut raw)?;
        Ok(FatDirEntry::parse(&raw))
    }

    /// Visit every live record of `region` in order until the terminator,
    /// the end of the region, or `visit` returns `false`.
    fn walk_directory<F>(&mut self, region: DirRegion, mut visit: F) -> FsResult<()>
    where
        F: FnMut(&FatDirEntry) -> bool,
    {
        let sector_size = self.sector_size as u64;

        match region {
            DirRegion::Fixed { start_sector, max_entries } => {
                self.directory_stream.seek(start_sector as u64 * sector_size);
                for _ in 0..max_entries {
                    let entry = self.read_dir_record()?;
                    if entry.is_end() {
                        break;
                    }
                    if entry.is_deleted() {
                        continue;
                    }
                    if !visit(&entry) {
                        break;
                    }
                }
                Ok(())
            }
            DirRegion::Chain { first_cluster } => {
                let per_cluster = self.cluster_bytes() as usize / DIR_ENTRY_SIZE;
                let max_hops = self.max_clusters();
                let mut cluster = first_cluster;
                let mut hops = 0;

                loop {
                    let sector = self.cluster_to_sector(cluster)?;
                    self.directory_stream.seek(sector as u64 * sector_size);
                    for _ in 0..per_cluster {
                        let entry = self.read_dir_record()?;
                        if entry.is_end() {
                            return Ok(());
                        }
                        if entry.is_deleted() {
                            continue;
                        }
                        if !visit(&entry) {
                            return Ok(());
                        }
                    }

                    match self.next_cluster(cluster)? {
                        Some(next) => cluster = next,
                        None => return Ok(()),
                    }
                    hops += 1;
                    if hops > max_hops {
                        log::warn!("fat16: directory chain from cluster {} loops", first_cluster);
                        return Err(FsStatus::IoError);
                    }
                }
            }
        }
    }

    fn count_region(&mut self, region: DirRegion) -> FsResult<usize> {
        let mut total = 0;
        self.walk_directory(region, |_| {
            total += 1;
            true
        })?;
        Ok(total)
    }

    fn load_region(&mut self, region: DirRegion) -> FsResult<Directory> {
        let total = self.count_region(region)?;

        let mut entries = Vec::new();
        entries
            .try_reserve_exact(total)
            .map_err(|_| FsStatus::OutOfMemory)?;
        if total > 0 {
            self.walk_directory(region, |entry| {
                entries.push(*entry);
                entries.len() < total
            })?;
        }

        Ok(Directory {
            entries,
            extent: None,
        })
    }

    /// Count the live records of a contiguous directory region starting at
    /// `start_sector`, stopping at the terminator or after `max_entries`
    /// records.
    pub fn count_items(&mut self, start_sector: u32, max_entries: usize) -> FsResult<usize> {
        self.count_region(DirRegion::Fixed {
            start_sector,
            max_entries,
        })
    }

    /// Load the root directory from its fixed region.
    pub(super) fn load_root_directory(&mut self) -> FsResult<Directory> {
        let start_sector = self.header.root_dir_start_sector();
        let region = DirRegion::Fixed {
            start_sector,
            max_entries: self.header.bpb.root_dir_entries as usize,
        };

        let mut root = self.load_region(region)?;
        root.extent = Some(RootExtent {
            start_sector,
            end_sector: self.header.root_dir_end_sector(),
        });
        log::debug!(
            "fat16: root directory sectors {}..{}, {} entries",
            start_sector,
            self.header.root_dir_end_sector(),
            root.total()
        );
        Ok(root)
    }

    /// Load a subdirectory by walking its cluster chain.
    pub fn load_directory(&mut self, first_cluster: u16) -> FsResult<Directory> {
        self.load_region(DirRegion::Chain { first_cluster })
    }

    /// Materialize the item an entry describes: a loaded directory for a
    /// subdirectory entry, otherwise a copy of the entry.
    ///
    /// A subdirectory entry with cluster 0 is the root (the `..` record of
    /// a top-level directory).
    pub fn new_item_for_entry(&mut self, entry: &FatDirEntry) -> FsResult<FatItem> {
        if !entry.is_directory() {
            return Ok(FatItem::File(*entry));
        }
        match entry.first_cluster() {
            cluster_values::FREE => Ok(FatItem::Directory(self.root.clone())),
            cluster => Ok(FatItem::Directory(self.load_directory(cluster)?)),
        }
    }

    /// Look `name` up in `directory` and materialize the first match.
    pub fn find_item_in_directory(
        &mut self,
        directory: &Directory,
        name: &str,
    ) -> FsResult<Option<FatItem>> {
        match directory.find(name) {
            Some(entry) => self.new_item_for_entry(entry).map(Some),
            None => Ok(None),
        }
    }

    /// Walk `path` from the root directory.
    ///
    /// Returns `None` if any segment is missing, or if a segment other than
    /// the last names a file.
    pub fn resolve_path(&mut self, path: &ParsedPath) -> FsResult<Option<FatItem>> {
        let mut components = path.components().iter();
        let Some(first) = components.next() else {
            return Ok(None);
        };

        let Some(entry) = self.root.find(first.as_str()).copied() else {
            return Ok(None);
        };
        let mut current = self.new_item_for_entry(&entry)?;

        for component in components {
            let next = match &current {
                FatItem::Directory(dir) => self.find_item_in_directory(dir, component.as_str())?,
                FatItem::File(_) => None,
            };
            match next {
                Some(item) => current = item,
                None => return Ok(None),
            }
        }

        Ok(Some(current))
    }
}
