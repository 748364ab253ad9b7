//! FAT16 File Operations
//!
//! Implements the driver side of the VFS for FAT16:
//! - Recognizing and mounting a volume
//! - Opening files and directories by path
//! - Reading and seeking within a file
//!
//! All mounted state for one disk lives in [`Fat16Private`], shared by the
//! volume and every open handle behind a `spin::Mutex`. The private state
//! owns three independent streams (cluster data, FAT, directory records)
//! so the three access patterns never move each other's cursor.

use alloc::boxed::Box;
use alloc::string::String;
use alloc::sync::Arc;
use spin::Mutex;

use super::bpb::Fat16Header;
use super::dir::{Directory, FatItem};
use super::FAT16_NAME;
use crate::fs::path::ParsedPath;
use crate::fs::vfs::{
    FileMode, FileOps, FileStat, FileSystem, FsResult, FsStatus, SeekWhence, Volume,
};
use crate::io::block::BlockDevice;
use crate::io::disk::Disk;
use crate::io::stream::DiskStream;

// ============================================================================
// Mounted State
// ============================================================================

/// Per-volume driver state.
pub struct Fat16Private {
    pub(super) header: Fat16Header,
    pub(super) sector_size: u32,
    /// Sector of cluster 2
    pub(super) data_start_sector: u32,
    pub(super) root: Directory,
    pub(super) cluster_stream: DiskStream,
    pub(super) fat_stream: DiskStream,
    pub(super) directory_stream: DiskStream,
}

impl Fat16Private {
    /// Read and validate the volume header, then load the root directory.
    ///
    /// A disk that does not carry a FAT16 header, or whose header disagrees
    /// with the device geometry, is [`FsStatus::NotThisFilesystem`].
    pub fn mount(device: Arc<dyn BlockDevice>) -> FsResult<Self> {
        let sector_size = device.sector_size();

        let mut raw = [0u8; Fat16Header::SIZE];
        DiskStream::new(device.clone()).read(&mut raw)?;
        let header = Fat16Header::parse(&raw);

        if !header.has_valid_signature() {
            return Err(FsStatus::NotThisFilesystem);
        }
        if header.bpb.bytes_per_sector as usize != sector_size {
            log::debug!(
                "fat16: header sector size {} does not match device ({})",
                header.bpb.bytes_per_sector,
                sector_size
            );
            return Err(FsStatus::NotThisFilesystem);
        }
        if header.bpb.sectors_per_cluster == 0 {
            log::debug!("fat16: zero sectors per cluster");
            return Err(FsStatus::NotThisFilesystem);
        }

        let mut private = Self {
            header,
            sector_size: sector_size as u32,
            data_start_sector: header.root_dir_end_sector(),
            root: Directory::default(),
            cluster_stream: DiskStream::new(device.clone()),
            fat_stream: DiskStream::new(device.clone()),
            directory_stream: DiskStream::new(device),
        };
        private.root = private.load_root_directory()?;

        log::info!(
            "fat16: mounted \"{}\" ({} sectors, {} bytes/cluster)",
            header.extended.volume_label_str(),
            header.bpb.total_sectors(),
            header.bpb.cluster_size()
        );
        Ok(private)
    }
}

// ============================================================================
// Driver
// ============================================================================

/// The FAT16 filesystem driver.
#[derive(Debug, Clone, Copy, Default)]
pub struct Fat16;

impl FileSystem for Fat16 {
    fn name(&self) -> &'static str {
        FAT16_NAME
    }

    fn resolve(&self, disk: &Disk) -> FsResult<Box<dyn Volume>> {
        let private = Fat16Private::mount(disk.device().clone())?;
        Ok(Box::new(Fat16Volume::new(private)))
    }
}

/// A mounted FAT16 volume.
pub struct Fat16Volume {
    state: Arc<Mutex<Fat16Private>>,
}

impl Fat16Volume {
    pub fn new(private: Fat16Private) -> Self {
        Self {
            state: Arc::new(Mutex::new(private)),
        }
    }

    pub fn header(&self) -> Fat16Header {
        self.state.lock().header
    }

    /// Filesystem type string from the extended header, e.g. `FAT16`.
    pub fn fs_type(&self) -> String {
        String::from(self.state.lock().header.extended.fs_type_str())
    }

    /// Number of live entries in the root directory.
    pub fn root_entry_count(&self) -> usize {
        self.state.lock().root.total()
    }
}

impl Volume for Fat16Volume {
    fn filesystem_name(&self) -> &'static str {
        FAT16_NAME
    }

    fn volume_label(&self) -> Option<String> {
        let state = self.state.lock();
        let label = state.header.extended.volume_label_str();
        if label.is_empty() {
            None
        } else {
            Some(String::from(label))
        }
    }

    fn open(&self, path: &ParsedPath, mode: FileMode) -> FsResult<Box<dyn FileOps>> {
        if mode != FileMode::Read {
            return Err(FsStatus::ReadOnly);
        }

        let item = self
            .state
            .lock()
            .resolve_path(path)?
            .ok_or(FsStatus::NotFound)?;
        log::trace!("fat16: opened {}", path);

        Ok(Box::new(Fat16File {
            volume: self.state.clone(),
            item,
            pos: 0,
        }))
    }
}

// ============================================================================
// Open Files
// ============================================================================

/// One open FAT16 file or directory.
pub struct Fat16File {
    volume: Arc<Mutex<Fat16Private>>,
    item: FatItem,
    pos: u32,
}

impl FileOps for Fat16File {
    fn read(&mut self, size: usize, count: usize, out: &mut [u8]) -> FsResult<usize> {
        let FatItem::File(entry) = &self.item else {
            return Err(FsStatus::InvalidArgument);
        };
        let total = size.checked_mul(count).ok_or(FsStatus::InvalidArgument)?;
        if size == 0 || out.len() < total {
            return Err(FsStatus::InvalidArgument);
        }

        let file_size = entry.file_size as u64;
        let first_cluster = entry.first_cluster();
        let mut volume = self.volume.lock();
        let mut pos = self.pos;
        let mut read = 0;

        for element in out[..total].chunks_exact_mut(size) {
            if pos as u64 + size as u64 > file_size {
                break;
            }
            volume.read_at(first_cluster, pos, element)?;
            pos += size as u32;
            read += 1;
        }

        self.pos = pos;
        Ok(read)
    }

    fn seek(&mut self, offset: u32, whence: SeekWhence) -> FsResult<()> {
        let FatItem::File(entry) = &self.item else {
            return Err(FsStatus::InvalidArgument);
        };

        match whence {
            SeekWhence::Set => {
                if offset >= entry.file_size {
                    return Err(FsStatus::IoError);
                }
                self.pos = offset;
            }
            SeekWhence::Cur => self.pos = self.pos.saturating_add(offset),
            SeekWhence::End => return Err(FsStatus::Unimplemented),
        }
        Ok(())
    }

    fn stat(&self) -> FsResult<FileStat> {
        match &self.item {
            FatItem::File(entry) => Ok(FileStat {
                size: entry.file_size,
                attributes: entry.attributes(),
            }),
            FatItem::Directory(_) => Err(FsStatus::InvalidArgument),
        }
    }

    fn position(&self) -> u32 {
        self.pos
    }
}
