//! File System Subsystem
//!
//! Provides file system support for PeachOS, implementing:
//! - Virtual File System (VFS) abstraction layer
//! - FAT16 file system driver
//! - Path utilities
//! - The open file descriptor table
//!
//! # Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │            fopen / fread / fseek / fstat / fclose            │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │              Virtual File System (VFS)                       │
//! │  ┌─────────────┐ ┌─────────────┐ ┌─────────────┐            │
//! │  │  Registry   │ │ Descriptors │ │    Disks    │            │
//! │  └─────────────┘ └─────────────┘ └─────────────┘            │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      FAT16 Driver                            │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    Block I/O Layer                          │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Descriptors
//! Descriptors are numbered from 1; 0 is never a valid descriptor. Each
//! one owns its driver handle, so closing a descriptor releases the
//! driver's per-file state.

pub mod fat16;
pub mod path;
pub mod vfs;

// Re-export common types
pub use path::{ParsedPath, PathComponent, MAX_PATH};
pub use vfs::{FileAttributes, FileMode, FileStat, FsResult, FsStatus, SeekWhence};
pub use vfs::{FileOps, FileSystem, FsRegistry, Volume};

use alloc::boxed::Box;
use alloc::sync::Arc;
use alloc::vec::Vec;

use crate::config::VfsConfig;
use crate::io::block::BlockDevice;
use crate::io::disk::{Disk, DiskId};

/// File system statistics
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FsStats {
    /// Number of registered file systems
    pub registered_fs: usize,
    pub attached_disks: usize,
    /// Number of disks a driver claimed
    pub mounted_volumes: usize,
    /// Number of open file descriptors
    pub open_files: usize,
}

struct FileDescriptor {
    disk: DiskId,
    ops: Box<dyn FileOps>,
}

/// The virtual file system: drivers, disks and open descriptors.
pub struct Vfs {
    config: VfsConfig,
    registry: FsRegistry,
    disks: Vec<Disk>,
    descriptors: Vec<Option<FileDescriptor>>,
}

impl Vfs {
    /// A VFS with default limits and the built-in drivers registered.
    pub fn new() -> Self {
        Self::with_config(VfsConfig::default())
    }

    pub fn with_config(config: VfsConfig) -> Self {
        let mut registry = FsRegistry::new(config.max_filesystems);
        fat16::register(&mut registry);

        let mut descriptors = Vec::with_capacity(config.max_descriptors);
        descriptors.resize_with(config.max_descriptors, || None);

        log::info!(
            "vfs: {} driver slots, {} descriptors",
            config.max_filesystems,
            config.max_descriptors
        );

        Self {
            config,
            registry,
            disks: Vec::new(),
            descriptors,
        }
    }

    pub fn config(&self) -> &VfsConfig {
        &self.config
    }

    pub fn registry(&self) -> &FsRegistry {
        &self.registry
    }

    /// Register additional drivers. Disks attached afterwards see them.
    pub fn registry_mut(&mut self) -> &mut FsRegistry {
        &mut self.registry
    }

    // ========================================================================
    // Disks
    // ========================================================================

    /// Attach a block device as the next disk and let the registered
    /// drivers claim it.
    ///
    /// A disk no driver recognizes is still attached; opening paths on it
    /// fails with [`FsStatus::IoError`].
    pub fn attach_disk(&mut self, device: Arc<dyn BlockDevice>) -> FsResult<DiskId> {
        let id = self.disks.len();
        if id >= self.config.max_disks {
            log::warn!("vfs: no drive number left for a new disk");
            return Err(FsStatus::InvalidArgument);
        }

        let mut disk = Disk::new(id, device);
        if self.registry.resolve(&mut disk).is_err() {
            log::warn!("vfs: disk {} has no recognized filesystem", id);
        }
        self.disks.push(disk);
        Ok(id)
    }

    pub fn disk(&self, id: DiskId) -> Option<&Disk> {
        self.disks.get(id)
    }

    pub fn disks(&self) -> &[Disk] {
        &self.disks
    }

    // ========================================================================
    // File Operations
    // ========================================================================

    /// Open `path` with mode `"r"`, `"w"` or `"a"` and return a descriptor.
    pub fn fopen(&mut self, path: &str, mode: &str) -> FsResult<u32> {
        let parsed = ParsedPath::parse_with_limit(path, self.config.max_path)?;
        if parsed.is_root() {
            return Err(FsStatus::InvalidArgument);
        }
        let mode = FileMode::from_mode_str(mode)?;

        let disk = self.disks.get(parsed.drive).ok_or(FsStatus::IoError)?;
        let volume = disk.volume().ok_or(FsStatus::IoError)?;
        let ops = volume.open(&parsed, mode)?;

        let slot = self
            .descriptors
            .iter()
            .position(Option::is_none)
            .ok_or(FsStatus::TooManyFiles)?;
        self.descriptors[slot] = Some(FileDescriptor {
            disk: parsed.drive,
            ops,
        });

        let fd = slot as u32 + 1;
        log::trace!("vfs: {} -> fd {}", parsed, fd);
        Ok(fd)
    }

    /// Read up to `count` elements of `size` bytes into `out`.
    ///
    /// Returns the number of whole elements read; `0` at end of file.
    pub fn fread(&mut self, fd: u32, size: usize, count: usize, out: &mut [u8]) -> FsResult<usize> {
        if size == 0 || count == 0 {
            return Err(FsStatus::InvalidArgument);
        }
        self.descriptor_mut(fd)?.ops.read(size, count, out)
    }

    pub fn fseek(&mut self, fd: u32, offset: u32, whence: SeekWhence) -> FsResult<()> {
        self.descriptor_mut(fd)?.ops.seek(offset, whence)
    }

    pub fn fstat(&self, fd: u32) -> FsResult<FileStat> {
        self.descriptor(fd)?.ops.stat()
    }

    /// Current byte position of `fd`.
    pub fn ftell(&self, fd: u32) -> FsResult<u32> {
        Ok(self.descriptor(fd)?.ops.position())
    }

    /// Close `fd`, releasing the driver's per-file state.
    pub fn fclose(&mut self, fd: u32) -> FsResult<()> {
        let slot = Self::slot_of(fd)?;
        let descriptor = self
            .descriptors
            .get_mut(slot)
            .and_then(Option::take)
            .ok_or(FsStatus::InvalidArgument)?;
        log::trace!("vfs: closed fd {} on disk {}", fd, descriptor.disk);
        Ok(())
    }

    pub fn stats(&self) -> FsStats {
        FsStats {
            registered_fs: self.registry.len(),
            attached_disks: self.disks.len(),
            mounted_volumes: self.disks.iter().filter(|d| d.volume().is_some()).count(),
            open_files: self.descriptors.iter().filter(|d| d.is_some()).count(),
        }
    }

    fn slot_of(fd: u32) -> FsResult<usize> {
        (fd as usize).checked_sub(1).ok_or(FsStatus::InvalidArgument)
    }

    fn descriptor(&self, fd: u32) -> FsResult<&FileDescriptor> {
        let slot = Self::slot_of(fd)?;
        self.descriptors
            .get(slot)
            .and_then(Option::as_ref)
            .ok_or(FsStatus::InvalidArgument)
    }

    fn descriptor_mut(&mut self, fd: u32) -> FsResult<&mut FileDescriptor> {
        let slot = Self::slot_of(fd)?;
        self.descriptors
            .get_mut(slot)
            .and_then(Option::as_mut)
            .ok_or(FsStatus::InvalidArgument)
    }
}

impl Default for Vfs {
    fn default() -> Self {
        Self::new()
    }
}
