//! Virtual File System (VFS) Abstraction
//!
//! Provides a unified interface for different file system implementations.
//! File system drivers register with the [`FsRegistry`]; when a disk is
//! attached each driver in turn is asked whether it recognizes the disk,
//! and the first one that does binds a [`Volume`] to it.
//!
//! # Key Concepts
//! - **FileSystem**: A file system driver (FAT16, ...)
//! - **Volume**: A driver's mounted state for one disk
//! - **FileOps**: Per-handle operations on an open file
//! - **FsRegistry**: Fixed-capacity table of registered drivers

use alloc::boxed::Box;
use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

use super::path::ParsedPath;
use crate::io::block::BlockStatus;
use crate::io::disk::Disk;

/// Default number of filesystem driver slots
pub const MAX_FILE_SYSTEMS: usize = 12;

// ============================================================================
// Status Codes
// ============================================================================

/// File system status codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum FsStatus {
    /// I/O error, or a broken cluster chain on disk
    IoError = -1,
    /// Invalid argument (bad path, mode, descriptor or buffer)
    InvalidArgument = -2,
    /// Allocation failed
    OutOfMemory = -3,
    /// The driver does not recognize this disk
    NotThisFilesystem = -5,
    /// The operation would modify a read-only filesystem
    ReadOnly = -6,
    /// The operation is not implemented by this driver
    Unimplemented = -7,
    /// A path segment does not exist
    NotFound = -8,
    /// The descriptor table is full
    TooManyFiles = -9,
}

impl FsStatus {
    /// Numeric code as exposed across the system call boundary.
    pub fn code(self) -> i32 {
        self as i32
    }
}

impl fmt::Display for FsStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            FsStatus::IoError => "i/o error",
            FsStatus::InvalidArgument => "invalid argument",
            FsStatus::OutOfMemory => "out of memory",
            FsStatus::NotThisFilesystem => "not this filesystem",
            FsStatus::ReadOnly => "read-only filesystem",
            FsStatus::Unimplemented => "not implemented",
            FsStatus::NotFound => "not found",
            FsStatus::TooManyFiles => "too many open files",
        };
        f.write_str(text)
    }
}

impl From<BlockStatus> for FsStatus {
    fn from(_: BlockStatus) -> Self {
        FsStatus::IoError
    }
}

/// Result type used throughout the filesystem layer.
pub type FsResult<T> = Result<T, FsStatus>;

// ============================================================================
// Open Modes and Seeking
// ============================================================================

/// File open mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileMode {
    Read,
    Write,
    Append,
}

impl FileMode {
    /// Parse a mode string: `"r"`, `"w"` or `"a"`.
    pub fn from_mode_str(mode: &str) -> FsResult<Self> {
        match mode {
            "r" => Ok(FileMode::Read),
            "w" => Ok(FileMode::Write),
            "a" => Ok(FileMode::Append),
            _ => Err(FsStatus::InvalidArgument),
        }
    }
}

/// Seek origin
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum SeekWhence {
    /// From beginning of file
    Set = 0,
    /// From current position
    Cur = 1,
    /// From end of file
    End = 2,
}

impl SeekWhence {
    /// Decode a raw origin as passed across the system call boundary.
    pub fn from_raw(raw: u32) -> FsResult<Self> {
        match raw {
            0 => Ok(SeekWhence::Set),
            1 => Ok(SeekWhence::Cur),
            2 => Ok(SeekWhence::End),
            _ => Err(FsStatus::InvalidArgument),
        }
    }
}

// ============================================================================
// File Metadata
// ============================================================================

bitflags::bitflags! {
    /// File attribute bits, as stored in a FAT directory entry.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct FileAttributes: u8 {
        const READ_ONLY = 0x01;
        const HIDDEN = 0x02;
        const SYSTEM = 0x04;
        const VOLUME_LABEL = 0x08;
        const SUBDIRECTORY = 0x10;
        const ARCHIVED = 0x20;
        const DEVICE = 0x40;
        const RESERVED = 0x80;
    }
}

/// Result of a stat call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileStat {
    /// File size in bytes
    pub size: u32,
    pub attributes: FileAttributes,
}

impl FileStat {
    pub fn is_read_only(&self) -> bool {
        self.attributes.contains(FileAttributes::READ_ONLY)
    }
}

// ============================================================================
// Driver Interfaces
// ============================================================================

/// A filesystem driver.
pub trait FileSystem: Send + Sync {
    /// Short driver name, e.g. `"FAT16"`.
    fn name(&self) -> &'static str;

    /// Inspect `disk` and, if it holds this filesystem, mount it.
    ///
    /// Returns [`FsStatus::NotThisFilesystem`] when the disk belongs to
    /// someone else.
    fn resolve(&self, disk: &Disk) -> FsResult<Box<dyn Volume>>;
}

/// A mounted filesystem on one disk.
pub trait Volume: Send {
    fn filesystem_name(&self) -> &'static str;

    /// Volume label, if the filesystem records one.
    fn volume_label(&self) -> Option<String> {
        None
    }

    /// Open the item at `path` on this volume.
    fn open(&self, path: &ParsedPath, mode: FileMode) -> FsResult<Box<dyn FileOps>>;
}

/// Operations on one open file. Closing is dropping.
pub trait FileOps: Send {
    /// Read up to `count` elements of `size` bytes into `out`.
    ///
    /// Returns the number of whole elements read; `0` at end of file.
    fn read(&mut self, size: usize, count: usize, out: &mut [u8]) -> FsResult<usize>;

    fn seek(&mut self, offset: u32, whence: SeekWhence) -> FsResult<()>;

    fn stat(&self) -> FsResult<FileStat>;

    /// Current byte position.
    fn position(&self) -> u32;
}

// ============================================================================
// Filesystem Registry
// ============================================================================

/// Fixed-capacity table of filesystem drivers.
pub struct FsRegistry {
    slots: Vec<Option<Box<dyn FileSystem>>>,
}

impl FsRegistry {
    /// Create a registry with `capacity` empty slots.
    pub fn new(capacity: usize) -> Self {
        let mut slots = Vec::with_capacity(capacity);
        slots.resize_with(capacity, || None);
        Self { slots }
    }

    /// Number of registered drivers.
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Store `fs` in the first free slot and return the slot index.
    ///
    /// # Panics
    /// Panics if every slot is taken. Drivers are registered once during
    /// boot, so a full table is a kernel configuration error.
    pub fn register(&mut self, fs: Box<dyn FileSystem>) -> usize {
        let Some(index) = self.slots.iter().position(|s| s.is_none()) else {
            panic!(
                "filesystem registry full: cannot register {} ({} slots)",
                fs.name(),
                self.slots.len()
            );
        };
        log::info!("registered filesystem {} in slot {}", fs.name(), index);
        self.slots[index] = Some(fs);
        index
    }

    /// Names of registered drivers in slot order.
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.slots.iter().flatten().map(|fs| fs.name())
    }

    /// Offer `disk` to each registered driver in slot order and bind the
    /// first volume that is produced.
    ///
    /// Returns the slot index of the driver that claimed the disk.
    pub fn resolve(&self, disk: &mut Disk) -> FsResult<usize> {
        for (index, fs) in self.slots.iter().enumerate() {
            let Some(fs) = fs else { continue };
            match fs.resolve(disk) {
                Ok(volume) => {
                    log::info!("disk {}: mounted {}", disk.id(), fs.name());
                    disk.bind(volume);
                    return Ok(index);
                }
                Err(status) => {
                    log::log!(
                        decline_level(status),
                        "disk {}: {} declined ({})",
                        disk.id(),
                        fs.name(),
                        status
                    );
                }
            }
        }
        Err(FsStatus::NotThisFilesystem)
    }
}

/// Log level for a driver that declined a disk with `status`.
fn decline_level(status: FsStatus) -> log::Level {
    match status {
        FsStatus::NotThisFilesystem => log::Level::Debug,
        _ => log::Level::Warn,
    }
}

impl Default for FsRegistry {
    fn default() -> Self {
        Self::new(MAX_FILE_SYSTEMS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::RamDisk;
    use alloc::sync::Arc;

    struct Declines;

    impl FileSystem for Declines {
        fn name(&self) -> &'static str {
            "NOPE"
        }

        fn resolve(&self, _disk: &Disk) -> FsResult<Box<dyn Volume>> {
            Err(FsStatus::NotThisFilesystem)
        }
    }

    struct Fails;

    impl FileSystem for Fails {
        fn name(&self) -> &'static str {
            "BROKEN"
        }

        fn resolve(&self, _disk: &Disk) -> FsResult<Box<dyn Volume>> {
            Err(FsStatus::IoError)
        }
    }

    struct Claims(&'static str);

    struct EmptyVolume(&'static str);

    impl Volume for EmptyVolume {
        fn filesystem_name(&self) -> &'static str {
            self.0
        }

        fn open(&self, _path: &ParsedPath, _mode: FileMode) -> FsResult<Box<dyn FileOps>> {
            Err(FsStatus::NotFound)
        }
    }

    impl FileSystem for Claims {
        fn name(&self) -> &'static str {
            self.0
        }

        fn resolve(&self, _disk: &Disk) -> FsResult<Box<dyn Volume>> {
            Ok(Box::new(EmptyVolume(self.0)))
        }
    }

    fn blank_disk() -> Disk {
        Disk::new(0, Arc::new(RamDisk::new(1)))
    }

    #[test]
    fn register_fills_first_free_slot() {
        let mut registry = FsRegistry::new(3);
        assert!(registry.is_empty());
        assert_eq!(registry.register(Box::new(Declines)), 0);
        assert_eq!(registry.register(Box::new(Claims("A"))), 1);
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.names().collect::<Vec<_>>(), ["NOPE", "A"]);
    }

    #[test]
    #[should_panic(expected = "filesystem registry full")]
    fn register_panics_when_full() {
        let mut registry = FsRegistry::new(1);
        registry.register(Box::new(Declines));
        registry.register(Box::new(Declines));
    }

    #[test]
    fn resolve_binds_first_claiming_driver() {
        let mut registry = FsRegistry::new(4);
        registry.register(Box::new(Declines));
        registry.register(Box::new(Claims("FIRST")));
        registry.register(Box::new(Claims("SECOND")));

        let mut disk = blank_disk();
        assert_eq!(registry.resolve(&mut disk), Ok(1));
        assert_eq!(disk.filesystem_name(), Some("FIRST"));
    }

    #[test]
    fn resolve_skips_failing_driver() {
        let mut registry = FsRegistry::new(3);
        registry.register(Box::new(Fails));
        registry.register(Box::new(Claims("NEXT")));

        let mut disk = blank_disk();
        assert_eq!(registry.resolve(&mut disk), Ok(1));
        assert_eq!(disk.filesystem_name(), Some("NEXT"));
    }

    #[test]
    fn unexpected_resolve_errors_warn() {
        assert_eq!(decline_level(FsStatus::NotThisFilesystem), log::Level::Debug);
        assert_eq!(decline_level(FsStatus::IoError), log::Level::Warn);
        assert_eq!(decline_level(FsStatus::OutOfMemory), log::Level::Warn);
    }

    #[test]
    fn resolve_without_claim_leaves_disk_unbound() {
        let mut registry = FsRegistry::new(2);
        registry.register(Box::new(Declines));

        let mut disk = blank_disk();
        assert_eq!(registry.resolve(&mut disk), Err(FsStatus::NotThisFilesystem));
        assert!(disk.volume().is_none());
    }

    #[test]
    fn mode_strings() {
        assert_eq!(FileMode::from_mode_str("r"), Ok(FileMode::Read));
        assert_eq!(FileMode::from_mode_str("w"), Ok(FileMode::Write));
        assert_eq!(FileMode::from_mode_str("a"), Ok(FileMode::Append));
        assert_eq!(FileMode::from_mode_str("rw"), Err(FsStatus::InvalidArgument));
        assert_eq!(FileMode::from_mode_str(""), Err(FsStatus::InvalidArgument));
    }

    #[test]
    fn raw_seek_origins() {
        assert_eq!(SeekWhence::from_raw(1), Ok(SeekWhence::Cur));
        assert_eq!(SeekWhence::from_raw(3), Err(FsStatus::InvalidArgument));
    }

    #[test]
    fn status_codes_are_negative() {
        assert_eq!(FsStatus::IoError.code(), -1);
        assert!(FsStatus::TooManyFiles.code() < 0);
        assert_eq!(FsStatus::from(BlockStatus::Timeout), FsStatus::IoError);
    }
}
