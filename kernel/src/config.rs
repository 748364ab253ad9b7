//! VFS Configuration
//!
//! Table sizes and limits for the virtual file system. The defaults match
//! the kernel's static configuration; tests shrink them to exercise the
//! full-table paths.

use crate::fs::path::MAX_PATH;
use crate::fs::vfs::MAX_FILE_SYSTEMS;

/// Maximum number of open file descriptors
pub const MAX_FILE_DESCRIPTORS: usize = 512;

/// Maximum number of attached disks (one per drive digit)
pub const MAX_DISKS: usize = 10;

/// VFS limits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VfsConfig {
    /// Filesystem driver slots
    pub max_filesystems: usize,
    /// Open file descriptor slots
    pub max_descriptors: usize,
    pub max_disks: usize,
    /// Longest accepted path, in bytes
    pub max_path: usize,
}

impl VfsConfig {
    pub const fn new() -> Self {
        Self {
            max_filesystems: MAX_FILE_SYSTEMS,
            max_descriptors: MAX_FILE_DESCRIPTORS,
            max_disks: MAX_DISKS,
            max_path: MAX_PATH,
        }
    }

    pub const fn with_max_filesystems(mut self, slots: usize) -> Self {
        self.max_filesystems = slots;
        self
    }

    pub const fn with_max_descriptors(mut self, slots: usize) -> Self {
        self.max_descriptors = slots;
        self
    }

    pub const fn with_max_disks(mut self, disks: usize) -> Self {
        self.max_disks = if disks > MAX_DISKS { MAX_DISKS } else { disks };
        self
    }

    pub const fn with_max_path(mut self, len: usize) -> Self {
        self.max_path = len;
        self
    }
}

impl Default for VfsConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = VfsConfig::default();
        assert_eq!(config.max_filesystems, 12);
        assert_eq!(config.max_descriptors, 512);
        assert_eq!(config.max_disks, 10);
        assert_eq!(config.max_path, 108);
    }

    #[test]
    fn disks_are_capped_by_drive_digits() {
        assert_eq!(VfsConfig::new().with_max_disks(40).max_disks, MAX_DISKS);
        assert_eq!(VfsConfig::new().with_max_disks(2).max_disks, 2);
    }
}
