//! FAT16 File System Driver
//!
//! Implements read-only FAT16 support:
//! - Volume recognition and mounting
//! - Directory traversal
//! - File reading and seeking
//!
//! # Structure
//! - `bpb` - BIOS Parameter Block and extended header
//! - `dir` - Directory entry structures and directory loading
//! - `fat` - Allocation table and cluster chains
//! - `file` - Driver, volume and open-file operations

pub mod bpb;
pub mod dir;
pub mod fat;
pub mod file;

// Re-export commonly used items
pub use bpb::{BiosParameterBlock, ExtendedBpb, Fat16Header, FAT16_SIGNATURE};
pub use dir::{entry_status, Directory, FatDirEntry, FatItem, RootExtent, DIR_ENTRY_SIZE};
pub use fat::{cluster_values, ClusterLink, FAT16_ENTRY_SIZE};
pub use file::{Fat16, Fat16File, Fat16Private, Fat16Volume};

use alloc::boxed::Box;

use crate::fs::vfs::FsRegistry;

/// FAT16 file system driver name
pub const FAT16_NAME: &str = "FAT16";

/// Register the FAT16 driver and return its slot.
pub fn register(registry: &mut FsRegistry) -> usize {
    registry.register(Box::new(Fat16))
}
