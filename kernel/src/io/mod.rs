//! I/O Layer (io)
//!
//! Everything between a filesystem driver and the hardware:
//!
//! - **Block devices**: sector-addressed storage ([`BlockDevice`])
//! - **RAM disks**: in-memory block devices over a disk image
//! - **Disks**: a device plus the filesystem volume bound to it
//! - **Disk streams**: byte-granular cursors over a disk
//!
//! # I/O Flow
//!
//! 1. A driver seeks a [`DiskStream`] to an absolute byte offset
//! 2. The stream reads whole sectors through the [`BlockDevice`]
//! 3. Only the requested span is copied out to the caller

pub mod block;
pub mod disk;
pub mod ramdisk;
pub mod stream;

pub use block::{BlockDevice, BlockStatus, SECTOR_SIZE};
pub use disk::{Disk, DiskId};
pub use ramdisk::RamDisk;
pub use stream::DiskStream;
