//! PeachOS Filesystem Layer
//!
//! A read-only FAT16 driver and the virtual file system around it:
//!
//! - **io**: block devices, disks and byte streams
//! - **fs**: the VFS (driver registry, descriptor table, paths) and the
//!   FAT16 driver
//! - **config**: table sizes and limits
//! - **logger**: `log` facade routed to a console sink
//!
//! The crate is `no_std` + `alloc` inside the kernel. Under `cargo test`
//! it links std so the driver can be exercised against RAM disks.
//!
//! # Example
//! ```ignore
//! let mut vfs = Vfs::new();
//! vfs.attach_disk(Arc::new(RamDisk::from_image(image)))?;
//! let fd = vfs.fopen("0:/README.TXT", "r")?;
//! let n = vfs.fread(fd, 1, buf.len(), &mut buf)?;
//! vfs.fclose(fd)?;
//! ```

#![cfg_attr(not(test), no_std)]

extern crate alloc;

pub mod config;
pub mod fs;
pub mod io;
pub mod logger;

#[cfg(test)]
mod testing;

pub use config::VfsConfig;
pub use fs::{FsResult, FsStatus, Vfs};
